//! Catalogue file writer.
//!
//! Emits the layout written by the extraction tooling, so that a catalogue
//! loaded and saved again only differs from the original where the original
//! was hand-edited.

use std::fmt::Write as _;
use std::path::Path;

use quick_xml::escape::escape;

use super::error::CatalogError;
use super::model::{
    Catalog,
    Location,
    Message,
    TranslationText,
};

const INDENT: &str = "    ";

/// Serializes a catalogue to its XML representation.
#[must_use]
pub fn write_catalog(catalog: &Catalog) -> String {
    let mut out = String::with_capacity(catalog.message_count() * 256);
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n");

    out.push_str("<TS version=\"");
    out.push_str(&escape(catalog.version.as_str()));
    out.push('"');
    if let Some(language) = &catalog.language {
        push_attribute(&mut out, "language", language);
    }
    if let Some(source_language) = &catalog.source_language {
        push_attribute(&mut out, "sourcelanguage", source_language);
    }
    out.push_str(">\n");

    for context in &catalog.contexts {
        out.push_str("<context>\n");
        push_element(&mut out, 1, "name", &context.name);
        for message in &context.messages {
            write_message(&mut out, message);
        }
        out.push_str("</context>\n");
    }

    out.push_str("</TS>\n");
    out
}

/// Serializes a catalogue and writes it to `path`.
pub fn save_catalog(catalog: &Catalog, path: &Path) -> Result<(), CatalogError> {
    tracing::debug!(path = %path.display(), "Saving catalogue");
    std::fs::write(path, write_catalog(catalog))
        .map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })
}

fn write_message(out: &mut String, message: &Message) {
    push_indent(out, 1);
    out.push_str(if message.numerus { "<message numerus=\"yes\">\n" } else { "<message>\n" });

    for location in &message.locations {
        write_location(out, location);
    }
    push_element(out, 2, "source", &message.source);
    let optional = [
        ("oldsource", &message.old_source),
        ("comment", &message.comment),
        ("extracomment", &message.extra_comment),
        ("translatorcomment", &message.translator_comment),
    ];
    for (name, text) in optional {
        if let Some(text) = text {
            push_element(out, 2, name, text);
        }
    }

    push_indent(out, 2);
    out.push_str("<translation");
    if let Some(kind) = message.translation.status.as_attribute() {
        push_attribute(out, "type", kind);
    }
    out.push('>');
    match &message.translation.text {
        TranslationText::Plain(text) => push_text(out, text),
        TranslationText::Numerus(forms) => {
            out.push('\n');
            for form in forms {
                push_element(out, 3, "numerusform", form);
            }
            push_indent(out, 2);
        }
    }
    out.push_str("</translation>\n");

    push_indent(out, 1);
    out.push_str("</message>\n");
}

fn write_location(out: &mut String, location: &Location) {
    push_indent(out, 2);
    out.push_str("<location");
    if let Some(filename) = &location.filename {
        push_attribute(out, "filename", filename);
    }
    if let Some(line) = location.line {
        // Infallible for String.
        let _ = write!(out, " line=\"{line}\"");
    }
    out.push_str("/>\n");
}

fn push_element(out: &mut String, depth: usize, name: &str, text: &str) {
    push_indent(out, depth);
    let _ = write!(out, "<{name}>");
    push_text(out, text);
    let _ = writeln!(out, "</{name}>");
}

/// Escapes `text`; control characters XML 1.0 cannot carry become
/// `<byte value="x1b"/>` elements.
fn push_text(out: &mut String, text: &str) {
    let mut rest = text;
    while let Some(index) = rest.find(is_unrepresentable) {
        let (head, tail) = rest.split_at(index);
        out.push_str(&escape(head));
        let mut chars = tail.chars();
        if let Some(ch) = chars.next() {
            let _ = write!(out, "<byte value=\"x{:x}\"/>", u32::from(ch));
        }
        rest = chars.as_str();
    }
    out.push_str(&escape(rest));
}

const fn is_unrepresentable(ch: char) -> bool {
    ch < ' ' && !matches!(ch, '\t' | '\n' | '\r')
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, " {name}=\"{}\"", escape(value));
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
