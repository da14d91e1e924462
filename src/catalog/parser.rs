//! Catalogue file reader.
//!
//! Reads the XML translation-source format into a [`Catalog`]. Whitespace
//! between elements is ignored; whitespace inside text elements (`source`,
//! `translation`, ...) is kept byte-for-byte after entity decoding, since
//! multi-line help strings carry literal padding that is part of the lookup
//! key.

use std::fmt::Display;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{
    BytesStart,
    Event,
};

use super::error::CatalogError;
use super::model::{
    Catalog,
    Context,
    DEFAULT_VERSION,
    LineRef,
    Location,
    Message,
    Translation,
    TranslationStatus,
    TranslationText,
};
use crate::types::{
    LineIndex,
    SourcePosition,
};

/// Parses a catalogue document.
///
/// # Examples
/// ```
/// use morphal_i18n::catalog::parse_catalog;
///
/// let catalog = parse_catalog(
///     r#"<TS version="2.1" language="fr">
/// <context>
///     <name>MorphALPolygonIndicators</name>
///     <message>
///         <source>Area</source>
///         <translation>Aire</translation>
///     </message>
/// </context>
/// </TS>"#,
/// )
/// .unwrap();
///
/// assert_eq!(catalog.language.as_deref(), Some("fr"));
/// assert_eq!(catalog.contexts[0].messages[0].translation.text.as_plain(), "Aire");
/// ```
pub fn parse_catalog(input: &str) -> Result<Catalog, CatalogError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    CatalogParser::new(input).parse()
}

/// Reads and parses a catalogue file.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    tracing::debug!(path = %path.display(), "Loading catalogue");
    let content = std::fs::read_to_string(path)
        .map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;

    let catalog = parse_catalog(&content)?;
    tracing::debug!(
        path = %path.display(),
        contexts = catalog.contexts.len(),
        messages = catalog.message_count(),
        "Catalogue loaded"
    );
    Ok(catalog)
}

/// Pull parser over one document.
struct CatalogParser<'a> {
    reader: Reader<&'a [u8]>,
    lines: LineIndex<'a>,
    /// Byte offset at which the last event started.
    event_start: usize,
}

impl<'a> CatalogParser<'a> {
    fn new(input: &'a str) -> Self {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(false);
        Self { reader, lines: LineIndex::new(input), event_start: 0 }
    }

    fn next_event(&mut self) -> Result<Event<'a>, CatalogError> {
        self.event_start = usize::try_from(self.reader.buffer_position()).unwrap_or(usize::MAX);
        self.reader.read_event().map_err(|err| self.xml_error(&err))
    }

    /// Position of the last event read.
    fn position(&self) -> SourcePosition {
        self.lines.position(self.event_start)
    }

    fn xml_error(&self, err: &dyn Display) -> CatalogError {
        let offset = usize::try_from(self.reader.buffer_position()).unwrap_or(usize::MAX);
        CatalogError::Xml { position: self.lines.position(offset), message: err.to_string() }
    }

    fn parse(mut self) -> Result<Catalog, CatalogError> {
        loop {
            match self.next_event()? {
                Event::Start(e) if e.name().as_ref() == b"TS" => {
                    let catalog = self.root_attributes(&e)?;
                    return self.parse_root(catalog);
                }
                Event::Empty(e) if e.name().as_ref() == b"TS" => {
                    return self.root_attributes(&e);
                }
                Event::Start(e) | Event::Empty(e) => {
                    return Err(CatalogError::UnexpectedRoot {
                        found: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                        position: self.position(),
                    });
                }
                Event::Eof => {
                    return Err(CatalogError::MissingElement {
                        element: "TS",
                        parent: "document",
                        position: self.position(),
                    });
                }
                // Declaration, doctype, comments and surrounding whitespace.
                _ => {}
            }
        }
    }

    fn root_attributes(&self, e: &BytesStart<'_>) -> Result<Catalog, CatalogError> {
        Ok(Catalog {
            version: self.attribute(e, b"version")?.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            language: self.attribute(e, b"language")?,
            source_language: self.attribute(e, b"sourcelanguage")?,
            contexts: Vec::new(),
        })
    }

    fn parse_root(&mut self, mut catalog: Catalog) -> Result<Catalog, CatalogError> {
        loop {
            match self.next_event()? {
                Event::Start(e) if e.name().as_ref() == b"context" => {
                    let context = self.parse_context()?;
                    catalog.contexts.push(context);
                }
                Event::Start(e) => {
                    tracing::debug!(
                        element = %String::from_utf8_lossy(e.name().as_ref()),
                        "Skipping unknown element in <TS>"
                    );
                    self.skip(&e)?;
                }
                Event::End(_) => return Ok(catalog),
                Event::Eof => return Err(CatalogError::UnexpectedEof { element: "TS".to_string() }),
                _ => {}
            }
        }
    }

    fn parse_context(&mut self) -> Result<Context, CatalogError> {
        let position = self.position();
        let mut name = None;
        let mut messages = Vec::new();

        loop {
            let (start, is_empty) = match self.next_event()? {
                Event::Start(e) => (e, false),
                Event::Empty(e) => (e, true),
                Event::End(_) => break,
                Event::Eof => {
                    return Err(CatalogError::UnexpectedEof { element: "context".to_string() });
                }
                _ => continue,
            };

            match start.name().as_ref() {
                b"name" => name = Some(self.element_text(is_empty, "name")?),
                b"message" => {
                    let message = self.parse_message(&start, is_empty)?;
                    messages.push(message);
                }
                other => {
                    tracing::debug!(
                        element = %String::from_utf8_lossy(other),
                        "Skipping unknown element in <context>"
                    );
                    if !is_empty {
                        self.skip(&start)?;
                    }
                }
            }
        }

        let name = name.ok_or(CatalogError::MissingElement {
            element: "name",
            parent: "context",
            position,
        })?;
        Ok(Context { name, messages })
    }

    fn parse_message(
        &mut self,
        start: &BytesStart<'_>,
        is_empty: bool,
    ) -> Result<Message, CatalogError> {
        let position = self.position();
        let numerus = self.attribute(start, b"numerus")?.is_some_and(|value| value == "yes");
        let mut message = Message { numerus, position: Some(position), ..Message::default() };
        let mut source = None;
        let mut translation = None;

        if !is_empty {
            loop {
                let (child, child_is_empty) = match self.next_event()? {
                    Event::Start(e) => (e, false),
                    Event::Empty(e) => (e, true),
                    Event::End(_) => break,
                    Event::Eof => {
                        return Err(CatalogError::UnexpectedEof { element: "message".to_string() });
                    }
                    _ => continue,
                };

                match child.name().as_ref() {
                    b"location" => {
                        message.locations.push(self.parse_location(&child)?);
                        if !child_is_empty {
                            self.skip(&child)?;
                        }
                    }
                    b"source" => source = Some(self.element_text(child_is_empty, "source")?),
                    b"oldsource" => {
                        message.old_source = Some(self.element_text(child_is_empty, "oldsource")?);
                    }
                    b"comment" => {
                        message.comment = Some(self.element_text(child_is_empty, "comment")?);
                    }
                    b"extracomment" => {
                        message.extra_comment =
                            Some(self.element_text(child_is_empty, "extracomment")?);
                    }
                    b"translatorcomment" => {
                        message.translator_comment =
                            Some(self.element_text(child_is_empty, "translatorcomment")?);
                    }
                    b"translation" => {
                        translation = Some(self.parse_translation(&child, child_is_empty, numerus)?);
                    }
                    other => {
                        tracing::debug!(
                            element = %String::from_utf8_lossy(other),
                            "Skipping unknown element in <message>"
                        );
                        if !child_is_empty {
                            self.skip(&child)?;
                        }
                    }
                }
            }
        }

        message.source = source.ok_or(CatalogError::MissingElement {
            element: "source",
            parent: "message",
            position,
        })?;
        // A message without a translation element has never been translated.
        message.translation = translation.unwrap_or_else(|| Translation {
            status: TranslationStatus::Unfinished,
            text: if numerus { TranslationText::Numerus(Vec::new()) } else { TranslationText::default() },
        });
        Ok(message)
    }

    fn parse_location(&self, e: &BytesStart<'_>) -> Result<Location, CatalogError> {
        let filename = self.attribute(e, b"filename")?;
        let line = match self.attribute(e, b"line")? {
            Some(raw) => Some(raw.parse::<LineRef>().map_err(|_| {
                CatalogError::InvalidAttribute {
                    attribute: "line",
                    value: raw.clone(),
                    position: self.position(),
                }
            })?),
            None => None,
        };
        Ok(Location { filename, line })
    }

    fn parse_translation(
        &mut self,
        start: &BytesStart<'_>,
        is_empty: bool,
        numerus: bool,
    ) -> Result<Translation, CatalogError> {
        let status = match self.attribute(start, b"type")? {
            None => TranslationStatus::Finished,
            Some(value) => TranslationStatus::from_attribute(&value).ok_or_else(|| {
                CatalogError::InvalidAttribute {
                    attribute: "type",
                    value,
                    position: self.position(),
                }
            })?,
        };

        let text = match (numerus, is_empty) {
            (true, true) => TranslationText::Numerus(Vec::new()),
            (true, false) => TranslationText::Numerus(self.read_numerus_forms()?),
            (false, true) => TranslationText::default(),
            (false, false) => TranslationText::Plain(self.read_text("translation")?),
        };
        Ok(Translation { status, text })
    }

    fn read_numerus_forms(&mut self) -> Result<Vec<String>, CatalogError> {
        let mut forms = Vec::new();
        loop {
            match self.next_event()? {
                Event::Start(e) if e.name().as_ref() == b"numerusform" => {
                    forms.push(self.read_text("numerusform")?);
                }
                Event::Empty(e) if e.name().as_ref() == b"numerusform" => forms.push(String::new()),
                Event::Start(e) => self.skip(&e)?,
                Event::End(_) => return Ok(forms),
                Event::Eof => {
                    return Err(CatalogError::UnexpectedEof { element: "translation".to_string() });
                }
                _ => {}
            }
        }
    }

    fn element_text(&mut self, is_empty: bool, element: &str) -> Result<String, CatalogError> {
        if is_empty { Ok(String::new()) } else { self.read_text(element) }
    }

    /// Reads the text content up to the end of the current element.
    fn read_text(&mut self, element: &str) -> Result<String, CatalogError> {
        let mut text = String::new();
        loop {
            match self.next_event()? {
                Event::Text(t) => {
                    let unescaped = t.unescape().map_err(|err| self.xml_error(&err))?;
                    text.push_str(&unescaped);
                }
                Event::CData(data) => text.push_str(&String::from_utf8_lossy(&data)),
                // Characters that XML 1.0 cannot carry are written as <byte value="x1b"/>.
                Event::Empty(e) if e.name().as_ref() == b"byte" => {
                    if let Some(ch) = self.byte_value(&e)? {
                        text.push(ch);
                    }
                }
                Event::Start(e) => self.skip(&e)?,
                Event::End(_) => return Ok(text),
                Event::Eof => return Err(CatalogError::UnexpectedEof { element: element.to_string() }),
                _ => {}
            }
        }
    }

    fn byte_value(&self, e: &BytesStart<'_>) -> Result<Option<char>, CatalogError> {
        let Some(raw) = self.attribute(e, b"value")? else {
            return Ok(None);
        };
        let code = raw
            .strip_prefix('x')
            .map_or_else(|| raw.parse::<u32>(), |hex| u32::from_str_radix(hex, 16))
            .map_err(|_| CatalogError::InvalidAttribute {
                attribute: "value",
                value: raw.clone(),
                position: self.position(),
            })?;
        Ok(char::from_u32(code))
    }

    fn skip(&mut self, start: &BytesStart<'_>) -> Result<(), CatalogError> {
        self.reader.read_to_end(start.name()).map_err(|err| self.xml_error(&err))?;
        Ok(())
    }

    fn attribute(&self, e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, CatalogError> {
        for attr in e.attributes() {
            let attr = attr.map_err(|err| self.xml_error(&err))?;
            if attr.key.as_ref() == name {
                let value = attr.unescape_value().map_err(|err| self.xml_error(&err))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }
}
