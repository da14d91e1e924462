//! Translation catalogue data model.

use std::fmt;
use std::str::FromStr;

use crate::types::SourcePosition;

/// Default format version written by the extraction tooling.
pub const DEFAULT_VERSION: &str = "2.1";

/// An ordered collection of contexts, as read from one catalogue file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    /// Format version of the root element (e.g. `2.1`).
    pub version: String,
    /// Target language of the translations (e.g. `fr`).
    pub language: Option<String>,
    /// Language of the source strings, when declared.
    pub source_language: Option<String>,
    pub contexts: Vec<Context>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            language: None,
            source_language: None,
            contexts: Vec::new(),
        }
    }
}

impl Catalog {
    #[must_use]
    pub fn new(language: Option<String>) -> Self {
        Self { language, ..Self::default() }
    }

    /// Returns the first context with the given name.
    #[must_use]
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|context| context.name == name)
    }

    /// Iterates over every message together with the name of its context.
    pub fn messages(&self) -> impl Iterator<Item = (&str, &Message)> {
        self.contexts
            .iter()
            .flat_map(|context| context.messages.iter().map(|m| (context.name.as_str(), m)))
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|context| context.messages.len()).sum()
    }

    /// Message counts by translation status.
    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats { contexts: self.contexts.len(), ..CatalogStats::default() };
        for (_, message) in self.messages() {
            stats.messages += 1;
            match message.translation.status {
                TranslationStatus::Finished if message.translation.is_empty() => stats.empty += 1,
                TranslationStatus::Finished => stats.finished += 1,
                TranslationStatus::Unfinished => stats.unfinished += 1,
                TranslationStatus::Obsolete | TranslationStatus::Vanished => stats.retired += 1,
            }
        }
        stats
    }
}

/// Summary counts of a catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogStats {
    pub contexts: usize,
    pub messages: usize,
    /// Finished, non-empty translations.
    pub finished: usize,
    /// Finished translations with no text.
    pub empty: usize,
    pub unfinished: usize,
    /// Obsolete and vanished translations.
    pub retired: usize,
}

/// A named group of messages, typically one processing algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Context {
    pub name: String,
    pub messages: Vec<Message>,
}

impl Context {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), messages: Vec::new() }
    }
}

/// One source string, its translation and the metadata attached to them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    /// Where the source string was extracted from. Informational only.
    pub locations: Vec<Location>,
    /// Original-language text; the lookup key.
    pub source: String,
    /// Disambiguation comment; part of the lookup key.
    pub comment: Option<String>,
    pub old_source: Option<String>,
    pub extra_comment: Option<String>,
    pub translator_comment: Option<String>,
    /// Whether the message carries plural forms.
    pub numerus: bool,
    pub translation: Translation,
    /// Position of the `<message>` element in the parsed file.
    pub position: Option<SourcePosition>,
}

impl Message {
    /// Creates a finished message with a plain translation.
    #[must_use]
    pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            translation: Translation::finished(translation),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: TranslationStatus) -> Self {
        self.translation.status = status;
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }
}

/// Provenance of a source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub filename: Option<String>,
    pub line: Option<LineRef>,
}

impl Location {
    #[must_use]
    pub fn new(filename: impl Into<String>, line: u32) -> Self {
        Self { filename: Some(filename.into()), line: Some(LineRef::Absolute(line)) }
    }
}

/// Line reference of a [`Location`].
///
/// Extraction tooling in relative mode writes line numbers as offsets from
/// the previous location (`+5`, `-2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRef {
    Absolute(u32),
    Relative(i32),
}

impl fmt::Display for LineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(line) => write!(f, "{line}"),
            Self::Relative(delta) => write!(f, "{delta:+}"),
        }
    }
}

impl FromStr for LineRef {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with(['+', '-']) {
            s.parse().map(Self::Relative)
        } else {
            s.parse().map(Self::Absolute)
        }
    }
}

/// The translated side of a message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Translation {
    pub status: TranslationStatus,
    pub text: TranslationText,
}

impl Translation {
    #[must_use]
    pub fn finished(text: impl Into<String>) -> Self {
        Self { status: TranslationStatus::Finished, text: TranslationText::Plain(text.into()) }
    }

    /// True when every form of the translation is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.text {
            TranslationText::Plain(text) => text.is_empty(),
            TranslationText::Numerus(forms) => forms.iter().all(String::is_empty),
        }
    }
}

/// Translation text: a single string, or one string per plural form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationText {
    Plain(String),
    Numerus(Vec<String>),
}

impl Default for TranslationText {
    fn default() -> Self {
        Self::Plain(String::new())
    }
}

impl TranslationText {
    /// Returns the plain text, or the first plural form.
    #[must_use]
    pub fn as_plain(&self) -> &str {
        match self {
            Self::Plain(text) => text,
            Self::Numerus(forms) => forms.first().map_or("", String::as_str),
        }
    }
}

/// Review status of a translation.
///
/// `Finished` is the default: no `type` attribute on the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TranslationStatus {
    #[default]
    Finished,
    /// Not yet approved for display.
    Unfinished,
    /// No longer referenced by current source strings.
    Obsolete,
    /// Removed from the sources since the last extraction run.
    Vanished,
}

impl TranslationStatus {
    /// Value of the `type` attribute, `None` for finished translations.
    #[must_use]
    pub const fn as_attribute(self) -> Option<&'static str> {
        match self {
            Self::Finished => None,
            Self::Unfinished => Some("unfinished"),
            Self::Obsolete => Some("obsolete"),
            Self::Vanished => Some("vanished"),
        }
    }

    #[must_use]
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "unfinished" => Some(Self::Unfinished),
            "obsolete" => Some(Self::Obsolete),
            "vanished" => Some(Self::Vanished),
            _ => None,
        }
    }

    /// Obsolete and vanished messages are kept for translators only.
    #[must_use]
    pub const fn is_retired(self) -> bool {
        matches!(self, Self::Obsolete | Self::Vanished)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[googletest::test]
    fn test_catalog_stats() {
        let mut context = Context::new("MorphALGeometryToSegments");
        context.messages.extend([
            Message::new("Segments", "Segments"),
            Message::new("Radian", ""),
            Message::new("Geometries to segments", "Lignes ou polygones vers segments")
                .with_status(TranslationStatus::Unfinished),
            Message::new("Compute", "Calcule").with_status(TranslationStatus::Obsolete),
            Message::new("Old", "Ancien").with_status(TranslationStatus::Vanished),
        ]);
        let catalog = Catalog { contexts: vec![context, Context::new("MorphAL")], ..Catalog::default() };

        expect_that!(
            catalog.stats(),
            eq(CatalogStats {
                contexts: 2,
                messages: 5,
                finished: 1,
                empty: 1,
                unfinished: 1,
                retired: 2,
            })
        );
    }

    #[rstest]
    #[case("53", LineRef::Absolute(53))]
    #[case("+5", LineRef::Relative(5))]
    #[case("-2", LineRef::Relative(-2))]
    #[case("+0", LineRef::Relative(0))]
    fn test_line_ref_parse_and_display(#[case] raw: &str, #[case] expected: LineRef) {
        let parsed: LineRef = raw.parse().unwrap();

        assert_that!(parsed, eq(expected));
        assert_that!(parsed.to_string(), eq(raw));
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("+")]
    fn test_line_ref_rejects_garbage(#[case] raw: &str) {
        assert_that!(raw.parse::<LineRef>(), err(anything()));
    }

    #[googletest::test]
    fn test_status_attribute_mapping() {
        expect_that!(TranslationStatus::Finished.as_attribute(), none());
        expect_that!(TranslationStatus::from_attribute("unfinished"), some(eq(TranslationStatus::Unfinished)));
        expect_that!(TranslationStatus::from_attribute("obsolete"), some(eq(TranslationStatus::Obsolete)));
        expect_that!(TranslationStatus::from_attribute("vanished"), some(eq(TranslationStatus::Vanished)));
        expect_that!(TranslationStatus::from_attribute("approved"), none());
        expect_that!(TranslationStatus::Vanished.is_retired(), eq(true));
        expect_that!(TranslationStatus::Unfinished.is_retired(), eq(false));
    }

    #[googletest::test]
    fn test_translation_is_empty() {
        expect_that!(Translation::finished("").is_empty(), eq(true));
        expect_that!(Translation::finished("Aire").is_empty(), eq(false));

        let numerus = Translation {
            status: TranslationStatus::Finished,
            text: TranslationText::Numerus(vec![String::new(), String::new()]),
        };
        expect_that!(numerus.is_empty(), eq(true));
    }

    #[googletest::test]
    fn test_catalog_messages_iterates_in_order() {
        let mut polygon = Context::new("MorphALPolygonIndicators");
        polygon.messages.push(Message::new("Area", "Aire"));
        polygon.messages.push(Message::new("Perimeter", "Périmètre"));
        let mut provider = Context::new("PTM4QgisProvider");
        provider.messages.push(Message::new("PTM-MorphAL", "PTM-MorphAL"));
        let catalog = Catalog {
            contexts: vec![polygon, provider],
            ..Catalog::new(Some("fr".to_string()))
        };

        let keys: Vec<_> = catalog.messages().map(|(ctx, m)| (ctx, m.source.as_str())).collect();

        expect_that!(
            keys,
            elements_are![
                eq(&("MorphALPolygonIndicators", "Area")),
                eq(&("MorphALPolygonIndicators", "Perimeter")),
                eq(&("PTM4QgisProvider", "PTM-MorphAL")),
            ]
        );
        expect_that!(catalog.message_count(), eq(3));
        expect_that!(catalog.context("PTM4QgisProvider"), some(anything()));
        expect_that!(catalog.context("Unknown"), none());
    }
}
