//! 診断メッセージ生成モジュール
//!
//! Checks a parsed catalogue for entries that would not display as intended:
//! duplicates, pending or retired translations, empty text, argument markers
//! that do not line up, and plural form counts.

use std::collections::{
    BTreeSet,
    HashMap,
};
use std::fmt;

use crate::catalog::plural::PluralRule;
use crate::catalog::{
    Catalog,
    Message,
    TranslationStatus,
    TranslationText,
};
use crate::config::{
    DiagnosticsConfig,
    Severity,
};
use crate::types::SourcePosition;

/// Kind of problem reported by a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    DuplicateMessage,
    Unfinished,
    Obsolete,
    EmptyTranslation,
    PlaceholderMismatch,
    NumerusForms,
    MissingLanguage,
}

impl DiagnosticCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateMessage => "duplicate-message",
            Self::Unfinished => "unfinished",
            Self::Obsolete => "obsolete",
            Self::EmptyTranslation => "empty-translation",
            Self::PlaceholderMismatch => "placeholder-mismatch",
            Self::NumerusForms => "numerus-forms",
            Self::MissingLanguage => "missing-language",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    /// Context of the offending message; `None` for catalogue-level findings.
    pub context: Option<String>,
    pub source: Option<String>,
    pub position: Option<SourcePosition>,
    pub message: String,
}

/// Maximum length of a source excerpt quoted in a diagnostic message.
const EXCERPT_MAX_CHARS: usize = 40;

/// カタログの診断メッセージを生成
///
/// The plural rule used by the numerus check comes from the catalogue's
/// `language` attribute; see [`generate_diagnostics_with_language`] to supply
/// one detected elsewhere.
#[must_use]
pub fn generate_diagnostics(catalog: &Catalog, config: &DiagnosticsConfig) -> Vec<Diagnostic> {
    generate_diagnostics_with_language(catalog, catalog.language.as_deref(), config)
}

/// カタログの診断メッセージを生成（言語を指定）
///
/// # Arguments
/// * `catalog` - チェック対象のカタログ
/// * `language` - 複数形ルールの決定に使う言語（ファイル名から検出したものなど）
/// * `config` - 各チェックの重要度
///
/// # Returns
/// 位置順に並べた診断メッセージのリスト
#[must_use]
pub fn generate_diagnostics_with_language(
    catalog: &Catalog,
    language: Option<&str>,
    config: &DiagnosticsConfig,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let plural_rule = language.map(PluralRule::for_language);

    tracing::debug!(
        language = language.unwrap_or("<none>"),
        contexts = catalog.contexts.len(),
        "Generating catalogue diagnostics"
    );

    if config.missing_language != Severity::Off
        && catalog.language.as_deref().is_none_or(str::is_empty)
    {
        diagnostics.push(Diagnostic {
            severity: config.missing_language,
            code: DiagnosticCode::MissingLanguage,
            context: None,
            source: None,
            position: None,
            message: "Catalogue does not declare its language".to_string(),
        });
    }

    for (context, message) in catalog.messages() {
        check_message(context, message, plural_rule, config, &mut diagnostics);
    }
    check_duplicates(catalog, config, &mut diagnostics);

    // 位置順（位置のないものは先頭）
    diagnostics.sort_by_key(|diagnostic| diagnostic.position);
    diagnostics
}

fn check_message(
    context: &str,
    message: &Message,
    plural_rule: Option<PluralRule>,
    config: &DiagnosticsConfig,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut push = |severity: Severity, code: DiagnosticCode, text: String| {
        if severity != Severity::Off {
            diagnostics.push(Diagnostic {
                severity,
                code,
                context: Some(context.to_string()),
                source: Some(message.source.clone()),
                position: message.position,
                message: text,
            });
        }
    };
    let quoted = excerpt(&message.source);

    match message.translation.status {
        TranslationStatus::Unfinished => {
            push(
                config.unfinished,
                DiagnosticCode::Unfinished,
                format!("Translation of '{quoted}' is unfinished"),
            );
            return;
        }
        TranslationStatus::Obsolete | TranslationStatus::Vanished => {
            let status = message.translation.status.as_attribute().unwrap_or_default();
            push(
                config.obsolete,
                DiagnosticCode::Obsolete,
                format!("Translation of '{quoted}' is {status}"),
            );
            return;
        }
        TranslationStatus::Finished => {}
    }

    if message.translation.is_empty() {
        push(
            config.empty_translations,
            DiagnosticCode::EmptyTranslation,
            format!("Translation of '{quoted}' is empty"),
        );
        return;
    }

    let expected = placeholders(&message.source);
    let forms: Vec<&str> = match &message.translation.text {
        TranslationText::Plain(text) => vec![text.as_str()],
        TranslationText::Numerus(forms) => forms.iter().map(String::as_str).collect(),
    };
    if let Some(form) = forms.iter().find(|form| placeholders(form) != expected) {
        push(
            config.placeholders,
            DiagnosticCode::PlaceholderMismatch,
            format!(
                "Arguments of '{quoted}' ({}) do not match its translation '{}' ({})",
                describe_placeholders(&expected),
                excerpt(form),
                describe_placeholders(&placeholders(form)),
            ),
        );
    }

    if message.numerus
        && let Some(rule) = plural_rule
        && forms.len() != rule.form_count()
    {
        push(
            config.numerus_forms,
            DiagnosticCode::NumerusForms,
            format!(
                "Translation of '{quoted}' has {} plural form(s), expected {} ({rule})",
                forms.len(),
                rule.form_count(),
            ),
        );
    }
}

/// 重複メッセージのチェック
///
/// Messages sharing (context, source, comment) are reported from the second
/// occurrence on. Retired copies are ignored when a live one exists, the way
/// lookups ignore them.
fn check_duplicates(
    catalog: &Catalog,
    config: &DiagnosticsConfig,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut groups: HashMap<(&str, &str, Option<&str>), Vec<&Message>> = HashMap::new();
    let mut order = Vec::new();
    for (context, message) in catalog.messages() {
        let key = (context, message.source.as_str(), message.comment.as_deref());
        let group = groups.entry(key).or_default();
        if group.is_empty() {
            order.push(key);
        }
        group.push(message);
    }

    for key in order {
        let Some(group) = groups.get(&key) else {
            continue;
        };
        let live: Vec<&Message> =
            group.iter().copied().filter(|m| !m.translation.status.is_retired()).collect();
        let relevant = if live.is_empty() { group.clone() } else { live };
        let Some((first, rest)) = relevant.split_first() else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }

        let conflicting = rest.iter().any(|other| other.translation != first.translation);
        let severity = if conflicting { Severity::Error } else { config.duplicates };
        if severity == Severity::Off {
            continue;
        }

        let (context, source, _) = key;
        for duplicate in rest {
            let message = if conflicting {
                format!(
                    "'{}' appears more than once in '{context}' with different translations",
                    excerpt(source)
                )
            } else {
                format!("'{}' appears more than once in '{context}'", excerpt(source))
            };
            diagnostics.push(Diagnostic {
                severity,
                code: DiagnosticCode::DuplicateMessage,
                context: Some(context.to_string()),
                source: Some(source.to_string()),
                position: duplicate.position,
                message,
            });
        }
    }
}

/// Collects the `%1`..`%99` argument markers in `text`; `%L1` counts as `%1`.
fn placeholders(text: &str) -> BTreeSet<u8> {
    let mut markers = BTreeSet::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            continue;
        }
        if chars.peek() == Some(&'L') {
            chars.next();
        }
        let mut number: u8 = 0;
        let mut digits = 0;
        while digits < 2
            && let Some(digit) = chars.peek().and_then(|d| d.to_digit(10))
        {
            chars.next();
            number = number * 10 + u8::try_from(digit).unwrap_or_default();
            digits += 1;
        }
        if number > 0 {
            markers.insert(number);
        }
    }
    markers
}

fn describe_placeholders(markers: &BTreeSet<u8>) -> String {
    if markers.is_empty() {
        return "none".to_string();
    }
    markers.iter().map(|n| format!("%{n}")).collect::<Vec<_>>().join(", ")
}

/// First line of `text`, shortened for display.
fn excerpt(text: &str) -> String {
    let line = text.trim().lines().next().unwrap_or_default().trim_end();
    if line.chars().count() > EXCERPT_MAX_CHARS {
        let shortened: String = line.chars().take(EXCERPT_MAX_CHARS).collect();
        format!("{shortened}...")
    } else {
        line.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::catalog::Translation;
    use crate::test_utils::{
        catalog_with,
        positioned,
    };

    fn codes(diagnostics: &[Diagnostic]) -> Vec<DiagnosticCode> {
        diagnostics.iter().map(|d| d.code).collect()
    }

    #[googletest::test]
    fn test_generate_diagnostics_clean_catalog() {
        let catalog = catalog_with(
            Some("fr"),
            &[("MorphALPolygonIndicators", vec![
                Message::new("Area", "Aire"),
                Message::new("Perimeter", "Périmètre"),
            ])],
        );

        let diagnostics = generate_diagnostics(&catalog, &DiagnosticsConfig::default());

        expect_that!(diagnostics, is_empty());
    }

    #[googletest::test]
    fn test_generate_diagnostics_missing_language() {
        let catalog =
            catalog_with(None, &[("MorphALPolygonIndicators", vec![Message::new("Area", "Aire")])]);

        let diagnostics = generate_diagnostics(&catalog, &DiagnosticsConfig::default());

        expect_that!(
            diagnostics,
            elements_are![all![
                field!(Diagnostic.code, eq(&DiagnosticCode::MissingLanguage)),
                field!(Diagnostic.severity, eq(&Severity::Warning)),
                field!(Diagnostic.context, none())
            ]]
        );
    }

    #[googletest::test]
    fn test_generate_diagnostics_status_checks() {
        let catalog = catalog_with(
            Some("fr"),
            &[("MorphALGeometryToSegments", vec![
                positioned(
                    Message::new("Geometries to segments", "Lignes ou polygones vers segments")
                        .with_status(TranslationStatus::Unfinished),
                    3,
                ),
                positioned(
                    Message::new("Compute", "Calcule").with_status(TranslationStatus::Obsolete),
                    9,
                ),
                positioned(Message::new("Radian", ""), 15),
            ])],
        );

        let diagnostics = generate_diagnostics(&catalog, &DiagnosticsConfig::default());

        expect_that!(
            diagnostics,
            elements_are![
                all![
                    field!(Diagnostic.code, eq(&DiagnosticCode::Unfinished)),
                    field!(Diagnostic.severity, eq(&Severity::Warning)),
                    field!(Diagnostic.message, contains_substring("Geometries to segments"))
                ],
                all![
                    field!(Diagnostic.code, eq(&DiagnosticCode::Obsolete)),
                    field!(Diagnostic.severity, eq(&Severity::Hint)),
                    field!(Diagnostic.message, contains_substring("is obsolete"))
                ],
                all![
                    field!(Diagnostic.code, eq(&DiagnosticCode::EmptyTranslation)),
                    field!(Diagnostic.severity, eq(&Severity::Error)),
                    field!(Diagnostic.source, some(eq("Radian")))
                ]
            ]
        );
    }

    #[googletest::test]
    fn test_generate_diagnostics_severity_off_disables_check() {
        let catalog = catalog_with(
            None,
            &[("MorphALGeometryToSegments", vec![
                Message::new("Geometries to segments", "")
                    .with_status(TranslationStatus::Unfinished),
            ])],
        );
        let config = DiagnosticsConfig {
            unfinished: Severity::Off,
            missing_language: Severity::Off,
            ..DiagnosticsConfig::default()
        };

        let diagnostics = generate_diagnostics(&catalog, &config);

        expect_that!(diagnostics, is_empty());
    }

    #[googletest::test]
    fn test_generate_diagnostics_identical_duplicate_is_warning() {
        let catalog = catalog_with(
            Some("fr"),
            &[("MorphALPolygonIndicators", vec![
                positioned(Message::new("Area", "Aire"), 4),
                positioned(Message::new("Area", "Aire"), 8),
            ])],
        );

        let diagnostics = generate_diagnostics(&catalog, &DiagnosticsConfig::default());

        expect_that!(
            diagnostics,
            elements_are![all![
                field!(Diagnostic.code, eq(&DiagnosticCode::DuplicateMessage)),
                field!(Diagnostic.severity, eq(&Severity::Warning)),
                field!(Diagnostic.position, some(field!(SourcePosition.line, eq(&8))))
            ]]
        );
    }

    #[googletest::test]
    fn test_generate_diagnostics_conflicting_duplicate_is_error() {
        let catalog = catalog_with(
            Some("fr"),
            &[("MorphALSegmentOrientation", vec![
                Message::new("Input layer", "Couche source"),
                Message::new("Input layer", "Couche d'entrée"),
            ])],
        );
        let config = DiagnosticsConfig { duplicates: Severity::Off, ..DiagnosticsConfig::default() };

        let diagnostics = generate_diagnostics(&catalog, &config);

        expect_that!(
            diagnostics,
            elements_are![all![
                field!(Diagnostic.code, eq(&DiagnosticCode::DuplicateMessage)),
                field!(Diagnostic.severity, eq(&Severity::Error)),
                field!(Diagnostic.message, contains_substring("different translations"))
            ]]
        );
    }

    #[googletest::test]
    fn test_generate_diagnostics_duplicates_across_contexts_are_fine() {
        let catalog = catalog_with(
            Some("fr"),
            &[
                ("MorphALPolygonIndicators", vec![Message::new("Input layer", "Couche source")]),
                ("MorphALSegmentOrientation", vec![Message::new("Input layer", "Couche d'entrée")]),
            ],
        );

        let diagnostics = generate_diagnostics(&catalog, &DiagnosticsConfig::default());

        expect_that!(diagnostics, is_empty());
    }

    #[googletest::test]
    fn test_generate_diagnostics_retired_duplicate_is_ignored() {
        let catalog = catalog_with(
            Some("fr"),
            &[("MorphALPolygonIndicators", vec![
                Message::new("Area", "Aire"),
                Message::new("Area", "Surface").with_status(TranslationStatus::Vanished),
            ])],
        );
        let config = DiagnosticsConfig { obsolete: Severity::Off, ..DiagnosticsConfig::default() };

        let diagnostics = generate_diagnostics(&catalog, &config);

        expect_that!(diagnostics, is_empty());
    }

    #[rstest]
    #[case("Layer %1 has %2 features", "La couche %1 a %2 entités", false)]
    #[case("Layer %1 has %2 features", "%2 entités dans %1", false)]
    #[case("Layer %1", "Couche %L1", false)]
    #[case("Layer %1", "Couche", true)]
    #[case("Layer", "Couche %1", true)]
    #[case("Field %10", "Champ %1", true)]
    #[case("100% done", "100 % fait", false)]
    fn test_placeholder_mismatch(
        #[case] source: &str,
        #[case] translation: &str,
        #[case] mismatch: bool,
    ) {
        let catalog =
            catalog_with(Some("fr"), &[("MorphALUtils", vec![Message::new(source, translation)])]);

        let diagnostics = generate_diagnostics(&catalog, &DiagnosticsConfig::default());

        let expected =
            if mismatch { vec![DiagnosticCode::PlaceholderMismatch] } else { Vec::new() };
        assert_eq!(codes(&diagnostics), expected);
    }

    #[rstest]
    #[case("fr", 2, false)]
    #[case("fr", 3, true)]
    #[case("ru", 3, false)]
    #[case("ja", 2, true)]
    fn test_numerus_form_count(#[case] language: &str, #[case] forms: usize, #[case] bad: bool) {
        let mut message = Message::new("%n segment(s)", "");
        message.numerus = true;
        message.translation = Translation {
            status: TranslationStatus::Finished,
            text: TranslationText::Numerus(vec!["%n segment".to_string(); forms]),
        };
        let catalog = catalog_with(Some(language), &[("MorphALGeometryToSegments", vec![message])]);

        let diagnostics = generate_diagnostics(&catalog, &DiagnosticsConfig::default());

        let expected = if bad { vec![DiagnosticCode::NumerusForms] } else { Vec::new() };
        assert_eq!(codes(&diagnostics), expected);
    }

    #[googletest::test]
    fn test_numerus_check_uses_supplied_language() {
        let mut message = Message::new("%n segment(s)", "");
        message.numerus = true;
        message.translation = Translation {
            status: TranslationStatus::Finished,
            text: TranslationText::Numerus(vec!["%n segment".to_string(), "%n segments".to_string()]),
        };
        let catalog = catalog_with(None, &[("MorphALGeometryToSegments", vec![message])]);
        let config =
            DiagnosticsConfig { missing_language: Severity::Off, ..DiagnosticsConfig::default() };

        expect_that!(generate_diagnostics(&catalog, &config), is_empty());
        expect_that!(
            codes(&generate_diagnostics_with_language(&catalog, Some("pl"), &config)),
            elements_are![eq(&DiagnosticCode::NumerusForms)]
        );
    }

    #[rstest]
    #[case("Area", "Area")]
    #[case("  Convert lines\n  into segments  ", "Convert lines")]
    #[case(
        "Compute the orientation of every segment of the layer",
        "Compute the orientation of every segment..."
    )]
    fn test_excerpt(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(excerpt(text), expected);
    }

    #[googletest::test]
    fn test_diagnostic_code_names() {
        expect_that!(DiagnosticCode::DuplicateMessage.to_string(), eq("duplicate-message"));
        expect_that!(DiagnosticCode::PlaceholderMismatch.as_str(), eq("placeholder-mismatch"));
    }
}
