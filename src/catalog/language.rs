//! Catalogue language detection.

use std::path::Path;

use super::model::Catalog;

/// Returns true for tags shaped like `fr`, `kab`, `pt_BR` or `zh-Hant-TW`.
fn looks_like_language_tag(tag: &str) -> bool {
    let mut parts = tag.split(['_', '-']);
    let Some(primary) = parts.next() else {
        return false;
    };
    (2..=3).contains(&primary.len())
        && primary.chars().all(|c| c.is_ascii_lowercase())
        && parts.all(|part| {
            (2..=4).contains(&part.len()) && part.chars().all(|c| c.is_ascii_alphanumeric())
        })
}

/// Detects the language from a catalogue file name.
///
/// Catalogues are named `<prefix>_<language>.ts`; the language is the
/// longest part after an underscore that forms a language tag. A bare
/// `<language>.ts` stem is only used when no such suffix exists, so short
/// prefixes like `qt_` are not mistaken for a language.
///
/// # Examples
/// - `resources/i18n/morphal_fr.ts` -> `fr`
/// - `i18n/app_pt_BR.ts` -> `pt_BR`
/// - `i18n/qt_fr.ts` -> `fr`
/// - `i18n/fr.ts` -> `fr`
/// - `i18n/morphal.ts` -> `None`
#[must_use]
pub fn detect_language_from_path(file_path: &Path) -> Option<String> {
    let stem = file_path.file_stem()?.to_str()?;

    stem.match_indices('_')
        .filter_map(|(index, _)| stem.get(index + 1..))
        .find(|candidate| looks_like_language_tag(candidate))
        .or_else(|| looks_like_language_tag(stem).then_some(stem))
        .map(str::to_string)
}

/// Language of a catalogue: the declared one, else the one in its file name.
#[must_use]
pub fn catalog_language(catalog: &Catalog, file_path: Option<&Path>) -> Option<String> {
    catalog
        .language
        .clone()
        .filter(|language| !language.is_empty())
        .or_else(|| file_path.and_then(detect_language_from_path))
}

/// Normalize language code (lowercase and replace - with _)
#[must_use]
pub fn normalize_language_code(code: &str) -> String {
    code.to_lowercase().replace('-', "_")
}
