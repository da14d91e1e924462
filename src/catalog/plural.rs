//! Plural form selection for numerus messages.
//!
//! Each language family stores its plural forms in a fixed order; the rule
//! maps a count to the index of the form to display.

use std::fmt;

/// Plural rule families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralRule {
    /// A single form (ja, zh, ko, vi, th, id, ...).
    One,
    /// Singular for 1, plural otherwise (default).
    EnglishLike,
    /// Singular for 0 and 1, plural otherwise (fr, pt_BR, ...).
    FrenchLike,
    /// one / few / many, keyed on the last digits (ru, uk, be, sr, hr, bs).
    Slavic,
    /// one / few / many, where only 1 is singular (pl).
    Polish,
    /// one / few (2-4) / other (cs, sk).
    Czech,
}

impl PluralRule {
    /// Picks the rule for a language tag such as `fr`, `pt_BR` or `zh-TW`.
    #[must_use]
    pub fn for_language(tag: &str) -> Self {
        let normalized = tag.replace('-', "_").to_lowercase();
        let primary = normalized.split('_').next().unwrap_or_default();

        match (primary, normalized.as_str()) {
            (_, "pt_br") => Self::FrenchLike,
            ("ja" | "zh" | "ko" | "vi" | "th" | "id" | "ms" | "lo" | "my" | "km", _) => Self::One,
            ("fr" | "hy" | "ff" | "kab", _) => Self::FrenchLike,
            ("ru" | "uk" | "be" | "sr" | "hr" | "bs", _) => Self::Slavic,
            ("pl", _) => Self::Polish,
            ("cs" | "sk", _) => Self::Czech,
            _ => Self::EnglishLike,
        }
    }

    /// Number of plural forms a complete translation carries.
    #[must_use]
    pub const fn form_count(self) -> usize {
        match self {
            Self::One => 1,
            Self::EnglishLike | Self::FrenchLike => 2,
            Self::Slavic | Self::Polish | Self::Czech => 3,
        }
    }

    /// Index of the form to use for `n`.
    #[must_use]
    pub const fn form_index(self, n: u64) -> usize {
        let (mod10, mod100) = (n % 10, n % 100);
        match self {
            Self::One => 0,
            Self::EnglishLike => {
                if n == 1 { 0 } else { 1 }
            }
            Self::FrenchLike => {
                if n > 1 { 1 } else { 0 }
            }
            Self::Slavic => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if mod10 >= 2 && mod10 <= 4 && (mod100 < 12 || mod100 > 14) {
                    1
                } else {
                    2
                }
            }
            Self::Polish => {
                if n == 1 {
                    0
                } else if mod10 >= 2 && mod10 <= 4 && (mod100 < 12 || mod100 > 14) {
                    1
                } else {
                    2
                }
            }
            Self::Czech => {
                if n == 1 {
                    0
                } else if n >= 2 && n <= 4 {
                    1
                } else {
                    2
                }
            }
        }
    }
}

impl fmt::Display for PluralRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::One => "single form",
            Self::EnglishLike => "singular for 1",
            Self::FrenchLike => "singular for 0 and 1",
            Self::Slavic => "Slavic one/few/many",
            Self::Polish => "Polish one/few/many",
            Self::Czech => "Czech one/few/other",
        };
        f.write_str(name)
    }
}

/// Replaces every `%n` and `%Ln` in `text` with `n`.
///
/// `%Ln` asks for locale-aware digits; the count is written without digit
/// grouping either way.
#[must_use]
pub fn substitute_count(text: &str, n: u64) -> String {
    let count = n.to_string();
    text.replace("%Ln", &count).replace("%n", &count)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("fr", PluralRule::FrenchLike)]
    #[case("fr_CA", PluralRule::FrenchLike)]
    #[case("pt_BR", PluralRule::FrenchLike)]
    #[case("pt-BR", PluralRule::FrenchLike)]
    #[case("pt", PluralRule::EnglishLike)]
    #[case("en", PluralRule::EnglishLike)]
    #[case("de_DE", PluralRule::EnglishLike)]
    #[case("ja", PluralRule::One)]
    #[case("zh-TW", PluralRule::One)]
    #[case("ru", PluralRule::Slavic)]
    #[case("pl", PluralRule::Polish)]
    #[case("cs", PluralRule::Czech)]
    #[case("", PluralRule::EnglishLike)]
    fn test_for_language(#[case] tag: &str, #[case] expected: PluralRule) {
        assert_eq!(PluralRule::for_language(tag), expected);
    }

    #[rstest]
    #[case(PluralRule::FrenchLike, 0, 0)]
    #[case(PluralRule::FrenchLike, 1, 0)]
    #[case(PluralRule::FrenchLike, 2, 1)]
    #[case(PluralRule::EnglishLike, 0, 1)]
    #[case(PluralRule::EnglishLike, 1, 0)]
    #[case(PluralRule::EnglishLike, 7, 1)]
    #[case(PluralRule::One, 42, 0)]
    #[case(PluralRule::Slavic, 1, 0)]
    #[case(PluralRule::Slavic, 21, 0)]
    #[case(PluralRule::Slavic, 11, 2)]
    #[case(PluralRule::Slavic, 3, 1)]
    #[case(PluralRule::Slavic, 13, 2)]
    #[case(PluralRule::Slavic, 25, 2)]
    #[case(PluralRule::Polish, 1, 0)]
    #[case(PluralRule::Polish, 21, 2)]
    #[case(PluralRule::Polish, 22, 1)]
    #[case(PluralRule::Czech, 3, 1)]
    #[case(PluralRule::Czech, 5, 2)]
    fn test_form_index(#[case] rule: PluralRule, #[case] n: u64, #[case] expected: usize) {
        assert_eq!(rule.form_index(n), expected);
        assert!(rule.form_index(n) < rule.form_count());
    }

    #[rstest]
    #[case("%n segments", 3, "3 segments")]
    #[case("%n / %n", 2, "2 / 2")]
    #[case("no count", 5, "no count")]
    #[case("%Ln entités", 1500, "1500 entités")]
    #[case("%n sur %Ln", 4, "4 sur 4")]
    #[case("100%", 3, "100%")]
    fn test_substitute_count(#[case] text: &str, #[case] n: u64, #[case] expected: &str) {
        assert_eq!(substitute_count(text, n), expected);
    }
}
