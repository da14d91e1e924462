//! Host-facing translation API.
//!
//! A [`Translator`] stacks the catalogues of one language and answers
//! `tr`-style lookups. Lookups never fail: anything without an approved
//! translation displays the source string.

use std::sync::Arc;

use crate::catalog::language::catalog_language;
use crate::catalog::plural::{
    PluralRule,
    substitute_count,
};
use crate::catalog::{
    Catalog,
    FallbackReason,
    LookupTable,
    Resolution,
    TranslationText,
};
use crate::config::LookupConfig;

#[derive(Debug, Clone)]
pub struct Translator {
    language: Option<String>,
    /// Earlier tables take precedence.
    tables: Vec<LookupTable>,
    config: LookupConfig,
    plural_rule: PluralRule,
}

impl Translator {
    /// Creates a translator over `catalogs`, consulted in order.
    ///
    /// The plural rule follows `language`; without one, English-like rules
    /// apply.
    #[must_use]
    pub fn new(
        language: Option<String>,
        catalogs: impl IntoIterator<Item = Arc<Catalog>>,
        config: LookupConfig,
    ) -> Self {
        let tables: Vec<LookupTable> = catalogs.into_iter().map(LookupTable::new).collect();
        let plural_rule =
            language.as_deref().map_or(PluralRule::EnglishLike, PluralRule::for_language);
        tracing::debug!(
            language = language.as_deref().unwrap_or("<none>"),
            catalogs = tables.len(),
            "Created translator"
        );
        Self { language, tables, config, plural_rule }
    }

    /// Creates a translator over a single catalogue, using its declared language.
    #[must_use]
    pub fn from_catalog(catalog: Catalog, config: LookupConfig) -> Self {
        let language = catalog_language(&catalog, None);
        Self::new(language, [Arc::new(catalog)], config)
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    #[must_use]
    pub const fn plural_rule(&self) -> PluralRule {
        self.plural_rule
    }

    /// An empty context stands for the configured default context.
    fn effective_context<'c>(&'c self, context: &'c str) -> &'c str {
        if context.is_empty() {
            self.config.default_context.as_deref().unwrap_or(context)
        } else {
            context
        }
    }

    /// Full lookup result, for callers that flag provisional or fallback text.
    ///
    /// The first catalogue with an approved translation wins. When none has
    /// one, the most informative non-final result is returned: a provisional
    /// translation, then a fallback that names a concrete reason, then
    /// "message not found", then "context not found".
    #[must_use]
    pub fn resolve<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: Option<&str>,
    ) -> Resolution<'a> {
        let context = self.effective_context(context);
        let mut best: Option<Resolution<'a>> = None;

        for table in &self.tables {
            let resolution = table.resolve(context, source, comment, self.config.use_unfinished);
            if resolution.is_final() {
                return resolution;
            }
            best = match best {
                Some(previous) if rank(previous) >= rank(resolution) => Some(previous),
                _ => Some(resolution),
            };
        }

        let resolution =
            best.unwrap_or(Resolution::Fallback { source, reason: FallbackReason::MissingContext });
        if let Some(reason) = resolution.fallback_reason() {
            tracing::debug!(context, source, %reason, "Falling back to source text");
        }
        resolution
    }

    /// Display text for `source` in `context`, or `source` itself.
    ///
    /// Numerus messages yield their first form with `%n` left in place; use
    /// [`Self::translate_n`] for those.
    #[must_use]
    pub fn translate<'a>(&'a self, context: &str, source: &'a str) -> &'a str {
        self.resolve(context, source, None).text()
    }

    /// Original and display text, the shape processing algorithms report
    /// their names in.
    #[must_use]
    pub fn translate_pair<'a>(&'a self, context: &str, source: &'a str) -> (&'a str, &'a str) {
        (source, self.translate(context, source))
    }

    /// Numerus lookup: picks the plural form for `n` and substitutes `%n`.
    ///
    /// Missing or empty forms fall back to the source string.
    #[must_use]
    pub fn translate_n(&self, context: &str, source: &str, n: u64) -> String {
        let resolution = self.resolve(context, source, None);
        let text = match resolution.message().map(|message| &message.translation.text) {
            Some(TranslationText::Numerus(forms)) => forms
                .get(self.plural_rule.form_index(n))
                .or_else(|| forms.last())
                .map(String::as_str)
                .filter(|form| !form.is_empty())
                .unwrap_or(source),
            Some(TranslationText::Plain(text)) => text.as_str(),
            None => source,
        };
        substitute_count(text, n)
    }
}

/// Preference order among non-final results.
const fn rank(resolution: Resolution<'_>) -> u8 {
    match resolution {
        Resolution::Translated(_) => 4,
        Resolution::Provisional(_) => 3,
        Resolution::Fallback { reason: FallbackReason::MissingContext, .. } => 0,
        Resolution::Fallback { reason: FallbackReason::MissingMessage, .. } => 1,
        Resolution::Fallback { .. } => 2,
    }
}
