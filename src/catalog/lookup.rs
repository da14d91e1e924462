//! Translation lookup table.
//!
//! Indexes a [`Catalog`] by (context, source, comment) and resolves keys to
//! display text. Anything that is not an approved, non-empty translation
//! resolves to a [`Resolution::Fallback`] carrying the source string and the
//! reason, so that callers can always show something and can flag what is
//! not final.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::model::{
    Catalog,
    Message,
    TranslationStatus,
};

/// Why a lookup did not produce a final translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackReason {
    /// No context with that name.
    MissingContext,
    /// The context exists but has no message with that source.
    MissingMessage,
    /// The translation is not approved yet.
    Unfinished,
    Obsolete,
    Vanished,
    /// The translation is approved but empty.
    Empty,
    /// The key appears more than once with differing translations.
    Conflict,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MissingContext => "context not found",
            Self::MissingMessage => "message not found",
            Self::Unfinished => "translation is unfinished",
            Self::Obsolete => "translation is obsolete",
            Self::Vanished => "translation has vanished from the sources",
            Self::Empty => "translation is empty",
            Self::Conflict => "duplicate message with conflicting translations",
        };
        f.write_str(text)
    }
}

/// Outcome of a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Approved translation.
    Translated(&'a Message),
    /// Unfinished translation returned because the caller allowed it.
    Provisional(&'a Message),
    /// No usable translation; display the source string.
    Fallback { source: &'a str, reason: FallbackReason },
}

impl<'a> Resolution<'a> {
    /// Text to display: the translation, or the source string on fallback.
    #[must_use]
    pub fn text(&self) -> &'a str {
        match *self {
            Self::Translated(message) | Self::Provisional(message) => {
                message.translation.text.as_plain()
            }
            Self::Fallback { source, .. } => source,
        }
    }

    /// True only for approved translations.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(self, Self::Translated(_))
    }

    #[must_use]
    pub const fn fallback_reason(&self) -> Option<FallbackReason> {
        match *self {
            Self::Fallback { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// The message backing the translation, if any.
    #[must_use]
    pub const fn message(&self) -> Option<&'a Message> {
        match *self {
            Self::Translated(message) | Self::Provisional(message) => Some(message),
            Self::Fallback { .. } => None,
        }
    }
}

/// Position of a message inside its catalogue: (context index, message index).
type MessageRef = (usize, usize);

/// Read-only index over one catalogue.
#[derive(Debug, Clone)]
pub struct LookupTable {
    catalog: Arc<Catalog>,
    /// context name -> source -> messages sharing that source (one per comment
    /// unless the catalogue has duplicates).
    index: HashMap<String, HashMap<String, Vec<MessageRef>>>,
}

impl LookupTable {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let mut index: HashMap<String, HashMap<String, Vec<MessageRef>>> = HashMap::new();
        for (context_index, context) in catalog.contexts.iter().enumerate() {
            let messages = index.entry(context.name.clone()).or_default();
            for (message_index, message) in context.messages.iter().enumerate() {
                messages
                    .entry(message.source.clone())
                    .or_default()
                    .push((context_index, message_index));
            }
        }
        Self { catalog, index }
    }

    #[must_use]
    pub const fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    #[must_use]
    pub fn contains_context(&self, context: &str) -> bool {
        self.index.contains_key(context)
    }

    fn message(&self, (context_index, message_index): MessageRef) -> Option<&Message> {
        self.catalog.contexts.get(context_index)?.messages.get(message_index)
    }

    /// All messages stored under a key, duplicates included.
    #[must_use]
    pub fn entries(&self, context: &str, source: &str, comment: Option<&str>) -> Vec<&Message> {
        self.index
            .get(context)
            .and_then(|messages| messages.get(source))
            .map(|refs| {
                refs.iter()
                    .filter_map(|&message_ref| self.message(message_ref))
                    .filter(|message| message.comment.as_deref() == comment)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resolves a key.
    ///
    /// Unfinished translations resolve to [`Resolution::Provisional`] when
    /// `use_unfinished` is set and their text is not empty; otherwise to a
    /// fallback.
    #[must_use]
    pub fn resolve<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: Option<&str>,
        use_unfinished: bool,
    ) -> Resolution<'a> {
        let fallback = |reason| Resolution::Fallback { source, reason };

        if !self.contains_context(context) {
            return fallback(FallbackReason::MissingContext);
        }
        let mut candidates = self.entries(context, source, comment);
        // Retired copies only matter when nothing live is left.
        if candidates.iter().any(|message| !message.translation.status.is_retired()) {
            candidates.retain(|message| !message.translation.status.is_retired());
        }

        let Some((first, rest)) = candidates.split_first() else {
            return fallback(FallbackReason::MissingMessage);
        };
        // Duplicates are only harmless when they agree byte-for-byte.
        if rest.iter().any(|other| other.translation != first.translation) {
            tracing::debug!(context, source, "Conflicting duplicate messages");
            return fallback(FallbackReason::Conflict);
        }

        let message = *first;
        match message.translation.status {
            TranslationStatus::Finished if message.translation.is_empty() => {
                fallback(FallbackReason::Empty)
            }
            TranslationStatus::Finished => Resolution::Translated(message),
            TranslationStatus::Unfinished if use_unfinished && !message.translation.is_empty() => {
                Resolution::Provisional(message)
            }
            TranslationStatus::Unfinished => fallback(FallbackReason::Unfinished),
            TranslationStatus::Obsolete => fallback(FallbackReason::Obsolete),
            TranslationStatus::Vanished => fallback(FallbackReason::Vanished),
        }
    }
}
