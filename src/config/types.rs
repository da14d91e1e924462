use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

/// Name of the configuration file looked up at the workspace root.
pub const CONFIG_FILE_NAME: &str = ".morphal-i18n.json";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "translationFiles.includePatterns[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct I18nSettings {
    pub translation_files: TranslationFilesConfig,

    /// Paths skipped while walking the workspace, whatever their kind.
    pub exclude_patterns: Vec<String>,

    pub indexing: IndexingConfig,
    pub lookup: LookupConfig,
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexingConfig {
    /// Parallel task count for loading catalogues.
    /// Default: 80% of CPU cores (minimum 1).
    pub num_threads: Option<usize>,
}

impl IndexingConfig {
    /// Configured thread count, or 80% of the available cores.
    #[must_use]
    pub fn effective_num_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(|| (num_cpus::get() * 4 / 5).max(1))
    }
}

/// How lookups treat entries that are not approved.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LookupConfig {
    /// Return unfinished translations as provisional text instead of the
    /// source string.
    pub use_unfinished: bool,

    /// Context used when a lookup passes an empty context name.
    pub default_context: Option<String>,
}

/// Severity of a diagnostic; `off` disables the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Off,
    Hint,
    Information,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Off => "off",
            Self::Hint => "hint",
            Self::Information => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticsConfig {
    /// Duplicate keys whose translations agree. Conflicting duplicates are
    /// always errors.
    pub duplicates: Severity,
    pub unfinished: Severity,
    /// Obsolete and vanished translations.
    pub obsolete: Severity,
    pub empty_translations: Severity,
    pub placeholders: Severity,
    pub numerus_forms: Severity,
    pub missing_language: Severity,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            duplicates: Severity::Warning,
            unfinished: Severity::Warning,
            obsolete: Severity::Hint,
            empty_translations: Severity::Error,
            placeholders: Severity::Warning,
            numerus_forms: Severity::Warning,
            missing_language: Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationFilesConfig {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl I18nSettings {
    /// # Errors
    /// - Required field is empty
    /// - Invalid glob pattern
    /// - Invalid thread count or default context
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.translation_files.include_patterns.is_empty() {
            errors.push(ValidationError::new(
                "translationFiles.includePatterns",
                "At least one pattern is required. Example: [\"**/i18n/*.ts\"]",
            ));
        }

        let pattern_lists = [
            ("translationFiles.includePatterns", &self.translation_files.include_patterns),
            ("translationFiles.excludePatterns", &self.translation_files.exclude_patterns),
            ("excludePatterns", &self.exclude_patterns),
        ];
        for (field, patterns) in pattern_lists {
            for (index, pattern) in patterns.iter().enumerate() {
                if let Err(e) = globset::Glob::new(pattern) {
                    errors.push(ValidationError::new(
                        format!("{field}[{index}]"),
                        format!("Invalid glob pattern '{pattern}': {e}"),
                    ));
                }
            }
        }

        if self.indexing.num_threads == Some(0) {
            errors.push(ValidationError::new(
                "indexing.numThreads",
                "The thread count must be at least 1, or remove this field to use the default",
            ));
        }

        if let Some(context) = &self.lookup.default_context
            && context.is_empty()
        {
            errors.push(ValidationError::new(
                "lookup.defaultContext",
                "The default context cannot be empty. Specify a context name (e.g., \"PTM4QgisProvider\"), or remove this field",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for TranslationFilesConfig {
    fn default() -> Self {
        Self { include_patterns: vec!["**/i18n/*.ts".to_string()], exclude_patterns: Vec::new() }
    }
}

impl Default for I18nSettings {
    fn default() -> Self {
        Self {
            translation_files: TranslationFilesConfig::default(),
            exclude_patterns: vec!["target/**".to_string(), ".git/**".to_string()],
            indexing: IndexingConfig::default(),
            lookup: LookupConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}
