use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::catalog::input::{
    DuplicatePolicy,
    normalize_language_code,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "excludePatterns[0]")
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
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    pub linguist: LinguistSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinguistSettings {
    pub catalog_files: CatalogFilesConfig,

    pub exclude_patterns: Vec<String>,

    /// Locale the `<source>` texts are written in.
    pub source_language: String,

    /// Which occurrence of a duplicated id the lookup keeps.
    pub duplicate_messages: DuplicatePolicy,

    /// Languages that require complete catalogs.
    ///
    /// - `None`: All indexed languages are required (default)
    /// - `Some([...])`: Only specified languages are required
    ///
    /// Mutually exclusive with `optional_languages`.
    pub required_languages: Option<Vec<String>>,

    /// Languages where missing messages are ignored.
    ///
    /// Mutually exclusive with `required_languages`.
    pub optional_languages: Option<Vec<String>>,

    /// Language shown first in hover content.
    pub current_language: Option<String>,

    /// Hover ordering after `current_language`.
    pub primary_languages: Option<Vec<String>>,

    pub diagnostics: DiagnosticsConfig,

    pub indexing: IndexingConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexingConfig {
    /// Parallel load count for indexing.
    /// Default: 80% of CPU cores (minimum 1).
    pub num_threads: Option<usize>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticsConfig {
    pub unfinished: bool,
    pub placeholders: bool,
    pub stale: bool,
    pub missing_messages: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { unfinished: true, placeholders: true, stale: true, missing_messages: true }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogFilesConfig {
    pub file_pattern: String,
}

impl Default for CatalogFilesConfig {
    fn default() -> Self {
        Self { file_pattern: "**/{i18n,translations}/**/*.ts".to_string() }
    }
}

impl LinguistSettings {
    /// # Errors
    /// - Required field is empty
    /// - Invalid glob pattern
    /// - `requiredLanguages` and `optionalLanguages` both set
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.source_language.is_empty() {
            errors.push(ValidationError::new(
                "sourceLanguage",
                "The source language cannot be empty. Please specify a locale code, for example: \"en\"",
            ));
        }

        if self.catalog_files.file_pattern.is_empty() {
            errors.push(ValidationError::new(
                "catalogFiles.filePattern",
                "The pattern cannot be empty. Example: \"**/{i18n,translations}/**/*.ts\"",
            ));
        } else if let Err(e) = globset::Glob::new(&self.catalog_files.file_pattern) {
            errors.push(ValidationError::new(
                "catalogFiles.filePattern",
                format!("Invalid glob pattern '{}': {e}", self.catalog_files.file_pattern),
            ));
        }

        for (index, pattern) in self.exclude_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("excludePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        if self.required_languages.is_some() && self.optional_languages.is_some() {
            errors.push(ValidationError::new(
                "requiredLanguages/optionalLanguages",
                "Cannot specify both 'requiredLanguages' and 'optionalLanguages'. Please use only one",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Whether missing messages should be reported for `language`.
    #[must_use]
    pub fn is_language_required(&self, language: &str) -> bool {
        let normalized = normalize_language_code(language);
        let contains = |languages: &[String]| {
            languages.iter().any(|candidate| normalize_language_code(candidate) == normalized)
        };

        if let Some(required) = &self.required_languages {
            return contains(required);
        }
        if let Some(optional) = &self.optional_languages {
            return !contains(optional);
        }
        true
    }
}

impl Default for LinguistSettings {
    fn default() -> Self {
        Self {
            catalog_files: CatalogFilesConfig::default(),
            exclude_patterns: vec!["**/build/**".to_string()],
            source_language: "en".to_string(),
            duplicate_messages: DuplicatePolicy::default(),
            required_languages: None,
            optional_languages: None,
            current_language: None,
            primary_languages: None,
            diagnostics: DiagnosticsConfig::default(),
            indexing: IndexingConfig::default(),
        }
    }
}
