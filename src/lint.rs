//! Catalog lint rules.
//!
//! Pure checks over one loaded catalog. Each finding carries a rule name,
//! a severity, and a document range; the editor surface decides which
//! rules are enabled and maps findings to LSP diagnostics.

use std::collections::BTreeSet;

use crate::catalog::entry::TranslationStatus;
use crate::catalog::input::Catalog;
use crate::db::CatalogDatabase;
use crate::types::SourceRange;

/// Lint rule identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// The same id occurs more than once in one catalog.
    DuplicateMessageId,
    /// Placeholder tokens differ between source and finished translation.
    PlaceholderMismatch,
    /// A finished entry with an empty translation.
    EmptyTranslation,
    /// An unfinished entry; the UI falls back to source text.
    UnfinishedTranslation,
    /// A vanished or obsolete entry kept in the file.
    StaleMessage,
}

impl Rule {
    /// Stable rule name, used as the diagnostic code.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DuplicateMessageId => "duplicate-message-id",
            Self::PlaceholderMismatch => "placeholder-mismatch",
            Self::EmptyTranslation => "empty-translation",
            Self::UnfinishedTranslation => "unfinished-translation",
            Self::StaleMessage => "stale-message",
        }
    }
}

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Information,
    Hint,
}

/// One lint finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub rule: Rule,
    pub severity: Severity,
    pub message: String,
    pub range: SourceRange,
}

/// Runs every rule over one catalog.
///
/// Returns findings in document order per rule; filtering by enabled
/// rules is the caller's concern.
#[must_use]
pub fn lint_catalog(db: &dyn CatalogDatabase, catalog: Catalog) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (id, range) in catalog.duplicates(db) {
        findings.push(Finding {
            rule: Rule::DuplicateMessageId,
            severity: Severity::Warning,
            message: format!("Duplicate message id '{id}'"),
            range: *range,
        });
    }

    let entries = catalog.entries(db);
    let spans = catalog.spans(db);
    for id in catalog.message_order(db) {
        let (Some(entry), Some(span)) = (entries.get(id), spans.get(id)) else {
            continue;
        };

        match entry.status {
            TranslationStatus::Finished if entry.translation.is_empty() => {
                findings.push(Finding {
                    rule: Rule::EmptyTranslation,
                    severity: Severity::Warning,
                    message: format!("Message '{id}' is marked finished but has no translation"),
                    range: span.translation,
                });
            }
            TranslationStatus::Finished => {
                if let Some(message) =
                    placeholder_mismatch(&entry.source, &entry.translation)
                {
                    findings.push(Finding {
                        rule: Rule::PlaceholderMismatch,
                        severity: Severity::Warning,
                        message: format!("Message '{id}': {message}"),
                        range: span.translation,
                    });
                }
            }
            TranslationStatus::Unfinished => {
                findings.push(Finding {
                    rule: Rule::UnfinishedTranslation,
                    severity: Severity::Hint,
                    message: format!(
                        "Translation for '{id}' is unfinished; the UI falls back to the source text"
                    ),
                    range: span.translation,
                });
            }
            TranslationStatus::Vanished | TranslationStatus::Obsolete => {
                findings.push(Finding {
                    rule: Rule::StaleMessage,
                    severity: Severity::Hint,
                    message: format!("Message '{id}' is no longer used and can be removed"),
                    range: span.element,
                });
            }
        }
    }

    findings
}

/// Describes a placeholder difference between source and translation, if
/// one exists. Checked only for finished, non-empty entries.
fn placeholder_mismatch(source: &str, translation: &str) -> Option<String> {
    let expected = placeholders(source);
    let actual = placeholders(translation);

    if expected == actual {
        return None;
    }

    let missing: Vec<&str> =
        expected.difference(&actual).map(String::as_str).collect();
    let extra: Vec<&str> = actual.difference(&expected).map(String::as_str).collect();

    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("translation is missing {}", missing.join(", ")));
    }
    if !extra.is_empty() {
        parts.push(format!("translation adds {}", extra.join(", ")));
    }
    Some(parts.join("; "))
}

/// Extracts placeholder tokens: `%1`..`%99`, `%n`, `%d`, `%s`.
#[must_use]
pub fn placeholders(text: &str) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            continue;
        }
        match chars.peek() {
            Some(digit) if digit.is_ascii_digit() => {
                let mut token = String::from("%");
                while let Some(digit) = chars.peek().filter(|c| c.is_ascii_digit()) {
                    token.push(*digit);
                    chars.next();
                }
                tokens.insert(token);
            }
            Some(marker @ ('n' | 'd' | 's')) => {
                tokens.insert(format!("%{marker}"));
                chars.next();
            }
            _ => {}
        }
    }

    tokens
}
