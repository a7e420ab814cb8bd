//! Catalog input definitions.

use std::collections::HashMap;
use std::path::Path;

use serde::{
    Deserialize,
    Serialize,
};

use crate::catalog::entry::MessageEntry;
use crate::catalog::parse::{
    CatalogError,
    ParsedCatalog,
    parse_catalog,
};
use crate::types::SourceRange;

/// Which occurrence of a duplicated message id the lookup map keeps.
///
/// Duplicates are a data-authoring defect either way; the discarded
/// occurrences are reported by the duplicate-id lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DuplicatePolicy {
    /// Keep the first occurrence (what lupdate does).
    #[default]
    FirstWins,
    /// Keep the last occurrence.
    LastWins,
}

/// Document ranges recorded for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageSpans {
    /// The whole `<message>...</message>` element.
    pub element: SourceRange,
    /// The id attribute value.
    pub id: SourceRange,
    /// The translation text (or tag, when empty).
    pub translation: SourceRange,
}

/// Salsa input representing one loaded locale catalog.
#[salsa::input(debug)]
pub struct Catalog {
    /// Locale code (the `<TS language>` attribute, or the file stem).
    pub language: String,

    /// Source language declared by the catalog (`sourcelanguage`).
    pub source_language: Option<String>,

    #[returns(ref)]
    pub file_path: String,

    #[returns(ref)]
    pub xml_text: String,

    /// Lookup map with the duplicate policy applied.
    #[returns(ref)]
    pub entries: HashMap<String, MessageEntry>,

    /// Unique ids in document order.
    #[returns(ref)]
    pub message_order: Vec<String>,

    /// Document ranges of the winning occurrence of each id.
    #[returns(ref)]
    pub spans: HashMap<String, MessageSpans>,

    /// Occurrences discarded by the duplicate policy.
    #[returns(ref)]
    pub duplicates: Vec<(String, SourceRange)>,
}

impl Catalog {
    /// Builds a catalog input from document text.
    ///
    /// # Errors
    /// Fails when the document is malformed XML or has no `<TS>` root.
    pub fn from_source(
        db: &dyn crate::db::CatalogDatabase,
        file_path: &Path,
        xml_text: String,
        policy: DuplicatePolicy,
    ) -> Result<Self, CatalogError> {
        let parsed = parse_catalog(&xml_text)?;
        let language = parsed
            .language
            .clone()
            .unwrap_or_else(|| language_from_path(file_path));

        let (entries, message_order, spans, duplicates) = apply_duplicate_policy(&parsed, policy);

        Ok(Self::new(
            db,
            language,
            parsed.source_language,
            file_path.to_string_lossy().to_string(),
            xml_text,
            entries,
            message_order,
            spans,
            duplicates,
        ))
    }

    /// Re-parses new document text into this input.
    ///
    /// Salsa invalidates every query derived from the changed fields.
    ///
    /// # Errors
    /// Fails when the new text is malformed; the input keeps its previous
    /// contents in that case.
    pub fn update_source<Db: salsa::Database>(
        self,
        db: &mut Db,
        file_path: &Path,
        xml_text: String,
        policy: DuplicatePolicy,
    ) -> Result<(), CatalogError> {
        use salsa::Setter as _;

        let parsed = parse_catalog(&xml_text)?;
        let language = parsed
            .language
            .clone()
            .unwrap_or_else(|| language_from_path(file_path));
        let (entries, message_order, spans, duplicates) = apply_duplicate_policy(&parsed, policy);

        self.set_language(db).to(language);
        self.set_source_language(db).to(parsed.source_language);
        self.set_xml_text(db).to(xml_text);
        self.set_entries(db).to(entries);
        self.set_message_order(db).to(message_order);
        self.set_spans(db).to(spans);
        self.set_duplicates(db).to(duplicates);
        Ok(())
    }
}

/// Splits a parsed message list into the policy-applied lookup map and the
/// discarded duplicate occurrences.
type PolicyOutput = (
    HashMap<String, MessageEntry>,
    Vec<String>,
    HashMap<String, MessageSpans>,
    Vec<(String, SourceRange)>,
);

fn apply_duplicate_policy(parsed: &ParsedCatalog, policy: DuplicatePolicy) -> PolicyOutput {
    let mut entries = HashMap::new();
    let mut message_order = Vec::new();
    let mut spans = HashMap::new();
    let mut duplicates = Vec::new();

    for message in &parsed.messages {
        let message_spans = MessageSpans {
            element: message.element_range,
            id: message.id_range,
            translation: message.translation_range,
        };

        match (entries.contains_key(&message.id), policy) {
            (false, _) => {
                message_order.push(message.id.clone());
                entries.insert(message.id.clone(), message.entry.clone());
                spans.insert(message.id.clone(), message_spans);
            }
            (true, DuplicatePolicy::FirstWins) => {
                duplicates.push((message.id.clone(), message.id_range));
            }
            (true, DuplicatePolicy::LastWins) => {
                if let Some(previous) = spans.insert(message.id.clone(), message_spans) {
                    duplicates.push((message.id.clone(), previous.id));
                }
                entries.insert(message.id.clone(), message.entry.clone());
            }
        }
    }

    (entries, message_order, spans, duplicates)
}

/// Locale code from a catalog file path, e.g. `i18n/de_DE.ts` → `de_DE`.
///
/// Used when the `<TS>` element carries no `language` attribute; the
/// original project names every catalog after its locale.
fn language_from_path(file_path: &Path) -> String {
    file_path
        .file_stem()
        .map_or_else(|| "unknown".to_string(), |stem| stem.to_string_lossy().to_string())
}

/// Normalizes a locale code for comparison (lowercase, `-` folded to `_`).
#[must_use]
pub fn normalize_language_code(code: &str) -> String {
    code.to_lowercase().replace('-', "_")
}

/// Checks whether a catalog locale satisfies a requested locale.
///
/// Exact normalized match, or a bare-language request matching a regional
/// catalog (`de` matches `de_DE`) — UIs commonly ask with the short code
/// while the catalogs are named with the region.
#[must_use]
pub fn language_matches(catalog_language: &str, requested: &str) -> bool {
    let catalog_language = normalize_language_code(catalog_language);
    let requested = normalize_language_code(requested);

    if catalog_language == requested {
        return true;
    }
    catalog_language
        .split_once('_')
        .is_some_and(|(base, _)| base == requested)
}

/// Loads a catalog file into the database.
///
/// # Errors
/// Returns an error if the file cannot be read or is malformed.
pub fn load_catalog_file(
    db: &dyn crate::db::CatalogDatabase,
    file_path: &Path,
    policy: DuplicatePolicy,
) -> Result<Catalog, CatalogError> {
    let xml_text = std::fs::read_to_string(file_path)?;
    Catalog::from_source(db, file_path, xml_text, policy)
}
