//! Consumer-facing message lookup.
//!
//! The contract: given a locale code and a message id, return the text the
//! UI should display. A missing locale, a missing id, or an unfinished
//! translation silently falls back to the source-language text.

use crate::catalog::input::{
    Catalog,
    language_matches,
};
use crate::db::CatalogDatabase;

/// Resolves the display text for `id` in the requested locale.
///
/// Returns `None` only when no indexed catalog knows the id at all;
/// every other miss falls back to the entry's source text.
#[must_use]
pub fn resolve_message(
    db: &dyn CatalogDatabase,
    catalogs: &[Catalog],
    requested: &str,
    id: &str,
) -> Option<String> {
    let localized = catalogs
        .iter()
        .find(|catalog| language_matches(&catalog.language(db), requested))
        .and_then(|catalog| catalog.entries(db).get(id));

    if let Some(entry) = localized {
        return Some(entry.display_text().to_string());
    }

    // The id is absent from the requested locale (or the locale has no
    // catalog): any catalog carrying the id supplies the source text.
    catalogs
        .iter()
        .find_map(|catalog| catalog.entries(db).get(id))
        .map(|entry| entry.source.clone())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use crate::catalog::entry::TranslationStatus;
    use crate::db::CatalogDatabaseImpl;
    use crate::test_utils::{
        create_catalog,
        entry,
        entry_with_status,
    };

    use super::*;

    #[googletest::test]
    fn resolves_finished_translation() {
        let db = CatalogDatabaseImpl::default();
        let catalogs = vec![create_catalog(
            &db,
            "de",
            "/i18n/de_DE.ts",
            vec![("general-cancel", entry("Cancel", "Abbrechen"))],
        )];

        let text = resolve_message(&db, &catalogs, "de", "general-cancel");

        expect_that!(text, some(eq("Abbrechen")));
    }

    #[rstest]
    #[case::unfinished(TranslationStatus::Unfinished)]
    #[case::vanished(TranslationStatus::Vanished)]
    #[case::obsolete(TranslationStatus::Obsolete)]
    fn unreviewed_translation_falls_back_to_source(#[case] status: TranslationStatus) {
        let db = CatalogDatabaseImpl::default();
        let catalogs = vec![create_catalog(
            &db,
            "de",
            "/i18n/de_DE.ts",
            vec![("general-cancel", entry_with_status("Cancel", "Abbrechen", status))],
        )];

        let text = resolve_message(&db, &catalogs, "de", "general-cancel");

        assert_that!(text, some(eq("Cancel")));
    }

    #[googletest::test]
    fn empty_translation_falls_back_to_source() {
        let db = CatalogDatabaseImpl::default();
        let catalogs = vec![create_catalog(
            &db,
            "fi",
            "/i18n/fi_FI.ts",
            vec![("general-send", entry("Send", ""))],
        )];

        let text = resolve_message(&db, &catalogs, "fi", "general-send");

        expect_that!(text, some(eq("Send")));
    }

    #[googletest::test]
    fn missing_id_falls_back_to_another_catalog_source() {
        let db = CatalogDatabaseImpl::default();
        let catalogs = vec![
            create_catalog(&db, "de", "/i18n/de_DE.ts", vec![]),
            create_catalog(
                &db,
                "fr",
                "/i18n/fr_FR.ts",
                vec![("general-send", entry("Send", "Envoyer"))],
            ),
        ];

        let text = resolve_message(&db, &catalogs, "de", "general-send");

        expect_that!(text, some(eq("Send")));
    }

    #[googletest::test]
    fn missing_locale_falls_back_to_source() {
        let db = CatalogDatabaseImpl::default();
        let catalogs = vec![create_catalog(
            &db,
            "de",
            "/i18n/de_DE.ts",
            vec![("general-send", entry("Send", "Senden"))],
        )];

        let text = resolve_message(&db, &catalogs, "vi", "general-send");

        expect_that!(text, some(eq("Send")));
    }

    #[googletest::test]
    fn unknown_id_resolves_to_none() {
        let db = CatalogDatabaseImpl::default();
        let catalogs = vec![create_catalog(
            &db,
            "de",
            "/i18n/de_DE.ts",
            vec![("general-send", entry("Send", "Senden"))],
        )];

        let text = resolve_message(&db, &catalogs, "de", "no-such-id");

        expect_that!(text, none());
    }

    #[googletest::test]
    fn bare_language_request_matches_regional_catalog() {
        let db = CatalogDatabaseImpl::default();
        let catalogs = vec![create_catalog(
            &db,
            "vi_VI",
            "/i18n/vi_VI.ts",
            vec![("general-send", entry("Send", "Gửi"))],
        )];

        let text = resolve_message(&db, &catalogs, "vi", "general-send");

        expect_that!(text, some(eq("Gửi")));
    }
}
