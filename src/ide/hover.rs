//! Hover implementation

use std::fmt::Write as _;

use crate::catalog::entry::{
    MessageEntry,
    TranslationStatus,
};
use crate::catalog::input::Catalog;
use crate::db::CatalogDatabase;
use crate::interned::MessageId;

/// Generate hover content for a message id
///
/// # ソート順
/// 言語は以下の順序でソートされます：
/// 1. `current_language`（設定されている場合）
/// 2. `primary_languages`（設定順）
/// 3. その他（アルファベット順）
pub fn generate_hover_content(
    db: &dyn CatalogDatabase,
    id: MessageId<'_>,
    catalogs: &[Catalog],
    current_language: Option<&str>,
    primary_languages: Option<&[String]>,
) -> Option<String> {
    let id_text = id.text(db);

    // Collect entries carrying this id
    let mut translations_found: Vec<(String, String)> = Vec::new();
    let mut reference: Option<MessageEntry> = None;

    for catalog in catalogs {
        let Some(entry) = catalog.entries(db).get(id_text) else {
            continue;
        };
        if reference.is_none() {
            reference = Some(entry.clone());
        }
        translations_found.push((catalog.language(db), format_entry(entry)));
    }

    // No catalog knows the id
    let reference = reference?;

    // Format as markdown
    let mut content = format!("**Message id:** `{id_text}`\n\n");
    let _ = writeln!(content, "**Source:** {}", reference.source);
    if let Some(comment) = &reference.extracomment {
        let _ = writeln!(content, "\n_{comment}_");
    }
    content.push('\n');

    // Sort by priority: current_language → primary_languages → alphabetical
    sort_translations_by_priority(&mut translations_found, current_language, primary_languages);

    for (language, value) in translations_found {
        let _ = writeln!(content, "**{language}**: {value}");
    }

    Some(content)
}

/// エントリの表示文字列を生成
///
/// フォールバックするエントリは注釈付きで表示する。
fn format_entry(entry: &MessageEntry) -> String {
    if entry.translation.is_empty() {
        return "_falls back to source_".to_string();
    }

    match entry.status {
        TranslationStatus::Finished => entry.translation.clone(),
        TranslationStatus::Unfinished => format!("{} _(unfinished)_", entry.translation),
        TranslationStatus::Vanished => format!("{} _(vanished)_", entry.translation),
        TranslationStatus::Obsolete => format!("{} _(obsolete)_", entry.translation),
    }
}

/// 翻訳結果を優先度順にソート
///
/// ソート順:
/// 1. `current_language`（設定されている場合）
/// 2. `primary_languages`（設定順）
/// 3. その他（アルファベット順）
fn sort_translations_by_priority(
    translations: &mut [(String, String)],
    current_language: Option<&str>,
    primary_languages: Option<&[String]>,
) {
    translations.sort_by(|a, b| {
        let priority_a = get_language_priority(&a.0, current_language, primary_languages);
        let priority_b = get_language_priority(&b.0, current_language, primary_languages);

        match (priority_a, priority_b) {
            (LanguagePriority::Current, LanguagePriority::Current) => std::cmp::Ordering::Equal,
            (LanguagePriority::Current, _) => std::cmp::Ordering::Less,
            (_, LanguagePriority::Current) => std::cmp::Ordering::Greater,
            (LanguagePriority::Primary(a_idx), LanguagePriority::Primary(b_idx)) => {
                a_idx.cmp(&b_idx)
            }
            (LanguagePriority::Primary(_), _) => std::cmp::Ordering::Less,
            (_, LanguagePriority::Primary(_)) => std::cmp::Ordering::Greater,
            (LanguagePriority::Other(a_lang), LanguagePriority::Other(b_lang)) => {
                a_lang.cmp(b_lang)
            }
        }
    });
}

/// Language priority for sorting
#[derive(Debug, Clone, PartialEq, Eq)]
enum LanguagePriority<'a> {
    /// Current language (highest priority)
    Current,
    /// Primary language with its position index
    Primary(usize),
    /// Other language (sorted alphabetically)
    Other(&'a str),
}

/// 言語の優先度を計算
fn get_language_priority<'a>(
    lang: &'a str,
    current_language: Option<&str>,
    primary_languages: Option<&[String]>,
) -> LanguagePriority<'a> {
    // current_language は最高優先度
    if current_language.is_some_and(|c| c == lang) {
        return LanguagePriority::Current;
    }

    // primary_languages は設定順
    if let Some(primaries) = primary_languages
        && let Some(pos) = primaries.iter().position(|p| p == lang)
    {
        return LanguagePriority::Primary(pos);
    }

    // その他はアルファベット順
    LanguagePriority::Other(lang)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;
    use crate::db::CatalogDatabaseImpl;
    use crate::test_utils::{
        create_catalog,
        entry,
        entry_with_status,
    };

    #[rstest]
    fn generate_hover_content_with_single_catalog() {
        let db = CatalogDatabaseImpl::default();

        let catalog = create_catalog(
            &db,
            "de",
            "/i18n/de_DE.ts",
            vec![("general-cancel", entry("Cancel", "Abbrechen"))],
        );

        let id = MessageId::new(&db, "general-cancel".to_string());

        let content = generate_hover_content(&db, id, &[catalog], None, None);

        assert_that!(content, some(contains_substring("**Message id:** `general-cancel`")));
        assert_that!(content.as_ref().unwrap(), contains_substring("**Source:** Cancel"));
        assert_that!(content.as_ref().unwrap(), contains_substring("**de**: Abbrechen"));
    }

    #[rstest]
    fn generate_hover_content_with_multiple_languages() {
        let db = CatalogDatabaseImpl::default();

        // 意図的にソート順と異なる順序で追加（fi → de）
        let fi_catalog = create_catalog(
            &db,
            "fi",
            "/i18n/fi_FI.ts",
            vec![("general-cancel", entry("Cancel", "Peruuta"))],
        );
        let de_catalog = create_catalog(
            &db,
            "de",
            "/i18n/de_DE.ts",
            vec![("general-cancel", entry("Cancel", "Abbrechen"))],
        );

        let id = MessageId::new(&db, "general-cancel".to_string());

        // ソート優先度なしの場合はアルファベット順
        let content =
            generate_hover_content(&db, id, &[fi_catalog, de_catalog], None, None).unwrap();

        assert_that!(content, contains_substring("**de**: Abbrechen"));
        assert_that!(content, contains_substring("**fi**: Peruuta"));

        // 言語コード順にソートされている（de が fi より先）
        let de_pos = content.find("**de**").unwrap();
        let fi_pos = content.find("**fi**").unwrap();
        assert_that!(de_pos, lt(fi_pos));
    }

    #[rstest]
    fn generate_hover_content_with_unknown_id() {
        let db = CatalogDatabaseImpl::default();

        let catalog = create_catalog(
            &db,
            "de",
            "/i18n/de_DE.ts",
            vec![("general-cancel", entry("Cancel", "Abbrechen"))],
        );

        let id = MessageId::new(&db, "no-such-id".to_string());

        let content = generate_hover_content(&db, id, &[catalog], None, None);

        assert_that!(content, none());
    }

    #[rstest]
    fn generate_hover_content_with_no_catalogs() {
        let db = CatalogDatabaseImpl::default();

        let id = MessageId::new(&db, "general-cancel".to_string());

        let content = generate_hover_content(&db, id, &[], None, None);

        assert_that!(content, none());
    }

    #[rstest]
    fn generate_hover_content_annotates_unfinished() {
        let db = CatalogDatabaseImpl::default();

        let catalog = create_catalog(
            &db,
            "vi",
            "/i18n/vi_VI.ts",
            vec![(
                "general-cancel",
                entry_with_status("Cancel", "Hủy bỏ", TranslationStatus::Unfinished),
            )],
        );

        let id = MessageId::new(&db, "general-cancel".to_string());

        let content = generate_hover_content(&db, id, &[catalog], None, None).unwrap();

        assert_that!(content, contains_substring("**vi**: Hủy bỏ _(unfinished)_"));
    }

    #[rstest]
    fn generate_hover_content_annotates_empty_translation() {
        let db = CatalogDatabaseImpl::default();

        let catalog = create_catalog(
            &db,
            "it",
            "/i18n/it_IT.ts",
            vec![("general-cancel", entry("Cancel", ""))],
        );

        let id = MessageId::new(&db, "general-cancel".to_string());

        let content = generate_hover_content(&db, id, &[catalog], None, None).unwrap();

        assert_that!(content, contains_substring("**it**: _falls back to source_"));
    }

    #[rstest]
    fn generate_hover_content_shows_extracomment() {
        let db = CatalogDatabaseImpl::default();

        let mut commented = entry("Cancel", "Abbrechen");
        commented.extracomment = Some("Edit address dialog, cancel button".to_string());
        let catalog =
            create_catalog(&db, "de", "/i18n/de_DE.ts", vec![("general-cancel", commented)]);

        let id = MessageId::new(&db, "general-cancel".to_string());

        let content = generate_hover_content(&db, id, &[catalog], None, None).unwrap();

        assert_that!(content, contains_substring("_Edit address dialog, cancel button_"));
    }

    #[rstest]
    fn generate_hover_content_with_current_language_priority() {
        let db = CatalogDatabaseImpl::default();

        let de = create_catalog(&db, "de", "/i18n/de_DE.ts", vec![("key", entry("K", "De"))]);
        let fi = create_catalog(&db, "fi", "/i18n/fi_FI.ts", vec![("key", entry("K", "Fi"))]);
        let vi = create_catalog(&db, "vi", "/i18n/vi_VI.ts", vec![("key", entry("K", "Vi"))]);

        let id = MessageId::new(&db, "key".to_string());

        // current_language = "fi" を指定
        let content =
            generate_hover_content(&db, id, &[de, fi, vi], Some("fi"), None).unwrap();

        // fi が最初に表示される
        let fi_pos = content.find("**fi**").unwrap();
        let de_pos = content.find("**de**").unwrap();
        let vi_pos = content.find("**vi**").unwrap();
        assert_that!(fi_pos, lt(de_pos));
        assert_that!(fi_pos, lt(vi_pos));
        // 残りはアルファベット順
        assert_that!(de_pos, lt(vi_pos));
    }

    #[rstest]
    fn generate_hover_content_with_primary_languages() {
        let db = CatalogDatabaseImpl::default();

        let de = create_catalog(&db, "de", "/i18n/de_DE.ts", vec![("key", entry("K", "De"))]);
        let fi = create_catalog(&db, "fi", "/i18n/fi_FI.ts", vec![("key", entry("K", "Fi"))]);
        let vi = create_catalog(&db, "vi", "/i18n/vi_VI.ts", vec![("key", entry("K", "Vi"))]);

        let id = MessageId::new(&db, "key".to_string());

        // primary_languages = ["vi", "fi"] を指定
        let primary = vec!["vi".to_string(), "fi".to_string()];
        let content =
            generate_hover_content(&db, id, &[de, fi, vi], None, Some(&primary)).unwrap();

        // vi, fi, de の順で表示される
        let vi_pos = content.find("**vi**").unwrap();
        let fi_pos = content.find("**fi**").unwrap();
        let de_pos = content.find("**de**").unwrap();
        assert_that!(vi_pos, lt(fi_pos));
        assert_that!(fi_pos, lt(de_pos));
    }

    #[rstest]
    fn generate_hover_content_current_overrides_primary() {
        let db = CatalogDatabaseImpl::default();

        let de = create_catalog(&db, "de", "/i18n/de_DE.ts", vec![("key", entry("K", "De"))]);
        let fi = create_catalog(&db, "fi", "/i18n/fi_FI.ts", vec![("key", entry("K", "Fi"))]);
        let vi = create_catalog(&db, "vi", "/i18n/vi_VI.ts", vec![("key", entry("K", "Vi"))]);

        let id = MessageId::new(&db, "key".to_string());

        // current_language = "de", primary_languages = ["vi", "fi"]
        // current が最優先
        let primary = vec!["vi".to_string(), "fi".to_string()];
        let content =
            generate_hover_content(&db, id, &[de, fi, vi], Some("de"), Some(&primary)).unwrap();

        // de, vi, fi の順で表示される
        let de_pos = content.find("**de**").unwrap();
        let vi_pos = content.find("**vi**").unwrap();
        let fi_pos = content.find("**fi**").unwrap();
        assert_that!(de_pos, lt(vi_pos));
        assert_that!(vi_pos, lt(fi_pos));
    }

    #[rstest]
    fn generate_hover_content_partial_coverage() {
        let db = CatalogDatabaseImpl::default();

        // de にはキーがあるが、fi にはない
        let de = create_catalog(
            &db,
            "de",
            "/i18n/de_DE.ts",
            vec![("general-cancel", entry("Cancel", "Abbrechen"))],
        );
        let fi = create_catalog(
            &db,
            "fi",
            "/i18n/fi_FI.ts",
            vec![("general-close", entry("Close", "Sulje"))],
        );

        let id = MessageId::new(&db, "general-cancel".to_string());

        let content = generate_hover_content(&db, id, &[de, fi], None, None).unwrap();

        // de のみ含まれている
        assert_that!(content, contains_substring("**de**: Abbrechen"));
        assert_that!(content, not(contains_substring("**fi**")));
    }
}
