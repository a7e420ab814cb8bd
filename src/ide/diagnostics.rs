//! 診断メッセージ生成モジュール

use std::collections::BTreeSet;

use tower_lsp::lsp_types::{
    Diagnostic,
    DiagnosticSeverity,
    NumberOrString,
    Position,
    Range,
};

use crate::catalog::input::Catalog;
use crate::config::LinguistSettings;
use crate::db::CatalogDatabase;
use crate::lint::{
    self,
    Rule,
    Severity,
};

/// 診断の `source` フィールドに入れる識別子
const DIAGNOSTIC_SOURCE: &str = "linguist-i18n";

/// カタログファイルの診断メッセージを生成
///
/// 単一カタログの lint ルールを実行し、有効化された規則の結果に加えて、
/// 他のカタログには存在するのにこのカタログに欠けているメッセージ id を
/// チェックします。
///
/// # Arguments
/// * `db` - Salsa データベース
/// * `catalog` - チェック対象のカタログ
/// * `all_catalogs` - インデックス済みの全カタログ
/// * `settings` - 診断設定（ルールのオン/オフ）
pub fn generate_diagnostics(
    db: &dyn CatalogDatabase,
    catalog: Catalog,
    all_catalogs: &[Catalog],
    settings: &LinguistSettings,
) -> Vec<Diagnostic> {
    tracing::debug!("Generating diagnostics for catalog '{}'", catalog.file_path(db));

    let mut diagnostics: Vec<Diagnostic> = lint::lint_catalog(db, catalog)
        .into_iter()
        .filter(|finding| rule_enabled(finding.rule, settings))
        .map(|finding| Diagnostic {
            range: finding.range.into(),
            severity: Some(map_severity(finding.severity)),
            code: Some(NumberOrString::String(finding.rule.name().to_string())),
            code_description: None,
            source: Some(DIAGNOSTIC_SOURCE.to_string()),
            message: finding.message,
            related_information: None,
            tags: None,
            data: None,
        })
        .collect();

    if settings.diagnostics.missing_messages
        && settings.is_language_required(&catalog.language(db))
    {
        diagnostics.extend(missing_message_diagnostics(db, catalog, all_catalogs));
    }

    diagnostics
}

/// 他カタログとの和集合に対して欠けている id を報告
///
/// 対応する要素がこのファイルに無いため、診断は文書先頭に付けます。
fn missing_message_diagnostics(
    db: &dyn CatalogDatabase,
    catalog: Catalog,
    all_catalogs: &[Catalog],
) -> Vec<Diagnostic> {
    let own_entries = catalog.entries(db);

    // 全カタログから利用可能な id を収集
    let mut known_elsewhere: BTreeSet<(&String, String)> = BTreeSet::new();
    for other in all_catalogs {
        if other.file_path(db) == catalog.file_path(db) {
            continue;
        }
        let language = other.language(db);
        for id in other.message_order(db) {
            if !own_entries.contains_key(id) {
                known_elsewhere.insert((id, language.clone()));
            }
        }
    }

    // id ごとに「どの言語には存在するか」をまとめる
    let mut missing: Vec<(&String, Vec<String>)> = Vec::new();
    for (id, language) in known_elsewhere {
        match missing.last_mut() {
            Some((last_id, languages)) if *last_id == id => languages.push(language),
            _ => missing.push((id, vec![language])),
        }
    }

    let document_start = Range {
        start: Position { line: 0, character: 0 },
        end: Position { line: 0, character: 0 },
    };

    missing
        .into_iter()
        .map(|(id, languages)| Diagnostic {
            range: document_start,
            severity: Some(DiagnosticSeverity::INFORMATION),
            code: Some(NumberOrString::String("missing-message".to_string())),
            code_description: None,
            source: Some(DIAGNOSTIC_SOURCE.to_string()),
            message: format!(
                "Message '{id}' is missing from this catalog (present in {})",
                languages.join(", ")
            ),
            related_information: None,
            tags: None,
            data: None,
        })
        .collect()
}

/// ルールが設定で有効かどうか
///
/// 重複 id と空翻訳はデータ不良なので常に報告します。
const fn rule_enabled(rule: Rule, settings: &LinguistSettings) -> bool {
    match rule {
        Rule::DuplicateMessageId | Rule::EmptyTranslation => true,
        Rule::PlaceholderMismatch => settings.diagnostics.placeholders,
        Rule::UnfinishedTranslation => settings.diagnostics.unfinished,
        Rule::StaleMessage => settings.diagnostics.stale,
    }
}

const fn map_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Information => DiagnosticSeverity::INFORMATION,
        Severity::Hint => DiagnosticSeverity::HINT,
    }
}
