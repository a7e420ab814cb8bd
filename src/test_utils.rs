//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![cfg(test)]

use std::collections::HashMap;

use crate::catalog::entry::{
    MessageEntry,
    TranslationStatus,
};
use crate::catalog::input::{
    Catalog,
    MessageSpans,
};
use crate::db::CatalogDatabaseImpl;
use crate::types::{
    SourcePosition,
    SourceRange,
};

/// 有限ステータスの翻訳エントリを作成する
pub(crate) fn entry(source: &str, translation: &str) -> MessageEntry {
    entry_with_status(source, translation, TranslationStatus::Finished)
}

/// 任意ステータスの翻訳エントリを作成する
pub(crate) fn entry_with_status(
    source: &str,
    translation: &str,
    status: TranslationStatus,
) -> MessageEntry {
    MessageEntry {
        source: source.to_string(),
        translation: translation.to_string(),
        status,
        extracomment: None,
        oldsource: None,
    }
}

/// テスト用の Catalog を作成する
///
/// # Arguments
/// * `db` - Salsa データベース
/// * `language` - ロケールコード（例: "de", "fi_FI"）
/// * `file_path` - カタログファイルのパス
/// * `entries` - id とエントリのリスト（文書順）
pub(crate) fn create_catalog(
    db: &CatalogDatabaseImpl,
    language: &str,
    file_path: &str,
    entries: Vec<(&str, MessageEntry)>,
) -> Catalog {
    let zero = SourceRange {
        start: SourcePosition { line: 0, character: 0 },
        end: SourcePosition { line: 0, character: 0 },
    };
    let spans = MessageSpans { element: zero, id: zero, translation: zero };

    let message_order: Vec<String> = entries.iter().map(|(id, _)| (*id).to_string()).collect();
    let span_map: HashMap<String, MessageSpans> =
        message_order.iter().map(|id| (id.clone(), spans)).collect();
    let entry_map: HashMap<String, MessageEntry> =
        entries.into_iter().map(|(id, entry)| (id.to_string(), entry)).collect();

    Catalog::new(
        db,
        language.to_string(),
        Some("en".to_string()),
        file_path.to_string(),
        String::new(),
        entry_map,
        message_order,
        span_map,
        Vec::new(),
    )
}
