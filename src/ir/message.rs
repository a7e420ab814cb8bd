//! カタログ内メッセージの中間表現

use crate::catalog::entry::TranslationStatus;
use crate::interned::MessageId;
use crate::types::SourceRange;

/// カタログ文書内の 1 メッセージ
#[salsa::interned(debug)]
pub struct Message {
    /// メッセージ id（インターン化）
    pub id: MessageId<'db>,

    /// `<message>` 要素全体の範囲
    pub element_range: SourceRange,

    /// id 属性値の範囲
    pub id_range: SourceRange,

    /// 翻訳テキストの範囲
    pub translation_range: SourceRange,

    /// 翻訳のレビュー状態
    pub status: TranslationStatus,
}
