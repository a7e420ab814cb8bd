//! Salsa データベース定義

/// Linguist LSP のデータベーストレイト
#[salsa::db]
pub trait CatalogDatabase: salsa::Database {}

/// Linguist データベースの実装
#[salsa::db]
#[derive(Clone, Default)]
pub struct CatalogDatabaseImpl {
    /// Salsa のストレージ
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl salsa::Database for CatalogDatabaseImpl {}

#[salsa::db]
impl CatalogDatabase for CatalogDatabaseImpl {}
