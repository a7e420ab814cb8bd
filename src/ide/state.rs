//! LSP サーバーの共有状態

use std::collections::{
    HashMap,
    HashSet,
};
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{
    Mutex,
    MutexGuard,
};

use crate::catalog::input::Catalog;
use crate::db::CatalogDatabaseImpl;

/// LSP サーバーの共有状態
///
/// `Backend` から状態管理の責務を分離し、ハンドラー間で共有可能にします。
///
/// # ロック順序
///
/// 複数のロックを同時に取得する場合は、以下の順序を厳守してください：
/// 1. `db`
/// 2. `catalogs` / `opened_files`
#[derive(Clone)]
pub struct ServerState {
    /// Salsa データベース
    pub db: Arc<Mutex<CatalogDatabaseImpl>>,
    /// カタログ管理（ファイルパス → `Catalog`）
    pub catalogs: Arc<Mutex<HashMap<PathBuf, Catalog>>>,
    /// 現在開いているファイルの URI
    pub opened_files: Arc<Mutex<HashSet<tower_lsp::lsp_types::Url>>>,
}

impl ServerState {
    /// 新しい `ServerState` を作成
    #[must_use]
    pub fn new(db: CatalogDatabaseImpl) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            catalogs: Arc::new(Mutex::new(HashMap::new())),
            opened_files: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// `db` と `catalogs` のロックを一括取得
    ///
    /// ロック順序（`db` → `catalogs`）を保証します。
    pub async fn lock_db_and_catalogs(
        &self,
    ) -> (MutexGuard<'_, CatalogDatabaseImpl>, MutexGuard<'_, HashMap<PathBuf, Catalog>>) {
        let db = self.db.lock().await;
        let catalogs = self.catalogs.lock().await;
        (db, catalogs)
    }
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("db", &"<CatalogDatabaseImpl>")
            .field("catalogs", &"<HashMap<PathBuf, Catalog>>")
            .field("opened_files", &"<HashSet<Url>>")
            .finish()
    }
}
