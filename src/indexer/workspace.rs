//! カタログファイルのワークスペース走査と読み込み

use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use futures::StreamExt as _;
use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};
use ignore::WalkBuilder;
use tokio::sync::Mutex;

use crate::catalog::input::Catalog;
use crate::config::ConfigManager;
use crate::db::CatalogDatabaseImpl;
use crate::indexer::types::IndexerError;

/// ワークスペース内のカタログを検出して読み込む
#[derive(Clone, Copy, Debug, Default)]
pub struct WorkspaceIndexer;

impl WorkspaceIndexer {
    /// 新しいインデクサーを作成
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// ワークスペースをインデックス
    ///
    /// 検出した全カタログを読み込み、`catalogs` マップに登録して返す。
    /// 読み込めないファイルは警告ログを出してスキップする（壊れた
    /// カタログ 1 件でインデックス全体を失敗させない）。
    ///
    /// # Errors
    /// 設定されたパターンが不正な場合
    pub async fn index_workspace(
        &self,
        db: CatalogDatabaseImpl,
        workspace_path: &Path,
        config_manager: &ConfigManager,
        catalogs: Arc<Mutex<HashMap<PathBuf, Catalog>>>,
    ) -> Result<Vec<Catalog>, IndexerError> {
        tracing::debug!(workspace_path = %workspace_path.display(), "Indexing workspace");
        let settings = config_manager.get_settings();
        let policy = settings.duplicate_messages;

        let files = Self::find_catalog_files(
            workspace_path,
            &settings.catalog_files.file_pattern,
            &settings.exclude_patterns,
        )?;
        tracing::debug!(count = files.len(), "Found catalog files");

        // 並列処理でファイルを読み込み（デフォルトは CPU コアの 80%）
        let num_threads = settings
            .indexing
            .num_threads
            .unwrap_or_else(|| (num_cpus::get() * 4 / 5).max(1));

        let loaded: Vec<Option<(PathBuf, Catalog)>> = futures::stream::iter(files)
            .map(move |path| {
                let db = db.clone();
                async move {
                    let content = match tokio::fs::read_to_string(&path).await {
                        Ok(content) => content,
                        Err(error) => {
                            tracing::warn!(path = %path.display(), %error, "Failed to read catalog file");
                            return None;
                        }
                    };

                    match Catalog::from_source(&db, &path, content, policy) {
                        Ok(catalog) => Some((path, catalog)),
                        Err(error) => {
                            tracing::warn!(path = %path.display(), %error, "Skipping malformed catalog");
                            None
                        }
                    }
                }
            })
            .buffer_unordered(num_threads.max(1))
            .collect()
            .await;

        let mut map = catalogs.lock().await;
        let mut indexed = Vec::new();
        for (path, catalog) in loaded.into_iter().flatten() {
            map.insert(path, catalog);
            indexed.push(catalog);
        }

        tracing::debug!(count = indexed.len(), "Workspace indexing finished");
        Ok(indexed)
    }

    /// カタログファイルを検索
    fn find_catalog_files(
        workspace_path: &Path,
        file_pattern: &str,
        exclude_patterns: &[String],
    ) -> Result<Vec<PathBuf>, IndexerError> {
        let include_set = build_glob_set([file_pattern])?;
        let exclude_set = build_glob_set(exclude_patterns.iter().map(String::as_str))?;

        let mut found_files = Vec::new();

        // ignore クレートでファイルを走査
        for result in WalkBuilder::new(workspace_path)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .build()
        {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(?err, "Failed to read directory entry");
                    continue;
                }
            };

            // ファイルのみを対象
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();

            // workspace からの相対パスを取得
            let Ok(relative_path) = path.strip_prefix(workspace_path) else {
                continue;
            };
            if !include_set.is_match(relative_path) || exclude_set.is_match(relative_path) {
                continue;
            }

            found_files.push(path.to_path_buf());
        }

        Ok(found_files)
    }
}

/// パターンリストから `GlobSet` をビルドする
fn build_glob_set<'a>(
    patterns: impl IntoIterator<Item = &'a str>,
) -> Result<GlobSet, IndexerError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| IndexerError::InvalidPattern(format!("'{pattern}': {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| IndexerError::Error(format!("Failed to build pattern set: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use tempfile::TempDir;

    use super::*;
    use crate::config::LinguistSettings;

    const VALID: &str = r#"<TS version="2.1" language="de" sourcelanguage="en">
<context>
    <message id="general-send"><source>Send</source><translation>Senden</translation></message>
</context>
</TS>"#;

    fn workspace_with_catalogs() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("ui/i18n")).unwrap();
        fs::create_dir_all(temp_dir.path().join("build/i18n")).unwrap();
        fs::write(temp_dir.path().join("ui/i18n/de_DE.ts"), VALID).unwrap();
        fs::write(
            temp_dir.path().join("ui/i18n/fi_FI.ts"),
            VALID.replace("\"de\"", "\"fi\""),
        )
        .unwrap();
        fs::write(temp_dir.path().join("ui/i18n/broken.ts"), "<TS><context><oops").unwrap();
        fs::write(temp_dir.path().join("ui/i18n/notes.txt"), "not a catalog").unwrap();
        fs::write(temp_dir.path().join("build/i18n/de_DE.ts"), VALID).unwrap();
        temp_dir
    }

    #[tokio::test]
    async fn index_workspace_loads_matching_catalogs() {
        let temp_dir = workspace_with_catalogs();
        let db = CatalogDatabaseImpl::default();
        let config_manager = ConfigManager::new();
        let catalogs = Arc::new(Mutex::new(HashMap::new()));

        let indexed = WorkspaceIndexer::new()
            .index_workspace(db, temp_dir.path(), &config_manager, Arc::clone(&catalogs))
            .await
            .unwrap();

        // broken.ts はスキップ、build/ は除外、txt は対象外
        assert_eq!(indexed.len(), 2);
        assert_eq!(catalogs.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn index_workspace_skips_malformed_catalogs() {
        let temp_dir = workspace_with_catalogs();
        let db = CatalogDatabaseImpl::default();
        let config_manager = ConfigManager::new();
        let catalogs = Arc::new(Mutex::new(HashMap::new()));

        let indexed = WorkspaceIndexer::new()
            .index_workspace(db.clone(), temp_dir.path(), &config_manager, catalogs)
            .await
            .unwrap();

        let languages: Vec<String> =
            indexed.iter().map(|catalog| catalog.language(&db)).collect();
        assert_that!(languages, unordered_elements_are![eq("de"), eq("fi")]);
    }

    #[tokio::test]
    async fn index_workspace_honors_custom_exclude() {
        let temp_dir = workspace_with_catalogs();
        let db = CatalogDatabaseImpl::default();
        let mut config_manager = ConfigManager::new();
        let mut settings = LinguistSettings::default();
        settings.exclude_patterns = vec!["**/build/**".to_string(), "**/fi_FI.ts".to_string()];
        config_manager.update_settings(settings).unwrap();
        let catalogs = Arc::new(Mutex::new(HashMap::new()));

        let indexed = WorkspaceIndexer::new()
            .index_workspace(db, temp_dir.path(), &config_manager, catalogs)
            .await
            .unwrap();

        assert_eq!(indexed.len(), 1);
    }

    #[googletest::test]
    fn find_catalog_files_rejects_invalid_pattern() {
        let temp_dir = TempDir::new().unwrap();

        let result = WorkspaceIndexer::find_catalog_files(
            temp_dir.path(),
            "**/{i18n,translations/*.ts",
            &[],
        );

        assert_that!(result, err(matches_pattern!(IndexerError::InvalidPattern(anything()))));
    }
}
