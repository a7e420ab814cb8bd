//! LSP Backend 実装

use std::sync::Arc;

use tokio::sync::Mutex;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    Diagnostic,
    DiagnosticSeverity,
    DidChangeConfigurationParams,
    DidChangeTextDocumentParams,
    DidChangeWatchedFilesParams,
    DidChangeWorkspaceFoldersParams,
    DidCloseTextDocumentParams,
    DidOpenTextDocumentParams,
    DidSaveTextDocumentParams,
    ExecuteCommandOptions,
    ExecuteCommandParams,
    Hover,
    HoverContents,
    HoverParams,
    HoverProviderCapability,
    InitializeParams,
    InitializeResult,
    InitializedParams,
    MarkupContent,
    MarkupKind,
    MessageType,
    OneOf,
    Position,
    Range,
    ServerCapabilities,
    TextDocumentSyncCapability,
    TextDocumentSyncKind,
    Url,
    WorkDoneProgressOptions,
    WorkspaceFolder,
    WorkspaceFoldersServerCapabilities,
    WorkspaceServerCapabilities,
};
use tower_lsp::{
    Client,
    LanguageServer,
};

use crate::catalog::input::Catalog;
use crate::catalog::parse::CatalogError;
use crate::catalog::queries::message_at_position;
use crate::config::{
    ConfigManager,
    LinguistSettings,
    ServerSettings,
};
use crate::db::CatalogDatabaseImpl;
use crate::ide::state::ServerState;
use crate::indexer::workspace::WorkspaceIndexer;

/// ワークスペースを再インデックスするコマンド名
const REINDEX_COMMAND: &str = "linguist.reindexWorkspace";

/// LSP Backend
#[derive(Clone)]
pub struct Backend {
    /// LSP クライアント
    pub client: Client,
    /// 設定管理
    pub config_manager: Arc<Mutex<ConfigManager>>,
    /// ワークスペースインデクサー
    pub workspace_indexer: Arc<WorkspaceIndexer>,
    /// 共有状態
    pub state: ServerState,
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("config_manager", &"<ConfigManager>")
            .field("workspace_indexer", &"<WorkspaceIndexer>")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Backend {
    /// 新しい Backend を作成
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            config_manager: Arc::new(Mutex::new(ConfigManager::new())),
            workspace_indexer: Arc::new(WorkspaceIndexer::new()),
            state: ServerState::new(CatalogDatabaseImpl::default()),
        }
    }

    /// ワークスペースフォルダを取得
    ///
    /// クライアントからワークスペースフォルダのリストを取得します。
    /// フォルダが設定されていない場合は空のVecを返します。
    ///
    /// # Errors
    /// クライアントとの通信に失敗した場合
    async fn get_workspace_folders(&self) -> Result<Vec<WorkspaceFolder>> {
        self.client.workspace_folders().await.map(Option::unwrap_or_default)
    }

    /// 全ワークスペースフォルダをインデックス
    async fn index_all_folders(&self) {
        let Ok(workspace_folders) = self.get_workspace_folders().await else {
            return;
        };

        for folder in workspace_folders {
            let Ok(workspace_path) = folder.uri.to_file_path() else {
                continue;
            };

            // ConfigManager をロックして参照を取得
            let config_manager = self.config_manager.lock().await;

            // Database をクローン（Salsa のクローンは安価）
            let db = self.state.db.lock().await.clone();

            // catalogs マップをクローン（Arc のクローンは安価）
            let catalogs = Arc::clone(&self.state.catalogs);

            match self
                .workspace_indexer
                .index_workspace(db, &workspace_path, &config_manager, catalogs)
                .await
            {
                Ok(indexed) => {
                    self.client
                        .log_message(
                            MessageType::INFO,
                            format!("Indexed {} translation catalogs", indexed.len()),
                        )
                        .await;
                }
                Err(error) => {
                    self.client
                        .log_message(
                            MessageType::ERROR,
                            format!("error indexing workspace: {error}"),
                        )
                        .await;
                }
            }
        }
    }

    /// ワークスペースを再インデックス
    ///
    /// 新しい Salsa データベースを作成して、全カタログを再インデックスします。
    /// これにより、設定変更が反映され、古いキャッシュがクリアされます。
    async fn reindex_workspace(&self) {
        self.client.log_message(MessageType::INFO, "Reindexing workspace...").await;

        // 新しい Salsa データベースを作成（古いキャッシュをクリア）
        *self.state.db.lock().await = CatalogDatabaseImpl::default();
        self.state.catalogs.lock().await.clear();

        self.index_all_folders().await;
        self.client.log_message(MessageType::INFO, "Reindexing complete").await;
    }

    /// カタログ内容を更新して診断を発行
    ///
    /// 既存入力があれば再パースして上書きし、無ければ新規作成します。
    /// パースに失敗した場合はロードエラーを単一の診断として発行します。
    async fn refresh_catalog(&self, uri: &Url, text: String) {
        let Ok(file_path) = uri.to_file_path() else {
            tracing::warn!("Failed to convert URI to file path: {}", uri);
            return;
        };

        let settings = self.config_manager.lock().await.get_settings().clone();
        let policy = settings.duplicate_messages;

        let diagnostics = {
            let (mut db, mut catalogs) = self.state.lock_db_and_catalogs().await;

            let refreshed = match catalogs.get(&file_path).copied() {
                Some(catalog) => catalog
                    .update_source(&mut *db, &file_path, text, policy)
                    .map(|()| catalog),
                None => Catalog::from_source(&*db, &file_path, text, policy).map(|catalog| {
                    catalogs.insert(file_path.clone(), catalog);
                    catalog
                }),
            };

            match refreshed {
                Ok(catalog) => {
                    let all: Vec<Catalog> = catalogs.values().copied().collect();
                    crate::ide::diagnostics::generate_diagnostics(&*db, catalog, &all, &settings)
                }
                Err(error) => {
                    tracing::debug!(uri = %uri, %error, "Catalog failed to parse");
                    vec![load_error_diagnostic(&error)]
                }
            }
        };

        self.client.publish_diagnostics(uri.clone(), diagnostics, None).await;

        tracing::debug!(uri = %uri, "Catalog refreshed and diagnostics sent");
    }
}

/// ロードエラーを文書先頭の診断に変換
fn load_error_diagnostic(error: &CatalogError) -> Diagnostic {
    Diagnostic {
        range: Range {
            start: Position { line: 0, character: 0 },
            end: Position { line: 0, character: 0 },
        },
        severity: Some(DiagnosticSeverity::ERROR),
        code: None,
        code_description: None,
        source: Some("linguist-i18n".to_string()),
        message: format!("{error}"),
        related_information: None,
        tags: None,
        data: None,
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        // ワークスペースルートを取得
        let workspace_root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .and_then(|folder| folder.uri.to_file_path().ok());

        // ConfigManager に設定を読み込ませる
        let mut config_manager = self.config_manager.lock().await;
        if let Err(error) = config_manager.load_settings(workspace_root) {
            self.client
                .log_message(MessageType::ERROR, format!("Configuration error: {error}"))
                .await;
            tracing::error!("Configuration error during initialize: {}", error);
        }
        drop(config_manager); // ロックを早めに解放

        Ok(InitializeResult {
            server_info: None,
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![REINDEX_COMMAND.to_string()],
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                }),
                workspace: Some(WorkspaceServerCapabilities {
                    workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                        supported: Some(true),
                        change_notifications: Some(OneOf::Left(true)),
                    }),
                    file_operations: None,
                }),
                ..ServerCapabilities::default()
            },
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client.log_message(MessageType::INFO, "initialized!").await;

        self.index_all_folders().await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_change_workspace_folders(&self, _: DidChangeWorkspaceFoldersParams) {
        self.client.log_message(MessageType::INFO, "workspace folders changed!").await;
        self.reindex_workspace().await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.client.log_message(MessageType::INFO, "configuration changed!").await;

        // `{"linguist": {...}}` 形式と素の設定オブジェクトの両方を受け付ける
        let parsed = serde_json::from_value::<ServerSettings>(params.settings.clone())
            .map(|settings| settings.linguist)
            .or_else(|_| serde_json::from_value::<LinguistSettings>(params.settings));

        let Ok(new_settings) = parsed else {
            return;
        };

        let mut config_manager = self.config_manager.lock().await;
        match config_manager.update_settings(new_settings) {
            Ok(()) => {
                drop(config_manager); // ロックを解放
                self.client
                    .log_message(MessageType::INFO, "Configuration updated successfully")
                    .await;

                // 設定変更後、ワークスペースを再インデックス
                self.reindex_workspace().await;
            }
            Err(error) => {
                self.client
                    .log_message(
                        MessageType::ERROR,
                        format!("Configuration validation error: {error}"),
                    )
                    .await;
            }
        }
    }

    async fn did_change_watched_files(&self, _: DidChangeWatchedFilesParams) {
        self.client.log_message(MessageType::INFO, "watched files have changed!").await;
        self.reindex_workspace().await;
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        self.state.opened_files.lock().await.insert(uri.clone());

        self.refresh_catalog(&uri, params.text_document.text).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;

        // 変更内容を取得（FULL sync なので全体のテキストが送られてくる）
        let Some(change) = params.content_changes.into_iter().next_back() else {
            return;
        };

        self.refresh_catalog(&uri, change.text).await;
    }

    async fn did_save(&self, _: DidSaveTextDocumentParams) {
        self.client.log_message(MessageType::INFO, "file saved!").await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.state.opened_files.lock().await.remove(&params.text_document.uri);
        self.client.log_message(MessageType::INFO, "file closed!").await;
    }

    async fn execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> Result<Option<serde_json::Value>> {
        if params.command == REINDEX_COMMAND {
            self.reindex_workspace().await;
        } else {
            tracing::warn!(command = %params.command, "Unknown command");
        }
        Ok(None)
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        tracing::debug!(uri = %uri, line = position.line, character = position.character, "Hover request");

        // ファイルパスを取得
        let Ok(file_path) = uri.to_file_path() else {
            tracing::warn!("Failed to convert URI to file path: {}", uri);
            return Ok(None);
        };

        let settings = self.config_manager.lock().await.get_settings().clone();

        let (db, catalogs) = self.state.lock_db_and_catalogs().await;

        // Catalog を取得
        let Some(catalog) = catalogs.get(&file_path).copied() else {
            tracing::debug!("Catalog not found in cache: {}", file_path.display());
            return Ok(None);
        };

        // カーソル位置のメッセージを取得
        let source_position = crate::types::SourcePosition::from(position);
        let Some(message) = message_at_position(&*db, catalog, source_position) else {
            tracing::debug!("No message found at position");
            return Ok(None);
        };

        // 全カタログを対象にホバー内容を生成
        let all: Vec<Catalog> = catalogs.values().copied().collect();
        let Some(hover_text) = crate::ide::hover::generate_hover_content(
            &*db,
            message.id(&*db),
            &all,
            settings.current_language.as_deref(),
            settings.primary_languages.as_deref(),
        ) else {
            tracing::debug!("No translations found for message");
            return Ok(None);
        };

        let range = message.element_range(&*db);

        Ok(Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: hover_text,
            }),
            range: Some(range.into()),
        }))
    }
}
