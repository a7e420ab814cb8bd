//! Entry point for the Language Server Protocol implementation.

use linguist_language_server::Backend;
use tower_lsp::{
    LspService,
    Server,
};
use tracing_subscriber::EnvFilter;

/// ログ出力を初期化
///
/// stdout は LSP トランスポートが使うため、`LINGUIST_LS_LOG_DIR` が設定
/// されていればファイルへ、無ければ stderr へ出力する。
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Ok(log_dir) = std::env::var("LINGUIST_LS_LOG_DIR") {
        let appender = tracing_appender::rolling::daily(log_dir, "linguist-ls.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        Some(guard)
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        None
    }
}

#[tokio::main]
async fn main() {
    // WorkerGuard はプロセス終了までログをフラッシュするため保持する
    let _guard = init_tracing();

    let (stdin, stdout) = (tokio::io::stdin(), tokio::io::stdout());
    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
