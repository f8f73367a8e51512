//! GraphQL language server for GraphQL embedded in JavaScript and
//! TypeScript sources.
//!
//! The server speaks LSP over stdio with `lsp-server`. Every incoming message
//! is handled to completion on the main thread, after which queued project
//! work (scans and validation passes) is drained. Diagnostics are pushed to
//! the client as the projects publish them.

mod conversions;
mod server;

use anyhow::Context;

pub use server::run;

/// Initialize tracing for the language server.
///
/// Logs go to stderr, since stdout carries the protocol. Safe to call when a
/// subscriber is already installed.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

/// Run the language server over stdio.
pub fn run_server() -> anyhow::Result<()> {
    init_tracing();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting GraphQL language server");

    let (connection, io_threads) = lsp_server::Connection::stdio();
    run(&connection)?;
    // The io threads finish once every sender is gone
    drop(connection);
    io_threads.join().context("joining the stdio threads")?;

    tracing::info!("GraphQL language server stopped");
    Ok(())
}
