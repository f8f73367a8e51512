//! Standalone GraphQL language server binary.

fn main() -> anyhow::Result<()> {
    graphql_lsp::run_server()
}
