//! The stdio main loop: one message at a time, then drain the project queue.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;
use crossbeam_channel::Sender;
use graphql_config::{is_config_file, ConfigError};
use graphql_project::{ProjectError, Workspace};
use graphql_types::{Diagnostic, FileUri};
use lsp_server::{Connection, ErrorCode, Message, Notification, Request, RequestId, Response};
use lsp_types::{
    CodeLensOptions, CodeLensParams, CompletionOptions, CompletionParams, CompletionResponse,
    DidChangeTextDocumentParams, DidChangeWatchedFilesParams, DidChangeWorkspaceFoldersParams,
    DidCloseTextDocumentParams, DidOpenTextDocumentParams, DidSaveTextDocumentParams,
    FileChangeType, GotoDefinitionParams, GotoDefinitionResponse, Hover, HoverParams,
    HoverProviderCapability, InitializeParams, InitializeResult, LogMessageParams, MessageType,
    OneOf, PublishDiagnosticsParams, ServerCapabilities, ServerInfo, ShowMessageParams,
    TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions,
    TextDocumentSyncSaveOptions, WorkspaceFoldersServerCapabilities, WorkspaceServerCapabilities,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::conversions::{file_uri, ide_position, lsp_uri, uri_to_path, IntoLsp};

const TRIGGER_CHARACTERS: [&str; 7] = [".", "{", "(", " ", ":", "@", "$"];

/// Run the language server on `connection` until the client shuts it down.
pub fn run(connection: &Connection) -> anyhow::Result<()> {
    let (id, params) = connection
        .initialize_start()
        .context("waiting for the initialize request")?;
    let params: InitializeParams =
        serde_json::from_value(params).context("parsing initialize params")?;

    let result = InitializeResult {
        capabilities: server_capabilities(),
        server_info: Some(ServerInfo {
            name: "graphql-lsp".to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }),
    };
    connection
        .initialize_finish(id, serde_json::to_value(result)?)
        .context("completing the initialize handshake")?;
    tracing::info!("GraphQL language server initialized");

    let mut server = Server::new(connection.sender.clone());
    for folder in initial_folders(&params) {
        server.add_folder(folder);
    }
    server.workspace.process_pending_tasks();

    server.main_loop(connection)
}

fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
            open_close: Some(true),
            change: Some(TextDocumentSyncKind::FULL),
            save: Some(TextDocumentSyncSaveOptions::Supported(true)),
            ..Default::default()
        })),
        hover_provider: Some(HoverProviderCapability::Simple(true)),
        definition_provider: Some(OneOf::Left(true)),
        completion_provider: Some(CompletionOptions {
            resolve_provider: Some(true),
            trigger_characters: Some(
                TRIGGER_CHARACTERS
                    .iter()
                    .map(|character| (*character).to_string())
                    .collect(),
            ),
            ..Default::default()
        }),
        code_lens_provider: Some(CodeLensOptions {
            resolve_provider: Some(false),
        }),
        workspace: Some(WorkspaceServerCapabilities {
            workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                supported: Some(true),
                change_notifications: Some(OneOf::Left(true)),
            }),
            file_operations: None,
        }),
        ..Default::default()
    }
}

/// Workspace folders from the initialize request, falling back to the root.
#[allow(deprecated)] // root_uri is still sent by clients without folder support
fn initial_folders(params: &InitializeParams) -> Vec<PathBuf> {
    match &params.workspace_folders {
        Some(folders) => folders
            .iter()
            .filter_map(|folder| uri_to_path(&folder.uri))
            .collect(),
        None => params.root_uri.iter().filter_map(uri_to_path).collect(),
    }
}

struct Server {
    sender: Sender<Message>,
    workspace: Workspace,
    /// Open workspace folders, including ones without a config yet
    folders: Vec<PathBuf>,
}

impl Server {
    fn new(sender: Sender<Message>) -> Self {
        let mut workspace = Workspace::new();
        let publisher = sender.clone();
        workspace.on_diagnostics(Rc::new(move |uri: &FileUri, diagnostics: Vec<Diagnostic>| {
            publish_diagnostics(&publisher, uri, diagnostics);
        }));
        Self {
            sender,
            workspace,
            folders: Vec::new(),
        }
    }

    fn main_loop(&mut self, connection: &Connection) -> anyhow::Result<()> {
        for message in &connection.receiver {
            match message {
                Message::Request(request) => {
                    if connection.handle_shutdown(&request)? {
                        tracing::info!("Shutting down");
                        return Ok(());
                    }
                    let response = self.handle_request(request);
                    self.sender.send(Message::Response(response))?;
                }
                Message::Notification(notification) => {
                    if notification.method == "exit" {
                        return Ok(());
                    }
                    let method = notification.method.clone();
                    if let Err(error) = self.handle_notification(notification) {
                        tracing::warn!(%method, %error, "Failed to handle notification");
                    }
                }
                Message::Response(response) => {
                    tracing::debug!(id = ?response.id, "Ignoring response");
                }
            }

            let processed = self.workspace.process_pending_tasks();
            if processed > 0 {
                tracing::trace!(processed, "Drained project tasks");
            }
        }
        Ok(())
    }

    fn handle_request(&self, request: Request) -> Response {
        let Request { id, method, params } = request;
        tracing::debug!(%method, "Received request");

        match method.as_str() {
            "textDocument/hover" => respond(id, params, |params: HoverParams| self.hover(&params)),
            "textDocument/definition" => {
                respond(id, params, |params: GotoDefinitionParams| self.definition(&params))
            }
            "textDocument/completion" => {
                respond(id, params, |params: CompletionParams| self.completion(&params))
            }
            "completionItem/resolve" => {
                respond(id, params, |item: lsp_types::CompletionItem| item)
            }
            "textDocument/codeLens" => {
                respond(id, params, |params: CodeLensParams| self.code_lens(&params))
            }
            _ => Response::new_err(
                id,
                ErrorCode::MethodNotFound as i32,
                format!("Method not found: {method}"),
            ),
        }
    }

    fn hover(&self, params: &HoverParams) -> Option<Hover> {
        let position = &params.text_document_position_params;
        graphql_ide::hover(
            &self.workspace,
            &file_uri(&position.text_document.uri),
            ide_position(position.position),
        )
        .map(IntoLsp::into_lsp)
    }

    fn definition(&self, params: &GotoDefinitionParams) -> Option<GotoDefinitionResponse> {
        let position = &params.text_document_position_params;
        graphql_ide::goto_definition(
            &self.workspace,
            &file_uri(&position.text_document.uri),
            ide_position(position.position),
        )
        .and_then(IntoLsp::into_lsp)
        .map(GotoDefinitionResponse::Scalar)
    }

    fn completion(&self, params: &CompletionParams) -> Option<CompletionResponse> {
        let position = &params.text_document_position;
        let items = graphql_ide::completions(
            &self.workspace,
            &file_uri(&position.text_document.uri),
            ide_position(position.position),
        );
        Some(CompletionResponse::Array(
            items.into_iter().map(IntoLsp::into_lsp).collect(),
        ))
    }

    fn code_lens(&self, params: &CodeLensParams) -> Option<Vec<lsp_types::CodeLens>> {
        let lenses = graphql_ide::code_lenses(&self.workspace, &file_uri(&params.text_document.uri));
        Some(lenses.into_iter().map(IntoLsp::into_lsp).collect())
    }

    fn handle_notification(&mut self, notification: Notification) -> anyhow::Result<()> {
        let Notification { method, params } = notification;
        tracing::debug!(%method, "Received notification");

        match method.as_str() {
            "textDocument/didOpen" => {
                let params: DidOpenTextDocumentParams = serde_json::from_value(params)?;
                let document = params.text_document;
                self.workspace
                    .document_did_change(&file_uri(&document.uri), &document.text);
            }
            "textDocument/didChange" => {
                let mut params: DidChangeTextDocumentParams = serde_json::from_value(params)?;
                // Full sync: the last change carries the whole text
                if let Some(change) = params.content_changes.pop() {
                    self.workspace
                        .document_did_change(&file_uri(&params.text_document.uri), &change.text);
                }
            }
            "textDocument/didSave" => {
                let params: DidSaveTextDocumentParams = serde_json::from_value(params)?;
                self.workspace
                    .file_did_change(&file_uri(&params.text_document.uri));
            }
            "textDocument/didClose" => {
                // Unsaved edits are discarded, so fall back to the disk contents
                let params: DidCloseTextDocumentParams = serde_json::from_value(params)?;
                self.workspace
                    .file_did_change(&file_uri(&params.text_document.uri));
            }
            "workspace/didChangeWorkspaceFolders" => {
                let params: DidChangeWorkspaceFoldersParams = serde_json::from_value(params)?;
                for folder in params.event.removed {
                    if let Some(path) = uri_to_path(&folder.uri) {
                        self.remove_folder(&path);
                    }
                }
                for folder in params.event.added {
                    if let Some(path) = uri_to_path(&folder.uri) {
                        self.add_folder(path);
                    }
                }
            }
            "workspace/didChangeWatchedFiles" => {
                let params: DidChangeWatchedFilesParams = serde_json::from_value(params)?;
                for change in params.changes {
                    self.watched_file_changed(&change.uri, change.typ);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn watched_file_changed(&mut self, uri: &lsp_types::Uri, change: FileChangeType) {
        let uri = file_uri(uri);
        if let Some(path) = uri.to_file_path().filter(|path| is_config_file(path)) {
            self.reload_config(&path);
        } else if change == FileChangeType::DELETED {
            self.workspace.file_was_deleted(&uri);
        } else {
            self.workspace.file_did_change(&uri);
        }
    }

    fn add_folder(&mut self, folder: PathBuf) {
        self.load_folder(&folder);
        if !self.folders.contains(&folder) {
            self.folders.push(folder);
        }
    }

    fn remove_folder(&mut self, folder: &Path) {
        self.folders.retain(|open| open != folder);
        self.workspace.remove_projects_in_folder(folder);
    }

    /// Set up (or replace) the projects of one open folder.
    fn load_folder(&mut self, folder: &Path) {
        match self.workspace.add_projects_in_folder(folder) {
            Ok(()) => {}
            Err(ProjectError::Config(ConfigError::NotFound(_))) => {
                self.workspace.remove_projects_in_folder(folder);
                tracing::info!(folder = %folder.display(), "No GraphQL config found");
                self.notify(
                    "window/logMessage",
                    LogMessageParams {
                        typ: MessageType::WARNING,
                        message: format!("No GraphQL config found for {}", folder.display()),
                    },
                );
            }
            Err(error) => {
                tracing::error!(folder = %folder.display(), %error, "Failed to load GraphQL projects");
                self.notify(
                    "window/showMessage",
                    ShowMessageParams {
                        typ: MessageType::ERROR,
                        message: format!("GraphQL: {error}"),
                    },
                );
            }
        }
    }

    /// Reload every open folder the config file can govern.
    fn reload_config(&mut self, config_path: &Path) {
        let Some(config_dir) = config_path.parent() else {
            return;
        };
        let folders: Vec<PathBuf> = self
            .folders
            .iter()
            .filter(|folder| folder.starts_with(config_dir) || config_dir.starts_with(folder))
            .cloned()
            .collect();

        for folder in folders {
            tracing::info!(
                config = %config_path.display(),
                folder = %folder.display(),
                "Config changed, reloading projects"
            );
            self.load_folder(&folder);
        }
    }

    fn notify(&self, method: &str, params: impl Serialize) {
        send_notification(&self.sender, method, params);
    }
}

fn respond<P: DeserializeOwned, R: Serialize>(
    id: RequestId,
    params: serde_json::Value,
    handler: impl FnOnce(P) -> R,
) -> Response {
    match serde_json::from_value(params) {
        Ok(params) => Response::new_ok(id, handler(params)),
        Err(error) => {
            tracing::warn!(%error, "Invalid request parameters");
            Response::new_err(id, ErrorCode::InvalidParams as i32, error.to_string())
        }
    }
}

fn publish_diagnostics(sender: &Sender<Message>, uri: &FileUri, diagnostics: Vec<Diagnostic>) {
    let Some(lsp_uri) = lsp_uri(uri) else {
        tracing::warn!(uri = %uri, "Cannot publish diagnostics for an invalid URI");
        return;
    };
    tracing::debug!(uri = %uri, count = diagnostics.len(), "Publishing diagnostics");

    let params = PublishDiagnosticsParams {
        uri: lsp_uri,
        diagnostics: diagnostics.into_iter().map(IntoLsp::into_lsp).collect(),
        version: None,
    };
    send_notification(sender, "textDocument/publishDiagnostics", params);
}

fn send_notification(sender: &Sender<Message>, method: &str, params: impl Serialize) {
    let notification = Notification::new(method.to_string(), params);
    if sender.send(Message::Notification(notification)).is_err() {
        tracing::warn!(method, "Client connection closed, dropping notification");
    }
}
