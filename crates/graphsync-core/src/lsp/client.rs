//! LSP Client: Communicates with language servers using async-lsp

use std::process::Stdio;
use std::sync::PoisonError;

use anyhow::Result;
use async_lsp::concurrency::ConcurrencyLayer;
use async_lsp::lsp_types::{
    ClientCapabilities, DidOpenTextDocumentParams, DocumentSymbolClientCapabilities,
    DocumentSymbolParams, InitializeParams, InitializedParams, TextDocumentClientCapabilities,
    TextDocumentIdentifier, TextDocumentItem, Url, WindowClientCapabilities, WorkspaceFolder,
};
use async_lsp::panic::CatchUnwindLayer;
use async_lsp::tracing::TracingLayer;
use async_lsp::{LanguageServer, ServerSocket};
use futures::channel::oneshot;
use tower::ServiceBuilder;

use super::convert::convert_symbol_response;
use super::state::{ClientState, DiagnosticMap, Stop};
use super::types::{LspServerConfig, LspSymbol};

/// Client for communicating with an LSP server using async-lsp
pub struct LspClient {
    server: ServerSocket,
    #[allow(dead_code)]
    mainloop_handle: tokio::task::JoinHandle<()>,
    #[allow(dead_code)]
    child: async_process::Child,
    indexed_rx: Option<oneshot::Receiver<()>>,
    diagnostics: DiagnosticMap,
    config: LspServerConfig,
}

impl LspClient {
    /// Start an LSP server and create a client
    ///
    /// # Errors
    /// Returns an error if the server cannot be started.
    pub async fn start(config: LspServerConfig) -> Result<Self> {
        let (indexed_tx, indexed_rx) = oneshot::channel();
        let diagnostics = DiagnosticMap::default();

        let tokens = config.indexing_tokens.clone();
        let router_diagnostics = diagnostics.clone();
        let (mainloop, server) = async_lsp::MainLoop::new_client(|_server| {
            ServiceBuilder::new()
                .layer(TracingLayer::default())
                .layer(CatchUnwindLayer::default())
                .layer(ConcurrencyLayer::default())
                .service(ClientState::new_router(indexed_tx, tokens, router_diagnostics))
        });

        let mut child = async_process::Command::new(&config.command)
            .args(&config.args)
            .current_dir(&config.root_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to get stdout from LSP process"))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to get stdin from LSP process"))?;

        let mainloop_handle = tokio::spawn(async move {
            if let Err(e) = mainloop.run_buffered(stdout, stdin).await {
                tracing::warn!("LSP mainloop error: {}", e);
            }
        });

        tracing::debug!("Started language server: {}", config.command);

        Ok(Self {
            server,
            mainloop_handle,
            child,
            indexed_rx: Some(indexed_rx),
            diagnostics,
            config,
        })
    }

    /// Initialize the LSP server with the configured root as workspace
    ///
    /// # Errors
    /// Returns an error if initialization fails.
    pub async fn initialize(&mut self) -> Result<()> {
        let root_url = Url::from_directory_path(&self.config.root_path).map_err(|()| {
            anyhow::anyhow!("Root is not absolute: {}", self.config.root_path.display())
        })?;

        tracing::debug!(
            "Initializing LSP with init_options: {:?}",
            self.config.init_options
        );

        #[allow(deprecated)]
        let params = InitializeParams {
            process_id: Some(std::process::id()),
            root_uri: Some(root_url.clone()),
            workspace_folders: Some(vec![WorkspaceFolder {
                uri: root_url,
                name: "root".into(),
            }]),
            capabilities: ClientCapabilities {
                window: Some(WindowClientCapabilities {
                    work_done_progress: Some(true),
                    ..Default::default()
                }),
                text_document: Some(TextDocumentClientCapabilities {
                    document_symbol: Some(DocumentSymbolClientCapabilities {
                        hierarchical_document_symbol_support: Some(true),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            },
            initialization_options: self.config.init_options.clone(),
            ..Default::default()
        };

        let _result = self.server.initialize(params).await?;
        self.server.initialized(InitializedParams {})?;

        Ok(())
    }

    /// Wait for the LSP server to finish indexing, up to the configured
    /// timeout. Timing out is not an error.
    pub async fn wait_for_indexing(&mut self) {
        if let Some(rx) = self.indexed_rx.take() {
            match tokio::time::timeout(self.config.indexing_timeout, rx).await {
                Ok(Ok(())) => {
                    tracing::info!("LSP indexing complete");
                }
                Ok(Err(_)) => {
                    tracing::debug!("Indexing channel closed");
                }
                Err(_) => {
                    tracing::debug!("Indexing wait timed out, proceeding anyway");
                }
            }
        }
    }

    /// Get document symbols for a file
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn document_symbols(&mut self, url: &Url) -> Result<Vec<LspSymbol>> {
        let params = DocumentSymbolParams {
            text_document: TextDocumentIdentifier { uri: url.clone() },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        };

        tracing::debug!("Requesting document symbols for: {}", url);
        let response = self.server.document_symbol(params).await?;
        Ok(convert_symbol_response(response))
    }

    /// Notify the server that a file was opened
    ///
    /// # Errors
    /// Returns an error if the notification fails.
    pub fn did_open(&mut self, url: &Url, text: &str) -> Result<()> {
        self.server.did_open(DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri: url.clone(),
                language_id: self.config.language_id.clone(),
                version: 1,
                text: text.into(),
            },
        })?;

        Ok(())
    }

    /// Diagnostics most recently published for a document
    #[must_use]
    pub fn diagnostics(&self, url: &Url) -> Vec<String> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url.as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Shutdown the LSP server
    ///
    /// # Errors
    /// Returns an error if shutdown fails.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.server.shutdown(()).await?;
        self.server.exit(())?;
        self.server.emit(Stop)?;
        Ok(())
    }
}
