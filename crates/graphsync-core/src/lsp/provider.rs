//! Language-server-backed [`FactProvider`]

use std::collections::HashSet;
use std::path::Path;

use async_lsp::lsp_types::Url;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::client::LspClient;
use super::convert::to_declared;
use super::types::LspServerConfig;
use crate::facts::{DeclaredSymbol, FactError, FactProvider};

struct Session {
    client: LspClient,
    opened: HashSet<Url>,
}

/// Serves declarations from a running language server. Requests are
/// serialized; each document is opened once per session.
pub struct LspFactProvider {
    session: Mutex<Session>,
}

impl LspFactProvider {
    /// Start the server, initialize it and wait for indexing to settle
    ///
    /// # Errors
    /// Returns an error if the server cannot be started or initialized.
    pub async fn start(config: LspServerConfig) -> anyhow::Result<Self> {
        let mut client = LspClient::start(config).await?;
        client.initialize().await?;
        client.wait_for_indexing().await;
        Ok(Self::from_client(client))
    }

    #[must_use]
    pub fn from_client(client: LspClient) -> Self {
        Self {
            session: Mutex::new(Session {
                client,
                opened: HashSet::new(),
            }),
        }
    }

    /// Shut the server down
    ///
    /// # Errors
    /// Returns an error if the shutdown handshake fails.
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.session.lock().await.client.shutdown().await
    }
}

fn document_url(path: &Path) -> Result<Url, FactError> {
    Url::from_file_path(path)
        .map_err(|()| FactError::Server(format!("Not an absolute path: {}", path.display())))
}

#[async_trait]
impl FactProvider for LspFactProvider {
    async fn declared_symbols(
        &self,
        path: &Path,
        content: &str,
    ) -> Result<Vec<DeclaredSymbol>, FactError> {
        let url = document_url(path)?;
        let mut session = self.session.lock().await;

        if !session.opened.contains(&url) {
            session
                .client
                .did_open(&url, content)
                .map_err(|e| FactError::Server(e.to_string()))?;
            session.opened.insert(url.clone());
        }

        let symbols = session
            .client
            .document_symbols(&url)
            .await
            .map_err(|e| FactError::Server(e.to_string()))?;
        Ok(to_declared(&symbols, content))
    }

    async fn diagnostics(&self, path: &Path) -> Vec<String> {
        let Ok(url) = document_url(path) else {
            return Vec::new();
        };
        self.session.lock().await.client.diagnostics(&url)
    }
}
