//! LSP client state and notification handling

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, PoisonError};

use async_lsp::lsp_types::{
    LogMessageParams, NumberOrString, ProgressParams, ProgressParamsValue,
    PublishDiagnosticsParams, ShowMessageParams, WorkDoneProgress, WorkDoneProgressCreateParams,
};
use async_lsp::router::Router;
use async_lsp::{LanguageClient, ResponseError};
use futures::channel::oneshot;

/// Latest published diagnostics, keyed by document URI
pub type DiagnosticMap = Arc<Mutex<HashMap<String, Vec<String>>>>;

/// Client state for handling LSP notifications
pub(super) struct ClientState {
    indexed_tx: Option<oneshot::Sender<()>>,
    indexing_tokens: Vec<String>,
    diagnostics: DiagnosticMap,
}

impl ClientState {
    pub(super) fn new(
        indexed_tx: Option<oneshot::Sender<()>>,
        indexing_tokens: Vec<String>,
        diagnostics: DiagnosticMap,
    ) -> Self {
        Self {
            indexed_tx,
            indexing_tokens,
            diagnostics,
        }
    }

    fn is_indexing_token(&self, token: &NumberOrString) -> bool {
        match token {
            _ if self.indexing_tokens.is_empty() => true,
            NumberOrString::String(s) => self.indexing_tokens.iter().any(|t| t == s),
            NumberOrString::Number(_) => false,
        }
    }
}

/// Event to signal stopping the client
pub(super) struct Stop;

impl LanguageClient for ClientState {
    type Error = ResponseError;
    type NotifyResult = ControlFlow<async_lsp::Result<()>>;

    fn progress(&mut self, params: ProgressParams) -> Self::NotifyResult {
        let is_end_progress = matches!(
            params.value,
            ProgressParamsValue::WorkDone(WorkDoneProgress::End(_))
        );

        if is_end_progress && self.is_indexing_token(&params.token) {
            if let Some(tx) = self.indexed_tx.take() {
                let _ = tx.send(());
            }
        }
        ControlFlow::Continue(())
    }

    fn publish_diagnostics(&mut self, params: PublishDiagnosticsParams) -> Self::NotifyResult {
        let messages = params
            .diagnostics
            .into_iter()
            .map(|d| match d.code {
                Some(NumberOrString::String(code)) => format!("{code}: {}", d.message),
                Some(NumberOrString::Number(code)) => format!("{code}: {}", d.message),
                None => d.message,
            })
            .collect();

        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(params.uri.to_string(), messages);
        ControlFlow::Continue(())
    }

    fn show_message(&mut self, params: ShowMessageParams) -> Self::NotifyResult {
        tracing::debug!("LSP message {:?}: {}", params.typ, params.message);
        ControlFlow::Continue(())
    }

    fn log_message(&mut self, params: LogMessageParams) -> Self::NotifyResult {
        tracing::debug!("LSP log {:?}: {}", params.typ, params.message);
        ControlFlow::Continue(())
    }

    fn work_done_progress_create(
        &mut self,
        _params: WorkDoneProgressCreateParams,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<(), ResponseError>> + Send + 'static>,
    > {
        Box::pin(async { Ok(()) })
    }
}

impl ClientState {
    pub(super) fn new_router(
        indexed_tx: oneshot::Sender<()>,
        indexing_tokens: Vec<String>,
        diagnostics: DiagnosticMap,
    ) -> Router<Self> {
        let mut router =
            Router::from_language_client(Self::new(Some(indexed_tx), indexing_tokens, diagnostics));
        router.request::<async_lsp::lsp_types::request::WorkDoneProgressCreate, _>(
            Self::work_done_progress_create,
        );
        router.event(Self::on_stop);
        router
    }

    fn on_stop(&mut self, _: Stop) -> ControlFlow<async_lsp::Result<()>> {
        ControlFlow::Break(Ok(()))
    }
}
