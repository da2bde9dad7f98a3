//! Ordered handler selection

use std::path::Path;
use std::sync::Arc;

use super::handlers::{
    CssHandler, HtmlHandler, JavaScriptHandler, JsonHandler, ProjectFileHandler, RazorHandler,
    SourceHandler, XamlHandler, XmlHandler,
};
use super::{DocumentHandler, Extraction, ExtractionStats, FileContext, apply_accessibility};
use crate::facts::FactProvider;
use crate::graph::model::Accessibility;

/// Routes each file to the first handler that accepts it
#[derive(Default)]
pub struct Dispatcher {
    handlers: Vec<Box<dyn DocumentHandler>>,
}

impl Dispatcher {
    /// An empty dispatcher; every file is unhandled until handlers are added
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The default handler set, in priority order
    #[must_use]
    pub fn with_defaults(facts: Arc<dyn FactProvider>) -> Self {
        Self::new()
            .with_handler(SourceHandler::new(facts))
            .with_handler(RazorHandler)
            .with_handler(XamlHandler)
            .with_handler(ProjectFileHandler)
            .with_handler(XmlHandler)
            .with_handler(JsonHandler)
            .with_handler(CssHandler)
            .with_handler(JavaScriptHandler)
            .with_handler(HtmlHandler)
    }

    /// Append a handler with the lowest priority so far
    #[must_use]
    pub fn with_handler(mut self, handler: impl DocumentHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    #[must_use]
    pub fn handler_for(&self, path: &Path) -> Option<&dyn DocumentHandler> {
        self.handlers
            .iter()
            .find(|h| h.can_handle(path))
            .map(|h| h.as_ref())
    }

    /// Names of the registered handlers, in priority order
    #[must_use]
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Extract one file and filter the result by accessibility
    pub async fn extract(
        &self,
        ctx: &FileContext<'_>,
        min_accessibility: Accessibility,
        stats: &mut ExtractionStats,
    ) -> Extraction {
        let Some(handler) = self.handler_for(ctx.path) else {
            tracing::debug!("No handler for {}", ctx.file_path);
            stats.record_unhandled();
            return Extraction::default();
        };

        stats.record(handler.name());
        let extraction = handler.handle(ctx, min_accessibility).await;
        let filtered = apply_accessibility(extraction, min_accessibility);

        tracing::debug!(
            "{} extracted {} symbols, {} relationships from {}",
            handler.name(),
            filtered.symbols.len(),
            filtered.relationships.len(),
            ctx.file_path
        );
        filtered
    }
}
