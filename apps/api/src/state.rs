use std::sync::Arc;

use crate::llm_client::LanguageModel;
use crate::retrieval::CaseRetriever;
use crate::session::SessionStore;
use crate::store::Resources;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Provider seam. `LlmClient` in production, a stub in tests.
    pub llm: Arc<dyn LanguageModel>,
    /// Codebook, cases and skeletons — read-only after startup.
    pub resources: Arc<Resources>,
    /// Owns the process-wide case embedding cache.
    pub retriever: Arc<CaseRetriever>,
    pub sessions: SessionStore,
}
