use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::llm_client::{LanguageModel, LlmError};
use crate::models::case::Case;

/// Case vectors in load order, one per distinct case id.
#[derive(Debug, Clone, Default)]
pub struct CaseEmbeddings {
    entries: Vec<(String, Vec<f32>)>,
}

impl CaseEmbeddings {
    pub fn from_entries(entries: Vec<(String, Vec<f32>)>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.entries
            .iter()
            .map(|(id, vector)| (id.as_str(), vector.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Process-wide case embedding cache. Filled on first access and never
/// invalidated; a case store change needs a restart. A failed fill leaves the
/// cache empty so the next request tries again.
pub struct EmbeddingCache {
    cell: OnceCell<Arc<CaseEmbeddings>>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub fn is_populated(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn get_or_compute(
        &self,
        model: &dyn LanguageModel,
        cases: &[Case],
    ) -> Result<Arc<CaseEmbeddings>, LlmError> {
        let embeddings = self
            .cell
            .get_or_try_init(|| async move {
                let computed = compute_case_embeddings(model, cases).await?;
                Ok::<_, LlmError>(Arc::new(computed))
            })
            .await?;
        Ok(Arc::clone(embeddings))
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Embeds every case once. A repeated id keeps its first occurrence.
async fn compute_case_embeddings(
    model: &dyn LanguageModel,
    cases: &[Case],
) -> Result<CaseEmbeddings, LlmError> {
    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(cases.len());

    for case in cases {
        if !seen.insert(case.id.as_str()) {
            warn!("Duplicate case id '{}' skipped for embedding", case.id);
            continue;
        }
        let vector = model.embed(&case.embedding_text()).await?;
        entries.push((case.id.clone(), vector));
    }

    info!("Computed embeddings for {} cases", entries.len());
    Ok(CaseEmbeddings::from_entries(entries))
}
