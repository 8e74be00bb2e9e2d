// Case Retriever
// Embeds every stored case once, embeds each query fresh, and ranks cases by
// inner product. The embedding cache is owned here and shared via AppState.

pub mod cache;
pub mod ranking;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::LanguageModel;
use crate::models::case::{Case, ScoredCase};
use crate::models::diagnosis::Diagnosis;

pub use cache::EmbeddingCache;
pub use ranking::{build_query_text, rank, DEFAULT_TOP_K};

/// Retrieval entry point held by the application state for the process lifetime.
pub struct CaseRetriever {
    cache: EmbeddingCache,
    top_k: usize,
}

impl CaseRetriever {
    pub fn new(top_k: usize) -> Self {
        Self {
            cache: EmbeddingCache::new(),
            top_k,
        }
    }

    /// True once case embeddings have been computed for this process.
    pub fn is_warm(&self) -> bool {
        self.cache.is_populated()
    }

    /// Embeds a query string with the same model used for case vectors.
    pub async fn embed_query(
        &self,
        model: &dyn LanguageModel,
        text: &str,
    ) -> Result<Vec<f32>, AppError> {
        model
            .embed(text)
            .await
            .map_err(|e| AppError::Llm(format!("Query embedding failed: {e}")))
    }

    /// Returns the `top_k` cases most similar to the diagnosis plus note text.
    pub async fn find_similar(
        &self,
        model: &dyn LanguageModel,
        cases: &[Case],
        diagnosis: &Diagnosis,
        gap_text: &str,
        other_content: &str,
    ) -> Result<Vec<ScoredCase>, AppError> {
        let embeddings = self
            .cache
            .get_or_compute(model, cases)
            .await
            .map_err(|e| AppError::Llm(format!("Case embedding failed: {e}")))?;

        if embeddings.is_empty() {
            warn!("Case store is empty; no similar cases to rank");
        }

        let query_text = build_query_text(diagnosis, gap_text, other_content);
        let query = self.embed_query(model, &query_text).await?;

        let ranked = rank(&query, &embeddings, cases, self.top_k);
        info!(
            "Retrieved {} similar cases (top_k={}, pool={})",
            ranked.len(),
            self.top_k,
            embeddings.len()
        );
        Ok(ranked)
    }
}

impl Default for CaseRetriever {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::StubModel;

    fn case(id: &str, gap: &str) -> Case {
        Case {
            id: id.into(),
            gap_text: gap.into(),
            ..Case::default()
        }
    }

    fn diagnosis() -> Diagnosis {
        Diagnosis {
            tier1_categories: Some("Cognitive".into()),
            tier2_categories: Some("Assessing risks".into()),
            ..Diagnosis::default()
        }
    }

    fn model() -> StubModel {
        StubModel::new()
            // query text always starts with the diagnosis tiers
            .with_embedding("QUERY", vec![1.0, 0.0, 0.0])
            .with_embedding("risk gap", vec![0.9, 0.1, 0.0])
            .with_embedding("visual gap", vec![0.1, 0.9, 0.0])
            .with_embedding("fear gap", vec![0.5, 0.5, 0.0])
    }

    #[tokio::test]
    async fn test_find_similar_ranks_and_truncates() {
        let cases = vec![
            case("01", "visual gap"),
            case("02", "risk gap"),
            case("03", "fear gap"),
        ];
        let retriever = CaseRetriever::new(2);
        let results = retriever
            .find_similar(&model(), &cases, &diagnosis(), "QUERY", "")
            .await
            .unwrap();

        let ids: Vec<&str> = results.iter().map(|r| r.case.id.as_str()).collect();
        assert_eq!(ids, vec!["02", "03"]);
        assert!((results[0].similarity_score - 0.9).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_case_embeddings_computed_once_per_process() {
        let cases = vec![case("01", "risk gap"), case("02", "visual gap")];
        let model = model();
        let retriever = CaseRetriever::default();

        retriever
            .find_similar(&model, &cases, &diagnosis(), "QUERY", "")
            .await
            .unwrap();
        // two cases + one query
        assert_eq!(model.embed_calls(), 3);

        retriever
            .find_similar(&model, &cases, &diagnosis(), "QUERY", "again")
            .await
            .unwrap();
        // only the fresh query embedding
        assert_eq!(model.embed_calls(), 4);
    }
}
