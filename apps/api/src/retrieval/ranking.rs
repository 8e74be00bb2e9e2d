
use tracing::warn;

use crate::models::case::{Case, ScoredCase};
use crate::models::diagnosis::Diagnosis;
use crate::retrieval::cache::CaseEmbeddings;

pub const DEFAULT_TOP_K: usize = 3;

/// Query text: both diagnosis tiers, the gap, then auxiliary context.
/// An absent tier renders as an empty string.
pub fn build_query_text(diagnosis: &Diagnosis, gap_text: &str, other_content: &str) -> String {
    format!(
        "{} {} {} {}",
        diagnosis.primary(),
        diagnosis.secondary(),
        gap_text,
        other_content
    )
}

/// Plain inner product. Vectors are assumed unit-length by the provider,
/// so this is not divided by magnitudes.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Scores every embedded case against `query`, sorts descending (stable, so
/// ties keep load order), keeps `top_k`, and resolves ids back to cases.
/// Ids with no matching case are skipped.
pub fn rank(
    query: &[f32],
    embeddings: &CaseEmbeddings,
    cases: &[Case],
    top_k: usize,
) -> Vec<ScoredCase> {
    let mut scored: Vec<(&str, f32)> = embeddings
        .iter()
        .map(|(id, vector)| {
            if vector.len() != query.len() {
                warn!(
                    "Embedding dimension mismatch for case '{}': {} vs query {}",
                    id,
                    vector.len(),
                    query.len()
                );
            }
            (id, dot(query, vector))
        })
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .take(top_k)
        .filter_map(|(id, score)| {
            cases.iter().find(|c| c.id == id).map(|case| ScoredCase {
                case: case.clone(),
                similarity_score: score,
            })
        })
        .collect()
}
