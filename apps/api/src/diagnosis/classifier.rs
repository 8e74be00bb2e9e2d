//! Diagnosis Classifier — asks the chat model to categorize a note and reads
//! the categories back out of its free-text reply by line prefix.

use tracing::info;

use crate::diagnosis::prompts::{
    CLASSIFY_PROMPT_TEMPLATE, CLASSIFY_TEMPERATURE, LEGACY_PREFIX, REASONING_PREFIX,
    TIER1_PREFIX, TIER2_PREFIX,
};
use crate::errors::AppError;
use crate::llm_client::LanguageModel;
use crate::models::diagnosis::Diagnosis;

/// Classifies `note` against `codebook`. A reply missing any expected line
/// yields `None` for that field; only transport/API failures are errors.
pub async fn classify(
    model: &dyn LanguageModel,
    codebook: &str,
    note: &str,
) -> Result<Diagnosis, AppError> {
    let prompt = CLASSIFY_PROMPT_TEMPLATE
        .replace("{codebook}", codebook)
        .replace("{note}", note);

    let analysis = model
        .chat(&prompt, CLASSIFY_TEMPERATURE)
        .await
        .map_err(|e| AppError::Llm(format!("Diagnosis failed: {e}")))?;

    let diagnosis = parse_diagnosis(&analysis);
    info!(
        "Diagnosis parsed: tier1={:?} tier2={:?}",
        diagnosis.tier1_categories, diagnosis.tier2_categories
    );
    Ok(diagnosis)
}

/// Scans `analysis` line by line for the known field prefixes (case-sensitive,
/// anchored at column 0). Later tier lines overwrite earlier ones; the legacy
/// `Categories:` line only fills fields that are still unset or empty.
pub fn parse_diagnosis(analysis: &str) -> Diagnosis {
    let mut tier1: Option<String> = None;
    let mut tier2: Option<String> = None;
    let mut reasoning: Option<String> = None;

    for line in analysis.split('\n') {
        if let Some(rest) = line.strip_prefix(TIER1_PREFIX) {
            tier1 = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(TIER2_PREFIX) {
            tier2 = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(REASONING_PREFIX) {
            reasoning = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(LEGACY_PREFIX) {
            let tokens: Vec<&str> = rest.split_whitespace().collect();
            if let Some(first) = tokens.first() {
                if is_unset(&tier1) {
                    tier1 = Some(first.to_string());
                }
            }
            if tokens.len() >= 2 && is_unset(&tier2) {
                tier2 = Some(tokens[1..].join(" "));
            }
        }
    }

    Diagnosis {
        tier1_categories: tier1,
        tier2_categories: tier2,
        reasoning,
        full_analysis: analysis.to_string(),
    }
}

fn is_unset(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::StubModel;

    #[test]
    fn test_parses_all_three_fields() {
        let output = "Reasoning: The coach notes rushed planning.\n\
                      Tier 1 Categories: Cognitive\n\
                      Tier 2 Categories: Assessing risks";
        let d = parse_diagnosis(output);
        assert_eq!(d.tier1_categories.as_deref(), Some("Cognitive"));
        assert_eq!(d.tier2_categories.as_deref(), Some("Assessing risks"));
        assert_eq!(d.reasoning.as_deref(), Some("The coach notes rushed planning."));
        assert_eq!(d.full_analysis, output);
    }

    #[test]
    fn test_order_and_surrounding_text_do_not_matter() {
        let output = "Here is my analysis.\n\
                      Tier 2 Categories: Assessing risks\n\
                      Some commentary in between.\n\
                      Tier 1 Categories: Cognitive\n\
                      Hope this helps!";
        let d = parse_diagnosis(output);
        assert_eq!(d.tier1_categories.as_deref(), Some("Cognitive"));
        assert_eq!(d.tier2_categories.as_deref(), Some("Assessing risks"));
    }

    #[test]
    fn test_missing_tier2_line_is_none() {
        let d = parse_diagnosis("Reasoning: short\nTier 1 Categories: Emotional");
        assert_eq!(d.tier1_categories.as_deref(), Some("Emotional"));
        assert!(d.tier2_categories.is_none());
    }

    #[test]
    fn test_prefixes_are_case_sensitive_and_anchored() {
        let d = parse_diagnosis("tier 1 categories: Cognitive\n  Tier 2 Categories: Assessing risks");
        assert!(d.tier1_categories.is_none());
        assert!(d.tier2_categories.is_none());
    }

    #[test]
    fn test_legacy_categories_line_splits_first_token() {
        let d = parse_diagnosis("Categories: Metacognitive Forming feasible plans");
        assert_eq!(d.tier1_categories.as_deref(), Some("Metacognitive"));
        assert_eq!(d.tier2_categories.as_deref(), Some("Forming feasible plans"));
    }

    #[test]
    fn test_legacy_line_does_not_override_tier_lines() {
        let d = parse_diagnosis(
            "Tier 1 Categories: Cognitive\nTier 2 Categories: Assessing risks\nCategories: Emotional Fears and anxieties",
        );
        assert_eq!(d.tier1_categories.as_deref(), Some("Cognitive"));
        assert_eq!(d.tier2_categories.as_deref(), Some("Assessing risks"));
    }

    #[test]
    fn test_legacy_single_token_leaves_secondary_unset() {
        let d = parse_diagnosis("Categories: Emotional");
        assert_eq!(d.tier1_categories.as_deref(), Some("Emotional"));
        assert!(d.tier2_categories.is_none());
    }

    #[test]
    fn test_empty_output_yields_all_none() {
        let d = parse_diagnosis("");
        assert_eq!(
            d,
            Diagnosis {
                full_analysis: String::new(),
                ..Diagnosis::default()
            }
        );
    }

    #[tokio::test]
    async fn test_classify_embeds_codebook_and_note_at_low_temperature() {
        let model = StubModel::new()
            .with_chat_reply("Tier 1 Categories: Cognitive\nTier 2 Categories: Assessing risks");
        let d = classify(&model, "CODEBOOK-TEXT", "Title: Rushed\nGap: skips risks")
            .await
            .unwrap();

        assert_eq!(d.tier2_categories.as_deref(), Some("Assessing risks"));
        let (prompt, temperature) = model.prompt_at(0);
        assert!(prompt.contains("CODEBOOK-TEXT"));
        assert!(prompt.contains("Gap: skips risks"));
        assert!((temperature - CLASSIFY_TEMPERATURE).abs() < f32::EPSILON);
    }
}
