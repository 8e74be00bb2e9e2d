// All LLM prompt constants for the Diagnosis module.

/// Near-deterministic sampling for categorization.
pub const CLASSIFY_TEMPERATURE: f32 = 0.2;

pub const TIER1_PREFIX: &str = "Tier 1 Categories:";
pub const TIER2_PREFIX: &str = "Tier 2 Categories:";
pub const REASONING_PREFIX: &str = "Reasoning:";
/// Older codebook output format: primary token first, secondary after it.
pub const LEGACY_PREFIX: &str = "Categories:";

/// Classification prompt template. Replace `{codebook}` and `{note}` before sending.
pub const CLASSIFY_PROMPT_TEMPLATE: &str = r#"You are analyzing a student's learning regulation gap.

Based on the following codebook:
{codebook}

Analyze this student note and identify the primary regulation gaps:
{note}

Remember to focus primarily (80%) on the assessment part of the note when categorizing, as this is the coach's perceived regulation gap. Be careful not to categorize the implications of the regulation gap.

First, provide your step-by-step reasoning, then list the categories that apply.

Provide your response in this format:
Reasoning: [your step-by-step reasoning]
Tier 1 Categories: [comma-separated categories]
Tier 2 Categories: [comma-separated subcategories]"#;
