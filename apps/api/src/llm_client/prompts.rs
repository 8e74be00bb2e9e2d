// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

use crate::models::case::Case;

/// Instruction appended to prompts whose reply is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Renders a case block shared by the template, strategy and question prompts.
pub fn case_block(case: &Case) -> String {
    format!(
        "Similar Case Study:\n\
        ID: {}\n\
        Gap: {}\n\
        Other Content: {}\n\
        Tier 1 Categories: {}\n\
        Tier 2 Categories: {}",
        case.id, case.gap_text, case.other_content, case.tier1_categories, case.tier2_categories
    )
}
