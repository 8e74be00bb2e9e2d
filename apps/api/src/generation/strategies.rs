//! Strategy and discussion-question generation for a single similar case.

use crate::errors::AppError;
use crate::generation::bullets::normalize_bullets;
use crate::generation::prompts::{GENERATION_TEMPERATURE, QUESTIONS_PROMPT, STRATEGIES_PROMPT};
use crate::llm_client::prompts::case_block;
use crate::llm_client::LanguageModel;
use crate::models::case::Case;
use crate::models::diagnosis::Diagnosis;

fn fill(template: &str, note: &str, diagnosis: &Diagnosis, case: &Case) -> String {
    template
        .replace("{note}", note)
        .replace("{analysis}", &diagnosis.full_analysis)
        .replace("{case_block}", &case_block(case))
}

/// 4-5 bold-headline strategies, returned as the model wrote them.
pub async fn generate_strategies(
    model: &dyn LanguageModel,
    note: &str,
    diagnosis: &Diagnosis,
    case: &Case,
) -> Result<String, AppError> {
    let prompt = fill(STRATEGIES_PROMPT, note, diagnosis, case);
    model
        .chat(&prompt, GENERATION_TEMPERATURE)
        .await
        .map_err(|e| AppError::Llm(format!("Strategy generation failed: {e}")))
}

/// Discussion questions, one bullet per line.
pub async fn generate_questions(
    model: &dyn LanguageModel,
    note: &str,
    diagnosis: &Diagnosis,
    case: &Case,
) -> Result<String, AppError> {
    let prompt = fill(QUESTIONS_PROMPT, note, diagnosis, case);
    let raw = model
        .chat(&prompt, GENERATION_TEMPERATURE)
        .await
        .map_err(|e| AppError::Llm(format!("Question generation failed: {e}")))?;
    Ok(normalize_bullets(&raw))
}
