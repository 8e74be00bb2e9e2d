//! Personalized plan generation — fills a markdown skeleton for one selected case.

use tracing::info;

use crate::errors::AppError;
use crate::generation::prompts::{GENERATION_TEMPERATURE, TEMPLATE_PROMPT};
use crate::llm_client::prompts::case_block;
use crate::llm_client::LanguageModel;
use crate::models::case::Case;
use crate::models::diagnosis::Diagnosis;
use crate::models::template::TemplateKind;
use crate::store::Resources;

/// Builds the plan prompt around the skeleton picked for `diagnosis`.
pub fn build_template_prompt(
    resources: &Resources,
    note: &str,
    diagnosis: &Diagnosis,
    case: &Case,
) -> (TemplateKind, String) {
    let kind = TemplateKind::for_diagnosis(diagnosis);
    let prompt = TEMPLATE_PROMPT
        .replace("{note}", note)
        .replace("{analysis}", &diagnosis.full_analysis)
        .replace("{case_block}", &case_block(case))
        .replace("{template}", resources.template(kind));
    (kind, prompt)
}

/// Returns the filled markdown exactly as the model wrote it.
pub async fn generate_template(
    model: &dyn LanguageModel,
    resources: &Resources,
    note: &str,
    diagnosis: &Diagnosis,
    case: &Case,
) -> Result<String, AppError> {
    let (kind, prompt) = build_template_prompt(resources, note, diagnosis, case);
    info!("Generating {:?} template for case {}", kind, case.id);

    model
        .chat(&prompt, GENERATION_TEMPERATURE)
        .await
        .map_err(|e| AppError::Llm(format!("Template generation failed: {e}")))
}

/// Download name for a plan: `practice_template_{project}.md`, spaces as underscores.
pub fn download_file_name(project: &str) -> String {
    format!("practice_template_{}.md", project.replace(' ', "_"))
}
