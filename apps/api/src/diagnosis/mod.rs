// Diagnosis Classifier
// Categorizes a coach note against the codebook with a single chat call.
// All LLM calls go through llm_client — no direct provider calls here.

pub mod classifier;
pub mod prompts;
