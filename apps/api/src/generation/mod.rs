// Template/Strategy Generator
// Implements: skeleton selection, plan generation, strategies, discussion
// questions, bullet normalization and section parsing.
// All LLM calls go through llm_client — no direct provider calls here.

pub mod bullets;
pub mod prompts;
pub mod sections;
pub mod strategies;
pub mod template;
