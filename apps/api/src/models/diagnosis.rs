use serde::{Deserialize, Serialize};

/// Categorization of a coach note against the codebook.
///
/// Each field is `None` when the model output omitted its line entirely.
/// Produced per submission; lives only as long as the session holding it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub tier1_categories: Option<String>,
    pub tier2_categories: Option<String>,
    pub reasoning: Option<String>,
    pub full_analysis: String,
}

impl Diagnosis {
    pub fn primary(&self) -> &str {
        self.tier1_categories.as_deref().unwrap_or_default()
    }

    pub fn secondary(&self) -> &str {
        self.tier2_categories.as_deref().unwrap_or_default()
    }
}
