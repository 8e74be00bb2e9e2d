use serde::{Deserialize, Serialize};

use crate::models::diagnosis::Diagnosis;

/// Secondary-category marker that selects the risk-specific skeleton.
pub const ASSESSING_RISKS: &str = "Assessing risks";

/// Which pre-authored markdown skeleton a generated plan is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Base,
    AssessingRisks,
}

impl TemplateKind {
    pub fn file_name(self) -> &'static str {
        match self {
            TemplateKind::Base => "base_template.md",
            TemplateKind::AssessingRisks => "assessing_risks_template.md",
        }
    }

    /// Literal substring match on the secondary category; no match (or no
    /// secondary category at all) falls back to the base skeleton.
    pub fn for_diagnosis(diagnosis: &Diagnosis) -> Self {
        if diagnosis.secondary().contains(ASSESSING_RISKS) {
            TemplateKind::AssessingRisks
        } else {
            TemplateKind::Base
        }
    }
}

/// One `## ` section of a generated plan, in heading order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateSection {
    pub title: String,
    pub content: String,
    pub input_label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnosis(tier2: Option<&str>) -> Diagnosis {
        Diagnosis {
            tier2_categories: tier2.map(String::from),
            ..Diagnosis::default()
        }
    }

    #[test]
    fn test_assessing_risks_selects_risk_skeleton() {
        let d = diagnosis(Some("Assessing risks, Forming feasible plans"));
        assert_eq!(TemplateKind::for_diagnosis(&d), TemplateKind::AssessingRisks);
    }

    #[test]
    fn test_other_category_selects_base() {
        let d = diagnosis(Some("Representing problem and solution spaces"));
        assert_eq!(TemplateKind::for_diagnosis(&d), TemplateKind::Base);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let d = diagnosis(Some("assessing risks"));
        assert_eq!(TemplateKind::for_diagnosis(&d), TemplateKind::Base);
    }

    #[test]
    fn test_missing_secondary_selects_base() {
        assert_eq!(TemplateKind::for_diagnosis(&diagnosis(None)), TemplateKind::Base);
    }
}
