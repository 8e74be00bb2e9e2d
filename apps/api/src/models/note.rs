use serde::{Deserialize, Serialize};

/// The four fields of a coach's assessment note, typed in or extracted from a transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteFields {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub gap: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub plan: String,
}

impl NoteFields {
    /// The note text sent to the classifier and the generators.
    pub fn compose(&self) -> String {
        format!(
            "Title: {}\nGap: {}\nContext: {}\nPlan: {}",
            self.title, self.gap, self.context, self.plan
        )
    }

    /// Auxiliary retrieval text: context followed by the plan.
    pub fn auxiliary(&self) -> String {
        format!("{} {}", self.context, self.plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> NoteFields {
        NoteFields {
            title: "Planning is too rushed".into(),
            gap: "Not thinking carefully about risks".into(),
            context: "Sprint planning".into(),
            plan: "[reflect] When to slow down?".into(),
        }
    }

    #[test]
    fn test_compose_uses_labeled_lines() {
        assert_eq!(
            fields().compose(),
            "Title: Planning is too rushed\nGap: Not thinking carefully about risks\nContext: Sprint planning\nPlan: [reflect] When to slow down?"
        );
    }

    #[test]
    fn test_auxiliary_joins_context_and_plan() {
        assert_eq!(fields().auxiliary(), "Sprint planning [reflect] When to slow down?");
    }

    #[test]
    fn test_missing_json_keys_default_empty() {
        let parsed: NoteFields = serde_json::from_str(r#"{"gap": "x"}"#).unwrap();
        assert_eq!(parsed.gap, "x");
        assert!(parsed.title.is_empty());
        assert!(parsed.plan.is_empty());
    }
}
