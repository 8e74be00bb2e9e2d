use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A historical, pre-labeled regulation gap loaded from the case store.
///
/// Missing or null keys degrade to empty strings. Unknown keys (e.g.
/// `original_text`) are kept in `extra` and written back out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Case {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gap_text: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub other_content: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tier1_categories: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tier2_categories: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub project: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Case {
    /// Text embedded for this case: both tiers, the gap, then the auxiliary content.
    pub fn embedding_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.tier1_categories, self.tier2_categories, self.gap_text, self.other_content
        )
    }
}

/// A case returned from a similarity query, annotated with its score.
/// The score is derived per query and never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCase {
    #[serde(flatten)]
    pub case: Case,
    pub similarity_score: f32,
}

/// Accepts strings, numbers and booleans as text; null becomes empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_missing_keys_default_to_empty() {
        let case: Case = serde_json::from_str(r#"{"id": "03", "gap_text": "Rushes planning"}"#).unwrap();
        assert_eq!(case.id, "03");
        assert_eq!(case.gap_text, "Rushes planning");
        assert_eq!(case.other_content, "");
        assert_eq!(case.tier2_categories, "");
        assert_eq!(case.project, "");
    }

    #[test]
    fn test_case_null_and_numeric_values_are_lenient() {
        let case: Case =
            serde_json::from_str(r#"{"id": 12, "project": null, "tier1_categories": "Emotional"}"#)
                .unwrap();
        assert_eq!(case.id, "12");
        assert_eq!(case.project, "");
        assert_eq!(case.tier1_categories, "Emotional");
    }

    #[test]
    fn test_case_keeps_unknown_keys() {
        let case: Case = serde_json::from_str(
            r#"{"id": "01", "original_text": "Project: Sample Project"}"#,
        )
        .unwrap();
        assert_eq!(
            case.extra.get("original_text").and_then(|v| v.as_str()),
            Some("Project: Sample Project")
        );
    }

    #[test]
    fn test_embedding_text_order() {
        let case = Case {
            id: "01".into(),
            gap_text: "gap".into(),
            other_content: "other".into(),
            tier1_categories: "Cognitive".into(),
            tier2_categories: "Assessing risks".into(),
            ..Case::default()
        };
        assert_eq!(case.embedding_text(), "Cognitive Assessing risks gap other");
    }

    #[test]
    fn test_scored_case_serializes_flat() {
        let scored = ScoredCase {
            case: Case {
                id: "01".into(),
                ..Case::default()
            },
            similarity_score: 0.5,
        };
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["id"], "01");
        assert_eq!(json["similarity_score"], 0.5);
    }
}
