// All LLM prompt constants for the Intake module.

pub const EXTRACT_TEMPERATURE: f32 = 0.0;

/// Field extraction prompt. Replace `{transcript}` before sending.
pub const EXTRACT_FIELDS_PROMPT: &str = r#"A coach recorded a spoken assessment of a student. Split the transcript below into the four parts of a CAP note.

TRANSCRIPT:
{transcript}

Return a JSON object with this EXACT schema:
{
  "title": "short assessment title (3-8 words)",
  "gap": "what needs improvement — the coach's perceived regulation gap",
  "context": "the situation in which the gap showed up",
  "plan": "self-work and reflection steps the coach suggested"
}

Use the coach's own words where possible. Use an empty string for any part the transcript does not mention."#;
