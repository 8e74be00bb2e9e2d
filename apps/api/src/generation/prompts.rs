// All LLM prompt constants for the Generation module.
// Reuses the shared case block from llm_client::prompts.

/// Creative sampling for plans, strategies and questions.
pub const GENERATION_TEMPERATURE: f32 = 0.7;

/// Personalized plan prompt.
/// Replace: {note}, {analysis}, {case_block}, {template}
pub const TEMPLATE_PROMPT: &str = r#"You are creating a personalized learning plan for a student based on their regulation gap diagnosis.

Student's Note:
{note}

Diagnosis:
{analysis}

{case_block}

Use this template structure to create the personalized plan:
{template}

Fill in all the placeholders in the template with content specific to this student's situation and the similar case.
Ensure you replace the [LLM will insert...] sections with actual content."#;

/// "How This Applies To You" strategies prompt.
/// Replace: {note}, {analysis}, {case_block}
pub const STRATEGIES_PROMPT: &str = r#"Based on this student's regulation gap diagnosis and the similar case, generate 4-5 specific strategies for how they can apply lessons from the similar case to their situation.

Student's Note:
{note}

Diagnosis:
{analysis}

{case_block}

Format your response as a bulleted list with 4-5 strategies. Each strategy should have:
- A bold headline (1-5 words)
- A brief explanation (1-2 sentences)

Example format:
• **Slow down and deepen understanding**
  Before moving on to new work, make sure you've thoroughly understood current topics.

• **Document your current understanding**
  Explicitly capture examples and update your paper draft before moving to new areas."#;

/// Coaching discussion questions prompt.
/// Replace: {note}, {analysis}, {case_block}
pub const QUESTIONS_PROMPT: &str = r#"Based on this student's regulation gap diagnosis and the similar case, write 3-4 open-ended discussion questions a coach could ask the student in their next meeting.

Student's Note:
{note}

Diagnosis:
{analysis}

{case_block}

Format each question as its own bullet starting with "• " and ending with a question mark.
Put every question on a separate line. Do not add any introduction or closing remarks.

Example format:
• What signals tell you it is time to slow down?
• Which assumption would hurt the project most if it were wrong?"#;
