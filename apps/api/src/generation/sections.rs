//! Splits a generated plan into `## ` sections for per-section responses.

use crate::models::template::TemplateSection;

const INTRODUCTION: &str = "Introduction";
const HEADING_PREFIX: &str = "## ";

/// Response-box labels for the headings the bundled skeletons use.
const SECTION_LABELS: &[(&str, &str)] = &[
    ("Understanding Your Regulation Gap", "Your understanding of the gap"),
    ("How This Relates to a Similar Case", "Your thoughts on the similar case"),
    ("Understanding Risk in Design Research", "Your understanding of risk"),
    ("Reflection on Recent Learning", "Your recent learning reflections"),
    ("Identifying Gaps in Your Understanding", "Your identified gaps"),
    ("Prioritizing Risks for Your Next Sprint", "Your priority risks"),
    ("Practice Exercises for This Week", "Your exercise results"),
    ("Reflection Prompts", "Your reflections"),
];

pub fn input_label(title: &str) -> String {
    SECTION_LABELS
        .iter()
        .find(|(heading, _)| *heading == title)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| format!("Your response to {title}"))
}

/// Text before the first `## ` heading becomes an "Introduction" section.
/// Each section's content starts with its own heading line. Sections with no
/// content are dropped; heading order is preserved.
pub fn parse_sections(markdown: &str) -> Vec<TemplateSection> {
    let mut sections = Vec::new();
    let mut title = INTRODUCTION.to_string();
    let mut content = String::new();

    for line in markdown.split('\n') {
        if let Some(heading) = line.strip_prefix(HEADING_PREFIX) {
            push_section(&mut sections, &title, &content);
            title = heading.trim().to_string();
            content.clear();
        }
        content.push_str(line);
        content.push('\n');
    }
    push_section(&mut sections, &title, &content);

    sections
}

fn push_section(sections: &mut Vec<TemplateSection>, title: &str, content: &str) {
    if content.is_empty() {
        return;
    }
    sections.push(TemplateSection {
        title: title.to_string(),
        content: content.to_string(),
        input_label: input_label(title),
    });
}
