//! Line-oriented cleanup of model-written bullet lists.

pub const BULLET: char = '•';

/// Splits bullets the model ran together on one line (`• Q1? • Q2?`),
/// rewrites `- ` / `* ` markers as `• `, and collapses runs of blank lines
/// into one. Headings and non-bullet lines pass through unchanged.
pub fn normalize_bullets(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut pending_blank = false;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            pending_blank = !lines.is_empty();
            continue;
        }

        let expanded = if line.starts_with('#') {
            vec![raw.to_string()]
        } else if let Some(body) = bullet_body(line) {
            split_bullets(body)
        } else {
            vec![raw.to_string()]
        };

        if expanded.is_empty() {
            continue;
        }
        if pending_blank {
            lines.push(String::new());
            pending_blank = false;
        }
        lines.extend(expanded);
    }

    lines.join("\n")
}

fn bullet_body(line: &str) -> Option<&str> {
    line.strip_prefix(BULLET)
        .or_else(|| line.strip_prefix("- "))
        .or_else(|| line.strip_prefix("* "))
}

/// A `•` only starts a new bullet when the text before it ends in `?`.
fn split_bullets(body: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();

    for (i, piece) in body.split(BULLET).enumerate() {
        if i > 0 {
            if current.trim_end().ends_with('?') {
                push_bullet(&mut items, &current);
                current.clear();
            } else {
                current.push(BULLET);
            }
        }
        current.push_str(piece);
    }
    push_bullet(&mut items, &current);

    items
}

fn push_bullet(items: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        items.push(format!("{BULLET} {text}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_two_questions_on_one_line() {
        assert_eq!(normalize_bullets("• Q1? • Q2?"), "• Q1?\n• Q2?");
    }

    #[test]
    fn test_does_not_split_without_question_mark() {
        assert_eq!(
            normalize_bullets("• Compare option A • option B tradeoffs?"),
            "• Compare option A • option B tradeoffs?"
        );
    }

    #[test]
    fn test_dash_and_star_markers_become_bullets() {
        assert_eq!(
            normalize_bullets("- First question?\n* Second question?"),
            "• First question?\n• Second question?"
        );
    }

    #[test]
    fn test_blank_runs_collapse_and_edges_trim() {
        let input = "\n\n• A?\n\n\n\n• B?\n\n";
        assert_eq!(normalize_bullets(input), "• A?\n\n• B?");
    }

    #[test]
    fn test_headings_and_prose_pass_through() {
        let input = "### Questions\n  Indented explanation stays as written.\n**Bold headline**";
        assert_eq!(
            normalize_bullets(input),
            "### Questions\n  Indented explanation stays as written.\n**Bold headline**"
        );
    }

    #[test]
    fn test_indented_heading_keeps_indentation() {
        let input = "  ## Next steps\n- What will you try first?";
        assert_eq!(
            normalize_bullets(input),
            "  ## Next steps\n• What will you try first?"
        );
    }

    #[test]
    fn test_prose_with_bullet_char_is_not_split() {
        let input = "Consider these? • not a list";
        assert_eq!(normalize_bullets(input), input);
    }

    #[test]
    fn test_bare_marker_line_is_dropped() {
        assert_eq!(normalize_bullets("•\n• Real question?"), "• Real question?");
    }
}
