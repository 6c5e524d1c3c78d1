//! Whitespace and control-character normalization for document text.

/// Normalize a document's text before splitting.
///
/// - control characters and exotic whitespace become plain spaces
/// - runs of spaces within a line collapse to one
/// - lines are trimmed
/// - runs of blank lines collapse to a single blank line (paragraph break)
/// - leading and trailing blank lines are removed
///
/// Cleaning is idempotent: `clean_text(clean_text(x)) == clean_text(x)`.
pub fn clean_text(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank_pending = false;

    for raw in text.lines() {
        let mut line = String::with_capacity(raw.len());
        let mut last_was_space = false;
        for ch in raw.chars() {
            let ch = if ch.is_whitespace() || ch.is_control() { ' ' } else { ch };
            if ch == ' ' {
                if !last_was_space {
                    line.push(' ');
                }
                last_was_space = true;
            } else {
                line.push(ch);
                last_was_space = false;
            }
        }
        let trimmed = line.trim().to_string();
        if trimmed.is_empty() {
            // Paragraph break, deferred so trailing blanks are dropped.
            if !lines.is_empty() {
                blank_pending = true;
            }
        } else {
            if blank_pending {
                lines.push(String::new());
                blank_pending = false;
            }
            lines.push(trimmed);
        }
    }

    lines.join("\n")
}
