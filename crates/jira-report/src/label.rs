//! Display labels for graph vertices.

/// Line break as written inside a quoted DOT string.
pub const LINE_BREAK: &str = "\\n";

/// Default number of summary words per label line.
pub const DEFAULT_WRAP_WORDS: usize = 3;

/// Wrap `text` into a multi-line DOT label.
///
/// Quotes and backslashes become spaces so the label can be embedded in a
/// quoted DOT string. The first word (the issue key) gets a line of its own;
/// the remaining words are grouped `words_per_line` to a line and joined with
/// the two-character escape `\n`.
///
/// # Example
/// ```
/// use jira_report::label::wrap_text;
///
/// assert_eq!(
///     wrap_text("ECO-1 Fix the login page", 3),
///     "ECO-1\\nFix the login\\npage"
/// );
/// ```
pub fn wrap_text(text: &str, words_per_line: usize) -> String {
    let per_line = words_per_line.max(1);
    let cleaned = text.replace(['\'', '"', '\\'], " ");

    let mut output = String::new();
    for (index, word) in cleaned.split_whitespace().enumerate() {
        if index > 0 {
            if (index - 1) % per_line == 0 {
                output.push_str(LINE_BREAK);
            } else {
                output.push(' ');
            }
        }
        output.push_str(word);
    }
    output
}

/// Build the label for an issue from its key and summary.
pub fn issue_label(key: &str, summary: &str, words_per_line: usize) -> String {
    wrap_text(&format!("{} {}", key, summary), words_per_line)
}

/// Collapse a wrapped label back onto a single line.
pub fn flatten(label: &str) -> String {
    label.replace(LINE_BREAK, " ")
}
