//! JQL fragments built and recognised by the report.
//!
//! Follow-up searches are disjunctions of key clauses such as
//! `key="ECO-1" or key="ECO-2"`.

/// Build a disjunction over issue keys.
///
/// # Example
/// ```
/// use jira_report::query::key_disjunction;
///
/// let jql = key_disjunction(["ECO-1", "ECO-2"]);
/// assert_eq!(jql, r#"key="ECO-1" or key="ECO-2""#);
/// ```
pub fn key_disjunction<I, S>(keys: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keys.into_iter()
        .map(|key| format!("key=\"{}\"", key.as_ref()))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Extract the keys from a disjunction produced by [`key_disjunction`].
///
/// Clauses are separated by `or` (any case) and may use quoted or bare keys
/// with optional spaces around `=`. Returns `None` if any clause is not a key
/// equality.
pub fn parse_key_disjunction(jql: &str) -> Option<Vec<String>> {
    let mut keys = Vec::new();

    for clause in split_or(jql) {
        let (field, value) = clause.split_once('=')?;
        if !field.trim().eq_ignore_ascii_case("key") {
            return None;
        }
        let value = value.trim().trim_matches('"').trim();
        if value.is_empty() || value.contains(char::is_whitespace) {
            return None;
        }
        keys.push(value.to_string());
    }

    if keys.is_empty() {
        None
    } else {
        Some(keys)
    }
}

fn split_or(jql: &str) -> Vec<&str> {
    let lower = jql.to_ascii_lowercase();
    let mut clauses = Vec::new();
    let mut start = 0;
    let mut search_from = 0;

    while let Some(offset) = lower[search_from..].find(" or ") {
        let pos = search_from + offset;
        clauses.push(jql[start..pos].trim());
        start = pos + " or ".len();
        search_from = start;
    }
    clauses.push(jql[start..].trim());
    clauses
}
