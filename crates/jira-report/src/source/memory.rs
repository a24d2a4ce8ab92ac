//! In-memory issue source for testing.
//!
//! Answers key disjunctions (the shape of every follow-up query) by looking
//! up stored issues, and any other query through canned results registered
//! with [`InMemorySource::add_query`]. Every executed query is recorded.

use crate::domain::IssueRecord;
use crate::query::parse_key_disjunction;
use crate::source::{IssueSource, SourceError};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// In-memory source backed by HashMaps.
///
/// Uses `Rc<RefCell<>>` for shared interior mutability - clones share the same
/// data and the same query log.
#[derive(Clone, Default)]
pub struct InMemorySource {
    issues: Rc<RefCell<HashMap<String, IssueRecord>>>,
    queries: Rc<RefCell<HashMap<String, Vec<String>>>>,
    log: Rc<RefCell<Vec<String>>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an issue, replacing any issue with the same key.
    pub fn add_issue(&self, issue: IssueRecord) {
        self.issues.borrow_mut().insert(issue.key.clone(), issue);
    }

    /// Register the keys returned for an arbitrary query string.
    pub fn add_query<I, S>(&self, query: impl Into<String>, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.queries
            .borrow_mut()
            .insert(query.into(), keys.into_iter().map(Into::into).collect());
    }

    /// Queries executed so far, in order.
    pub fn executed_queries(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    fn lookup(&self, keys: &[String]) -> Vec<IssueRecord> {
        let issues = self.issues.borrow();
        keys.iter().filter_map(|key| issues.get(key).cloned()).collect()
    }
}

impl IssueSource for InMemorySource {
    fn search(&self, query: &str) -> Result<Vec<IssueRecord>, SourceError> {
        self.log.borrow_mut().push(query.to_string());

        if let Some(keys) = self.queries.borrow().get(query) {
            return Ok(self.lookup(keys));
        }

        match parse_key_disjunction(query) {
            Some(keys) => Ok(self.lookup(&keys)),
            None => Err(SourceError::InvalidQuery {
                query: query.to_string(),
                message: "no canned result for this query".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_lookup_skips_unknown_keys() {
        let source = InMemorySource::new();
        source.add_issue(IssueRecord::new("ECO-1", "One", "Open"));

        let found = source.search(r#"key="ECO-1" or key="ECO-9""#).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, "ECO-1");
    }

    #[test]
    fn test_canned_query() {
        let source = InMemorySource::new();
        source.add_issue(IssueRecord::new("ECO-1", "One", "Open"));
        source.add_issue(IssueRecord::new("ECO-2", "Two", "Open"));
        source.add_query("\"Epic Link\" = ECO-100", ["ECO-2", "ECO-1"]);

        let found = source.search("\"Epic Link\" = ECO-100").unwrap();
        let keys: Vec<&str> = found.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["ECO-2", "ECO-1"]);
    }

    #[test]
    fn test_unknown_query_is_an_error() {
        let source = InMemorySource::new();
        let err = source.search("project = ECO").unwrap_err();
        assert!(matches!(err, SourceError::InvalidQuery { .. }));
    }

    #[test]
    fn test_clones_share_log() {
        let source = InMemorySource::new();
        let clone = source.clone();
        let _ = clone.search(r#"key="ECO-1""#);
        assert_eq!(source.executed_queries(), vec![r#"key="ECO-1""#.to_string()]);
    }
}
