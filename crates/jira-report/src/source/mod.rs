//! Query abstraction over the issue tracker.
//!
//! This module defines the `IssueSource` trait that the traversal runs
//! against, allowing the Jira HTTP client and in-memory fixtures to be used
//! interchangeably.

use crate::domain::IssueRecord;
use thiserror::Error;

pub mod jira;
pub mod memory;

pub use jira::{JiraClient, JiraSettings};

pub use memory::InMemorySource;

/// Errors raised while executing a query against the tracker.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The transport failed (DNS, connection refused, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    /// The tracker rejected the credentials.
    #[error("authentication failed: server returned {status}")]
    Unauthorized { status: u16 },

    /// The tracker rejected the query.
    #[error("invalid query '{query}': {message}")]
    InvalidQuery { query: String, message: String },

    /// Any other non-success response.
    #[error("unexpected response status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Trait for backends that can answer issue queries.
///
/// # Examples
///
/// ```
/// use jira_report::domain::IssueRecord;
/// use jira_report::source::{InMemorySource, IssueSource};
///
/// let source = InMemorySource::new();
/// source.add_issue(IssueRecord::new("ECO-1", "Fix bug", "Open"));
///
/// let issues = source.search(r#"key="ECO-1""#).unwrap();
/// assert_eq!(issues[0].summary, "Fix bug");
/// ```
pub trait IssueSource {
    /// Execute `query` and return every matching issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be executed. Callers are expected
    /// to propagate it; there is no retry.
    fn search(&self, query: &str) -> Result<Vec<IssueRecord>, SourceError>;
}

impl<S: IssueSource + ?Sized> IssueSource for &S {
    fn search(&self, query: &str) -> Result<Vec<IssueRecord>, SourceError> {
        (**self).search(query)
    }
}
