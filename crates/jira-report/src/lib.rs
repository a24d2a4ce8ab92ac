//! Jira Dependency Report Library
//!
//! Follows issue links from a JQL query to a bounded depth and renders the
//! result as a dependency graph and a point-estimate planning summary.
//! The binary is a thin wrapper; everything is usable against any
//! [`IssueSource`], including the in-memory one used by the tests.

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod domain;
pub mod errors;
pub mod graph;
pub mod label;
pub mod output;
pub mod planning;
pub mod query;
pub mod source;
pub mod traversal;
pub mod visualization;

// Re-export commonly used types
pub use domain::{Blacklist, Edge, Estimate, IssueRecord, Vertex};
pub use graph::IssueGraph;
pub use output::{ExitCode, JsonOutput};
pub use planning::{summarize, PlanningSummary};
pub use source::{InMemorySource, IssueSource, JiraClient, SourceError};
pub use traversal::{traverse, TraversalOptions};
