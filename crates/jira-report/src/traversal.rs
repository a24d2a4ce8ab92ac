//! Bounded expansion of issue links into a dependency graph.
//!
//! A traversal runs the initial query, records a vertex for each returned
//! issue and an edge for each link, then searches again for the issues
//! reached through outward links. Every search consumes one unit of depth.

use crate::domain::{Blacklist, Edge, Estimate, IssueLink, IssueRecord, Vertex};
use crate::graph::IssueGraph;
use crate::label::{issue_label, DEFAULT_WRAP_WORDS};
use crate::query::key_disjunction;
use crate::source::{IssueSource, SourceError};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};

/// Default number of searches, including the initial query.
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// Options controlling what a traversal follows.
#[derive(Debug, Clone)]
pub struct TraversalOptions {
    pub blacklist: Blacklist,
    /// Number of searches to run; 0 disables the traversal entirely
    pub max_depth: u32,
    /// Link type names to follow; empty follows every link
    pub link_types: Vec<String>,
    pub wrap_words: usize,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            blacklist: Blacklist::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            link_types: Vec::new(),
            wrap_words: DEFAULT_WRAP_WORDS,
        }
    }
}

impl TraversalOptions {
    fn follows(&self, link: &IssueLink) -> bool {
        if self.link_types.is_empty() {
            return true;
        }
        link.link_type.as_deref().is_some_and(|name| {
            self.link_types
                .iter()
                .any(|wanted| wanted.eq_ignore_ascii_case(name))
        })
    }
}

/// Items found while processing one page of search results.
#[derive(Debug, Default, PartialEq)]
pub struct Discovery {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    /// Keys reached through outward links, in first-seen order
    pub followups: Vec<String>,
}

/// Turn one batch of search results into vertices, edges and follow-up keys.
///
/// Blacklisted issues are skipped entirely. Links to blacklisted issues are
/// dropped, but the linking issue itself is still recorded.
pub fn expand(records: &[IssueRecord], options: &TraversalOptions) -> Discovery {
    let mut discovery = Discovery::default();
    let mut seen_followups = HashSet::new();

    for record in records {
        if options.blacklist.contains(&record.key) {
            debug!(key = %record.key, "Skipping blacklisted issue");
            continue;
        }

        let label = issue_label(&record.key, &record.summary, options.wrap_words);
        discovery.vertices.push(Vertex::new(
            label.clone(),
            record.status.clone(),
            Estimate::from_points(record.estimate),
        ));

        for link in record.links.iter().filter(|link| options.follows(link)) {
            if let Some(outward) = &link.outward {
                if !options.blacklist.contains(&outward.key) {
                    let linked = issue_label(&outward.key, &outward.summary, options.wrap_words);
                    discovery.vertices.push(Vertex::new(
                        linked.clone(),
                        outward.status.clone(),
                        Estimate::Placeholder,
                    ));
                    discovery.edges.push(Edge::new(label.clone(), linked));
                    if seen_followups.insert(outward.key.clone()) {
                        discovery.followups.push(outward.key.clone());
                    }
                }
            }

            if let Some(inward) = &link.inward {
                if !options.blacklist.contains(&inward.key) {
                    let linked = issue_label(&inward.key, &inward.summary, options.wrap_words);
                    discovery.vertices.push(Vertex::new(
                        linked.clone(),
                        inward.status.clone(),
                        Estimate::Placeholder,
                    ));
                    discovery.edges.push(Edge::new(linked, label.clone()));
                }
            }
        }
    }

    discovery
}

/// Run `query` and follow outward links for up to `options.max_depth` searches.
///
/// Issues already returned by an earlier search are not requested again.
///
/// # Errors
///
/// Any error from the source is returned immediately; no partial graph is
/// produced.
///
/// # Example
/// ```
/// use jira_report::domain::{IssueRecord, LinkedIssue};
/// use jira_report::source::InMemorySource;
/// use jira_report::traversal::{traverse, TraversalOptions};
///
/// let source = InMemorySource::new();
/// source.add_issue(
///     IssueRecord::new("ECO-1", "Build", "Open").blocks(LinkedIssue::new("ECO-2", "Ship", "Open")),
/// );
/// source.add_issue(IssueRecord::new("ECO-2", "Ship", "Open").with_estimate(3.0));
///
/// let graph = traverse(&source, r#"key="ECO-1""#, &TraversalOptions::default()).unwrap();
/// assert_eq!(graph.vertex_count(), 2);
/// assert_eq!(graph.edge_count(), 1);
/// ```
pub fn traverse<S: IssueSource>(
    source: &S,
    query: &str,
    options: &TraversalOptions,
) -> Result<IssueGraph, SourceError> {
    let mut graph = IssueGraph::new();
    let mut fetched: HashSet<String> = HashSet::new();
    let mut next_query = Some(query.to_string());
    let mut remaining = options.max_depth;

    while remaining > 0 {
        let Some(current) = next_query.take() else {
            break;
        };
        remaining -= 1;

        let records = source.search(&current)?;
        info!(
            depth = options.max_depth - remaining,
            issues = records.len(),
            "Search returned"
        );

        fetched.extend(records.iter().map(|r| r.key.clone()));
        let discovery = expand(&records, options);

        let pending: BTreeSet<String> = discovery
            .followups
            .into_iter()
            .filter(|key| !fetched.contains(key))
            .collect();

        graph.merge(discovery.vertices, discovery.edges);

        if !pending.is_empty() && remaining > 0 {
            debug!(keys = pending.len(), "Following outward links");
            next_query = Some(key_disjunction(&pending));
        }
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LinkedIssue;
    use crate::source::InMemorySource;

    fn linked(key: &str) -> LinkedIssue {
        LinkedIssue::new(key, format!("Summary {}", key), "Open")
    }

    #[test]
    fn test_expand_records_vertices_and_edges() {
        let record = IssueRecord::new("ECO-1", "Build", "Open")
            .with_estimate(2.0)
            .blocks(linked("ECO-2"))
            .blocked_by(linked("ECO-0"));

        let discovery = expand(&[record], &TraversalOptions::default());

        assert_eq!(discovery.vertices.len(), 3);
        assert_eq!(discovery.vertices[0], Vertex::new("ECO-1\\nBuild", "Open", Estimate::Points(2.0)));
        assert_eq!(discovery.vertices[1].estimate, Estimate::Placeholder);
        assert_eq!(
            discovery.edges,
            vec![
                Edge::new("ECO-1\\nBuild", "ECO-2\\nSummary ECO-2"),
                Edge::new("ECO-0\\nSummary ECO-0", "ECO-1\\nBuild"),
            ]
        );
        assert_eq!(discovery.followups, vec!["ECO-2".to_string()]);
    }

    #[test]
    fn test_expand_missing_estimate_is_unestimated() {
        let discovery = expand(
            &[IssueRecord::new("ECO-1", "Build", "Open")],
            &TraversalOptions::default(),
        );
        assert_eq!(discovery.vertices[0].estimate, Estimate::Unestimated);
    }

    #[test]
    fn test_expand_skips_blacklisted_source() {
        let options = TraversalOptions {
            blacklist: Blacklist::parse("ECO-1"),
            ..TraversalOptions::default()
        };
        let record = IssueRecord::new("ECO-1", "Build", "Open").blocks(linked("ECO-2"));

        assert_eq!(expand(&[record], &options), Discovery::default());
    }

    #[test]
    fn test_expand_drops_links_to_blacklisted_issues() {
        let options = TraversalOptions {
            blacklist: Blacklist::parse("ECO-2,ECO-0"),
            ..TraversalOptions::default()
        };
        let record = IssueRecord::new("ECO-1", "Build", "Open")
            .blocks(linked("ECO-2"))
            .blocked_by(linked("ECO-0"));

        let discovery = expand(&[record], &options);
        assert_eq!(discovery.vertices.len(), 1);
        assert!(discovery.edges.is_empty());
        assert!(discovery.followups.is_empty());
    }

    #[test]
    fn test_inward_links_do_not_generate_followups() {
        let record = IssueRecord::new("ECO-1", "Build", "Open").blocked_by(linked("ECO-0"));
        let discovery = expand(&[record], &TraversalOptions::default());
        assert!(discovery.followups.is_empty());
        assert_eq!(discovery.edges.len(), 1);
    }

    #[test]
    fn test_followups_are_deduplicated() {
        let records = vec![
            IssueRecord::new("ECO-1", "A", "Open").blocks(linked("ECO-3")),
            IssueRecord::new("ECO-2", "B", "Open").blocks(linked("ECO-3")),
        ];
        let discovery = expand(&records, &TraversalOptions::default());
        assert_eq!(discovery.followups, vec!["ECO-3".to_string()]);
    }

    #[test]
    fn test_link_type_filter() {
        let options = TraversalOptions {
            link_types: vec!["blocks".to_string()],
            ..TraversalOptions::default()
        };
        let mut record = IssueRecord::new("ECO-1", "Build", "Open");
        record.links.push(IssueLink::outward(linked("ECO-2")).with_type("Blocks"));
        record.links.push(IssueLink::outward(linked("ECO-3")).with_type("Relates"));
        record.links.push(IssueLink::outward(linked("ECO-4")));

        let discovery = expand(&[record], &options);
        assert_eq!(discovery.followups, vec!["ECO-2".to_string()]);
    }

    #[test]
    fn test_depth_zero_does_not_search() {
        let source = InMemorySource::new();
        let options = TraversalOptions {
            max_depth: 0,
            ..TraversalOptions::default()
        };

        let graph = traverse(&source, "anything at all", &options).unwrap();
        assert!(graph.is_empty());
        assert!(source.executed_queries().is_empty());
    }

    #[test]
    fn test_depth_one_runs_only_initial_query() {
        let source = InMemorySource::new();
        source.add_issue(IssueRecord::new("ECO-1", "Build", "Open").blocks(linked("ECO-2")));
        source.add_issue(IssueRecord::new("ECO-2", "Summary ECO-2", "Open").with_estimate(3.0));
        let options = TraversalOptions {
            max_depth: 1,
            ..TraversalOptions::default()
        };

        let graph = traverse(&source, r#"key="ECO-1""#, &options).unwrap();

        assert_eq!(source.executed_queries().len(), 1);
        let placeholder = graph.vertex("ECO-2\\nSummary ECO-2").unwrap();
        assert_eq!(placeholder.estimate, Estimate::Placeholder);
    }

    #[test]
    fn test_followup_replaces_placeholder_with_fetched_estimate() {
        let source = InMemorySource::new();
        source.add_issue(IssueRecord::new("ECO-1", "Build", "Open").blocks(linked("ECO-2")));
        source.add_issue(IssueRecord::new("ECO-2", "Summary ECO-2", "Open").with_estimate(3.0));

        let graph = traverse(&source, r#"key="ECO-1""#, &TraversalOptions::default()).unwrap();

        assert_eq!(
            source.executed_queries(),
            vec![r#"key="ECO-1""#.to_string(), r#"key="ECO-2""#.to_string()]
        );
        assert_eq!(graph.vertex_count(), 2);
        let fetched = graph.vertex("ECO-2\\nSummary ECO-2").unwrap();
        assert_eq!(fetched.estimate, Estimate::Points(3.0));
    }

    #[test]
    fn test_errors_propagate() {
        let source = InMemorySource::new();
        let err = traverse(&source, "project = ECO", &TraversalOptions::default()).unwrap_err();
        assert!(matches!(err, SourceError::InvalidQuery { .. }));
    }
}
