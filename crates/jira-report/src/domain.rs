//! Core domain types for issue records and the dependency graph built from them.
//!
//! Provider adapters produce [`IssueRecord`]s; the traversal turns those into
//! [`Vertex`] and [`Edge`] values keyed by display label.

use serde::{Serialize, Serializer};

/// Graph value used when the provider does not report an estimate.
pub const UNESTIMATED_POINTS: f64 = -1.0;

/// Synthetic estimate for vertices known only through a link.
pub const PLACEHOLDER_POINTS: f64 = 0.01;

/// Value substituted for zero or missing estimates when summarizing a plan.
pub const PLANNING_SENTINEL: f64 = -1.01;

/// An issue as returned by a query against the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueRecord {
    pub key: String,
    pub summary: String,
    pub status: String,
    /// Story points, if the provider's estimate field is present and numeric.
    pub estimate: Option<f64>,
    pub links: Vec<IssueLink>,
}

impl IssueRecord {
    /// Create a record with no estimate and no links
    pub fn new(key: impl Into<String>, summary: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            summary: summary.into(),
            status: status.into(),
            estimate: None,
            links: Vec::new(),
        }
    }

    pub fn with_estimate(mut self, points: f64) -> Self {
        self.estimate = Some(points);
        self
    }

    /// Add a link where this issue blocks `issue`
    pub fn blocks(mut self, issue: LinkedIssue) -> Self {
        self.links.push(IssueLink::outward(issue));
        self
    }

    /// Add a link where this issue is blocked by `issue`
    pub fn blocked_by(mut self, issue: LinkedIssue) -> Self {
        self.links.push(IssueLink::inward(issue));
        self
    }
}

/// The far end of an issue link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedIssue {
    pub key: String,
    pub summary: String,
    pub status: String,
}

impl LinkedIssue {
    pub fn new(key: impl Into<String>, summary: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            summary: summary.into(),
            status: status.into(),
        }
    }
}

/// A declared relationship between the owning issue and another issue.
///
/// Jira reports each link from the point of view of the issue being read: an
/// `outward` issue comes after the owner ("blocks"), an `inward` issue comes
/// before it ("is blocked by"). Either side may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IssueLink {
    /// Link type name such as `Blocks`, when the provider reports it.
    pub link_type: Option<String>,
    pub outward: Option<LinkedIssue>,
    pub inward: Option<LinkedIssue>,
}

impl IssueLink {
    pub fn outward(issue: LinkedIssue) -> Self {
        Self {
            outward: Some(issue),
            ..Self::default()
        }
    }

    pub fn inward(issue: LinkedIssue) -> Self {
        Self {
            inward: Some(issue),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, name: impl Into<String>) -> Self {
        self.link_type = Some(name.into());
        self
    }
}

/// Estimate attached to a vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimate {
    /// Value reported by the provider.
    Points(f64),
    /// The provider had no usable estimate for a fetched issue.
    Unestimated,
    /// Vertex discovered only through a link of another issue.
    Placeholder,
}

impl Estimate {
    pub fn from_points(points: Option<f64>) -> Self {
        match points {
            Some(p) => Estimate::Points(p),
            None => Estimate::Unestimated,
        }
    }

    /// Value recorded in the graph.
    pub fn value(self) -> f64 {
        match self {
            Estimate::Points(p) => p,
            Estimate::Unestimated => UNESTIMATED_POINTS,
            Estimate::Placeholder => PLACEHOLDER_POINTS,
        }
    }

    /// Value used by the planning summary. Zero and missing estimates count
    /// as [`PLANNING_SENTINEL`].
    pub fn planning_value(self) -> f64 {
        match self {
            Estimate::Points(p) if p != 0.0 => p,
            Estimate::Points(_) | Estimate::Unestimated => PLANNING_SENTINEL,
            Estimate::Placeholder => PLACEHOLDER_POINTS,
        }
    }

    pub fn is_placeholder(self) -> bool {
        matches!(self, Estimate::Placeholder)
    }
}

impl Serialize for Estimate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value())
    }
}

/// A node of the dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vertex {
    pub label: String,
    pub status: String,
    pub estimate: Estimate,
}

impl Vertex {
    pub fn new(label: impl Into<String>, status: impl Into<String>, estimate: Estimate) -> Self {
        Self {
            label: label.into(),
            status: status.into(),
            estimate,
        }
    }
}

/// A "must happen before" relationship: `from` precedes `to`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Key substrings excluded from the report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    entries: Vec<String>,
}

impl Blacklist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        list.extend(entries);
        list
    }

    /// Parse a comma-separated list, ignoring blank items.
    pub fn parse(input: &str) -> Self {
        Self::new(input.split(','))
    }

    pub fn extend<I, S>(&mut self, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for entry in entries {
            let entry = entry.into().trim().to_string();
            if !entry.is_empty() && !self.entries.contains(&entry) {
                self.entries.push(entry);
            }
        }
    }

    /// True when `key` contains any blacklisted substring.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| key.contains(entry.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}
