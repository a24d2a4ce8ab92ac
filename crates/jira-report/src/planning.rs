//! Point-estimate summary of outstanding work.
//!
//! Vertices are sorted into three buckets by status and estimate:
//!
//! - **TODO**: not started, estimate above [`ESTIMATE_THRESHOLD`]
//! - **TODO - But unestimated**: not started, estimate at or below the threshold
//! - **In progress**: in development, review or testing with a positive estimate
//!
//! Zero and missing estimates count as [`PLANNING_SENTINEL`], which keeps
//! them out of the in-progress bucket and can drive the unestimated total
//! negative.
//!
//! [`PLANNING_SENTINEL`]: crate::domain::PLANNING_SENTINEL

use crate::domain::Vertex;
use crate::label::flatten;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::fmt;

/// Estimates above this value count as planned work.
pub const ESTIMATE_THRESHOLD: f64 = 1.0;

/// Statuses for work that has not started.
pub const NOT_STARTED_STATUSES: &[&str] =
    &["Open", "Reopened", "Ready for Review", "Ready for Development"];

/// Statuses for work under way.
pub const IN_PROGRESS_STATUSES: &[&str] = &[
    "In Development",
    "Code Review",
    "Testing",
    "Test Review",
    "Test Automation",
];

/// Default pattern for recognising a ticket key inside a label.
pub const DEFAULT_TICKET_PATTERN: &str = r"[A-Z][A-Z0-9_]*-\d+";

/// How summary lines are built.
#[derive(Debug, Clone)]
pub struct PlanningSettings {
    /// Base URL for browse links; `/browse/<KEY>` is appended
    pub browse_url: String,
    /// Case-insensitive ticket key pattern
    pub ticket_pattern: Regex,
}

impl PlanningSettings {
    /// Build settings, compiling `pattern` case-insensitively.
    pub fn new(browse_url: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        let ticket_pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            browse_url: browse_url.into().trim_end_matches('/').to_string(),
            ticket_pattern,
        })
    }

    fn browse_link(&self, key: &str) -> String {
        format!("{}/browse/{}", self.browse_url, key)
    }
}

/// Which part of the plan a vertex falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
    Todo,
    Unestimated,
    InProgress,
}

impl BucketKind {
    pub fn title(self) -> &'static str {
        match self {
            BucketKind::Todo => "TODO",
            BucketKind::Unestimated => " TODO - But unestimated",
            BucketKind::InProgress => "Currently in progress - in dev / review / testing",
        }
    }

    pub fn total_name(self) -> &'static str {
        match self {
            BucketKind::Todo => "todo_points",
            BucketKind::Unestimated => "unestimated_points",
            BucketKind::InProgress => "indev_points",
        }
    }

    /// Classify a status and planning estimate.
    pub fn classify(status: &str, estimate: f64) -> Option<Self> {
        if NOT_STARTED_STATUSES.contains(&status) {
            if estimate > ESTIMATE_THRESHOLD {
                Some(BucketKind::Todo)
            } else {
                Some(BucketKind::Unestimated)
            }
        } else if IN_PROGRESS_STATUSES.contains(&status) && estimate > 0.0 {
            Some(BucketKind::InProgress)
        } else {
            None
        }
    }
}

/// One reported issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanningEntry {
    pub key: String,
    pub url: String,
    pub estimate: f64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub kind: BucketKind,
    pub entries: Vec<PlanningEntry>,
    pub total: f64,
}

impl Bucket {
    fn new(kind: BucketKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            total: 0.0,
        }
    }
}

/// The three planning buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanningSummary {
    pub todo: Bucket,
    pub unestimated: Bucket,
    pub in_progress: Bucket,
}

impl PlanningSummary {
    fn empty() -> Self {
        Self {
            todo: Bucket::new(BucketKind::Todo),
            unestimated: Bucket::new(BucketKind::Unestimated),
            in_progress: Bucket::new(BucketKind::InProgress),
        }
    }

    pub fn bucket(&self, kind: BucketKind) -> &Bucket {
        match kind {
            BucketKind::Todo => &self.todo,
            BucketKind::Unestimated => &self.unestimated,
            BucketKind::InProgress => &self.in_progress,
        }
    }

    fn bucket_mut(&mut self, kind: BucketKind) -> &mut Bucket {
        match kind {
            BucketKind::Todo => &mut self.todo,
            BucketKind::Unestimated => &mut self.unestimated,
            BucketKind::InProgress => &mut self.in_progress,
        }
    }

    /// Buckets in report order
    pub fn buckets(&self) -> [&Bucket; 3] {
        [&self.todo, &self.unestimated, &self.in_progress]
    }
}

/// Sort vertices into planning buckets.
///
/// Vertices whose label carries no ticket key are skipped.
pub fn summarize<'a, I>(vertices: I, settings: &PlanningSettings) -> PlanningSummary
where
    I: IntoIterator<Item = &'a Vertex>,
{
    let mut summary = PlanningSummary::empty();

    for vertex in vertices {
        let Some(found) = settings.ticket_pattern.find(&vertex.label) else {
            continue;
        };
        let estimate = vertex.estimate.planning_value();
        let Some(kind) = BucketKind::classify(&vertex.status, estimate) else {
            continue;
        };

        let key = found.as_str().to_string();
        let bucket = summary.bucket_mut(kind);
        bucket.total += estimate;
        bucket.entries.push(PlanningEntry {
            url: settings.browse_link(&key),
            key,
            estimate,
            title: flatten(&vertex.label),
        });
    }

    summary
}

impl fmt::Display for PlanningSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bucket in self.buckets() {
            writeln!(f, "{}", bucket.kind.title())?;
            for entry in &bucket.entries {
                writeln!(f, "{} : {:.2}, {}", entry.url, entry.estimate, entry.title)?;
            }
            writeln!(f, "{}: {:.2}", bucket.kind.total_name(), bucket.total)?;
        }
        Ok(())
    }
}
