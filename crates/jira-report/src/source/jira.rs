//! Blocking Jira REST client.
//!
//! Runs JQL searches through `GET /rest/api/2/search` with basic
//! authentication and converts the response into [`IssueRecord`]s. Result
//! pages are followed until the reported total is reached.

use crate::domain::{IssueLink, IssueRecord, LinkedIssue};
use crate::source::{IssueSource, SourceError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, trace};
use ureq::tls::{TlsConfig, TlsProvider};
use ureq::Agent;

/// Estimate field used by the default Jira Software story points setup.
pub const DEFAULT_ESTIMATE_FIELD: &str = "customfield_10003";

const SEARCH_PATH: &str = "/rest/api/2/search";

/// Connection settings for [`JiraClient`].
#[derive(Clone)]
pub struct JiraSettings {
    /// Base URL of the Jira instance, e.g. `https://jira.example.com`
    pub url: String,
    pub username: String,
    pub password: String,
    /// Custom field holding story points
    pub estimate_field: String,
    pub verify_tls: bool,
    pub timeout: Duration,
    /// Results requested per page
    pub page_size: usize,
}

impl JiraSettings {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            estimate_field: DEFAULT_ESTIMATE_FIELD.to_string(),
            verify_tls: true,
            timeout: Duration::from_secs(30),
            page_size: 50,
        }
    }
}

impl fmt::Debug for JiraSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraSettings")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("estimate_field", &self.estimate_field)
            .field("verify_tls", &self.verify_tls)
            .field("timeout", &self.timeout)
            .field("page_size", &self.page_size)
            .finish()
    }
}

/// Jira search client over a shared HTTP agent.
pub struct JiraClient {
    agent: Agent,
    search_url: String,
    authorization: String,
    estimate_field: String,
    page_size: usize,
}

impl JiraClient {
    pub fn new(settings: &JiraSettings) -> Self {
        let tls = TlsConfig::builder()
            .provider(TlsProvider::NativeTls)
            .disable_verification(!settings.verify_tls)
            .build();

        let config = Agent::config_builder()
            .timeout_global(Some(settings.timeout))
            .http_status_as_error(false)
            .tls_config(tls)
            .build();

        let credentials = format!("{}:{}", settings.username, settings.password);

        Self {
            agent: Agent::new_with_config(config),
            search_url: format!("{}{}", settings.url.trim_end_matches('/'), SEARCH_PATH),
            authorization: format!("Basic {}", STANDARD.encode(credentials)),
            estimate_field: settings.estimate_field.clone(),
            page_size: settings.page_size.max(1),
        }
    }

    fn fields(&self) -> String {
        format!("summary,status,issuelinks,{}", self.estimate_field)
    }

    fn fetch_page(&self, query: &str, start_at: usize) -> Result<SearchPage, SourceError> {
        debug!(start_at, url = %self.search_url, "Fetching search page");

        let mut response = self
            .agent
            .get(&self.search_url)
            .header("Authorization", self.authorization.as_str())
            .header("Accept", "application/json")
            .query("jql", query)
            .query("startAt", start_at.to_string())
            .query("maxResults", self.page_size.to_string())
            .query("fields", self.fields())
            .call()?;

        let status = response.status().as_u16();
        match status {
            200..=299 => {}
            401 | 403 => return Err(SourceError::Unauthorized { status }),
            400 => {
                let message = response
                    .body_mut()
                    .read_json::<ErrorBody>()
                    .map(|body| body.message())
                    .unwrap_or_else(|_| "bad request".to_string());
                return Err(SourceError::InvalidQuery {
                    query: query.to_string(),
                    message,
                });
            }
            _ => {
                return Err(SourceError::UnexpectedStatus {
                    status,
                    url: self.search_url.clone(),
                })
            }
        }

        response
            .body_mut()
            .read_json::<SearchPage>()
            .map_err(|e| SourceError::Decode(e.to_string()))
    }
}

impl IssueSource for JiraClient {
    fn search(&self, query: &str) -> Result<Vec<IssueRecord>, SourceError> {
        let mut records = Vec::new();
        let mut start_at = 0;

        loop {
            let page = self.fetch_page(query, start_at)?;
            let received = page.issues.len();
            trace!(received, total = page.total, "Received search page");

            records.extend(
                page.issues
                    .into_iter()
                    .map(|issue| issue.into_record(&self.estimate_field)),
            );

            start_at += received;
            if received == 0 || start_at >= page.total {
                break;
            }
        }

        debug!(count = records.len(), "Search complete");
        Ok(records)
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    issues: Vec<WireIssue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: HashMap<String, String>,
}

impl ErrorBody {
    fn message(self) -> String {
        let mut messages = self.error_messages;
        let mut field_errors: Vec<_> = self.errors.into_iter().collect();
        field_errors.sort();
        messages.extend(
            field_errors
                .into_iter()
                .map(|(field, error)| format!("{}: {}", field, error)),
        );
        if messages.is_empty() {
            "bad request".to_string()
        } else {
            messages.join("; ")
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireIssue {
    key: String,
    #[serde(default)]
    fields: WireFields,
}

#[derive(Debug, Default, Deserialize)]
struct WireFields {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    status: Option<WireStatus>,
    #[serde(default)]
    issuelinks: Option<Vec<WireLink>>,
    #[serde(flatten)]
    other: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct WireStatus {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLink {
    #[serde(rename = "type", default)]
    link_type: Option<WireLinkType>,
    #[serde(default)]
    outward_issue: Option<WireLinkedIssue>,
    #[serde(default)]
    inward_issue: Option<WireLinkedIssue>,
}

#[derive(Debug, Deserialize)]
struct WireLinkType {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireLinkedIssue {
    key: String,
    #[serde(default)]
    fields: WireLinkedFields,
}

#[derive(Debug, Default, Deserialize)]
struct WireLinkedFields {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    status: Option<WireStatus>,
}

fn status_name(status: Option<WireStatus>) -> String {
    status.map(|s| s.name).unwrap_or_default()
}

/// Read a numeric estimate, accepting numbers and numeric strings.
fn parse_estimate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl WireLinkedIssue {
    fn into_linked(self) -> LinkedIssue {
        LinkedIssue {
            key: self.key,
            summary: self.fields.summary.unwrap_or_default(),
            status: status_name(self.fields.status),
        }
    }
}

impl WireIssue {
    fn into_record(self, estimate_field: &str) -> IssueRecord {
        let WireFields {
            summary,
            status,
            issuelinks,
            other,
        } = self.fields;

        let links = issuelinks
            .unwrap_or_default()
            .into_iter()
            .map(|link| IssueLink {
                link_type: link.link_type.map(|t| t.name),
                outward: link.outward_issue.map(WireLinkedIssue::into_linked),
                inward: link.inward_issue.map(WireLinkedIssue::into_linked),
            })
            .collect();

        IssueRecord {
            key: self.key,
            summary: summary.unwrap_or_default(),
            status: status_name(status),
            estimate: other.get(estimate_field).and_then(parse_estimate),
            links,
        }
    }
}
