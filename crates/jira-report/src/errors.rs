//! Actionable error formatting for improved user experience.
//!
//! Fatal errors are printed with:
//! - Clear error description
//! - Possible causes (diagnostics)
//! - Remediation steps (actionable fixes)

use crate::config::{ConfigError, PASSWORD_VAR, URL_VAR, USERNAME_VAR};
use crate::source::SourceError;
use std::fmt;

/// An error with diagnostic context and remediation steps.
///
/// # Example
///
/// ```
/// use jira_report::errors::ActionableError;
///
/// let error = ActionableError::new("JIRA_URL is not set")
///     .with_cause("The variable was not exported in this shell")
///     .with_remedy("export JIRA_URL=https://jira.example.com");
///
/// assert!(error.to_string().contains("To fix:"));
/// ```
#[derive(Debug, Clone)]
pub struct ActionableError {
    /// The main error message
    error: String,
    /// Possible causes (diagnostic hints)
    causes: Vec<String>,
    /// Remediation steps (how to fix)
    remediation: Vec<String>,
}

impl ActionableError {
    /// Create a new actionable error with the given message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            causes: Vec::new(),
            remediation: Vec::new(),
        }
    }

    /// Add a possible cause (diagnostic hint).
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    /// Add a remediation step (actionable fix).
    pub fn with_remedy(mut self, remedy: impl Into<String>) -> Self {
        self.remediation.push(remedy.into());
        self
    }

    /// Convert to a formatted error message suitable for display.
    pub fn to_error_message(&self) -> String {
        let mut msg = format!("Error: {}\n", self.error);

        if !self.causes.is_empty() {
            msg.push_str("\nPossible causes:\n");
            for cause in &self.causes {
                msg.push_str(&format!("  • {}\n", cause));
            }
        }

        if !self.remediation.is_empty() {
            msg.push_str("\nTo fix:\n");
            for remedy in &self.remediation {
                msg.push_str(&format!("  • {}\n", remedy));
            }
        }

        msg
    }
}

impl fmt::Display for ActionableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_error_message())
    }
}

impl std::error::Error for ActionableError {}

/// Explain a configuration failure.
pub fn config_error(error: &ConfigError) -> ActionableError {
    let base = ActionableError::new(error.to_string());
    match error {
        ConfigError::MissingCredential { var, .. } => base
            .with_cause(format!("{} is not exported in this shell", var))
            .with_cause("No config file provides the [jira] credentials")
            .with_remedy(format!(
                "export {}=https://jira.example.com {}=<user> {}=<password or API token>",
                URL_VAR, USERNAME_VAR, PASSWORD_VAR
            ))
            .with_remedy("Or add url/username/password to the [jira] section of jira-report.toml"),
        ConfigError::NotFound { .. } => base
            .with_cause("The --config path is misspelled or relative to another directory")
            .with_remedy("Pass an existing file to --config, or omit it to use ./jira-report.toml"),
        ConfigError::Parse { .. } => {
            base.with_remedy("Check the TOML syntax of the config file")
        }
        ConfigError::InvalidPattern { .. } => base
            .with_remedy("Fix report.ticket_pattern; it must be a valid regular expression"),
        ConfigError::Read { .. } => base.with_cause("The file is not readable by this user"),
    }
}

/// Explain a failed search.
pub fn source_error(error: &SourceError) -> ActionableError {
    let base = ActionableError::new(error.to_string());
    match error {
        SourceError::Unauthorized { .. } => base
            .with_cause("The user name or password is wrong")
            .with_cause("Jira Cloud requires an API token instead of the account password")
            .with_remedy(format!("Check {} and {}", USERNAME_VAR, PASSWORD_VAR)),
        SourceError::InvalidQuery { .. } => base
            .with_cause("The JQL query has a syntax error or names an unknown field")
            .with_remedy("Try the query in the Jira issue search first"),
        SourceError::Http(_) => base
            .with_cause("The Jira server is unreachable or the URL is wrong")
            .with_cause("The server certificate is not trusted")
            .with_remedy(format!("Check {}", URL_VAR))
            .with_remedy("Set verify_tls = false in the [jira] config section for self-signed certificates"),
        SourceError::UnexpectedStatus { .. } | SourceError::Decode(_) => base
            .with_cause("The URL does not point at a Jira server REST API")
            .with_remedy(format!("Check {}", URL_VAR)),
    }
}
