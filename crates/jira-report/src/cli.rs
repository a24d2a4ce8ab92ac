//! Command-line interface definitions using clap.

use crate::visualization::GraphFormat;
use clap::Parser;
use std::path::PathBuf;

const ENVIRONMENT_HELP: &str = "\
Environment:
  JIRA_URL       Base URL of the Jira instance
  JIRA_USERNAME  Jira user name
  JIRA_PASSWORD  Jira password or API token
  RUST_LOG       Log filter, overrides -q/-v (logs go to stderr)

Exit codes: 0 success, 1 error, 2 invalid arguments or configuration,
5 credentials rejected, 10 Jira or network failure";

/// Jira dependency report
///
/// Runs a JQL query, follows issue links a bounded number of times and prints
/// the resulting dependency graph.
#[derive(Parser, Debug)]
#[command(name = "jira-report", version)]
#[command(about = "Follow Jira issue links into a dependency graph", long_about = None)]
#[command(after_help = ENVIRONMENT_HELP)]
pub struct Cli {
    /// JQL query selecting the starting issues
    pub query: String,

    /// Comma-separated key substrings to exclude (e.g. "ECO-37008,ECO-37009")
    pub blacklist: Option<String>,

    /// Print the planning summary after the graph
    #[arg(short, long)]
    pub plan: bool,

    /// Number of searches, including the initial query (default: 3)
    #[arg(short, long)]
    pub depth: Option<u32>,

    /// Output format: dot, mermaid or json
    #[arg(short, long, default_value = "dot")]
    pub format: GraphFormat,

    /// Copy the rendered graph to the system clipboard
    #[arg(short, long)]
    pub copy: bool,

    /// Config file to use instead of ./jira-report.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log debug details of every search
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_arguments() {
        let cli = Cli::try_parse_from(["jira-report", "project = ECO", "ECO-1,ECO-2"]).unwrap();
        assert_eq!(cli.query, "project = ECO");
        assert_eq!(cli.blacklist.as_deref(), Some("ECO-1,ECO-2"));
        assert!(!cli.plan);
        assert_eq!(cli.format, GraphFormat::Dot);
        assert_eq!(cli.depth, None);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "jira-report",
            "-p",
            "-d",
            "2",
            "-f",
            "mermaid",
            "--config",
            "report.toml",
            "key = ECO-1",
        ])
        .unwrap();
        assert!(cli.plan);
        assert_eq!(cli.depth, Some(2));
        assert_eq!(cli.format, GraphFormat::Mermaid);
        assert_eq!(cli.config, Some(PathBuf::from("report.toml")));
    }

    #[test]
    fn test_query_is_required() {
        let err = Cli::try_parse_from(["jira-report"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["jira-report", "-f", "svg", "q"]).is_err());
    }

    #[test]
    fn test_quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["jira-report", "-q", "-v", "q"]).is_err());
    }
}
