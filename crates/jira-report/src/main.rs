//! Jira Dependency Report
//!
//! Runs a JQL query, follows issue links to a bounded depth and prints the
//! dependency graph (DOT by default) followed by an optional planning
//! summary. Logs go to stderr so stdout stays a clean document.

use anyhow::{Context, Result};
use clap::Parser;
use jira_report::cli::Cli;
use jira_report::clipboard;
use jira_report::config::{ConfigError, ConfigLoader, EnvOverrides, LOCAL_CONFIG_FILE};
use jira_report::errors::{config_error, source_error};
use jira_report::graph::IssueGraph;
use jira_report::output::{write_stdout, ExitCode, JsonOutput};
use jira_report::planning::{summarize, PlanningSummary};
use jira_report::source::{JiraClient, SourceError};
use jira_report::traversal::traverse;
use jira_report::visualization::{export_dot, export_mermaid, GraphFormat};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::Path;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Helper to determine exit code from the root cause
fn error_to_exit_code(error: &anyhow::Error) -> ExitCode {
    for cause in error.chain() {
        if cause.downcast_ref::<ConfigError>().is_some() {
            return ExitCode::InvalidArgument;
        }
        if let Some(source_error) = cause.downcast_ref::<SourceError>() {
            return match source_error {
                SourceError::Unauthorized { .. } => ExitCode::PermissionDenied,
                _ => ExitCode::ExternalError,
            };
        }
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return ExitCode::ExternalError;
        }
    }
    ExitCode::GenericError
}

/// Print the error, with causes and remedies where we know them.
fn report_error(error: &anyhow::Error) {
    for cause in error.chain() {
        if let Some(config) = cause.downcast_ref::<ConfigError>() {
            eprint!("{}", config_error(config));
            return;
        }
        if let Some(source) = cause.downcast_ref::<SourceError>() {
            eprint!("{}", source_error(source));
            return;
        }
    }
    eprintln!("Error: {:#}", error);
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let exit_code = match run(cli) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            report_error(&e);
            error_to_exit_code(&e)
        }
    };

    if exit_code != ExitCode::Success {
        std::process::exit(exit_code.code());
    }
}

/// Data section of `--format json` output.
#[derive(Serialize)]
struct ReportData<'a> {
    query: &'a str,
    graph: &'a IssueGraph,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<&'a PlanningSummary>,
}

fn run(cli: Cli) -> Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = ConfigLoader::user_config_path() {
        loader = loader.with_user_config(&path)?;
    }
    loader = match &cli.config {
        Some(path) => loader.with_project_config(path, true)?,
        None => loader.with_project_config(Path::new(LOCAL_CONFIG_FILE), false)?,
    };
    let config = loader.with_env(EnvOverrides::from_env()).build();

    let settings = config.jira_settings()?;
    let planning = config.planning_settings()?;
    debug!(?settings, "Loaded configuration");

    let mut options = config.traversal_options();
    if let Some(depth) = cli.depth {
        options.max_depth = depth;
    }
    if let Some(entries) = &cli.blacklist {
        options.blacklist.extend(entries.split(','));
    }

    debug!(
        blacklist = ?options.blacklist.entries(),
        max_depth = options.max_depth,
        "Traversal options"
    );

    let client = JiraClient::new(&settings);
    let graph = traverse(&client, &cli.query, &options)
        .with_context(|| format!("Failed to build the report for '{}'", cli.query))?;

    info!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        roots = graph.roots().len(),
        "Graph complete"
    );

    if let Some(cycle) = graph.find_cycle() {
        warn!(cycle = %cycle.join(" -> "), "Dependency cycle detected");
    }

    let plan = cli.plan.then(|| summarize(graph.vertices(), &planning));

    let rendered = match cli.format {
        GraphFormat::Dot => export_dot(&graph),
        GraphFormat::Mermaid => export_mermaid(&graph),
        GraphFormat::Json => {
            let data = ReportData {
                query: &cli.query,
                graph: &graph,
                plan: plan.as_ref(),
            };
            let mut json = JsonOutput::success(data, "report").to_json_string()?;
            json.push('\n');
            json
        }
    };

    write_stdout(&rendered).context("Failed to write the graph")?;

    if cli.copy {
        match clipboard::copy(&rendered) {
            Ok(()) => debug!("Copied graph to clipboard"),
            Err(e) => warn!(error = %e, "Could not copy graph to clipboard"),
        }
    }

    // JSON output already carries the plan
    match &plan {
        Some(plan) if cli.format != GraphFormat::Json => {
            write_stdout(&plan.to_string()).context("Failed to write the planning summary")?;
        }
        _ => {}
    }

    Ok(())
}
