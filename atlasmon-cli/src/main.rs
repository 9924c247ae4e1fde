use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use atlasmon_core::config::{load_core_config, CoreConfig};
use atlasmon_core::logging;
use atlasmon_core::serde_utils::to_pretty_json;
use atlasmon_rules::{Monitor, RuleChain, RunReport, TracingSink};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::debug;

mod source;

use source::FileSource;

#[derive(Parser)]
#[command(name = "atlasmon")]
#[command(about = "Evaluate measurement results against a chain of matching rules", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set (falls back to ATLASMON_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one evaluation of a results file
    Check(CheckArgs),
    /// Load and compile a configuration without evaluating anything
    Validate(ValidateArgs),
}

#[derive(Args)]
struct CheckArgs {
    /// Monitor configuration, YAML or JSON (falls back to ATLASMON_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON array of resolved measurement results
    #[arg(long)]
    results: PathBuf,
    /// Overrides `measurement-id` from the configuration (falls back to ATLASMON_MSM_ID)
    #[arg(long)]
    measurement_id: Option<u64>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Args)]
struct ValidateArgs {
    /// Monitor configuration, YAML or JSON (falls back to ATLASMON_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let core = load_core_config()?;

    let level = cli.log_level.as_deref().or(core.log_level.as_deref());
    if let Err(err) = logging::init_tracing(level) {
        eprintln!("failed to initialise tracing: {err}");
    }
    debug!(environment = ?core.environment, "starting atlasmon");

    match cli.command {
        Commands::Check(args) => check(args, &core).await,
        Commands::Validate(args) => validate(args, &core),
    }
}

/// `--config` wins over `ATLASMON_CONFIG`.
fn config_path(arg: Option<PathBuf>, core: &CoreConfig) -> anyhow::Result<PathBuf> {
    match arg {
        Some(path) => Ok(path),
        None => Ok(core
            .require_config_path()
            .context("pass --config or set ATLASMON_CONFIG")?
            .clone()),
    }
}

fn load_chain(path: &Path) -> anyhow::Result<RuleChain> {
    RuleChain::from_path(path).with_context(|| format!("invalid configuration {}", path.display()))
}

async fn check(args: CheckArgs, core: &CoreConfig) -> anyhow::Result<()> {
    let path = config_path(args.config, core)?;
    let chain = load_chain(&path)?;
    let measurement_id = args.measurement_id.or(core.measurement_id);
    if measurement_id.is_none() && chain.measurement_id().is_none() {
        bail!("no measurement id: set `measurement-id` in the configuration or pass --measurement-id");
    }

    let monitor = Monitor::new(Arc::new(chain), Arc::new(FileSource::new(&args.results)));
    let mut sink = TracingSink;
    let report = monitor.poll_once(measurement_id, &mut sink).await?;

    match args.format {
        OutputFormat::Text => print_report(&report),
        OutputFormat::Json => println!("{}", to_pretty_json(&report)?),
    }
    Ok(())
}

fn validate(args: ValidateArgs, core: &CoreConfig) -> anyhow::Result<()> {
    let path = config_path(args.config, core)?;
    let chain = load_chain(&path)?;

    println!("{} {}", "✔".green(), path.display());
    if let Some(descr) = chain.descr() {
        println!("  {descr}");
    }
    println!("  matching rules:   {}", chain.rules().len());
    println!("  actions:          {}", chain.action_count());
    println!("  expected results: {}", chain.expected_result_count());
    Ok(())
}

fn print_report(report: &RunReport) {
    let (matches, ok, logs) = report.counters();
    println!("{} {}", "run".bold(), report.run_id);
    println!("  results: {}", report.results_processed);
    println!("  matches: {}", matches.to_string().cyan());
    println!("  ok:      {}", ok.to_string().green());
    println!("  logs:    {}", logs);
    if report.stats.log_failures > 0 {
        println!("  log failures: {}", report.stats.log_failures.to_string().red());
    }

    if report.probe_labels.is_empty() {
        println!("  no probe labels");
        return;
    }
    println!("  probe labels:");
    for (probe, labels) in &report.probe_labels {
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        println!("    {:>8}  {}", probe, labels.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlasmon_core::config::Environment;

    fn core(config_path: Option<&str>) -> CoreConfig {
        CoreConfig {
            environment: Environment::Development,
            log_level: None,
            config_path: config_path.map(PathBuf::from),
            measurement_id: Some(5004),
        }
    }

    #[test]
    fn parses_without_reading_the_environment() {
        let cli = Cli::try_parse_from(["atlasmon", "check", "--results", "results.json"])
            .expect("arguments");
        match cli.command {
            Commands::Check(args) => {
                assert!(args.config.is_none());
                assert!(args.measurement_id.is_none());
            }
            Commands::Validate(_) => panic!("expected check"),
        }
    }

    #[test]
    fn help_is_rendered_by_the_parser() {
        let err = Cli::try_parse_from(["atlasmon", "--help"])
            .err()
            .expect("help exits early");
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn config_flag_wins_over_environment() {
        let path = config_path(Some(PathBuf::from("cli.yaml")), &core(Some("env.yaml")))
            .expect("path");
        assert_eq!(path, PathBuf::from("cli.yaml"));

        let path = config_path(None, &core(Some("env.yaml"))).expect("path");
        assert_eq!(path, PathBuf::from("env.yaml"));
    }

    #[test]
    fn missing_config_is_reported() {
        let err = config_path(None, &core(None)).unwrap_err();
        assert!(err.to_string().contains("ATLASMON_CONFIG"));
    }
}
