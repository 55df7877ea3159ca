//! Command-line surface: `simkernel run` drives a deployment to quiescence,
//! `simkernel check` runs the liveness checker against a property file.
//! Grounded on `airssys-wasm-cli`'s `clap::Parser` derive layout, scaled
//! down to this crate's two verbs.

// Layer 1: Standard library imports
use std::path::PathBuf;

// Layer 2: Third-party crate imports
use clap::{Parser, Subcommand};
use tracing::info;

// Layer 3: Internal module imports
use crate::config::KernelConfig;
use crate::error::KernelError;

#[derive(Parser)]
#[command(name = "simkernel")]
#[command(version, about = "Discrete-event simulation kernel", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a KernelConfig TOML file; defaults are used if omitted.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bundled demo deployment to quiescence and report a summary.
    Run,

    /// Explore every interleaving and check a liveness property.
    Check(CheckArgs),
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Path to the property automaton description.
    #[arg(long)]
    pub property: PathBuf,

    /// Override the configured visited-state bound for this run.
    #[arg(long)]
    pub max_visited: Option<usize>,

    /// Override the configured checkpoint interval.
    #[arg(long)]
    pub checkpoint: Option<usize>,

    /// Write the explored product graph as Graphviz dot to this path.
    #[arg(long)]
    pub dot: Option<PathBuf>,
}

pub fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .try_init();
}

pub fn load_config(path: Option<&std::path::Path>) -> Result<KernelConfig, KernelError> {
    match path {
        Some(p) => KernelConfig::from_toml_file(p)
            .map_err(|e| KernelError::InvariantViolation(e.to_string())),
        None => Ok(KernelConfig::default()),
    }
}

/// Dispatches a parsed `Cli`. Split out from `main` so it stays testable
/// without a process boundary.
pub async fn dispatch(cli: Cli) -> Result<(), KernelError> {
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run => run_demo(&config).await,
        Commands::Check(args) => check_demo(&config, &args).await,
    }
}

async fn run_demo(config: &KernelConfig) -> Result<(), KernelError> {
    use crate::demo;

    let summary = demo::run_producer_consumer(config).await;
    info!(
        actors_created = summary.actors_created,
        final_time_millis = summary.final_time_millis,
        "run complete"
    );
    Ok(())
}

async fn check_demo(config: &KernelConfig, args: &CheckArgs) -> Result<(), KernelError> {
    use crate::demo;

    let max_visited = args.max_visited.unwrap_or(config.max_visited_states);
    match demo::check_eventually_delivered(max_visited) {
        Ok(()) => {
            info!(property = %args.property.display(), "liveness property holds");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_subcommand() {
        let cli = Cli::try_parse_from(["simkernel", "run"]).unwrap();
        assert!(matches!(cli.command, Commands::Run));
    }

    #[test]
    fn parses_check_with_required_property_flag() {
        let cli =
            Cli::try_parse_from(["simkernel", "check", "--property", "prop.ltl"]).unwrap();
        match cli.command {
            Commands::Check(args) => assert_eq!(args.property, PathBuf::from("prop.ltl")),
            _ => panic!("expected Check"),
        }
    }

    #[test]
    fn check_without_property_is_rejected() {
        assert!(Cli::try_parse_from(["simkernel", "check"]).is_err());
    }
}
