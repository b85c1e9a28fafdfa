//! sparkify — load the song-play star schema into Redshift
//!
//! # Usage
//!
//! ```bash
//! # Drop and recreate every table
//! sparkify create-tables
//!
//! # Load staging tables from S3 and populate the star schema
//! sparkify etl
//!
//! # Print the generated SQL without connecting
//! sparkify show --phase copy
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use sparkify::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sparkify")]
#[command(version)]
#[command(about = "Load song and event logs from S3 into a Redshift star schema", long_about = None)]
#[command(after_help = "EXAMPLES:
    sparkify create-tables
    sparkify etl --config prod.toml
    sparkify run --dry-run
    sparkify show --phase insert --format json")]
struct Cli {
    /// Configuration file (defaults to ./dwh.toml)
    #[arg(short, long, env = "SPARKIFY_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Database connection URL, overrides the [cluster] section
    #[arg(long, env = "SPARKIFY_DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Don't execute, just show the statements that would run
    #[arg(short = 'n', long, global = true)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop and create all tables
    CreateTables,
    /// Copy staging tables from S3, then populate the derived tables
    Etl,
    /// create-tables followed by etl
    Run,
    /// Print the generated statements
    Show {
        /// Only this phase
        #[arg(short, long, value_enum)]
        phase: Option<PhaseArg>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "sql")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PhaseArg {
    Drop,
    Create,
    Copy,
    Insert,
}

impl From<PhaseArg> for Phase {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::Drop => Phase::Drop,
            PhaseArg::Create => Phase::Create,
            PhaseArg::Copy => Phase::Copy,
            PhaseArg::Insert => Phase::Insert,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Sql,
    Json,
}

impl Commands {
    fn job(&self) -> Option<Job> {
        match self {
            Commands::CreateTables => Some(Job::CreateTables),
            Commands::Etl => Some(Job::Etl),
            Commands::Run => Some(Job::Run),
            Commands::Show { .. } => None,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "sparkify=debug" } else { "sparkify=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::locate()?,
    };
    let config = Config::load(&path)?;
    let registry = Registry::from_config(&config).context("invalid table declarations")?;

    if let Commands::Show { phase, format } = &cli.command {
        let phases: Vec<Phase> = match phase {
            Some(p) => vec![(*p).into()],
            None => Phase::ALL.to_vec(),
        };
        return show(&registry, &phases, format);
    }

    let Some(job) = cli.command.job() else {
        return Ok(());
    };
    let phases = job.phases();
    if cli.dry_run {
        println!("{}", "🔍 DRY-RUN MODE - Generated SQL:".yellow().bold());
        show(&registry, phases, &OutputFormat::Sql)?;
        println!("{}", "No changes made.".yellow());
        return Ok(());
    }

    println!("{} Connecting to database...", "🔌".cyan());
    let warehouse = match &cli.database_url {
        Some(url) => Warehouse::connect(url).await?,
        None => Warehouse::connect_with(&config.cluster()?.connect_options()).await?,
    };

    let names: Vec<String> = phases.iter().map(|p| p.to_string()).collect();
    println!("{} {}: {}", "→".dimmed(), job.to_string().bold(), names.join(" → ").cyan());
    let executed = warehouse.run(&registry, phases).await?;

    println!(
        "{} All {} statement(s) executed successfully!",
        "✅".green(),
        executed.to_string().green()
    );
    Ok(())
}

fn show(registry: &Registry, phases: &[Phase], format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let json = match phases {
                [phase] => serde_json::to_string_pretty(registry.phase(*phase))?,
                _ => serde_json::to_string_pretty(registry.statements())?,
            };
            println!("{}", json);
        }
        OutputFormat::Sql => {
            for &phase in phases {
                let statements = registry.phase(phase);
                println!("-- {} ({})", phase, statements.len());
                for sql in statements {
                    println!("{}", sql);
                    println!();
                }
            }
        }
    }
    Ok(())
}
