mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use ailib_core::kernel::constants;
use ailib_core::kernel::error::{Error, Result};
use ailib_core::{AiLibraryManager, ManagerConfig};
use clap::{Parser, Subcommand};
use log::debug;
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;

/// ailib: discover, resolve and load AI interface and skirmish AI libraries
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Config file (.json, .toml or .yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory to search; repeat for more, earlier ones take priority
    #[arg(long = "data-dir", global = true)]
    data_dirs: Vec<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List installed AI interfaces
    Interfaces,
    /// List installed skirmish AIs
    Ais,
    /// Resolve a skirmish AI request to a full key
    Resolve {
        /// Short name of the skirmish AI
        name: String,
        /// Exact AI version; newest if omitted
        #[arg(long)]
        version: Option<String>,
        /// Short name of the hosting interface
        #[arg(long)]
        interface: Option<String>,
        /// Exact version of the hosting interface
        #[arg(long)]
        interface_version: Option<String>,
    },
    /// Resolve a skirmish AI, load it and release it again
    Check {
        /// Short name of the skirmish AI
        name: String,
        /// Exact AI version; newest if omitted
        #[arg(long)]
        version: Option<String>,
    },
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // The core logs through `log`; forward it into tracing.
    LogTracer::init().map_err(|e| Error::Other(format!("Failed to bridge log records: {}", e)))?;
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to install log subscriber: {}", e)))?;
    Ok(())
}

/// Config file (or defaults) with `--data-dir` entries placed first
fn build_config(args: &CliArgs) -> Result<ManagerConfig> {
    let mut config = match &args.config {
        Some(path) => ManagerConfig::load(path)?,
        None => ManagerConfig::default(),
    };
    config.data_dirs.splice(0..0, args.data_dirs.iter().cloned());
    Ok(config)
}

async fn run(args: CliArgs) -> Result<()> {
    let config = build_config(&args)?;
    debug!("{} v{} searching {:?}", constants::APP_NAME, constants::APP_VERSION, config.data_dirs);

    let mut manager = AiLibraryManager::open(config).await;
    let result = match args.command {
        Commands::Interfaces => cli::list_interfaces(&manager),
        Commands::Ais => cli::list_skirmish_ais(&manager),
        Commands::Resolve {
            name,
            version,
            interface,
            interface_version,
        } => cli::resolve(&manager, &name, version, interface, interface_version),
        Commands::Check { name, version } => cli::check(&mut manager, &name, version),
    };
    manager.close();
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("{}", e);
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
