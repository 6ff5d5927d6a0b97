mod commands;
mod error;
mod logging;

use clap::{Parser, Subcommand};

use foxden_core::config::AppConfig;

use crate::commands::PublishArgs;
use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "foxden", version, about = "Now-watching status from the terminal")]
struct Cli {
    /// Cloud base URL (overrides config and FOXDEN_CLOUD_URL).
    #[arg(long, global = true)]
    cloud_url: Option<String>,

    /// Print JSON instead of a summary line.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Debug logging on stderr.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the current status once.
    Status,
    /// Poll and print every change until interrupted.
    Watch,
    /// Publish a status update to the cloud.
    Publish(PublishArgs),
    /// Summarise the site document.
    Site,
    /// Show or initialise the config file.
    Config {
        /// Write the effective config to the user config path.
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("foxden: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    config.apply_overrides(cli.cloud_url.clone(), None);

    let _guard = logging::init(&config.log, cli.verbose);
    tracing::debug!(command = ?cli.command, "starting");

    match &cli.command {
        Command::Status => commands::status(&config, cli.json).await,
        Command::Watch => commands::watch(&config, cli.json).await,
        Command::Publish(args) => commands::publish(&config, args, cli.json).await,
        Command::Site => commands::site(&config, cli.json).await,
        Command::Config { init: true } => commands::init_config(),
        Command::Config { init: false } => commands::show_config(&config),
    }
}
