use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use essence::config::Config;
use essence::storage::FileStore;
use essence_cli::commands::{ChatCommand, ConfigCommand, MoodCommand, StatsCommand};
use essence_cli::error::CliResult;
use essence_cli::output::OutputFormat;

#[derive(Parser)]
#[command(name = "essence-cli")]
#[command(about = "Essence CLI - Management tool for the Essence mood journal")]
#[command(version)]
pub struct Cli {
    #[clap(long, short, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[clap(long, short = 'd', global = true, help = "Path to data directory")]
    pub data_dir: Option<PathBuf>,

    #[clap(long, short = 'c', global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Mood series commands")]
    Mood(MoodCommand),

    #[clap(about = "Conversation commands")]
    Chat(ChatCommand),

    #[clap(about = "Show storage statistics")]
    Stats(StatsCommand),

    #[clap(about = "Configuration commands")]
    Config(ConfigCommand),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> CliResult<()> {
    init_logging();

    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    match &cli.command {
        Command::Config(cmd) => cmd.execute(cli.config.as_deref(), format),
        Command::Mood(_) | Command::Chat(_) | Command::Stats(_) => {
            let config = Config::load(cli.config.clone())?;
            let data_dir = cli
                .data_dir
                .clone()
                .unwrap_or_else(|| config.storage.data_dir.clone());
            let store = FileStore::open(data_dir)?;

            match &cli.command {
                Command::Mood(cmd) => cmd.execute(&store, &config, format),
                Command::Chat(cmd) => cmd.execute(&store, &config, format),
                Command::Stats(cmd) => cmd.execute(&store, &config, format),
                Command::Config(_) => unreachable!(),
            }
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
