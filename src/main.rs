use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use marketlens::config::{CliOverrides, Settings};

mod cmd;

#[derive(Parser)]
#[command(name = "marketlens")]
#[command(version, about = "MarketLens client - community research and advertorial generation")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print machine-readable JSON instead of styled text
    #[arg(long, global = true)]
    pub json: bool,

    /// Base URL of the MarketLens API. Overrides marketlens.toml and MARKETLENS_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory holding the persisted session
    #[arg(long, global = true)]
    pub storage_dir: Option<PathBuf>,

    /// Path to marketlens.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Create an account and log in
    Register {
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List, inspect, delete or create research
    Research {
        #[command(subcommand)]
        command: ResearchCommands,
    },
    /// Generate advertorials for a project
    Advertorials {
        #[command(subcommand)]
        command: AdvertorialCommands,
    },
    /// View or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ResearchCommands {
    /// List stored research
    List,
    /// Show one research record
    Show { id: String },
    /// Delete a research record
    Delete {
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Analyze a community URL and store the result as research
    Analyze { url: String },
}

#[derive(Subcommand, Clone)]
pub enum AdvertorialCommands {
    /// Generate the story, value and informational variants
    Generate {
        project_id: String,
        /// Product or campaign description
        #[arg(short, long)]
        description: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration and any warnings
    Show,
    /// Write a default marketlens.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    marketlens::logging::init(cli.verbose);

    let overrides = CliOverrides {
        api_url: cli.api_url.clone(),
        storage_dir: cli.storage_dir.clone(),
    };
    let settings = Settings::load(cli.config.as_deref(), &overrides)?;

    if let Commands::Config { command } = &cli.command {
        return cmd::cmd_config(&settings, cli.config.as_deref(), command.clone(), cli.json);
    }

    let ctx = cmd::AppContext::new(settings, cli.json)?;
    match &cli.command {
        Commands::Login { email } => cmd::cmd_login(&ctx, email.clone()).await?,
        Commands::Register { email } => cmd::cmd_register(&ctx, email.clone()).await?,
        Commands::Logout => cmd::cmd_logout(&ctx)?,
        Commands::Whoami => cmd::cmd_whoami(&ctx)?,
        Commands::Research { command } => cmd::cmd_research(&ctx, command.clone()).await?,
        Commands::Advertorials { command } => {
            cmd::cmd_advertorials(&ctx, command.clone()).await?
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}
