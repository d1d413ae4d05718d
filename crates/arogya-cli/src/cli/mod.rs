//! CLI entry and dispatch.

use anyhow::{Context, Result};
use arogya_core::api::BackendClient;
use arogya_core::config::{self, Config};
use arogya_core::language::LanguageSelector;
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "arogya")]
#[command(version)]
#[command(about = "Terminal client for a multilingual medical assistant")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// User identifier (overrides config user_id)
    #[arg(long, value_name = "ID")]
    user: Option<String>,

    /// Backend base URL (overrides config)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Response language code, or "auto" (overrides config)
    #[arg(long, value_name = "CODE")]
    language: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,

    /// Manage sessions
    Sessions {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Probe backend health
    Health,

    /// Synthesize speech for a text and write the audio to a file
    Speak {
        /// Text to synthesize
        text: String,

        /// Output file for the WAV audio
        #[arg(short, long, value_name = "FILE", default_value = "reply.wav")]
        output: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum SessionCommands {
    /// List sessions for the user
    List,
    /// Delete a session by id
    Delete {
        /// Session id
        id: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Create a default config file
    Init,
}

#[tokio::main]
pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load config")?;
    if let Some(user) = cli.user {
        config.user_id = Some(user);
    }
    if let Some(base_url) = cli.base_url {
        config.backend.base_url = base_url;
    }
    if let Some(language) = cli.language {
        config.language = language;
    }

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => commands::chat::run(&config).await,
        Commands::Sessions { command } => match command {
            SessionCommands::List => commands::sessions::list(&config).await,
            SessionCommands::Delete { id } => commands::sessions::delete(&config, &id).await,
        },
        Commands::Health => commands::health(&config).await,
        Commands::Speak { text, output } => commands::speak(&config, &text, &output).await,
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                println!("{}", config::paths::config_path().display());
                Ok(())
            }
            ConfigCommands::Init => {
                let path = config::paths::config_path();
                Config::init(&path)?;
                println!("Created {}", path.display());
                Ok(())
            }
        },
    }
}

/// Builds the backend client from config.
pub(crate) fn backend_client(config: &Config) -> Result<BackendClient> {
    BackendClient::new(&config.backend.base_url, config.request_timeout())
}

/// Requires an identified user for commands that need one.
pub(crate) fn require_user(config: &Config) -> Result<String> {
    config
        .user_id
        .clone()
        .context("No user id: set user_id in config.toml or pass --user")
}

/// Parses the configured language into the selector.
pub(crate) fn language_selector(config: &Config) -> LanguageSelector {
    LanguageSelector::parse(&config.language)
}
