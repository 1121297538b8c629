//! Stylize - turn a photo into a stylized image with a vision model and an
//! image-to-image generator.
//!
//! The `serve` command starts an HTTP server with a browser page and two
//! JSON endpoints: `/api/analyze` derives a styled prompt from a photo, and
//! `/api/generate` renders a new image from a photo plus that prompt.
//!
//! # Usage
//!
//! ```bash
//! # Start the server (reads GEMINI_API_KEY and FAL_KEY, also from .env)
//! stylize serve --port 3000
//!
//! # View configuration
//! stylize config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;
mod server;

/// Stylize - photo to stylized image via vision + generation models.
#[derive(Parser, Debug)]
#[command(name = "stylize")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(short, long, global = true, env = "STYLIZE_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(cli::serve::ServeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // API keys may live in a .env file next to the binary's working directory.
    let dotenv = dotenvy::dotenv();

    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config_path = cli.config.as_deref().map(stylize_core::Config::expand_path);
    let config = match cli::load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) if config_path.is_none() => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `stylize config path`."
            );
            stylize_core::Config::default()
        }
        Err(e) => return Err(e.into()),
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Stylize v{}", stylize_core::VERSION);
    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config, config_path).await,
    }
}
