//! Lumen CLI - Image captioning with beam search.
//!
//! Lumen extracts visual features from an image with InceptionV3 and decodes
//! a one-sentence caption from a trained caption model, all locally via ONNX
//! Runtime.
//!
//! # Usage
//!
//! ```bash
//! # Caption a single image
//! lumen caption image.jpg
//!
//! # Caption a directory
//! lumen caption ./photos/ --format jsonl --output captions.jsonl
//!
//! # View configuration
//! lumen config show
//!
//! # Check model files
//! lumen models list
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Lumen - Image captioning with beam search.
#[derive(Parser, Debug)]
#[command(name = "lumen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate captions for an image or a directory of images
    Caption(cli::caption::CaptionArgs),

    /// Inspect the model files
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match lumen_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `lumen config path`."
            );
            lumen_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Lumen v{}", lumen_core::VERSION);

    match cli.command {
        Commands::Caption(args) => cli::caption::execute(args).await,
        Commands::Models(args) => cli::models::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
