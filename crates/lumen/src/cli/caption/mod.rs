//! The `lumen caption` command for captioning images.

mod batch;
mod setup;
pub mod types;

pub use types::{OutputFormat, ScoreModeArg};

use clap::Args;
use std::path::PathBuf;

use batch::caption_files;
use setup::setup_captioner;

/// Arguments for the `caption` command.
#[derive(Args, Debug)]
pub struct CaptionArgs {
    /// Image file or directory to caption
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to `output.format` from the config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Candidates kept per decoding step
    #[arg(short = 'k', long)]
    pub beam_width: Option<usize>,

    /// Number of decoding steps
    #[arg(short = 'l', long)]
    pub max_length: Option<usize>,

    /// Score accumulation mode
    #[arg(long, value_enum)]
    pub score_mode: Option<ScoreModeArg>,

    /// Keep captions exactly as decoded (no leading capital)
    #[arg(long)]
    pub no_capitalize: bool,
}

/// Values match a bare `lumen caption <input>` invocation.
impl Default for CaptionArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: None,
            format: None,
            beam_width: None,
            max_length: None,
            score_mode: None,
            no_capitalize: false,
        }
    }
}

/// Execute the caption command.
pub async fn execute(args: CaptionArgs) -> anyhow::Result<()> {
    let ctx = setup_captioner(&args).await?;

    let files = ctx.discovery.discover(&args.input)?;
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", args.input);
        return Ok(());
    }
    tracing::info!("Found {} image(s) to caption", files.len());

    let single = args.input.is_file();
    let stats = caption_files(&ctx, &args, files).await?;

    if stats.succeeded == 0 {
        if single {
            anyhow::bail!("Failed to caption {:?}", args.input);
        }
        anyhow::bail!("No images were captioned ({} failed)", stats.attempted());
    }
    Ok(())
}
