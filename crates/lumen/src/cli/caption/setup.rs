//! Captioner setup: config overrides and model loading.

use std::sync::Arc;

use anyhow::Context;
use lumen_core::{Captioner, Config, ImageDiscovery, OutputFormat as CoreOutputFormat};

use super::CaptionArgs;

/// Everything the caption loop needs, assembled once per invocation.
pub(crate) struct CaptionContext {
    pub captioner: Arc<Captioner>,
    pub discovery: ImageDiscovery,
    pub output_format: CoreOutputFormat,
    pub pretty: bool,
    pub timeout_ms: u64,
}

/// Validate input, load config and models.
pub async fn setup_captioner(args: &CaptionArgs) -> anyhow::Result<CaptionContext> {
    if !args.input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.input
        );
    }

    let mut config = Config::load()?;
    apply_overrides(&mut config, args);
    let output_format = resolve_format(args, &config);

    let model_config = config.clone();
    let captioner = tokio::task::spawn_blocking(move || Captioner::load(&model_config))
        .await?
        .context("Failed to load captioning models. Run `lumen models list` to check files")?;
    tracing::info!("Models loaded from {:?}", config.model_dir());

    Ok(CaptionContext {
        captioner: Arc::new(captioner),
        discovery: ImageDiscovery::new(&config.processing),
        output_format,
        pretty: config.output.pretty,
        timeout_ms: config.limits.caption_timeout_ms,
    })
}

/// Apply command-line overrides on top of the loaded config.
///
/// Out-of-range values are rejected later, when the decoder is built.
fn apply_overrides(config: &mut Config, args: &CaptionArgs) {
    if let Some(beam_width) = args.beam_width {
        config.decoder.beam_width = beam_width;
    }
    if let Some(max_length) = args.max_length {
        config.decoder.max_length = max_length;
    }
    if let Some(score_mode) = args.score_mode {
        config.decoder.score_mode = score_mode.into();
    }
    if args.no_capitalize {
        config.output.capitalize = false;
    }
}

fn resolve_format(args: &CaptionArgs, config: &Config) -> CoreOutputFormat {
    if let Some(format) = args.format {
        return format.into();
    }
    CoreOutputFormat::parse(&config.output.format).unwrap_or_else(|| {
        tracing::warn!(
            "Unknown output.format {:?} in config, using json",
            config.output.format
        );
        CoreOutputFormat::Json
    })
}
