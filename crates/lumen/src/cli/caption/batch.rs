//! Caption loop: per-file timeout, progress, and streaming output.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lumen_core::{CaptionError, CaptionRecord, Captioner, OutputWriter, PipelineError, ProcessingStats};

use super::setup::CaptionContext;
use super::CaptionArgs;

/// Caption every file, streaming records to the output as they complete.
///
/// A failed image is logged and counted; it never produces a record.
pub async fn caption_files(
    ctx: &CaptionContext,
    args: &CaptionArgs,
    files: Vec<PathBuf>,
) -> anyhow::Result<ProcessingStats> {
    let sink: Box<dyn Write + Send> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };
    let mut writer = OutputWriter::new(sink, ctx.output_format, ctx.pretty);

    let batch = files.len() > 1;
    let progress = if batch {
        create_progress_bar(files.len() as u64)
    } else {
        indicatif::ProgressBar::hidden()
    };

    let mut stats = ProcessingStats::default();
    let start_time = Instant::now();

    for path in files {
        match caption_one(Arc::clone(&ctx.captioner), path.clone(), ctx.timeout_ms).await {
            Ok(record) => {
                stats.succeeded += 1;
                writer.write(&record)?;
            }
            Err(e) if e.is_client_error() => {
                stats.rejected += 1;
                tracing::warn!("Rejected {:?}: {}", path, e);
            }
            Err(e) => {
                stats.failed += 1;
                tracing::error!("Failed: {:?} - {}", path, e);
            }
        }

        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            progress.set_message(format!("{:.1} img/sec", stats.attempted() as f64 / elapsed));
        }
    }

    writer.finish()?;
    progress.finish_and_clear();

    stats.total_seconds = start_time.elapsed().as_secs_f64();
    if stats.total_seconds > 0.0 {
        stats.images_per_second = stats.succeeded as f64 / stats.total_seconds;
    }

    if let Some(output_path) = &args.output {
        tracing::info!("Output written to {:?}", output_path);
    }
    if batch {
        print_summary(&stats);
    }
    Ok(stats)
}

/// Caption one file on a blocking thread, abandoning it after `timeout_ms`.
async fn caption_one(
    captioner: Arc<Captioner>,
    path: PathBuf,
    timeout_ms: u64,
) -> Result<CaptionRecord, CaptionError> {
    let bytes = tokio::fs::read(&path).await?;

    let task = tokio::task::spawn_blocking(move || captioner.process(&path, &bytes));
    match tokio::time::timeout(Duration::from_millis(timeout_ms), task).await {
        Ok(Ok(result)) => Ok(result?),
        Ok(Err(e)) => Err(PipelineError::Inference {
            stage: "caption",
            message: format!("Task join error: {e}"),
        }
        .into()),
        Err(_) => Err(PipelineError::Timeout {
            stage: "caption".to_string(),
            timeout_ms,
        }
        .into()),
    }
}

/// Create a progress bar for batch captioning.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("##-"));
    }
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after batch captioning.
fn print_summary(stats: &ProcessingStats) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Captioned:    {:>8}", stats.succeeded);
    if stats.rejected > 0 {
        eprintln!("    Rejected:     {:>8}", stats.rejected);
    }
    if stats.failed > 0 {
        eprintln!("    Failed:       {:>8}", stats.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", stats.attempted());
    eprintln!("    Duration:     {:>7.1}s", stats.total_seconds);
    eprintln!("    Rate:         {:>7.1} img/sec", stats.images_per_second);
    eprintln!("  ====================================");
}
