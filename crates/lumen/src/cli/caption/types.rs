//! CLI enum types for the caption command: output format, score mode.

use clap::ValueEnum;
use lumen_core::{OutputFormat as CoreOutputFormat, ScoreMode};

/// Supported output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// A JSON array of records
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// How token probabilities accumulate into a caption score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScoreModeArg {
    /// Sum raw probabilities
    Probability,
    /// Sum log-probabilities
    LogProbability,
}

impl From<ScoreModeArg> for ScoreMode {
    fn from(mode: ScoreModeArg) -> Self {
        match mode {
            ScoreModeArg::Probability => ScoreMode::Probability,
            ScoreModeArg::LogProbability => ScoreMode::LogProbability,
        }
    }
}
