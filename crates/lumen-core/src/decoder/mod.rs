//! Caption decoding via beam search.
//!
//! The decoder grows a bounded set of candidate token sequences by repeatedly
//! asking a [`CaptionModel`] for the next-token distribution, then renders the
//! best survivor through the [`Vocabulary`].
//!
//! ```text
//! [start] ─┬─ step 1 ─► K candidates ─ step 2 ─► ... ─ step L ─► best ─► "a dog runs"
//!          └─ each step: extend every candidate by its top K tokens, keep top K overall
//! ```
//!
//! Decoding always runs exactly `max_length` steps, even once every candidate
//! has emitted the end marker. Cost is therefore bounded by
//! `max_length × beam_width` model calls.

pub mod beam;
pub mod onnx;
pub mod vocabulary;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::encoder::ImageEmbedding;
use crate::error::{ConfigError, PipelineError, PipelineResult};
use crate::math::top_k;

pub use beam::{Beam, Candidate};
pub use onnx::OnnxCaptionModel;
pub use vocabulary::Vocabulary;

/// Index of a token in the vocabulary.
pub type TokenId = u32;

/// How per-token probabilities accumulate into a candidate's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreMode {
    /// Sum raw probabilities.
    Probability,
    /// Sum natural-log probabilities; does not underflow on long sequences.
    #[default]
    LogProbability,
}

impl ScoreMode {
    /// Score contribution of a token predicted with probability `p`.
    pub fn contribution(self, p: f32) -> f64 {
        match self {
            ScoreMode::Probability => f64::from(p),
            ScoreMode::LogProbability => f64::from(p).ln(),
        }
    }
}

/// Beam search parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOptions {
    /// Candidates kept after each step (K).
    pub beam_width: usize,
    /// Number of decoding steps, and the caption model's input width (L).
    pub max_length: usize,
    /// Score accumulation mode.
    pub score_mode: ScoreMode,
    /// Fill value for the unused tail of a model input.
    pub pad_value: TokenId,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            beam_width: 3,
            max_length: 25,
            score_mode: ScoreMode::LogProbability,
            pad_value: 0,
        }
    }
}

impl DecodeOptions {
    /// Reject options the decoder cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.beam_width == 0 {
            return Err(ConfigError::ValidationError(
                "decoder.beam_width must be >= 1".into(),
            ));
        }
        if self.max_length == 0 {
            return Err(ConfigError::ValidationError(
                "decoder.max_length must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

/// A trained caption model: image embedding + partial caption -> next-token distribution.
///
/// Implementations are blocking and must not keep caller-visible state
/// between calls, so one instance can serve many requests.
pub trait CaptionModel: Send + Sync {
    /// Predict the next-token distribution for one padded token sequence.
    ///
    /// `sequence` always has exactly `max_length` entries. The result must hold
    /// one probability per vocabulary index.
    fn predict(&self, embedding: &ImageEmbedding, sequence: &[TokenId]) -> PipelineResult<Vec<f32>>;
}

impl<T: CaptionModel + ?Sized> CaptionModel for Arc<T> {
    fn predict(&self, embedding: &ImageEmbedding, sequence: &[TokenId]) -> PipelineResult<Vec<f32>> {
        (**self).predict(embedding, sequence)
    }
}

/// A decoded caption.
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    /// Rendered caption text (may be empty).
    pub text: String,
    /// Winning token sequence, including the start marker.
    pub tokens: Vec<TokenId>,
    /// Cumulative score of the winning sequence.
    pub score: f64,
}

/// Beam search decoder over an injected caption model and vocabulary.
pub struct BeamSearchDecoder {
    model: Box<dyn CaptionModel>,
    vocabulary: Arc<Vocabulary>,
    options: DecodeOptions,
}

impl BeamSearchDecoder {
    /// Create a decoder. Fails if the options are out of range.
    pub fn new(
        model: Box<dyn CaptionModel>,
        vocabulary: Arc<Vocabulary>,
        options: DecodeOptions,
    ) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self {
            model,
            vocabulary,
            options,
        })
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Decode the best caption for an image embedding.
    ///
    /// Any caption model failure fails the whole decode; no partial caption
    /// is returned.
    pub fn decode(&self, embedding: &ImageEmbedding) -> PipelineResult<Caption> {
        let beam = self.search(embedding)?;
        let best = beam
            .best()
            .ok_or_else(|| PipelineError::decoder("beam search produced no candidates"))?;

        let caption = Caption {
            text: self.vocabulary.render(best.tokens()),
            tokens: best.tokens().to_vec(),
            score: best.score(),
        };
        tracing::debug!(
            "Decoded {:?} (score {:.4}, {} tokens)",
            caption.text,
            caption.score,
            caption.tokens.len()
        );
        Ok(caption)
    }

    /// Run all decoding steps and return the final beam, best first.
    pub fn search(&self, embedding: &ImageEmbedding) -> PipelineResult<Beam> {
        let mut beam = Beam::initial(self.vocabulary.start());
        for step in 0..self.options.max_length {
            beam = self.step(embedding, &beam)?;
            tracing::trace!(
                step,
                width = beam.len(),
                best = beam.best().map(Candidate::score),
                "beam step"
            );
        }
        Ok(beam)
    }

    /// Extend every candidate by its top tokens and prune the pool.
    fn step(&self, embedding: &ImageEmbedding, beam: &Beam) -> PipelineResult<Beam> {
        let width = self.options.beam_width;
        let mut pool = Vec::with_capacity(beam.len() * width);

        for candidate in beam.candidates() {
            let distribution = self.next_token_distribution(embedding, candidate)?;
            for index in top_k(&distribution, width) {
                let contribution = self.options.score_mode.contribution(distribution[index]);
                pool.push(candidate.extend(index as TokenId, contribution));
            }
        }

        Ok(Beam::from_pool(pool, width))
    }

    /// Query the model and check its output matches the vocabulary.
    fn next_token_distribution(
        &self,
        embedding: &ImageEmbedding,
        candidate: &Candidate,
    ) -> PipelineResult<Vec<f32>> {
        let input = candidate.padded(self.options.max_length, self.options.pad_value);
        let distribution = self.model.predict(embedding, &input)?;

        if distribution.len() != self.vocabulary.size() {
            return Err(PipelineError::decoder(format!(
                "expected {} probabilities, model returned {}",
                self.vocabulary.size(),
                distribution.len()
            )));
        }
        if let Some(bad) = distribution.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(PipelineError::decoder(format!(
                "model returned invalid probability {bad}"
            )));
        }
        Ok(distribution)
    }
}
