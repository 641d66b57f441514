//! Candidate sequences and the bounded beam that holds them.

use super::TokenId;

/// One partial caption hypothesis: token indices plus cumulative score.
///
/// Candidates are never mutated; [`Candidate::extend`] returns a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    tokens: Vec<TokenId>,
    score: f64,
}

impl Candidate {
    /// The initial hypothesis: just the start marker, score 0.
    pub fn start(start_token: TokenId) -> Self {
        Self {
            tokens: vec![start_token],
            score: 0.0,
        }
    }

    /// Token indices, beginning with the start marker.
    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    /// Cumulative score.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// A new candidate with `token` appended and `contribution` added to the score.
    #[must_use]
    pub fn extend(&self, token: TokenId, contribution: f64) -> Self {
        let mut tokens = Vec::with_capacity(self.tokens.len() + 1);
        tokens.extend_from_slice(&self.tokens);
        tokens.push(token);
        Self {
            tokens,
            score: self.score + contribution,
        }
    }

    /// The model input for this candidate: exactly `width` entries.
    ///
    /// Sequences longer than `width` keep their most recent tokens; shorter
    /// ones are followed by `pad` ("post" padding).
    pub fn padded(&self, width: usize, pad: TokenId) -> Vec<TokenId> {
        let skip = self.tokens.len().saturating_sub(width);
        let mut padded = Vec::with_capacity(width);
        padded.extend_from_slice(&self.tokens[skip..]);
        padded.resize(width, pad);
        padded
    }
}

/// The surviving hypotheses at one decoding step, best first.
#[derive(Debug, Clone)]
pub struct Beam {
    candidates: Vec<Candidate>,
}

impl Beam {
    /// The beam before any decoding step.
    pub fn initial(start_token: TokenId) -> Self {
        Self {
            candidates: vec![Candidate::start(start_token)],
        }
    }

    /// Prune a pool of extensions to the `width` highest-scoring candidates.
    ///
    /// The sort is stable, so equal scores keep their pool order (earlier beam
    /// member first, then more probable token first).
    pub fn from_pool(mut pool: Vec<Candidate>, width: usize) -> Self {
        pool.sort_by(|a, b| b.score.total_cmp(&a.score));
        pool.truncate(width);
        Self { candidates: pool }
    }

    /// Candidates ordered by descending score.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// The highest-scoring candidate.
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
