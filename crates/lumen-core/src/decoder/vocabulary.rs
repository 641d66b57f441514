//! Token vocabulary for caption decoding.
//!
//! Maps caption words to the integer indices the caption model was trained
//! with. Index 0 is reserved for sequence padding, so real tokens start at 1.
//! Two formats are accepted:
//!
//! - `.json`: either a flat `{"token": index}` object, or a Keras tokenizer
//!   export whose `config.word_index` holds that object (possibly as a string).
//! - anything else: one token per line, line `n` (zero-based) gets index `n + 1`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::VocabularyConfig;
use crate::error::ConfigError;

use super::TokenId;

/// An immutable bidirectional token <-> index map with start and end markers.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Indexed by token id; slot 0 (padding) is always `None`.
    tokens: Vec<Option<String>>,
    by_token: HashMap<String, TokenId>,
    start: TokenId,
    end: TokenId,
}

impl Vocabulary {
    /// Load a vocabulary file and resolve the configured start and end tokens.
    pub fn load(path: &Path, config: &VocabularyConfig) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Vocabulary {
            path: path.to_path_buf(),
            message: format!("Failed to read: {e}"),
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let pairs = if is_json {
            parse_json(&content, path)?
        } else {
            parse_lines(&content)
        };

        let vocabulary = Self::build(pairs, &config.start_token, &config.end_token, path)?;
        tracing::info!(
            "Loaded vocabulary from {:?}: {} tokens (start={}, end={})",
            path,
            vocabulary.len(),
            vocabulary.start,
            vocabulary.end,
        );
        Ok(vocabulary)
    }

    /// Build a vocabulary from explicit `(token, index)` pairs.
    pub fn from_pairs<I, S>(pairs: I, start_token: &str, end_token: &str) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, TokenId)>,
        S: Into<String>,
    {
        let pairs = pairs.into_iter().map(|(t, i)| (t.into(), i)).collect();
        Self::build(pairs, start_token, end_token, Path::new("<inline>"))
    }

    fn build(
        pairs: Vec<(String, TokenId)>,
        start_token: &str,
        end_token: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        let invalid = |message: String| ConfigError::Vocabulary {
            path: PathBuf::from(path),
            message,
        };

        // Indices run densely from 1; anything past the token count is a gap.
        let max_index = pairs.iter().map(|(_, i)| *i as usize).max().unwrap_or(0);
        if max_index > pairs.len() {
            return Err(invalid(format!(
                "index {max_index} exceeds token count {}; indices must run from 1 to {}",
                pairs.len(),
                pairs.len()
            )));
        }
        let size = max_index + 1;
        let mut tokens: Vec<Option<String>> = vec![None; size];
        let mut by_token = HashMap::with_capacity(pairs.len());

        for (token, index) in pairs {
            if index == 0 {
                return Err(invalid(format!(
                    "token {token:?} uses index 0, which is reserved for padding"
                )));
            }
            let slot = &mut tokens[index as usize];
            if let Some(existing) = slot {
                return Err(invalid(format!(
                    "index {index} is assigned to both {existing:?} and {token:?}"
                )));
            }
            if by_token.insert(token.clone(), index).is_some() {
                return Err(invalid(format!("token {token:?} appears more than once")));
            }
            *slot = Some(token);
        }

        let start = *by_token
            .get(start_token)
            .ok_or_else(|| ConfigError::MissingToken {
                role: "start",
                token: start_token.to_string(),
            })?;
        let end = *by_token
            .get(end_token)
            .ok_or_else(|| ConfigError::MissingToken {
                role: "end",
                token: end_token.to_string(),
            })?;

        Ok(Self {
            tokens,
            by_token,
            start,
            end,
        })
    }

    /// Index of the start-of-sequence marker.
    pub fn start(&self) -> TokenId {
        self.start
    }

    /// Index of the end-of-sequence marker.
    pub fn end(&self) -> TokenId {
        self.end
    }

    /// Look up the index of a token.
    pub fn index_of(&self, token: &str) -> Option<TokenId> {
        self.by_token.get(token).copied()
    }

    /// Resolve an index to its token; unknown indices resolve to `""`.
    pub fn token(&self, index: TokenId) -> &str {
        self.tokens
            .get(index as usize)
            .and_then(|t| t.as_deref())
            .unwrap_or("")
    }

    /// Width of the index space (largest index + 1), i.e. the length of a
    /// caption model output distribution.
    pub fn size(&self) -> usize {
        self.tokens.len()
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    /// Whether the vocabulary has no tokens.
    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }

    /// Render a decoded sequence as caption text.
    ///
    /// The leading start marker is dropped and the sequence is cut at the first
    /// end marker (exclusive). Remaining tokens are joined with single spaces.
    pub fn render(&self, sequence: &[TokenId]) -> String {
        let body = match sequence.split_first() {
            Some((&first, rest)) if first == self.start => rest,
            _ => sequence,
        };
        body.iter()
            .take_while(|&&index| index != self.end)
            .map(|&index| self.token(index))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn parse_json(content: &str, path: &Path) -> Result<Vec<(String, TokenId)>, ConfigError> {
    let invalid = |message: String| ConfigError::Vocabulary {
        path: path.to_path_buf(),
        message,
    };

    let root: Value = serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;

    // Keras `tokenizer.to_json()` nests the map under config.word_index,
    // serialized as a JSON string.
    let word_index = match root.pointer("/config/word_index") {
        Some(Value::String(raw)) => {
            serde_json::from_str::<Value>(raw).map_err(|e| invalid(e.to_string()))?
        }
        Some(nested) => nested.clone(),
        None => root,
    };

    let map = word_index
        .as_object()
        .ok_or_else(|| invalid("expected a JSON object of token -> index".to_string()))?;

    map.iter()
        .map(|(token, index)| {
            index
                .as_u64()
                .and_then(|i| TokenId::try_from(i).ok())
                .map(|i| (token.clone(), i))
                .ok_or_else(|| invalid(format!("index for {token:?} is not a valid integer")))
        })
        .collect()
}

fn parse_lines(content: &str) -> Vec<(String, TokenId)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .zip(1..)
        .map(|(token, index)| (token.to_string(), index))
        .collect()
}
