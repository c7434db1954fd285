//! UART input word source.
//!
//! The UART input file is a sequence of whitespace-separated decimal integers. The whole file
//! is tokenized and validated before the run starts, so a malformed token is reported as a
//! configuration error instead of surfacing mid-run. During the run the source is a cursor
//! over the validated words.

use std::fs;
use std::path::Path;

use crate::common::error::{HarnessError, InputKind};

/// Validated UART input words with a read cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UartSource {
    words: Vec<u32>,
    cursor: usize,
}

/// Parses one token the way the DUT software expects it: a signed 32-bit or unsigned 32-bit
/// decimal integer, stored as its 32-bit two's-complement pattern.
fn parse_word(token: &str) -> Option<u32> {
    let value: i64 = token.parse().ok()?;
    if value < i64::from(i32::MIN) || value > i64::from(u32::MAX) {
        return None;
    }
    Some(value as u32)
}

impl UartSource {
    /// Creates a source over already-validated words.
    pub const fn from_words(words: Vec<u32>) -> Self {
        Self { words, cursor: 0 }
    }

    /// Tokenizes and validates `text`; `path` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::MalformedUartToken`] for the first token that is not an integer.
    pub fn parse(path: &Path, text: &str) -> Result<Self, HarnessError> {
        let words = text
            .split_whitespace()
            .enumerate()
            .map(|(index, token)| {
                parse_word(token).ok_or_else(|| HarnessError::MalformedUartToken {
                    path: path.to_path_buf(),
                    index,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_words(words))
    }

    /// Reads and validates a UART input file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or contains a malformed token.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        if !path.is_file() {
            return Err(HarnessError::MissingFile {
                kind: InputKind::UartIn,
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Takes the next word, or `None` once the source is exhausted.
    pub fn next_word(&mut self) -> Option<u32> {
        let word = self.words.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(word)
    }

    /// Whether every word has been taken.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.words.len()
    }

    /// Words not yet taken.
    pub fn remaining(&self) -> usize {
        self.words.len().saturating_sub(self.cursor)
    }

    /// Total number of words in the source.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the source holds no words at all.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
