//! Recursive separator text splitter.
//!
//! Text is split on the first separator that occurs in it, keeping the
//! separator at the start of the following piece. Pieces shorter than the
//! chunk size are merged greedily into chunks; longer pieces are split again
//! with the remaining separators. When a chunk is emitted, trailing pieces of
//! up to `chunk_overlap` characters are carried into the next one.
//!
//! All lengths are counted in Unicode scalar values.

use imdg_models::DocumentChunk;
use imdg_utils::{ChunkingConfig, ImdgError, ImdgResult};
use std::collections::VecDeque;

pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveTextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveTextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> ImdgResult<Self> {
        if chunk_size == 0 {
            return Err(ImdgError::configuration("chunk_size must be at least 1"));
        }
        if chunk_overlap >= chunk_size {
            return Err(ImdgError::configuration(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn from_config(config: &ChunkingConfig) -> ImdgResult<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Splits `text` into indexed chunks, index 0 first.
    pub fn split(&self, text: &str) -> Vec<DocumentChunk> {
        self.split_text(text)
            .into_iter()
            .enumerate()
            .map(|(index, text)| DocumentChunk::new(index, text))
            .collect()
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate.as_str();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut good_splits: Vec<String> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                good_splits.push(piece);
                continue;
            }

            if !good_splits.is_empty() {
                chunks.extend(self.merge_splits(&good_splits));
                good_splits.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_recursive(&piece, remaining));
            }
        }

        if !good_splits.is_empty() {
            chunks.extend(self.merge_splits(&good_splits));
        }
        chunks
    }

    fn merge_splits(&self, splits: &[String]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut current: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for split in splits {
            let len = char_len(split);

            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    tracing::warn!(
                        length = total,
                        chunk_size = self.chunk_size,
                        "Created a chunk longer than the configured size"
                    );
                }
                if !current.is_empty() {
                    if let Some(doc) = join_pieces(&current) {
                        docs.push(doc);
                    }
                    while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                        match current.pop_front() {
                            Some((_, dropped)) => total -= dropped,
                            None => break,
                        }
                    }
                }
            }

            current.push_back((split.as_str(), len));
            total += len;
        }

        if let Some(doc) = join_pieces(&current) {
            docs.push(doc);
        }
        docs
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn join_pieces(pieces: &VecDeque<(&str, usize)>) -> Option<String> {
    let joined: String = pieces.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Splits on `separator`, attaching it to the start of each following piece.
/// An empty separator splits into single characters.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }

    let mut parts = text.split(separator);
    let mut pieces = Vec::new();
    if let Some(first) = parts.next() {
        pieces.push(first.to_string());
    }
    pieces.extend(parts.map(|part| format!("{}{}", separator, part)));
    pieces.retain(|p| !p.is_empty());
    pieces
}
