//! Recursive character splitter.

use std::collections::VecDeque;

use tracing::warn;

use super::types::{ChunkError, DEFAULT_SEPARATORS};

/// Character count (the unit of `chunk_size` and `chunk_overlap`).
pub(super) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Splits text on the coarsest separator present, recursing into pieces
/// that are still too long, then greedily merges small pieces back up to
/// `chunk_size` characters with up to `chunk_overlap` characters shared
/// between neighbours.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &'static [&'static str],
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ChunkError> {
        if chunk_size == 0 {
            return Err(ChunkError::InvalidConfig("chunk_size must be > 0".into()));
        }
        if chunk_overlap > chunk_size {
            return Err(ChunkError::InvalidConfig(format!(
                "chunk_overlap ({chunk_overlap}) larger than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS,
        })
    }

    pub fn with_separators(mut self, separators: &'static [&'static str]) -> Self {
        self.separators = separators;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, self.separators)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (separator, remaining) = pick_separator(text, separators);
        let mut chunks = Vec::new();
        let mut good: Vec<&str> = Vec::new();

        for piece in split_on(text, separator) {
            if char_len(piece) < self.chunk_size {
                good.push(piece);
                continue;
            }
            if !good.is_empty() {
                chunks.extend(self.merge_splits(&good, separator));
                good.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_with(piece, remaining));
            }
        }

        if !good.is_empty() {
            chunks.extend(self.merge_splits(&good, separator));
        }
        chunks
    }

    fn merge_splits(&self, splits: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in splits {
            let len = char_len(piece);
            let joined = |total: usize, current: &VecDeque<&str>| {
                total + len + if current.is_empty() { 0 } else { sep_len }
            };

            if joined(total, &current) > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        size = total,
                        chunk_size = self.chunk_size,
                        "Created a chunk longer than the configured size"
                    );
                }
                if !current.is_empty() {
                    if let Some(doc) = join_docs(&current, separator) {
                        docs.push(doc);
                    }
                    // Drop leading pieces until what is left fits as overlap.
                    while total > self.chunk_overlap
                        || (joined(total, &current) > self.chunk_size && total > 0)
                    {
                        let Some(first) = current.front() else { break };
                        let dropped = char_len(first) + if current.len() > 1 { sep_len } else { 0 };
                        total = total.saturating_sub(dropped);
                        current.pop_front();
                    }
                }
            }

            current.push_back(piece);
            total += len + if current.len() > 1 { sep_len } else { 0 };
        }

        if let Some(doc) = join_docs(&current, separator) {
            docs.push(doc);
        }
        docs
    }
}

/// First separator present in `text` plus the finer ones left for recursion.
/// The empty separator always matches and ends the recursion.
fn pick_separator<'a>(text: &str, separators: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    for (i, sep) in separators.iter().enumerate() {
        if sep.is_empty() {
            return ("", &[]);
        }
        if text.contains(sep) {
            return (sep, &separators[i + 1..]);
        }
    }
    (separators.last().copied().unwrap_or(""), &[])
}

/// Non-empty pieces of `text`; the empty separator yields single characters.
fn split_on<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        text.char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect()
    } else {
        text.split(separator).filter(|s| !s.is_empty()).collect()
    }
}

fn join_docs(pieces: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = pieces.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
