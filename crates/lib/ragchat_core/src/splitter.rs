//! Recursive character text splitter.
//!
//! Splits on the coarsest separator present (`"\n\n"`, then `"\n"`, then
//! `" "`, then individual characters), recursing into pieces that are still
//! too long, and merges neighbouring pieces back into chunks of at most
//! `chunk_size` characters. Consecutive chunks share up to `chunk_overlap`
//! characters of trailing pieces. Separators stay attached to the start of
//! the piece that follows them. Lengths are counted in `char`s.

use std::collections::VecDeque;

use log::warn;
use thiserror::Error;

use crate::config::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitterError {
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    #[error("chunk overlap ({overlap}) is larger than chunk size ({size})")]
    OverlapTooLarge { size: usize, overlap: usize },
}

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, SplitterError> {
        if chunk_size == 0 {
            return Err(SplitterError::ZeroChunkSize);
        }
        if chunk_overlap > chunk_size {
            return Err(SplitterError::OverlapTooLarge {
                size: chunk_size,
                overlap: chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            ..Self::default()
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into trimmed, non-empty chunks.
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
                separator = candidate;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut small: Vec<String> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                small.push(piece);
                continue;
            }
            if !small.is_empty() {
                chunks.extend(self.merge_pieces(&small));
                small.clear();
            }
            if remaining.is_empty() {
                chunks.extend(join_trimmed([piece.as_str()]));
            } else {
                chunks.extend(self.split_recursive(&piece, remaining));
            }
        }
        if !small.is_empty() {
            chunks.extend(self.merge_pieces(&small));
        }
        chunks
    }

    /// Greedily pack pieces into chunks, keeping an overlapping tail.
    fn merge_pieces(&self, pieces: &[String]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        "created a chunk of size {total}, which is longer than the specified {}",
                        self.chunk_size
                    );
                }
                if !current.is_empty() {
                    chunks.extend(join_trimmed(current.iter().copied()));
                    while total > self.chunk_overlap
                        || (total + len > self.chunk_size && total > 0)
                    {
                        match current.pop_front() {
                            Some(dropped) => total -= char_len(dropped),
                            None => break,
                        }
                    }
                }
            }
            current.push_back(piece);
            total += len;
        }

        chunks.extend(join_trimmed(current.iter().copied()));
        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Concatenate pieces and trim; `None` when nothing but whitespace remains.
fn join_trimmed<'a>(pieces: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let joined: String = pieces.into_iter().collect();
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Split on `separator`, attaching each separator to the following piece.
/// An empty separator splits into characters.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }
    let mut parts = text.split(separator);
    let mut pieces = Vec::new();
    if let Some(first) = parts.next() {
        pieces.push(first.to_string());
    }
    pieces.extend(parts.map(|p| format!("{separator}{p}")));
    pieces.retain(|p| !p.is_empty());
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_trimmed_chunk() {
        let splitter = TextSplitter::default();
        assert_eq!(splitter.split_text("  hello world \n"), vec!["hello world"]);
    }

    #[test]
    fn empty_and_blank_text_produce_nothing() {
        let splitter = TextSplitter::default();
        assert!(splitter.split_text("").is_empty());
        assert!(splitter.split_text(" \n\n \n").is_empty());
    }

    #[test]
    fn paragraphs_are_packed_up_to_chunk_size() {
        let splitter = TextSplitter::new(10, 0).unwrap();
        let chunks = splitter.split_text("aaaa\n\nbbbb\n\ncccc");
        assert_eq!(chunks, vec!["aaaa\n\nbbbb", "cccc"]);
    }

    #[test]
    fn neighbouring_chunks_overlap() {
        let splitter = TextSplitter::new(10, 5).unwrap();
        let chunks = splitter.split_text("one two three four five");
        assert_eq!(chunks, vec!["one two", "two three", "four five"]);
    }

    #[test]
    fn text_without_separators_falls_back_to_characters() {
        let splitter = TextSplitter::new(4, 0).unwrap();
        assert_eq!(splitter.split_text("abcdefghij"), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn long_paragraph_is_split_on_finer_separators() {
        let splitter = TextSplitter::new(12, 0).unwrap();
        let text = "short\n\nthis paragraph is long";
        let chunks = splitter.split_text(text);
        assert_eq!(chunks[0], "short");
        assert!(chunks.iter().all(|c| c.chars().count() <= 12), "{chunks:?}");
        assert_eq!(chunks.join(" "), "short this paragraph is long");
    }

    #[test]
    fn chunks_never_exceed_size_for_prose() {
        let splitter = TextSplitter::new(100, 20).unwrap();
        let text = "Docker is a platform for developing, shipping, and running applications. "
            .repeat(40);
        let chunks = splitter.split_text(&text);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let splitter = TextSplitter::new(6, 0).unwrap();
        let chunks = splitter.split_text("ééééé ààààà");
        assert_eq!(chunks, vec!["ééééé", "ààààà"]);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert_eq!(
            TextSplitter::new(10, 20).unwrap_err(),
            SplitterError::OverlapTooLarge { size: 10, overlap: 20 }
        );
        assert_eq!(TextSplitter::new(0, 0).unwrap_err(), SplitterError::ZeroChunkSize);
    }

    #[test]
    fn separators_attach_to_following_piece() {
        assert_eq!(split_keeping_separator("a\n\nb", "\n\n"), vec!["a", "\n\nb"]);
        assert_eq!(split_keeping_separator("a b", ""), vec!["a", " ", "b"]);
        assert_eq!(split_keeping_separator("\n\na", "\n\n"), vec!["\n\na"]);
    }
}
