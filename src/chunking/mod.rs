//! Transcript chunking.
//!
//! Splits a transcript into retrieval-sized pieces. Paragraph breaks from the
//! transcriber are kept where possible; paragraphs are packed together up to
//! `max_chars`, and oversized paragraphs are split at sentence ends.

use crate::config::ChunkingSettings;
use regex::Regex;
use tracing::debug;

/// Paragraph-packing chunker.
pub struct ParagraphChunker {
    max_chars: usize,
    paragraph_break: Regex,
    sentence_end: Regex,
}

impl ParagraphChunker {
    /// Create a chunker producing chunks of at most `max_chars` characters.
    ///
    /// A `max_chars` of zero is treated as one.
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
            paragraph_break: Regex::new(r"\n\s*\n").expect("Invalid regex"),
            sentence_end: Regex::new(r"[.!?…]+[\s]+").expect("Invalid regex"),
        }
    }

    pub fn from_settings(settings: &ChunkingSettings) -> Self {
        Self::new(settings.max_chars)
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Split `text` into non-empty, trimmed chunks in reading order.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();

        for paragraph in self.paragraph_break.split(text) {
            let paragraph = normalize_whitespace(paragraph);
            if paragraph.is_empty() {
                continue;
            }

            for piece in self.fit(&paragraph) {
                if current.is_empty() {
                    current = piece;
                } else if char_len(&current) + 2 + char_len(&piece) <= self.max_chars {
                    current.push_str("\n\n");
                    current.push_str(&piece);
                } else {
                    chunks.push(std::mem::replace(&mut current, piece));
                }
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        debug!(
            "Chunked {} characters into {} chunks",
            char_len(text),
            chunks.len()
        );
        chunks
    }

    /// Break one paragraph into pieces no longer than `max_chars`.
    fn fit(&self, paragraph: &str) -> Vec<String> {
        if char_len(paragraph) <= self.max_chars {
            return vec![paragraph.to_string()];
        }

        let mut pieces = Vec::new();
        let mut current = String::new();

        for sentence in self.sentences(paragraph) {
            if char_len(&sentence) > self.max_chars {
                if !current.is_empty() {
                    pieces.push(std::mem::take(&mut current));
                }
                pieces.extend(hard_split(&sentence, self.max_chars));
            } else if current.is_empty() {
                current = sentence;
            } else if char_len(&current) + 1 + char_len(&sentence) <= self.max_chars {
                current.push(' ');
                current.push_str(&sentence);
            } else {
                pieces.push(std::mem::replace(&mut current, sentence));
            }
        }

        if !current.is_empty() {
            pieces.push(current);
        }
        pieces
    }

    fn sentences(&self, paragraph: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;

        for m in self.sentence_end.find_iter(paragraph) {
            let sentence = paragraph[start..m.end()].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = m.end();
        }

        let tail = paragraph[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail.to_string());
        }
        sentences
    }
}

impl Default for ParagraphChunker {
    fn default() -> Self {
        Self::from_settings(&ChunkingSettings::default())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Collapse runs of whitespace inside a paragraph into single spaces.
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split on char boundaries, preferring the last space before the limit.
fn hard_split(text: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut rest: Vec<char> = text.chars().collect();

    while rest.len() > max_chars {
        let cut = rest[..max_chars]
            .iter()
            .rposition(|c| c.is_whitespace())
            .filter(|&pos| pos > 0)
            .unwrap_or(max_chars);

        let piece: String = rest[..cut].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }
        rest = rest[cut..].to_vec();
        while rest.first().is_some_and(|c| c.is_whitespace()) {
            rest.remove(0);
        }
    }

    let tail: String = rest.into_iter().collect();
    if !tail.trim().is_empty() {
        pieces.push(tail.trim().to_string());
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_transcript() {
        let chunker = ParagraphChunker::new(100);
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("  \n\n \n ").is_empty());
    }

    #[test]
    fn test_short_paragraphs_are_packed() {
        let chunker = ParagraphChunker::new(100);
        let chunks = chunker.chunk("First paragraph.\n\nSecond paragraph.\n \nThird.");
        assert_eq!(
            chunks,
            vec!["First paragraph.\n\nSecond paragraph.\n\nThird.".to_string()]
        );
    }

    #[test]
    fn test_paragraphs_split_when_full() {
        let chunker = ParagraphChunker::new(20);
        let chunks = chunker.chunk("Alpha beta gamma.\n\nDelta epsilon.");
        assert_eq!(
            chunks,
            vec!["Alpha beta gamma.".to_string(), "Delta epsilon.".to_string()]
        );
    }

    #[test]
    fn test_long_paragraph_splits_at_sentences() {
        let chunker = ParagraphChunker::new(30);
        let text = "Plants need light. Chlorophyll absorbs it. Sugar is the result.";
        let chunks = chunker.chunk(text);

        assert_eq!(
            chunks,
            vec![
                "Plants need light.".to_string(),
                "Chlorophyll absorbs it.".to_string(),
                "Sugar is the result.".to_string(),
            ]
        );
        assert!(chunks.iter().all(|c| c.chars().count() <= 30));
    }

    #[test]
    fn test_hard_split_respects_limit_and_chars() {
        let chunker = ParagraphChunker::new(10);
        let text = "ééééééééééééééééééééééé and some words without any stop";
        let chunks = chunker.chunk(text);

        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert!(chunks.iter().all(|c| !c.trim().is_empty()));
        let rejoined: String = chunks.concat().split_whitespace().collect();
        let original: String = text.split_whitespace().collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn test_whitespace_is_normalized() {
        let chunker = ParagraphChunker::new(200);
        let chunks = chunker.chunk("  Line one\nline   two  ");
        assert_eq!(chunks, vec!["Line one line two".to_string()]);
    }
}
