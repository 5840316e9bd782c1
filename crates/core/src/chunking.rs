use crate::error::IngestError;
use crate::models::{DocumentPage, TextChunk};
use std::collections::VecDeque;

/// Boundary kinds tried in order before falling back to a hard character cut.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1_000,
            chunk_overlap: 400,
        }
    }
}

impl ChunkingConfig {
    /// Overlap must stay strictly below the chunk size or the splitter makes
    /// no forward progress.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.chunk_size == 0 {
            return Err(IngestError::InvalidChunkConfig(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(IngestError::InvalidChunkConfig(format!(
                "chunk overlap {} must be smaller than chunk size {}",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Splits `text` into pieces of at most `max_chars`, descending through the
/// separator list so paragraph, line, sentence, and word boundaries are
/// preferred over a mid-word cut. Separators stay attached to the piece they
/// terminate, so the pieces concatenate back to the input exactly.
fn split_at_boundaries(text: &str, level: usize, max_chars: usize) -> Vec<String> {
    if char_len(text) <= max_chars {
        return vec![text.to_string()];
    }

    if level >= SEPARATORS.len() {
        // No boundary left to honor; cut per character and let the merge
        // pass reassemble windows with the configured overlap.
        return text.chars().map(|character| character.to_string()).collect();
    }

    let parts: Vec<&str> = text.split_inclusive(SEPARATORS[level]).collect();
    if parts.len() <= 1 {
        return split_at_boundaries(text, level + 1, max_chars);
    }

    let mut pieces = Vec::new();
    for part in parts {
        if char_len(part) <= max_chars {
            pieces.push(part.to_string());
        } else {
            pieces.extend(split_at_boundaries(part, level + 1, max_chars));
        }
    }
    pieces
}

/// Greedily packs boundary pieces into chunks of at most `chunk_size`
/// characters. When a chunk is emitted, a tail of whole pieces totalling at
/// most `chunk_overlap` characters is carried over as the start of the next
/// chunk.
fn merge_pieces(pieces: Vec<String>, config: ChunkingConfig) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut window: VecDeque<(String, usize)> = VecDeque::new();
    let mut window_chars = 0usize;

    for piece in pieces {
        let piece_chars = char_len(&piece);

        if !window.is_empty() && window_chars + piece_chars > config.chunk_size {
            chunks.push(join_window(&window));

            while window_chars > config.chunk_overlap
                || window_chars + piece_chars > config.chunk_size
            {
                match window.pop_front() {
                    Some((_, dropped)) => window_chars -= dropped,
                    None => break,
                }
            }
        }

        window_chars += piece_chars;
        window.push_back((piece, piece_chars));
    }

    if !window.is_empty() {
        chunks.push(join_window(&window));
    }

    chunks
}

fn join_window(window: &VecDeque<(String, usize)>) -> String {
    window
        .iter()
        .map(|(piece, _)| piece.as_str())
        .collect::<String>()
}

/// Splits one text into chunks of at most `chunk_size` characters with up to
/// `chunk_overlap` characters shared between consecutive chunks. Every chunk
/// is an exact substring of the input and together they cover it with no gap.
///
/// Assumes a validated config (`chunk_overlap < chunk_size`).
pub fn split_text(text: &str, config: ChunkingConfig) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let pieces = split_at_boundaries(text, 0, config.chunk_size);
    merge_pieces(pieces, config)
}

/// Bulk pass over the accumulated page sequence: each page is split on its
/// own (chunks never span pages, so page metadata stays exact) while the
/// chunk index runs globally across the batch.
pub fn split_pages(pages: &[DocumentPage], config: ChunkingConfig) -> Vec<TextChunk> {
    let mut chunks = Vec::new();
    let mut cursor = 0u64;

    for page in pages {
        for text in split_text(&page.text, config) {
            chunks.push(TextChunk {
                text,
                source_url: page.source_url.clone(),
                page_number: page.page_number,
                chunk_index: cursor,
            });
            cursor = cursor.saturating_add(1);
        }
    }

    chunks
}
