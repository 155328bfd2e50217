// Sentence-aware text splitting with overlap
//
// Positions are counted in chars, not bytes, so windows never split a
// multi-byte character.

use crate::error::{Result, SemrankError};

/// Texts longer than this (in chars) get progress logging
pub const DEFAULT_LARGE_TEXT_THRESHOLD: usize = 100_000;

const SENTENCE_TERMINATORS: [char; 3] = ['.', '?', '!'];

/// Collapse whitespace runs into single spaces and trim both ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Check chunking parameters
pub fn validate_params(chunk_size: usize, overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(SemrankError::invalid_input(
            "chunk_size",
            "must be greater than 0",
        ));
    }
    if overlap >= chunk_size {
        return Err(SemrankError::invalid_input(
            "chunk_overlap",
            format!(
                "must be smaller than chunk_size ({}), got {}",
                chunk_size, overlap
            ),
        ));
    }
    Ok(())
}

/// Split text into overlapping chunks of at most `chunk_size` chars
///
/// Windows prefer to end after a sentence terminator (`. `, `? `, `! `) in
/// their second half, then at a space, and only cut mid-word as a last
/// resort. Consecutive windows share `overlap` chars.
///
/// # Arguments
/// * `text` - Raw document text (whitespace is normalized first)
/// * `chunk_size` - Maximum chunk length in chars (> 0)
/// * `overlap` - Chars shared by consecutive chunks (< chunk_size)
///
/// # Returns
/// Non-empty chunk strings in document order; empty for blank input
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    split(text, chunk_size, overlap, DEFAULT_LARGE_TEXT_THRESHOLD)
}

pub(crate) fn split(
    text: &str,
    chunk_size: usize,
    overlap: usize,
    large_text_threshold: usize,
) -> Result<Vec<String>> {
    validate_params(chunk_size, overlap)?;

    let normalized = normalize_whitespace(text);
    if normalized.is_empty() {
        return Ok(Vec::new());
    }

    let chars: Vec<char> = normalized.chars().collect();
    let total = chars.len();

    if total <= chunk_size {
        return Ok(vec![normalized]);
    }

    let is_large = total > large_text_threshold;
    if is_large {
        tracing::info!("Chunking large text ({} characters)", total);
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < total {
        let window_end = start + chunk_size;
        let end = if window_end < total {
            find_break(&chars, start, window_end, chunk_size)
        } else {
            total
        };

        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        if end >= total {
            break;
        }

        // Overlap reaching before the text start ends chunking
        let Some(next) = end.checked_sub(overlap) else {
            break;
        };

        // Never step backwards, even when a break point sits close to start
        start = if next > start { next } else { end };

        if is_large && chunks.len() % 10 == 0 {
            let progress = (end * 100 / total).min(100);
            tracing::debug!(
                "Chunking progress: {}% ({} chunks created)",
                progress,
                chunks.len()
            );
        }
    }

    if is_large {
        tracing::info!("Chunking complete: {} chunks", chunks.len());
    }

    Ok(chunks)
}

/// Pick the end of the window `[start, end)`, where `end < chars.len()`
///
/// All three terminators compete equally: the one closest to the window end
/// wins. This differs from a priority search (`. ` before `? ` before `! `)
/// on text that mixes punctuation.
fn find_break(chars: &[char], start: usize, end: usize, chunk_size: usize) -> usize {
    let midpoint = start + chunk_size / 2;

    // Latest "<terminator><space>" fully inside the window, past the midpoint
    if end >= 2 {
        let mut pos = end - 2;
        while pos > midpoint {
            if SENTENCE_TERMINATORS.contains(&chars[pos]) && chars[pos + 1] == ' ' {
                return pos + 1;
            }
            pos -= 1;
        }
    }

    // Nearest space at or before the window end
    let mut pos = end;
    while pos > start && chars[pos] != ' ' {
        pos -= 1;
    }

    if pos == start {
        end
    } else {
        pos
    }
}
