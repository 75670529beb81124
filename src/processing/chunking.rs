//! Fixed-size character chunking with overlap.
//!
//! Extracted document text is split into windows of at most `chunk_size`
//! characters. Breaks prefer the last whitespace inside the window so words
//! survive intact, and each window starts `overlap` characters before the
//! previous break so spans near boundaries stay visible to retrieval. The
//! split is deterministic for a fixed input and parameter set.

use super::types::ChunkingError;

/// Split text into overlapping chunks of at most `chunk_size` characters.
///
/// Operates on character boundaries, so multi-byte input is never cut inside
/// a scalar value. Chunks are trimmed and empty ones dropped; whitespace-only
/// input produces no chunks.
pub(crate) fn split_text(
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<String>, ChunkingError> {
    if chunk_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    if overlap >= chunk_size {
        return Err(ChunkingError::OverlapTooLarge);
    }
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < total {
        let hard_end = (start + chunk_size).min(total);
        let end = if hard_end == total {
            total
        } else {
            // Break at the last whitespace inside the window when one exists
            // past the first character; otherwise cut at the size limit.
            match chars[start..hard_end]
                .iter()
                .rposition(|c| c.is_whitespace())
            {
                Some(position) if position > 0 => start + position + 1,
                _ => hard_end,
            }
        };

        let chunk: String = chars[start..end].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        if end == total {
            break;
        }
        let next = end.saturating_sub(overlap);
        // The overlap must never stall the walk on short windows.
        start = if next > start { next } else { end };
    }

    Ok(chunks)
}
