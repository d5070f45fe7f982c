//! Token-window chunking with a structure-aware pre-split for markup.

use std::path::Path;

use crate::error::{IndexError, Result};

/// Reference tokenizer used to bound chunk sizes.
///
/// Chunking only needs a reversible encode/decode pair; the trait keeps the
/// chunker a pure function of text plus parameters, independent of any
/// particular tokenizer backend.
pub trait TokenCodec: Send + Sync {
    /// Encode text into token ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the tokenizer rejects the input.
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    /// Decode token ids back into text.
    ///
    /// # Errors
    ///
    /// Returns an error if the ids cannot be decoded.
    fn decode(&self, ids: &[u32]) -> Result<String>;
}

/// [`TokenCodec`] backed by a HuggingFace tokenizer definition file.
pub struct HuggingFaceCodec {
    inner: tokenizers::Tokenizer,
}

impl HuggingFaceCodec {
    /// Load a tokenizer from a `tokenizer.json` definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let inner = tokenizers::Tokenizer::from_file(path)
            .map_err(|e| IndexError::Tokenize(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl std::fmt::Debug for HuggingFaceCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceCodec").finish_non_exhaustive()
    }
}

impl TokenCodec for HuggingFaceCodec {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| IndexError::Tokenize(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.inner
            .decode(ids, true)
            .map_err(|e| IndexError::Tokenize(e.to_string()))
    }
}

/// Extensions whose content gets the structure-aware pre-split.
#[must_use]
pub fn is_markup(ext: &str) -> bool {
    matches!(ext, "md" | "mdx" | "markdown" | "txt")
}

/// Slide a `max_tokens` window over the text, advancing by
/// `max_tokens - overlap` each step. Windows are decoded back to text,
/// trimmed, and empty results dropped.
///
/// An overlap at or above `max_tokens` is treated as zero so the window
/// always makes forward progress. Deterministic for fixed input and
/// parameters.
///
/// # Errors
///
/// Returns an error if the codec fails to encode or decode.
pub fn chunk(
    codec: &dyn TokenCodec,
    text: &str,
    max_tokens: usize,
    overlap: usize,
) -> Result<Vec<String>> {
    if max_tokens == 0 || text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let tokens = codec.encode(text)?;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < tokens.len() {
        let end = (start + max_tokens).min(tokens.len());
        let piece = codec.decode(&tokens[start..end])?;
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        let next = end.saturating_sub(overlap);
        start = if next > start { next } else { end };
    }

    Ok(chunks)
}

/// Split markup text into coarse sections on heading lines, blank lines,
/// and list-item markers, so token windows never span unrelated sections.
/// Headings become sections of their own; list markers are stripped.
#[must_use]
pub fn markup_sections(text: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if is_heading(line) {
            flush(&mut current, &mut sections);
            sections.push(line.trim().to_string());
        } else if line.trim().is_empty() {
            flush(&mut current, &mut sections);
        } else if let Some(rest) = list_item_text(line) {
            flush(&mut current, &mut sections);
            current.push_str(rest);
            current.push('\n');
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }

    flush(&mut current, &mut sections);
    sections
}

fn flush(current: &mut String, sections: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sections.push(trimmed.to_string());
    }
    current.clear();
}

fn is_heading(line: &str) -> bool {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    (1..=6).contains(&hashes)
        && line[hashes..]
            .chars()
            .next()
            .is_some_and(char::is_whitespace)
}

fn list_item_text(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('-').or_else(|| line.strip_prefix('*'))?;
    let first = rest.chars().next()?;
    first.is_whitespace().then(|| rest.trim_start())
}
