use anyhow::{Context, Result};
use regex::Regex;

/// Comparison key for document content: lowercased, everything except
/// letters, numbers, `_` and whitespace stripped, whitespace collapsed to
/// single spaces. Never written back to disk.
///
/// Combining marks count as punctuation here, so `cafe\u{301}` and `café`
/// normalize differently.
#[derive(Debug, Clone)]
pub struct ContentNormalizer {
    punctuation: Regex,
}

impl ContentNormalizer {
    pub fn new() -> Result<Self> {
        let punctuation = Regex::new(r"[^\p{L}\p{N}_\s]")
            .context("failed to compile punctuation regex")?;
        Ok(Self { punctuation })
    }

    pub fn normalize(&self, raw: &str) -> String {
        // Lowercasing first: `İ` lowercases to `i` plus a combining dot,
        // which must be stripped for the key to be stable.
        let lowered = raw.to_lowercase();
        let stripped = self.punctuation.replace_all(&lowered, "");
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
