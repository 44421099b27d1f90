// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::stop_words::FRENCH_STOP_WORDS;
use unicode_normalization::UnicodeNormalization;

/// Shorter tokens are never counted
pub const MIN_TOKEN_LEN: usize = 2;

/// Turns raw text into countable words.
///
/// Steps, in order: UTF-8 decode, lowercase, fold accents (NFD then drop
/// non-ASCII), map everything outside `a-z` to a space, remove stop words,
/// split on whitespace, drop tokens shorter than [`MIN_TOKEN_LEN`].
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// `" word "` patterns, in removal order
    patterns: Vec<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(FRENCH_STOP_WORDS)
    }
}

impl Tokenizer {
    pub fn new<S: AsRef<str>>(stop_words: &[S]) -> Self {
        let patterns = stop_words
            .iter()
            .map(|word| format!(" {} ", word.as_ref()))
            .collect();
        Self { patterns }
    }

    /// No stop words at all
    pub fn without_stop_words() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    pub fn tokenize(&self, bytes: &[u8]) -> Vec<String> {
        self.tokenize_str(&String::from_utf8_lossy(bytes))
    }

    pub fn tokenize_str(&self, text: &str) -> Vec<String> {
        let text = self.strip_stop_words(normalize(text));
        text.split_ascii_whitespace()
            .filter(|token| token.len() >= MIN_TOKEN_LEN)
            .map(str::to_string)
            .collect()
    }

    /// Removes every stop word in list order.
    ///
    /// The text is padded so words touching either end are matched too, and
    /// each pattern is applied until it no longer occurs, which makes
    /// `tokenize` idempotent on its own output.
    fn strip_stop_words(&self, normalized: String) -> String {
        let mut text = format!(" {} ", normalized);
        for pattern in &self.patterns {
            while text.contains(pattern.as_str()) {
                text = text.replace(pattern.as_str(), " ");
            }
        }
        text
    }
}

/// Lowercase, accent-free text where every byte is `a-z` or a space
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(char::is_ascii)
        .map(|c| if c.is_ascii_lowercase() { c } else { ' ' })
        .collect()
}
