//! Transcript matching
//!
//! Decides whether a live recognition transcript contains the word for the
//! active prompt. The transcript is cumulative and updated arbitrarily often
//! by the recognition engine, including partial interim results; matching is
//! plain normalized substring containment, so any superstring counts the
//! moment it appears. Deliberately tolerant of false positives in exchange
//! for responsiveness on the beat.

/// Normalize text for matching: trimmed and lowercased
#[must_use]
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Whether the transcript contains the target word, case-insensitively
#[must_use]
pub fn contains_word(transcript: &str, word: &str) -> bool {
    let word = normalize(word);
    if word.is_empty() {
        return false;
    }
    normalize(transcript).contains(&word)
}
