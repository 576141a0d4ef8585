/// Sentence-terminal punctuation, Latin and CJK.
const TERMINATORS: &[char] = &['.', '!', '?', '。', '！', '？'];

/// Fragments at or below this many characters are noise, not sentences.
const MIN_SENTENCE_CHARS: usize = 15;

/// Only the first sentences of an article are analyzed.
const MAX_SENTENCES: usize = 20;

/// Split raw text into candidate sentences. Fragments of 15 characters or
/// fewer are dropped and at most the first 20 sentences are returned.
/// Empty input yields an empty list.
pub fn segment(text: &str) -> Vec<String> {
    text.split(TERMINATORS)
        .map(str::trim)
        .filter(|fragment| fragment.chars().count() > MIN_SENTENCE_CHARS)
        .take(MAX_SENTENCES)
        .map(str::to_string)
        .collect()
}
