//! Sentence segmentation
//!
//! Splits annotated text into sentence-like units on terminal
//! punctuation and line breaks. The engine is fed one sentence at a
//! time (further split if over the length limit), which keeps its
//! prosody model from running across sentence boundaries.

use once_cell::sync::Lazy;
use regex::Regex;

/// Consecutive delimiters collapse into a single boundary
static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?\n]+").expect("Failed to compile boundary regex"));

/// Split text into trimmed, non-empty sentences in input order
pub fn split_sentences(text: &str) -> Vec<String> {
    SENTENCE_BOUNDARY
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_terminal_punctuation() {
        let sentences = split_sentences("Привет. Как дела? Отлично!");
        assert_eq!(sentences, vec!["Привет", "Как дела", "Отлично"]);
    }

    #[test]
    fn test_consecutive_delimiters_collapse() {
        let sentences = split_sentences("Стой... Кто идёт?!");
        assert_eq!(sentences, vec!["Стой", "Кто идёт"]);
    }

    #[test]
    fn test_line_breaks_are_boundaries() {
        let sentences = split_sentences("первая строка\nвторая строка");
        assert_eq!(sentences, vec!["первая строка", "вторая строка"]);
    }

    #[test]
    fn test_whitespace_only_discarded() {
        let sentences = split_sentences("Раз.   \n  . Два.");
        assert_eq!(sentences, vec!["Раз", "Два"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("...").is_empty());
    }
}
