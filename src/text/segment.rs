//! Bounded segment splitting
//!
//! The engine hard-limits characters per call, so any sentence over the
//! limit is subdivided at the best available break point. Separators are
//! tried in priority order - clause punctuation first, bare whitespace
//! last - and consecutive parts are greedily packed back together up to
//! the limit, so segments stay as long (and as prosodically intact) as
//! the cap allows.

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::sentence::split_sentences;

/// Separator cascade, highest priority first
static TIERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"[,;]",     // commas and semicolons
        r"\s+-\s+",  // dash surrounded by whitespace
        r":",        // colon
        r"\s+",      // any whitespace, the last resort
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Failed to compile separator regex"))
    .collect()
});

/// Split annotated text into ordered engine-sized segments
///
/// Sentences within the limit pass through whole; longer ones go
/// through the separator cascade.
pub fn segment_text(text: &str, max_length: usize) -> Vec<String> {
    split_sentences(text)
        .iter()
        .flat_map(|sentence| split_sentence(sentence, max_length))
        .collect()
}

/// Split one sentence into ordered segments of at most `max_length`
/// characters
///
/// The cap is best-effort: a run of `max_length`+ characters with no
/// separator at all is emitted verbatim rather than broken mid-word.
pub fn split_sentence(sentence: &str, max_length: usize) -> Vec<String> {
    if sentence.trim().is_empty() {
        return Vec::new();
    }
    if char_len(sentence) <= max_length {
        return vec![sentence.to_string()];
    }
    split_from_tier(sentence, max_length, 0)
}

/// Try each separator tier from `first_tier` on; return the first
/// packing that actually divides the sentence
fn split_from_tier(sentence: &str, max_length: usize, first_tier: usize) -> Vec<String> {
    for tier in first_tier..TIERS.len() {
        let parts: Vec<&str> = TIERS[tier]
            .split(sentence)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() <= 1 {
            continue;
        }

        let last_tier = tier == TIERS.len() - 1;
        let mut segments: Vec<String> = Vec::new();
        let mut current = String::new();

        for part in parts {
            if char_len(part) > max_length {
                flush(&mut segments, &mut current);

                if last_tier {
                    // Whitespace already split this into single words, so
                    // an oversized part is one unbreakable word
                    warn!(
                        "Unbreakable run of {} characters exceeds segment limit {}",
                        char_len(part),
                        max_length
                    );
                    segments.push(part.to_string());
                } else {
                    let sub = split_from_tier(part, max_length, tier + 1);
                    if sub.len() > 1 {
                        segments.extend(sub);
                    } else {
                        warn!(
                            "No break point in part of {} characters (limit {}); emitting over-length segment",
                            char_len(part),
                            max_length
                        );
                        segments.push(part.to_string());
                    }
                }
            } else if current.is_empty() {
                current.push_str(part);
            } else if char_len(&current) + 1 + char_len(part) <= max_length {
                current.push(' ');
                current.push_str(part);
            } else {
                flush(&mut segments, &mut current);
                current.push_str(part);
            }
        }
        flush(&mut segments, &mut current);

        if segments.len() > 1 {
            return segments;
        }
    }

    // No tier divided the sentence; single over-length segment
    warn!(
        "Sentence of {} characters has no usable separator (limit {})",
        char_len(sentence),
        max_length
    );
    vec![sentence.to_string()]
}

fn flush(segments: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        segments.push(std::mem::take(current));
    }
}

/// Lengths are characters, not bytes: Cyrillic is two bytes per letter
/// and the engine limit is in characters
fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_sentence_is_single_segment() {
        let segments = split_sentence("короткое предложение", 150);
        assert_eq!(segments, vec!["короткое предложение"]);
    }

    #[test]
    fn test_exactly_at_limit_is_single_segment() {
        let sentence = "ab ".repeat(16) + "cd"; // 50 chars
        assert_eq!(char_len(&sentence), 50);
        assert_eq!(split_sentence(&sentence, 50), vec![sentence]);
    }

    #[test]
    fn test_splits_on_commas() {
        let sentence = "первая часть очень длинная, вторая часть тоже длинная, третья часть";
        let segments = split_sentence(sentence, 35);
        assert!(segments.len() >= 2);
        for seg in &segments {
            assert!(char_len(seg) <= 35, "segment too long: {:?}", seg);
            assert!(!seg.is_empty());
        }
    }

    #[test]
    fn test_greedy_packing_keeps_parts_together() {
        // Both comma parts fit in one segment, so they stay together
        let segments = split_sentence("раз, два", 20);
        assert_eq!(segments, vec!["раз, два"]);
        // Over the limit they split, and the comma parts are repacked
        let segments = split_sentence("один два три, четыре пять шесть", 20);
        assert_eq!(segments, vec!["один два три", "четыре пять шесть"]);
    }

    #[test]
    fn test_word_sequence_preserved() {
        let sentence =
            "слово один, слово два, слово три - слово четыре: слово пять слово шесть слово семь";
        let segments = split_sentence(sentence, 20);
        let rejoined: Vec<String> = segments
            .join(" ")
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| c == ',' || c == ':' || c == '-').to_string())
            .filter(|w| !w.is_empty())
            .collect();
        let original: Vec<String> = sentence
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| c == ',' || c == ':' || c == '-').to_string())
            .filter(|w| !w.is_empty())
            .collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn test_falls_through_to_whitespace_tier() {
        // No commas, dashes, or colons: words must be packed directly
        let sentence = "слово ".repeat(30);
        let segments = split_sentence(sentence.trim(), 40);
        assert!(segments.len() > 1);
        for seg in &segments {
            assert!(char_len(seg) <= 40);
        }
    }

    #[test]
    fn test_unbreakable_run_emitted_verbatim() {
        let long_word = "а".repeat(60);
        let sentence = format!("короткое слово {} хвост", long_word);
        let segments = split_sentence(&sentence, 30);
        assert!(segments.contains(&long_word));
    }

    #[test]
    fn test_no_separator_at_all() {
        let blob = "б".repeat(200);
        assert_eq!(split_sentence(&blob, 150), vec![blob]);
    }

    #[test]
    fn test_no_empty_segments() {
        let sentence = "а,,б,, ,в".to_string() + &", г".repeat(40);
        for seg in split_sentence(&sentence, 10) {
            assert!(!seg.trim().is_empty());
        }
    }

    #[test]
    fn test_spec_example_comma_laden_sentence() {
        // ~300 characters with commas every ~40, limit 150
        let clause = "здесь ровно сорок символов текста после";
        let sentence = (0..7).map(|_| clause).collect::<Vec<_>>().join(", ");
        assert!(char_len(&sentence) > 280);
        let segments = split_sentence(&sentence, 150);
        assert!(segments.len() >= 2);
        for seg in &segments {
            assert!(char_len(seg) <= 150);
        }
    }

    #[test]
    fn test_segment_text_combines_sentences() {
        let segments = segment_text("Первое предложение. Второе предложение!", 150);
        assert_eq!(segments, vec!["Первое предложение", "Второе предложение"]);
    }

    #[test]
    fn test_segment_text_empty_input() {
        assert!(segment_text("", 150).is_empty());
        assert!(segment_text("\n\n...\n", 150).is_empty());
    }
}
