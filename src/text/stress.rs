//! Inline stress marker resolution
//!
//! The synthesis engine has no notion of lexical stress, but it does
//! pronounce a vowel carrying a combining acute accent as stressed.
//! This module rewrites user markers into that form:
//! - `+` strengthens: `зам+ок` -> `замо́к`, `+замок` -> `за́мок`
//! - `-` weakens: the marked vowel is replaced with its reduced
//!   counterpart (`о` -> `а`, `е`/`я`/`э` -> `и`)
//!
//! Resolution runs as an explicit state scan over the token characters
//! rather than chained regex substitution, so each step is auditable.

use log::{debug, warn};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Combining acute accent, placed after a vowel to mark stress
pub const ACUTE: char = '\u{0301}';

/// Accented counterparts of the nine stressable vowels, both cases.
/// `ё` is excluded: it is inherently stressed.
static ACCENTED: Lazy<HashMap<char, String>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for v in ['а', 'е', 'и', 'о', 'у', 'ы', 'э', 'ю', 'я'] {
        m.insert(v, format!("{}{}", v, ACUTE));
        for upper in v.to_uppercase() {
            m.insert(upper, format!("{}{}", upper, ACUTE));
        }
    }
    m
});

/// Reduced-vowel substitutes for de-emphasized syllables.
/// Standard Russian reduction: unstressed о sounds like а,
/// unstressed е/я/э like и.
static REDUCED: Lazy<HashMap<char, String>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for (v, r) in [('о', 'а'), ('е', 'и'), ('я', 'и'), ('э', 'и')] {
        m.insert(v, r.to_string());
        for (upper_v, upper_r) in v.to_uppercase().zip(r.to_uppercase()) {
            m.insert(upper_v, upper_r.to_string());
        }
    }
    m
});

/// Pre-vetted stressed spellings of words whose stress the engine
/// reliably gets wrong. Whole-word, case-insensitive; always wins over
/// marker resolution. Genuinely ambiguous words (за́мок/замо́к) are
/// deliberately absent - those need a marker.
static EXCEPTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("творог", "творо\u{301}г");
    m.insert("звонит", "звони\u{301}т");
    m.insert("звонишь", "звони\u{301}шь");
    m.insert("договор", "догово\u{301}р");
    m.insert("каталог", "катало\u{301}г");
    m.insert("красивее", "краси\u{301}вее");
    m.insert("щавель", "щаве\u{301}ль");
    m.insert("торты", "то\u{301}рты");
    m.insert("банты", "ба\u{301}нты");
    m.insert("обеспечение", "обеспе\u{301}чение");
    m
});

/// Which marker a resolution pass consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressMarker {
    Strengthen,
    Weaken,
}

impl StressMarker {
    fn glyph(self) -> char {
        match self {
            StressMarker::Strengthen => '+',
            StressMarker::Weaken => '-',
        }
    }
}

/// State of the per-token resolution scan
enum ScanState {
    /// Looking for the leftmost unconsumed marker
    ScanningForMarker,
    /// Marker found at `marker`; locating the vowel it applies to
    ResolvingVowel { marker: usize },
    /// Vowel located; rewriting the token
    Substituting { marker: usize, vowel: usize },
}

/// Rewrites inline stress markers into their canonical surface form
///
/// Pure function of the input text plus the immutable tables it was
/// built with; never fails - unresolvable markers are stripped and
/// logged.
pub struct StressAnnotator {
    accented: HashMap<char, String>,
    reduced: HashMap<char, String>,
    exceptions: HashMap<String, String>,
}

impl StressAnnotator {
    /// Create an annotator with the built-in tables and exception words
    pub fn new() -> Self {
        Self::with_exceptions(HashMap::new())
    }

    /// Create an annotator with extra exception words layered over the
    /// built-in set (user entries win on collision)
    pub fn with_exceptions(user_exceptions: HashMap<String, String>) -> Self {
        let mut exceptions: HashMap<String, String> = EXCEPTIONS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        exceptions.extend(user_exceptions);

        Self {
            accented: ACCENTED.clone(),
            reduced: REDUCED.clone(),
            exceptions,
        }
    }

    /// Resolve all markers and exception words in `text`
    ///
    /// Exception substitution runs first so it wins over marker
    /// resolution for the same word, then the strengthen pass, then the
    /// independent weaken pass. Markup normalization (emphasis tags,
    /// pauses) is a separate step, see [`crate::text::markup`].
    pub fn annotate(&self, text: &str) -> String {
        let text = self.apply_exceptions(text);
        let text = self.resolve_pass(&text, StressMarker::Strengthen);
        self.resolve_pass(&text, StressMarker::Weaken)
    }

    /// Replace known-ambiguous whole words with their vetted spelling
    ///
    /// Matching ignores case and any markers inside the word, so
    /// `Твор+ог` still hits the `творог` entry.
    fn apply_exceptions(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        for piece in split_runs(text, |c| {
            is_cyrillic(c) || c == '+' || c == '-' || c == ACUTE
        }) {
            match piece {
                Run::Token(token) => {
                    let bare: String = token
                        .chars()
                        .filter(|&c| c != '+' && c != '-')
                        .flat_map(|c| c.to_lowercase())
                        .collect();
                    match self.exceptions.get(&bare) {
                        Some(replacement) => {
                            debug!("Exception word: {} -> {}", token, replacement);
                            result.push_str(replacement);
                        }
                        None => result.push_str(token),
                    }
                }
                Run::Other(other) => result.push_str(other),
            }
        }
        result
    }

    /// One full pass over the text for a single marker type
    fn resolve_pass(&self, text: &str, marker: StressMarker) -> String {
        let glyph = marker.glyph();
        let table = match marker {
            StressMarker::Strengthen => &self.accented,
            StressMarker::Weaken => &self.reduced,
        };

        let mut result = String::with_capacity(text.len());
        for piece in split_runs(text, |c| is_cyrillic(c) || c == glyph || c == ACUTE) {
            match piece {
                Run::Token(token) => {
                    if qualifies(token, marker) {
                        result.push_str(&self.resolve_token(token, glyph, table));
                    } else {
                        result.push_str(token);
                    }
                }
                Run::Other(other) => result.push_str(other),
            }
        }
        result
    }

    /// Resolve every marker in one token, left to right
    ///
    /// Each marker is resolved against the token state left by prior
    /// substitutions. Unresolvable markers are stripped.
    fn resolve_token(&self, token: &str, glyph: char, table: &HashMap<char, String>) -> String {
        let mut chars: Vec<char> = token.chars().collect();
        let mut state = ScanState::ScanningForMarker;

        loop {
            state = match state {
                ScanState::ScanningForMarker => {
                    match chars.iter().position(|&c| c == glyph) {
                        Some(pos) => ScanState::ResolvingVowel { marker: pos },
                        None => break,
                    }
                }
                ScanState::ResolvingVowel { marker } => {
                    // The stressed letter sits right after the marker when
                    // there is one, otherwise right before it.
                    let candidate = if marker + 1 < chars.len() {
                        marker + 1
                    } else {
                        // marker == 0 with nothing following cannot occur:
                        // qualifying tokens contain at least one letter
                        marker - 1
                    };
                    match nearest_vowel(&chars, candidate, table) {
                        Some(vowel) => ScanState::Substituting { marker, vowel },
                        None => {
                            warn!(
                                "No stressable vowel for marker in token {:?}; marker dropped",
                                token
                            );
                            chars.remove(marker);
                            ScanState::ScanningForMarker
                        }
                    }
                }
                ScanState::Substituting { marker, vowel } => {
                    chars.remove(marker);
                    let vowel = if vowel > marker { vowel - 1 } else { vowel };

                    // Never double-mark an already accented vowel
                    if chars.get(vowel + 1) == Some(&ACUTE) {
                        debug!("Vowel already stressed in {:?}; marker dropped", token);
                    } else if let Some(replacement) = table.get(&chars[vowel]) {
                        chars.splice(vowel..=vowel, replacement.chars());
                    }
                    ScanState::ScanningForMarker
                }
            };
        }

        chars.into_iter().collect()
    }
}

impl Default for StressAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

/// A qualifying token carries letters plus the expected marker count:
/// at least one `+` for strengthening, exactly one `-` for weakening
/// (more hyphens means a multi-part compound, left alone).
fn qualifies(token: &str, marker: StressMarker) -> bool {
    if !token.chars().any(is_cyrillic) {
        return false;
    }
    let count = token.chars().filter(|&c| c == marker.glyph()).count();
    match marker {
        StressMarker::Strengthen => count >= 1,
        StressMarker::Weaken => count == 1,
    }
}

/// Find the vowel a marker resolves to, starting from `candidate`
///
/// Scan order is fixed and behavior-visible: the candidate itself, then
/// toward the start of the token, then toward the end.
fn nearest_vowel(
    chars: &[char],
    candidate: usize,
    table: &HashMap<char, String>,
) -> Option<usize> {
    for i in (0..=candidate).rev() {
        if table.contains_key(&chars[i]) {
            return Some(i);
        }
    }
    for i in candidate + 1..chars.len() {
        if table.contains_key(&chars[i]) {
            return Some(i);
        }
    }
    None
}

fn is_cyrillic(c: char) -> bool {
    ('\u{0400}'..='\u{04FF}').contains(&c)
}

/// A maximal run of token characters, or the text between runs
enum Run<'a> {
    Token(&'a str),
    Other(&'a str),
}

/// Split text into maximal runs matching `pred` and the gaps between them
fn split_runs<'a>(text: &'a str, pred: impl Fn(char) -> bool) -> Vec<Run<'a>> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut in_token = None;

    for (idx, c) in text.char_indices() {
        let token_char = pred(c);
        match in_token {
            None => in_token = Some(token_char),
            Some(t) if t != token_char => {
                runs.push(if t {
                    Run::Token(&text[start..idx])
                } else {
                    Run::Other(&text[start..idx])
                });
                start = idx;
                in_token = Some(token_char);
            }
            _ => {}
        }
    }
    if start < text.len() {
        runs.push(match in_token {
            Some(true) => Run::Token(&text[start..]),
            _ => Run::Other(&text[start..]),
        });
    }
    runs
}
