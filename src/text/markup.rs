//! Emphasis and pause markup normalization
//!
//! The engine understands only one emphasis level (`*word*`) and reads
//! `...` as a pause. Everything richer the user may paste in - SSML-ish
//! tags, double-star or underscore emphasis, long ellipsis runs - is
//! folded down to those two forms.

use once_cell::sync::Lazy;
use regex::Regex;

static EMPHASIS_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<emphasis>(.*?)</emphasis>").expect("Failed to compile emphasis regex")
});

/// Pause duration is discarded: the engine cannot honor it
static BREAK_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<break\s+time="\d+ms"\s*/>"#).expect("Failed to compile break regex")
});

static STAR_EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("Failed to compile star regex"));

static UNDERSCORE_EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__([^_]+)__").expect("Failed to compile underscore regex"));

static LONG_ELLIPSIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.{3,}").expect("Failed to compile ellipsis regex"));

/// Normalize emphasis and pause markup to the engine's canonical forms
///
/// Order-independent with respect to the stress passes; ellipsis
/// collapse runs last so a pause tag next to trailing periods still
/// ends up as exactly `...`.
pub fn normalize(text: &str) -> String {
    let text = EMPHASIS_TAG.replace_all(text, "*$1*");
    let text = BREAK_TAG.replace_all(&text, "...");
    let text = STAR_EMPHASIS.replace_all(&text, "*$1*");
    let text = UNDERSCORE_EMPHASIS.replace_all(&text, "*$1*");
    LONG_ELLIPSIS.replace_all(&text, "...").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emphasis_tag() {
        assert_eq!(normalize("скажи <emphasis>громко</emphasis>!"), "скажи *громко*!");
    }

    #[test]
    fn test_break_tag_discards_duration() {
        assert_eq!(normalize(r#"пауза <break time="500ms"/> тут"#), "пауза ... тут");
        assert_eq!(normalize(r#"пауза <break time="1000ms" /> тут"#), "пауза ... тут");
    }

    #[test]
    fn test_double_star_and_underscore() {
        assert_eq!(normalize("это **важно** и __срочно__"), "это *важно* и *срочно*");
    }

    #[test]
    fn test_single_star_kept() {
        assert_eq!(normalize("уже *помечено*"), "уже *помечено*");
    }

    #[test]
    fn test_ellipsis_collapse() {
        assert_eq!(normalize("ну....... ладно"), "ну... ладно");
        assert_eq!(normalize("три... точки"), "три... точки");
    }

    #[test]
    fn test_break_adjacent_to_period_collapses() {
        assert_eq!(normalize(r#"конец.<break time="200ms"/>"#), "конец...");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(normalize("обычный текст"), "обычный текст");
    }
}
