use once_cell::sync::Lazy;
use regex::Regex;

/// Fallback length when no sentence-shaped span is found.
const MAX_FALLBACK_CHARS: usize = 220;

static LABEL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(reason|explanation)\s*[:\-]\s*").expect("valid regex"));
static OPENING_BRACKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\[\{]\s*").expect("valid regex"));
static CLOSING_BRACKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\]\}]\s*$").expect("valid regex"));
static REASON_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)"reason"\s*:\s*"#).expect("valid regex"));
static BACKTICKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"`{1,3}").expect("valid regex"));
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-*•]\s*").expect("valid regex"));
static FIRST_SENTENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^.!?]{6,250}[.!?])").expect("valid regex"));

/// Reduce raw model output to a single clean sentence.
///
/// Strips `Reason:`-style labels, JSON braces and keys, quotes, code fences and bullets, keeps
/// the first sentence-shaped span, and guarantees terminal punctuation. Returns an empty string
/// when nothing is left.
pub fn clean_reason_text(raw: &str) -> String {
    let text = raw.trim();
    if text.is_empty() {
        return String::new();
    }

    let text = LABEL_PREFIX.replace(text, "");
    let text = OPENING_BRACKET.replace(&text, "");
    let text = CLOSING_BRACKET.replace(&text, "");
    let text = REASON_KEY.replace_all(&text, "");
    let text = text
        .trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .to_string();

    let text = BACKTICKS.replace_all(&text, "");
    let text = BULLET.replace(&text, "");

    let mut sentence = match FIRST_SENTENCE.captures(&text) {
        Some(caps) => caps[1].trim().to_string(),
        None => text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .take(MAX_FALLBACK_CHARS)
            .collect(),
    };

    if let Some(last) = sentence.chars().last() {
        if !matches!(last, '.' | '!' | '?') {
            sentence.push('.');
        }
    }

    sentence
}
