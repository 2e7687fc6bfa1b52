//! Small text helpers shared by the site parsers, the normalizer and the
//! option catalogs.

use regex::Regex;
use std::sync::OnceLock;

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Trims, replaces non-breaking spaces and collapses runs of whitespace.
pub fn clean_text(raw: &str) -> String {
    let replaced = raw.replace('\u{a0}', " ");
    whitespace_re()
        .replace_all(replaced.trim(), " ")
        .into_owned()
}

/// `clean_text`, but `None` when nothing is left.
pub fn non_blank(raw: &str) -> Option<String> {
    let cleaned = clean_text(raw);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn sorted_tokens(value: &str) -> String {
    let lowered = value.to_lowercase();
    let mut tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Similarity of two strings on a 0..=100 scale, insensitive to case,
/// punctuation and word order.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let left = sorted_tokens(a);
    let right = sorted_tokens(b);
    if left.is_empty() && right.is_empty() {
        return 100;
    }
    (strsim::normalized_levenshtein(&left, &right) * 100.0).round() as u8
}

/// Best match from `vocabulary` scoring strictly above `threshold`.
/// Ties keep the earliest candidate.
pub fn most_similar<'a, I>(word: &str, vocabulary: I, threshold: u8) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, u8)> = None;
    for candidate in vocabulary {
        let score = token_sort_ratio(word, candidate);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((candidate, score));
        }
    }
    best.filter(|(_, score)| *score > threshold)
        .map(|(candidate, _)| candidate)
}
