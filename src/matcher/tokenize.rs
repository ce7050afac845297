use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EDGE_PUNCT: Regex = Regex::new(r"^\p{P}+|\p{P}+$").unwrap();
}

/// Splits a sentence into words: whitespace-separated tokens with leading and
/// trailing punctuation stripped. Interior punctuation survives, so `18,94`
/// and `теле-шоу` stay intact. Tokens that are all punctuation are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter_map(|token| {
            let trimmed = EDGE_PUNCT.replace_all(token, "");
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.into_owned())
            }
        })
        .collect()
}
