//! Title normalization: lowercase, strip ASCII punctuation, split on
//! whitespace, drop English stopwords.

mod stopwords;

pub use stopwords::is_stopword;

/// Normalize `text` into content tokens. Empty input yields no tokens.
pub fn normalize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|word| !is_stopword(word))
        .map(str::to_owned)
        .collect()
}

/// Normalized tokens joined back with single spaces.
pub fn normalize_join(text: &str) -> String {
    normalize(text).join(" ")
}
