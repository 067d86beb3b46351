//! Score ranking and keyword selection over fetched items.

use crate::domain::Item;

/// The `n` highest-scoring items. Equal scores keep their fetch order.
pub fn top_by_score(items: &[Item], n: usize) -> Vec<Item> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| b.score.cmp(&a.score));
    sorted.truncate(n);
    sorted
}

/// Split a comma-separated keyword string, trimming each piece.
///
/// Empty pieces (from `"cat,"` or `", ,"`) are discarded: an empty keyword
/// would match every title.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Whether any keyword occurs in `title`, case-insensitively, as a substring.
pub fn matches_any(title: &str, keywords: &[String]) -> bool {
    let title = title.to_lowercase();
    keywords
        .iter()
        .any(|keyword| title.contains(&keyword.to_lowercase()))
}

/// Items whose title contains at least one keyword. Substring semantics:
/// "cat" matches "Catastrophe".
pub fn filter_by_keywords(items: &[Item], keywords: &[String]) -> Vec<Item> {
    items
        .iter()
        .filter(|item| matches_any(&item.title, keywords))
        .cloned()
        .collect()
}
