use std::collections::HashMap;

use crate::domain::{Item, TrendEntry};
use crate::normalizer::normalize;

pub const DEFAULT_TOP_K: usize = 5;

/// Count normalized title tokens across `items` and return the `top_k` most
/// frequent, highest first. Equal counts keep first-seen order.
pub fn extract_trends(items: &[Item], top_k: usize) -> Vec<TrendEntry> {
    let mut counts: Vec<TrendEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for token in items.iter().flat_map(|item| normalize(&item.title)) {
        match index.get(&token) {
            Some(&pos) => counts[pos].count += 1,
            None => {
                index.insert(token.clone(), counts.len());
                counts.push(TrendEntry::new(token, 1));
            }
        }
    }

    // stable: ties stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(top_k);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn items(titles: &[&str]) -> Vec<Item> {
        titles
            .iter()
            .map(|t| Item::new(*t, 0, "https://example.com", "memes", Utc::now()))
            .collect()
    }

    #[test]
    fn test_counts_and_order() {
        let trends = extract_trends(&items(&["cat dog", "cat bird", "dog dog"]), 2);
        assert_eq!(
            trends,
            vec![TrendEntry::new("dog", 3), TrendEntry::new("cat", 2)]
        );
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let trends = extract_trends(&items(&["zebra apple", "mango"]), 5);
        let terms: Vec<&str> = trends.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(terms, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_fewer_terms_than_top_k() {
        let trends = extract_trends(&items(&["Just one title!"]), 5);
        assert_eq!(
            trends,
            vec![TrendEntry::new("one", 1), TrendEntry::new("title", 1)]
        );
    }

    #[test]
    fn test_empty_items() {
        assert!(extract_trends(&[], DEFAULT_TOP_K).is_empty());
    }

    #[test]
    fn test_titles_are_normalized() {
        let trends = extract_trends(&items(&["The CAT!", "the cat?", "a Cat"]), 5);
        assert_eq!(trends, vec![TrendEntry::new("cat", 3)]);
    }
}
