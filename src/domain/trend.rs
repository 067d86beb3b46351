/// A term and how often it appeared across one batch of item titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendEntry {
    pub term: String,
    pub count: usize,
}

impl TrendEntry {
    pub fn new(term: impl Into<String>, count: usize) -> Self {
        Self {
            term: term.into(),
            count,
        }
    }
}
