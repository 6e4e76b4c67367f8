use std::collections::VecDeque;

pub const HISTORY_LIMIT: usize = 5;

/// Most recent submitted queries, newest first. Display only.
#[derive(Debug, Clone, Default)]
pub struct QueryHistory {
    entries: VecDeque<String>,
}

impl QueryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, query: impl Into<String>) {
        self.entries.push_front(query.into());
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_last_five_newest_first() {
        let mut history = QueryHistory::new();
        for i in 0..7 {
            history.record(format!("q{i}"));
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.iter().collect::<Vec<_>>(), vec!["q6", "q5", "q4", "q3", "q2"]);
    }

    #[test]
    fn test_repeats_are_kept() {
        let mut history = QueryHistory::new();
        history.record("sales by region");
        history.record("sales by region");
        assert_eq!(history.len(), 2);
    }
}
