use crate::models::Record;
use std::collections::HashSet;

/// Tracks which user ids have already been persisted in the current run
///
/// The set only grows; nothing is carried over between runs.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the record's id, returning `false` if it was already seen
    #[inline]
    pub fn admit(&mut self, record: &Record) -> bool {
        if self.seen.contains(&record.user_id) {
            return false;
        }
        self.seen.insert(record.user_id.clone())
    }

    /// Undo an admission whose persist call failed
    pub fn release(&mut self, user_id: &str) -> bool {
        self.seen.remove(user_id)
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.seen.contains(user_id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> Record {
        Record {
            user_id: id.to_string(),
            name: String::new(),
            age: None,
            bio: String::new(),
            birth_date: String::new(),
            photo_count: 0,
            photo_urls: vec![],
        }
    }

    #[test]
    fn test_first_admission_wins() {
        let mut dedup = Deduplicator::new();
        assert!(dedup.admit(&record("a")));
        assert!(!dedup.admit(&record("a")));
        assert!(dedup.admit(&record("b")));
        assert_eq!(dedup.len(), 2);
    }

    #[test]
    fn test_release_allows_readmission() {
        let mut dedup = Deduplicator::new();
        assert!(dedup.admit(&record("a")));
        assert!(dedup.release("a"));
        assert!(!dedup.contains("a"));
        assert!(dedup.admit(&record("a")));
    }

    #[test]
    fn test_distinct_count_matches_admissions() {
        let mut dedup = Deduplicator::new();
        let ids = ["a", "b", "a", "c", "b", "a", "d"];
        let admitted = ids.iter().filter(|id| dedup.admit(&record(id))).count();
        assert_eq!(admitted, 4);
        assert_eq!(dedup.len(), 4);
    }
}
