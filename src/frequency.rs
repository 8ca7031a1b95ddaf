// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Word frequency tracking across extracted prompts
//!
//! Counts are keyed by the lowercased token, so `Cat` and `cat` accumulate
//! into one entry. Ties in the top-K ranking keep first-seen order.

use std::collections::{HashMap, HashSet};

/// Common English words excluded from counting
const BUILTIN_STOP_WORDS: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on",
    "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we",
    "say", "her", "she", "or", "an", "will", "my", "one", "all", "would", "there", "their",
    "what", "so", "up", "out", "if", "about", "who", "get", "which", "go", "me", "when",
    "make", "can", "like", "time", "no", "just", "him", "know", "take", "person", "into",
    "year", "your", "good", "some", "could", "them", "see", "other", "than", "then", "now",
    "look", "only", "come", "its", "over", "think", "also", "back", "after", "use", "two",
    "how", "our", "work", "first", "well", "way", "even", "new", "want", "because", "any",
    "these", "give", "day", "most", "us", "is", "are", "was", "were",
];

/// Case-insensitive stop-word set
#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// The built-in list
    pub fn builtin() -> Self {
        Self {
            words: BUILTIN_STOP_WORDS.iter().map(|w| (*w).to_string()).collect(),
        }
    }

    /// Built-in list plus extra words from configuration
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stop_words = Self::builtin();
        stop_words
            .words
            .extend(extra.into_iter().map(|w| w.as_ref().to_lowercase()));
        stop_words
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Split text on whitespace, dropping stop-words and tokens shorter than `minimum` characters
pub fn tokenize<'a>(
    text: &'a str,
    stop_words: &'a StopWords,
    minimum: usize,
) -> impl Iterator<Item = &'a str> + 'a {
    text.split_whitespace()
        .filter(move |word| word.chars().count() >= minimum && !stop_words.contains(word))
}

/// A single ranked entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

/// Ranked words, highest count first
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopKSnapshot {
    entries: Vec<WordCount>,
}

impl TopKSnapshot {
    pub fn entries(&self) -> &[WordCount] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &WordCount> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct Tally {
    count: u64,
    first_seen: usize,
}

/// Accumulates per-word counts for the lifetime of one run
#[derive(Debug, Default)]
pub struct WordFrequencyTracker {
    counts: HashMap<String, Tally>,
    total_recorded: u64,
    last_published: Option<TopKSnapshot>,
}

impl WordFrequencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `word`
    pub fn record(&mut self, word: &str) {
        let next_index = self.counts.len();
        let tally = self
            .counts
            .entry(word.to_lowercase())
            .or_insert(Tally { count: 0, first_seen: next_index });
        tally.count = tally.count.saturating_add(1);
        self.total_recorded = self.total_recorded.saturating_add(1);
    }

    /// Current count for `word` (case-insensitive)
    pub fn count(&self, word: &str) -> u64 {
        self.counts.get(&word.to_lowercase()).map_or(0, |t| t.count)
    }

    /// The `k` most frequent words. Pure read.
    pub fn top_k(&self, k: usize) -> TopKSnapshot {
        let mut ranked: Vec<(&String, &Tally)> = self.counts.iter().collect();
        ranked.sort_by(|a, b| {
            b.1.count
                .cmp(&a.1.count)
                .then_with(|| a.1.first_seen.cmp(&b.1.first_seen))
        });

        TopKSnapshot {
            entries: ranked
                .into_iter()
                .take(k)
                .map(|(word, tally)| WordCount {
                    word: word.clone(),
                    count: tally.count,
                })
                .collect(),
        }
    }

    /// Returns the top-K only when it differs from the last one returned here.
    ///
    /// Display code calls this after every file and redraws on `Some`.
    pub fn refresh(&mut self, k: usize) -> Option<TopKSnapshot> {
        let snapshot = self.top_k(k);
        if self.last_published.as_ref() == Some(&snapshot) {
            return None;
        }
        self.last_published = Some(snapshot.clone());
        Some(snapshot)
    }

    pub fn distinct_words(&self) -> usize {
        self.counts.len()
    }

    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_text(tracker: &mut WordFrequencyTracker, text: &str, minimum: usize) {
        let stop_words = StopWords::builtin();
        for word in tokenize(text, &stop_words, minimum) {
            tracker.record(word);
        }
    }

    fn pairs(snapshot: &TopKSnapshot) -> Vec<(&str, u64)> {
        snapshot.iter().map(|w| (w.word.as_str(), w.count)).collect()
    }

    #[test]
    fn test_counts_each_occurrence_once() {
        let mut tracker = WordFrequencyTracker::new();
        record_text(&mut tracker, "cat dog cat", 0);
        record_text(&mut tracker, "dog dog", 0);

        assert_eq!(tracker.count("cat"), 2);
        assert_eq!(tracker.count("dog"), 3);
        assert_eq!(tracker.total_recorded(), 5);
        assert_eq!(pairs(&tracker.top_k(1)), vec![("dog", 3)]);
    }

    #[test]
    fn test_stop_words_are_case_insensitive() {
        let stop_words = StopWords::builtin();
        let words: Vec<&str> = tokenize("The cat and I WERE here", &stop_words, 0).collect();
        assert_eq!(words, vec!["cat", "here"]);
    }

    #[test]
    fn test_minimum_length_filters_short_tokens() {
        let stop_words = StopWords::builtin();
        let words: Vec<&str> = tokenize("ox cat zebra", &stop_words, 3).collect();
        assert_eq!(words, vec!["cat", "zebra"]);
    }

    #[test]
    fn test_minimum_counts_characters_not_bytes() {
        let stop_words = StopWords::builtin();
        let words: Vec<&str> = tokenize("été ab", &stop_words, 3).collect();
        assert_eq!(words, vec!["été"]);
    }

    #[test]
    fn test_extra_stop_words() {
        let stop_words = StopWords::with_extra(["Masterpiece"]);
        assert!(stop_words.contains("masterpiece"));
        assert!(stop_words.contains("the"));
        let words: Vec<&str> = tokenize("masterpiece portrait", &stop_words, 0).collect();
        assert_eq!(words, vec!["portrait"]);
    }

    #[test]
    fn test_keys_are_case_normalized() {
        let mut tracker = WordFrequencyTracker::new();
        tracker.record("Cat");
        tracker.record("cat");
        tracker.record("CAT");
        assert_eq!(tracker.distinct_words(), 1);
        assert_eq!(pairs(&tracker.top_k(5)), vec![("cat", 3)]);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let mut tracker = WordFrequencyTracker::new();
        for word in ["zebra", "apple", "mango", "apple", "zebra", "mango"] {
            tracker.record(word);
        }
        assert_eq!(
            pairs(&tracker.top_k(3)),
            vec![("zebra", 2), ("apple", 2), ("mango", 2)]
        );
    }

    #[test]
    fn test_top_k_is_bounded_and_pure() {
        let mut tracker = WordFrequencyTracker::new();
        assert!(tracker.top_k(3).is_empty());

        record_text(&mut tracker, "red green blue red", 0);
        let first = tracker.top_k(10);
        let second = tracker.top_k(10);
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert_eq!(tracker.top_k(2).len(), 2);
        assert!(tracker.top_k(0).is_empty());

        let counts: Vec<u64> = first.iter().map(|w| w.count).collect();
        let mut sorted = counts.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(counts, sorted);
    }

    #[test]
    fn test_refresh_only_reports_changes() {
        let mut tracker = WordFrequencyTracker::new();
        tracker.record("sky");
        assert!(tracker.refresh(2).is_some());
        assert!(tracker.refresh(2).is_none());

        // A word outside the visible window changes nothing
        tracker.record("sea");
        tracker.record("sun");
        assert!(tracker.refresh(1).is_none());

        tracker.record("sun");
        tracker.record("sun");
        let snapshot = tracker.refresh(1).unwrap();
        assert_eq!(pairs(&snapshot), vec![("sun", 3)]);
    }
}
