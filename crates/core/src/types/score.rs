//! Score entries and the capped per-user score history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of recent scores kept per user.
pub const SCORE_HISTORY_CAP: usize = 5;

/// A single finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Points reported by the game engine.
    pub score: u32,
    /// When the game finished.
    pub timestamp: DateTime<Utc>,
}

impl ScoreEntry {
    #[must_use]
    pub const fn new(score: u32, timestamp: DateTime<Utc>) -> Self {
        Self { score, timestamp }
    }
}

/// The most recent scores of a user, oldest first.
///
/// Never holds more than [`SCORE_HISTORY_CAP`] entries; pushing onto a full
/// history evicts the oldest entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ScoreEntry>", into = "Vec<ScoreEntry>")]
pub struct ScoreHistory {
    entries: VecDeque<ScoreEntry>,
}

impl ScoreHistory {
    /// An empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A full history of zero scores, the starting point for new users.
    #[must_use]
    pub fn seeded(at: DateTime<Utc>) -> Self {
        Self {
            entries: std::iter::repeat_n(ScoreEntry::new(0, at), SCORE_HISTORY_CAP).collect(),
        }
    }

    /// Append a score, returning the evicted entry if the history was full.
    pub fn push(&mut self, entry: ScoreEntry) -> Option<ScoreEntry> {
        let evicted = if self.entries.len() >= SCORE_HISTORY_CAP {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ScoreEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// The most recent entry.
    #[must_use]
    pub fn latest(&self) -> Option<&ScoreEntry> {
        self.entries.back()
    }

    /// Highest score currently in the history.
    #[must_use]
    pub fn best(&self) -> Option<u32> {
        self.entries.iter().map(|entry| entry.score).max()
    }
}

impl From<Vec<ScoreEntry>> for ScoreHistory {
    /// Builds a history from entries ordered oldest first, keeping only the
    /// newest [`SCORE_HISTORY_CAP`].
    fn from(entries: Vec<ScoreEntry>) -> Self {
        let mut history = Self::new();
        for entry in entries {
            history.push(entry);
        }
        history
    }
}

impl From<ScoreHistory> for Vec<ScoreEntry> {
    fn from(history: ScoreHistory) -> Self {
        history.entries.into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, second).unwrap()
    }

    #[test]
    fn test_seeded_history_is_full_of_zeros() {
        let history = ScoreHistory::seeded(at(0));
        assert_eq!(history.len(), SCORE_HISTORY_CAP);
        assert!(history.iter().all(|entry| entry.score == 0));
        assert_eq!(history.best(), Some(0));
    }

    #[test]
    fn test_push_evicts_oldest_when_full() {
        let mut history = ScoreHistory::new();
        for n in 0..5 {
            assert_eq!(history.push(ScoreEntry::new(n, at(n))), None);
        }

        let evicted = history.push(ScoreEntry::new(900, at(10)));
        assert_eq!(evicted, Some(ScoreEntry::new(0, at(0))));
        assert_eq!(history.len(), SCORE_HISTORY_CAP);

        let scores: Vec<u32> = history.iter().map(|entry| entry.score).collect();
        assert_eq!(scores, vec![1, 2, 3, 4, 900]);
        assert_eq!(history.latest().map(|e| e.score), Some(900));
    }

    #[test]
    fn test_length_never_exceeds_cap() {
        let mut history = ScoreHistory::seeded(at(0));
        for n in 0..50 {
            history.push(ScoreEntry::new(n, at(n % 60)));
            assert!(history.len() <= SCORE_HISTORY_CAP);
        }
        assert_eq!(history.best(), Some(49));
    }

    #[test]
    fn test_iter_walks_both_ends() {
        let history = ScoreHistory::from(vec![
            ScoreEntry::new(10, at(1)),
            ScoreEntry::new(20, at(2)),
            ScoreEntry::new(30, at(3)),
        ]);
        let newest_first: Vec<u32> = history.iter().rev().map(|entry| entry.score).collect();
        assert_eq!(newest_first, vec![30, 20, 10]);
        assert_eq!(history.iter().len(), 3);
    }

    #[test]
    fn test_from_vec_keeps_newest() {
        let entries: Vec<ScoreEntry> = (0..8).map(|n| ScoreEntry::new(n, at(n))).collect();
        let history = ScoreHistory::from(entries);
        let scores: Vec<u32> = history.iter().map(|entry| entry.score).collect();
        assert_eq!(scores, vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_serializes_as_list() {
        let mut history = ScoreHistory::new();
        history.push(ScoreEntry::new(120, at(1)));
        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(1));
        assert_eq!(json[0]["score"], 120);

        let back: ScoreHistory = serde_json::from_value(json).unwrap();
        assert_eq!(back, history);
    }
}
