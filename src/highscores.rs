//! High score leaderboard system
//!
//! Tracks the top 10 finished matches along with their run statistics.
//! Storage lives behind [`crate::persistence::Persistence`].

use serde::{Deserialize, Serialize};

use crate::sim::{GameMode, GameState, PlayerSlot};

/// Leaderboard length
pub const MAX_HIGH_SCORES: usize = 10;

/// One finished match on the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Primary player's score
    pub score: u64,
    #[serde(default)]
    pub mode: GameMode,
    #[serde(default)]
    pub food_collected: u32,
    #[serde(default)]
    pub max_combo: u32,
    #[serde(default)]
    pub echoes_created: u32,
    #[serde(default)]
    pub paradoxes_triggered: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: u64,
}

impl HighScoreEntry {
    /// Snapshot the final statistics of a match
    pub fn from_state(state: &GameState, timestamp: u64) -> Self {
        Self {
            score: state.player(PlayerSlot::One).score,
            mode: state.mode,
            food_collected: state.food_collected,
            max_combo: state.max_combo,
            echoes_created: state.echoes_created,
            paradoxes_triggered: state.paradoxes_triggered,
            timestamp,
        }
    }
}

/// Best finished matches, highest score first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Zero never qualifies; a full board must be beaten strictly
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Must beat the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// 1-based rank the score would take, ties placing below existing entries
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert an entry if it qualifies.
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify
    pub fn add_entry(&mut self, entry: HighScoreEntry) -> Option<usize> {
        let rank = self.potential_rank(entry.score)?;
        self.entries.insert(rank - 1, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// Format a timestamp relative to `now_ms`
pub fn format_age(timestamp: u64, now_ms: u64) -> String {
    let diff_mins = now_ms.saturating_sub(timestamp) / 60_000;
    let diff_hours = diff_mins / 60;
    let diff_days = diff_hours / 24;

    if diff_days >= 1 {
        match diff_days {
            1 => "Yesterday".to_string(),
            d if d < 7 => format!("{} days ago", d),
            d => format!("{} weeks ago", d / 7),
        }
    } else if diff_hours >= 1 {
        if diff_hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", diff_hours)
        }
    } else if diff_mins >= 1 {
        if diff_mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", diff_mins)
        }
    } else {
        "Just now".to_string()
    }
}
