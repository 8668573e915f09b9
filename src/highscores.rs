//! High score persistence
//!
//! Sessions only need a best-score load/save pair ([`ScoreStore`]). The
//! file-backed store keeps a top 10 leaderboard as JSON.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Where the session reads and records the best score
pub trait ScoreStore {
    /// Best recorded score, 0 if none
    fn load_high_score(&self) -> u64;
    /// Record a new best score
    fn save_high_score(&mut self, score: u64);
}

/// Volatile store, for tests and hosts without storage
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    pub best: u64,
    /// Number of save calls received
    pub saves: usize,
}

impl ScoreStore for MemoryScoreStore {
    fn load_high_score(&self) -> u64 {
        self.best
    }

    fn save_high_score(&mut self, score: u64) {
        self.best = score;
        self.saves += 1;
    }
}

/// A single high score entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard, sorted best first
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// A positive score makes the board while it has room or beats the
    /// lowest entry
    pub fn qualifies(&self, score: u64) -> bool {
        score > 0
            && (self.entries.len() < MAX_HIGH_SCORES
                || self.entries.last().is_some_and(|e| score > e.score))
    }

    /// Insert a score if it qualifies. Returns the 1-indexed rank; a tie
    /// ranks below the entries already holding that score.
    pub fn add_score(&mut self, score: u64, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let index = self.entries.partition_point(|e| e.score >= score);
        self.entries.insert(index, HighScoreEntry { score, timestamp });
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(index + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// Errors from the leaderboard file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("high score file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("high score file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Leaderboard persisted as a JSON file
#[derive(Debug, Clone)]
pub struct HighScoreFile {
    path: PathBuf,
    scores: HighScores,
}

impl HighScoreFile {
    /// Read the leaderboard at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let json = fs::read_to_string(&path)?;
        let scores = serde_json::from_str(&json)?;
        Ok(Self { path, scores })
    }

    /// Load the leaderboard, starting fresh if it is missing or unreadable
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(file) => {
                log::info!("Loaded {} high scores", file.scores.entries.len());
                file
            }
            Err(StoreError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No high scores found, starting fresh");
                Self::empty(path)
            }
            Err(e) => {
                log::warn!("Ignoring high score file {}: {}", path.display(), e);
                Self::empty(path)
            }
        }
    }

    fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            scores: HighScores::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }

    /// Write the leaderboard back to disk
    pub fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.scores)?;
        fs::write(&self.path, json)?;
        log::info!("High scores saved ({} entries)", self.scores.entries.len());
        Ok(())
    }
}

impl ScoreStore for HighScoreFile {
    fn load_high_score(&self) -> u64 {
        self.scores.top_score().unwrap_or(0)
    }

    fn save_high_score(&mut self, score: u64) {
        if let Some(rank) = self.scores.add_score(score, now_millis()) {
            log::info!("Score {} entered the leaderboard at #{}", score, rank);
        }
        if let Err(e) = self.save() {
            log::warn!("Failed to save high scores: {}", e);
        }
    }
}

fn now_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
