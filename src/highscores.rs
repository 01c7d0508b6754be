//! High score leaderboard
//!
//! Top five runs ordered by score. Storage belongs to the host; this module
//! only (de)serialises the list.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::sim::GameOverSummary;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;

const MS_PER_MIN: f64 = 60_000.0;
const MS_PER_HOUR: f64 = 60.0 * MS_PER_MIN;
const MS_PER_DAY: f64 = 24.0 * MS_PER_HOUR;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    pub kills: u32,
    /// Wave reached
    pub wave: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp_ms: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a finished run. Returns the rank achieved, or None if it didn't qualify.
    pub fn add_score(&mut self, run: GameOverSummary, timestamp_ms: f64) -> Option<usize> {
        let rank = self.potential_rank(run.score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score: run.score,
                kills: run.kills,
                wave: run.wave,
                timestamp_ms,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        log::info!("New high score #{}: {}", rank, run.score);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        // Stored lists may come from older builds with other limits
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        Ok(scores)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Days since 1970-01-01 to a (year, month, day) civil date (UTC)
#[cfg(not(target_arch = "wasm32"))]
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// `M/D/YY` for a Unix timestamp (UTC)
#[cfg(not(target_arch = "wasm32"))]
pub fn short_date(timestamp_ms: f64) -> String {
    let days = (timestamp_ms / MS_PER_DAY).floor() as i64;
    let (year, month, day) = civil_from_days(days);
    format!("{}/{}/{:02}", month, day, year.rem_euclid(100))
}

/// `M/D/YY` for a Unix timestamp (UTC)
#[cfg(target_arch = "wasm32")]
pub fn short_date(timestamp_ms: f64) -> String {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp_ms));
    format!(
        "{}/{}/{:02}",
        date.get_utc_month() + 1,
        date.get_utc_date(),
        date.get_utc_full_year() % 100
    )
}

/// Describe `timestamp_ms` relative to `now_ms` ("Just now", "5 mins ago", "Yesterday", ...)
pub fn format_relative(timestamp_ms: f64, now_ms: f64) -> String {
    let diff = (now_ms - timestamp_ms).max(0.0);
    let days = (diff / MS_PER_DAY).floor() as i64;
    let hours = (diff / MS_PER_HOUR).floor() as i64;
    let mins = (diff / MS_PER_MIN).floor() as i64;

    match (days, hours, mins) {
        (1, _, _) => "Yesterday".to_string(),
        (2..=6, _, _) => format!("{} days ago", days),
        (7.., _, _) => short_date(timestamp_ms),
        (_, 1, _) => "1 hour ago".to_string(),
        (_, 2.., _) => format!("{} hours ago", hours),
        (_, _, 1) => "1 min ago".to_string(),
        (_, _, 2..) => format!("{} mins ago", mins),
        _ => "Just now".to_string(),
    }
}

/// Relative date against the current wall clock
pub fn format_date(timestamp_ms: f64) -> String {
    format_relative(timestamp_ms, crate::platform::now_ms())
}
