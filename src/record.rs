use serde::{Deserialize, Serialize};

use crate::mode::PracticeMode;
use crate::session::SessionResult;
use crate::student_id::StudentId;

/// Shortest run the leaderboard accepts
pub const MIN_RECORD_SECS: u32 = 300;

/// Only runs that went the full timer may be saved
pub fn is_saveable(result: &SessionResult) -> bool {
    result.timed_out && result.duration_seconds >= MIN_RECORD_SECS
}

/// A finished session as submitted to the leaderboard backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeRecord {
    pub student_id: String,
    pub mode: PracticeMode,
    pub wpm: u32,
    pub accuracy: f64,
    pub score: u32,
    pub duration_sec: u32,
}

impl PracticeRecord {
    pub fn new(student_id: &StudentId, mode: PracticeMode, result: &SessionResult) -> Self {
        Self {
            student_id: student_id.to_string(),
            mode,
            wpm: result.wpm,
            accuracy: f64::from(result.accuracy_percent),
            score: result.score,
            duration_sec: result.duration_seconds,
        }
    }
}
