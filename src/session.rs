use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use thiserror::Error;

use crate::metrics::{accuracy_percent, correct_char_count, wpm};
use crate::scoring::{partial_credit, word_score};
use crate::words::{split_words, Word};

pub const DEFAULT_SESSION_SECS: u32 = 300;

/// Source of wall-clock time for a session
pub trait Clock {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Hand-driven clock for headless runs and tests. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<SystemTime>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(UNIX_EPOCH + Duration::from_secs(1_700_000_000))),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        self.now.get()
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub session_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_secs: DEFAULT_SESSION_SECS,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid session state: {0}")]
    InvalidState(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Running,
    Completed,
}

/// Highlight state of one character of the target text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharState {
    Correct,
    Incorrect,
    Current,
    Untyped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedWord {
    pub word_index: usize,
    pub word: String,
    pub score: u32,
    pub completed_at: SystemTime,
}

/// Word-level score bookkeeping.
///
/// `accumulated_score` covers the whole timed run; the rest is per practice
/// text and is cleared when a new text is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreLedger {
    pub accumulated_score: u32,
    pub last_scored_word_index: Option<usize>,
    pub completed_words: Vec<CompletedWord>,
}

impl ScoreLedger {
    /// Index of the first word not yet scored
    pub fn next_word_index(&self) -> usize {
        self.last_scored_word_index.map_or(0, |idx| idx + 1)
    }

    fn record(&mut self, word: &Word, score: u32, at: SystemTime) {
        self.accumulated_score += score;
        self.last_scored_word_index = Some(word.index);
        self.completed_words.push(CompletedWord {
            word_index: word.index,
            word: word.text.clone(),
            score,
            completed_at: at,
        });
    }

    fn clear_text(&mut self) {
        self.last_scored_word_index = None;
        self.completed_words.clear();
    }
}

/// Metrics view handed to the presentation layer after every operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub phase: Phase,
    pub wpm: u32,
    pub accuracy_percent: u32,
    pub score: u32,
    pub remaining_seconds: u32,
    pub char_states: Vec<CharState>,
    /// The whole target has been typed over; the caller should load the next text.
    pub text_exhausted: bool,
}

/// Final numbers of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionResult {
    pub wpm: u32,
    pub accuracy_percent: u32,
    pub score: u32,
    pub duration_seconds: u32,
    /// True when the countdown ran out rather than the session being ended early.
    pub timed_out: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CharTotals {
    correct: usize,
    typed: usize,
}

/// One timed typing run over one or more practice texts
#[derive(Debug)]
pub struct TypingSession<C: Clock = SystemClock> {
    config: SessionConfig,
    clock: C,
    target: Vec<char>,
    words: Vec<Word>,
    typed: Vec<char>,
    started_at: Option<SystemTime>,
    remaining_seconds: u32,
    phase: Phase,
    ledger: ScoreLedger,
    finished_texts: CharTotals,
    wpm: u32,
    accuracy_percent: u32,
    result: Option<SessionResult>,
}

impl TypingSession<SystemClock> {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> TypingSession<C> {
    pub fn with_clock(config: SessionConfig, clock: C) -> Self {
        let remaining_seconds = config.session_secs;
        Self {
            config,
            clock,
            target: Vec::new(),
            words: Vec::new(),
            typed: Vec::new(),
            started_at: None,
            remaining_seconds,
            phase: Phase::Idle,
            ledger: ScoreLedger::default(),
            finished_texts: CharTotals::default(),
            wpm: 0,
            accuracy_percent: 100,
            result: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }

    pub fn target_text(&self) -> String {
        self.target.iter().collect()
    }

    pub fn target_chars(&self) -> &[char] {
        &self.target
    }

    pub fn typed_text(&self) -> String {
        self.typed.iter().collect()
    }

    pub fn typed_len(&self) -> usize {
        self.typed.len()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn session_secs(&self) -> u32 {
        self.config.session_secs
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn score(&self) -> u32 {
        self.ledger.accumulated_score
    }

    pub fn result(&self) -> Option<SessionResult> {
        self.result
    }

    pub fn char_states(&self) -> Vec<CharState> {
        let typed_len = self.typed.len();
        self.target
            .iter()
            .enumerate()
            .map(|(idx, expected)| match self.typed.get(idx) {
                Some(c) if c == expected => CharState::Correct,
                Some(_) => CharState::Incorrect,
                None if idx == typed_len => CharState::Current,
                None => CharState::Untyped,
            })
            .collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            wpm: self.wpm,
            accuracy_percent: self.accuracy_percent,
            score: self.ledger.accumulated_score,
            remaining_seconds: self.remaining_seconds,
            char_states: self.char_states(),
            text_exhausted: self.is_running()
                && !self.target.is_empty()
                && self.typed.len() >= self.target.len(),
        }
    }

    /// Begins a timed run over `target`. Only valid from idle.
    pub fn start(&mut self, target: &str) -> Result<Snapshot, SessionError> {
        if target.is_empty() {
            return Err(SessionError::InvalidState("practice text is empty"));
        }
        if self.phase != Phase::Idle {
            return Err(SessionError::InvalidState("session already started"));
        }

        self.set_target(target);
        self.typed.clear();
        self.remaining_seconds = self.config.session_secs;
        self.ledger = ScoreLedger::default();
        self.finished_texts = CharTotals::default();
        self.wpm = 0;
        self.accuracy_percent = 100;
        self.result = None;
        self.started_at = Some(self.clock.now());
        self.phase = Phase::Running;

        tracing::info!(
            words = self.words.len(),
            secs = self.config.session_secs,
            "typing session started"
        );

        Ok(self.snapshot())
    }

    /// Takes the full input buffer and rescores. A no-op unless running.
    pub fn on_input(&mut self, buffer: &str) -> Snapshot {
        if self.phase != Phase::Running {
            return self.snapshot();
        }

        self.typed = buffer.chars().collect();
        let now = self.clock.now();
        self.refresh_metrics(now);
        self.score_completed_words(now);

        self.snapshot()
    }

    /// Swaps in the next practice text mid-run, keeping the accumulated score.
    pub fn load_text(&mut self, target: &str) -> Result<Snapshot, SessionError> {
        if target.is_empty() {
            return Err(SessionError::InvalidState("practice text is empty"));
        }
        if self.phase != Phase::Running {
            return Err(SessionError::InvalidState("session is not running"));
        }

        self.finished_texts.correct += correct_char_count(&self.typed, &self.target);
        self.finished_texts.typed += self.typed.len();

        self.set_target(target);
        self.typed.clear();
        self.ledger.clear_text();
        self.refresh_metrics(self.clock.now());

        tracing::debug!(
            score = self.ledger.accumulated_score,
            words = self.words.len(),
            "loaded next practice text"
        );

        Ok(self.snapshot())
    }

    /// One second of the countdown. Finalizes when it reaches zero.
    pub fn tick(&mut self) -> Snapshot {
        if self.phase != Phase::Running {
            return self.snapshot();
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            if let Err(err) = self.finalize() {
                tracing::warn!("finalize on timeout failed: {err}");
            }
        }

        self.snapshot()
    }

    /// Ends the run and returns its result. Repeated calls return the same result.
    pub fn finalize(&mut self) -> Result<SessionResult, SessionError> {
        if let Some(result) = self.result {
            return Ok(result);
        }
        if self.phase != Phase::Running {
            return Err(SessionError::InvalidState("session has not started"));
        }

        let now = self.clock.now();
        self.refresh_metrics(now);

        let bonus = self.in_progress_credit();
        self.ledger.accumulated_score += bonus;

        let timed_out = self.remaining_seconds == 0;
        let duration_seconds = if timed_out {
            self.config.session_secs
        } else {
            self.elapsed(now).as_secs_f64().round() as u32
        };

        let result = SessionResult {
            wpm: self.wpm,
            accuracy_percent: self.accuracy_percent,
            score: self.ledger.accumulated_score,
            duration_seconds,
            timed_out,
        };

        self.phase = Phase::Completed;
        self.result = Some(result);

        tracing::info!(
            wpm = result.wpm,
            accuracy = result.accuracy_percent,
            score = result.score,
            partial = bonus,
            timed_out,
            "typing session finished"
        );

        Ok(result)
    }

    /// Back to idle. The current target text is kept.
    pub fn reset(&mut self) -> Snapshot {
        self.typed.clear();
        self.started_at = None;
        self.remaining_seconds = self.config.session_secs;
        self.phase = Phase::Idle;
        self.ledger = ScoreLedger::default();
        self.finished_texts = CharTotals::default();
        self.wpm = 0;
        self.accuracy_percent = 100;
        self.result = None;

        self.snapshot()
    }

    fn set_target(&mut self, target: &str) {
        self.target = target.chars().collect();
        self.words = split_words(&self.target);
    }

    fn elapsed(&self, now: SystemTime) -> Duration {
        self.started_at
            .and_then(|start| now.duration_since(start).ok())
            .unwrap_or(Duration::ZERO)
    }

    fn refresh_metrics(&mut self, now: SystemTime) {
        let correct =
            self.finished_texts.correct + correct_char_count(&self.typed, &self.target);
        let typed = self.finished_texts.typed + self.typed.len();

        self.wpm = wpm(correct, self.elapsed(now));
        self.accuracy_percent = accuracy_percent(correct, typed);
    }

    fn score_completed_words(&mut self, now: SystemTime) {
        let last_index = self.words.len().saturating_sub(1);
        let next = self.ledger.next_word_index();

        for word in self.words.iter().skip(next) {
            if !is_word_complete(word, &self.typed, &self.target, word.index == last_index) {
                break;
            }

            let correct = correct_char_count(
                &self.typed[word.start..word.end],
                &self.target[word.start..word.end],
            );
            let score = word_score(word.len(), correct);
            self.ledger.record(word, score, now);

            tracing::debug!(index = word.index, word = %word.text, score, "word completed");
        }
    }

    fn in_progress_credit(&self) -> u32 {
        let typed_len = self.typed.len();
        let next = self.ledger.next_word_index();

        self.words
            .iter()
            .skip(next)
            .find(|word| word.contains_cursor(typed_len))
            .map(|word| {
                correct_char_count(
                    &self.typed[word.start..typed_len],
                    &self.target[word.start..typed_len],
                )
            })
            .filter(|correct| *correct > 0)
            .map_or(0, partial_credit)
    }
}

fn is_word_complete(word: &Word, typed: &[char], target: &[char], is_last: bool) -> bool {
    if typed.len() < word.end || typed[word.start..word.end] != target[word.start..word.end] {
        return false;
    }

    is_last || typed.get(word.end) == Some(&' ')
}
