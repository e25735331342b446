use crate::api::RecordSubmitter;
use crate::keyboard::{next_key_hint, KeyHint};
use crate::mode::PracticeMode;
use crate::record::{is_saveable, PracticeRecord, MIN_RECORD_SECS};
use crate::session::{
    CharState, Clock, SessionConfig, SessionResult, Snapshot, SystemClock, TypingSession,
};
use crate::student_id::StudentId;
use crate::texts::{LocalTextProvider, PracticeTextProvider, FALLBACK_TEXT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStatus {
    NotSubmitted,
    Submitted { id: Option<i64> },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub mode: PracticeMode,
    pub session_secs: u32,
    /// Keep practicing the same text instead of loading new ones
    pub custom_prompt: Option<String>,
    pub student_id: Option<StudentId>,
}

/// Presentation-side owner of one practice view: the session, its texts and the submission.
pub struct App<C: Clock = SystemClock> {
    pub mode: PracticeMode,
    pub state: AppState,
    pub session: TypingSession<C>,
    pub submit_status: SubmitStatus,
    /// One-line notice for the user (fallback texts, submission errors, ...)
    pub notice: Option<String>,
    text: String,
    input: String,
    snapshot: Snapshot,
    reload_texts: bool,
    provider: Box<dyn PracticeTextProvider>,
    fallback: LocalTextProvider,
    submitter: Option<Box<dyn RecordSubmitter>>,
    student_id: Option<StudentId>,
}

impl App<SystemClock> {
    pub fn new(
        settings: AppSettings,
        provider: Box<dyn PracticeTextProvider>,
        submitter: Option<Box<dyn RecordSubmitter>>,
    ) -> Self {
        Self::with_clock(settings, provider, submitter, SystemClock)
    }
}

impl<C: Clock> App<C> {
    pub fn with_clock(
        settings: AppSettings,
        provider: Box<dyn PracticeTextProvider>,
        submitter: Option<Box<dyn RecordSubmitter>>,
        clock: C,
    ) -> Self {
        let session = TypingSession::with_clock(
            SessionConfig {
                session_secs: settings.session_secs,
            },
            clock,
        );
        let snapshot = session.snapshot();

        let mut app = Self {
            mode: settings.mode,
            state: AppState::Typing,
            session,
            submit_status: SubmitStatus::NotSubmitted,
            notice: None,
            text: String::new(),
            input: String::new(),
            snapshot,
            reload_texts: settings.custom_prompt.is_none(),
            provider,
            fallback: LocalTextProvider::new(),
            submitter,
            student_id: settings.student_id,
        };
        app.text = app.next_text();
        app
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn result(&self) -> Option<SessionResult> {
        self.session.result()
    }

    pub fn student_id(&self) -> Option<&StudentId> {
        self.student_id.as_ref()
    }

    pub fn can_submit(&self) -> bool {
        self.submitter.is_some()
            && self.student_id.is_some()
            && self.result().as_ref().is_some_and(is_saveable)
            && !matches!(self.submit_status, SubmitStatus::Submitted { .. })
    }

    /// Per-character highlight of the text on screen
    pub fn char_states(&self) -> Vec<CharState> {
        if self.session.is_running() || self.session.is_completed() {
            return self.snapshot.char_states.clone();
        }

        (0..self.text.chars().count())
            .map(|idx| {
                if idx == 0 {
                    CharState::Current
                } else {
                    CharState::Untyped
                }
            })
            .collect()
    }

    pub fn key_hint(&self) -> Option<KeyHint> {
        if self.session.is_completed() {
            return None;
        }
        let target: Vec<char> = self.text.chars().collect();
        next_key_hint(&target, self.input.chars().count(), false)
    }

    /// A typed character. The first one starts the countdown.
    pub fn on_char(&mut self, c: char) {
        if self.state != AppState::Typing || self.session.is_completed() {
            return;
        }

        if !self.session.is_running() {
            match self.session.start(&self.text) {
                Ok(snapshot) => self.snapshot = snapshot,
                Err(err) => {
                    self.notice = Some(err.to_string());
                    return;
                }
            }
        }

        self.input.push(c);
        self.apply_input();
    }

    /// Drops the last typed character. Nothing else shortens the input.
    pub fn on_backspace(&mut self) {
        if !self.session.is_running() || self.input.pop().is_none() {
            return;
        }
        self.apply_input();
    }

    pub fn on_tick(&mut self) {
        if !self.session.is_running() {
            return;
        }

        self.snapshot = self.session.tick();
        if self.session.is_completed() {
            self.show_results();
        }
    }

    /// Ends the run early
    pub fn finish(&mut self) {
        if let Err(err) = self.session.finalize() {
            tracing::debug!("finish ignored: {err}");
            return;
        }
        self.snapshot = self.session.snapshot();
        self.show_results();
    }

    /// A fresh run with a new text
    pub fn restart(&mut self) {
        self.notice = None;
        self.session.reset();
        self.input.clear();
        self.text = self.next_text();
        self.snapshot = self.session.snapshot();
        self.submit_status = SubmitStatus::NotSubmitted;
        self.state = AppState::Typing;
    }

    pub fn submit(&mut self) {
        let Some(result) = self.result() else {
            self.notice = Some("no finished session to save".to_string());
            return;
        };
        if !is_saveable(&result) {
            self.notice = Some(unsaveable_notice());
            return;
        }
        let Some(student_id) = self.student_id.as_ref() else {
            self.notice = Some("set a student id (e.g. --student-id \"10218 홍길동\") to save".to_string());
            return;
        };
        let Some(submitter) = self.submitter.as_ref() else {
            self.notice = Some("no leaderboard server configured".to_string());
            return;
        };
        if matches!(self.submit_status, SubmitStatus::Submitted { .. }) {
            return;
        }

        let record = PracticeRecord::new(student_id, self.mode, &result);
        self.submit_status = match submitter.submit_record(&record) {
            Ok(receipt) => {
                self.notice = receipt.message;
                SubmitStatus::Submitted { id: receipt.id }
            }
            Err(err) => {
                tracing::warn!("record submission failed: {err}");
                SubmitStatus::Failed(err.to_string())
            }
        };
    }

    fn show_results(&mut self) {
        self.state = AppState::Results;
        let saving_enabled = self.submitter.is_some() && self.student_id.is_some();
        if saving_enabled && !self.result().as_ref().is_some_and(is_saveable) {
            self.notice = Some(unsaveable_notice());
        }
    }

    fn apply_input(&mut self) {
        self.snapshot = self.session.on_input(&self.input);
        if self.snapshot.text_exhausted {
            self.advance_text();
        }
    }

    fn advance_text(&mut self) {
        if !self.reload_texts {
            self.finish();
            return;
        }

        let text = self.next_text();
        match self.session.load_text(&text) {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                self.text = text;
                self.input.clear();
            }
            Err(err) => {
                tracing::warn!("could not load next practice text: {err}");
                self.finish();
            }
        }
    }

    fn next_text(&mut self) -> String {
        match self.provider.fetch_practice_text(self.mode) {
            Ok(text) if !text.is_empty() => return text,
            Ok(_) => tracing::warn!("provider returned an empty practice text"),
            Err(err) => tracing::warn!("practice text unavailable: {err}"),
        }

        self.notice = Some("using built-in practice text".to_string());
        self.fallback
            .fetch_practice_text(self.mode)
            .unwrap_or_else(|_| FALLBACK_TEXT.to_string())
    }
}

fn unsaveable_notice() -> String {
    format!(
        "only runs that use the full {}-minute timer can be saved",
        MIN_RECORD_SECS / 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, SubmitReceipt};
    use crate::session::{ManualClock, Phase};
    use crate::texts::{FixedTextProvider, ProviderError};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    struct QueueProvider {
        texts: RefCell<Vec<String>>,
    }

    impl PracticeTextProvider for QueueProvider {
        fn fetch_practice_text(&self, mode: PracticeMode) -> Result<String, ProviderError> {
            self.texts.borrow_mut().pop().ok_or(ProviderError::NoText(mode))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSubmitter {
        records: Rc<RefCell<Vec<PracticeRecord>>>,
        fail: bool,
    }

    impl RecordSubmitter for RecordingSubmitter {
        fn submit_record(&self, record: &PracticeRecord) -> Result<SubmitReceipt, ApiError> {
            if self.fail {
                return Err(ApiError::Rejected {
                    status: 500,
                    message: "서버 오류가 발생했습니다.".to_string(),
                });
            }
            self.records.borrow_mut().push(record.clone());
            Ok(SubmitReceipt {
                id: Some(self.records.borrow().len() as i64),
                message: None,
            })
        }
    }

    fn settings(custom_prompt: Option<&str>) -> AppSettings {
        AppSettings {
            mode: PracticeMode::Words,
            session_secs: MIN_RECORD_SECS,
            custom_prompt: custom_prompt.map(str::to_string),
            student_id: Some(StudentId::parse("10218 홍길동").unwrap()),
        }
    }

    fn prompt_app(
        settings: AppSettings,
        submitter: Option<RecordingSubmitter>,
        clock: ManualClock,
    ) -> App<ManualClock> {
        let prompt = settings.custom_prompt.clone().unwrap_or_default();
        App::with_clock(
            settings,
            Box::new(FixedTextProvider::new(prompt)),
            submitter.map(|s| Box::new(s) as Box<dyn RecordSubmitter>),
            clock,
        )
    }

    fn type_str<C: Clock>(app: &mut App<C>, s: &str) {
        for c in s.chars() {
            app.on_char(c);
        }
    }

    fn run_out_clock(app: &mut App<ManualClock>, clock: &ManualClock) {
        for _ in 0..app.session.session_secs() {
            clock.advance(Duration::from_secs(1));
            app.on_tick();
        }
    }

    #[test]
    fn first_char_starts_session() {
        let mut app = prompt_app(settings(Some("ab cd")), None, ManualClock::new());

        assert_eq!(app.session.phase(), Phase::Idle);
        assert_eq!(app.char_states()[0], CharState::Current);

        app.on_char('a');
        assert!(app.session.is_running());
        assert_eq!(app.input(), "a");
    }

    #[test]
    fn exhausted_text_loads_next_and_keeps_score() {
        let provider = QueueProvider {
            texts: RefCell::new(vec!["gh".to_string(), "ef".to_string(), "ab cd".to_string()]),
        };
        let mut app = App::with_clock(settings(None), Box::new(provider), None, ManualClock::new());
        assert_eq!(app.text(), "ab cd");

        type_str(&mut app, "ab cd");

        assert_eq!(app.text(), "ef");
        assert_eq!(app.input(), "");
        assert_eq!(app.snapshot().score, 12);
        assert!(app.session.is_running());

        type_str(&mut app, "ef");
        assert_eq!(app.text(), "gh");
        assert_eq!(app.snapshot().score, 18);
    }

    #[test]
    fn provider_failure_falls_back_to_builtin_text() {
        let provider = QueueProvider {
            texts: RefCell::new(vec![]),
        };
        let app = App::with_clock(settings(None), Box::new(provider), None, ManualClock::new());

        assert!(!app.text().is_empty());
        assert!(app.notice.is_some());
    }

    #[test]
    fn custom_prompt_finishes_when_typed() {
        let mut app = prompt_app(settings(Some("if x")), None, ManualClock::new());

        type_str(&mut app, "if x");

        assert_eq!(app.state, AppState::Results);
        let result = app.result().unwrap();
        assert_eq!(result.score, 9);
        assert!(!result.timed_out);

        app.on_char('y');
        assert_eq!(app.input(), "if x");
    }

    #[test]
    fn timeout_moves_to_results_and_submits() {
        let submitter = RecordingSubmitter::default();
        let records = submitter.records.clone();
        let clock = ManualClock::new();
        let mut app = prompt_app(settings(Some("print input")), Some(submitter), clock.clone());

        type_str(&mut app, "print in");
        run_out_clock(&mut app, &clock);

        assert_eq!(app.state, AppState::Results);
        assert!(app.can_submit());

        app.submit();
        assert_eq!(app.submit_status, SubmitStatus::Submitted { id: Some(1) });
        assert!(!app.can_submit());

        // a second submit is ignored
        app.submit();
        let records = records.borrow();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].student_id, "10218 홍길동");
        assert_eq!(records[0].mode, PracticeMode::Words);
        assert_eq!(records[0].duration_sec, 300);
        // 15 for "print", round(2 * 1.5) for "in"
        assert_eq!(records[0].score, 18);
    }

    #[test]
    fn early_finish_cannot_be_saved() {
        let submitter = RecordingSubmitter::default();
        let records = submitter.records.clone();
        let mut app = prompt_app(settings(Some("ab")), Some(submitter), ManualClock::new());

        type_str(&mut app, "ab");

        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.result().unwrap().duration_seconds, 0);
        assert!(!app.can_submit());
        assert!(app.notice.as_deref().unwrap_or_default().contains("5-minute"));

        app.submit();
        assert_eq!(app.submit_status, SubmitStatus::NotSubmitted);
        assert!(records.borrow().is_empty());
    }

    #[test]
    fn short_timer_cannot_be_saved() {
        let submitter = RecordingSubmitter::default();
        let records = submitter.records.clone();
        let clock = ManualClock::new();
        let mut app = prompt_app(
            AppSettings {
                session_secs: 60,
                ..settings(Some("print input"))
            },
            Some(submitter),
            clock.clone(),
        );

        type_str(&mut app, "print");
        run_out_clock(&mut app, &clock);

        let result = app.result().unwrap();
        assert!(result.timed_out);
        assert_eq!(result.duration_seconds, 60);
        assert!(!app.can_submit());

        app.submit();
        assert_eq!(app.submit_status, SubmitStatus::NotSubmitted);
        assert!(records.borrow().is_empty());
    }

    #[test]
    fn failed_submission_is_reported() {
        let submitter = RecordingSubmitter {
            fail: true,
            ..Default::default()
        };
        let clock = ManualClock::new();
        let mut app = prompt_app(settings(Some("ab")), Some(submitter), clock.clone());

        type_str(&mut app, "a");
        run_out_clock(&mut app, &clock);
        app.submit();

        assert_eq!(
            app.submit_status,
            SubmitStatus::Failed("server rejected request (500): 서버 오류가 발생했습니다.".to_string())
        );
        assert!(app.can_submit(), "a failed submission may be retried");
    }

    #[test]
    fn submit_without_student_id_is_rejected() {
        let clock = ManualClock::new();
        let mut app = prompt_app(
            AppSettings {
                student_id: None,
                ..settings(Some("ab"))
            },
            Some(RecordingSubmitter::default()),
            clock.clone(),
        );

        type_str(&mut app, "a");
        run_out_clock(&mut app, &clock);
        app.submit();

        assert_eq!(app.submit_status, SubmitStatus::NotSubmitted);
        assert!(app.notice.as_deref().unwrap_or_default().contains("student id"));
    }

    #[test]
    fn restart_resets_session() {
        let mut app = prompt_app(settings(Some("ab")), None, ManualClock::new());

        type_str(&mut app, "ab");
        assert_eq!(app.state, AppState::Results);

        app.restart();
        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.session.phase(), Phase::Idle);
        assert_eq!(app.snapshot().score, 0);
        assert_eq!(app.input(), "");
        assert_eq!(app.notice, None);
    }

    #[test]
    fn backspace_edits_input() {
        let mut app = prompt_app(settings(Some("abc")), None, ManualClock::new());

        type_str(&mut app, "ax");
        app.on_backspace();
        assert_eq!(app.input(), "a");
        assert_eq!(app.char_states()[1], CharState::Current);

        let hint = app.key_hint().unwrap();
        assert_eq!(hint.expected, 'b');
    }
}
