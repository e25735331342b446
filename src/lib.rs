// Library surface for the terminal front-end and headless/integration tests.
// Rendering lives in the binary; everything here is usable without a TTY.
pub mod api;
pub mod app;
pub mod config;
pub mod keyboard;
pub mod leaderboard;
pub mod logging;
pub mod metrics;
pub mod mode;
pub mod record;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod student_id;
pub mod texts;
pub mod words;
