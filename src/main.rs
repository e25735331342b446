mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
};
use taja::{
    api::{HttpApiClient, RecordSubmitter},
    app::{App, AppSettings, AppState},
    config::{Config, ConfigStore, FileConfigStore},
    leaderboard, logging,
    mode::PracticeMode,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    student_id::StudentId,
    texts::{FixedTextProvider, LocalTextProvider, PracticeTextProvider},
};

const DEFAULT_PAGE_LIMIT: u32 = 10;

/// typing practice tui with live word scoring and a leaderboard client
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Practice typing Python keywords and code. Every correctly finished word scores points; finished runs can be saved to a class leaderboard."
)]
pub struct Cli {
    /// practice mode
    #[clap(short = 'm', long, value_enum)]
    mode: Option<PracticeMode>,

    /// length of a run in seconds
    #[clap(short = 's', long = "secs")]
    session_secs: Option<u32>,

    /// custom prompt to practice (the run ends once it is typed)
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// base url of the leaderboard server, e.g. http://localhost:5000
    #[clap(long)]
    api_url: Option<String>,

    /// student id used when saving records, e.g. "10218 홍길동"
    #[clap(long)]
    student_id: Option<String>,

    /// print the top ten for the selected mode and exit
    #[clap(long)]
    leaderboard: bool,

    /// page size for --leaderboard (1-50)
    #[clap(long, requires = "leaderboard")]
    limit: Option<u32>,

    /// rank to start from for --leaderboard
    #[clap(long, requires = "leaderboard")]
    offset: Option<u32>,

    /// remember the given options in the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Command line options win over the stored config
    fn merge_into(&self, mut config: Config) -> Config {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(secs) = self.session_secs {
            config.session_secs = secs;
        }
        if let Some(url) = &self.api_url {
            config.api_url = Some(url.clone());
        }
        if let Some(id) = &self.student_id {
            config.student_id = Some(id.clone());
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let store = FileConfigStore::new();
    let config = cli.merge_into(store.load());

    let student_id = match config.student_id.as_deref() {
        Some(raw) => match StudentId::parse(raw) {
            Ok(id) => Some(id),
            Err(err) => Cli::command().error(ErrorKind::ValueValidation, err).exit(),
        },
        None => None,
    };
    if config.session_secs == 0 {
        Cli::command()
            .error(ErrorKind::ValueValidation, "session length must be at least one second")
            .exit();
    }

    if let Err(err) = logging::init_logging(&logging::log_path()) {
        eprintln!("logging disabled: {err}");
    }

    if cli.save_config {
        store.save(&config)?;
        tracing::info!("saved config to {}", store.path().display());
    }

    let client = match config.api_url.as_deref() {
        Some(url) => match HttpApiClient::new(url) {
            Ok(client) => Some(client),
            Err(err) => Cli::command().error(ErrorKind::ValueValidation, err).exit(),
        },
        None => None,
    };

    if cli.leaderboard {
        let Some(client) = client else {
            Cli::command()
                .error(ErrorKind::MissingRequiredArgument, "--leaderboard needs --api-url")
                .exit();
        };
        if cli.limit.is_some() || cli.offset.is_some() {
            let page = client.records_page(
                config.mode,
                cli.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
                cli.offset.unwrap_or(0),
            )?;
            print!("{}", leaderboard::render_page(&page));
        } else {
            let mut records = client.top_records(config.mode)?;
            leaderboard::rank(&mut records);
            print!("{}", leaderboard::render_table(config.mode, &records));
        }
        match client.stats() {
            Ok(stats) => print!("\n{}", leaderboard::render_stats(&stats)),
            Err(err) => tracing::warn!("class stats unavailable: {err}"),
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let provider: Box<dyn PracticeTextProvider> = match (&cli.prompt, &client) {
        (Some(prompt), _) => Box::new(FixedTextProvider::new(prompt.clone())),
        (None, Some(client)) => Box::new(client.clone()),
        (None, None) => Box::new(LocalTextProvider::new()),
    };
    let submitter = client.map(|c| Box::new(c) as Box<dyn RecordSubmitter>);

    let settings = AppSettings {
        mode: config.mode,
        session_secs: config.session_secs,
        custom_prompt: cli.prompt.clone(),
        student_id,
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(settings, provider, submitter);
    let outcome = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    outcome
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::every_second());

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
                {
                    break;
                }

                match app.state {
                    AppState::Typing => match key.code {
                        KeyCode::Esc => break,
                        KeyCode::Backspace => app.on_backspace(),
                        KeyCode::Enter => app.on_char('\n'),
                        KeyCode::Char(c) => {
                            let was_running = app.session.is_running();
                            app.on_char(c);
                            if !was_running && app.session.is_running() {
                                // the countdown starts with the first keystroke
                                runner.restart_ticks();
                            }
                        }
                        _ => {}
                    },
                    AppState::Results => match key.code {
                        KeyCode::Esc | KeyCode::Char('q') => break,
                        KeyCode::Char('r') => app.restart(),
                        KeyCode::Char('s') => {
                            // the request blocks, so show that it is underway
                            app.notice = Some("saving...".to_string());
                            terminal.draw(|f| ui::draw(app, f))?;
                            app.notice = None;
                            app.submit();
                        }
                        _ => {}
                    },
                }
            }
        }
    }

    Ok(())
}
