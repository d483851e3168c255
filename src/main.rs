use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    time::Duration,
};

use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use env_logger::{Env, Target};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use reflex::{
    app::{App, Control, HISTORY_LIMIT},
    app_dirs::AppDirs,
    clock::{Clock, MonotonicClock},
    config::{Config, ConfigStore, FileConfigStore},
    games::{registry, GameId},
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner},
    score_log::ScoreLog,
    stats::{open_default_store, ScoreDb, ScoreStore},
    ui::{history::history_lines, screen::draw},
};

const TICK_RATE_MS: u64 = 50;

/// reaction-time and cognitive mini-games for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Reaction-time and cognitive mini-games for the terminal. Every session is rated against a benchmark table and kept in a local score history."
)]
pub struct Cli {
    /// game to play (defaults to the last one played)
    #[clap(value_enum)]
    game: Option<GameId>,

    /// number of rounds to play
    #[clap(short = 'r', long)]
    rounds: Option<u32>,

    /// number of seconds to play for
    #[clap(short = 's', long)]
    secs: Option<u64>,

    /// seed for reproducible rounds
    #[clap(long)]
    seed: Option<u64>,

    /// list the available games and exit
    #[clap(long)]
    list: bool,

    /// print recent sessions and exit
    #[clap(long)]
    history: bool,
}

impl Cli {
    /// Layer command line flags over the saved preferences
    fn apply(&self, mut config: Config) -> Config {
        if let Some(game) = self.game {
            config.game = game;
        }
        if self.rounds.is_some() {
            config.rounds = self.rounds;
        }
        if self.secs.is_some() {
            config.number_of_secs = self.secs;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    if cli.list {
        for line in game_list() {
            println!("{line}");
        }
        return Ok(());
    }

    if cli.history {
        let db = ScoreDb::new()?;
        let records = db.recent(None, HISTORY_LIMIT)?;
        if records.is_empty() {
            println!("no sessions recorded yet");
        }
        for line in history_lines(&records, Local::now()) {
            println!("{line}");
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());
    let mut app = App::new(
        config.game,
        config.overrides(),
        open_default_store(),
        ScoreLog::new(),
    )?;
    if let Err(e) = config_store.save(&config) {
        log::warn!("could not save preferences: {e}");
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app, MonotonicClock::new());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    res
}

/// Send log output to the state dir; the terminal belongs to the UI
fn init_logging() {
    let Some(path) = AppDirs::log_file_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init();
}

fn game_list() -> Vec<String> {
    registry()
        .into_iter()
        .map(|info| format!("{:<10}{} - {}", info.id.to_string(), info.name, info.description))
        .collect()
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    clock: MonotonicClock,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(clock),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    app.start(clock.now());

    loop {
        terminal.draw(|f| draw(app, f))?;

        let wait = app
            .session
            .next_deadline()
            .map(|deadline| Duration::from_millis(deadline.saturating_sub(clock.now())));
        match runner.step_within(wait) {
            GameEvent::Tick | GameEvent::Resize => app.on_tick(clock.now()),
            GameEvent::Key { key, at } => {
                // settle timers up to the key press before judging it
                app.on_tick(at);
                if app.on_key(key, at) == Control::Quit {
                    break;
                }
            }
        }
    }

    Ok(())
}
