//! Desktop shell: a terminal event loop over the joke core.
//!
//! Keys are read one per line (SPACE / empty line, Q or ESC, M, D, F). Drawing is
//! plain text; the window size flags only decide how wide the joke panel wraps.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    desktop::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod desktop {
    use std::io::{self, BufRead, Write};

    use clap::Parser;
    use joke_adventure::config::{DEFAULT_LOG_PATH, SAFE_API_URL};
    use joke_adventure::narrator::detect_narrator;
    use joke_adventure::session::{Control, TITLE};
    use joke_adventure::{
        AdventureConfig, ChaosPolicy, HttpTransport, JokeSource, Key, LogFlavor, SessionContext, SessionLog, wrap_chars,
    };
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    // Panel geometry in "pixels", mirrored from the windowed layout.
    const MARGIN: u32 = 40;
    const PANEL_PADDING: u32 = 40;
    const PIXELS_PER_COLUMN: u32 = 10;
    const MIN_COLUMNS: usize = 20;
    const FULLSCREEN_COLUMNS: usize = 100;

    /// Funny Joke Adventure (Desktop)
    #[derive(Parser, Debug)]
    #[command(name = "joke-adventure")]
    #[command(about = "Funny Joke Adventure - kid-friendly, replayable joke game", long_about = None)]
    #[command(version)]
    struct Cli {
        /// Probability [0..1] to simulate failure/delay per fetch
        #[arg(long, env = "JOKE_ADVENTURE_CHAOS", default_value_t = 0.0)]
        chaos: f64,

        /// Start in fullscreen
        #[arg(long)]
        fullscreen: bool,

        /// Start with text-to-speech ON (requires a local TTS program)
        #[arg(long, env = "JOKE_ADVENTURE_TTS")]
        tts: bool,

        #[arg(long, default_value_t = 800)]
        width: u32,

        #[arg(long, default_value_t = 600)]
        height: u32,

        /// Session log CSV path
        #[arg(long, env = "JOKE_ADVENTURE_LOG_FILE", default_value = DEFAULT_LOG_PATH)]
        log_file: String,

        /// Joke API endpoint
        #[arg(long, env = "JOKE_ADVENTURE_ENDPOINT", default_value = SAFE_API_URL)]
        endpoint: String,

        /// Request timeout in seconds
        #[arg(long, env = "JOKE_ADVENTURE_TIMEOUT", default_value_t = 5.0)]
        timeout: f64,

        /// Log level (overridden by RUST_LOG)
        #[arg(long, env = "JOKE_ADVENTURE_LOG_LEVEL", default_value = "warn")]
        log_level: String,
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let cli = Cli::parse();

        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();

        let config = AdventureConfig::default()
            .with_endpoint(&cli.endpoint)
            .with_log_path(&cli.log_file)
            .with_timeout_secs(cli.timeout);
        tracing::info!(
            endpoint = %config.endpoint,
            log = %config.log_path.display(),
            width = cli.width,
            height = cli.height,
            "starting"
        );

        let source = JokeSource::new(HttpTransport::new(), &config);
        let log = SessionLog::new(&config.log_path, LogFlavor::Desktop);
        let narrator = detect_narrator();
        let chaos = ChaosPolicy::with_probability(cli.chaos).delay(config.chaos_delay);
        let mut session = SessionContext::new(chaos, config.timeout, cli.tts, narrator.is_available(), cli.fullscreen);
        let mut rng = rand::thread_rng();

        let stdin = io::stdin();
        let mut stdout = io::stdout().lock();
        draw(&mut stdout, &session, &cli)?;

        let mut line = String::new();
        loop {
            line.clear();
            // EOF behaves like closing the window
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }
            let key = Key::from_input(&line);
            if session.handle(key, &source, &mut rng, &log, &*narrator) == Control::Quit {
                break;
            }
            draw(&mut stdout, &session, &cli)?;
        }
        Ok(())
    }

    fn panel_columns(session: &SessionContext, cli: &Cli) -> usize {
        if session.fullscreen() {
            return FULLSCREEN_COLUMNS;
        }
        let text_px = cli.width.saturating_sub(2 * MARGIN + PANEL_PADDING);
        ((text_px / PIXELS_PER_COLUMN) as usize).max(MIN_COLUMNS)
    }

    fn draw(out: &mut impl Write, session: &SessionContext, cli: &Cli) -> io::Result<()> {
        let columns = panel_columns(session, cli);
        let border = "-".repeat(columns + 4);
        writeln!(out)?;
        writeln!(out, "{TITLE:^width$}", width = columns + 6)?;
        writeln!(out, "+{border}+")?;
        for line in wrap_chars(session.current_joke(), columns) {
            writeln!(out, "|  {line:^columns$}  |")?;
        }
        writeln!(out, "+{border}+")?;
        writeln!(out, "{}", session.status_line())?;
        write!(out, "> ")?;
        out.flush()
    }
}
