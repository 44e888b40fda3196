//! Browser shell exports.
//!
//! The page does the HTTP fetch with JS and hands the status and body to
//! [`WebShell::pop`], which runs them through the same [`JokeSource`] fallback and
//! session logging as the desktop build. Results cross the boundary as JSON.

use std::cell::RefCell;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::api::Prefetched;
use crate::config::AdventureConfig;
use crate::filter::DenylistFilter;
use crate::joke::Joke;
use crate::log::{LogFlavor, MemoryLog};
use crate::narrator::ReplayGuard;
use crate::session::{WebSession, palette};
use crate::source::JokeSource;
use crate::stats::{LogRow, SessionStats};
use crate::wrap::wrap_chars;

const RECENT_ROWS: usize = 10;

thread_local! {
    static REPLAY_GUARD: RefCell<ReplayGuard> = RefCell::new(ReplayGuard::default());
}

#[derive(Serialize)]
struct PopView<'a> {
    joke: &'a Joke,
    caption: &'a str,
    fallback: Option<String>,
    plays: u64,
    session_id: &'a str,
    balloon_color: &'a str,
    palette: Option<[&'static str; 3]>,
}

#[derive(Serialize)]
struct StatsView<'a> {
    total: usize,
    api_success_rate: f64,
    average_joke_len: f64,
    recent: &'a [LogRow],
}

/// One visitor's tab: session state, its in-memory log and the denylist.
#[wasm_bindgen]
pub struct WebShell {
    session: WebSession,
    log: MemoryLog,
    filter: DenylistFilter,
    config: AdventureConfig,
}

impl Default for WebShell {
    fn default() -> Self {
        Self {
            session: WebSession::new(&mut rand::thread_rng()),
            log: MemoryLog::new(LogFlavor::Web),
            filter: DenylistFilter::default(),
            config: AdventureConfig::default(),
        }
    }
}

#[wasm_bindgen]
impl WebShell {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebShell {
        WebShell::default()
    }

    /// Mask `word` in API jokes from the next pop on.
    pub fn add_denylist_word(&mut self, word: &str) -> bool {
        self.filter.insert(word)
    }

    /// Balloon popped with the page's fetch result. Always yields a joke and
    /// appends one `session_id` row to the log.
    pub fn pop(&mut self, status: u16, body: &str) -> String {
        let source = JokeSource::new(Prefetched::new(status, body), &self.config).with_filter(self.filter.clone());
        let result = self.session.pop(&source, self.config.timeout, &mut rand::thread_rng(), &self.log);
        let color = self.session.balloon_color();
        let view = PopView {
            joke: &result.outcome.joke,
            caption: &result.caption,
            fallback: result.outcome.fallback.as_ref().map(ToString::to_string),
            plays: self.session.plays(),
            session_id: self.session.session_id(),
            balloon_color: color,
            palette: palette(color),
        };
        serde_json::to_string(&view).unwrap_or_default()
    }

    /// Narration the page synthesized for the last joke. False when nothing was queued.
    pub fn attach_audio(&mut self, mime: &str, audio: &[u8]) -> bool {
        self.session.attach_audio(mime, audio).is_some()
    }

    /// Pending cue as `{"seq":N,"data_url":"..."}`, handed out once.
    pub fn take_cue(&mut self) -> Option<String> {
        let cue = self.session.take_cue()?;
        serde_json::to_string(&cue).ok()
    }

    pub fn set_tts(&mut self, on: bool) {
        self.session.set_tts(on);
    }

    pub fn tts_on(&self) -> bool {
        self.session.tts_on()
    }

    pub fn plays(&self) -> u64 {
        self.session.plays()
    }

    pub fn session_id(&self) -> String {
        self.session.session_id().to_owned()
    }

    /// CSV lines logged since the last call, header included the first time.
    pub fn drain_log(&mut self) -> String {
        self.log.drain()
    }

    /// The whole session log as CSV.
    pub fn log_csv(&self) -> String {
        self.log.contents()
    }

    /// Parent panel numbers for this tab's session.
    pub fn stats(&self) -> String {
        let stats = SessionStats::parse(&self.log.contents());
        let view = StatsView {
            total: stats.total(),
            api_success_rate: stats.api_success_rate(),
            average_joke_len: stats.average_joke_len(),
            recent: stats.tail(RECENT_ROWS),
        };
        serde_json::to_string(&view).unwrap_or_default()
    }
}

/// Greedy wrap by character count, lines joined with `\n`.
#[wasm_bindgen]
pub fn wrap_text(text: &str, max_chars: usize) -> String {
    wrap_chars(text, max_chars).join("\n")
}

/// Play a narration cue unless this `seq` was already played.
/// Returns whether playback was started. Autoplay refusals are swallowed.
#[wasm_bindgen]
pub fn play_cue(seq: u64, data_url: &str) -> bool {
    let fresh = REPLAY_GUARD.with(|g| g.borrow_mut().should_play(seq));
    if !fresh {
        return false;
    }
    let Ok(audio) = web_sys::HtmlAudioElement::new_with_src(data_url) else {
        return false;
    };
    match audio.play() {
        Ok(promise) => {
            let ignore = Closure::wrap(Box::new(|_: JsValue| {}) as Box<dyn FnMut(JsValue)>);
            let _ = promise.catch(&ignore);
            ignore.forget();
            true
        }
        Err(_) => false,
    }
}
