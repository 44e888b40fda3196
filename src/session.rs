//! Shell-owned session state.
//!
//! Both shells keep a small context object and pass it explicitly into every
//! fetch / speak call. Nothing here renders; the shells read these fields to draw.

use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::api::Transport;
use crate::chaos::ChaosPolicy;
use crate::joke::Provenance;
use crate::log::LogSink;
use crate::narrator::{AudioCue, Narrator, Synthesizer};
use crate::source::{FetchOutcome, FetchRequest, JokeSource};

pub const TITLE: &str = "Funny Joke Adventure!";
pub const FIRST_PROMPT: &str = "Press SPACE for your first adventure!";

// --- Desktop ------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Space,
    Escape,
    Q,
    M,
    D,
    F,
    Other,
}

impl Key {
    /// Terminal input: one key per line, an empty line counts as SPACE.
    pub fn from_input(line: &str) -> Key {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Key::Space;
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "space" => Key::Space,
            "\u{1b}" | "esc" | "escape" => Key::Escape,
            "q" | "quit" => Key::Q,
            "m" => Key::M,
            "d" => Key::D,
            "f" => Key::F,
            _ => Key::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    FetchJoke,
    Quit,
    ToggleNarration,
    ToggleChaos,
    ToggleFullscreen,
    Ignore,
}

impl From<Key> for Action {
    fn from(key: Key) -> Self {
        match key {
            Key::Space => Action::FetchJoke,
            Key::Escape | Key::Q => Action::Quit,
            Key::M => Action::ToggleNarration,
            Key::D => Action::ToggleChaos,
            Key::F => Action::ToggleFullscreen,
            Key::Other => Action::Ignore,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Desktop session: toggles plus the joke currently on screen.
#[derive(Debug)]
pub struct SessionContext {
    chaos: ChaosPolicy,
    timeout: Duration,
    narration_on: bool,
    narration_available: bool,
    fullscreen: bool,
    plays: u64,
    current_joke: String,
    last_source: Provenance,
}

impl SessionContext {
    /// `narration_requested` only sticks when a backend is available.
    pub fn new(chaos: ChaosPolicy, timeout: Duration, narration_requested: bool, narration_available: bool, fullscreen: bool) -> Self {
        Self {
            chaos,
            timeout,
            narration_on: narration_requested && narration_available,
            narration_available,
            fullscreen,
            plays: 0,
            current_joke: FIRST_PROMPT.to_owned(),
            last_source: Provenance::Offline,
        }
    }

    pub fn chaos(&self) -> ChaosPolicy {
        self.chaos
    }

    pub fn narration_on(&self) -> bool {
        self.narration_on
    }

    pub fn fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn plays(&self) -> u64 {
        self.plays
    }

    pub fn current_joke(&self) -> &str {
        &self.current_joke
    }

    pub fn last_source(&self) -> Provenance {
        self.last_source
    }

    pub fn handle<T, R, L>(
        &mut self,
        key: Key,
        source: &JokeSource<T>,
        rng: &mut R,
        log: &L,
        narrator: &dyn Narrator,
    ) -> Control
    where
        T: Transport,
        R: Rng + ?Sized,
        L: LogSink + ?Sized,
    {
        match Action::from(key) {
            Action::FetchJoke => {
                let request = FetchRequest::desktop(self.timeout, self.chaos);
                let outcome = source.fetch(&request, rng, log);
                self.show(outcome);
                if self.narration_on {
                    narrator.speak(&self.current_joke);
                }
            }
            Action::Quit => return Control::Quit,
            Action::ToggleNarration => {
                if self.narration_available {
                    self.narration_on = !self.narration_on;
                }
            }
            Action::ToggleChaos => self.chaos = self.chaos.toggled(),
            Action::ToggleFullscreen => self.fullscreen = !self.fullscreen,
            Action::Ignore => {}
        }
        Control::Continue
    }

    fn show(&mut self, outcome: FetchOutcome) {
        self.last_source = outcome.joke.source();
        self.current_joke = outcome.joke.into_text();
        self.plays += 1;
    }

    pub fn status_line(&self) -> String {
        format!(
            "Press SPACE for more fun!  (M: voice {}  D: chaos {}  Source: {})",
            on_off(self.narration_on),
            on_off(self.chaos.is_enabled()),
            self.last_source.label()
        )
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "ON" } else { "OFF" }
}

// --- Web ------------------------------------------------------------------------

/// Balloon button colours: name and three gradient stops.
pub const BALLOON_PALETTES: [(&str, [&str; 3]); 7] = [
    ("red", ["#FF3B30", "#FF6B6B", "#FF8C00"]),
    ("blue", ["#4D9EFF", "#2D6BFF", "#0047FF"]),
    ("green", ["#21C55D", "#16A34A", "#0E7A36"]),
    ("purple", ["#A78BFA", "#7C3AED", "#5B21B6"]),
    ("pink", ["#FF7EB3", "#FF4D6D", "#E6398A"]),
    ("teal", ["#2DD4BF", "#14B8A6", "#0D9488"]),
    ("gold", ["#FFD54F", "#FFB300", "#FF8F00"]),
];

fn random_palette<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    BALLOON_PALETTES.choose(rng).map(|(name, _)| *name).unwrap_or("blue")
}

pub fn palette(name: &str) -> Option<[&'static str; 3]> {
    BALLOON_PALETTES.iter().find(|(n, _)| *n == name).map(|(_, stops)| *stops)
}

/// What the page shows after a pop.
#[derive(Clone, Debug)]
pub struct PopResult {
    pub outcome: FetchOutcome,
    pub caption: String,
}

/// One browser session. Lives only as long as the visitor's tab.
#[derive(Clone, Debug)]
pub struct WebSession {
    plays: u64,
    session_id: String,
    last_joke: Option<String>,
    tts_on: bool,
    balloon_color: &'static str,
    audio_seq: u64,
    pending: Option<AudioCue>,
}

impl WebSession {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_session_id(format!("web-{}", chrono::Utc::now().timestamp()), rng)
    }

    pub fn with_session_id<R: Rng + ?Sized>(session_id: impl Into<String>, rng: &mut R) -> Self {
        Self {
            plays: 0,
            session_id: session_id.into(),
            last_joke: None,
            tts_on: true,
            balloon_color: random_palette(rng),
            audio_seq: 0,
            pending: None,
        }
    }

    pub fn plays(&self) -> u64 {
        self.plays
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn last_joke(&self) -> Option<&str> {
        self.last_joke.as_deref()
    }

    pub fn tts_on(&self) -> bool {
        self.tts_on
    }

    pub fn set_tts(&mut self, on: bool) {
        self.tts_on = on;
    }

    pub fn balloon_color(&self) -> &'static str {
        self.balloon_color
    }

    pub fn audio_seq(&self) -> u64 {
        self.audio_seq
    }

    /// Balloon popped: fetch, count and recolour. Any cue queued for an earlier joke
    /// is dropped; narration for this one is attached afterwards.
    pub fn pop<T, R, L>(&mut self, source: &JokeSource<T>, timeout: Duration, rng: &mut R, log: &L) -> PopResult
    where
        T: Transport,
        R: Rng + ?Sized,
        L: LogSink + ?Sized,
    {
        let request = FetchRequest::web(timeout, self.session_id.clone());
        let outcome = source.fetch(&request, rng, log);
        self.last_joke = Some(outcome.joke.text().to_owned());
        self.plays += 1;
        self.balloon_color = random_palette(rng);
        self.pending = None;

        let caption = format!(
            "Loaded in {:.2}s • Source: {}",
            outcome.elapsed.as_secs_f64(),
            outcome.joke.source().label()
        );
        PopResult { outcome, caption }
    }

    /// Synthesize the last joke and queue it. Failures leave nothing queued.
    pub fn narrate(&mut self, synthesizer: &dyn Synthesizer) -> Option<&AudioCue> {
        if !self.tts_on {
            return None;
        }
        let text = self.last_joke.as_deref()?;
        match synthesizer.synthesize(text, "en") {
            Ok(audio) => self.attach_audio(synthesizer.mime(), &audio),
            Err(err) => {
                tracing::warn!(error = %err, "narration skipped");
                None
            }
        }
    }

    /// Queue audio the host produced for the last joke (the browser synthesizes
    /// on its side). Ignored while TTS is off or before the first pop.
    pub fn attach_audio(&mut self, mime: &str, audio: &[u8]) -> Option<&AudioCue> {
        if !self.tts_on || self.last_joke.is_none() || audio.is_empty() {
            return None;
        }
        self.audio_seq += 1;
        self.pending = Some(AudioCue::new(self.audio_seq, mime, audio));
        self.pending.as_ref()
    }

    /// Cue to autoplay on this render. Handed out once; later renders get `None`.
    pub fn take_cue(&mut self) -> Option<AudioCue> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_input_maps_to_keys() {
        assert_eq!(Key::from_input("\n"), Key::Space);
        assert_eq!(Key::from_input(" "), Key::Space);
        assert_eq!(Key::from_input("Q"), Key::Q);
        assert_eq!(Key::from_input("esc"), Key::Escape);
        assert_eq!(Key::from_input("\u{1b}\n"), Key::Escape);
        assert_eq!(Key::from_input("m"), Key::M);
        assert_eq!(Key::from_input("D"), Key::D);
        assert_eq!(Key::from_input("f\r\n"), Key::F);
        assert_eq!(Key::from_input("x"), Key::Other);
    }

    #[test]
    fn any_blank_line_is_space() {
        for line in ["  \n", "\t\n", " \t \r\n", ""] {
            assert_eq!(Key::from_input(line), Key::Space, "{line:?}");
        }
        assert_eq!(Key::from_input("  q  \n"), Key::Q);
    }

    #[test]
    fn audio_needs_a_joke_and_tts() {
        let mut rng = rand::rngs::mock::StepRng::new(0, 1);
        let mut web = WebSession::with_session_id("web-1", &mut rng);
        assert!(web.attach_audio("audio/wav", b"RIFF").is_none());

        web.last_joke = Some("knock knock".into());
        assert_eq!(web.attach_audio("audio/wav", b"RIFF").map(|c| c.seq), Some(1));
        assert_eq!(web.attach_audio("audio/wav", b"RIFF").map(|c| c.seq), Some(2));
        assert_eq!(web.take_cue().map(|c| c.seq), Some(2));

        web.set_tts(false);
        assert!(web.attach_audio("audio/wav", b"RIFF").is_none());
        assert!(web.take_cue().is_none());
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(Action::from(Key::Space), Action::FetchJoke);
        assert_eq!(Action::from(Key::Escape), Action::Quit);
        assert_eq!(Action::from(Key::Q), Action::Quit);
        assert_eq!(Action::from(Key::M), Action::ToggleNarration);
        assert_eq!(Action::from(Key::D), Action::ToggleChaos);
        assert_eq!(Action::from(Key::F), Action::ToggleFullscreen);
        assert_eq!(Action::from(Key::Other), Action::Ignore);
    }

    #[test]
    fn narration_requires_backend() {
        let s = SessionContext::new(ChaosPolicy::disabled(), Duration::from_secs(5), true, false, false);
        assert!(!s.narration_on());
        let s = SessionContext::new(ChaosPolicy::disabled(), Duration::from_secs(5), true, true, false);
        assert!(s.narration_on());
    }

    #[test]
    fn status_line_reflects_toggles() {
        let s = SessionContext::new(ChaosPolicy::with_probability(0.2), Duration::from_secs(5), false, true, false);
        assert_eq!(s.status_line(), "Press SPACE for more fun!  (M: voice OFF  D: chaos ON  Source: OFFLINE)");
        assert_eq!(s.current_joke(), FIRST_PROMPT);
    }

    #[test]
    fn palettes_resolve_by_name() {
        assert_eq!(palette("gold"), Some(["#FFD54F", "#FFB300", "#FF8F00"]));
        assert!(palette("plaid").is_none());
    }
}
