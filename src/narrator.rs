//! Optional text-to-speech.
//!
//! Speech is cosmetic. Every backend degrades to silence: a missing program, a
//! failed spawn or a synthesis error is logged and dropped, never returned to the
//! shell.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::error::SpeechError;

/// Words per minute for on-device voices.
pub const SPEECH_RATE: u32 = 160;

/// Speak-and-forget capability chosen once at startup.
pub trait Narrator {
    fn speak(&self, text: &str);

    fn is_available(&self) -> bool {
        true
    }
}

/// Used when no speech backend exists or narration is unwanted.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentNarrator;

impl Narrator for SilentNarrator {
    fn speak(&self, _text: &str) {}

    fn is_available(&self) -> bool {
        false
    }
}

// --- On-device synthesis (desktop) ------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Voice {
    EspeakNg,
    Espeak,
    Say,
    SpdSay,
}

impl Voice {
    const ALL: [Voice; 4] = [Voice::EspeakNg, Voice::Espeak, Voice::Say, Voice::SpdSay];

    fn program(&self) -> &'static str {
        match self {
            Voice::EspeakNg => "espeak-ng",
            Voice::Espeak => "espeak",
            Voice::Say => "say",
            Voice::SpdSay => "spd-say",
        }
    }

    fn command(&self, program: &Path, text: &str) -> Command {
        let mut cmd = Command::new(program);
        match self {
            Voice::EspeakNg | Voice::Espeak => {
                cmd.arg("-s").arg(SPEECH_RATE.to_string());
            }
            Voice::Say => {
                cmd.arg("-r").arg(SPEECH_RATE.to_string());
            }
            // spd-say has a relative -100..100 rate scale; default is fine
            Voice::SpdSay => {}
        }
        // leading dash in a joke must not look like a flag
        cmd.arg("--").arg(text);
        cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
        cmd
    }
}

/// Speaks through a local TTS program. A new utterance stops the previous one.
#[derive(Debug)]
pub struct CommandNarrator {
    voice: Voice,
    program: PathBuf,
    current: Mutex<Option<Child>>,
}

impl CommandNarrator {
    /// First installed backend on `PATH`, if any.
    pub fn detect() -> Option<Self> {
        Voice::ALL.iter().find_map(|voice| {
            find_on_path(voice.program()).map(|program| Self { voice: *voice, program, current: Mutex::new(None) })
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn stop(&self) {
        let mut current = self.current.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(mut child) = current.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn try_speak(&self, text: &str) -> Result<(), SpeechError> {
        self.stop();
        let child = self.voice.command(&self.program, text).spawn()?;
        *self.current.lock().unwrap_or_else(|p| p.into_inner()) = Some(child);
        Ok(())
    }
}

impl Narrator for CommandNarrator {
    fn speak(&self, text: &str) {
        if let Err(err) = self.try_speak(text) {
            tracing::warn!(program = %self.program.display(), error = %err, "narration skipped");
        }
    }
}

impl Drop for CommandNarrator {
    fn drop(&mut self) {
        self.stop();
    }
}

/// On-device narrator when one is installed, silence otherwise.
pub fn detect_narrator() -> Box<dyn Narrator> {
    match CommandNarrator::detect() {
        Some(narrator) => {
            tracing::info!(program = %narrator.program().display(), "text-to-speech available");
            Box::new(narrator)
        }
        None => {
            tracing::info!("no text-to-speech backend found; narration disabled");
            Box::new(SilentNarrator)
        }
    }
}

fn find_on_path(program: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

// --- Server-side synthesis (web) --------------------------------------------

/// Turns text into an audio buffer the browser can play.
pub trait Synthesizer {
    /// MIME type of the produced audio.
    fn mime(&self) -> &'static str;

    fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, SpeechError>;
}

/// Always unavailable.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSynthesizer;

impl Synthesizer for NoSynthesizer {
    fn mime(&self) -> &'static str {
        "audio/wav"
    }

    fn synthesize(&self, _text: &str, _lang: &str) -> Result<Vec<u8>, SpeechError> {
        Err(SpeechError::Unavailable)
    }
}

/// `espeak --stdout`, which writes a WAV file to stdout.
#[derive(Clone, Debug)]
pub struct CommandSynthesizer {
    program: PathBuf,
}

impl CommandSynthesizer {
    pub fn detect() -> Option<Self> {
        find_on_path("espeak-ng")
            .or_else(|| find_on_path("espeak"))
            .map(|program| Self { program })
    }
}

impl Synthesizer for CommandSynthesizer {
    fn mime(&self) -> &'static str {
        "audio/wav"
    }

    fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, SpeechError> {
        let output = Command::new(&self.program)
            .arg("--stdout")
            .arg("-v")
            .arg(lang)
            .arg("-s")
            .arg(SPEECH_RATE.to_string())
            .arg("--")
            .arg(text)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()?;
        if !output.status.success() {
            return Err(SpeechError::Backend(format!("{} exited with {}", self.program.display(), output.status)));
        }
        if output.stdout.is_empty() {
            return Err(SpeechError::Backend("no audio produced".into()));
        }
        Ok(output.stdout)
    }
}

/// One synthesized utterance, tagged so the client plays it exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AudioCue {
    pub seq: u64,
    pub data_url: String,
}

impl AudioCue {
    pub fn new(seq: u64, mime: &str, audio: &[u8]) -> Self {
        // the fragment makes every cue a distinct URL, so the browser never serves a cached clip
        let data_url = format!("data:{mime};base64,{}#seq={seq}", STANDARD.encode(audio));
        Self { seq, data_url }
    }
}

/// Client-side memory of the last cue played. Re-renders that present the same
/// cue again are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReplayGuard {
    last_played: Option<u64>,
}

impl ReplayGuard {
    /// True at most once per `seq`, and never for a `seq` older than one already played.
    pub fn should_play(&mut self, seq: u64) -> bool {
        match self.last_played {
            Some(last) if seq <= last => false,
            _ => {
                self.last_played = Some(seq);
                true
            }
        }
    }
}
