//! Funny Joke Adventure core crate.
//!
//! Kid-safe joke fetching with an offline fallback, shared by the desktop shell
//! (`src/main.rs`) and the browser shell (the `#[wasm_bindgen]` exports in [`web`]).
//! Every fetch yields a joke and a session log row; network trouble, chaos mode and
//! missing speech backends only ever change *which* joke, never whether there is one.

use wasm_bindgen::prelude::*;

pub mod api;
pub mod catalog;
pub mod chaos;
pub mod config;
pub mod error;
pub mod filter;
pub mod joke;
pub mod log;
pub mod narrator;
pub mod session;
pub mod source;
pub mod stats;
pub mod web;
pub mod wrap;

pub use api::{Prefetched, RawResponse, Transport, classify_response};
pub use catalog::{OFFLINE_JOKES, OfflineCatalog};
pub use chaos::{ChaosOutcome, ChaosPolicy};
pub use config::AdventureConfig;
pub use error::{FetchError, LogError, SpeechError};
pub use filter::DenylistFilter;
pub use joke::{Joke, Provenance};
pub use log::{LogContext, LogFlavor, LogRecord, LogSink, MemoryLog, SessionLog};
pub use narrator::{AudioCue, Narrator, ReplayGuard, SilentNarrator, Synthesizer};
pub use session::{Key, SessionContext, WebSession};
pub use source::{FetchOutcome, FetchRequest, JokeSource};
pub use web::WebShell;
pub use wrap::{wrap, wrap_chars};

#[cfg(not(target_arch = "wasm32"))]
pub use api::HttpTransport;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
