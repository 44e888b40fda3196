//! Fetch-with-fallback: one attempt at the remote API, an offline joke otherwise,
//! and a log row either way.

use std::time::Duration;

use rand::Rng;

use crate::api::{Transport, classify_response};
use crate::catalog::OfflineCatalog;
use crate::chaos::{ChaosOutcome, ChaosPolicy};
use crate::config::AdventureConfig;
use crate::error::FetchError;
use crate::filter::DenylistFilter;
use crate::joke::{Joke, Provenance};
use crate::log::{LogContext, LogRecord, LogSink};

/// Per-call knobs supplied by the shell's session.
#[derive(Clone, Debug)]
pub struct FetchRequest {
    pub timeout: Duration,
    pub chaos: ChaosPolicy,
    pub context: LogContext,
}

impl FetchRequest {
    /// Desktop request: the chaos probability doubles as the log context.
    pub fn desktop(timeout: Duration, chaos: ChaosPolicy) -> Self {
        Self { timeout, context: LogContext::Chaos(chaos.probability()), chaos }
    }

    /// Web request: no chaos, the session id goes in the log.
    pub fn web(timeout: Duration, session_id: impl Into<String>) -> Self {
        Self {
            timeout,
            chaos: ChaosPolicy::disabled(),
            context: LogContext::Session(session_id.into()),
        }
    }
}

/// Result of a fetch. `fallback` is `Some` whenever the joke came from the offline
/// catalog and records why.
#[derive(Clone, Debug)]
pub struct FetchOutcome {
    pub joke: Joke,
    pub fallback: Option<FetchError>,
    pub elapsed: Duration,
}

impl FetchOutcome {
    pub fn is_remote(&self) -> bool {
        self.fallback.is_none()
    }
}

pub struct JokeSource<T> {
    transport: T,
    endpoint: String,
    catalog: OfflineCatalog,
    filter: Option<DenylistFilter>,
}

impl<T: Transport> JokeSource<T> {
    pub fn new(transport: T, config: &AdventureConfig) -> Self {
        Self {
            transport,
            endpoint: config.endpoint.clone(),
            catalog: OfflineCatalog::default(),
            filter: None,
        }
    }

    /// Web variant: mask API jokes through `filter` before returning them.
    pub fn with_filter(mut self, filter: DenylistFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn catalog(&self) -> &OfflineCatalog {
        &self.catalog
    }

    /// Always yields a usable joke. Exactly one row is appended to `log`.
    pub fn fetch<R, L>(&self, request: &FetchRequest, rng: &mut R, log: &L) -> FetchOutcome
    where
        R: Rng + ?Sized,
        L: LogSink + ?Sized,
    {
        // wall clock via chrono: std's Instant is unavailable in the browser build
        let started = chrono::Utc::now();
        let result = self.try_remote(request, rng);

        let (joke, fallback) = match result {
            Ok(joke) => (joke, None),
            Err(err) => {
                tracing::debug!(error = %err, "falling back to offline joke");
                (self.catalog.pick(rng), Some(err))
            }
        };

        let success = joke.source() == Provenance::Api;
        log.record(&LogRecord::now(joke.source(), success, joke.char_len(), request.context.clone()));

        let elapsed = (chrono::Utc::now() - started).to_std().unwrap_or_default();
        tracing::debug!(source = %joke.source(), elapsed_ms = elapsed.as_millis() as u64, "joke ready");
        FetchOutcome { joke, fallback, elapsed }
    }

    fn try_remote<R: Rng + ?Sized>(&self, request: &FetchRequest, rng: &mut R) -> Result<Joke, FetchError> {
        match request.chaos.decide(rng) {
            ChaosOutcome::Proceed => {}
            ChaosOutcome::Delay(delay) => {
                tracing::debug!(delay_ms = delay.as_millis() as u64, "chaos: simulating slow network");
                std::thread::sleep(delay);
            }
            ChaosOutcome::Abort => return Err(FetchError::ChaosFailure),
        }

        let response = self.transport.get(&self.endpoint, request.timeout)?;
        let mut text = classify_response(&response)?;
        if let Some(filter) = &self.filter {
            text = filter.apply(&text);
        }
        Joke::from_api(text).ok_or_else(|| FetchError::MalformedResponse("blank joke".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RawResponse;
    use crate::log::{LogFlavor, SessionLog};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::Cell;

    struct Canned {
        reply: Result<RawResponse, FetchError>,
        calls: Cell<usize>,
    }

    impl Canned {
        fn new(reply: Result<RawResponse, FetchError>) -> Self {
            Self { reply, calls: Cell::new(0) }
        }
    }

    impl Transport for Canned {
        fn get(&self, _url: &str, _timeout: Duration) -> Result<RawResponse, FetchError> {
            self.calls.set(self.calls.get() + 1);
            self.reply.clone()
        }
    }

    fn setup(reply: Result<RawResponse, FetchError>) -> (JokeSource<Canned>, SessionLog, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let log = SessionLog::new(dir.path().join("session_log.csv"), LogFlavor::Desktop);
        (JokeSource::new(Canned::new(reply), &AdventureConfig::default()), log, dir)
    }

    #[test]
    fn chaos_abort_skips_network() {
        let (source, log, _dir) = setup(Ok(RawResponse::new(200, r#"{"joke":"remote"}"#)));
        let chaos = ChaosPolicy::with_probability(1.0).abort_share(1.0);
        let req = FetchRequest::desktop(Duration::from_secs(1), chaos);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..25 {
            let out = source.fetch(&req, &mut rng, &log);
            assert_eq!(out.joke.source(), Provenance::Offline);
            assert_eq!(out.fallback, Some(FetchError::ChaosFailure));
        }
        assert_eq!(source.transport.calls.get(), 0);
    }

    #[test]
    fn chaos_delay_still_tries_network() {
        let (source, log, _dir) = setup(Ok(RawResponse::new(200, r#"{"joke":"remote"}"#)));
        let chaos = ChaosPolicy::with_probability(1.0).abort_share(0.0).delay(Duration::from_millis(1));
        let req = FetchRequest::desktop(Duration::from_secs(1), chaos);
        let out = source.fetch(&req, &mut StdRng::seed_from_u64(3), &log);
        assert!(out.is_remote());
        assert_eq!(out.joke.text(), "remote");
        assert_eq!(source.transport.calls.get(), 1);
    }

    #[test]
    fn filter_applies_to_api_jokes_only() {
        let (source, log, _dir) = setup(Ok(RawResponse::new(200, r#"{"joke":"silly goose"}"#)));
        let source = source.with_filter(DenylistFilter::new(["goose"]));
        let out = source.fetch(&FetchRequest::web(Duration::from_secs(1), "web-1"), &mut StdRng::seed_from_u64(1), &log);
        assert_eq!(out.joke.text(), "silly ★★★★★");
    }

    #[test]
    fn filtered_to_nothing_is_never_blank() {
        // masking keeps length, so a non-blank joke stays non-blank
        let (source, log, _dir) = setup(Ok(RawResponse::new(200, r#"{"joke":"boo"}"#)));
        let source = source.with_filter(DenylistFilter::new(["boo"]));
        let out = source.fetch(&FetchRequest::web(Duration::from_secs(1), "web-1"), &mut StdRng::seed_from_u64(1), &log);
        assert_eq!(out.joke.text(), "★★★");
    }

    #[test]
    fn every_fetch_logs_one_row() {
        let (source, log, _dir) = setup(Err(FetchError::Timeout));
        let req = FetchRequest::desktop(Duration::from_secs(1), ChaosPolicy::disabled());
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..4 {
            source.fetch(&req, &mut rng, &log);
        }
        let text = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(text.lines().count(), 5);
        assert!(text.lines().skip(1).all(|l| l.contains(",offline,false,")));
    }
}
