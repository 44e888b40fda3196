//! Remote joke API access.
//!
//! The network is hidden behind [`Transport`] so the fallback rules in
//! [`classify_response`] can be exercised without a server. Native builds use
//! [`HttpTransport`] (blocking reqwest); the browser shell fetches with JS and wraps
//! the status/body in [`Prefetched`].

use std::time::Duration;

use serde_json::Value;

use crate::error::FetchError;

/// Status + body of a completed HTTP exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }
}

/// One blocking GET. Implementations map their own failures onto
/// [`FetchError::Network`] / [`FetchError::Timeout`].
pub trait Transport {
    fn get(&self, url: &str, timeout: Duration) -> Result<RawResponse, FetchError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str, timeout: Duration) -> Result<RawResponse, FetchError> {
        (**self).get(url, timeout)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get(&self, url: &str, timeout: Duration) -> Result<RawResponse, FetchError> {
        (**self).get(url, timeout)
    }
}

/// A response the host already received. The browser shell fetches with JS and
/// replays the result through the same fallback and logging path as desktop.
#[derive(Clone, Debug)]
pub struct Prefetched(RawResponse);

impl Prefetched {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self(RawResponse::new(status, body))
    }
}

impl Transport for Prefetched {
    fn get(&self, _url: &str, _timeout: Duration) -> Result<RawResponse, FetchError> {
        Ok(self.0.clone())
    }
}

/// Pulls the joke text out of a response, or says why it can't.
///
/// Anything other than a 2xx JSON object with a non-blank string `joke` field is
/// rejected; there is no partial success.
pub fn classify_response(response: &RawResponse) -> Result<String, FetchError> {
    if !(200..300).contains(&response.status) {
        return Err(FetchError::Status(response.status));
    }
    let data: Value = serde_json::from_str(&response.body)
        .map_err(|e| FetchError::MalformedResponse(format!("invalid JSON: {e}")))?;
    match data.get("joke") {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.clone()),
        Some(Value::String(_)) => Err(FetchError::MalformedResponse("blank joke".into())),
        Some(_) => Err(FetchError::MalformedResponse("joke is not a string".into())),
        None => Err(FetchError::MalformedResponse("missing joke field".into())),
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::HttpTransport;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::Duration;

    use reqwest::blocking::Client;

    use super::{RawResponse, Transport};
    use crate::error::FetchError;

    /// Blocking reqwest client. The per-request timeout comes from the caller.
    #[derive(Clone, Debug, Default)]
    pub struct HttpTransport {
        client: Client,
    }

    impl HttpTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_client(client: Client) -> Self {
            Self { client }
        }
    }

    impl Transport for HttpTransport {
        fn get(&self, url: &str, timeout: Duration) -> Result<RawResponse, FetchError> {
            let response = self
                .client
                .get(url)
                .header(reqwest::header::ACCEPT, "application/json")
                .timeout(timeout)
                .send()
                .map_err(map_reqwest_error)?;
            let status = response.status().as_u16();
            let body = response.text().map_err(map_reqwest_error)?;
            Ok(RawResponse { status, body })
        }
    }

    fn map_reqwest_error(err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(err.to_string())
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(body: &str) -> RawResponse {
        RawResponse::new(200, body)
    }

    #[test]
    fn accepts_string_joke() {
        let r = ok(r#"{"error":false,"type":"single","joke":"Why did the chicken cross the road?","safe":true}"#);
        assert_eq!(classify_response(&r).unwrap(), "Why did the chicken cross the road?");
    }

    #[test]
    fn prefetched_replays_the_host_response() {
        let t = Prefetched::new(503, "busy");
        assert_eq!(t.get("ignored", Duration::from_secs(1)), Ok(RawResponse::new(503, "busy")));
    }

    #[test]
    fn rejects_non_2xx() {
        let r = RawResponse::new(500, r#"{"joke":"fine"}"#);
        assert_eq!(classify_response(&r), Err(FetchError::Status(500)));
        let r = RawResponse::new(302, "");
        assert_eq!(classify_response(&r), Err(FetchError::Status(302)));
    }

    #[test]
    fn rejects_bad_shapes() {
        for body in [
            r#"{"joke":123}"#,
            r#"{"joke":""}"#,
            r#"{"joke":"   "}"#,
            r#"{"joke":null}"#,
            r#"{"setup":"a","delivery":"b"}"#,
            r#"["joke"]"#,
            "<html>oops</html>",
            "",
        ] {
            assert!(
                matches!(classify_response(&ok(body)), Err(FetchError::MalformedResponse(_))),
                "body {body:?} should be malformed"
            );
        }
    }
}
