//! Blocking HTTP client used as the fetch capability. Bodies are always decoded as UTF-8.

use crate::scraper::error::ScraperError;
use crate::scraper::Fetch;
use std::time::Duration;
use tracing::debug;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; novelfetch/0.1; +https://github.com/novelfetch)";
const MAX_REDIRECTS: usize = 10;

/// Blocking HTTP client shared by every worker. `reqwest::blocking::Client` is `Sync`,
/// so one instance serves the whole pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::blocking::Client,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// GET `url` and return the body. Non-2xx statuses are errors.
    pub fn get_text(&self, url: &str) -> Result<String, ScraperError> {
        let response = self
            .inner
            .get(url)
            .send()
            .map_err(|e| ScraperError::Network {
                url: url.to_string(),
                source: e,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        if let Some(charset) = declared_charset(&response) {
            if !charset.eq_ignore_ascii_case("utf-8") && !charset.eq_ignore_ascii_case("utf8") {
                debug!(%url, %charset, "ignoring declared charset, decoding as UTF-8");
            }
        }
        let bytes = response.bytes().map_err(|e| ScraperError::BodyRead {
            url: url.to_string(),
            source: e,
        })?;
        Ok(decode_utf8(&bytes))
    }
}

impl Fetch for HttpClient {
    fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        self.get_text(url)
    }
}

fn declared_charset(response: &reqwest::blocking::Response) -> Option<String> {
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)?
        .to_str()
        .ok()?;
    content_type
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, v)| v.trim().trim_matches('"').to_string())
}

/// Decode raw body bytes as UTF-8, replacing invalid sequences.
pub(crate) fn decode_utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Builder for [HttpClient] with optional User-Agent and timeout.
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    user_agent: Option<String>,
    timeout_secs: Option<u64>,
}

impl HttpClientBuilder {
    /// Set a custom User-Agent. If not set, a default identifying the tool is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set a request timeout in seconds. Without one a stuck fetch blocks its worker indefinitely.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn build(self) -> Result<HttpClient, reqwest::Error> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let mut builder = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));
        // reqwest's blocking client defaults to a 30s timeout; None disables it.
        builder = builder.timeout(self.timeout_secs.map(Duration::from_secs));
        Ok(HttpClient {
            inner: builder.build()?,
        })
    }
}
