//! HTTP client implementation

use reqwest::header::SET_COOKIE;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::response::Response;
use crate::app::Config;
use crate::error::HttpError;

/// Whether a request may follow redirects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirects {
    Follow,
    Manual,
}

/// HTTP client wrapper
#[derive(Clone)]
pub struct HttpClient {
    /// Client that follows redirects up to the configured limit
    client: reqwest::Client,

    /// Client that hands 3xx responses back untouched
    manual: reqwest::Client,

    /// Body bytes kept for analysis
    max_body_bytes: usize,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(config: &Config) -> Result<Self, HttpError> {
        let client = Self::builder(config)
            .redirect(reqwest::redirect::Policy::limited(config.scanner.max_redirects))
            .build()
            .map_err(|e| HttpError::Builder(e.to_string()))?;

        let manual = Self::builder(config)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| HttpError::Builder(e.to_string()))?;

        Ok(Self {
            client,
            manual,
            max_body_bytes: config.scanner.max_body_bytes,
        })
    }

    fn builder(config: &Config) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .user_agent(&config.scanner.user_agent)
            .connect_timeout(config.scanner.request_timeout())
    }

    /// Execute a GET request and read the body
    pub async fn get(&self, url: &str, timeout: Duration) -> Result<Response, HttpError> {
        self.execute(reqwest::Method::GET, url, timeout, Redirects::Follow)
            .await
    }

    /// Execute a HEAD request
    pub async fn head(
        &self,
        url: &str,
        timeout: Duration,
        redirects: Redirects,
    ) -> Result<Response, HttpError> {
        self.execute(reqwest::Method::HEAD, url, timeout, redirects)
            .await
    }

    /// Execute a request with its own timeout. No retries.
    pub async fn execute(
        &self,
        method: reqwest::Method,
        url: &str,
        timeout: Duration,
        redirects: Redirects,
    ) -> Result<Response, HttpError> {
        let timeout_ms = timeout.as_millis() as u64;
        let start = Instant::now();

        let client = match redirects {
            Redirects::Follow => &self.client,
            Redirects::Manual => &self.manual,
        };

        let response = client
            .request(method, url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| HttpError::from_reqwest(e, timeout_ms))?;

        self.build_response(response, start, timeout_ms).await
    }

    /// Build response from reqwest response
    async fn build_response(
        &self,
        mut response: reqwest::Response,
        start: Instant,
        timeout_ms: u64,
    ) -> Result<Response, HttpError> {
        let status = response.status().as_u16();
        let url = response.url().to_string();

        // Convert headers
        let mut headers: HashMap<String, String> = HashMap::new();
        for (key, value) in response.headers() {
            // Non-UTF-8 values are kept lossily so the header still counts as present
            let v = String::from_utf8_lossy(value.as_bytes());
            headers
                .entry(key.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&v);
                })
                .or_insert_with(|| v.into_owned());
        }

        let set_cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();

        // Read the body in chunks, keeping at most max_body_bytes
        let mut body = Vec::new();
        let mut size = 0usize;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| HttpError::from_reqwest(e, timeout_ms))?
        {
            size += chunk.len();
            let room = self.max_body_bytes.saturating_sub(body.len());
            body.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }

        Ok(Response {
            url,
            status,
            headers,
            set_cookies,
            body: String::from_utf8_lossy(&body).into_owned(),
            duration_ms: start.elapsed().as_millis() as u64,
            size,
        })
    }
}
