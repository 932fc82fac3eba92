//! Primary probe: one bounded request plus host resolution

use std::net::IpAddr;
use std::time::Duration;

use super::client::HttpClient;
use super::dns::Resolver;
use super::response::Response;
use crate::error::HttpError;

/// Outcome of a successful primary probe
#[derive(Debug, Clone)]
pub struct Probe {
    pub response: Response,
    pub ip: Option<IpAddr>,
}

impl Probe {
    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.response.duration_ms
    }
}

/// Issues the primary request against a target
#[derive(Clone)]
pub struct Prober {
    client: HttpClient,
    resolver: Resolver,
}

impl Prober {
    pub fn new(client: HttpClient, resolver: Resolver) -> Self {
        Self { client, resolver }
    }

    /// Single attempt; a transport error or timeout fails the probe, a DNS
    /// failure only leaves `ip` empty.
    pub async fn probe(&self, url: &url::Url, timeout: Duration) -> Result<Probe, HttpError> {
        let (response, ip) = tokio::join!(
            self.client.get(url.as_str(), timeout),
            self.resolver.resolve_url(url),
        );

        let response = response?;
        tracing::debug!(
            url = %url,
            status = response.status,
            elapsed_ms = response.duration_ms,
            ip = ?ip,
            "Primary probe complete"
        );

        Ok(Probe { response, ip })
    }
}
