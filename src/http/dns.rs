//! Target host resolution
//!
//! OS resolver first, DNS-over-HTTPS JSON API as fallback. Failure is not an
//! error for the scan: the caller just gets `None`.

use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

use crate::app::Config;

/// DNS record type for IPv4 addresses
const RECORD_A: u16 = 1;

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Status", default)]
    status: u32,
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    #[serde(rename = "type")]
    record_type: u16,
    data: String,
}

/// Host resolver
#[derive(Clone)]
pub struct Resolver {
    client: reqwest::Client,
    doh_url: Option<String>,
    timeout: Duration,
}

impl Resolver {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            doh_url: config
                .dns
                .doh_enabled
                .then(|| config.dns.doh_url.clone()),
            timeout: Duration::from_millis(config.dns.timeout_ms),
        }
    }

    /// Resolve the host of `url` to one IP address
    pub async fn resolve_url(&self, url: &url::Url) -> Option<IpAddr> {
        match url.host()? {
            url::Host::Ipv4(ip) => Some(IpAddr::V4(ip)),
            url::Host::Ipv6(ip) => Some(IpAddr::V6(ip)),
            url::Host::Domain(domain) => self.resolve(domain).await,
        }
    }

    /// Resolve a hostname to one IP address
    pub async fn resolve(&self, host: &str) -> Option<IpAddr> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Some(ip);
        }

        match self.resolve_os(host).await {
            Some(ip) => return Some(ip),
            None => tracing::debug!(host, "OS resolution failed"),
        }

        let doh_url = self.doh_url.as_deref()?;
        match self.resolve_doh(doh_url, host).await {
            Ok(ip) => ip,
            Err(e) => {
                tracing::debug!(host, error = %e, "DNS-over-HTTPS resolution failed");
                None
            }
        }
    }

    async fn resolve_os(&self, host: &str) -> Option<IpAddr> {
        let lookup = tokio::net::lookup_host((host, 0));
        let mut addrs = tokio::time::timeout(self.timeout, lookup).await.ok()?.ok()?;
        addrs.next().map(|addr| addr.ip())
    }

    async fn resolve_doh(&self, doh_url: &str, host: &str) -> Result<Option<IpAddr>, reqwest::Error> {
        let response: DohResponse = self
            .client
            .get(doh_url)
            .query(&[("name", host), ("type", "A")])
            .header(reqwest::header::ACCEPT, "application/dns-json")
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(first_a_record(&response))
    }
}

fn first_a_record(response: &DohResponse) -> Option<IpAddr> {
    // NOERROR only
    if response.status != 0 {
        return None;
    }
    response
        .answer
        .iter()
        .filter(|a| a.record_type == RECORD_A)
        .find_map(|a| a.data.parse().ok())
}
