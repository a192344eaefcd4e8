// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Public IP discovery.
//!
//! The public IP is read from plain-text "what is my IP" services. A provider
//! may name its own service (`spec.customIPProvider`), which is always tried
//! first. The built-in pool follows in random order so no single service takes
//! all the load. Each attempt has a short timeout and any failure falls through
//! to the next service.

use crate::constants::IP_PROVIDER_TIMEOUT_SECS;
use crate::errors::IpDiscoveryError;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Built-in services answering with the caller's IP as plain text.
pub const IP_PROVIDERS: &[&str] = &[
    "https://icanhazip.com",
    "https://api.ipify.org",
    "https://4.ident.me/",
    "https://api.seeip.org",
    "http://www.trackip.net/ip",
    "http://ifconfig.me",
];

/// Source of the cluster's public IP.
#[async_trait]
pub trait PublicIpSource: Send + Sync {
    /// Discover the public IP, trying `preferred_url` first when given.
    async fn public_ip(&self, preferred_url: Option<&str>) -> Result<String, IpDiscoveryError>;
}

/// Order in which IP services are tried.
///
/// The preferred URL (if non-empty) comes first, followed by `pool` shuffled
/// with `rng`. Empty entries and duplicates of the preferred URL are dropped.
pub fn attempt_order<R: Rng + ?Sized>(
    preferred_url: Option<&str>,
    pool: &[String],
    rng: &mut R,
) -> Vec<String> {
    let preferred = preferred_url.map(str::trim).filter(|url| !url.is_empty());

    let mut fallbacks: Vec<String> = pool
        .iter()
        .filter(|url| !url.is_empty() && Some(url.as_str()) != preferred)
        .cloned()
        .collect();
    fallbacks.shuffle(rng);

    preferred
        .map(str::to_string)
        .into_iter()
        .chain(fallbacks)
        .collect()
}

/// [`PublicIpSource`] querying HTTP services.
#[derive(Debug, Clone)]
pub struct HttpPublicIpSource {
    client: reqwest::Client,
    pool: Vec<String>,
}

impl HttpPublicIpSource {
    /// Create a source using the built-in [`IP_PROVIDERS`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, IpDiscoveryError> {
        Self::with_pool(IP_PROVIDERS.iter().map(|url| (*url).to_string()).collect())
    }

    /// Create a source using a custom pool of services.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_pool(pool: Vec<String>) -> Result<Self, IpDiscoveryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(IP_PROVIDER_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, pool })
    }

    async fn fetch(&self, url: &str) -> Result<String, IpDiscoveryError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| IpDiscoveryError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IpDiscoveryError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| IpDiscoveryError::Request {
                url: url.to_string(),
                source,
            })?;

        body.trim()
            .parse::<IpAddr>()
            .map(|ip| ip.to_string())
            .map_err(|_| IpDiscoveryError::InvalidResponse {
                url: url.to_string(),
                body: body.trim().to_string(),
            })
    }
}

#[async_trait]
impl PublicIpSource for HttpPublicIpSource {
    async fn public_ip(&self, preferred_url: Option<&str>) -> Result<String, IpDiscoveryError> {
        let preferred_url = preferred_url.filter(|url| match Url::parse(url.trim()) {
            Ok(_) => true,
            Err(e) => {
                warn!(url = %url, error = %e, "Ignoring invalid custom IP provider URL");
                false
            }
        });

        let order = attempt_order(preferred_url, &self.pool, &mut rand::rng());
        debug!(?order, "Looking up public IP");

        for url in &order {
            match self.fetch(url).await {
                Ok(ip) => {
                    debug!(url = %url, ip = %ip, "Discovered public IP");
                    return Ok(ip);
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Error while trying to fetch IP from provider");
                }
            }
        }

        Err(IpDiscoveryError::Exhausted)
    }
}
