// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cloudflare DNS client.
//!
//! Uses the Cloudflare REST API v4 to keep A records pointing at the public IP.
//!
//! # API Endpoints Used
//!
//! - `GET /zones?name={zone}` - Look up zone ID from zone name
//! - `GET /zones/{zone_id}/dns_records?type=A&page={n}` - List A records of a zone,
//!   one page at a time until `result_info.total_pages`
//! - `PATCH /zones/{zone_id}/dns_records/{record_id}` - Update record content
//!
//! # Configuration
//!
//! The `Provider`'s `ConfigMap` holds the zones and records to manage under `config`:
//!
//! ```json
//! {"cloudflare": {"zones": [{"name": "example.com", "records": [{"name": "home.example.com", "proxied": false}]}]}}
//! ```
//!
//! The `Secret` holds an API token with `Zone:DNS:Edit` permission under `apiToken`.

use super::DnsClient;
use crate::constants::{
    CLOUDFLARE_API_URL, CONFIG_MAP_CONFIG_KEY, DNS_RECORDS_PER_PAGE, DNS_RECORD_TYPE_A,
    HTTP_CLIENT_TIMEOUT_SECS, SECRET_API_TOKEN_KEY,
};
use crate::errors::ClientError;
use crate::object_data::{config_map_string, secret_string};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Parsed `config` payload of a Cloudflare `Provider`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudflareConfig {
    pub cloudflare: CloudflareSettings,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudflareSettings {
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
}

/// A Cloudflare zone and the records managed in it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub name: String,
    #[serde(default)]
    pub records: Vec<RecordConfig>,
}

/// One managed record, by fully qualified name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordConfig {
    pub name: String,
    #[serde(default)]
    pub proxied: bool,
}

/// Cloudflare API response envelope
#[derive(Debug, Deserialize)]
struct CloudflareResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<CloudflareApiError>,
    result: Option<T>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

/// Pagination block of list responses.
#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct CloudflareApiError {
    code: i32,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct DnsRecord {
    id: String,
    #[serde(rename = "type")]
    record_type: String,
    name: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct UpdateDnsRecord<'a> {
    content: &'a str,
    proxied: bool,
}

/// Cloudflare implementation of [`DnsClient`].
#[derive(Debug)]
pub struct CloudflareClient {
    client: reqwest::Client,
    api_token: String,
    base_url: String,
    config: CloudflareConfig,
}

impl CloudflareClient {
    /// Create a client against the public Cloudflare API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or if the API token
    /// contains invalid header characters.
    pub fn new(config: CloudflareConfig, api_token: String) -> Result<Self, ClientError> {
        Self::with_base_url(config, api_token, CLOUDFLARE_API_URL)
    }

    /// Create a client against an alternative API endpoint.
    ///
    /// # Errors
    ///
    /// Same as [`CloudflareClient::new`].
    pub fn with_base_url(
        config: CloudflareConfig,
        api_token: String,
        base_url: impl Into<String>,
    ) -> Result<Self, ClientError> {
        // Validate API token can be used in headers (fail early)
        HeaderValue::from_str(&format!("Bearer {api_token}"))
            .map_err(|_| ClientError::InvalidToken)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_CLIENT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config,
        })
    }

    /// Build a client from the `Secret` and `ConfigMap` referenced by a `Provider`.
    ///
    /// No request is made, so a broken configuration fails here before any
    /// call to Cloudflare.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is missing or not valid JSON, or if the
    /// secret has no `apiToken`.
    pub fn from_resources(secret: &Secret, config_map: &ConfigMap) -> Result<Self, ClientError> {
        let raw = config_map_string(config_map, CONFIG_MAP_CONFIG_KEY).ok_or_else(|| {
            ClientError::MissingConfig {
                key: CONFIG_MAP_CONFIG_KEY.to_string(),
            }
        })?;
        let config: CloudflareConfig = serde_json::from_str(raw)?;

        let api_token = secret_string(secret, SECRET_API_TOKEN_KEY).ok_or_else(|| {
            ClientError::MissingSecretKey {
                key: SECRET_API_TOKEN_KEY.to_string(),
            }
        })?;

        Self::new(config, api_token)
    }

    /// The zones and records this client manages.
    #[must_use]
    pub fn config(&self) -> &CloudflareConfig {
        &self.config
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_token)) {
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    async fn read_result<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        Self::read_page(response).await.map(|(result, _)| result)
    }

    /// Decode a Cloudflare envelope, turning `success: false` into an error.
    async fn read_page<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<(T, Option<ResultInfo>), ClientError> {
        let status = response.status();
        let body: CloudflareResponse<T> = response.json().await?;

        match body.result {
            Some(result) if body.success => Ok((result, body.result_info)),
            _ => {
                let message = body
                    .errors
                    .iter()
                    .map(|e| format!("{}: {}", e.code, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(ClientError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    async fn zone_id(&self, zone_name: &str) -> Result<String, ClientError> {
        debug!(zone_name = %zone_name, "Looking up Cloudflare zone");

        let response = self
            .client
            .get(format!("{}/zones", self.base_url))
            .headers(self.auth_headers())
            .query(&[("name", zone_name)])
            .send()
            .await?;

        let zones: Vec<Zone> = Self::read_result(response).await?;
        zones
            .into_iter()
            .find(|zone| zone.name == zone_name)
            .map(|zone| zone.id)
            .ok_or_else(|| ClientError::ZoneNotFound(zone_name.to_string()))
    }

    /// All A records of a zone, across every result page.
    async fn a_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>, ClientError> {
        let mut records = Vec::new();
        let mut page: u32 = 1;

        loop {
            let response = self
                .client
                .get(format!("{}/zones/{zone_id}/dns_records", self.base_url))
                .headers(self.auth_headers())
                .query(&[("type", DNS_RECORD_TYPE_A)])
                .query(&[("page", page), ("per_page", DNS_RECORDS_PER_PAGE)])
                .send()
                .await?;

            let (batch, info): (Vec<DnsRecord>, _) = Self::read_page(response).await?;
            let total_pages = info.map_or(1, |info| info.total_pages);
            debug!(
                zone_id = %zone_id,
                page,
                total_pages,
                count = batch.len(),
                "Listed DNS records"
            );

            let last_page = batch.is_empty() || page >= total_pages;
            records.extend(
                batch
                    .into_iter()
                    .filter(|record| record.record_type == DNS_RECORD_TYPE_A),
            );
            if last_page {
                return Ok(records);
            }
            page += 1;
        }
    }

    async fn ip_from_zone(&self, zone: &ZoneConfig) -> Result<String, ClientError> {
        let zone_id = self.zone_id(&zone.name).await?;
        let records = self.a_records(&zone_id).await?;

        records
            .into_iter()
            .find(|record| zone.records.iter().any(|wanted| wanted.name == record.name))
            .map(|record| record.content)
            .ok_or_else(|| ClientError::RecordNotFound(zone.name.clone()))
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        ip: &str,
        proxied: bool,
    ) -> Result<(), ClientError> {
        let response = self
            .client
            .patch(format!(
                "{}/zones/{zone_id}/dns_records/{record_id}",
                self.base_url
            ))
            .headers(self.auth_headers())
            .json(&UpdateDnsRecord { content: ip, proxied })
            .send()
            .await?;

        let _: serde_json::Value = Self::read_result(response).await?;
        Ok(())
    }

    async fn set_ip_for_zone(&self, ip: &str, zone: &ZoneConfig) -> Result<(), ClientError> {
        let zone_id = self.zone_id(&zone.name).await?;
        info!(zone_id = %zone_id, zone_name = %zone.name, "Found Cloudflare zone");

        let records = self.a_records(&zone_id).await?;
        for wanted in &zone.records {
            for record in records.iter().filter(|record| record.name == wanted.name) {
                info!(
                    record = %record.name,
                    ip = %ip,
                    proxied = wanted.proxied,
                    "Updating Cloudflare record"
                );
                self.update_record(&zone_id, &record.id, ip, wanted.proxied)
                    .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DnsClient for CloudflareClient {
    async fn get_ip(&self) -> Result<String, ClientError> {
        for zone in &self.config.cloudflare.zones {
            match self.ip_from_zone(zone).await {
                Ok(ip) => return Ok(ip),
                Err(e) => {
                    warn!(
                        zone = %zone.name,
                        error = %e,
                        "Could not read IP from zone, trying next"
                    );
                }
            }
        }
        Err(ClientError::NoZoneResolved)
    }

    async fn set_ip(&self, ip: &str) -> Result<(), ClientError> {
        for zone in &self.config.cloudflare.zones {
            self.set_ip_for_zone(ip, zone).await?;
        }
        Ok(())
    }
}
