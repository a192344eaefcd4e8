// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the external collaborators of the DDNS operator.
//!
//! This module provides specialized error types for:
//! - DNS provider clients (construction and API calls)
//! - Notification clients (construction and delivery)
//! - Public IP discovery
//!
//! Reconcilers wrap these in `anyhow` with context, and their `Display` output
//! ends up verbatim in status condition messages, so the messages are kept short
//! and stable.

use thiserror::Error;

/// Errors raised while building or calling a DNS provider client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// `spec.name` of the Provider does not name a supported DNS provider.
    #[error("could not create a provider of type: {0}")]
    UnsupportedKind(String),

    /// The `ConfigMap` lacks the configuration key, or it is empty.
    #[error("`{key}` not found in configMap")]
    MissingConfig {
        /// The expected `ConfigMap` key
        key: String,
    },

    /// The `Secret` lacks a required credential.
    #[error("`{key}` not found in secret")]
    MissingSecretKey {
        /// The expected `Secret` key
        key: String,
    },

    /// The configuration payload is not valid JSON for this provider.
    #[error("could not unmarshal the config: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// The credential cannot be used as an HTTP header value.
    #[error("API token contains invalid characters")]
    InvalidToken,

    /// The provider API answered with an error.
    #[error("provider API returned status {status}: {message}")]
    Api {
        /// HTTP status code of the response
        status: u16,
        /// Error details reported by the API
        message: String,
    },

    /// A configured zone does not exist in the provider account.
    #[error("zone {0} not found")]
    ZoneNotFound(String),

    /// None of the configured records exists as an A record in the zone.
    #[error("could not find an A record for zone: {0}")]
    RecordNotFound(String),

    /// No configured zone yielded an A record.
    #[error("error while trying to get IP from all zones")]
    NoZoneResolved,

    /// Transport level failure talking to the provider.
    #[error("request to provider API failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised while building or using a notification client.
#[derive(Error, Debug)]
pub enum NotifierError {
    /// `spec.name` of the Notifier does not name a supported notifier.
    #[error("could not create a notifier of type: {0}")]
    UnsupportedKind(String),

    /// The `Secret` lacks a required credential.
    #[error("`{key}` not found in secret")]
    MissingSecretKey {
        /// The expected `Secret` key
        key: String,
    },

    /// The configured webhook URL cannot be parsed.
    #[error("invalid webhook url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The webhook answered with a non-2xx status.
    #[error("error while trying to send to webhook ({status}): {body}")]
    Rejected {
        /// HTTP status code of the response
        status: u16,
        /// Response body returned by the webhook
        body: String,
    },

    /// Transport level failure talking to the webhook.
    #[error("request to webhook failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised while discovering the public IP of the cluster.
#[derive(Error, Debug)]
pub enum IpDiscoveryError {
    /// One IP provider could not be reached.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// One IP provider answered with a non-2xx status.
    #[error("{url} returned status {status}")]
    UnexpectedStatus { url: String, status: u16 },

    /// One IP provider answered with something that is not an IP address.
    #[error("{url} returned an invalid IP address: {body:?}")]
    InvalidResponse { url: String, body: String },

    /// Every IP provider failed.
    #[error("could not retrieve a response from any of the providers")]
    Exhausted,

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Errors raised while reading a `Secret` or `ConfigMap` a resource depends on.
///
/// The `Display` output is what lands in the `Secret`/`ConfigMap` condition.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The referenced object does not exist.
    #[error("{kind} {name} not found")]
    NotFound { kind: &'static str, name: String },

    /// The API server refused or failed the read.
    #[error("unable to read {kind} {name}: {message}")]
    Unavailable {
        kind: &'static str,
        name: String,
        message: String,
    },
}

impl LookupError {
    /// Classify a failed `get` of `kind`/`name`, keeping only the API status message.
    #[must_use]
    pub fn from_kube(kind: &'static str, name: &str, err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) if response.code == 404 => Self::NotFound {
                kind,
                name: name.to_string(),
            },
            kube::Error::Api(response) => Self::Unavailable {
                kind,
                name: name.to_string(),
                message: response.message,
            },
            other => Self::Unavailable {
                kind,
                name: name.to_string(),
                message: other.to_string(),
            },
        }
    }
}
