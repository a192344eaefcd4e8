// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS provider clients.
//!
//! A [`DnsClient`] reads and writes the IP a DNS provider account currently
//! serves. Clients are built from the `Secret` and `ConfigMap` a `Provider`
//! references, through a [`ClientFactory`]. The reconciler only ever sees the
//! factory, so tests (and new provider kinds) plug in without touching it.

pub mod cloudflare;

use crate::errors::ClientError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use std::str::FromStr;
use std::sync::Arc;

/// A DNS provider account whose A records follow the public IP.
#[async_trait]
pub trait DnsClient: Send + Sync {
    /// The IP currently configured at the provider.
    async fn get_ip(&self) -> Result<String, ClientError>;

    /// Point every configured record at `ip`.
    async fn set_ip(&self, ip: &str) -> Result<(), ClientError>;
}

/// Builds a [`DnsClient`] from `spec.name` and the referenced `Secret` and `ConfigMap`.
pub type ClientFactory =
    Arc<dyn Fn(&str, &Secret, &ConfigMap) -> Result<Box<dyn DnsClient>, ClientError> + Send + Sync>;

/// Constructor of one provider kind.
pub type ClientConstructor = fn(&Secret, &ConfigMap) -> Result<Box<dyn DnsClient>, ClientError>;

/// DNS provider kinds the operator knows how to drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    Cloudflare,
}

impl ProviderKind {
    /// Constructor registered for this kind.
    #[must_use]
    pub fn constructor(self) -> ClientConstructor {
        match self {
            Self::Cloudflare => build_cloudflare,
        }
    }
}

fn build_cloudflare(
    secret: &Secret,
    config_map: &ConfigMap,
) -> Result<Box<dyn DnsClient>, ClientError> {
    let client = cloudflare::CloudflareClient::from_resources(secret, config_map)?;
    Ok(Box::new(client))
}

impl FromStr for ProviderKind {
    type Err = ClientError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "Cloudflare" => Ok(Self::Cloudflare),
            other => Err(ClientError::UnsupportedKind(other.to_string())),
        }
    }
}

/// Build the client registered for `name`.
///
/// # Errors
///
/// Returns [`ClientError::UnsupportedKind`] for unknown names, or the
/// construction error of the selected kind.
pub fn create_client(
    name: &str,
    secret: &Secret,
    config_map: &ConfigMap,
) -> Result<Box<dyn DnsClient>, ClientError> {
    let kind: ProviderKind = name.parse()?;
    (kind.constructor())(secret, config_map)
}

/// The factory wired into the running operator.
#[must_use]
pub fn default_client_factory() -> ClientFactory {
    Arc::new(create_client)
}

#[cfg(test)]
mod cloudflare_tests;
