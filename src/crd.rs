// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for dynamic DNS management.
//!
//! # Resource Types
//!
//! - [`Provider`] - A DNS provider account whose A records follow the cluster's public IP
//! - [`Notifier`] - A notification channel told about provider IP changes
//!
//! Field names on the wire are a stable contract (`secretName`, `configMap`,
//! `retryInterval`, `customIPProvider`, `providerIP`, `publicIP`, `isReady`, ...)
//! and are pinned with explicit `serde` renames where camel-casing would differ.
//!
//! # Example: Creating a Provider
//!
//! ```rust,no_run
//! use ddns_operator::crd::{ProviderSpec, ResourceRef};
//!
//! let spec = ProviderSpec {
//!     name: "Cloudflare".to_string(),
//!     secret_name: "cloudflare-token".to_string(),
//!     config_map: "cloudflare-config".to_string(),
//!     retry_interval: 300,
//!     custom_ip_provider: None,
//!     notifier_refs: vec![ResourceRef {
//!         name: "discord".to_string(),
//!         namespace: None,
//!     }],
//! };
//! ```

use crate::constants::DEFAULT_RETRY_INTERVAL_SECS;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_retry_interval() -> i64 {
    DEFAULT_RETRY_INTERVAL_SECS
}

/// Condition represents an observation of a resource's current state.
///
/// Conditions are used in status subresources to communicate the state of
/// a resource to users and controllers. Each resource keeps exactly one
/// condition per declared type.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition: `ConfigMap`, `Secret` or `Client`.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// The `metadata.generation` the condition was computed against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Last time the condition changed (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// Reference to a namespaced object by name.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ResourceRef {
    /// Name of the referenced object.
    pub name: String,

    /// Namespace of the referenced object. Defaults to the referencing object's namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl ResourceRef {
    /// Namespace of the reference, falling back to `default_namespace` when unset or empty.
    #[must_use]
    pub fn namespace_or<'a>(&'a self, default_namespace: &'a str) -> &'a str {
        match self.namespace.as_deref() {
            Some(namespace) if !namespace.is_empty() => namespace,
            _ => default_namespace,
        }
    }
}

/// `Provider` keeps the A records of a DNS provider account in sync with the
/// cluster's public IP.
///
/// # Example
///
/// ```yaml
/// apiVersion: ddns.firestoned.io/v1alpha1
/// kind: Provider
/// metadata:
///   name: cloudflare
///   namespace: ddns-system
/// spec:
///   name: Cloudflare
///   secretName: cloudflare-token
///   configMap: cloudflare-config
///   retryInterval: 300
///   notifierRefs:
///     - name: discord
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "ddns.firestoned.io",
    version = "v1alpha1",
    kind = "Provider",
    namespaced,
    doc = "Provider represents a DNS provider account whose configured A records are kept pointing at the cluster's public IP.",
    printcolumn = r#"{"name":"Provider IP","type":"string","jsonPath":".status.providerIP"}"#,
    printcolumn = r#"{"name":"Public IP","type":"string","jsonPath":".status.publicIP"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[kube(status = "ProviderStatus")]
#[serde(rename_all = "camelCase")]
pub struct ProviderSpec {
    /// Kind of DNS provider. Currently only `Cloudflare` is supported.
    pub name: String,

    /// Name of the `Secret` in the same namespace holding the provider credentials.
    pub secret_name: String,

    /// Name of the `ConfigMap` in the same namespace holding the provider configuration
    /// as a JSON string under the `config` key.
    pub config_map: String,

    /// Seconds between two reconciliations of this provider.
    #[serde(default = "default_retry_interval")]
    pub retry_interval: i64,

    /// URL returning the public IP as plain text, tried before the built-in providers.
    #[serde(
        default,
        rename = "customIPProvider",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_ip_provider: Option<String>,

    /// Notifiers told about changes of this provider's IP.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notifier_refs: Vec<ResourceRef>,
}

impl ProviderSpec {
    /// Polling cadence of the provider. Non-positive intervals fall back to the default.
    #[must_use]
    pub fn retry_interval(&self) -> Duration {
        let secs = if self.retry_interval > 0 {
            self.retry_interval
        } else {
            DEFAULT_RETRY_INTERVAL_SECS
        };
        Duration::from_secs(secs.unsigned_abs())
    }
}

/// `Provider` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    /// IP currently configured at the DNS provider.
    #[serde(
        default,
        rename = "providerIP",
        skip_serializing_if = "String::is_empty"
    )]
    pub provider_ip: String,

    /// Public IP of the cluster as last discovered.
    #[serde(default, rename = "publicIP", skip_serializing_if = "String::is_empty")]
    pub public_ip: String,

    /// Generation of the spec last reconciled successfully.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// `Notifier` is a notification channel that announces provider IP changes.
///
/// # Example
///
/// ```yaml
/// apiVersion: ddns.firestoned.io/v1alpha1
/// kind: Notifier
/// metadata:
///   name: discord
///   namespace: ddns-system
/// spec:
///   name: Webhook
///   secretName: discord-webhook
///   configMap: discord-config
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "ddns.firestoned.io",
    version = "v1alpha1",
    kind = "Notifier",
    namespaced,
    doc = "Notifier represents a notification channel that is told whenever a referencing Provider's IP changes.",
    printcolumn = r#"{"name":"Ready","type":"boolean","jsonPath":".status.isReady"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[kube(status = "NotifierStatus")]
#[serde(rename_all = "camelCase")]
pub struct NotifierSpec {
    /// Kind of notifier. Currently only `Webhook` is supported.
    pub name: String,

    /// Name of the `Secret` in the same namespace holding the notifier credentials.
    pub secret_name: String,

    /// Name of the `ConfigMap` in the same namespace holding the notifier configuration.
    pub config_map: String,
}

/// `Notifier` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotifierStatus {
    /// True once a greeting went through; reset when a notification fails.
    #[serde(default)]
    pub is_ready: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}
