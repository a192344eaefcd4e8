// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the DDNS operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for all DDNS CRDs
pub const API_GROUP: &str = "ddns.firestoned.io";

/// API version for all DDNS CRDs
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "ddns.firestoned.io/v1alpha1";

/// Kind name for `Provider` resource
pub const KIND_PROVIDER: &str = "Provider";

/// Kind name for `Notifier` resource
pub const KIND_NOTIFIER: &str = "Notifier";

/// Kind of the credentials object a resource references
pub const KIND_SECRET: &str = "Secret";

/// Kind of the configuration object a resource references
pub const KIND_CONFIG_MAP: &str = "ConfigMap";

/// Name the operator announces itself with in greetings
pub const CONTROLLER_NAME: &str = "ddns-operator";

// ============================================================================
// Condition Constants
// ============================================================================

/// Condition type tracking the referenced `ConfigMap`
pub const CONDITION_TYPE_CONFIG_MAP: &str = "ConfigMap";

/// Condition type tracking the referenced `Secret`
pub const CONDITION_TYPE_SECRET: &str = "Secret";

/// Condition type tracking the external client
pub const CONDITION_TYPE_CLIENT: &str = "Client";

/// Condition status `True`
pub const CONDITION_STATUS_TRUE: &str = "True";

/// Condition status `False`
pub const CONDITION_STATUS_FALSE: &str = "False";

/// Condition status `Unknown`
pub const CONDITION_STATUS_UNKNOWN: &str = "Unknown";

// ============================================================================
// Secret / ConfigMap Contract Constants
// ============================================================================

/// `ConfigMap` key holding the JSON provider configuration
pub const CONFIG_MAP_CONFIG_KEY: &str = "config";

/// `Secret` key holding the Cloudflare API token
pub const SECRET_API_TOKEN_KEY: &str = "apiToken";

/// `Secret` key holding the webhook URL
pub const SECRET_URL_KEY: &str = "url";

// ============================================================================
// Provider Constants
// ============================================================================

/// Default interval between two provider reconciliations (15 minutes)
pub const DEFAULT_RETRY_INTERVAL_SECS: i64 = 900;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_URL: &str = "https://api.cloudflare.com/client/v4";

/// DNS record type the provider clients manage
pub const DNS_RECORD_TYPE_A: &str = "A";

/// Page size requested when listing Cloudflare DNS records
pub const DNS_RECORDS_PER_PAGE: u32 = 100;

// ============================================================================
// HTTP Constants
// ============================================================================

/// Timeout for each public IP lookup attempt
pub const IP_PROVIDER_TIMEOUT_SECS: u64 = 1;

/// Timeout for DNS provider and webhook API calls
pub const HTTP_CLIENT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Controller Error Handling Constants
// ============================================================================

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Default bind address for the metrics HTTP server
pub const DEFAULT_METRICS_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Environment variable overriding the metrics bind address
pub const METRICS_BIND_ADDRESS_ENV: &str = "METRICS_BIND_ADDRESS";

/// Environment variable restricting the controllers to one namespace
pub const WATCH_NAMESPACE_ENV: &str = "WATCH_NAMESPACE";
