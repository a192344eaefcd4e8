// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # DDNS Operator - Dynamic DNS for Kubernetes
//!
//! A Kubernetes operator that keeps DNS provider records pointing at the
//! cluster's public IP, and tells notification channels when that IP moves.
//!
//! ## Overview
//!
//! Two Custom Resource Definitions drive the operator:
//!
//! - `Provider` - A DNS provider account (Cloudflare) whose A records follow the public IP
//! - `Notifier` - A channel (webhook) that is greeted once and then told about IP changes
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition types
//! - [`reconcilers`] - Reconciliation logic for each resource type
//! - [`context`] - Shared context handed to the controllers
//! - [`store`] - Kubernetes reads and merge-patch writes
//! - [`clients`] - DNS provider clients and their factory
//! - [`notifiers`] - Notification clients and their factory
//! - [`network`] - Public IP discovery
//! - [`metrics`] - Prometheus metrics and the HTTP endpoint serving them
//!
//! ## Example
//!
//! ```rust,no_run
//! use ddns_operator::crd::NotifierSpec;
//!
//! let spec = NotifierSpec {
//!     name: "Webhook".to_string(),
//!     secret_name: "discord-webhook".to_string(),
//!     config_map: "discord-config".to_string(),
//! };
//! ```

pub mod clients;
pub mod constants;
pub mod context;
pub mod crd;
pub mod errors;
pub mod metrics;
pub mod network;
pub mod notifiers;
pub mod object_data;
pub mod reconcilers;
pub mod status_reasons;
pub mod store;

#[cfg(test)]
pub mod test_utils;
