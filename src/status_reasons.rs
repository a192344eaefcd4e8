// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard Kubernetes status condition reasons for DDNS resources.
//!
//! Reasons are programmatic identifiers in CamelCase that explain why a condition has
//! a particular status. They are part of the wire contract of the `Provider` and
//! `Notifier` status subresources and must stay stable.
//!
//! # Condition Types
//!
//! Both kinds track the same three aspects:
//!
//! - **`ConfigMap`** - the referenced `ConfigMap` could be read
//! - **`Secret`** - the referenced `Secret` could be read
//! - **`Client`** - the external client was built (and, for notifiers, reached)
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   conditions:
//!     - type: Secret
//!       status: "True"
//!       reason: SecretFound
//!       message: "Secret cloudflare-token found"
//!     - type: ConfigMap
//!       status: "True"
//!       reason: ConfigMapFound
//!       message: "ConfigMap cloudflare-config found"
//!     - type: Client
//!       status: "True"
//!       reason: ClientCreated
//!       message: "Client created"
//! ```

// ============================================================================
// Dependency Reasons
// ============================================================================

/// The referenced `ConfigMap` lookup finished (found or not, see status).
pub const REASON_CONFIG_MAP_FOUND: &str = "ConfigMapFound";

/// The referenced `Secret` lookup finished (found or not, see status).
pub const REASON_SECRET_FOUND: &str = "SecretFound";

// ============================================================================
// Client Reasons
// ============================================================================

/// The DNS or notification client was constructed.
pub const REASON_CLIENT_CREATED: &str = "ClientCreated";

/// The notification channel was exercised (greeting or notification).
pub const REASON_CLIENT_COMMUNICATION: &str = "ClientCommunication";

/// Placeholder reason for conditions that were never evaluated.
pub const REASON_UNKNOWN: &str = "Unknown";

// ============================================================================
// Messages
// ============================================================================

/// Placeholder message for conditions that were never evaluated.
pub const MESSAGE_UNKNOWN: &str = "Unknown";

/// Message recorded once a client was built.
pub const MESSAGE_CLIENT_CREATED: &str = "Client created";

/// Message recorded after a successful greeting.
pub const MESSAGE_COMMUNICATIONS_ESTABLISHED: &str = "Communications established";

/// Message recorded after a successful change notification.
pub const MESSAGE_NOTIFICATION_SENT: &str = "Notification sent";

/// Build the message for a dependency that was found, e.g. `Secret my-token found`.
#[must_use]
pub fn found_message(kind: &str, name: &str) -> String {
    format!("{kind} {name} found")
}

/// Build the message for a client that could not be constructed.
#[must_use]
pub fn client_creation_failed_message(err: &impl std::fmt::Display) -> String {
    format!("could not create client: {err}")
}

/// Build the message for a greeting that could not be delivered.
#[must_use]
pub fn greetings_failed_message(err: &impl std::fmt::Display) -> String {
    format!("unable to send greetings: {err}")
}

/// Build the message for a change notification that could not be delivered.
#[must_use]
pub fn notification_failed_message(err: &impl std::fmt::Display) -> String {
    format!("unable to send notification: {err}")
}
