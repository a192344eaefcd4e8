// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Notification clients.
//!
//! A [`NotificationClient`] announces the operator to a channel once
//! ([`send_greetings`](NotificationClient::send_greetings)) and then reports
//! provider IP changes to it. Clients are built through a [`NotifierFactory`]
//! injected into the notifier reconciler.

pub mod webhook;

use crate::errors::NotifierError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use std::str::FromStr;
use std::sync::Arc;

/// A channel that is told about provider IP changes.
#[async_trait]
pub trait NotificationClient: Send + Sync {
    /// Announce that the operator is watching. Proves the channel works.
    async fn send_greetings(&self) -> Result<(), NotifierError>;

    /// Deliver a change notification.
    async fn send_notification(&self, message: &str) -> Result<(), NotifierError>;
}

/// Builds a [`NotificationClient`] from `spec.name` and the referenced `Secret` and `ConfigMap`.
pub type NotifierFactory = Arc<
    dyn Fn(&str, &Secret, &ConfigMap) -> Result<Box<dyn NotificationClient>, NotifierError>
        + Send
        + Sync,
>;

/// Constructor of one notifier kind.
pub type NotifierConstructor =
    fn(&Secret, &ConfigMap) -> Result<Box<dyn NotificationClient>, NotifierError>;

/// Notifier kinds the operator can deliver to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotifierKind {
    Webhook,
}

impl NotifierKind {
    /// Constructor registered for this kind.
    #[must_use]
    pub fn constructor(self) -> NotifierConstructor {
        match self {
            Self::Webhook => build_webhook,
        }
    }
}

fn build_webhook(
    secret: &Secret,
    config_map: &ConfigMap,
) -> Result<Box<dyn NotificationClient>, NotifierError> {
    let notifier = webhook::WebhookNotifier::from_resources(secret, config_map)?;
    Ok(Box::new(notifier))
}

impl FromStr for NotifierKind {
    type Err = NotifierError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "Webhook" => Ok(Self::Webhook),
            other => Err(NotifierError::UnsupportedKind(other.to_string())),
        }
    }
}

/// Build the notification client registered for `name`.
///
/// # Errors
///
/// Returns [`NotifierError::UnsupportedKind`] for unknown names, or the
/// construction error of the selected kind.
pub fn create_notifier(
    name: &str,
    secret: &Secret,
    config_map: &ConfigMap,
) -> Result<Box<dyn NotificationClient>, NotifierError> {
    let kind: NotifierKind = name.parse()?;
    (kind.constructor())(secret, config_map)
}

/// The factory wired into the running operator.
#[must_use]
pub fn default_notifier_factory() -> NotifierFactory {
    Arc::new(create_notifier)
}

#[cfg(test)]
mod mod_tests;
