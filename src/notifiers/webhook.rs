// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Webhook notifier.
//!
//! Posts `{"content": "<message>"}` as JSON to the URL stored under `url` in the
//! `Notifier`'s `Secret`. This is the payload shape Discord webhooks expect, and
//! most chat webhooks accept it. Any non-2xx answer is a delivery failure.

use super::NotificationClient;
use crate::constants::{CONTROLLER_NAME, HTTP_CLIENT_TIMEOUT_SECS, SECRET_URL_KEY};
use crate::errors::NotifierError;
use crate::object_data::secret_string;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Webhook implementation of [`NotificationClient`].
#[derive(Debug)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: Url,
}

impl WebhookNotifier {
    /// Create a notifier posting to `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or the HTTP client cannot be built.
    pub fn new(url: &str) -> Result<Self, NotifierError> {
        let url = Url::parse(url.trim())?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_CLIENT_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, url })
    }

    /// Build a notifier from the `Secret` and `ConfigMap` referenced by a `Notifier`.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret has no `url` or the URL is invalid.
    pub fn from_resources(secret: &Secret, _config_map: &ConfigMap) -> Result<Self, NotifierError> {
        let url = secret_string(secret, SECRET_URL_KEY).ok_or_else(|| {
            NotifierError::MissingSecretKey {
                key: SECRET_URL_KEY.to_string(),
            }
        })?;
        Self::new(&url)
    }

    /// Target URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn post(&self, content: &str) -> Result<(), NotifierError> {
        debug!(content = %content, "Sending to webhook");

        let response = self
            .client
            .post(self.url.clone())
            .json(&WebhookPayload { content })
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), "Webhook answered");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifierError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Text of the greeting sent when a notifier is first verified.
#[must_use]
pub fn greeting_message() -> String {
    format!("`{CONTROLLER_NAME}` is starting its watch.")
}

#[async_trait]
impl NotificationClient for WebhookNotifier {
    async fn send_greetings(&self) -> Result<(), NotifierError> {
        self.post(&greeting_message()).await
    }

    async fn send_notification(&self, message: &str) -> Result<(), NotifierError> {
        self.post(message).await
    }
}
