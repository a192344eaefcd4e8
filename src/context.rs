// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for the `Provider` and `Notifier` controllers.
//!
//! All controllers receive an `Arc<Context>` that contains every collaborator
//! a reconcile pass talks to:
//! - The [`ResourceStore`] used for all Kubernetes reads and writes
//! - The [`PublicIpSource`] used to discover the cluster's public IP
//! - The factories building DNS and notification clients
//!
//! Each collaborator is a trait object so tests can swap in fakes.

use crate::clients::{default_client_factory, ClientFactory};
use crate::network::{HttpPublicIpSource, PublicIpSource};
use crate::notifiers::{default_notifier_factory, NotifierFactory};
use crate::store::{KubeStore, ResourceStore};
use anyhow::Result;
use kube::Client;
use std::sync::Arc;

/// Shared context passed to all controllers.
#[derive(Clone)]
pub struct Context {
    /// Kubernetes reads and writes
    pub store: Arc<dyn ResourceStore>,

    /// Public IP discovery
    pub ip_source: Arc<dyn PublicIpSource>,

    /// Builds DNS clients for `Provider` resources
    pub client_factory: ClientFactory,

    /// Builds notification clients for `Notifier` resources
    pub notifier_factory: NotifierFactory,
}

impl Context {
    /// Build the production context on top of a Kubernetes client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client for IP discovery cannot be built.
    pub fn new(client: Client, watch_namespace: Option<String>) -> Result<Self> {
        Ok(Self {
            store: Arc::new(KubeStore::new(client, watch_namespace)),
            ip_source: Arc::new(HttpPublicIpSource::new()?),
            client_factory: default_client_factory(),
            notifier_factory: default_notifier_factory(),
        })
    }
}
