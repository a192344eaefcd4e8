// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes access used by the reconcilers.
//!
//! Reconcilers never hold an [`Api`] directly. They go through [`ResourceStore`],
//! which keeps the reconcile logic testable against an in-memory store and keeps
//! every write a JSON merge patch ([`Patch::Merge`]) so concurrent writers on the
//! same object only touch the fields they own.

use crate::constants::{KIND_CONFIG_MAP, KIND_SECRET};
use crate::crd::{Notifier, Provider};
use crate::errors::LookupError;
use anyhow::{Context as _, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::api::{ListParams, Patch, PatchParams};
use kube::{Api, Client};
use serde_json::Value;
use std::fmt;

/// The custom resource kinds whose status subresource the operator writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Provider,
    Notifier,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider => f.write_str(crate::constants::KIND_PROVIDER),
            Self::Notifier => f.write_str(crate::constants::KIND_NOTIFIER),
        }
    }
}

/// Reads and writes against the Kubernetes API server.
///
/// `get_provider` and `get_notifier` return `Ok(None)` when the object does not
/// exist. `get_secret` and `get_config_map` treat a missing object as an error,
/// since a dangling reference is a failure of the reconcile pass, and fail with
/// a [`LookupError`].
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn get_provider(&self, namespace: &str, name: &str) -> Result<Option<Provider>>;

    /// List all providers visible to the operator.
    async fn list_providers(&self) -> Result<Vec<Provider>>;

    async fn get_notifier(&self, namespace: &str, name: &str) -> Result<Option<Notifier>>;

    /// Merge-patch the status subresource of a `Provider` or `Notifier`.
    async fn patch_status(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<()>;

    /// Merge-patch the main resource of a `Provider` (used for annotations).
    async fn patch_provider_metadata(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<()>;

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret>;

    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<ConfigMap>;
}

/// [`ResourceStore`] backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    /// Restricts provider listing to one namespace when set.
    watch_namespace: Option<String>,
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client, watch_namespace: Option<String>) -> Self {
        Self {
            client,
            watch_namespace,
        }
    }

    fn providers(&self, namespace: &str) -> Api<Provider> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn notifiers(&self, namespace: &str) -> Api<Notifier> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ResourceStore for KubeStore {
    async fn get_provider(&self, namespace: &str, name: &str) -> Result<Option<Provider>> {
        self.providers(namespace)
            .get_opt(name)
            .await
            .with_context(|| format!("failed to get Provider {namespace}/{name}"))
    }

    async fn list_providers(&self) -> Result<Vec<Provider>> {
        let api: Api<Provider> = match &self.watch_namespace {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::all(self.client.clone()),
        };
        let list = api
            .list(&ListParams::default())
            .await
            .context("failed to list Providers")?;
        Ok(list.items)
    }

    async fn get_notifier(&self, namespace: &str, name: &str) -> Result<Option<Notifier>> {
        self.notifiers(namespace)
            .get_opt(name)
            .await
            .with_context(|| format!("failed to get Notifier {namespace}/{name}"))
    }

    async fn patch_status(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<()> {
        let params = PatchParams::default();
        match kind {
            ResourceKind::Provider => {
                self.providers(namespace)
                    .patch_status(name, &params, &Patch::Merge(patch))
                    .await?;
            }
            ResourceKind::Notifier => {
                self.notifiers(namespace)
                    .patch_status(name, &params, &Patch::Merge(patch))
                    .await?;
            }
        }
        Ok(())
    }

    async fn patch_provider_metadata(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<()> {
        self.providers(namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(patch))
            .await?;
        Ok(())
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        Ok(api
            .get(name)
            .await
            .map_err(|e| LookupError::from_kube(KIND_SECRET, name, e))?)
    }

    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<ConfigMap> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        Ok(api
            .get(name)
            .await
            .map_err(|e| LookupError::from_kube(KIND_CONFIG_MAP, name, e))?)
    }
}
