// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory fakes shared by the reconciler unit tests.
//!
//! [`MockStore`] applies merge patches to the objects it holds, so a test can
//! run several reconcile passes back to back and observe the status the API
//! server would have stored. Every write is also logged so tests can count
//! network calls.

use crate::clients::{ClientFactory, DnsClient};
use crate::constants::{KIND_CONFIG_MAP, KIND_SECRET};
use crate::context::Context;
use crate::crd::{Notifier, NotifierSpec, Provider, ProviderSpec, ProviderStatus, ResourceRef};
use crate::errors::{ClientError, IpDiscoveryError, LookupError, NotifierError};
use crate::network::PublicIpSource;
use crate::notifiers::{NotificationClient, NotifierFactory};
use crate::store::{ResourceKind, ResourceStore};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub const TEST_NAMESPACE: &str = "ddns-system";

type Key = (String, String);

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

fn object_key(metadata: &ObjectMeta) -> Key {
    key(
        metadata.namespace.as_deref().unwrap_or_default(),
        metadata.name.as_deref().unwrap_or_default(),
    )
}

/// Apply an RFC 7386 merge patch to `target`.
pub fn apply_merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(target) = target {
        for (field, value) in patch {
            if value.is_null() {
                target.remove(field);
            } else {
                apply_merge_patch(target.entry(field.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

fn patched<T: Serialize + DeserializeOwned>(object: &T, patch: &Value) -> Result<T> {
    let mut value = serde_json::to_value(object)?;
    apply_merge_patch(&mut value, patch);
    Ok(serde_json::from_value(value)?)
}

#[derive(Default)]
struct StoreState {
    providers: BTreeMap<Key, Provider>,
    notifiers: BTreeMap<Key, Notifier>,
    secrets: BTreeMap<Key, Secret>,
    config_maps: BTreeMap<Key, ConfigMap>,
    status_patches: Vec<(ResourceKind, String, Value)>,
    metadata_patches: Vec<(String, Value)>,
    fail_status_patches: bool,
}

/// [`ResourceStore`] keeping objects in memory.
#[derive(Clone, Default)]
pub struct MockStore {
    state: Arc<Mutex<StoreState>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(self, provider: Provider) -> Self {
        let k = object_key(&provider.metadata);
        self.state.lock().unwrap().providers.insert(k, provider);
        self
    }

    pub fn with_notifier(self, notifier: Notifier) -> Self {
        let k = object_key(&notifier.metadata);
        self.state.lock().unwrap().notifiers.insert(k, notifier);
        self
    }

    pub fn with_secret(self, secret: Secret) -> Self {
        let k = object_key(&secret.metadata);
        self.state.lock().unwrap().secrets.insert(k, secret);
        self
    }

    pub fn with_config_map(self, config_map: ConfigMap) -> Self {
        let k = object_key(&config_map.metadata);
        self.state.lock().unwrap().config_maps.insert(k, config_map);
        self
    }

    /// Make every following status patch fail.
    pub fn fail_status_patches(&self) {
        self.state.lock().unwrap().fail_status_patches = true;
    }

    pub fn provider(&self, namespace: &str, name: &str) -> Provider {
        self.state.lock().unwrap().providers[&key(namespace, name)].clone()
    }

    pub fn notifier(&self, namespace: &str, name: &str) -> Notifier {
        self.state.lock().unwrap().notifiers[&key(namespace, name)].clone()
    }

    pub fn status_patch_count(&self) -> usize {
        self.state.lock().unwrap().status_patches.len()
    }

    pub fn status_patches(&self) -> Vec<(ResourceKind, String, Value)> {
        self.state.lock().unwrap().status_patches.clone()
    }

    pub fn metadata_patches(&self) -> Vec<(String, Value)> {
        self.state.lock().unwrap().metadata_patches.clone()
    }
}

#[async_trait]
impl ResourceStore for MockStore {
    async fn get_provider(&self, namespace: &str, name: &str) -> Result<Option<Provider>> {
        Ok(self.state.lock().unwrap().providers.get(&key(namespace, name)).cloned())
    }

    async fn list_providers(&self) -> Result<Vec<Provider>> {
        Ok(self.state.lock().unwrap().providers.values().cloned().collect())
    }

    async fn get_notifier(&self, namespace: &str, name: &str) -> Result<Option<Notifier>> {
        Ok(self.state.lock().unwrap().notifiers.get(&key(namespace, name)).cloned())
    }

    async fn patch_status(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_status_patches {
            return Err(anyhow!("the server rejected the status patch"));
        }
        let k = key(namespace, name);
        match kind {
            ResourceKind::Provider => {
                let current = state
                    .providers
                    .get(&k)
                    .ok_or_else(|| anyhow!("providers \"{name}\" not found"))?;
                let updated = patched(current, patch)?;
                state.providers.insert(k, updated);
            }
            ResourceKind::Notifier => {
                let current = state
                    .notifiers
                    .get(&k)
                    .ok_or_else(|| anyhow!("notifiers \"{name}\" not found"))?;
                let updated = patched(current, patch)?;
                state.notifiers.insert(k, updated);
            }
        }
        state
            .status_patches
            .push((kind, format!("{namespace}/{name}"), patch.clone()));
        Ok(())
    }

    async fn patch_provider_metadata(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let k = key(namespace, name);
        let current = state
            .providers
            .get(&k)
            .ok_or_else(|| anyhow!("providers \"{name}\" not found"))?;
        let updated = patched(current, patch)?;
        state.providers.insert(k, updated);
        state
            .metadata_patches
            .push((format!("{namespace}/{name}"), patch.clone()));
        Ok(())
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret> {
        self.state
            .lock()
            .unwrap()
            .secrets
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| {
                anyhow::Error::from(LookupError::NotFound {
                    kind: KIND_SECRET,
                    name: name.to_string(),
                })
            })
    }

    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<ConfigMap> {
        self.state
            .lock()
            .unwrap()
            .config_maps
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| {
                anyhow::Error::from(LookupError::NotFound {
                    kind: KIND_CONFIG_MAP,
                    name: name.to_string(),
                })
            })
    }
}

// ============================================================================
// DNS provider fake
// ============================================================================

#[derive(Default)]
struct DnsState {
    ip: String,
    set_calls: Vec<String>,
    fail_get: bool,
    fail_set: bool,
}

/// Shared state behind the fake DNS clients built by [`FakeDns::factory`].
#[derive(Clone, Default)]
pub struct FakeDns {
    state: Arc<Mutex<DnsState>>,
}

impl FakeDns {
    /// A provider currently serving `ip`.
    pub fn serving(ip: &str) -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().ip = ip.to_string();
        fake
    }

    pub fn fail_get(&self) {
        self.state.lock().unwrap().fail_get = true;
    }

    pub fn fail_set(&self) {
        self.state.lock().unwrap().fail_set = true;
    }

    pub fn set_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().set_calls.clone()
    }

    pub fn factory(&self) -> ClientFactory {
        let fake = self.clone();
        Arc::new(move |_name: &str, _secret: &Secret, _config_map: &ConfigMap| {
            Ok(Box::new(fake.clone()) as Box<dyn DnsClient>)
        })
    }
}

#[async_trait]
impl DnsClient for FakeDns {
    async fn get_ip(&self) -> Result<String, ClientError> {
        let state = self.state.lock().unwrap();
        if state.fail_get {
            return Err(ClientError::NoZoneResolved);
        }
        Ok(state.ip.clone())
    }

    async fn set_ip(&self, ip: &str) -> Result<(), ClientError> {
        let mut state = self.state.lock().unwrap();
        state.set_calls.push(ip.to_string());
        if state.fail_set {
            return Err(ClientError::Api {
                status: 500,
                message: "internal error".to_string(),
            });
        }
        state.ip = ip.to_string();
        Ok(())
    }
}

// ============================================================================
// Notification fake
// ============================================================================

#[derive(Default)]
struct NotificationState {
    greetings: usize,
    messages: Vec<String>,
    fail_greetings: bool,
    fail_notifications: bool,
}

/// Shared state behind the fake notification clients built by [`FakeChannel::factory`].
#[derive(Clone, Default)]
pub struct FakeChannel {
    state: Arc<Mutex<NotificationState>>,
}

impl FakeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_greetings(&self) {
        self.state.lock().unwrap().fail_greetings = true;
    }

    pub fn fail_notifications(&self) {
        self.state.lock().unwrap().fail_notifications = true;
    }

    pub fn greetings(&self) -> usize {
        self.state.lock().unwrap().greetings
    }

    pub fn messages(&self) -> Vec<String> {
        self.state.lock().unwrap().messages.clone()
    }

    pub fn factory(&self) -> NotifierFactory {
        let fake = self.clone();
        Arc::new(move |_name: &str, _secret: &Secret, _config_map: &ConfigMap| {
            Ok(Box::new(fake.clone()) as Box<dyn NotificationClient>)
        })
    }
}

#[async_trait]
impl NotificationClient for FakeChannel {
    async fn send_greetings(&self) -> Result<(), NotifierError> {
        let mut state = self.state.lock().unwrap();
        state.greetings += 1;
        if state.fail_greetings {
            return Err(NotifierError::Rejected {
                status: 404,
                body: "Unknown Webhook".to_string(),
            });
        }
        Ok(())
    }

    async fn send_notification(&self, message: &str) -> Result<(), NotifierError> {
        let mut state = self.state.lock().unwrap();
        state.messages.push(message.to_string());
        if state.fail_notifications {
            return Err(NotifierError::Rejected {
                status: 500,
                body: "channel unavailable".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Public IP fake
// ============================================================================

/// [`PublicIpSource`] answering with a fixed IP, or failing when none is set.
#[derive(Default)]
pub struct FakeIpSource {
    ip: Option<String>,
    preferred_urls: Mutex<Vec<Option<String>>>,
}

impl FakeIpSource {
    pub fn answering(ip: &str) -> Self {
        Self {
            ip: Some(ip.to_string()),
            preferred_urls: Mutex::default(),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    /// `preferred_url` of every lookup, in order.
    pub fn preferred_urls(&self) -> Vec<Option<String>> {
        self.preferred_urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PublicIpSource for FakeIpSource {
    async fn public_ip(&self, preferred_url: Option<&str>) -> Result<String, IpDiscoveryError> {
        self.preferred_urls
            .lock()
            .unwrap()
            .push(preferred_url.map(str::to_string));
        self.ip.clone().ok_or(IpDiscoveryError::Exhausted)
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn test_context(
    store: &MockStore,
    ip_source: Arc<FakeIpSource>,
    dns: &FakeDns,
    channel: &FakeChannel,
) -> Arc<Context> {
    Arc::new(Context {
        store: Arc::new(store.clone()),
        ip_source,
        client_factory: dns.factory(),
        notifier_factory: channel.factory(),
    })
}

fn meta(namespace: &str, name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        ..ObjectMeta::default()
    }
}

pub fn provider(namespace: &str, name: &str, generation: i64) -> Provider {
    let mut provider = Provider::new(
        name,
        ProviderSpec {
            name: "Cloudflare".to_string(),
            secret_name: "cloudflare-token".to_string(),
            config_map: "cloudflare-config".to_string(),
            retry_interval: 300,
            custom_ip_provider: None,
            notifier_refs: vec![],
        },
    );
    provider.metadata = ObjectMeta {
        generation: Some(generation),
        ..meta(namespace, name)
    };
    provider
}

/// A provider referencing `notifier` (same namespace) that last saw `provider_ip`/`public_ip`.
pub fn provider_with_ips(
    name: &str,
    notifier: &str,
    provider_ip: &str,
    public_ip: &str,
) -> Provider {
    let mut provider = provider(TEST_NAMESPACE, name, 1);
    provider.spec.notifier_refs = vec![ResourceRef {
        name: notifier.to_string(),
        namespace: None,
    }];
    provider.status = Some(ProviderStatus {
        provider_ip: provider_ip.to_string(),
        public_ip: public_ip.to_string(),
        ..ProviderStatus::default()
    });
    provider
}

pub fn notifier(namespace: &str, name: &str, generation: i64) -> Notifier {
    let mut notifier = Notifier::new(
        name,
        NotifierSpec {
            name: "Webhook".to_string(),
            secret_name: "webhook-url".to_string(),
            config_map: "webhook-config".to_string(),
        },
    );
    notifier.metadata = ObjectMeta {
        generation: Some(generation),
        ..meta(namespace, name)
    };
    notifier
}

pub fn secret(namespace: &str, name: &str, data: &[(&str, &str)]) -> Secret {
    Secret {
        metadata: meta(namespace, name),
        data: Some(
            data.iter()
                .map(|(k, v)| ((*k).to_string(), ByteString(v.as_bytes().to_vec())))
                .collect(),
        ),
        ..Secret::default()
    }
}

pub fn config_map(namespace: &str, name: &str, data: &[(&str, &str)]) -> ConfigMap {
    ConfigMap {
        metadata: meta(namespace, name),
        data: Some(
            data.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        ),
        ..ConfigMap::default()
    }
}

/// Store holding the `Secret` and `ConfigMap` that [`provider`] and [`notifier`] reference.
pub fn store_with_dependencies() -> MockStore {
    MockStore::new()
        .with_secret(secret(TEST_NAMESPACE, "cloudflare-token", &[("apiToken", "token")]))
        .with_config_map(config_map(TEST_NAMESPACE, "cloudflare-config", &[("config", "{}")]))
        .with_secret(secret(
            TEST_NAMESPACE,
            "webhook-url",
            &[("url", "https://hooks.example.com/x")],
        ))
        .with_config_map(config_map(TEST_NAMESPACE, "webhook-config", &[("config", "{}")]))
}
