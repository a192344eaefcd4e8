// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status patch engine for `Provider` and `Notifier` resources.
//!
//! Status writes follow one rule: mutate in memory, and only talk to the API
//! server when the mutation reports a change. Repeated reconciles of an object
//! whose world did not change therefore produce no writes at all, which keeps
//! watch events (and the reconciles they trigger) from feeding back into
//! themselves.
//!
//! The body sent to the API server is an RFC 7386 JSON merge patch computed
//! between the status before and after the mutation, so only touched fields
//! travel over the wire.
//!
//! # Example
//!
//! ```rust,no_run
//! # use ddns_operator::crd::Provider;
//! # use ddns_operator::store::ResourceStore;
//! # async fn example(store: &dyn ResourceStore, provider: &mut Provider) -> anyhow::Result<()> {
//! use ddns_operator::reconcilers::status::patch_status;
//!
//! let public_ip = "203.0.113.7".to_string();
//! patch_status(store, provider, |status| {
//!     if status.public_ip == public_ip {
//!         return false;
//!     }
//!     status.public_ip = public_ip.clone();
//!     true
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use crate::crd::{Notifier, NotifierStatus, Provider, ProviderStatus};
use crate::reconcilers::conditions::{set_condition, ConditionOption, HasConditions};
use crate::store::{ResourceKind, ResourceStore};
use anyhow::Result;
use kube::{Resource, ResourceExt};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

/// A custom resource with a status subresource managed by this operator.
pub trait StatusResource: Resource<DynamicType = ()> + Send + Sync {
    type Status: HasConditions + Serialize + Default + Send + Sync;

    const KIND: ResourceKind;

    /// The status as currently held in memory, if any.
    fn current_status(&self) -> Option<&Self::Status>;

    /// Mutable access to the status, initializing an empty one when missing.
    fn status_mut(&mut self) -> &mut Self::Status;
}

impl StatusResource for Provider {
    type Status = ProviderStatus;

    const KIND: ResourceKind = ResourceKind::Provider;

    fn current_status(&self) -> Option<&ProviderStatus> {
        self.status.as_ref()
    }

    fn status_mut(&mut self) -> &mut ProviderStatus {
        self.status.get_or_insert_with(ProviderStatus::default)
    }
}

impl StatusResource for Notifier {
    type Status = NotifierStatus;

    const KIND: ResourceKind = ResourceKind::Notifier;

    fn current_status(&self) -> Option<&NotifierStatus> {
        self.status.as_ref()
    }

    fn status_mut(&mut self) -> &mut NotifierStatus {
        self.status.get_or_insert_with(NotifierStatus::default)
    }
}

/// Compute the RFC 7386 merge patch that turns `before` into `after`.
///
/// Objects are diffed key by key, keys missing from `after` become `null`,
/// everything else (arrays included) is replaced whole.
#[must_use]
pub fn merge_patch_diff(before: &Value, after: &Value) -> Value {
    match (before, after) {
        (Value::Object(before), Value::Object(after)) => {
            let mut patch = Map::new();
            for (key, old) in before {
                match after.get(key) {
                    None => {
                        patch.insert(key.clone(), Value::Null);
                    }
                    Some(new) if new != old => {
                        patch.insert(key.clone(), merge_patch_diff(old, new));
                    }
                    Some(_) => {}
                }
            }
            for (key, new) in after {
                if !before.contains_key(key) {
                    patch.insert(key.clone(), new.clone());
                }
            }
            Value::Object(patch)
        }
        _ => after.clone(),
    }
}

/// Apply `mutate` to the resource status and persist the result if it changed.
///
/// `mutate` must return `true` when it modified the status. When it returns
/// `false` no request is made.
///
/// # Returns
///
/// Whether a patch was sent.
///
/// # Errors
///
/// Returns the store error unchanged when the patch request fails. The in-memory
/// status keeps the mutation in that case.
pub async fn patch_status<K, F>(
    store: &dyn ResourceStore,
    resource: &mut K,
    mutate: F,
) -> Result<bool>
where
    K: StatusResource,
    F: FnOnce(&mut K::Status) -> bool,
{
    let before = serde_json::to_value(resource.current_status())?;

    if !mutate(resource.status_mut()) {
        debug!(
            "{} {}/{} status unchanged, skipping update",
            K::KIND,
            resource.namespace().unwrap_or_default(),
            resource.name_any()
        );
        return Ok(false);
    }

    let after = serde_json::to_value(resource.current_status())?;
    let patch = json!({ "status": merge_patch_diff(&before, &after) });

    let name = resource.name_any();
    let namespace = resource.namespace().unwrap_or_default();
    store.patch_status(K::KIND, &namespace, &name, &patch).await?;

    debug!("Patched {} {}/{} status: {}", K::KIND, namespace, name, patch);

    Ok(true)
}

/// Set one condition and persist it.
///
/// The condition is always stamped with the resource's current `metadata.generation`.
///
/// # Errors
///
/// Returns an error if the status patch fails.
pub async fn record_condition<K: StatusResource>(
    store: &dyn ResourceStore,
    resource: &mut K,
    condition_type: &str,
    mut options: Vec<ConditionOption>,
) -> Result<()> {
    options.push(ConditionOption::ObservedGeneration(generation_of(resource)));
    patch_status(store, resource, |status| {
        set_condition(status.conditions_mut(), condition_type, &options)
    })
    .await?;
    Ok(())
}

/// `metadata.generation` of a resource, `0` when unset.
#[must_use]
pub fn generation_of<K: Resource>(resource: &K) -> i64 {
    resource.meta().generation.unwrap_or_default()
}
