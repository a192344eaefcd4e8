// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Fetching the objects a resource depends on, and recording the outcome.
//!
//! Each fetch records its own condition before returning, whether it
//! succeeded or not, so a failed pass still tells the user which dependency
//! was missing. The error is then returned and the pass ends there.

use crate::constants::{
    CONDITION_STATUS_TRUE, CONDITION_TYPE_CLIENT, CONDITION_TYPE_CONFIG_MAP, CONDITION_TYPE_SECRET,
};
use crate::crd::{Notifier, Provider};
use crate::reconcilers::conditions::{find_condition, ConditionOption, HasConditions};
use crate::reconcilers::status::{record_condition, StatusResource};
use crate::status_reasons::{
    client_creation_failed_message, found_message, MESSAGE_CLIENT_CREATED,
    REASON_CLIENT_CREATED, REASON_CONFIG_MAP_FOUND, REASON_SECRET_FOUND,
};
use crate::store::ResourceStore;
use anyhow::Result;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::ResourceExt;
use tracing::{debug, warn};

/// A resource that references a `Secret` and a `ConfigMap` in its own namespace.
pub trait DependentResource: StatusResource {
    fn secret_name(&self) -> &str;

    fn config_map_name(&self) -> &str;
}

impl DependentResource for Provider {
    fn secret_name(&self) -> &str {
        &self.spec.secret_name
    }

    fn config_map_name(&self) -> &str {
        &self.spec.config_map
    }
}

impl DependentResource for Notifier {
    fn secret_name(&self) -> &str {
        &self.spec.secret_name
    }

    fn config_map_name(&self) -> &str {
        &self.spec.config_map
    }
}

fn found_options(reason: &str, message: String) -> Vec<ConditionOption> {
    vec![
        ConditionOption::True,
        ConditionOption::ReasonAndMessage(reason.to_string(), message),
    ]
}

fn failed_options(reason: &str, message: String) -> Vec<ConditionOption> {
    vec![
        ConditionOption::False,
        ConditionOption::ReasonAndMessage(reason.to_string(), message),
    ]
}

/// Fetch the `Secret` referenced by `resource` and record the `Secret` condition.
///
/// # Errors
///
/// Returns the lookup error when the secret cannot be read, or the status
/// patch error when the condition cannot be recorded.
pub async fn fetch_secret<K: DependentResource>(
    store: &dyn ResourceStore,
    resource: &mut K,
) -> Result<Secret> {
    let namespace = resource.namespace().unwrap_or_default();
    let name = resource.secret_name().to_string();

    match store.get_secret(&namespace, &name).await {
        Ok(secret) => {
            debug!(namespace = %namespace, secret = %name, "Found Secret");
            record_condition(
                store,
                resource,
                CONDITION_TYPE_SECRET,
                found_options(REASON_SECRET_FOUND, found_message("Secret", &name)),
            )
            .await?;
            Ok(secret)
        }
        Err(e) => {
            warn!(namespace = %namespace, secret = %name, error = %e, "Unable to fetch Secret");
            record_condition(
                store,
                resource,
                CONDITION_TYPE_SECRET,
                failed_options(REASON_SECRET_FOUND, e.to_string()),
            )
            .await?;
            Err(e.context(format!("failed to fetch Secret {namespace}/{name}")))
        }
    }
}

/// Fetch the `ConfigMap` referenced by `resource` and record the `ConfigMap` condition.
///
/// # Errors
///
/// Returns the lookup error when the config map cannot be read, or the status
/// patch error when the condition cannot be recorded.
pub async fn fetch_config_map<K: DependentResource>(
    store: &dyn ResourceStore,
    resource: &mut K,
) -> Result<ConfigMap> {
    let namespace = resource.namespace().unwrap_or_default();
    let name = resource.config_map_name().to_string();

    match store.get_config_map(&namespace, &name).await {
        Ok(config_map) => {
            debug!(namespace = %namespace, config_map = %name, "Found ConfigMap");
            record_condition(
                store,
                resource,
                CONDITION_TYPE_CONFIG_MAP,
                found_options(REASON_CONFIG_MAP_FOUND, found_message("ConfigMap", &name)),
            )
            .await?;
            Ok(config_map)
        }
        Err(e) => {
            warn!(
                namespace = %namespace,
                config_map = %name,
                error = %e,
                "Unable to fetch ConfigMap"
            );
            record_condition(
                store,
                resource,
                CONDITION_TYPE_CONFIG_MAP,
                failed_options(REASON_CONFIG_MAP_FOUND, e.to_string()),
            )
            .await?;
            Err(e.context(format!("failed to fetch ConfigMap {namespace}/{name}")))
        }
    }
}

/// Record the `Client` condition for the outcome of a factory call.
///
/// A `Client` condition that is already `True` keeps its reason and message on
/// success, since a later step (greeting, notification) wrote them.
///
/// # Errors
///
/// Returns the construction error when `created` failed, or the status patch
/// error when the condition cannot be recorded.
pub async fn record_client_creation<K, T, E>(
    store: &dyn ResourceStore,
    resource: &mut K,
    created: Result<T, E>,
) -> Result<T>
where
    K: StatusResource,
    E: std::error::Error + Send + Sync + 'static,
{
    match created {
        Ok(client) => {
            let already_true = resource
                .current_status()
                .and_then(|status| find_condition(status.conditions(), CONDITION_TYPE_CLIENT))
                .is_some_and(|condition| condition.status == CONDITION_STATUS_TRUE);
            let options = if already_true {
                vec![ConditionOption::True]
            } else {
                found_options(REASON_CLIENT_CREATED, MESSAGE_CLIENT_CREATED.to_string())
            };
            record_condition(store, resource, CONDITION_TYPE_CLIENT, options).await?;
            Ok(client)
        }
        Err(e) => {
            warn!(
                kind = %K::KIND,
                name = %resource.name_any(),
                error = %e,
                "Unable to create client"
            );
            record_condition(
                store,
                resource,
                CONDITION_TYPE_CLIENT,
                failed_options(REASON_CLIENT_CREATED, client_creation_failed_message(&e)),
            )
            .await?;
            Err(anyhow::Error::new(e).context("could not create client"))
        }
    }
}
