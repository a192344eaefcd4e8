// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `Provider` reconciliation logic.
//!
//! A pass discovers the cluster's public IP, reads the IP the DNS provider
//! currently serves and pushes the public IP to the provider when they differ.
//! Every step is gated on the previous one; the first failure ends the pass.
//!
//! Providers are polled: a successful pass requeues after
//! `spec.retryInterval` seconds, which is the only way a change of the public IP
//! is noticed.

use crate::context::Context;
use crate::crd::Provider;
use crate::metrics;
use crate::reconcilers::dependencies::{fetch_config_map, fetch_secret, record_client_creation};
use crate::reconcilers::status::{generation_of, patch_status};
use crate::reconcilers::update_field;
use anyhow::{Context as _, Result};
use kube::runtime::controller::Action;
use kube::ResourceExt;
use std::sync::Arc;
use tracing::{debug, info};

/// Reconcile the `Provider` `namespace/name`.
///
/// # Returns
///
/// * `Action::requeue(retry_interval)` - After a successful pass
/// * `Action::await_change()` - When the provider no longer exists
///
/// # Errors
///
/// Returns an error when public IP discovery, a dependency lookup, client
/// construction, a DNS provider call or a status write fails.
pub async fn reconcile_provider(ctx: Arc<Context>, namespace: &str, name: &str) -> Result<Action> {
    let store = ctx.store.as_ref();

    let Some(mut provider) = store.get_provider(namespace, name).await? else {
        debug!("Provider {}/{} not found, ignoring", namespace, name);
        return Ok(Action::await_change());
    };

    info!("Reconciling Provider: {}/{}", namespace, name);

    let public_ip = ctx
        .ip_source
        .public_ip(provider.spec.custom_ip_provider.as_deref())
        .await
        .inspect_err(|_| metrics::record_error("Provider", "ip_discovery"))
        .context("failed to discover public IP")?;
    debug!(public_ip = %public_ip, "Discovered public IP");

    patch_status(store, &mut provider, |status| {
        update_field(&mut status.public_ip, public_ip.clone())
    })
    .await?;

    let secret = fetch_secret(store, &mut provider).await?;
    let config_map = fetch_config_map(store, &mut provider).await?;
    let created = (ctx.client_factory)(&provider.spec.name, &secret, &config_map);
    let client = record_client_creation(store, &mut provider, created).await?;

    let provider_ip = client
        .get_ip()
        .await
        .inspect_err(|_| metrics::record_error("Provider", "dns_provider"))
        .context("failed to read IP from DNS provider")?;
    debug!(provider_ip = %provider_ip, "Read IP from DNS provider");

    patch_status(store, &mut provider, |status| {
        update_field(&mut status.provider_ip, provider_ip.clone())
    })
    .await?;

    if public_ip != provider_ip {
        info!(
            "Provider {}/{} out of sync: provider IP {} differs from public IP {}",
            namespace, name, provider_ip, public_ip
        );

        client
            .set_ip(&public_ip)
            .await
            .inspect_err(|_| metrics::record_error("Provider", "dns_provider"))
            .context("failed to update IP at DNS provider")?;
        metrics::record_provider_ip_update(namespace, name);

        patch_status(store, &mut provider, |status| {
            update_field(&mut status.provider_ip, public_ip.clone())
        })
        .await?;
    }

    let generation = generation_of(&provider);
    patch_status(store, &mut provider, |status| {
        update_field(&mut status.observed_generation, Some(generation))
    })
    .await?;

    let requeue_after = provider.spec.retry_interval();
    debug!(
        "Provider {} reconciled, next pass in {}s",
        provider.name_any(),
        requeue_after.as_secs()
    );

    Ok(Action::requeue(requeue_after))
}

/// Whether `provider` lists the notifier `notifier_namespace/notifier_name` in its `notifierRefs`.
///
/// References without a namespace point into the provider's own namespace.
#[must_use]
pub fn references_notifier(
    provider: &Provider,
    notifier_namespace: &str,
    notifier_name: &str,
) -> bool {
    let provider_namespace = provider.namespace().unwrap_or_default();
    provider.spec.notifier_refs.iter().any(|reference| {
        reference.name == notifier_name
            && reference.namespace_or(&provider_namespace) == notifier_namespace
    })
}
