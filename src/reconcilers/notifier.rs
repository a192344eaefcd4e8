// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `Notifier` reconciliation logic.
//!
//! A notifier goes through two phases:
//!
//! 1. **Greeting** - While `status.isReady` is false, the pass sends a greeting
//!    to prove the channel works. Success flips `isReady` and requeues at once.
//! 2. **Notifying** - Once ready, every pass walks the providers that reference
//!    the notifier and announces provider IPs that were not announced yet.
//!
//! A failed notification demotes the notifier back to the greeting phase.
//!
//! Which IP was last announced to a notifier is recorded on the `Provider`
//! through a [`NotificationMarker`], written only after delivery succeeded.

use crate::constants::CONDITION_TYPE_CLIENT;
use crate::context::Context;
use crate::crd::{Notifier, NotifierStatus, Provider};
use crate::metrics;
use crate::notifiers::NotificationClient;
use crate::reconcilers::conditions::{
    ensure_known_types, set_condition, ConditionOption, HasConditions,
};
use crate::reconcilers::dependencies::{fetch_config_map, fetch_secret, record_client_creation};
use crate::reconcilers::marker::{notified_ips, NotificationMarker};
use crate::reconcilers::provider::references_notifier;
use crate::reconcilers::status::{generation_of, patch_status, record_condition};
use crate::reconcilers::update_field;
use crate::status_reasons::{
    greetings_failed_message, notification_failed_message, MESSAGE_COMMUNICATIONS_ESTABLISHED,
    MESSAGE_NOTIFICATION_SENT, REASON_CLIENT_COMMUNICATION,
};
use crate::store::ResourceStore;
use anyhow::{Context as _, Result};
use kube::runtime::controller::Action;
use kube::runtime::reflector::ObjectRef;
use kube::ResourceExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const NOTIFICATION_KIND_GREETING: &str = "greeting";
const NOTIFICATION_KIND_CHANGE: &str = "change";

/// Reconcile the `Notifier` `namespace/name`.
///
/// # Returns
///
/// * `Action::requeue(Duration::ZERO)` - Right after a successful greeting
/// * `Action::await_change()` - After a notifying pass, or when the notifier no longer exists
///
/// # Errors
///
/// Returns an error when a dependency lookup, client construction, a delivery
/// or a Kubernetes write fails.
pub async fn reconcile_notifier(ctx: Arc<Context>, namespace: &str, name: &str) -> Result<Action> {
    let store = ctx.store.as_ref();

    let Some(mut notifier) = store.get_notifier(namespace, name).await? else {
        debug!("Notifier {}/{} not found, ignoring", namespace, name);
        return Ok(Action::await_change());
    };

    info!("Reconciling Notifier: {}/{}", namespace, name);

    patch_status(store, &mut notifier, |status| {
        ensure_known_types(status.conditions_mut(), NotifierStatus::CONDITION_TYPES)
    })
    .await?;

    let secret = fetch_secret(store, &mut notifier).await?;
    let config_map = fetch_config_map(store, &mut notifier).await?;
    let created = (ctx.notifier_factory)(&notifier.spec.name, &secret, &config_map);
    let client = record_client_creation(store, &mut notifier, created).await?;

    let is_ready = notifier.status.as_ref().is_some_and(|status| status.is_ready);
    if !is_ready {
        greet(store, &mut notifier, client.as_ref()).await?;
        return Ok(Action::requeue(Duration::ZERO));
    }

    let marker = NotificationMarker::for_notifier(&notifier);
    let providers = store.list_providers().await?;
    for provider in providers
        .iter()
        .filter(|provider| references_notifier(provider, namespace, name))
    {
        notify_of_change(store, &mut notifier, client.as_ref(), &marker, provider).await?;
    }

    let generation = generation_of(&notifier);
    patch_status(store, &mut notifier, |status| {
        update_field(&mut status.observed_generation, Some(generation))
    })
    .await?;

    Ok(Action::await_change())
}

/// Send the greeting and record the outcome on the `Client` condition.
async fn greet(
    store: &dyn ResourceStore,
    notifier: &mut Notifier,
    client: &dyn NotificationClient,
) -> Result<()> {
    let generation = generation_of(notifier);

    if let Err(e) = client.send_greetings().await {
        warn!(
            "Unable to greet Notifier {}/{}: {}",
            notifier.namespace().unwrap_or_default(),
            notifier.name_any(),
            e
        );
        metrics::record_notification(NOTIFICATION_KIND_GREETING, false);

        let options = [
            ConditionOption::False,
            ConditionOption::ReasonAndMessage(
                REASON_CLIENT_COMMUNICATION.to_string(),
                greetings_failed_message(&e),
            ),
            ConditionOption::ObservedGeneration(generation),
        ];
        patch_status(store, notifier, |status| {
            set_condition(status.conditions_mut(), CONDITION_TYPE_CLIENT, &options)
        })
        .await?;

        return Err(anyhow::Error::new(e).context("unable to send greetings"));
    }

    metrics::record_notification(NOTIFICATION_KIND_GREETING, true);
    info!(
        "Notifier {}/{} greeted, marking as ready",
        notifier.namespace().unwrap_or_default(),
        notifier.name_any()
    );

    let options = [
        ConditionOption::True,
        ConditionOption::ReasonAndMessage(
            REASON_CLIENT_COMMUNICATION.to_string(),
            MESSAGE_COMMUNICATIONS_ESTABLISHED.to_string(),
        ),
        ConditionOption::ObservedGeneration(generation),
    ];
    patch_status(store, notifier, |status| {
        let condition_changed =
            set_condition(status.conditions_mut(), CONDITION_TYPE_CLIENT, &options);
        let ready_changed = update_field(&mut status.is_ready, true);
        condition_changed || ready_changed
    })
    .await?;

    Ok(())
}

/// Announce the provider IP of `provider` unless it was already announced.
async fn notify_of_change(
    store: &dyn ResourceStore,
    notifier: &mut Notifier,
    client: &dyn NotificationClient,
    marker: &NotificationMarker,
    provider: &Provider,
) -> Result<()> {
    let provider_name = provider.name_any();
    let provider_namespace = provider.namespace().unwrap_or_default();
    let (provider_ip, public_ip) = provider
        .status
        .as_ref()
        .map(|status| (status.provider_ip.as_str(), status.public_ip.as_str()))
        .unwrap_or_default();

    if provider_ip.is_empty() {
        debug!("Provider {}/{} has no IP yet", provider_namespace, provider_name);
        return Ok(());
    }

    if notified_ips(provider).get(marker).map(String::as_str) == Some(provider_ip) {
        debug!(
            "Provider {}/{} IP {} already announced",
            provider_namespace, provider_name, provider_ip
        );
        return Ok(());
    }

    info!(
        "Provider {}/{} IP changed to {}, notifying",
        provider_namespace, provider_name, provider_ip
    );

    let message = notification_message(provider_ip, public_ip, &provider_name);
    let generation = generation_of(notifier);

    if let Err(e) = client.send_notification(&message).await {
        warn!(
            "Unable to notify about Provider {}/{}: {}",
            provider_namespace, provider_name, e
        );
        metrics::record_notification(NOTIFICATION_KIND_CHANGE, false);

        let options = [
            ConditionOption::False,
            ConditionOption::ReasonAndMessage(
                REASON_CLIENT_COMMUNICATION.to_string(),
                notification_failed_message(&e),
            ),
            ConditionOption::ObservedGeneration(generation),
        ];
        patch_status(store, notifier, |status| {
            let ready_changed = update_field(&mut status.is_ready, false);
            let condition_changed =
                set_condition(status.conditions_mut(), CONDITION_TYPE_CLIENT, &options);
            ready_changed || condition_changed
        })
        .await?;

        return Err(anyhow::Error::new(e).context("unable to send notification"));
    }

    metrics::record_notification(NOTIFICATION_KIND_CHANGE, true);

    record_condition(
        store,
        notifier,
        CONDITION_TYPE_CLIENT,
        vec![
            ConditionOption::True,
            ConditionOption::ReasonAndMessage(
                REASON_CLIENT_COMMUNICATION.to_string(),
                MESSAGE_NOTIFICATION_SENT.to_string(),
            ),
        ],
    )
    .await?;

    store
        .patch_provider_metadata(&provider_namespace, &provider_name, &marker.patch(provider_ip))
        .await
        .with_context(|| {
            format!(
                "failed to record notification marker on Provider \
                 {provider_namespace}/{provider_name}"
            )
        })?;

    Ok(())
}

/// Text announcing a provider IP.
#[must_use]
pub fn notification_message(provider_ip: &str, public_ip: &str, provider_name: &str) -> String {
    if provider_ip == public_ip {
        format!(
            "Provider IP ({provider_ip}) in sync with Public IP. \
             From provider: ({provider_name})."
        )
    } else {
        format!(
            "Provider IP ({provider_ip}) out of sync with Public IP ({public_ip}). \
             From provider: ({provider_name})."
        )
    }
}

/// Notifiers referenced by `provider`, used to re-enqueue them when it changes.
#[must_use]
pub fn notifiers_for_provider(provider: &Provider) -> Vec<ObjectRef<Notifier>> {
    let provider_namespace = provider.namespace().unwrap_or_default();
    provider
        .spec
        .notifier_refs
        .iter()
        .map(|reference| {
            ObjectRef::new(&reference.name).within(reference.namespace_or(&provider_namespace))
        })
        .collect()
}
