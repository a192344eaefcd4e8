// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-notifier change markers stored on `Provider` objects.
//!
//! After a notifier successfully announced a provider IP, it records that IP
//! in an annotation on the `Provider`:
//!
//! ```yaml
//! metadata:
//!   annotations:
//!     ddns.firestoned.io/discord_ddns-system: "203.0.113.7"
//! ```
//!
//! The key identifies the notifier by name and namespace. A notification is
//! only sent when the provider IP differs from the recorded one, and the
//! marker is only written after delivery succeeded, so a failed delivery is
//! retried on the next pass.
//!
//! Code never builds or parses these keys by hand; it goes through
//! [`NotificationMarker`] and [`notified_ips`].

use crate::constants::API_GROUP;
use crate::crd::{Notifier, Provider};
use kube::ResourceExt;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Identity of the notifier a marker belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationMarker {
    pub notifier_name: String,
    pub notifier_namespace: String,
}

impl NotificationMarker {
    #[must_use]
    pub fn new(notifier_name: impl Into<String>, notifier_namespace: impl Into<String>) -> Self {
        Self {
            notifier_name: notifier_name.into(),
            notifier_namespace: notifier_namespace.into(),
        }
    }

    /// Marker of `notifier`.
    #[must_use]
    pub fn for_notifier(notifier: &Notifier) -> Self {
        Self::new(notifier.name_any(), notifier.namespace().unwrap_or_default())
    }

    /// Annotation key: `<api-group>/<notifier-name>_<notifier-namespace>`.
    #[must_use]
    pub fn annotation_key(&self) -> String {
        format!(
            "{API_GROUP}/{}_{}",
            self.notifier_name, self.notifier_namespace
        )
    }

    /// Parse an annotation key produced by [`annotation_key`](Self::annotation_key).
    ///
    /// Returns `None` for keys of other groups or without a namespace part.
    #[must_use]
    pub fn from_annotation_key(key: &str) -> Option<Self> {
        let rest = key.strip_prefix(API_GROUP)?.strip_prefix('/')?;
        // Kubernetes names never contain '_', so the last one splits name and namespace.
        let (name, namespace) = rest.rsplit_once('_')?;
        if name.is_empty() || namespace.is_empty() {
            return None;
        }
        Some(Self::new(name, namespace))
    }

    /// Merge patch recording `ip` as announced on the `Provider`.
    #[must_use]
    pub fn patch(&self, ip: &str) -> Value {
        json!({
            "metadata": {
                "annotations": {
                    self.annotation_key(): ip,
                }
            }
        })
    }
}

/// Last announced IP per notifier, as recorded on `provider`.
#[must_use]
pub fn notified_ips(provider: &Provider) -> BTreeMap<NotificationMarker, String> {
    provider
        .annotations()
        .iter()
        .filter_map(|(key, ip)| {
            NotificationMarker::from_annotation_key(key).map(|marker| (marker, ip.clone()))
        })
        .collect()
}
