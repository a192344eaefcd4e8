// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation controllers for DDNS resources.
//!
//! # Reconciliation Architecture
//!
//! Both controllers follow the standard level-triggered pattern:
//!
//! 1. **Fetch** - Read the resource and the `Secret`/`ConfigMap` it references
//! 2. **Build** - Construct the external client through an injected factory
//! 3. **Compare** - Compare observed state with the desired state
//! 4. **Act** - Push an IP update or a notification when they diverge
//! 5. **Status** - Record conditions and fields, writing only what changed
//!
//! Every step can fail. A failure ends the pass with an error and the
//! controller runtime retries later. Nothing is retried inside a pass.
//!
//! # Available Reconcilers
//!
//! - [`reconcile_provider`] - Keeps a DNS provider's A records on the public IP
//! - [`reconcile_notifier`] - Greets a notification channel and reports IP changes
//!
//! # Example: Using a Reconciler
//!
//! ```rust,no_run
//! use ddns_operator::context::Context;
//! use ddns_operator::reconcilers::reconcile_provider;
//! use std::sync::Arc;
//!
//! async fn reconcile(ctx: Arc<Context>) -> anyhow::Result<()> {
//!     let action = reconcile_provider(ctx, "ddns-system", "cloudflare").await?;
//!     println!("next: {action:?}");
//!     Ok(())
//! }
//! ```

pub mod conditions;
pub mod dependencies;
pub mod marker;
pub mod notifier;
pub mod provider;
pub mod status;

pub use notifier::{notifiers_for_provider, reconcile_notifier};
pub use provider::reconcile_provider;

/// Replace `slot` with `value` if they differ.
///
/// Used inside status mutations so that writing an unchanged value reports
/// "no change" and the patch is skipped.
///
/// # Returns
///
/// * `true` - The value changed
/// * `false` - The value was already equal
pub fn update_field<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod mod_tests;
