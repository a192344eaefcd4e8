// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory condition ledger for `Provider` and `Notifier` status.
//!
//! Every resource keeps exactly one [`Condition`] per declared type. Types that
//! were never evaluated are kept as `Unknown` placeholders so users can see which
//! checks are still pending.
//!
//! Nothing in this module talks to the API server. Callers mutate the conditions
//! in memory and persist them with
//! [`patch_status`](crate::reconcilers::status::patch_status), which only writes
//! when the ledger reports a change.
//!
//! # Example
//!
//! ```rust
//! use ddns_operator::reconcilers::conditions::{set_condition, ConditionOption};
//!
//! let mut conditions = Vec::new();
//! let changed = set_condition(
//!     &mut conditions,
//!     "Secret",
//!     &[ConditionOption::True, ConditionOption::Reason("SecretFound".into())],
//! );
//! assert!(changed);
//!
//! // Applying the same options again is a no-op
//! let changed = set_condition(
//!     &mut conditions,
//!     "Secret",
//!     &[ConditionOption::True, ConditionOption::Reason("SecretFound".into())],
//! );
//! assert!(!changed);
//! ```

use crate::constants::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_STATUS_UNKNOWN,
    CONDITION_TYPE_CLIENT, CONDITION_TYPE_CONFIG_MAP, CONDITION_TYPE_SECRET,
};
use crate::crd::{Condition, NotifierStatus, ProviderStatus};
use crate::status_reasons::{MESSAGE_UNKNOWN, REASON_UNKNOWN};
use chrono::Utc;

/// A single mutation applied to a condition by [`set_condition`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConditionOption {
    /// Set the reason.
    Reason(String),
    /// Set the human readable message.
    Message(String),
    /// Set both reason and message.
    ReasonAndMessage(String, String),
    /// Set the status to `True`.
    True,
    /// Set the status to `False`.
    False,
    /// Record the generation the condition was computed against.
    ObservedGeneration(i64),
}

impl ConditionOption {
    /// Apply the option, returning whether the condition changed.
    fn apply(&self, condition: &mut Condition) -> bool {
        match self {
            Self::Reason(reason) => replace_if_different(&mut condition.reason, reason),
            Self::Message(message) => replace_if_different(&mut condition.message, message),
            Self::ReasonAndMessage(reason, message) => {
                let reason_changed = replace_if_different(&mut condition.reason, reason);
                let message_changed = replace_if_different(&mut condition.message, message);
                reason_changed || message_changed
            }
            Self::True => set_status(condition, CONDITION_STATUS_TRUE),
            Self::False => set_status(condition, CONDITION_STATUS_FALSE),
            Self::ObservedGeneration(generation) => {
                if condition.observed_generation == Some(*generation) {
                    return false;
                }
                condition.observed_generation = Some(*generation);
                true
            }
        }
    }
}

fn replace_if_different(slot: &mut Option<String>, value: &str) -> bool {
    if slot.as_deref() == Some(value) {
        return false;
    }
    *slot = Some(value.to_string());
    true
}

fn set_status(condition: &mut Condition, status: &str) -> bool {
    if condition.status == status {
        return false;
    }
    condition.status = status.to_string();
    true
}

/// Access to the condition list of a status subresource.
pub trait HasConditions {
    /// Condition types every resource of this kind carries.
    const CONDITION_TYPES: &'static [&'static str];

    fn conditions(&self) -> &[Condition];

    fn conditions_mut(&mut self) -> &mut Vec<Condition>;
}

impl HasConditions for ProviderStatus {
    const CONDITION_TYPES: &'static [&'static str] = &[
        CONDITION_TYPE_CONFIG_MAP,
        CONDITION_TYPE_SECRET,
        CONDITION_TYPE_CLIENT,
    ];

    fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.conditions
    }
}

impl HasConditions for NotifierStatus {
    const CONDITION_TYPES: &'static [&'static str] = &[
        CONDITION_TYPE_CONFIG_MAP,
        CONDITION_TYPE_SECRET,
        CONDITION_TYPE_CLIENT,
    ];

    fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.conditions
    }
}

/// Create an `Unknown` placeholder condition for `condition_type`.
#[must_use]
pub fn unknown_condition(condition_type: &str) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: CONDITION_STATUS_UNKNOWN.to_string(),
        reason: Some(REASON_UNKNOWN.to_string()),
        message: Some(MESSAGE_UNKNOWN.to_string()),
        observed_generation: None,
        last_transition_time: Some(Utc::now().to_rfc3339()),
    }
}

/// Find a condition by exact type. The first match wins.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Insert an `Unknown` placeholder for every type in `condition_types` that is missing.
///
/// # Returns
///
/// `true` if at least one placeholder was added.
pub fn ensure_known_types(conditions: &mut Vec<Condition>, condition_types: &[&str]) -> bool {
    let mut changed = false;
    for condition_type in condition_types {
        if find_condition(conditions, condition_type).is_none() {
            conditions.push(unknown_condition(condition_type));
            changed = true;
        }
    }
    changed
}

/// Apply `options` in order to the condition of type `condition_type`.
///
/// The condition is created as an `Unknown` placeholder first when it does not exist.
/// `lastTransitionTime` is refreshed only when something actually changed.
///
/// # Returns
///
/// `true` if the condition was created or any option modified it.
pub fn set_condition(
    conditions: &mut Vec<Condition>,
    condition_type: &str,
    options: &[ConditionOption],
) -> bool {
    let mut changed = false;

    let index = if let Some(index) = conditions.iter().position(|c| c.r#type == condition_type) {
        index
    } else {
        conditions.push(unknown_condition(condition_type));
        changed = true;
        conditions.len() - 1
    };

    let condition = &mut conditions[index];
    for option in options {
        changed |= option.apply(condition);
    }

    if changed {
        condition.last_transition_time = Some(Utc::now().to_rfc3339());
    }

    changed
}
