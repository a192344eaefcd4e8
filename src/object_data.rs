// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Helpers to read values out of `Secret` and `ConfigMap` objects.

use k8s_openapi::api::core::v1::{ConfigMap, Secret};

/// Read a UTF-8 value from a `Secret`.
///
/// `data` wins over `stringData`. Values that are not valid UTF-8 are treated as missing.
#[must_use]
pub fn secret_string(secret: &Secret, key: &str) -> Option<String> {
    if let Some(value) = secret.data.as_ref().and_then(|data| data.get(key)) {
        return String::from_utf8(value.0.clone()).ok();
    }
    secret
        .string_data
        .as_ref()
        .and_then(|data| data.get(key))
        .cloned()
}

/// Read a non-empty value from a `ConfigMap`'s `data`.
#[must_use]
pub fn config_map_string<'a>(config_map: &'a ConfigMap, key: &str) -> Option<&'a str> {
    config_map
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}
