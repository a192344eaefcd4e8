// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `reconcilers/mod.rs`

#[cfg(test)]
mod tests {
    use crate::reconcilers::update_field;

    #[test]
    fn test_update_field_changes_value() {
        let mut ip = String::new();

        assert!(update_field(&mut ip, "192.0.2.1".to_string()));
        assert_eq!(ip, "192.0.2.1");
    }

    #[test]
    fn test_update_field_same_value_is_noop() {
        let mut generation = Some(3_i64);

        assert!(!update_field(&mut generation, Some(3)));
        assert_eq!(generation, Some(3));
    }

    #[test]
    fn test_update_field_bool() {
        let mut ready = false;

        assert!(update_field(&mut ready, true));
        assert!(!update_field(&mut ready, true));
        assert!(update_field(&mut ready, false));
    }
}
