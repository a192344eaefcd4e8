// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the notifier registry and webhook construction

#[cfg(test)]
mod tests {
    use crate::errors::NotifierError;
    use crate::notifiers::webhook::{greeting_message, WebhookNotifier};
    use crate::notifiers::{create_notifier, NotifierKind};
    use k8s_openapi::api::core::v1::{ConfigMap, Secret};
    use k8s_openapi::ByteString;
    use std::collections::BTreeMap;

    fn secret_with_url(url: &str) -> Secret {
        Secret {
            data: Some(BTreeMap::from([(
                "url".to_string(),
                ByteString(url.as_bytes().to_vec()),
            )])),
            ..Default::default()
        }
    }

    #[test]
    fn test_notifier_kind_parsing() {
        assert_eq!("Webhook".parse::<NotifierKind>().unwrap(), NotifierKind::Webhook);

        let err = "Slack".parse::<NotifierKind>().unwrap_err();
        assert_eq!(err.to_string(), "could not create a notifier of type: Slack");
    }

    #[test]
    fn test_create_notifier_webhook() {
        let notifier = create_notifier(
            "Webhook",
            &secret_with_url("https://hooks.example.com/abc"),
            &ConfigMap::default(),
        );
        assert!(notifier.is_ok());
    }

    #[test]
    fn test_webhook_missing_url() {
        let err = WebhookNotifier::from_resources(&Secret::default(), &ConfigMap::default())
            .unwrap_err();

        assert!(matches!(err, NotifierError::MissingSecretKey { .. }));
        assert_eq!(err.to_string(), "`url` not found in secret");
    }

    #[test]
    fn test_webhook_invalid_url() {
        let err =
            WebhookNotifier::from_resources(&secret_with_url("not a url"), &ConfigMap::default())
                .unwrap_err();

        assert!(matches!(err, NotifierError::InvalidUrl(_)));
    }

    #[test]
    fn test_webhook_url_is_trimmed() {
        let notifier = WebhookNotifier::from_resources(
            &secret_with_url("https://hooks.example.com/abc\n"),
            &ConfigMap::default(),
        )
        .unwrap();

        assert_eq!(notifier.url().as_str(), "https://hooks.example.com/abc");
    }

    #[test]
    fn test_greeting_message() {
        assert_eq!(greeting_message(), "`ddns-operator` is starting its watch.");
    }
}
