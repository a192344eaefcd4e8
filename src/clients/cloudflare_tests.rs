// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `cloudflare.rs`

#[cfg(test)]
mod tests {
    use crate::clients::cloudflare::{CloudflareClient, CloudflareConfig, RecordConfig, ZoneConfig};
    use crate::errors::ClientError;
    use k8s_openapi::api::core::v1::{ConfigMap, Secret};
    use k8s_openapi::ByteString;
    use std::collections::BTreeMap;

    fn secret(data: &[(&str, &str)]) -> Secret {
        Secret {
            data: Some(
                data.iter()
                    .map(|(k, v)| ((*k).to_string(), ByteString(v.as_bytes().to_vec())))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    fn config_map(data: &[(&str, &str)]) -> ConfigMap {
        ConfigMap {
            data: Some(
                data.iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect::<BTreeMap<_, _>>(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_config_parsing() {
        let raw = r#"{"cloudflare":{"zones":[{"name":"example.com","records":[{"name":"a.example.com","proxied":true},{"name":"b.example.com"}]}]}}"#;

        let config: CloudflareConfig = serde_json::from_str(raw).unwrap();

        assert_eq!(
            config.cloudflare.zones,
            vec![ZoneConfig {
                name: "example.com".to_string(),
                records: vec![
                    RecordConfig {
                        name: "a.example.com".to_string(),
                        proxied: true,
                    },
                    RecordConfig {
                        name: "b.example.com".to_string(),
                        proxied: false,
                    },
                ],
            }]
        );
    }

    #[test]
    fn test_from_resources_success() {
        let client = CloudflareClient::from_resources(
            &secret(&[("apiToken", "token")]),
            &config_map(&[("config", r#"{"cloudflare":{"zones":[]}}"#)]),
        )
        .unwrap();

        assert!(client.config().cloudflare.zones.is_empty());
    }

    #[test]
    fn test_from_resources_missing_config() {
        let err =
            CloudflareClient::from_resources(&secret(&[("apiToken", "token")]), &config_map(&[]))
                .unwrap_err();

        assert_eq!(err.to_string(), "`config` not found in configMap");
    }

    #[test]
    fn test_from_resources_empty_config() {
        let err = CloudflareClient::from_resources(
            &secret(&[("apiToken", "token")]),
            &config_map(&[("config", "")]),
        )
        .unwrap_err();

        assert!(matches!(err, ClientError::MissingConfig { .. }));
    }

    #[test]
    fn test_from_resources_malformed_json() {
        let err = CloudflareClient::from_resources(
            &secret(&[("apiToken", "token")]),
            &config_map(&[("config", "{not json")]),
        )
        .unwrap_err();

        assert!(matches!(err, ClientError::InvalidConfig(_)));
        assert!(err.to_string().starts_with("could not unmarshal the config"));
    }

    #[test]
    fn test_from_resources_missing_token() {
        let err = CloudflareClient::from_resources(
            &secret(&[("other", "value")]),
            &config_map(&[("config", r#"{"cloudflare":{"zones":[]}}"#)]),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "`apiToken` not found in secret");
    }

    #[test]
    fn test_invalid_token_rejected() {
        let err = CloudflareClient::new(CloudflareConfig::default(), "bad\ntoken".to_string())
            .unwrap_err();

        assert!(matches!(err, ClientError::InvalidToken));
    }
}
