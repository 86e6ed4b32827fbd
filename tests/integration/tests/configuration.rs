//! Configuration-driven behaviour tests.

use std::collections::HashMap;

use idm_core::config::{ENV_AUDIT_EVENTS, ENV_LINK_SOURCE};
use idm_core::{ConfigError, FacadeConfig, LinkSourcePolicy};
use idm_model::{EntryIdentifier, RoleIdentifier};
use idm_store::AccountLinkError;

use crate::common::TestEnv;

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Tests that configuration loaded from variables changes facade behaviour.
#[tokio::test]
async fn test_lookup_configuration_applies() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let vars = vars(&[(ENV_LINK_SOURCE, "cached_only"), (ENV_AUDIT_EVENTS, "off")]);
    let config = FacadeConfig::from_lookup(|key| vars.get(key).cloned())?;
    assert_eq!(config.link_source, LinkSourcePolicy::CachedOnly);

    let alice = env.user_with("alice", config);
    let err = alice
        .link_account(&EntryIdentifier::new("x-9"))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountLinkError::UnsetSource));
    assert!(env.events.events().is_empty());

    Ok(())
}

/// Tests configuration from a JSON document.
#[tokio::test]
async fn test_json_configuration() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let config = FacadeConfig::from_json(r#"{"audit_events": false}"#)?;
    assert_eq!(config.link_source, LinkSourcePolicy::ResolveFirst);

    let alice = env.user_with("alice", config);
    alice.assign_to_role(&RoleIdentifier::new("guest")).await?;
    assert_eq!(alice.config().link_source, LinkSourcePolicy::ResolveFirst);
    assert!(env.events.events().is_empty());

    Ok(())
}

/// Tests that bad configuration is rejected rather than defaulted.
#[test]
fn test_invalid_configuration() {
    let bad = vars(&[(ENV_LINK_SOURCE, "lazy")]);
    let err = FacadeConfig::from_lookup(|key| bad.get(key).cloned()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == ENV_LINK_SOURCE));

    let err = FacadeConfig::from_json(r#"{"link_source": "sometimes"}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
