//! Store failure propagation tests.

use std::sync::Arc;
use std::time::Duration;

use idm_core::{EventOutcome, EventType, PrivilegedUser};
use idm_model::{GroupIdentifier, Permission, RoleIdentifier, UserIdentifier};
use idm_store::{AuthorizationStoreError, IdentityStoreError};
use idm_store_memory::{MemoryAuthorizationStore, MemoryIdentityStore};

use crate::common::TestEnv;

/// Tests that predicate failures are errors, never `false`.
#[tokio::test]
async fn test_predicate_failures_are_not_false() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let alice = env.user("alice");
    alice.assign_to_role(&RoleIdentifier::new("admin")).await?;

    env.authz
        .fail_next("has_role", AuthorizationStoreError::unavailable("ldap down"));
    env.authz
        .fail_next("has_permission", AuthorizationStoreError::Cancelled);
    env.identity
        .fail_next("is_in_group", IdentityStoreError::Timeout("3s".into()));

    let err = alice.has_role(&RoleIdentifier::new("admin")).await.unwrap_err();
    assert!(err.is_transient());
    assert!(matches!(
        alice.has_permission(&Permission::new("/users", "write")).await,
        Err(AuthorizationStoreError::Cancelled)
    ));
    assert!(matches!(
        alice.in_group(&GroupIdentifier::new("ops")).await,
        Err(IdentityStoreError::Timeout(_))
    ));

    assert!(alice.has_role(&RoleIdentifier::new("admin")).await?);

    Ok(())
}

/// Tests that store validation errors surface unchanged.
#[tokio::test]
async fn test_validation_errors_pass_through() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let alice = env.user("alice");

    let err = alice
        .add_to_groups(&[GroupIdentifier::new("ops"), GroupIdentifier::new("nope")])
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityStoreError::GroupNotFound(ref g) if g.as_str() == "nope"));

    let err = alice
        .assign_to_roles(&[RoleIdentifier::new("guest"), RoleIdentifier::new("root")])
        .await
        .unwrap_err();
    assert!(matches!(err, AuthorizationStoreError::RoleNotFound(_)));

    assert!(alice.groups(None).await?.is_empty());
    assert!(alice.roles(None).await?.is_empty());

    let events = env.events.events();
    assert!(events.iter().all(|e| e.outcome == EventOutcome::Failure));
    assert_eq!(
        env.events.event_types(),
        vec![EventType::UserJoinedGroups, EventType::RolesAssigned]
    );

    Ok(())
}

/// Tests that a failed resolution is retried on the next call.
#[tokio::test]
async fn test_failed_resolution_is_not_cached() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let alice = env.user("alice");
    env.identity
        .fail_next("resolve_entry_id", IdentityStoreError::backend("connection reset"));

    assert!(alice.user_entry_id().await.is_err());
    assert!(!alice.is_entry_resolved());
    assert_eq!(alice.user_entry_id().await?.as_str(), "e-1");

    Ok(())
}

/// Tests that concurrent first calls all observe the same entry identifier.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_resolution() -> anyhow::Result<()> {
    let identity = Arc::new(
        MemoryIdentityStore::new("slow")
            .with_user("alice", "e-1")
            .with_resolve_delay(Duration::from_millis(25)),
    );
    let authz = Arc::new(MemoryAuthorizationStore::new());
    let alice = Arc::new(PrivilegedUser::new(
        identity.clone(),
        authz,
        UserIdentifier::new("alice"),
    ));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let alice = Arc::clone(&alice);
            tokio::spawn(async move { alice.user_entry_id().await })
        })
        .collect();

    for joined in futures::future::join_all(handles).await {
        assert_eq!(joined??.as_str(), "e-1");
    }

    let resolved = identity.journal().count("resolve_entry_id");
    assert!((1..=16).contains(&resolved));
    alice.user_entry_id().await?;
    assert_eq!(identity.journal().count("resolve_entry_id"), resolved);

    Ok(())
}
