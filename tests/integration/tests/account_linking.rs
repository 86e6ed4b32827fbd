//! Account linking tests.

use idm_core::{EventOutcome, EventType, FacadeConfig, LinkSourcePolicy};
use idm_model::{EntryIdentifier, UserIdentifier};
use idm_store::AccountLinkError;
use idm_store_memory::StoreCall;

use crate::common::TestEnv;

/// Tests linking, listing and unlinking accounts.
#[tokio::test]
async fn test_link_list_unlink() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let alice = env.user("alice");

    alice.link_account(&EntryIdentifier::new("x-9")).await?;
    alice.link_account(&EntryIdentifier::new("x-7")).await?;

    let linked = alice.linked_accounts().await?;
    let mut names: Vec<&str> = linked.iter().map(UserIdentifier::as_str).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["alice@partner", "alice@social"]);

    alice.unlink_account(&EntryIdentifier::new("x-9")).await?;
    let linked = alice.linked_accounts().await?;
    assert_eq!(linked.as_slice(), &[UserIdentifier::new("alice@social")]);

    Ok(())
}

/// Tests that the default policy resolves the entry before linking.
#[tokio::test]
async fn test_link_before_resolution_resolves_first() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let alice = env.user("alice");

    assert!(!alice.is_entry_resolved());
    alice.link_account(&EntryIdentifier::new("x-9")).await?;
    assert!(alice.is_entry_resolved());

    assert_eq!(
        env.identity.links().journal().last(),
        Some(StoreCall::Link {
            source: Some(EntryIdentifier::new("e-1")),
            target: EntryIdentifier::new("x-9"),
        })
    );

    Ok(())
}

/// Tests the cached-only policy before and after resolution.
#[tokio::test]
async fn test_cached_only_policy() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let config = FacadeConfig::for_testing().with_link_source(LinkSourcePolicy::CachedOnly);
    let alice = env.user_with("alice", config);

    let err = alice.linked_accounts().await.unwrap_err();
    assert!(matches!(err, AccountLinkError::UnsetSource));
    assert_eq!(env.identity.journal().count("resolve_entry_id"), 0);

    alice.user_entry_id().await?;
    alice.link_account(&EntryIdentifier::new("x-9")).await?;
    assert_eq!(alice.linked_accounts().await?.len(), 1);

    Ok(())
}

/// Tests that link conflicts surface unchanged and are audited.
#[tokio::test]
async fn test_duplicate_link_conflict() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let alice = env.user("alice");
    let partner = EntryIdentifier::new("x-9");

    alice.link_account(&partner).await?;
    let err = alice.link_account(&partner).await.unwrap_err();
    assert!(matches!(err, AccountLinkError::AlreadyLinked { .. }));

    let err = alice
        .unlink_account(&EntryIdentifier::new("x-7"))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountLinkError::NotLinked { .. }));

    let events = env.events.events();
    let outcomes: Vec<(EventType, EventOutcome)> =
        events.iter().map(|e| (e.event_type, e.outcome)).collect();
    assert_eq!(
        outcomes,
        vec![
            (EventType::AccountLinked, EventOutcome::Success),
            (EventType::AccountLinked, EventOutcome::Failure),
            (EventType::AccountUnlinked, EventOutcome::Failure),
        ]
    );
    assert_eq!(events[1].detail("linked_entry"), Some("x-9"));

    Ok(())
}

/// Tests that linking for an unknown user fails before reaching the link store.
#[tokio::test]
async fn test_link_for_unknown_user() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let ghost = env.user("ghost");

    let err = ghost
        .link_account(&EntryIdentifier::new("x-9"))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountLinkError::Identity(ref e) if e.is_not_found()));
    assert!(env.identity.links().journal().calls().is_empty());

    Ok(())
}

/// Tests that a dropped user's entry can no longer be linked and loses its links.
#[tokio::test]
async fn test_dropped_user_cannot_link() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let alice = env.user("alice");
    alice.link_account(&EntryIdentifier::new("x-9")).await?;

    alice.drop_user().await?;

    let err = alice
        .link_account(&EntryIdentifier::new("x-7"))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountLinkError::InvalidPair(_)));
    assert!(matches!(
        alice.linked_accounts().await,
        Err(AccountLinkError::InvalidPair(_))
    ));
    assert_eq!(env.identity.links().link_count(), 0);

    Ok(())
}
