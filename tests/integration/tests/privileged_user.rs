//! Privileged-user lifecycle tests.

use idm_core::{AttributeQuery, EventType};
use idm_model::{
    profiles, Claim, ClaimIdentifier, Credential, CredentialKind, DialectIdentifier,
    GroupIdentifier, Permission, ProfileIdentifier, RoleIdentifier,
};
use idm_store::{GroupSearchCriteria, IdentityStoreError, RoleSearchCriteria};
use idm_store_memory::StoreCall;

use crate::common::{TestEnv, DIALECT};

/// Tests the full lifecycle of one privileged user.
#[tokio::test]
async fn test_user_lifecycle() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let alice = env.user("alice");
    let dialect = DialectIdentifier::new(DIALECT);

    assert_eq!(alice.user_entry_id().await?.as_str(), "e-1");

    alice
        .add_to_groups(&[GroupIdentifier::new("ops"), GroupIdentifier::new("eng")])
        .await?;
    alice
        .assign_to_roles(&[RoleIdentifier::new("auditor"), RoleIdentifier::new("guest")])
        .await?;
    alice
        .add_attributes(
            &dialect,
            &[
                Claim::new(DIALECT, "mail", "alice@example.com"),
                Claim::new(DIALECT, "cn", "Alice"),
            ],
            None,
        )
        .await?;
    alice.add_credential(&Credential::password("hunter2")).await?;

    assert!(alice.in_group(&GroupIdentifier::new("eng")).await?);
    assert!(!alice.in_group(&GroupIdentifier::new("sales")).await?);
    assert!(alice.has_role(&RoleIdentifier::new("auditor")).await?);
    assert!(!alice.has_role(&RoleIdentifier::new("admin")).await?);
    assert!(alice.has_permission(&Permission::new("/reports", "read")).await?);
    assert!(!alice.has_permission(&Permission::new("/users", "write")).await?);

    let claims = alice.attributes(&dialect, &AttributeQuery::new()).await?;
    assert_eq!(claims.len(), 2);

    alice.drop_user().await?;
    let err = alice.groups(None).await.unwrap_err();
    assert!(matches!(err, IdentityStoreError::UserNotFound(_)));

    assert_eq!(
        env.events.event_types(),
        vec![
            EventType::UserJoinedGroups,
            EventType::RolesAssigned,
            EventType::AttributesAdded,
            EventType::CredentialAdded,
            EventType::UserDropped,
        ]
    );

    Ok(())
}

/// Tests that listings honour search criteria.
#[tokio::test]
async fn test_filtered_listings() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let alice = env.user("alice");

    alice
        .add_to_groups(&[
            GroupIdentifier::new("ops"),
            GroupIdentifier::new("eng"),
            GroupIdentifier::new("sales"),
        ])
        .await?;
    alice
        .assign_to_roles(&[RoleIdentifier::new("admin"), RoleIdentifier::new("guest")])
        .await?;

    let all = alice.groups(None).await?;
    assert_eq!(all.len(), 3);

    let criteria = GroupSearchCriteria::new().search("ENG");
    let eng = alice.groups(Some(&criteria)).await?;
    assert_eq!(eng.len(), 1);
    assert_eq!(eng[0].name, "Engineering");

    let page = alice
        .groups(Some(&GroupSearchCriteria::new().offset(1).max_results(1)))
        .await?;
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].identifier, all[1].identifier);

    let writers = RoleSearchCriteria::new().granting(Permission::new("/users", "write"));
    let roles = alice.roles(Some(&writers)).await?;
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].identifier.as_str(), "admin");

    Ok(())
}

/// Tests claims stored under explicit profiles.
#[tokio::test]
async fn test_profiles_and_attribute_queries() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let alice = env.user("alice");
    let dialect = DialectIdentifier::new(DIALECT);
    let public = ProfileIdentifier::new(profiles::PUBLIC);

    alice
        .add_attributes(&dialect, &[Claim::new(DIALECT, "mail", "alice@corp")], None)
        .await?;
    alice
        .add_attributes(
            &dialect,
            &[Claim::new(DIALECT, "mail", "alice@home")],
            Some(&public),
        )
        .await?;

    let default_scope = alice.attributes(&dialect, &AttributeQuery::new()).await?;
    assert_eq!(default_scope[0].value, "alice@corp");

    let in_public = alice
        .attributes(&dialect, &AttributeQuery::new().profile(public.clone()))
        .await?;
    assert_eq!(in_public[0].value, "alice@home");

    let mail = ClaimIdentifier::new("mail");
    let listed = alice.profiles(&dialect, &[mail.clone()]).await?;
    let values: Vec<(&str, Option<&str>)> = listed
        .iter()
        .map(|p| (p.identifier.as_str(), p.claim_value(&mail)))
        .collect();
    assert_eq!(
        values,
        vec![
            (profiles::DEFAULT, Some("alice@corp")),
            (profiles::PUBLIC, Some("alice@home")),
        ]
    );

    Ok(())
}

/// Tests that facades for different users stay independent.
#[tokio::test]
async fn test_users_are_isolated() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let alice = env.user("alice");
    let bob = env.user("bob");

    alice.assign_to_role(&RoleIdentifier::new("admin")).await?;

    assert!(alice.has_role(&RoleIdentifier::new("admin")).await?);
    assert!(!bob.has_role(&RoleIdentifier::new("admin")).await?);
    assert_eq!(bob.user_entry_id().await?.as_str(), "e-2");
    assert!(!alice.is_entry_resolved());

    Ok(())
}

/// Tests that each facade resolves its entry identifier once.
#[tokio::test]
async fn test_entry_resolution_is_cached_per_facade() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let first = env.user("alice");
    let second = env.user("alice");

    for _ in 0..5 {
        first.user_entry_id().await?;
    }
    second.user_entry_id().await?;

    assert_eq!(
        env.identity.journal().calls_of("resolve_entry_id"),
        vec![
            StoreCall::ResolveEntryId {
                user: "alice".into()
            };
            2
        ]
    );

    Ok(())
}

/// Tests credential replacement across kinds.
#[tokio::test]
async fn test_credential_reset_keeps_other_kinds() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let alice = env.user("alice");

    alice.add_credential(&Credential::password("old")).await?;
    alice
        .add_credential(&Credential::key("ssh-ed25519 AAAA").with_label("laptop"))
        .await?;
    alice.reset_credentials(&Credential::password("new")).await?;

    let kinds: Vec<CredentialKind> = env
        .identity
        .credentials_of(alice.user_identifier())
        .iter()
        .map(|c| c.kind().clone())
        .collect();
    assert_eq!(kinds, vec![CredentialKind::Key, CredentialKind::Password]);

    alice.remove_credential(&Credential::password("new")).await?;
    assert_eq!(env.identity.credentials_of(alice.user_identifier()).len(), 1);

    Ok(())
}
