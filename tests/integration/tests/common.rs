//! Common test utilities and fixtures.

use std::sync::Arc;

use idm_core::{FacadeConfig, InMemoryEventListener, PrivilegedUser};
use idm_model::{Permission, PrivilegedGroup, PrivilegedRole, UserIdentifier};
use idm_store_memory::{MemoryAuthorizationStore, MemoryIdentityStore};

/// Dialect used by every claim in these tests.
pub const DIALECT: &str = "urn:example:claims";

/// Test environment with populated stores and an event recorder.
pub struct TestEnv {
    /// Identity store holding alice, bob and the group catalogue.
    pub identity: Arc<MemoryIdentityStore>,
    /// Authorization store holding the role catalogue.
    pub authz: Arc<MemoryAuthorizationStore>,
    /// Audit events emitted by facades built from this environment.
    pub events: Arc<InMemoryEventListener>,
}

impl TestEnv {
    /// Creates a new test environment.
    ///
    /// Users: `alice` (entry `e-1`), `bob` (entry `e-2`). Foreign entries
    /// `x-9` (`alice@partner`) and `x-7` (`alice@social`) can be linked.
    pub fn new() -> Self {
        init_tracing();

        let identity = MemoryIdentityStore::new("primary")
            .with_user("alice", "e-1")
            .with_user("bob", "e-2")
            .with_group(PrivilegedGroup::new("ops").with_name("Operations"))
            .with_group(PrivilegedGroup::new("eng").with_name("Engineering"))
            .with_group(PrivilegedGroup::new("sales").with_name("Sales"));
        identity.links().register_entry("x-9", "alice@partner");
        identity.links().register_entry("x-7", "alice@social");

        let authz = MemoryAuthorizationStore::new()
            .with_role(
                PrivilegedRole::new("admin")
                    .with_name("Administrator")
                    .with_permission(Permission::new("/users", "write"))
                    .with_permission(Permission::new("/reports", "read")),
            )
            .with_role(
                PrivilegedRole::new("auditor")
                    .with_name("Auditor")
                    .with_permission(Permission::new("/reports", "read")),
            )
            .with_role(PrivilegedRole::new("guest").with_name("Guest"));

        Self {
            identity: Arc::new(identity),
            authz: Arc::new(authz),
            events: InMemoryEventListener::shared(),
        }
    }

    /// Builds a facade for `user` with the test configuration.
    pub fn user(&self, user: &str) -> PrivilegedUser {
        self.user_with(user, FacadeConfig::for_testing())
    }

    /// Builds a facade for `user` with the given configuration.
    pub fn user_with(&self, user: &str, config: FacadeConfig) -> PrivilegedUser {
        PrivilegedUser::new(
            self.identity.clone(),
            self.authz.clone(),
            UserIdentifier::new(user),
        )
        .with_config(config)
        .with_event_listener(self.events.clone())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("idm_core=debug,idm_store_memory=debug")
        .with_test_writer()
        .try_init();
}
