//! End-to-end integration tests
//!
//! These tests drive the privileged-user facade against the in-memory
//! identity and authorization stores, checking both the results the facade
//! returns and the exact calls the stores receive.

mod common;
mod account_linking;
mod configuration;
mod privileged_user;
mod store_failures;
