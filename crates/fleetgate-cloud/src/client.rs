//! Cloud resource client trait definition

use crate::error::Result;
use crate::model::{
    Firewall, FirewallRuleSet, Instance, InstancePage, InstanceSpec, Key, KeyCreateRequest,
    ListOptions, Tag,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authenticated handle to a provider's control-plane API
///
/// The provisioning core only reads and submits through this trait; it never
/// mutates a resource after the create call returns. Implementations must be
/// usable through a shared reference.
#[async_trait]
pub trait CloudClient: Send + Sync {
    /// Returns the provider name (e.g., "digitalocean")
    fn name(&self) -> &str;

    /// Check whether the configured credential is accepted by the provider
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Register an SSH public key
    async fn create_key(&self, request: &KeyCreateRequest) -> Result<Key>;

    /// Register a tag
    async fn create_tag(&self, name: &str) -> Result<Tag>;

    /// Submit an instance for creation. Returns as soon as the provider
    /// accepts the request; the instance is not ready yet.
    async fn create_instance(&self, spec: &InstanceSpec) -> Result<Instance>;

    /// Fetch the current remote state of an instance
    async fn get_instance(&self, id: u64) -> Result<Instance>;

    /// Fetch one page of instances
    async fn list_instances(&self, options: &ListOptions) -> Result<InstancePage>;

    /// Submit a firewall rule set
    async fn create_firewall(&self, rule_set: &FirewallRuleSet) -> Result<Firewall>;
}

/// Opaque provider credential
///
/// Held for the process lifetime, never persisted and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Expose the raw secret (for request signing only)
    pub fn secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}
