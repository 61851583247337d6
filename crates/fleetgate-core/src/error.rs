//! Provisioning error types

use fleetgate_cloud::CloudError;
use thiserror::Error;

/// Errors raised while provisioning the topology
///
/// Every kind except [`ProvisionError::NoPublicAddress`] aborts the run.
/// Nothing already created is rolled back.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("SSH key generation failed: {0}")]
    KeyGeneration(String),

    #[error("SSH key registration failed: {0}")]
    KeyRegistration(#[source] CloudError),

    #[error("Tag registration failed for {tag}: {source}")]
    TagRegistration {
        tag: String,
        #[source]
        source: CloudError,
    },

    #[error("Instance {name} could not be submitted: {source}")]
    ProvisionSubmit {
        name: String,
        #[source]
        source: CloudError,
    },

    #[error("Polling instance {name} failed: {source}")]
    ProvisionPoll {
        name: String,
        #[source]
        source: CloudError,
    },

    #[error("Instance {name} has no public address")]
    NoPublicAddress { name: String },

    #[error("Instance {name} did not carry tag {tag} after {attempts} checks")]
    PollAttemptsExhausted {
        name: String,
        tag: String,
        attempts: u32,
    },

    #[error("Cancelled during {name}")]
    Cancelled { name: String },

    #[error("Listing instances failed on page {page}: {source}")]
    ListInstances {
        page: u32,
        #[source]
        source: CloudError,
    },

    #[error("Firewall {name} could not be created (already applied: {applied:?}): {source}")]
    FirewallSubmit {
        name: String,
        applied: Vec<String>,
        #[source]
        source: CloudError,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Run has not reached the required stage (currently {0})")]
    Incomplete(&'static str),
}

impl ProvisionError {
    /// Whether this error must abort the run
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ProvisionError::NoPublicAddress { .. })
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
