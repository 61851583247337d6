//! fleetgate provisioning core
//!
//! Builds a small fixed-topology environment through a
//! [`CloudClient`](fleetgate_cloud::CloudClient):
//!
//! 1. generate an SSH key pair and register its public half
//! 2. register the tags
//! 3. create the backend instances, then the bastion instances, waiting for
//!    each one to report its tag
//! 4. derive the backend and bastion firewalls from the private addresses
//!    of every instance that exists at that point
//!
//! # Example
//!
//! ```ignore
//! use fleetgate_core::{Orchestrator, TopologyConfig};
//! use std::sync::Arc;
//!
//! let mut orchestrator = Orchestrator::new(Arc::new(client), TopologyConfig::default());
//! let summary = orchestrator.run().await?;
//! println!("{}", summary);
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod firewall;
pub mod keygen;
pub mod orchestrator;
pub mod provisioner;

#[cfg(test)]
mod testing;

pub use clock::{Clock, TokioClock};
pub use config::{PollConfig, TopologyConfig};
pub use error::{ProvisionError, Result};
pub use firewall::{FirewallDeriver, backend_rule_set, bastion_rule_set, private_address_set};
pub use keygen::{Ed25519KeyGenerator, KeyGenerator, KeyPair};
pub use orchestrator::{Orchestrator, RunSummary, Stage};
pub use provisioner::{InstanceProvisioner, select_public_address};

// Re-export so callers can cancel a run without depending on tokio-util
pub use tokio_util::sync::CancellationToken;
