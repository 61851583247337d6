//! fleetgate cloud resource client
//!
//! This crate defines the contract between the fleetgate provisioning core
//! and a cloud provider's control-plane API. The core never talks HTTP
//! itself; it drives a [`CloudClient`] handle.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  fleetgate CLI                   │
//! │                  (fleetgate up)                  │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 fleetgate-core                   │
//! │  keys → tags → instances → firewalls → summary   │
//! └─────────────────┬───────────────────────────────┘
//!                   │  trait CloudClient { ... }
//! ┌─────────────────▼───────────────────────────────┐
//! │               fleetgate-cloud                    │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!         ┌─────────▼──────────┐
//!         │    digitalocean    │
//!         │      provider      │
//!         └────────────────────┘
//! ```

pub mod client;
pub mod error;
pub mod model;

// Re-exports
pub use client::{AccessToken, AuthStatus, CloudClient};
pub use error::{CloudError, Result};
pub use model::{
    ANY_ADDRESSES, Firewall, FirewallRuleSet, InboundRule, Instance, InstancePage, InstanceSpec,
    Key, KeyCreateRequest, ListOptions, NetworkInterface, OutboundRule, Protocol, Tag, Visibility,
};
