//! DigitalOcean provider for fleetgate
//!
//! This crate implements the [`CloudClient`](fleetgate_cloud::CloudClient)
//! trait against the DigitalOcean v2 REST API, enabling fleetgate to create
//! SSH keys, tags, droplets and cloud firewalls.
//!
//! # Requirements
//!
//! - A personal access token with read and write scope
//!
//! # Example
//!
//! ```ignore
//! use fleetgate_cloud::{AccessToken, CloudClient};
//! use fleetgate_cloud_digitalocean::DigitalOceanClient;
//!
//! let client = DigitalOceanClient::new(AccessToken::new(token));
//!
//! // Check authentication
//! let auth = client.check_auth().await?;
//! if !auth.authenticated {
//!     panic!("Not authenticated: {:?}", auth.error);
//! }
//! ```

pub mod api;
pub mod client;
pub mod error;

pub use client::{DEFAULT_API_BASE, DigitalOceanClient};
pub use error::{DigitalOceanError, Result};
