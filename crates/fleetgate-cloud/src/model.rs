//! Resource types exchanged with the cloud client

use serde::{Deserialize, Serialize};
use std::fmt;

/// The unrestricted address space, IPv4 and IPv6
pub const ANY_ADDRESSES: [&str; 2] = ["0.0.0.0/0", "::/0"];

/// Request to register an SSH public key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCreateRequest {
    pub name: String,
    pub public_key: String,
}

/// A registered SSH key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub fingerprint: String,
    #[serde(default)]
    pub public_key: String,
}

/// A named label attached to instances and firewalls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// Input to instance creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpec {
    pub name: String,
    pub region: String,
    pub size: String,
    pub image: String,
    pub tag: String,
    pub ssh_key_id: u64,
    pub private_networking: bool,
}

/// Network visibility of an interface address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// One address of an instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub visibility: Visibility,
    pub address: String,
}

impl NetworkInterface {
    pub fn public(address: impl Into<String>) -> Self {
        Self {
            visibility: Visibility::Public,
            address: address.into(),
        }
    }

    pub fn private(address: impl Into<String>) -> Self {
        Self {
            visibility: Visibility::Private,
            address: address.into(),
        }
    }
}

/// Remote state of an instance
///
/// Status and tag membership change asynchronously after creation.
/// `networks` keeps the order the provider returned, which is not guaranteed
/// to be stable between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: u64,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub networks: Vec<NetworkInterface>,
}

impl Instance {
    /// Whether the tag association is visible yet
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// First address with the given visibility, in provider order
    pub fn first_address(&self, visibility: Visibility) -> Option<&str> {
        self.networks
            .iter()
            .find(|n| n.visibility == visibility)
            .map(|n| n.address.as_str())
    }

    /// Every private address, in provider order
    pub fn private_addresses(&self) -> impl Iterator<Item = &str> {
        self.networks
            .iter()
            .filter(|n| n.visibility == Visibility::Private)
            .map(|n| n.address.as_str())
    }
}

/// Pagination options for listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
}

impl ListOptions {
    pub fn first(per_page: u32) -> Self {
        Self { page: 1, per_page }
    }

    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
            ..self
        }
    }
}

/// One page of listed instances
#[derive(Debug, Clone, Default)]
pub struct InstancePage {
    pub instances: Vec<Instance>,
    /// Whether the provider reports a further page
    pub has_next: bool,
}

/// Transport protocol of a firewall rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
            Protocol::Icmp => write!(f, "icmp"),
        }
    }
}

/// Allow rule for traffic arriving at tagged instances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundRule {
    pub protocol: Protocol,
    /// `"all"`, a single port or a range; `None` for ICMP
    pub ports: Option<String>,
    pub sources: Vec<String>,
}

impl InboundRule {
    pub fn new(protocol: Protocol, ports: Option<&str>, sources: Vec<String>) -> Self {
        Self {
            protocol,
            ports: ports.map(str::to_string),
            sources,
        }
    }
}

/// Allow rule for traffic leaving tagged instances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundRule {
    pub protocol: Protocol,
    /// `"all"`, a single port or a range; `None` for ICMP
    pub ports: Option<String>,
    pub destinations: Vec<String>,
}

impl OutboundRule {
    pub fn new(protocol: Protocol, ports: Option<&str>, destinations: Vec<String>) -> Self {
        Self {
            protocol,
            ports: ports.map(str::to_string),
            destinations,
        }
    }
}

/// A named firewall applied to every instance carrying `tag`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRuleSet {
    pub name: String,
    pub inbound_rules: Vec<InboundRule>,
    pub outbound_rules: Vec<OutboundRule>,
    pub tag: String,
}

/// A created firewall
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Firewall {
    pub id: String,
    pub name: String,
    pub status: String,
}
