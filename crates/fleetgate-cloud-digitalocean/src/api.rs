//! DigitalOcean v2 API wire types
//!
//! Request and response bodies as the API speaks them, plus conversions to
//! and from the provider-neutral types in `fleetgate_cloud`.

use fleetgate_cloud::{
    Firewall, FirewallRuleSet, InboundRule, Instance, InstanceSpec, Key, KeyCreateRequest,
    NetworkInterface, OutboundRule, Protocol, Tag, Visibility,
};
use serde::{Deserialize, Serialize};

// ============ Responses ============

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub id: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct AccountResponse {
    pub account: ApiAccount,
}

#[derive(Debug, Deserialize)]
pub struct ApiAccount {
    pub email: String,
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct KeyResponse {
    pub ssh_key: ApiKey,
}

#[derive(Debug, Deserialize)]
pub struct ApiKey {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub fingerprint: String,
    #[serde(default)]
    pub public_key: String,
}

impl From<ApiKey> for Key {
    fn from(k: ApiKey) -> Self {
        Key {
            id: k.id,
            name: k.name,
            fingerprint: k.fingerprint,
            public_key: k.public_key,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TagResponse {
    pub tag: ApiTag,
}

#[derive(Debug, Deserialize)]
pub struct ApiTag {
    pub name: String,
}

impl From<ApiTag> for Tag {
    fn from(t: ApiTag) -> Self {
        Tag { name: t.name }
    }
}

#[derive(Debug, Deserialize)]
pub struct DropletResponse {
    pub droplet: ApiDroplet,
}

#[derive(Debug, Deserialize)]
pub struct DropletsResponse {
    #[serde(default)]
    pub droplets: Vec<ApiDroplet>,
    #[serde(default)]
    pub links: Links,
}

#[derive(Debug, Default, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub pages: Option<Pages>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Pages {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
}

impl Links {
    pub fn has_next(&self) -> bool {
        self.pages.as_ref().and_then(|p| p.next.as_ref()).is_some()
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiDroplet {
    pub id: u64,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub networks: ApiNetworks,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiNetworks {
    #[serde(default)]
    pub v4: Vec<ApiNetwork>,
    #[serde(default)]
    pub v6: Vec<ApiNetwork>,
}

#[derive(Debug, Deserialize)]
pub struct ApiNetwork {
    pub ip_address: String,
    #[serde(rename = "type")]
    pub r#type: String,
}

impl ApiNetwork {
    fn into_interface(self) -> Option<NetworkInterface> {
        let visibility = match self.r#type.as_str() {
            "public" => Visibility::Public,
            "private" => Visibility::Private,
            other => {
                tracing::debug!("Ignoring network of unknown type {}: {}", other, self.ip_address);
                return None;
            }
        };
        Some(NetworkInterface {
            visibility,
            address: self.ip_address,
        })
    }
}

impl From<ApiDroplet> for Instance {
    fn from(d: ApiDroplet) -> Self {
        // v4 first, then v6, each in the order the API returned
        let networks = d
            .networks
            .v4
            .into_iter()
            .chain(d.networks.v6)
            .filter_map(ApiNetwork::into_interface)
            .collect();

        Instance {
            id: d.id,
            name: d.name,
            status: d.status,
            tags: d.tags,
            networks,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FirewallResponse {
    pub firewall: ApiFirewall,
}

#[derive(Debug, Deserialize)]
pub struct ApiFirewall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
}

impl From<ApiFirewall> for Firewall {
    fn from(f: ApiFirewall) -> Self {
        Firewall {
            id: f.id,
            name: f.name,
            status: f.status,
        }
    }
}

// ============ Requests ============

#[derive(Debug, Serialize)]
pub struct CreateKeyRequest<'a> {
    pub name: &'a str,
    pub public_key: &'a str,
}

impl<'a> From<&'a KeyCreateRequest> for CreateKeyRequest<'a> {
    fn from(r: &'a KeyCreateRequest) -> Self {
        Self {
            name: &r.name,
            public_key: &r.public_key,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateTagRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CreateDropletRequest<'a> {
    pub name: &'a str,
    pub region: &'a str,
    pub size: &'a str,
    pub image: &'a str,
    pub ssh_keys: Vec<u64>,
    pub private_networking: bool,
    pub tags: Vec<&'a str>,
}

impl<'a> From<&'a InstanceSpec> for CreateDropletRequest<'a> {
    fn from(spec: &'a InstanceSpec) -> Self {
        Self {
            name: &spec.name,
            region: &spec.region,
            size: &spec.size,
            image: &spec.image,
            ssh_keys: vec![spec.ssh_key_id],
            private_networking: spec.private_networking,
            tags: vec![spec.tag.as_str()],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateFirewallRequest<'a> {
    pub name: &'a str,
    pub inbound_rules: Vec<ApiInboundRule<'a>>,
    pub outbound_rules: Vec<ApiOutboundRule<'a>>,
    pub tags: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct ApiInboundRule<'a> {
    pub protocol: Protocol,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<&'a str>,
    pub sources: ApiAddresses<'a>,
}

#[derive(Debug, Serialize)]
pub struct ApiOutboundRule<'a> {
    pub protocol: Protocol,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<&'a str>,
    pub destinations: ApiAddresses<'a>,
}

#[derive(Debug, Serialize)]
pub struct ApiAddresses<'a> {
    pub addresses: &'a [String],
}

impl<'a> From<&'a InboundRule> for ApiInboundRule<'a> {
    fn from(r: &'a InboundRule) -> Self {
        Self {
            protocol: r.protocol,
            ports: r.ports.as_deref(),
            sources: ApiAddresses {
                addresses: &r.sources,
            },
        }
    }
}

impl<'a> From<&'a OutboundRule> for ApiOutboundRule<'a> {
    fn from(r: &'a OutboundRule) -> Self {
        Self {
            protocol: r.protocol,
            ports: r.ports.as_deref(),
            destinations: ApiAddresses {
                addresses: &r.destinations,
            },
        }
    }
}

impl<'a> From<&'a FirewallRuleSet> for CreateFirewallRequest<'a> {
    fn from(set: &'a FirewallRuleSet) -> Self {
        Self {
            name: &set.name,
            inbound_rules: set.inbound_rules.iter().map(Into::into).collect(),
            outbound_rules: set.outbound_rules.iter().map(Into::into).collect(),
            tags: vec![set.tag.as_str()],
        }
    }
}
