//! Firewall rule derivation
//!
//! Both rule sets are built from a fresh snapshot of every instance's
//! private addresses. Instances created after the snapshot are covered by
//! the tag scoping but not by the intra-fleet address lists.

use crate::config::TopologyConfig;
use crate::error::{ProvisionError, Result};
use fleetgate_cloud::{
    ANY_ADDRESSES, CloudClient, Firewall, FirewallRuleSet, InboundRule, Instance, ListOptions,
    OutboundRule, Protocol,
};
use std::net::IpAddr;

/// Lists instances, derives the two tiers and submits them
pub struct FirewallDeriver<'a> {
    client: &'a dyn CloudClient,
    config: &'a TopologyConfig,
}

impl<'a> FirewallDeriver<'a> {
    pub fn new(client: &'a dyn CloudClient, config: &'a TopologyConfig) -> Self {
        Self { client, config }
    }

    /// Fetch every page of instances
    pub async fn list_all_instances(&self) -> Result<Vec<Instance>> {
        let mut options = ListOptions::first(self.config.list_page_size);
        let mut instances = Vec::new();

        loop {
            let page = self
                .client
                .list_instances(&options)
                .await
                .map_err(|source| ProvisionError::ListInstances {
                    page: options.page,
                    source,
                })?;
            tracing::debug!(
                "Listed {} instances on page {}",
                page.instances.len(),
                options.page
            );

            let empty = page.instances.is_empty();
            instances.extend(page.instances);

            // an empty page ends the walk even if the provider claims more
            if !page.has_next || empty {
                break;
            }
            options = options.next();
        }

        Ok(instances)
    }

    /// Derive both rule sets from the current fleet and submit them
    ///
    /// The backend tier is submitted first. If the bastion tier then fails,
    /// the backend tier stays applied and the error names it.
    pub async fn derive_and_apply(&self) -> Result<Vec<Firewall>> {
        let instances = self.list_all_instances().await?;
        let private = private_address_set(&instances);
        tracing::info!(
            "Found {} private addresses across {} instances",
            private.len(),
            instances.len()
        );

        let rule_sets = [
            backend_rule_set(
                &self.config.backend_firewall_name,
                &self.config.backend_tag,
                &private,
            ),
            bastion_rule_set(
                &self.config.bastion_firewall_name,
                &self.config.bastion_tag,
                &private,
            ),
        ];

        let mut created: Vec<Firewall> = Vec::new();
        for rule_set in &rule_sets {
            match self.client.create_firewall(rule_set).await {
                Ok(firewall) => {
                    tracing::info!("{} created successfully", firewall.name);
                    created.push(firewall);
                }
                Err(source) => {
                    let applied: Vec<String> = created.iter().map(|f| f.name.clone()).collect();
                    if !applied.is_empty() {
                        tracing::warn!(
                            "{} failed after {:?} was applied; environment is partially secured",
                            rule_set.name,
                            applied
                        );
                    }
                    return Err(ProvisionError::FirewallSubmit {
                        name: rule_set.name.clone(),
                        applied,
                        source,
                    });
                }
            }
        }

        Ok(created)
    }
}

/// Host-form CIDR of every private interface, one entry per interface
///
/// Duplicates across instances are kept.
pub fn private_address_set(instances: &[Instance]) -> Vec<String> {
    instances
        .iter()
        .flat_map(|i| i.private_addresses())
        .map(host_cidr)
        .collect()
}

/// Exact-host CIDR for an address (`/32` for IPv4, `/128` for IPv6)
pub fn host_cidr(address: &str) -> String {
    match address.parse::<IpAddr>() {
        Ok(IpAddr::V6(_)) => format!("{}/128", address),
        _ => format!("{}/32", address),
    }
}

fn any() -> Vec<String> {
    ANY_ADDRESSES.iter().map(|a| a.to_string()).collect()
}

fn inbound_from_fleet(private: &[String]) -> Vec<InboundRule> {
    vec![
        InboundRule::new(Protocol::Tcp, Some("all"), private.to_vec()),
        InboundRule::new(Protocol::Udp, Some("all"), private.to_vec()),
        InboundRule::new(Protocol::Icmp, None, private.to_vec()),
    ]
}

fn outbound_to_fleet(private: &[String]) -> Vec<OutboundRule> {
    vec![
        OutboundRule::new(Protocol::Tcp, Some("all"), private.to_vec()),
        OutboundRule::new(Protocol::Udp, Some("all"), private.to_vec()),
    ]
}

/// Internal tier: talk freely inside the fleet, reach the internet only for
/// DNS, HTTP, HTTPS and ping
pub fn backend_rule_set(name: &str, tag: &str, private: &[String]) -> FirewallRuleSet {
    let mut outbound_rules = outbound_to_fleet(private);
    outbound_rules.extend([
        OutboundRule::new(Protocol::Udp, Some("53"), any()),
        OutboundRule::new(Protocol::Tcp, Some("80"), any()),
        OutboundRule::new(Protocol::Tcp, Some("443"), any()),
        OutboundRule::new(Protocol::Icmp, None, any()),
    ]);

    FirewallRuleSet {
        name: name.to_string(),
        inbound_rules: inbound_from_fleet(private),
        outbound_rules,
        tag: tag.to_string(),
    }
}

/// Edge tier: the fleet rules plus SSH and ping from anywhere
pub fn bastion_rule_set(name: &str, tag: &str, private: &[String]) -> FirewallRuleSet {
    let mut inbound_rules = inbound_from_fleet(private);
    inbound_rules.extend([
        InboundRule::new(Protocol::Tcp, Some("22"), any()),
        InboundRule::new(Protocol::Icmp, None, any()),
    ]);

    let mut outbound_rules = outbound_to_fleet(private);
    outbound_rules.extend([
        OutboundRule::new(Protocol::Tcp, Some("80"), any()),
        OutboundRule::new(Protocol::Tcp, Some("443"), any()),
        OutboundRule::new(Protocol::Tcp, Some("22"), any()),
        OutboundRule::new(Protocol::Udp, Some("53"), any()),
        OutboundRule::new(Protocol::Icmp, None, any()),
    ]);

    FirewallRuleSet {
        name: name.to_string(),
        inbound_rules,
        outbound_rules,
        tag: tag.to_string(),
    }
}
