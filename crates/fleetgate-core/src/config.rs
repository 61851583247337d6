//! Topology configuration
//!
//! Every field has a default matching the fixed two-backend, one-bastion
//! layout, so an empty YAML document is a valid configuration.

use crate::error::{ProvisionError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shape and naming of the environment to provision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// Number of backend instances
    #[serde(default = "default_backend_count")]
    pub backend_count: u32,
    /// Number of bastion instances
    #[serde(default = "default_bastion_count")]
    pub bastion_count: u32,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_size")]
    pub size: String,
    #[serde(default = "default_image")]
    pub image: String,
    /// Name under which the generated public key is registered
    #[serde(default = "default_key_name")]
    pub key_name: String,
    #[serde(default = "default_backend_tag")]
    pub backend_tag: String,
    #[serde(default = "default_bastion_tag")]
    pub bastion_tag: String,
    /// Tags registered before the functional ones, not attached to anything
    #[serde(default = "default_extra_tags")]
    pub extra_tags: Vec<String>,
    #[serde(default = "default_backend_firewall_name")]
    pub backend_firewall_name: String,
    #[serde(default = "default_bastion_firewall_name")]
    pub bastion_firewall_name: String,
    #[serde(default = "default_backend_name_prefix")]
    pub backend_name_prefix: String,
    #[serde(default = "default_bastion_name_prefix")]
    pub bastion_name_prefix: String,
    /// Page size used when listing instances
    #[serde(default = "default_list_page_size")]
    pub list_page_size: u32,
    #[serde(default)]
    pub poll: PollConfig,
}

fn default_backend_count() -> u32 {
    2
}
fn default_bastion_count() -> u32 {
    1
}
fn default_region() -> String {
    "nyc3".to_string()
}
fn default_size() -> String {
    "512mb".to_string()
}
fn default_image() -> String {
    "ubuntu-16-04-x64".to_string()
}
fn default_key_name() -> String {
    "fleetgate".to_string()
}
fn default_backend_tag() -> String {
    "Backend_Systems".to_string()
}
fn default_bastion_tag() -> String {
    "Bastion_Systems".to_string()
}
fn default_extra_tags() -> Vec<String> {
    vec!["Bastion_Private".to_string()]
}
fn default_backend_firewall_name() -> String {
    "BackendFirewall".to_string()
}
fn default_bastion_firewall_name() -> String {
    "BastionFirewall".to_string()
}
fn default_backend_name_prefix() -> String {
    "backendDroplet".to_string()
}
fn default_bastion_name_prefix() -> String {
    "bastionDroplet".to_string()
}
fn default_list_page_size() -> u32 {
    200
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            backend_count: default_backend_count(),
            bastion_count: default_bastion_count(),
            region: default_region(),
            size: default_size(),
            image: default_image(),
            key_name: default_key_name(),
            backend_tag: default_backend_tag(),
            bastion_tag: default_bastion_tag(),
            extra_tags: default_extra_tags(),
            backend_firewall_name: default_backend_firewall_name(),
            bastion_firewall_name: default_bastion_firewall_name(),
            backend_name_prefix: default_backend_name_prefix(),
            bastion_name_prefix: default_bastion_name_prefix(),
            list_page_size: default_list_page_size(),
            poll: PollConfig::default(),
        }
    }
}

impl TopologyConfig {
    /// Parse from YAML and validate
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: TopologyConfig = if content.trim().is_empty() {
            TopologyConfig::default()
        } else {
            serde_yaml::from_str(content)
                .map_err(|e| ProvisionError::InvalidConfig(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ProvisionError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("region", &self.region),
            ("size", &self.size),
            ("image", &self.image),
            ("key_name", &self.key_name),
            ("backend_tag", &self.backend_tag),
            ("bastion_tag", &self.bastion_tag),
            ("backend_firewall_name", &self.backend_firewall_name),
            ("bastion_firewall_name", &self.bastion_firewall_name),
            ("backend_name_prefix", &self.backend_name_prefix),
            ("bastion_name_prefix", &self.bastion_name_prefix),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ProvisionError::InvalidConfig(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }

        if self.backend_tag == self.bastion_tag {
            return Err(ProvisionError::InvalidConfig(format!(
                "backend_tag and bastion_tag must differ (both are {})",
                self.backend_tag
            )));
        }

        if self.backend_firewall_name == self.bastion_firewall_name {
            return Err(ProvisionError::InvalidConfig(format!(
                "firewall names must differ (both are {})",
                self.backend_firewall_name
            )));
        }

        if self.list_page_size == 0 || self.list_page_size > 200 {
            return Err(ProvisionError::InvalidConfig(format!(
                "list_page_size must be between 1 and 200, got {}",
                self.list_page_size
            )));
        }

        self.poll.validate()
    }

    /// Every tag to register, in registration order
    pub fn tags(&self) -> Vec<String> {
        let mut tags = self.extra_tags.clone();
        tags.push(self.backend_tag.clone());
        tags.push(self.bastion_tag.clone());
        tags
    }

    pub fn backend_name(&self, index: u32) -> String {
        format!("{}-{}", self.backend_name_prefix, index)
    }

    pub fn bastion_name(&self, index: u32) -> String {
        format!("{}-{}", self.bastion_name_prefix, index)
    }
}

/// Readiness polling schedule
///
/// With the defaults the wait is a fixed 10 second delay and never gives up.
/// Set `max_attempts` to bound it and `multiplier` above 1.0 for capped
/// exponential backoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Delay after the first unsuccessful check (milliseconds)
    #[serde(default = "default_interval")]
    pub interval_ms: u64,
    /// Upper bound on the delay (milliseconds)
    #[serde(default = "default_max_interval")]
    pub max_interval_ms: u64,
    /// Backoff multiplier
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Maximum number of checks; `None` waits forever
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

fn default_interval() -> u64 {
    10_000
}
fn default_max_interval() -> u64 {
    60_000
}
fn default_multiplier() -> f64 {
    1.0
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval(),
            max_interval_ms: default_max_interval(),
            multiplier: default_multiplier(),
            max_attempts: None,
        }
    }
}

impl PollConfig {
    /// Delay to wait after the check numbered `attempt` (0-based) failed
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let cap = self.max_interval_ms.max(self.interval_ms) as f64;
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let delay = (self.interval_ms as f64 * self.multiplier.powi(exponent)).min(cap);
        Duration::from_millis(delay as u64)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(ProvisionError::InvalidConfig(
                "poll.interval_ms must be greater than 0".to_string(),
            ));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ProvisionError::InvalidConfig(format!(
                "poll.multiplier must be at least 1.0, got {}",
                self.multiplier
            )));
        }
        if self.max_attempts == Some(0) {
            return Err(ProvisionError::InvalidConfig(
                "poll.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
