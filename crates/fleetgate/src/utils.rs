use crate::{ApiArgs, TopologyArgs};
use anyhow::Context;
use fleetgate_cloud::AccessToken;
use fleetgate_cloud_digitalocean::DigitalOceanClient;
use fleetgate_core::TopologyConfig;

/// Build the effective topology: file (or defaults), then CLI overrides
pub fn load_topology(args: &TopologyArgs) -> anyhow::Result<TopologyConfig> {
    let source = fleetgate_config::load_config_source(args.config.as_deref())
        .context("Failed to read topology file")?;

    let mut config = match source {
        Some((path, content)) => {
            tracing::info!("Loaded topology from {}", path.display());
            TopologyConfig::from_yaml(&content)
                .with_context(|| format!("Invalid topology file {}", path.display()))?
        }
        None => TopologyConfig::default(),
    };

    if let Some(backends) = args.backends {
        config.backend_count = backends;
    }
    if let Some(bastions) = args.bastions {
        config.bastion_count = bastions;
    }
    if let Some(region) = &args.region {
        config.region = region.clone();
    }

    config.validate().context("Invalid topology")?;
    Ok(config)
}

/// Build the DigitalOcean client from the API flags
pub fn client(args: &ApiArgs) -> anyhow::Result<DigitalOceanClient> {
    let token = AccessToken::new(args.token.clone());
    if token.is_empty() {
        anyhow::bail!("An access token is required (--token or DIGITALOCEAN_TOKEN)");
    }
    Ok(DigitalOceanClient::new(token).with_base_url(&args.api_url))
}
