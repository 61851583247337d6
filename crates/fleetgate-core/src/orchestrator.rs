//! End-to-end provisioning run
//!
//! The run is a linear state machine. Each call to [`Orchestrator::step`]
//! performs exactly one transition; a fatal error leaves the machine in the
//! last state it reached and nothing is rolled back.
//!
//! ```text
//! Init → KeysGenerated → KeyRegistered → TagsRegistered
//!      → BackendsProvisioned → BastionsProvisioned → FirewallsDerived → Done
//! ```

use crate::clock::{Clock, TokioClock};
use crate::config::TopologyConfig;
use crate::error::{ProvisionError, Result};
use crate::firewall::FirewallDeriver;
use crate::keygen::{Ed25519KeyGenerator, KeyGenerator, KeyPair};
use crate::provisioner::InstanceProvisioner;
use fleetgate_cloud::{CloudClient, Firewall, Key, KeyCreateRequest};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Position in the run, ordered by progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    KeysGenerated,
    KeyRegistered,
    TagsRegistered,
    BackendsProvisioned,
    BastionsProvisioned,
    FirewallsDerived,
    Done,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::KeysGenerated => "keys-generated",
            Self::KeyRegistered => "key-registered",
            Self::TagsRegistered => "tags-registered",
            Self::BackendsProvisioned => "backends-provisioned",
            Self::BastionsProvisioned => "bastions-provisioned",
            Self::FirewallsDerived => "firewalls-derived",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the operator gets back from a successful run
#[derive(Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub public_key: String,
    pub private_key: String,
    /// Public address of the first bastion, if it had one
    pub bastion_address: Option<String>,
    pub backend_count: u32,
    pub bastion_count: u32,
    pub firewalls: Vec<String>,
}

impl fmt::Debug for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunSummary")
            .field("public_key", &self.public_key)
            .field("private_key", &"***")
            .field("bastion_address", &self.bastion_address)
            .field("backend_count", &self.backend_count)
            .field("bastion_count", &self.bastion_count)
            .field("firewalls", &self.firewalls)
            .finish()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Public Key is {}", self.public_key)?;
        writeln!(f, "The private key to access the servers is as follows:")?;
        writeln!(f, "{}", self.private_key.trim_end())?;
        write!(
            f,
            "The IP address of the Bastion server is: {}",
            self.bastion_address.as_deref().unwrap_or("")
        )
    }
}

/// Drives one provisioning run against a cloud client
pub struct Orchestrator {
    client: Arc<dyn CloudClient>,
    clock: Arc<dyn Clock>,
    keygen: Arc<dyn KeyGenerator>,
    config: TopologyConfig,
    cancel: CancellationToken,
    stage: Stage,
    key_pair: Option<KeyPair>,
    key: Option<Key>,
    bastion_address: Option<String>,
    firewalls: Vec<Firewall>,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn CloudClient>, config: TopologyConfig) -> Self {
        Self {
            client,
            clock: Arc::new(TokioClock),
            keygen: Arc::new(Ed25519KeyGenerator::default()),
            config,
            cancel: CancellationToken::new(),
            stage: Stage::Init,
            key_pair: None,
            key: None,
            bastion_address: None,
            firewalls: Vec::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_key_generator(mut self, keygen: Arc<dyn KeyGenerator>) -> Self {
        self.keygen = keygen;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn config(&self) -> &TopologyConfig {
        &self.config
    }

    /// Generated key pair, available from `KeysGenerated` on even if a
    /// later step failed
    pub fn key_pair(&self) -> Option<&KeyPair> {
        self.key_pair.as_ref()
    }

    /// Run every remaining transition
    pub async fn run(&mut self) -> Result<RunSummary> {
        self.config.validate()?;
        tracing::info!(
            "Provisioning {} backend and {} bastion instances in {} via {}",
            self.config.backend_count,
            self.config.bastion_count,
            self.config.region,
            self.client.name()
        );

        while self.stage != Stage::Done {
            self.step().await?;
        }
        self.summary()
    }

    /// Perform one transition and return the new stage
    pub async fn step(&mut self) -> Result<Stage> {
        if self.stage != Stage::Done && self.cancel.is_cancelled() {
            return Err(ProvisionError::Cancelled {
                name: format!("stage {}", self.stage),
            });
        }

        let next = match self.stage {
            Stage::Init => self.generate_keys()?,
            Stage::KeysGenerated => self.register_key().await?,
            Stage::KeyRegistered => self.register_tags().await?,
            Stage::TagsRegistered => self.provision_backends().await?,
            Stage::BackendsProvisioned => self.provision_bastions().await?,
            Stage::BastionsProvisioned => self.derive_firewalls().await?,
            Stage::FirewallsDerived | Stage::Done => Stage::Done,
        };

        if next != self.stage {
            tracing::debug!("Stage {} -> {}", self.stage, next);
        }
        self.stage = next;
        Ok(next)
    }

    /// Summary of a finished run
    pub fn summary(&self) -> Result<RunSummary> {
        let key_pair = match (&self.key_pair, self.stage) {
            (Some(pair), Stage::Done) => pair,
            _ => return Err(ProvisionError::Incomplete(self.stage.name())),
        };

        Ok(RunSummary {
            public_key: key_pair.public_key.clone(),
            private_key: key_pair.private_key.clone(),
            bastion_address: self.bastion_address.clone(),
            backend_count: self.config.backend_count,
            bastion_count: self.config.bastion_count,
            firewalls: self.firewalls.iter().map(|f| f.name.clone()).collect(),
        })
    }

    fn generate_keys(&mut self) -> Result<Stage> {
        let pair = self.keygen.generate()?;
        tracing::info!("SSH keys have been generated");
        self.key_pair = Some(pair);
        Ok(Stage::KeysGenerated)
    }

    async fn register_key(&mut self) -> Result<Stage> {
        let public_key = self
            .key_pair
            .as_ref()
            .map(|p| p.public_key.clone())
            .ok_or(ProvisionError::Incomplete(self.stage.name()))?;

        let key = self
            .client
            .create_key(&KeyCreateRequest {
                name: self.config.key_name.clone(),
                public_key,
            })
            .await
            .map_err(ProvisionError::KeyRegistration)?;
        tracing::info!("Registered SSH key {} (id {})", key.name, key.id);

        self.key = Some(key);
        Ok(Stage::KeyRegistered)
    }

    async fn register_tags(&mut self) -> Result<Stage> {
        for tag in self.config.tags() {
            tracing::info!("Creating tag: {}", tag);
            self.client
                .create_tag(&tag)
                .await
                .map_err(|source| ProvisionError::TagRegistration { tag, source })?;
        }
        Ok(Stage::TagsRegistered)
    }

    fn key_id(&self) -> Result<u64> {
        self.key
            .as_ref()
            .map(|k| k.id)
            .ok_or(ProvisionError::Incomplete(self.stage.name()))
    }

    fn provisioner(&self) -> InstanceProvisioner<'_> {
        InstanceProvisioner::new(
            self.client.as_ref(),
            self.clock.as_ref(),
            &self.config,
            &self.cancel,
        )
    }

    async fn provision_backends(&mut self) -> Result<Stage> {
        let key_id = self.key_id()?;
        let provisioner = self.provisioner();

        for i in 1..=self.config.backend_count {
            let name = self.config.backend_name(i);
            tracing::info!("Creating backend instance {}", i);
            // backend addresses are not needed later, only their existence
            match provisioner
                .provision(&name, &self.config.backend_tag, key_id)
                .await
            {
                Ok(_) | Err(ProvisionError::NoPublicAddress { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(Stage::BackendsProvisioned)
    }

    async fn provision_bastions(&mut self) -> Result<Stage> {
        let key_id = self.key_id()?;
        let mut first_address: Option<String> = None;

        {
            let provisioner = self.provisioner();
            for i in 1..=self.config.bastion_count {
                let name = self.config.bastion_name(i);
                tracing::info!("Creating bastion instance {}", i);
                match provisioner
                    .provision(&name, &self.config.bastion_tag, key_id)
                    .await
                {
                    Ok(address) => {
                        tracing::info!("Bastion {} is reachable at {}", name, address);
                        if i == 1 {
                            first_address = Some(address);
                        }
                    }
                    Err(ProvisionError::NoPublicAddress { name }) => {
                        tracing::warn!(
                            "Unable to get a public IP address for bastion {}. Check the provider console",
                            name
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        self.bastion_address = first_address;
        Ok(Stage::BastionsProvisioned)
    }

    async fn derive_firewalls(&mut self) -> Result<Stage> {
        let firewalls = FirewallDeriver::new(self.client.as_ref(), &self.config)
            .derive_and_apply()
            .await?;
        self.firewalls = firewalls;
        Ok(Stage::FirewallsDerived)
    }
}
