//! Instance creation and readiness waiting
//!
//! A created instance is considered ready once the provider reports the
//! requested tag on it. Tag association is eventually consistent, so the
//! provisioner polls until it shows up.

use crate::clock::Clock;
use crate::config::TopologyConfig;
use crate::error::{ProvisionError, Result};
use fleetgate_cloud::{CloudClient, Instance, InstanceSpec, Visibility};
use tokio_util::sync::CancellationToken;

/// Creates one instance at a time and waits for it
pub struct InstanceProvisioner<'a> {
    client: &'a dyn CloudClient,
    clock: &'a dyn Clock,
    config: &'a TopologyConfig,
    cancel: &'a CancellationToken,
}

impl<'a> InstanceProvisioner<'a> {
    pub fn new(
        client: &'a dyn CloudClient,
        clock: &'a dyn Clock,
        config: &'a TopologyConfig,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            client,
            clock,
            config,
            cancel,
        }
    }

    /// Build the create request for `name`
    pub fn spec(&self, name: &str, tag: &str, ssh_key_id: u64) -> InstanceSpec {
        InstanceSpec {
            name: name.to_string(),
            region: self.config.region.clone(),
            size: self.config.size.clone(),
            image: self.config.image.clone(),
            tag: tag.to_string(),
            ssh_key_id,
            private_networking: true,
        }
    }

    /// Create an instance, wait until it carries `tag`, and return its
    /// first public address
    ///
    /// # Returns
    /// * `Ok(address)` - the instance is ready and publicly reachable
    /// * `Err(ProvisionError::NoPublicAddress)` - ready, but without a public
    ///   interface; the caller decides whether that matters
    /// * any other error - submission, polling or cancellation failed
    pub async fn provision(&self, name: &str, tag: &str, ssh_key_id: u64) -> Result<String> {
        if self.cancel.is_cancelled() {
            return Err(ProvisionError::Cancelled {
                name: name.to_string(),
            });
        }

        let spec = self.spec(name, tag, ssh_key_id);
        let created = self
            .client
            .create_instance(&spec)
            .await
            .map_err(|source| ProvisionError::ProvisionSubmit {
                name: name.to_string(),
                source,
            })?;
        tracing::info!("Submitted instance {} (id {})", name, created.id);

        let ready = self.wait_for_tag(created.id, name, tag).await?;
        tracing::info!("Instance {} created", name);

        select_public_address(&ready)
            .map(str::to_string)
            .ok_or_else(|| ProvisionError::NoPublicAddress {
                name: name.to_string(),
            })
    }

    /// Poll `get_instance` until the instance reports `tag`
    ///
    /// A fetch error ends the wait immediately; it is not retried.
    pub async fn wait_for_tag(&self, id: u64, name: &str, tag: &str) -> Result<Instance> {
        let mut attempt: u32 = 0;
        loop {
            if self.cancel.is_cancelled() {
                return Err(ProvisionError::Cancelled {
                    name: name.to_string(),
                });
            }

            let current = self
                .client
                .get_instance(id)
                .await
                .map_err(|source| ProvisionError::ProvisionPoll {
                    name: name.to_string(),
                    source,
                })?;
            attempt += 1;
            tracing::debug!("Instance {} status is {}", name, current.status);

            if current.has_tag(tag) {
                return Ok(current);
            }

            if let Some(max_attempts) = self.config.poll.max_attempts {
                if attempt >= max_attempts {
                    return Err(ProvisionError::PollAttemptsExhausted {
                        name: name.to_string(),
                        tag: tag.to_string(),
                        attempts: attempt,
                    });
                }
            }

            let delay = self.config.poll.delay_for_attempt(attempt - 1);
            tracing::info!(
                "Instance {} does not carry tag {} yet, will check again in {:?}",
                name,
                tag,
                delay
            );

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    return Err(ProvisionError::Cancelled {
                        name: name.to_string(),
                    });
                }
                _ = self.clock.sleep(delay) => {}
            }
        }
    }
}

/// First public address in the order the provider listed the networks
///
/// Provider ordering is not guaranteed, so with several public interfaces
/// the result may differ between fetches.
pub fn select_public_address(instance: &Instance) -> Option<&str> {
    instance.first_address(Visibility::Public)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PollConfig;
    use crate::testing::{Call, FakeCloud, RecordingClock, private_only};
    use std::time::Duration;

    async fn provision_one(
        cloud: &FakeCloud,
        clock: &RecordingClock,
        config: &TopologyConfig,
    ) -> Result<String> {
        let cancel = CancellationToken::new();
        InstanceProvisioner::new(cloud, clock, config, &cancel)
            .provision("backendDroplet-1", "Backend_Systems", 42)
            .await
    }

    #[tokio::test]
    async fn test_ready_on_first_check() {
        let cloud = FakeCloud::new();
        let clock = RecordingClock::default();
        let address = provision_one(&cloud, &clock, &TopologyConfig::default())
            .await
            .unwrap();

        assert_eq!(address, "203.0.113.1");
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_tag_absent_twice_then_present() {
        let cloud = FakeCloud {
            ready_after: 2,
            ..FakeCloud::default()
        };
        let clock = RecordingClock::default();
        let address = provision_one(&cloud, &clock, &TopologyConfig::default())
            .await
            .unwrap();

        assert_eq!(address, "203.0.113.1");
        assert_eq!(cloud.count(|c| matches!(c, Call::GetInstance(_))), 3);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(10), Duration::from_secs(10)]
        );
    }

    #[tokio::test]
    async fn test_create_request_is_fixed_shape() {
        let cloud = FakeCloud::new();
        let clock = RecordingClock::default();
        let config = TopologyConfig::default();
        let cancel = CancellationToken::new();
        let spec = InstanceProvisioner::new(&cloud, &clock, &config, &cancel).spec(
            "bastionDroplet-1",
            "Bastion_Systems",
            7,
        );

        assert_eq!(spec.region, "nyc3");
        assert_eq!(spec.size, "512mb");
        assert_eq!(spec.image, "ubuntu-16-04-x64");
        assert_eq!(spec.tag, "Bastion_Systems");
        assert_eq!(spec.ssh_key_id, 7);
        assert!(spec.private_networking);
    }

    #[tokio::test]
    async fn test_private_only_instance_has_no_public_address() {
        let cloud = FakeCloud {
            networks: private_only,
            ..FakeCloud::default()
        };
        let clock = RecordingClock::default();
        let result = provision_one(&cloud, &clock, &TopologyConfig::default()).await;

        assert!(matches!(
            result,
            Err(ProvisionError::NoPublicAddress { ref name }) if name == "backendDroplet-1"
        ));
    }

    #[tokio::test]
    async fn test_submit_failure_is_not_retried() {
        let cloud = FakeCloud {
            fail_submit: Some("backendDroplet-1".to_string()),
            ..FakeCloud::default()
        };
        let clock = RecordingClock::default();
        let result = provision_one(&cloud, &clock, &TopologyConfig::default()).await;

        assert!(matches!(result, Err(ProvisionError::ProvisionSubmit { .. })));
        assert_eq!(cloud.count(|c| matches!(c, Call::CreateInstance(_))), 1);
        assert_eq!(cloud.count(|c| matches!(c, Call::GetInstance(_))), 0);
    }

    #[tokio::test]
    async fn test_poll_failure_is_fatal() {
        let cloud = FakeCloud {
            fail_poll: true,
            ..FakeCloud::default()
        };
        let clock = RecordingClock::default();
        let result = provision_one(&cloud, &clock, &TopologyConfig::default()).await;

        assert!(matches!(result, Err(ProvisionError::ProvisionPoll { .. })));
        assert_eq!(cloud.count(|c| matches!(c, Call::GetInstance(_))), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_bounded_poll_gives_up() {
        let cloud = FakeCloud {
            ready_after: 10,
            ..FakeCloud::default()
        };
        let clock = RecordingClock::default();
        let config = TopologyConfig {
            poll: PollConfig {
                max_attempts: Some(3),
                ..PollConfig::default()
            },
            ..TopologyConfig::default()
        };
        let result = provision_one(&cloud, &clock, &config).await;

        assert!(matches!(
            result,
            Err(ProvisionError::PollAttemptsExhausted { attempts: 3, .. })
        ));
        assert_eq!(cloud.count(|c| matches!(c, Call::GetInstance(_))), 3);
        assert_eq!(clock.sleeps().len(), 2);
    }

    #[tokio::test]
    async fn test_backoff_schedule_is_applied() {
        let cloud = FakeCloud {
            ready_after: 3,
            ..FakeCloud::default()
        };
        let clock = RecordingClock::default();
        let config = TopologyConfig {
            poll: PollConfig {
                interval_ms: 1000,
                max_interval_ms: 3000,
                multiplier: 2.0,
                max_attempts: None,
            },
            ..TopologyConfig::default()
        };
        provision_one(&cloud, &clock, &config).await.unwrap();

        assert_eq!(
            clock.sleeps(),
            vec![
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(3000),
            ]
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_submit_creates_nothing() {
        let cloud = FakeCloud::new();
        let clock = RecordingClock::default();
        let config = TopologyConfig::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = InstanceProvisioner::new(&cloud, &clock, &config, &cancel)
            .provision("backendDroplet-1", "Backend_Systems", 42)
            .await;

        assert!(matches!(result, Err(ProvisionError::Cancelled { .. })));
        assert!(cloud.calls().is_empty());
        assert!(cloud.created_instances().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_real_delay() {
        let cloud = FakeCloud {
            ready_after: u32::MAX,
            ..FakeCloud::default()
        };
        let clock = crate::clock::TokioClock;
        let config = TopologyConfig::default();
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(25)).await;
            canceller.cancel();
        });

        let result = InstanceProvisioner::new(&cloud, &clock, &config, &cancel)
            .provision("backendDroplet-1", "Backend_Systems", 42)
            .await;

        assert!(matches!(result, Err(ProvisionError::Cancelled { .. })));
        // checks at t=0, 10 and 20 before the cancel at 25
        assert_eq!(cloud.count(|c| matches!(c, Call::GetInstance(_))), 3);
    }

    #[test]
    fn test_select_public_address_first_match_wins() {
        let instance = Instance {
            id: 1,
            name: "bastionDroplet-1".to_string(),
            status: "active".to_string(),
            tags: Vec::new(),
            networks: vec![
                fleetgate_cloud::NetworkInterface::private("10.0.0.1"),
                fleetgate_cloud::NetworkInterface::public("198.51.100.1"),
                fleetgate_cloud::NetworkInterface::public("198.51.100.2"),
            ],
        };
        assert_eq!(select_public_address(&instance), Some("198.51.100.1"));
    }
}
