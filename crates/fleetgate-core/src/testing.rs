//! In-memory cloud and clock doubles for unit tests

use crate::clock::Clock;
use async_trait::async_trait;
use fleetgate_cloud::{
    AuthStatus, CloudClient, CloudError, Firewall, FirewallRuleSet, Instance, InstancePage,
    InstanceSpec, Key, KeyCreateRequest, ListOptions, NetworkInterface, Tag,
};
use std::sync::Mutex;
use std::time::Duration;

/// One call received by [`FakeCloud`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateKey(String),
    CreateTag(String),
    CreateInstance(String),
    GetInstance(u64),
    ListInstances(u32),
    CreateFirewall(String),
}

type NetworkFn = fn(&str, u64) -> Vec<NetworkInterface>;

/// Public and private address derived from the instance id
pub fn dual_stack(_name: &str, id: u64) -> Vec<NetworkInterface> {
    vec![
        NetworkInterface::private(format!("10.0.0.{}", id)),
        NetworkInterface::public(format!("203.0.113.{}", id)),
    ]
}

pub fn private_only(_name: &str, id: u64) -> Vec<NetworkInterface> {
    vec![NetworkInterface::private(format!("10.0.0.{}", id))]
}

#[derive(Debug, Clone)]
pub(crate) struct Stored {
    instance: Instance,
    tag: String,
    gets: u32,
}

#[derive(Default)]
pub(crate) struct State {
    calls: Vec<Call>,
    next_id: u64,
    instances: Vec<Stored>,
    firewalls: Vec<FirewallRuleSet>,
}

/// Scriptable [`CloudClient`]
///
/// Created instances show their tag and networks only after `ready_after`
/// unsuccessful `get_instance` calls.
pub struct FakeCloud {
    pub(crate) state: Mutex<State>,
    pub ready_after: u32,
    pub networks: NetworkFn,
    pub preexisting: Vec<Instance>,
    pub fail_key: bool,
    pub fail_tag: Option<String>,
    pub fail_submit: Option<String>,
    pub fail_poll: bool,
    pub fail_list: bool,
    pub fail_firewall: Option<String>,
}

impl Default for FakeCloud {
    fn default() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1,
                ..State::default()
            }),
            ready_after: 0,
            networks: dual_stack,
            preexisting: Vec::new(),
            fail_key: false,
            fail_tag: None,
            fail_submit: None,
            fail_poll: false,
            fail_list: false,
            fail_firewall: None,
        }
    }
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| matches(c)).count()
    }

    pub fn firewalls(&self) -> Vec<FirewallRuleSet> {
        self.state.lock().unwrap().firewalls.clone()
    }

    pub fn created_instances(&self) -> Vec<Instance> {
        self.state
            .lock()
            .unwrap()
            .instances
            .iter()
            .map(|s| s.instance.clone())
            .collect()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn rejected(message: &str) -> CloudError {
        CloudError::ApiError {
            status: 422,
            message: message.to_string(),
        }
    }

    fn ready(&self, stored: &Stored) -> Instance {
        Instance {
            status: "active".to_string(),
            tags: vec![stored.tag.clone()],
            networks: (self.networks)(&stored.instance.name, stored.instance.id),
            ..stored.instance.clone()
        }
    }
}

#[async_trait]
impl CloudClient for FakeCloud {
    fn name(&self) -> &str {
        "fake"
    }

    async fn check_auth(&self) -> fleetgate_cloud::Result<AuthStatus> {
        Ok(AuthStatus::ok("fake@example.com"))
    }

    async fn create_key(&self, request: &KeyCreateRequest) -> fleetgate_cloud::Result<Key> {
        self.record(Call::CreateKey(request.name.clone()));
        if self.fail_key {
            return Err(Self::rejected("key rejected"));
        }
        let id = self.calls().len() as u64;
        Ok(Key {
            id,
            name: request.name.clone(),
            fingerprint: format!("fp:{}", id),
            public_key: request.public_key.clone(),
        })
    }

    async fn create_tag(&self, name: &str) -> fleetgate_cloud::Result<Tag> {
        self.record(Call::CreateTag(name.to_string()));
        if self.fail_tag.as_deref() == Some(name) {
            return Err(Self::rejected("tag rejected"));
        }
        Ok(Tag {
            name: name.to_string(),
        })
    }

    async fn create_instance(&self, spec: &InstanceSpec) -> fleetgate_cloud::Result<Instance> {
        self.record(Call::CreateInstance(spec.name.clone()));
        if self.fail_submit.as_deref() == Some(spec.name.as_str()) {
            return Err(Self::rejected("droplet rejected"));
        }

        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;

        let instance = Instance {
            id,
            name: spec.name.clone(),
            status: "new".to_string(),
            tags: Vec::new(),
            networks: Vec::new(),
        };
        state.instances.push(Stored {
            instance: instance.clone(),
            tag: spec.tag.clone(),
            gets: 0,
        });
        Ok(instance)
    }

    async fn get_instance(&self, id: u64) -> fleetgate_cloud::Result<Instance> {
        self.record(Call::GetInstance(id));
        if self.fail_poll {
            return Err(CloudError::Transport("connection reset".to_string()));
        }

        let mut state = self.state.lock().unwrap();
        let stored = state
            .instances
            .iter_mut()
            .find(|s| s.instance.id == id)
            .ok_or_else(|| CloudError::ResourceNotFound(id.to_string()))?;

        if stored.gets < self.ready_after {
            stored.gets += 1;
            return Ok(stored.instance.clone());
        }
        let stored = stored.clone();
        drop(state);
        Ok(self.ready(&stored))
    }

    async fn list_instances(&self, options: &ListOptions) -> fleetgate_cloud::Result<InstancePage> {
        self.record(Call::ListInstances(options.page));
        if self.fail_list {
            return Err(CloudError::Transport("timeout".to_string()));
        }

        let stored: Vec<Stored> = self.state.lock().unwrap().instances.clone();
        let all: Vec<Instance> = self
            .preexisting
            .iter()
            .cloned()
            .chain(stored.iter().map(|s| self.ready(s)))
            .collect();

        let per_page = options.per_page as usize;
        let start = (options.page as usize - 1) * per_page;
        let end = (start + per_page).min(all.len());
        let instances = if start < all.len() {
            all[start..end].to_vec()
        } else {
            Vec::new()
        };

        Ok(InstancePage {
            instances,
            has_next: end < all.len(),
        })
    }

    async fn create_firewall(&self, rule_set: &FirewallRuleSet) -> fleetgate_cloud::Result<Firewall> {
        self.record(Call::CreateFirewall(rule_set.name.clone()));
        if self.fail_firewall.as_deref() == Some(rule_set.name.as_str()) {
            return Err(Self::rejected("firewall rejected"));
        }

        let mut state = self.state.lock().unwrap();
        state.firewalls.push(rule_set.clone());
        Ok(Firewall {
            id: format!("fw-{}", state.firewalls.len()),
            name: rule_set.name.clone(),
            status: "waiting".to_string(),
        })
    }
}

/// Clock that returns immediately and remembers every requested delay
#[derive(Default)]
pub struct RecordingClock {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingClock {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
