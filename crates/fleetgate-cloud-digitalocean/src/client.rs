//! DigitalOcean API client
//!
//! Direct REST implementation of the cloud client contract.
//! Uses Bearer token authentication with the operator's access token.

use crate::api::{
    AccountResponse, ApiErrorBody, CreateDropletRequest, CreateFirewallRequest, CreateKeyRequest,
    CreateTagRequest, DropletResponse, DropletsResponse, FirewallResponse, KeyResponse,
    TagResponse,
};
use crate::error::{DigitalOceanError, Result};
use async_trait::async_trait;
use fleetgate_cloud::{
    AccessToken, AuthStatus, CloudClient, CloudError, Firewall, FirewallRuleSet, Instance,
    InstancePage, InstanceSpec, Key, KeyCreateRequest, ListOptions, Tag,
};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

pub const DEFAULT_API_BASE: &str = "https://api.digitalocean.com/v2";

/// DigitalOcean control-plane client
pub struct DigitalOceanClient {
    client: reqwest::Client,
    token: AccessToken,
    base_url: String,
}

impl DigitalOceanClient {
    /// Create a client against the public API
    pub fn new(token: AccessToken) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Point the client at a different API root (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the API root
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        if self.token.is_empty() {
            return Err(DigitalOceanError::InvalidConfig(
                "access token is empty".to_string(),
            ));
        }

        let response = request
            .bearer_auth(self.token.secret())
            .header("User-Agent", "fleetgate")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| {
                    if body.is_empty() {
                        status.to_string()
                    } else {
                        body
                    }
                });

            if status == StatusCode::UNAUTHORIZED {
                return Err(DigitalOceanError::Unauthorized(message));
            }
            return Err(DigitalOceanError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }

    /// Get the account bound to the token
    pub async fn account(&self) -> Result<AccountResponse> {
        tracing::debug!("GET /account");
        self.send(self.client.get(self.url("/account"))).await
    }
}

#[async_trait]
impl CloudClient for DigitalOceanClient {
    fn name(&self) -> &str {
        "digitalocean"
    }

    async fn check_auth(&self) -> fleetgate_cloud::Result<AuthStatus> {
        match self.account().await {
            Ok(response) => {
                let account = response.account;
                Ok(AuthStatus::ok(format!("{} ({})", account.email, account.status)))
            }
            Err(DigitalOceanError::Unauthorized(message)) => Ok(AuthStatus::failed(message)),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_key(&self, request: &KeyCreateRequest) -> fleetgate_cloud::Result<Key> {
        tracing::debug!("POST /account/keys name={}", request.name);
        let response: KeyResponse = self
            .send(
                self.client
                    .post(self.url("/account/keys"))
                    .json(&CreateKeyRequest::from(request)),
            )
            .await?;
        Ok(response.ssh_key.into())
    }

    async fn create_tag(&self, name: &str) -> fleetgate_cloud::Result<Tag> {
        tracing::debug!("POST /tags name={}", name);
        let response: TagResponse = self
            .send(
                self.client
                    .post(self.url("/tags"))
                    .json(&CreateTagRequest { name }),
            )
            .await?;
        Ok(response.tag.into())
    }

    async fn create_instance(&self, spec: &InstanceSpec) -> fleetgate_cloud::Result<Instance> {
        tracing::debug!("POST /droplets name={} region={}", spec.name, spec.region);
        let response: DropletResponse = self
            .send(
                self.client
                    .post(self.url("/droplets"))
                    .json(&CreateDropletRequest::from(spec)),
            )
            .await?;
        Ok(response.droplet.into())
    }

    async fn get_instance(&self, id: u64) -> fleetgate_cloud::Result<Instance> {
        tracing::debug!("GET /droplets/{}", id);
        let response: DropletResponse = self
            .send(self.client.get(self.url(&format!("/droplets/{}", id))))
            .await?;
        Ok(response.droplet.into())
    }

    async fn list_instances(&self, options: &ListOptions) -> fleetgate_cloud::Result<InstancePage> {
        if options.page == 0 || options.per_page == 0 {
            return Err(CloudError::InvalidConfig(format!(
                "invalid list options: page={} per_page={}",
                options.page, options.per_page
            )));
        }

        tracing::debug!(
            "GET /droplets page={} per_page={}",
            options.page,
            options.per_page
        );
        let response: DropletsResponse = self
            .send(self.client.get(self.url("/droplets")).query(&[
                ("page", options.page),
                ("per_page", options.per_page),
            ]))
            .await?;

        Ok(InstancePage {
            has_next: response.links.has_next(),
            instances: response.droplets.into_iter().map(Into::into).collect(),
        })
    }

    async fn create_firewall(&self, rule_set: &FirewallRuleSet) -> fleetgate_cloud::Result<Firewall> {
        tracing::debug!("POST /firewalls name={} tag={}", rule_set.name, rule_set.tag);
        let response: FirewallResponse = self
            .send(
                self.client
                    .post(self.url("/firewalls"))
                    .json(&CreateFirewallRequest::from(rule_set)),
            )
            .await?;
        Ok(response.firewall.into())
    }
}
