//! AKS client: credentials, configuration and a shared transport.
//!
//! Builds ARM URLs, issues requests through the [`ArmTransport`] and
//! follows `nextLink` pagination.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, warn};
use serde::de::DeserializeOwned;

use crate::config::{AksConfig, CONTAINER_SERVICE_NAMESPACE};
use crate::credentials::Credentials;
use crate::error::{AksError, AksResult};
use crate::normalize;
use crate::transport::{ArmRequest, ArmTransport, HttpTransport, RawResponse};
use crate::types::ArmList;

/// Explicit, caller-constructed handle. Cheap to clone; clones share the
/// transport (and therefore its token cache).
#[derive(Clone)]
pub struct AksClient {
    transport: Arc<dyn ArmTransport>,
    credentials: Credentials,
    config: AksConfig,
}

impl AksClient {
    /// Production factory: reads `AZURE_*` from the environment and signs
    /// requests with a client-credentials token.
    pub fn from_env(config: AksConfig) -> AksResult<Self> {
        let credentials = Credentials::from_env()?;
        Self::connect(credentials, config)
    }

    pub fn connect(credentials: Credentials, config: AksConfig) -> AksResult<Self> {
        credentials.validate()?;
        config.validate()?;
        let transport = HttpTransport::new(credentials.clone(), &config)?;
        Ok(Self::with_transport(credentials, config, Arc::new(transport)))
    }

    /// Build over any transport (fakes in tests, custom signers).
    pub fn with_transport(
        credentials: Credentials,
        config: AksConfig,
        transport: Arc<dyn ArmTransport>,
    ) -> Self {
        Self {
            transport,
            credentials,
            config,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &AksConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.credentials.client_secret
    }

    pub fn subscription_id(&self) -> &str {
        &self.credentials.subscription_id
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Subscription-scoped URL.
    pub fn subscription_url(&self, suffix: &str) -> String {
        format!(
            "{}/subscriptions/{}{}",
            self.config.arm_base, self.credentials.subscription_id, suffix
        )
    }

    /// Resource-group-scoped URL.
    pub fn resource_group_url(&self, rg: &str, suffix: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}{}",
            self.config.arm_base, self.credentials.subscription_id, rg, suffix
        )
    }

    /// Managed-cluster collection (`name == None`) or item URL, with the
    /// `api-version` query attached.
    pub fn managed_cluster_url(&self, rg: &str, name: Option<&str>, sub_path: &str) -> String {
        let item = name.map(|n| format!("/{}", n)).unwrap_or_default();
        self.resource_group_url(
            rg,
            &format!(
                "/providers/{}/managedClusters{}{}?api-version={}",
                CONTAINER_SERVICE_NAMESPACE,
                item,
                sub_path,
                self.config.api_version_managed_clusters
            ),
        )
    }

    // ── Core calls ───────────────────────────────────────────────────

    pub async fn send(&self, request: ArmRequest) -> AksResult<RawResponse> {
        self.transport.send(request).await
    }

    /// Follow `nextLink` and collect every item. Pages that fail to decode
    /// count as empty and end the walk; a link already visited ends it too.
    pub async fn get_all_pages<T>(&self, initial_url: &str) -> AksResult<Vec<T>>
    where
        T: DeserializeOwned + Default,
    {
        let mut all: Vec<T> = Vec::new();
        let mut url = initial_url.to_string();
        let mut visited: HashSet<String> = HashSet::new();

        loop {
            debug!("Azure paginate: {}", url);
            visited.insert(url.clone());
            let resp = self.send(ArmRequest::get(url.as_str())).await?;
            if let Err(e) = normalize::check(resp.status, &resp.body, normalize::ok_codes::LIST) {
                warn!("Azure GET {} → {}", url, resp.status);
                return Err(e);
            }
            let page: ArmList<T> = normalize::decode_or_default(&resp.body);
            all.extend(page.value);
            match page.next_link {
                Some(next) if !next.is_empty() && !visited.contains(&next) => url = next,
                Some(next) if !next.is_empty() => {
                    warn!("nextLink {} already visited, stopping pagination", next);
                    break;
                }
                _ => break,
            }
        }

        Ok(all)
    }
}

impl std::fmt::Debug for AksClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AksClient")
            .field("credentials", &self.credentials)
            .field("config", &self.config)
            .finish()
    }
}

/// Reject path segments that would escape the resource path.
pub(crate) fn require_segment(field: &str, value: &str) -> AksResult<()> {
    if value.trim().is_empty() {
        return Err(AksError::validation(format!("{} is required", field)));
    }
    if value.contains('/') || value.contains('?') || value.contains('#') {
        return Err(AksError::validation(format!(
            "{} contains an illegal character: {}",
            field, value
        )));
    }
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────
