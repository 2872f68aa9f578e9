//! Core types for the AKS managed-cluster API.
//!
//! Wire structs mirror the ARM JSON field names; the domain structs
//! (`ClusterSnapshot`, `ClusterResponse`, `AccessProfile`) are what callers
//! see.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AksError, AksResult};

// ─── OAuth / Auth ────────────────────────────────────────────────────

/// Cached bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AzureToken {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AzureToken {
    /// A token is treated as expired one minute early so a request never
    /// races the real expiry.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => Utc::now() + chrono::Duration::seconds(60) >= exp,
            None => false,
        }
    }
}

/// Raw token endpoint response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

fn default_token_type() -> String {
    "Bearer".into()
}

// ─── Azure Resource Manager common ──────────────────────────────────

/// Generic ARM list wrapper (`value` array with optional `nextLink`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArmList<T> {
    #[serde(default)]
    pub value: Vec<T>,
    #[serde(default)]
    pub next_link: Option<String>,
}

// ─── Cluster identity & create spec ─────────────────────────────────

/// Identifies one managed cluster resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ClusterIdentity {
    pub name: String,
    pub resource_group: String,
}

impl ClusterIdentity {
    pub fn new(name: impl Into<String>, resource_group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_group: resource_group.into(),
        }
    }
}

impl fmt::Display for ClusterIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.resource_group)
    }
}

/// Everything needed to create (or update) one managed cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClusterCreateSpec {
    pub name: String,
    pub resource_group: String,
    pub location: String,
    pub dns_prefix: String,
    pub vm_size: String,
    pub agent_count: u32,
    pub agent_name: String,
    pub kubernetes_version: String,
    pub admin_username: String,
    pub ssh_public_key: String,
}

impl ClusterCreateSpec {
    /// Check required fields. The first failing field is named.
    pub fn validate(&self) -> AksResult<()> {
        let required: [(&str, &str); 9] = [
            ("name", self.name.as_str()),
            ("resource_group", self.resource_group.as_str()),
            ("location", self.location.as_str()),
            ("dns_prefix", self.dns_prefix.as_str()),
            ("vm_size", self.vm_size.as_str()),
            ("agent_name", self.agent_name.as_str()),
            ("kubernetes_version", self.kubernetes_version.as_str()),
            ("admin_username", self.admin_username.as_str()),
            ("ssh_public_key", self.ssh_public_key.as_str()),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AksError::validation(format!("{} is required", field)));
            }
        }
        if self.agent_count == 0 {
            return Err(AksError::validation("agent_count must be at least 1"));
        }
        Ok(())
    }

    pub fn identity(&self) -> ClusterIdentity {
        ClusterIdentity::new(self.name.clone(), self.resource_group.clone())
    }
}

// ─── Provisioning state ─────────────────────────────────────────────

/// Provider-reported lifecycle tag. Anything other than `Succeeded` or
/// `Failed` is an open-ended in-progress value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProvisioningState {
    Succeeded,
    Failed,
    InProgress(String),
}

impl ProvisioningState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::InProgress(s) => s,
        }
    }
}

impl Default for ProvisioningState {
    fn default() -> Self {
        Self::InProgress(String::new())
    }
}

impl From<String> for ProvisioningState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::InProgress(s),
        }
    }
}

impl From<&str> for ProvisioningState {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<ProvisioningState> for String {
    fn from(s: ProvisioningState) -> String {
        match s {
            ProvisioningState::InProgress(v) => v,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Managed cluster wire format ────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AgentPoolProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub vm_size: String,
}

/// `GET`/`PUT` response body of a managed cluster.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ManagedCluster {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub properties: Option<ManagedClusterProperties>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterProperties {
    #[serde(default)]
    pub provisioning_state: Option<String>,
    #[serde(default)]
    pub kubernetes_version: Option<String>,
    #[serde(default)]
    pub dns_prefix: Option<String>,
    #[serde(default)]
    pub fqdn: Option<String>,
    #[serde(default)]
    pub agent_pool_profiles: Vec<AgentPoolProfile>,
}

/// `PUT` request body for create-or-update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterRequest {
    pub location: String,
    pub properties: ManagedClusterRequestProperties,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterRequestProperties {
    pub dns_prefix: String,
    pub kubernetes_version: String,
    pub agent_pool_profiles: Vec<AgentPoolProfile>,
    pub linux_profile: LinuxProfile,
    pub service_principal_profile: ServicePrincipalProfile,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinuxProfile {
    pub admin_username: String,
    pub ssh: SshConfiguration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SshConfiguration {
    pub public_keys: Vec<SshPublicKey>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SshPublicKey {
    pub key_data: String,
}

/// Node identity of the cluster itself.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePrincipalProfile {
    pub client_id: String,
    pub secret: String,
}

impl fmt::Debug for ServicePrincipalProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServicePrincipalProfile")
            .field("client_id", &self.client_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl ManagedClusterRequest {
    /// Build the request body; the service principal is the caller's own.
    pub fn from_spec(spec: &ClusterCreateSpec, client_id: &str, secret: &str) -> Self {
        Self {
            location: spec.location.clone(),
            properties: ManagedClusterRequestProperties {
                dns_prefix: spec.dns_prefix.clone(),
                kubernetes_version: spec.kubernetes_version.clone(),
                agent_pool_profiles: vec![AgentPoolProfile {
                    name: spec.agent_name.clone(),
                    count: spec.agent_count,
                    vm_size: spec.vm_size.clone(),
                }],
                linux_profile: LinuxProfile {
                    admin_username: spec.admin_username.clone(),
                    ssh: SshConfiguration {
                        public_keys: vec![SshPublicKey {
                            key_data: spec.ssh_public_key.trim().to_string(),
                        }],
                    },
                },
                service_principal_profile: ServicePrincipalProfile {
                    client_id: client_id.to_string(),
                    secret: secret.to_string(),
                },
            },
        }
    }
}

// ─── Snapshot / response ────────────────────────────────────────────

/// Point-in-time read of a cluster's server-side state.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ClusterSnapshot {
    pub id: String,
    pub name: String,
    pub location: String,
    pub provisioning_state: ProvisioningState,
    pub agent_pool_profiles: Vec<AgentPoolProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
}

impl From<ManagedCluster> for ClusterSnapshot {
    fn from(mc: ManagedCluster) -> Self {
        let props = mc.properties.unwrap_or_default();
        Self {
            id: mc.id,
            name: mc.name,
            location: mc.location,
            provisioning_state: props
                .provisioning_state
                .map(ProvisioningState::from)
                .unwrap_or_default(),
            agent_pool_profiles: props.agent_pool_profiles,
            kubernetes_version: props.kubernetes_version,
            dns_prefix: props.dns_prefix,
            fqdn: props.fqdn,
        }
    }
}

/// Successful outcome of a single call: status code plus snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClusterResponse {
    pub status_code: u16,
    pub value: ClusterSnapshot,
    /// Provider message when a read came back with a non-200 status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ClusterResponse {
    pub fn new(status_code: u16, value: ClusterSnapshot) -> Self {
        Self {
            status_code,
            value,
            error_message: None,
        }
    }
}

// ─── Access profile ─────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterAccessProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub properties: Option<AccessProfileProperties>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccessProfileProperties {
    /// Base64-encoded kubeconfig.
    #[serde(default)]
    pub kube_config: String,
}

/// Kubeconfig bundle for one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessProfile {
    pub location: String,
    pub name: String,
    pub kube_config: Vec<u8>,
}

impl AccessProfile {
    pub fn kube_config_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.kube_config).ok()
    }
}

// ─── Metadata endpoints ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VmSize {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub number_of_cores: u32,
    #[serde(default, rename = "memoryInMB")]
    pub memory_in_mb: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrchestratorVersionProfileList {
    #[serde(default)]
    pub properties: Option<OrchestratorProperties>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrchestratorProperties {
    #[serde(default)]
    pub orchestrators: Vec<OrchestratorVersionProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorVersionProfile {
    #[serde(default)]
    pub orchestrator_type: String,
    #[serde(default)]
    pub orchestrator_version: String,
    #[serde(default)]
    pub default: Option<bool>,
}

// ─── Tests ──────────────────────────────────────────────────────────
