//! Endpoint, API-version and polling configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AksError, AksResult};

/// Azure management base URL (public cloud).
pub const ARM_BASE: &str = "https://management.azure.com";

/// Azure AD login base URL (public cloud).
pub const LOGIN_BASE: &str = "https://login.microsoftonline.com";

/// Resource provider namespace of managed clusters.
pub const CONTAINER_SERVICE_NAMESPACE: &str = "Microsoft.ContainerService";

pub mod api_versions {
    pub const MANAGED_CLUSTERS: &str = "2017-08-31";
    pub const ORCHESTRATORS: &str = "2017-09-30";
    pub const COMPUTE: &str = "2018-04-01";
    pub const SUBSCRIPTIONS: &str = "2016-06-01";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AksConfig {
    pub arm_base: String,
    pub login_base: String,
    pub api_version_managed_clusters: String,
    pub api_version_orchestrators: String,
    pub api_version_compute: String,
    pub api_version_subscriptions: String,
    pub request_timeout_secs: u64,
    pub poll_interval_secs: u64,
    /// `None` polls until a terminal state or cancellation.
    pub poll_timeout_secs: Option<u64>,
}

impl AksConfig {
    pub fn new() -> Self {
        Self {
            arm_base: ARM_BASE.into(),
            login_base: LOGIN_BASE.into(),
            api_version_managed_clusters: api_versions::MANAGED_CLUSTERS.into(),
            api_version_orchestrators: api_versions::ORCHESTRATORS.into(),
            api_version_compute: api_versions::COMPUTE.into(),
            api_version_subscriptions: api_versions::SUBSCRIPTIONS.into(),
            request_timeout_secs: 30,
            poll_interval_secs: 10,
            poll_timeout_secs: None,
        }
    }

    /// Point both ARM and login traffic at another host (sovereign clouds,
    /// local mock servers).
    pub fn with_endpoints(
        mut self,
        arm_base: impl Into<String>,
        login_base: impl Into<String>,
    ) -> Self {
        self.arm_base = arm_base.into().trim_end_matches('/').to_string();
        self.login_base = login_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Both endpoints must be absolute http(s) URLs.
    pub fn validate(&self) -> AksResult<()> {
        for (field, value) in [("arm_base", &self.arm_base), ("login_base", &self.login_base)] {
            let parsed = url::Url::parse(value).map_err(|e| {
                AksError::configuration(format!("{} is not a URL ({}): {}", field, e, value))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AksError::configuration(format!(
                    "{} must use http or https: {}",
                    field, value
                )));
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(self.poll_interval_secs),
            timeout: self.poll_timeout_secs.map(Duration::from_secs),
        }
    }
}

impl Default for AksConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Knobs for one polling-engine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        AksConfig::new().poll_settings()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
