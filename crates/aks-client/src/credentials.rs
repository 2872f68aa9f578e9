//! Service-principal credentials.
//!
//! Loaded once at startup from the standard `AZURE_*` environment
//! variables and never mutated afterwards.

use std::fmt;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::error::{AksError, AksResult};

pub const AZURE_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const AZURE_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub const AZURE_SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
pub const AZURE_TENANT_ID: &str = "AZURE_TENANT_ID";

/// Client credentials for Azure AD (service principal). Not `Serialize`:
/// the secret only ever goes to the token endpoint.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub subscription_id: String,
    pub tenant_id: String,
}

impl Credentials {
    /// Load from the process environment.
    pub fn from_env() -> AksResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary lookup. Variables are checked in a fixed
    /// order and the first missing or empty one is reported.
    pub fn from_lookup<F>(lookup: F) -> AksResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = |key: &str| -> AksResult<String> {
            match lookup(key) {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(AksError::missing_env(key)),
            }
        };

        let creds = Self {
            client_id: fetch(AZURE_CLIENT_ID)?,
            client_secret: fetch(AZURE_CLIENT_SECRET)?,
            subscription_id: fetch(AZURE_SUBSCRIPTION_ID)?,
            tenant_id: fetch(AZURE_TENANT_ID)?,
        };
        debug!(
            "loaded service principal {} for subscription {}",
            creds.client_id, creds.subscription_id
        );
        Ok(creds)
    }

    /// Re-check an already built value (e.g. deserialized from a file).
    pub fn validate(&self) -> AksResult<()> {
        let fields = [
            (AZURE_CLIENT_ID, &self.client_id),
            (AZURE_CLIENT_SECRET, &self.client_secret),
            (AZURE_SUBSCRIPTION_ID, &self.subscription_id),
            (AZURE_TENANT_ID, &self.tenant_id),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(AksError::missing_env(name));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("subscription_id", &self.subscription_id)
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// Read an OpenSSH public key for the cluster's Linux admin profile.
pub fn read_public_key(path: impl AsRef<Path>) -> AksResult<String> {
    let path = path.as_ref();
    let key = std::fs::read_to_string(path).map_err(|e| {
        AksError::configuration(format!("cannot read public key {}: {}", path.display(), e))
    })?;
    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(AksError::configuration(format!(
            "public key {} is empty",
            path.display()
        )));
    }
    Ok(key)
}

// ─── Tests ──────────────────────────────────────────────────────────
