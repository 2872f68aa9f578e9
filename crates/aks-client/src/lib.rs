//! # AKS client
//!
//! Thin async client for Azure Kubernetes Service managed clusters over the
//! Azure Resource Manager (ARM) REST API.
//!
//! ## Features
//!
//! - **Credentials** – `AZURE_*` environment loading, SSH public key helper
//! - **Authentication** – client-credentials OAuth2 flow with a token cache
//! - **Managed clusters** – create/update, get, delete, list, access profiles
//! - **Metadata** – locations, VM sizes, Kubernetes versions
//! - **Polling** – wait for a terminal provisioning state, cancellable
//!
//! ```no_run
//! use aks_client::{poll_cluster, AksClient, AksConfig, ClusterIdentity};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> aks_client::AksResult<()> {
//! let config = AksConfig::new();
//! let client = AksClient::from_env(config.clone())?;
//! let id = ClusterIdentity::new("c1", "rg1");
//! let cancel = CancellationToken::new();
//! let ready = poll_cluster(&client, &id, config.poll_settings(), &cancel).await?;
//! println!("{} is {}", ready.value.name, ready.value.provisioning_state);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod credentials;
pub mod auth;
pub mod normalize;
pub mod transport;
pub mod client;
pub mod managed_clusters;
pub mod metadata;
pub mod manager;
pub mod polling;

#[cfg(test)]
pub(crate) mod testing;

pub use client::AksClient;
pub use config::{AksConfig, PollSettings};
pub use credentials::{read_public_key, Credentials};
pub use error::{AksError, AksErrorKind, AksResult};
pub use manager::ClusterManager;
pub use polling::{create_and_wait, delete_and_wait, poll_cluster, PollState};
pub use transport::{ArmRequest, ArmTransport, HttpTransport, RawResponse};
pub use types::{
    AccessProfile, ClusterCreateSpec, ClusterIdentity, ClusterResponse, ClusterSnapshot,
    ProvisioningState,
};
