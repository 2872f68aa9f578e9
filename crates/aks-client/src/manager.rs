//! Cluster Manager capability.
//!
//! Pure domain surface, one method per lifecycle action. Logging is not
//! part of it; implementations log through the `log` facade.

use async_trait::async_trait;

use crate::client::AksClient;
use crate::error::AksResult;
use crate::managed_clusters;
use crate::metadata;
use crate::types::{
    AccessProfile, ClusterCreateSpec, ClusterIdentity, ClusterResponse, ClusterSnapshot,
};

#[async_trait]
pub trait ClusterManager: Send + Sync {
    async fn create_or_update(&self, spec: &ClusterCreateSpec) -> AksResult<ClusterResponse>;

    /// Every HTTP status is `Ok`; only transport failures are `Err`.
    async fn get(&self, identity: &ClusterIdentity) -> AksResult<ClusterResponse>;

    async fn delete(&self, identity: &ClusterIdentity) -> AksResult<u16>;

    async fn list(&self, resource_group: &str) -> AksResult<Vec<ClusterSnapshot>>;

    async fn list_all(&self) -> AksResult<Vec<ClusterSnapshot>>;

    async fn get_access_profile(
        &self,
        identity: &ClusterIdentity,
        role_name: &str,
    ) -> AksResult<AccessProfile>;

    async fn list_vm_sizes(&self, location: &str) -> AksResult<Vec<String>>;

    async fn list_locations(&self) -> AksResult<Vec<String>>;

    async fn list_kubernetes_versions(&self, location: &str) -> AksResult<Vec<String>>;
}

#[async_trait]
impl ClusterManager for AksClient {
    async fn create_or_update(&self, spec: &ClusterCreateSpec) -> AksResult<ClusterResponse> {
        managed_clusters::create_or_update(self, spec).await
    }

    async fn get(&self, identity: &ClusterIdentity) -> AksResult<ClusterResponse> {
        managed_clusters::get(self, identity).await
    }

    async fn delete(&self, identity: &ClusterIdentity) -> AksResult<u16> {
        managed_clusters::delete(self, identity).await
    }

    async fn list(&self, resource_group: &str) -> AksResult<Vec<ClusterSnapshot>> {
        managed_clusters::list(self, resource_group).await
    }

    async fn list_all(&self) -> AksResult<Vec<ClusterSnapshot>> {
        managed_clusters::list_all(self).await
    }

    async fn get_access_profile(
        &self,
        identity: &ClusterIdentity,
        role_name: &str,
    ) -> AksResult<AccessProfile> {
        managed_clusters::get_access_profile(self, identity, role_name).await
    }

    async fn list_vm_sizes(&self, location: &str) -> AksResult<Vec<String>> {
        metadata::list_vm_sizes(self, location).await
    }

    async fn list_locations(&self) -> AksResult<Vec<String>> {
        metadata::list_locations(self).await
    }

    async fn list_kubernetes_versions(&self, location: &str) -> AksResult<Vec<String>> {
        metadata::list_kubernetes_versions(self, location).await
    }
}
