//! Provider metadata: locations, VM sizes, Kubernetes versions.

use log::{debug, warn};

use crate::client::{require_segment, AksClient};
use crate::config::CONTAINER_SERVICE_NAMESPACE;
use crate::error::AksResult;
use crate::normalize::{self, ok_codes};
use crate::transport::ArmRequest;
use crate::types::{Location, OrchestratorVersionProfileList, VmSize};

pub async fn list_locations(client: &AksClient) -> AksResult<Vec<String>> {
    let url = client.subscription_url(&format!(
        "/locations?api-version={}",
        client.config().api_version_subscriptions
    ));
    debug!("list_locations → {}", url);
    let items: Vec<Location> = client.get_all_pages(&url).await?;
    Ok(items.into_iter().map(|l| l.name).collect())
}

pub async fn list_vm_sizes(client: &AksClient, location: &str) -> AksResult<Vec<String>> {
    require_segment("location", location)?;
    let url = client.subscription_url(&format!(
        "/providers/Microsoft.Compute/locations/{}/vmSizes?api-version={}",
        location,
        client.config().api_version_compute
    ));
    debug!("list_vm_sizes({}) → {}", location, url);
    let items: Vec<VmSize> = client.get_all_pages(&url).await?;
    Ok(items.into_iter().map(|v| v.name).collect())
}

/// Orchestrator versions offered for managed clusters in `location`.
pub async fn list_kubernetes_versions(
    client: &AksClient,
    location: &str,
) -> AksResult<Vec<String>> {
    require_segment("location", location)?;
    let url = client.subscription_url(&format!(
        "/providers/{}/locations/{}/orchestrators?api-version={}&resource-type=managedClusters",
        CONTAINER_SERVICE_NAMESPACE,
        location,
        client.config().api_version_orchestrators
    ));
    debug!("list_kubernetes_versions({}) → {}", location, url);

    let resp = client.send(ArmRequest::get(url)).await?;
    if let Err(e) = normalize::check(resp.status, &resp.body, ok_codes::LIST) {
        warn!("list_kubernetes_versions({}) → {}", location, resp.status);
        return Err(e);
    }
    let list: OrchestratorVersionProfileList = normalize::decode_or_default(&resp.body);
    Ok(list
        .properties
        .map(|p| p.orchestrators)
        .unwrap_or_default()
        .into_iter()
        .map(|o| o.orchestrator_version)
        .collect())
}

// ─── Tests ──────────────────────────────────────────────────────────
