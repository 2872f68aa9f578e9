//! Managed clusters: create-or-update, get, delete, list, access profiles.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, info, warn};

use crate::client::{require_segment, AksClient};
use crate::error::{AksError, AksResult};
use crate::normalize::{self, ok_codes};
use crate::transport::ArmRequest;
use crate::types::{
    AccessProfile, ClusterCreateSpec, ClusterIdentity, ClusterResponse, ClusterSnapshot,
    ManagedCluster, ManagedClusterAccessProfile, ManagedClusterRequest,
};

fn cluster_url(client: &AksClient, identity: &ClusterIdentity) -> AksResult<String> {
    require_segment("resource_group", &identity.resource_group)?;
    require_segment("name", &identity.name)?;
    Ok(client.managed_cluster_url(&identity.resource_group, Some(&identity.name), ""))
}

// ─── Lifecycle ──────────────────────────────────────────────────────

/// PUT the cluster. 200 (update) and 201 (create accepted) are success;
/// the snapshot usually reports an in-progress state.
pub async fn create_or_update(
    client: &AksClient,
    spec: &ClusterCreateSpec,
) -> AksResult<ClusterResponse> {
    spec.validate()?;
    let identity = spec.identity();
    let url = cluster_url(client, &identity)?;
    let body = ManagedClusterRequest::from_spec(spec, client.client_id(), client.client_secret());
    let body = serde_json::to_value(&body)
        .map_err(|e| AksError::validation(format!("cannot encode cluster request: {e}")))?;
    debug!("create_or_update({}) → {}", identity, url);

    let resp = client.send(ArmRequest::put(url, body)).await?;
    if let Err(e) = normalize::check(resp.status, &resp.body, ok_codes::CREATE_OR_UPDATE) {
        warn!("create_or_update({}) → {} {}", identity, resp.status, e.message);
        return Err(e);
    }
    let value = normalize::snapshot(&resp.body);
    info!(
        "create_or_update({}) → {} ({})",
        identity, resp.status, value.provisioning_state
    );
    Ok(ClusterResponse::new(resp.status, value))
}

/// GET the cluster. Any HTTP status is returned for the caller to interpret;
/// only transport failures are errors.
pub async fn get(client: &AksClient, identity: &ClusterIdentity) -> AksResult<ClusterResponse> {
    let url = cluster_url(client, identity)?;
    debug!("get({}) → {}", identity, url);

    let resp = client.send(ArmRequest::get(url)).await?;
    let mut out = ClusterResponse::new(resp.status, normalize::snapshot(&resp.body));
    if resp.status != normalize::STATUS_OK {
        out.error_message = Some(normalize::error_message(resp.status, &resp.body));
    }
    Ok(out)
}

/// DELETE the cluster and return the status: 202 when the provider accepted
/// an asynchronous delete, 200/204 when it is already done.
pub async fn delete(client: &AksClient, identity: &ClusterIdentity) -> AksResult<u16> {
    let url = cluster_url(client, identity)?;
    debug!("delete({}) → {}", identity, url);

    let resp = client.send(ArmRequest::delete(url)).await?;
    if let Err(e) = normalize::check(resp.status, &resp.body, ok_codes::DELETE) {
        warn!("delete({}) → {} {}", identity, resp.status, e.message);
        return Err(e);
    }
    info!("delete({}) → {}", identity, resp.status);
    Ok(resp.status)
}

// ─── Listing ────────────────────────────────────────────────────────

pub async fn list(client: &AksClient, rg: &str) -> AksResult<Vec<ClusterSnapshot>> {
    require_segment("resource_group", rg)?;
    let url = client.managed_cluster_url(rg, None, "");
    debug!("list({}) → {}", rg, url);
    let items: Vec<ManagedCluster> = client.get_all_pages(&url).await?;
    Ok(items.into_iter().map(ClusterSnapshot::from).collect())
}

/// Every managed cluster in the subscription.
pub async fn list_all(client: &AksClient) -> AksResult<Vec<ClusterSnapshot>> {
    let url = client.subscription_url(&format!(
        "/providers/{}/managedClusters?api-version={}",
        crate::config::CONTAINER_SERVICE_NAMESPACE,
        client.config().api_version_managed_clusters
    ));
    debug!("list_all → {}", url);
    let items: Vec<ManagedCluster> = client.get_all_pages(&url).await?;
    Ok(items.into_iter().map(ClusterSnapshot::from).collect())
}

// ─── Access profiles ────────────────────────────────────────────────

/// Kubeconfig for `role` (e.g. `clusterAdmin`, `clusterUser`).
pub async fn get_access_profile(
    client: &AksClient,
    identity: &ClusterIdentity,
    role: &str,
) -> AksResult<AccessProfile> {
    require_segment("resource_group", &identity.resource_group)?;
    require_segment("name", &identity.name)?;
    require_segment("role", role)?;
    let url = client.managed_cluster_url(
        &identity.resource_group,
        Some(&identity.name),
        &format!("/accessProfiles/{}", role),
    );
    debug!("get_access_profile({}, {}) → {}", identity, role, url);

    let resp = client.send(ArmRequest::get(url)).await?;
    if let Err(e) = normalize::check(resp.status, &resp.body, ok_codes::GET) {
        warn!("get_access_profile({}, {}) → {}", identity, role, resp.status);
        return Err(e);
    }
    let raw: ManagedClusterAccessProfile = normalize::decode_or_default(&resp.body);
    let encoded = raw.properties.map(|p| p.kube_config).unwrap_or_default();
    Ok(AccessProfile {
        location: raw.location,
        name: raw.name,
        kube_config: decode_kube_config(&encoded),
    })
}

/// Base64-decode the kubeconfig; a payload that is not base64 is kept as-is.
fn decode_kube_config(encoded: &str) -> Vec<u8> {
    match STANDARD.decode(encoded.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("kubeConfig is not base64 ({}), returning raw payload", e);
            encoded.as_bytes().to_vec()
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AksErrorKind, INTERNAL_ERROR_CODE};
    use crate::testing::{test_client, ScriptedTransport};
    use crate::transport::RawResponse;
    use crate::types::ProvisioningState;
    use reqwest::Method;

    fn spec() -> ClusterCreateSpec {
        ClusterCreateSpec {
            name: "c1".into(),
            resource_group: "rg1".into(),
            location: "eastus".into(),
            dns_prefix: "c1-dns".into(),
            vm_size: "Standard_D2_v2".into(),
            agent_count: 3,
            agent_name: "agentpool1".into(),
            kubernetes_version: "1.7.7".into(),
            admin_username: "ubuntu".into(),
            ssh_public_key: "ssh-rsa AAAA test@host".into(),
        }
    }

    const CREATING: &str = r#"{"id":"/x/c1","name":"c1","location":"eastus",
        "properties":{"provisioningState":"Creating"}}"#;

    #[tokio::test]
    async fn create_returns_201_with_snapshot() {
        let (c, t) = test_client(ScriptedTransport::new(vec![RawResponse::new(201, CREATING)]));
        let r = create_or_update(&c, &spec()).await.unwrap();
        assert_eq!(r.status_code, 201);
        assert_eq!(r.value.name, "c1");
        assert_eq!(r.value.provisioning_state, ProvisioningState::InProgress("Creating".into()));

        let req = &t.requests()[0];
        assert_eq!(req.method, Method::PUT);
        assert!(req.url.ends_with("/managedClusters/c1?api-version=2017-08-31"));
        let body = req.body.as_ref().unwrap();
        assert_eq!(body["properties"]["servicePrincipalProfile"]["clientId"], "cid-456");
        assert_eq!(body["properties"]["servicePrincipalProfile"]["secret"], "top-secret");
        assert_eq!(body["properties"]["agentPoolProfiles"][0]["count"], 3);
    }

    #[tokio::test]
    async fn create_update_200_is_success() {
        let (c, _) = test_client(ScriptedTransport::new(vec![RawResponse::new(200, CREATING)]));
        assert_eq!(create_or_update(&c, &spec()).await.unwrap().status_code, 200);
    }

    #[tokio::test]
    async fn create_conflict_is_provider_error() {
        let body = r#"{"error":{"code":"QuotaExceeded","message":"quota exceeded"}}"#;
        let (c, _) = test_client(ScriptedTransport::new(vec![RawResponse::new(409, body)]));
        let e = create_or_update(&c, &spec()).await.unwrap_err();
        assert_eq!(e.kind, AksErrorKind::Provider);
        assert_eq!(e.status_code, Some(409));
        assert_eq!(e.message, "quota exceeded");
    }

    #[tokio::test]
    async fn create_bad_request_uses_top_level_message() {
        let body = r#"{"message":"bad dns prefix"}"#;
        let (c, _) = test_client(ScriptedTransport::new(vec![RawResponse::new(400, body)]));
        let e = create_or_update(&c, &spec()).await.unwrap_err();
        assert_eq!(e.status_code, Some(400));
        assert_eq!(e.message, "bad dns prefix");
    }

    #[tokio::test]
    async fn invalid_spec_makes_no_call() {
        let (c, t) = test_client(ScriptedTransport::new(vec![]));
        let mut s = spec();
        s.location = String::new();
        let e = create_or_update(&c, &s).await.unwrap_err();
        assert_eq!(e.kind, AksErrorKind::Validation);
        assert!(t.requests().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_internal_error() {
        let (c, _) = test_client(ScriptedTransport::with_results(vec![Err(
            AksError::transport("connection refused"),
        )]));
        let e = create_or_update(&c, &spec()).await.unwrap_err();
        assert_eq!(e.kind, AksErrorKind::Transport);
        assert_eq!(e.status_code, Some(INTERNAL_ERROR_CODE));
        assert_eq!(e.message, "connection refused");
    }

    #[tokio::test]
    async fn get_returns_404_as_value() {
        let body = r#"{"error":{"code":"ResourceNotFound","message":"not found"}}"#;
        let (c, _) = test_client(ScriptedTransport::new(vec![RawResponse::new(404, body)]));
        let r = get(&c, &ClusterIdentity::new("c1", "rg1")).await.unwrap();
        assert_eq!(r.status_code, 404);
        assert_eq!(r.error_message.as_deref(), Some("not found"));
    }

    #[tokio::test]
    async fn repeated_gets_are_identical() {
        let ok = r#"{"name":"c1","properties":{"provisioningState":"Succeeded"}}"#;
        let (c, t) = test_client(ScriptedTransport::new(vec![
            RawResponse::new(200, ok),
            RawResponse::new(200, ok),
        ]));
        let id = ClusterIdentity::new("c1", "rg1");
        let a = get(&c, &id).await.unwrap();
        let b = get(&c, &id).await.unwrap();
        assert_eq!(a, b);
        assert!(a.error_message.is_none());
        assert!(t.requests().iter().all(|r| r.method == Method::GET));
    }

    #[tokio::test]
    async fn delete_accepts_202_and_204() {
        let (c, t) = test_client(ScriptedTransport::new(vec![
            RawResponse::new(202, ""),
            RawResponse::new(204, ""),
        ]));
        let id = ClusterIdentity::new("c1", "rg1");
        assert_eq!(delete(&c, &id).await.unwrap(), 202);
        assert_eq!(delete(&c, &id).await.unwrap(), 204);
        assert_eq!(t.requests()[0].method, Method::DELETE);
    }

    #[tokio::test]
    async fn delete_missing_is_provider_error() {
        let (c, _) = test_client(ScriptedTransport::new(vec![RawResponse::new(404, "")]));
        let e = delete(&c, &ClusterIdentity::new("c1", "rg1")).await.unwrap_err();
        assert_eq!(e.status_code, Some(404));
        assert_eq!(e.message, "");
    }

    #[tokio::test]
    async fn list_follows_pages() {
        let (c, t) = test_client(ScriptedTransport::new(vec![
            RawResponse::new(
                200,
                r#"{"value":[{"name":"c1"}],"nextLink":"https://management.azure.com/next"}"#,
            ),
            RawResponse::new(
                200,
                r#"{"value":[{"name":"c2","properties":{"provisioningState":"Failed"}}]}"#,
            ),
        ]));
        let items = list(&c, "rg1").await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].provisioning_state, ProvisioningState::Failed);
        assert!(t.urls()[0]
            .contains("/resourceGroups/rg1/providers/Microsoft.ContainerService/managedClusters?"));
    }

    #[tokio::test]
    async fn list_all_is_subscription_scoped() {
        let (c, t) =
            test_client(ScriptedTransport::new(vec![RawResponse::new(200, r#"{"value":[]}"#)]));
        assert!(list_all(&c).await.unwrap().is_empty());
        assert_eq!(
            t.urls()[0],
            "https://management.azure.com/subscriptions/sub-123/providers/Microsoft.ContainerService/managedClusters?api-version=2017-08-31"
        );
    }

    #[tokio::test]
    async fn access_profile_decodes_kubeconfig() {
        let encoded = STANDARD.encode("apiVersion: v1\nkind: Config\n");
        let body = format!(
            r#"{{"name":"clusterAdmin","location":"eastus","properties":{{"kubeConfig":"{}"}}}}"#,
            encoded
        );
        let (c, t) = test_client(ScriptedTransport::new(vec![RawResponse::new(200, body)]));
        let p = get_access_profile(&c, &ClusterIdentity::new("c1", "rg1"), "clusterAdmin")
            .await
            .unwrap();
        assert_eq!(p.name, "clusterAdmin");
        assert_eq!(p.location, "eastus");
        assert_eq!(p.kube_config_str(), Some("apiVersion: v1\nkind: Config\n"));
        assert!(t.urls()[0]
            .contains("/managedClusters/c1/accessProfiles/clusterAdmin?api-version="));
    }

    #[tokio::test]
    async fn access_profile_error_status() {
        let (c, _) = test_client(ScriptedTransport::new(vec![RawResponse::new(
            403,
            r#"{"error":{"message":"denied"}}"#,
        )]));
        let e = get_access_profile(&c, &ClusterIdentity::new("c1", "rg1"), "clusterUser")
            .await
            .unwrap_err();
        assert_eq!(e.message, "denied");
    }

    #[test]
    fn non_base64_kubeconfig_kept_raw() {
        assert_eq!(decode_kube_config("not base64!"), b"not base64!".to_vec());
    }

    #[tokio::test]
    async fn path_segments_are_checked() {
        let (c, t) = test_client(ScriptedTransport::new(vec![]));
        let e = get(&c, &ClusterIdentity::new("a/b", "rg1")).await.unwrap_err();
        assert_eq!(e.kind, AksErrorKind::Validation);
        assert!(t.requests().is_empty());
    }
}
