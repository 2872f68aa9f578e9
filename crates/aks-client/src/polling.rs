//! Polling engine.
//!
//! Creation and deletion are asynchronous on the provider side: the PUT or
//! DELETE only starts the operation. The engine re-reads the cluster at a
//! fixed interval until the provisioning state is terminal.
//!
//! Each read is classified by [`transition`] into a [`PollState`]. The
//! loop never holds a lock across the sleep, and every wait is raced
//! against the caller's [`CancellationToken`].

use log::{error, info, warn};
use tokio_util::sync::CancellationToken;

use crate::config::PollSettings;
use crate::error::{AksError, AksResult};
use crate::manager::ClusterManager;
use crate::normalize::{STATUS_CREATED, STATUS_NOT_FOUND, STATUS_OK};
use crate::types::{
    ClusterCreateSpec, ClusterIdentity, ClusterResponse, ClusterSnapshot, ProvisioningState,
};

/// Engine state after one read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// Not terminal yet; carries the stage the provider reported.
    Polling(ProvisioningState),
    Succeeded(ClusterSnapshot),
    Failed,
    Error(AksError),
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Polling(_))
    }
}

/// Classify one `get` result while waiting for a create or update.
pub fn transition(read: AksResult<ClusterResponse>) -> PollState {
    let resp = match read {
        Ok(r) => r,
        Err(e) => return PollState::Error(e),
    };
    if resp.status_code != STATUS_OK {
        let message = resp.error_message.unwrap_or_default();
        return PollState::Error(AksError::provider(resp.status_code, message));
    }
    match resp.value.provisioning_state {
        ProvisioningState::Succeeded => PollState::Succeeded(resp.value),
        ProvisioningState::Failed => PollState::Failed,
        stage @ ProvisioningState::InProgress(_) => PollState::Polling(stage),
    }
}

/// Classify one `get` result while waiting for a delete. Only 404 ends the
/// wait; a 200 read is still present whatever stage it reports, including a
/// stale `Failed` left over from the last create.
pub fn deletion_transition(read: AksResult<ClusterResponse>) -> PollState {
    match read {
        Ok(resp) if resp.status_code == STATUS_NOT_FOUND => PollState::Succeeded(resp.value),
        Ok(resp) if resp.status_code == STATUS_OK => {
            PollState::Polling(resp.value.provisioning_state)
        }
        other => transition(other),
    }
}

/// Wait until the cluster reaches a terminal provisioning state.
///
/// On `Succeeded` the final snapshot is returned with status 201, marking
/// the operation as created even though the last call was a GET.
pub async fn poll_cluster<M>(
    manager: &M,
    identity: &ClusterIdentity,
    settings: PollSettings,
    cancel: &CancellationToken,
) -> AksResult<ClusterResponse>
where
    M: ClusterManager + ?Sized,
{
    let value =
        with_deadline(settings, run(manager, identity, settings, cancel, transition)).await?;
    info!("cluster {} is ready", identity);
    Ok(ClusterResponse::new(STATUS_CREATED, value))
}

/// `create_or_update` followed by [`poll_cluster`].
pub async fn create_and_wait<M>(
    manager: &M,
    spec: &ClusterCreateSpec,
    settings: PollSettings,
    cancel: &CancellationToken,
) -> AksResult<ClusterResponse>
where
    M: ClusterManager + ?Sized,
{
    let created = manager.create_or_update(spec).await?;
    info!(
        "create_or_update({}) accepted with {}, waiting for provisioning",
        spec.identity(),
        created.status_code
    );
    poll_cluster(manager, &spec.identity(), settings, cancel).await
}

/// `delete`, then re-read until the provider answers 404. Returns the
/// status of the initial DELETE.
pub async fn delete_and_wait<M>(
    manager: &M,
    identity: &ClusterIdentity,
    settings: PollSettings,
    cancel: &CancellationToken,
) -> AksResult<u16>
where
    M: ClusterManager + ?Sized,
{
    let status = manager.delete(identity).await?;
    with_deadline(settings, run(manager, identity, settings, cancel, deletion_transition)).await?;
    info!("cluster {} is deleted", identity);
    Ok(status)
}

async fn with_deadline<F>(settings: PollSettings, fut: F) -> AksResult<ClusterSnapshot>
where
    F: std::future::Future<Output = AksResult<ClusterSnapshot>>,
{
    match settings.timeout {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(res) => res,
            Err(_) => {
                warn!("polling gave up after {:?}", limit);
                Err(AksError::timeout(limit.as_secs()))
            }
        },
        None => fut.await,
    }
}

async fn run<M>(
    manager: &M,
    identity: &ClusterIdentity,
    settings: PollSettings,
    cancel: &CancellationToken,
    decide: fn(AksResult<ClusterResponse>) -> PollState,
) -> AksResult<ClusterSnapshot>
where
    M: ClusterManager + ?Sized,
{
    let mut polls: u32 = 0;
    loop {
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AksError::cancelled()),
            r = manager.get(identity) => r,
        };
        polls += 1;

        match decide(read) {
            PollState::Succeeded(value) => return Ok(value),
            PollState::Failed => {
                error!("cluster {} provisioning failed after {} polls", identity, polls);
                return Err(AksError::provisioning_failed());
            }
            PollState::Error(e) => {
                warn!("polling {} stopped: {}", identity, e);
                return Err(e);
            }
            PollState::Polling(stage) => {
                info!("Waiting for cluster ready... {} ({})", identity, stage);
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AksError::cancelled()),
            _ = tokio::time::sleep(settings.interval) => {}
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
