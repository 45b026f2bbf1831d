//! Node-side provisioning coordinator.
//!
//! [`SpaceNodeAgent`] materializes an allocated space on the node: a claim
//! directory holding a credential, and a CDI spec exposing the namespace
//! handle to the container runtime. Both halves are written and removed under
//! the claim lock and tolerate being repeated after a partial failure.
pub mod edits;

use std::{collections::HashMap, sync::Arc, time::Instant};

use futures_util::future::join_all;
use space_model::{
    ClaimUid, NodeClaim,
    cdi::{validate_claim_name, validate_device_name},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::{
    cancel::or_cancel,
    error::AgentError,
    lock::ClaimLocks,
    metrics::{MetricsHandle, Operation, noop_metrics, observe},
    store::{ArtifactStore, DeviceSpecStore},
};

/// Coordinator for the node plugin entry points.
#[derive(Clone)]
pub struct SpaceNodeAgent {
    locks: ClaimLocks,
    specs: Arc<dyn DeviceSpecStore>,
    artifacts: Arc<dyn ArtifactStore>,
    cluster_endpoint: String,
    metrics: MetricsHandle,
}

impl SpaceNodeAgent {
    /// `cluster_endpoint` is the API server address handed to workloads.
    pub fn new(
        specs: Arc<dyn DeviceSpecStore>,
        artifacts: Arc<dyn ArtifactStore>,
        cluster_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            locks: ClaimLocks::new(),
            specs,
            artifacts,
            cluster_endpoint: cluster_endpoint.into(),
            metrics: noop_metrics(),
        }
    }

    pub fn with_locks(mut self, locks: ClaimLocks) -> Self {
        self.locks = locks;
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn locks(&self) -> &ClaimLocks {
        &self.locks
    }

    /// Write the descriptor shared by all claims. Must succeed before serving.
    pub async fn write_common_spec(&self) -> Result<(), AgentError> {
        let name = edits::common_spec_name();
        self.specs
            .write_spec(&edits::common_spec(), &name)
            .await
            .map_err(AgentError::CommonSpec)?;
        info!(spec = %name, "common CDI spec written");
        Ok(())
    }

    /// Prepare every claim of a request. Each claim gets its own result.
    pub async fn prepare_resources(
        &self,
        claims: Vec<NodeClaim>,
        cancel: &CancellationToken,
    ) -> HashMap<ClaimUid, Result<Vec<String>, AgentError>> {
        let results = join_all(claims.iter().map(|c| self.prepare_claim(c, cancel))).await;

        let mut out = HashMap::with_capacity(claims.len());
        for (claim, res) in claims.into_iter().zip(results) {
            out.insert(claim.uid, res);
        }
        out
    }

    /// Unprepare every claim of a request. Each claim gets its own result.
    pub async fn unprepare_resources(
        &self,
        claims: Vec<NodeClaim>,
        cancel: &CancellationToken,
    ) -> HashMap<ClaimUid, Result<(), AgentError>> {
        let results = join_all(claims.iter().map(|c| self.unprepare_claim(&c.uid, cancel))).await;

        let mut out = HashMap::with_capacity(claims.len());
        for (claim, res) in claims.into_iter().zip(results) {
            out.insert(claim.uid, res);
        }
        out
    }

    /// Create the claim's artifacts and descriptor; returns the qualified device names.
    #[instrument(
        level = "debug",
        skip(self, claim, cancel),
        fields(claim_uid = %claim.uid, claim = %claim.name, handle = %claim.resource_handle)
    )]
    pub async fn prepare_claim(
        &self,
        claim: &NodeClaim,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, AgentError> {
        let uid = &claim.uid;
        let handle = claim.resource_handle.as_str();
        self.metrics.record_started(Operation::Prepare);
        let started = Instant::now();

        let res = or_cancel(cancel, async {
            let _guard = self.locks.acquire(uid).await;

            validate_device_name(handle).map_err(|source| AgentError::InvalidHandle {
                claim: uid.clone(),
                source,
            })?;
            validate_claim_name(&claim.name).map_err(|source| AgentError::InvalidName {
                claim: uid.clone(),
                source,
            })?;

            let payload = edits::credential(&self.cluster_endpoint, handle);
            let artifacts = self
                .artifacts
                .create(uid, payload.as_bytes())
                .await
                .map_err(|source| AgentError::CreateArtifacts {
                    claim: uid.clone(),
                    source,
                })?;
            debug!(dir = %artifacts.dir.display(), "claim artifacts written");

            let spec = edits::claim_spec(&claim.name, handle, &self.cluster_endpoint, &artifacts.dir);
            let spec_name = edits::claim_spec_name(uid);
            self.specs
                .write_spec(&spec, &spec_name)
                .await
                .map_err(|source| AgentError::WriteSpec {
                    claim: uid.clone(),
                    spec: spec_name.clone(),
                    source,
                })?;

            info!(spec = %spec_name, "claim prepared");
            Ok(edits::claim_devices(handle))
        })
        .await
        .unwrap_or_else(|| Err(AgentError::Canceled { claim: uid.clone() }));

        self.finish(Operation::Prepare, started, &res);
        res
    }

    /// Remove the claim's artifacts and descriptor. Missing pieces are not errors.
    #[instrument(level = "debug", skip(self, cancel), fields(claim_uid = %uid))]
    pub async fn unprepare_claim(
        &self,
        uid: &ClaimUid,
        cancel: &CancellationToken,
    ) -> Result<(), AgentError> {
        self.metrics.record_started(Operation::Unprepare);
        let started = Instant::now();

        let res = or_cancel(cancel, async {
            let _guard = self.locks.acquire(uid).await;

            self.artifacts
                .remove(uid)
                .await
                .map_err(|source| AgentError::RemoveArtifacts {
                    claim: uid.clone(),
                    source,
                })?;

            let spec_name = edits::claim_spec_name(uid);
            self.specs
                .remove_spec(&spec_name)
                .await
                .map_err(|source| AgentError::RemoveSpec {
                    claim: uid.clone(),
                    spec: spec_name.clone(),
                    source,
                })?;

            info!(spec = %spec_name, "claim unprepared");
            Ok(())
        })
        .await
        .unwrap_or_else(|| Err(AgentError::Canceled { claim: uid.clone() }));

        self.finish(Operation::Unprepare, started, &res);
        res
    }

    fn finish<T>(&self, op: Operation, started: Instant, res: &Result<T, AgentError>) {
        let failure = res.as_ref().err().map(|e| {
            warn!(error = %e, "claim operation failed");
            (e.kind(), matches!(e, AgentError::Canceled { .. }))
        });
        observe(&self.metrics, op, started, failure);
    }
}
