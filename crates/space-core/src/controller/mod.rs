//! Cluster-side allocation coordinator.
//!
//! [`SpaceController`] turns resource claims into labeled backing namespaces.
//! Every call re-reads the namespace store, so allocation and deallocation can
//! be repeated by the reconciliation loop without side effects.
mod params;

use std::{collections::HashMap, sync::Arc, time::Instant};

use futures_util::future::join_all;
use space_model::{
    AllocationResult, ClaimAllocation, ClaimUid, Labels, NodeName, PodRef, ResourceClaim,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::{
    cancel::or_cancel,
    error::{ControllerError, StoreError},
    lock::ClaimLocks,
    metrics::{MetricsHandle, Operation, noop_metrics, observe},
    store::{BackingResource, BackingStore, ParametersSource},
};

/// Coordinator for the controller entry points.
#[derive(Clone)]
pub struct SpaceController {
    locks: ClaimLocks,
    namespaces: Arc<dyn BackingStore>,
    parameters: Arc<dyn ParametersSource>,
    metrics: MetricsHandle,
}

#[derive(Clone, Copy)]
enum Phase {
    Allocate,
    Deallocate,
}

impl Phase {
    fn wrap(self, claim: &ClaimUid, step: &'static str, source: StoreError) -> ControllerError {
        let claim = claim.clone();
        match self {
            Phase::Allocate => ControllerError::Provisioning {
                claim,
                step,
                source,
            },
            Phase::Deallocate => ControllerError::Teardown {
                claim,
                step,
                source,
            },
        }
    }
}

impl SpaceController {
    pub fn new(namespaces: Arc<dyn BackingStore>, parameters: Arc<dyn ParametersSource>) -> Self {
        Self {
            locks: ClaimLocks::new(),
            namespaces,
            parameters,
            metrics: noop_metrics(),
        }
    }

    /// Use an existing lock registry instead of a private one.
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

    /// Allocate every claim of a batch for `selected_node`.
    ///
    /// Claims are processed concurrently and each gets its own result slot.
    pub async fn allocate(
        &self,
        batch: Vec<ClaimAllocation>,
        selected_node: Option<&str>,
        cancel: &CancellationToken,
    ) -> HashMap<ClaimUid, Result<AllocationResult, ControllerError>> {
        let results = join_all(
            batch
                .iter()
                .map(|ca| self.allocate_claim(ca, selected_node, cancel)),
        )
        .await;

        let mut out = HashMap::with_capacity(batch.len());
        for (ca, res) in batch.into_iter().zip(results) {
            out.insert(ca.claim.uid, res);
        }
        out
    }

    /// Allocate a single claim. Returns the same handle on every repeated call.
    #[instrument(
        level = "debug",
        skip(self, ca, cancel),
        fields(claim_uid = %ca.claim.uid, claim = %ca.claim.name, namespace = %ca.claim.namespace)
    )]
    pub async fn allocate_claim(
        &self,
        ca: &ClaimAllocation,
        selected_node: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<AllocationResult, ControllerError> {
        let uid = &ca.claim.uid;
        self.metrics.record_started(Operation::Allocate);
        let started = Instant::now();

        let Some(node) = selected_node.filter(|n| !n.is_empty()) else {
            let res = Err(ControllerError::ImmediateAllocationUnsupported { claim: uid.clone() });
            self.finish(Operation::Allocate, started, &res);
            return res;
        };

        let res = or_cancel(cancel, async {
            let _guard = self.locks.acquire(uid).await;
            debug!(%node, "allocating claim");

            let handle = match self.lookup(uid, Phase::Allocate).await? {
                Some(existing) => {
                    info!(space = %existing.name, "found an existing namespace for a claim");
                    existing.name
                }
                None => {
                    let created = self
                        .namespaces
                        .create(ca.claim_parameters.generate_name(), &Labels::for_claim(uid))
                        .await
                        .map_err(|e| Phase::Allocate.wrap(uid, "create namespace", e))?;
                    info!(space = %created.name, "created namespace");
                    created.name
                }
            };
            Ok(AllocationResult::for_space(handle))
        })
        .await
        .unwrap_or_else(|| Err(ControllerError::Canceled { claim: uid.clone() }));

        self.finish(Operation::Allocate, started, &res);
        res
    }

    /// Delete the claim's backing namespace. Deallocating twice is not an error.
    #[instrument(
        level = "debug",
        skip(self, claim, cancel),
        fields(claim_uid = %claim.uid, claim = %claim.name, namespace = %claim.namespace)
    )]
    pub async fn deallocate(
        &self,
        claim: &ResourceClaim,
        cancel: &CancellationToken,
    ) -> Result<(), ControllerError> {
        let uid = &claim.uid;
        self.metrics.record_started(Operation::Deallocate);
        let started = Instant::now();

        let res = or_cancel(cancel, async {
            let _guard = self.locks.acquire(uid).await;

            let Some(existing) = self.lookup(uid, Phase::Deallocate).await? else {
                debug!("no namespace found for claim, nothing to deallocate");
                return Ok(());
            };
            self.namespaces
                .delete(&existing.name)
                .await
                .map_err(|e| Phase::Deallocate.wrap(uid, "delete namespace", e))?;
            info!(space = %existing.name, "deleted namespace");
            Ok(())
        })
        .await
        .unwrap_or_else(|| Err(ControllerError::Canceled { claim: uid.clone() }));

        self.finish(Operation::Deallocate, started, &res);
        res
    }

    /// Nodes that cannot satisfy each claim. Every node is suitable for a space.
    pub fn unsuitable_nodes(
        &self,
        pod: &PodRef,
        claims: &[ClaimAllocation],
        potential_nodes: &[NodeName],
    ) -> HashMap<ClaimUid, Vec<NodeName>> {
        debug!(
            pod = %format_args!("{}/{}", pod.namespace, pod.name),
            claims = claims.len(),
            nodes = potential_nodes.len(),
            "computing unsuitable nodes"
        );
        claims
            .iter()
            .map(|ca| (ca.claim.uid.clone(), Vec::new()))
            .collect()
    }

    /// The namespace labeled for `uid`, if any. More than one is never resolved here.
    async fn lookup(
        &self,
        uid: &ClaimUid,
        phase: Phase,
    ) -> Result<Option<BackingResource>, ControllerError> {
        let mut found = self
            .namespaces
            .list(&Labels::for_claim(uid))
            .await
            .map_err(|e| phase.wrap(uid, "list namespaces", e))?;

        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            _ => {
                let names: Vec<String> = found.into_iter().map(|r| r.name).collect();
                warn!(?names, "more than one namespace labeled for a claim");
                Err(ControllerError::ConsistencyViolation {
                    claim: uid.clone(),
                    names,
                })
            }
        }
    }

    fn finish<T>(&self, op: Operation, started: Instant, res: &Result<T, ControllerError>) {
        let failure = res.as_ref().err().map(|e| {
            if e.is_retryable() {
                debug!(error = %e, "claim operation failed");
            } else {
                warn!(error = %e, "claim operation failed");
            }
            (e.kind(), matches!(e, ControllerError::Canceled { .. }))
        });
        observe(&self.metrics, op, started, failure);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use space_model::{ClaimParameters, ResourceClass, SpaceClaimParametersSpec};
    use tokio::sync::Barrier;

    use super::*;
    use crate::{
        metrics::Outcome,
        testing::{
            FailOn, MemoryNamespaces, MemoryParameters, MetricEvent, RecordingMetrics, StoreCall,
        },
    };

    fn controller(ns: Arc<MemoryNamespaces>) -> SpaceController {
        SpaceController::new(ns, Arc::new(MemoryParameters::new()))
    }

    fn allocation(uid: &str) -> ClaimAllocation {
        ClaimAllocation::new(
            ResourceClaim::new(uid, format!("claim-{uid}"), "default"),
            ResourceClass::new("space"),
            ClaimParameters::default_space(),
        )
    }

    #[tokio::test]
    async fn allocation_is_idempotent() {
        let ns = Arc::new(MemoryNamespaces::new());
        let ctl = controller(Arc::clone(&ns));
        let cancel = CancellationToken::new();
        let ca = allocation("c-1");

        let first = ctl.allocate_claim(&ca, Some("node-a"), &cancel).await.unwrap();
        let second = ctl.allocate_claim(&ca, Some("node-a"), &cancel).await.unwrap();

        assert_eq!(first, second);
        assert!(first.shareable);
        assert!(first.handle().unwrap().starts_with("space-"));
        assert_eq!(ns.len(), 1);
        assert_eq!(ns.created(), 1);
    }

    #[tokio::test]
    async fn allocation_uses_the_naming_template() {
        let ns = Arc::new(MemoryNamespaces::new());
        let ctl = controller(Arc::clone(&ns));
        let mut ca = allocation("c-1");
        ca.claim_parameters = ClaimParameters::Space(SpaceClaimParametersSpec {
            generate_name: "team-a-".into(),
        });

        let res = ctl
            .allocate_claim(&ca, Some("node-a"), &CancellationToken::new())
            .await
            .unwrap();
        assert!(res.handle().unwrap().starts_with("team-a-"));
    }

    #[tokio::test]
    async fn immediate_allocation_is_rejected_without_side_effects() {
        let ns = Arc::new(MemoryNamespaces::new());
        let ctl = controller(Arc::clone(&ns));
        let cancel = CancellationToken::new();

        for node in [None, Some("")] {
            let err = ctl
                .allocate_claim(&allocation("c-1"), node, &cancel)
                .await
                .unwrap_err();
            assert!(matches!(err, ControllerError::ImmediateAllocationUnsupported { .. }));
            assert!(!err.is_retryable());
        }
        assert!(ns.calls().is_empty());
    }

    #[tokio::test]
    async fn immediate_allocation_is_counted_as_a_failure() {
        let ns = Arc::new(MemoryNamespaces::new());
        let metrics = Arc::new(RecordingMetrics::new());
        let ctl = controller(Arc::clone(&ns)).with_metrics(metrics.clone());

        ctl.allocate_claim(&allocation("c-1"), None, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(
            metrics.events(),
            vec![
                MetricEvent::Started(Operation::Allocate),
                MetricEvent::Error(Operation::Allocate, "immediate_allocation".into()),
                MetricEvent::Completed(Operation::Allocate, Outcome::Failure),
            ]
        );
        assert!(ns.calls().is_empty());
    }

    #[tokio::test]
    async fn deallocation_is_idempotent() {
        let ns = Arc::new(MemoryNamespaces::new());
        let ctl = controller(Arc::clone(&ns));
        let cancel = CancellationToken::new();
        let ca = allocation("c-1");

        ctl.allocate_claim(&ca, Some("node-a"), &cancel).await.unwrap();
        ctl.deallocate(&ca.claim, &cancel).await.unwrap();
        ctl.deallocate(&ca.claim, &cancel).await.unwrap();

        assert!(ns.is_empty());
        // never allocated at all
        ctl.deallocate(&ResourceClaim::new("c-2", "other", "default"), &cancel)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn duplicate_namespaces_are_reported_not_resolved() {
        let ns = Arc::new(MemoryNamespaces::new());
        let uid = ClaimUid::from("c-1");
        ns.seed("space-aaaaa", &uid);
        ns.seed("space-bbbbb", &uid);
        let ctl = controller(Arc::clone(&ns));
        let cancel = CancellationToken::new();
        let ca = allocation("c-1");

        let err = ctl.allocate_claim(&ca, Some("node-a"), &cancel).await.unwrap_err();
        assert!(
            matches!(err, ControllerError::ConsistencyViolation { ref names, .. } if names.len() == 2)
        );

        let err = ctl.deallocate(&ca.claim, &cancel).await.unwrap_err();
        assert!(matches!(err, ControllerError::ConsistencyViolation { .. }));
        assert!(!err.is_retryable());
        assert_eq!(ns.len(), 2, "neither namespace may be touched");
    }

    #[tokio::test]
    async fn store_failures_are_wrapped_per_phase() {
        let ns = Arc::new(MemoryNamespaces::new());
        let ctl = controller(Arc::clone(&ns));
        let cancel = CancellationToken::new();
        let ca = allocation("c-1");

        ns.fail_on(FailOn::Create);
        let err = ctl.allocate_claim(&ca, Some("node-a"), &cancel).await.unwrap_err();
        assert!(matches!(err, ControllerError::Provisioning { step: "create namespace", .. }));
        assert!(err.is_retryable());
        assert!(ns.is_empty());

        ns.clear_failure();
        ctl.allocate_claim(&ca, Some("node-a"), &cancel).await.unwrap();

        ns.fail_on(FailOn::Delete);
        let err = ctl.deallocate(&ca.claim, &cancel).await.unwrap_err();
        assert!(matches!(err, ControllerError::Teardown { step: "delete namespace", .. }));
        assert_eq!(ns.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_allocations_create_one_namespace() {
        let ns = Arc::new(MemoryNamespaces::new().with_delay(Duration::from_millis(5)));
        let ctl = controller(Arc::clone(&ns));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let ctl = ctl.clone();
            tasks.push(tokio::spawn(async move {
                ctl.allocate_claim(&allocation("c-1"), Some("node-a"), &CancellationToken::new())
                    .await
                    .unwrap()
            }));
        }
        let mut handles = Vec::new();
        for t in tasks {
            handles.push(t.await.unwrap().handle().unwrap().to_string());
        }

        handles.dedup();
        assert_eq!(handles.len(), 1);
        assert_eq!(ns.created(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn store_calls_for_one_claim_never_interleave() {
        let ns = Arc::new(MemoryNamespaces::new().with_delay(Duration::from_millis(2)));
        let ctl = controller(Arc::clone(&ns));
        let ca = allocation("c-1");

        let mut tasks = Vec::new();
        for i in 0..6 {
            let ctl = ctl.clone();
            let ca = ca.clone();
            tasks.push(tokio::spawn(async move {
                let cancel = CancellationToken::new();
                if i % 2 == 0 {
                    ctl.allocate_claim(&ca, Some("node-a"), &cancel).await.map(|_| ())
                } else {
                    ctl.deallocate(&ca.claim, &cancel).await
                }
            }));
        }
        for t in tasks {
            t.await.unwrap().unwrap();
        }

        let mut open = None;
        for call in ns.calls() {
            match call {
                StoreCall::Start(op, _) => {
                    assert!(open.is_none(), "{op} started while {open:?} was in flight");
                    open = Some(op);
                }
                StoreCall::End(op, _) => {
                    assert_eq!(open.take(), Some(op));
                }
            }
        }
    }

    #[tokio::test]
    async fn distinct_claims_do_not_wait_on_each_other() {
        // both lookups must be in flight at once for the barrier to open
        let gate = Arc::new(Barrier::new(2));
        let ns = Arc::new(MemoryNamespaces::new().with_list_gate(gate));
        let ctl = controller(Arc::clone(&ns));
        let cancel = CancellationToken::new();
        let (a, b) = (allocation("c-1"), allocation("c-2"));

        let both = tokio::time::timeout(Duration::from_secs(5), async {
            tokio::join!(
                ctl.allocate_claim(&a, Some("node-a"), &cancel),
                ctl.allocate_claim(&b, Some("node-a"), &cancel),
            )
        })
        .await
        .expect("allocations of distinct claims deadlocked");

        assert!(both.0.is_ok());
        assert!(both.1.is_ok());
        assert_eq!(ns.len(), 2);
    }

    #[tokio::test]
    async fn batch_failures_are_isolated() {
        let ns = Arc::new(MemoryNamespaces::new());
        let dup = ClaimUid::from("c-2");
        ns.seed("space-aaaaa", &dup);
        ns.seed("space-bbbbb", &dup);
        let ctl = controller(Arc::clone(&ns));

        let batch = vec![allocation("c-1"), allocation("c-2"), allocation("c-3")];
        let results = ctl
            .allocate(batch, Some("node-a"), &CancellationToken::new())
            .await;

        assert_eq!(results.len(), 3);
        assert!(results[&ClaimUid::from("c-1")].is_ok());
        assert!(results[&dup].is_err());
        assert!(results[&ClaimUid::from("c-3")].is_ok());
    }

    #[tokio::test]
    async fn canceled_allocation_releases_the_lock() {
        let ns = Arc::new(MemoryNamespaces::new().with_delay(Duration::from_secs(60)));
        let ctl = controller(Arc::clone(&ns));
        let cancel = CancellationToken::new();
        let ca = allocation("c-1");

        let pending = ctl.allocate_claim(&ca, Some("node-a"), &cancel);
        let trigger = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        };
        let (res, ()) = tokio::join!(pending, trigger);

        let err = res.unwrap_err();
        assert!(matches!(err, ControllerError::Canceled { .. }));
        assert!(err.is_retryable());
        assert!(ctl.locks().try_acquire(&ca.claim.uid).is_some());
    }

    #[test]
    fn every_node_is_suitable() {
        let ctl = controller(Arc::new(MemoryNamespaces::new()));
        let claims = vec![allocation("c-1"), allocation("c-2")];
        let nodes = vec!["node-a".to_string(), "node-b".to_string()];

        let out = ctl.unsuitable_nodes(&PodRef::default(), &claims, &nodes);
        assert_eq!(out.len(), 2);
        assert!(out.values().all(Vec::is_empty));
    }
}
