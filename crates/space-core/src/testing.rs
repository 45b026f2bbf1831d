//! In-memory stores used by tests in this workspace.
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use space_model::{
    ClaimUid, Labels, RESOURCE_CLAIM_LABEL, SpaceClaimParametersSpec, cdi::CdiSpec,
};
use tokio::sync::Barrier;

use crate::{
    error::StoreError,
    metrics::{MetricsBackend, Operation, Outcome},
    store::{
        ArtifactStore, BackingResource, BackingStore, ClaimArtifacts, DeviceSpecStore,
        ParametersSource,
    },
};

fn locked<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Store call to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    List,
    Create,
    Delete,
}

/// Entry of a store call log.
///
/// Namespace and artifact calls are tagged with the claim uid, spec calls with
/// the spec name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Start(&'static str, String),
    End(&'static str, String),
}

/// Ordered call log that several stores can share.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<StoreCall>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        locked(&self.0).clone()
    }

    fn push(&self, call: StoreCall) {
        locked(&self.0).push(call);
    }
}

async fn sleep_for(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

#[derive(Default)]
struct NamespaceState {
    items: Vec<BackingResource>,
    seq: u64,
    fail: Option<FailOn>,
    log: Vec<StoreCall>,
}

/// Namespace store keeping everything in memory.
///
/// Names are `generate_name` followed by a 5 digit hex counter.
#[derive(Default)]
pub struct MemoryNamespaces {
    state: Mutex<NamespaceState>,
    delay: Option<Duration>,
    gate: Option<Arc<Barrier>>,
}

impl MemoryNamespaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep inside every call, widening race windows.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make every `list` call wait on `barrier`.
    pub fn with_list_gate(mut self, barrier: Arc<Barrier>) -> Self {
        self.gate = Some(barrier);
        self
    }

    pub fn fail_on(&self, op: FailOn) {
        locked(&self.state).fail = Some(op);
    }

    pub fn clear_failure(&self) {
        locked(&self.state).fail = None;
    }

    /// Insert a namespace labeled for `uid`, bypassing the create path.
    pub fn seed(&self, name: &str, uid: &ClaimUid) {
        locked(&self.state).items.push(BackingResource {
            name: name.to_string(),
            labels: Labels::for_claim(uid),
        });
    }

    pub fn names_for(&self, uid: &ClaimUid) -> Vec<String> {
        let selector = Labels::for_claim(uid);
        locked(&self.state)
            .items
            .iter()
            .filter(|r| r.labels.matches(&selector))
            .map(|r| r.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        locked(&self.state).items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        locked(&self.state).log.clone()
    }

    /// Number of successful `create` calls.
    pub fn created(&self) -> usize {
        locked(&self.state)
            .log
            .iter()
            .filter(|c| matches!(c, StoreCall::End("create", _)))
            .count()
    }

    fn start(&self, op: &'static str, claim: String, fail: FailOn) -> Result<(), StoreError> {
        let mut state = locked(&self.state);
        state.log.push(StoreCall::Start(op, claim));
        if state.fail == Some(fail) {
            return Err(StoreError::Backend(format!("injected {op} failure")));
        }
        Ok(())
    }

    fn end(&self, op: &'static str, claim: String) {
        locked(&self.state).log.push(StoreCall::End(op, claim));
    }

    async fn pause(&self) {
        sleep_for(self.delay).await;
    }
}

fn claim_of(labels: &Labels) -> String {
    labels.get(RESOURCE_CLAIM_LABEL).unwrap_or_default().to_string()
}

#[async_trait]
impl BackingStore for MemoryNamespaces {
    async fn list(&self, selector: &Labels) -> Result<Vec<BackingResource>, StoreError> {
        let claim = claim_of(selector);
        self.start("list", claim.clone(), FailOn::List)?;
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
        self.pause().await;
        let found = locked(&self.state)
            .items
            .iter()
            .filter(|r| r.labels.matches(selector))
            .cloned()
            .collect();
        self.end("list", claim);
        Ok(found)
    }

    async fn create(
        &self,
        generate_name: &str,
        labels: &Labels,
    ) -> Result<BackingResource, StoreError> {
        let claim = claim_of(labels);
        self.start("create", claim.clone(), FailOn::Create)?;
        self.pause().await;
        let resource = {
            let mut state = locked(&self.state);
            state.seq += 1;
            let resource = BackingResource {
                name: format!("{generate_name}{:05x}", state.seq),
                labels: labels.clone(),
            };
            state.items.push(resource.clone());
            resource
        };
        self.end("create", claim);
        Ok(resource)
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let claim = locked(&self.state)
            .items
            .iter()
            .find(|r| r.name == name)
            .map(|r| claim_of(&r.labels))
            .unwrap_or_default();
        self.start("delete", claim.clone(), FailOn::Delete)?;
        self.pause().await;
        locked(&self.state).items.retain(|r| r.name != name);
        self.end("delete", claim);
        Ok(())
    }
}

/// Parameter objects keyed by `(namespace, name)`.
#[derive(Default)]
pub struct MemoryParameters {
    objects: Mutex<HashMap<(String, String), SpaceClaimParametersSpec>>,
    unavailable: Mutex<bool>,
}

impl MemoryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, namespace: &str, name: &str, spec: SpaceClaimParametersSpec) {
        locked(&self.objects).insert((namespace.to_string(), name.to_string()), spec);
    }

    /// Make every fetch fail with a backend error.
    pub fn set_unavailable(&self, unavailable: bool) {
        *locked(&self.unavailable) = unavailable;
    }
}

#[async_trait]
impl ParametersSource for MemoryParameters {
    async fn space_claim_parameters(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<SpaceClaimParametersSpec, StoreError> {
        if *locked(&self.unavailable) {
            return Err(StoreError::Backend("api server unavailable".into()));
        }
        locked(&self.objects)
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{namespace}/{name}")))
    }
}

/// CDI specs keyed by spec name.
#[derive(Default)]
pub struct MemorySpecs {
    specs: Mutex<BTreeMap<String, CdiSpec>>,
    failing: Mutex<HashSet<String>>,
    log: CallLog,
    delay: Option<Duration>,
}

impl MemorySpecs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep inside every write and remove.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Record calls into `log` instead of a private one.
    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.log.calls()
    }

    /// Fail every write or remove of `name`.
    pub fn fail_for(&self, name: &str) {
        locked(&self.failing).insert(name.to_string());
    }

    pub fn get(&self, name: &str) -> Option<CdiSpec> {
        locked(&self.specs).get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        locked(&self.specs).keys().cloned().collect()
    }

    fn check(&self, name: &str) -> Result<(), StoreError> {
        if locked(&self.failing).contains(name) {
            return Err(StoreError::Backend(format!("injected failure for {name}")));
        }
        Ok(())
    }
}

#[async_trait]
impl DeviceSpecStore for MemorySpecs {
    async fn write_spec(&self, spec: &CdiSpec, name: &str) -> Result<(), StoreError> {
        self.log.push(StoreCall::Start("write_spec", name.to_string()));
        self.check(name)?;
        sleep_for(self.delay).await;
        locked(&self.specs).insert(name.to_string(), spec.clone());
        self.log.push(StoreCall::End("write_spec", name.to_string()));
        Ok(())
    }

    async fn remove_spec(&self, name: &str) -> Result<(), StoreError> {
        self.log.push(StoreCall::Start("remove_spec", name.to_string()));
        self.check(name)?;
        sleep_for(self.delay).await;
        locked(&self.specs).remove(name);
        self.log.push(StoreCall::End("remove_spec", name.to_string()));
        Ok(())
    }
}

/// Claim artifacts kept in memory under a fake root.
pub struct MemoryArtifacts {
    root: PathBuf,
    files: Mutex<BTreeMap<ClaimUid, Vec<u8>>>,
    failing: Mutex<HashSet<ClaimUid>>,
    log: CallLog,
    delay: Option<Duration>,
}

impl Default for MemoryArtifacts {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/run/space-dra/claims"),
            files: Mutex::default(),
            failing: Mutex::default(),
            log: CallLog::default(),
            delay: None,
        }
    }
}

impl MemoryArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep inside every create and remove.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Record calls into `log` instead of a private one.
    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.log.calls()
    }

    pub fn fail_for(&self, uid: &ClaimUid) {
        locked(&self.failing).insert(uid.clone());
    }

    pub fn credential(&self, uid: &ClaimUid) -> Option<Vec<u8>> {
        locked(&self.files).get(uid).cloned()
    }

    pub fn claims(&self) -> Vec<ClaimUid> {
        locked(&self.files).keys().cloned().collect()
    }

    fn check(&self, uid: &ClaimUid) -> Result<(), StoreError> {
        if locked(&self.failing).contains(uid) {
            return Err(StoreError::Backend(format!("injected failure for {uid}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifacts {
    fn locate(&self, claim: &ClaimUid) -> Result<ClaimArtifacts, StoreError> {
        let dir = self.root.join(claim.as_str());
        Ok(ClaimArtifacts {
            credential: dir.join(space_model::CREDENTIAL_FILE_NAME),
            dir,
        })
    }

    async fn create(
        &self,
        claim: &ClaimUid,
        credential: &[u8],
    ) -> Result<ClaimArtifacts, StoreError> {
        self.log.push(StoreCall::Start("create", claim.to_string()));
        self.check(claim)?;
        sleep_for(self.delay).await;
        locked(&self.files).insert(claim.clone(), credential.to_vec());
        self.log.push(StoreCall::End("create", claim.to_string()));
        self.locate(claim)
    }

    async fn remove(&self, claim: &ClaimUid) -> Result<(), StoreError> {
        self.log.push(StoreCall::Start("remove", claim.to_string()));
        self.check(claim)?;
        sleep_for(self.delay).await;
        locked(&self.files).remove(claim);
        self.log.push(StoreCall::End("remove", claim.to_string()));
        Ok(())
    }
}

/// Metrics event seen by [`RecordingMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricEvent {
    Started(Operation),
    Completed(Operation, Outcome),
    Error(Operation, String),
}

/// Metrics backend that keeps every event in order.
#[derive(Default)]
pub struct RecordingMetrics {
    events: Mutex<Vec<MetricEvent>>,
}

impl RecordingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MetricEvent> {
        locked(&self.events).clone()
    }
}

impl MetricsBackend for RecordingMetrics {
    fn record_started(&self, op: Operation) {
        locked(&self.events).push(MetricEvent::Started(op));
    }

    fn record_completed(&self, op: Operation, outcome: Outcome, _: u64) {
        locked(&self.events).push(MetricEvent::Completed(op, outcome));
    }

    fn record_error(&self, op: Operation, error_kind: &str) {
        locked(&self.events).push(MetricEvent::Error(op, error_kind.to_string()));
    }
}
