//! Interfaces of the external systems of record.
//!
//! Coordinators never cache what these stores hold: every operation re-reads
//! current state first, which is what makes repeated calls safe.
use std::path::PathBuf;

use async_trait::async_trait;
use space_model::{ClaimUid, Labels, SpaceClaimParametersSpec, cdi::CdiSpec};

use crate::error::StoreError;

/// Backing resource provisioned for a claim (a namespace).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackingResource {
    pub name: String,
    pub labels: Labels,
}

/// Create/list/delete of backing namespaces.
#[async_trait]
pub trait BackingStore: Send + Sync + 'static {
    /// All resources whose labels contain every entry of `selector`.
    async fn list(&self, selector: &Labels) -> Result<Vec<BackingResource>, StoreError>;

    /// Create a resource whose name is `generate_name` plus a server-chosen suffix.
    async fn create(&self, generate_name: &str, labels: &Labels)
    -> Result<BackingResource, StoreError>;

    /// Delete a resource by name.
    async fn delete(&self, name: &str) -> Result<(), StoreError>;
}

/// Typed fetch of claim parameter objects.
#[async_trait]
pub trait ParametersSource: Send + Sync + 'static {
    /// Returns [`StoreError::NotFound`] when the object does not exist.
    async fn space_claim_parameters(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<SpaceClaimParametersSpec, StoreError>;
}

/// Write/remove of CDI spec documents, keyed by spec name.
#[async_trait]
pub trait DeviceSpecStore: Send + Sync + 'static {
    /// Write or overwrite the spec stored under `name`.
    async fn write_spec(&self, spec: &CdiSpec, name: &str) -> Result<(), StoreError>;

    /// Remove the spec stored under `name`. Removing a missing spec succeeds.
    async fn remove_spec(&self, name: &str) -> Result<(), StoreError>;
}

/// Host paths of a claim's artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimArtifacts {
    /// Directory bind-mounted into the workload.
    pub dir: PathBuf,
    /// Credential file inside `dir`.
    pub credential: PathBuf,
}

/// Per-claim artifact directories on the node.
///
/// The directory is derived from the claim uid alone, so creation and removal
/// always address the same path.
#[async_trait]
pub trait ArtifactStore: Send + Sync + 'static {
    /// Paths used for `claim`, without touching the filesystem.
    fn locate(&self, claim: &ClaimUid) -> Result<ClaimArtifacts, StoreError>;

    /// Create the directory and (over)write the credential file.
    async fn create(&self, claim: &ClaimUid, credential: &[u8])
    -> Result<ClaimArtifacts, StoreError>;

    /// Remove the directory tree. Removing a missing directory succeeds.
    async fn remove(&self, claim: &ClaimUid) -> Result<(), StoreError>;
}
