use std::path::{Path, PathBuf};

use async_trait::async_trait;
use space_core::{
    error::StoreError,
    store::{ArtifactStore, ClaimArtifacts},
};
use space_model::{CREDENTIAL_FILE_NAME, ClaimUid};
use tokio::fs;
use tracing::debug;

use crate::{
    CdiError,
    fsutil::{check_key, ensure_dir, is_missing, write_atomic},
};

/// Per-claim artifact directories under a common root: `<root>/<claim uid>/`.
#[derive(Debug, Clone)]
pub struct ClaimArtifactDir {
    root: PathBuf,
}

impl ClaimArtifactDir {
    /// Open `root`, creating it when missing.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, CdiError> {
        let root = root.into();
        ensure_dir(&root).await?;
        debug!(root = %root.display(), "claim artifact directory ready");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn paths(&self, claim: &ClaimUid) -> Result<ClaimArtifacts, CdiError> {
        check_key(claim.as_str())?;
        let dir = self.root.join(claim.as_str());
        Ok(ClaimArtifacts {
            credential: dir.join(CREDENTIAL_FILE_NAME),
            dir,
        })
    }
}

#[async_trait]
impl ArtifactStore for ClaimArtifactDir {
    fn locate(&self, claim: &ClaimUid) -> Result<ClaimArtifacts, StoreError> {
        Ok(self.paths(claim)?)
    }

    async fn create(
        &self,
        claim: &ClaimUid,
        credential: &[u8],
    ) -> Result<ClaimArtifacts, StoreError> {
        let artifacts = self.paths(claim)?;
        ensure_dir(&artifacts.dir).await?;
        write_atomic(&artifacts.credential, credential).await?;
        debug!(dir = %artifacts.dir.display(), "claim artifacts created");
        Ok(artifacts)
    }

    async fn remove(&self, claim: &ClaimUid) -> Result<(), StoreError> {
        let artifacts = self.paths(claim)?;
        match fs::remove_dir_all(&artifacts.dir).await {
            Ok(()) => debug!(dir = %artifacts.dir.display(), "claim artifacts removed"),
            Err(e) if is_missing(&e) => {
                debug!(dir = %artifacts.dir.display(), "claim artifacts already absent")
            }
            Err(e) => {
                return Err(CdiError::Io {
                    path: artifacts.dir,
                    source: e,
                }
                .into());
            }
        }
        Ok(())
    }
}
