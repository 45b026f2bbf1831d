use std::path::{Path, PathBuf};

use async_trait::async_trait;
use space_core::{error::StoreError, store::DeviceSpecStore};
use space_model::cdi::CdiSpec;
use tokio::fs;
use tracing::{debug, instrument};

use crate::{
    CdiError,
    fsutil::{check_key, ensure_dir, is_missing, write_atomic},
};

const SPEC_EXTENSION: &str = "json";

/// Directory of CDI spec files scanned by the container runtime.
///
/// Each spec lives in `<root>/<name>.json`.
#[derive(Debug, Clone)]
pub struct SpecDir {
    root: PathBuf,
}

impl SpecDir {
    /// Open `root`, creating it when missing.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, CdiError> {
        let root = root.into();
        ensure_dir(&root).await?;
        debug!(root = %root.display(), "CDI spec directory ready");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the spec stored under `name`.
    pub fn path_of(&self, name: &str) -> Result<PathBuf, CdiError> {
        check_key(name)?;
        Ok(self.root.join(format!("{name}.{SPEC_EXTENSION}")))
    }

    /// Write or overwrite a spec.
    #[instrument(level = "debug", skip(self, spec), fields(root = %self.root.display()))]
    pub async fn write(&self, spec: &CdiSpec, name: &str) -> Result<PathBuf, CdiError> {
        let path = self.path_of(name)?;
        let data = serde_json::to_vec_pretty(spec)?;
        write_atomic(&path, &data).await?;
        debug!(path = %path.display(), version = %spec.cdi_version, "CDI spec written");
        Ok(path)
    }

    /// Remove a spec. Returns `false` when there was nothing to remove.
    #[instrument(level = "debug", skip(self), fields(root = %self.root.display()))]
    pub async fn remove(&self, name: &str) -> Result<bool, CdiError> {
        let path = self.path_of(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "CDI spec removed");
                Ok(true)
            }
            Err(e) if is_missing(&e) => {
                debug!(path = %path.display(), "CDI spec already absent");
                Ok(false)
            }
            Err(e) => Err(CdiError::Io { path, source: e }),
        }
    }

    /// Read back a spec, `None` when it does not exist.
    pub async fn read(&self, name: &str) -> Result<Option<CdiSpec>, CdiError> {
        let path = self.path_of(name)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(e) if is_missing(&e) => Ok(None),
            Err(e) => Err(CdiError::Io { path, source: e }),
        }
    }

    /// Names of the specs in the directory, sorted.
    pub async fn list(&self) -> Result<Vec<String>, CdiError> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(CdiError::io(&self.root))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(CdiError::io(&self.root))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SPEC_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if check_key(stem).is_ok() {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl DeviceSpecStore for SpecDir {
    async fn write_spec(&self, spec: &CdiSpec, name: &str) -> Result<(), StoreError> {
        self.write(spec, name).await?;
        Ok(())
    }

    async fn remove_spec(&self, name: &str) -> Result<(), StoreError> {
        self.remove(name).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use space_model::{
        Env,
        cdi::{CdiDevice, ContainerEdits},
    };

    use super::*;

    fn spec(device: &str) -> CdiSpec {
        let edits = ContainerEdits::with_env(&Env::single("A", "1"));
        CdiSpec::new("vendor.example.com/space", vec![CdiDevice::new(device, edits)])
    }

    #[tokio::test]
    async fn open_creates_the_root() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("etc/cdi");

        let dir = SpecDir::open(&root).await.unwrap();
        assert!(root.is_dir());
        assert_eq!(dir.root(), root.as_path());
    }

    #[tokio::test]
    async fn specs_are_json_files_named_after_the_spec() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = SpecDir::open(tmp.path()).await.unwrap();

        let path = dir.write(&spec("space-1"), "vendor-space_c-1").await.unwrap();
        assert_eq!(path, tmp.path().join("vendor-space_c-1.json"));

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["cdiVersion"], "0.3.0");
        assert_eq!(raw["kind"], "vendor.example.com/space");
        assert_eq!(raw["devices"][0]["containerEdits"]["env"][0], "A=1");
    }

    #[tokio::test]
    async fn overwrite_and_remove_are_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = SpecDir::open(tmp.path()).await.unwrap();

        dir.write(&spec("one"), "s").await.unwrap();
        dir.write(&spec("two"), "s").await.unwrap();
        let back = dir.read("s").await.unwrap().unwrap();
        assert!(back.device("two").is_some());

        assert!(dir.remove("s").await.unwrap());
        assert!(!dir.remove("s").await.unwrap());
        assert!(dir.read("s").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_skips_foreign_and_temp_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = SpecDir::open(tmp.path()).await.unwrap();
        dir.write(&spec("a"), "b-spec").await.unwrap();
        dir.write(&spec("a"), "a-spec").await.unwrap();
        std::fs::write(tmp.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(tmp.path().join(".a-spec.json.tmp"), b"x").unwrap();

        assert_eq!(dir.list().await.unwrap(), vec!["a-spec", "b-spec"]);
    }

    #[tokio::test]
    async fn names_cannot_escape_the_root() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = SpecDir::open(tmp.path()).await.unwrap();

        let err = dir.write(&spec("a"), "../evil").await.unwrap_err();
        assert!(matches!(err, CdiError::InvalidKey { .. }));
        let err: StoreError = dir.remove_spec("").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey { .. }));
    }
}
