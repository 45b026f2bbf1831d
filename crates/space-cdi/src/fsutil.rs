use std::{
    io,
    path::{Path, PathBuf},
};

use tokio::fs;
use tracing::trace;

use crate::CdiError;

/// Check that `key` is usable as a single path component.
pub(crate) fn check_key(key: &str) -> Result<(), CdiError> {
    let invalid = |reason| {
        Err(CdiError::InvalidKey {
            key: key.to_string(),
            reason,
        })
    };
    if key.is_empty() {
        return invalid("must not be empty");
    }
    if key == "." || key == ".." {
        return invalid("must not be a relative path component");
    }
    if key.starts_with('.') {
        return invalid("must not start with '.'");
    }
    if key.contains(['/', '\\', '\0']) {
        return invalid("must not contain path separators");
    }
    Ok(())
}

/// Create `path` (and parents) and make sure it is a directory.
pub(crate) async fn ensure_dir(path: &Path) -> Result<(), CdiError> {
    fs::create_dir_all(path).await.map_err(CdiError::io(path))?;
    let meta = fs::metadata(path).await.map_err(CdiError::io(path))?;
    if !meta.is_dir() {
        return Err(CdiError::InvalidRoot {
            path: path.to_path_buf(),
            reason: "not a directory",
        });
    }
    Ok(())
}

/// Replace `path` with `data` through a hidden temp file in the same directory.
///
/// Readers see either the old content or the new one, never a partial file.
pub(crate) async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), CdiError> {
    let tmp = temp_path(path);
    fs::write(&tmp, data).await.map_err(CdiError::io(&tmp))?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(CdiError::Io {
            path: path.to_path_buf(),
            source: e,
        });
    }
    trace!(path = %path.display(), bytes = data.len(), "file replaced");
    Ok(())
}

/// Whether an error only says the target is already gone.
pub(crate) fn is_missing(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::NotFound
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_single_components() {
        assert!(check_key("c-123").is_ok());
        assert!(check_key("k8s.space.resource.example.com-space_claim-c-1").is_ok());
        for bad in ["", ".", "..", ".hidden", "a/b", "a\\b"] {
            assert!(check_key(bad).is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn temp_files_are_hidden_siblings() {
        assert_eq!(
            temp_path(Path::new("/etc/cdi/spec.json")),
            PathBuf::from("/etc/cdi/.spec.json.tmp")
        );
    }

    #[tokio::test]
    async fn atomic_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.json");

        write_atomic(&path, b"one").await.unwrap();
        write_atomic(&path, b"two").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"two");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn ensure_dir_rejects_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, b"x").unwrap();

        assert!(ensure_dir(&dir.path().join("a/b")).await.is_ok());
        assert!(ensure_dir(&file).await.is_err());
    }
}
