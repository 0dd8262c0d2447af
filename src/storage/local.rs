use crate::storage::metadata::CertificateIndex;
use crate::storage::{CertificateStore, TxOutcome};
use crate::utils::errors::{CertError, Result};
use crate::utils::paths::CertAnchorPaths;
use fs4::fs_std::FileExt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Certificate collection kept in a single JSON file.
///
/// Writers from any process are serialized by an exclusive advisory lock on
/// a sibling `.lock` file. Every commit rewrites the whole file through a
/// uniquely named temp file and an atomic rename, so readers see either the
/// previous or the next collection and never need the lock.
pub struct LocalStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl LocalStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                CertAnchorPaths::ensure_dir_exists(parent)?;
            }
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "certificates.json".to_string());
        let lock_path = path.with_file_name(format!(".{file_name}.lock"));

        tracing::debug!("Opened certificate store at {}", path.display());
        Ok(Self { path, lock_path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    /// Block until this handle holds the store's writer lock.
    ///
    /// The lock is released when the returned file is dropped.
    fn lock(&self) -> Result<fs::File> {
        let file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        FileExt::lock_exclusive(&file).map_err(|e| {
            CertError::Storage(format!(
                "Cannot lock certificate store {}: {e}",
                self.lock_path.display()
            ))
        })?;
        tracing::trace!("Acquired store lock {}", self.lock_path.display());
        Ok(file)
    }

    /// Read the committed index from disk
    fn load(&self) -> Result<CertificateIndex> {
        if !self.path.exists() {
            return Ok(CertificateIndex::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let index: CertificateIndex = serde_json::from_str(&content).map_err(|e| {
            CertError::Storage(format!(
                "Corrupted certificate store {}: {e}",
                self.path.display()
            ))
        })?;
        tracing::debug!(
            "Loaded {} certificates from {}",
            index.len(),
            self.path.display()
        );
        Ok(index)
    }

    /// Replace the store file with `index`
    fn persist(&self, index: &CertificateIndex) -> Result<()> {
        let content = serde_json::to_vec_pretty(index)
            .map_err(|e| CertError::Storage(format!("Store serialization error: {e}")))?;

        // Created with 0600 permissions; removed on drop if never persisted
        let mut tmp = NamedTempFile::new_in(self.parent_dir())?;
        tmp.write_all(&content)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| CertError::Io(e.error))?;

        tracing::debug!(
            "Saved {} certificates to {}",
            index.len(),
            self.path.display()
        );
        Ok(())
    }
}

impl CertificateStore for LocalStore {
    fn snapshot(&self) -> Result<CertificateIndex> {
        self.load()
    }

    fn transact<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut CertificateIndex) -> Result<TxOutcome<T>>,
    {
        let _lock = self.lock()?;

        let mut index = self.load()?;
        match f(&mut index)? {
            TxOutcome::Commit(value) => {
                self.persist(&index)?;
                Ok(value)
            }
            TxOutcome::Skip(value) => Ok(value),
        }
    }
}
