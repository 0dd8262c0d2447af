use crate::storage::metadata::CertificateIndex;
use crate::storage::{CertificateStore, TxOutcome};
use crate::utils::errors::{CertError, Result};
use std::sync::RwLock;

/// In-process certificate collection
#[derive(Debug, Default)]
pub struct MemoryStore {
    index: RwLock<CertificateIndex>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CertificateStore for MemoryStore {
    fn snapshot(&self) -> Result<CertificateIndex> {
        let index = self
            .index
            .read()
            .map_err(|_| CertError::Storage("Store lock poisoned".to_string()))?;
        Ok(index.clone())
    }

    fn transact<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut CertificateIndex) -> Result<TxOutcome<T>>,
    {
        let mut index = self
            .index
            .write()
            .map_err(|_| CertError::Storage("Store lock poisoned".to_string()))?;

        // Work on a copy so a failed body leaves the committed index untouched
        let mut working = index.clone();
        match f(&mut working)? {
            TxOutcome::Commit(value) => {
                *index = working;
                Ok(value)
            }
            TxOutcome::Skip(value) => Ok(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::test_support::sample_record;

    #[test]
    fn test_error_rolls_back() {
        let store = MemoryStore::new();
        let result: Result<()> = store.transact(|index| {
            index.insert(sample_record())?;
            Err(CertError::Storage("disk full".to_string()))
        });
        assert!(result.is_err());
        assert!(store.snapshot().unwrap().is_empty());
    }

    #[test]
    fn test_skip_discards_changes() {
        let store = MemoryStore::new();
        store
            .transact(|index| {
                index.insert(sample_record())?;
                Ok(TxOutcome::Skip(()))
            })
            .unwrap();
        assert!(store.snapshot().unwrap().is_empty());
    }
}
