pub mod local;
pub mod memory;
pub mod metadata;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use metadata::{Allocation, CertificateIndex, UnreadableRecord};

use crate::utils::errors::Result;

/// Result of a store transaction body: persist the modified index or leave storage untouched
#[derive(Debug)]
pub enum TxOutcome<T> {
    Commit(T),
    Skip(T),
}

/// Durable certificate collection with a single serialized writer.
///
/// `transact` runs its body against the latest committed index with no other
/// writer in flight. An `Err` from the body, or `Skip`, writes nothing.
/// `snapshot` never observes a partially written collection.
pub trait CertificateStore: Send + Sync {
    fn snapshot(&self) -> Result<CertificateIndex>;

    fn transact<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut CertificateIndex) -> Result<TxOutcome<T>>;
}
