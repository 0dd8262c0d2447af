pub mod cert;
pub mod cli;
pub mod config;
pub mod storage;
pub mod utils;

// Re-export specific items to avoid conflicts
pub use cert::{
    CertStatus, CertificateId, CertificatePayload, CertificateRecord, CertificateService,
    ContentHash, StatsSummary, VerificationFailure, VerificationResult,
};
pub use config::Config;
pub use storage::{CertificateStore, LocalStore, MemoryStore};
pub use utils::{errors, paths};
