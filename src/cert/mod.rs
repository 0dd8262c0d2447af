pub mod canonical;
pub mod certificate_id;
pub mod hash;
pub mod issue;
pub mod listing;
pub mod metadata;
pub mod record;
pub mod revoke;
pub mod service;
pub mod stats;
pub mod verify;

#[cfg(test)]
pub(crate) mod test_support;

pub use certificate_id::{CertificateId, CertificateIdParseError};
pub use hash::ContentHash;
pub use issue::{CertificatePayload, NewCertificate};
pub use listing::{CertificateListingService, ListingFilter};
pub use metadata::CertificateColumn;
pub use record::{CertStatus, CertificateRecord, PublicCertificate};
pub use revoke::DEFAULT_REVOCATION_REASON;
pub use service::CertificateService;
pub use stats::StatsSummary;
pub use verify::{VerificationFailure, VerificationResult};
