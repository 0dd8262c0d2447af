use crate::cert::{
    CertificateId, CertificateRecord, CertificateService, ContentHash, PublicCertificate,
};
use crate::storage::metadata::UnreadableRecord;
use crate::storage::{CertificateIndex, CertificateStore, TxOutcome};
use crate::utils::errors::Result;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Why a certificate did not verify. These are business outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationFailure {
    NotFound,
    NotActive,
    HashMismatch,
    Tampered,
}

impl VerificationFailure {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotFound => "Certificate not found",
            Self::NotActive => "Certificate is not active",
            Self::HashMismatch => "Provided hash does not match certificate hash",
            Self::Tampered => "Certificate data has been tampered with",
        }
    }
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

impl Serialize for VerificationFailure {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.reason())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<PublicCertificate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<VerificationFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_verified: Option<DateTime<Utc>>,
}

impl VerificationResult {
    fn valid(record: &CertificateRecord) -> Self {
        Self {
            valid: true,
            certificate: Some(record.public_view()),
            reason: None,
            verification_count: Some(record.verification_count),
            last_verified: record.last_verified,
        }
    }

    fn invalid(failure: VerificationFailure) -> Self {
        Self {
            valid: false,
            certificate: None,
            reason: Some(failure),
            verification_count: None,
            last_verified: None,
        }
    }
}

/// Run the verification checks in order against the current stored state
fn check(
    index: &CertificateIndex,
    id: &CertificateId,
    provided_hash: Option<&str>,
) -> Result<Option<VerificationFailure>> {
    if let Some(record) = index.get(id) {
        return check_record(record, provided_hash);
    }
    Ok(Some(match index.unreadable(id) {
        Some(entry) => check_unreadable(entry, provided_hash),
        None => VerificationFailure::NotFound,
    }))
}

fn check_record(
    record: &CertificateRecord,
    provided_hash: Option<&str>,
) -> Result<Option<VerificationFailure>> {
    if !record.is_active() {
        return Ok(Some(VerificationFailure::NotActive));
    }

    let current = ContentHash::of_record(record)?;

    // A caller-supplied hash is checked against the anchor stored at issuance
    if let Some(provided) = provided_hash {
        if !anchors_match(provided, &record.blockchain_hash) {
            return Ok(Some(VerificationFailure::HashMismatch));
        }
    }
    if !current.matches_hex(&record.blockchain_hash) {
        return Ok(Some(VerificationFailure::Tampered));
    }
    Ok(None)
}

/// A record whose fields no longer decode cannot hash to its anchor
fn check_unreadable(
    entry: &UnreadableRecord,
    provided_hash: Option<&str>,
) -> VerificationFailure {
    if entry.is_revoked() {
        return VerificationFailure::NotActive;
    }
    if let Some(provided) = provided_hash {
        if !entry
            .blockchain_hash()
            .is_some_and(|stored| anchors_match(provided, stored))
        {
            return VerificationFailure::HashMismatch;
        }
    }
    VerificationFailure::Tampered
}

fn anchors_match(provided: &str, stored: &str) -> bool {
    provided.trim().eq_ignore_ascii_case(stored.trim())
}

impl<S: CertificateStore> CertificateService<S> {
    /// Verify a certificate by recomputing its content hash.
    ///
    /// Only a successful verification writes to the store (count and timestamp).
    /// A blank `provided_hash` counts as not supplied.
    pub fn verify(
        &self,
        certificate_id: &str,
        provided_hash: Option<&str>,
    ) -> Result<VerificationResult> {
        let Ok(id) = CertificateId::parse(certificate_id) else {
            return Ok(reject(certificate_id, VerificationFailure::NotFound));
        };
        let provided_hash = provided_hash.map(str::trim).filter(|h| !h.is_empty());

        // Failures are decided on a snapshot without taking the writer lock
        let snapshot = self.store.snapshot()?;
        if let Some(failure) = check(&snapshot, &id, provided_hash)? {
            return Ok(reject(certificate_id, failure));
        }

        // Re-check under the writer lock: the record may have changed since the snapshot
        let result = self.store.transact(|index| {
            let now = self.clock.now();
            if let Some(failure) = check(index, &id, provided_hash)? {
                return Ok(TxOutcome::Skip(VerificationResult::invalid(failure)));
            }
            let Some(record) = index.get_mut(&id) else {
                return Ok(TxOutcome::Skip(VerificationResult::invalid(
                    VerificationFailure::NotFound,
                )));
            };

            record.verification_count += 1;
            record.last_verified = Some(now);
            let result = VerificationResult::valid(record);
            index.touch(now);
            Ok(TxOutcome::Commit(result))
        })?;

        match result.reason {
            Some(failure) => Ok(reject(certificate_id, failure)),
            None => {
                tracing::info!(
                    "Certificate {} verified ({} successful verifications)",
                    id,
                    result.verification_count.unwrap_or_default()
                );
                Ok(result)
            }
        }
    }
}

fn reject(certificate_id: &str, failure: VerificationFailure) -> VerificationResult {
    tracing::warn!("Verification of {} failed: {}", certificate_id, failure);
    VerificationResult::invalid(failure)
}
