use crate::cert::service::{missing, parse_lookup_id};
use crate::cert::{CertStatus, CertificateRecord, CertificateService};
use crate::storage::{CertificateStore, TxOutcome};
use crate::utils::errors::{CertError, Result};

pub const DEFAULT_REVOCATION_REASON: &str = "Administrative revocation";

impl<S: CertificateStore> CertificateService<S> {
    /// Move an active certificate to `revoked`.
    ///
    /// Revocation is one-way and happens once: revoking an already revoked
    /// certificate fails with `AlreadyRevoked` and keeps the original date and reason.
    pub fn revoke(&self, certificate_id: &str, reason: Option<&str>) -> Result<CertificateRecord> {
        let id = parse_lookup_id(certificate_id)?;
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REVOCATION_REASON)
            .to_string();

        let record = self.store.transact(|index| {
            let now = self.clock.now();
            if index.get(&id).is_none() {
                return Err(missing(index, &id, certificate_id));
            }
            let record = index
                .get_mut(&id)
                .ok_or_else(|| CertError::CertNotFound(certificate_id.to_string()))?;
            if record.is_revoked() {
                return Err(CertError::AlreadyRevoked(id.to_string()));
            }

            record.status = CertStatus::Revoked;
            record.revoked_date = Some(now);
            record.revoked_reason = Some(reason);
            let revoked = record.clone();
            index.touch(now);
            Ok(TxOutcome::Commit(revoked))
        })?;

        tracing::info!(
            "Revoked certificate {}: {}",
            record.certificate_id,
            record.revoked_reason.as_deref().unwrap_or_default()
        );
        Ok(record)
    }
}
