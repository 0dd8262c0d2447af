use crate::cert::{CertStatus, CertificateId, CertificateRecord};
use crate::storage::{CertificateIndex, CertificateStore};
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::errors::{CertError, Result};
use std::sync::Arc;

pub const DEFAULT_VERIFICATION_BASE_URL: &str = "http://localhost:3000";

/// Issuance, verification, revocation and reporting over one certificate store
pub struct CertificateService<S> {
    pub(crate) store: S,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) verification_base_url: String,
}

impl<S: CertificateStore> CertificateService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            verification_base_url: DEFAULT_VERIFICATION_BASE_URL.to_string(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_verification_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.verification_base_url = base_url.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All certificates in issuance order
    pub fn list_certificates(&self) -> Result<Vec<CertificateRecord>> {
        let mut certificates = self.store.snapshot()?.certificates;
        certificates.sort_by_key(|c| c.internal_id);
        tracing::debug!("Listing {} certificates", certificates.len());
        Ok(certificates)
    }

    /// Certificates filtered by status, in issuance order
    pub fn list_by_status(&self, status: CertStatus) -> Result<Vec<CertificateRecord>> {
        Ok(self
            .list_certificates()?
            .into_iter()
            .filter(|c| c.status == status)
            .collect())
    }

    pub fn get_certificate(&self, certificate_id: &str) -> Result<CertificateRecord> {
        let id = parse_lookup_id(certificate_id)?;
        let index = self.store.snapshot()?;
        match index.get(&id) {
            Some(record) => Ok(record.clone()),
            None => Err(missing(&index, &id, certificate_id)),
        }
    }

    pub fn list_certificates_for_student(&self, student_id: u64) -> Result<Vec<CertificateRecord>> {
        let index = self.store.snapshot()?;
        let mut certificates: Vec<CertificateRecord> =
            index.for_student(student_id).into_iter().cloned().collect();
        certificates.sort_by_key(|c| c.internal_id);
        Ok(certificates)
    }
}

/// Error for an id with no readable record: unreadable entries are storage faults
pub(crate) fn missing(
    index: &CertificateIndex,
    id: &CertificateId,
    certificate_id: &str,
) -> CertError {
    match index.unreadable(id) {
        Some(entry) => CertError::Storage(format!(
            "Certificate {id} cannot be read from the store: {}",
            entry.error
        )),
        None => CertError::CertNotFound(certificate_id.to_string()),
    }
}

/// Lookup ids that cannot be parsed can never match a stored certificate
pub(crate) fn parse_lookup_id(certificate_id: &str) -> Result<CertificateId> {
    CertificateId::parse(certificate_id).map_err(|e| {
        tracing::debug!("Unparseable certificate id '{}': {}", certificate_id, e);
        CertError::CertNotFound(certificate_id.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::test_support::sample_payload;
    use crate::storage::MemoryStore;

    fn service() -> CertificateService<MemoryStore> {
        CertificateService::new(MemoryStore::new())
    }

    #[test]
    fn test_get_certificate_not_found() {
        let service = service();
        assert!(matches!(
            service.get_certificate("CERT-2099-999"),
            Err(CertError::CertNotFound(_))
        ));
        assert!(matches!(
            service.get_certificate("garbage"),
            Err(CertError::CertNotFound(_))
        ));
    }

    #[test]
    fn test_list_in_issuance_order_and_by_student() {
        let service = service();
        let a = service.issue(sample_payload(1), "registrar").unwrap();
        let b = service.issue(sample_payload(2), "registrar").unwrap();
        let c = service.issue(sample_payload(1), "registrar").unwrap();

        let all: Vec<_> = service
            .list_certificates()
            .unwrap()
            .into_iter()
            .map(|r| r.certificate_id)
            .collect();
        assert_eq!(
            all,
            vec![
                a.certificate_id.clone(),
                b.certificate_id.clone(),
                c.certificate_id.clone()
            ]
        );

        let for_student: Vec<_> = service
            .list_certificates_for_student(1)
            .unwrap()
            .into_iter()
            .map(|r| r.certificate_id)
            .collect();
        assert_eq!(for_student, vec![a.certificate_id, c.certificate_id]);
        assert!(service.list_certificates_for_student(77).unwrap().is_empty());

        let fetched = service.get_certificate(&b.certificate_id.to_string()).unwrap();
        assert_eq!(fetched.student_id, 2);
    }

    #[test]
    fn test_list_by_status() {
        let service = service();
        let a = service.issue(sample_payload(1), "registrar").unwrap();
        service.issue(sample_payload(2), "registrar").unwrap();
        service
            .revoke(&a.certificate_id.to_string(), None)
            .unwrap();

        assert_eq!(service.list_by_status(CertStatus::Active).unwrap().len(), 1);
        let revoked = service.list_by_status(CertStatus::Revoked).unwrap();
        assert_eq!(revoked.len(), 1);
        assert_eq!(revoked[0].certificate_id, a.certificate_id);
    }
}
