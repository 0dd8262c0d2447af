use crate::cert::certificate_id::CertificateId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertStatus {
    Active,
    Revoked,
}

impl CertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertStatus::Active => "active",
            CertStatus::Revoked => "revoked",
        }
    }
}

impl fmt::Display for CertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "revoked" => Ok(Self::Revoked),
            _ => Err(format!("Invalid status: {s}")),
        }
    }
}

/// A persisted academic certificate.
///
/// The canonical fields (`certificate_id`, `student_id`, `student_name`, `degree`,
/// `school_id`, `graduation_date`, `gpa`, `courses`) are what `blockchain_hash`
/// covers. `blockchain_hash` is written once at issuance and only ever compared
/// against afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    pub internal_id: u64,
    pub certificate_id: CertificateId,
    pub student_id: u64,
    pub student_name: String,
    pub degree: String,
    pub school_id: Option<u64>,
    pub school_name: Option<String>,
    pub graduation_date: Option<NaiveDate>,
    pub gpa: f64,
    #[serde(default)]
    pub courses: Vec<String>,
    pub blockchain_hash: String,
    pub verification_url: String,
    pub issued_by: String,
    pub issued_date: DateTime<Utc>,
    pub status: CertStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_reason: Option<String>,
    #[serde(default)]
    pub verification_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_verified: Option<DateTime<Utc>>,
}

impl CertificateRecord {
    pub fn is_active(&self) -> bool {
        self.status == CertStatus::Active
    }

    pub fn is_revoked(&self) -> bool {
        self.status == CertStatus::Revoked
    }

    /// Redacted view handed out by a successful verification
    pub fn public_view(&self) -> PublicCertificate {
        PublicCertificate {
            certificate_id: self.certificate_id.clone(),
            student_name: self.student_name.clone(),
            degree: self.degree.clone(),
            school_name: self.school_name.clone(),
            graduation_date: self.graduation_date,
            gpa: self.gpa,
            issued_date: self.issued_date,
            blockchain_hash: self.blockchain_hash.clone(),
            verification_url: self.verification_url.clone(),
        }
    }
}

impl fmt::Display for CertificateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}), {}",
            self.certificate_id, self.student_name, self.degree, self.status
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicCertificate {
    pub certificate_id: CertificateId,
    pub student_name: String,
    pub degree: String,
    pub school_name: Option<String>,
    pub graduation_date: Option<NaiveDate>,
    pub gpa: f64,
    pub issued_date: DateTime<Utc>,
    pub blockchain_hash: String,
    pub verification_url: String,
}

/// Build the public verification URL for a certificate
pub fn verification_url(base_url: &str, certificate_id: &CertificateId) -> String {
    format!("{}/verify/{certificate_id}", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_url_trims_slashes() {
        let id = CertificateId::new(2026, 5);
        assert_eq!(
            verification_url("https://certs.example.edu/", &id),
            "https://certs.example.edu/verify/CERT-2026-005"
        );
        assert_eq!(
            verification_url("http://localhost:3000", &id),
            "http://localhost:3000/verify/CERT-2026-005"
        );
    }

    #[test]
    fn test_status_parse_and_serde() {
        assert_eq!("Revoked".parse::<CertStatus>(), Ok(CertStatus::Revoked));
        assert!("expired".parse::<CertStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&CertStatus::Active).unwrap(),
            "\"active\""
        );
    }
}
