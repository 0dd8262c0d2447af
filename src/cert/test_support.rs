use crate::cert::certificate_id::CertificateId;
use crate::cert::issue::CertificatePayload;
use crate::cert::record::{CertStatus, CertificateRecord};
use chrono::{NaiveDate, TimeZone, Utc};

pub fn sample_record() -> CertificateRecord {
    CertificateRecord {
        internal_id: 1,
        certificate_id: CertificateId::new(2026, 1),
        student_id: 1,
        student_name: "Asha".to_string(),
        degree: "BSc CS".to_string(),
        school_id: Some(4),
        school_name: Some("Northfield College".to_string()),
        graduation_date: NaiveDate::from_ymd_opt(2026, 6, 30),
        gpa: 8.7,
        courses: vec!["CS101".to_string(), "CS102".to_string()],
        blockchain_hash: String::new(),
        verification_url: "http://localhost:3000/verify/CERT-2026-001".to_string(),
        issued_by: "registrar".to_string(),
        issued_date: Utc.with_ymd_and_hms(2026, 7, 1, 9, 0, 0).unwrap(),
        status: CertStatus::Active,
        revoked_date: None,
        revoked_reason: None,
        verification_count: 0,
        last_verified: None,
    }
}

pub fn sample_payload(student_id: u64) -> CertificatePayload {
    CertificatePayload {
        student_id: Some(student_id.into()),
        student_name: Some("Asha".to_string()),
        degree: Some("BSc CS".to_string()),
        school_id: Some(4u64.into()),
        school_name: Some("Northfield College".to_string()),
        graduation_date: Some("2026-06-30".to_string()),
        gpa: Some(serde_json::Value::from(8.7_f64)),
        courses: Some(vec!["CS101".to_string()]),
    }
}
