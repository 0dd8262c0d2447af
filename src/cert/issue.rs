use crate::cert::record::verification_url;
use crate::cert::{CertStatus, CertificateId, CertificateRecord, CertificateService, ContentHash};
use crate::storage::{CertificateStore, TxOutcome};
use crate::utils::errors::{CertError, Result};
use chrono::{DateTime, Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::Value;

/// Issuance input as supplied by a caller (JSON document or CLI flags).
///
/// Numeric fields are kept loosely typed so that malformed values surface as
/// validation errors naming the offending field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificatePayload {
    pub student_id: Option<Value>,
    pub student_name: Option<String>,
    pub degree: Option<String>,
    pub school_id: Option<Value>,
    pub school_name: Option<String>,
    pub graduation_date: Option<String>,
    pub gpa: Option<Value>,
    pub courses: Option<Vec<String>>,
}

/// Payload after validation; every field has its final type
#[derive(Debug, Clone, PartialEq)]
pub struct NewCertificate {
    pub student_id: u64,
    pub student_name: String,
    pub degree: String,
    pub school_id: Option<u64>,
    pub school_name: Option<String>,
    pub graduation_date: Option<NaiveDate>,
    pub gpa: f64,
    pub courses: Vec<String>,
}

impl CertificatePayload {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| CertError::Validation(format!("Malformed certificate payload: {e}")))
    }

    pub fn validate(&self) -> Result<NewCertificate> {
        let student_id = numeric_id("studentId", required("studentId", &self.student_id)?)?;
        let student_name = required_text("studentName", &self.student_name)?;
        let degree = required_text("degree", &self.degree)?;
        let school_id = self
            .school_id
            .as_ref()
            .map(|v| numeric_id("schoolId", v))
            .transpose()?;
        let school_name = self
            .school_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let graduation_date = self
            .graduation_date
            .as_deref()
            .map(parse_date)
            .transpose()?;
        let gpa = parse_gpa(required("gpa", &self.gpa)?)?;

        let mut courses = Vec::new();
        for course in self.courses.iter().flatten() {
            let course = course.trim();
            if course.is_empty() {
                return Err(invalid("courses", "must not contain empty course names"));
            }
            courses.push(course.to_string());
        }

        Ok(NewCertificate {
            student_id,
            student_name,
            degree,
            school_id,
            school_name,
            graduation_date,
            gpa,
            courses,
        })
    }
}

fn invalid(field: &str, problem: &str) -> CertError {
    CertError::Validation(format!("{field} {problem}"))
}

fn required<'a>(field: &str, value: &'a Option<Value>) -> Result<&'a Value> {
    value
        .as_ref()
        .ok_or_else(|| invalid(field, "is required"))
}

fn required_text(field: &str, value: &Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(invalid(field, "is required")),
    }
}

fn numeric_id(field: &str, value: &Value) -> Result<u64> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| invalid(field, "must be a non-negative integer"))
}

fn parse_gpa(value: &Value) -> Result<f64> {
    let gpa = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| invalid("gpa", "must be numeric"))?;

    if !gpa.is_finite() || gpa < 0.0 {
        return Err(invalid("gpa", "must be a finite, non-negative number"));
    }
    Ok(gpa)
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| invalid("graduationDate", "must be a YYYY-MM-DD date"))
}

impl<S: CertificateStore> CertificateService<S> {
    /// Issue a new active certificate and persist it.
    ///
    /// Id allocation, hashing and the insert happen in one store transaction.
    pub fn issue(&self, payload: CertificatePayload, issued_by: &str) -> Result<CertificateRecord> {
        let new_cert = payload.validate()?;
        let issued_by = issued_by.trim();
        if issued_by.is_empty() {
            return Err(invalid("issuedBy", "is required"));
        }

        let now = self.clock.now();
        let record = self.store.transact(|index| {
            let allocation = index.allocate();
            let certificate_id = CertificateId::new(now.year(), allocation.sequence);

            let mut record = CertificateRecord {
                internal_id: allocation.internal_id,
                verification_url: verification_url(&self.verification_base_url, &certificate_id),
                certificate_id,
                student_id: new_cert.student_id,
                student_name: new_cert.student_name,
                degree: new_cert.degree,
                school_id: new_cert.school_id,
                school_name: new_cert.school_name,
                graduation_date: new_cert.graduation_date,
                gpa: new_cert.gpa,
                courses: new_cert.courses,
                blockchain_hash: String::new(),
                issued_by: issued_by.to_string(),
                issued_date: now,
                status: CertStatus::Active,
                revoked_date: None,
                revoked_reason: None,
                verification_count: 0,
                last_verified: None,
            };
            record.blockchain_hash = ContentHash::of_record(&record)?.to_hex();

            index.insert(record.clone())?;
            index.touch(now);
            Ok(TxOutcome::Commit(record))
        })?;

        tracing::info!(
            "Issued certificate {} for student {} (hash {})",
            record.certificate_id,
            record.student_id,
            record.blockchain_hash
        );
        Ok(record)
    }
}
