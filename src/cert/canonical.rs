//! Canonical byte encoding of a certificate's authenticity fields.
//!
//! The encoding is compact JSON with keys in lexicographic order. Field order and
//! value formatting are part of every issued hash: changing either invalidates
//! all previously issued certificates.

use crate::cert::record::CertificateRecord;
use crate::utils::errors::Result;
use serde::Serialize;

/// Date format used for `graduationDate` inside the canonical encoding
const DATE_FORMAT: &str = "%Y-%m-%d";

// Declaration order is the serialization order; keep it sorted by JSON key.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalFields<'a> {
    certificate_id: String,
    courses: &'a [String],
    degree: &'a str,
    gpa: f64,
    graduation_date: Option<String>,
    school_id: Option<u64>,
    student_id: u64,
    student_name: &'a str,
}

impl<'a> CanonicalFields<'a> {
    pub fn of(record: &'a CertificateRecord) -> Self {
        Self {
            certificate_id: record.certificate_id.to_string(),
            courses: &record.courses,
            degree: &record.degree,
            gpa: normalize_gpa(record.gpa),
            graduation_date: record
                .graduation_date
                .map(|date| date.format(DATE_FORMAT).to_string()),
            school_id: record.school_id,
            student_id: record.student_id,
            student_name: &record.student_name,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Canonical bytes for a record's current field values
pub fn canonical_bytes(record: &CertificateRecord) -> Result<Vec<u8>> {
    let bytes = CanonicalFields::of(record).to_bytes()?;
    tracing::trace!(
        "Canonicalized {} into {} bytes",
        record.certificate_id,
        bytes.len()
    );
    Ok(bytes)
}

// -0.0 and 0.0 compare equal and must hash equal.
fn normalize_gpa(gpa: f64) -> f64 {
    if gpa == 0.0 {
        0.0
    } else {
        gpa
    }
}
