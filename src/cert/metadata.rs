use crate::cert::CertificateRecord;
use crate::utils::output::GetColumnValue;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateColumn {
    Id,
    InternalId,
    StudentId,
    Student,
    Degree,
    School,
    Gpa,
    Graduated,
    Issued,
    IssuedBy,
    Status,
    Verifications,
    LastVerified,
    Hash,
    Url,
    RevokedReason,
}

impl FromStr for CertificateColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" | "certificate_id" => Ok(Self::Id),
            "internal_id" => Ok(Self::InternalId),
            "student_id" => Ok(Self::StudentId),
            "student" | "student_name" => Ok(Self::Student),
            "degree" => Ok(Self::Degree),
            "school" | "school_name" => Ok(Self::School),
            "gpa" => Ok(Self::Gpa),
            "graduated" | "graduation_date" => Ok(Self::Graduated),
            "issued" | "issued_date" => Ok(Self::Issued),
            "issued_by" => Ok(Self::IssuedBy),
            "status" => Ok(Self::Status),
            "verifications" | "verification_count" => Ok(Self::Verifications),
            "last_verified" => Ok(Self::LastVerified),
            "hash" | "blockchain_hash" => Ok(Self::Hash),
            "url" | "verification_url" => Ok(Self::Url),
            "revoked_reason" | "reason" => Ok(Self::RevokedReason),
            _ => Err(format!("Invalid column: {s}")),
        }
    }
}

impl CertificateColumn {
    /// Column names offered to shell completion
    pub const NAMES: &'static [&'static str] = &[
        "id",
        "internal_id",
        "student_id",
        "student",
        "degree",
        "school",
        "gpa",
        "graduated",
        "issued",
        "issued_by",
        "status",
        "verifications",
        "last_verified",
        "hash",
        "url",
        "revoked_reason",
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Self::Id => "Certificate",
            Self::InternalId => "#",
            Self::StudentId => "Student ID",
            Self::Student => "Student",
            Self::Degree => "Degree",
            Self::School => "School",
            Self::Gpa => "GPA",
            Self::Graduated => "Graduated",
            Self::Issued => "Issued",
            Self::IssuedBy => "Issued By",
            Self::Status => "Status",
            Self::Verifications => "Verified",
            Self::LastVerified => "Last Verified",
            Self::Hash => "Hash",
            Self::Url => "URL",
            Self::RevokedReason => "Revoked Reason",
        }
    }
}

impl GetColumnValue for CertificateRecord {
    fn get_column_value(&self, column: &CertificateColumn) -> String {
        match column {
            CertificateColumn::Id => self.certificate_id.to_string(),
            CertificateColumn::InternalId => self.internal_id.to_string(),
            CertificateColumn::StudentId => self.student_id.to_string(),
            CertificateColumn::Student => self.student_name.clone(),
            CertificateColumn::Degree => self.degree.clone(),
            CertificateColumn::School => self
                .school_name
                .clone()
                .or_else(|| self.school_id.map(|id| id.to_string()))
                .unwrap_or_else(|| "-".to_string()),
            CertificateColumn::Gpa => format!("{:.2}", self.gpa),
            CertificateColumn::Graduated => self
                .graduation_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
            CertificateColumn::Issued => self.issued_date.format("%Y-%m-%d %H:%M").to_string(),
            CertificateColumn::IssuedBy => self.issued_by.clone(),
            CertificateColumn::Status => self.status.to_string(),
            CertificateColumn::Verifications => self.verification_count.to_string(),
            CertificateColumn::LastVerified => self
                .last_verified
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
            CertificateColumn::Hash => self.blockchain_hash.clone(),
            CertificateColumn::Url => self.verification_url.clone(),
            CertificateColumn::RevokedReason => self
                .revoked_reason
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::test_support::sample_record;

    #[test]
    fn test_every_listed_name_parses() {
        for name in CertificateColumn::NAMES {
            assert!(name.parse::<CertificateColumn>().is_ok(), "{name}");
        }
        assert!("serial".parse::<CertificateColumn>().is_err());
    }

    #[test]
    fn test_column_values() {
        let record = sample_record();
        assert_eq!(record.get_column_value(&CertificateColumn::Id), "CERT-2026-001");
        assert_eq!(record.get_column_value(&CertificateColumn::Gpa), "8.70");
        assert_eq!(
            record.get_column_value(&CertificateColumn::Graduated),
            "2026-06-30"
        );
        assert_eq!(record.get_column_value(&CertificateColumn::Status), "active");
        assert_eq!(
            record.get_column_value(&CertificateColumn::LastVerified),
            "-"
        );
        assert_eq!(
            record.get_column_value(&CertificateColumn::School),
            "Northfield College"
        );
    }
}
