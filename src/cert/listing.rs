use crate::cert::{CertStatus, CertificateColumn, CertificateRecord, CertificateService};
use crate::storage::CertificateStore;
use crate::utils::errors::{CertError, Result};
use crate::utils::output::{build_table_data, OutputFormat};

/// Which certificates a listing should include
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub student_id: Option<u64>,
    pub status: Option<CertStatus>,
}

/// Certificate listing behind the `list` command
pub struct CertificateListingService;

impl CertificateListingService {
    pub fn collect<S: CertificateStore>(
        service: &CertificateService<S>,
        filter: &ListingFilter,
    ) -> Result<Vec<CertificateRecord>> {
        let certificates = match (filter.student_id, filter.status) {
            (Some(student_id), _) => service.list_certificates_for_student(student_id)?,
            (None, Some(status)) => service.list_by_status(status)?,
            (None, None) => service.list_certificates()?,
        };

        Ok(certificates
            .into_iter()
            .filter(|cert| filter.status.map_or(true, |status| cert.status == status))
            .collect())
    }

    /// Print certificates with column formatting
    pub fn print<S: CertificateStore>(
        service: &CertificateService<S>,
        filter: &ListingFilter,
        columns: Option<&str>,
        output: &OutputFormat,
    ) -> Result<()> {
        let parsed_columns = Self::parse_columns(columns)?;
        let certificates = Self::collect(service, filter)?;

        if output.json {
            return output.print_json(&certificates);
        }
        if certificates.is_empty() {
            return Ok(());
        }

        let mut table: Vec<Vec<String>> = Vec::with_capacity(certificates.len() + 1);
        if !output.raw {
            table.push(
                parsed_columns
                    .iter()
                    .map(|col| col.header().to_string())
                    .collect(),
            );
        }
        table.extend(build_table_data(&certificates, &parsed_columns));
        output.print_table(&table);
        Ok(())
    }

    /// Parse columns parameter with default logic
    pub fn parse_columns(columns: Option<&str>) -> Result<Vec<CertificateColumn>> {
        let default_columns = vec!["id", "student", "degree", "gpa", "status", "verifications"];

        // Parse columns with support for + prefix (append to defaults)
        let columns = if let Some(columns_str) = columns {
            if let Some(stripped) = columns_str.strip_prefix('+') {
                // Append mode: start with defaults and add specified columns
                let mut result_columns = default_columns;
                result_columns.extend(
                    stripped
                        .split(',')
                        .map(|s| s.trim())
                        .filter(|s| !s.is_empty()),
                );
                result_columns
            } else {
                // Override mode: use only specified columns
                columns_str
                    .split(',')
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .collect()
            }
        } else {
            default_columns
        };

        if columns.is_empty() {
            return Err(CertError::Validation("No columns selected".to_string()));
        }

        columns
            .into_iter()
            .map(|col| col.parse::<CertificateColumn>().map_err(CertError::Validation))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::test_support::sample_payload;
    use crate::storage::MemoryStore;

    #[test]
    fn test_parse_columns_modes() {
        let defaults = CertificateListingService::parse_columns(None).unwrap();
        assert_eq!(defaults.len(), 6);

        let appended = CertificateListingService::parse_columns(Some("+hash, url")).unwrap();
        assert_eq!(appended.len(), 8);
        assert_eq!(appended[7], CertificateColumn::Url);

        let replaced = CertificateListingService::parse_columns(Some("id,issued")).unwrap();
        assert_eq!(replaced, vec![CertificateColumn::Id, CertificateColumn::Issued]);

        assert!(matches!(
            CertificateListingService::parse_columns(Some("id,bogus")),
            Err(CertError::Validation(_))
        ));
        assert!(matches!(
            CertificateListingService::parse_columns(Some(" , ")),
            Err(CertError::Validation(_))
        ));
    }

    #[test]
    fn test_collect_applies_filters() {
        let service = CertificateService::new(MemoryStore::new());
        let a = service.issue(sample_payload(1), "registrar").unwrap();
        service.issue(sample_payload(1), "registrar").unwrap();
        service.issue(sample_payload(2), "registrar").unwrap();
        service.revoke(&a.certificate_id.to_string(), None).unwrap();

        let all = CertificateListingService::collect(&service, &ListingFilter::default()).unwrap();
        assert_eq!(all.len(), 3);

        let student_active = CertificateListingService::collect(
            &service,
            &ListingFilter {
                student_id: Some(1),
                status: Some(CertStatus::Active),
            },
        )
        .unwrap();
        assert_eq!(student_active.len(), 1);
        assert_ne!(student_active[0].certificate_id, a.certificate_id);

        let revoked = CertificateListingService::collect(
            &service,
            &ListingFilter {
                student_id: None,
                status: Some(CertStatus::Revoked),
            },
        )
        .unwrap();
        assert_eq!(revoked.len(), 1);
        assert_eq!(revoked[0].certificate_id, a.certificate_id);
    }
}
