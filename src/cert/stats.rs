use crate::cert::{CertStatus, CertificateRecord, CertificateService};
use crate::storage::CertificateStore;
use crate::utils::errors::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Window for the "recently issued" count
pub const RECENT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total: usize,
    pub active: usize,
    pub revoked: usize,
    pub total_verifications: u64,
    /// `None` when the store is empty
    pub average_gpa: Option<f64>,
    pub degrees: BTreeSet<String>,
    pub recently_issued: usize,
    pub by_school: BTreeMap<String, usize>,
}

/// Derive summary metrics from a set of records as of `now`
pub fn summarize<'a>(
    records: impl IntoIterator<Item = &'a CertificateRecord>,
    now: DateTime<Utc>,
) -> StatsSummary {
    let window_start = now - Duration::days(RECENT_WINDOW_DAYS);
    let mut summary = StatsSummary {
        total: 0,
        active: 0,
        revoked: 0,
        total_verifications: 0,
        average_gpa: None,
        degrees: BTreeSet::new(),
        recently_issued: 0,
        by_school: BTreeMap::new(),
    };
    let mut gpa_sum = 0.0;

    for record in records {
        summary.total += 1;
        match record.status {
            CertStatus::Active => summary.active += 1,
            CertStatus::Revoked => summary.revoked += 1,
        }
        summary.total_verifications += record.verification_count;
        gpa_sum += record.gpa;
        summary.degrees.insert(record.degree.clone());
        if record.issued_date >= window_start && record.issued_date <= now {
            summary.recently_issued += 1;
        }

        let school = record
            .school_name
            .clone()
            .or_else(|| record.school_id.map(|id| format!("school #{id}")))
            .unwrap_or_else(|| "unknown".to_string());
        *summary.by_school.entry(school).or_insert(0) += 1;
    }

    if summary.total > 0 {
        summary.average_gpa = Some(gpa_sum / summary.total as f64);
    }
    summary
}

impl<S: CertificateStore> CertificateService<S> {
    pub fn statistics(&self) -> Result<StatsSummary> {
        let index = self.store.snapshot()?;
        let summary = summarize(index.iter(), self.clock.now());
        tracing::debug!(
            "Computed statistics over {} certificates",
            summary.total
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::test_support::sample_record;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_summary_has_no_average() {
        let summary = summarize(std::iter::empty::<&CertificateRecord>(), now());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_gpa, None);
        assert!(summary.degrees.is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let mut a = sample_record();
        a.gpa = 8.0;
        a.verification_count = 3;
        a.issued_date = now() - Duration::days(2);

        let mut b = sample_record();
        b.gpa = 9.0;
        b.degree = "MSc Physics".to_string();
        b.status = CertStatus::Revoked;
        b.verification_count = 1;
        b.school_name = None;
        b.issued_date = now() - Duration::days(45);

        let mut c = sample_record();
        c.gpa = 7.0;
        c.school_name = None;
        c.school_id = None;
        c.issued_date = now() - Duration::days(30);

        let records = [a, b, c];
        let summary = summarize(records.iter(), now());

        assert_eq!(summary.total, 3);
        assert_eq!(summary.active, 2);
        assert_eq!(summary.revoked, 1);
        assert_eq!(summary.total_verifications, 4);
        assert_eq!(summary.average_gpa, Some(8.0));
        assert_eq!(
            summary.degrees.iter().cloned().collect::<Vec<_>>(),
            vec!["BSc CS".to_string(), "MSc Physics".to_string()]
        );
        assert_eq!(summary.recently_issued, 2);
        assert_eq!(summary.by_school.get("Northfield College"), Some(&1));
        assert_eq!(summary.by_school.get("school #4"), Some(&1));
        assert_eq!(summary.by_school.get("unknown"), Some(&1));
    }
}
