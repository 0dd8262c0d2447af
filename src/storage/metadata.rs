use crate::cert::{CertificateId, CertificateRecord};
use crate::utils::errors::{CertError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

const FORMAT_VERSION: &str = "1.0";

fn first_id() -> u64 {
    1
}

/// The whole persisted certificate collection plus its id sequences.
///
/// Records are decoded one at a time: an entry that no longer matches the
/// record schema is kept verbatim as an [`UnreadableRecord`] and written back
/// unchanged, while the rest of the collection stays usable.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "StoredIndex")]
pub struct CertificateIndex {
    pub certificates: Vec<CertificateRecord>,
    unreadable: Vec<UnreadableRecord>,
    next_internal_id: u64,
    next_sequence: u64,
    pub last_modified: DateTime<Utc>,
    pub format_version: String,
}

/// A stored entry that failed to decode as a certificate record
#[derive(Debug, Clone, PartialEq)]
pub struct UnreadableRecord {
    pub certificate_id: Option<CertificateId>,
    pub internal_id: Option<u64>,
    pub error: String,
    raw: Value,
}

impl UnreadableRecord {
    fn new(raw: Value, error: String) -> Self {
        let certificate_id = raw
            .get("certificateId")
            .and_then(Value::as_str)
            .and_then(|id| CertificateId::parse(id).ok());
        let internal_id = raw.get("internalId").and_then(Value::as_u64);
        Self {
            certificate_id,
            internal_id,
            error,
            raw,
        }
    }

    pub fn is_revoked(&self) -> bool {
        self.raw.get("status").and_then(Value::as_str) == Some("revoked")
    }

    pub fn blockchain_hash(&self) -> Option<&str> {
        self.raw.get("blockchainHash").and_then(Value::as_str)
    }
}

/// On-disk shape, with records left undecoded
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredIndex {
    #[serde(default)]
    certificates: Vec<Value>,
    #[serde(default = "first_id")]
    next_internal_id: u64,
    #[serde(default = "first_id")]
    next_sequence: u64,
    last_modified: DateTime<Utc>,
    format_version: String,
}

impl From<StoredIndex> for CertificateIndex {
    fn from(stored: StoredIndex) -> Self {
        let mut certificates = Vec::with_capacity(stored.certificates.len());
        let mut unreadable = Vec::new();

        for raw in stored.certificates {
            match CertificateRecord::deserialize(&raw) {
                Ok(record) => certificates.push(record),
                Err(e) => {
                    let entry = UnreadableRecord::new(raw, e.to_string());
                    tracing::warn!(
                        "Unreadable certificate record {}: {}",
                        entry
                            .certificate_id
                            .as_ref()
                            .map_or_else(|| "<unknown id>".to_string(), |id| id.to_string()),
                        entry.error
                    );
                    unreadable.push(entry);
                }
            }
        }

        Self {
            certificates,
            unreadable,
            next_internal_id: stored.next_internal_id,
            next_sequence: stored.next_sequence,
            last_modified: stored.last_modified,
            format_version: stored.format_version,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum StoredEntry<'a> {
    Record(&'a CertificateRecord),
    Unreadable(&'a Value),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredIndexRef<'a> {
    certificates: Vec<StoredEntry<'a>>,
    next_internal_id: u64,
    next_sequence: u64,
    last_modified: &'a DateTime<Utc>,
    format_version: &'a str,
}

impl Serialize for CertificateIndex {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let certificates = self
            .certificates
            .iter()
            .map(StoredEntry::Record)
            .chain(
                self.unreadable
                    .iter()
                    .map(|entry| StoredEntry::Unreadable(&entry.raw)),
            )
            .collect();

        StoredIndexRef {
            certificates,
            next_internal_id: self.next_internal_id,
            next_sequence: self.next_sequence,
            last_modified: &self.last_modified,
            format_version: &self.format_version,
        }
        .serialize(serializer)
    }
}

/// Identifiers reserved for one new certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub internal_id: u64,
    pub sequence: u64,
}

impl CertificateIndex {
    pub fn new() -> Self {
        Self {
            certificates: Vec::new(),
            unreadable: Vec::new(),
            next_internal_id: 1,
            next_sequence: 1,
            last_modified: Utc::now(),
            format_version: FORMAT_VERSION.to_string(),
        }
    }

    /// Number of readable certificates
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// Reserve the next internal id and certificate sequence number.
    ///
    /// Both counters only move forward, and never fall behind an id already
    /// present in the collection (e.g. records imported by hand).
    pub fn allocate(&mut self) -> Allocation {
        let max_internal = self
            .certificates
            .iter()
            .map(|c| c.internal_id)
            .chain(self.unreadable.iter().filter_map(|u| u.internal_id))
            .max()
            .unwrap_or(0);
        let max_sequence = self
            .certificates
            .iter()
            .map(|c| c.certificate_id.sequence())
            .chain(
                self.unreadable
                    .iter()
                    .filter_map(|u| u.certificate_id.as_ref().map(CertificateId::sequence)),
            )
            .max()
            .unwrap_or(0);

        let allocation = Allocation {
            internal_id: self.next_internal_id.max(max_internal + 1),
            sequence: self.next_sequence.max(max_sequence + 1),
        };
        self.next_internal_id = allocation.internal_id + 1;
        self.next_sequence = allocation.sequence + 1;
        allocation
    }

    /// Insert a new certificate; fails if either id is already taken
    pub fn insert(&mut self, record: CertificateRecord) -> Result<()> {
        if self.get(&record.certificate_id).is_some()
            || self.unreadable(&record.certificate_id).is_some()
        {
            return Err(CertError::Duplicate(record.certificate_id.to_string()));
        }
        if self.get_by_internal_id(record.internal_id).is_some()
            || self
                .unreadable
                .iter()
                .any(|u| u.internal_id == Some(record.internal_id))
        {
            return Err(CertError::Duplicate(format!(
                "internal id {}",
                record.internal_id
            )));
        }
        self.certificates.push(record);
        Ok(())
    }

    pub fn get(&self, certificate_id: &CertificateId) -> Option<&CertificateRecord> {
        self.certificates
            .iter()
            .find(|c| &c.certificate_id == certificate_id)
    }

    pub fn get_mut(&mut self, certificate_id: &CertificateId) -> Option<&mut CertificateRecord> {
        self.certificates
            .iter_mut()
            .find(|c| &c.certificate_id == certificate_id)
    }

    pub fn get_by_internal_id(&self, internal_id: u64) -> Option<&CertificateRecord> {
        self.certificates
            .iter()
            .find(|c| c.internal_id == internal_id)
    }

    /// The undecodable entry stored under `certificate_id`, if any
    pub fn unreadable(&self, certificate_id: &CertificateId) -> Option<&UnreadableRecord> {
        self.unreadable
            .iter()
            .find(|u| u.certificate_id.as_ref() == Some(certificate_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CertificateRecord> {
        self.certificates.iter()
    }

    pub fn for_student(&self, student_id: u64) -> Vec<&CertificateRecord> {
        self.certificates
            .iter()
            .filter(|c| c.student_id == student_id)
            .collect()
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_modified = now;
    }
}

impl Default for CertificateIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::test_support::sample_record;

    fn record_with(internal_id: u64, sequence: u64) -> CertificateRecord {
        let mut record = sample_record();
        record.internal_id = internal_id;
        record.certificate_id = CertificateId::new(2026, sequence);
        record
    }

    #[test]
    fn test_allocate_is_monotonic() {
        let mut index = CertificateIndex::new();
        let first = index.allocate();
        let second = index.allocate();
        assert_eq!(
            first,
            Allocation {
                internal_id: 1,
                sequence: 1
            }
        );
        assert_eq!(
            second,
            Allocation {
                internal_id: 2,
                sequence: 2
            }
        );
    }

    #[test]
    fn test_allocate_skips_past_existing_ids() {
        let mut index = CertificateIndex::new();
        index.certificates.push(record_with(7, 12));
        let next = index.allocate();
        assert_eq!(next.internal_id, 8);
        assert_eq!(next.sequence, 13);
    }

    #[test]
    fn test_allocate_not_reused_after_removal() {
        let mut index = CertificateIndex::new();
        let a = index.allocate();
        index.insert(record_with(a.internal_id, a.sequence)).unwrap();
        let b = index.allocate();
        index.insert(record_with(b.internal_id, b.sequence)).unwrap();

        // Size-based numbering would hand out sequence 2 again here
        index.certificates.remove(0);
        let c = index.allocate();
        assert_eq!(c.sequence, 3);
        assert_eq!(c.internal_id, 3);
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut index = CertificateIndex::new();
        index.insert(record_with(1, 1)).unwrap();
        assert!(matches!(
            index.insert(record_with(2, 1)),
            Err(CertError::Duplicate(_))
        ));
        assert!(matches!(
            index.insert(record_with(1, 2)),
            Err(CertError::Duplicate(_))
        ));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_lookups() {
        let mut index = CertificateIndex::new();
        index.insert(record_with(1, 1)).unwrap();
        let mut other = record_with(2, 2);
        other.student_id = 9;
        index.insert(other).unwrap();

        assert!(index.get(&CertificateId::new(2026, 2)).is_some());
        assert!(index.get(&CertificateId::new(2026, 3)).is_none());
        assert_eq!(index.get_by_internal_id(1).unwrap().student_id, 1);
        assert_eq!(index.for_student(9).len(), 1);
        assert!(index.for_student(42).is_empty());
    }

    fn stored_json(records: Vec<Value>) -> String {
        serde_json::json!({
            "certificates": records,
            "nextInternalId": 3,
            "nextSequence": 3,
            "lastModified": "2026-07-01T09:00:00Z",
            "formatVersion": "1.0",
        })
        .to_string()
    }

    #[test]
    fn test_bad_record_does_not_poison_the_index() {
        let good = serde_json::to_value(record_with(1, 1)).unwrap();
        let mut bad = serde_json::to_value(record_with(2, 2)).unwrap();
        bad["gpa"] = Value::String("9.9".to_string());

        let index: CertificateIndex =
            serde_json::from_str(&stored_json(vec![good, bad.clone()])).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.get(&CertificateId::new(2026, 1)).is_some());
        assert!(index.get(&CertificateId::new(2026, 2)).is_none());

        let entry = index.unreadable(&CertificateId::new(2026, 2)).unwrap();
        assert_eq!(entry.internal_id, Some(2));
        assert!(!entry.is_revoked());
        assert!(entry.error.contains("invalid type"));

        // Written back untouched
        let round: Value = serde_json::to_value(&index).unwrap();
        assert_eq!(round["certificates"][1], bad);
        assert_eq!(round["nextSequence"], 3);
    }

    #[test]
    fn test_unreadable_ids_stay_reserved() {
        let mut bad = serde_json::to_value(record_with(5, 9)).unwrap();
        bad["studentId"] = Value::String("x".to_string());
        let mut index: CertificateIndex =
            serde_json::from_str(&stored_json(vec![bad])).unwrap();

        assert!(matches!(
            index.insert(record_with(1, 9)),
            Err(CertError::Duplicate(_))
        ));
        assert!(matches!(
            index.insert(record_with(5, 1)),
            Err(CertError::Duplicate(_))
        ));
        let next = index.allocate();
        assert_eq!(next.internal_id, 6);
        assert_eq!(next.sequence, 10);
    }

    #[test]
    fn test_counters_default_when_missing() {
        let json = r#"{"certificates":[],"lastModified":"2026-01-01T00:00:00Z","formatVersion":"1.0"}"#;
        let mut index: CertificateIndex = serde_json::from_str(json).unwrap();
        assert_eq!(index.allocate().sequence, 1);
    }
}
