//! Derived display fields.

use chrono::{DateTime, Utc};
use licdash_core::LicenseRecord;
use licdash_core::timestamp::{SENTINEL, format_date};
use serde::Serialize;
use std::fmt;

/// Creation time of a license.
///
/// Prefers `createdAt`; otherwise decodes the timestamp embedded in an
/// ObjectId-style document identifier.
pub fn creation_date(record: &LicenseRecord) -> Option<DateTime<Utc>> {
    record
        .created()
        .or_else(|| record.id.as_ref().and_then(|id| id.embedded_timestamp()))
}

/// Creation date as `YYYY-MM-DD`, or the sentinel.
pub fn display_creation_date(record: &LicenseRecord) -> String {
    format_date(creation_date(record))
}

pub fn display_version(record: &LicenseRecord) -> &str {
    record.version_label().unwrap_or(SENTINEL)
}

pub fn display_expiry(record: &LicenseRecord) -> String {
    format_date(record.expiry())
}

pub fn display_hosts(record: &LicenseRecord) -> String {
    record
        .total_hosts
        .map(|hosts| hosts.to_string())
        .unwrap_or_else(|| SENTINEL.to_string())
}

/// Effective expiry classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryState {
    Active,
    Expired,
}

impl fmt::Display for ExpiryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiryState::Active => f.write_str("active"),
            ExpiryState::Expired => f.write_str("expired"),
        }
    }
}

pub fn expiry_state(record: &LicenseRecord, now: DateTime<Utc>) -> ExpiryState {
    if record.is_expired(now) {
        ExpiryState::Expired
    } else {
        ExpiryState::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use licdash_core::DocumentId;

    #[test]
    fn test_created_at_wins() {
        let record = LicenseRecord {
            created_at: Some("2024-02-10T09:00:00Z".to_string()),
            id: Some(DocumentId::new("65a1b2c3f0e1d2c3b4a59687")),
            ..Default::default()
        };
        assert_eq!(
            creation_date(&record),
            Some(Utc.with_ymd_and_hms(2024, 2, 10, 9, 0, 0).unwrap())
        );
        assert_eq!(display_creation_date(&record), "2024-02-10");
    }

    #[test]
    fn test_object_id_fallback() {
        let record = LicenseRecord {
            id: Some(DocumentId::new("65a1b2c3f0e1d2c3b4a59687")),
            ..Default::default()
        };
        let expected = Utc.timestamp_opt(1_705_095_875, 0).unwrap();
        assert_eq!(creation_date(&record), Some(expected));
        assert_eq!(display_creation_date(&record), "2024-01-12");
    }

    #[test]
    fn test_unparseable_created_at_falls_back_to_id() {
        let record = LicenseRecord {
            created_at: Some("yesterday".to_string()),
            id: Some(DocumentId::new("00000E10aaaa")),
            ..Default::default()
        };
        assert_eq!(creation_date(&record), Some(Utc.timestamp_opt(3600, 0).unwrap()));
    }

    #[test]
    fn test_sentinel_without_either_field() {
        let record = LicenseRecord::default();
        assert_eq!(creation_date(&record), None);
        assert_eq!(display_creation_date(&record), SENTINEL);

        let bad_id = LicenseRecord {
            id: Some(DocumentId::new("not-hex-at-all")),
            ..Default::default()
        };
        assert_eq!(display_creation_date(&bad_id), SENTINEL);
    }

    #[test]
    fn test_version_precedence() {
        let record = LicenseRecord {
            zabbix_version: Some(String::new()),
            version: Some("2.1".to_string()),
            nms_version: Some("9".to_string()),
            ..Default::default()
        };
        assert_eq!(display_version(&record), "2.1");
        assert_eq!(display_version(&LicenseRecord::default()), SENTINEL);
    }

    #[test]
    fn test_hosts_and_expiry() {
        let record = LicenseRecord {
            total_hosts: Some(17),
            expiry_date: Some("2026-03-04T05:06:07Z".to_string()),
            ..Default::default()
        };
        assert_eq!(display_hosts(&record), "17");
        assert_eq!(display_expiry(&record), "2026-03-04");
        assert_eq!(display_hosts(&LicenseRecord::default()), SENTINEL);
    }

    #[test]
    fn test_expiry_state() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let record = LicenseRecord {
            expiry_date: Some("2024-12-31".to_string()),
            ..Default::default()
        };
        assert_eq!(expiry_state(&record, now), ExpiryState::Expired);
        assert_eq!(expiry_state(&LicenseRecord::default(), now), ExpiryState::Active);
    }
}
