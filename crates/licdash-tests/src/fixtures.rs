//! Test fixtures for creating sample license records.

use chrono::{DateTime, Duration, Utc};
use licdash_core::{DocumentId, LicenseKey, LicenseRecord};
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_KEY: AtomicUsize = AtomicUsize::new(1);

/// Builder for a single license record.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: LicenseRecord,
}

impl RecordBuilder {
    pub fn key(mut self, key: &str) -> Self {
        self.record.license_key = Some(LicenseKey::new(key));
        self
    }

    pub fn document_id(mut self, id: &str) -> Self {
        self.record.id = Some(DocumentId::new(id));
        self
    }

    pub fn client_email(mut self, email: &str) -> Self {
        self.record.client_email = Some(email.to_string());
        self
    }

    pub fn email(mut self, email: &str) -> Self {
        self.record.email = Some(email.to_string());
        self
    }

    pub fn identiqa(mut self, name: &str, email: &str) -> Self {
        self.record.identiqa_name = Some(name.to_string());
        self.record.identiqa_email = Some(email.to_string());
        self
    }

    pub fn application(mut self, product: &str) -> Self {
        self.record.application = Some(product.to_string());
        self
    }

    pub fn product(mut self, product: &str) -> Self {
        self.record.product = Some(product.to_string());
        self
    }

    pub fn license_type(mut self, license_type: &str) -> Self {
        self.record.license_type = Some(license_type.to_string());
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.record.status = Some(status.to_string());
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.record.expiry_date = Some(at.to_rfc3339());
        self
    }

    /// Expiry relative to the real clock.
    pub fn expires_in_days(self, days: i64) -> Self {
        self.expires_at(Utc::now() + Duration::days(days))
    }

    pub fn raw_expiry(mut self, raw: &str) -> Self {
        self.record.expiry_date = Some(raw.to_string());
        self
    }

    pub fn hosts(mut self, hosts: i64) -> Self {
        self.record.total_hosts = Some(hosts);
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.record.zabbix_version = Some(version.to_string());
        self
    }

    pub fn build(self) -> LicenseRecord {
        self.record
    }
}

/// Factory for test license records.
pub struct LicenseFixture;

impl LicenseFixture {
    /// Start a record for `client_id` with a unique license key.
    pub fn builder(client_id: &str) -> RecordBuilder {
        let n = NEXT_KEY.fetch_add(1, Ordering::Relaxed);
        RecordBuilder {
            record: LicenseRecord {
                license_key: Some(LicenseKey::new(format!("LIC-{:04}", n))),
                instance_id: Some(format!("inst-{:04}", n)),
                client_id: (!client_id.is_empty()).then(|| client_id.to_string()),
                status: Some("active".to_string()),
                ..Default::default()
            },
        }
    }

    /// Active record for one product.
    pub fn active(client_id: &str, product: &str, license_type: &str) -> LicenseRecord {
        Self::builder(client_id)
            .application(product)
            .license_type(license_type)
            .expires_in_days(365)
            .build()
    }

    /// Mixed listing: several clients, one expired license, one unknown product.
    pub fn sample_listing() -> Vec<LicenseRecord> {
        vec![
            Self::builder("globex")
                .key("LIC-G1")
                .client_email("it@globex.com")
                .application("VAPT")
                .license_type("perpetual")
                .expires_in_days(3650)
                .build(),
            Self::builder("acme")
                .key("LIC-A1")
                .document_id("65a1b2c3f0e1d2c3b4a59687")
                .client_email("ops@acme.io")
                .identiqa("Dana", "dana@identiqa.io")
                .application("NMS")
                .license_type("trial")
                .expires_in_days(-1)
                .version("6.4")
                .hosts(250)
                .build(),
            Self::builder("acme")
                .key("LIC-A2")
                .application("grafana")
                .license_type("paid")
                .expires_in_days(365)
                .build(),
            Self::builder("initech")
                .key("LIC-I1")
                .email("bill@initech.com")
                .product("Splunk")
                .license_type("paid")
                .expires_in_days(30)
                .build(),
        ]
    }
}
