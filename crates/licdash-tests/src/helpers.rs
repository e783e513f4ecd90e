//! Test helper functions and utilities.

use async_trait::async_trait;
use licdash_client::{ApiConfig, LicenseApiClient};
use licdash_core::ports::LicenseSource;
use licdash_core::{
    CreatedLicense, Error, LicenseKey, LicensePatch, LicenseRecord, NewLicense, Result,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use wiremock::MockServer;

/// In-memory license source with failure injection.
#[derive(Default)]
pub struct MemorySource {
    records: Mutex<Vec<LicenseRecord>>,
    fail_fetch: AtomicBool,
    stall_fetch: AtomicBool,
    fail_update: AtomicBool,
    echo_updates: AtomicBool,
    list_calls: AtomicUsize,
    created: AtomicUsize,
}

impl MemorySource {
    pub fn new(records: Vec<LicenseRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    /// Make every subsequent listing fail.
    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent listing hang forever.
    pub fn stall_fetches(&self, stall: bool) {
        self.stall_fetch.store(stall, Ordering::SeqCst);
    }

    /// Make every subsequent update fail.
    pub fn fail_updates(&self, fail: bool) {
        self.fail_update.store(fail, Ordering::SeqCst);
    }

    /// Return the updated record from `update_license` instead of `None`.
    pub fn echo_updates(&self, echo: bool) {
        self.echo_updates.store(echo, Ordering::SeqCst);
    }

    /// Replace the server-side records, as another admin would.
    pub fn replace(&self, records: Vec<LicenseRecord>) {
        *self.records.lock().expect("records lock") = records;
    }

    pub fn snapshot(&self) -> Vec<LicenseRecord> {
        self.records.lock().expect("records lock").clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LicenseSource for MemorySource {
    async fn list_licenses(&self) -> Result<Vec<LicenseRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.stall_fetch.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(Error::Fetch("connection refused".to_string()));
        }
        Ok(self.snapshot())
    }

    async fn create_license(&self, license: &NewLicense) -> Result<CreatedLicense> {
        license.validate()?;
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        let created = CreatedLicense {
            license_key: LicenseKey::new(format!("NEW-{:04}", n)),
            instance_id: Some(format!("inst-new-{:04}", n)),
        };

        let record = LicenseRecord {
            license_key: Some(created.license_key.clone()),
            instance_id: created.instance_id.clone(),
            client_id: Some(license.client_id.clone()),
            client_email: Some(license.client_email.clone()),
            email: Some(license.email.clone()),
            identiqa_name: Some(license.identiqa_name.clone()),
            identiqa_email: Some(license.identiqa_email.clone()),
            application: Some(license.application.as_str().to_string()),
            license_type: Some(license.license_type.as_str().to_string()),
            status: Some("active".to_string()),
            expiry_date: Some(license.expiry_date.to_rfc3339()),
            ..Default::default()
        };
        self.records.lock().expect("records lock").push(record);
        Ok(created)
    }

    async fn update_license(
        &self,
        key: &LicenseKey,
        patch: &LicensePatch,
    ) -> Result<Option<LicenseRecord>> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(Error::Update("internal server error".to_string()));
        }
        let mut records = self.records.lock().expect("records lock");
        let record = records
            .iter_mut()
            .find(|r| r.license_key.as_ref() == Some(key))
            .ok_or_else(|| Error::LicenseNotFound(key.to_string()))?;
        patch.apply_to(record);

        Ok(self
            .echo_updates
            .load(Ordering::SeqCst)
            .then(|| record.clone()))
    }

    async fn delete_license(&self, key: &LicenseKey) -> Result<()> {
        let mut records = self.records.lock().expect("records lock");
        let before = records.len();
        records.retain(|r| r.license_key.as_ref() != Some(key));
        if records.len() == before {
            return Err(Error::LicenseNotFound(key.to_string()));
        }
        Ok(())
    }

    async fn check_license(&self, key: &LicenseKey) -> Result<serde_json::Value> {
        let records = self.records.lock().expect("records lock");
        let record = records
            .iter()
            .find(|r| r.license_key.as_ref() == Some(key))
            .ok_or_else(|| Error::LicenseNotFound(key.to_string()))?;
        Ok(serde_json::json!({
            "valid": !record.is_expired(chrono::Utc::now()),
            "licenseKey": key,
        }))
    }
}

/// Base URL of the license API mounted on a mock server.
pub fn api_base(server: &MockServer) -> String {
    format!("{}/backend_api", server.uri())
}

/// API client pointed at a mock server, with a short timeout.
pub fn mock_api_client(server: &MockServer) -> LicenseApiClient {
    let config = ApiConfig::new(api_base(server)).with_timeout(Duration::from_secs(5));
    LicenseApiClient::new(config).expect("Failed to create API client")
}
