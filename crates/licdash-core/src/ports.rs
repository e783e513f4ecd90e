//! Port traits (hexagonal architecture).
//!
//! These traits define the interface between the views and the remote
//! license store.

use crate::ids::LicenseKey;
use crate::license::{CreatedLicense, LicensePatch, LicenseRecord, NewLicense};
use crate::Result;
use async_trait::async_trait;

/// Remote source of license records.
#[async_trait]
pub trait LicenseSource: Send + Sync {
    /// List every license record. Order is unspecified.
    async fn list_licenses(&self) -> Result<Vec<LicenseRecord>>;

    /// Create a license. Fails with a validation error when `clientId` is missing.
    async fn create_license(&self, license: &NewLicense) -> Result<CreatedLicense>;

    /// Apply a partial update.
    ///
    /// Returns the updated record when the API echoes one back; callers patch
    /// their local copy otherwise.
    async fn update_license(
        &self,
        key: &LicenseKey,
        patch: &LicensePatch,
    ) -> Result<Option<LicenseRecord>>;

    /// Delete a license.
    async fn delete_license(&self, key: &LicenseKey) -> Result<()>;

    /// Raw check result for a license key.
    async fn check_license(&self, key: &LicenseKey) -> Result<serde_json::Value>;
}
