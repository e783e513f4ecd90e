//! License record model.

use crate::ids::{DocumentId, LicenseKey};
use crate::lenient;
use crate::timestamp::{self, SENTINEL};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single license as returned by the license API.
///
/// Every field is optional on the wire. Fields with an unexpected JSON type
/// decode as absent and unknown fields are kept in `extra`, so a malformed
/// record never fails a whole listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRecord {
    #[serde(
        rename = "_id",
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<DocumentId>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub license_key: Option<LicenseKey>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub client_email: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub identiqa_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub identiqa_email: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub license_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_integer", skip_serializing_if = "Option::is_none")]
    pub total_hosts: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub zabbix_version: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(
        rename = "NMSVersion",
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub nms_version: Option<String>,
    /// Fields this model does not know about.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl LicenseRecord {
    /// Grouping key: the client ID, or the sentinel when missing or empty.
    pub fn client_key(&self) -> &str {
        non_empty(&self.client_id).unwrap_or(SENTINEL)
    }

    /// Effective product name: `application`, falling back to `product`.
    pub fn product_name(&self) -> Option<&str> {
        non_empty(&self.application).or_else(|| non_empty(&self.product))
    }

    /// Recognized product, matched case-insensitively.
    pub fn product(&self) -> Option<Product> {
        self.product_name().and_then(Product::recognize)
    }

    /// Raw license type, defaulting to `trial` when absent.
    pub fn license_type_name(&self) -> &str {
        non_empty(&self.license_type).unwrap_or(LicenseType::Trial.as_str())
    }

    /// Recognized license type; `None` for unrecognized values.
    pub fn license_type(&self) -> Option<LicenseType> {
        LicenseType::recognize(self.license_type_name())
    }

    pub fn status(&self) -> Option<LicenseStatus> {
        non_empty(&self.status).and_then(LicenseStatus::recognize)
    }

    /// Parsed expiry date; `None` when missing or not parseable.
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry_date.as_deref().and_then(timestamp::parse_timestamp)
    }

    /// Parsed `createdAt`; `None` when missing or not parseable.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(timestamp::parse_timestamp)
    }

    /// First non-empty version string.
    pub fn version_label(&self) -> Option<&str> {
        non_empty(&self.zabbix_version)
            .or_else(|| non_empty(&self.version))
            .or_else(|| non_empty(&self.nms_version))
    }

    /// Value of one of the contact email fields, if non-empty.
    pub fn email_field(&self, field: EmailField) -> Option<&str> {
        match field {
            EmailField::IdentiqaEmail => non_empty(&self.identiqa_email),
            EmailField::ClientEmail => non_empty(&self.client_email),
            EmailField::Email => non_empty(&self.email),
        }
    }

    /// Effective expiry: past `expiryDate`, or an `expired`/`inactive` status.
    ///
    /// A missing or unparseable expiry date is never evidence of expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let past_expiry = self.expiry().is_some_and(|expiry| expiry < now);
        let closed = matches!(
            self.status(),
            Some(LicenseStatus::Expired | LicenseStatus::Inactive)
        );
        past_expiry || closed
    }
}

/// Contact email fields a client group can take its email from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmailField {
    IdentiqaEmail,
    ClientEmail,
    Email,
}

/// Products the dashboard knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Product {
    #[serde(rename = "NMS")]
    Nms,
    #[serde(rename = "grafana")]
    Grafana,
    #[serde(rename = "VAPT")]
    Vapt,
}

impl Product {
    pub const ALL: [Product; 3] = [Product::Nms, Product::Grafana, Product::Vapt];

    /// Canonical spelling used by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Product::Nms => "NMS",
            Product::Grafana => "grafana",
            Product::Vapt => "VAPT",
        }
    }

    /// Case-insensitive match against the known product names.
    pub fn recognize(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Product {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::recognize(s).ok_or_else(|| Error::validation(format!("Unknown product: {}", s)))
    }
}

/// License types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseType {
    Trial,
    Paid,
    Perpetual,
}

impl LicenseType {
    pub const ALL: [LicenseType; 3] = [LicenseType::Trial, LicenseType::Paid, LicenseType::Perpetual];

    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseType::Trial => "trial",
            LicenseType::Paid => "paid",
            LicenseType::Perpetual => "perpetual",
        }
    }

    pub fn recognize(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for LicenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::recognize(s).ok_or_else(|| Error::validation(format!("Unknown license type: {}", s)))
    }
}

/// License status as stored by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    Active,
    Inactive,
    Expired,
}

impl LicenseStatus {
    pub const ALL: [LicenseStatus; 3] = [
        LicenseStatus::Active,
        LicenseStatus::Inactive,
        LicenseStatus::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseStatus::Active => "active",
            LicenseStatus::Inactive => "inactive",
            LicenseStatus::Expired => "expired",
        }
    }

    pub fn recognize(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::recognize(s).ok_or_else(|| Error::validation(format!("Unknown status: {}", s)))
    }
}

/// Partial update sent to the API and applied to the local snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicensePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LicenseStatus>,
    /// Expiry as `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_type: Option<LicenseType>,
}

impl LicensePatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.expiry_date.is_none() && self.license_type.is_none()
    }

    /// Reject patches the API would store as garbage.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::validation("Nothing to update"));
        }
        if let Some(expiry) = &self.expiry_date
            && timestamp::parse_timestamp(expiry).is_none()
        {
            return Err(Error::validation(format!("Invalid expiry date: {}", expiry)));
        }
        Ok(())
    }

    /// Patch a local record in place.
    pub fn apply_to(&self, record: &mut LicenseRecord) {
        if let Some(status) = self.status {
            record.status = Some(status.as_str().to_string());
        }
        if let Some(expiry) = &self.expiry_date {
            record.expiry_date = Some(expiry.clone());
        }
        if let Some(license_type) = self.license_type {
            record.license_type = Some(license_type.as_str().to_string());
        }
    }
}

/// Payload for creating a license.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLicense {
    pub client_id: String,
    pub expiry_date: DateTime<Utc>,
    pub email: String,
    pub application: Product,
    pub license_type: LicenseType,
    pub client_email: String,
    pub identiqa_name: String,
    pub identiqa_email: String,
}

impl NewLicense {
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::validation("Client ID is required"));
        }
        Ok(())
    }
}

/// Identifiers returned for a newly created license.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedLicense {
    pub license_key: LicenseKey,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub instance_id: Option<String>,
}
