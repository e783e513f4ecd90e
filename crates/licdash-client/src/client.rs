//! License API client.

use crate::config::ApiConfig;
use async_trait::async_trait;
use licdash_core::ports::LicenseSource;
use licdash_core::{
    CreatedLicense, Error, LicenseKey, LicensePatch, LicenseRecord, NewLicense, Result,
};
use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

/// Client for the flat license REST API.
pub struct LicenseApiClient {
    base_url: Url,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WrappedLicense {
    license: LicenseRecord,
}

impl LicenseApiClient {
    /// Create a client; fails when the base URL is not usable.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("Invalid API URL {}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "API URL cannot be used as a base: {}",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> reqwest::RequestBuilder {
        let url = self.endpoint(segments);
        debug!(method = %method, url = %url, "API request");
        self.client.request(method, url)
    }

    /// Best-effort error message from a failed response.
    async fn error_message(response: Response) -> String {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message.or(body.error))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status.to_string())
    }

    async fn api_error(response: Response) -> Error {
        let status = response.status().as_u16();
        let message = Self::error_message(response).await;
        Error::Api { status, message }
    }
}

/// Decode a listing, skipping entries that are not records.
fn decode_listing(body: serde_json::Value) -> Result<Vec<LicenseRecord>> {
    let entries = match body {
        serde_json::Value::Null => return Ok(Vec::new()),
        serde_json::Value::Array(entries) => entries,
        other => {
            return Err(Error::Fetch(format!(
                "expected a list of licenses, got {}",
                json_kind(&other)
            )));
        }
    };

    let total = entries.len();
    let records: Vec<LicenseRecord> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();

    if records.len() < total {
        warn!(
            skipped = total - records.len(),
            "Skipped listing entries that are not license records"
        );
    }
    Ok(records)
}

/// Pull an updated record out of an update response, if it carries one.
fn decode_updated(body: &str) -> Option<LicenseRecord> {
    serde_json::from_str::<LicenseRecord>(body)
        .ok()
        .filter(|r| r.license_key.is_some())
        .or_else(|| {
            serde_json::from_str::<WrappedLicense>(body)
                .ok()
                .map(|w| w.license)
                .filter(|r| r.license_key.is_some())
        })
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[async_trait]
impl LicenseSource for LicenseApiClient {
    async fn list_licenses(&self) -> Result<Vec<LicenseRecord>> {
        let response = self
            .request(Method::GET, &["all-licenses"])
            .send()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(status = %status, "License listing failed");
            return Err(Error::Fetch(Self::error_message(response).await));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;
        let records = decode_listing(body)?;

        info!(count = records.len(), "Fetched licenses");
        Ok(records)
    }

    async fn create_license(&self, license: &NewLicense) -> Result<CreatedLicense> {
        license.validate()?;

        let response = self
            .request(Method::POST, &["generate-license"])
            .json(license)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let created: CreatedLicense = response
                    .json()
                    .await
                    .map_err(|e| Error::Serialization(e.to_string()))?;
                info!(
                    license_key = %created.license_key,
                    client_id = %license.client_id,
                    "License created"
                );
                Ok(created)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(Error::Validation(Self::error_message(response).await))
            }
            _ => Err(Self::api_error(response).await),
        }
    }

    async fn update_license(
        &self,
        key: &LicenseKey,
        patch: &LicensePatch,
    ) -> Result<Option<LicenseRecord>> {
        let response = self
            .request(Method::PUT, &["update-license", key.as_str()])
            .json(patch)
            .send()
            .await
            .map_err(|e| Error::Update(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                info!(license_key = %key, "License updated");
                Ok(decode_updated(&body))
            }
            StatusCode::NOT_FOUND => Err(Error::LicenseNotFound(key.to_string())),
            status => {
                warn!(license_key = %key, status = %status, "License update failed");
                Err(Error::Update(Self::error_message(response).await))
            }
        }
    }

    async fn delete_license(&self, key: &LicenseKey) -> Result<()> {
        let response = self
            .request(Method::DELETE, &["delete-license", key.as_str()])
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                info!(license_key = %key, "License deleted");
                Ok(())
            }
            StatusCode::NOT_FOUND => Err(Error::LicenseNotFound(key.to_string())),
            _ => Err(Self::api_error(response).await),
        }
    }

    async fn check_license(&self, key: &LicenseKey) -> Result<serde_json::Value> {
        let response = self
            .request(Method::GET, &["check-license", key.as_str()])
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let text = response.text().await.map_err(|e| Error::Network(e.to_string()))?;
                if text.trim().is_empty() {
                    return Ok(serde_json::Value::Null);
                }
                Ok(serde_json::from_str(&text)?)
            }
            StatusCode::NOT_FOUND => Err(Error::LicenseNotFound(key.to_string())),
            _ => Err(Self::api_error(response).await),
        }
    }
}
