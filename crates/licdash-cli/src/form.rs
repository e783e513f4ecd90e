//! Input handling for the create-license form.

use chrono::{DateTime, Duration, Months, Utc};
use licdash_core::{Error, LicenseType, NewLicense, Product, Result};
use licdash_engine::KnownClients;
use std::fmt;
use std::str::FromStr;

/// Strip control and zero-width characters, collapse whitespace and trim.
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}'))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lifetime of a new license.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryPeriod {
    ThirtyDays,
    Years(u8),
}

impl Default for ExpiryPeriod {
    fn default() -> Self {
        ExpiryPeriod::Years(1)
    }
}

impl ExpiryPeriod {
    pub const CHOICES: [ExpiryPeriod; 6] = [
        ExpiryPeriod::ThirtyDays,
        ExpiryPeriod::Years(1),
        ExpiryPeriod::Years(2),
        ExpiryPeriod::Years(3),
        ExpiryPeriod::Years(4),
        ExpiryPeriod::Years(5),
    ];

    fn years(&self) -> Option<u32> {
        match self {
            ExpiryPeriod::ThirtyDays => None,
            ExpiryPeriod::Years(n) => Some(u32::from(*n)),
        }
    }

    /// Expiry timestamp for a license created at `now`.
    ///
    /// Year periods land on the same calendar date; Feb 29 clamps to Feb 28.
    pub fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.years() {
            None => now + Duration::days(30),
            Some(years) => now
                .checked_add_months(Months::new(12 * years))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn label(&self) -> String {
        match self.years() {
            None => "30 days".to_string(),
            Some(1) => "1 year".to_string(),
            Some(n) => format!("{} years", n),
        }
    }
}

impl fmt::Display for ExpiryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.years() {
            None => f.write_str("30d"),
            Some(n) => write!(f, "{}y", n),
        }
    }
}

impl FromStr for ExpiryPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let period = match s.trim().to_lowercase().as_str() {
            "30d" => ExpiryPeriod::ThirtyDays,
            "1y" => ExpiryPeriod::Years(1),
            "2y" => ExpiryPeriod::Years(2),
            "3y" => ExpiryPeriod::Years(3),
            "4y" => ExpiryPeriod::Years(4),
            "5y" => ExpiryPeriod::Years(5),
            _ => {
                return Err(Error::validation(format!(
                    "Unknown period: {} (expected 30d or 1y to 5y)",
                    s
                )));
            }
        };
        Ok(period)
    }
}

/// Raw create-form values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateForm {
    pub client_id: String,
    pub client_email: String,
    pub identiqa_name: String,
    pub identiqa_email: String,
    pub period: ExpiryPeriod,
    pub product: Option<Product>,
    pub license_type: Option<LicenseType>,
}

impl CreateForm {
    /// Fill an empty client email from the first known record of that client.
    pub fn autofill_email(&mut self, known: &KnownClients) {
        if !normalize(&self.client_email).is_empty() {
            return;
        }
        let client_id = normalize(&self.client_id);
        let client_id = known.canonical_id(&client_id).unwrap_or(&client_id);
        if let Some(email) = known.email_for(client_id) {
            self.client_email = email.to_string();
        }
    }

    /// Validate and build the create payload.
    ///
    /// The client ID snaps to an existing ID that differs only in case.
    pub fn build(&self, known: &KnownClients, now: DateTime<Utc>) -> Result<NewLicense> {
        let mut client_id = normalize(&self.client_id);
        if let Some(canonical) = known.canonical_id(&client_id) {
            client_id = canonical.to_string();
        }
        if client_id.is_empty() {
            return Err(Error::validation("Client ID is required"));
        }

        let client_email = normalize(&self.client_email);
        let license = NewLicense {
            client_id,
            expiry_date: self.period.expiry_from(now),
            email: client_email.clone(),
            application: self.product.unwrap_or(Product::Nms),
            license_type: self.license_type.unwrap_or(LicenseType::Trial),
            client_email,
            identiqa_name: normalize(&self.identiqa_name),
            identiqa_email: normalize(&self.identiqa_email),
        };
        license.validate()?;
        Ok(license)
    }
}
