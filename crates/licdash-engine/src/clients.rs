//! Client directory projections used by the table caption and the create form.

use licdash_core::LicenseRecord;
use std::collections::{BTreeSet, HashSet};

/// Number of distinct raw client IDs, counting "no client ID" once.
pub fn distinct_client_count(records: &[LicenseRecord]) -> usize {
    records
        .iter()
        .map(|record| record.client_id.as_deref())
        .collect::<HashSet<_>>()
        .len()
}

/// A client seen in the current listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownClient {
    pub client_id: String,
    pub email: String,
}

/// Clients already present in the listing, for form suggestions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownClients {
    /// One entry per record with a client ID, in source order.
    pub clients: Vec<KnownClient>,
    /// Sorted, de-duplicated client IDs.
    pub ids: Vec<String>,
}

impl KnownClients {
    pub fn from_records(records: &[LicenseRecord]) -> Self {
        let clients: Vec<KnownClient> = records
            .iter()
            .filter_map(|record| {
                let client_id = record.client_id.as_deref().filter(|id| !id.is_empty())?;
                let email = record
                    .client_email
                    .as_deref()
                    .filter(|e| !e.is_empty())
                    .or(record.email.as_deref())
                    .unwrap_or_default();
                Some(KnownClient {
                    client_id: client_id.trim().to_string(),
                    email: email.trim().to_string(),
                })
            })
            .collect();

        let ids = clients
            .iter()
            .map(|c| c.client_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self { clients, ids }
    }

    /// Known ID matching `client_id` case-insensitively.
    pub fn canonical_id(&self, client_id: &str) -> Option<&str> {
        let wanted = client_id.to_lowercase();
        self.ids
            .iter()
            .find(|id| id.to_lowercase() == wanted)
            .map(String::as_str)
    }

    /// Email of the first record whose client ID matches exactly.
    pub fn email_for(&self, client_id: &str) -> Option<&str> {
        self.clients
            .iter()
            .find(|c| c.client_id == client_id)
            .map(|c| c.email.as_str())
    }
}
