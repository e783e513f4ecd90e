//! Grouping license records by client.

use licdash_core::timestamp::SENTINEL;
use licdash_core::{EmailField, LicenseRecord};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// All license records sharing one client identifier.
///
/// Groups borrow from the record snapshot they were built from and are
/// rebuilt on every aggregation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientGroup<'a> {
    /// Client ID, or the sentinel for records without one.
    pub client_id: &'a str,
    /// Best-effort contact email.
    pub email: Option<&'a str>,
    /// Records of this client in source order.
    pub items: Vec<&'a LicenseRecord>,
}

impl<'a> ClientGroup<'a> {
    fn new(client_id: &'a str) -> Self {
        Self {
            client_id,
            email: None,
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn email_or_sentinel(&self) -> &'a str {
        self.email.unwrap_or(SENTINEL)
    }
}

/// Order of the groups returned by [`group_by_client`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupOrder {
    /// Alphabetical by client ID, ignoring case.
    #[default]
    ClientId,
    /// Order in which each client first appears in the input.
    Insertion,
}

/// Per-view grouping configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingOptions {
    pub order: GroupOrder,
    /// Fields consulted, in order, when resolving a group's email.
    pub email_precedence: Vec<EmailField>,
}

impl GroupingOptions {
    /// License table: alphabetical, client contact emails only.
    pub fn table() -> Self {
        Self {
            order: GroupOrder::ClientId,
            email_precedence: vec![EmailField::ClientEmail, EmailField::Email],
        }
    }

    /// Overview cards: source order, identiqa contact preferred.
    pub fn cards() -> Self {
        Self {
            order: GroupOrder::Insertion,
            email_precedence: vec![
                EmailField::IdentiqaEmail,
                EmailField::ClientEmail,
                EmailField::Email,
            ],
        }
    }

    fn resolve_email<'a>(&self, record: &'a LicenseRecord) -> Option<&'a str> {
        self.email_precedence
            .iter()
            .find_map(|field| record.email_field(*field))
    }
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self::table()
    }
}

/// Group records by client.
///
/// Every record lands in exactly one group. A group's email is seeded from the
/// first record that has one and is never overwritten afterwards.
pub fn group_by_client<'a>(
    records: &'a [LicenseRecord],
    options: &GroupingOptions,
) -> Vec<ClientGroup<'a>> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<ClientGroup<'a>> = Vec::new();

    for record in records {
        let key = record.client_key();
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(ClientGroup::new(key));
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.items.push(record);
        if group.email.is_none() {
            group.email = options.resolve_email(record);
        }
    }

    if options.order == GroupOrder::ClientId {
        groups.sort_by(|a, b| {
            a.client_id
                .to_lowercase()
                .cmp(&b.client_id.to_lowercase())
                .then_with(|| a.client_id.cmp(b.client_id))
        });
    }

    debug!(
        records = records.len(),
        groups = groups.len(),
        "Grouped licenses by client"
    );
    groups
}
