//! Free-text and product filtering of client groups.

use crate::grouping::ClientGroup;
use licdash_core::LicenseRecord;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Which fields the free-text search looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchScope {
    /// Client ID and resolved email.
    #[default]
    ClientAndEmail,
    /// Client ID, resolved email, and each item's product and license type.
    ClientEmailAndItems,
}

/// Product restriction applied to the items of each group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProductFilter {
    #[default]
    All,
    /// Exact, case-sensitive product name.
    Exact(String),
}

impl ProductFilter {
    fn accepts(&self, record: &LicenseRecord) -> bool {
        match self {
            ProductFilter::All => true,
            ProductFilter::Exact(name) => record.product_name() == Some(name.as_str()),
        }
    }
}

impl FromStr for ProductFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == "all" {
            ProductFilter::All
        } else {
            ProductFilter::Exact(s.to_string())
        })
    }
}

impl fmt::Display for ProductFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductFilter::All => f.write_str("all"),
            ProductFilter::Exact(name) => f.write_str(name),
        }
    }
}

/// Per-view filter configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub search: String,
    pub scope: SearchScope,
    pub product: ProductFilter,
}

impl FilterOptions {
    pub fn new(search: impl Into<String>, scope: SearchScope, product: ProductFilter) -> Self {
        Self {
            search: search.into(),
            scope,
            product,
        }
    }
}

fn contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

fn matches_text(group: &ClientGroup<'_>, needle: &str, scope: SearchScope) -> bool {
    if needle.is_empty() {
        return true;
    }
    if contains(Some(group.client_id), needle) || contains(group.email, needle) {
        return true;
    }
    match scope {
        SearchScope::ClientAndEmail => false,
        SearchScope::ClientEmailAndItems => group.items.iter().any(|item| {
            contains(item.product_name(), needle) || contains(item.license_type.as_deref(), needle)
        }),
    }
}

/// Filter groups by search text and product.
///
/// Both criteria must hold. The product filter narrows each group's items and
/// drops groups left empty, so the result never holds an empty group. The
/// input is left untouched.
pub fn filter_groups<'a>(
    groups: &[ClientGroup<'a>],
    options: &FilterOptions,
) -> Vec<ClientGroup<'a>> {
    let needle = options.search.trim().to_lowercase();

    groups
        .iter()
        .filter(|group| matches_text(group, &needle, options.scope))
        .filter_map(|group| {
            let items: Vec<&'a LicenseRecord> = group
                .items
                .iter()
                .copied()
                .filter(|item| options.product.accepts(item))
                .collect();
            (!items.is_empty()).then(|| ClientGroup {
                client_id: group.client_id,
                email: group.email,
                items,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::{GroupingOptions, group_by_client};
    use pretty_assertions::assert_eq;

    fn record(client: &str, email: &str, product: &str, license_type: &str) -> LicenseRecord {
        LicenseRecord {
            client_id: Some(client.to_string()),
            client_email: Some(email.to_string()),
            application: Some(product.to_string()),
            license_type: Some(license_type.to_string()),
            ..Default::default()
        }
    }

    fn fixture() -> Vec<LicenseRecord> {
        vec![
            record("acme", "ops@acme.io", "NMS", "paid"),
            record("acme", "ops@acme.io", "grafana", "trial"),
            record("globex", "it@globex.com", "VAPT", "perpetual"),
            record("initech", "bill@initech.com", "NMS", "trial"),
        ]
    }

    fn ids(groups: &[ClientGroup<'_>]) -> Vec<String> {
        groups.iter().map(|g| g.client_id.to_string()).collect()
    }

    #[test]
    fn test_identity() {
        let records = fixture();
        let groups = group_by_client(&records, &GroupingOptions::table());
        let filtered = filter_groups(&groups, &FilterOptions::default());
        assert_eq!(filtered, groups);
    }

    #[test]
    fn test_search_client_and_email() {
        let records = fixture();
        let groups = group_by_client(&records, &GroupingOptions::table());

        let by_client = FilterOptions::new("GLOB", SearchScope::ClientAndEmail, ProductFilter::All);
        assert_eq!(ids(&filter_groups(&groups, &by_client)), vec!["globex"]);

        let by_email = FilterOptions::new("  bill@ ", SearchScope::ClientAndEmail, ProductFilter::All);
        assert_eq!(ids(&filter_groups(&groups, &by_email)), vec!["initech"]);
    }

    #[test]
    fn test_narrow_scope_ignores_items() {
        let records = fixture();
        let groups = group_by_client(&records, &GroupingOptions::table());

        let narrow = FilterOptions::new("vapt", SearchScope::ClientAndEmail, ProductFilter::All);
        assert!(filter_groups(&groups, &narrow).is_empty());

        let broad = FilterOptions::new("vapt", SearchScope::ClientEmailAndItems, ProductFilter::All);
        assert_eq!(ids(&filter_groups(&groups, &broad)), vec!["globex"]);
    }

    #[test]
    fn test_broad_scope_matches_license_type_and_keeps_items() {
        let records = fixture();
        let groups = group_by_client(&records, &GroupingOptions::cards());

        let options = FilterOptions::new("trial", SearchScope::ClientEmailAndItems, ProductFilter::All);
        let filtered = filter_groups(&groups, &options);
        assert_eq!(ids(&filtered), vec!["acme", "initech"]);
        // Text search selects groups, it does not narrow their items.
        assert_eq!(filtered[0].items.len(), 2);
    }

    #[test]
    fn test_product_filter_narrows_items() {
        let records = fixture();
        let groups = group_by_client(&records, &GroupingOptions::table());

        let options = FilterOptions::new("", SearchScope::ClientAndEmail, "NMS".parse().unwrap());
        let filtered = filter_groups(&groups, &options);
        assert_eq!(ids(&filtered), vec!["acme", "initech"]);
        assert_eq!(filtered[0].items.len(), 1);
        assert_eq!(filtered[0].items[0].product_name(), Some("NMS"));
    }

    #[test]
    fn test_product_filter_is_case_sensitive() {
        let records = fixture();
        let groups = group_by_client(&records, &GroupingOptions::table());

        let options = FilterOptions::new("", SearchScope::ClientAndEmail, "nms".parse().unwrap());
        assert!(filter_groups(&groups, &options).is_empty());
    }

    #[test]
    fn test_product_filter_falls_back_to_product_field() {
        let records = vec![LicenseRecord {
            client_id: Some("legacy".to_string()),
            product: Some("VAPT".to_string()),
            ..Default::default()
        }];
        let groups = group_by_client(&records, &GroupingOptions::table());

        let options = FilterOptions::new("", SearchScope::ClientAndEmail, "VAPT".parse().unwrap());
        assert_eq!(ids(&filter_groups(&groups, &options)), vec!["legacy"]);
    }

    #[test]
    fn test_no_match_returns_empty_sequence() {
        let records = fixture();
        let groups = group_by_client(&records, &GroupingOptions::table());

        let options = FilterOptions::new("", SearchScope::ClientAndEmail, "Splunk".parse().unwrap());
        assert!(filter_groups(&groups, &options).is_empty());
    }

    #[test]
    fn test_text_and_product_compose() {
        let records = fixture();
        let groups = group_by_client(&records, &GroupingOptions::table());

        let options = FilterOptions::new("acme", SearchScope::ClientAndEmail, "VAPT".parse().unwrap());
        assert!(filter_groups(&groups, &options).is_empty());

        let options = FilterOptions::new("acme", SearchScope::ClientAndEmail, "grafana".parse().unwrap());
        let filtered = filter_groups(&groups, &options);
        assert_eq!(ids(&filtered), vec!["acme"]);
        assert_eq!(filtered[0].items.len(), 1);
    }

    #[test]
    fn test_product_filter_sentinel() {
        assert_eq!("all".parse::<ProductFilter>().unwrap(), ProductFilter::All);
        assert_eq!(ProductFilter::All.to_string(), "all");
        assert_eq!(
            "grafana".parse::<ProductFilter>().unwrap(),
            ProductFilter::Exact("grafana".to_string())
        );
    }
}
