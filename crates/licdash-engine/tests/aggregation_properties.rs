//! Property-based tests for grouping, filtering and statistics.

use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use licdash_core::LicenseRecord;
use licdash_engine::*;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_opt(values: &'static [&'static str]) -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(values).prop_map(str::to_string))
}

/// Records drawn from small value pools so groups actually collide.
fn arb_record() -> impl Strategy<Value = LicenseRecord> {
    (
        arb_opt(&["acme", "globex", "Initech", "", "umbrella"]),
        arb_opt(&["", "ops@acme.io", "it@globex.com"]),
        arb_opt(&["", "billing@acme.io"]),
        arb_opt(&["", "owner@identiqa.io"]),
        arb_opt(&["NMS", "grafana", "VAPT", "nms", "Splunk", ""]),
        arb_opt(&["NMS", "grafana", "VAPT"]),
        arb_opt(&["trial", "paid", "perpetual", "PAID", "enterprise", ""]),
        arb_opt(&["active", "inactive", "expired", "unknown"]),
        arb_opt(&["2020-01-01", "2099-12-31", "garbage", "2025-06-01T00:00:00Z"]),
    )
        .prop_map(
            |(client_id, client_email, email, identiqa_email, application, product, license_type, status, expiry_date)| {
                LicenseRecord {
                    client_id,
                    client_email,
                    email,
                    identiqa_email,
                    application,
                    product,
                    license_type,
                    status,
                    expiry_date,
                    ..Default::default()
                }
            },
        )
}

fn arb_records() -> impl Strategy<Value = Vec<LicenseRecord>> {
    prop::collection::vec(arb_record(), 0..40)
}

fn arb_grouping() -> impl Strategy<Value = GroupingOptions> {
    prop_oneof![Just(GroupingOptions::table()), Just(GroupingOptions::cards())]
}

fn addresses(records: &[&LicenseRecord]) -> Vec<usize> {
    let mut addrs: Vec<usize> = records
        .iter()
        .map(|r| *r as *const LicenseRecord as usize)
        .collect();
    addrs.sort_unstable();
    addrs
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn grouping_partitions_input(records in arb_records(), options in arb_grouping()) {
        let groups = group_by_client(&records, &options);

        let grouped: Vec<&LicenseRecord> = groups.iter().flat_map(|g| g.items.iter().copied()).collect();
        let all: Vec<&LicenseRecord> = records.iter().collect();
        prop_assert_eq!(addresses(&grouped), addresses(&all));

        for group in &groups {
            prop_assert!(!group.items.is_empty());
            for item in &group.items {
                prop_assert_eq!(item.client_key(), group.client_id);
            }
        }

        let mut seen = HashMap::new();
        for group in &groups {
            prop_assert!(seen.insert(group.client_id, ()).is_none(), "duplicate group key");
        }
    }

    #[test]
    fn grouping_keeps_source_order_within_groups(records in arb_records()) {
        let groups = group_by_client(&records, &GroupingOptions::table());
        for group in &groups {
            let expected: Vec<&LicenseRecord> = records
                .iter()
                .filter(|r| r.client_key() == group.client_id)
                .collect();
            prop_assert_eq!(addresses(&group.items), addresses(&expected));
            let positions: Vec<usize> = group
                .items
                .iter()
                .map(|item| records.iter().position(|r| std::ptr::eq(r, *item)).unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn grouping_is_deterministic(records in arb_records(), options in arb_grouping()) {
        prop_assert_eq!(group_by_client(&records, &options), group_by_client(&records, &options));
    }

    #[test]
    fn empty_filter_is_identity(records in arb_records(), options in arb_grouping()) {
        let groups = group_by_client(&records, &options);
        let filtered = filter_groups(&groups, &FilterOptions::default());
        prop_assert_eq!(filtered, groups);
    }

    #[test]
    fn filter_never_yields_empty_groups(
        records in arb_records(),
        search in prop::sample::select(vec!["", "acme", "NMS", "trial", "zzz"]),
        product in prop::sample::select(vec!["all", "NMS", "grafana", "VAPT", "Splunk", "none"]),
        broad in any::<bool>(),
    ) {
        let groups = group_by_client(&records, &GroupingOptions::cards());
        let scope = if broad { SearchScope::ClientEmailAndItems } else { SearchScope::ClientAndEmail };
        let options = FilterOptions::new(search, scope, product.parse().unwrap());
        let filtered = filter_groups(&groups, &options);

        prop_assert!(filtered.iter().all(|g| !g.items.is_empty()));
        prop_assert!(filtered.len() <= groups.len());
        if product == "none" {
            prop_assert!(filtered.is_empty());
        }
    }

    #[test]
    fn matrix_rows_are_consistent(records in arb_records()) {
        let stats = compute_license_type_stats(&records);
        for (_, row) in stats.rows() {
            prop_assert_eq!(row.total, row.counts.sum());
        }
        prop_assert!(stats.grand_total() <= records.len());
        prop_assert_eq!(stats.grand_total() + stats.excluded, records.len());
    }

    #[test]
    fn summary_splits_every_record(records in arb_records()) {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let stats = compute_summary_stats(&records, now);
        prop_assert_eq!(stats.total, records.len());
        prop_assert_eq!(stats.active + stats.expired, stats.total);
        prop_assert!(stats.active_by_product.sum() <= stats.active);
    }
}
