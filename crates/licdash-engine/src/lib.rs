//! Aggregation engine for licdash.
//!
//! Pure, synchronous transformations over a snapshot of license records:
//! grouping by client, text/product filtering, statistics and derived display
//! fields. Every view configures the same functions instead of carrying its
//! own copy of the logic.

pub mod clients;
pub mod display;
pub mod filter;
pub mod grouping;
pub mod stats;

pub use clients::{KnownClient, KnownClients, distinct_client_count};
pub use display::{
    ExpiryState, creation_date, display_creation_date, display_expiry, display_hosts,
    display_version, expiry_state,
};
pub use filter::{FilterOptions, ProductFilter, SearchScope, filter_groups};
pub use grouping::{ClientGroup, GroupOrder, GroupingOptions, group_by_client};
pub use stats::{
    LicenseTypeStats, ProductCounts, SummaryStats, TypeRow, compute_license_type_stats,
    compute_summary_stats,
};
