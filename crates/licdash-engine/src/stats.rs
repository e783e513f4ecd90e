//! License statistics.
//!
//! Both statistics normalize products the same way: the effective product name
//! is matched case-insensitively against the known products. Records whose
//! product or license type is not recognized are left out of the per-product
//! counters.

use chrono::{DateTime, Utc};
use licdash_core::{LicenseRecord, LicenseType, Product};
use serde::Serialize;
use tracing::debug;

/// One counter per known product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProductCounts {
    #[serde(rename = "NMS")]
    pub nms: usize,
    pub grafana: usize,
    #[serde(rename = "VAPT")]
    pub vapt: usize,
}

impl ProductCounts {
    pub fn get(&self, product: Product) -> usize {
        match product {
            Product::Nms => self.nms,
            Product::Grafana => self.grafana,
            Product::Vapt => self.vapt,
        }
    }

    fn increment(&mut self, product: Product) {
        match product {
            Product::Nms => self.nms += 1,
            Product::Grafana => self.grafana += 1,
            Product::Vapt => self.vapt += 1,
        }
    }

    pub fn sum(&self) -> usize {
        self.nms + self.grafana + self.vapt
    }
}

/// Per-product counts for one license type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeRow {
    #[serde(flatten)]
    pub counts: ProductCounts,
    pub total: usize,
}

/// License type x product cross-tabulation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LicenseTypeStats {
    pub trial: TypeRow,
    pub paid: TypeRow,
    pub perpetual: TypeRow,
    /// Records with an unrecognized license type or product.
    pub excluded: usize,
}

impl LicenseTypeStats {
    pub fn row(&self, license_type: LicenseType) -> &TypeRow {
        match license_type {
            LicenseType::Trial => &self.trial,
            LicenseType::Paid => &self.paid,
            LicenseType::Perpetual => &self.perpetual,
        }
    }

    fn row_mut(&mut self, license_type: LicenseType) -> &mut TypeRow {
        match license_type {
            LicenseType::Trial => &mut self.trial,
            LicenseType::Paid => &mut self.paid,
            LicenseType::Perpetual => &mut self.perpetual,
        }
    }

    /// Rows in display order.
    pub fn rows(&self) -> impl Iterator<Item = (LicenseType, &TypeRow)> {
        LicenseType::ALL.into_iter().map(|t| (t, self.row(t)))
    }

    /// Sum of every cell in the matrix.
    pub fn grand_total(&self) -> usize {
        self.rows().map(|(_, row)| row.total).sum()
    }
}

/// Cross-tabulate records by license type and product.
///
/// Each recognized record increments exactly one cell and its row total.
pub fn compute_license_type_stats(records: &[LicenseRecord]) -> LicenseTypeStats {
    let mut stats = LicenseTypeStats::default();

    for record in records {
        match (record.license_type(), record.product()) {
            (Some(license_type), Some(product)) => {
                let row = stats.row_mut(license_type);
                row.counts.increment(product);
                row.total += 1;
            }
            _ => stats.excluded += 1,
        }
    }

    if stats.excluded > 0 {
        debug!(
            excluded = stats.excluded,
            "Records left out of the license type matrix"
        );
    }
    stats
}

/// Totals for the overview box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total: usize,
    pub active: usize,
    pub expired: usize,
    pub active_by_product: ProductCounts,
}

/// Count active and expired licenses as of `now`.
pub fn compute_summary_stats(records: &[LicenseRecord], now: DateTime<Utc>) -> SummaryStats {
    let mut stats = SummaryStats {
        total: records.len(),
        ..Default::default()
    };

    for record in records {
        if record.is_expired(now) {
            stats.expired += 1;
        } else {
            stats.active += 1;
            if let Some(product) = record.product() {
                stats.active_by_product.increment(product);
            }
        }
    }

    stats
}
