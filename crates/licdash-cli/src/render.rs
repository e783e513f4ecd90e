//! Terminal rendering of dashboard views.

use crate::config::OutputFormat;
use anyhow::Result;
use chrono::{DateTime, Utc};
use console::style;
use licdash_core::timestamp::SENTINEL;
use licdash_core::{LicenseRecord, LicenseType, Product};
use licdash_engine::{
    ClientGroup, ExpiryState, LicenseTypeStats, SummaryStats, display_creation_date,
    display_expiry, display_hosts, display_version, expiry_state,
};
use serde::Serialize;
use std::fmt::Write;

/// Serialize a view for the structured output formats.
///
/// Returns `None` for the table format.
pub fn structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<Option<String>> {
    Ok(match format {
        OutputFormat::Table => None,
        OutputFormat::Json => Some(serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => Some(serde_yaml::to_string(value)?),
    })
}

fn product_label(record: &LicenseRecord) -> String {
    let name = record.product_name().unwrap_or(SENTINEL);
    match record.product() {
        Some(Product::Nms) => style(name).blue().to_string(),
        Some(Product::Grafana) => style(name).yellow().to_string(),
        Some(Product::Vapt) => style(name).green().to_string(),
        None => name.to_string(),
    }
}

fn expiry_label(record: &LicenseRecord, now: DateTime<Utc>) -> String {
    let date = display_expiry(record);
    match expiry_state(record, now) {
        ExpiryState::Active => date,
        ExpiryState::Expired => style(date).red().to_string(),
    }
}

/// One line per license inside an expanded group or card.
fn item_line(out: &mut String, record: &LicenseRecord, now: DateTime<Utc>) {
    let _ = writeln!(
        out,
        "      {}  {}  expiry {}  version {}  hosts {}  {}",
        product_label(record),
        record.license_type.as_deref().unwrap_or(SENTINEL),
        expiry_label(record, now),
        display_version(record),
        display_hosts(record),
        style(record.license_key.as_ref().map_or(SENTINEL, |k| k.as_str())).dim()
    );
}

/// Client table with an optional per-client license breakdown.
pub fn client_table(
    groups: &[ClientGroup<'_>],
    total_clients: usize,
    expand: bool,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        style(format!("Showing {} of {} clients", groups.len(), total_clients)).dim()
    );

    if groups.is_empty() {
        let _ = writeln!(out, "{} No matching clients", style("i").blue());
        return out;
    }

    let id_width = groups
        .iter()
        .map(|g| g.client_id.chars().count())
        .chain(std::iter::once("Client ID".len()))
        .max()
        .unwrap_or_default();
    let email_width = groups
        .iter()
        .map(|g| g.email_or_sentinel().chars().count())
        .chain(std::iter::once("Client Email".len()))
        .max()
        .unwrap_or_default();

    let _ = writeln!(
        out,
        "{}",
        style(format!(
            "{:>4}  {:<id_width$}  {:<email_width$}  {}",
            "#", "Client ID", "Client Email", "Licenses Used"
        ))
        .bold()
    );

    for (idx, group) in groups.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>4}  {:<id_width$}  {:<email_width$}  {}",
            idx + 1,
            group.client_id,
            group.email_or_sentinel(),
            group.len()
        );
        if expand {
            for record in &group.items {
                item_line(&mut out, record, now);
            }
        }
    }
    out
}

/// Card-style client overview.
pub fn client_cards(groups: &[ClientGroup<'_>], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    if groups.is_empty() {
        let _ = writeln!(out, "{} No matching clients", style("i").blue());
        return out;
    }

    for group in groups {
        let _ = writeln!(out, "{}", style(group.client_id).bold());
        let _ = writeln!(out, "  {}", style(group.email_or_sentinel()).dim());
        let _ = writeln!(out, "  Licenses Used: {}", group.len());
        for record in &group.items {
            item_line(&mut out, record, now);
        }
        out.push('\n');
    }
    out
}

/// License type x product matrix.
pub fn type_matrix(stats: &LicenseTypeStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style("License Summary").bold());
    let _ = writeln!(
        out,
        "  {:<10} {:>6} {:>8} {:>6} {:>6}",
        "", "NMS", "grafana", "VAPT", "total"
    );
    for (license_type, row) in stats.rows() {
        let label = match license_type {
            LicenseType::Trial => style("Trial").yellow(),
            LicenseType::Paid => style("Paid").green(),
            LicenseType::Perpetual => style("Perpetual").blue(),
        };
        let _ = writeln!(
            out,
            "  {:<10} {:>6} {:>8} {:>6} {:>6}",
            label,
            row.counts.nms,
            row.counts.grafana,
            row.counts.vapt,
            row.total
        );
    }
    if stats.excluded > 0 {
        let _ = writeln!(
            out,
            "  {} {} with an unknown type or product not counted",
            style("!").yellow(),
            stats.excluded
        );
    }
    out
}

/// Total/active/expired box plus active licenses per product.
pub fn summary(stats: &SummaryStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style("License Overview").bold());
    let _ = writeln!(out, "  Total:   {}", stats.total);
    let _ = writeln!(out, "  Active:  {}", style(stats.active).green());
    let _ = writeln!(out, "  Expired: {}", style(stats.expired).red());
    let _ = writeln!(out, "{}", style("Active Licenses by Product").bold());
    for product in Product::ALL {
        let _ = writeln!(
            out,
            "  {:<8} {}",
            product.as_str(),
            stats.active_by_product.get(product)
        );
    }
    out
}

/// Full details of one license.
pub fn license_details(record: &LicenseRecord, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let mut row = |label: &str, value: &str| {
        let _ = writeln!(out, "  {:<16} {}", format!("{}:", label), value);
    };

    row(
        "License Key",
        record.license_key.as_ref().map_or(SENTINEL, |k| k.as_str()),
    );
    row(
        "Instance ID",
        record.instance_id.as_deref().unwrap_or(SENTINEL),
    );
    row("Client ID", record.client_key());
    row("Product", record.product_name().unwrap_or(SENTINEL));
    row("License Type", record.license_type_name());
    if let Some(name) = record.identiqa_name.as_deref().filter(|s| !s.is_empty()) {
        row("Identiqa Name", name);
    }
    if let Some(email) = record.identiqa_email.as_deref().filter(|s| !s.is_empty()) {
        row("Identiqa Email", email);
    }
    row("Start Date", &display_creation_date(record));
    row("Status", record.status.as_deref().unwrap_or(SENTINEL));
    row("Expiry", &expiry_label(record, now));
    if let Some(version) = record.version_label() {
        row("Version", version);
    }
    if let Some(hosts) = record.total_hosts {
        row("Total Hosts", &hosts.to_string());
    }
    out
}
