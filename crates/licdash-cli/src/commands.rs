//! CLI command definitions.

use crate::form::ExpiryPeriod;
use clap::{Args, Subcommand, ValueEnum};
use licdash_core::{LicenseStatus, LicenseType, Product};
use licdash_engine::ProductFilter;

#[derive(Subcommand)]
pub enum Commands {
    /// Log in to the dashboard
    Login,

    /// Log out
    Logout,

    /// Client cards with license type summary
    Overview {
        /// Match client, email, product or license type
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Client table
    Licenses {
        /// Match client ID or email
        #[arg(short, long, default_value = "")]
        search: String,

        /// Only licenses of this product ("all" for every product)
        #[arg(short, long, default_value = "all")]
        product: ProductFilter,

        /// List each client's licenses
        #[arg(short, long)]
        expand: bool,
    },

    /// Show license details
    Show {
        /// License key
        key: String,
    },

    /// Active and expired license counts
    Stats,

    /// Create a license
    Create(CreateArgs),

    /// Edit a license
    Edit {
        /// License key
        key: String,

        #[arg(long)]
        status: Option<LicenseStatus>,

        /// New expiry date (YYYY-MM-DD)
        #[arg(long)]
        expiry: Option<String>,

        #[arg(long)]
        license_type: Option<LicenseType>,
    },

    /// Delete a license
    Delete {
        /// License key
        key: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Ask the API whether a license is valid
    Check {
        /// License key
        key: String,
    },

    /// Keep a view on screen, refreshing periodically
    Watch {
        #[arg(value_enum, default_value_t = WatchTarget::Overview)]
        view: WatchTarget,

        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Fields of a new license; missing values are prompted for.
#[derive(Args, Debug, Default)]
pub struct CreateArgs {
    #[arg(long)]
    pub client_id: Option<String>,

    #[arg(long)]
    pub client_email: Option<String>,

    #[arg(long)]
    pub identiqa_name: Option<String>,

    #[arg(long)]
    pub identiqa_email: Option<String>,

    /// 30d, 1y, 2y, 3y, 4y or 5y
    #[arg(long)]
    pub period: Option<ExpiryPeriod>,

    #[arg(long)]
    pub license_type: Option<LicenseType>,

    #[arg(long)]
    pub product: Option<Product>,

    /// Fail instead of prompting for missing values
    #[arg(long)]
    pub no_input: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WatchTarget {
    Overview,
    Licenses,
    Stats,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Key
        key: String,

        /// Value
        value: String,
    },
}
