//! Command handlers.

use crate::commands::{CreateArgs, WatchTarget};
use crate::config::{CliConfig, OutputFormat};
use crate::form::{CreateForm, ExpiryPeriod, normalize};
use crate::poller::Poller;
use crate::render;
use crate::session::SessionStore;
use crate::view::{LicenseView, ViewState};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use console::{Term, style};
use indicatif::{ProgressBar, ProgressStyle};
use licdash_core::ports::LicenseSource;
use licdash_core::timestamp::{format_date, parse_timestamp};
use licdash_core::{
    Error, LicenseKey, LicensePatch, LicenseRecord, LicenseStatus, LicenseType, Product, Session,
};
use licdash_engine::{
    ClientGroup, FilterOptions, GroupingOptions, KnownClients, LicenseTypeStats, ProductFilter,
    SearchScope, compute_license_type_stats, compute_summary_stats, distinct_client_count,
    filter_groups, group_by_client,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Everything a dashboard command needs.
pub struct App {
    pub config: CliConfig,
    pub session: Session,
    pub source: Arc<dyn LicenseSource>,
    pub format: OutputFormat,
}

impl App {
    /// Prompts are only shown for table output on a terminal.
    fn interactive(&self) -> bool {
        self.format == OutputFormat::Table && console::user_attended()
    }
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Open a view and fetch it once; a failed fetch fails the command.
async fn load_view(app: &App) -> Result<LicenseView> {
    let mut view = LicenseView::open(&app.session)?;

    let bar = spinner("Fetching licenses...");
    view.refresh(app.source.as_ref()).await;
    bar.finish_and_clear();

    if let ViewState::Failed(message) = view.state() {
        bail!("Failed to load licenses: {}", message);
    }
    Ok(view)
}

fn emit(text: &str) {
    print!("{}", text);
}

// =============================================================================
// Session
// =============================================================================

/// Log in and persist the session flag.
pub fn login(store: &SessionStore, config: &CliConfig) -> Result<()> {
    use dialoguer::{Input, Password};

    let username = match &config.username {
        Some(username) => username.clone(),
        None => Input::new().with_prompt("Username").interact_text()?,
    };
    let password = match &config.password {
        Some(password) => password.clone(),
        None => Password::new().with_prompt("Password").interact()?,
    };

    if username.trim().is_empty() || password.is_empty() {
        bail!("Username and password are required");
    }

    store.save(&Session::authenticated())?;
    println!(
        "{} Logged in as {}",
        style("✓").green(),
        style(username.trim()).bold()
    );
    Ok(())
}

pub fn logout(store: &SessionStore) -> Result<()> {
    store.clear()?;
    println!("{} Logged out", style("✓").green());
    Ok(())
}

// =============================================================================
// Views
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OverviewOutput<'a> {
    license_summary: LicenseTypeStats,
    clients: Vec<ClientGroup<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LicensesOutput<'a> {
    total_clients: usize,
    clients: Vec<ClientGroup<'a>>,
}

fn overview_output<'a>(records: &'a [LicenseRecord], search: &str) -> OverviewOutput<'a> {
    let groups = group_by_client(records, &GroupingOptions::cards());
    let options = FilterOptions::new(search, SearchScope::ClientEmailAndItems, ProductFilter::All);
    OverviewOutput {
        license_summary: compute_license_type_stats(records),
        clients: filter_groups(&groups, &options),
    }
}

fn licenses_output<'a>(
    records: &'a [LicenseRecord],
    search: &str,
    product: &ProductFilter,
) -> LicensesOutput<'a> {
    let groups = group_by_client(records, &GroupingOptions::table());
    let options = FilterOptions::new(search, SearchScope::ClientAndEmail, product.clone());
    LicensesOutput {
        total_clients: distinct_client_count(records),
        clients: filter_groups(&groups, &options),
    }
}

fn overview_text(records: &[LicenseRecord], search: &str, now: DateTime<Utc>) -> String {
    let output = overview_output(records, search);
    format!(
        "{}\n{}",
        render::type_matrix(&output.license_summary),
        render::client_cards(&output.clients, now)
    )
}

fn licenses_text(
    records: &[LicenseRecord],
    search: &str,
    product: &ProductFilter,
    expand: bool,
    now: DateTime<Utc>,
) -> String {
    let output = licenses_output(records, search, product);
    render::client_table(&output.clients, output.total_clients, expand, now)
}

fn stats_text(records: &[LicenseRecord], now: DateTime<Utc>) -> String {
    render::summary(&compute_summary_stats(records, now))
}

/// Client cards and the license type matrix.
pub async fn overview(app: &App, search: &str) -> Result<()> {
    let view = load_view(app).await?;
    let records = view.records();

    match render::structured(&overview_output(records, search), app.format)? {
        Some(text) => println!("{}", text),
        None => emit(&overview_text(records, search, Utc::now())),
    }
    Ok(())
}

/// Client table.
pub async fn licenses(app: &App, search: &str, product: &ProductFilter, expand: bool) -> Result<()> {
    let view = load_view(app).await?;
    let records = view.records();

    match render::structured(&licenses_output(records, search, product), app.format)? {
        Some(text) => println!("{}", text),
        None => emit(&licenses_text(records, search, product, expand, Utc::now())),
    }
    Ok(())
}

pub async fn stats(app: &App) -> Result<()> {
    let view = load_view(app).await?;
    let now = Utc::now();

    match render::structured(&compute_summary_stats(view.records(), now), app.format)? {
        Some(text) => println!("{}", text),
        None => emit(&stats_text(view.records(), now)),
    }
    Ok(())
}

/// License details.
pub async fn show(app: &App, key: &str) -> Result<()> {
    let view = load_view(app).await?;
    let key = LicenseKey::new(key);
    let record = view
        .find(&key)
        .ok_or_else(|| Error::LicenseNotFound(key.to_string()))?;

    match render::structured(record, app.format)? {
        Some(text) => println!("{}", text),
        None => {
            println!("{}", style("License Details").bold());
            emit(&render::license_details(record, Utc::now()));
        }
    }
    Ok(())
}

/// Keep a view on screen until Ctrl+C.
pub async fn watch(app: &App, target: WatchTarget, search: &str) -> Result<()> {
    let mut view = LicenseView::open(&app.session)?;
    let mut handle = Poller::new(app.source.clone(), app.config.poll_interval()).spawn();
    let term = Term::stdout();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    draw(&term, app, &view, target, search);
    loop {
        tokio::select! {
            result = handle.next() => match result {
                Some(result) => {
                    view.apply_fetch(result);
                    draw(&term, app, &view, target, search);
                }
                None => break,
            },
            _ = &mut ctrl_c => break,
        }
    }

    handle.stop().await;
    Ok(())
}

fn draw(term: &Term, app: &App, view: &LicenseView, target: WatchTarget, search: &str) {
    let _ = term.clear_screen();
    let now = Utc::now();

    println!(
        "{} {}  {}",
        style("licdash").cyan().bold(),
        style(format!("{:?}", target).to_lowercase()).bold(),
        style(format!(
            "refreshing every {}s, Ctrl+C to quit",
            app.config.poll_interval_secs
        ))
        .dim()
    );
    println!();

    match view.state() {
        ViewState::Loading => println!("{} Loading licenses...", style("i").blue()),
        ViewState::Failed(message) => {
            println!("{} Failed to load licenses: {}", style("✗").red(), message)
        }
        ViewState::Ready(records) => {
            let text = match target {
                WatchTarget::Overview => overview_text(records, search, now),
                WatchTarget::Licenses => {
                    licenses_text(records, search, &ProductFilter::All, false, now)
                }
                WatchTarget::Stats => stats_text(records, now),
            };
            emit(&text);
        }
    }

    if let Some(at) = view.fetched_at() {
        println!(
            "\n{}",
            style(format!("Last updated {}", at.format("%H:%M:%S UTC"))).dim()
        );
    }
}

// =============================================================================
// Mutations
// =============================================================================

/// Create a license from flags, prompting for anything missing.
pub async fn create(app: &App, args: CreateArgs) -> Result<()> {
    app.session.require()?;

    let known = match app.source.list_licenses().await {
        Ok(records) => KnownClients::from_records(&records),
        Err(e) => {
            warn!(error = %e, "Could not load known clients");
            KnownClients::default()
        }
    };

    let interactive = !args.no_input && app.interactive();
    let mut form = CreateForm {
        client_id: args.client_id.unwrap_or_default(),
        client_email: args.client_email.unwrap_or_default(),
        identiqa_name: args.identiqa_name.unwrap_or_default(),
        identiqa_email: args.identiqa_email.unwrap_or_default(),
        period: args.period.unwrap_or_default(),
        product: args.product,
        license_type: args.license_type,
    };

    if interactive {
        prompt_create(&mut form, &known, args.period.is_none())?;
    } else {
        form.autofill_email(&known);
    }

    let license = form.build(&known, Utc::now())?;
    let created = app
        .source
        .create_license(&license)
        .await
        .context("Failed to create license")?;

    match render::structured(&created, app.format)? {
        Some(text) => println!("{}", text),
        None => {
            println!("{} License created", style("✓").green());
            println!("  License Key: {}", style(&created.license_key).bold());
            println!(
                "  Instance ID: {}",
                created.instance_id.as_deref().unwrap_or("—")
            );
            println!(
                "  Expires:     {} ({})",
                format_date(Some(license.expiry_date)),
                form.period.label()
            );
        }
    }
    Ok(())
}

fn prompt_create(form: &mut CreateForm, known: &KnownClients, ask_period: bool) -> Result<()> {
    use dialoguer::{Input, Select};

    println!("{}", style("Create New License").bold());
    if !known.ids.is_empty() {
        println!(
            "  {} {} known clients",
            style("i").blue(),
            style(known.ids.len()).bold()
        );
    }

    if normalize(&form.client_id).is_empty() {
        let client_id: String = Input::new()
            .with_prompt("Client ID")
            .validate_with(|input: &String| {
                if normalize(input).is_empty() {
                    Err("Client ID is required")
                } else {
                    Ok(())
                }
            })
            .interact_text()?;
        form.client_id = normalize(&client_id);
    }

    form.autofill_email(known);
    if form.client_email.is_empty() {
        form.client_email = Input::new()
            .with_prompt("Client Email")
            .allow_empty(true)
            .interact_text()?;
    }
    if form.identiqa_name.is_empty() {
        form.identiqa_name = Input::new()
            .with_prompt("Identiqa Name")
            .allow_empty(true)
            .interact_text()?;
    }
    if form.identiqa_email.is_empty() {
        form.identiqa_email = Input::new()
            .with_prompt("Identiqa Email")
            .allow_empty(true)
            .interact_text()?;
    }

    if ask_period {
        let labels: Vec<String> = ExpiryPeriod::CHOICES.iter().map(|p| p.label()).collect();
        let default = ExpiryPeriod::CHOICES
            .iter()
            .position(|p| *p == ExpiryPeriod::default())
            .unwrap_or_default();
        let idx = Select::new()
            .with_prompt("Expiry")
            .items(&labels)
            .default(default)
            .interact()?;
        form.period = ExpiryPeriod::CHOICES[idx];
    }
    if form.license_type.is_none() {
        let idx = Select::new()
            .with_prompt("License Type")
            .items(&LicenseType::ALL.map(|t| t.as_str()))
            .default(0)
            .interact()?;
        form.license_type = Some(LicenseType::ALL[idx]);
    }
    if form.product.is_none() {
        let idx = Select::new()
            .with_prompt("Software Type")
            .items(&Product::ALL.map(|p| p.as_str()))
            .default(0)
            .interact()?;
        form.product = Some(Product::ALL[idx]);
    }
    Ok(())
}

/// Canonical `YYYY-MM-DD` form of a user-supplied expiry date.
fn expiry_arg(raw: &str) -> Result<String> {
    let parsed = parse_timestamp(raw.trim())
        .ok_or_else(|| Error::validation(format!("Invalid expiry date: {}", raw)))?;
    Ok(format_date(Some(parsed)))
}

/// Edit status, expiry or license type of one license.
pub async fn edit(
    app: &App,
    key: &str,
    status: Option<LicenseStatus>,
    expiry: Option<String>,
    license_type: Option<LicenseType>,
) -> Result<()> {
    let mut view = load_view(app).await?;
    let key = LicenseKey::new(key);

    let mut patch = LicensePatch {
        status,
        expiry_date: expiry.as_deref().map(expiry_arg).transpose()?,
        license_type,
    };
    if patch.is_empty() && app.interactive() {
        let current = view
            .find(&key)
            .ok_or_else(|| Error::LicenseNotFound(key.to_string()))?;
        patch = prompt_edit(current)?;
    }

    view.apply_edit(app.source.as_ref(), &key, &patch).await?;

    let record = view.find(&key);
    match (record, app.format) {
        (Some(record), OutputFormat::Table) => {
            println!("{} License {} updated", style("✓").green(), style(&key).bold());
            emit(&render::license_details(record, Utc::now()));
        }
        (Some(record), format) => {
            if let Some(text) = render::structured(record, format)? {
                println!("{}", text);
            }
        }
        (None, _) => println!("{} License {} updated", style("✓").green(), key),
    }
    Ok(())
}

fn prompt_edit(current: &LicenseRecord) -> Result<LicensePatch> {
    use dialoguer::{Input, Select};

    let statuses = LicenseStatus::ALL.map(|s| s.as_str());
    let status = Select::new()
        .with_prompt("Status")
        .items(&statuses)
        .default(
            current
                .status()
                .and_then(|s| LicenseStatus::ALL.iter().position(|c| *c == s))
                .unwrap_or_default(),
        )
        .interact()?;

    let expiry: String = Input::new()
        .with_prompt("Expiry (YYYY-MM-DD)")
        .with_initial_text(format_date(current.expiry()))
        .validate_with(|input: &String| match parse_timestamp(input.trim()) {
            Some(_) => Ok(()),
            None => Err("Enter a date as YYYY-MM-DD"),
        })
        .interact_text()?;

    let types = LicenseType::ALL.map(|t| t.as_str());
    let license_type = Select::new()
        .with_prompt("License Type")
        .items(&types)
        .default(
            current
                .license_type()
                .and_then(|t| LicenseType::ALL.iter().position(|c| *c == t))
                .unwrap_or_default(),
        )
        .interact()?;

    Ok(LicensePatch {
        status: Some(LicenseStatus::ALL[status]),
        expiry_date: Some(expiry_arg(&expiry)?),
        license_type: Some(LicenseType::ALL[license_type]),
    })
}

pub async fn delete(app: &App, key: &str, yes: bool) -> Result<()> {
    use dialoguer::Confirm;

    app.session.require()?;
    let key = LicenseKey::new(key);

    if !yes {
        if !app.interactive() {
            bail!("Refusing to delete {} without confirmation; pass --yes", key);
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete license {}?", key))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{} Cancelled", style("!").yellow());
            return Ok(());
        }
    }

    app.source.delete_license(&key).await?;
    println!("{} License {} deleted", style("✓").green(), key);
    Ok(())
}

pub async fn check(app: &App, key: &str) -> Result<()> {
    app.session.require()?;
    let result = app.source.check_license(&LicenseKey::new(key)).await?;

    let format = match app.format {
        OutputFormat::Table => OutputFormat::Json,
        format => format,
    };
    if let Some(text) = render::structured(&result, format)? {
        println!("{}", text);
    }
    Ok(())
}

// =============================================================================
// Configuration
// =============================================================================

/// Show configuration.
pub fn show_config(config: &CliConfig) -> Result<()> {
    println!("Current configuration:");
    println!("  api_url: {}", config.api_url);
    println!("  poll_interval_secs: {}", config.poll_interval_secs);
    println!("  request_timeout_secs: {}", config.request_timeout_secs);
    println!("  output_format: {}", config.output_format);
    println!(
        "  username: {}",
        config.username.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  password: {}",
        if config.password.is_some() {
            "***"
        } else {
            "(not set)"
        }
    );

    if let Ok(path) = CliConfig::config_path() {
        println!("\nConfig file: {}", path.display());
    }
    if let Ok(store) = SessionStore::default_location() {
        println!("Session file: {}", store.path().display());
    }
    Ok(())
}

/// Set configuration.
pub fn set_config(key: &str, value: &str) -> Result<()> {
    let path = CliConfig::config_path()?;
    let mut config = CliConfig::load_from(&path)?;
    config.set(key, value)?;
    config.save_to(&path)?;

    let shown = if key == "password" { "***" } else { value };
    println!("{} Set {} = {}", style("✓").green(), key, shown);
    Ok(())
}
