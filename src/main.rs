use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use disasterwatch::{
    dataset::{parse_date, Dataset, DisasterRecord, DATE_FORMAT},
    export::{export_to_path, DEFAULT_EXPORT_NAME},
    fetch::http_client,
    filter::{Category, FilterCriteria, CATEGORY_CHOICES},
    notify::{dispatch, Alert, AlertChannel, Channel, Contact, SmtpEmail, TwilioSms, Unconfigured},
    views::{category_distribution, daily_frequency, map_points},
    Config, Dashboard, LiveEvent, LiveFeed, Metrics,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Historical and live natural-disaster dashboard", long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "DISASTERWATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Metrics, charts, live map and records for the selected filters
    Show(ShowArgs),
    /// Write the filtered records to a CSV file
    Export(ExportArgs),
    /// List live events for the configured country
    Live,
    /// Send a test alert by SMS and/or email
    Alert(AlertArgs),
}

#[derive(Args, Debug, Clone)]
struct FilterArgs {
    /// First day to include (YYYY-MM-DD); defaults to the earliest record
    #[arg(long, value_parser = parse_cli_date)]
    from: Option<NaiveDate>,
    /// Last day to include (YYYY-MM-DD); defaults to the latest record
    #[arg(long, value_parser = parse_cli_date)]
    to: Option<NaiveDate>,
    /// Category to match, e.g. Earthquake, Flood, Cyclone, Wildfire or All
    #[arg(long, default_value = "All")]
    category: String,
}

#[derive(Args, Debug)]
struct ShowArgs {
    #[command(flatten)]
    filter: FilterArgs,
    /// Skip the live feed fetch
    #[arg(long)]
    no_live: bool,
    /// Maximum number of records to print
    #[arg(long, default_value_t = 50)]
    limit: usize,
    /// Print the whole dataset instead of the filtered records
    #[arg(long)]
    all_rows: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    filter: FilterArgs,
    /// Output file
    #[arg(long, short, default_value = DEFAULT_EXPORT_NAME)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct AlertArgs {
    /// Phone number with country code, e.g. +91...
    #[arg(long)]
    phone: Option<String>,
    /// Email address
    #[arg(long)]
    email: Option<String>,
    /// Message body; defaults to the standard test alert
    #[arg(long)]
    message: Option<String>,
}

fn parse_cli_date(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("`{}` is not a YYYY-MM-DD date", s))
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) configuration ────────────────────────────────────────────
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    info!(
        dataset = %config.dataset.path.display(),
        country = %config.feed.country,
        "startup"
    );

    let dashboard = Dashboard::new(config, http_client()?);

    // ─── 3) dispatch ─────────────────────────────────────────────────
    match cli.command {
        Command::Show(args) => show(&dashboard, args),
        Command::Export(args) => export(&dashboard, args),
        Command::Live => live(&dashboard),
        Command::Alert(args) => alert(&dashboard, args),
    }
}

fn build_criteria(dataset: &Dataset, args: &FilterArgs) -> FilterCriteria {
    let category: Category = args.category.parse().unwrap_or(Category::All);
    if let Category::Label(label) = &category {
        if !CATEGORY_CHOICES
            .iter()
            .any(|c| c.eq_ignore_ascii_case(label))
        {
            warn!(category = %label, "category is not one of {:?}; matching as free text", CATEGORY_CHOICES);
        }
    }
    Dashboard::criteria(dataset, args.from, args.to, category)
}

fn show(dashboard: &Dashboard, args: ShowArgs) -> Result<()> {
    let dataset = dashboard.dataset().context("loading dataset")?;
    let criteria = build_criteria(&dataset, &args.filter);
    let snap = dashboard.render_pass(&criteria, !args.no_live)?;
    let country = &dashboard.config().feed.country;

    println!("Real-Time Disaster Alert System for {}", country);
    println!(
        "Filters: {} .. {}, category {}",
        criteria.start_date.format(DATE_FORMAT),
        criteria.end_date.format(DATE_FORMAT),
        criteria.category
    );
    if snap.dataset.dropped_rows > 0 {
        println!(
            "({} source rows skipped for unreadable dates)",
            snap.dataset.dropped_rows
        );
    }

    print_metrics(&snap.metrics);
    print_frequency(&snap.filtered);
    print_distribution(&snap.filtered);

    if let Some(feed) = &snap.live {
        print_live_map(dashboard, feed);
    }

    println!("\nDataset Table");
    let rows: &[DisasterRecord] = if args.all_rows {
        &snap.dataset.records
    } else {
        &snap.filtered
    };
    print_records(rows, args.limit);
    Ok(())
}

fn print_metrics(m: &Metrics) {
    let na = || "n/a".to_string();
    println!("\nKey Metrics");
    println!("  Total Disasters:      {}", m.total_count);
    println!(
        "  Most Recent Disaster: {}",
        m.most_recent_display().unwrap_or_else(na)
    );
    println!(
        "  Longest Duration:     {}",
        m.max_duration
            .map(|d| format!("{} days", d))
            .unwrap_or_else(na)
    );
    println!(
        "  Average Duration:     {}",
        m.avg_duration_display()
            .map(|d| format!("{} days", d))
            .unwrap_or_else(na)
    );
}

fn print_frequency(records: &[DisasterRecord]) {
    println!("\nDisaster Frequency Over Time");
    let series = daily_frequency(records);
    if series.is_empty() {
        println!("  (no records)");
        return;
    }
    for (day, count) in series.iter().filter(|(_, n)| *n > 0) {
        println!("  {}  {}", day.format(DATE_FORMAT), "#".repeat(*count));
    }
}

fn print_distribution(records: &[DisasterRecord]) {
    println!("\nDisaster Type Distribution");
    let mut table = Table::new();
    table.set_header(vec!["Disaster Type", "Count"]);
    for (label, count) in category_distribution(records) {
        table.add_row(vec![label, count.to_string()]);
    }
    println!("{table}");
}

fn print_live_map(dashboard: &Dashboard, feed: &LiveFeed) {
    let country = &dashboard.config().feed.country;
    let center = dashboard.config().map_center;
    println!(
        "\nLive Disaster Map of {} (centre {:.4}, {:.4}, zoom {})",
        country, center.latitude, center.longitude, center.zoom
    );
    if let Some(warning) = &feed.warning {
        println!("  warning: {}", warning);
    }

    let points = map_points(feed.with_coordinates());
    if points.is_empty() {
        println!("  No live disaster data available for {}.", country);
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["Latitude", "Longitude", "Event"]);
    for p in points {
        table.add_row(vec![
            format!("{:.4}", p.latitude),
            format!("{:.4}", p.longitude),
            p.popup,
        ]);
    }
    println!("{table}");
}

fn print_records(records: &[DisasterRecord], limit: usize) {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Duration", "Title", "Disaster Info"]);
    for r in records.iter().take(limit) {
        table.add_row(vec![
            r.date.format(DATE_FORMAT).to_string(),
            r.duration.map(|d| d.to_string()).unwrap_or_default(),
            r.title.clone().unwrap_or_default(),
            r.category_label.clone(),
        ]);
    }
    println!("{table}");
    if records.len() > limit {
        println!("... {} more rows (use --limit)", records.len() - limit);
    }
}

fn print_events(events: &[LiveEvent]) {
    let mut table = Table::new();
    table.set_header(vec!["Name", "From", "Country", "Latitude", "Longitude"]);
    let coord = |v: Option<f64>| v.map(|x| format!("{:.4}", x)).unwrap_or_else(|| "-".into());
    for e in events {
        table.add_row(vec![
            e.name.clone(),
            e.start_date.clone(),
            e.country.clone(),
            coord(e.latitude),
            coord(e.longitude),
        ]);
    }
    println!("{table}");
}

fn export(dashboard: &Dashboard, args: ExportArgs) -> Result<()> {
    let dataset = dashboard.dataset().context("loading dataset")?;
    let criteria = build_criteria(&dataset, &args.filter);
    let snap = dashboard.render_pass(&criteria, false)?;
    export_to_path(&snap.dataset, &snap.filtered, &args.out)?;
    println!("wrote {} records to {}", snap.filtered.len(), args.out.display());
    Ok(())
}

fn live(dashboard: &Dashboard) -> Result<()> {
    let feed = dashboard.live_feed();
    if let Some(warning) = &feed.warning {
        println!("warning: {}", warning);
    }
    if feed.events.is_empty() {
        println!(
            "No live disaster data available for {}.",
            dashboard.config().feed.country
        );
        return Ok(());
    }
    print_events(&feed.events);
    Ok(())
}

fn alert(dashboard: &Dashboard, args: AlertArgs) -> Result<()> {
    let config = dashboard.config();
    let contact = Contact::new(args.phone, args.email);

    let sms: Box<dyn AlertChannel> = match &config.notify.twilio {
        Some(twilio) => Box::new(TwilioSms::new(dashboard.client().clone(), twilio.clone())),
        None => Box::new(Unconfigured(Channel::Sms)),
    };
    let email: Box<dyn AlertChannel> = match &config.notify.smtp {
        Some(smtp) => Box::new(SmtpEmail::new(smtp.clone())),
        None => Box::new(Unconfigured(Channel::Email)),
    };

    let mut message = Alert::test_alert(&config.feed.country);
    if let Some(text) = args.message {
        message.message = text;
    }

    let report = dispatch(sms.as_ref(), email.as_ref(), &contact, &message)?;

    let sent = [
        (Channel::Sms, contact.phone.as_deref(), &report.sms),
        (Channel::Email, contact.email.as_deref(), &report.email),
    ];
    for (channel, destination, outcome) in sent {
        if let (Some(to), Some(Ok(()))) = (destination, outcome) {
            println!("Test {} alert sent to {}!", channel, to);
        }
    }
    // delivery failures are shown, not propagated
    for (channel, e) in report.failures() {
        error!(%channel, error = %e, "alert not delivered");
        println!("Failed to send {}: {}", channel, e);
    }
    Ok(())
}
