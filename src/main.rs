mod db;
mod fetch;
mod parser;
mod settings;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use settings::Settings;

#[derive(Parser)]
#[command(name = "tidetimes", about = "Galway tide times scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the live tide page and store every day it lists
    Fetch {
        /// Parse only; print a sample instead of writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Parse a saved copy of the tide page
    Import {
        /// Path to the saved HTML
        file: PathBuf,
        /// Parse only; print a sample instead of writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Parse and store a single table row given as HTML
    Row {
        /// Row HTML, with or without the <tr> wrapper
        html: String,
    },
    /// Add one day's readings by hand
    Add {
        /// Date of the entry, e.g. "29 December 2025"
        date: String,
        /// Morning high water, e.g. "11:54 4.23m" (either part optional)
        #[arg(long)]
        morning_high: Option<String>,
        /// Afternoon high water
        #[arg(long)]
        afternoon_high: Option<String>,
        /// Morning low water
        #[arg(long)]
        morning_low: Option<String>,
        /// Afternoon low water
        #[arg(long)]
        afternoon_low: Option<String>,
    },
    /// Show stored tide times from today forward
    Show {
        /// Days to list
        #[arg(short = 'n', long, default_value = "7")]
        days: i64,
    },
    /// Store statistics for the configured location
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::load()?;

    match cli.command {
        Commands::Fetch { dry_run } => {
            let html = fetch::fetch_page(&settings.page_url).await?;
            ingest(&settings, &html, dry_run)
        }
        Commands::Import { file, dry_run } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            ingest(&settings, &html, dry_run)
        }
        Commands::Row { html } => {
            let record = parser::parse_fragment(&html).context("Could not parse row")?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            store_one(&settings, record)
        }
        Commands::Add {
            date,
            morning_high,
            afternoon_high,
            morning_low,
            afternoon_low,
        } => {
            let date = parser::date::parse_date(&date)
                .with_context(|| format!("Unrecognized date: {:?}", date))?;
            let record = parser::TideRecord {
                date,
                morning_high: reading_arg(morning_high.as_deref()),
                afternoon_high: reading_arg(afternoon_high.as_deref()),
                morning_low: reading_arg(morning_low.as_deref()),
                afternoon_low: reading_arg(afternoon_low.as_deref()),
            };
            store_one(&settings, record)
        }
        Commands::Show { days } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let location = settings.location();
            let from = chrono::Local::now().date_naive();
            let rows = db::fetch_upcoming(&conn, &location, from, days)?;
            if rows.is_empty() {
                println!(
                    "No tide times stored for {}, {} from {} on. Run 'fetch' first.",
                    location.city, location.country, from
                );
                return Ok(());
            }

            println!(
                "Tide times for {}, {} ({})",
                location.city, location.country, location.post_code
            );
            println!(
                "{:<12} | {:<14} | {:<14} | {:<14} | {:<14}",
                "Date", "Morning high", "Afternoon high", "Morning low", "Afternoon low"
            );
            println!("{}", "-".repeat(80));
            for row in &rows {
                println!(
                    "{:<12} | {:<14} | {:<14} | {:<14} | {:<14}",
                    row.date,
                    fmt_reading(row.morning_high_time.as_deref(), row.morning_high_height),
                    fmt_reading(row.afternoon_high_time.as_deref(), row.afternoon_high_height),
                    fmt_reading(row.morning_low_time.as_deref(), row.morning_low_height),
                    fmt_reading(row.afternoon_low_time.as_deref(), row.afternoon_low_height),
                );
            }
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let location = settings.location();
            let s = db::get_stats(&conn, &location)?;
            println!(
                "Location:   {}, {} ({})",
                location.city, location.country, location.post_code
            );
            println!("Days:       {}", s.days);
            if let (Some(first), Some(last)) = (&s.first, &s.last) {
                println!("Range:      {} to {}", first, last);
            }
            match (s.avg_high, s.max_high, s.min_high) {
                (Some(avg), Some(max), Some(min)) => {
                    println!("High water: avg {:.2}m, max {:.2}m, min {:.2}m", avg, max, min);
                }
                _ => println!("High water: no readings yet"),
            }
            Ok(())
        }
    }
}

/// Parse a whole page and store what it yields. `dry_run` stops before the
/// database and shows what would have been written.
fn ingest(settings: &Settings, html: &str, dry_run: bool) -> anyhow::Result<()> {
    let parsed = parser::parse_document(html);
    println!(
        "Parsed {} records ({} rows skipped)",
        parsed.records.len(),
        parsed.skipped
    );
    if parsed.records.is_empty() {
        println!("No tide data found. The page layout may have changed.");
        return Ok(());
    }

    if dry_run {
        println!(
            "\nSample record:\n{}",
            serde_json::to_string_pretty(&parsed.records[0])?
        );
        let first: Vec<String> = parsed
            .records
            .iter()
            .take(5)
            .map(|r| r.date.to_string())
            .collect();
        println!("First dates: {}", first.join(", "));
        return Ok(());
    }

    let conn = db::connect(&settings.db_path)?;
    db::init_schema(&conn)?;
    let stats = db::store_records(
        &conn,
        &parsed.records,
        &settings.location(),
        settings.batch_size,
    );
    println!("Stored: {} succeeded, {} failed", stats.succeeded, stats.failed);
    Ok(())
}

fn store_one(settings: &Settings, record: parser::TideRecord) -> anyhow::Result<()> {
    let conn = db::connect(&settings.db_path)?;
    db::init_schema(&conn)?;
    let date = record.date;
    let stats = db::store_records(&conn, &[record], &settings.location(), settings.batch_size);
    if stats.failed > 0 {
        anyhow::bail!("Store rejected the record for {}", date);
    }
    println!("Stored tide data for {}", date);
    Ok(())
}

fn reading_arg(arg: Option<&str>) -> parser::Reading {
    arg.map(parser::extract_reading).unwrap_or_default()
}

fn fmt_reading(time: Option<&str>, height: Option<f64>) -> String {
    match (time, height) {
        (Some(t), Some(h)) => format!("{} {:.2}m", t, h),
        (Some(t), None) => t.to_string(),
        (None, Some(h)) => format!("{:.2}m", h),
        (None, None) => "-".to_string(),
    }
}
