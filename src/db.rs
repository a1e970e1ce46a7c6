use std::path::Path;

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::parser::TideRecord;
use crate::settings::Location;

pub fn connect(path: &str) -> Result<Connection> {
    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tide_times (
            id                    INTEGER PRIMARY KEY,
            country               TEXT NOT NULL,
            city                  TEXT NOT NULL,
            post_code             TEXT NOT NULL,
            date                  TEXT NOT NULL,
            morning_high_time     TEXT,
            morning_high_height   REAL CHECK(morning_high_height >= 0),
            afternoon_high_time   TEXT,
            afternoon_high_height REAL CHECK(afternoon_high_height >= 0),
            morning_low_time      TEXT,
            morning_low_height    REAL CHECK(morning_low_height >= 0),
            afternoon_low_time    TEXT,
            afternoon_low_height  REAL CHECK(afternoon_low_height >= 0),
            created_at            TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(country, city, post_code, date)
        );
        CREATE INDEX IF NOT EXISTS idx_tide_times_date ON tide_times(date);
        ",
    )?;
    Ok(())
}

// ── Storing ──

pub struct StoreStats {
    pub succeeded: usize,
    pub failed: usize,
}

/// Upsert records in batches, one transaction per batch. A failed batch is
/// rolled back whole, counted and logged; later batches still run. A rerun
/// over the same page overwrites each day's row in place, so the reading
/// columns always reflect the latest parse, including its gaps.
pub fn store_records(
    conn: &Connection,
    records: &[TideRecord],
    location: &Location,
    batch_size: usize,
) -> StoreStats {
    let mut stats = StoreStats {
        succeeded: 0,
        failed: 0,
    };

    for (i, batch) in records.chunks(batch_size.max(1)).enumerate() {
        match upsert_batch(conn, batch, location) {
            Ok(()) => {
                stats.succeeded += batch.len();
                info!("Batch {}: stored {} records", i + 1, batch.len());
            }
            Err(e) => {
                stats.failed += batch.len();
                warn!("Batch {} failed ({} records): {}", i + 1, batch.len(), e);
            }
        }
    }

    stats
}

fn upsert_batch(conn: &Connection, batch: &[TideRecord], location: &Location) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO tide_times
             (country, city, post_code, date,
              morning_high_time, morning_high_height,
              afternoon_high_time, afternoon_high_height,
              morning_low_time, morning_low_height,
              afternoon_low_time, afternoon_low_height)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(country, city, post_code, date) DO UPDATE SET
              morning_high_time     = excluded.morning_high_time,
              morning_high_height   = excluded.morning_high_height,
              afternoon_high_time   = excluded.afternoon_high_time,
              afternoon_high_height = excluded.afternoon_high_height,
              morning_low_time      = excluded.morning_low_time,
              morning_low_height    = excluded.morning_low_height,
              afternoon_low_time    = excluded.afternoon_low_time,
              afternoon_low_height  = excluded.afternoon_low_height",
        )?;
        for record in batch {
            stmt.execute(rusqlite::params![
                location.country,
                location.city,
                location.post_code,
                record.date.to_string(),
                record.morning_high.time,
                record.morning_high.height,
                record.afternoon_high.time,
                record.afternoon_high.height,
                record.morning_low.time,
                record.morning_low.height,
                record.afternoon_low.time,
                record.afternoon_low.height,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

// ── Reading back ──

pub struct TideRow {
    pub date: String,
    pub morning_high_time: Option<String>,
    pub morning_high_height: Option<f64>,
    pub afternoon_high_time: Option<String>,
    pub afternoon_high_height: Option<f64>,
    pub morning_low_time: Option<String>,
    pub morning_low_height: Option<f64>,
    pub afternoon_low_time: Option<String>,
    pub afternoon_low_height: Option<f64>,
}

pub fn fetch_upcoming(
    conn: &Connection,
    location: &Location,
    from: NaiveDate,
    days: i64,
) -> Result<Vec<TideRow>> {
    let to = from + Duration::days(days);
    let mut stmt = conn.prepare(
        "SELECT date,
                morning_high_time, morning_high_height,
                afternoon_high_time, afternoon_high_height,
                morning_low_time, morning_low_height,
                afternoon_low_time, afternoon_low_height
         FROM tide_times
         WHERE country = ?1 AND city = ?2 AND post_code = ?3
           AND date >= ?4 AND date < ?5
         ORDER BY date",
    )?;
    let rows = stmt
        .query_map(
            rusqlite::params![
                location.country,
                location.city,
                location.post_code,
                from.to_string(),
                to.to_string(),
            ],
            |row| {
                Ok(TideRow {
                    date: row.get(0)?,
                    morning_high_time: row.get(1)?,
                    morning_high_height: row.get(2)?,
                    afternoon_high_time: row.get(3)?,
                    afternoon_high_height: row.get(4)?,
                    morning_low_time: row.get(5)?,
                    morning_low_height: row.get(6)?,
                    afternoon_low_time: row.get(7)?,
                    afternoon_low_height: row.get(8)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub days: usize,
    pub first: Option<String>,
    pub last: Option<String>,
    pub avg_high: Option<f64>,
    pub max_high: Option<f64>,
    pub min_high: Option<f64>,
}

pub fn get_stats(conn: &Connection, location: &Location) -> Result<Stats> {
    let (days, first, last) = conn.query_row(
        "SELECT COUNT(*), MIN(date), MAX(date) FROM tide_times
         WHERE country = ?1 AND city = ?2 AND post_code = ?3",
        rusqlite::params![location.country, location.city, location.post_code],
        |row| {
            Ok((
                row.get::<_, i64>(0)? as usize,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        },
    )?;

    // High-water stats pool morning and afternoon columns
    let (avg_high, max_high, min_high) = conn.query_row(
        "SELECT AVG(h), MAX(h), MIN(h) FROM (
            SELECT morning_high_height AS h FROM tide_times
             WHERE country = ?1 AND city = ?2 AND post_code = ?3
               AND morning_high_height IS NOT NULL
            UNION ALL
            SELECT afternoon_high_height FROM tide_times
             WHERE country = ?1 AND city = ?2 AND post_code = ?3
               AND afternoon_high_height IS NOT NULL
         )",
        rusqlite::params![location.country, location.city, location.post_code],
        |row| {
            Ok((
                row.get::<_, Option<f64>>(0)?,
                row.get::<_, Option<f64>>(1)?,
                row.get::<_, Option<f64>>(2)?,
            ))
        },
    )?;

    Ok(Stats {
        days,
        first,
        last,
        avg_high,
        max_high,
        min_high,
    })
}
