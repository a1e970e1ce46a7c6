use anyhow::{Context, Result};
use config::Config;
use serde::Deserialize;

/// Runtime settings. Defaults describe the Port of Galway page; any field
/// can be overridden through a `TIDE_`-prefixed environment variable
/// (`TIDE_DB_PATH`, `TIDE_BATCH_SIZE`, `TIDE_CITY`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub db_path: String,
    pub page_url: String,
    pub batch_size: usize,
    pub country: String,
    pub city: String,
    pub post_code: String,
}

/// Where a set of records belongs. Part of the storage key, so two towns
/// sharing one database never collide.
#[derive(Debug, Clone)]
pub struct Location {
    pub country: String,
    pub city: String,
    pub post_code: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .set_default("db_path", "data/tides.sqlite")?
            .set_default("page_url", "https://theportofgalway.ie/galway-tide-times/")?
            .set_default("batch_size", 50)?
            .set_default("country", "Ireland")?
            .set_default("city", "Galway")?
            .set_default("post_code", "H91")?
            .add_source(config::Environment::with_prefix("TIDE").try_parsing(true))
            .build()
            .context("Failed to build settings")?;
        config.try_deserialize().context("Invalid settings")
    }

    pub fn location(&self) -> Location {
        Location {
            country: self.country.clone(),
            city: self.city.clone(),
            post_code: self.post_code.clone(),
        }
    }
}
