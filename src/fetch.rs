use anyhow::{Context, Result};
use tracing::info;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Fetch the tide page as HTML. The port site serves a stripped page to
/// unknown clients, so the request carries desktop-browser headers.
pub async fn fetch_page(url: &str) -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")?;

    info!("Fetching tide page: {}", url);
    let html = client
        .get(url)
        .header("Accept", ACCEPT)
        .header("Accept-Language", "en-US,en;q=0.5")
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?
        .error_for_status()
        .context("Tide page responded with an error status")?
        .text()
        .await
        .context("Failed to read tide page body")?;

    info!("Fetched {} bytes", html.len());
    Ok(html)
}
