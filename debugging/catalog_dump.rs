//! Fetch the raw catalog listing and print each movie as pretty JSON.
//! Uses CATALOG_API_URL from the environment (.env supported), else the default endpoint.

use anyhow::{Context, Result};
use cinecatalog::config::CatalogConfig;
use dotenvy::dotenv;
use reqwest::Client;
use serde_json::Value;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present for local runs.
    dotenv().ok();

    let config = CatalogConfig::from_env()?;
    let response = Client::new()
        .get(&config.base_url)
        .send()
        .await
        .context("Failed to call catalog API")?
        .error_for_status()
        .context("Catalog API returned an error status")?;

    let body: Value = response
        .json()
        .await
        .context("Failed to parse catalog response")?;
    let movies = body
        .as_array()
        .context("Catalog response is not a JSON array")?;

    for movie in movies {
        println!("{}", serde_json::to_string_pretty(movie)?);
    }
    eprintln!("{} movies at {}", movies.len(), config.base_url);

    Ok(())
}
