use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::models::{MovieInput, MovieRecord, ServiceMessage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, warn};

/// The remote movie collection. `CatalogClient` talks HTTP; tests plug in fakes.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list(&self) -> Result<Vec<MovieRecord>, CatalogError>;
    async fn create(&self, input: &MovieInput) -> Result<ServiceMessage, CatalogError>;
    async fn update(&self, id: i64, input: &MovieInput) -> Result<ServiceMessage, CatalogError>;
    async fn delete(&self, id: i64) -> Result<ServiceMessage, CatalogError>;
    /// GET on the base path; only the status class matters.
    async fn probe(&self) -> Result<(), CatalogError>;
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let user_agent = format!("cinecatalog/{}", env!("CARGO_PKG_VERSION"));
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .user_agent(user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .context("Failed to build catalog HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/{}", self.base_url, id)
    }
}

async fn read_message(res: Response) -> Result<ServiceMessage, CatalogError> {
    let status = res.status();
    let bytes = res.bytes().await?;
    let parsed = serde_json::from_slice::<ServiceMessage>(&bytes).ok();
    if !status.is_success() {
        return Err(CatalogError::Status {
            status: status.as_u16(),
            message: parsed.and_then(|m| m.message).filter(|m| !m.trim().is_empty()),
        });
    }
    Ok(parsed.unwrap_or_else(|| {
        warn!("Catalog answered {} without a JSON message body", status);
        ServiceMessage::default()
    }))
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn list(&self) -> Result<Vec<MovieRecord>, CatalogError> {
        let res = self.client.get(&self.base_url).send().await?;
        let status = res.status();
        let bytes = res.bytes().await?;
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message: serde_json::from_slice::<ServiceMessage>(&bytes)
                    .ok()
                    .and_then(|m| m.message),
            });
        }
        let movies: Vec<MovieRecord> =
            serde_json::from_slice(&bytes).map_err(|e| CatalogError::Decode(e.to_string()))?;
        debug!(count = movies.len(), "Fetched catalog");
        Ok(movies)
    }

    async fn create(&self, input: &MovieInput) -> Result<ServiceMessage, CatalogError> {
        let res = self.client.post(&self.base_url).json(input).send().await?;
        read_message(res).await
    }

    async fn update(&self, id: i64, input: &MovieInput) -> Result<ServiceMessage, CatalogError> {
        let res = self.client.put(self.item_url(id)).json(input).send().await?;
        read_message(res).await
    }

    async fn delete(&self, id: i64) -> Result<ServiceMessage, CatalogError> {
        let res = self.client.delete(self.item_url(id)).send().await?;
        read_message(res).await
    }

    async fn probe(&self) -> Result<(), CatalogError> {
        let res = self.client.get(&self.base_url).send().await?;
        let status = res.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(CatalogError::Status {
                status: status.as_u16(),
                message: None,
            })
        }
    }
}
