use chrono::Local;
use thiserror::Error;

use crate::models::{ClientDetails, InvoiceDocument, ItemDraft};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not read invoice file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invoice document is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where the initial invoice contents come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// One placeholder item, filled in by hand
    Manual,
    /// A JSON invoice document at a file path or http(s) URL
    Document(String),
}

/// Initial contents handed to the ledger and header.
#[derive(Debug, Clone, PartialEq)]
pub struct Seed {
    pub client_details: ClientDetails,
    pub items: Vec<ItemDraft>,
}

impl DataSource {
    pub fn from_location(location: Option<String>) -> Self {
        match location {
            Some(location) if !location.trim().is_empty() => DataSource::Document(location),
            _ => DataSource::Manual,
        }
    }

    /// Manual invoices carry a discount field; documents do not.
    pub fn supports_discount(&self) -> bool {
        matches!(self, DataSource::Manual)
    }

    pub async fn load(&self) -> Result<Seed, SourceError> {
        match self {
            DataSource::Manual => Ok(Seed {
                client_details: ClientDetails::blank(Local::now().date_naive()),
                items: vec![ItemDraft::default()],
            }),
            DataSource::Document(location) => {
                let document = fetch_document(location).await?;
                tracing::info!(location, items = document.items.len(), "invoice document loaded");

                Ok(Seed {
                    client_details: document.client_details,
                    items: document.items.into_iter().map(ItemDraft::from).collect(),
                })
            }
        }
    }
}

async fn fetch_document(location: &str) -> Result<InvoiceDocument, SourceError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        let document = reqwest::Client::new()
            .get(location)
            .send()
            .await?
            .error_for_status()?
            .json::<InvoiceDocument>()
            .await?;
        Ok(document)
    } else {
        let raw = tokio::fs::read_to_string(location).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}
