use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::NetworkConfig;
use crate::export::{HEADER, plan_rows};
use crate::plan::Schedule;

/// Sheet contents sent to the publishing endpoint. The endpoint replaces the
/// target sheet with `header` followed by `rows`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetDocument {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetDocument {
    pub fn from_schedule(title: &str, schedule: &Schedule) -> Self {
        Self {
            title: title.to_string(),
            header: HEADER.iter().map(|column| column.to_string()).collect(),
            rows: plan_rows(schedule).iter().map(|row| row.values()).collect(),
        }
    }
}

/// What the endpoint reported back, when it returns JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PublishReceipt {
    /// Link to the published sheet.
    #[serde(default)]
    pub url: Option<String>,
}

/// HTTP client for publishing a plan to a remote sheet.
#[derive(Clone, Debug)]
pub struct SheetPublisher {
    client: reqwest::Client,
    url: String,
}

impl SheetPublisher {
    /// Create a new publisher with configurable timeouts.
    pub fn new(url: String, network_config: &NetworkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(network_config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(network_config.connect_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, url })
    }

    /// Send the document, replacing the remote sheet contents.
    pub async fn publish(&self, document: &SheetDocument) -> Result<PublishReceipt> {
        let response = self
            .client
            .post(&self.url)
            .json(document)
            .send()
            .await
            .context("Failed to send sheet to publishing endpoint")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Publishing endpoint returned error status: {}", status);
        }

        let body = response
            .text()
            .await
            .context("Failed to read publishing endpoint response")?;

        // Endpoints are free to answer with an empty or non-JSON body.
        let receipt = serde_json::from_str::<PublishReceipt>(&body).unwrap_or_default();
        Ok(receipt)
    }
}
