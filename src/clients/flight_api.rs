use crate::models::NaturalKey;
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Status code and decoded body of one upstream call.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub status: u16,
    /// `None` when the body was empty or JSON `null`.
    pub document: Option<serde_json::Value>,
}

impl FetchResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        self.status == 500
    }
}

/// HTTP client for the flight status provider.
///
/// The endpoint is a URL template so deployments can point at any provider
/// that addresses flights by carrier, number and date.
#[derive(Clone)]
pub struct FlightApiClient {
    client: Client,
    url_template: String,
}

impl FlightApiClient {
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("flightstat/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(10)
            .build()
            .context("Failed to build flight API HTTP client")?;

        Ok(Self::with_shared_client(client, url_template))
    }

    pub fn with_shared_client(client: Client, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
        }
    }

    pub fn build_url(&self, key: &NaturalKey) -> Result<Url> {
        if self.url_template.trim().is_empty() {
            anyhow::bail!("Flight API URL is not configured.");
        }

        let url = self
            .url_template
            .replace("{airline}", &urlencoding::encode(&key.airline_code))
            .replace("{flight_number}", &urlencoding::encode(&key.flight_number))
            .replace("{year}", &key.year())
            .replace("{month}", &key.month())
            .replace("{day}", &key.day());

        Url::parse(&url).with_context(|| format!("Invalid flight API URL: {url}"))
    }

    /// Performs exactly one request. Retries are left to the caller.
    pub async fn fetch(&self, key: &NaturalKey) -> Result<FetchResponse> {
        let url = self.build_url(key)?;
        debug!(%url, "Fetching flight {}", key);

        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();

        if !response.status().is_success() {
            debug!(status, "Flight API returned non-success for {}", key);
            return Ok(FetchResponse {
                status,
                document: None,
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(FetchResponse {
                status,
                document: None,
            });
        }

        let document: serde_json::Value =
            serde_json::from_str(&body).context("Flight API returned invalid JSON")?;

        Ok(FetchResponse {
            status,
            document: (!document.is_null()).then_some(document),
        })
    }
}
