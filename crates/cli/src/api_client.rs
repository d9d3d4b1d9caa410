use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use vpcalloc_core::AllocationResult;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).context("invalid server URL")?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).context("failed to build API URL")
    }

    async fn send_json<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T> {
        let response = req.send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            // Prefer the server's structured message when there is one.
            if let Ok(err) = serde_json::from_str::<ErrorResponse>(&body) {
                anyhow::bail!("API error ({}): {}: {}", status, err.code, err.message);
            }
            anyhow::bail!("API error ({}): {}", status, body);
        }
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.url("/v1/health")?;
        self.send_json(self.http.get(url)).await
    }

    /// Submit allocation properties; returns the `<Name>.CidrBlock` map.
    pub async fn allocate(&self, properties: &Value) -> Result<AllocationResult> {
        let url = self.url("/v1/allocations")?;
        let response: AllocationResponse =
            self.send_json(self.http.post(url).json(properties)).await?;
        Ok(response.data)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct AllocationResponse {
    pub data: AllocationResult,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
