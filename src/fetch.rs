use anyhow::{anyhow, Result};

/// Plain HTTP GET, used for static sidebar markup and stylesheet contents.
///
/// The sidebar menu is present in the static markup of a Docusaurus page,
/// so no browser is involved here.
#[allow(async_fn_in_trait)]
pub trait HttpFetch {
    async fn get_text(&self, url: &str) -> Result<String>;
}

/// `HttpFetch` backed by a shared reqwest client.
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetch for HttpClient {
    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("GET {} failed: {}", url, e))?
            .error_for_status()
            .map_err(|e| anyhow!("GET {} failed: {}", url, e))?;

        response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read response body from {}: {}", url, e))
    }
}
