use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::inventory::{self, InventoryDocument};

pub const DEFAULT_USER_AGENT: &str = concat!("vpcview/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub url: String,
    pub proxy: Option<String>,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            proxy: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid user agent: {value}")]
    InvalidUserAgent { value: String },
}

/// Why a single inventory fetch did not produce a document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to fetch: {source}")]
    Network {
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status}{}", reason_suffix(.status_text))]
    Http {
        status: u16,
        status_text: String,
        detail: Option<String>,
    },

    #[error("Invalid JSON: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    #[error("Response missing expected vpcs or subnets arrays")]
    Schema,
}

#[derive(Clone, Debug)]
pub struct InventoryClient {
    http: reqwest::Client,
    url: String,
}

impl InventoryClient {
    pub fn new(options: ClientOptions) -> Result<Self, ClientError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let user_agent = reqwest::header::HeaderValue::from_str(&options.user_agent).map_err(
            |_| ClientError::InvalidUserAgent {
                value: options.user_agent.clone(),
            },
        )?;
        headers.insert(reqwest::header::USER_AGENT, user_agent);

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| ClientError::ProxySetup {
                proxy: proxy.to_string(),
                source: e,
            })?;
            builder = builder.proxy(proxy);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::HttpClientBuild { source: e })?;

        Ok(Self {
            http,
            url: options.url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issues exactly one GET against the configured endpoint.
    pub async fn fetch_inventory(&self) -> Result<InventoryDocument, FetchError> {
        debug!(url = %self.url, "requesting inventory");
        let resp = self
            .http
            .get(self.url.as_str())
            .send()
            .await
            .map_err(|e| FetchError::Network { source: e })?;

        let status = resp.status();
        if !status.is_success() {
            let status_text = status_text(&resp);
            let detail = resp.text().await.ok().and_then(|body| error_detail(&body));
            if let Some(detail) = detail.as_deref() {
                warn!(status = status.as_u16(), detail, "inventory endpoint reported an error");
            }
            return Err(FetchError::Http {
                status: status.as_u16(),
                status_text,
                detail,
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Network { source: e })?;
        debug!(bytes = body.len(), raw = %body, "raw inventory response");

        parse_body(&body)
    }
}

/// Parses and shape-checks a successful response body.
pub fn parse_body(body: &str) -> Result<InventoryDocument, FetchError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| FetchError::Parse { source: e })?;
    inventory::from_json(value).map_err(|_| FetchError::Schema)
}

/// The reason phrase the server actually sent, else the registered one for
/// the code. HTTP/2 responses never carry a phrase.
fn status_text(resp: &reqwest::Response) -> String {
    if let Some(reason) = resp.extensions().get::<hyper::ext::ReasonPhrase>() {
        let reason = String::from_utf8_lossy(reason.as_bytes()).trim().to_string();
        if !reason.is_empty() {
            return reason;
        }
    }
    resp.status().canonical_reason().unwrap_or("").to_string()
}

fn reason_suffix(status_text: &str) -> String {
    if status_text.is_empty() {
        String::new()
    } else {
        format!(": {status_text}")
    }
}

fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}
