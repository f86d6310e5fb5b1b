//! Baidu Object Storage listing client

use std::time::Duration;

use chrono::Utc;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::debug;

use crate::error::SourceError;

use super::auth::{Credentials, bce_timestamp, canonical_query_string, sign_request, uri_encode};
use super::{ListObjects, ObjectEntry, ObjectPage};

/// Largest page BOS will return.
pub const DEFAULT_MAX_KEYS: u32 = 1000;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for a BOS bucket listing.
#[derive(Debug, Clone)]
pub struct BosConfig {
    /// Endpoint such as `bj.bcebos.com`; `https://` is assumed without a scheme.
    pub endpoint: String,
    pub bucket: String,
    pub prefix: String,
    pub max_keys: u32,
    pub timeout: Duration,
    pub credentials: Credentials,
}

impl BosConfig {
    pub fn new(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            prefix: String::new(),
            max_keys: DEFAULT_MAX_KEYS,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            credentials,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListObjectsResponse {
    #[serde(default)]
    contents: Vec<BosObject>,
    #[serde(default)]
    is_truncated: bool,
    #[serde(default)]
    next_marker: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BosObject {
    key: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BosErrorBody {
    code: String,
    message: String,
    #[serde(default)]
    request_id: String,
}

/// Blocking client for the BOS `ListObjects` call on one bucket.
pub struct BosClient {
    http: Client,
    origin: Url,
    host: String,
    config: BosConfig,
}

impl BosClient {
    pub fn new(config: BosConfig) -> Result<Self, SourceError> {
        let origin = parse_endpoint(&config.endpoint)?;
        let host = host_header(&origin, &config.endpoint)?;
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            origin,
            host,
            config,
        })
    }

    fn page_query(&self, marker: Option<&str>) -> Vec<(String, String)> {
        let mut query = vec![("maxKeys".to_string(), self.config.max_keys.to_string())];
        if let Some(marker) = marker {
            query.push(("marker".to_string(), marker.to_string()));
        }
        if !self.config.prefix.is_empty() {
            query.push(("prefix".to_string(), self.config.prefix.clone()));
        }
        query
    }

    fn bucket_path(&self) -> String {
        format!("/{}", self.config.bucket)
    }

    fn page_url(&self, query: &[(String, String)]) -> Result<Url, SourceError> {
        let raw = format!(
            "{}{}?{}",
            self.origin.as_str().trim_end_matches('/'),
            uri_encode(&self.bucket_path(), true),
            canonical_query_string(query)
        );
        Url::parse(&raw).map_err(|e| SourceError::InvalidEndpoint {
            endpoint: self.config.endpoint.clone(),
            reason: e.to_string(),
        })
    }
}

impl ListObjects for BosClient {
    fn list_page(&mut self, marker: Option<&str>) -> Result<ObjectPage, SourceError> {
        let query = self.page_query(marker);
        let url = self.page_url(&query)?;

        let now = Utc::now();
        let date = bce_timestamp(now);
        let headers = [("host", self.host.as_str()), ("x-bce-date", date.as_str())];
        let authorization = sign_request(
            &self.config.credentials,
            "GET",
            &self.bucket_path(),
            &query,
            &headers,
            now,
        );

        debug!(bucket = %self.config.bucket, marker, "listing objects");
        let response = self
            .http
            .get(url)
            .header("x-bce-date", &date)
            .header(AUTHORIZATION, authorization)
            .send()?;

        let status = response.status();
        let body = response.bytes()?;
        if !status.is_success() {
            return Err(decode_error(status.as_u16(), &body));
        }
        decode_page(&body)
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, SourceError> {
    let with_scheme = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    };
    let url = Url::parse(&with_scheme).map_err(|e| SourceError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SourceError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// Host header as the HTTP client will send it: the port only when it is
/// not the scheme default.
fn host_header(url: &Url, endpoint: &str) -> Result<String, SourceError> {
    let host = url.host_str().ok_or_else(|| SourceError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: "missing host".to_string(),
    })?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn decode_page(body: &[u8]) -> Result<ObjectPage, SourceError> {
    let response: ListObjectsResponse =
        serde_json::from_slice(body).map_err(|e| SourceError::Decode(e.to_string()))?;
    Ok(ObjectPage {
        entries: response
            .contents
            .into_iter()
            .map(|o| ObjectEntry {
                key: o.key,
                size: o.size,
            })
            .collect(),
        is_truncated: response.is_truncated,
        next_marker: response.next_marker,
    })
}

fn decode_error(status: u16, body: &[u8]) -> SourceError {
    match serde_json::from_slice::<BosErrorBody>(body) {
        Ok(err) => SourceError::Service {
            status,
            code: err.code,
            message: err.message,
            request_id: err.request_id,
        },
        Err(_) => SourceError::Service {
            status,
            code: "Unknown".to_string(),
            message: String::from_utf8_lossy(body).trim().to_string(),
            request_id: String::new(),
        },
    }
}
