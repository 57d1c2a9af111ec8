//! S3 object storage over plain HTTPS with SigV4-signed requests.

mod sign;

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;

use super::{ObjectStorage, StorageError};
use sign::SigningInput;

const S3_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
const S3_HTTP_REQUEST_TIMEOUT_SECS: u64 = 60;

/// S3 backend: path-style single-object PUTs signed with AWS Signature V4.
///
/// A single PUT is atomically visible on S3, which is the property the
/// ingestion pipeline's all-or-nothing contract relies on.
pub struct S3Storage {
    client: reqwest::Client,
    endpoint: String,
    host: String,
    bucket: String,
    region: String,
    access_key_id: String,
    secret_access_key: String,
}

impl S3Storage {
    /// Create a backend for `bucket` in `region`.
    ///
    /// `endpoint` overrides the default `https://s3.{region}.amazonaws.com`,
    /// which lets tests point at a local mock server.
    ///
    /// # Errors
    ///
    /// Fails if the endpoint URL cannot be parsed.
    pub fn new(
        bucket: impl Into<String>,
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        endpoint: Option<String>,
    ) -> anyhow::Result<Self> {
        let region = region.into();
        let endpoint = endpoint
            .unwrap_or_else(|| format!("https://s3.{region}.amazonaws.com"))
            .trim_end_matches('/')
            .to_string();
        let url: reqwest::Url = endpoint
            .parse()
            .with_context(|| format!("invalid S3 endpoint URL: {endpoint}"))?;
        let host_str = url
            .host_str()
            .with_context(|| format!("S3 endpoint URL has no host: {endpoint}"))?;
        let host = match url.port() {
            Some(port) => format!("{host_str}:{port}"),
            None => host_str.to_string(),
        };
        Ok(Self {
            client: build_s3_http_client(),
            endpoint,
            host,
            bucket: bucket.into(),
            region,
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        })
    }

    fn canonical_uri(&self, key: &str) -> String {
        format!("/{}/{}", self.bucket, sign::uri_encode_path(key))
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let canonical_uri = self.canonical_uri(key);
        let url = format!("{}{canonical_uri}", self.endpoint);
        let amz_date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let payload_hash = sign::payload_hash(&bytes);
        let authorization = sign::authorization_header(&SigningInput {
            host: &self.host,
            canonical_uri: &canonical_uri,
            region: &self.region,
            access_key_id: &self.access_key_id,
            secret_access_key: &self.secret_access_key,
            amz_date: &amz_date,
            payload_hash: &payload_hash,
        });

        let size = bytes.len();
        let response = self
            .client
            .put(&url)
            .header("x-amz-date", &amz_date)
            .header("x-amz-content-sha256", &payload_hash)
            .header("authorization", authorization)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                event = "storage.s3.put.rejected",
                key,
                status = %status,
                "S3 rejected object write"
            );
            return Err(StorageError::Rejected { status, body });
        }

        tracing::debug!(event = "storage.s3.put.ok", key, size, "object stored");
        Ok(())
    }
}

fn build_s3_http_client() -> reqwest::Client {
    match reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(S3_HTTP_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(S3_HTTP_REQUEST_TIMEOUT_SECS))
        .build()
    {
        Ok(client) => client,
        Err(error) => {
            tracing::warn!(
                error = %error,
                "Failed to build S3 HTTP client with timeouts; falling back to default client"
            );
            reqwest::Client::new()
        }
    }
}
