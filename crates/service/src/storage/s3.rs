use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use tracing::{debug, instrument};

use super::{ObjectStore, StorageError, StoredObject};

const DEFAULT_REGION: &str = "us-east-1";

/// S3 (or S3-compatible) bucket.
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
    /// Public URL prefix for stored objects, without a trailing slash.
    url_base: String,
}

impl S3ObjectStore {
    pub fn new(client: S3Client, bucket: impl Into<String>, url_base: impl Into<String>) -> Self {
        Self { client, bucket: bucket.into(), url_base: url_base.into().trim_end_matches('/').to_string() }
    }

    /// Build a client from the ambient AWS credential chain plus the
    /// optional region/endpoint overrides in `cfg`.
    pub async fn from_config(cfg: &configs::StorageConfig) -> Result<Self, StorageError> {
        if cfg.bucket.trim().is_empty() {
            return Err(StorageError::Config("bucket name is empty".into()));
        }
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &cfg.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        let sdk = loader.load().await;
        let region = sdk.region().map(|r| r.to_string()).unwrap_or_else(|| DEFAULT_REGION.to_string());

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk).force_path_style(cfg.force_path_style);
        if let Some(endpoint) = &cfg.endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        let client = S3Client::from_conf(builder.build());

        let url_base = public_url_base(cfg, &region);
        debug!(bucket = %cfg.bucket, %url_base, "s3 object store configured");
        Ok(Self::new(client, cfg.bucket.clone(), url_base))
    }

    fn object_url(&self, key: &str) -> String { format!("{}/{}", self.url_base, encode_key(key)) }
}

/// Where stored objects are reachable: explicit public base, then the
/// custom endpoint, then the virtual-hosted AWS endpoint.
fn public_url_base(cfg: &configs::StorageConfig, region: &str) -> String {
    if let Some(base) = &cfg.public_base_url {
        return base.trim_end_matches('/').to_string();
    }
    match &cfg.endpoint {
        Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), cfg.bucket),
        None if cfg.force_path_style => format!("https://s3.{region}.amazonaws.com/{}", cfg.bucket),
        None => format!("https://{}.s3.{region}.amazonaws.com", cfg.bucket),
    }
}

/// Percent-encode everything outside the unreserved set, keeping `/`.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

fn request_error<E: std::error::Error>(e: E) -> StorageError {
    StorageError::Request(DisplayErrorContext(e).to_string())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self, body), fields(bucket = %self.bucket, size = body.len()))]
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<StoredObject, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(request_error)?;
        Ok(StoredObject { key: Some(key.to_string()), url: Some(self.object_url(key)) })
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(request_error)?;
        Ok(())
    }

    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let output = self.client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(token.take())
                .send()
                .await
                .map_err(request_error)?;
            keys.extend(output.contents().iter().filter_map(|o| o.key().map(str::to_string)));
            match output.next_continuation_token() {
                Some(next) if output.is_truncated().unwrap_or(false) => token = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(keys)
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.client.head_bucket().bucket(&self.bucket).send().await.map_err(request_error)?;
        Ok(())
    }

    fn bucket(&self) -> &str { &self.bucket }
}
