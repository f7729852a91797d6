//! AWS S3 blob store.
//!
//! Objects are written under their content digest with a `public-read`
//! canned ACL so the stored URL can be handed out for direct download.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client as S3Client;
use zeroize::Zeroizing;

use crate::{key_from_url, validate_key, BlobError, BlobStore};

/// Connection settings for [`S3BlobStore`].
///
/// Custom `Debug` redacts the secret key.
#[derive(Clone)]
pub struct S3Settings {
    /// Target bucket.
    pub bucket: String,
    /// AWS region of the bucket.
    pub region: String,
    /// Static access key id. `None` uses the default credential chain.
    pub access_key_id: Option<String>,
    /// Static secret key, paired with `access_key_id`.
    pub secret_access_key: Option<Zeroizing<String>>,
    /// Custom endpoint for S3-compatible stores (path-style addressing).
    pub endpoint_url: Option<String>,
    /// Base of the public URLs handed out; defaults to
    /// `https://s3.amazonaws.com/{bucket}`.
    pub public_base_url: Option<String>,
}

impl std::fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Settings")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("endpoint_url", &self.endpoint_url)
            .field("public_base_url", &self.public_base_url)
            .finish()
    }
}

impl S3Settings {
    /// Settings for `bucket` in `region` using the default credential chain.
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            access_key_id: None,
            secret_access_key: None,
            endpoint_url: None,
            public_base_url: None,
        }
    }

    /// The effective public URL base, without a trailing slash.
    pub fn resolved_public_base_url(&self) -> String {
        match &self.public_base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://s3.amazonaws.com/{}", self.bucket),
        }
    }
}

/// [`BlobStore`] backed by an S3 bucket.
#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: S3Client,
    bucket: String,
    public_base_url: String,
}

impl S3BlobStore {
    /// Build a client from `settings`.
    pub async fn connect(settings: S3Settings) -> Self {
        let loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(settings.region.clone()));

        let loader = match (&settings.access_key_id, &settings.secret_access_key) {
            (Some(id), Some(secret)) => loader.credentials_provider(Credentials::new(
                id.clone(),
                secret.as_str(),
                None,
                None,
                "docfs",
            )),
            _ => loader,
        };

        let sdk_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &settings.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        tracing::info!(bucket = %settings.bucket, region = %settings.region, "S3 blob store configured");
        Self::from_client(
            S3Client::from_conf(builder.build()),
            settings.bucket.clone(),
            settings.resolved_public_base_url(),
        )
    }

    /// Wrap an existing client.
    pub fn from_client(client: S3Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn url_for(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }

    async fn put(&self, key: &str, data: &[u8]) -> Result<String, BlobError> {
        validate_key(key)?;
        tracing::debug!(bucket = %self.bucket, key, size = data.len(), "uploading blob to S3");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .content_type("application/octet-stream")
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|err| BlobError::Backend {
                message: DisplayErrorContext(&err).to_string(),
                retryable: true,
            })?;

        Ok(self.url_for(key))
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>, BlobError> {
        let key = key_from_url(&self.public_base_url, url)?;

        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    return Err(BlobError::NotFound {
                        key: key.to_string(),
                    });
                }
                return Err(BlobError::Backend {
                    message: DisplayErrorContext(&service_err).to_string(),
                    retryable: false,
                });
            }
        };

        let body = output.body.collect().await.map_err(|err| BlobError::Backend {
            message: err.to_string(),
            retryable: true,
        })?;
        Ok(body.into_bytes().to_vec())
    }
}
