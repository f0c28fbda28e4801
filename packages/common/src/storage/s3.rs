use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};
use serde::Deserialize;
use tokio::io::AsyncReadExt;

use super::error::StorageError;
use super::hash::ContentHash;
use super::traits::{BoxReader, MediaStore};

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible services (MinIO etc.).
    pub endpoint: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    #[serde(default)]
    pub path_style: bool,
}

/// S3-backed media store.
///
/// Objects are keyed `{shard_prefix}/{shard_suffix}`, the same layout the
/// filesystem store uses on disk. Reads and writes are buffered in memory;
/// object size is bounded by the upload limit.
pub struct S3MediaStore {
    bucket: Box<Bucket>,
    max_size: u64,
}

fn object_key(hash: &ContentHash) -> String {
    format!("{}/{}", hash.shard_prefix(), hash.shard_suffix())
}

fn backend_err(err: S3Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

fn is_not_found(err: &S3Error) -> bool {
    matches!(err, S3Error::HttpFailWithBody(404, _))
}

impl S3MediaStore {
    pub fn new(config: &S3Config, max_size: u64) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(e.to_string()))?;

        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse()
                .map_err(|_| StorageError::Backend(format!("invalid region: {}", config.region)))?,
        };

        let mut bucket = Bucket::new(&config.bucket, region, credentials).map_err(backend_err)?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self { bucket, max_size })
    }

    async fn store_bytes(&self, data: &[u8]) -> Result<ContentHash, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let hash = ContentHash::compute(data);
        let key = object_key(&hash);

        if self.exists(&hash).await? {
            return Ok(hash);
        }

        self.bucket
            .put_object(&key, data)
            .await
            .map_err(backend_err)?;
        Ok(hash)
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn put(&self, data: &[u8]) -> Result<ContentHash, StorageError> {
        self.store_bytes(data).await
    }

    async fn put_stream(&self, mut reader: BoxReader) -> Result<ContentHash, StorageError> {
        let mut buf = Vec::new();
        let mut chunk = vec![0u8; 64 * 1024];
        loop {
            let n = reader.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if buf.len() as u64 > self.max_size {
                return Err(StorageError::SizeLimitExceeded {
                    actual: buf.len() as u64,
                    limit: self.max_size,
                });
            }
        }
        self.store_bytes(&buf).await
    }

    async fn get(&self, hash: &ContentHash) -> Result<Vec<u8>, StorageError> {
        match self.bucket.get_object(object_key(hash)).await {
            Ok(response) => Ok(response.bytes().to_vec()),
            Err(e) if is_not_found(&e) => Err(StorageError::NotFound(hash.to_hex())),
            Err(e) => Err(backend_err(e)),
        }
    }

    async fn get_stream(&self, hash: &ContentHash) -> Result<BoxReader, StorageError> {
        let bytes = self.get(hash).await?;
        Ok(Box::new(std::io::Cursor::new(bytes)))
    }

    async fn exists(&self, hash: &ContentHash) -> Result<bool, StorageError> {
        match self.bucket.head_object(object_key(hash)).await {
            Ok((_, code)) if code == 404 => Ok(false),
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(backend_err(e)),
        }
    }

    async fn delete(&self, hash: &ContentHash) -> Result<bool, StorageError> {
        match self.bucket.delete_object(object_key(hash)).await {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(backend_err(e)),
        }
    }

    async fn size(&self, hash: &ContentHash) -> Result<u64, StorageError> {
        match self.bucket.head_object(object_key(hash)).await {
            Ok((head, code)) if code != 404 => Ok(head.content_length.unwrap_or(0) as u64),
            Ok(_) => Err(StorageError::NotFound(hash.to_hex())),
            Err(e) if is_not_found(&e) => Err(StorageError::NotFound(hash.to_hex())),
            Err(e) => Err(backend_err(e)),
        }
    }
}
