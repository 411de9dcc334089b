use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// An image as it was uploaded.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub content_type: String,
    pub data: Bytes,
}

/// Binary storage for uploaded profile images.
///
/// Carried in `AppState` as `Arc<dyn ImageStore>`.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn put(
        &self,
        owner: &str,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<Uuid, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<StoredImage>, AppError>;
}

pub struct S3ImageStore {
    client: S3Client,
    bucket: String,
}

impl S3ImageStore {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

fn object_key(id: Uuid) -> String {
    format!("images/{id}")
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn put(
        &self,
        owner: &str,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        let key = object_key(id);
        let size = data.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .metadata("owner", owner)
            .metadata("filename", filename)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Uploaded {size} byte image to s3://{}/{}", self.bucket, key);
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredImage>, AppError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(object_key(id))
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let err = err.into_service_error();
                if err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(AppError::Storage(format!("S3 download failed: {err}")));
            }
        };

        let content_type = output
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = output
            .body
            .collect()
            .await
            .map_err(|e| AppError::Storage(format!("S3 body read failed: {e}")))?
            .into_bytes();

        Ok(Some(StoredImage { content_type, data }))
    }
}
