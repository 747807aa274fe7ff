//! File storage for original uploads. The pipeline only keeps the returned
//! link; the bytes are never read back by this service.

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

/// An uploaded document as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Stores the file and returns an opaque link to it.
    async fn upload(&self, owner_id: Uuid, file: &UploadedFile) -> Result<String>;
}

/// S3 / MinIO backed storage.
pub struct S3FileStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3FileStorage {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl FileStorage for S3FileStorage {
    async fn upload(&self, owner_id: Uuid, file: &UploadedFile) -> Result<String> {
        let key = object_key(owner_id, Uuid::new_v4(), &file.file_name);
        let content_type = file
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(file.bytes.clone()))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

        info!("Uploaded resume to s3://{}/{}", self.bucket, key);
        Ok(format!("s3://{}/{}", self.bucket, key))
    }
}

/// `resumes/<owner>/<upload id>-<sanitised file name>`
fn object_key(owner_id: Uuid, upload_id: Uuid, file_name: &str) -> String {
    let safe_name: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe_name = if safe_name.trim_matches('_').is_empty() {
        "resume".to_string()
    } else {
        safe_name
    };
    format!("resumes/{owner_id}/{upload_id}-{safe_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_layout() {
        let owner = Uuid::nil();
        let upload = Uuid::nil();
        assert_eq!(
            object_key(owner, upload, "cv.pdf"),
            format!("resumes/{owner}/{upload}-cv.pdf")
        );
    }

    #[test]
    fn test_object_key_sanitises_file_name() {
        let key = object_key(Uuid::nil(), Uuid::nil(), "../My Résumé (final).docx");
        assert!(key.ends_with("-.._My_R_sum___final_.docx"), "{key}");
        assert!(!key.contains(' '));
    }

    #[test]
    fn test_object_key_blank_name() {
        let key = object_key(Uuid::nil(), Uuid::nil(), "   ");
        assert!(key.ends_with("-resume"), "{key}");
    }
}
