//! Downloading product pictures into the media store.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::domain::attachment::NewAttachment;
use crate::domain::types::{
    AttachmentId, AttachmentTitle, ImageUrl, MimeType, ProductSku, TypeConstraintError,
};
use crate::repository::{AttachmentWriter, RepositoryError};

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum ImageImportError {
    #[error("image download failed: {0}")]
    Download(String),
    #[error("image download returned an empty body")]
    EmptyBody,
    #[error("failed to store image: {0}")]
    Storage(#[from] io::Error),
    #[error("failed to register attachment: {0}")]
    Registration(#[from] RepositoryError),
    #[error("invalid attachment data: {0}")]
    Invalid(#[from] TypeConstraintError),
}

/// Turns a remote picture into a registered attachment.
#[async_trait]
pub trait ImageImporter: Send + Sync {
    async fn import_image(
        &self,
        url: &ImageUrl,
        sku: &ProductSku,
    ) -> Result<AttachmentId, ImageImportError>;
}

/// A file written by a [`MediaStorage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: String,
    /// Final name, which may differ from the requested one.
    pub file_name: String,
    pub url: String,
}

/// Destination for downloaded media files.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Write `bytes` under `file_name`, never overwriting an existing file.
    async fn store(&self, file_name: &str, bytes: &[u8]) -> io::Result<StoredFile>;
}

/// [`MediaStorage`] writing into a local uploads directory.
#[derive(Debug, Clone)]
pub struct FsMediaStorage {
    root: PathBuf,
    base_url: String,
}

impl FsMediaStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl MediaStorage for FsMediaStorage {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> io::Result<StoredFile> {
        fs::create_dir_all(&self.root).await?;

        let (stem, extension) = match file_name.rsplit_once('.') {
            Some((stem, extension)) => (stem, Some(extension)),
            None => (file_name, None),
        };

        let mut attempt = 0u32;
        loop {
            let candidate = match (attempt, extension) {
                (0, _) => file_name.to_string(),
                (n, Some(extension)) => format!("{stem}-{n}.{extension}"),
                (n, None) => format!("{stem}-{n}"),
            };
            let path = self.root.join(&candidate);

            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => {
                    if let Err(e) = write_file(file, bytes).await {
                        if let Err(cleanup) = fs::remove_file(&path).await {
                            log::warn!(
                                "Failed to remove partial file {}: {cleanup}",
                                path.display()
                            );
                        }
                        return Err(e);
                    }
                    return Ok(StoredFile {
                        path: path.to_string_lossy().into_owned(),
                        url: format!("{}/{}", self.base_url, candidate),
                        file_name: candidate,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e),
            }
        }
    }
}

async fn write_file<W>(mut file: W, bytes: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    file.write_all(bytes).await?;
    file.flush().await
}

/// Storage file name for the picture of `sku`.
pub fn image_file_name(sku: &ProductSku) -> String {
    let safe: String = sku
        .as_str()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("image-product-{safe}.jpg")
}

/// Mime type sniffed from the content of a downloaded file.
pub fn infer_mime_type(bytes: &[u8]) -> &'static str {
    infer::get(bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or(FALLBACK_MIME_TYPE)
}

/// Store downloaded bytes and register them as an attachment.
pub async fn register_image<S, R>(
    bytes: &[u8],
    sku: &ProductSku,
    storage: &S,
    repo: &R,
) -> Result<AttachmentId, ImageImportError>
where
    S: MediaStorage,
    R: AttachmentWriter,
{
    let stored = storage.store(&image_file_name(sku), bytes).await?;

    let attachment = NewAttachment {
        file_path: stored.path,
        url: stored.url,
        mime_type: MimeType::new(infer_mime_type(bytes))?,
        title: AttachmentTitle::new(stored.file_name)?,
    };

    Ok(repo.create_attachment(&attachment)?)
}

/// [`ImageImporter`] downloading over HTTP.
pub struct HttpImageImporter<R, S> {
    client: reqwest::Client,
    repo: R,
    storage: S,
}

impl<R, S> HttpImageImporter<R, S> {
    pub fn new(client: reqwest::Client, repo: R, storage: S) -> Self {
        Self {
            client,
            repo,
            storage,
        }
    }
}

#[async_trait]
impl<R, S> ImageImporter for HttpImageImporter<R, S>
where
    R: AttachmentWriter + Send + Sync,
    S: MediaStorage,
{
    async fn import_image(
        &self,
        url: &ImageUrl,
        sku: &ProductSku,
    ) -> Result<AttachmentId, ImageImportError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| ImageImportError::Download(e.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageImportError::Download(e.to_string()))?;

        if bytes.is_empty() {
            return Err(ImageImportError::EmptyBody);
        }

        register_image(&bytes, sku, &self.storage, &self.repo).await
    }
}
