use std::path::{Path, PathBuf};

use axum::body::Bytes;
use tokio::fs::File;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    config::Config,
    utils::file::{display_filename, file_extension, sanitize_filename},
    Error, Result,
};

/// An uploaded file that has not been written to disk yet.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub original_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// `filename` is `<uuid>_<client name>` and restores the client's name for
/// downloads. `filepath` points at `<uuid>_<sanitized name>` on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub filename: String,
    pub filepath: String,
}

/// Local filesystem storage for post attachments.
///
/// Files are written to the upload directory as `<uuid>_<sanitized name>` so
/// two uploads of the same file never collide and no client name reaches the
/// filesystem.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    upload_dir: PathBuf,
    max_file_size: u64,
    allowed_extensions: Vec<String>,
}

impl LocalStorage {
    pub fn new(config: &Config) -> Self {
        Self {
            upload_dir: config.upload_dir.clone(),
            max_file_size: config.max_file_size,
            allowed_extensions: config.allowed_extensions.clone(),
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        Ok(())
    }

    /// Size and extension checks. Runs before anything touches the disk or
    /// the database.
    pub fn check(&self, attachment: &Attachment) -> Result<()> {
        if attachment.data.len() as u64 > self.max_file_size {
            return Err(Error::FileTooLarge(self.max_file_size));
        }

        let extension = file_extension(&attachment.original_name);
        if !self.allowed_extensions.iter().any(|e| *e == extension) {
            warn!(
                filename = %attachment.original_name,
                "Rejected attachment with disallowed extension"
            );
            return Err(Error::UnsupportedFileType(extension));
        }

        Ok(())
    }

    pub async fn store(&self, attachment: &Attachment) -> Result<StoredFile> {
        self.check(attachment)?;
        self.ensure_dir().await?;

        let id = Uuid::now_v7();
        let filename = format!("{}_{}", id, display_filename(&attachment.original_name));
        let path = self
            .upload_dir
            .join(format!("{}_{}", id, sanitize_filename(&attachment.original_name)));

        tokio::fs::write(&path, &attachment.data).await?;

        info!(
            original = %attachment.original_name,
            stored = %filename,
            content_type = ?attachment.content_type,
            size = attachment.data.len(),
            "Attachment saved"
        );

        Ok(StoredFile {
            filename,
            filepath: path.to_string_lossy().into_owned(),
        })
    }

    /// Best-effort removal. Failures are logged and never returned.
    pub async fn delete(&self, filepath: &str) {
        match tokio::fs::remove_file(filepath).await {
            Ok(()) => info!(filepath, "Attachment deleted"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(filepath, "Attachment already missing")
            }
            Err(err) => error!(filepath, "Failed to delete attachment: {}", err),
        }
    }

    /// Opens a stored attachment for download, returning the handle and its length.
    pub async fn open(&self, filepath: &str) -> Result<(File, u64)> {
        let path = Path::new(filepath);

        let metadata = tokio::fs::metadata(path).await.map_err(|err| {
            warn!(filepath, "Attachment not readable: {}", err);
            Error::AttachmentMissing
        })?;

        if !metadata.is_file() {
            return Err(Error::AttachmentMissing);
        }
        if metadata.len() > self.max_file_size {
            return Err(Error::FileTooLarge(self.max_file_size));
        }

        let file = File::open(path).await.map_err(|err| {
            warn!(filepath, "Attachment not readable: {}", err);
            Error::AttachmentMissing
        })?;

        Ok((file, metadata.len()))
    }
}

/// Strips the generated `<uuid>_` prefix from a stored filename.
pub fn original_name(stored: &str) -> &str {
    const PREFIX_LEN: usize = 36;

    match stored.get(..PREFIX_LEN) {
        Some(prefix)
            if stored.as_bytes().get(PREFIX_LEN) == Some(&b'_')
                && Uuid::parse_str(prefix).is_ok() =>
        {
            &stored[PREFIX_LEN + 1..]
        }
        _ => stored,
    }
}
