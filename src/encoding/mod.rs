//! Selected files and their transmittable encoding
//!
//! A selected file is read into a data URL (`data:{mime};base64,{data}`), then
//! the prefix is removed for png/jpg/jpeg images only. Other declared types are
//! sent as the full data URL.

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static IMAGE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:image/(png|jpg|jpeg);base64,").expect("valid image prefix regex")
});

const DEFAULT_MIME: &str = "application/octet-stream";

/// Where the bytes of a selected file come from
#[derive(Debug, Clone)]
pub enum FileSource {
    Memory(Vec<u8>),
    Disk(PathBuf),
}

/// A file picked by the user, not yet read
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    /// Declared type; inferred from the extension when not given
    pub mime_type: String,
    pub source: FileSource,
}

impl SelectedFile {
    /// In-memory file
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            mime_type: mime_from_name(&name).to_string(),
            name,
            source: FileSource::Memory(bytes),
        }
    }

    /// File on disk, named after its last path component
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            mime_type: mime_from_name(&name).to_string(),
            name,
            source: FileSource::Disk(path.to_path_buf()),
        }
    }

    /// Override the declared type
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Read the raw bytes
    pub async fn read(&self) -> Result<Vec<u8>> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(bytes.clone()),
            FileSource::Disk(path) => tokio::fs::read(path).await.map_err(|source| Error::Read {
                path: path.clone(),
                source,
            }),
        }
    }
}

/// Encoded file ready for the upload call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub filename: String,
    pub data: String,
}

impl EncodedPayload {
    /// Encode already-read bytes of `file`
    pub fn encode(file: &SelectedFile, bytes: &[u8]) -> Self {
        let data_url = to_data_url(&file.mime_type, bytes);
        Self {
            filename: file.name.clone(),
            data: strip_image_prefix(&data_url).to_string(),
        }
    }

    /// Read `file` and encode it
    pub async fn from_file(file: &SelectedFile) -> Result<Self> {
        let bytes = file.read().await?;
        Ok(Self::encode(file, &bytes))
    }
}

/// `data:{mime};base64,{data}`
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Drop the data-URL prefix of png/jpg/jpeg images; anything else is returned as is
pub fn strip_image_prefix(data_url: &str) -> &str {
    match IMAGE_PREFIX.find(data_url) {
        Some(m) => &data_url[m.end()..],
        None => data_url,
    }
}

/// Declared type for a file name, by extension
pub fn mime_from_name(name: &str) -> &'static str {
    let ext = match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return DEFAULT_MIME,
    };
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => DEFAULT_MIME,
    }
}
