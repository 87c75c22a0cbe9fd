use std::fmt::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::decode::decode_text;
use crate::preview::prepare_preview_content;
use crate::{ApiError, FailureKind, PageContent};

/// A file on disk the operator wants to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Stable identity derived from the absolute path.
    pub file_id: String,
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub extension: Option<String>,
}

/// Stats `path` and derives the identity used to track its upload.
pub fn inspect_local_file(path: &Path) -> Result<LocalFile, ApiError> {
    let path = std::path::absolute(path).map_err(|err| io_error(path, &err))?;
    let metadata = std::fs::metadata(&path).map_err(|err| io_error(&path, &err))?;
    if !metadata.is_file() {
        return Err(ApiError::new(
            FailureKind::Io,
            format!("{} is not a regular file", path.display()),
        ));
    }
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string());
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    Ok(LocalFile {
        file_id: short_hash(&path.to_string_lossy()),
        name,
        size: metadata.len(),
        extension,
        path,
    })
}

/// Reads, decodes and truncates a local file for the preview pane.
pub async fn read_local_preview(path: &Path, name: &str) -> Result<PageContent, ApiError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| io_error(path, &err))?;
    let decoded =
        decode_text(&bytes).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
    Ok(PageContent {
        title: name.to_string(),
        content: prepare_preview_content(&decoded.text),
    })
}

pub(crate) fn io_error(path: &Path, err: &std::io::Error) -> ApiError {
    ApiError::new(FailureKind::Io, format!("{}: {err}", path.display()))
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
