//! Multipart intake and on-disk storage shared by material uploads and
//! anonymous assignment uploads.
//!
//! Fields are streamed chunk by chunk; the running size of the `file` part is
//! checked against the configured cap while streaming, so an oversized upload
//! is never buffered. A file that fails the extension or size check is
//! dropped and the reason kept on the form, for the caller to report through
//! [`UploadForm::accept_file`] once its own checks have run. Stored files are
//! named after the MD5 of their content.

pub mod extract;

use crate::error::ApiError;
use actix_multipart::{Field, Multipart};
use futures_util::StreamExt;
use md5::Context;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Longest accepted text field, in bytes.
const MAX_TEXT_FIELD_BYTES: usize = 256 * 1024;

/// A file part received in a multipart form.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// Text fields plus at most one `file` part.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
    rejected_file: Option<String>,
}

impl UploadForm {
    /// Trimmed, non-empty text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Fails with the reason the `file` part was dropped, if it was.
    pub fn accept_file(&self) -> Result<(), ApiError> {
        match &self.rejected_file {
            Some(reason) => Err(ApiError::BadRequest(reason.clone())),
            None => Ok(()),
        }
    }
}

async fn drain(field: &mut Field) -> Result<(), ApiError> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| ApiError::BadRequest(format!("Malformed upload: {}", e)))?;
    }
    Ok(())
}

/// Lowercased extension of `file_name`, without the dot.
pub fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .filter(|e| !e.is_empty())
}

/// Reads the whole form. A file whose extension is not in `allowed`, or
/// that exceeds `max_file_bytes`, is not kept; see [`UploadForm::accept_file`].
pub async fn read_form(
    mut payload: Multipart,
    allowed: &[&str],
    max_file_bytes: usize,
) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ApiError::BadRequest(format!("Malformed upload: {}", e)))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()))
            .unwrap_or_default();

        match name.as_str() {
            "file" => {
                let file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                if file_name.is_empty() {
                    // Browsers send an empty part when no file was picked.
                    drain(&mut field).await?;
                    continue;
                }
                let Some(extension) =
                    extension_of(&file_name).filter(|ext| allowed.contains(&ext.as_str()))
                else {
                    form.rejected_file = Some(format!(
                        "Unsupported file type. Allowed: {}",
                        allowed.join(", ")
                    ));
                    drain(&mut field).await?;
                    continue;
                };

                let mut bytes = Vec::new();
                let mut oversized = false;
                while let Some(chunk) = field.next().await {
                    let chunk =
                        chunk.map_err(|e| ApiError::BadRequest(format!("Malformed upload: {}", e)))?;
                    if oversized {
                        continue;
                    }
                    if bytes.len() + chunk.len() > max_file_bytes {
                        oversized = true;
                        bytes = Vec::new();
                        continue;
                    }
                    bytes.extend_from_slice(&chunk);
                }
                if oversized {
                    form.rejected_file = Some(format!(
                        "File is too large. Maximum size is {} bytes",
                        max_file_bytes
                    ));
                    continue;
                }
                form.file = Some(UploadedFile {
                    file_name,
                    extension,
                    bytes,
                });
            }
            "" => {}
            _ => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk =
                        chunk.map_err(|e| ApiError::BadRequest(format!("Malformed upload: {}", e)))?;
                    if bytes.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
                        return Err(ApiError::BadRequest(format!("Field '{}' is too large", name)));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                let value = String::from_utf8(bytes)
                    .map_err(|_| ApiError::BadRequest(format!("Field '{}' is not valid UTF-8", name)))?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

/// Writes `file` under `dir` as `<md5>.<ext>` and returns the path.
/// Identical uploads share one file on disk.
pub fn store(dir: &Path, file: &UploadedFile) -> Result<PathBuf, ApiError> {
    std::fs::create_dir_all(dir)?;
    let mut hasher = Context::new();
    hasher.consume(&file.bytes);
    let digest = format!("{:x}", hasher.finalize());
    let path = dir.join(format!("{}.{}", digest, file.extension));
    if !path.exists() {
        std::fs::write(&path, &file.bytes)?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(extension_of("Essay.DOCX").as_deref(), Some("docx"));
        assert_eq!(extension_of("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of("trailing."), None);
    }

    #[test]
    fn store_names_files_by_content_hash() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = UploadedFile {
            file_name: "answer.txt".to_string(),
            extension: "txt".to_string(),
            bytes: b"my homework".to_vec(),
        };
        let first = store(dir.path(), &file).expect("store");
        let second = store(dir.path(), &file).expect("store again");
        assert_eq!(first, second);
        assert_eq!(std::fs::read(&first).expect("read"), b"my homework");
        let name = first.file_name().and_then(|n| n.to_str()).expect("name");
        assert!(name.ends_with(".txt"));
        assert_eq!(name.len(), 32 + 4);
    }
}
