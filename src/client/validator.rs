use std::path::Path;

use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::models::DocumentKind;

pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const FALLBACK_MIME: &str = "application/octet-stream";

/// A file the user picked or dropped, held until it is uploaded or replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub content: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        let size = content.len() as u64;
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            content,
        }
    }

    /// Reads a file from disk, deriving its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = DocumentKind::from_file_name(&name)
            .map(|kind| kind.mime_type())
            .unwrap_or(FALLBACK_MIME);

        debug!(file_name = %name, mime_type, size = content.len(), "Read file from disk");
        Ok(Self::new(name, mime_type, content))
    }

    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_mime_type(&self.mime_type)
    }
}

/// Allow-list and size guard applied before any upload.
#[derive(Debug, Clone, Copy)]
pub struct FileValidator {
    max_size_bytes: u64,
}

impl FileValidator {
    pub fn new(max_size_bytes: u64) -> Self {
        Self { max_size_bytes }
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// The ceiling in whole megabytes, as shown to the user.
    pub fn max_size_mb(&self) -> u64 {
        self.max_size_bytes / (1024 * 1024)
    }

    pub fn validate(&self, file: &SelectedFile) -> ClientResult<()> {
        if file.kind().is_none() {
            return Err(ClientError::UnsupportedType {
                mime_type: file.mime_type.clone(),
            });
        }

        if file.size > self.max_size_bytes {
            return Err(ClientError::TooLarge {
                size: file.size,
                limit_mb: self.max_size_mb(),
            });
        }

        Ok(())
    }
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new(MAX_FILE_SIZE_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MIME_DOC, MIME_DOCX, MIME_PDF};

    fn sized(mime: &str, size: u64) -> SelectedFile {
        SelectedFile {
            name: "resume".to_string(),
            mime_type: mime.to_string(),
            size,
            content: Vec::new(),
        }
    }

    #[test]
    fn accepts_allowed_types_up_to_the_limit() {
        let validator = FileValidator::default();
        for mime in [MIME_PDF, MIME_DOC, MIME_DOCX] {
            assert!(validator.validate(&sized(mime, 1024)).is_ok());
        }
        assert!(validator.validate(&sized(MIME_PDF, MAX_FILE_SIZE_BYTES)).is_ok());
    }

    #[test]
    fn rejects_other_types() {
        let err = FileValidator::default()
            .validate(&sized("image/png", 10))
            .unwrap_err();
        assert_eq!(err.to_string(), "Error: Only PDF and DOC/DOCX files are allowed");
        assert!(err.is_validation());
    }

    #[test]
    fn rejects_files_over_ten_megabytes() {
        let err = FileValidator::default()
            .validate(&sized(MIME_DOCX, MAX_FILE_SIZE_BYTES + 1))
            .unwrap_err();
        assert_eq!(err.to_string(), "Error: File size should be less than 10MB");
    }

    #[test]
    fn type_is_checked_before_size() {
        let err = FileValidator::default()
            .validate(&sized("text/plain", MAX_FILE_SIZE_BYTES * 2))
            .unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedType { .. }));
    }

    #[tokio::test]
    async fn from_path_derives_mime_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.docx");
        std::fs::write(&path, b"PK").unwrap();

        let file = SelectedFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "cv.docx");
        assert_eq!(file.mime_type, MIME_DOCX);
        assert_eq!(file.size, 2);

        let other = dir.path().join("notes.txt");
        std::fs::write(&other, b"hi").unwrap();
        let file = SelectedFile::from_path(&other).await.unwrap();
        assert_eq!(file.mime_type, "application/octet-stream");
        assert!(file.kind().is_none());
    }

    #[tokio::test]
    async fn from_path_reports_missing_files() {
        let err = SelectedFile::from_path("/no/such/resume.pdf").await.unwrap_err();
        assert!(matches!(err, ClientError::Io { .. }));
    }
}
