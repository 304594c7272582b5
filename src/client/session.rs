use tracing::{info, warn};

use crate::client::render::{file_type_text, format_bytes};
use crate::client::uploader::Uploader;
use crate::client::validator::{FileValidator, SelectedFile};
use crate::error::ClientError;
use crate::models::ParsedResume;

pub const DROP_ZONE_PROMPT: &str = "Drag & Drop your resume here or click to browse";

const STATUS_PARSING: &str = "Parsing resume...";
const STATUS_PARSED: &str = "Resume parsed successfully!";
const STATUS_FAILED: &str = "Upload failed: Server error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// State behind the upload view: select or drop a file, submit it, then
/// show either the parsed result or an error.
#[derive(Debug, Default)]
pub struct UploadSession {
    validator: FileValidator,
    file: Option<SelectedFile>,
    status: String,
    error: Option<String>,
    dragging: bool,
    loading: bool,
    parsed: Option<ParsedResume>,
}

impl UploadSession {
    pub fn new(validator: FileValidator) -> Self {
        Self {
            validator,
            ..Self::default()
        }
    }

    /// File picker change. An invalid pick clears the current selection.
    pub fn select_file(&mut self, file: Option<SelectedFile>) {
        let Some(file) = file else {
            return;
        };

        match self.validator.validate(&file) {
            Ok(()) => self.accept(file),
            Err(e) => {
                warn!(file_name = %file.name, error = %e, "Rejected selected file");
                self.status = e.to_string();
                self.file = None;
                self.parsed = None;
                self.error = None;
            }
        }
    }

    pub fn drag_over(&mut self) {
        self.dragging = true;
    }

    pub fn drag_leave(&mut self) {
        self.dragging = false;
    }

    /// Drop onto the zone. An invalid drop only reports, keeping any earlier selection.
    pub fn drop_file(&mut self, file: Option<SelectedFile>) {
        self.dragging = false;
        let Some(file) = file else {
            return;
        };

        match self.validator.validate(&file) {
            Ok(()) => self.accept(file),
            Err(e) => {
                warn!(file_name = %file.name, error = %e, "Rejected dropped file");
                self.status = e.to_string();
            }
        }
    }

    fn accept(&mut self, file: SelectedFile) {
        info!(file_name = %file.name, file_size = file.size, "File selected");
        self.file = Some(file);
        self.status.clear();
        self.parsed = None;
        self.error = None;
    }

    /// Uploads the selected file. The selection is dropped only on success.
    pub async fn submit<U: Uploader + ?Sized>(&mut self, uploader: &U) {
        let Some(file) = self.file.as_ref() else {
            self.error = Some(ClientError::NoFileSelected.to_string());
            return;
        };

        self.loading = true;
        self.error = None;
        self.status = STATUS_PARSING.to_string();

        match uploader.upload(file).await {
            Ok(parsed) => {
                info!("Resume parsed successfully");
                self.status = STATUS_PARSED.to_string();
                self.parsed = Some(parsed);
                self.file = None;
            }
            Err(e) => {
                warn!(error = %e, "Resume upload failed");
                self.error = Some(e.to_string());
                self.status = STATUS_FAILED.to_string();
                self.parsed = None;
            }
        }

        self.loading = false;
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.validator);
    }

    pub fn can_submit(&self) -> bool {
        self.file.is_some() && !self.loading
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        (!self.status.is_empty()).then_some(self.status.as_str())
    }

    pub fn status_kind(&self) -> StatusKind {
        if self.status.contains("success") {
            StatusKind::Success
        } else {
            StatusKind::Error
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn parsed(&self) -> Option<&ParsedResume> {
        self.parsed.as_ref()
    }

    pub fn button_label(&self) -> &'static str {
        if self.loading {
            "Parsing..."
        } else {
            "Parse Resume"
        }
    }

    /// Text inside the drop zone: the chosen file's name or the prompt.
    pub fn drop_zone_text(&self) -> &str {
        self.file
            .as_ref()
            .map(|f| f.name.as_str())
            .unwrap_or(DROP_ZONE_PROMPT)
    }

    /// Hint under the drop zone, quoting the same ceiling the validator enforces.
    pub fn allowed_types_hint(&self) -> String {
        format!(
            "Allowed types: PDF, DOC, DOCX (Max: {}MB)",
            self.validator.max_size_mb()
        )
    }

    /// `PDF • 1.5 KB` style summary of the selection.
    pub fn file_summary(&self) -> Option<String> {
        self.file.as_ref().map(|f| {
            format!("{} • {}", file_type_text(&f.mime_type), format_bytes(f.size))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientResult;
    use crate::models::{MIME_DOCX, MIME_PDF};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubUploader {
        calls: AtomicUsize,
        fail_with: Option<String>,
    }

    impl StubUploader {
        fn ok() -> Self {
            Self { calls: AtomicUsize::new(0), fail_with: None }
        }

        fn failing(message: &str) -> Self {
            Self { calls: AtomicUsize::new(0), fail_with: Some(message.to_string()) }
        }
    }

    #[async_trait]
    impl Uploader for StubUploader {
        async fn upload(&self, file: &SelectedFile) -> ClientResult<ParsedResume> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.fail_with {
                Some(message) => Err(ClientError::Server { status: 500, message: message.clone() }),
                None => Ok(ParsedResume { name: file.name.clone(), ..ParsedResume::default() }),
            }
        }
    }

    fn pdf(name: &str, size: usize) -> SelectedFile {
        SelectedFile::new(name, MIME_PDF, vec![0u8; size])
    }

    #[test]
    fn valid_selection_is_kept() {
        let mut session = UploadSession::default();
        session.select_file(Some(pdf("cv.pdf", 1536)));

        assert!(session.can_submit());
        assert_eq!(session.status(), None);
        assert_eq!(session.drop_zone_text(), "cv.pdf");
        assert_eq!(session.file_summary().as_deref(), Some("PDF • 1.5 KB"));
    }

    #[test]
    fn invalid_selection_clears_previous_file() {
        let mut session = UploadSession::default();
        session.select_file(Some(pdf("cv.pdf", 10)));
        session.select_file(Some(SelectedFile::new("photo.png", "image/png", vec![1])));

        assert!(session.selected_file().is_none());
        assert_eq!(session.status(), Some("Error: Only PDF and DOC/DOCX files are allowed"));
        assert_eq!(session.status_kind(), StatusKind::Error);
        assert_eq!(session.drop_zone_text(), DROP_ZONE_PROMPT);
    }

    #[test]
    fn invalid_drop_keeps_previous_file() {
        let mut session = UploadSession::default();
        session.drop_file(Some(SelectedFile::new("cv.docx", MIME_DOCX, vec![1, 2])));
        session.drag_over();
        assert!(session.is_dragging());

        session.drop_file(Some(pdf("huge.pdf", 10 * 1024 * 1024 + 1)));
        assert!(!session.is_dragging());
        assert_eq!(session.selected_file().map(|f| f.name.as_str()), Some("cv.docx"));
        assert_eq!(session.status(), Some("Error: File size should be less than 10MB"));
    }

    #[test]
    fn hint_quotes_the_configured_limit() {
        assert_eq!(
            UploadSession::default().allowed_types_hint(),
            "Allowed types: PDF, DOC, DOCX (Max: 10MB)"
        );

        let mut session = UploadSession::new(FileValidator::new(5 * 1024 * 1024));
        assert_eq!(session.allowed_types_hint(), "Allowed types: PDF, DOC, DOCX (Max: 5MB)");
        session.select_file(Some(pdf("cv.pdf", 6 * 1024 * 1024)));
        assert_eq!(session.status(), Some("Error: File size should be less than 5MB"));
    }

    #[test]
    fn drag_leave_resets_highlight() {
        let mut session = UploadSession::default();
        session.drag_over();
        session.drag_leave();
        assert!(!session.is_dragging());
        session.drop_file(None);
        assert!(session.selected_file().is_none());
    }

    #[tokio::test]
    async fn submit_without_file_reports_error() {
        let uploader = StubUploader::ok();
        let mut session = UploadSession::default();
        session.submit(&uploader).await;

        assert_eq!(session.error(), Some("Please select a file"));
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_submit_stores_result_and_clears_file() {
        let uploader = StubUploader::ok();
        let mut session = UploadSession::default();
        session.select_file(Some(pdf("cv.pdf", 10)));
        session.submit(&uploader).await;

        assert_eq!(session.status(), Some("Resume parsed successfully!"));
        assert_eq!(session.status_kind(), StatusKind::Success);
        assert_eq!(session.parsed().map(|p| p.name.as_str()), Some("cv.pdf"));
        assert!(session.selected_file().is_none());
        assert!(!session.is_loading());
        assert_eq!(session.button_label(), "Parse Resume");
    }

    #[tokio::test]
    async fn failed_submit_keeps_file_for_retry() {
        let uploader = StubUploader::failing("Invalid file type");
        let mut session = UploadSession::default();
        session.select_file(Some(pdf("cv.pdf", 10)));
        session.submit(&uploader).await;

        assert_eq!(session.error(), Some("Invalid file type"));
        assert_eq!(session.status(), Some("Upload failed: Server error"));
        assert!(session.parsed().is_none());
        assert!(session.can_submit());

        session.clear();
        assert!(session.selected_file().is_none());
        assert_eq!(session.status(), None);
    }
}
