use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use lopdf::Document;
use tempfile::NamedTempFile;

use crate::error::{AppError, AppResult};
use crate::models::{DocumentKind, UploadedFile};

/// Turns an uploaded resume into plain text, one line per paragraph.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    upload_dir: PathBuf,
}

#[derive(Debug)]
pub struct ExtractionResult {
    pub text: String,
    pub kind: DocumentKind,
    pub pages: Option<usize>,
    pub processing_time_ms: u64,
}

impl TextExtractor {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    /// Stages the upload in the upload directory, extracts its text and
    /// removes the staged copy again whether or not extraction succeeded.
    pub fn extract_text(&self, file: &UploadedFile) -> AppResult<ExtractionResult> {
        let start = Instant::now();
        let kind = file.kind().ok_or(AppError::InvalidFileType)?;

        tracing::info!(
            "Starting text extraction for file: {} ({} bytes, {:?})",
            file.name,
            file.size,
            kind
        );

        let staged = self.stage(file)?;
        tracing::info!("Saving file to {}", staged.path().display());

        let result = match kind {
            DocumentKind::Pdf => {
                tracing::info!("Processing PDF file");
                extract_pdf(staged.path(), &file.content)
            }
            // Legacy .doc uploads go through the same reader and fail there if
            // they are not OOXML underneath.
            DocumentKind::Doc | DocumentKind::Docx => {
                tracing::info!("Processing DOCX file");
                extract_docx(staged.path()).map(|text| (text, None))
            }
        };

        if let Err(e) = staged.close() {
            tracing::warn!("Failed to remove staged upload: {}", e);
        } else {
            tracing::info!("Cleaned up uploaded file");
        }

        let (text, pages) = result?;
        let processing_time_ms = start.elapsed().as_millis() as u64;

        if text.trim().is_empty() {
            tracing::warn!(file_name = %file.name, "No text extracted from document");
        }

        tracing::info!(
            "Text extraction completed in {}ms, extracted {} characters",
            processing_time_ms,
            text.len()
        );

        Ok(ExtractionResult {
            text,
            kind,
            pages,
            processing_time_ms,
        })
    }

    fn stage(&self, file: &UploadedFile) -> AppResult<NamedTempFile> {
        let (stem, ext) = file
            .name
            .rsplit_once('.')
            .unwrap_or((file.name.as_str(), ""));

        let mut staged = tempfile::Builder::new()
            .prefix(&format!("{}-", stem))
            .suffix(&format!(".{}", ext))
            .tempfile_in(&self.upload_dir)
            .map_err(|e| AppError::internal(format!("Failed to create staging file: {}", e)))?;

        staged
            .write_all(&file.content)
            .map_err(|e| AppError::internal(format!("Failed to write upload to disk: {}", e)))?;

        Ok(staged)
    }

    /// The upload directory must exist and be writable.
    pub fn is_available(&self) -> bool {
        std::fs::metadata(&self.upload_dir)
            .map(|meta| meta.is_dir() && !meta.permissions().readonly())
            .unwrap_or(false)
    }
}

fn extract_pdf(path: &Path, content: &[u8]) -> AppResult<(String, Option<usize>)> {
    let pages = match Document::load_mem(content) {
        Ok(doc) => Some(doc.get_pages().len()),
        Err(e) => {
            tracing::warn!("PDF structure validation failed: {}, will try text extraction anyway", e);
            None
        }
    };

    let text = pdf_extract::extract_text(path)
        .map_err(|e| AppError::extraction(format!("PDF text extraction failed: {}", e)))?;

    tracing::debug!("PDF text extraction successful, {} characters", text.len());
    Ok((text, pages))
}

fn extract_docx(path: &Path) -> AppResult<String> {
    let data = std::fs::read(path)?;
    let docx = docx_rs::read_docx(&data)
        .map_err(|e| AppError::extraction(format!("Failed to read Word document: {}", e)))?;

    let mut text = String::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            for paragraph_child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = paragraph_child {
                    for run_child in run.children {
                        if let docx_rs::RunChild::Text(t) = run_child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }

    tracing::debug!("DOCX text extraction successful, {} characters", text.len());
    Ok(text)
}
