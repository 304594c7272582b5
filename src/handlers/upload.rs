use std::time::{Duration, Instant};

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::Json,
    Extension,
};
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::models::{DocumentKind, UploadResponse, UploadedFile};
use crate::services::parse_resume;
use crate::state::AppState;

const BYTES_PER_MB: usize = 1024 * 1024;

/// `POST /upload`: accepts a resume in the `file` form field and returns the
/// structured fields found in it.
pub async fn upload_handler(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let start = Instant::now();
    let limits = UploadLimits {
        limit_mb: state.config.max_file_size_mb,
        declared_bytes: headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok()),
    };

    info!(request_id = %request_id, "Received file upload request");

    let file = match extract_file_from_multipart(&mut multipart, &limits).await {
        Ok(file) => {
            info!(
                request_id = %request_id,
                file_name = %file.name,
                file_size = file.size,
                "File extracted from multipart form"
            );
            file
        }
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Rejected upload");
            return Err(e);
        }
    };

    let max_size_bytes = state.config.max_file_size_bytes();
    if file.size > max_size_bytes {
        warn!(
            request_id = %request_id,
            file_size = file.size,
            max_size = max_size_bytes,
            "File size exceeds limit"
        );
        return Err(AppError::FileTooLarge {
            size: megabytes_rounded_up(file.size),
            limit: state.config.max_file_size_mb,
        });
    }

    let extractor = state.extractor.clone();
    let timeout = Duration::from_secs(state.config.request_timeout_seconds);
    let task = tokio::task::spawn_blocking(move || {
        let extraction = extractor.extract_text(&file)?;
        info!("Extracting information from resume");
        Ok::<_, AppError>((parse_resume(&extraction.text), extraction))
    });

    let (parsed, extraction) = match tokio::time::timeout(timeout, task).await? {
        Ok(Ok(done)) => done,
        Ok(Err(e)) => {
            error!(request_id = %request_id, error = %e, "Error processing file");
            return Err(e);
        }
        Err(join_err) => {
            error!(request_id = %request_id, error = %join_err, "Extraction task failed");
            return Err(AppError::internal(format!("Extraction task failed: {}", join_err)));
        }
    };

    let total_time = start.elapsed().as_millis() as u64;
    info!(
        request_id = %request_id,
        kind = ?extraction.kind,
        pages = ?extraction.pages,
        text_length = extraction.text.len(),
        extraction_time_ms = extraction.processing_time_ms,
        total_time_ms = total_time,
        "Successfully processed resume"
    );
    debug!(request_id = %request_id, data = ?parsed, "Response data");

    Ok(Json(UploadResponse::new(parsed)))
}

struct UploadLimits {
    limit_mb: usize,
    declared_bytes: Option<usize>,
}

impl UploadLimits {
    /// Body-limit rejections become `FileTooLarge`; anything else is a malformed upload.
    fn reject(&self, err: MultipartError, context: &str) -> AppError {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            // Without a Content-Length the body is only known to exceed the limit.
            let size = self
                .declared_bytes
                .map(megabytes_rounded_up)
                .unwrap_or(self.limit_mb + 1);
            return AppError::FileTooLarge {
                size,
                limit: self.limit_mb,
            };
        }
        AppError::invalid_upload(format!("{}: {}", context, err.body_text()))
    }
}

fn megabytes_rounded_up(bytes: usize) -> usize {
    bytes.div_ceil(BYTES_PER_MB)
}

async fn extract_file_from_multipart(
    multipart: &mut Multipart,
    limits: &UploadLimits,
) -> AppResult<UploadedFile> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| limits.reject(e, "Failed to read multipart field"))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("").to_string();
        if original_name.is_empty() {
            return Err(AppError::NoSelectedFile);
        }
        let Some(kind) = DocumentKind::from_file_name(&original_name) else {
            return Err(AppError::InvalidFileType);
        };

        let content_type = field.content_type().map(|ct| ct.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| limits.reject(e, "Failed to read file data"))?;

        if data.is_empty() {
            return Err(AppError::invalid_upload("File is empty"));
        }

        let mut file = UploadedFile::new(secure_filename_for(&original_name, kind), data.to_vec());
        if let Some(mime_type) = content_type {
            file = file.with_mime_type(mime_type);
        }

        debug!(
            "Extracted file: {} ({} bytes, type: {:?})",
            file.name,
            file.size,
            file.mime_type
        );

        return Ok(file);
    }

    Err(AppError::MissingFile)
}

/// Reduces a client-supplied file name to a safe ASCII name without path
/// components. May return an empty string.
pub fn secure_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

// Falls back to a generic name when sanitising strips the extension away.
fn secure_filename_for(name: &str, kind: DocumentKind) -> String {
    let secured = secure_filename(name);
    if DocumentKind::from_file_name(&secured) == Some(kind) {
        secured
    } else {
        let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
        format!("upload.{}", ext.unwrap_or_default())
    }
}
