use std::path::PathBuf;

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Failures seen by the upload client. `Display` is the message shown to the user.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Error: Only PDF and DOC/DOCX files are allowed")]
    UnsupportedType { mime_type: String },

    #[error("Error: File size should be less than {limit_mb}MB")]
    TooLarge { size: u64, limit_mb: u64 },

    #[error("Please select a file")]
    NoFileSelected,

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to reach upload endpoint: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Invalid response format")]
    InvalidResponse,
}

impl ClientError {
    /// True for rejections raised before anything is sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ClientError::UnsupportedType { .. } | ClientError::TooLarge { .. }
        )
    }
}
