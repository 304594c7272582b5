//! Upload client: file selection and validation, the multipart upload and
//! rendering of the parsed result.

pub mod render;
pub mod session;
pub mod uploader;
pub mod validator;

pub use render::{cards, file_type_text, format_bytes, render_resume, Card};
pub use session::{StatusKind, UploadSession, DROP_ZONE_PROMPT};
pub use uploader::{interpret_response, ResumeClient, Uploader};
pub use validator::{FileValidator, SelectedFile};
