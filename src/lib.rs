//! Resume Parser
//!
//! An upload service that extracts structured fields (contact details,
//! education, skills, experience, projects, coding profiles, achievements)
//! from PDF and Word resumes, plus the client that validates, uploads and
//! renders them.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

pub use config::{ClientConfig, Config};
pub use error::{AppError, AppResult, ClientError, ClientResult};
pub use handlers::create_router;
pub use state::AppState;
