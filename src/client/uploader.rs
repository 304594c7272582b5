use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::client::validator::SelectedFile;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::ParsedResume;

const DEFAULT_FAILURE_MESSAGE: &str = "Failed to parse resume";

/// Sends a selected file somewhere that turns it into a parsed resume.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file: &SelectedFile) -> ClientResult<ParsedResume>;
}

/// HTTP uploader posting to the resume parser's `/upload` endpoint.
#[derive(Debug, Clone)]
pub struct ResumeClient {
    http: reqwest::Client,
    upload_url: String,
}

impl ResumeClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            upload_url: config.upload_url.clone(),
        })
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }
}

#[async_trait]
impl Uploader for ResumeClient {
    async fn upload(&self, file: &SelectedFile) -> ClientResult<ParsedResume> {
        info!(
            file_name = %file.name,
            file_size = file.size,
            url = %self.upload_url,
            "Uploading resume"
        );

        let part = Part::bytes(file.content.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Upload request failed");
                ClientError::Transport(e)
            })?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, body_length = body.len(), "Upload response received");

        interpret_response(status, &body)
    }
}

/// Maps a raw `/upload` response onto the parsed resume or a user-facing error.
pub fn interpret_response(status: u16, body: &str) -> ClientResult<ParsedResume> {
    let json: Option<Value> = serde_json::from_str(body).ok();

    if !(200..300).contains(&status) {
        let message = json
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
        return Err(ClientError::Server { status, message });
    }

    let data = json
        .and_then(|mut value| value.get_mut("data").map(Value::take))
        .filter(Value::is_object)
        .ok_or(ClientError::InvalidResponse)?;

    serde_json::from_value(data).map_err(|e| {
        error!(error = %e, "Upload response did not match the resume shape");
        ClientError::InvalidResponse
    })
}

// `error` is a string from this server; other producers nest it in an object.
fn error_message(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::String(message) if !message.is_empty() => Some(message.clone()),
        Value::Object(detail) => detail
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}
