//! Command-line front end for the resume upload flow: validates a local
//! file, uploads it and prints the parsed result as cards or JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use resume_parser::client::{
    render_resume, FileValidator, ResumeClient, SelectedFile, StatusKind, UploadSession,
};
use resume_parser::ClientConfig;

#[derive(Debug, Parser)]
#[command(name = "resume-cli", version, about = "Upload a resume and show the parsed fields")]
struct Cli {
    /// Resume to upload (PDF, DOC or DOCX)
    file: PathBuf,

    /// Upload endpoint; defaults to RESUME_API_URL or http://localhost:5000/upload
    #[arg(long, env = "RESUME_API_URL")]
    endpoint: Option<String>,

    /// Print the parsed result as JSON instead of cards
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("resume_parser=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(endpoint) = cli.endpoint {
        config = config.with_upload_url(endpoint);
    }

    let client = ResumeClient::new(&config).context("Failed to build HTTP client")?;
    let mut session = UploadSession::new(FileValidator::new(config.max_file_size_bytes()));

    let file = SelectedFile::from_path(&cli.file)
        .await
        .with_context(|| format!("Could not open {}", cli.file.display()))?;
    session.select_file(Some(file));

    if !session.can_submit() {
        if let Some(status) = session.status() {
            eprintln!("{status}");
        }
        eprintln!("{}", session.allowed_types_hint());
        return Ok(ExitCode::FAILURE);
    }

    eprintln!("{}", session.drop_zone_text());
    if let Some(summary) = session.file_summary() {
        eprintln!("{summary}");
    }
    eprintln!("Uploading to {} ...", client.upload_url());

    session.submit(&client).await;

    if let Some(status) = session.status() {
        eprintln!("{status}");
    }
    if let Some(error) = session.error() {
        eprintln!("Error: {error}");
    }

    match (session.status_kind(), session.parsed()) {
        (StatusKind::Success, Some(parsed)) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(parsed)?);
            } else {
                print!("{}", render_resume(parsed));
            }
            Ok(ExitCode::SUCCESS)
        }
        _ => Ok(ExitCode::FAILURE),
    }
}
