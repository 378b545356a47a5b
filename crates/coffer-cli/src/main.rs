use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coffer_core::config::Config;
use coffer_core::domain::{ExpireIn, Job, Project, RawArtifactParams, Sha256Digest, UploadedFile};
use coffer_core::impls::{InMemoryArtifactStore, RecordingErrorTracker};
use coffer_core::ports::{ArtifactStore, Clock, IdGenerator, SystemClock, UlidGenerator};
use coffer_core::ServiceBuilder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "coffer")]
#[command(version)]
#[command(about = "Ingest CI job artifacts")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "COFFER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store an artifact file (and optional metadata) for a new job
    Ingest {
        /// Artifact file to upload
        file: PathBuf,

        /// Declared SHA-256 of the artifact file
        #[arg(long)]
        sha256: String,

        /// Artifact type (archive, junit, trace, ...)
        #[arg(long = "type", default_value = "archive")]
        artifact_type: String,

        /// Artifact format (zip, gzip, raw)
        #[arg(long = "format", default_value = "zip")]
        artifact_format: String,

        /// Expiration, e.g. "2 hours", "1 day" or "never"
        #[arg(long)]
        expire_in: Option<String>,

        /// Metadata file stored next to the artifact
        #[arg(long, requires = "metadata_sha256")]
        metadata: Option<PathBuf>,

        /// Declared SHA-256 of the metadata file
        #[arg(long, requires = "metadata")]
        metadata_sha256: Option<String>,

        /// Project path the job belongs to
        #[arg(long, default_value = "local/project")]
        project: String,

        /// Job name
        #[arg(long, default_value = "build")]
        job_name: String,
    },

    /// Show the deadline an expire_in value resolves to
    ExpireIn {
        value: String,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("coffer_core={log_level},coffer={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Ingest {
            file,
            sha256,
            artifact_type,
            artifact_format,
            expire_in,
            metadata,
            metadata_sha256,
            project,
            job_name,
        } => {
            let artifacts_file = UploadedFile::new(file, parse_sha256(&sha256)?);
            let metadata_file = match (metadata, metadata_sha256) {
                (Some(path), Some(sha)) => Some(UploadedFile::new(path, parse_sha256(&sha)?)),
                _ => None,
            };
            let mut params = RawArtifactParams::new(artifact_type, artifact_format);
            params.expire_in = expire_in;

            let success = ingest(
                &config,
                &project,
                &job_name,
                &artifacts_file,
                &params,
                metadata_file.as_ref(),
            )
            .await?;
            if !success {
                std::process::exit(1);
            }
        }
        Commands::ExpireIn { value } => {
            let expire_in = ExpireIn::parse(&value)?;
            match expire_in.deadline_from(SystemClock.now())? {
                Some(deadline) => println!("{expire_in} -> {}", deadline.to_rfc3339()),
                None => println!("never expires"),
            }
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn parse_sha256(raw: &str) -> Result<Sha256Digest> {
    Sha256Digest::parse(raw).with_context(|| format!("invalid sha256 {raw:?}"))
}

/// Run one ingest against a fresh in-memory job and print the response and
/// the resulting artifacts as JSON. Returns whether the ingest succeeded.
async fn ingest(
    config: &Config,
    project_path: &str,
    job_name: &str,
    artifacts_file: &UploadedFile,
    params: &RawArtifactParams,
    metadata_file: Option<&UploadedFile>,
) -> Result<bool> {
    let store = Arc::new(InMemoryArtifactStore::new());
    let tracker = Arc::new(RecordingErrorTracker::new());
    let ids = UlidGenerator::new(SystemClock);

    let project = Project {
        id: ids.generate_project_id(),
        path: project_path.to_string(),
    };
    let job = Job::new(ids.generate_job_id(), project.id, job_name);
    store.create_project(project).await?;
    store.create_job(job.clone()).await?;

    let service = ServiceBuilder::from_config(config)?
        .artifact_store(store.clone())
        .error_tracker(tracker.clone())
        .build()?;

    let response = service
        .execute(&job, artifacts_file, params, metadata_file)
        .await;

    let artifacts = store.list_for_job(job.id).await?;
    let job = store.find_job(job.id).await?.unwrap_or(job);
    let report = serde_json::json!({
        "response": response,
        "job": job,
        "artifacts": artifacts,
        "tracked_errors": tracker.tracked().len(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(response.is_success())
}
