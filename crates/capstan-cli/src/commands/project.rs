//! Implementation of the `capstan project` command.
//!
//! The compound flow: build a container image for the working tree,
//! tag it `{team}/{project}:{git revision}`, then apply every service
//! manifest the project lists with its `image` pointed at the new tag.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use capstan_core::{ClientError, DeployClient, ManifestError, ProjectV1, Service};
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::config::CliConfig;
use crate::output;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Failed to read {}: {}", .0.display(), .1)]
    ReadFailed(PathBuf, String),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Project lists no services: nothing to apply")]
    NoServices,

    #[error("Git not found on PATH")]
    GitNotFound,

    #[error("Docker not found on PATH")]
    DockerNotFound,

    #[error("Failed to get git revision: {0}")]
    Git(String),

    #[error("Image build failed: {0}")]
    BuildFailed(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Apply of {0} rejected: endpoint answered {1}")]
    ApplyRejected(String, String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Arguments for the project command.
pub struct ProjectArgs {
    /// Project manifest file.
    pub file: PathBuf,

    /// Dockerfile the image is built from.
    pub dockerfile: PathBuf,

    /// Endpoint override from the command line.
    pub endpoint: Option<String>,
}

pub async fn run(config: &CliConfig, args: ProjectArgs) -> Result<(), ProjectError> {
    let bytes = std::fs::read(&args.file)
        .map_err(|e| ProjectError::ReadFailed(args.file.clone(), e.to_string()))?;
    let project = ProjectV1::from_slice(&bytes)?;

    if project.services.is_empty() {
        return Err(ProjectError::NoServices);
    }

    check_prerequisites()?;

    let revision = git_short_revision()?;
    let tag = project.image_tag(&revision)?;

    output::step(&format!("building image {tag}"));
    build_image(&tag, &args.dockerfile).await?;

    let endpoint = resolve_endpoint(config, args.endpoint, &project.endpoint);
    debug!(%endpoint, services = project.services.len(), "applying project services");
    let client = DeployClient::new(endpoint, config.timeout())?;

    for path in &project.services {
        let service = load_service(path, &tag)?;
        let label = match service.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => path.clone(),
        };

        output::step(&format!("applying {label}"));
        let response = client.apply_service(&service).await?;
        output::print_body(&response.body);

        if !response.is_success() {
            return Err(ProjectError::ApplyRejected(
                label,
                response.status.to_string(),
            ));
        }
    }

    output::success(&format!(
        "applied {} service(s) with image {tag}",
        project.services.len()
    ));
    Ok(())
}

fn check_prerequisites() -> Result<(), ProjectError> {
    if which::which("git").is_err() {
        return Err(ProjectError::GitNotFound);
    }
    if which::which("docker").is_err() {
        return Err(ProjectError::DockerNotFound);
    }
    Ok(())
}

/// Endpoint precedence: `--endpoint` flag, then the project manifest,
/// then configuration (which falls back to the local default).
fn resolve_endpoint(config: &CliConfig, flag: Option<String>, manifest: &str) -> String {
    if let Some(endpoint) = flag {
        endpoint
    } else if manifest.is_empty() {
        config.resolved_endpoint(None)
    } else {
        manifest.to_owned()
    }
}

fn git_short_revision() -> Result<String, ProjectError> {
    let output = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .map_err(|e| ProjectError::Git(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProjectError::Git(stderr.trim().to_owned()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
}

async fn build_image(tag: &str, dockerfile: &Path) -> Result<(), ProjectError> {
    let status = Command::new("docker")
        .args(["build", "-t", tag, "-f"])
        .arg(dockerfile)
        .arg(".")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await?;

    if !status.success() {
        return Err(ProjectError::BuildFailed("docker build failed".to_owned()));
    }

    Ok(())
}

fn load_service(path: &str, tag: &str) -> Result<Service, ProjectError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ProjectError::ReadFailed(PathBuf::from(path), e.to_string()))?;
    let mut service = Service::from_slice(&bytes)?;
    service.image = tag.to_owned();
    Ok(service)
}
