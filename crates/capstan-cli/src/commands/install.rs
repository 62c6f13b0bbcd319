//! Implementation of the `capstan install` command.
//!
//! Runs the capstand server locally as a Docker container. The container
//! gets the host's Docker socket so it can manage workload containers
//! itself.

use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::output;

/// Name given to the server container, and the handle a re-install replaces.
const CONTAINER_NAME: &str = "capstand";

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Docker not found on PATH")]
    DockerNotFound,

    #[error("Pull failed for image {0}")]
    PullFailed(String),

    #[error("Container start failed: {0}")]
    StartFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Arguments for the install command.
pub struct InstallArgs {
    /// Server image to run.
    pub image: String,

    /// Host port the endpoint is published on.
    pub port: u16,
}

pub async fn run(args: InstallArgs) -> Result<(), InstallError> {
    if which::which("docker").is_err() {
        return Err(InstallError::DockerNotFound);
    }

    // An earlier install may have left a container under our name;
    // replace it rather than fail on the clash.
    let _ = Command::new("docker")
        .args(["rm", "-f", CONTAINER_NAME])
        .output()
        .await;

    output::step(&format!("pulling {}", args.image));
    let status = Command::new("docker")
        .arg("pull")
        .arg(&args.image)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await?;

    if !status.success() {
        return Err(InstallError::PullFailed(args.image));
    }

    output::step("starting capstand");
    let publish = format!("{}:6227", args.port);
    let started = Command::new("docker")
        .args(["run", "-d", "--name", CONTAINER_NAME])
        .args(["--restart", "unless-stopped"])
        .arg("-p")
        .arg(&publish)
        .args(["-v", "/var/run/docker.sock:/var/run/docker.sock"])
        .arg(&args.image)
        .output()
        .await?;

    if !started.status.success() {
        let stderr = String::from_utf8_lossy(&started.stderr);
        return Err(InstallError::StartFailed(stderr.trim().to_owned()));
    }

    let container_id = String::from_utf8_lossy(&started.stdout);
    debug!(container = container_id.trim(), "started capstand container");

    output::success(&format!(
        "capstand listening on http://127.0.0.1:{}",
        args.port
    ));
    Ok(())
}
