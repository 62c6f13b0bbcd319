//! Implementation of the `capstan delete` command.

use std::path::PathBuf;

use anyhow::{anyhow, bail};
use capstan_core::DeployClient;
use tracing::debug;

use crate::config::CliConfig;
use crate::output;

pub async fn run(
    config: &CliConfig,
    endpoint: Option<String>,
    file: Option<PathBuf>,
) -> anyhow::Result<()> {
    let path = config.resolved_manifest(file)?;
    let manifest = std::fs::read(&path)
        .map_err(|e| anyhow!("failed to read manifest {}: {e}", path.display()))?;

    let _: serde_json::Value = serde_json::from_slice(&manifest)
        .map_err(|e| anyhow!("manifest {} is not valid JSON: {e}", path.display()))?;

    let endpoint = config.resolved_endpoint(endpoint);
    debug!(%endpoint, manifest = %path.display(), "deleting manifest objects");

    let client = DeployClient::new(endpoint, config.timeout())?;
    let response = client.delete(manifest).await?;

    output::print_body(&response.body);
    if !response.is_success() {
        bail!(
            "delete failed: {} answered {}",
            client.base_url(),
            response.status
        );
    }

    output::success("delete accepted");
    Ok(())
}
