//! Implementation of the `capstan get` command.

use anyhow::bail;
use capstan_core::DeployClient;
use tracing::debug;

use crate::config::CliConfig;
use crate::output;

pub async fn run(config: &CliConfig, endpoint: Option<String>, object: &str) -> anyhow::Result<()> {
    let endpoint = config.resolved_endpoint(endpoint);
    debug!(%endpoint, object, "fetching object state");

    let client = DeployClient::new(endpoint, config.timeout())?;
    let response = client.get(object).await?;

    output::print_body(&response.body);
    if !response.is_success() {
        bail!(
            "get {object} failed: {} answered {}",
            client.base_url(),
            response.status
        );
    }

    Ok(())
}
