use crate::ApiArgs;
use crate::utils::client;
use colored::Colorize;
use fleetgate_cloud::CloudClient;

pub async fn handle(args: &ApiArgs) -> anyhow::Result<()> {
    let client = client(args)?;
    let status = client.check_auth().await?;

    if status.authenticated {
        println!(
            "{} {}",
            "✓ Authenticated:".green().bold(),
            status.account_info.unwrap_or_default()
        );
        Ok(())
    } else {
        anyhow::bail!(
            "Access token was rejected: {}",
            status.error.unwrap_or_else(|| "unknown reason".to_string())
        )
    }
}
