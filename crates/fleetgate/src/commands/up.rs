use crate::utils::{client, load_topology};
use crate::{ApiArgs, TopologyArgs};
use anyhow::Context;
use colored::Colorize;
use fleetgate_core::{CancellationToken, Orchestrator, Stage};
use std::sync::Arc;

pub async fn handle(api: &ApiArgs, topology: &TopologyArgs) -> anyhow::Result<()> {
    let config = load_topology(topology)?;
    let client = client(api)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted; resources created so far are left in place");
            on_interrupt.cancel();
        }
    });

    let mut orchestrator =
        Orchestrator::new(Arc::new(client), config).with_cancellation(cancel);

    let summary = match orchestrator.run().await {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!(
                "{} provisioning stopped after stage {}. Nothing was rolled back; check the DigitalOcean console.",
                "Error:".red().bold(),
                orchestrator.stage().to_string().yellow()
            );
            // instances may already trust this key
            if orchestrator.stage() >= Stage::KeyRegistered {
                if let Some(pair) = orchestrator.key_pair() {
                    println!("Public Key is {}", pair.public_key);
                    println!("The private key to access the servers is as follows:");
                    println!("{}", pair.private_key.trim_end());
                }
            }
            return Err(e).context("Provisioning failed");
        }
    };

    eprintln!("{}", "✓ Environment provisioned".green().bold());
    println!("{}", summary);
    Ok(())
}
