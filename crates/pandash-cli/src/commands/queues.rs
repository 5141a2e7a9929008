//! Queue commands: show, control and export.

use anyhow::{Context, Result};

use pandash_core::api::{QueueAction, QueueKind};
use pandash_core::dashboard::queue::{self, QueuePanel, QueueSection};

use super::{ControlArgs, ExportArgs, QueuesArgs};
use crate::ui::{format_counters, heading, loop_state, output_path};

/// Print both queues of one account.
pub async fn run(args: QueuesArgs) -> Result<()> {
    let config = super::load_config();
    let session = super::load_session();
    let client = super::authenticated_client(&config, &session)?;
    let account = super::resolve_account(args.account, &session, &client).await?;

    let snapshot = client.queues().await.map_err(super::explain)?;

    if args.json {
        let entry = snapshot.accounts.get(&account);
        let output = serde_json::json!({
            "account": account,
            "timestamp": snapshot.timestamp,
            "queues": entry,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match queue::account_view(&snapshot, &account) {
        QueuePanel::Ready(view) => {
            println!();
            println!("Account {} (as of {})", view.account, view.updated_at);
            display_section(&view.transfer);
            display_section(&view.share);
        }
        QueuePanel::Unavailable { account, reason } => {
            println!(
                "Account {} is unavailable: {}",
                account,
                reason.as_deref().unwrap_or("not in the snapshot")
            );
        }
        QueuePanel::NoAccount | QueuePanel::Loading | QueuePanel::Failed(_) => {}
    }

    Ok(())
}

fn display_section(section: &QueueSection) {
    let (first, second) = match section.kind {
        QueueKind::Transfer => ("Link", "Target"),
        QueueKind::Share => ("File", "Share link"),
    };

    heading(&format!(
        "{} queue [{}]",
        section.kind,
        loop_state(section.is_running, section.is_paused)
    ));
    println!("  {}", format_counters(&section.counters));
    println!();

    if section.rows.is_empty() {
        println!("  (queue is empty)");
        return;
    }

    println!("  {:10}  {:43}  {:40}  {}", "Status", first, second, "Created");
    for row in &section.rows {
        println!(
            "  {:10}  {:43}  {:40}  {}",
            row.status, row.primary, row.secondary, row.created_at
        );
    }
    if let Some(note) = section.overflow_note() {
        println!("  ({})", note);
    }
}

/// Run a control action.
pub async fn control(args: ControlArgs) -> Result<()> {
    let config = super::load_config();
    let session = super::load_session();
    let client = super::authenticated_client(&config, &session)?;
    let account = super::resolve_account(args.account, &session, &client).await?;

    let kind = QueueKind::from(args.queue);
    let action = QueueAction::from(args.action);

    let message = client
        .queue_action(kind, action, &account)
        .await
        .map_err(super::explain)?;

    if message.is_empty() {
        println!("{} {} on {}: done", kind, action, account);
    } else {
        println!("{}", message);
    }
    Ok(())
}

/// Download a queue as CSV.
pub async fn export(args: ExportArgs) -> Result<()> {
    let config = super::load_config();
    let session = super::load_session();
    let client = super::authenticated_client(&config, &session)?;
    let account = super::resolve_account(args.account, &session, &client).await?;

    let kind = QueueKind::from(args.queue);
    let bytes = client
        .export_queue(kind, &account)
        .await
        .map_err(super::explain)?;

    let path = output_path(
        args.output,
        &config.export.resolve_directory(),
        &queue::export_filename(kind, chrono::Utc::now()),
    );
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(&path, &bytes)
        .with_context(|| format!("Failed to write export to: {}", path.display()))?;

    println!("Exported {} queue of {} to {}", kind, account, path.display());
    Ok(())
}
