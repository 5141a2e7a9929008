//! Account list and overview commands.

use anyhow::{bail, Result};

use super::{AccountsArgs, OverviewArgs};
use crate::ui::heading;

/// List accounts, optionally selecting one.
pub async fn run(args: AccountsArgs) -> Result<()> {
    let config = super::load_config();
    let mut session = super::load_session();
    let client = super::authenticated_client(&config, &session)?;

    let info = client.info().await.map_err(super::explain)?;

    if let Some(account) = args.select {
        if !info.accounts.contains(&account) {
            bail!(
                "Unknown account '{}'. Available: {}",
                account,
                info.accounts.join(", ")
            );
        }
        session.set_selected_account(Some(account.clone()))?;
        if !args.json {
            println!("Selected account: {}", account);
        }
    }

    if args.json {
        let output = serde_json::json!({
            "accounts": info.accounts,
            "active_services": info.active_services,
            "selected": session.selected_account(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    heading("Accounts");
    if info.accounts.is_empty() {
        println!("  (no accounts configured)");
        return Ok(());
    }
    for account in &info.accounts {
        let marker = if session.selected_account() == Some(account.as_str()) {
            "*"
        } else {
            " "
        };
        let service = if info.active_services.contains(account) {
            "online"
        } else {
            "offline"
        };
        println!("{} {:20} {}", marker, account, service);
    }

    Ok(())
}

/// Show service health, account availability and queue totals.
pub async fn overview(args: OverviewArgs) -> Result<()> {
    let config = super::load_config();
    let session = super::load_session();
    let client = super::authenticated_client(&config, &session)?;

    let overview = client.overview().await.map_err(super::explain)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
        return Ok(());
    }

    heading("Service");
    println!("  Status:    {}", overview.health.status);
    println!(
        "  Accounts:  {} active of {}",
        overview.health.active_accounts, overview.health.total_accounts
    );
    if !overview.health.timestamp.is_empty() {
        println!("  Server at: {}", overview.health.timestamp);
    }

    heading("Accounts");
    for account in &overview.accounts {
        let state = match (account.available, account.has_adapter) {
            (true, true) => "available",
            (true, false) => "not logged in",
            (false, _) => "unavailable",
        };
        println!("  {:20} {}", account.name, state);
    }

    let totals = overview.queues_summary;
    heading("Queue totals");
    println!(
        "  {:10} pending {:5} running {:5} completed {:5} failed {:5}",
        "transfer",
        totals.total_transfer_pending,
        totals.total_transfer_running,
        totals.total_transfer_completed,
        totals.total_transfer_failed
    );
    println!(
        "  {:10} pending {:5} running {:5} completed {:5} failed {:5}",
        "share",
        totals.total_share_pending,
        totals.total_share_running,
        totals.total_share_completed,
        totals.total_share_failed
    );

    Ok(())
}
