//! Backend settings: show, validate and apply.

use std::path::Path;

use anyhow::{bail, Context, Result};

use pandash_core::settings::{self, Settings};

use super::{SettingsAction, SettingsArgs};

/// Run the settings command.
pub async fn run(args: SettingsArgs) -> Result<()> {
    match args.action {
        SettingsAction::Show => show().await,
        SettingsAction::Validate { file } => {
            let settings = read_settings(&file)?;
            check(&settings)?;
            println!("{} is valid.", file.display());
            Ok(())
        }
        SettingsAction::Apply { file } => apply(&file).await,
    }
}

async fn show() -> Result<()> {
    let config = super::load_config();
    let session = super::load_session();
    let client = super::authenticated_client(&config, &session)?;

    let settings = client.settings().await.map_err(super::explain)?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

async fn apply(file: &Path) -> Result<()> {
    let settings = read_settings(file)?;
    check(&settings)?;

    let config = super::load_config();
    let session = super::load_session();
    let client = super::authenticated_client(&config, &session)?;

    let saved = client
        .update_settings(&settings)
        .await
        .map_err(super::explain)?;

    println!("Settings saved and applied to the running services.");
    println!(
        "Auto refresh: {} ms, API key retention: {}",
        saved.ui.auto_refresh_interval,
        if saved.ui.api_key_retention { "on" } else { "off" }
    );
    Ok(())
}

fn read_settings(file: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a settings object", file.display()))
}

/// Report every violation at once.
fn check(settings: &Settings) -> Result<()> {
    let errors = settings::validate(settings);
    if errors.is_empty() {
        return Ok(());
    }

    let list = errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n");
    bail!("Validation failed:\n{}", list)
}
