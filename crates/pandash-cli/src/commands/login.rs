//! Login and logout commands.

use anyhow::{bail, Context, Result};

use pandash_core::api::ApiClient;
use pandash_core::Error;

use super::LoginArgs;
use crate::ui::mask_key;

/// Validate a key against the server and store it.
pub async fn run(args: LoginArgs) -> Result<()> {
    let key = args.key.trim();
    if key.is_empty() {
        return Err(Error::EmptyApiKey.into());
    }

    let config = super::load_config();
    let client = ApiClient::from_config(&config.server).with_api_key(Some(key.to_string()));

    let info = match client.validate_key().await {
        Ok(info) => info,
        Err(Error::Unauthorized) => bail!("Invalid API key"),
        Err(e) => return Err(super::explain(e)),
    };

    let mut session = super::load_session();
    session
        .set_api_key(key)
        .context("Failed to store the API key")?;

    let keeps_selection = session
        .selected_account()
        .is_some_and(|current| info.accounts.iter().any(|a| a == current));
    if !keeps_selection {
        session
            .set_selected_account(info.accounts.first().cloned())
            .context("Failed to store the selected account")?;
    }

    println!("API key {} saved.", mask_key(key));
    println!("Server: {}", client.base_url());
    if info.accounts.is_empty() {
        println!("The server has no accounts configured.");
    } else {
        println!("Accounts: {}", info.accounts.join(", "));
        if let Some(selected) = session.selected_account() {
            println!("Selected: {}", selected);
        }
    }

    Ok(())
}

/// Forget the stored key. The selected account is kept.
pub fn logout() -> Result<()> {
    let mut session = super::load_session();
    if session.api_key().is_none() {
        println!("Not logged in.");
        return Ok(());
    }

    session
        .clear_api_key()
        .context("Failed to clear the API key")?;
    println!("Logged out.");
    Ok(())
}
