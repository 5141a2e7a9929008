//! Remote drive listing and search.

use anyhow::Result;

use pandash_core::api::FileEntry;
use pandash_core::dashboard::browse::{format_mtime, format_size};
use pandash_core::knowledge::truncate;

use super::FilesArgs;
use crate::ui::heading;

/// List a directory or search inside it.
pub async fn run(args: FilesArgs) -> Result<()> {
    let config = super::load_config();
    let session = super::load_session();
    let client = super::authenticated_client(&config, &session)?;
    let account = super::resolve_account(args.account, &session, &client).await?;

    let keyword = args.search.as_deref().map(str::trim).filter(|k| !k.is_empty());
    let entries = match keyword {
        Some(keyword) => client.search_files(keyword, &args.path, &account).await,
        None => client.list_files(&args.path, &account).await,
    }
    .map_err(super::explain)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let title = match keyword {
        Some(keyword) => format!("Search '{}' in {} ({})", keyword, args.path, account),
        None => format!("{} ({})", args.path, account),
    };
    heading(&title);
    display_entries(&entries);

    Ok(())
}

fn display_entries(entries: &[FileEntry]) {
    if entries.is_empty() {
        println!("  (empty)");
        return;
    }

    println!("  {:40}  {:>10}  {}", "Name", "Size", "Modified");
    for entry in entries {
        let name = if entry.isdir {
            format!("{}/", truncate(entry.name(), 38))
        } else {
            truncate(entry.name(), 39)
        };
        let size = if entry.isdir {
            "-".to_string()
        } else {
            format_size(entry.size)
        };
        println!(
            "  {:40}  {:>10}  {}",
            name,
            size,
            format_mtime(entry.server_mtime)
        );
    }
}
