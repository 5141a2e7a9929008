//! Knowledge table commands.

use anyhow::{Context, Result};

use pandash_core::knowledge::{self, column, default_columns, format_cell, EntryPage, EntryQuery};

use super::{KnowledgeAction, KnowledgeArgs};
use crate::ui::{heading, output_path};

/// Run the knowledge command.
pub async fn run(args: KnowledgeArgs) -> Result<()> {
    let config = super::load_config();
    let session = super::load_session();
    let client = super::authenticated_client(&config, &session)?;

    match args.action {
        KnowledgeAction::Entries {
            page,
            page_size,
            filters,
            json,
        } => {
            let query = EntryQuery {
                page,
                page_size,
                filters: filters.into_filters(),
            };
            let result = client
                .knowledge_entries(&query)
                .await
                .map_err(super::explain)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                display_page(&result);
            }
        }
        KnowledgeAction::Export {
            fields,
            filters,
            output,
        } => {
            let fields: Vec<&str> = if fields.is_empty() {
                default_columns()
            } else {
                fields.iter().map(|f| f.trim()).filter(|f| !f.is_empty()).collect()
            };
            let filters = filters.into_filters();

            let bytes = client
                .knowledge_export(&fields, &filters)
                .await
                .map_err(super::explain)?;

            let path = output_path(
                output,
                &config.export.resolve_directory(),
                &knowledge::export_filename(chrono::Local::now().date_naive()),
            );
            std::fs::write(&path, &bytes)
                .with_context(|| format!("Failed to write export to: {}", path.display()))?;
            println!("Exported {} column(s) to {}", fields.len(), path.display());
        }
    }

    Ok(())
}

fn display_page(result: &EntryPage) {
    if let Some(summary) = &result.summary {
        let cards = knowledge::summary_cards(summary)
            .into_iter()
            .map(|(status, count)| format!("{} {}", knowledge::status_label(status), count))
            .collect::<Vec<_>>()
            .join("  ");
        if !cards.is_empty() {
            println!();
            println!("{}", cards);
        }
    }

    let p = result.pagination;
    heading(&format!(
        "Page {} of {} ({} entries)",
        p.page,
        p.total_pages.max(1),
        p.total
    ));

    if result.entries.is_empty() {
        println!("  (no entries)");
        return;
    }

    let columns = ["article_title", "tag", "status", "new_link", "created_at"];
    let header = columns
        .iter()
        .map(|key| format!("{:24}", column(key).map_or(*key, |c| c.label)))
        .collect::<String>();
    println!("  {}", header.trim_end());

    for entry in &result.entries {
        let row = columns
            .iter()
            .map(|key| format!("{:24}", knowledge::truncate(&format_cell(key, entry), 22)))
            .collect::<String>();
        println!("  {}", row.trim_end());
    }
}
