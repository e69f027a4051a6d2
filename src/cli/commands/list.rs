//! List command - show cached fragments

use crate::cache::{CacheEntry, CacheStore};
use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Config;
use crate::error::CovcacheResult;
use chrono::{DateTime, Local};

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> CovcacheResult<()> {
    let store = CacheStore::new(&config.cache.dir);
    let entries = store.entries().await?;

    if entries.is_empty() && !matches!(args.format, OutputFormat::Json) {
        println!("No cached fragments in {}.", store.dir().display());
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&entries).await,
        OutputFormat::Json => print_json(&entries).await?,
        OutputFormat::Plain => print_plain(&entries),
    }

    Ok(())
}

async fn modified(entry: &CacheEntry) -> Option<DateTime<Local>> {
    let meta = tokio::fs::metadata(&entry.path).await.ok()?;
    meta.modified().ok().map(DateTime::<Local>::from)
}

async fn print_table(entries: &[CacheEntry]) {
    println!("{:<50} {:<14} {:<20}", "UNIT", "CHECKSUM", "RECORDED");
    println!("{}", "-".repeat(84));

    for entry in entries {
        let recorded = modified(entry)
            .await
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<50} {:<14} {:<20}",
            entry.unit(),
            entry.checksum.short(),
            recorded
        );
    }

    println!();
    println!("Total: {} fragment(s)", entries.len());
}

async fn print_json(entries: &[CacheEntry]) -> CovcacheResult<()> {
    #[derive(serde::Serialize)]
    struct EntryJson {
        unit: String,
        checksum: String,
        path: String,
        recorded_at: Option<String>,
    }

    let mut json_entries = Vec::with_capacity(entries.len());
    for entry in entries {
        json_entries.push(EntryJson {
            unit: entry.unit(),
            checksum: entry.checksum.to_string(),
            path: entry.path.display().to_string(),
            recorded_at: modified(entry).await.map(|t| t.to_rfc3339()),
        });
    }

    println!("{}", serde_json::to_string_pretty(&json_entries)?);
    Ok(())
}

fn print_plain(entries: &[CacheEntry]) {
    for entry in entries {
        println!("{}", entry.path.display());
    }
}
