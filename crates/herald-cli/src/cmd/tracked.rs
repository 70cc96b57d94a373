use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use herald_core::config::Config;
use herald_core::tracker::TrackedStore;
use herald_core::HeraldError;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum TrackedSubcommand {
    /// List announced card ids
    List,
    /// Mark a card as announced without posting it
    Add { id: String },
    /// Forget a card so the next check announces it again
    Remove { id: String },
    /// Forget every card
    Clear,
}

pub fn run(
    root: &Path,
    config_path: &Path,
    subcmd: TrackedSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let mut store = TrackedStore::load(tracked_path(root, config_path)?);
    match subcmd {
        TrackedSubcommand::List => list(&store, json),
        TrackedSubcommand::Add { id } => add(&mut store, &id, json),
        TrackedSubcommand::Remove { id } => remove(&mut store, &id, json),
        TrackedSubcommand::Clear => clear(&mut store, json),
    }
}

/// Where the store lives. Credentials are not needed here, so the config is
/// read without validation and a missing config file means the default path.
fn tracked_path(root: &Path, config_path: &Path) -> anyhow::Result<PathBuf> {
    match Config::read(config_path) {
        Ok(cfg) => Ok(cfg.tracked_path(root)),
        Err(HeraldError::ConfigNotFound(_)) => Ok(Config::default().tracked_path(root)),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", config_path.display())),
    }
}

fn list(store: &TrackedStore, json: bool) -> anyhow::Result<()> {
    if json {
        let ids: Vec<&str> = store.ids().collect();
        print_json(&serde_json::json!({ "count": ids.len(), "ids": ids }))?;
    } else if store.is_empty() {
        println!("No cards tracked.");
    } else {
        for id in store.ids() {
            println!("{id}");
        }
    }
    Ok(())
}

fn add(store: &mut TrackedStore, id: &str, json: bool) -> anyhow::Result<()> {
    let already = !store.insert(id).context("failed to save tracked cards")?;

    if json {
        print_json(&serde_json::json!({ "id": id, "tracked": true, "already": already }))?;
    } else if already {
        println!("Already tracked: {id}");
    } else {
        println!("Tracked: {id}");
    }
    Ok(())
}

fn remove(store: &mut TrackedStore, id: &str, json: bool) -> anyhow::Result<()> {
    let removed = store.remove(id).context("failed to save tracked cards")?;
    if !removed {
        anyhow::bail!("card '{id}' is not tracked");
    }

    if json {
        print_json(&serde_json::json!({ "id": id, "tracked": false }))?;
    } else {
        println!("Removed: {id}");
    }
    Ok(())
}

fn clear(store: &mut TrackedStore, json: bool) -> anyhow::Result<()> {
    let count = store.clear().context("failed to save tracked cards")?;

    if json {
        print_json(&serde_json::json!({ "cleared": count }))?;
    } else {
        println!("Cleared {count} tracked card(s)");
    }
    Ok(())
}
