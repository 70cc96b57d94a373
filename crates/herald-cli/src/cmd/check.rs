use crate::output::{print_item, print_json};
use anyhow::Context;
use herald_core::board::TrelloBoard;
use herald_core::config::Config;
use herald_core::cycle::{Cycle, CycleOptions, CycleReport};
use herald_core::publish::TwitterPublisher;
use herald_core::tracker::TrackedStore;
use std::path::Path;

pub fn run(root: &Path, config_path: &Path, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let trello = config.trello()?;
    let twitter = config.twitter()?;

    let mut store = TrackedStore::load(config.tracked_path(root));
    let mut board =
        TrelloBoard::connect(trello, &config.http).context("failed to connect to board")?;
    let publisher =
        TwitterPublisher::new(twitter, &config.http).context("failed to set up publisher")?;
    let formatter = config.announce.formatter();
    let policy = config.announce.exclusion_policy();

    if !json {
        println!("Board: {}", board.board_name());
        println!("Watching list: '{}'", board.list_name());
        println!("Cards tracked: {}", store.len());
    }

    let report = Cycle::new(&mut board, &publisher, &mut store, &formatter, &policy)
        .run(CycleOptions { dry_run })
        .context("check cycle failed")?;

    if json {
        print_json(&report)?;
    } else {
        print_report(&report, dry_run);
    }
    Ok(())
}

fn print_report(report: &CycleReport, dry_run: bool) {
    if report.found == 0 {
        println!("No new cards found");
        return;
    }

    println!("Found {} new card(s):", report.found);
    for item in &report.announced {
        let status = match &item.external_id {
            Some(id) => format!("announced ({id})"),
            None => "announced".to_string(),
        };
        print_item(&item.title, &status);
    }
    for item in &report.skipped {
        print_item(&item.title, &format!("skipped: {}", item.reason));
    }

    if dry_run {
        println!("Dry run: nothing was posted or tracked");
    } else {
        println!("Posted {} announcement(s)", report.announced_count());
    }
}
