//! One check cycle: fetch the column, diff against the tracked set, then
//! format, publish, and commit each new card in board order.

use crate::announce::Formatter;
use crate::board::BoardProvider;
use crate::diff::{self, ExclusionPolicy};
use crate::error::Result;
use crate::publish::{PublishOutcome, Publisher};
use crate::tracker::TrackedStore;
use crate::types::{Announcement, Item};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default)]
pub struct CycleOptions {
    /// Format and report new cards without publishing or tracking them.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    VersionMarker,
    PublishFailed { error: String },
    DryRun { announcement: Announcement },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::VersionMarker => f.write_str("version marker"),
            SkipReason::PublishFailed { error } => write!(f, "publish failed: {error}"),
            SkipReason::DryRun { .. } => f.write_str("dry run"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnouncedItem {
    pub id: String,
    pub title: String,
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedItem {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    /// Cards in the snapshot that were not tracked yet.
    pub found: usize,
    pub announced: Vec<AnnouncedItem>,
    pub skipped: Vec<SkippedItem>,
}

impl CycleReport {
    pub fn announced_count(&self) -> usize {
        self.announced.len()
    }
}

/// Drives a single cycle over injected collaborators.
pub struct Cycle<'a, B: ?Sized, P: ?Sized> {
    board: &'a mut B,
    publisher: &'a P,
    store: &'a mut TrackedStore,
    formatter: &'a Formatter,
    policy: &'a ExclusionPolicy,
}

impl<'a, B, P> Cycle<'a, B, P>
where
    B: BoardProvider + ?Sized,
    P: Publisher + ?Sized,
{
    pub fn new(
        board: &'a mut B,
        publisher: &'a P,
        store: &'a mut TrackedStore,
        formatter: &'a Formatter,
        policy: &'a ExclusionPolicy,
    ) -> Self {
        Self {
            board,
            publisher,
            store,
            formatter,
            policy,
        }
    }

    /// Run the cycle. Only a failed board fetch is an error; per-card
    /// publish failures are reported and leave the card eligible next time.
    pub fn run(&mut self, opts: CycleOptions) -> Result<CycleReport> {
        let snapshot = self.board.list_current_items()?;
        let new_items = diff::new_items(&snapshot, self.store, self.policy);

        let mut report = CycleReport {
            found: new_items.len(),
            ..Default::default()
        };
        if new_items.is_empty() {
            tracing::info!(cards = snapshot.len(), "no new cards");
            return Ok(report);
        }
        tracing::info!(count = new_items.len(), "found new cards");

        for item in &new_items {
            self.process(item, opts, &mut report);
        }

        tracing::info!(
            announced = report.announced_count(),
            skipped = report.skipped.len(),
            "cycle complete"
        );
        Ok(report)
    }

    fn process(&mut self, item: &Item, opts: CycleOptions, report: &mut CycleReport) {
        tracing::info!(id = %item.id, title = %item.title, "new card");

        if self.policy.is_version_marker(item) {
            tracing::info!(id = %item.id, "skipping version marker");
            report.skipped.push(skipped(item, SkipReason::VersionMarker));
            return;
        }

        let announcement = self.formatter.format(item);
        if opts.dry_run {
            report
                .skipped
                .push(skipped(item, SkipReason::DryRun { announcement }));
            return;
        }

        match self.publisher.publish(&announcement) {
            PublishOutcome::Published { external_id } => {
                self.store.add(&item.id);
                report.announced.push(AnnouncedItem {
                    id: item.id.clone(),
                    title: item.title.clone(),
                    external_id,
                });
            }
            PublishOutcome::Failed { reason } => {
                tracing::warn!(id = %item.id, error = %reason, "not tracking card after failed publish");
                report
                    .skipped
                    .push(skipped(item, SkipReason::PublishFailed { error: reason }));
            }
        }
    }
}

fn skipped(item: &Item, reason: SkipReason) -> SkippedItem {
    SkippedItem {
        id: item.id.clone(),
        title: item.title.clone(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HeraldError;
    use crate::types::Label;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use tempfile::TempDir;

    struct FixedBoard {
        items: Vec<Item>,
        fail: bool,
    }

    impl FixedBoard {
        fn new(items: Vec<Item>) -> Self {
            Self { items, fail: false }
        }
    }

    impl BoardProvider for FixedBoard {
        fn list_current_items(&mut self) -> Result<Vec<Item>> {
            if self.fail {
                return Err(HeraldError::Connectivity("board down".to_string()));
            }
            Ok(self.items.clone())
        }
    }

    /// Records every attempt; fails for texts containing any of `fail_on`.
    #[derive(Default)]
    struct RecordingPublisher {
        attempts: RefCell<Vec<String>>,
        fail_on: HashSet<String>,
    }

    impl Publisher for RecordingPublisher {
        fn publish(&self, announcement: &Announcement) -> PublishOutcome {
            self.attempts.borrow_mut().push(announcement.text.clone());
            if self.fail_on.iter().any(|f| announcement.text.contains(f)) {
                PublishOutcome::Failed {
                    reason: "rate limited".to_string(),
                }
            } else {
                PublishOutcome::Published { external_id: None }
            }
        }
    }

    struct Fixture {
        _dir: TempDir,
        store: TrackedStore,
        formatter: Formatter,
        policy: ExclusionPolicy,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let store = TrackedStore::load(dir.path().join("tracked.json"));
            Self {
                _dir: dir,
                store,
                formatter: Formatter::new("Done: ", vec!["image/png".to_string()]),
                policy: ExclusionPolicy::default(),
            }
        }

        fn run<B: BoardProvider, P: Publisher>(
            &mut self,
            board: &mut B,
            publisher: &P,
            opts: CycleOptions,
        ) -> Result<CycleReport> {
            Cycle::new(board, publisher, &mut self.store, &self.formatter, &self.policy).run(opts)
        }
    }

    fn card(id: &str, title: &str) -> Item {
        Item::new(id, title)
    }

    #[test]
    fn fresh_run_announces_all_but_pinned() {
        let mut fx = Fixture::new();
        let mut board = FixedBoard::new(vec![card("v", "version 3.0"), card("a", "Card A")]);
        let publisher = RecordingPublisher::default();

        let report = fx.run(&mut board, &publisher, CycleOptions::default()).unwrap();

        assert_eq!(report.announced_count(), 1);
        assert_eq!(report.announced[0].id, "a");
        assert!(fx.store.contains("a"));
        assert!(!fx.store.contains("v"));
        assert_eq!(fx.store.len(), 1);
    }

    #[test]
    fn second_run_is_idempotent() {
        let mut fx = Fixture::new();
        let mut board = FixedBoard::new(vec![card("p", "pinned"), card("a", "A"), card("b", "B")]);
        let publisher = RecordingPublisher::default();

        assert_eq!(
            fx.run(&mut board, &publisher, CycleOptions::default())
                .unwrap()
                .announced_count(),
            2
        );
        let second = fx.run(&mut board, &publisher, CycleOptions::default()).unwrap();
        assert_eq!(second.announced_count(), 0);
        assert_eq!(second.found, 0);
        assert_eq!(publisher.attempts.borrow().len(), 2);
    }

    #[test]
    fn failed_publish_is_not_tracked_and_retried_next_cycle() {
        let mut fx = Fixture::new();
        fx.policy.skip_first = false;
        let mut board = FixedBoard::new(vec![card("a", "Card A")]);
        let failing = RecordingPublisher {
            fail_on: HashSet::from(["Card A".to_string()]),
            ..Default::default()
        };

        let report = fx.run(&mut board, &failing, CycleOptions::default()).unwrap();
        assert_eq!(report.announced_count(), 0);
        assert!(fx.store.is_empty());
        assert_eq!(
            report.skipped[0].reason,
            SkipReason::PublishFailed {
                error: "rate limited".to_string()
            }
        );

        let working = RecordingPublisher::default();
        let report = fx.run(&mut board, &working, CycleOptions::default()).unwrap();
        assert_eq!(report.announced_count(), 1);
        assert!(fx.store.contains("a"));
    }

    #[test]
    fn one_failure_does_not_stop_the_cycle() {
        let mut fx = Fixture::new();
        fx.policy.skip_first = false;
        let mut board = FixedBoard::new(vec![card("a", "A1"), card("b", "B1"), card("c", "C1")]);
        let publisher = RecordingPublisher {
            fail_on: HashSet::from(["B1".to_string()]),
            ..Default::default()
        };

        let report = fx.run(&mut board, &publisher, CycleOptions::default()).unwrap();
        let announced: Vec<&str> = report.announced.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(announced, vec!["a", "c"]);
        assert_eq!(
            *publisher.attempts.borrow(),
            vec!["Done: A1".to_string(), "Done: B1".to_string(), "Done: C1".to_string()]
        );
        assert!(!fx.store.contains("b"));
    }

    #[test]
    fn version_marker_outside_first_slot_is_skipped() {
        let mut fx = Fixture::new();
        let mut board = FixedBoard::new(vec![
            card("p", "Pinned"),
            card("v", "version 3.1"),
            card("a", "Card A"),
        ]);
        let publisher = RecordingPublisher::default();

        let report = fx.run(&mut board, &publisher, CycleOptions::default()).unwrap();
        assert_eq!(report.found, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, SkipReason::VersionMarker);
        assert!(!fx.store.contains("v"));
        assert_eq!(publisher.attempts.borrow().len(), 1);
    }

    #[test]
    fn dry_run_neither_publishes_nor_tracks() {
        let mut fx = Fixture::new();
        fx.policy.skip_first = false;
        let mut board = FixedBoard::new(vec![
            card("a", "Card A").with_label(Label::new("UI", "blue"))
        ]);
        let publisher = RecordingPublisher::default();

        let report = fx
            .run(&mut board, &publisher, CycleOptions { dry_run: true })
            .unwrap();
        assert!(publisher.attempts.borrow().is_empty());
        assert!(fx.store.is_empty());
        match &report.skipped[0].reason {
            SkipReason::DryRun { announcement } => {
                assert_eq!(announcement.text, "Done: Card A\n\n[🔵 UI]")
            }
            other => panic!("unexpected reason {other:?}"),
        }
    }

    #[test]
    fn fetch_failure_is_fatal_and_leaves_store_alone() {
        let mut fx = Fixture::new();
        fx.store.add("old");
        let mut board = FixedBoard {
            items: vec![],
            fail: true,
        };
        let publisher = RecordingPublisher::default();

        assert!(fx.run(&mut board, &publisher, CycleOptions::default()).is_err());
        assert_eq!(fx.store.ids().collect::<Vec<_>>(), vec!["old"]);
    }

    #[test]
    fn unwritable_store_does_not_abort_the_cycle() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let mut fx = Fixture::new();
        fx.store = TrackedStore::load(blocker.join("tracked.json"));
        fx.policy.skip_first = false;
        let mut board = FixedBoard::new(vec![card("a", "Card A"), card("b", "Card B")]);
        let publisher = RecordingPublisher::default();

        let report = fx.run(&mut board, &publisher, CycleOptions::default()).unwrap();
        assert_eq!(report.announced_count(), 2);
        assert!(fx.store.contains("a") && fx.store.contains("b"));

        let second = fx.run(&mut board, &publisher, CycleOptions::default()).unwrap();
        assert_eq!(second.announced_count(), 0);
        assert_eq!(publisher.attempts.borrow().len(), 2);
    }

    #[test]
    fn empty_snapshot_is_zero_not_error() {
        let mut fx = Fixture::new();
        let mut board = FixedBoard::new(vec![]);
        let report = fx
            .run(&mut board, &RecordingPublisher::default(), CycleOptions::default())
            .unwrap();
        assert_eq!(report.announced_count(), 0);
    }
}
