use crate::tracker::TrackedStore;
use crate::types::Item;

/// Rules for leaving board bookkeeping cards out of announcements.
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    /// Drop the first card of every snapshot (the board pins its version card there).
    pub skip_first: bool,
    /// Titles starting with this prefix are never announced.
    pub version_prefix: String,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self {
            skip_first: true,
            version_prefix: "version".to_string(),
        }
    }
}

impl ExclusionPolicy {
    pub fn is_version_marker(&self, item: &Item) -> bool {
        !self.version_prefix.is_empty() && item.title.starts_with(&self.version_prefix)
    }
}

/// Items from `snapshot` that have not been announced yet, in snapshot order.
pub fn new_items(snapshot: &[Item], store: &TrackedStore, policy: &ExclusionPolicy) -> Vec<Item> {
    let skip = usize::from(policy.skip_first);
    snapshot
        .iter()
        .skip(skip)
        .filter(|item| !store.contains(&item.id))
        .cloned()
        .collect()
}
