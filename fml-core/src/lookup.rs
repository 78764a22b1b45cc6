//! Parent-coin lookup over a mempool snapshot.
//!
//! A linear scan: mempools are small and snapshots are cached, so no index is
//! built.

use crate::types::{MempoolSnapshot, SpendBundle};

/// Finds the spend bundle containing a coin spend whose coin has the given
/// parent.
///
/// Returns `None` when the snapshot is unsuccessful, regardless of content.
/// The whole owning bundle is returned, not just the matching coin spend.
/// If several bundles match, which one is returned depends on map iteration
/// order.
pub fn find_spend_bundle<'a>(
    snapshot: &'a MempoolSnapshot,
    parent_coin_info: &str,
) -> Option<&'a SpendBundle> {
    if !snapshot.success {
        return None;
    }

    snapshot
        .mempool_items
        .values()
        .map(|item| &item.spend_bundle)
        .find(|bundle| bundle.spends_child_of(parent_coin_info))
}

impl MempoolSnapshot {
    /// See [`find_spend_bundle`].
    pub fn find_by_parent_coin_info(&self, parent_coin_info: &str) -> Option<&SpendBundle> {
        find_spend_bundle(self, parent_coin_info)
    }
}
