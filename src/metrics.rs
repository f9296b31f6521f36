// Scan metrics
//
// Counts how each item of a patch run was decided, so the log explains why
// an item did not make it into the patch.

use crate::services::disenchant::{Bucket, DropReason, Outcome};
use indexmap::IndexMap;
use std::time::Duration;

/// Per-run counters for the filter-and-patch scan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanMetrics {
    /// Items looked at
    pub scanned: usize,

    /// Items dropped, per reason, in first-seen order
    dropped: IndexMap<DropReason, usize>,

    /// Items routed, per report list
    routed: IndexMap<Bucket, usize>,

    /// Wall time of the scan
    pub duration: Duration,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one item
    pub fn record(&mut self, outcome: Outcome) {
        self.scanned += 1;
        match outcome {
            Outcome::Dropped(reason) => *self.dropped.entry(reason).or_insert(0) += 1,
            Outcome::Routed(bucket) => *self.routed.entry(bucket).or_insert(0) += 1,
        }
    }

    pub fn finish(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn dropped(&self, reason: DropReason) -> usize {
        self.dropped.get(&reason).copied().unwrap_or(0)
    }

    pub fn routed(&self, bucket: Bucket) -> usize {
        self.routed.get(&bucket).copied().unwrap_or(0)
    }

    pub fn total_dropped(&self) -> usize {
        self.dropped.values().sum()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Scan Summary ===");
        tracing::info!(
            "Scanned {} items in {:.2}s",
            self.scanned,
            self.duration.as_secs_f64()
        );
        tracing::info!(
            "Items: {} patched, {} skipped, {} for manual check, {} ignored",
            self.routed(Bucket::Patched),
            self.routed(Bucket::Skipped),
            self.routed(Bucket::ManualCheck),
            self.total_dropped()
        );
        for (reason, count) in &self.dropped {
            tracing::debug!("Ignored ({}): {}", reason, count);
        }

        let unpatchable = self.dropped(DropReason::NotOverridable);
        if unpatchable > 0 {
            tracing::warn!(
                "{} eligible items were neither weapons nor armor and were left unpatched",
                unpatchable
            );
        }
    }
}
