// graphrestore/src/restore/counters.rs
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::model::RestoreType;

/// Per-type count of objects the server accepted. Safe to bump from any
/// number of concurrent file units.
#[derive(Debug, Default)]
pub struct RestoreCounters {
    counts: [AtomicU64; RestoreType::ALL.len()],
}

impl RestoreCounters {
    pub fn add(&self, restore_type: RestoreType, amount: u64) {
        self.counts[restore_type.index()].fetch_add(amount, Ordering::Relaxed);
    }

    pub fn increment(&self, restore_type: RestoreType) {
        self.add(restore_type, 1);
    }

    pub fn get(&self, restore_type: RestoreType) -> u64 {
        self.counts[restore_type.index()].load(Ordering::Relaxed)
    }

    pub fn summary(&self, elapsed: Duration) -> RestoreSummary {
        RestoreSummary {
            counts: RestoreType::ALL.map(|t| (t, self.get(t))),
            elapsed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestoreSummary {
    pub counts: [(RestoreType, u64); RestoreType::ALL.len()],
    pub elapsed: Duration,
}

impl RestoreSummary {
    pub fn count(&self, restore_type: RestoreType) -> u64 {
        self.counts[restore_type.index()].1
    }
}

impl fmt::Display for RestoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "restore summary:")?;
        for (restore_type, count) in &self.counts {
            writeln!(f, "    {:<12} {}", restore_type.tag(), count)?;
        }
        write!(f, "    {:<12} {:.3}s", "elapsed", self.elapsed.as_secs_f64())
    }
}
