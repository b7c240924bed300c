//! Access statistics.

use std::io::{self, Write};

use serde::Serialize;

use crate::core::cache::events::{CacheEvent, CacheObserver};

/// Counters maintained from the store's event stream.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub full_checks: u64,
    pub insertions: u64,
    /// Victims recommended by `pick_line`.
    pub evictions: u64,
    pub erasures: u64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of lookups that hit, or 0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Writes the counters as a human-readable table.
    pub fn write_table<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "\n==========================================================")?;
        writeln!(out, "CACHE STATISTICS")?;
        writeln!(out, "==========================================================")?;
        writeln!(out, "accesses            {}", self.accesses())?;
        writeln!(out, "  hits              {}", self.hits)?;
        writeln!(out, "  misses            {}", self.misses)?;
        writeln!(out, "  hit rate          {:.2}%", self.hit_rate() * 100.0)?;
        writeln!(out, "insertions          {}", self.insertions)?;
        writeln!(out, "evictions           {}", self.evictions)?;
        writeln!(out, "erasures            {}", self.erasures)?;
        writeln!(out, "full checks         {}", self.full_checks)?;
        writeln!(out, "==========================================================")
    }
}

impl CacheObserver for CacheStats {
    fn notify(&mut self, event: &CacheEvent) {
        match event {
            CacheEvent::Hit { .. } => self.hits += 1,
            CacheEvent::Miss { .. } => self.misses += 1,
            CacheEvent::FullCheck { .. } => self.full_checks += 1,
            CacheEvent::Inserted { .. } => self.insertions += 1,
            CacheEvent::VictimChosen { .. } => self.evictions += 1,
            CacheEvent::Erased { .. } => self.erasures += 1,
            CacheEvent::Constructed { .. } | CacheEvent::Destroyed { .. } => {}
        }
    }
}
