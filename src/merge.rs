//! The merge-point table.
//!
//! Validation of a single program is single-threaded, so a plain
//! `HashMap<usize, Vec<_>>` is correct and simple: bucket-per-key to allow
//! more than one forward jump to land on the same target.

use std::collections::HashMap;

use crate::register::RegisterFile;

/// A multimap from target PC to the register-file snapshots recorded when a
/// forward jump queued a visit to that PC.
#[derive(Debug, Default)]
pub struct MergePoints {
    by_target: HashMap<usize, Vec<RegisterFile>>,
}

impl MergePoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a snapshot of `regs` to be reconciled when the scan reaches `target_pc`.
    pub fn push(&mut self, target_pc: usize, regs: RegisterFile) {
        self.by_target.entry(target_pc).or_default().push(regs);
    }

    /// Remove and return every snapshot queued for `pc`. Empty if none were queued.
    pub fn drain(&mut self, pc: usize) -> Vec<RegisterFile> {
        self.by_target.remove(&pc).unwrap_or_default()
    }

    /// `true` once every queued snapshot has been reconciled and removed.
    pub fn is_empty(&self) -> bool {
        self.by_target.values().all(|v| v.is_empty())
    }

    /// Any PC that still has snapshots queued against it; used to build the
    /// `unreachable_merge` diagnostic.
    pub fn any_remaining_target(&self) -> Option<usize> {
        self.by_target.iter().find(|(_, v)| !v.is_empty()).map(|(pc, _)| *pc)
    }
}
