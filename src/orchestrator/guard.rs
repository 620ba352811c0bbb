//! Per-path mutual exclusion for in-flight mutations.

use crate::error::SyncError;
use crate::tree::path::WorkspacePath;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default, Clone)]
pub struct PathLocks {
    in_flight: Arc<Mutex<Vec<WorkspacePath>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `path`. Fails when an in-flight path equals it, contains it, or
    /// lies beneath it.
    pub fn try_acquire(&self, path: &WorkspacePath) -> Result<PathGuard, SyncError> {
        let mut in_flight = self.in_flight.lock();
        if let Some(busy) = in_flight
            .iter()
            .find(|held| held.contains(path) || path.contains(held))
        {
            return Err(SyncError::PathBusy(busy.key()));
        }
        in_flight.push(path.clone());
        Ok(PathGuard {
            locks: self.clone(),
            path: path.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.in_flight.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Releases its path on drop.
#[derive(Debug)]
pub struct PathGuard {
    locks: PathLocks,
    path: WorkspacePath,
}

impl Drop for PathGuard {
    fn drop(&mut self) {
        let mut in_flight = self.locks.in_flight.lock();
        if let Some(pos) = in_flight.iter().position(|held| held == &self.path) {
            in_flight.swap_remove(pos);
        }
    }
}
