//! A single transport progress tick.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProgress {
    pub loaded: u64,
    pub total: u64,
}

impl UploadProgress {
    /// Build a tick, clamping `loaded` to `total`.
    pub fn new(loaded: u64, total: u64) -> Self {
        Self {
            loaded: loaded.min(total),
            total,
        }
    }

    /// Percentage in `[0, 100]`, computed as `floor(loaded / total * 100)`.
    ///
    /// An empty payload counts as complete.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let pct = (self.loaded as u128 * 100) / self.total as u128;
        pct.min(100) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.loaded == self.total
    }
}
