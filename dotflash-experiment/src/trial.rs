use crate::config::TrialConfig;

const NS_PER_MS: u64 = 1_000_000;

/// Phase lengths of a trial, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialDurations {
    pub pre_flash_ms: u64,
    pub flash_ms: u64,
    pub post_flash_ms: u64,
}

impl TrialDurations {
    pub fn from_config(config: &TrialConfig) -> Self {
        Self {
            pre_flash_ms: config.pre_flash_duration,
            flash_ms: config.flash_duration,
            post_flash_ms: config.post_flash_duration,
        }
    }

    pub fn pre_flash_ns(&self) -> u64 {
        self.pre_flash_ms.saturating_mul(NS_PER_MS)
    }

    pub fn flash_ns(&self) -> u64 {
        self.flash_ms.saturating_mul(NS_PER_MS)
    }

    /// The trial ends this long after it starts, however long the flash lasts.
    pub fn total_ns(&self) -> u64 {
        self.pre_flash_ms
            .saturating_add(self.post_flash_ms)
            .saturating_mul(NS_PER_MS)
    }
}

/// Event times, in ns elapsed since trial start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrialTimestamps {
    pub flash_start: Option<u64>,
    pub flash_end: Option<u64>,
    pub finished: Option<u64>,
}
