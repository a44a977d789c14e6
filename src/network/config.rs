// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Logger configuration

/// Default number of records kept
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Maximum records kept (oldest evicted first)
    pub max_entries: usize,
    /// Whether interception may be installed
    pub enabled: bool,
    /// Maximum captured body size in bytes (`None` = unlimited)
    pub max_body_size: Option<usize>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            enabled: true,
            max_body_size: None,
        }
    }
}

impl LoggerConfig {
    /// Set max entries
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Set the initial enabled state
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Limit captured request and response bodies
    pub fn max_body_size(mut self, max: usize) -> Self {
        self.max_body_size = Some(max);
        self
    }
}
