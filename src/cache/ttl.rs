//! TTL Policy Module
//!
//! Named freshness presets so callers pick "how often does this change"
//! instead of hard-coding durations. Tuning a preset is a one-line change
//! here, not a grep across the adapters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// == TTL Class ==
/// How long a cached resource family stays fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtlClass {
    /// Rapidly changing data, e.g. alert feeds
    Volatile,
    /// The normal working set, e.g. call lists and call details
    Moderate,
    /// Rarely changing data, e.g. the team roster and company directory
    Stable,
    /// Effectively immutable data, e.g. finished call transcripts
    Archival,
}

impl TtlClass {
    /// Returns the cache duration for this class.
    pub fn duration(self) -> Duration {
        match self {
            TtlClass::Volatile => Duration::from_secs(2 * 60),
            TtlClass::Moderate => Duration::from_secs(10 * 60),
            TtlClass::Stable => Duration::from_secs(60 * 60),
            TtlClass::Archival => Duration::from_secs(24 * 60 * 60),
        }
    }
}
