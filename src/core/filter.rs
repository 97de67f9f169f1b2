//! Per-call accept/reject decisions
//!
//! A [`FilterPolicy`] holds the global threshold and two per-module override
//! tables:
//! - the suppress table quiets a module: records at or below the stored level
//!   are rejected no matter how low the global threshold is
//! - the force-allow table makes a module louder: records at or above the
//!   stored level are accepted no matter how high the global threshold is
//!
//! A module never sits in both tables after a force-allow registration, but a
//! later suppress registration leaves an existing force-allow entry in place.

use super::log_level::LogLevel;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};

/// Outcome of a single filter decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    /// Rejected by the module's suppress entry
    Suppressed,
    /// Accepted by the module's force-allow entry, threshold not consulted
    ForcedByModule,
    /// Accepted by the global threshold
    AboveThreshold,
    /// Rejected by the global threshold
    BelowThreshold,
}

impl FilterDecision {
    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(
            self,
            FilterDecision::ForcedByModule | FilterDecision::AboveThreshold
        )
    }
}

#[derive(Debug, Default)]
struct OverrideTables {
    suppress: HashMap<String, LogLevel>,
    force_allow: HashMap<String, LogLevel>,
}

/// Global threshold plus module overrides, safe to share across threads.
///
/// Reads happen on every log call; writes are rare and take the table lock
/// exclusively so both tables change together.
#[derive(Debug)]
pub struct FilterPolicy {
    threshold: AtomicU8,
    overrides: RwLock<OverrideTables>,
}

impl FilterPolicy {
    pub fn new(threshold: LogLevel) -> Self {
        Self {
            threshold: AtomicU8::new(threshold as u8),
            overrides: RwLock::new(OverrideTables::default()),
        }
    }

    pub fn threshold(&self) -> LogLevel {
        LogLevel::from_u8(self.threshold.load(Ordering::Relaxed))
    }

    pub fn set_threshold(&self, level: LogLevel) {
        self.threshold.store(level as u8, Ordering::Relaxed);
    }

    /// Reject records from `module` at or below `level`.
    ///
    /// Any force-allow entry for the module is left untouched.
    pub fn suppress(&self, module: impl Into<String>, level: LogLevel) {
        self.overrides.write().suppress.insert(module.into(), level);
    }

    /// Accept records from `module` at or above `level`, ignoring the threshold.
    ///
    /// Clears any suppress entry for the module.
    pub fn force_allow(&self, module: impl Into<String>, level: LogLevel) {
        let module = module.into();
        let mut tables = self.overrides.write();
        tables.suppress.remove(&module);
        tables.force_allow.insert(module, level);
    }

    pub fn suppressed_level(&self, module: &str) -> Option<LogLevel> {
        self.overrides.read().suppress.get(module).copied()
    }

    pub fn forced_level(&self, module: &str) -> Option<LogLevel> {
        self.overrides.read().force_allow.get(module).copied()
    }

    /// Drop every module override. The threshold is unchanged.
    pub fn clear_overrides(&self) {
        let mut tables = self.overrides.write();
        tables.suppress.clear();
        tables.force_allow.clear();
    }

    /// Decide whether a record at `level` from `module` is emitted.
    pub fn decide(&self, level: LogLevel, module: Option<&str>) -> FilterDecision {
        if let Some(module) = module {
            let tables = self.overrides.read();
            if let Some(&muted) = tables.suppress.get(module) {
                if level <= muted {
                    return FilterDecision::Suppressed;
                }
            }
            if let Some(&forced) = tables.force_allow.get(module) {
                if level >= forced {
                    return FilterDecision::ForcedByModule;
                }
            }
        }

        if self.threshold() <= level {
            FilterDecision::AboveThreshold
        } else {
            FilterDecision::BelowThreshold
        }
    }

    #[inline]
    pub fn accepts(&self, level: LogLevel, module: Option<&str>) -> bool {
        self.decide(level, module).is_accepted()
    }
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::new(LogLevel::default())
    }
}
