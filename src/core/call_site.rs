//! Typed call-site context used for per-module overrides

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a log call came from: a module identifier plus the symbol inside it.
///
/// Parsed from dotted qualifiers such as `"storage.Flush"` (module `storage`,
/// symbol `Flush`). Only the text before the first `.` names the module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallSite {
    module: String,
    symbol: String,
}

impl CallSite {
    pub fn new(module: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            symbol: symbol.into(),
        }
    }

    /// Parse a `module.symbol` qualifier. Returns `None` when there is no `.`.
    pub fn parse(qualifier: &str) -> Option<Self> {
        let (module, symbol) = qualifier.split_once('.')?;
        Some(Self::new(module, symbol))
    }

    /// Build a call site from `module_path!()` output, keyed by the last path segment.
    pub fn from_module_path(path: &str) -> Self {
        let module = path.rsplit("::").next().unwrap_or(path);
        Self::new(module, "")
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.symbol.is_empty() {
            write!(f, "{}", self.module)
        } else {
            write!(f, "{}.{}", self.module, self.symbol)
        }
    }
}
