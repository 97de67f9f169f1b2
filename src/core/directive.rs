//! `module=level` override directives
//!
//! Directive lists come from configuration as comma separated entries, for
//! example `"storage=warn, net = dbg"`. Bad entries never abort loading: each
//! one is reported on stderr and skipped.

use super::error::{LoggerError, Result};
use super::filter::FilterPolicy;
use super::log_level::LogLevel;
use std::fmt;
use std::str::FromStr;

/// Which override table a directive list feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// Whitelist: make the module louder
    ForceAllow,
    /// Blacklist: quiet the module
    Suppress,
}

impl DirectiveKind {
    /// Configuration key the list is conventionally read from.
    pub fn source_name(&self) -> &'static str {
        match self {
            DirectiveKind::ForceAllow => "LOG_WHITELIST",
            DirectiveKind::Suppress => "LOG_BLACKLIST",
        }
    }
}

/// A single parsed `module=level` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDirective {
    pub module: String,
    pub level: LogLevel,
}

impl FromStr for ModuleDirective {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split('=');
        let module = parts.next().unwrap_or_default().trim();
        let token = parts
            .next()
            .ok_or_else(|| LoggerError::malformed_directive(s, "expected 'module=level'"))?;
        if module.is_empty() {
            return Err(LoggerError::malformed_directive(s, "empty module name"));
        }
        let level = token
            .parse::<LogLevel>()
            .map_err(|_| LoggerError::malformed_directive(s, format!("unknown level '{}'", token.trim())))?;

        Ok(Self {
            module: module.to_string(),
            level,
        })
    }
}

impl ModuleDirective {
    /// Line printed once the directive has been registered
    pub fn confirmation(&self, kind: DirectiveKind) -> String {
        match kind {
            DirectiveKind::ForceAllow => format!(
                "[LOG CONFIG] Turned up module {} to {} and above",
                self.module, self.level
            ),
            DirectiveKind::Suppress => format!(
                "[LOG CONFIG] Muted module {} at {} and below",
                self.module, self.level
            ),
        }
    }
}

impl fmt::Display for ModuleDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.module, self.level)
    }
}

/// Result of parsing a directive list: usable entries plus skipped ones
#[derive(Debug, Default)]
pub struct DirectiveList {
    pub directives: Vec<ModuleDirective>,
    pub skipped: Vec<LoggerError>,
}

impl DirectiveList {
    /// Parse a comma separated list. Surrounding quotes are stripped and
    /// blank entries are ignored without a diagnostic.
    pub fn parse(list: &str) -> Self {
        let list = list.trim().trim_matches(|c| c == '"' || c == '\'');
        let mut parsed = Self::default();

        for entry in list.split(',') {
            if entry.trim().is_empty() {
                continue;
            }
            match entry.parse::<ModuleDirective>() {
                Ok(directive) => parsed.directives.push(directive),
                Err(e) => parsed.skipped.push(e),
            }
        }

        parsed
    }

    /// Register every usable directive with `policy`, printing one diagnostic
    /// per skipped entry and one confirmation per registered directive.
    /// Returns the number of directives applied.
    pub fn apply(&self, policy: &FilterPolicy, kind: DirectiveKind) -> usize {
        for err in &self.skipped {
            eprintln!("[LOG CONFIG] Skipping entry in {}: {}", kind.source_name(), err);
        }

        for directive in &self.directives {
            match kind {
                DirectiveKind::ForceAllow => policy.force_allow(&directive.module, directive.level),
                DirectiveKind::Suppress => policy.suppress(&directive.module, directive.level),
            }
            eprintln!("{}", directive.confirmation(kind));
        }

        self.directives.len()
    }
}

/// Parse `list` and register it with `policy` in one step.
pub fn load_directives(policy: &FilterPolicy, kind: DirectiveKind, list: &str) -> usize {
    DirectiveList::parse(list).apply(policy, kind)
}
