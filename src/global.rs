//! Process-wide dispatcher
//!
//! The free functions here log through a single shared [`Dispatcher`]. Until
//! [`install`] or [`try_init_from_env`] runs, a console-only dispatcher with
//! the default `Debug` threshold is used.

use crate::appenders::ConsoleAppender;
use crate::config::DispatchConfig;
use crate::core::{Dispatcher, LogFields, LogLevel, Result};
use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<RwLock<Arc<Dispatcher>>> = OnceLock::new();

fn slot() -> &'static RwLock<Arc<Dispatcher>> {
    GLOBAL.get_or_init(|| {
        let dispatcher = Dispatcher::builder()
            .appender(ConsoleAppender::new())
            .build();
        RwLock::new(Arc::new(dispatcher))
    })
}

/// The active process-wide dispatcher
pub fn dispatcher() -> Arc<Dispatcher> {
    Arc::clone(&slot().read())
}

/// Make `dispatcher` the process-wide dispatcher. Returns the previous one.
pub fn install(dispatcher: Dispatcher) -> Arc<Dispatcher> {
    std::mem::replace(&mut *slot().write(), Arc::new(dispatcher))
}

/// Build a dispatcher from the process environment and install it.
///
/// # Errors
///
/// Returns `SinkInitialization` when an enabled sink cannot be built; the
/// current dispatcher is left in place.
pub fn try_init_from_env() -> Result<Arc<Dispatcher>> {
    let config = DispatchConfig::from_env();
    let dispatcher = Dispatcher::from_config(&config)?;
    install(dispatcher);
    Ok(self::dispatcher())
}

pub fn set_threshold(level: LogLevel) {
    dispatcher().set_threshold(level);
}

/// Suppress records from `module` at or below `level`
pub fn suppress_module(module: impl Into<String>, level: LogLevel) {
    dispatcher().suppress_module(module, level);
}

/// Allow records from `module` at or above `level` regardless of the threshold
pub fn force_allow_module(module: impl Into<String>, level: LogLevel) {
    dispatcher().force_allow_module(module, level);
}

pub fn disable_logging() {
    dispatcher().disable();
}

pub fn enable_logging() {
    dispatcher().enable();
}

pub fn verbose(message: impl AsRef<str>, fields: LogFields) {
    dispatcher().verbose_with_fields(message, fields);
}

pub fn debug(message: impl AsRef<str>, fields: LogFields) {
    dispatcher().debug_with_fields(message, fields);
}

pub fn success(message: impl AsRef<str>, fields: LogFields) {
    dispatcher().success_with_fields(message, fields);
}

pub fn info(message: impl AsRef<str>, fields: LogFields) {
    dispatcher().info_with_fields(message, fields);
}

pub fn warn(message: impl AsRef<str>, fields: LogFields) {
    dispatcher().warn_with_fields(message, fields);
}

pub fn error(message: impl AsRef<str>, fields: LogFields) {
    dispatcher().error_with_fields(message, fields);
}

/// Log at fatal severity, flush every sink, then terminate the process.
pub fn fatal(message: impl AsRef<str>, fields: LogFields) {
    dispatcher().fatal_with_fields(message, fields);
}
