//! Integration tests for log dispatch
//!
//! These tests verify:
//! - Threshold and module override filtering through the public API
//! - Warn/Error/Fatal always reach the sinks
//! - Fatal flushes before the fatal action runs
//! - Disabling logging writes nothing at all
//! - Log injection prevention
//! - Thread safety

use parking_lot::Mutex;
use rust_log_dispatch::appenders::ConsoleAppender;
use rust_log_dispatch::prelude::*;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().clone()).expect("utf8 output")
    }

    fn lines(&self) -> Vec<serde_json::Value> {
        self.contents()
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn console_dispatcher(threshold: LogLevel) -> (Dispatcher, SharedBuf) {
    let buf = SharedBuf::default();
    let dispatcher = Dispatcher::builder()
        .threshold(threshold)
        .appender(ConsoleAppender::with_writer(Box::new(buf.clone())))
        .on_fatal(Arc::new(|| {}))
        .build();
    (dispatcher, buf)
}

fn func(qualifier: &str) -> LogFields {
    LogFields::new().with("func", qualifier)
}

#[test]
fn test_threshold_scenario() {
    let (dispatcher, buf) = console_dispatcher(LogLevel::Info);

    dispatcher.debug("hidden");
    dispatcher.info("shown");

    let lines = buf.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["message"], "shown");
    assert_eq!(lines[0]["level"], "INFO");
}

#[test]
fn test_suppress_scenario() {
    let (dispatcher, buf) = console_dispatcher(LogLevel::Verbose);
    dispatcher.suppress_module("foo", LogLevel::Info);

    dispatcher.info_with_fields("muted", func("foo.Bar"));
    dispatcher.info_with_fields("other module", func("baz.Bar"));
    dispatcher.warn_with_fields("severe", func("foo.Bar"));

    let messages: Vec<String> = buf
        .lines()
        .iter()
        .map(|line| line["message"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(messages, vec!["other module", "severe"]);
}

#[test]
fn test_force_allow_scenario() {
    let (dispatcher, buf) = console_dispatcher(LogLevel::Error);
    dispatcher.force_allow_module("foo", LogLevel::Debug);

    dispatcher.debug_with_fields("forced", func("foo.Bar"));
    dispatcher.debug_with_fields("not forced", func("bar.Baz"));
    dispatcher.verbose_with_fields("below forced level", func("foo.Bar"));

    let lines = buf.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["message"], "forced");
    assert_eq!(lines[0]["func"], "foo.Bar");
}

#[test]
fn test_force_allow_clears_suppress() {
    let (dispatcher, buf) = console_dispatcher(LogLevel::Error);
    dispatcher.suppress_module("foo", LogLevel::Fatal);
    dispatcher.force_allow_module("foo", LogLevel::Debug);

    dispatcher.debug_with_fields("visible", func("foo.Bar"));
    assert_eq!(buf.lines().len(), 1);
}

#[test]
fn test_suppress_keeps_force_allow_entry() {
    let (dispatcher, buf) = console_dispatcher(LogLevel::Error);
    dispatcher.force_allow_module("foo", LogLevel::Verbose);
    dispatcher.suppress_module("foo", LogLevel::Debug);

    dispatcher.debug_with_fields("suppressed", func("foo.Bar"));
    dispatcher.info_with_fields("still forced", func("foo.Bar"));

    let lines = buf.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["message"], "still forced");
}

#[test]
fn test_severe_levels_ignore_every_filter() {
    let (dispatcher, buf) = console_dispatcher(LogLevel::Fatal);
    dispatcher.suppress_module("foo", LogLevel::Fatal);

    dispatcher.warn_with_fields("w", func("foo.Bar"));
    dispatcher.error_with_fields("e", func("foo.Bar"));

    let levels: Vec<String> = buf
        .lines()
        .iter()
        .map(|line| line["level"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(levels, vec!["WARN", "ERROR"]);
}

#[test]
fn test_fatal_emits_flushes_then_exits() {
    let buf = SharedBuf::default();
    let exits = Arc::new(AtomicUsize::new(0));
    let exits_clone = Arc::clone(&exits);
    let observed = buf.clone();

    let dispatcher = Dispatcher::builder()
        .threshold(LogLevel::Fatal)
        .appender(ConsoleAppender::with_writer(Box::new(buf.clone())))
        .on_fatal(Arc::new(move || {
            assert!(observed.contents().contains("unrecoverable"));
            exits_clone.fetch_add(1, Ordering::SeqCst);
        }))
        .build();

    dispatcher.fatal_with_fields("unrecoverable", LogFields::new().with("code", 3));

    assert_eq!(exits.load(Ordering::SeqCst), 1);
    assert_eq!(buf.lines()[0]["code"], 3);
}

#[test]
fn test_disable_all_writes_zero_bytes() {
    let (dispatcher, buf) = console_dispatcher(LogLevel::Verbose);
    dispatcher.disable();

    dispatcher.verbose("v");
    dispatcher.info("i");
    dispatcher.warn("w");
    dispatcher.error("e");
    dispatcher.fatal("f");
    dispatcher.flush().unwrap();

    assert!(buf.0.lock().is_empty());

    dispatcher.enable();
    dispatcher.info("back");
    assert_eq!(buf.lines().len(), 1);
}

#[test]
fn test_structured_fields_in_order() {
    let (dispatcher, buf) = console_dispatcher(LogLevel::Debug);
    dispatcher.info_with_fields(
        "request",
        LogFields::new()
            .with("user", "alice")
            .with("status", 200)
            .with("ok", true)
            .with("user", "shadowed"),
    );

    let line = &buf.lines()[0];
    assert_eq!(line["user"], "alice");
    assert_eq!(line["status"], 200);
    assert_eq!(line["ok"], true);
}

#[test]
fn test_log_injection_prevention() {
    let buf = SharedBuf::default();
    let dispatcher = Dispatcher::builder()
        .format(OutputFormat::Text)
        .appender(ConsoleAppender::with_writer(Box::new(buf.clone())))
        .build();

    dispatcher.info("User login\nERROR [2024-10-17] Fake error injected\nINFO Continuation");

    let content = buf.contents();
    assert!(content.contains("\\n"));
    assert_eq!(content.lines().count(), 1, "Log should be a single line");
}

#[test]
fn test_directives_from_config() {
    let config = DispatchConfig {
        threshold: LogLevel::Error,
        whitelist: "'net=v, =info, cache'".to_string(),
        blacklist: "net=debug,db=bogus".to_string(),
        ..Default::default()
    };
    let dispatcher = Dispatcher::from_config(&config).unwrap();
    let policy = dispatcher.policy();

    // Whitelist first, blacklist second: the later suppress does not undo the force-allow
    assert_eq!(policy.forced_level("net"), Some(LogLevel::Verbose));
    assert_eq!(policy.suppressed_level("net"), Some(LogLevel::Debug));
    assert_eq!(policy.suppressed_level("db"), None);
    assert!(!policy.accepts(LogLevel::Debug, Some("net")));
    assert!(policy.accepts(LogLevel::Success, Some("net")));
}

#[test]
fn test_concurrent_dispatch_with_policy_changes() {
    let (dispatcher, buf) = console_dispatcher(LogLevel::Verbose);
    let dispatcher = Arc::new(dispatcher);
    let mut handles = vec![];

    for t in 0..4 {
        let dispatcher = Arc::clone(&dispatcher);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                dispatcher.warn(format!("thread {} message {}", t, i));
                if i % 10 == 0 {
                    dispatcher.suppress_module(format!("m{}", t), LogLevel::Info);
                    dispatcher.set_threshold(LogLevel::Debug);
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(buf.contents().lines().count(), 400);
    assert_eq!(dispatcher.metrics().delivered(), 400);
}

#[test]
fn test_failing_appender_does_not_block_others() {
    struct Broken;

    impl Appender for Broken {
        fn append(&mut self, _line: &EncodedLine) -> Result<()> {
            Err(LoggerError::other("disk on fire"))
        }
        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
        fn name(&self) -> &str {
            "broken"
        }
    }

    let buf = SharedBuf::default();
    let dispatcher = Dispatcher::builder()
        .appender(Broken)
        .appender(ConsoleAppender::with_writer(Box::new(buf.clone())))
        .build();

    dispatcher.error("still delivered");

    assert_eq!(buf.lines().len(), 1);
    assert_eq!(dispatcher.metrics().sink_failures(), 1);
}
