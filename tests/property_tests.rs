//! Property-based tests for rust_log_dispatch using proptest

use proptest::prelude::*;
use rust_log_dispatch::core::{DirectiveList, LEVEL_ALIASES};
use rust_log_dispatch::prelude::*;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Verbose),
        Just(LogLevel::Debug),
        Just(LogLevel::Success),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Fatal),
    ]
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Ordering follows the numeric rank
    #[test]
    fn test_log_level_ordering(level1 in any_level(), level2 in any_level()) {
        let val1 = level1 as u8;
        let val2 = level2 as u8;

        prop_assert_eq!(level1 <= level2, val1 <= val2);
        prop_assert_eq!(level1 < level2, val1 < val2);
        prop_assert_eq!(level1 > level2, val1 > val2);
    }

    /// Canonical names parse back to the same level
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
        prop_assert_eq!(format!("{}", level), level.to_str());
    }

    /// Every alias is recognized in any letter case
    #[test]
    fn test_alias_case_insensitive(idx in 0..LEVEL_ALIASES.len(), flips in prop::collection::vec(any::<bool>(), 16)) {
        let (alias, level) = LEVEL_ALIASES[idx];
        let mixed: String = alias
            .chars()
            .zip(flips.iter().cycle())
            .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c })
            .collect();

        prop_assert_eq!(LogLevel::from_alias(&mixed), Some(level));
    }

    /// Unknown tokens never resolve to a level
    #[test]
    fn test_unknown_tokens_rejected(token in "[xyzqjk]{1,12}") {
        prop_assert!(LogLevel::from_alias(&token).is_none());
        prop_assert!(token.parse::<LogLevel>().is_err());
    }
}

// ============================================================================
// Filter Tests
// ============================================================================

proptest! {
    /// Without overrides, acceptance is exactly `threshold <= level`
    #[test]
    fn test_threshold_rule(threshold in any_level(), level in any_level(), module in proptest::option::of("[a-z]{1,8}")) {
        let policy = FilterPolicy::new(threshold);
        prop_assert_eq!(policy.accepts(level, module.as_deref()), threshold <= level);
    }

    /// A suppress entry rejects every level at or below it, whatever the threshold
    #[test]
    fn test_suppress_rule(threshold in any_level(), muted in any_level(), level in any_level()) {
        let policy = FilterPolicy::new(threshold);
        policy.suppress("foo", muted);

        if level <= muted {
            prop_assert_eq!(policy.decide(level, Some("foo")), FilterDecision::Suppressed);
        } else {
            prop_assert_eq!(policy.accepts(level, Some("foo")), threshold <= level);
        }
    }

    /// Severe dispatcher calls are emitted regardless of policy
    #[test]
    fn test_severe_calls_always_emitted(threshold in any_level(), muted in any_level()) {
        let dispatcher = Dispatcher::builder().threshold(threshold).build();
        dispatcher.suppress_module("foo", muted);

        let fields = LogFields::new().with("func", "foo.Bar");
        dispatcher.warn_with_fields("w", fields.clone());
        dispatcher.error_with_fields("e", fields);

        prop_assert_eq!(dispatcher.metrics().accepted(), 2);
        prop_assert_eq!(dispatcher.metrics().filtered(), 0);
    }
}

// ============================================================================
// Directive Parsing Tests
// ============================================================================

proptest! {
    /// Arbitrary input never panics, and every entry is either used or reported
    #[test]
    fn test_directive_parsing_no_panic(list in ".*") {
        let parsed = DirectiveList::parse(&list);
        let entries = list
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .split(',')
            .filter(|entry| !entry.trim().is_empty())
            .count();
        prop_assert_eq!(parsed.directives.len() + parsed.skipped.len(), entries);
    }

    /// Well-formed entries are all applied
    #[test]
    fn test_well_formed_directives(entries in prop::collection::vec(("[a-z]{1,8}", 0..LEVEL_ALIASES.len()), 1..6)) {
        let list = entries
            .iter()
            .map(|(module, idx)| format!("{}={}", module, LEVEL_ALIASES[*idx].0))
            .collect::<Vec<_>>()
            .join(",");

        let parsed = DirectiveList::parse(&list);
        prop_assert!(parsed.skipped.is_empty());
        prop_assert_eq!(parsed.directives.len(), entries.len());
    }
}

// ============================================================================
// Record Tests
// ============================================================================

proptest! {
    /// Messages never carry raw line breaks or tabs (prevents log injection)
    #[test]
    fn test_message_sanitization(message in ".*") {
        let record = LogRecord::new(LogLevel::Info, &message);
        prop_assert!(!record.message.contains('\n'));
        prop_assert!(!record.message.contains('\r'));
        prop_assert!(!record.message.contains('\t'));
    }

    /// Every format encodes to a single line
    #[test]
    fn test_encoding_is_single_line(message in ".*", value in ".*") {
        let record = LogRecord::new(LogLevel::Warn, &message)
            .with_fields(LogFields::new().with("detail", value));

        for format in [OutputFormat::Json, OutputFormat::Text, OutputFormat::Logfmt] {
            let line = format.format(&record, &TimestampFormat::default());
            prop_assert!(!line.contains('\n'), "{:?} produced a multi-line record", format);
        }
    }
}
