//! Property-based tests for plugin_errors
//!
//! These tests use proptest to generate random inputs and verify invariants hold.

use plugin_errors::convenience::{MAX_PARAM_LEN, TRUNCATION_INDICATOR, format_message};
use plugin_errors::properties::{self, Properties};
use plugin_errors::{ConfigStore, MessageCatalog, MessageCode, PluginException, Severity};
use proptest::prelude::*;
use std::sync::LazyLock;

static CATALOG: LazyLock<MessageCatalog> = LazyLock::new(MessageCatalog::bundled);

// ============================================================================
// CODE GRAMMAR PROPERTIES
// ============================================================================

proptest! {
    /// Every well-formed code parses and yields its numeric group as status
    #[test]
    fn valid_codes_yield_their_status(
        status in 100u16..=999,
        tag in "[A-Za-z0-9_]{2}",
        seq in 0u16..=9999,
    ) {
        let raw = format!("PR{status:03}-{tag}-{seq:04}");
        let code = MessageCode::parse(raw.clone()).unwrap();
        prop_assert_eq!(code.status(), Some(status));
        prop_assert_eq!(code.tag(), tag.as_str());
        prop_assert_eq!(code.as_str(), raw.as_str());
    }

    /// Anything without the fixed prefix is rejected
    #[test]
    fn unprefixed_codes_are_rejected(s in "[^P].{0,20}") {
        prop_assert!(MessageCode::parse(s.clone()).is_err());
        prop_assert!(MessageCode::parse_log(s).is_err());
    }

    /// Log grammar accepts both forms
    #[test]
    fn log_grammar(tag in "[A-Z]{2}", seq in 0u16..=9999) {
        let log = format!("PL-{tag}-{seq:04}");
        prop_assert_eq!(MessageCode::parse_log(log.clone()).unwrap().status(), None);
        prop_assert!(MessageCode::parse(log).is_err());
    }

    /// Status inference never yields ERROR or DEBUG
    #[test]
    fn status_inference_is_warn_or_info(status in any::<u16>()) {
        let inferred = Severity::from_status(status);
        if (400..500).contains(&status) {
            prop_assert_eq!(inferred, Severity::Info);
        } else {
            prop_assert_eq!(inferred, Severity::Warn);
        }
    }
}

// ============================================================================
// FORMATTING PROPERTIES
// ============================================================================

proptest! {
    /// No control character survives formatting
    #[test]
    fn formatted_messages_have_no_control_chars(
        template in "\\PC{0,64}",
        a in any::<String>(),
        b in any::<String>(),
    ) {
        let msg = format_message(&template, &[&a, &b]);
        prop_assert!(!msg.chars().any(char::is_control), "{:?}", msg);
    }

    /// One parameter contributes at most MAX_PARAM_LEN bytes
    #[test]
    fn parameters_are_bounded(s in "\\PC{0,3000}") {
        let msg = format_message("{0}", &[&s]);
        prop_assert!(msg.len() <= MAX_PARAM_LEN);
        if s.len() <= MAX_PARAM_LEN {
            prop_assert_eq!(msg, s);
        } else {
            prop_assert!(msg.ends_with(TRUNCATION_INDICATOR));
        }
    }

    /// Templates without placeholders come back unchanged
    #[test]
    fn plain_templates_pass_through(template in "[^{\\p{Cc}]{0,100}", arg in "\\PC{0,10}") {
        prop_assert_eq!(format_message(&template, &[&arg]), template);
    }
}

// ============================================================================
// DERIVATION PROPERTIES
// ============================================================================

proptest! {
    /// params on a shared instance never leaks between derivations
    #[test]
    fn params_is_pure(first in "\\PC{0,50}", second in "\\PC{0,50}") {
        let base = PluginException::create(&CATALOG, "PR404-OD-0002").unwrap();
        let a = base.params(&[&first]);
        let b = base.params(&[&second]);

        prop_assert_eq!(a.message(), format_message(base.template(), &[&first]));
        prop_assert_eq!(b.message(), format_message(base.template(), &[&second]));
        prop_assert_eq!(base.message(), base.template());
    }

    /// reason and with_cause never alter code, status, severity or message
    #[test]
    fn reason_preserves_identity(detail in "\\PC{0,50}") {
        let base = PluginException::create(&CATALOG, "PR500-NW-0001")
            .unwrap()
            .params(&[&detail]);
        let cycled = base.reason(std::io::Error::other(detail.clone())).with_cause(None);

        prop_assert_eq!(cycled.code(), base.code());
        prop_assert_eq!(cycled.status(), base.status());
        prop_assert_eq!(cycled.severity(), base.severity());
        prop_assert_eq!(cycled.message(), base.message());
        prop_assert!(cycled.cause().is_none());
    }
}

// ============================================================================
// CONFIG MERGE PROPERTIES
// ============================================================================

fn layer() -> impl Strategy<Value = Properties> {
    prop::collection::btree_map("[a-z]{1,3}", "[a-z0-9]{0,4}", 0..12)
}

proptest! {
    /// Effective value is the override if present, else the default
    #[test]
    fn override_wins_per_key(defaults in layer(), overrides in layer()) {
        let store = ConfigStore::from_layers(defaults.clone(), overrides.clone());
        for key in defaults.keys().chain(overrides.keys()) {
            let expected = overrides.get(key).or_else(|| defaults.get(key)).cloned();
            prop_assert_eq!(store.get(key), expected);
        }
    }

    /// Reload with unchanged sources yields the same effective map
    #[test]
    fn reload_is_idempotent(defaults in layer(), overrides in layer()) {
        let store = ConfigStore::from_layers(defaults, overrides);
        let before = store.snapshot();
        store.reload().unwrap();
        let once = store.snapshot();
        store.reload().unwrap();
        prop_assert_eq!(&before, &once);
        prop_assert_eq!(once, store.snapshot());
    }

    /// Rendering and re-parsing simple properties is lossless
    #[test]
    fn properties_parse_simple_pairs(map in layer()) {
        let text: String = map.iter().map(|(k, v)| format!("{k}={v}\n")).collect();
        prop_assert_eq!(properties::parse(&text), map);
    }
}
