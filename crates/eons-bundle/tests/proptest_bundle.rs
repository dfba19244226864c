//! Property-based tests for identifiers and root descriptors
//!
//! Tests that normalization is idempotent for every spelling an identifier
//! can arrive in, and that root descriptors survive a serialize/parse cycle.

use eons_bundle::{PluginIdentifier, Priority, RootDescriptor, normalize};
use proptest::prelude::*;
use std::collections::BTreeMap;

// Strategy: one legal name segment
fn arb_segment() -> impl Strategy<Value = String> + Clone {
    "[a-zA-Z_$][a-zA-Z0-9_$]{0,6}"
}

// Strategy: identifiers in native, path and script spellings
fn arb_raw_identifier() -> impl Strategy<Value = String> {
    let segments = prop::collection::vec(arb_segment(), 1..4);
    prop_oneof![
        segments.clone().prop_map(|s| s.join(".")),
        segments.clone().prop_map(|s| format!("class:{}", s.join("."))),
        segments.clone().prop_map(|s| format!("{}.class", s.join("/"))),
        segments.clone().prop_map(|s| format!("/{}.java", s.join("/"))),
        segments.clone().prop_map(|s| format!("{}.js", s.join("/"))),
        segments.clone().prop_map(|s| format!("/resources/{}.js", s.join("/"))),
        segments.clone().prop_map(|s| format!("/{}.js", s.join("/"))),
        segments.clone().prop_map(|s| format!("res://{}.js", s.join("/"))),
        segments.prop_map(|s| format!("script:{}.js", s.join("\\"))),
    ]
}

// Strategy: client property keys that are not built-in fields
fn arb_property_key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,10}".prop_filter("reserved key", |key| {
        !matches!(key.as_str(), "id" | "priority" | "installer")
    })
}

// Strategy: printable values, including characters that need escaping
fn arb_property_value() -> impl Strategy<Value = String> {
    "[ -~\t\n]{0,24}".prop_map(|v| v.trim().to_string())
}

proptest! {
    /// Property: normalizing twice gives the same result as normalizing once
    #[test]
    fn proptest_normalize_idempotent(raw in arb_raw_identifier()) {
        if let Ok(once) = normalize(&raw) {
            let twice = normalize(&once).expect("normalized identifiers stay valid");
            prop_assert_eq!(twice, once);
        }
    }

    /// Property: parse(serialize(root)) keeps the model
    #[test]
    fn proptest_root_descriptor_roundtrip(
        priority in any::<i32>(),
        ids in prop::collection::vec(arb_raw_identifier(), 0..6),
        properties in prop::collection::btree_map(arb_property_key(), arb_property_value(), 0..8),
        with_installer in any::<bool>(),
    ) {
        let mut root = RootDescriptor::new();
        root.set_priority(Priority::new(priority));
        root.set_identifiers(ids.iter().filter_map(|raw| PluginIdentifier::parse(raw).ok()));
        for (key, value) in &properties {
            root.set_client_property(key, value);
        }
        if with_installer {
            root.set_installer(PluginIdentifier::parse("mygame/install.js").ok());
        }

        let reparsed = RootDescriptor::parse(&root.to_string());

        prop_assert!(reparsed.errors().is_empty(), "{:?}", reparsed.errors());
        prop_assert_eq!(reparsed.priority(), root.priority());
        prop_assert_eq!(reparsed.installer(), root.installer());
        prop_assert_eq!(reparsed.identifiers(), root.identifiers());
        prop_assert_eq!(reparsed.client_properties(), root.client_properties());
        prop_assert_eq!(&reparsed, &root);
        let expected: BTreeMap<String, String> = properties;
        prop_assert_eq!(reparsed.client_properties(), &expected);
    }
}
