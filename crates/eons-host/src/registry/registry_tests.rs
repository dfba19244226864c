#![allow(non_snake_case)]

use super::*;
use crate::DirectoryResources;
use crate::test_support::{Events, TableEngineFactory, TestPluginSpec};
use crate::PluginServices;
use eons_core::PluginType;
use std::fs;
use tempfile::TempDir;
use test_case::test_case;

fn id(raw: &str) -> PluginIdentifier {
    PluginIdentifier::parse(raw).unwrap()
}

#[test_case("ca.example.Deck" ; "dotted")]
#[test_case("ca/example/Deck.class" ; "class file")]
#[test_case("class:ca.example.Deck" ; "class prefix")]
fn PluginRegistry___register_native___normalizes_spelling(raw: &str) {
    let services = PluginServices::default();
    TestPluginSpec::new("Deck", PluginType::Activated).register(&services, raw, &Events::default());

    let plugin = services.registry().instantiate(&id("ca.example.Deck")).unwrap();

    assert_eq!(plugin.name(), "Deck");
    assert!(services.registry().is_registered(&id("ca.example.Deck")));
}

#[test]
fn PluginRegistry___register_native___script_id___is_rejected() {
    let registry = PluginRegistry::new();

    let result = registry.register_native("deck/rules.js", || {
        unreachable!("factory is never called")
    });

    assert!(matches!(result, Err(HostError::Registration { .. })));
}

#[test]
fn PluginRegistry___register_native___invalid_id___is_bundle_error() {
    let registry = PluginRegistry::new();

    let result = registry.register_type::<Idle>("9lives");

    assert!(matches!(result, Err(HostError::Bundle(_))));
}

#[derive(Default)]
struct Idle;

impl Plugin for Idle {
    fn initialize(&self, _ctx: &eons_core::PluginContext) -> eons_core::PluginResult<bool> {
        Ok(true)
    }

    fn unload(&self) -> eons_core::PluginResult<()> {
        Ok(())
    }

    fn name(&self) -> String {
        "Idle".to_string()
    }
}

#[test]
fn PluginRegistry___register_type___uses_default_constructor() {
    let registry = PluginRegistry::new();
    registry.register_type::<Idle>("ca.example.Idle").unwrap();

    let first = registry.instantiate(&id("ca.example.Idle")).unwrap();
    let second = registry.instantiate(&id("ca.example.Idle")).unwrap();

    assert_eq!(first.name(), "Idle");
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(registry.native_names(), vec!["ca.example.Idle"]);
}

#[test]
fn PluginRegistry___unregister___removes_native() {
    let registry = PluginRegistry::new();
    registry.register_type::<Idle>("ca.example.Idle").unwrap();

    assert!(registry.unregister(&id("ca.example.Idle")));
    assert!(!registry.unregister(&id("ca.example.Idle")));
    assert!(matches!(
        registry.instantiate(&id("ca.example.Idle")),
        Err(LifecycleError::NotRegistered(_))
    ));
}

#[test]
fn PluginRegistry___instantiate_script___without_engine___unavailable() {
    let registry = PluginRegistry::new();

    let result = registry.instantiate(&id("deck/rules.js"));

    assert!(matches!(result, Err(LifecycleError::ScriptUnavailable { .. })));
    assert!(!registry.is_registered(&id("deck/rules.js")));
}

#[test]
fn PluginRegistry___instantiate_script___reads_source_through_resources() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("resources/deck")).unwrap();
    fs::write(temp.path().join("resources/deck/rules.js"), "getName = Rules\n").unwrap();
    let registry = PluginRegistry::new();
    registry.set_script_engine(Arc::new(TableEngineFactory));
    registry.set_resources(Arc::new(DirectoryResources::new(temp.path())));

    let plugin = registry.instantiate(&id("deck/rules.js")).unwrap();

    assert!(registry.is_registered(&id("deck/rules.js")));
    assert!(format!("{registry:?}").contains("table"));
    // metadata is read during initialize
    assert_eq!(plugin.name(), "rules");
}

#[test]
fn PluginRegistry___instantiate_script___missing_resource() {
    let temp = TempDir::new().unwrap();
    let registry = PluginRegistry::new();
    registry.set_script_engine(Arc::new(TableEngineFactory));
    registry.set_resources(Arc::new(DirectoryResources::new(temp.path())));

    let result = registry.instantiate(&id("deck/rules.js"));

    assert!(matches!(result, Err(LifecycleError::ResourceNotFound(_))));
}
