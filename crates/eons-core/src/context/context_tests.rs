#![allow(non_snake_case)]

use super::*;
use crate::{PluginResult, PluginType};
use uuid::Uuid;

struct Owner {
    catalog_id: Option<CatalogId>,
    identifier: Option<PluginIdentifier>,
}

impl InstalledObject for Owner {
    fn kind(&self) -> BundleKind {
        BundleKind::Plugin
    }

    fn catalog_id(&self) -> Option<CatalogId> {
        self.catalog_id
    }

    fn identifier(&self) -> Option<PluginIdentifier> {
        self.identifier.clone()
    }

    fn name(&self) -> String {
        "Owner".to_string()
    }
}

struct Quiet;

impl Plugin for Quiet {
    fn initialize(&self, _ctx: &PluginContext) -> PluginResult<bool> {
        Ok(true)
    }

    fn unload(&self) -> PluginResult<()> {
        Ok(())
    }

    fn name(&self) -> String {
        "Quiet".to_string()
    }

    fn plugin_type(&self) -> PluginType {
        PluginType::Injected
    }
}

fn factory() -> ContextFactory {
    ContextFactory::new(Arc::new(Settings::new()))
}

fn owner(catalog_id: Option<CatalogId>, id: &str) -> Arc<dyn InstalledObject> {
    Arc::new(Owner {
        catalog_id,
        identifier: Some(PluginIdentifier::parse(id).unwrap()),
    })
}

// dummy contexts

#[test]
fn ContextFactory___create_dummy___zero_modifiers_is_shared() {
    let factory = factory();

    let a = factory.create_dummy(ActivationModifiers::NONE);
    let b = factory.create_dummy(ActivationModifiers::NONE);

    assert!(a.ptr_eq(&b));
    assert!(a.is_dummy());
}

#[test]
fn ContextFactory___create_dummy___with_modifiers_is_fresh() {
    let factory = factory();

    let a = factory.create_dummy(ActivationModifiers::SHIFT);
    let b = factory.create_dummy(ActivationModifiers::SHIFT);

    assert!(!a.ptr_eq(&b));
    assert_eq!(a.modifiers(), ActivationModifiers::SHIFT);
}

#[test]
fn ContextFactory___create___without_owner_or_plugin___is_dummy() {
    let factory = factory();

    let ctx = factory.create(None, None, ActivationModifiers::NONE, false);

    assert!(ctx.ptr_eq(&factory.create_dummy(ActivationModifiers::NONE)));
}

#[test]
fn PluginContext___dummy_contexts___share_settings_namespace() {
    let factory = factory();
    let a = factory.create_dummy(ActivationModifiers::NONE);
    let b = factory.create_dummy(ActivationModifiers::ALT);

    a.settings().set("last-run", "yes");

    assert_eq!(b.settings().get("last-run").as_deref(), Some("yes"));
    assert_eq!(a.settings().prefix(), DUMMY_NAMESPACE);
}

// owned contexts

#[test]
fn PluginContext___owner_with_catalog_id___uses_uuid_prefix() {
    let factory = factory();
    let uuid = Uuid::new_v4();
    let catalog_id = CatalogId::from_parts(uuid, eons_bundle::CatalogStamp::now());
    let owner = owner(Some(catalog_id), "ca.example.Deck");

    let ctx = factory.create(Some(Arc::downgrade(&owner)), None, ActivationModifiers::NONE, false);

    assert_eq!(ctx.settings().prefix(), format!("{uuid}:"));
    assert!(!ctx.is_dummy());
}

#[test]
fn PluginContext___owner_without_catalog_id___uses_identifier_prefix() {
    let factory = factory();
    let owner = owner(None, "mygame/rules.js");

    let ctx = factory.create(Some(Arc::downgrade(&owner)), None, ActivationModifiers::NONE, false);

    assert_eq!(ctx.settings().prefix(), "script:res://mygame/rules.js:");
}

#[test]
fn PluginContext___settings___resolved_once_per_context() {
    let factory = factory();
    let owner = owner(None, "ca.example.Deck");
    let ctx = factory.create(Some(Arc::downgrade(&owner)), None, ActivationModifiers::NONE, false);

    let first = ctx.settings() as *const SettingsNamespace;
    let second = ctx.clone();

    assert!(std::ptr::eq(first, second.settings()));
}

#[test]
fn PluginContext___separate_owners___isolated_settings() {
    let factory = factory();
    let a = owner(None, "ca.example.A");
    let b = owner(None, "ca.example.B");
    let ctx_a = factory.create(Some(Arc::downgrade(&a)), None, ActivationModifiers::NONE, false);
    let ctx_b = factory.create(Some(Arc::downgrade(&b)), None, ActivationModifiers::NONE, false);

    ctx_a.settings().set("size", "1");

    assert_eq!(ctx_b.settings().get("size"), None);
    assert_eq!(factory.settings().get("ca.example.A:size").as_deref(), Some("1"));
}

#[test]
fn PluginContext___plugin_and_probe_flag___are_exposed() {
    let factory = factory();
    let owner = owner(None, "ca.example.Quiet");
    let plugin: Arc<dyn Plugin> = Arc::new(Quiet);

    let ctx = factory.create(
        Some(Arc::downgrade(&owner)),
        Some(&plugin),
        ActivationModifiers::CTRL,
        true,
    );

    assert!(ctx.is_information_probe());
    assert_eq!(ctx.plugin().map(|p| p.name()).as_deref(), Some("Quiet"));
    assert_eq!(ctx.owner().map(|o| o.name()).as_deref(), Some("Owner"));
    assert_eq!(ctx.modifiers(), ActivationModifiers::CTRL);
}

#[test]
fn PluginContext___does_not_keep_plugin_alive() {
    let factory = factory();
    let owner = owner(None, "ca.example.Quiet");
    let plugin: Arc<dyn Plugin> = Arc::new(Quiet);
    let ctx = factory.create(Some(Arc::downgrade(&owner)), Some(&plugin), ActivationModifiers::NONE, false);

    drop(plugin);

    assert!(ctx.plugin().is_none());
}

#[test]
fn PluginContext___owner_dropped___falls_back_to_shared_namespace() {
    let factory = factory();
    let owner = owner(None, "ca.example.Gone");
    let ctx = factory.create(Some(Arc::downgrade(&owner)), None, ActivationModifiers::NONE, false);
    drop(owner);

    assert_eq!(ctx.settings().prefix(), DUMMY_NAMESPACE);
    assert!(ctx.owner().is_none());
}
