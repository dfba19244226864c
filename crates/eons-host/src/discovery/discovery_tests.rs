#![allow(non_snake_case)]

use super::*;
use eons_bundle::{BundleBuilder, RootDescriptor};
use tempfile::TempDir;

fn write_bundle(dir: &Path, name: &str, root: Option<&str>) -> PathBuf {
    let path = dir.join(name);
    let mut builder = BundleBuilder::new().add_resource("readme.txt", b"hi".to_vec());
    if let Some(root) = root {
        builder = builder.with_root(RootDescriptor::parse(root));
    }
    builder.write(&path).unwrap();
    path
}

fn labels(report: &DiscoveryReport) -> Vec<String> {
    report.objects.iter().map(|o| o.label()).collect()
}

#[test]
fn discover___creates_objects_per_kind_in_install_order() {
    let temp = TempDir::new().unwrap();
    write_bundle(temp.path(), "a.seplugin", Some("ca.example.Deck\ndeck/rules.js\n"));
    write_bundle(temp.path(), "b.seext", Some("ca.example.Boot\n"));
    write_bundle(temp.path(), "c.setheme", Some("ca.example.Dark\n"));
    write_bundle(temp.path(), "d.selibrary", Some("name = Cards\n"));
    let services = Arc::new(PluginServices::default());

    let report = discover(&[temp.path().to_path_buf()], &services);

    assert!(report.skipped.is_empty());
    assert_eq!(report.bundles.len(), 4);
    let kinds: Vec<BundleKind> = report.objects.iter().map(|o| o.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            BundleKind::Library,
            BundleKind::Theme,
            BundleKind::Extension,
            BundleKind::Plugin,
            BundleKind::Plugin,
        ]
    );
    let labels = labels(&report);
    assert!(labels.contains(&"res://deck/rules.js".to_string()));
    assert!(labels.contains(&"ca.example.Deck".to_string()));
}

#[test]
fn discover___plugins_share_their_bundle() {
    let temp = TempDir::new().unwrap();
    write_bundle(temp.path(), "a.seplugin", Some("ca.example.One\nca.example.Two\n"));
    let services = Arc::new(PluginServices::default());

    let report = discover(&[temp.path().to_path_buf()], &services);

    assert_eq!(report.objects.len(), 2);
    assert!(Arc::ptr_eq(
        report.objects[0].bundle(),
        report.objects[1].bundle()
    ));
}

#[test]
fn discover___ignores_unknown_extensions_and_subdirectories() {
    let temp = TempDir::new().unwrap();
    write_bundle(temp.path(), "notes.zip", Some("ca.example.Deck\n"));
    std::fs::create_dir(temp.path().join("nested.seplugin")).unwrap();
    let sub = temp.path().join("sub");
    std::fs::create_dir(&sub).unwrap();
    write_bundle(&sub, "deep.seplugin", Some("ca.example.Deep\n"));
    let services = Arc::new(PluginServices::default());

    let report = discover(&[temp.path().to_path_buf()], &services);

    assert!(report.objects.is_empty());
    assert!(report.skipped.is_empty());
}

#[test]
fn discover___broken_bundle___is_skipped_and_scan_continues() {
    let temp = TempDir::new().unwrap();
    let broken = temp.path().join("a.seplugin");
    std::fs::write(&broken, "not an archive").unwrap();
    write_bundle(temp.path(), "b.seplugin", Some("ca.example.Deck\n"));
    let services = Arc::new(PluginServices::default());

    let report = discover(&[temp.path().to_path_buf()], &services);

    assert_eq!(labels(&report), vec!["ca.example.Deck"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, broken);
    assert!(report.skipped[0].reason.contains("Invalid bundle format"));
}

#[test]
fn discover___plugin_without_root___is_skipped() {
    let temp = TempDir::new().unwrap();
    let path = write_bundle(temp.path(), "a.seplugin", None);
    let services = Arc::new(PluginServices::default());

    let report = discover(&[temp.path().to_path_buf()], &services);

    assert!(report.objects.is_empty());
    assert_eq!(report.skipped[0].path, path);
}

#[test]
fn discover___library_without_root___is_still_installed() {
    let temp = TempDir::new().unwrap();
    write_bundle(temp.path(), "art.selibrary", None);
    let services = Arc::new(PluginServices::default());

    let report = discover(&[temp.path().to_path_buf()], &services);

    assert_eq!(report.objects.len(), 1);
    assert_eq!(report.objects[0].name(), "art");
}

#[test]
fn discover___plugin_listing_nothing___is_skipped() {
    let temp = TempDir::new().unwrap();
    write_bundle(temp.path(), "a.seext", Some("name = Empty\n"));
    let services = Arc::new(PluginServices::default());

    let report = discover(&[temp.path().to_path_buf()], &services);

    assert!(report.objects.is_empty());
    assert!(report.skipped[0].reason.contains("lists no identifiers"));
}

#[test]
fn discover___missing_directory___is_reported() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope");
    let services = Arc::new(PluginServices::default());

    let report = discover(std::slice::from_ref(&missing), &services);

    assert_eq!(report.skipped[0].path, missing);
}

#[test]
fn discover___root_parse_errors___do_not_skip_bundle() {
    let temp = TempDir::new().unwrap();
    write_bundle(
        temp.path(),
        "a.seplugin",
        Some("ca.example.Deck\nca.example.Deck\n9bad\n"),
    );
    let services = Arc::new(PluginServices::default());

    let report = discover(&[temp.path().to_path_buf()], &services);

    assert_eq!(labels(&report), vec!["ca.example.Deck"]);
}

#[test]
fn discover___setting_definitions___become_defaults() {
    let temp = TempDir::new().unwrap();
    write_bundle(
        temp.path(),
        "a.selibrary",
        Some("-Sdeck-size = 60\n-Stheme = dark\n-Dtrace = on\n"),
    );
    let services = Arc::new(PluginServices::default());
    services.settings().set("theme", "light");

    discover(&[temp.path().to_path_buf()], &services);

    assert_eq!(services.settings().get("deck-size").as_deref(), Some("60"));
    assert_eq!(services.settings().get("theme").as_deref(), Some("light"));
    assert!(!services.settings().contains("trace"));
}

#[test]
fn discover___wrapped_bundles___are_read() {
    let temp = TempDir::new().unwrap();
    BundleBuilder::new()
        .with_root(RootDescriptor::parse("ca.example.Deck\n"))
        .wrapped(true)
        .write(temp.path().join("w.seplugin"))
        .unwrap();
    let services = Arc::new(PluginServices::default());

    let report = discover(&[temp.path().to_path_buf()], &services);

    assert_eq!(labels(&report), vec!["ca.example.Deck"]);
}
