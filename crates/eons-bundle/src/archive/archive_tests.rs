#![allow(non_snake_case)]

use super::*;
use crate::{BundleBuilder, ROOT_FILE, RootDescriptor};
use tempfile::TempDir;
use test_case::test_case;

fn build_bundle(dir: &TempDir, name: &str, wrapped: bool) -> PathBuf {
    let path = dir.path().join(name);
    BundleBuilder::new()
        .with_root(RootDescriptor::parse("ca.example.Foo\n"))
        .add_bytes("docs/readme.txt", b"read me".to_vec())
        .add_resource("mygame/rules.js", b"function run() {}".to_vec())
        .wrapped(wrapped)
        .write(&path)
        .unwrap();
    path
}

fn write_raw(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path
}

// open / detect_format

#[test]
fn BundleArchive___open___plain_bundle() {
    let dir = TempDir::new().unwrap();
    let path = build_bundle(&dir, "game.seplugin", false);

    let archive = BundleArchive::open(&path).unwrap();

    assert_eq!(archive.format(), ArchiveFormat::Plain);
    assert_eq!(archive.kind(), Some(BundleKind::Plugin));
    assert_eq!(archive.source(), path.as_path());
}

#[test]
fn BundleArchive___open___wrapped_bundle() {
    let dir = TempDir::new().unwrap();
    let path = build_bundle(&dir, "boot.seext", true);

    let archive = BundleArchive::open(&path).unwrap();

    assert_eq!(archive.format(), ArchiveFormat::Wrapped);
    assert_eq!(archive.kind(), Some(BundleKind::Extension));
}

#[test]
fn BundleArchive___open___unknown_extension_still_opens() {
    let dir = TempDir::new().unwrap();
    let path = build_bundle(&dir, "game.zip", false);

    let archive = BundleArchive::open(&path).unwrap();

    assert_eq!(archive.kind(), None);
    assert_eq!(archive.format(), ArchiveFormat::Plain);
}

#[test_case(&[0x07, 0x88, 0x53, 0x45, 0x07, 0x88, 0x53, 0x45, 0, 0], FormatError::DoubleWrapped ; "double wrapped")]
#[test_case(&[0xCA, 0xFE, 0xD0, 0x0D, 1, 2, 3], FormatError::Obsolete(LegacyFormat::Pack200) ; "pack200")]
#[test_case(&[0x07, 0x88, 0x53, 0x50, 1, 2, 3], FormatError::Obsolete(LegacyFormat::Published) ; "published")]
#[test_case(b"not a zip file", FormatError::Unrecognized ; "text")]
#[test_case(&[0x50, 0x4B], FormatError::TooShort ; "too short")]
#[test_case(&[], FormatError::TooShort ; "empty")]
fn BundleArchive___open___rejects_bad_magic(bytes: &[u8], expected: FormatError) {
    let dir = TempDir::new().unwrap();
    let path = write_raw(&dir, "bad.seplugin", bytes);

    let err = BundleArchive::open(&path).unwrap_err();

    match err {
        BundleError::InvalidFormat(actual) => assert_eq!(actual, expected),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn BundleArchive___open___nonexistent_file___returns_io_error() {
    let result = BundleArchive::open("/nonexistent/bundle.seplugin");

    assert!(matches!(result, Err(BundleError::Io(_))));
}

#[test]
fn BundleArchive___kind_of___ignores_content() {
    let dir = TempDir::new().unwrap();
    let path = write_raw(&dir, "garbage.SELIBRARY", b"garbage");

    assert_eq!(BundleArchive::kind_of(&path), Some(BundleKind::Library));
}

// materialize / dispose

#[test]
fn BundleArchive___materialize___plain_returns_source() {
    let dir = TempDir::new().unwrap();
    let path = build_bundle(&dir, "game.seplugin", false);
    let mut archive = BundleArchive::open(&path).unwrap();

    let plain = archive.materialize().unwrap().to_path_buf();

    assert_eq!(plain, path);
}

#[test]
fn BundleArchive___materialize___wrapped_creates_plain_copy_once() {
    let dir = TempDir::new().unwrap();
    let path = build_bundle(&dir, "game.seplugin", true);
    let mut archive = BundleArchive::open(&path).unwrap();

    let first = archive.materialize().unwrap().to_path_buf();
    let second = archive.materialize().unwrap().to_path_buf();

    assert_ne!(first, path);
    assert_eq!(first, second);
    assert_eq!(detect_format(&first).unwrap(), ArchiveFormat::Plain);
}

#[test]
fn BundleArchive___dispose___deletes_plain_copy() {
    let dir = TempDir::new().unwrap();
    let path = build_bundle(&dir, "game.seplugin", true);
    let mut archive = BundleArchive::open(&path).unwrap();
    let plain = archive.materialize().unwrap().to_path_buf();

    archive.dispose();

    assert!(!plain.exists());
    assert!(path.exists());
}

#[test]
fn BundleArchive___drop___deletes_plain_copy() {
    let dir = TempDir::new().unwrap();
    let path = build_bundle(&dir, "game.seplugin", true);
    let plain = {
        let mut archive = BundleArchive::open(&path).unwrap();
        archive.materialize().unwrap().to_path_buf()
    };

    assert!(!plain.exists());
}

// reading entries

#[test]
fn BundleArchive___read_file___wrapped_and_plain_agree() {
    let dir = TempDir::new().unwrap();
    let plain = build_bundle(&dir, "plain.seplugin", false);
    let wrapped = build_bundle(&dir, "wrapped.seplugin", true);

    let from_plain = BundleArchive::open(&plain)
        .unwrap()
        .read_file_string("docs/readme.txt")
        .unwrap();
    let from_wrapped = BundleArchive::open(&wrapped)
        .unwrap()
        .read_file_string("docs/readme.txt")
        .unwrap();

    assert_eq!(from_plain, "read me");
    assert_eq!(from_plain, from_wrapped);
}

#[test]
fn BundleArchive___read_file___missing_entry___returns_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = build_bundle(&dir, "game.seplugin", false);
    let mut archive = BundleArchive::open(&path).unwrap();

    let result = archive.read_file("nonexistent.txt");

    assert!(matches!(result, Err(BundleError::MissingFile(_))));
}

#[test]
fn BundleArchive___list_files___includes_root_file() {
    let dir = TempDir::new().unwrap();
    let path = build_bundle(&dir, "game.seplugin", true);
    let mut archive = BundleArchive::open(&path).unwrap();

    let files = archive.list_files().unwrap();

    assert!(files.contains(&ROOT_FILE.to_string()));
    assert!(files.contains(&"resources/mygame/rules.js".to_string()));
    assert!(archive.has_file("docs/readme.txt").unwrap());
    assert!(!archive.has_file("docs/missing.txt").unwrap());
}

// copy_to

#[test]
fn BundleArchive___copy_to___other_file_is_plain() {
    let dir = TempDir::new().unwrap();
    let path = build_bundle(&dir, "game.seplugin", true);
    let dest = dir.path().join("copy.seplugin");
    let mut archive = BundleArchive::open(&path).unwrap();

    archive.copy_to(&dest).unwrap();

    let mut copy = BundleArchive::open(&dest).unwrap();
    assert_eq!(copy.format(), ArchiveFormat::Plain);
    assert_eq!(copy.digests().unwrap(), archive.digests().unwrap());
    assert_eq!(archive.format(), ArchiveFormat::Wrapped);
}

#[test]
fn BundleArchive___copy_to___same_file_unwraps_in_place() {
    let dir = TempDir::new().unwrap();
    let path = build_bundle(&dir, "game.seplugin", true);
    let mut archive = BundleArchive::open(&path).unwrap();
    let before = archive.digests().unwrap();

    archive.copy_to(&path).unwrap();

    assert_eq!(archive.format(), ArchiveFormat::Plain);
    let mut reopened = BundleArchive::open(&path).unwrap();
    assert_eq!(reopened.format(), ArchiveFormat::Plain);
    assert_eq!(reopened.digests().unwrap(), before);
    assert!(!rescue_path(&path).exists());
}

#[test]
fn BundleArchive___copy_to___same_plain_file_is_noop() {
    let dir = TempDir::new().unwrap();
    let path = build_bundle(&dir, "game.seplugin", false);
    let original = fs::read(&path).unwrap();
    let mut archive = BundleArchive::open(&path).unwrap();

    archive.copy_to(&path).unwrap();

    assert_eq!(fs::read(&path).unwrap(), original);
}

// wrap_in_place

#[test]
fn BundleArchive___wrap_in_place___writes_wrapper_magic() {
    let dir = TempDir::new().unwrap();
    let path = build_bundle(&dir, "game.seplugin", false);
    let mut archive = BundleArchive::open(&path).unwrap();

    archive.wrap_in_place().unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes[..4], WRAPPED_MAGIC);
    assert_eq!(archive.format(), ArchiveFormat::Wrapped);
}

#[test]
fn BundleArchive___wrap_after_unwrap___restores_format_and_entries() {
    let dir = TempDir::new().unwrap();
    let path = build_bundle(&dir, "game.seplugin", true);
    let mut original = BundleArchive::open(&path).unwrap();
    let original_format = original.format();
    let original_digests = original.digests().unwrap();
    drop(original);

    let mut archive = BundleArchive::open(&path).unwrap();
    archive.copy_to(&path).unwrap();
    archive.wrap_in_place().unwrap();

    let mut reopened = BundleArchive::open(&path).unwrap();
    assert_eq!(reopened.format(), original_format);
    assert_eq!(reopened.digests().unwrap(), original_digests);
    assert_eq!(
        reopened.read_file_string("resources/mygame/rules.js").unwrap(),
        "function run() {}"
    );
}

// replace_entry

#[test]
fn BundleArchive___replace_entry___keeps_format_and_other_entries() {
    let dir = TempDir::new().unwrap();
    let path = build_bundle(&dir, "game.seplugin", true);
    let mut archive = BundleArchive::open(&path).unwrap();

    archive
        .replace_entry(ROOT_FILE, b"ca.example.Bar\n".to_vec())
        .unwrap();

    let mut reopened = BundleArchive::open(&path).unwrap();
    assert_eq!(reopened.format(), ArchiveFormat::Wrapped);
    assert_eq!(
        reopened.read_file_string(ROOT_FILE).unwrap(),
        "ca.example.Bar\n"
    );
    assert_eq!(
        reopened.read_file_string("docs/readme.txt").unwrap(),
        "read me"
    );
}

#[test]
fn BundleArchive___replace_entry___adds_missing_entry() {
    let dir = TempDir::new().unwrap();
    let path = build_bundle(&dir, "game.seplugin", false);
    let mut archive = BundleArchive::open(&path).unwrap();

    archive.replace_entry("docs/new.txt", b"new".to_vec()).unwrap();

    assert_eq!(archive.read_file_string("docs/new.txt").unwrap(), "new");
}

#[test]
fn rescue_path___appends_bundle_suffix() {
    let rescue = rescue_path(Path::new("/plugins/game.seplugin"));

    assert_eq!(rescue, PathBuf::from("/plugins/game.seplugin.bundle"));
}
