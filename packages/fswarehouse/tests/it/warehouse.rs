use std::collections::BTreeSet;

use fswarehouse::{ErrorKind, FileWarehouse, Filesystem, MemoryFilesystem, Warehouse};
use pretty_assertions::assert_eq as pretty_assert_eq;
use simple_test_case::test_case;

use crate::temporary_warehouse;

#[test_case(b"correct horse battery staple"; "text")]
#[test_case(b""; "empty")]
#[test_case(&[0, 159, 146, 150, 255]; "binary")]
#[test_log::test]
fn round_trips(data: &[u8]) {
    let (_temp, _, warehouse) = temporary_warehouse();
    warehouse.store("team/key", data).expect("store");
    pretty_assert_eq!(warehouse.retrieve("team/key").expect("retrieve"), data);
}

#[test_log::test]
fn writes_base64_to_disk() {
    let (_temp, base, warehouse) = temporary_warehouse();
    warehouse.store("team/key", b"hello").expect("store");

    let content = std::fs::read_to_string(base.join("team").join("key")).expect("read");
    pretty_assert_eq!(content, "aGVsbG8=");
}

#[test_log::test]
fn creates_missing_base_directory() {
    let (_temp, base, warehouse) = temporary_warehouse();
    assert!(!base.exists());

    pretty_assert_eq!(warehouse.ids().expect("ids"), Vec::<String>::new());
    assert!(base.is_dir());
}

#[test_log::test]
fn missing_is_not_found() {
    let (_temp, _, warehouse) = temporary_warehouse();
    let err = warehouse.retrieve("missing").expect_err("retrieve should fail");
    pretty_assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test_log::test]
fn overwrites() {
    let (_temp, _, warehouse) = temporary_warehouse();
    warehouse.store("key", b"a much longer first value").expect("store");
    warehouse.store("key", b"v2").expect("store again");
    pretty_assert_eq!(warehouse.retrieve("key").expect("retrieve"), b"v2");
}

#[test_log::test]
fn enumerates_stored_ids() {
    let (_temp, base, warehouse) = temporary_warehouse();
    for id in ["a", "b/c", "b/d"] {
        warehouse.store(id, id.as_bytes()).expect("store");
    }
    std::fs::create_dir_all(base.join("empty").join("dir")).expect("create empty dir");

    let ids = warehouse.ids().expect("ids").into_iter().collect::<BTreeSet<_>>();
    let expected = ["a", "b/c", "b/d"].map(String::from).into_iter().collect::<BTreeSet<_>>();
    pretty_assert_eq!(ids, expected);
}

#[test_log::test]
fn namespaces_nested_ids() {
    let (_temp, base, warehouse) = temporary_warehouse();
    warehouse.store("team/x", b"x").expect("store");

    assert!(base.join("team").is_dir());
    assert!(!warehouse.contains("team/y").expect("contains"));
    pretty_assert_eq!(
        warehouse.retrieve("team/y").expect_err("retrieve").kind(),
        ErrorKind::NotFound
    );
}

#[test_log::test]
fn ids_under_a_file_are_not_found() {
    let (_temp, _, warehouse) = temporary_warehouse();
    warehouse.store("key", b"value").expect("store");

    assert!(!warehouse.contains("key/sub").expect("contains"));
    pretty_assert_eq!(
        warehouse.retrieve("key/sub").expect_err("retrieve").kind(),
        ErrorKind::NotFound
    );
}

#[test_log::test]
fn directories_are_not_secrets() {
    let (_temp, _, warehouse) = temporary_warehouse();
    warehouse.store("team/x", b"x").expect("store");

    assert!(!warehouse.contains("team").expect("contains"));
    assert!(warehouse.contains("team/x").expect("contains"));
    pretty_assert_eq!(warehouse.ids().expect("ids"), vec!["team/x"]);
}

/// What a lookup of `id` observes after storing each of `stored`.
fn observe<F: Filesystem>(
    warehouse: &FileWarehouse<F>,
    stored: &[&str],
    id: &str,
) -> (bool, Result<Vec<u8>, ErrorKind>, Vec<String>) {
    for stored in stored {
        warehouse.store(stored, stored.as_bytes()).expect("store");
    }
    let contains = warehouse.contains(id).expect("contains");
    let retrieved = warehouse.retrieve(id).map_err(|err| err.kind());
    (contains, retrieved, warehouse.ids().expect("ids"))
}

#[test_case(&["key"], "key"; "stored")]
#[test_case(&["key"], "key/sub"; "under_a_file")]
#[test_case(&["key"], "key/sub/deeper"; "deep_under_a_file")]
#[test_case(&["team/x"], "team"; "namespace_directory")]
#[test_case(&["team/x"], "team/y"; "missing_sibling")]
#[test_case(&[], "missing"; "empty")]
#[test_log::test]
fn memory_filesystem_matches_disk(stored: &[&str], id: &str) {
    let (_temp, _, disk) = temporary_warehouse();
    let memory = FileWarehouse::with_filesystem("/srv/secrets", MemoryFilesystem::new());

    pretty_assert_eq!(observe(&memory, stored, id), observe(&disk, stored, id));
}

#[test_log::test]
fn detects_corruption() {
    let (_temp, base, warehouse) = temporary_warehouse();
    warehouse.store("key", b"value").expect("store");
    std::fs::write(base.join("key"), "definitely not base64 %%%").expect("corrupt");

    let err = warehouse.retrieve("key").expect_err("retrieve should fail");
    pretty_assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test_log::test]
fn rejects_traversal() {
    let (temp, _, warehouse) = temporary_warehouse();
    let err = warehouse
        .store("../escaped", b"x")
        .expect_err("store should fail");

    pretty_assert_eq!(err.kind(), ErrorKind::InvalidId);
    assert!(!temp.path().join("escaped").exists());
}

#[test_log::test]
fn reopened_warehouse_sees_existing_secrets() {
    let (_temp, base, warehouse) = temporary_warehouse();
    warehouse.store("team/key", b"value").expect("store");

    let reopened = FileWarehouse::new(&base);
    pretty_assert_eq!(reopened.ids().expect("ids"), vec!["team/key"]);
    pretty_assert_eq!(reopened.retrieve("team/key").expect("retrieve"), b"value");
}

#[test_log::test]
fn resolves_relative_base_dir() {
    let warehouse = FileWarehouse::new("relative/secrets");
    assert!(warehouse.base_dir().is_absolute());
    assert!(warehouse.base_dir().ends_with("relative/secrets"));
}

#[cfg(not(target_os = "windows"))]
#[test_log::test]
fn creates_entries_with_modes() {
    use std::os::unix::fs::PermissionsExt as _;

    let (_temp, base, warehouse) = temporary_warehouse();
    warehouse.store("team/key", b"value").expect("store");

    // Modes are masked by the process umask, which can only remove bits.
    let mode = |path: std::path::PathBuf| {
        std::fs::metadata(path).expect("stat").permissions().mode() & 0o777
    };
    let dir = mode(base.join("team"));
    let file = mode(base.join("team").join("key"));
    pretty_assert_eq!(dir & !0o755, 0);
    pretty_assert_eq!(file & !0o644, 0);
    assert!(dir & 0o700 == 0o700, "owner can use the directory: {dir:o}");
    assert!(file & 0o600 == 0o600, "owner can use the file: {file:o}");
}

#[cfg(target_os = "linux")]
#[test_log::test]
fn skips_non_utf8_file_names() {
    use std::{ffi::OsStr, os::unix::ffi::OsStrExt as _};

    let (_temp, base, warehouse) = temporary_warehouse();
    warehouse.store("good", b"value").expect("store");
    std::fs::write(base.join(OsStr::from_bytes(b"bad\xff")), "aGVsbG8=").expect("write");

    pretty_assert_eq!(warehouse.ids().expect("ids"), vec!["good"]);
}
