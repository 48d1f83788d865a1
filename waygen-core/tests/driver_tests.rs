// Driver runs against the filesystem

mod common;

use common::{fixture_path, init_test_logging};
use std::fs;
use tempfile::TempDir;
use waygen_core::{Driver, ScanError};

#[test]
fn test_run_writes_both_outputs() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let hpp = dir.path().join("wayland.hpp");
    let cpp = dir.path().join("wayland.cpp");

    let summary = Driver::default().run(fixture_path(), &hpp, &cpp).unwrap();
    assert_eq!(summary.interfaces, 13);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.emitted, 12);

    let declarations = fs::read_to_string(&hpp).unwrap();
    let definitions = fs::read_to_string(&cpp).unwrap();
    assert!(declarations.starts_with("#ifndef WAYLAND_HPP\n"));
    assert!(declarations.trim_end().ends_with("#endif"));
    assert!(definitions.starts_with("#include <wayland-client-protocol.hpp>\n"));
    assert!(definitions.contains("int registry_t::dispatcher(int opcode, std::vector<any> args)"));

    // No staging files left behind
    let leftovers = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 2);
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    let dir = TempDir::new().unwrap();
    let driver = Driver::default();

    let first = (dir.path().join("a.hpp"), dir.path().join("a.cpp"));
    let second = (dir.path().join("b.hpp"), dir.path().join("b.cpp"));
    driver.run(fixture_path(), &first.0, &first.1).unwrap();
    driver.run(fixture_path(), &second.0, &second.1).unwrap();

    assert_eq!(fs::read(&first.0).unwrap(), fs::read(&second.0).unwrap());
    assert_eq!(fs::read(&first.1).unwrap(), fs::read(&second.1).unwrap());
}

#[test]
fn test_failed_load_leaves_outputs_untouched() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("broken.xml");
    let hpp = dir.path().join("wayland.hpp");
    let cpp = dir.path().join("wayland.cpp");
    fs::write(&input, "<protocol><interface name=\"wl_x\">").unwrap();
    fs::write(&hpp, "previous declarations").unwrap();
    fs::write(&cpp, "previous definitions").unwrap();

    let err = Driver::default().run(&input, &hpp, &cpp).unwrap_err();
    assert!(matches!(err, ScanError::Xml { .. }));
    assert!(err.to_string().contains("broken.xml"));

    assert_eq!(fs::read_to_string(&hpp).unwrap(), "previous declarations");
    assert_eq!(fs::read_to_string(&cpp).unwrap(), "previous definitions");
}

#[test]
fn test_missing_input_is_fatal() {
    let dir = TempDir::new().unwrap();
    let hpp = dir.path().join("wayland.hpp");
    let cpp = dir.path().join("wayland.cpp");

    let err = Driver::default()
        .run(dir.path().join("absent.xml"), &hpp, &cpp)
        .unwrap_err();
    assert!(matches!(err, ScanError::Read { .. }));
    assert!(!hpp.exists());
    assert!(!cpp.exists());
}

#[test]
fn test_unwritable_destination_reports_path() {
    let dir = TempDir::new().unwrap();
    let hpp = dir.path().join("missing-dir").join("wayland.hpp");
    let cpp = dir.path().join("wayland.cpp");

    let err = Driver::default().run(fixture_path(), &hpp, &cpp).unwrap_err();
    match err {
        ScanError::Write { path, .. } => assert_eq!(path, hpp),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!cpp.exists());
}

#[test]
fn test_failed_definitions_commit_restores_declarations() {
    let dir = TempDir::new().unwrap();
    let hpp = dir.path().join("wayland.hpp");
    let cpp = dir.path().join("wayland.cpp");
    fs::write(&hpp, "previous declarations").unwrap();
    // A non-empty directory cannot be replaced by a file rename
    fs::create_dir(&cpp).unwrap();
    fs::write(cpp.join("keep"), "").unwrap();

    let err = Driver::default().run(fixture_path(), &hpp, &cpp).unwrap_err();
    match err {
        ScanError::Write { path, .. } => assert_eq!(path, cpp),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fs::read_to_string(&hpp).unwrap(), "previous declarations");
    assert!(cpp.is_dir());

    let leftovers = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 2);
}

#[test]
fn test_failed_definitions_commit_removes_new_declarations() {
    let dir = TempDir::new().unwrap();
    let hpp = dir.path().join("wayland.hpp");
    let cpp = dir.path().join("wayland.cpp");
    fs::create_dir(&cpp).unwrap();
    fs::write(cpp.join("keep"), "").unwrap();

    assert!(Driver::default().run(fixture_path(), &hpp, &cpp).is_err());
    assert!(!hpp.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}
