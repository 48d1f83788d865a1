// Command-line contract: three positional paths, exit 1 on any failure

use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

fn waygen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_waygen"))
}

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../waygen-core/tests/fixtures/wayland.xml")
}

#[test]
fn test_generates_both_files() {
    let dir = TempDir::new().unwrap();
    let hpp = dir.path().join("wayland.hpp");
    let cpp = dir.path().join("wayland.cpp");

    let output = waygen().arg(fixture()).arg(&hpp).arg(&cpp).output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    assert!(std::fs::read_to_string(&hpp).unwrap().contains("class registry_t : public proxy_t"));
    assert!(std::fs::read_to_string(&cpp).unwrap().contains("registry_t::bind("));
}

#[test]
fn test_missing_arguments_print_usage() {
    let dir = TempDir::new().unwrap();
    let output = waygen()
        .arg(fixture())
        .arg(dir.path().join("wayland.hpp"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"));
    assert!(!dir.path().join("wayland.hpp").exists());
}

#[test]
fn test_no_arguments_exit_one() {
    let output = waygen().output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_unreadable_input_exit_one() {
    let dir = TempDir::new().unwrap();
    let output = waygen()
        .arg(dir.path().join("absent.xml"))
        .arg(dir.path().join("wayland.hpp"))
        .arg(dir.path().join("wayland.cpp"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("absent.xml"));
    assert!(!dir.path().join("wayland.hpp").exists());
}
