#![allow(dead_code)]

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use waygen_core::{Loader, Protocol};

/// Initialize simple console-only logging for tests
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("waygen_core=trace,debug")),
        )
        .with_test_writer()
        .try_init();
}

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/wayland.xml")
}

pub fn fixture() -> Protocol {
    init_test_logging();
    Loader::default()
        .load_file(fixture_path())
        .expect("fixture protocol loads")
}

/// Wrap interface bodies in a protocol document
pub fn protocol_doc(interfaces: &str) -> String {
    format!("<protocol name=\"test\">{}</protocol>", interfaces)
}

pub fn load_doc(interfaces: &str) -> Protocol {
    Loader::default()
        .load_str(&protocol_doc(interfaces), "inline.xml")
        .expect("inline protocol loads")
}
