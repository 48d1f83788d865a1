//! Typed proxy generation for Wayland-style protocol descriptions.
//!
//! A protocol document is loaded into an immutable [`Protocol`] model, the
//! cross-interface [`VisibilityMap`] is resolved once, and every interface is
//! lowered into an emission tree that a [`Printer`] renders as a
//! declaration/definition pair.
//!
//! ```no_run
//! use waygen_core::{Driver, GeneratorConfig};
//!
//! let driver = Driver::new(GeneratorConfig::default());
//! let summary = driver.run("wayland.xml", "wayland.hpp", "wayland.cpp")?;
//! println!("emitted {} proxies", summary.emitted);
//! # Ok::<(), waygen_core::ScanError>(())
//! ```

pub mod config;
pub mod driver;
pub mod emit;
pub mod error;
pub mod loader;
pub mod model;
pub mod type_map;
pub mod visibility;

pub use config::{GeneratorConfig, OutputConfig};
pub use driver::{Driver, Rendered, RunSummary};
pub use emit::{CppPrinter, Emitter, Module, Printer, ProxyClass};
pub use error::{ElementKind, Location, Result, ScanError};
pub use loader::Loader;
pub use model::{ArgKind, Argument, EnumEntry, Enumeration, Event, Interface, Protocol, Request};
pub use type_map::{decode_hint, public_type, DecodeHint, TypeRef};
pub use visibility::VisibilityMap;
