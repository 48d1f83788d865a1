use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Prefix stripped from interface names on load and re-applied to
    /// interface descriptor symbols
    pub namespace_prefix: String,
    /// Interfaces whose proxies are maintained by hand and never emitted
    pub hand_maintained: BTreeSet<String>,
    pub output: OutputConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            namespace_prefix: "wl_".to_string(),
            hand_maintained: BTreeSet::from(["display".to_string()]),
            output: OutputConfig::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn with_namespace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_prefix = prefix.into();
        self
    }

    pub fn with_hand_maintained<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hand_maintained = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = output;
        self
    }

    pub fn is_hand_maintained(&self, interface: &str) -> bool {
        self.hand_maintained.contains(interface)
    }
}

/// File-level boilerplate for the C++ back-end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub header_guard: String,
    pub system_includes: Vec<String>,
    /// Runtime header providing `proxy_t` and its events base
    pub runtime_include: String,
    /// Header included at the top of the definitions file
    pub definitions_include: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            header_guard: "WAYLAND_HPP".to_string(),
            system_includes: ["array", "functional", "memory", "string", "vector"]
                .into_iter()
                .map(String::from)
                .collect(),
            runtime_include: "wayland-client.hpp".to_string(),
            definitions_include: "wayland-client-protocol.hpp".to_string(),
        }
    }
}
