// Cross-interface visibility
// Interface B is granted access to A's internals when any argument owned by
// B references A. Built as a reverse index in one pass over all arguments.

use crate::model::Protocol;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Mapping from an interface to the sorted set of interfaces granted
/// privileged access to it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VisibilityMap {
    grants: BTreeMap<String, BTreeSet<String>>,
}

impl VisibilityMap {
    /// Build the reverse index for a whole protocol
    pub fn resolve(protocol: &Protocol) -> Self {
        let mut grants: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut scanned = 0usize;

        for owner in protocol.interfaces() {
            for arg in owner.arguments() {
                scanned += 1;
                if let Some(target) = &arg.interface {
                    grants
                        .entry(target.clone())
                        .or_default()
                        .insert(owner.name.clone());
                }
            }
        }

        debug!(
            arguments = scanned,
            targets = grants.len(),
            "Resolved interface visibility"
        );
        VisibilityMap { grants }
    }

    /// Interfaces granted access to `interface`, in lexicographic order
    pub fn granted_to(&self, interface: &str) -> impl Iterator<Item = &str> {
        self.grants
            .get(interface)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn is_granted(&self, interface: &str, accessor: &str) -> bool {
        self.grants
            .get(interface)
            .is_some_and(|set| set.contains(accessor))
    }

    /// Every interface that appears as an argument target
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.grants.keys().map(String::as_str)
    }
}
