// Protocol document loader
// Walks a `protocol > interface > {request, event, enum}` document and builds
// the protocol model, assigning request opcodes along the way.

use crate::config::GeneratorConfig;
use crate::error::{ElementKind, Location, Result, ScanError};
use crate::model::{ArgKind, Argument, EnumEntry, Enumeration, Event, Interface, Protocol, Request};
use roxmltree::{Document, Node};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// Name of the request that is routed through the proxy destructor instead
/// of being exposed as a method.
pub const DESTROY_REQUEST: &str = "destroy";

#[derive(Debug, Clone)]
pub struct Loader {
    namespace_prefix: String,
}

impl Loader {
    pub fn new(namespace_prefix: impl Into<String>) -> Self {
        Self {
            namespace_prefix: namespace_prefix.into(),
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.namespace_prefix.clone())
    }

    /// Read and load a protocol document from disk
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Protocol> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_str(&text, path)
    }

    /// Load a protocol from document text. `origin` is only used in diagnostics.
    pub fn load_str(&self, text: &str, origin: impl AsRef<Path>) -> Result<Protocol> {
        let origin = origin.as_ref();
        let doc = Document::parse(text).map_err(|err| ScanError::Xml {
            path: origin.to_path_buf(),
            message: err.to_string(),
        })?;

        let root = doc.root_element();
        if root.tag_name().name() != "protocol" {
            return Err(ScanError::MissingRoot {
                path: origin.to_path_buf(),
            });
        }

        let walker = Walker {
            path: origin,
            prefix: &self.namespace_prefix,
        };

        let mut protocol = Protocol::new(root.attribute("name").map(String::from));
        for node in elements(root, "interface") {
            let interface = walker.interface(node)?;
            debug!(
                interface = %interface.name,
                version = interface.version,
                requests = interface.requests.len(),
                events = interface.events.len(),
                enums = interface.enums.len(),
                "Loaded interface"
            );
            protocol
                .insert(interface)
                .map_err(|dup| ScanError::DuplicateInterface {
                    path: origin.to_path_buf(),
                    interface: dup.name,
                })?;
        }

        info!(
            "Loaded {} interfaces from {}",
            protocol.len(),
            origin.display()
        );
        Ok(protocol)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }
}

fn elements<'a, 'input: 'a>(
    parent: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    parent
        .children()
        .filter(move |node| node.is_element() && node.tag_name().name() == tag)
}

struct Walker<'a> {
    path: &'a Path,
    prefix: &'a str,
}

impl Walker<'_> {
    fn strip<'n>(&self, name: &'n str) -> &'n str {
        name.strip_prefix(self.prefix).unwrap_or(name)
    }

    fn required<'n>(
        &self,
        node: Node<'n, '_>,
        kind: ElementKind,
        attribute: &'static str,
        location: Location,
    ) -> Result<&'n str> {
        node.attribute(attribute)
            .ok_or_else(|| ScanError::MissingAttribute {
                path: self.path.to_path_buf(),
                kind,
                attribute,
                location,
            })
    }

    fn path(&self) -> PathBuf {
        self.path.to_path_buf()
    }

    fn interface(&self, node: Node<'_, '_>) -> Result<Interface> {
        let raw_name = self.required(node, ElementKind::Interface, "name", Location::top_level())?;
        let name = self.strip(raw_name).to_string();

        let version = match node.attribute("version") {
            None => 1,
            Some(value) => value
                .trim()
                .parse::<u32>()
                .map_err(|_| ScanError::InvalidVersion {
                    path: self.path(),
                    interface: name.clone(),
                    value: value.to_string(),
                })?,
        };

        let mut interface = Interface::new(name, version);

        // Opcodes follow document order; destroy does not consume one.
        let mut opcode = 0u32;
        for child in elements(node, "request") {
            let request_name =
                self.required(child, ElementKind::Request, "name", Location::interface(&interface.name))?;

            if request_name == DESTROY_REQUEST {
                if interface.destroy_opcode.is_some() {
                    return Err(ScanError::DuplicateDestroy {
                        path: self.path(),
                        interface: interface.name,
                    });
                }
                trace!(interface = %interface.name, opcode, "Recorded destroy request");
                interface.destroy_opcode = Some(opcode);
                continue;
            }

            let args = self.arguments(child, &interface.name, request_name)?;
            let mut new_ids = args.iter().filter(|arg| arg.kind == ArgKind::NewId);
            let return_argument = new_ids.next().cloned();
            if new_ids.next().is_some() {
                return Err(ScanError::MultipleNewObjects {
                    path: self.path(),
                    interface: interface.name,
                    request: request_name.to_string(),
                });
            }

            let request = Request {
                signature: Event {
                    name: request_name.to_string(),
                    args,
                },
                opcode,
                return_argument,
            };
            trace!(
                interface = %interface.name,
                request = %request.name(),
                opcode,
                signature = %request.signature.signature(),
                "Loaded request"
            );
            interface.requests.push(request);
            opcode += 1;
        }

        for child in elements(node, "event") {
            let event_name =
                self.required(child, ElementKind::Event, "name", Location::interface(&interface.name))?;
            let event = Event {
                name: event_name.to_string(),
                args: self.arguments(child, &interface.name, event_name)?,
            };
            trace!(
                interface = %interface.name,
                event = %event.name,
                signature = %event.signature(),
                "Loaded event"
            );
            interface.events.push(event);
        }

        for child in elements(node, "enum") {
            let enumeration = self.enumeration(child, &interface.name)?;
            interface.enums.push(enumeration);
        }

        Ok(interface)
    }

    fn arguments(&self, message: Node<'_, '_>, interface: &str, owner: &str) -> Result<Vec<Argument>> {
        let mut args = Vec::new();
        for node in elements(message, "arg") {
            let name = self.required(node, ElementKind::Arg, "name", Location::within(interface, owner))?;
            let location = Location::within(interface, format!("{}.{}", owner, name));
            let kind = ArgKind::from(self.required(node, ElementKind::Arg, "type", location)?);

            if let ArgKind::Other(token) = &kind {
                warn!(
                    interface,
                    element = owner,
                    arg = name,
                    "Unknown argument type '{}', passing it through",
                    token
                );
            }

            args.push(Argument {
                name: name.to_string(),
                kind,
                interface: node.attribute("interface").map(|i| self.strip(i).to_string()),
                allow_null: node.attribute("allow_null") == Some("true"),
            });
        }
        Ok(args)
    }

    fn enumeration(&self, node: Node<'_, '_>, interface: &str) -> Result<Enumeration> {
        let name = self.required(node, ElementKind::Enum, "name", Location::interface(interface))?;
        let mut entries = Vec::new();
        for entry in elements(node, "entry") {
            let entry_name =
                self.required(entry, ElementKind::Entry, "name", Location::within(interface, name))?;
            let value = self.required(
                entry,
                ElementKind::Entry,
                "value",
                Location::within(interface, format!("{}.{}", name, entry_name)),
            )?;
            entries.push(EnumEntry {
                name: entry_name.to_string(),
                value: value.to_string(),
            });
        }
        Ok(Enumeration {
            name: name.to_string(),
            entries,
        })
    }
}
