// In-memory protocol model
// Built once by the loader and read-only afterwards.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire kind of a request or event argument.
///
/// Unknown tokens are carried verbatim in `Other` so that newer protocol
/// documents still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ArgKind {
    Int,
    Uint,
    Fixed,
    String,
    Object,
    NewId,
    Fd,
    Array,
    Other(String),
}

impl ArgKind {
    /// Token used for this kind in protocol documents
    pub fn token(&self) -> &str {
        match self {
            ArgKind::Int => "int",
            ArgKind::Uint => "uint",
            ArgKind::Fixed => "fixed",
            ArgKind::String => "string",
            ArgKind::Object => "object",
            ArgKind::NewId => "new_id",
            ArgKind::Fd => "fd",
            ArgKind::Array => "array",
            ArgKind::Other(token) => token,
        }
    }

    /// One-letter wire signature code
    pub fn code(&self) -> char {
        match self {
            ArgKind::Int => 'i',
            ArgKind::Uint => 'u',
            ArgKind::Fixed => 'f',
            ArgKind::String => 's',
            ArgKind::Object => 'o',
            ArgKind::NewId => 'n',
            ArgKind::Fd => 'h',
            ArgKind::Array => 'a',
            ArgKind::Other(_) => 'x',
        }
    }

    /// Whether arguments of this kind carry a proxy handle
    pub fn is_object(&self) -> bool {
        matches!(self, ArgKind::Object | ArgKind::NewId)
    }
}

impl From<&str> for ArgKind {
    fn from(token: &str) -> Self {
        match token {
            "int" => ArgKind::Int,
            "uint" => ArgKind::Uint,
            "fixed" => ArgKind::Fixed,
            "string" => ArgKind::String,
            "object" => ArgKind::Object,
            "new_id" => ArgKind::NewId,
            "fd" => ArgKind::Fd,
            "array" => ArgKind::Array,
            other => ArgKind::Other(other.to_string()),
        }
    }
}

impl From<String> for ArgKind {
    fn from(token: String) -> Self {
        ArgKind::from(token.as_str())
    }
}

impl From<ArgKind> for String {
    fn from(kind: ArgKind) -> Self {
        kind.token().to_string()
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub kind: ArgKind,
    /// Interface this argument refers to, namespace prefix already stripped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    #[serde(default)]
    pub allow_null: bool,
}

impl Argument {
    pub fn new(name: impl Into<String>, kind: ArgKind) -> Self {
        Argument {
            name: name.into(),
            kind,
            interface: None,
            allow_null: false,
        }
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = Some(interface.into());
        self
    }

    pub fn nullable(mut self) -> Self {
        self.allow_null = true;
        self
    }

    /// A new_id argument whose interface is only known at the call site
    pub fn is_untyped_new_id(&self) -> bool {
        self.kind == ArgKind::NewId && self.interface.is_none()
    }
}

/// A server-to-client notification. Events are numbered by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub args: Vec<Argument>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Event {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Wire signature of the argument list, one code per argument
    pub fn signature(&self) -> String {
        self.args.iter().map(|arg| arg.kind.code()).collect()
    }
}

/// A client-to-server call: an event-shaped signature plus its opcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(flatten)]
    pub signature: Event,
    pub opcode: u32,
    /// The new_id argument, when the request constructs an object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_argument: Option<Argument>,
}

impl Request {
    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn args(&self) -> &[Argument] {
        &self.signature.args
    }

    pub fn is_constructor(&self) -> bool {
        self.return_argument.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumEntry {
    pub name: String,
    /// Literal text from the document, never renormalized
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumeration {
    pub name: String,
    pub entries: Vec<EnumEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destroy_opcode: Option<u32>,
    pub requests: Vec<Request>,
    pub events: Vec<Event>,
    pub enums: Vec<Enumeration>,
}

impl Interface {
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Interface {
            name: name.into(),
            version,
            destroy_opcode: None,
            requests: Vec::new(),
            events: Vec::new(),
            enums: Vec::new(),
        }
    }

    /// Every request and event argument declared by this interface
    pub fn arguments(&self) -> impl Iterator<Item = &Argument> {
        self.requests
            .iter()
            .flat_map(|req| req.args())
            .chain(self.events.iter().flat_map(|ev| ev.args.iter()))
    }

    pub fn request(&self, name: &str) -> Option<&Request> {
        self.requests.iter().find(|req| req.name() == name)
    }

    /// Events paired with their 0-based opcode
    pub fn numbered_events(&self) -> impl Iterator<Item = (u32, &Event)> {
        self.events
            .iter()
            .enumerate()
            .map(|(index, event)| (index as u32, event))
    }
}

/// All interfaces of a protocol, in document order and addressable by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protocol {
    pub name: Option<String>,
    interfaces: IndexMap<String, Interface>,
}

impl Protocol {
    pub fn new(name: Option<String>) -> Self {
        Protocol {
            name,
            interfaces: IndexMap::new(),
        }
    }

    /// Add an interface; returns it back if the name is already taken.
    pub fn insert(&mut self, interface: Interface) -> Result<(), Interface> {
        if self.interfaces.contains_key(&interface.name) {
            return Err(interface);
        }
        self.interfaces.insert(interface.name.clone(), interface);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Interface> {
        self.interfaces.get(name)
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.values()
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}
