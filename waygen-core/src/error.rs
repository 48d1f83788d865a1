use std::fmt;
use std::path::PathBuf;

/// Element kinds that can appear in a protocol document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Interface,
    Request,
    Event,
    Arg,
    Enum,
    Entry,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ElementKind::Interface => "interface",
            ElementKind::Request => "request",
            ElementKind::Event => "event",
            ElementKind::Arg => "arg",
            ElementKind::Enum => "enum",
            ElementKind::Entry => "entry",
        };
        write!(f, "{}", s)
    }
}

/// Where an offending element sits: its enclosing interface and, when the
/// element itself carries a name, that name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub interface: Option<String>,
    pub element: Option<String>,
}

impl Location {
    pub fn interface(name: impl Into<String>) -> Self {
        Location {
            interface: Some(name.into()),
            element: None,
        }
    }

    pub fn within(interface: impl Into<String>, element: impl Into<String>) -> Self {
        Location {
            interface: Some(interface.into()),
            element: Some(element.into()),
        }
    }

    pub fn top_level() -> Self {
        Location {
            interface: None,
            element: None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.interface, &self.element) {
            (Some(iface), Some(elem)) => write!(f, "interface '{}', in '{}'", iface, elem),
            (Some(iface), None) => write!(f, "interface '{}'", iface),
            (None, _) => write!(f, "protocol root"),
        }
    }
}

/// Fatal conditions raised while loading a protocol or writing generated code.
///
/// Every variant is fatal; nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("failed to read protocol '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed protocol '{}': {message}", path.display())]
    Xml { path: PathBuf, message: String },

    #[error("'{}' has no <protocol> root element", path.display())]
    MissingRoot { path: PathBuf },

    #[error("'{}': <{kind}> is missing required attribute '{attribute}' ({location})", path.display())]
    MissingAttribute {
        path: PathBuf,
        kind: ElementKind,
        attribute: &'static str,
        location: Location,
    },

    #[error("'{}': interface '{interface}' has invalid version '{value}'", path.display())]
    InvalidVersion {
        path: PathBuf,
        interface: String,
        value: String,
    },

    #[error("'{}': interface '{interface}' is declared more than once", path.display())]
    DuplicateInterface { path: PathBuf, interface: String },

    #[error("'{}': interface '{interface}' declares more than one destroy request", path.display())]
    DuplicateDestroy { path: PathBuf, interface: String },

    #[error("'{}': request '{request}' of interface '{interface}' has more than one new_id argument", path.display())]
    MultipleNewObjects {
        path: PathBuf,
        interface: String,
        request: String,
    },

    #[error("printer failed while rendering {output}")]
    Render { output: &'static str },

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ScanError>;
