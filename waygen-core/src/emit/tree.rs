// Emission tree
// Everything a printer needs to render one generated proxy, with protocol
// decisions already made: opcodes, parameter shapes, grants, dispatch order.

use crate::type_map::{DecodeHint, TypeRef};
use serde::Serialize;

/// All proxies generated in one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Module {
    /// Classes to forward-declare, in output order
    pub forwards: Vec<String>,
    pub classes: Vec<ProxyClass>,
}

impl Module {
    pub fn new(classes: Vec<ProxyClass>) -> Self {
        let forwards = classes.iter().map(|class| class.name.clone()).collect();
        Module { forwards, classes }
    }

    pub fn class(&self, name: &str) -> Option<&ProxyClass> {
        self.classes.iter().find(|class| class.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyClass {
    pub name: String,
    /// Symbol of the interface descriptor in the runtime registry
    pub descriptor: String,
    pub slots: Vec<EventSlot>,
    pub constructors: Vec<Constructor>,
    /// Interfaces allowed to construct or inspect this proxy, sorted
    pub grants: Vec<String>,
    pub methods: Vec<RequestMethod>,
    pub accessors: Vec<Accessor>,
    pub dispatcher: Dispatcher,
    pub enums: Vec<EnumBlock>,
}

/// One callback slot in the private event record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSlot {
    pub name: String,
    pub params: Vec<TypeRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Constructor {
    /// Wraps an existing untyped handle and installs the event record
    Wrap { destroy_opcode: Option<u32> },
    /// Binds the class to its interface descriptor only
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Passing {
    Value,
    /// Written back by the call
    OutRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
    pub passing: Passing,
}

impl Param {
    pub fn value(name: impl Into<String>, ty: TypeRef) -> Self {
        Param {
            name: name.into(),
            ty,
            passing: Passing::Value,
        }
    }

    pub fn out_ref(name: impl Into<String>, ty: TypeRef) -> Self {
        Param {
            name: name.into(),
            ty,
            passing: Passing::OutRef,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestMethod {
    pub name: String,
    pub opcode: u32,
    pub params: Vec<Param>,
    pub returns: Option<TypeRef>,
    pub call: Marshal,
}

/// Positional value handed to a marshal primitive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "param")]
pub enum Operand {
    /// A method parameter passed through unchanged
    Arg(String),
    /// Interface name read from a caller-supplied handle
    HandleName(String),
    /// Caller-supplied version
    Version(String),
    /// Placeholder for the object the runtime allocates
    NewObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Marshal {
    /// Fire-and-forget request
    Send { opcode: u32, operands: Vec<Operand> },
    /// Request that yields a new proxy
    Construct {
        opcode: u32,
        target: ConstructTarget,
        operands: Vec<Operand>,
        /// Parameter that receives the new handle before it is returned
        backfill: Option<String>,
    },
}

impl Marshal {
    pub fn opcode(&self) -> u32 {
        match self {
            Marshal::Send { opcode, .. } | Marshal::Construct { opcode, .. } => *opcode,
        }
    }

    pub fn operands(&self) -> &[Operand] {
        match self {
            Marshal::Send { operands, .. } | Marshal::Construct { operands, .. } => operands,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum ConstructTarget {
    /// Statically known interface descriptor symbol
    Descriptor(String),
    /// Descriptor carried by the named handle parameter
    FromHandle(String),
}

/// Accessor returning a mutable reference to an event slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Accessor {
    pub name: String,
    /// Index into `ProxyClass::slots`
    pub slot: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dispatcher {
    pub cases: Vec<DispatchCase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchCase {
    pub opcode: u32,
    pub slot: usize,
    pub decoders: Vec<DecodeHint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumBlock {
    /// `<interface>_<enum>`
    pub name: String,
    pub constants: Vec<Constant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constant {
    /// `<interface>_<enum>_<entry>`
    pub name: String,
    pub value: String,
}
