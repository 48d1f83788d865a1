// Argument kind to public type mapping
// Language-neutral: printers decide how each TypeRef is spelled.

use crate::model::{ArgKind, Argument};
use serde::{Deserialize, Serialize};

/// Public type of an argument as seen by proxy users
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "of")]
pub enum TypeRef {
    Int32,
    Uint32,
    /// 24.8 fixed-point carried in a signed 32-bit integer
    Fixed,
    Text,
    /// Typed proxy for a known interface
    Proxy(String),
    /// Untyped proxy handle
    AnyProxy,
    Fd,
    Bytes,
    /// Unknown kind, spelled exactly as written in the document
    Raw(String),
}

/// How a decoded wire value is extracted before it reaches a callback
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "of")]
pub enum DecodeHint {
    Int32,
    Uint32,
    Fixed,
    Text,
    /// Every object argument arrives as an untyped handle
    Proxy,
    Fd,
    Bytes,
    Raw(String),
}

/// Public type of an argument. A referenced interface always wins over the
/// generic handle, whatever the kind.
pub fn public_type(arg: &Argument) -> TypeRef {
    if let Some(interface) = &arg.interface {
        return TypeRef::Proxy(interface.clone());
    }
    match &arg.kind {
        ArgKind::Int => TypeRef::Int32,
        ArgKind::Uint => TypeRef::Uint32,
        ArgKind::Fixed => TypeRef::Fixed,
        ArgKind::String => TypeRef::Text,
        ArgKind::Object | ArgKind::NewId => TypeRef::AnyProxy,
        ArgKind::Fd => TypeRef::Fd,
        ArgKind::Array => TypeRef::Bytes,
        ArgKind::Other(token) => TypeRef::Raw(token.clone()),
    }
}

pub fn decode_hint(kind: &ArgKind) -> DecodeHint {
    match kind {
        ArgKind::Int => DecodeHint::Int32,
        ArgKind::Uint => DecodeHint::Uint32,
        ArgKind::Fixed => DecodeHint::Fixed,
        ArgKind::String => DecodeHint::Text,
        ArgKind::Object | ArgKind::NewId => DecodeHint::Proxy,
        ArgKind::Fd => DecodeHint::Fd,
        ArgKind::Array => DecodeHint::Bytes,
        ArgKind::Other(token) => DecodeHint::Raw(token.clone()),
    }
}
