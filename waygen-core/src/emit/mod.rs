// Proxy emission
// Lowers interfaces into the emission tree; printers turn the tree into text.

pub mod cpp;
pub mod tree;

pub use cpp::CppPrinter;
pub use tree::*;

use crate::model::{ArgKind, Enumeration, Event, Interface, Request};
use crate::type_map::{decode_hint, public_type, TypeRef};
use crate::visibility::VisibilityMap;
use std::fmt;
use tracing::{debug, trace};

/// Parameter receiving the caller's interface handle for untyped new_id.
/// Suffixed with `_` when the request already has an argument of this name.
pub const HANDLE_PARAM: &str = "interface";
/// Parameter carrying the caller's requested version for untyped new_id.
/// Suffixed like [`HANDLE_PARAM`].
pub const VERSION_PARAM: &str = "version";

/// Back-end that renders a module as a declaration/definition pair
pub trait Printer {
    fn write_declarations(&self, module: &Module, out: &mut dyn fmt::Write) -> fmt::Result;

    fn write_definitions(&self, module: &Module, out: &mut dyn fmt::Write) -> fmt::Result;

    fn declarations(&self, module: &Module) -> Result<String, fmt::Error> {
        let mut out = String::new();
        self.write_declarations(module, &mut out)?;
        Ok(out)
    }

    fn definitions(&self, module: &Module) -> Result<String, fmt::Error> {
        let mut out = String::new();
        self.write_definitions(module, &mut out)?;
        Ok(out)
    }
}

/// Lowers one interface at a time into a `ProxyClass`
#[derive(Debug, Clone, Copy)]
pub struct Emitter<'a> {
    visibility: &'a VisibilityMap,
    namespace_prefix: &'a str,
}

impl<'a> Emitter<'a> {
    pub fn new(visibility: &'a VisibilityMap, namespace_prefix: &'a str) -> Self {
        Self {
            visibility,
            namespace_prefix,
        }
    }

    /// Symbol of an interface's descriptor in the runtime registry
    pub fn descriptor(&self, interface: &str) -> String {
        format!("{}{}_interface", self.namespace_prefix, interface)
    }

    pub fn lower(&self, interface: &Interface) -> ProxyClass {
        let slots: Vec<EventSlot> = interface.events.iter().map(event_slot).collect();

        let accessors = interface
            .events
            .iter()
            .enumerate()
            .map(|(slot, event)| Accessor {
                name: format!("on_{}", event.name),
                slot,
            })
            .collect();

        let cases = interface
            .numbered_events()
            .map(|(opcode, event)| DispatchCase {
                opcode,
                slot: opcode as usize,
                decoders: event.args.iter().map(|arg| decode_hint(&arg.kind)).collect(),
            })
            .collect();

        let methods: Vec<RequestMethod> = interface
            .requests
            .iter()
            .map(|request| self.request_method(request))
            .collect();

        let class = ProxyClass {
            name: interface.name.clone(),
            descriptor: self.descriptor(&interface.name),
            slots,
            constructors: vec![
                Constructor::Wrap {
                    destroy_opcode: interface.destroy_opcode,
                },
                Constructor::Default,
            ],
            grants: self
                .visibility
                .granted_to(&interface.name)
                .map(String::from)
                .collect(),
            methods,
            accessors,
            dispatcher: Dispatcher { cases },
            enums: interface
                .enums
                .iter()
                .map(|enumeration| enum_block(&interface.name, enumeration))
                .collect(),
        };

        debug!(
            interface = %class.name,
            methods = class.methods.len(),
            slots = class.slots.len(),
            grants = class.grants.len(),
            "Lowered interface"
        );
        class
    }

    fn request_method(&self, request: &Request) -> RequestMethod {
        let mut params = Vec::new();
        let mut operands = Vec::new();
        let handle = free_name(HANDLE_PARAM, request);
        let version = free_name(VERSION_PARAM, request);

        for arg in request.args() {
            if arg.kind == ArgKind::NewId {
                if arg.interface.is_none() {
                    params.push(Param::out_ref(&handle, TypeRef::AnyProxy));
                    params.push(Param::value(&version, TypeRef::Uint32));
                    operands.push(Operand::HandleName(handle.clone()));
                    operands.push(Operand::Version(version.clone()));
                }
                operands.push(Operand::NewObject);
            } else {
                params.push(Param::value(&arg.name, public_type(arg)));
                operands.push(Operand::Arg(arg.name.clone()));
            }
        }

        let call = match &request.return_argument {
            None => Marshal::Send {
                opcode: request.opcode,
                operands,
            },
            Some(ret) => match &ret.interface {
                Some(interface) => Marshal::Construct {
                    opcode: request.opcode,
                    target: ConstructTarget::Descriptor(self.descriptor(interface)),
                    operands,
                    backfill: None,
                },
                None => Marshal::Construct {
                    opcode: request.opcode,
                    target: ConstructTarget::FromHandle(handle.clone()),
                    operands,
                    backfill: Some(handle),
                },
            },
        };

        trace!(
            request = %request.name(),
            opcode = request.opcode,
            params = params.len(),
            "Lowered request"
        );

        RequestMethod {
            name: request.name().to_string(),
            opcode: request.opcode,
            params,
            returns: request.return_argument.as_ref().map(public_type),
            call,
        }
    }
}

/// `base`, suffixed with `_` until no argument of `request` uses it
fn free_name(base: &str, request: &Request) -> String {
    let mut name = base.to_string();
    while request.args().iter().any(|arg| arg.name == name) {
        name.push('_');
    }
    name
}

fn event_slot(event: &Event) -> EventSlot {
    EventSlot {
        name: event.name.clone(),
        params: event.args.iter().map(public_type).collect(),
    }
}

fn enum_block(interface: &str, enumeration: &Enumeration) -> EnumBlock {
    let name = format!("{}_{}", interface, enumeration.name);
    let constants = enumeration
        .entries
        .iter()
        .map(|entry| Constant {
            name: format!("{}_{}", name, entry.name),
            value: entry.value.clone(),
        })
        .collect();
    EnumBlock { name, constants }
}
