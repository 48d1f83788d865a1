// C++ back-end
// Output targets the hand-written runtime: `proxy_t`, `proxy_t::events_base_t`,
// `marshal`, `marshal_constructor` and the `wl_*_interface` descriptors.

use super::tree::*;
use super::Printer;
use crate::config::OutputConfig;
use crate::type_map::{DecodeHint, TypeRef};
use std::fmt::{self, Write};

/// Base class every generated proxy derives from
const BASE: &str = "proxy_t";

#[derive(Debug, Clone, Default)]
pub struct CppPrinter {
    config: OutputConfig,
}

impl CppPrinter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn class_name(interface: &str) -> String {
        format!("{}_t", interface)
    }

    pub fn type_name(ty: &TypeRef) -> String {
        match ty {
            TypeRef::Int32 | TypeRef::Fixed => "int32_t".to_string(),
            TypeRef::Uint32 => "uint32_t".to_string(),
            TypeRef::Text => "std::string".to_string(),
            TypeRef::Proxy(interface) => Self::class_name(interface),
            TypeRef::AnyProxy => BASE.to_string(),
            TypeRef::Fd => "int".to_string(),
            TypeRef::Bytes => "std::vector<char>".to_string(),
            TypeRef::Raw(token) => token.clone(),
        }
    }

    pub fn decode_name(hint: &DecodeHint) -> String {
        match hint {
            DecodeHint::Int32 | DecodeHint::Fixed | DecodeHint::Fd => "int32_t".to_string(),
            DecodeHint::Uint32 => "uint32_t".to_string(),
            DecodeHint::Text => "std::string".to_string(),
            DecodeHint::Proxy => BASE.to_string(),
            DecodeHint::Bytes => "std::vector<char>".to_string(),
            DecodeHint::Raw(token) => token.clone(),
        }
    }

    fn callback_type(params: &[TypeRef]) -> String {
        let params: Vec<_> = params.iter().map(Self::type_name).collect();
        format!("std::function<void({})>", params.join(", "))
    }

    fn param_list(params: &[Param]) -> String {
        params
            .iter()
            .map(|param| {
                let ty = Self::type_name(&param.ty);
                match param.passing {
                    Passing::Value => format!("{} {}", ty, param.name),
                    Passing::OutRef => format!("{} &{}", ty, param.name),
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn return_type(method: &RequestMethod) -> String {
        method
            .returns
            .as_ref()
            .map(Self::type_name)
            .unwrap_or_else(|| "void".to_string())
    }

    fn operand(operand: &Operand) -> String {
        match operand {
            Operand::Arg(name) | Operand::Version(name) => name.clone(),
            Operand::HandleName(handle) => format!("std::string({}.interface->name)", handle),
            Operand::NewObject => "NULL".to_string(),
        }
    }

    /// Method signature as it appears in the class body
    pub fn method_declaration(method: &RequestMethod) -> String {
        format!(
            "{} {}({});",
            Self::return_type(method),
            method.name,
            Self::param_list(&method.params)
        )
    }

    fn write_class(&self, class: &ProxyClass, out: &mut dyn Write) -> fmt::Result {
        let name = Self::class_name(&class.name);

        writeln!(out, "class {} : public {}", name, BASE)?;
        writeln!(out, "{{")?;
        writeln!(out, "private:")?;
        writeln!(out, "  struct events_t : public {}::events_base_t", BASE)?;
        writeln!(out, "  {{")?;
        for slot in &class.slots {
            writeln!(out, "    {} {};", Self::callback_type(&slot.params), slot.name)?;
        }
        writeln!(out, "  }};")?;
        writeln!(out)?;

        for constructor in &class.constructors {
            if let Constructor::Wrap { .. } = constructor {
                writeln!(out, "  {}(const {} &proxy);", name, BASE)?;
            }
        }
        writeln!(
            out,
            "  int dispatcher(int opcode, std::vector<any> args) override;"
        )?;
        writeln!(out)?;

        for grant in &class.grants {
            writeln!(out, "  friend class {};", Self::class_name(grant))?;
        }
        writeln!(out)?;

        writeln!(out, "public:")?;
        for constructor in &class.constructors {
            if let Constructor::Default = constructor {
                writeln!(out, "  {}();", name)?;
            }
        }
        for method in &class.methods {
            writeln!(out, "  {}", Self::method_declaration(method))?;
        }
        for accessor in &class.accessors {
            if let Some(slot) = class.slots.get(accessor.slot) {
                writeln!(
                    out,
                    "  {} &{}();",
                    Self::callback_type(&slot.params),
                    accessor.name
                )?;
            }
        }
        writeln!(out, "}};")?;
        writeln!(out)?;

        for block in &class.enums {
            self.write_enum(block, out)?;
            writeln!(out)?;
        }
        Ok(())
    }

    pub fn write_enum(&self, block: &EnumBlock, out: &mut dyn Write) -> fmt::Result {
        writeln!(out, "enum {}", block.name)?;
        writeln!(out, "  {{")?;
        let last = block.constants.len().saturating_sub(1);
        for (index, constant) in block.constants.iter().enumerate() {
            let separator = if index == last { "" } else { "," };
            writeln!(out, "    {} = {}{}", constant.name, constant.value, separator)?;
        }
        writeln!(out, "  }};")
    }

    fn write_constructors(&self, class: &ProxyClass, out: &mut dyn Write) -> fmt::Result {
        let name = Self::class_name(&class.name);
        for constructor in &class.constructors {
            match constructor {
                Constructor::Wrap { destroy_opcode } => {
                    // The runtime treats -1 as "no destroy request"
                    let destroy = destroy_opcode.map_or(-1, i64::from);
                    writeln!(out, "{}::{}(const {} &p)", name, name, BASE)?;
                    writeln!(out, "  : {}(p)", BASE)?;
                    writeln!(out, "{{")?;
                    writeln!(
                        out,
                        "  set_events(std::shared_ptr<{}::events_base_t>(new events_t));",
                        BASE
                    )?;
                    writeln!(out, "  set_destroy_opcode({});", destroy)?;
                    writeln!(out, "  interface = &{};", class.descriptor)?;
                    writeln!(out, "}}")?;
                }
                Constructor::Default => {
                    writeln!(out, "{}::{}()", name, name)?;
                    writeln!(out, "{{")?;
                    writeln!(out, "  interface = &{};", class.descriptor)?;
                    writeln!(out, "}}")?;
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }

    fn write_method(&self, class: &ProxyClass, method: &RequestMethod, out: &mut dyn Write) -> fmt::Result {
        writeln!(
            out,
            "{} {}::{}({})",
            Self::return_type(method),
            Self::class_name(&class.name),
            method.name,
            Self::param_list(&method.params)
        )?;
        writeln!(out, "{{")?;

        let operands: Vec<_> = method.call.operands().iter().map(Self::operand).collect();
        match &method.call {
            Marshal::Send { opcode, .. } => {
                let mut args = vec![opcode.to_string()];
                args.extend(operands);
                writeln!(out, "  marshal({});", args.join(", "))?;
            }
            Marshal::Construct {
                opcode,
                target,
                backfill,
                ..
            } => {
                let target = match target {
                    ConstructTarget::Descriptor(symbol) => format!("&{}", symbol),
                    ConstructTarget::FromHandle(handle) => format!("{}.interface", handle),
                };
                let mut args = vec![opcode.to_string(), target];
                args.extend(operands);
                writeln!(
                    out,
                    "  {} p = marshal_constructor({});",
                    BASE,
                    args.join(", ")
                )?;
                if let Some(handle) = backfill {
                    writeln!(out, "  {} = p;", handle)?;
                }
                writeln!(out, "  return p;")?;
            }
        }
        writeln!(out, "}}")?;
        writeln!(out)
    }

    fn write_accessor(&self, class: &ProxyClass, accessor: &Accessor, out: &mut dyn Write) -> fmt::Result {
        let Some(slot) = class.slots.get(accessor.slot) else {
            return Ok(());
        };
        writeln!(
            out,
            "{} &{}::{}()",
            Self::callback_type(&slot.params),
            Self::class_name(&class.name),
            accessor.name
        )?;
        writeln!(out, "{{")?;
        writeln!(
            out,
            "  return std::static_pointer_cast<events_t>(get_events())->{};",
            slot.name
        )?;
        writeln!(out, "}}")?;
        writeln!(out)
    }

    fn write_dispatcher(&self, class: &ProxyClass, out: &mut dyn Write) -> fmt::Result {
        writeln!(
            out,
            "int {}::dispatcher(int opcode, std::vector<any> args)",
            Self::class_name(&class.name)
        )?;
        writeln!(out, "{{")?;

        if !class.dispatcher.cases.is_empty() {
            writeln!(
                out,
                "  std::shared_ptr<events_t> events = std::static_pointer_cast<events_t>(get_events());"
            )?;
            writeln!(out, "  switch(opcode)")?;
            writeln!(out, "    {{")?;
            for case in &class.dispatcher.cases {
                let Some(slot) = class.slots.get(case.slot) else {
                    continue;
                };
                let args: Vec<_> = case
                    .decoders
                    .iter()
                    .enumerate()
                    .map(|(index, hint)| format!("args[{}].get<{}>()", index, Self::decode_name(hint)))
                    .collect();
                writeln!(out, "    case {}:", case.opcode)?;
                writeln!(
                    out,
                    "      if(events->{name}) events->{name}({args});",
                    name = slot.name,
                    args = args.join(", ")
                )?;
                writeln!(out, "      break;")?;
            }
            writeln!(out, "    }}")?;
        }

        writeln!(out, "  return 0;")?;
        writeln!(out, "}}")?;
        writeln!(out)
    }
}

impl Printer for CppPrinter {
    fn write_declarations(&self, module: &Module, out: &mut dyn Write) -> fmt::Result {
        let guard = &self.config.header_guard;
        writeln!(out, "#ifndef {}", guard)?;
        writeln!(out, "#define {}", guard)?;
        writeln!(out)?;
        for include in &self.config.system_includes {
            writeln!(out, "#include <{}>", include)?;
        }
        writeln!(out)?;
        writeln!(out, "#include <{}>", self.config.runtime_include)?;
        writeln!(out)?;

        for forward in &module.forwards {
            writeln!(out, "class {};", Self::class_name(forward))?;
        }
        writeln!(out)?;

        for class in &module.classes {
            self.write_class(class, out)?;
        }

        writeln!(out, "#endif")
    }

    fn write_definitions(&self, module: &Module, out: &mut dyn Write) -> fmt::Result {
        writeln!(out, "#include <{}>", self.config.definitions_include)?;
        writeln!(out)?;

        for class in &module.classes {
            self.write_constructors(class, out)?;
            for method in &class.methods {
                self.write_method(class, method, out)?;
            }
            for accessor in &class.accessors {
                self.write_accessor(class, accessor, out)?;
            }
            self.write_dispatcher(class, out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callback_class() -> ProxyClass {
        ProxyClass {
            name: "callback".to_string(),
            descriptor: "wl_callback_interface".to_string(),
            slots: vec![EventSlot {
                name: "done".to_string(),
                params: vec![TypeRef::Uint32],
            }],
            constructors: vec![
                Constructor::Wrap {
                    destroy_opcode: None,
                },
                Constructor::Default,
            ],
            grants: vec!["display".to_string(), "surface".to_string()],
            methods: Vec::new(),
            accessors: vec![Accessor {
                name: "on_done".to_string(),
                slot: 0,
            }],
            dispatcher: Dispatcher {
                cases: vec![DispatchCase {
                    opcode: 0,
                    slot: 0,
                    decoders: vec![DecodeHint::Uint32],
                }],
            },
            enums: Vec::new(),
        }
    }

    fn render_definitions(class: ProxyClass) -> String {
        CppPrinter::default()
            .definitions(&Module::new(vec![class]))
            .unwrap()
    }

    #[test]
    fn test_type_names() {
        assert_eq!(CppPrinter::type_name(&TypeRef::Fixed), "int32_t");
        assert_eq!(CppPrinter::type_name(&TypeRef::Fd), "int");
        assert_eq!(CppPrinter::type_name(&TypeRef::Bytes), "std::vector<char>");
        assert_eq!(
            CppPrinter::type_name(&TypeRef::Proxy("seat".to_string())),
            "seat_t"
        );
        assert_eq!(CppPrinter::type_name(&TypeRef::AnyProxy), "proxy_t");
        assert_eq!(
            CppPrinter::type_name(&TypeRef::Raw("quaternion".to_string())),
            "quaternion"
        );
        assert_eq!(CppPrinter::decode_name(&DecodeHint::Fd), "int32_t");
    }

    #[test]
    fn test_enum_block() {
        let block = EnumBlock {
            name: "shm_format".to_string(),
            constants: vec![
                Constant {
                    name: "shm_format_argb8888".to_string(),
                    value: "0".to_string(),
                },
                Constant {
                    name: "shm_format_c8".to_string(),
                    value: "0x20203843".to_string(),
                },
            ],
        };
        let mut out = String::new();
        CppPrinter::default().write_enum(&block, &mut out).unwrap();
        insta::assert_snapshot!(out, @r"
enum shm_format
  {
    shm_format_argb8888 = 0,
    shm_format_c8 = 0x20203843
  };
");
    }

    #[test]
    fn test_class_declaration() {
        let module = Module::new(vec![callback_class()]);
        let text = CppPrinter::default().declarations(&module).unwrap();

        assert!(text.starts_with("#ifndef WAYLAND_HPP\n#define WAYLAND_HPP\n"));
        assert!(text.contains("#include <functional>\n"));
        assert!(text.contains("#include <wayland-client.hpp>\n"));
        assert!(text.contains("class callback_t;\n"));
        assert!(text.contains("class callback_t : public proxy_t\n{\nprivate:\n"));
        assert!(text.contains("    std::function<void(uint32_t)> done;\n"));
        assert!(text.contains("  callback_t(const proxy_t &proxy);\n"));
        assert!(text.contains("  friend class display_t;\n  friend class surface_t;\n"));
        assert!(text.contains("public:\n  callback_t();\n"));
        assert!(text.contains("  std::function<void(uint32_t)> &on_done();\n"));
        assert!(text.trim_end().ends_with("#endif"));
    }

    #[test]
    fn test_dispatcher_definition() {
        let text = render_definitions(callback_class());
        let start = text.find("int callback_t::dispatcher").unwrap();
        insta::assert_snapshot!(&text[start..], @r"
int callback_t::dispatcher(int opcode, std::vector<any> args)
{
  std::shared_ptr<events_t> events = std::static_pointer_cast<events_t>(get_events());
  switch(opcode)
    {
    case 0:
      if(events->done) events->done(args[0].get<uint32_t>());
      break;
    }
  return 0;
}
");
    }

    #[test]
    fn test_dispatcher_without_events() {
        let mut class = callback_class();
        class.slots.clear();
        class.accessors.clear();
        class.dispatcher.cases.clear();
        let text = render_definitions(class);
        assert!(text.contains(
            "int callback_t::dispatcher(int opcode, std::vector<any> args)\n{\n  return 0;\n}\n"
        ));
        assert!(!text.contains("switch"));
    }

    #[test]
    fn test_constructors() {
        let text = render_definitions(callback_class());
        assert!(text.starts_with("#include <wayland-client-protocol.hpp>\n\n"));
        assert!(text.contains("callback_t::callback_t(const proxy_t &p)\n  : proxy_t(p)\n{\n"));
        assert!(text.contains("  set_destroy_opcode(-1);\n"));
        assert!(text.contains("callback_t::callback_t()\n{\n  interface = &wl_callback_interface;\n}\n"));
    }

    #[test]
    fn test_request_bodies() {
        let mut class = callback_class();
        class.name = "registry".to_string();
        class.methods = vec![
            RequestMethod {
                name: "bind".to_string(),
                opcode: 0,
                params: vec![
                    Param::value("name", TypeRef::Uint32),
                    Param::out_ref("interface", TypeRef::AnyProxy),
                    Param::value("version", TypeRef::Uint32),
                ],
                returns: Some(TypeRef::AnyProxy),
                call: Marshal::Construct {
                    opcode: 0,
                    target: ConstructTarget::FromHandle("interface".to_string()),
                    operands: vec![
                        Operand::Arg("name".to_string()),
                        Operand::HandleName("interface".to_string()),
                        Operand::Version("version".to_string()),
                        Operand::NewObject,
                    ],
                    backfill: Some("interface".to_string()),
                },
            },
            RequestMethod {
                name: "release".to_string(),
                opcode: 1,
                params: Vec::new(),
                returns: None,
                call: Marshal::Send {
                    opcode: 1,
                    operands: Vec::new(),
                },
            },
        ];

        let text = render_definitions(class);
        assert!(text.contains(
            "proxy_t registry_t::bind(uint32_t name, proxy_t &interface, uint32_t version)\n{\n  \
             proxy_t p = marshal_constructor(0, interface.interface, name, \
             std::string(interface.interface->name), version, NULL);\n  \
             interface = p;\n  return p;\n}\n"
        ));
        assert!(text.contains("void registry_t::release()\n{\n  marshal(1);\n}\n"));
    }
}
