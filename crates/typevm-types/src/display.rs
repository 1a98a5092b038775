//! Type stringification
//!
//! Renders a type the way it would be written in source, for diagnostics
//! and test assertions. Recursive types are cut off with `...` once a node
//! repeats on the current path.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::arena::{TypeArena, TypeId};
use crate::ty::{LiteralValue, TypeNode};

/// Display adapter borrowing the arena a type lives in
pub struct TypeDisplay<'a> {
    arena: &'a TypeArena,
    id: TypeId,
}

impl TypeArena {
    /// Render a type as source-like syntax
    pub fn display(&self, id: TypeId) -> TypeDisplay<'_> {
        TypeDisplay { arena: self, id }
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut on_path = FxHashSet::default();
        write_type(f, self.arena, self.id, &mut on_path)
    }
}

fn write_type(
    f: &mut fmt::Formatter<'_>,
    arena: &TypeArena,
    id: TypeId,
    on_path: &mut FxHashSet<TypeId>,
) -> fmt::Result {
    if !on_path.insert(id) {
        return f.write_str("...");
    }
    let result = write_node(f, arena, id, on_path);
    on_path.remove(&id);
    result
}

fn write_list(
    f: &mut fmt::Formatter<'_>,
    arena: &TypeArena,
    ids: &[TypeId],
    separator: &str,
    on_path: &mut FxHashSet<TypeId>,
) -> fmt::Result {
    for (i, &member) in ids.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write_type(f, arena, member, on_path)?;
    }
    Ok(())
}

fn write_node(
    f: &mut fmt::Formatter<'_>,
    arena: &TypeArena,
    id: TypeId,
    on_path: &mut FxHashSet<TypeId>,
) -> fmt::Result {
    match arena.node(id) {
        TypeNode::Never => f.write_str("never"),
        TypeNode::Any => f.write_str("any"),
        TypeNode::Unknown => f.write_str("unknown"),
        TypeNode::Void => f.write_str("void"),
        TypeNode::Object => f.write_str("object"),
        TypeNode::Undefined => f.write_str("undefined"),
        TypeNode::Null => f.write_str("null"),
        TypeNode::String => f.write_str("string"),
        TypeNode::Number { .. } => f.write_str("number"),
        TypeNode::Boolean => f.write_str("boolean"),
        TypeNode::BigInt => f.write_str("bigint"),
        TypeNode::Symbol => f.write_str("symbol"),
        TypeNode::Regexp => f.write_str("RegExp"),
        TypeNode::Literal(value) => match value {
            LiteralValue::String(v) => write!(f, "'{v}'"),
            other => f.write_str(&other.to_text()),
        },
        TypeNode::Union { types } => write_list(f, arena, types, " | ", on_path),
        TypeNode::Intersection { types } => write_list(f, arena, types, " & ", on_path),
        TypeNode::Array { element } => {
            let wrap = matches!(arena.node(*element), TypeNode::Union { .. });
            if wrap {
                f.write_str("(")?;
            }
            write_type(f, arena, *element, on_path)?;
            if wrap {
                f.write_str(")")?;
            }
            f.write_str("[]")
        }
        TypeNode::Tuple { members } => {
            f.write_str("[")?;
            write_list(f, arena, members, ", ", on_path)?;
            f.write_str("]")
        }
        TypeNode::TupleMember { ty, optional, name } => {
            if let Some(name) = name {
                write!(f, "{name}{}: ", if *optional { "?" } else { "" })?;
                return write_type(f, arena, *ty, on_path);
            }
            write_type(f, arena, *ty, on_path)?;
            if *optional {
                f.write_str("?")?;
            }
            Ok(())
        }
        TypeNode::Rest { ty } => {
            f.write_str("...")?;
            write_type(f, arena, *ty, on_path)
        }
        TypeNode::ObjectLiteral { members } => {
            f.write_str("{")?;
            write_list(f, arena, members, "; ", on_path)?;
            f.write_str("}")
        }
        TypeNode::Class { name, members, arguments, .. } => {
            write!(f, "class {}", name.as_deref().unwrap_or(""))?;
            if let Some(arguments) = arguments {
                f.write_str("<")?;
                write_list(f, arena, arguments, ", ", on_path)?;
                f.write_str(">")?;
            }
            f.write_str(" {")?;
            write_list(f, arena, members, "; ", on_path)?;
            f.write_str("}")
        }
        TypeNode::Property { name, ty, optional, readonly, .. }
        | TypeNode::PropertySignature { name, ty, optional, readonly, .. } => {
            if *readonly {
                f.write_str("readonly ")?;
            }
            write!(f, "{name}{}: ", if *optional { "?" } else { "" })?;
            write_type(f, arena, *ty, on_path)
        }
        TypeNode::Method { name, parameters, ret, .. }
        | TypeNode::MethodSignature { name, parameters, ret } => {
            write!(f, "{name}(")?;
            write_list(f, arena, parameters, ", ", on_path)?;
            f.write_str("): ")?;
            write_type(f, arena, *ret, on_path)
        }
        TypeNode::Parameter { name, ty, optional, .. } => {
            write!(f, "{name}{}: ", if *optional { "?" } else { "" })?;
            write_type(f, arena, *ty, on_path)
        }
        TypeNode::IndexSignature { index, ty } => {
            f.write_str("[index: ")?;
            write_type(f, arena, *index, on_path)?;
            f.write_str("]: ")?;
            write_type(f, arena, *ty, on_path)
        }
        TypeNode::Enum { members } => {
            f.write_str("enum {")?;
            for (i, (name, _)) in members.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                f.write_str(name)?;
            }
            f.write_str("}")
        }
        TypeNode::EnumMember { name, .. } => f.write_str(name),
        TypeNode::Promise { ty } => {
            f.write_str("Promise<")?;
            write_type(f, arena, *ty, on_path)?;
            f.write_str(">")
        }
        TypeNode::TemplateLiteral { types } => {
            f.write_str("`")?;
            for &member in types {
                match arena.node(member) {
                    TypeNode::Literal(value) => f.write_str(&value.to_text())?,
                    _ => {
                        f.write_str("${")?;
                        write_type(f, arena, member, on_path)?;
                        f.write_str("}")?;
                    }
                }
            }
            f.write_str("`")
        }
        TypeNode::TypeParameter { name } => f.write_str(name),
        TypeNode::Infer { .. } => f.write_str("infer"),
        TypeNode::Function { parameters, ret, .. } => {
            f.write_str("(")?;
            write_list(f, arena, parameters, ", ", on_path)?;
            f.write_str(") => ")?;
            write_type(f, arena, *ret, on_path)
        }
    }
}
