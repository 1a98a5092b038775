//! Indexed access types
//!
//! Resolves `T[K]` against the shapes the processor produces. Unresolvable
//! accesses degrade to `never`; only a non-type base is an error, and that
//! is detected by the interpreter before calling in here.

use crate::arena::{TypeArena, TypeId};
use crate::ty::{LiteralValue, Type, TypeNode};
use crate::union::union_of;

/// Resolve `base[index]`
pub fn index_access(arena: &mut TypeArena, base: TypeId, index: TypeId) -> TypeId {
    // A union on either side distributes over its members.
    if let TypeNode::Union { types } = arena.node(base) {
        let members = types.clone();
        let results = members
            .iter()
            .map(|&m| index_access(arena, m, index))
            .collect();
        return union_of(arena, results);
    }
    if let TypeNode::Union { types } = arena.node(index) {
        let members = types.clone();
        let results = members
            .iter()
            .map(|&m| index_access(arena, base, m))
            .collect();
        return union_of(arena, results);
    }

    match arena.node(base).clone() {
        TypeNode::ObjectLiteral { members } => object_access(arena, &members, index),
        TypeNode::Class { members, .. } => object_access(arena, &members, index),
        TypeNode::Tuple { members } => tuple_access(arena, &members, index),
        TypeNode::Array { element } => match arena.node(index) {
            TypeNode::Number { .. } | TypeNode::Literal(LiteralValue::Number(_)) => element,
            _ => arena.never(),
        },
        _ => arena.never(),
    }
}

fn object_access(arena: &mut TypeArena, members: &[TypeId], index: TypeId) -> TypeId {
    match arena.node(index).clone() {
        TypeNode::Literal(value) => {
            let name = value.to_text();
            if let Some(found) = named_member_access(arena, members, &name) {
                return found;
            }
            index_signature_access(arena, members, &index_kind(arena, index))
        }
        TypeNode::String => index_signature_access(arena, members, "string"),
        TypeNode::Number { .. } => index_signature_access(arena, members, "number"),
        TypeNode::Symbol => index_signature_access(arena, members, "symbol"),
        _ => arena.never(),
    }
}

fn named_member_access(arena: &mut TypeArena, members: &[TypeId], name: &str) -> Option<TypeId> {
    for &member in members {
        match arena.node(member).clone() {
            TypeNode::Property { name: n, ty, .. }
            | TypeNode::PropertySignature { name: n, ty, .. }
                if n == name =>
            {
                return Some(ty);
            }
            TypeNode::Method { name: n, parameters, ret, .. }
            | TypeNode::MethodSignature { name: n, parameters, ret }
                if n == name =>
            {
                // Accessing a method member yields its function type.
                return Some(arena.alloc(Type::new(TypeNode::Function {
                    name: Some(n),
                    parameters,
                    ret,
                })));
            }
            _ => {}
        }
    }
    None
}

/// The index-signature bucket a key belongs to
fn index_kind(arena: &TypeArena, index: TypeId) -> String {
    match arena.node(index) {
        TypeNode::Literal(LiteralValue::Number(_)) => "number".to_string(),
        TypeNode::Literal(_) => "string".to_string(),
        other => Type::new(other.clone()).kind().to_string(),
    }
}

fn index_signature_access(arena: &mut TypeArena, members: &[TypeId], kind: &str) -> TypeId {
    for &member in members {
        if let TypeNode::IndexSignature { index, ty } = arena.node(member) {
            let (index, ty) = (*index, *ty);
            let matches = match arena.node(index) {
                TypeNode::String => kind == "string",
                TypeNode::Number { .. } => kind == "number",
                TypeNode::Symbol => kind == "symbol",
                _ => false,
            };
            if matches {
                return ty;
            }
        }
    }
    arena.never()
}

fn tuple_access(arena: &mut TypeArena, members: &[TypeId], index: TypeId) -> TypeId {
    match arena.node(index) {
        TypeNode::Literal(LiteralValue::Number(n)) => {
            let position = *n as usize;
            if n.fract() != 0.0 || *n < 0.0 {
                return arena.never();
            }
            match members.get(position) {
                Some(&member) => tuple_member_type(arena, member),
                None => arena.never(),
            }
        }
        TypeNode::Number { .. } => {
            let types = members
                .iter()
                .map(|&m| tuple_member_type(arena, m))
                .collect();
            union_of(arena, types)
        }
        _ => arena.never(),
    }
}

fn tuple_member_type(arena: &TypeArena, member: TypeId) -> TypeId {
    match arena.node(member) {
        TypeNode::TupleMember { ty, .. } | TypeNode::Rest { ty } => *ty,
        _ => member,
    }
}
