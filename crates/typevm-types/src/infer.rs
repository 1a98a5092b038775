//! Type inference from runtime values
//!
//! `typeof` accessors yield plain runtime values; this module produces the
//! IR that best describes them. Scalar values infer to their base primitive
//! widened from a literal, with the literal preserved as the node's
//! `origin` so that [`narrow_original_literal`] can restore it at the
//! program boundary.

use typevm_program::RuntimeValue;

use crate::arena::{TypeArena, TypeId};
use crate::ty::{LiteralValue, Type, TypeNode};
use crate::union::union_of;

/// Widen a literal node to its base primitive, recording the origin
pub fn widen_literal(arena: &mut TypeArena, literal: TypeId) -> TypeId {
    let node = match arena.node(literal) {
        TypeNode::Literal(LiteralValue::String(_)) => TypeNode::String,
        TypeNode::Literal(LiteralValue::Number(_)) => TypeNode::Number { brand: None },
        TypeNode::Literal(LiteralValue::Boolean(_)) => TypeNode::Boolean,
        TypeNode::Literal(LiteralValue::BigInt(_)) => TypeNode::BigInt,
        TypeNode::Literal(LiteralValue::Regex { .. }) => TypeNode::Regexp,
        _ => return literal,
    };
    let mut widened = Type::new(node);
    widened.origin = Some(literal);
    arena.alloc(widened)
}

/// Restore the recorded literal of a widened node, if any
///
/// Applied once at the program boundary so that a program which recorded an
/// explicit literal hands that literal back to the caller.
pub fn narrow_original_literal(arena: &TypeArena, id: TypeId) -> TypeId {
    arena.get(id).origin.unwrap_or(id)
}

/// Produce the IR that best describes a runtime value
pub fn infer_from_value(arena: &mut TypeArena, value: &RuntimeValue) -> TypeId {
    match value {
        RuntimeValue::Undefined => arena.undefined(),
        RuntimeValue::Null => arena.alloc(Type::new(TypeNode::Null)),
        RuntimeValue::Bool(v) => {
            let literal = arena.literal(LiteralValue::Boolean(*v));
            widen_literal(arena, literal)
        }
        RuntimeValue::Number(v) => {
            let literal = arena.literal(LiteralValue::Number(*v));
            widen_literal(arena, literal)
        }
        RuntimeValue::BigInt(v) => {
            let literal = arena.literal(LiteralValue::BigInt(*v));
            widen_literal(arena, literal)
        }
        RuntimeValue::String(v) => {
            let literal = arena.string_literal(v.clone());
            widen_literal(arena, literal)
        }
        RuntimeValue::Array(items) => {
            let inferred = items
                .iter()
                .map(|item| infer_from_value(arena, item))
                .collect();
            let element = union_of(arena, inferred);
            let element = if items.is_empty() { arena.any() } else { element };
            arena.alloc(Type::new(TypeNode::Array { element }))
        }
        RuntimeValue::Object(fields) => {
            let members = fields
                .iter()
                .map(|(name, field)| {
                    let ty = infer_from_value(arena, field);
                    arena.alloc(Type::new(TypeNode::PropertySignature {
                        name: name.clone(),
                        ty,
                        optional: false,
                        readonly: false,
                        description: None,
                    }))
                })
                .collect();
            arena.alloc(Type::new(TypeNode::ObjectLiteral { members }))
        }
    }
}
