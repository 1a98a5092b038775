//! Structural merging for intersections
//!
//! `A & B` over object-shaped candidates merges their member lists into a
//! single object literal. Later candidates win name conflicts, matching
//! declaration-order semantics of the emitted programs.

use crate::arena::{TypeArena, TypeId};
use crate::ty::{member_name, Type, TypeNode};

/// Merge object-literal and class candidates into one object literal
///
/// Candidates that are not object-shaped are ignored. An empty candidate
/// list produces an empty object literal.
pub fn merge_object_like(arena: &mut TypeArena, candidates: &[TypeId]) -> TypeId {
    let mut members: Vec<TypeId> = Vec::new();
    for &candidate in candidates {
        let incoming = match arena.node(candidate) {
            TypeNode::ObjectLiteral { members } => members.clone(),
            TypeNode::Class { members, .. } => members.clone(),
            _ => continue,
        };
        for member in incoming {
            let name = member_name(arena, member).map(str::to_string);
            match name {
                Some(name) => {
                    if let Some(existing) = members
                        .iter_mut()
                        .find(|&&mut m| member_name(arena, m) == Some(name.as_str()))
                    {
                        *existing = member;
                    } else {
                        members.push(member);
                    }
                }
                // Unnamed members (index signatures) accumulate.
                None => members.push(member),
            }
        }
    }
    arena.alloc(Type::new(TypeNode::ObjectLiteral { members }))
}
