//! Union construction helpers
//!
//! Unions are normalized at construction time: nested unions are inlined,
//! `never` members are dropped, structural duplicates collapse, and a union
//! of one member unboxes to that member. The processor funnels every union
//! it builds through [`union_of`].

use rustc_hash::FxHashSet;

use crate::arena::{TypeArena, TypeId};
use crate::ty::{Type, TypeNode};

/// Recursively inline nested unions and drop `never` members
pub fn flatten_union_members(arena: &TypeArena, members: &[TypeId]) -> Vec<TypeId> {
    let mut out = Vec::with_capacity(members.len());
    flatten_into(arena, members, &mut out);
    out
}

fn flatten_into(arena: &TypeArena, members: &[TypeId], out: &mut Vec<TypeId>) {
    for &id in members {
        match arena.node(id) {
            TypeNode::Union { types } => flatten_into(arena, types, out),
            TypeNode::Never => {}
            _ => out.push(id),
        }
    }
}

/// Collapse a single-member union to its member
pub fn unbox_union(arena: &TypeArena, id: TypeId) -> TypeId {
    match arena.node(id) {
        TypeNode::Union { types } if types.len() == 1 => types[0],
        _ => id,
    }
}

/// Build a normalized union from member candidates
///
/// Flattens, drops `never`, removes structural duplicates, and unboxes.
/// An empty member list degrades to `never`.
pub fn union_of(arena: &mut TypeArena, members: Vec<TypeId>) -> TypeId {
    let flat = flatten_union_members(arena, &members);
    let mut unique: Vec<TypeId> = Vec::with_capacity(flat.len());
    for id in flat {
        if !unique.iter().any(|&seen| types_equal(arena, seen, id)) {
            unique.push(id);
        }
    }
    match unique.len() {
        0 => arena.never(),
        1 => unique[0],
        _ => arena.alloc(Type::new(TypeNode::Union { types: unique })),
    }
}

/// Structural equality of two type nodes
///
/// Identity short-circuits; recursion over members treats revisited pairs
/// as equal so that cyclic types terminate.
pub fn types_equal(arena: &TypeArena, a: TypeId, b: TypeId) -> bool {
    let mut seen = FxHashSet::default();
    equal_inner(arena, a, b, &mut seen)
}

fn equal_inner(
    arena: &TypeArena,
    a: TypeId,
    b: TypeId,
    seen: &mut FxHashSet<(TypeId, TypeId)>,
) -> bool {
    if a == b {
        return true;
    }
    if !seen.insert((a, b)) {
        return true;
    }
    fn all(
        arena: &TypeArena,
        xs: &[TypeId],
        ys: &[TypeId],
        seen: &mut FxHashSet<(TypeId, TypeId)>,
    ) -> bool {
        xs.len() == ys.len()
            && xs
                .iter()
                .zip(ys)
                .all(|(&x, &y)| equal_inner(arena, x, y, seen))
    }
    match (arena.node(a), arena.node(b)) {
        (TypeNode::Never, TypeNode::Never)
        | (TypeNode::Any, TypeNode::Any)
        | (TypeNode::Unknown, TypeNode::Unknown)
        | (TypeNode::Void, TypeNode::Void)
        | (TypeNode::Object, TypeNode::Object)
        | (TypeNode::Undefined, TypeNode::Undefined)
        | (TypeNode::Null, TypeNode::Null)
        | (TypeNode::String, TypeNode::String)
        | (TypeNode::Boolean, TypeNode::Boolean)
        | (TypeNode::BigInt, TypeNode::BigInt)
        | (TypeNode::Symbol, TypeNode::Symbol)
        | (TypeNode::Regexp, TypeNode::Regexp) => true,
        (TypeNode::Number { brand: b1 }, TypeNode::Number { brand: b2 }) => b1 == b2,
        (TypeNode::Literal(v1), TypeNode::Literal(v2)) => v1 == v2,
        (TypeNode::Union { types: t1 }, TypeNode::Union { types: t2 })
        | (TypeNode::Intersection { types: t1 }, TypeNode::Intersection { types: t2 }) => {
            all(arena, t1, t2, seen)
        }
        (TypeNode::Array { element: e1 }, TypeNode::Array { element: e2 }) => {
            equal_inner(arena, *e1, *e2, seen)
        }
        (TypeNode::Tuple { members: m1 }, TypeNode::Tuple { members: m2 }) => {
            all(arena, m1, m2, seen)
        }
        (
            TypeNode::TupleMember { ty: t1, optional: o1, name: n1 },
            TypeNode::TupleMember { ty: t2, optional: o2, name: n2 },
        ) => o1 == o2 && n1 == n2 && equal_inner(arena, *t1, *t2, seen),
        (TypeNode::Rest { ty: t1 }, TypeNode::Rest { ty: t2 })
        | (TypeNode::Promise { ty: t1 }, TypeNode::Promise { ty: t2 }) => {
            equal_inner(arena, *t1, *t2, seen)
        }
        (TypeNode::ObjectLiteral { members: m1 }, TypeNode::ObjectLiteral { members: m2 }) => {
            all(arena, m1, m2, seen)
        }
        (
            TypeNode::PropertySignature { name: n1, ty: t1, optional: o1, readonly: r1, .. },
            TypeNode::PropertySignature { name: n2, ty: t2, optional: o2, readonly: r2, .. },
        ) => n1 == n2 && o1 == o2 && r1 == r2 && equal_inner(arena, *t1, *t2, seen),
        (
            TypeNode::Property { name: n1, ty: t1, optional: o1, readonly: r1, .. },
            TypeNode::Property { name: n2, ty: t2, optional: o2, readonly: r2, .. },
        ) => n1 == n2 && o1 == o2 && r1 == r2 && equal_inner(arena, *t1, *t2, seen),
        (
            TypeNode::Function { parameters: p1, ret: r1, .. },
            TypeNode::Function { parameters: p2, ret: r2, .. },
        ) => all(arena, p1, p2, seen) && equal_inner(arena, *r1, *r2, seen),
        (
            TypeNode::Parameter { name: n1, ty: t1, optional: o1, .. },
            TypeNode::Parameter { name: n2, ty: t2, optional: o2, .. },
        ) => n1 == n2 && o1 == o2 && equal_inner(arena, *t1, *t2, seen),
        (
            TypeNode::TemplateLiteral { types: t1 },
            TypeNode::TemplateLiteral { types: t2 },
        ) => all(arena, t1, t2, seen),
        (
            TypeNode::TypeParameter { name: n1 },
            TypeNode::TypeParameter { name: n2 },
        ) => n1 == n2,
        _ => false,
    }
}
