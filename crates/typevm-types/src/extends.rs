//! Structural assignability
//!
//! Implements the `extends` relation used by conditional types: whether the
//! left type is assignable to the right. Distribution of a union on the
//! left-hand side of a conditional is the interpreter's job; this check
//! treats a left union as a whole (every member must be assignable).
//!
//! Inference placeholders on the right-hand side are not compared; matching
//! one records an [`InferBinding`] and the interpreter writes the bound
//! type into the designated frame slot afterwards.

use rustc_hash::FxHashSet;

use crate::arena::{TypeArena, TypeId};
use crate::ty::{LiteralValue, TypeNode};

/// A type bound to an inference slot during an `extends` check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferBinding {
    /// How many frames up the target frame sits
    pub frame_offset: usize,
    /// Local slot index within the target frame
    pub slot: usize,
    /// The bound type
    pub ty: TypeId,
}

/// Check whether `left` is assignable to `right`
///
/// Bindings for matched inference placeholders are appended to `bindings`
/// in match order, including bindings collected on branches that later
/// failed; the caller applies them the way a setter closure would have
/// fired during the walk.
pub fn is_extendable(
    arena: &TypeArena,
    left: TypeId,
    right: TypeId,
    bindings: &mut Vec<InferBinding>,
) -> bool {
    let mut check = ExtendsCheck { arena, bindings, seen: FxHashSet::default() };
    check.check(left, right)
}

struct ExtendsCheck<'a> {
    arena: &'a TypeArena,
    bindings: &'a mut Vec<InferBinding>,
    seen: FxHashSet<(TypeId, TypeId)>,
}

impl ExtendsCheck<'_> {
    fn check(&mut self, left: TypeId, right: TypeId) -> bool {
        if left == right {
            return true;
        }
        // Recursive types: assume a revisited pair holds.
        if !self.seen.insert((left, right)) {
            return true;
        }
        let result = self.check_inner(left, right);
        self.seen.remove(&(left, right));
        result
    }

    fn check_inner(&mut self, left: TypeId, right: TypeId) -> bool {
        if let TypeNode::Infer { frame_offset, slot } = *self.arena.node(right) {
            self.bindings.push(InferBinding { frame_offset, slot, ty: left });
            return true;
        }

        match (self.arena.node(left), self.arena.node(right)) {
            (_, TypeNode::Any) | (_, TypeNode::Unknown) => true,
            (TypeNode::Any, _) => true,
            (TypeNode::Never, _) => true,
            (_, TypeNode::Never) => false,

            // A left union is assignable when every member is.
            (TypeNode::Union { types }, _) => {
                let members = types.clone();
                members.iter().all(|&m| self.check(m, right))
            }
            // A right union accepts any member match.
            (_, TypeNode::Union { types }) => {
                let members = types.clone();
                members.iter().any(|&m| self.check(left, m))
            }

            (TypeNode::Literal(l), TypeNode::Literal(r)) => l == r,
            (TypeNode::Literal(LiteralValue::String(_)), TypeNode::String) => true,
            (TypeNode::Literal(LiteralValue::Number(_)), TypeNode::Number { brand: None }) => true,
            (TypeNode::Literal(LiteralValue::Boolean(_)), TypeNode::Boolean) => true,
            (TypeNode::Literal(LiteralValue::BigInt(_)), TypeNode::BigInt) => true,
            (TypeNode::Literal(LiteralValue::String(s)), TypeNode::TemplateLiteral { types }) => {
                let parts = types.clone();
                let text = s.clone();
                self.template_matches(&text, &parts)
            }

            (TypeNode::String, TypeNode::String)
            | (TypeNode::Boolean, TypeNode::Boolean)
            | (TypeNode::BigInt, TypeNode::BigInt)
            | (TypeNode::Symbol, TypeNode::Symbol)
            | (TypeNode::Regexp, TypeNode::Regexp)
            | (TypeNode::Undefined, TypeNode::Undefined)
            | (TypeNode::Null, TypeNode::Null)
            | (TypeNode::Void, TypeNode::Void)
            | (TypeNode::Undefined, TypeNode::Void) => true,
            // A branded number is still a number; the reverse needs the brand.
            (TypeNode::Number { .. }, TypeNode::Number { brand: None }) => true,
            (TypeNode::Number { brand: l }, TypeNode::Number { brand: r }) => l == r,

            (TypeNode::TemplateLiteral { .. }, TypeNode::String) => true,

            // Everything object-shaped is assignable to `object`.
            (
                TypeNode::ObjectLiteral { .. }
                | TypeNode::Class { .. }
                | TypeNode::Array { .. }
                | TypeNode::Tuple { .. }
                | TypeNode::Function { .. },
                TypeNode::Object,
            ) => true,
            (TypeNode::Object, TypeNode::Object) => true,

            (TypeNode::Array { element: l }, TypeNode::Array { element: r }) => {
                let (l, r) = (*l, *r);
                self.check(l, r)
            }
            (TypeNode::Tuple { members }, TypeNode::Array { element }) => {
                let (members, element) = (members.clone(), *element);
                members.iter().all(|&m| {
                    let ty = self.tuple_member_type(m);
                    self.check(ty, element)
                })
            }
            (TypeNode::Tuple { members: l }, TypeNode::Tuple { members: r }) => {
                let (l, r) = (l.clone(), r.clone());
                self.check_tuples(&l, &r)
            }

            (
                TypeNode::ObjectLiteral { .. } | TypeNode::Class { .. },
                TypeNode::ObjectLiteral { .. } | TypeNode::Class { .. },
            ) => {
                let left_members = self.object_members(left);
                let right_members = self.object_members(right);
                self.check_members(&left_members, &right_members)
            }

            (
                TypeNode::Function { parameters: lp, ret: lr, .. },
                TypeNode::Function { parameters: rp, ret: rr, .. },
            ) => {
                let (lp, lr, rp, rr) = (lp.clone(), *lr, rp.clone(), *rr);
                self.check_signature(&lp, lr, &rp, rr)
            }

            (TypeNode::Promise { ty: l }, TypeNode::Promise { ty: r }) => {
                let (l, r) = (*l, *r);
                self.check(l, r)
            }

            _ => false,
        }
    }

    fn tuple_member_type(&self, id: TypeId) -> TypeId {
        match self.arena.node(id) {
            TypeNode::TupleMember { ty, .. } => *ty,
            TypeNode::Rest { ty } => *ty,
            _ => id,
        }
    }

    fn check_tuples(&mut self, left: &[TypeId], right: &[TypeId]) -> bool {
        // Rest elements on either side degrade to an elementwise check
        // against the rest's inner type.
        let right_rest = right.last().copied().filter(|&m| self.is_rest(m));
        if let Some(rest) = right_rest {
            let fixed = &right[..right.len() - 1];
            if left.len() < fixed.len() {
                return false;
            }
            let rest_ty = self.rest_inner(rest);
            for (i, &l) in left.iter().enumerate() {
                let l_ty = self.tuple_member_type(l);
                let target = if i < fixed.len() {
                    self.tuple_member_type(fixed[i])
                } else {
                    rest_ty
                };
                if !self.check(l_ty, target) {
                    return false;
                }
            }
            return true;
        }
        if left.len() != right.len() {
            // Optional trailing members on the right may be absent.
            let required = right
                .iter()
                .take_while(|&&m| !self.is_optional_member(m))
                .count();
            if left.len() < required || left.len() > right.len() {
                return false;
            }
        }
        left.iter().zip(right).all(|(&l, &r)| {
            let (l_ty, r_ty) = (self.tuple_member_type(l), self.tuple_member_type(r));
            self.check(l_ty, r_ty)
        })
    }

    fn is_rest(&self, id: TypeId) -> bool {
        match self.arena.node(id) {
            TypeNode::Rest { .. } => true,
            TypeNode::TupleMember { ty, .. } => {
                matches!(self.arena.node(*ty), TypeNode::Rest { .. })
            }
            _ => false,
        }
    }

    fn rest_inner(&self, id: TypeId) -> TypeId {
        match self.arena.node(id) {
            TypeNode::Rest { ty } => *ty,
            TypeNode::TupleMember { ty, .. } => match self.arena.node(*ty) {
                TypeNode::Rest { ty } => *ty,
                _ => *ty,
            },
            _ => id,
        }
    }

    fn is_optional_member(&self, id: TypeId) -> bool {
        matches!(
            self.arena.node(id),
            TypeNode::TupleMember { optional: true, .. }
                | TypeNode::Property { optional: true, .. }
                | TypeNode::PropertySignature { optional: true, .. }
        )
    }

    fn object_members(&self, id: TypeId) -> Vec<TypeId> {
        match self.arena.node(id) {
            TypeNode::ObjectLiteral { members } => members.clone(),
            TypeNode::Class { members, .. } => members.clone(),
            _ => Vec::new(),
        }
    }

    /// Width/depth subtyping: every member required by the right side must
    /// be present on the left with an assignable type.
    fn check_members(&mut self, left: &[TypeId], right: &[TypeId]) -> bool {
        for &required in right {
            match self.arena.node(required).clone() {
                TypeNode::Property { name, ty, optional, .. }
                | TypeNode::PropertySignature { name, ty, optional, .. } => {
                    match self.find_property(left, &name) {
                        Some(found) => {
                            if !self.check(found, ty) {
                                return false;
                            }
                        }
                        None if optional => {}
                        None => return false,
                    }
                }
                TypeNode::Method { name, parameters, ret, .. }
                | TypeNode::MethodSignature { name, parameters, ret } => {
                    match self.find_method(left, &name) {
                        Some((lp, lr)) => {
                            if !self.check_signature(&lp, lr, &parameters, ret) {
                                return false;
                            }
                        }
                        None => return false,
                    }
                }
                TypeNode::IndexSignature { ty, .. } => {
                    // Every left property value must satisfy the signature.
                    for &member in left {
                        if let TypeNode::Property { ty: l_ty, .. }
                        | TypeNode::PropertySignature { ty: l_ty, .. } =
                            self.arena.node(member)
                        {
                            let l_ty = *l_ty;
                            if !self.check(l_ty, ty) {
                                return false;
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        true
    }

    fn find_property(&self, members: &[TypeId], name: &str) -> Option<TypeId> {
        members.iter().find_map(|&m| match self.arena.node(m) {
            TypeNode::Property { name: n, ty, .. }
            | TypeNode::PropertySignature { name: n, ty, .. }
                if n == name =>
            {
                Some(*ty)
            }
            _ => None,
        })
    }

    fn find_method(&self, members: &[TypeId], name: &str) -> Option<(Vec<TypeId>, TypeId)> {
        members.iter().find_map(|&m| match self.arena.node(m) {
            TypeNode::Method { name: n, parameters, ret, .. }
            | TypeNode::MethodSignature { name: n, parameters, ret }
                if n == name =>
            {
                Some((parameters.clone(), *ret))
            }
            _ => None,
        })
    }

    /// Parameters are contravariant, the return type covariant.
    fn check_signature(
        &mut self,
        left_params: &[TypeId],
        left_ret: TypeId,
        right_params: &[TypeId],
        right_ret: TypeId,
    ) -> bool {
        if left_params.len() > right_params.len() {
            return false;
        }
        for (&l, &r) in left_params.iter().zip(right_params) {
            let l_ty = self.parameter_type(l);
            let r_ty = self.parameter_type(r);
            if !self.check(r_ty, l_ty) {
                return false;
            }
        }
        self.check(left_ret, right_ret)
    }

    fn parameter_type(&self, id: TypeId) -> TypeId {
        match self.arena.node(id) {
            TypeNode::Parameter { ty, .. } => *ty,
            _ => id,
        }
    }

    /// Anchored backtracking match of a string against template parts.
    fn template_matches(&self, text: &str, parts: &[TypeId]) -> bool {
        self.match_parts(text, parts)
    }

    fn match_parts(&self, text: &str, parts: &[TypeId]) -> bool {
        let Some((&head, rest)) = parts.split_first() else {
            return text.is_empty();
        };
        match self.arena.node(head) {
            TypeNode::Literal(value) => {
                let prefix = value.to_text();
                text.strip_prefix(prefix.as_str())
                    .is_some_and(|remaining| self.match_parts(remaining, rest))
            }
            TypeNode::String => {
                // A string placeholder matches any prefix, including empty.
                (0..=text.len())
                    .filter(|&end| text.is_char_boundary(end))
                    .any(|end| self.match_parts(&text[end..], rest))
            }
            TypeNode::Number { .. } | TypeNode::BigInt => (1..=text.len())
                .filter(|&end| text.is_char_boundary(end))
                .filter(|&end| is_numeric_text(&text[..end]))
                .any(|end| self.match_parts(&text[end..], rest)),
            TypeNode::Boolean => ["true", "false"]
                .iter()
                .any(|lit| {
                    text.strip_prefix(lit)
                        .is_some_and(|remaining| self.match_parts(remaining, rest))
                }),
            _ => false,
        }
    }
}

fn is_numeric_text(text: &str) -> bool {
    !text.is_empty() && text.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{Type, Visibility};

    fn property(arena: &mut TypeArena, name: &str, ty: TypeId) -> TypeId {
        arena.alloc(Type::new(TypeNode::PropertySignature {
            name: name.to_string(),
            ty,
            optional: false,
            readonly: false,
            description: None,
        }))
    }

    #[test]
    fn test_literal_extends_primitive() {
        let mut arena = TypeArena::new();
        let lit = arena.string_literal("a");
        let string = arena.string();
        let number = arena.number();
        let mut bindings = Vec::new();

        assert!(is_extendable(&arena, lit, string, &mut bindings));
        assert!(!is_extendable(&arena, lit, number, &mut bindings));
        assert!(!is_extendable(&arena, string, lit, &mut bindings));
    }

    #[test]
    fn test_never_and_tops() {
        let mut arena = TypeArena::new();
        let never = arena.never();
        let string = arena.string();
        let unknown = arena.alloc(Type::new(TypeNode::Unknown));
        let mut bindings = Vec::new();

        assert!(is_extendable(&arena, never, string, &mut bindings));
        assert!(is_extendable(&arena, string, unknown, &mut bindings));
        assert!(!is_extendable(&arena, string, never, &mut bindings));
    }

    #[test]
    fn test_union_both_sides() {
        let mut arena = TypeArena::new();
        let a = arena.string_literal("a");
        let b = arena.string_literal("b");
        let string = arena.string();
        let ab = arena.alloc(Type::new(TypeNode::Union { types: vec![a, b] }));
        let mut bindings = Vec::new();

        // 'a' | 'b' extends string
        assert!(is_extendable(&arena, ab, string, &mut bindings));
        // 'a' extends 'a' | 'b'
        assert!(is_extendable(&arena, a, ab, &mut bindings));
        // string does not extend 'a' | 'b'
        assert!(!is_extendable(&arena, string, ab, &mut bindings));
    }

    #[test]
    fn test_object_width_subtyping() {
        let mut arena = TypeArena::new();
        let string = arena.string();
        let number = arena.number();
        let a = property(&mut arena, "a", string);
        let b = property(&mut arena, "b", number);
        let wide = arena.alloc(Type::new(TypeNode::ObjectLiteral { members: vec![a, b] }));
        let a2 = property(&mut arena, "a", string);
        let narrow = arena.alloc(Type::new(TypeNode::ObjectLiteral { members: vec![a2] }));
        let mut bindings = Vec::new();

        assert!(is_extendable(&arena, wide, narrow, &mut bindings));
        assert!(!is_extendable(&arena, narrow, wide, &mut bindings));
    }

    #[test]
    fn test_class_extends_object_literal_structurally() {
        let mut arena = TypeArena::new();
        let string = arena.string();
        let p = arena.alloc(Type::new(TypeNode::Property {
            name: "name".to_string(),
            ty: string,
            optional: false,
            readonly: false,
            visibility: Visibility::Public,
            is_abstract: false,
            description: None,
            default: None,
        }));
        let class = arena.alloc(Type::new(TypeNode::Class {
            name: Some("User".to_string()),
            handle: None,
            members: vec![p],
            arguments: None,
        }));
        let p2 = property(&mut arena, "name", string);
        let shape = arena.alloc(Type::new(TypeNode::ObjectLiteral { members: vec![p2] }));
        let mut bindings = Vec::new();

        assert!(is_extendable(&arena, class, shape, &mut bindings));
    }

    #[test]
    fn test_tuple_extends_array() {
        let mut arena = TypeArena::new();
        let one = arena.literal(LiteralValue::Number(1.0));
        let two = arena.literal(LiteralValue::Number(2.0));
        let m1 = arena.alloc(Type::new(TypeNode::TupleMember {
            ty: one,
            optional: false,
            name: None,
        }));
        let m2 = arena.alloc(Type::new(TypeNode::TupleMember {
            ty: two,
            optional: false,
            name: None,
        }));
        let tuple = arena.alloc(Type::new(TypeNode::Tuple { members: vec![m1, m2] }));
        let number = arena.number();
        let string = arena.string();
        let numbers = arena.alloc(Type::new(TypeNode::Array { element: number }));
        let strings = arena.alloc(Type::new(TypeNode::Array { element: string }));
        let mut bindings = Vec::new();

        assert!(is_extendable(&arena, tuple, numbers, &mut bindings));
        assert!(!is_extendable(&arena, tuple, strings, &mut bindings));
    }

    #[test]
    fn test_infer_binds_left_type() {
        let mut arena = TypeArena::new();
        let string = arena.string();
        let m = arena.alloc(Type::new(TypeNode::TupleMember {
            ty: string,
            optional: false,
            name: None,
        }));
        let tuple = arena.alloc(Type::new(TypeNode::Tuple { members: vec![m] }));
        let infer = arena.alloc(Type::new(TypeNode::Infer { frame_offset: 0, slot: 0 }));
        let infer_member = arena.alloc(Type::new(TypeNode::TupleMember {
            ty: infer,
            optional: false,
            name: None,
        }));
        let pattern = arena.alloc(Type::new(TypeNode::Tuple { members: vec![infer_member] }));
        let mut bindings = Vec::new();

        assert!(is_extendable(&arena, tuple, pattern, &mut bindings));
        assert_eq!(bindings, vec![InferBinding { frame_offset: 0, slot: 0, ty: string }]);
    }

    #[test]
    fn test_function_variance() {
        let mut arena = TypeArena::new();
        let string = arena.string();
        let never = arena.never();
        let unknown = arena.alloc(Type::new(TypeNode::Unknown));

        // (unknown) => never extends (string) => unknown
        let f1 = arena.alloc(Type::new(TypeNode::Function {
            name: None,
            parameters: vec![unknown],
            ret: never,
        }));
        let f2 = arena.alloc(Type::new(TypeNode::Function {
            name: None,
            parameters: vec![string],
            ret: unknown,
        }));
        let mut bindings = Vec::new();

        assert!(is_extendable(&arena, f1, f2, &mut bindings));
        assert!(!is_extendable(&arena, f2, f1, &mut bindings));
    }

    #[test]
    fn test_template_literal_match() {
        let mut arena = TypeArena::new();
        let prefix = arena.string_literal("id-");
        let number = arena.number();
        let template = arena.alloc(Type::new(TypeNode::TemplateLiteral {
            types: vec![prefix, number],
        }));
        let hit = arena.string_literal("id-42");
        let miss = arena.string_literal("id-x");
        let plain = arena.string_literal("other");
        let mut bindings = Vec::new();

        assert!(is_extendable(&arena, hit, template, &mut bindings));
        assert!(!is_extendable(&arena, miss, template, &mut bindings));
        assert!(!is_extendable(&arena, plain, template, &mut bindings));
    }
}
