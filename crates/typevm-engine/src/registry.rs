//! Processor registry
//!
//! The cycle breaker for recursive types: while a program is being
//! evaluated, the registry maps it (by `Arc` identity) to the result
//! anchor its processor will fill in. A re-entrant evaluation of the same
//! program returns the anchor instead of recursing, and by the time the
//! outer evaluation finishes the anchor holds the final shape.
//!
//! A registry lives for one top-level evaluation; nested evaluations share
//! it by parameter passing. It also carries the decorator predicate used
//! by intersections to recognize annotation markers.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use typevm_program::PackedProgram;
use typevm_types::{LiteralValue, TypeArena, TypeId, TypeNode};

/// Annotation key used when an intersection collapses to a primitive and
/// its object-shaped candidates are kept as metadata
pub const DEFAULT_ANNOTATION: &str = "default";

/// Recognizer for decorator object literals inside intersections
///
/// Returns the annotation key and the annotation argument types when the
/// given type is a decorator marker.
pub type DecoratorPredicate = fn(&TypeArena, TypeId) -> Option<(String, Vec<TypeId>)>;

/// In-flight map from running program to its result anchor
pub struct ProcessorRegistry {
    active: FxHashMap<usize, TypeId>,
    decorator: DecoratorPredicate,
}

impl ProcessorRegistry {
    /// Create a registry with the built-in decorator predicate
    pub fn new() -> Self {
        Self::with_decorator(meta_annotation)
    }

    /// Create a registry with a custom decorator predicate
    pub fn with_decorator(decorator: DecoratorPredicate) -> Self {
        Self { active: FxHashMap::default(), decorator }
    }

    /// The anchor of an in-flight evaluation of `program`, if any
    pub fn lookup(&self, program: &Arc<PackedProgram>) -> Option<TypeId> {
        self.active.get(&PackedProgram::key(program)).copied()
    }

    /// Mark `program` as in flight with its result anchor
    pub fn register(&mut self, program: &Arc<PackedProgram>, anchor: TypeId) {
        self.active.insert(PackedProgram::key(program), anchor);
    }

    /// Remove `program` after its evaluation completed
    pub fn unregister(&mut self, program: &Arc<PackedProgram>) {
        self.active.remove(&PackedProgram::key(program));
    }

    /// The registered decorator predicate
    pub fn decorator(&self) -> DecoratorPredicate {
        self.decorator
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Built-in decorator predicate
///
/// Recognizes object literals carrying a `__meta` property whose type is a
/// tuple led by a string literal: the literal is the annotation key, the
/// remaining tuple members are the annotation arguments.
pub fn meta_annotation(arena: &TypeArena, id: TypeId) -> Option<(String, Vec<TypeId>)> {
    let TypeNode::ObjectLiteral { members } = arena.node(id) else {
        return None;
    };
    for &member in members {
        let TypeNode::PropertySignature { name, ty, .. } = arena.node(member) else {
            continue;
        };
        if name != "__meta" {
            continue;
        }
        let TypeNode::Tuple { members: parts } = arena.node(*ty) else {
            continue;
        };
        let mut types = parts.iter().map(|&p| match arena.node(p) {
            TypeNode::TupleMember { ty, .. } => *ty,
            _ => p,
        });
        let first = types.next()?;
        if let TypeNode::Literal(LiteralValue::String(key)) = arena.node(first) {
            return Some((key.clone(), types.collect()));
        }
    }
    None
}
