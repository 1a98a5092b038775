//! Public resolution entry points
//!
//! [`resolve_program`] is the recursion point shared by the processor's
//! cross-program opcodes: it consults the registry, pre-allocates the
//! result anchor, runs a processor, and narrows the result.
//! [`TypeResolver`] wraps it with an owned arena and a per-program result
//! cache for callers.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use typevm_program::{ClassHandle, PackedProgram};
use typevm_types::{narrow_original_literal, TypeArena, TypeId, TypeNode};

use crate::error::ProcessorError;
use crate::processor::Processor;
use crate::registry::{DecoratorPredicate, ProcessorRegistry};

/// Evaluate a packed program to a type
///
/// Consults the registry first: a hit means the program is already being
/// evaluated higher up the call chain, and its in-flight result anchor is
/// returned instead of recursing. On a miss the anchor is registered
/// before the run and unregistered after, whether the run succeeded or
/// not.
pub fn resolve_program(
    program: &Arc<PackedProgram>,
    inputs: Vec<TypeId>,
    arena: &mut TypeArena,
    registry: &mut ProcessorRegistry,
) -> Result<TypeId, ProcessorError> {
    if program.is_empty() {
        return Ok(arena.never());
    }
    if let Some(anchor) = registry.lookup(program) {
        return Ok(anchor);
    }

    let anchor = arena.any();
    registry.register(program, anchor);
    let processor = Processor::new(arena, registry, Arc::clone(program), anchor);
    let result = processor.run(Vec::new(), inputs);
    registry.unregister(program);

    let id = result?;
    Ok(narrow_original_literal(arena, id))
}

/// Owned evaluation context: arena, decorator predicate, result cache
///
/// A resolver is single-threaded; parallel use requires independent
/// resolvers with disjoint arenas. The registry that breaks recursion
/// cycles is created fresh per top-level call and shared only with the
/// nested evaluations it spawns.
pub struct TypeResolver {
    arena: TypeArena,
    decorator: DecoratorPredicate,
    cache: FxHashMap<usize, (Arc<PackedProgram>, TypeId)>,
}

impl TypeResolver {
    /// Create a resolver with the built-in decorator predicate
    pub fn new() -> Self {
        Self {
            arena: TypeArena::new(),
            decorator: crate::registry::meta_annotation,
            cache: FxHashMap::default(),
        }
    }

    /// Create a resolver with a custom decorator predicate
    pub fn with_decorator(decorator: DecoratorPredicate) -> Self {
        Self { arena: TypeArena::new(), decorator, cache: FxHashMap::default() }
    }

    /// The arena holding every type this resolver produced
    pub fn arena(&self) -> &TypeArena {
        &self.arena
    }

    /// Allocate a type argument for an upcoming resolution
    pub fn arena_mut(&mut self) -> &mut TypeArena {
        &mut self.arena
    }

    /// Evaluate a packed program with the given type arguments
    ///
    /// Zero-argument resolutions are cached by program identity: the
    /// second call returns the identical node.
    pub fn resolve_type(
        &mut self,
        program: &Arc<PackedProgram>,
        args: Vec<TypeId>,
    ) -> Result<TypeId, ProcessorError> {
        let cacheable = args.is_empty();
        if cacheable {
            if let Some((_, id)) = self.cache.get(&PackedProgram::key(program)) {
                return Ok(*id);
            }
        }
        let mut registry = ProcessorRegistry::with_decorator(self.decorator);
        let id = resolve_program(program, args, &mut self.arena, &mut registry)?;
        if cacheable {
            self.cache
                .insert(PackedProgram::key(program), (Arc::clone(program), id));
        }
        Ok(id)
    }

    /// Evaluate the program embedded in a class handle
    ///
    /// A handle without an embedded program yields a bare class node
    /// carrying only the class name.
    pub fn resolve_type_of(
        &mut self,
        handle: &Arc<ClassHandle>,
        args: Vec<TypeId>,
    ) -> Result<TypeId, ProcessorError> {
        match &handle.type_program {
            Some(program) => {
                let program = Arc::clone(program);
                self.resolve_type(&program, args)
            }
            None => Ok(self.arena.alloc(typevm_types::Type::new(TypeNode::Class {
                name: Some(handle.name.clone()),
                handle: Some(Arc::clone(handle)),
                members: Vec::new(),
                arguments: if args.is_empty() { None } else { Some(args) },
            }))),
        }
    }
}

impl Default for TypeResolver {
    fn default() -> Self {
        Self::new()
    }
}
