//! End-to-end resolution tests
//!
//! Programs are assembled by hand: opcodes encode as `code + 33`
//! characters in the trailing pool string, the way the transformer emits
//! them.

use std::sync::Arc;

use typevm_engine::{ProcessorError, TypeResolver};
use typevm_program::{ClassHandle, PackedProgram, PoolEntry, ReflectionOp, RuntimeValue};
use typevm_types::{LiteralValue, Type, TypeId, TypeNode, Visibility};

fn encode(ops: &[usize]) -> String {
    ops.iter()
        .map(|&o| char::from_u32(o as u32 + 33).unwrap())
        .collect()
}

fn program(pool: Vec<PoolEntry>, ops: &[usize]) -> Arc<PackedProgram> {
    let mut entries = pool;
    entries.push(PoolEntry::String(encode(ops)));
    PackedProgram::new(entries)
}

const fn op(o: ReflectionOp) -> usize {
    o as usize
}

fn class_members(resolver: &TypeResolver, id: TypeId) -> Vec<TypeId> {
    match resolver.arena().node(id) {
        TypeNode::Class { members, .. } => members.clone(),
        other => panic!("expected class, got {other:?}"),
    }
}

#[test]
fn test_class_with_string_property() {
    // class Entity { p: string }
    let p = program(
        vec![PoolEntry::String("p".to_string())],
        &[
            op(ReflectionOp::Frame),
            op(ReflectionOp::String),
            op(ReflectionOp::Property),
            0,
            op(ReflectionOp::Class),
        ],
    );
    let mut resolver = TypeResolver::new();
    let id = resolver.resolve_type(&p, Vec::new()).unwrap();

    let members = class_members(&resolver, id);
    assert_eq!(members.len(), 1);
    match resolver.arena().node(members[0]) {
        TypeNode::Property { name, ty, visibility, optional, .. } => {
            assert_eq!(name, "p");
            assert_eq!(*visibility, Visibility::Public);
            assert!(!optional);
            assert!(matches!(resolver.arena().node(*ty), TypeNode::String));
        }
        other => panic!("expected property, got {other:?}"),
    }
}

#[test]
fn test_class_with_optional_literal_array_property() {
    // class Entity { p?: ('a' | 'b')[] }
    let p = program(
        vec![
            PoolEntry::String("a".to_string()),
            PoolEntry::String("b".to_string()),
            PoolEntry::String("p".to_string()),
        ],
        &[
            op(ReflectionOp::Frame),
            op(ReflectionOp::Frame),
            op(ReflectionOp::Literal),
            0,
            op(ReflectionOp::Literal),
            1,
            op(ReflectionOp::Union),
            op(ReflectionOp::Array),
            op(ReflectionOp::Property),
            2,
            op(ReflectionOp::Optional),
            op(ReflectionOp::Class),
        ],
    );
    let mut resolver = TypeResolver::new();
    let id = resolver.resolve_type(&p, Vec::new()).unwrap();

    let members = class_members(&resolver, id);
    let TypeNode::Property { name, ty, optional, .. } = resolver.arena().node(members[0]) else {
        panic!("expected property");
    };
    assert_eq!(name, "p");
    assert!(optional);
    let TypeNode::Array { element } = resolver.arena().node(*ty) else {
        panic!("expected array property");
    };
    let TypeNode::Union { types } = resolver.arena().node(*element) else {
        panic!("expected union element");
    };
    let literals: Vec<_> = types
        .iter()
        .map(|&t| match resolver.arena().node(t) {
            TypeNode::Literal(LiteralValue::String(s)) => s.clone(),
            other => panic!("expected literal, got {other:?}"),
        })
        .collect();
    assert_eq!(literals, vec!["a", "b"]);
}

#[test]
fn test_generic_container_instantiation() {
    // class Container<T> { data: T } with [string]
    let p = program(
        vec![
            PoolEntry::String("T".to_string()),
            PoolEntry::String("data".to_string()),
        ],
        &[
            op(ReflectionOp::TypeParameter),
            0,
            op(ReflectionOp::Frame),
            op(ReflectionOp::Loads),
            1,
            0,
            op(ReflectionOp::Property),
            1,
            op(ReflectionOp::Class),
        ],
    );
    let mut resolver = TypeResolver::new();
    let string = resolver.arena_mut().string();
    let id = resolver.resolve_type(&p, vec![string]).unwrap();

    match resolver.arena().node(id) {
        TypeNode::Class { arguments, members, .. } => {
            assert_eq!(arguments.as_deref(), Some(&[string][..]));
            let TypeNode::Property { name, ty, .. } = resolver.arena().node(members[0]) else {
                panic!("expected property");
            };
            assert_eq!(name, "data");
            assert_eq!(*ty, string);
        }
        other => panic!("expected class, got {other:?}"),
    }
}

/// `class Container<T> { data: T extends boolean ? number : never }`
fn conditional_container() -> Arc<PackedProgram> {
    program(
        vec![
            PoolEntry::String("T".to_string()),
            PoolEntry::String("data".to_string()),
        ],
        &[
            op(ReflectionOp::Jump),
            15,
            // Conditional subprogram: candidate extends boolean?
            op(ReflectionOp::Loads),
            1,
            0,
            op(ReflectionOp::Boolean),
            op(ReflectionOp::Extends),
            op(ReflectionOp::JumpCondition),
            11,
            13,
            op(ReflectionOp::Return),
            op(ReflectionOp::Number),
            op(ReflectionOp::Return),
            op(ReflectionOp::Never),
            op(ReflectionOp::Return),
            // Main program.
            op(ReflectionOp::TypeParameter),
            0,
            op(ReflectionOp::Frame),
            op(ReflectionOp::Loads),
            1,
            0,
            op(ReflectionOp::Distribute),
            2,
            op(ReflectionOp::Property),
            1,
            op(ReflectionOp::Class),
        ],
    )
}

#[test]
fn test_conditional_type_selects_branch() {
    let p = conditional_container();
    let mut resolver = TypeResolver::new();
    let boolean = resolver.arena_mut().boolean();
    let id = resolver.resolve_type(&p, vec![boolean]).unwrap();

    let members = class_members(&resolver, id);
    let TypeNode::Property { ty, .. } = resolver.arena().node(members[0]) else {
        panic!("expected property");
    };
    assert!(matches!(resolver.arena().node(*ty), TypeNode::Number { .. }));
}

#[test]
fn test_conditional_type_false_branch_is_never() {
    let p = conditional_container();
    let mut resolver = TypeResolver::new();
    let string = resolver.arena_mut().string();
    let id = resolver.resolve_type(&p, vec![string]).unwrap();

    let members = class_members(&resolver, id);
    let TypeNode::Property { ty, .. } = resolver.arena().node(members[0]) else {
        panic!("expected property");
    };
    assert!(resolver.arena().get(*ty).is_never());
}

#[test]
fn test_distribution_over_union_members() {
    // T extends U ? 1 : 0 with T = 'a' | 'b', U = string
    let p = program(
        vec![
            PoolEntry::String("T".to_string()),
            PoolEntry::String("U".to_string()),
            PoolEntry::Number(1.0),
            PoolEntry::Number(0.0),
        ],
        &[
            op(ReflectionOp::Jump),
            19,
            // Conditional subprogram.
            op(ReflectionOp::Loads),
            1,
            0,
            op(ReflectionOp::Loads),
            2,
            1,
            op(ReflectionOp::Extends),
            op(ReflectionOp::JumpCondition),
            13,
            16,
            op(ReflectionOp::Return),
            op(ReflectionOp::Literal),
            2,
            op(ReflectionOp::Return),
            op(ReflectionOp::Literal),
            3,
            op(ReflectionOp::Return),
            // Main program.
            op(ReflectionOp::TypeParameter),
            0,
            op(ReflectionOp::TypeParameter),
            1,
            op(ReflectionOp::Frame),
            op(ReflectionOp::Loads),
            1,
            0,
            op(ReflectionOp::Distribute),
            2,
            op(ReflectionOp::MoveFrame),
        ],
    );
    let mut resolver = TypeResolver::new();
    let a = resolver.arena_mut().string_literal("a");
    let b = resolver.arena_mut().string_literal("b");
    let t = resolver
        .arena_mut()
        .alloc(Type::new(TypeNode::Union { types: vec![a, b] }));
    let u = resolver.arena_mut().string();
    let id = resolver.resolve_type(&p, vec![t, u]).unwrap();

    // Both members select the true branch; identical results collapse and
    // the single-member union unboxes.
    match resolver.arena().node(id) {
        TypeNode::Literal(LiteralValue::Number(n)) => assert_eq!(*n, 1.0),
        other => panic!("expected literal 1, got {other:?}"),
    }
}

#[test]
fn test_recursive_type_shares_identity() {
    // interface Tree { value: number; children: Tree[] }
    let p = program(
        vec![
            PoolEntry::Number(0.0),
            PoolEntry::String("value".to_string()),
            PoolEntry::String("children".to_string()),
        ],
        &[
            op(ReflectionOp::Frame),
            op(ReflectionOp::Number),
            op(ReflectionOp::PropertySignature),
            1,
            op(ReflectionOp::Inline),
            0,
            op(ReflectionOp::Array),
            op(ReflectionOp::PropertySignature),
            2,
            op(ReflectionOp::ObjectLiteral),
        ],
    );
    let mut resolver = TypeResolver::new();
    let id = resolver.resolve_type(&p, Vec::new()).unwrap();

    let TypeNode::ObjectLiteral { members } = resolver.arena().node(id) else {
        panic!("expected object literal");
    };
    assert_eq!(members.len(), 2);
    let TypeNode::PropertySignature { name, ty, .. } = resolver.arena().node(members[1]) else {
        panic!("expected property signature");
    };
    assert_eq!(name, "children");
    let TypeNode::Array { element } = resolver.arena().node(*ty) else {
        panic!("expected array");
    };
    // The self-reference and the outer result are the same node.
    assert_eq!(*element, id);
}

#[test]
fn test_optional_reduction_from_undefined_union() {
    // { p: string | undefined } becomes { p?: string }
    let p = program(
        vec![PoolEntry::String("p".to_string())],
        &[
            op(ReflectionOp::Frame),
            op(ReflectionOp::Frame),
            op(ReflectionOp::String),
            op(ReflectionOp::Undefined),
            op(ReflectionOp::Union),
            op(ReflectionOp::PropertySignature),
            0,
            op(ReflectionOp::ObjectLiteral),
        ],
    );
    let mut resolver = TypeResolver::new();
    let id = resolver.resolve_type(&p, Vec::new()).unwrap();

    let TypeNode::ObjectLiteral { members } = resolver.arena().node(id) else {
        panic!("expected object literal");
    };
    let TypeNode::PropertySignature { name, ty, optional, .. } =
        resolver.arena().node(members[0])
    else {
        panic!("expected property signature");
    };
    assert_eq!(name, "p");
    assert!(optional);
    assert!(matches!(resolver.arena().node(*ty), TypeNode::String));
}

#[test]
fn test_union_flattening_and_unboxing() {
    // 'a' | ('b' | 'c') has all three as direct members.
    let p = program(
        vec![
            PoolEntry::String("a".to_string()),
            PoolEntry::String("b".to_string()),
            PoolEntry::String("c".to_string()),
        ],
        &[
            op(ReflectionOp::Frame),
            op(ReflectionOp::Literal),
            0,
            op(ReflectionOp::Frame),
            op(ReflectionOp::Literal),
            1,
            op(ReflectionOp::Literal),
            2,
            op(ReflectionOp::Union),
            op(ReflectionOp::Union),
        ],
    );
    let mut resolver = TypeResolver::new();
    let id = resolver.resolve_type(&p, Vec::new()).unwrap();

    let TypeNode::Union { types } = resolver.arena().node(id) else {
        panic!("expected union");
    };
    assert_eq!(types.len(), 3);
    for &member in types {
        assert!(matches!(resolver.arena().node(member), TypeNode::Literal(_)));
    }
}

#[test]
fn test_literal_preservation() {
    let p = program(
        vec![PoolEntry::Number(42.0)],
        &[op(ReflectionOp::Literal), 0],
    );
    let mut resolver = TypeResolver::new();
    let id = resolver.resolve_type(&p, Vec::new()).unwrap();
    match resolver.arena().node(id) {
        TypeNode::Literal(LiteralValue::Number(n)) => assert_eq!(*n, 42.0),
        other => panic!("expected literal, got {other:?}"),
    }
}

#[test]
fn test_idempotent_resolution_with_cache() {
    let p = program(
        vec![PoolEntry::String("p".to_string())],
        &[
            op(ReflectionOp::Frame),
            op(ReflectionOp::String),
            op(ReflectionOp::Property),
            0,
            op(ReflectionOp::Class),
        ],
    );
    let mut resolver = TypeResolver::new();
    let first = resolver.resolve_type(&p, Vec::new()).unwrap();
    let second = resolver.resolve_type(&p, Vec::new()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_constructor_parameter_projection() {
    // class Entity { constructor(public name: string, age: number) {} }
    let p = program(
        vec![
            PoolEntry::String("constructor".to_string()),
            PoolEntry::String("name".to_string()),
            PoolEntry::String("age".to_string()),
        ],
        &[
            op(ReflectionOp::Frame),
            op(ReflectionOp::Frame),
            op(ReflectionOp::String),
            op(ReflectionOp::Parameter),
            1,
            op(ReflectionOp::Public),
            op(ReflectionOp::Number),
            op(ReflectionOp::Parameter),
            2,
            op(ReflectionOp::Void),
            op(ReflectionOp::Method),
            0,
            op(ReflectionOp::Class),
        ],
    );
    let mut resolver = TypeResolver::new();
    let id = resolver.resolve_type(&p, Vec::new()).unwrap();

    let members = class_members(&resolver, id);
    assert_eq!(members.len(), 2);
    assert!(matches!(
        resolver.arena().node(members[0]),
        TypeNode::Method { name, .. } if name == "constructor"
    ));
    match resolver.arena().node(members[1]) {
        TypeNode::Property { name, ty, visibility, .. } => {
            assert_eq!(name, "name");
            assert_eq!(*visibility, Visibility::Public);
            assert!(matches!(resolver.arena().node(*ty), TypeNode::String));
        }
        other => panic!("expected projected property, got {other:?}"),
    }
}

#[test]
fn test_constructor_projection_covers_all_visibilities() {
    // class Entity { constructor(protected a: string, private b: number) {} }
    let p = program(
        vec![
            PoolEntry::String("constructor".to_string()),
            PoolEntry::String("a".to_string()),
            PoolEntry::String("b".to_string()),
        ],
        &[
            op(ReflectionOp::Frame),
            op(ReflectionOp::Frame),
            op(ReflectionOp::String),
            op(ReflectionOp::Parameter),
            1,
            op(ReflectionOp::Protected),
            op(ReflectionOp::Number),
            op(ReflectionOp::Parameter),
            2,
            op(ReflectionOp::Private),
            op(ReflectionOp::Void),
            op(ReflectionOp::Method),
            0,
            op(ReflectionOp::Class),
        ],
    );
    let mut resolver = TypeResolver::new();
    let id = resolver.resolve_type(&p, Vec::new()).unwrap();

    let members = class_members(&resolver, id);
    assert_eq!(members.len(), 3);
    match resolver.arena().node(members[1]) {
        TypeNode::Property { name, visibility, .. } => {
            assert_eq!(name, "a");
            assert_eq!(*visibility, Visibility::Protected);
        }
        other => panic!("expected projected property, got {other:?}"),
    }
    match resolver.arena().node(members[2]) {
        TypeNode::Property { name, visibility, .. } => {
            assert_eq!(name, "b");
            assert_eq!(*visibility, Visibility::Private);
        }
        other => panic!("expected projected property, got {other:?}"),
    }
}

#[test]
fn test_inline_call_instantiates_nested_program() {
    let container = program(
        vec![
            PoolEntry::String("T".to_string()),
            PoolEntry::String("data".to_string()),
        ],
        &[
            op(ReflectionOp::TypeParameter),
            0,
            op(ReflectionOp::Frame),
            op(ReflectionOp::Loads),
            1,
            0,
            op(ReflectionOp::Property),
            1,
            op(ReflectionOp::Class),
        ],
    );
    let caller = program(
        vec![PoolEntry::Program(Arc::clone(&container))],
        &[
            op(ReflectionOp::String),
            op(ReflectionOp::InlineCall),
            0,
            1,
        ],
    );
    let mut resolver = TypeResolver::new();
    let id = resolver.resolve_type(&caller, Vec::new()).unwrap();

    let members = class_members(&resolver, id);
    let TypeNode::Property { name, ty, .. } = resolver.arena().node(members[0]) else {
        panic!("expected property");
    };
    assert_eq!(name, "data");
    assert!(matches!(resolver.arena().node(*ty), TypeNode::String));
}

#[test]
fn test_class_reference_resolves_embedded_program() {
    let entity = program(
        vec![PoolEntry::String("p".to_string())],
        &[
            op(ReflectionOp::Frame),
            op(ReflectionOp::String),
            op(ReflectionOp::Property),
            0,
            op(ReflectionOp::Class),
        ],
    );
    let handle = ClassHandle::with_program("Entity", Arc::clone(&entity));
    let thunk_handle = Arc::clone(&handle);
    let referencing = program(
        vec![PoolEntry::Class(Arc::new(move || Ok(Arc::clone(&thunk_handle))))],
        &[
            op(ReflectionOp::Frame),
            op(ReflectionOp::ClassReference),
            0,
        ],
    );
    let mut resolver = TypeResolver::new();
    let id = resolver.resolve_type(&referencing, Vec::new()).unwrap();
    assert_eq!(class_members(&resolver, id).len(), 1);
}

#[test]
fn test_class_reference_failure_reports_pool_index() {
    let referencing = program(
        vec![PoolEntry::Class(Arc::new(|| Err("not linked".to_string())))],
        &[
            op(ReflectionOp::Frame),
            op(ReflectionOp::ClassReference),
            0,
        ],
    );
    let mut resolver = TypeResolver::new();
    let err = resolver
        .resolve_type(&referencing, Vec::new())
        .expect_err("thunk fails");
    match err {
        ProcessorError::ClassResolution { pool_index, message, .. } => {
            assert_eq!(pool_index, 0);
            assert_eq!(message, "not linked");
        }
        other => panic!("expected class resolution failure, got {other}"),
    }
}

#[test]
fn test_resolve_type_of_handle() {
    let entity = program(
        vec![PoolEntry::String("p".to_string())],
        &[
            op(ReflectionOp::Frame),
            op(ReflectionOp::String),
            op(ReflectionOp::Property),
            0,
            op(ReflectionOp::Class),
        ],
    );
    let mut resolver = TypeResolver::new();

    let linked = ClassHandle::with_program("Entity", entity);
    let id = resolver.resolve_type_of(&linked, Vec::new()).unwrap();
    assert_eq!(class_members(&resolver, id).len(), 1);

    let bare = ClassHandle::new("Untyped");
    let id = resolver.resolve_type_of(&bare, Vec::new()).unwrap();
    match resolver.arena().node(id) {
        TypeNode::Class { name, members, .. } => {
            assert_eq!(name.as_deref(), Some("Untyped"));
            assert!(members.is_empty());
        }
        other => panic!("expected bare class, got {other:?}"),
    }
}

#[test]
fn test_typeof_narrows_to_original_literal() {
    let p = program(
        vec![PoolEntry::Value(Arc::new(|| RuntimeValue::from("abc")))],
        &[op(ReflectionOp::Typeof), 0],
    );
    let mut resolver = TypeResolver::new();
    let id = resolver.resolve_type(&p, Vec::new()).unwrap();
    match resolver.arena().node(id) {
        TypeNode::Literal(LiteralValue::String(s)) => assert_eq!(s, "abc"),
        other => panic!("expected literal, got {other:?}"),
    }
}

#[test]
fn test_infer_binds_through_extends() {
    // type ExtractU<T> = T extends [infer U] ? U : never, T = [string]
    let p = program(
        vec![PoolEntry::String("T".to_string())],
        &[
            op(ReflectionOp::Jump),
            23,
            // Conditional subprogram.
            op(ReflectionOp::Var),
            op(ReflectionOp::Loads),
            1,
            0,
            op(ReflectionOp::Frame),
            op(ReflectionOp::Infer),
            0,
            0,
            op(ReflectionOp::TupleMember),
            op(ReflectionOp::Tuple),
            op(ReflectionOp::Extends),
            op(ReflectionOp::JumpCondition),
            17,
            21,
            op(ReflectionOp::Return),
            op(ReflectionOp::Loads),
            1,
            0,
            op(ReflectionOp::Return),
            op(ReflectionOp::Never),
            op(ReflectionOp::Return),
            // Main program.
            op(ReflectionOp::TypeParameter),
            0,
            op(ReflectionOp::Frame),
            op(ReflectionOp::Loads),
            1,
            0,
            op(ReflectionOp::Distribute),
            2,
            op(ReflectionOp::MoveFrame),
        ],
    );
    let mut resolver = TypeResolver::new();
    let string = resolver.arena_mut().string();
    let member = resolver.arena_mut().alloc(Type::new(TypeNode::TupleMember {
        ty: string,
        optional: false,
        name: None,
    }));
    let tuple = resolver
        .arena_mut()
        .alloc(Type::new(TypeNode::Tuple { members: vec![member] }));
    let id = resolver.resolve_type(&p, vec![tuple]).unwrap();

    assert_eq!(id, string);
}
