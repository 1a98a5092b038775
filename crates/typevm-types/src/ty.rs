//! Core type node definitions
//!
//! Every type produced by the processor is a `Type`: a kind-specific
//! `TypeNode` plus the cross-cutting fields all nodes may carry (type name,
//! annotations, decorators, literal origin). Nodes reference each other by
//! `TypeId` into a [`TypeArena`](crate::arena::TypeArena).

use std::sync::Arc;

use rustc_hash::FxHashMap;
use typevm_program::ClassHandle;

use crate::arena::{TypeArena, TypeId};

/// A literal type value
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// String literal
    String(String),
    /// Number literal
    Number(f64),
    /// Boolean literal
    Boolean(bool),
    /// Bigint literal
    BigInt(i64),
    /// Regular expression literal
    Regex {
        /// Pattern source without delimiters
        pattern: String,
        /// Flag characters
        flags: String,
    },
}

impl LiteralValue {
    /// Render the literal the way it appears inside a template literal
    pub fn to_text(&self) -> String {
        match self {
            LiteralValue::String(v) => v.clone(),
            LiteralValue::Number(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    format!("{}", *v as i64)
                } else {
                    format!("{v}")
                }
            }
            LiteralValue::Boolean(v) => format!("{v}"),
            LiteralValue::BigInt(v) => format!("{v}"),
            LiteralValue::Regex { pattern, flags } => format!("/{pattern}/{flags}"),
        }
    }
}

/// Number type brands, in transformer operand order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberBrand {
    /// Arbitrary integer
    Integer,
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 8-bit unsigned integer
    Uint8,
    /// 16-bit unsigned integer
    Uint16,
    /// 32-bit unsigned integer
    Uint32,
    /// Double-precision float
    Float,
    /// Single-precision float
    Float32,
    /// Double-precision float, explicit width
    Float64,
}

impl NumberBrand {
    /// Decode a brand from its operand index
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Integer),
            1 => Some(Self::Int8),
            2 => Some(Self::Int16),
            3 => Some(Self::Int32),
            4 => Some(Self::Uint8),
            5 => Some(Self::Uint16),
            6 => Some(Self::Uint32),
            7 => Some(Self::Float),
            8 => Some(Self::Float32),
            9 => Some(Self::Float64),
            _ => None,
        }
    }
}

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Public member
    Public,
    /// Protected member
    Protected,
    /// Private member
    Private,
}

/// A computed enum member value
#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    /// Numeric member (explicit or auto-incremented)
    Number(f64),
    /// String member
    String(String),
}

/// Kind-specific type data
#[derive(Debug, Clone)]
pub enum TypeNode {
    /// The bottom type
    Never,
    /// The dynamic top type
    Any,
    /// The safe top type
    Unknown,
    /// The `void` type
    Void,
    /// The non-primitive `object` type
    Object,
    /// The `undefined` type
    Undefined,
    /// The `null` type
    Null,
    /// The `string` type
    String,
    /// The `number` type, optionally branded with a width
    Number {
        /// Width/integer brand, if any
        brand: Option<NumberBrand>,
    },
    /// The `boolean` type
    Boolean,
    /// The `bigint` type
    BigInt,
    /// The `symbol` type
    Symbol,
    /// The `RegExp` type
    Regexp,
    /// A literal type
    Literal(LiteralValue),
    /// A union of types
    Union {
        /// Members, flattened on construction
        types: Vec<TypeId>,
    },
    /// An intersection of types
    Intersection {
        /// Members, flattened on construction
        types: Vec<TypeId>,
    },
    /// An array type
    Array {
        /// Element type
        element: TypeId,
    },
    /// A tuple type
    Tuple {
        /// Tuple member nodes
        members: Vec<TypeId>,
    },
    /// A tuple member
    TupleMember {
        /// Member type
        ty: TypeId,
        /// Whether the member is optional
        optional: bool,
        /// Member name, for named tuples
        name: Option<String>,
    },
    /// A rest element
    Rest {
        /// Inner type
        ty: TypeId,
    },
    /// An object literal type
    ObjectLiteral {
        /// Property signatures, method signatures, and index signatures
        members: Vec<TypeId>,
    },
    /// A class type
    Class {
        /// Class name, for diagnostics
        name: Option<String>,
        /// Resolved class reference, when reached through an accessor
        handle: Option<Arc<ClassHandle>>,
        /// Properties, methods, and index signatures
        members: Vec<TypeId>,
        /// Generic arguments the class was instantiated with
        arguments: Option<Vec<TypeId>>,
    },
    /// A class property
    Property {
        /// Property name
        name: String,
        /// Property type
        ty: TypeId,
        /// Whether the property is optional
        optional: bool,
        /// Whether the property is readonly
        readonly: bool,
        /// Member visibility
        visibility: Visibility,
        /// Whether the property is abstract
        is_abstract: bool,
        /// Documentation attached by the transformer
        description: Option<String>,
        /// Default value type, when recorded
        default: Option<TypeId>,
    },
    /// An object literal property signature
    PropertySignature {
        /// Property name
        name: String,
        /// Property type
        ty: TypeId,
        /// Whether the property is optional
        optional: bool,
        /// Whether the property is readonly
        readonly: bool,
        /// Documentation attached by the transformer
        description: Option<String>,
    },
    /// A class method
    Method {
        /// Method name
        name: String,
        /// Parameter nodes
        parameters: Vec<TypeId>,
        /// Return type
        ret: TypeId,
        /// Member visibility
        visibility: Visibility,
        /// Whether the method is abstract
        is_abstract: bool,
    },
    /// An object literal method signature
    MethodSignature {
        /// Method name
        name: String,
        /// Parameter nodes
        parameters: Vec<TypeId>,
        /// Return type
        ret: TypeId,
    },
    /// A function or method parameter
    Parameter {
        /// Parameter name
        name: String,
        /// Parameter type
        ty: TypeId,
        /// Whether the parameter is optional
        optional: bool,
        /// Whether the parameter is readonly
        readonly: bool,
        /// Visibility modifier; constructor parameters carrying one are
        /// projected into synthetic class properties
        visibility: Option<Visibility>,
        /// Default value type, when recorded
        default: Option<TypeId>,
    },
    /// An index signature
    IndexSignature {
        /// Index type (`string`, `number`, or `symbol`)
        index: TypeId,
        /// Value type
        ty: TypeId,
    },
    /// An enum type with computed member values
    Enum {
        /// Members in declaration order
        members: Vec<(String, EnumValue)>,
    },
    /// A single enum member production
    EnumMember {
        /// Member name
        name: String,
        /// Explicit default value type
        default: Option<TypeId>,
    },
    /// A promise type
    Promise {
        /// Resolved type
        ty: TypeId,
    },
    /// A template literal type
    TemplateLiteral {
        /// Alternating literal and placeholder member types
        types: Vec<TypeId>,
    },
    /// An unresolved type parameter
    TypeParameter {
        /// Parameter name
        name: String,
    },
    /// An inference placeholder bound by an `extends` check
    ///
    /// The payload addresses a local slot of an ancestor frame; the
    /// processor performs the binding when the placeholder is matched.
    Infer {
        /// How many frames up the target frame sits
        frame_offset: usize,
        /// Local slot index within the target frame
        slot: usize,
    },
    /// A function type
    Function {
        /// Function name, when the transformer recorded one
        name: Option<String>,
        /// Parameter nodes
        parameters: Vec<TypeId>,
        /// Return type
        ret: TypeId,
    },
}

/// A type node with its cross-cutting fields
#[derive(Debug, Clone)]
pub struct Type {
    /// Kind-specific data
    pub node: TypeNode,
    /// Name of the alias or class this type came from, for diagnostics
    pub type_name: Option<String>,
    /// Generic arguments the alias was instantiated with, for diagnostics
    pub type_arguments: Vec<TypeId>,
    /// Decorator metadata grouped by annotation key
    pub annotations: FxHashMap<String, Vec<TypeId>>,
    /// Decorator object literal types attached by intersections
    pub decorators: Vec<TypeId>,
    /// The literal this node was widened from, if any
    pub origin: Option<TypeId>,
}

impl Type {
    /// Create a plain type from its node
    pub fn new(node: TypeNode) -> Self {
        Self {
            node,
            type_name: None,
            type_arguments: Vec::new(),
            annotations: FxHashMap::default(),
            decorators: Vec::new(),
            origin: None,
        }
    }

    /// The kind tag, as the transformer spells it
    pub fn kind(&self) -> &'static str {
        match &self.node {
            TypeNode::Never => "never",
            TypeNode::Any => "any",
            TypeNode::Unknown => "unknown",
            TypeNode::Void => "void",
            TypeNode::Object => "object",
            TypeNode::Undefined => "undefined",
            TypeNode::Null => "null",
            TypeNode::String => "string",
            TypeNode::Number { .. } => "number",
            TypeNode::Boolean => "boolean",
            TypeNode::BigInt => "bigint",
            TypeNode::Symbol => "symbol",
            TypeNode::Regexp => "regexp",
            TypeNode::Literal(_) => "literal",
            TypeNode::Union { .. } => "union",
            TypeNode::Intersection { .. } => "intersection",
            TypeNode::Array { .. } => "array",
            TypeNode::Tuple { .. } => "tuple",
            TypeNode::TupleMember { .. } => "tupleMember",
            TypeNode::Rest { .. } => "rest",
            TypeNode::ObjectLiteral { .. } => "objectLiteral",
            TypeNode::Class { .. } => "class",
            TypeNode::Property { .. } => "property",
            TypeNode::PropertySignature { .. } => "propertySignature",
            TypeNode::Method { .. } => "method",
            TypeNode::MethodSignature { .. } => "methodSignature",
            TypeNode::Parameter { .. } => "parameter",
            TypeNode::IndexSignature { .. } => "indexSignature",
            TypeNode::Enum { .. } => "enum",
            TypeNode::EnumMember { .. } => "enumMember",
            TypeNode::Promise { .. } => "promise",
            TypeNode::TemplateLiteral { .. } => "templateLiteral",
            TypeNode::TypeParameter { .. } => "typeParameter",
            TypeNode::Infer { .. } => "infer",
            TypeNode::Function { .. } => "function",
        }
    }

    /// Whether this is the `never` type
    pub fn is_never(&self) -> bool {
        matches!(self.node, TypeNode::Never)
    }

    /// Whether this is a union
    pub fn is_union(&self) -> bool {
        matches!(self.node, TypeNode::Union { .. })
    }

    /// Whether this node is member-shaped (may appear in a member list)
    pub fn is_member(&self) -> bool {
        matches!(
            self.node,
            TypeNode::Property { .. }
                | TypeNode::PropertySignature { .. }
                | TypeNode::Method { .. }
                | TypeNode::MethodSignature { .. }
                | TypeNode::IndexSignature { .. }
        )
    }
}

/// The name of a member node, when it has one
pub fn member_name(arena: &TypeArena, id: TypeId) -> Option<&str> {
    match &arena.get(id).node {
        TypeNode::Property { name, .. }
        | TypeNode::PropertySignature { name, .. }
        | TypeNode::Method { name, .. }
        | TypeNode::MethodSignature { name, .. } => Some(name),
        _ => None,
    }
}

/// The value type carried by a property-shaped member
pub fn member_type(arena: &TypeArena, id: TypeId) -> Option<TypeId> {
    match &arena.get(id).node {
        TypeNode::Property { ty, .. }
        | TypeNode::PropertySignature { ty, .. }
        | TypeNode::TupleMember { ty, .. } => Some(*ty),
        _ => None,
    }
}
