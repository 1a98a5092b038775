//! Reflection opcodes
//!
//! This module defines the instruction set for the reflection processor.
//! Codes are stable integers shared with the compile-time transformer that
//! emits packed programs; the encoded character for an opcode is
//! `opcode + 33`, so the whole set maps onto printable ASCII.
//!
//! Operands (pool indexes, jump targets, argument counts) are encoded as
//! additional characters following the opcode, decoded with the same
//! `codepoint - 33` rule.

/// Reflection opcode enumeration
///
/// Opcodes are organized into families:
/// - 0-11: primitive kinds
/// - 12-26: literals, template literals, and well-known classes
/// - 27-46: aggregate and member productions
/// - 47-55: member adjectives
/// - 56-66: object literals, conditional and mapped types
/// - 67-75: frame and control flow
/// - 76-79: number brands and generics
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReflectionOp {
    /// Push a `string` type
    String = 0,
    /// Push a `number` type
    Number = 1,
    /// Push a `boolean` type
    Boolean = 2,
    /// Push a `bigint` type
    Bigint = 3,
    /// Push a `void` type
    Void = 4,
    /// Push an `unknown` type
    Unknown = 5,
    /// Push an `object` type
    Object = 6,
    /// Push a `never` type
    Never = 7,
    /// Push an `undefined` type
    Undefined = 8,
    /// Push a `symbol` type
    Symbol = 9,
    /// Push a `null` type
    Null = 10,
    /// Push an `any` type
    Any = 11,

    /// Push a literal type from the pool (operand: pool index)
    Literal = 12,
    /// Build a template literal from the current frame
    TemplateLiteral = 13,
    /// Push a `RegExp` type
    Regexp = 14,
    /// Push the `Date` class
    Date = 15,
    /// Push the `Uint8Array` class
    Uint8Array = 16,
    /// Push the `Int8Array` class
    Int8Array = 17,
    /// Push the `Uint8ClampedArray` class
    Uint8ClampedArray = 18,
    /// Push the `Uint16Array` class
    Uint16Array = 19,
    /// Push the `Int16Array` class
    Int16Array = 20,
    /// Push the `Uint32Array` class
    Uint32Array = 21,
    /// Push the `Int32Array` class
    Int32Array = 22,
    /// Push the `Float32Array` class
    Float32Array = 23,
    /// Push the `Float64Array` class
    Float64Array = 24,
    /// Push the `BigInt64Array` class
    BigInt64Array = 25,
    /// Push the `ArrayBuffer` class
    ArrayBuffer = 26,

    /// Build a class from the current frame of members
    Class = 27,
    /// Build a parameter: pop type, name from pool (operand: pool index)
    Parameter = 28,
    /// Resolve a deferred class accessor (operand: pool index)
    ClassReference = 29,
    /// Build an enum from a deferred accessor (operand: pool index)
    Enum = 30,
    /// Push an enum member (operand: pool index of the name)
    EnumMember = 31,
    /// Build a tuple from the current frame
    Tuple = 32,
    /// Wrap the top of stack as a tuple member
    TupleMember = 33,
    /// Wrap the top of stack as a named tuple member (operand: pool index)
    NamedTupleMember = 34,
    /// Wrap the top of stack as a rest element
    Rest = 35,
    /// Push a `Set` class consuming one stack argument
    Set = 36,
    /// Push a `Map` class consuming two stack arguments
    Map = 37,
    /// Wrap the top of stack into a `Promise`
    Promise = 38,
    /// Build a union from the current frame
    Union = 39,
    /// Build an intersection from the current frame
    Intersection = 40,
    /// Build a function type from the current frame (operand: pool index)
    Function = 41,
    /// Wrap the top of stack into an array
    Array = 42,
    /// Build a class property: pop type (operand: pool index of the name)
    Property = 43,
    /// Build a property signature: pop type (operand: pool index)
    PropertySignature = 44,
    /// Build a class method from the current frame (operand: pool index)
    Method = 45,
    /// Build a method signature from the current frame (operand: pool index)
    MethodSignature = 46,

    /// Mark the top member as optional
    Optional = 47,
    /// Mark the top member as readonly
    Readonly = 48,
    /// Mark the top member as public
    Public = 49,
    /// Mark the top member as protected
    Protected = 50,
    /// Mark the top member as private
    Private = 51,
    /// Mark the top member as abstract
    Abstract = 52,
    /// Pop a default value type and attach it to the top member
    DefaultValue = 53,
    /// Attach a description to the top member (operand: pool index)
    Description = 54,
    /// Build an index signature: pop type, pop index
    IndexSignature = 55,

    /// Build an object literal from the current frame of members
    ObjectLiteral = 56,
    /// Distributive conditional loop (operand: subprogram address)
    Distribute = 57,
    /// Select a branch: pop right, left, condition, then pop the frame
    Condition = 58,
    /// Pop a boolean and call one of two subprograms (operands: then, else)
    JumpCondition = 59,
    /// Push an inference placeholder (operands: frame offset, slot)
    Infer = 60,
    /// Pop right and left, push whether left extends right
    Extends = 61,
    /// Pop index and base, push the indexed access type
    IndexAccess = 62,
    /// Infer a type from a deferred runtime value (operand: pool index)
    Typeof = 63,
    /// Pop a type and push the union of its member names
    Keyof = 64,
    /// Reserve a local variable slot in the current frame
    Var = 65,
    /// Mapped type loop (operands: subprogram address, modifier bits)
    MappedType = 66,

    /// Copy a slot from an ancestor frame (operands: frame offset, slot)
    Loads = 67,
    /// Push a stack value below the frame start (operand: offset)
    Arg = 68,
    /// Return from a subprogram call
    Return = 69,
    /// Push a frame without a call
    Frame = 70,
    /// Discard the current frame, preserving the top value
    MoveFrame = 71,
    /// Jump to an absolute address (operand: address)
    Jump = 72,
    /// Call a subprogram (operand: address)
    Call = 73,
    /// Push the type of a referenced program (operand: pool index)
    Inline = 74,
    /// Evaluate a referenced program with arguments (operands: pool index,
    /// argument count)
    InlineCall = 75,

    /// Brand the number type (operand: brand index)
    NumberBrand = 76,
    /// Consume the next type argument (operand: pool index of the name)
    TypeParameter = 77,
    /// Consume the next type argument, falling back to a popped default
    /// (operand: pool index of the name)
    TypeParameterDefault = 78,
    /// Compile-output alias of `TypeParameter`
    Template = 79,
}

impl ReflectionOp {
    /// Convert a raw code to an opcode, if valid
    pub fn from_code(code: usize) -> Option<Self> {
        match code {
            0 => Some(Self::String),
            1 => Some(Self::Number),
            2 => Some(Self::Boolean),
            3 => Some(Self::Bigint),
            4 => Some(Self::Void),
            5 => Some(Self::Unknown),
            6 => Some(Self::Object),
            7 => Some(Self::Never),
            8 => Some(Self::Undefined),
            9 => Some(Self::Symbol),
            10 => Some(Self::Null),
            11 => Some(Self::Any),
            12 => Some(Self::Literal),
            13 => Some(Self::TemplateLiteral),
            14 => Some(Self::Regexp),
            15 => Some(Self::Date),
            16 => Some(Self::Uint8Array),
            17 => Some(Self::Int8Array),
            18 => Some(Self::Uint8ClampedArray),
            19 => Some(Self::Uint16Array),
            20 => Some(Self::Int16Array),
            21 => Some(Self::Uint32Array),
            22 => Some(Self::Int32Array),
            23 => Some(Self::Float32Array),
            24 => Some(Self::Float64Array),
            25 => Some(Self::BigInt64Array),
            26 => Some(Self::ArrayBuffer),
            27 => Some(Self::Class),
            28 => Some(Self::Parameter),
            29 => Some(Self::ClassReference),
            30 => Some(Self::Enum),
            31 => Some(Self::EnumMember),
            32 => Some(Self::Tuple),
            33 => Some(Self::TupleMember),
            34 => Some(Self::NamedTupleMember),
            35 => Some(Self::Rest),
            36 => Some(Self::Set),
            37 => Some(Self::Map),
            38 => Some(Self::Promise),
            39 => Some(Self::Union),
            40 => Some(Self::Intersection),
            41 => Some(Self::Function),
            42 => Some(Self::Array),
            43 => Some(Self::Property),
            44 => Some(Self::PropertySignature),
            45 => Some(Self::Method),
            46 => Some(Self::MethodSignature),
            47 => Some(Self::Optional),
            48 => Some(Self::Readonly),
            49 => Some(Self::Public),
            50 => Some(Self::Protected),
            51 => Some(Self::Private),
            52 => Some(Self::Abstract),
            53 => Some(Self::DefaultValue),
            54 => Some(Self::Description),
            55 => Some(Self::IndexSignature),
            56 => Some(Self::ObjectLiteral),
            57 => Some(Self::Distribute),
            58 => Some(Self::Condition),
            59 => Some(Self::JumpCondition),
            60 => Some(Self::Infer),
            61 => Some(Self::Extends),
            62 => Some(Self::IndexAccess),
            63 => Some(Self::Typeof),
            64 => Some(Self::Keyof),
            65 => Some(Self::Var),
            66 => Some(Self::MappedType),
            67 => Some(Self::Loads),
            68 => Some(Self::Arg),
            69 => Some(Self::Return),
            70 => Some(Self::Frame),
            71 => Some(Self::MoveFrame),
            72 => Some(Self::Jump),
            73 => Some(Self::Call),
            74 => Some(Self::Inline),
            75 => Some(Self::InlineCall),
            76 => Some(Self::NumberBrand),
            77 => Some(Self::TypeParameter),
            78 => Some(Self::TypeParameterDefault),
            79 => Some(Self::Template),
            _ => None,
        }
    }

    /// Decode an opcode from its encoded character (`char = opcode + 33`)
    pub fn from_char(c: char) -> Option<Self> {
        Self::from_code((c as usize).checked_sub(33)?)
    }

    /// Encode this opcode as a character (`char = opcode + 33`)
    pub fn to_char(self) -> char {
        // All codes fit the printable ASCII range starting at '!'.
        char::from(self as u8 + 33)
    }

    /// Human-readable name of the opcode, as the transformer spells it
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Bigint => "bigint",
            Self::Void => "void",
            Self::Unknown => "unknown",
            Self::Object => "object",
            Self::Never => "never",
            Self::Undefined => "undefined",
            Self::Symbol => "symbol",
            Self::Null => "null",
            Self::Any => "any",
            Self::Literal => "literal",
            Self::TemplateLiteral => "templateLiteral",
            Self::Regexp => "regexp",
            Self::Date => "date",
            Self::Uint8Array => "uint8Array",
            Self::Int8Array => "int8Array",
            Self::Uint8ClampedArray => "uint8ClampedArray",
            Self::Uint16Array => "uint16Array",
            Self::Int16Array => "int16Array",
            Self::Uint32Array => "uint32Array",
            Self::Int32Array => "int32Array",
            Self::Float32Array => "float32Array",
            Self::Float64Array => "float64Array",
            Self::BigInt64Array => "bigInt64Array",
            Self::ArrayBuffer => "arrayBuffer",
            Self::Class => "class",
            Self::Parameter => "parameter",
            Self::ClassReference => "classReference",
            Self::Enum => "enum",
            Self::EnumMember => "enumMember",
            Self::Tuple => "tuple",
            Self::TupleMember => "tupleMember",
            Self::NamedTupleMember => "namedTupleMember",
            Self::Rest => "rest",
            Self::Set => "set",
            Self::Map => "map",
            Self::Promise => "promise",
            Self::Union => "union",
            Self::Intersection => "intersection",
            Self::Function => "function",
            Self::Array => "array",
            Self::Property => "property",
            Self::PropertySignature => "propertySignature",
            Self::Method => "method",
            Self::MethodSignature => "methodSignature",
            Self::Optional => "optional",
            Self::Readonly => "readonly",
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
            Self::Abstract => "abstract",
            Self::DefaultValue => "defaultValue",
            Self::Description => "description",
            Self::IndexSignature => "indexSignature",
            Self::ObjectLiteral => "objectLiteral",
            Self::Distribute => "distribute",
            Self::Condition => "condition",
            Self::JumpCondition => "jumpCondition",
            Self::Infer => "infer",
            Self::Extends => "extends",
            Self::IndexAccess => "indexAccess",
            Self::Typeof => "typeof",
            Self::Keyof => "keyof",
            Self::Var => "var",
            Self::MappedType => "mappedType",
            Self::Loads => "loads",
            Self::Arg => "arg",
            Self::Return => "return",
            Self::Frame => "frame",
            Self::MoveFrame => "moveFrame",
            Self::Jump => "jump",
            Self::Call => "call",
            Self::Inline => "inline",
            Self::InlineCall => "inlineCall",
            Self::NumberBrand => "numberBrand",
            Self::TypeParameter => "typeParameter",
            Self::TypeParameterDefault => "typeParameterDefault",
            Self::Template => "template",
        }
    }
}

/// Mapped type modifier bits, shared with the transformer
pub mod mapped_modifier {
    /// Add the optional flag to every produced member
    pub const OPTIONAL: usize = 1 << 0;
    /// Remove the optional flag from every produced member
    pub const REMOVE_OPTIONAL: usize = 1 << 1;
    /// Add the readonly flag to every produced member
    pub const READONLY: usize = 1 << 2;
    /// Remove the readonly flag from every produced member
    pub const REMOVE_READONLY: usize = 1 << 3;
}
