//! Packed program container
//!
//! A packed program arrives as an ordered sequence whose last element is an
//! opcode string; every preceding element belongs to the literal pool and is
//! addressed by opcode operands by index. Programs are compared by `Arc`
//! identity, never by value, so that in-flight evaluations of the same
//! program can be detected.

use std::fmt;
use std::sync::Arc;

use crate::handle::{ClassThunk, EnumThunk, ProgramThunk, ValueThunk};

/// A boxed literal-pool value
#[derive(Clone)]
pub enum PoolEntry {
    /// A string constant
    String(String),
    /// A number constant; also the self-reference sentinel for `inline`
    Number(f64),
    /// A boolean constant
    Bool(bool),
    /// A bigint constant
    BigInt(i64),
    /// A regular expression literal
    Regex {
        /// Pattern source without delimiters
        pattern: String,
        /// Flag characters
        flags: String,
    },
    /// A deferred class accessor
    Class(ClassThunk),
    /// A nested packed program
    Program(Arc<PackedProgram>),
    /// A deferred accessor for a nested packed program
    ProgramThunk(ProgramThunk),
    /// A deferred runtime value, consumed by `typeof`
    Value(ValueThunk),
    /// A deferred enum member list, consumed by `enum`
    Enum(EnumThunk),
}

impl fmt::Debug for PoolEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolEntry::String(v) => f.debug_tuple("String").field(v).finish(),
            PoolEntry::Number(v) => f.debug_tuple("Number").field(v).finish(),
            PoolEntry::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            PoolEntry::BigInt(v) => f.debug_tuple("BigInt").field(v).finish(),
            PoolEntry::Regex { pattern, flags } => {
                write!(f, "Regex(/{pattern}/{flags})")
            }
            PoolEntry::Class(_) => f.write_str("Class(..)"),
            PoolEntry::Program(_) => f.write_str("Program(..)"),
            PoolEntry::ProgramThunk(_) => f.write_str("ProgramThunk(..)"),
            PoolEntry::Value(_) => f.write_str("Value(..)"),
            PoolEntry::Enum(_) => f.write_str("Enum(..)"),
        }
    }
}

/// A decoded packed program: flat opcode sequence plus literal pool
///
/// Decoding is infallible: a sequence whose last element is not a string
/// decodes to the empty program. Raw codes that do not name an opcode are
/// kept as-is and surface as unknown-opcode errors at dispatch time.
#[derive(Debug)]
pub struct PackedProgram {
    ops: Vec<usize>,
    pool: Vec<PoolEntry>,
}

impl PackedProgram {
    /// Decode a packed sequence into opcodes and literal pool
    pub fn new(mut entries: Vec<PoolEntry>) -> Arc<Self> {
        let ops = match entries.pop() {
            Some(PoolEntry::String(encoded)) => encoded
                .chars()
                .map(|c| (c as usize).saturating_sub(33))
                .collect(),
            _ => {
                entries.clear();
                Vec::new()
            }
        };
        Arc::new(Self { ops, pool: entries })
    }

    /// The raw opcode sequence (opcodes interleaved with their operands)
    pub fn ops(&self) -> &[usize] {
        &self.ops
    }

    /// The literal pool
    pub fn pool(&self) -> &[PoolEntry] {
        &self.pool
    }

    /// Look up a pool entry by operand index
    pub fn entry(&self, index: usize) -> Option<&PoolEntry> {
        self.pool.get(index)
    }

    /// Whether the program has no opcodes
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Identity key for registry and cache maps
    pub fn key(this: &Arc<Self>) -> usize {
        Arc::as_ptr(this) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::ReflectionOp;

    fn encode(ops: &[usize]) -> String {
        ops.iter()
            .map(|&o| char::from_u32(o as u32 + 33).unwrap())
            .collect()
    }

    #[test]
    fn test_decode_splits_pool_and_ops() {
        let ops = encode(&[ReflectionOp::String as usize, ReflectionOp::Array as usize]);
        let program = PackedProgram::new(vec![
            PoolEntry::String("name".to_string()),
            PoolEntry::Number(3.0),
            PoolEntry::String(ops),
        ]);

        assert_eq!(program.ops(), &[ReflectionOp::String as usize, ReflectionOp::Array as usize]);
        assert_eq!(program.pool().len(), 2);
        assert!(matches!(program.entry(0), Some(PoolEntry::String(s)) if s == "name"));
        assert!(matches!(program.entry(1), Some(PoolEntry::Number(n)) if *n == 3.0));
        assert!(program.entry(2).is_none());
    }

    #[test]
    fn test_decode_without_trailing_string_is_empty() {
        let program = PackedProgram::new(vec![PoolEntry::Number(1.0)]);
        assert!(program.is_empty());
        assert!(program.pool().is_empty());

        let program = PackedProgram::new(vec![]);
        assert!(program.is_empty());
    }

    #[test]
    fn test_identity_key_differs_per_allocation() {
        let a = PackedProgram::new(vec![PoolEntry::String(encode(&[0]))]);
        let b = PackedProgram::new(vec![PoolEntry::String(encode(&[0]))]);
        assert_ne!(PackedProgram::key(&a), PackedProgram::key(&b));
        assert_eq!(PackedProgram::key(&a), PackedProgram::key(&Arc::clone(&a)));
    }
}
