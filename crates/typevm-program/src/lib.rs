//! Packed Reflection Program Definitions
//!
//! This crate provides the input format consumed by the typevm processor:
//! the reflection opcode set, the packed program container with its literal
//! pool, deferred class/program accessors, and the runtime value model
//! produced by `typeof` and `enum` accessors.
//!
//! A packed program is an ordered sequence of pool entries whose last
//! element is an opcode string; each character encodes one opcode as
//! `codepoint - 33`. The compile-time transformer that emits these programs
//! lives outside this workspace; this crate only decodes its output.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod handle;
pub mod op;
pub mod program;
pub mod value;

pub use handle::{ClassHandle, ClassThunk, EnumThunk, ProgramThunk, ValueThunk};
pub use op::ReflectionOp;
pub use program::{PackedProgram, PoolEntry};
pub use value::RuntimeValue;
