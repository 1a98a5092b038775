//! Reflection Processor
//!
//! A stack-based interpreter that reconstructs the structured
//! representation of a static type at runtime from a packed program:
//! - **Processor**: operand stack, frame chain, opcode dispatch
//!   (`processor` module)
//! - **Registry**: the cycle breaker that lets recursive type programs
//!   terminate with stable node identity (`registry` module)
//! - **Resolver**: public entry points with per-program result caching
//!   (`resolve` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use typevm_engine::TypeResolver;
//!
//! let mut resolver = TypeResolver::new();
//! let ty = resolver.resolve_type(&program, Vec::new())?;
//! println!("{}", resolver.arena().display(ty));
//! ```
//!
//! A single resolution is synchronous and single-threaded; no opcode
//! blocks or yields. Parallel use requires independent resolvers.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod frame;
pub mod processor;
pub mod registry;
pub mod resolve;

pub use error::ProcessorError;
pub use frame::{Frame, LoopCursor};
pub use processor::{Processor, Slot};
pub use registry::{meta_annotation, DecoratorPredicate, ProcessorRegistry, DEFAULT_ANNOTATION};
pub use resolve::{resolve_program, TypeResolver};
