//! Runtime Type IR
//!
//! Type representation and structural type operations for the typevm
//! processor:
//! - **Arena**: `TypeId`-indexed storage with in-place replacement, the
//!   backbone of cycle-safe recursive types (`arena` module)
//! - **Nodes**: the discriminated type tree (`ty` module)
//! - **Operations**: union flattening, assignability, indexed access,
//!   intersection merging, cartesian products, and value inference
//!
//! All operations are pure over the arena; nothing here performs I/O or
//! depends on the processor.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod arena;
pub mod cartesian;
pub mod display;
pub mod extends;
pub mod index_access;
pub mod infer;
pub mod merge;
pub mod ty;
pub mod union;

pub use arena::{TypeArena, TypeId};
pub use cartesian::CartesianProduct;
pub use display::TypeDisplay;
pub use extends::{is_extendable, InferBinding};
pub use index_access::index_access;
pub use infer::{infer_from_value, narrow_original_literal, widen_literal};
pub use merge::merge_object_like;
pub use ty::{
    member_name, member_type, EnumValue, LiteralValue, NumberBrand, Type, TypeNode, Visibility,
};
pub use union::{flatten_union_members, types_equal, unbox_union, union_of};
