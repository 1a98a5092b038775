//! Cartesian products over union members
//!
//! Template literals expand every union placeholder into its members and
//! evaluate each combination separately. The product accumulates one part
//! list per template position and then enumerates combinations in source
//! order: the leftmost part varies slowest, matching the order the emitted
//! unions are expected in.

use crate::arena::{TypeArena, TypeId};
use crate::ty::TypeNode;

/// Accumulator for combinations of union/singleton member lists
#[derive(Debug, Default)]
pub struct CartesianProduct {
    parts: Vec<Vec<TypeId>>,
}

impl CartesianProduct {
    /// Create an empty product
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a template position; unions contribute all their members
    pub fn add(&mut self, arena: &TypeArena, ty: TypeId) {
        match arena.node(ty) {
            TypeNode::Union { types } => self.parts.push(types.clone()),
            _ => self.parts.push(vec![ty]),
        }
    }

    /// Enumerate all combinations
    ///
    /// An empty product yields no combinations; a product with an empty
    /// position yields none either.
    pub fn calculate(self) -> Vec<Vec<TypeId>> {
        if self.parts.is_empty() || self.parts.iter().any(Vec::is_empty) {
            return Vec::new();
        }
        let mut out: Vec<Vec<TypeId>> = vec![Vec::new()];
        for part in &self.parts {
            let mut next = Vec::with_capacity(out.len() * part.len());
            for prefix in &out {
                for &member in part {
                    let mut combination = prefix.clone();
                    combination.push(member);
                    next.push(combination);
                }
            }
            out = next;
        }
        out
    }
}
