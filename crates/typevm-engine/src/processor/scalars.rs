//! Literal and well-known-class opcode handlers

use std::sync::Arc;

use typevm_program::PoolEntry;
use typevm_types::{LiteralValue, NumberBrand, TypeNode};

use super::Processor;
use crate::error::ProcessorError;

impl Processor<'_> {
    pub(super) fn op_literal(&mut self) -> Result<(), ProcessorError> {
        let index = self.eat_parameter()?;
        let program = Arc::clone(&self.program);
        let value = match program.entry(index) {
            Some(PoolEntry::String(v)) => LiteralValue::String(v.clone()),
            Some(PoolEntry::Number(v)) => LiteralValue::Number(*v),
            Some(PoolEntry::Bool(v)) => LiteralValue::Boolean(*v),
            Some(PoolEntry::BigInt(v)) => LiteralValue::BigInt(*v),
            Some(PoolEntry::Regex { pattern, flags }) => LiteralValue::Regex {
                pattern: pattern.clone(),
                flags: flags.clone(),
            },
            Some(other) => {
                return Err(self.invalid(format!(
                    "pool entry {index} is not a literal value: {other:?}"
                )));
            }
            None => return Err(self.invalid(format!("pool index {index} out of range"))),
        };
        self.push_node(TypeNode::Literal(value))
    }

    pub(super) fn op_number_brand(&mut self) -> Result<(), ProcessorError> {
        let index = self.eat_parameter()?;
        let brand = NumberBrand::from_index(index)
            .ok_or_else(|| self.invalid(format!("unknown number brand {index}")))?;
        self.push_node(TypeNode::Number { brand: Some(brand) })
    }

    /// Push a pre-canonicalized class node for a well-known runtime class
    pub(super) fn push_builtin_class(&mut self, name: &str) -> Result<(), ProcessorError> {
        self.push_node(TypeNode::Class {
            name: Some(name.to_string()),
            handle: None,
            members: Vec::new(),
            arguments: None,
        })
    }
}
