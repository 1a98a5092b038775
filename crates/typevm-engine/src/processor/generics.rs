//! Generic instantiation and type-query opcode handlers
//!
//! Type parameters consume the inputs attached to the current frame,
//! `loads`/`arg`/`var` manage frame-local slots, and the query family
//! (`extends`, `keyof`, `indexAccess`, `typeof`) delegates to the pure
//! operations of the types crate.

use std::sync::Arc;

use typevm_program::PoolEntry;
use typevm_types::{
    index_access, infer_from_value, is_extendable, member_name, union_of, TypeNode,
};

use super::{Processor, Slot};
use crate::error::ProcessorError;

impl Processor<'_> {
    /// `typeParameter` / `typeParameterDefault` / `template`
    ///
    /// The default variant pops its previously pushed default first, then
    /// consumes the next input if one is available.
    pub(super) fn op_type_parameter(&mut self, with_default: bool) -> Result<(), ProcessorError> {
        let index = self.eat_parameter()?;
        let name = self.pool_string(index)?;
        let default = if with_default { Some(self.pop_type()?) } else { None };

        let frame = self.frame_mut();
        let position = frame.variables;
        frame.variables += 1;
        let input = frame.inputs.get(position).copied();

        match input.or(default) {
            Some(id) => {
                self.push(Slot::Type(id));
                Ok(())
            }
            None => self.push_node(TypeNode::TypeParameter { name }),
        }
    }

    /// Copy a local slot from an ancestor frame onto the stack
    pub(super) fn op_loads(&mut self) -> Result<(), ProcessorError> {
        let frame_offset = self.eat_parameter()?;
        let slot = self.eat_parameter()?;
        let target = self
            .frames
            .len()
            .checked_sub(1 + frame_offset)
            .ok_or_else(|| self.invalid(format!("frame offset {frame_offset} out of range")))?;
        let index = self.frames[target].start_index + 1 + slot as isize;
        let value = self.load_slot(index)?;
        self.push(value);
        Ok(())
    }

    /// Push the stack value `offset` slots below the frame start
    pub(super) fn op_arg(&mut self) -> Result<(), ProcessorError> {
        let offset = self.eat_parameter()?;
        let index = self.frame().start_index - offset as isize;
        let value = self.load_slot(index)?;
        self.push(value);
        Ok(())
    }

    /// Reserve a local variable slot, initialized to `never`
    pub(super) fn op_var(&mut self) -> Result<(), ProcessorError> {
        self.push_node(TypeNode::Never)?;
        self.frame_mut().variables += 1;
        Ok(())
    }

    pub(super) fn op_infer(&mut self) -> Result<(), ProcessorError> {
        let frame_offset = self.eat_parameter()?;
        let slot = self.eat_parameter()?;
        self.push_node(TypeNode::Infer { frame_offset, slot })
    }

    /// Pop right and left, check assignability, apply inference bindings
    pub(super) fn op_extends(&mut self) -> Result<(), ProcessorError> {
        let right = self.pop_type()?;
        let left = self.pop_type()?;
        let mut bindings = Vec::new();
        let extendable = is_extendable(self.arena, left, right, &mut bindings);
        for binding in bindings {
            let target = self
                .frames
                .len()
                .checked_sub(1 + binding.frame_offset)
                .ok_or_else(|| {
                    self.invalid(format!("infer frame offset {} out of range", binding.frame_offset))
                })?;
            let index = self.frames[target].start_index + 1 + binding.slot as isize;
            if index < 0 {
                return Err(self.invalid("infer slot below frame"));
            }
            self.store_slot(index as usize, Slot::Type(binding.ty));
        }
        self.push(Slot::Bool(extendable));
        Ok(())
    }

    /// Push the union of an object-shaped type's member names
    pub(super) fn op_keyof(&mut self) -> Result<(), ProcessorError> {
        let ty = self.pop_type()?;
        let members = match self.arena.node(ty) {
            TypeNode::ObjectLiteral { members } => members.clone(),
            TypeNode::Class { members, .. } => members.clone(),
            // Index signatures and tuples contribute no keys.
            _ => Vec::new(),
        };
        let mut names = Vec::new();
        for member in members {
            if let Some(name) = member_name(self.arena, member) {
                names.push(name.to_string());
            }
        }
        let literals = names
            .into_iter()
            .map(|name| self.arena.string_literal(name))
            .collect();
        let id = union_of(self.arena, literals);
        self.push(Slot::Type(id));
        Ok(())
    }

    /// Pop index and base; a non-type base is an error, a non-indexable
    /// type base degrades to `never` inside `index_access`
    pub(super) fn op_index_access(&mut self) -> Result<(), ProcessorError> {
        let index = self.pop()?;
        let base = self.pop()?;
        let (Slot::Type(base), Slot::Type(index)) = (base, index) else {
            return Err(ProcessorError::UnresolvedIndex {
                index: self.ip.max(0) as usize,
                op: "indexAccess".to_string(),
                depth: self.frames.len(),
            });
        };
        let id = index_access(self.arena, base, index);
        self.push(Slot::Type(id));
        Ok(())
    }

    /// Invoke a deferred value accessor and infer its type
    pub(super) fn op_typeof(&mut self) -> Result<(), ProcessorError> {
        let index = self.eat_parameter()?;
        let program = Arc::clone(&self.program);
        let value = match program.entry(index) {
            Some(PoolEntry::Value(thunk)) => thunk(),
            Some(other) => {
                return Err(self.invalid(format!(
                    "pool entry {index} is not a value accessor: {other:?}"
                )));
            }
            None => return Err(self.invalid(format!("pool index {index} out of range"))),
        };
        let id = infer_from_value(self.arena, &value);
        self.push(Slot::Type(id));
        Ok(())
    }
}
