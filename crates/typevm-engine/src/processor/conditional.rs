//! Loop-by-return opcode handlers: distributive conditionals and mapped
//! types
//!
//! Both opcodes re-enter themselves after each iteration's subprogram
//! call: `distribute` calls with back-offset -1 (one operand), and
//! `mappedType` with -2 (two operands). The iteration candidate lives in
//! the frame's first local slot, where the subprogram reads it with
//! `loads`.

use typevm_program::op::mapped_modifier;
use typevm_types::{union_of, Type, TypeId, TypeNode};

use super::{Processor, Slot};
use crate::error::ProcessorError;
use crate::frame::LoopCursor;

impl Processor<'_> {
    /// `T extends U ? X : Y` distributed over the members of `T`
    pub(super) fn op_distribute(&mut self) -> Result<(), ProcessorError> {
        let subprogram = self.eat_parameter()?;

        let mut cursor = match self.frame_mut().distributive_loop.take() {
            None => {
                // First entry: pop the type to distribute over.
                let ty = self.pop_type()?;
                LoopCursor::new(self.loop_members(ty))
            }
            Some(mut cursor) => {
                // Re-entry: collect the iteration's result, dropping `never`.
                let result = self.pop_type()?;
                if !self.arena.get(result).is_never() {
                    cursor.results.push(result);
                }
                cursor
            }
        };

        match cursor.next() {
            Some(candidate) => {
                self.place_loop_candidate(candidate)?;
                self.frame_mut().distributive_loop = Some(cursor);
                self.call_subprogram(subprogram, -1);
            }
            None => {
                let id = union_of(self.arena, cursor.results);
                self.push(Slot::Type(id));
            }
        }
        Ok(())
    }

    /// `{ [K in U]: F(K) }`: iterate the keys, construct members
    pub(super) fn op_mapped_type(&mut self) -> Result<(), ProcessorError> {
        let subprogram = self.eat_parameter()?;
        let modifier = self.eat_parameter()?;

        let mut cursor = match self.frame_mut().mapped_type.take() {
            None => {
                let keys = self.pop_type()?;
                LoopCursor::new(self.loop_members(keys))
            }
            Some(mut cursor) => {
                let produced = self.pop_type()?;
                let key = cursor
                    .current()
                    .ok_or_else(|| self.invalid("mapped type iteration without a key"))?;
                if let Some(member) = self.mapped_member(key, produced, modifier) {
                    cursor.results.push(member);
                }
                cursor
            }
        };

        match cursor.next() {
            Some(key) => {
                self.place_loop_candidate(key)?;
                self.frame_mut().mapped_type = Some(cursor);
                self.call_subprogram(subprogram, -2);
            }
            None => {
                self.push_node(TypeNode::ObjectLiteral { members: cursor.results })?;
            }
        }
        Ok(())
    }

    /// Union members in source order, or the type itself
    ///
    /// `never` is the empty union and contributes no iterations.
    fn loop_members(&self, ty: TypeId) -> Vec<TypeId> {
        match self.arena.node(ty) {
            TypeNode::Union { types } => types.clone(),
            TypeNode::Never => Vec::new(),
            _ => vec![ty],
        }
    }

    /// Write the iteration candidate into the frame's first local slot
    fn place_loop_candidate(&mut self, candidate: TypeId) -> Result<(), ProcessorError> {
        let start_index = self.frame().start_index;
        let index = start_index + 1;
        if index < 0 {
            return Err(self.invalid("loop candidate below frame"));
        }
        self.store_slot(index as usize, Slot::Type(candidate));
        let frame = self.frame_mut();
        if frame.variables == 0 {
            frame.variables = 1;
        }
        Ok(())
    }

    /// Construct the member for one mapped iteration, or skip it
    ///
    /// Literal keys become property signatures; primitive string, number,
    /// and symbol keys become index signatures. `never`-typed members are
    /// skipped.
    fn mapped_member(&mut self, key: TypeId, produced: TypeId, modifier: usize) -> Option<TypeId> {
        let mut ty = produced;
        let mut optional = modifier & mapped_modifier::OPTIONAL != 0;
        if modifier & mapped_modifier::REMOVE_OPTIONAL != 0 {
            let (stripped, _) = self.strip_optional_undefined(ty);
            ty = stripped;
            optional = false;
        }
        if self.arena.get(ty).is_never() {
            return None;
        }
        let readonly = modifier & mapped_modifier::READONLY != 0
            && modifier & mapped_modifier::REMOVE_READONLY == 0;

        match self.arena.node(key).clone() {
            TypeNode::Literal(value) => {
                Some(self.arena.alloc(Type::new(TypeNode::PropertySignature {
                    name: value.to_text(),
                    ty,
                    optional,
                    readonly,
                    description: None,
                })))
            }
            TypeNode::String | TypeNode::Number { .. } | TypeNode::Symbol => {
                Some(self.arena.alloc(Type::new(TypeNode::IndexSignature { index: key, ty })))
            }
            _ => None,
        }
    }
}
