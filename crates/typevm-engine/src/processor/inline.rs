//! Cross-program opcode handlers: class references, inlining, and enums
//!
//! These opcodes reach outside the running program through pool
//! accessors. Nested programs are evaluated with a fresh processor
//! sharing this one's arena and registry, so recursive references
//! short-circuit to the in-flight result anchor.

use std::sync::Arc;

use typevm_program::{PoolEntry, RuntimeValue};
use typevm_types::{EnumValue, TypeId, TypeNode};

use super::{Processor, Slot};
use crate::error::ProcessorError;
use crate::resolve::resolve_program;

impl Processor<'_> {
    /// Resolve a deferred class accessor, evaluating its embedded program
    /// with the generic arguments produced by the current frame
    pub(super) fn op_class_reference(&mut self) -> Result<(), ProcessorError> {
        let pool_index = self.eat_parameter()?;
        let arguments = self.pop_frame_types()?;
        let program = Arc::clone(&self.program);
        let thunk = match program.entry(pool_index) {
            Some(PoolEntry::Class(thunk)) => Arc::clone(thunk),
            Some(other) => {
                return Err(self.invalid(format!(
                    "pool entry {pool_index} is not a class accessor: {other:?}"
                )));
            }
            None => return Err(self.invalid(format!("pool index {pool_index} out of range"))),
        };
        let handle = thunk().map_err(|message| ProcessorError::ClassResolution {
            index: self.ip.max(0) as usize,
            pool_index,
            message,
        })?;

        match &handle.type_program {
            Some(embedded) => {
                let embedded = Arc::clone(embedded);
                let id = resolve_program(&embedded, arguments, self.arena, self.registry)?;
                self.push(Slot::Type(id));
                Ok(())
            }
            None => {
                let arguments = if arguments.is_empty() { None } else { Some(arguments) };
                self.push_node(TypeNode::Class {
                    name: Some(handle.name.clone()),
                    handle: Some(handle),
                    members: Vec::new(),
                    arguments,
                })
            }
        }
    }

    /// Push the type of a referenced program; a numeric pool entry is the
    /// self-reference sentinel and pushes the result anchor
    pub(super) fn op_inline(&mut self) -> Result<(), ProcessorError> {
        let pool_index = self.eat_parameter()?;
        let program = Arc::clone(&self.program);
        match program.entry(pool_index) {
            Some(PoolEntry::Number(_)) => {
                self.push(Slot::Type(self.result_type));
                Ok(())
            }
            Some(PoolEntry::Program(nested)) => {
                let nested = Arc::clone(nested);
                let id = resolve_program(&nested, Vec::new(), self.arena, self.registry)?;
                self.push(Slot::Type(id));
                Ok(())
            }
            Some(PoolEntry::ProgramThunk(thunk)) => {
                let nested = thunk();
                let id = resolve_program(&nested, Vec::new(), self.arena, self.registry)?;
                self.push(Slot::Type(id));
                Ok(())
            }
            Some(other) => Err(self.invalid(format!(
                "pool entry {pool_index} is not a program reference: {other:?}"
            ))),
            None => Err(self.invalid(format!("pool index {pool_index} out of range"))),
        }
    }

    /// Evaluate a referenced program with popped argument types
    ///
    /// Arguments the emitted program did not supply fall back to the
    /// caller's initial inputs, positionally.
    pub(super) fn op_inline_call(&mut self) -> Result<(), ProcessorError> {
        let pool_index = self.eat_parameter()?;
        let argument_count = self.eat_parameter()?;

        let floor = {
            let frame = self.frame();
            frame.start_index + 1 + frame.variables as isize
        };
        let mut supplied: Vec<Option<TypeId>> = vec![None; argument_count];
        for position in (0..argument_count).rev() {
            if self.stack_pointer() >= floor {
                supplied[position] = Some(self.pop_type()?);
            }
        }
        let mut inputs = Vec::with_capacity(argument_count);
        for (position, argument) in supplied.into_iter().enumerate() {
            let id = match argument.or_else(|| self.initial_inputs.get(position).copied()) {
                Some(id) => id,
                None => self.arena.never(),
            };
            inputs.push(id);
        }

        let program = Arc::clone(&self.program);
        match program.entry(pool_index) {
            Some(PoolEntry::Number(_)) => {
                // Self-reference: the registry would return the in-flight
                // anchor for this program, so push it directly.
                self.push(Slot::Type(self.result_type));
                Ok(())
            }
            Some(PoolEntry::Program(nested)) => {
                let nested = Arc::clone(nested);
                let id = resolve_program(&nested, inputs, self.arena, self.registry)?;
                self.push(Slot::Type(id));
                Ok(())
            }
            Some(PoolEntry::ProgramThunk(thunk)) => {
                let nested = thunk();
                let id = resolve_program(&nested, inputs, self.arena, self.registry)?;
                self.push(Slot::Type(id));
                Ok(())
            }
            Some(other) => Err(self.invalid(format!(
                "pool entry {pool_index} is not a program reference: {other:?}"
            ))),
            None => Err(self.invalid(format!("pool index {pool_index} out of range"))),
        }
    }

    /// Compute enum members from a deferred member list
    ///
    /// Members auto-increment from zero; an explicit numeric value seeds
    /// the counter, a string value leaves it untouched.
    pub(super) fn op_enum(&mut self) -> Result<(), ProcessorError> {
        let pool_index = self.eat_parameter()?;
        let program = Arc::clone(&self.program);
        let entries = match program.entry(pool_index) {
            Some(PoolEntry::Enum(thunk)) => thunk(),
            Some(other) => {
                return Err(self.invalid(format!(
                    "pool entry {pool_index} is not an enum accessor: {other:?}"
                )));
            }
            None => return Err(self.invalid(format!("pool index {pool_index} out of range"))),
        };

        let mut members = Vec::with_capacity(entries.len());
        let mut counter = 0.0f64;
        for (name, default) in entries {
            let value = match default {
                Some(RuntimeValue::Number(n)) => {
                    counter = n + 1.0;
                    EnumValue::Number(n)
                }
                Some(RuntimeValue::BigInt(n)) => {
                    counter = n as f64 + 1.0;
                    EnumValue::Number(n as f64)
                }
                Some(RuntimeValue::String(s)) => EnumValue::String(s),
                _ => {
                    let n = counter;
                    counter += 1.0;
                    EnumValue::Number(n)
                }
            };
            members.push((name, value));
        }
        self.push_node(TypeNode::Enum { members })
    }
}
