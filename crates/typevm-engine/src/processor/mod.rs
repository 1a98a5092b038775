//! The reflection processor
//!
//! A stack machine over a decoded packed program. Opcode handlers are
//! grouped by family in the submodules; this module owns the machine
//! state, the calling convention, and the dispatch loop.
//!
//! ## Calling convention
//!
//! A call pushes the return address (`ip + return_offset`) as a stack
//! slot, opens a frame whose `start_index` addresses that slot, and sets
//! the program counter so the next increment lands on the target. A
//! return pops the value, reads the address at `start_index`, truncates
//! the stack below the address slot, pushes the value back, and restores
//! the parent frame.
//!
//! `distribute` and `mappedType` loop by return: they call their
//! subprogram with a back-offset (-1 and -2, the width of their operands)
//! so the subprogram's `return` re-enters the same opcode for the next
//! iteration.

mod conditional;
mod containers;
mod control;
mod generics;
mod inline;
mod members;
mod scalars;

use std::sync::Arc;

use typevm_program::{PackedProgram, PoolEntry, ReflectionOp};
use typevm_types::{LiteralValue, Type, TypeArena, TypeId, TypeNode, Visibility};

use crate::error::ProcessorError;
use crate::frame::Frame;
use crate::registry::ProcessorRegistry;

/// Pre-allocated operand stack capacity
const STACK_PREALLOC: usize = 128;

/// A single operand stack slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot {
    /// A type node
    Type(TypeId),
    /// A boolean, produced by `extends` and consumed by branches
    Bool(bool),
    /// A return address pushed by the calling convention
    Address(usize),
}

/// The interpreter for one packed program
///
/// A processor is single-shot: construct, [`run`](Processor::run), done.
/// Nested programs reached through `inline`, `inlineCall`, and
/// `classReference` get their own processors sharing the arena and
/// registry.
pub struct Processor<'a> {
    pub(crate) arena: &'a mut TypeArena,
    pub(crate) registry: &'a mut ProcessorRegistry,
    pub(crate) program: Arc<PackedProgram>,
    /// Program counter; -1 before the first opcode
    pub(crate) ip: isize,
    pub(crate) current_op: Option<ReflectionOp>,
    pub(crate) stack: Vec<Slot>,
    pub(crate) frames: Vec<Frame>,
    /// Result anchor: mutated in place by the final structured opcode
    pub(crate) result_type: TypeId,
    /// Top-level type arguments, the fallback inputs of `inlineCall`
    pub(crate) initial_inputs: Vec<TypeId>,
}

impl<'a> Processor<'a> {
    /// Create a processor for `program` whose result anchor is `result_type`
    pub fn new(
        arena: &'a mut TypeArena,
        registry: &'a mut ProcessorRegistry,
        program: Arc<PackedProgram>,
        result_type: TypeId,
    ) -> Self {
        Self {
            arena,
            registry,
            program,
            ip: -1,
            current_op: None,
            stack: Vec::with_capacity(STACK_PREALLOC),
            frames: Vec::new(),
            result_type,
            initial_inputs: Vec::new(),
        }
    }

    /// Execute the program and return the type left on top of the stack
    ///
    /// `initial_stack` seeds the operand stack; `initial_inputs` become the
    /// initial frame's type arguments.
    pub fn run(
        mut self,
        initial_stack: Vec<Slot>,
        initial_inputs: Vec<TypeId>,
    ) -> Result<TypeId, ProcessorError> {
        self.stack.extend(initial_stack);
        self.initial_inputs = initial_inputs.clone();
        self.frames.push(Frame::initial(initial_inputs));

        let len = self.program.ops().len() as isize;
        loop {
            self.ip += 1;
            if self.ip >= len {
                break;
            }
            let raw = self.program.ops()[self.ip as usize];
            let op = match ReflectionOp::from_code(raw) {
                Some(op) => op,
                None => {
                    return Err(ProcessorError::InvalidProgram {
                        index: self.ip as usize,
                        op: format!("op {raw}"),
                        depth: self.frames.len(),
                        reason: "unknown opcode".to_string(),
                    });
                }
            };
            self.current_op = Some(op);
            self.step(op)?;
        }

        self.pop_type()
    }

    fn step(&mut self, op: ReflectionOp) -> Result<(), ProcessorError> {
        match op {
            ReflectionOp::String => self.push_node(TypeNode::String),
            ReflectionOp::Number => self.push_node(TypeNode::Number { brand: None }),
            ReflectionOp::Boolean => self.push_node(TypeNode::Boolean),
            ReflectionOp::Bigint => self.push_node(TypeNode::BigInt),
            ReflectionOp::Void => self.push_node(TypeNode::Void),
            ReflectionOp::Unknown => self.push_node(TypeNode::Unknown),
            ReflectionOp::Object => self.push_node(TypeNode::Object),
            ReflectionOp::Never => self.push_node(TypeNode::Never),
            ReflectionOp::Undefined => self.push_node(TypeNode::Undefined),
            ReflectionOp::Symbol => self.push_node(TypeNode::Symbol),
            ReflectionOp::Null => self.push_node(TypeNode::Null),
            ReflectionOp::Any => self.push_node(TypeNode::Any),
            ReflectionOp::Regexp => self.push_node(TypeNode::Regexp),

            ReflectionOp::Literal => self.op_literal(),
            ReflectionOp::NumberBrand => self.op_number_brand(),
            ReflectionOp::Date => self.push_builtin_class("Date"),
            ReflectionOp::Uint8Array => self.push_builtin_class("Uint8Array"),
            ReflectionOp::Int8Array => self.push_builtin_class("Int8Array"),
            ReflectionOp::Uint8ClampedArray => self.push_builtin_class("Uint8ClampedArray"),
            ReflectionOp::Uint16Array => self.push_builtin_class("Uint16Array"),
            ReflectionOp::Int16Array => self.push_builtin_class("Int16Array"),
            ReflectionOp::Uint32Array => self.push_builtin_class("Uint32Array"),
            ReflectionOp::Int32Array => self.push_builtin_class("Int32Array"),
            ReflectionOp::Float32Array => self.push_builtin_class("Float32Array"),
            ReflectionOp::Float64Array => self.push_builtin_class("Float64Array"),
            ReflectionOp::BigInt64Array => self.push_builtin_class("BigInt64Array"),
            ReflectionOp::ArrayBuffer => self.push_builtin_class("ArrayBuffer"),

            ReflectionOp::Array => self.op_array(),
            ReflectionOp::Tuple => self.op_tuple(),
            ReflectionOp::TupleMember => self.op_tuple_member(),
            ReflectionOp::NamedTupleMember => self.op_named_tuple_member(),
            ReflectionOp::Rest => self.op_rest(),
            ReflectionOp::Set => self.op_set(),
            ReflectionOp::Map => self.op_map(),
            ReflectionOp::Promise => self.op_promise(),
            ReflectionOp::Union => self.op_union(),
            ReflectionOp::Intersection => self.op_intersection(),
            ReflectionOp::TemplateLiteral => self.op_template_literal(),

            ReflectionOp::Class => self.op_class(),
            ReflectionOp::ObjectLiteral => self.op_object_literal(),
            ReflectionOp::Property => self.op_property(false),
            ReflectionOp::PropertySignature => self.op_property(true),
            ReflectionOp::Method => self.op_method(false),
            ReflectionOp::MethodSignature => self.op_method(true),
            ReflectionOp::Function => self.op_function(),
            ReflectionOp::Parameter => self.op_parameter(),
            ReflectionOp::IndexSignature => self.op_index_signature(),
            ReflectionOp::EnumMember => self.op_enum_member(),
            ReflectionOp::Optional => self.op_optional(),
            ReflectionOp::Readonly => self.op_readonly(),
            ReflectionOp::Public => self.op_visibility(Visibility::Public),
            ReflectionOp::Protected => self.op_visibility(Visibility::Protected),
            ReflectionOp::Private => self.op_visibility(Visibility::Private),
            ReflectionOp::Abstract => self.op_abstract(),
            ReflectionOp::DefaultValue => self.op_default_value(),
            ReflectionOp::Description => self.op_description(),

            ReflectionOp::TypeParameter | ReflectionOp::Template => self.op_type_parameter(false),
            ReflectionOp::TypeParameterDefault => self.op_type_parameter(true),
            ReflectionOp::Loads => self.op_loads(),
            ReflectionOp::Arg => self.op_arg(),
            ReflectionOp::Var => self.op_var(),
            ReflectionOp::Infer => self.op_infer(),
            ReflectionOp::Extends => self.op_extends(),
            ReflectionOp::Keyof => self.op_keyof(),
            ReflectionOp::IndexAccess => self.op_index_access(),
            ReflectionOp::Typeof => self.op_typeof(),

            ReflectionOp::Jump => self.op_jump(),
            ReflectionOp::Call => self.op_call(),
            ReflectionOp::Return => self.op_return(),
            ReflectionOp::Frame => self.op_frame(),
            ReflectionOp::MoveFrame => self.op_move_frame(),
            ReflectionOp::JumpCondition => self.op_jump_condition(),
            ReflectionOp::Condition => self.op_condition(),

            ReflectionOp::Distribute => self.op_distribute(),
            ReflectionOp::MappedType => self.op_mapped_type(),

            ReflectionOp::Inline => self.op_inline(),
            ReflectionOp::InlineCall => self.op_inline_call(),
            ReflectionOp::ClassReference => self.op_class_reference(),
            ReflectionOp::Enum => self.op_enum(),
        }
    }

    // ========================================================================
    // Machine state helpers
    // ========================================================================

    pub(crate) fn invalid(&self, reason: impl Into<String>) -> ProcessorError {
        ProcessorError::InvalidProgram {
            index: self.ip.max(0) as usize,
            op: self
                .current_op
                .map(|op| op.name().to_string())
                .unwrap_or_else(|| "start".to_string()),
            depth: self.frames.len(),
            reason: reason.into(),
        }
    }

    pub(crate) fn frame(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    pub(crate) fn frame_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    pub(crate) fn stack_pointer(&self) -> isize {
        self.stack.len() as isize - 1
    }

    /// Truncate so the stack pointer lands on `sp`
    pub(crate) fn truncate_to(&mut self, sp: isize) {
        self.stack.truncate((sp + 1).max(0) as usize);
    }

    pub(crate) fn push(&mut self, slot: Slot) {
        self.stack.push(slot);
    }

    pub(crate) fn push_node(&mut self, node: TypeNode) -> Result<(), ProcessorError> {
        let id = self.arena.alloc(Type::new(node));
        self.push(Slot::Type(id));
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<Slot, ProcessorError> {
        let slot = self.stack.pop();
        slot.ok_or_else(|| self.invalid("stack underflow"))
    }

    pub(crate) fn pop_type(&mut self) -> Result<TypeId, ProcessorError> {
        match self.pop()? {
            Slot::Type(id) => Ok(id),
            other => Err(self.invalid(format!("expected a type on the stack, found {other:?}"))),
        }
    }

    pub(crate) fn pop_bool(&mut self) -> Result<bool, ProcessorError> {
        match self.pop()? {
            Slot::Bool(value) => Ok(value),
            other => {
                Err(self.invalid(format!("expected a boolean on the stack, found {other:?}")))
            }
        }
    }

    /// Write a slot at an absolute stack index, extending the stack if the
    /// index lies just past the top
    pub(crate) fn store_slot(&mut self, index: usize, slot: Slot) {
        if index < self.stack.len() {
            self.stack[index] = slot;
        } else {
            while self.stack.len() < index {
                self.stack.push(Slot::Bool(false));
            }
            self.stack.push(slot);
        }
    }

    pub(crate) fn load_slot(&mut self, index: isize) -> Result<Slot, ProcessorError> {
        if index < 0 {
            return Err(self.invalid("stack slot below frame"));
        }
        let slot = self.stack.get(index as usize).copied();
        slot.ok_or_else(|| self.invalid(format!("unoccupied stack slot {index}")))
    }

    /// Read the next operand, advancing the program counter over it
    pub(crate) fn eat_parameter(&mut self) -> Result<usize, ProcessorError> {
        self.ip += 1;
        let operand = self.program.ops().get(self.ip as usize).copied();
        operand.ok_or_else(|| self.invalid("operand past end of program"))
    }

    /// Whether the opcode being executed is the program's final one
    pub(crate) fn at_final_op(&self) -> bool {
        self.ip as usize == self.program.ops().len() - 1
    }

    pub(crate) fn pool_string(&self, index: usize) -> Result<String, ProcessorError> {
        match self.program.entry(index) {
            Some(PoolEntry::String(s)) => Ok(s.clone()),
            Some(PoolEntry::Number(n)) => Ok(LiteralValue::Number(*n).to_text()),
            Some(other) => {
                Err(self.invalid(format!("expected a name at pool index {index}, found {other:?}")))
            }
            None => Err(self.invalid(format!("pool index {index} out of range"))),
        }
    }

    // ========================================================================
    // Calling convention
    // ========================================================================

    /// Enter a subprogram; see the module docs for the convention
    pub(crate) fn call_subprogram(&mut self, target: usize, return_offset: isize) {
        let address = (self.ip + return_offset).max(0) as usize;
        self.push(Slot::Address(address));
        let start_index = self.stack_pointer();
        let index = self.frames.len();
        self.frames.push(Frame::new(index, start_index));
        self.ip = target as isize - 1;
    }

    /// Pop the current frame and return the types it produced
    ///
    /// The produced list is the slots between the frame's variables and
    /// the top of stack; the stack is truncated back to the frame start.
    pub(crate) fn pop_frame_types(&mut self) -> Result<Vec<TypeId>, ProcessorError> {
        if self.frames.len() <= 1 {
            return Err(self.invalid("no frame to pop"));
        }
        let frame = match self.frames.pop() {
            Some(frame) => frame,
            None => return Err(self.invalid("no frame to pop")),
        };
        let begin = (frame.start_index + 1 + frame.variables as isize).max(0) as usize;
        let tail = self.stack.split_off(begin.min(self.stack.len()));
        self.truncate_to(frame.start_index);
        let mut members = Vec::with_capacity(tail.len());
        for slot in tail {
            match slot {
                Slot::Type(id) => members.push(id),
                other => {
                    return Err(
                        self.invalid(format!("frame produced a non-type slot: {other:?}"))
                    );
                }
            }
        }
        Ok(members)
    }
}
