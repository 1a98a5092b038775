//! Control flow opcode handlers

use crate::error::ProcessorError;
use crate::frame::Frame;

use super::{Processor, Slot};

impl Processor<'_> {
    pub(super) fn op_jump(&mut self) -> Result<(), ProcessorError> {
        let target = self.eat_parameter()?;
        self.ip = target as isize - 1;
        Ok(())
    }

    pub(super) fn op_call(&mut self) -> Result<(), ProcessorError> {
        let target = self.eat_parameter()?;
        self.call_subprogram(target, 1);
        Ok(())
    }

    /// Return to the address stored at the frame start
    pub(super) fn op_return(&mut self) -> Result<(), ProcessorError> {
        let value = self.pop()?;
        if self.frames.len() <= 1 {
            return Err(self.invalid("return outside of a call"));
        }
        let frame = match self.frames.pop() {
            Some(frame) => frame,
            None => return Err(self.invalid("return outside of a call")),
        };
        if frame.start_index < 0 {
            return Err(self.invalid("return frame without an address slot"));
        }
        let address = match self.load_slot(frame.start_index)? {
            Slot::Address(address) => address,
            other => {
                return Err(self.invalid(format!("missing return address, found {other:?}")));
            }
        };
        self.truncate_to(frame.start_index - 1);
        self.push(value);
        self.ip = address as isize - 1;
        Ok(())
    }

    /// Open a frame without a call, bracketing a variadic production
    pub(super) fn op_frame(&mut self) -> Result<(), ProcessorError> {
        let index = self.frames.len();
        let start_index = self.stack_pointer();
        self.frames.push(Frame::new(index, start_index));
        Ok(())
    }

    /// Discard the current frame, preserving the top value
    pub(super) fn op_move_frame(&mut self) -> Result<(), ProcessorError> {
        let value = self.pop()?;
        if self.frames.len() <= 1 {
            return Err(self.invalid("no frame to discard"));
        }
        let frame = match self.frames.pop() {
            Some(frame) => frame,
            None => return Err(self.invalid("no frame to discard")),
        };
        self.truncate_to(frame.start_index);
        self.push(value);
        Ok(())
    }

    /// Pop a boolean and call the matching branch subprogram
    pub(super) fn op_jump_condition(&mut self) -> Result<(), ProcessorError> {
        let then_target = self.eat_parameter()?;
        let else_target = self.eat_parameter()?;
        let condition = self.pop_bool()?;
        let target = if condition { then_target } else { else_target };
        self.call_subprogram(target, 1);
        Ok(())
    }

    /// Select between two already-evaluated branches
    pub(super) fn op_condition(&mut self) -> Result<(), ProcessorError> {
        let right = self.pop_type()?;
        let left = self.pop_type()?;
        let condition = self.pop_bool()?;
        if self.frames.len() <= 1 {
            return Err(self.invalid("condition outside of a frame"));
        }
        let frame = match self.frames.pop() {
            Some(frame) => frame,
            None => return Err(self.invalid("condition outside of a frame")),
        };
        self.truncate_to(frame.start_index);
        let selected = if condition { left } else { right };
        self.push(Slot::Type(selected));
        Ok(())
    }
}
