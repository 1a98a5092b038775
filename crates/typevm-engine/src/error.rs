//! Processor errors
//!
//! The processor trusts its input: recoverable type-level conditions
//! (`never` propagation, exhausted inputs, missing defaults) never error.
//! What does error is a malformed program, a throwing class accessor, or
//! an indexed access against something that is not a type at all. Every
//! error carries the opcode index, opcode name, and frame depth it
//! surfaced at.

use thiserror::Error;

/// Errors surfaced at the `run` boundary
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// Stack underflow, unknown opcode, or a pool/operand index out of range
    #[error("invalid program at op {index} ({op}, frame depth {depth}): {reason}")]
    InvalidProgram {
        /// Opcode index the error surfaced at
        index: usize,
        /// Opcode name, as the transformer spells it
        op: String,
        /// Frame depth at the time of the error
        depth: usize,
        /// What went wrong
        reason: String,
    },

    /// A deferred class accessor failed
    #[error("class accessor at pool index {pool_index} failed at op {index}: {message}")]
    ClassResolution {
        /// Opcode index the accessor was invoked at
        index: usize,
        /// Pool index of the failing accessor
        pool_index: usize,
        /// Failure message reported by the accessor
        message: String,
    },

    /// An indexed access whose base is not a type
    #[error("index access on a non-type base at op {index} ({op}, frame depth {depth})")]
    UnresolvedIndex {
        /// Opcode index the error surfaced at
        index: usize,
        /// Opcode name
        op: String,
        /// Frame depth at the time of the error
        depth: usize,
    },
}
