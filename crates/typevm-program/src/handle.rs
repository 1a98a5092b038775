//! Deferred accessors stored in the literal pool
//!
//! Classes referenced by a program are not resolved at decode time; the
//! pool stores nullary closures so that mutually recursive classes can be
//! linked lazily. The same applies to nested programs and to the runtime
//! values consumed by `typeof` and `enum`.

use std::fmt;
use std::sync::Arc;

use crate::program::PackedProgram;
use crate::value::RuntimeValue;

/// A resolved class reference
///
/// Carries the class name and, when the transformer embedded one, the
/// packed program describing the class type (the `__type` association).
pub struct ClassHandle {
    /// Class name, used for diagnostics and bare references
    pub name: String,
    /// Embedded type program, if the class was processed by the transformer
    pub type_program: Option<Arc<PackedProgram>>,
}

impl ClassHandle {
    /// Create a handle without an embedded program
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { name: name.into(), type_program: None })
    }

    /// Create a handle carrying an embedded type program
    pub fn with_program(name: impl Into<String>, program: Arc<PackedProgram>) -> Arc<Self> {
        Arc::new(Self { name: name.into(), type_program: Some(program) })
    }
}

impl fmt::Debug for ClassHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassHandle")
            .field("name", &self.name)
            .field("has_program", &self.type_program.is_some())
            .finish()
    }
}

/// Deferred class accessor; an `Err` maps to a class resolution failure
pub type ClassThunk = Arc<dyn Fn() -> Result<Arc<ClassHandle>, String> + Send + Sync>;

/// Deferred accessor for a nested packed program
pub type ProgramThunk = Arc<dyn Fn() -> Arc<PackedProgram> + Send + Sync>;

/// Deferred accessor for a runtime value, consumed by `typeof`
pub type ValueThunk = Arc<dyn Fn() -> RuntimeValue + Send + Sync>;

/// Deferred accessor for enum members in declaration order
///
/// A `None` value means the member takes the next auto-incremented number.
pub type EnumThunk = Arc<dyn Fn() -> Vec<(String, Option<RuntimeValue>)> + Send + Sync>;
