//! Static verifier for a register-based event-filter bytecode VM.
//!
//! Untrusted bytecode is submitted to an event-tracing runtime from outside
//! the process; before an interpreter may evaluate it on hot event paths,
//! [`validate`] proves every possible execution path is type-safe and
//! bounded. This crate performs that proof (parsing, overflow checking,
//! abstract register-type tracking, and merge-point reconciliation) in a
//! single forward pass. It does not execute bytecode, optimize it, or
//! compile it to any lower form.

pub mod bytecode;
pub mod error;
pub mod exec;
pub mod limits;
pub mod merge;
pub mod opcode;
pub mod overflow;
pub mod register;
pub mod types;
pub mod verifier;

pub mod prelude {
    pub use crate::bytecode::Bytecode;
    pub use crate::error::{RejectReason, VerifyError, VerifyResult};
    pub use crate::limits::Limits;
    pub use crate::opcode::Opcode;
    pub use crate::register::{AbstractRegister, AbstractType, RegisterFile};
    pub use crate::verifier::{validate, validate_with_limits};
}

pub use prelude::*;
