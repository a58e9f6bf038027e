//! Rejection reasons and the wrapping verification error.

use core::fmt;

use thiserror::Error;

/// Stable, small-integer-backed rejection kind.
///
/// This is the part of [`VerifyError`] callers are expected to match on;
/// the human-readable diagnostic lives on the wrapping error, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum RejectReason {
    /// The opcode byte does not map to any known instruction.
    UnknownOp,
    /// The opcode is recognised but intentionally unsupported by this VM.
    UnsupportedOp,
    /// An instruction or its trailing payload does not fit within the program.
    Overflow,
    /// A string literal has no terminating NUL byte within the program.
    StringUnterminated,
    /// An instruction selects a register index that does not exist.
    BadRegister,
    /// Operand types are incompatible for the given operator.
    TypeMismatch,
    /// A logical operator's `R0` operand is not `s64`.
    LogicalExpectsS64,
    /// A `double`-typed cast requires the source register to be `double`.
    CastRequiresDouble,
    /// A numeric cast requires the source register to be `s64` or `double`.
    CastRequiresNumeric,
    /// A jump offset does not point strictly forward of the jumping instruction.
    BackEdge,
    /// The merge-point table was non-empty when the scan ended.
    UnreachableMerge,
    /// A field-ref load opcode was not type-specialised.
    GenericFieldRef,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UnknownOp => "unknown bytecode op",
            Self::UnsupportedOp => "unsupported",
            Self::Overflow => "overflow",
            Self::StringUnterminated => "string literal is not NUL-terminated",
            Self::BadRegister => "invalid register index",
            Self::TypeMismatch => "type mismatch",
            Self::LogicalExpectsS64 => "logical operator expects an s64 operand",
            Self::CastRequiresDouble => "cast requires a double source",
            Self::CastRequiresNumeric => "cast requires a numeric (s64 or double) source",
            Self::BackEdge => "loops are not allowed in bytecode",
            Self::UnreachableMerge => "unexpected merge points",
            Self::GenericFieldRef => "unknown field ref type",
        };
        f.write_str(s)
    }
}

/// A rejection of the program under validation, with enough context to
/// reconstruct why a human would reject it: the offending program counter,
/// the opcode name, and (where relevant) register indices/types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("at pc={pc} ({opcode_name}): {reason}{detail}")]
pub struct VerifyError {
    /// Byte offset of the instruction that triggered the rejection.
    pub pc: usize,
    /// Debug name of the opcode at `pc`, e.g. `"eq_s64"`.
    pub opcode_name: &'static str,
    /// The stable reason kind.
    pub reason: RejectReason,
    /// Free-form detail appended to the diagnostic (register indices, types).
    pub detail: String,
}

impl VerifyError {
    pub(crate) fn new(pc: usize, opcode_name: &'static str, reason: RejectReason) -> Self {
        Self {
            pc,
            opcode_name,
            reason,
            detail: String::new(),
        }
    }

    pub(crate) fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = format!(": {}", detail.into());
        self
    }
}

/// Outcome of validating one program.
pub type VerifyResult<T> = Result<T, VerifyError>;
