//! Per-opcode typing preconditions, checked against the current register file.

use crate::error::{RejectReason, VerifyError};
use crate::opcode::Opcode;
use crate::overflow::read_register_operand;
use crate::register::{AbstractType, RegisterFile, R0, R1};

/// Check that the instruction at `pc` is well-typed against `regs`.
///
/// Exhaustive over every typed family: generic/typed comparisons,
/// generic/typed unary, logical preconditions, loads, and casts. `return`
/// and the reserved/unsupported families have no typing rule and are
/// rejected earlier (by the overflow checker) or accepted unconditionally.
pub fn check_types(
    regs: &RegisterFile,
    data: &[u8],
    start_pc: usize,
    pc: usize,
    opcode: Opcode,
) -> Result<(), VerifyError> {
    use Opcode::*;

    match opcode {
        Return => Ok(()),

        _ if opcode.is_generic_compare() => check_generic_compare(regs, pc, opcode),
        _ if opcode.is_string_compare() => require_both(regs, pc, opcode, AbstractType::String),
        _ if opcode.is_s64_compare() => require_both(regs, pc, opcode, AbstractType::S64),
        _ if opcode.is_double_compare() => check_double_compare(regs, pc, opcode),

        _ if opcode.is_generic_unary() => {
            let dest = read_register_operand(data, pc);
            check_register_index(dest, pc, opcode)?;
            match regs.get(dest).ty {
                AbstractType::S64 | AbstractType::Double => Ok(()),
                _ => Err(type_mismatch(pc, opcode, "unary operator requires s64 or double")),
            }
        }
        _ if opcode.is_s64_unary() => {
            let dest = read_register_operand(data, pc);
            check_register_index(dest, pc, opcode)?;
            require_dest_type(regs, dest, pc, opcode, AbstractType::S64)
        }
        _ if opcode.is_double_unary() => {
            let dest = read_register_operand(data, pc);
            check_register_index(dest, pc, opcode)?;
            require_dest_type(regs, dest, pc, opcode, AbstractType::Double)
        }

        And | Or => {
            if regs.get(R0).ty != AbstractType::S64 {
                return Err(reject(pc, opcode, RejectReason::LogicalExpectsS64));
            }
            let skip = crate::overflow::read_skip_offset(data, pc);
            let target = (start_pc as i64) + skip;
            if target <= pc as i64 {
                return Err(reject(pc, opcode, RejectReason::BackEdge));
            }
            Ok(())
        }

        _ if opcode.is_typed_field_ref_load() || opcode.is_literal_load() => {
            let dest = read_register_operand(data, pc);
            if !RegisterFile::is_valid(dest) {
                return Err(reject(pc, opcode, RejectReason::BadRegister));
            }
            Ok(())
        }

        CastToS64 => {
            let dest = read_register_operand(data, pc);
            check_register_index(dest, pc, opcode)?;
            match regs.get(dest).ty {
                AbstractType::S64 | AbstractType::Double => Ok(()),
                _ => Err(reject(pc, opcode, RejectReason::CastRequiresNumeric)),
            }
        }
        CastDoubleToS64 => {
            let dest = read_register_operand(data, pc);
            check_register_index(dest, pc, opcode)?;
            if regs.get(dest).ty == AbstractType::Double {
                Ok(())
            } else {
                Err(reject(pc, opcode, RejectReason::CastRequiresDouble))
            }
        }
        CastNop => {
            // No type precondition, but the encoded register index must
            // still exist, even though this form never reads its current
            // type.
            check_register_index(read_register_operand(data, pc), pc, opcode)
        }

        LoadFieldRef => Err(reject(pc, opcode, RejectReason::GenericFieldRef)),

        _ if opcode.is_reserved_arithmetic() || opcode == Unknown => {
            Err(reject(pc, opcode, RejectReason::UnsupportedOp))
        }

        _ => unreachable!("opcode {:?} has no typing rule classified", opcode),
    }
}

fn check_register_index(index: usize, pc: usize, opcode: Opcode) -> Result<(), VerifyError> {
    if RegisterFile::is_valid(index) {
        Ok(())
    } else {
        Err(reject(pc, opcode, RejectReason::BadRegister))
    }
}

fn require_dest_type(
    regs: &RegisterFile,
    dest: usize,
    pc: usize,
    opcode: Opcode,
    expected: AbstractType,
) -> Result<(), VerifyError> {
    if regs.get(dest).ty == expected {
        Ok(())
    } else {
        Err(type_mismatch(
            pc,
            opcode,
            format!("expected {:?}, found {:?}", expected, regs.get(dest).ty),
        ))
    }
}

fn require_both(regs: &RegisterFile, pc: usize, opcode: Opcode, expected: AbstractType) -> Result<(), VerifyError> {
    let (r0, r1) = (regs.get(R0).ty, regs.get(R1).ty);
    if r0 == expected && r1 == expected {
        Ok(())
    } else {
        Err(type_mismatch(
            pc,
            opcode,
            format!("R0={:?} R1={:?}, both must be {:?}", r0, r1, expected),
        ))
    }
}

/// The generic comparison rule: string only with string; s64/double
/// comparable with each other and themselves; `unknown` against anything,
/// including itself, is rejected rather than silently accepted.
fn check_generic_compare(regs: &RegisterFile, pc: usize, opcode: Opcode) -> Result<(), VerifyError> {
    use AbstractType::*;
    let (r0, r1) = (regs.get(R0).ty, regs.get(R1).ty);
    let comparable = matches!(
        (r0, r1),
        (String, String) | (S64, S64) | (S64, Double) | (Double, S64) | (Double, Double)
    );
    if comparable {
        Ok(())
    } else {
        Err(type_mismatch(
            pc,
            opcode,
            format!("R0={:?} R1={:?} are not comparable", r0, r1),
        ))
    }
}

/// Double-typed comparisons additionally accept an s64 operand on either
/// side, provided at least one side is actually `double` (the comparator
/// promotes the s64 side at runtime, which is only meaningful if the other
/// side is genuinely a double).
fn check_double_compare(regs: &RegisterFile, pc: usize, opcode: Opcode) -> Result<(), VerifyError> {
    use AbstractType::*;
    let (r0, r1) = (regs.get(R0).ty, regs.get(R1).ty);
    let both_numeric = matches!(r0, S64 | Double) && matches!(r1, S64 | Double);
    let at_least_one_double = r0 == Double || r1 == Double;
    if both_numeric && at_least_one_double {
        Ok(())
    } else {
        Err(type_mismatch(
            pc,
            opcode,
            format!("R0={:?} R1={:?}, at least one operand must be double", r0, r1),
        ))
    }
}

fn type_mismatch(pc: usize, opcode: Opcode, detail: impl Into<String>) -> VerifyError {
    reject(pc, opcode, RejectReason::TypeMismatch).with_detail(detail)
}

fn reject(pc: usize, opcode: Opcode, reason: RejectReason) -> VerifyError {
    VerifyError::new(pc, opcode.name(), reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::AbstractRegister;

    fn regs_with(r0: AbstractType, r1: AbstractType) -> RegisterFile {
        let mut regs = RegisterFile::new();
        regs.set(
            R0,
            AbstractRegister {
                ty: r0,
                literal: false,
            },
        );
        regs.set(
            R1,
            AbstractRegister {
                ty: r1,
                literal: false,
            },
        );
        regs
    }

    #[test]
    fn generic_eq_rejects_string_vs_s64() {
        let regs = regs_with(AbstractType::String, AbstractType::S64);
        let err = check_types(&regs, &[Opcode::Eq as u8], 0, 0, Opcode::Eq).unwrap_err();
        assert_eq!(err.reason, RejectReason::TypeMismatch);
    }

    #[test]
    fn generic_eq_accepts_s64_vs_double() {
        let regs = regs_with(AbstractType::S64, AbstractType::Double);
        assert!(check_types(&regs, &[Opcode::Eq as u8], 0, 0, Opcode::Eq).is_ok());
    }

    #[test]
    fn generic_eq_rejects_unknown_operand() {
        let regs = regs_with(AbstractType::Unknown, AbstractType::S64);
        let err = check_types(&regs, &[Opcode::Eq as u8], 0, 0, Opcode::Eq).unwrap_err();
        assert_eq!(err.reason, RejectReason::TypeMismatch);
    }

    #[test]
    fn double_compare_rejects_pure_s64() {
        let regs = regs_with(AbstractType::S64, AbstractType::S64);
        let err = check_types(&regs, &[Opcode::EqDouble as u8], 0, 0, Opcode::EqDouble).unwrap_err();
        assert_eq!(err.reason, RejectReason::TypeMismatch);
    }

    #[test]
    fn double_compare_accepts_s64_and_double_mix() {
        let regs = regs_with(AbstractType::S64, AbstractType::Double);
        assert!(check_types(&regs, &[Opcode::EqDouble as u8], 0, 0, Opcode::EqDouble).is_ok());
    }

    #[test]
    fn logical_and_requires_s64_r0() {
        let regs = regs_with(AbstractType::Double, AbstractType::Unknown);
        let mut data = vec![Opcode::And as u8];
        data.extend_from_slice(&100i64.to_ne_bytes());
        let err = check_types(&regs, &data, 0, 0, Opcode::And).unwrap_err();
        assert_eq!(err.reason, RejectReason::LogicalExpectsS64);
    }

    #[test]
    fn logical_and_rejects_back_edge() {
        let regs = regs_with(AbstractType::S64, AbstractType::Unknown);
        let mut data = vec![Opcode::And as u8];
        data.extend_from_slice(&0i64.to_ne_bytes());
        let err = check_types(&regs, &data, 0, 0, Opcode::And).unwrap_err();
        assert_eq!(err.reason, RejectReason::BackEdge);
    }

    #[test]
    fn cast_double_to_s64_requires_double_source() {
        let regs = regs_with(AbstractType::S64, AbstractType::Unknown);
        let data = [Opcode::CastDoubleToS64 as u8, R0 as u8];
        let err = check_types(&regs, &data, 0, 0, Opcode::CastDoubleToS64).unwrap_err();
        assert_eq!(err.reason, RejectReason::CastRequiresDouble);
    }
}
