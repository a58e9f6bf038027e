//! The abstract executor: per-opcode effect on the register file, plus the
//! program-counter advance every instruction performs.

use crate::opcode::Opcode;
use crate::overflow::{instruction_len, read_register_operand};
use crate::register::{AbstractRegister, AbstractType, RegisterFile, R0};
use crate::{error::VerifyError, merge::MergePoints};

/// Either the scan should continue at `next_pc`, or a `return` was reached
/// and the scan is done.
pub enum Step {
    Continue(usize),
    Stop,
}

/// Apply `opcode`'s effect to `regs`, queue a merge point for logical
/// operators, and report how the program counter advances.
///
/// Register-index and type preconditions have already been checked by
/// [`crate::types::check_types`] by the time this runs; this function only
/// ever reads register indices it knows are in range.
pub fn step(
    regs: &mut RegisterFile,
    merge_points: &mut MergePoints,
    data: &[u8],
    start_pc: usize,
    pc: usize,
    opcode: Opcode,
) -> Result<Step, VerifyError> {
    let len = instruction_len(data, start_pc, pc, opcode)?;

    use Opcode::*;
    match opcode {
        Return => return Ok(Step::Stop),

        _ if opcode.is_generic_compare() || opcode.is_string_compare() || opcode.is_s64_compare() => {
            write(regs, R0, AbstractType::S64, false);
        }
        _ if opcode.is_double_compare() => {
            // The observable result is boolean, but the source-authored
            // bytecode's double-comparator leaves R0 typed as double; the
            // type-rule checker must (and does) tolerate this afterwards.
            write(regs, R0, AbstractType::Double, false);
        }

        _ if opcode.is_generic_unary() || opcode.is_s64_unary() => {
            write(regs, R0, AbstractType::S64, false);
        }
        _ if opcode.is_double_unary() => {
            write(regs, R0, AbstractType::Double, false);
        }

        And | Or => {
            let skip = crate::overflow::read_skip_offset(data, pc);
            let target = (start_pc as i64 + skip) as usize;
            merge_points.push(target, regs.clone());
            // Falls through to the short-circuit-not-taken successor; the
            // register file itself is untouched.
        }

        _ if opcode.is_typed_field_ref_load() => {
            let dest = read_register_operand(data, pc);
            let ty = match opcode {
                LoadFieldRefString => AbstractType::String,
                LoadFieldRefSequence => AbstractType::String,
                LoadFieldRefS64 => AbstractType::S64,
                LoadFieldRefDouble => AbstractType::Double,
                _ => unreachable!(),
            };
            write(regs, dest, ty, false);
        }

        LoadString => write(regs, read_register_operand(data, pc), AbstractType::String, true),
        LoadS64 => write(regs, read_register_operand(data, pc), AbstractType::S64, true),
        LoadDouble => write(regs, read_register_operand(data, pc), AbstractType::Double, true),

        CastToS64 | CastDoubleToS64 => {
            let dest = read_register_operand(data, pc);
            regs.set(
                dest,
                AbstractRegister {
                    ty: AbstractType::S64,
                    literal: regs.get(dest).literal,
                },
            );
        }
        CastNop => {}

        _ if opcode.is_reserved_arithmetic() || opcode == Unknown || opcode == LoadFieldRef => {
            unreachable!("rejected before step() is reached")
        }

        _ => unreachable!("opcode {:?} has no abstract effect classified", opcode),
    }

    Ok(Step::Continue(pc + len))
}

fn write(regs: &mut RegisterFile, index: usize, ty: AbstractType, literal: bool) {
    regs.set(index, AbstractRegister { ty, literal });
}
