//! The driver: ties the decoder, overflow checker, type-rule checker,
//! executor, and merge-point table together into one forward scan.

use tracing::{debug, trace, warn};

use crate::bytecode::Bytecode;
use crate::error::{RejectReason, VerifyError, VerifyResult};
use crate::exec::{step, Step};
use crate::limits::Limits;
use crate::merge::MergePoints;
use crate::opcode::Opcode;
use crate::overflow::instruction_len;
use crate::register::RegisterFile;
use crate::types::check_types;

/// Validate `bytecode` against the default [`Limits`].
pub fn validate<D>(bytecode: &Bytecode<D>) -> VerifyResult<()> {
    validate_with_limits(bytecode, &Limits::default())
}

/// Validate `bytecode`, rejecting up front if it exceeds `limits`.
///
/// Performs exactly one forward pass over the instruction stream: at each
/// reached PC it reconciles any merge points targeting that PC, type-checks
/// the instruction, then applies its abstract effect and advances. The
/// first violation encountered anywhere in that pass is terminal; there
/// is no partial acceptance.
pub fn validate_with_limits<D>(bytecode: &Bytecode<D>, limits: &Limits) -> VerifyResult<()> {
    let data = bytecode.data();
    if data.len() > limits.max_program_len {
        return Err(VerifyError::new(0, "<program>", RejectReason::Overflow)
            .with_detail(format!("program length {} exceeds limit {}", data.len(), limits.max_program_len)));
    }

    let start_pc = 0usize;
    let mut regs = RegisterFile::new();
    let mut merge_points = MergePoints::new();
    let mut pc = start_pc;

    debug!(len = data.len(), "starting bytecode validation");

    loop {
        if pc >= data.len() {
            break;
        }

        let opcode = Opcode::decode(data[pc]);
        trace!(pc, opcode = opcode.name(), "visiting instruction");

        // Every instruction (and its trailing payload) must fit.
        instruction_len(data, start_pc, pc, opcode).map_err(|e| reject(&e))?;

        // Reconcile every merge point targeting this PC before trusting the
        // scan's own inferred register file here.
        for snapshot in merge_points.drain(pc) {
            check_types(&snapshot, data, start_pc, pc, opcode).map_err(|e| reject(&e))?;
        }

        // The scan's own path must also type-check.
        check_types(&regs, data, start_pc, pc, opcode).map_err(|e| reject(&e))?;

        // Apply the effect and advance.
        match step(&mut regs, &mut merge_points, data, start_pc, pc, opcode).map_err(|e| reject(&e))? {
            Step::Continue(next_pc) => pc = next_pc,
            Step::Stop => break,
        }
    }

    // Nothing may be left dangling: every queued merge point must have been
    // reached and reconciled by the time the scan ends.
    if !merge_points.is_empty() {
        let target = merge_points.any_remaining_target().unwrap_or(pc);
        let err = VerifyError::new(target, "<merge>", RejectReason::UnreachableMerge)
            .with_detail(format!("merge point targeting pc={target} was never reached"));
        return Err(reject(&err));
    }

    debug!("bytecode accepted");
    Ok(())
}

fn reject(err: &VerifyError) -> VerifyError {
    warn!(pc = err.pc, opcode = err.opcode_name, reason = %err.reason, "bytecode rejected");
    err.clone()
}
