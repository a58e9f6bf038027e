//! Integration tests against the public API, one test per accept/reject
//! scenario.

use tracefilter_verify::prelude::*;

fn load_s64(reg: u8, value: i64) -> Vec<u8> {
    let mut v = vec![Opcode::LoadS64 as u8, reg];
    v.extend_from_slice(&value.to_ne_bytes());
    v
}

fn accept(data: Vec<u8>) {
    let bytecode = Bytecode::from(data);
    assert!(validate(&bytecode).is_ok(), "expected accept");
}

fn reject_with(data: Vec<u8>, reason: RejectReason) {
    let bytecode = Bytecode::from(data);
    let err = validate(&bytecode).expect_err("expected reject");
    assert_eq!(err.reason, reason);
}

#[test]
fn trivial_program_is_accepted() {
    let mut data = load_s64(0, 1);
    data.extend(load_s64(1, 2));
    data.push(Opcode::EqS64 as u8);
    data.push(Opcode::Return as u8);
    accept(data);
}

#[test]
fn generic_comparison_type_mismatch_is_rejected() {
    let mut data = vec![Opcode::LoadString as u8, 0];
    data.extend_from_slice(b"x\0");
    data.extend(load_s64(1, 1));
    data.push(Opcode::Eq as u8);
    data.push(Opcode::Return as u8);
    reject_with(data, RejectReason::TypeMismatch);
}

#[test]
fn back_edge_rejected() {
    let mut data = load_s64(0, 1);
    let and_pc = data.len() as i64;
    data.push(Opcode::And as u8);
    data.extend_from_slice(&and_pc.to_ne_bytes());
    data.push(Opcode::Return as u8);
    reject_with(data, RejectReason::BackEdge);
}

#[test]
fn overflow_on_truncated_double_literal() {
    let mut data = vec![Opcode::LoadDouble as u8, 0];
    data.extend_from_slice(&[0u8; 3]);
    reject_with(data, RejectReason::Overflow);
}

#[test]
fn unterminated_string_literal_is_rejected() {
    let mut data = vec![Opcode::LoadString as u8, 0];
    data.extend_from_slice(b"never ends");
    reject_with(data, RejectReason::StringUnterminated);
}

#[test]
fn unknown_opcode_byte_is_rejected() {
    reject_with(vec![0xff], RejectReason::UnknownOp);
}

#[test]
fn unsupported_arithmetic_opcode_is_rejected() {
    reject_with(vec![Opcode::Div as u8], RejectReason::UnsupportedOp);
}

#[test]
fn generic_field_ref_load_must_be_type_specialised() {
    reject_with(vec![Opcode::LoadFieldRef as u8], RejectReason::GenericFieldRef);
}

#[test]
fn cast_from_string_register_is_rejected() {
    let mut data = vec![Opcode::LoadString as u8, 0];
    data.extend_from_slice(b"x\0");
    data.push(Opcode::CastToS64 as u8);
    data.push(0);
    reject_with(data, RejectReason::CastRequiresNumeric);
}

#[test]
fn double_to_s64_cast_from_s64_source_is_rejected() {
    let mut data = load_s64(0, 3);
    data.push(Opcode::CastDoubleToS64 as u8);
    data.push(0);
    reject_with(data, RejectReason::CastRequiresDouble);
}

#[test]
fn cast_nop_has_no_preconditions() {
    let mut data = Vec::new();
    data.push(Opcode::CastNop as u8);
    data.push(0);
    data.push(Opcode::Return as u8);
    accept(data);
}

#[test]
fn empty_program_is_accepted() {
    accept(Vec::new());
}

#[test]
fn validate_with_limits_rejects_oversized_programs() {
    let data = vec![Opcode::Return as u8; 100];
    let bytecode = Bytecode::from(data);
    let limits = Limits {
        max_program_len: 10,
    };
    let err = validate_with_limits(&bytecode, &limits).unwrap_err();
    assert_eq!(err.reason, RejectReason::Overflow);
}

/// Validating the same bytes twice agrees with itself.
#[test]
fn revalidating_the_same_bytecode_agrees_with_itself() {
    let mut data = load_s64(0, 5);
    data.push(Opcode::UnaryMinusS64 as u8);
    data.push(0);
    data.push(Opcode::Return as u8);
    let bytecode = Bytecode::from(data);
    let first = validate(&bytecode).is_ok();
    let second = validate(&bytecode).is_ok();
    assert_eq!(first, second);
}
