//! Codec Tests
//!
//! Tests for command encoding and response decoding.

use pciesim::protocol::{decode_response, encode_command, Command, Opcode};
use pciesim::SimError;

// =============================================================================
// Command Encoding Tests
// =============================================================================

#[test]
fn test_encode_config_read_defaults() {
    let cmd = Command::new(Opcode::CfgRead, 0x00, 1);
    assert_eq!(cmd.data, 0);
    assert_eq!(cmd.length, 4);
    assert_eq!(encode_command(&cmd), "01:00000000:00000000:0004:01\n");
}

#[test]
fn test_encode_every_opcode() {
    let cases = [
        (Opcode::CfgRead, "01"),
        (Opcode::CfgWrite, "02"),
        (Opcode::MemRead, "03"),
        (Opcode::MemWrite, "04"),
        (Opcode::LinkStatus, "10"),
        (Opcode::Reset, "11"),
        (Opcode::Terminate, "ff"),
    ];

    for (opcode, prefix) in cases {
        let line = encode_command(&Command::new(opcode, 0, 7));
        assert!(line.starts_with(prefix), "{:?} encoded as {}", opcode, line);
    }
}

#[test]
fn test_encode_field_widths() {
    let cmd = Command::new(Opcode::MemWrite, 0x1000, 0x0a)
        .with_data(0xDEAD_BEEF)
        .with_length(8);
    let line = encode_command(&cmd);

    assert_eq!(line, "04:00001000:deadbeef:0008:0a\n");
    let widths: Vec<usize> = line.trim_end().split(':').map(str::len).collect();
    assert_eq!(widths, vec![2, 8, 8, 4, 2]);
}

// =============================================================================
// Response Decoding Tests
// =============================================================================

#[test]
fn test_decode_reference_line() {
    let rsp = decode_response("01:89abcdef:01:00:00000010").unwrap();
    assert_eq!(rsp.response_type, 0x01);
    assert_eq!(rsp.read_data, 0x89ab_cdef);
    assert_eq!(rsp.tag, 0x01);
    assert_eq!(rsp.status, 0);
    assert_eq!(rsp.timestamp, 0x10);
    assert!(rsp.is_ok());
}

#[test]
fn test_decode_field_extremes() {
    let cases: [(u8, u32, u8, u8, u32); 3] = [
        (0, 0, 0, 0, 0),
        (0xFF, u32::MAX, 0xFF, 0xFF, u32::MAX),
        (0x10, 0x8000_0001, 0x80, 0x01, 0x7FFF_FFFF),
    ];

    for (rsp_type, data, tag, status, ts) in cases {
        let line = format!("{:02x}:{:08x}:{:02x}:{:02x}:{:08x}\n", rsp_type, data, tag, status, ts);
        let rsp = decode_response(&line).unwrap();
        assert_eq!(
            (rsp.response_type, rsp.read_data, rsp.tag, rsp.status, rsp.timestamp),
            (rsp_type, data, tag, status, ts)
        );
    }
}

#[test]
fn test_decode_uppercase_hex() {
    let rsp = decode_response("0F:DEADBEEF:A0:00:0000FFFF").unwrap();
    assert_eq!(rsp.read_data, 0xDEAD_BEEF);
    assert_eq!(rsp.tag, 0xA0);
}

#[test]
fn test_decode_nonzero_status_is_not_ok() {
    let rsp = decode_response("02:00000000:05:01:00000000").unwrap();
    assert!(!rsp.is_ok());
}

#[test]
fn test_decode_ignores_extra_fields() {
    let rsp = decode_response("03:00000042:07:00:00000001:extra:stuff").unwrap();
    assert_eq!(rsp.read_data, 0x42);
    assert_eq!(rsp.tag, 7);
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_decode_too_few_fields() {
    let result = decode_response("01:00000000:01:00");
    match result {
        Err(SimError::Decode(msg)) => assert!(msg.contains("Too few fields")),
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[test]
fn test_decode_non_hex_field() {
    let result = decode_response("01:zzzzzzzz:01:00:00000000");
    match result {
        Err(SimError::Decode(msg)) => assert!(msg.contains("read_data")),
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[test]
fn test_decode_empty_field() {
    assert!(decode_response("01::01:00:00000000").is_err());
}

#[test]
fn test_decode_empty_line() {
    assert!(decode_response("").is_err());
}
