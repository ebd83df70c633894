//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! Commands are encoded as a single newline-terminated line:
//! `OO:AAAAAAAA:DDDDDDDD:LLLL:TT\n`.
//!
//! Responses are decoded from `RR:DDDDDDDD:TT:SS:TTTTTTTT`. At least five
//! fields are required; anything after the fifth is ignored.

use crate::error::{Result, SimError};
use super::{Command, Response};

/// Number of fields a response line must carry
pub const MIN_RESPONSE_FIELDS: usize = 5;

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command to its wire line, newline included
pub fn encode_command(command: &Command) -> String {
    format!(
        "{:02x}:{:08x}:{:08x}:{:04x}:{:02x}\n",
        command.opcode as u8, command.address, command.data, command.length, command.tag
    )
}

// =============================================================================
// Response Decoding
// =============================================================================

/// Decode a response line
///
/// Surrounding whitespace (including the trailing newline) is ignored, as is
/// an optional `0x` prefix on each field.
pub fn decode_response(line: &str) -> Result<Response> {
    let line = line.trim();
    let fields: Vec<&str> = line.split(':').collect();

    if fields.len() < MIN_RESPONSE_FIELDS {
        return Err(SimError::Decode(format!(
            "Too few fields in '{}': expected at least {}, got {}",
            line,
            MIN_RESPONSE_FIELDS,
            fields.len()
        )));
    }

    Ok(Response {
        response_type: parse_u8(fields[0], "response_type")?,
        read_data: parse_u32(fields[1], "read_data")?,
        tag: parse_u8(fields[2], "tag")?,
        status: parse_u8(fields[3], "status")?,
        timestamp: parse_u32(fields[4], "timestamp")?,
    })
}

fn strip_hex(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
        .unwrap_or(field)
}

fn parse_u32(field: &str, name: &str) -> Result<u32> {
    u32::from_str_radix(strip_hex(field), 16)
        .map_err(|e| SimError::Decode(format!("Invalid {} '{}': {}", name, field, e)))
}

fn parse_u8(field: &str, name: &str) -> Result<u8> {
    u8::from_str_radix(strip_hex(field), 16)
        .map_err(|e| SimError::Decode(format!("Invalid {} '{}': {}", name, field, e)))
}
