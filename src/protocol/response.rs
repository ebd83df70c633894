//! Response definitions
//!
//! Represents responses produced by the simulator.

/// Status value reported for a successful command
pub const STATUS_OK: u8 = 0x00;

/// A decoded response line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    /// Response type (usually echoes the opcode)
    pub response_type: u8,

    /// Data returned by reads, link status etc.
    pub read_data: u32,

    /// Tag of the command this answers
    pub tag: u8,

    /// 0 on success
    pub status: u8,

    /// Simulator timestamp
    pub timestamp: u32,
}

impl Response {
    /// Whether the simulator reported success
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}
