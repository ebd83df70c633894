//! Command definitions
//!
//! Represents commands sent to the simulator.

/// Transfer length used when a command does not specify one
pub const DEFAULT_LENGTH: u16 = 4;

/// Command opcodes understood by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    CfgRead = 0x01,
    CfgWrite = 0x02,
    MemRead = 0x03,
    MemWrite = 0x04,
    LinkStatus = 0x10,
    Reset = 0x11,
    Terminate = 0xFF,
}

/// A single command addressed to the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub opcode: Opcode,
    pub address: u32,
    pub data: u32,
    pub length: u16,
    pub tag: u8,
}

impl Command {
    /// Create a command with zero data and the default length
    pub fn new(opcode: Opcode, address: u32, tag: u8) -> Self {
        Self {
            opcode,
            address,
            data: 0,
            length: DEFAULT_LENGTH,
            tag,
        }
    }

    /// Set the data word
    pub fn with_data(mut self, data: u32) -> Self {
        self.data = data;
        self
    }

    /// Set the transfer length
    pub fn with_length(mut self, length: u16) -> Self {
        self.length = length;
        self
    }
}
