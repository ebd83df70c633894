//! Protocol Module
//!
//! Defines the line-oriented text protocol spoken with the simulator.
//!
//! ## Command Line
//! ```text
//! ┌────────┬──────────────┬──────────────┬──────────┬────────┐
//! │ OO (2) │ AAAAAAAA (8) │ DDDDDDDD (8) │ LLLL (4) │ TT (2) │ \n
//! └────────┴──────────────┴──────────────┴──────────┴────────┘
//!  opcode    address        data           length     tag
//! ```
//!
//! ## Response Line
//! ```text
//! ┌────────┬──────────────┬────────┬────────┬──────────────┐
//! │ RR (2) │ DDDDDDDD (8) │ TT (2) │ SS (2) │ TTTTTTTT (8) │ \n
//! └────────┴──────────────┴────────┴────────┴──────────────┘
//!  type      read data      tag      status   timestamp
//! ```
//!
//! All fields are lowercase hex separated by `:`.
//!
//! ### Opcodes
//! - 0x01: CFG_READ
//! - 0x02: CFG_WRITE
//! - 0x03: MEM_READ
//! - 0x04: MEM_WRITE
//! - 0x10: LINK_STATUS
//! - 0x11: RESET
//! - 0xFF: TERMINATE

mod command;
mod response;
mod codec;
mod ltssm;

pub use command::{Command, Opcode, DEFAULT_LENGTH};
pub use response::{Response, STATUS_OK};
pub use codec::{encode_command, decode_response, MIN_RESPONSE_FIELDS};
pub use ltssm::{LinkStatus, LtssmState, LTSSM_MASK};
