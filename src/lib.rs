//! # pciesim
//!
//! Client-side driver for a PCIe hardware simulator reached over two named
//! pipes:
//! - Line-oriented hex wire protocol
//! - Background dispatcher draining the response pipe
//! - Tag-based correlation of out-of-order responses
//! - Typed config/memory/link/reset operations
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SimClient                             │
//! │   config_read / config_write / memory_* / link / reset       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Correlator                              │
//! │           (tag allocation, bounded waits)                    │
//! └──────────┬───────────────────────────────────▲──────────────┘
//!            │ encode                            │ publish
//!            ▼                                   │
//!   ┌─────────────────┐                 ┌────────┴────────┐
//!   │  CommandWriter  │                 │      Inbox      │
//!   │  (cmd pipe)     │                 │  (tag → waiter) │
//!   └────────┬────────┘                 └────────▲────────┘
//!            │                                   │ decode
//!            ▼                                   │
//!     ┌─────────────┐                   ┌────────┴────────┐
//!     │  Simulator  │ ────────────────► │   Dispatcher    │
//!     └─────────────┘    (rsp pipe)     │  (own thread)   │
//!                                       └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod transport;
pub mod correlator;
pub mod dispatcher;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SimError, Result};
pub use config::Config;
pub use client::SimClient;
pub use protocol::{LinkStatus, LtssmState, Opcode};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of pciesim
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
