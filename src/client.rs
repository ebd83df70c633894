//! Client Module
//!
//! Typed simulator operations built on the correlator.
//!
//! ## Error Policy
//! Only [`SimClient::connect`] returns an error. Every operation after that
//! reports failure as `None` / `false` and logs the cause: a non-zero status,
//! a timeout or a failed send all look the same to the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::Config;
use crate::correlator::{Correlator, Inbox};
use crate::dispatcher::{Dispatcher, DispatcherState};
use crate::error::Result;
use crate::protocol::{LinkStatus, Opcode, Response, DEFAULT_LENGTH};
use crate::transport::Transport;

/// A connected simulator session
pub struct SimClient {
    config: Config,
    correlator: Correlator,
    dispatcher: Mutex<Dispatcher>,
    connected: AtomicBool,
}

impl SimClient {
    /// Open both pipes and start the response dispatcher
    ///
    /// Blocks until the simulator has opened its ends of the pipes.
    pub fn connect(config: Config) -> Result<Self> {
        config.validate()?;

        tracing::info!("Connecting to PCIe simulation...");
        tracing::info!("Command pipe: {}", config.cmd_pipe_path.display());
        tracing::info!("Response pipe: {}", config.rsp_pipe_path.display());

        let transport = Transport::open(&config.cmd_pipe_path, &config.rsp_pipe_path)
            .map_err(|e| {
                tracing::error!("Failed to connect: {}", e);
                e
            })?;

        let client = Self::with_transport(transport, config)?;
        tracing::info!("Connected to PCIe simulation");
        Ok(client)
    }

    /// Start a session over an already open transport
    pub fn with_transport(transport: Transport, config: Config) -> Result<Self> {
        config.validate()?;

        let (writer, reader) = transport.into_halves();
        let inbox = Arc::new(Inbox::new());

        let mut dispatcher = Dispatcher::new();
        dispatcher.start(reader, Arc::clone(&inbox))?;

        Ok(Self {
            config,
            correlator: Correlator::new(writer, inbox),
            dispatcher: Mutex::new(dispatcher),
            connected: AtomicBool::new(true),
        })
    }

    // =========================================================================
    // Configuration Space
    // =========================================================================

    /// Read a configuration register
    pub fn config_read(&self, address: u32) -> Option<u32> {
        match self.request(Opcode::CfgRead, address, 0, self.config.default_timeout) {
            Some(rsp) => {
                tracing::info!("Config Read [0x{:03x}] = 0x{:08x}", address, rsp.read_data);
                Some(rsp.read_data)
            }
            None => {
                tracing::info!("Config Read [0x{:03x}] failed", address);
                None
            }
        }
    }

    /// Write a configuration register
    pub fn config_write(&self, address: u32, data: u32) -> bool {
        let ok = self
            .request(Opcode::CfgWrite, address, data, self.config.default_timeout)
            .is_some();
        tracing::info!(
            "Config Write [0x{:03x}] = 0x{:08x} {}",
            address,
            data,
            if ok { "ok" } else { "failed" }
        );
        ok
    }

    // =========================================================================
    // Memory Space
    // =========================================================================

    /// Read a 32-bit word of device memory
    pub fn memory_read(&self, address: u32) -> Option<u32> {
        match self.request(Opcode::MemRead, address, 0, self.config.default_timeout) {
            Some(rsp) => {
                tracing::info!("Memory Read [0x{:08x}] = 0x{:08x}", address, rsp.read_data);
                Some(rsp.read_data)
            }
            None => {
                tracing::info!("Memory Read [0x{:08x}] failed", address);
                None
            }
        }
    }

    /// Write a 32-bit word of device memory
    pub fn memory_write(&self, address: u32, data: u32) -> bool {
        let ok = self
            .request(Opcode::MemWrite, address, data, self.config.default_timeout)
            .is_some();
        tracing::info!(
            "Memory Write [0x{:08x}] = 0x{:08x} {}",
            address,
            data,
            if ok { "ok" } else { "failed" }
        );
        ok
    }

    // =========================================================================
    // Link and System Control
    // =========================================================================

    /// Query the LTSSM state of the simulated link
    pub fn get_link_status(&self) -> Option<LinkStatus> {
        match self.request(Opcode::LinkStatus, 0, 0, self.config.default_timeout) {
            Some(rsp) => {
                let status = LinkStatus::from_read_data(rsp.read_data);
                tracing::info!("Link Status: {} (0x{:02x})", status, status.code());
                Some(status)
            }
            None => {
                tracing::info!("Get link status failed");
                None
            }
        }
    }

    /// Reset the simulated system, allowing the longer reset timeout
    pub fn reset_system(&self) -> bool {
        let ok = self
            .request(Opcode::Reset, 0, 0, self.config.reset_timeout)
            .is_some();
        if ok {
            tracing::info!("System reset completed");
        } else {
            tracing::info!("System reset failed");
        }
        ok
    }

    /// Tell the simulator to exit
    ///
    /// No response is awaited; success means the command was written.
    pub fn terminate_simulation(&self) -> bool {
        match self.correlator.send(Opcode::Terminate, 0, 0, DEFAULT_LENGTH) {
            Ok(_) => {
                tracing::info!("Termination command sent to simulation");
                true
            }
            Err(_) => false,
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Tell the simulator to exit, then disconnect
    ///
    /// Used when the session is interrupted. Returns whether the terminate
    /// command was sent.
    pub fn shutdown(&self) -> bool {
        let sent = self.terminate_simulation();
        self.disconnect();
        sent
    }

    /// Close both pipes and stop the dispatcher. Idempotent.
    ///
    /// Once this returns the response pipe is closed and no further
    /// responses are processed.
    pub fn disconnect(&self) {
        if !self.connected.swap(false, Ordering::SeqCst) {
            return;
        }

        self.correlator.close();
        if let Some(stats) = self.dispatcher.lock().stop() {
            tracing::debug!("Dispatcher stats: {:?}", stats);
        }
        tracing::info!("Disconnected from PCIe simulation");
    }

    /// Whether the dispatcher is still reading responses
    pub fn dispatcher_state(&self) -> DispatcherState {
        self.dispatcher.lock().state()
    }

    /// Responses dropped because their caller had already given up
    pub fn orphaned_responses(&self) -> u64 {
        self.correlator.inbox().orphaned()
    }

    /// Send and wait, folding every failure into `None`
    fn request(&self, opcode: Opcode, address: u32, data: u32, timeout: Duration) -> Option<Response> {
        let response = match self
            .correlator
            .send_and_wait(opcode, address, data, DEFAULT_LENGTH, timeout)
        {
            Ok(rsp) => rsp,
            Err(e) => {
                tracing::warn!("{:?} at 0x{:08x}: {}", opcode, address, e);
                return None;
            }
        };

        if !response.is_ok() {
            tracing::warn!(
                "{:?} at 0x{:08x}: simulator returned status 0x{:02x}",
                opcode,
                address,
                response.status
            );
            return None;
        }
        Some(response)
    }
}

impl Drop for SimClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}
