//! Scripted simulator used by the integration tests

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::thread::{self, JoinHandle};

use pciesim::transport::Transport;

/// A command line as the simulator sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimCommand {
    pub opcode: u8,
    pub address: u32,
    pub data: u32,
    pub length: u16,
    pub tag: u8,
}

/// Parse `OO:AAAAAAAA:DDDDDDDD:LLLL:TT`
pub fn parse_command(line: &str) -> SimCommand {
    let f: Vec<&str> = line.trim().split(':').collect();
    assert_eq!(f.len(), 5, "bad command line {:?}", line);
    SimCommand {
        opcode: u8::from_str_radix(f[0], 16).unwrap(),
        address: u32::from_str_radix(f[1], 16).unwrap(),
        data: u32::from_str_radix(f[2], 16).unwrap(),
        length: u16::from_str_radix(f[3], 16).unwrap(),
        tag: u8::from_str_radix(f[4], 16).unwrap(),
    }
}

/// Format a response line the way the simulator does
pub fn response_line(rsp_type: u8, read_data: u32, tag: u8, status: u8, timestamp: u32) -> String {
    format!(
        "{:02x}:{:08x}:{:02x}:{:02x}:{:08x}\n",
        rsp_type, read_data, tag, status, timestamp
    )
}

/// Simulator-side ends of an in-process connection
pub struct SimEnd {
    pub commands: BufReader<UnixStream>,
    pub responses: UnixStream,
}

impl SimEnd {
    /// Read the next command, `None` once the driver closed its end
    pub fn next_command(&mut self) -> Option<SimCommand> {
        let mut line = String::new();
        match self.commands.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(parse_command(&line)),
        }
    }

    pub fn send_raw(&mut self, line: &str) {
        self.responses.write_all(line.as_bytes()).unwrap();
        self.responses.flush().unwrap();
    }

    pub fn respond(&mut self, cmd: &SimCommand, read_data: u32, status: u8) {
        let line = response_line(cmd.opcode, read_data, cmd.tag, status, 0x10);
        self.send_raw(&line);
    }
}

/// Build a driver transport and the matching simulator ends
pub fn connected_pair() -> (Transport, SimEnd) {
    let (driver_cmd, sim_cmd) = UnixStream::pair().unwrap();
    let (driver_rsp, sim_rsp) = UnixStream::pair().unwrap();
    (
        Transport::from_streams(driver_cmd, driver_rsp),
        SimEnd {
            commands: BufReader::new(sim_cmd),
            responses: sim_rsp,
        },
    )
}

/// Run a simulator that answers each command with `behavior`
///
/// `behavior` returns `(read_data, status)` or `None` to stay silent. The
/// thread stops after a terminate command or when the driver disconnects and
/// returns every command it saw.
pub fn spawn_simulator<F>(mut behavior: F) -> (Transport, JoinHandle<Vec<SimCommand>>)
where
    F: FnMut(&SimCommand) -> Option<(u32, u8)> + Send + 'static,
{
    let (transport, mut sim) = connected_pair();
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        while let Some(cmd) = sim.next_command() {
            seen.push(cmd);
            if cmd.opcode == 0xFF {
                break;
            }
            if let Some((data, status)) = behavior(&cmd) {
                sim.respond(&cmd, data, status);
            }
        }
        seen
    });
    (transport, handle)
}
