//! CLI Tests
//!
//! Runs the `pciesim-cli` binary against named pipes.

mod common;

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use nix::sys::signal::{kill, Signal};
use nix::sys::stat::Mode;
use nix::unistd::{mkfifo, Pid};
use tempfile::TempDir;

use common::{parse_command, response_line};

fn setup_fifos() -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let cmd = temp_dir.path().join("pcie_sim_cmd");
    let rsp = temp_dir.path().join("pcie_sim_rsp");
    mkfifo(&cmd, Mode::S_IRUSR | Mode::S_IWUSR).unwrap();
    mkfifo(&rsp, Mode::S_IRUSR | Mode::S_IWUSR).unwrap();
    (temp_dir, cmd, rsp)
}

#[test]
fn test_interrupt_terminates_simulation() {
    let (_temp, cmd, rsp) = setup_fifos();

    let mut child = Command::new(env!("CARGO_BIN_EXE_pciesim-cli"))
        .arg("--cmd-pipe")
        .arg(&cmd)
        .arg("--rsp-pipe")
        .arg(&rsp)
        .arg("shell")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut commands = BufReader::new(File::open(&cmd).unwrap());
    let mut responses = OpenOptions::new().write(true).open(&rsp).unwrap();

    // One round trip so the handler is installed before the signal is sent
    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(b"ls\n").unwrap();
    stdin.flush().unwrap();

    let mut line = String::new();
    commands.read_line(&mut line).unwrap();
    let query = parse_command(&line);
    assert_eq!(query.opcode, 0x10);
    responses
        .write_all(response_line(0x10, 0x0F, query.tag, 0, 1).as_bytes())
        .unwrap();

    kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).unwrap();

    line.clear();
    commands.read_line(&mut line).unwrap();
    assert_eq!(parse_command(&line).opcode, 0xFF);

    let status = child.wait().unwrap();
    assert!(status.success(), "exited with {:?}", status);

    line.clear();
    assert_eq!(commands.read_line(&mut line).unwrap(), 0);
    drop(stdin);
}
