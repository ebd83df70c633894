//! pciesim CLI
//!
//! Command-line interface for driving the PCIe simulator.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use pciesim::{Config, SimClient};
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tracing_subscriber::{fmt, EnvFilter};

/// pciesim CLI
#[derive(Parser, Debug)]
#[command(name = "pciesim-cli")]
#[command(about = "Drive a PCIe simulator over named pipes")]
#[command(version)]
struct Args {
    /// Command pipe (driver writes)
    #[arg(long, default_value = "/tmp/pcie_sim_cmd")]
    cmd_pipe: PathBuf,

    /// Response pipe (driver reads)
    #[arg(long, default_value = "/tmp/pcie_sim_rsp")]
    rsp_pipe: PathBuf,

    /// Response timeout in milliseconds
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    /// Response timeout for reset in milliseconds
    #[arg(long, default_value = "10000")]
    reset_timeout_ms: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Config read
    Cr {
        #[arg(value_parser = parse_hex)]
        addr: u32,
    },

    /// Config write
    Cw {
        #[arg(value_parser = parse_hex)]
        addr: u32,
        #[arg(value_parser = parse_hex)]
        data: u32,
    },

    /// Memory read
    Mr {
        #[arg(value_parser = parse_hex)]
        addr: u32,
    },

    /// Memory write
    Mw {
        #[arg(value_parser = parse_hex)]
        addr: u32,
        #[arg(value_parser = parse_hex)]
        data: u32,
    },

    /// Link status
    Ls,

    /// System reset
    Reset,

    /// Terminate the simulation
    Terminate,

    /// Run the bring-up demo sequence
    Demo,

    /// Interactive shell (default)
    Shell,
}

/// Parse a hex value with or without a `0x` prefix
fn parse_hex(s: &str) -> Result<u32, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid hex value '{}': {}", s, e))
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pciesim=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("pciesim CLI v{}", pciesim::VERSION);

    let config = Config::builder()
        .cmd_pipe_path(&args.cmd_pipe)
        .rsp_pipe_path(&args.rsp_pipe)
        .default_timeout(Duration::from_millis(args.timeout_ms))
        .reset_timeout(Duration::from_millis(args.reset_timeout_ms))
        .build();

    let sim = match SimClient::connect(config) {
        Ok(sim) => Arc::new(sim),
        Err(e) => {
            tracing::error!("Failed to connect to simulation: {}", e);
            eprintln!("Failed to connect to simulation. Make sure the simulation is running.");
            std::process::exit(1);
        }
    };

    if let Err(e) = install_interrupt_handler(Arc::clone(&sim)) {
        tracing::warn!("Failed to install signal handlers: {}", e);
    }

    let ok = match args.command.unwrap_or(Commands::Shell) {
        Commands::Cr { addr } => report_value(sim.config_read(addr)),
        Commands::Cw { addr, data } => sim.config_write(addr, data),
        Commands::Mr { addr } => report_value(sim.memory_read(addr)),
        Commands::Mw { addr, data } => sim.memory_write(addr, data),
        Commands::Ls => match sim.get_link_status() {
            Some(status) => {
                println!("{} (0x{:02x})", status, status.code());
                true
            }
            None => false,
        },
        Commands::Reset => sim.reset_system(),
        Commands::Terminate => sim.terminate_simulation(),
        Commands::Demo => {
            demo_sequence(&sim);
            true
        }
        Commands::Shell => {
            interactive(&sim);
            true
        }
    };

    sim.disconnect();
    if !ok {
        std::process::exit(1);
    }
}

/// On SIGINT or SIGTERM, terminate the simulation and disconnect before exiting
fn install_interrupt_handler(sim: Arc<SimClient>) -> io::Result<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    thread::Builder::new()
        .name("pciesim-signals".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                tracing::info!("Received signal {}, shutting down...", signal);
                sim.shutdown();
                std::process::exit(0);
            }
        })?;
    Ok(())
}

fn report_value(value: Option<u32>) -> bool {
    match value {
        Some(v) => {
            println!("0x{:08x}", v);
            true
        }
        None => false,
    }
}

// =============================================================================
// Interactive Shell
// =============================================================================

const HELP: &str = "Commands:
  cr <addr>           - Config read (hex address)
  cw <addr> <data>    - Config write (hex address and data)
  mr <addr>           - Memory read (hex address)
  mw <addr> <data>    - Memory write (hex address and data)
  ls                  - Link status
  reset               - System reset
  quit/exit           - Terminate simulation
  help                - Show this help";

fn interactive(sim: &SimClient) {
    println!("=== PCIe Simulation Interactive Mode ===");
    println!("{}", HELP);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("PCIe> ");
        let _ = io::stdout().flush();

        let line = match lines.next() {
            Some(Ok(line)) => line.trim().to_lowercase(),
            Some(Err(e)) => {
                tracing::error!("Error reading input: {}", e);
                break;
            }
            None => break,
        };

        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&cmd) = parts.first() else {
            continue;
        };

        let hex = |i: usize| parts.get(i).map(|s| parse_hex(s));

        match (cmd, parts.len()) {
            ("quit" | "exit", _) => break,
            ("help", _) => println!("{}", HELP),
            ("cr", 2) => match hex(1) {
                Some(Ok(addr)) => {
                    report_value(sim.config_read(addr));
                }
                _ => println!("Invalid hex value. Use format: 0x1234 or 1234"),
            },
            ("cw", 3) => match (hex(1), hex(2)) {
                (Some(Ok(addr)), Some(Ok(data))) => {
                    sim.config_write(addr, data);
                }
                _ => println!("Invalid hex value. Use format: 0x1234 or 1234"),
            },
            ("mr", 2) => match hex(1) {
                Some(Ok(addr)) => {
                    report_value(sim.memory_read(addr));
                }
                _ => println!("Invalid hex value. Use format: 0x1234 or 1234"),
            },
            ("mw", 3) => match (hex(1), hex(2)) {
                (Some(Ok(addr)), Some(Ok(data))) => {
                    sim.memory_write(addr, data);
                }
                _ => println!("Invalid hex value. Use format: 0x1234 or 1234"),
            },
            ("ls", _) => {
                if let Some(status) = sim.get_link_status() {
                    println!("{} (0x{:02x})", status, status.code());
                }
            }
            ("reset", _) => {
                sim.reset_system();
            }
            _ => println!("Invalid command. Type 'help' for usage."),
        }
    }

    sim.terminate_simulation();
}

// =============================================================================
// Demo Sequence
// =============================================================================

/// Command register bits: I/O space, memory space, bus master
const CMD_ENABLE_BITS: u32 = 0x0007;

fn demo_sequence(sim: &SimClient) {
    println!("=== Running Demo Sequence ===");

    println!("Waiting for simulation to stabilize...");
    thread::sleep(Duration::from_secs(2));

    println!("\n1. Checking PCIe link status...");
    if let Some(status) = sim.get_link_status() {
        println!("   {} (0x{:02x})", status, status.code());
    }

    println!("\n2. Reading Device/Vendor ID (Config register 0x00)...");
    if let Some(id) = sim.config_read(0x00).filter(|id| *id != 0) {
        println!("   Vendor ID: 0x{:04x}", id & 0xFFFF);
        println!("   Device ID: 0x{:04x}", (id >> 16) & 0xFFFF);
    }

    println!("\n3. Reading Command/Status register (Config register 0x04)...");
    if let Some(cmd_status) = sim.config_read(0x04) {
        println!("\n4. Enabling Bus Master, Memory Space, and I/O Space...");
        sim.config_write(0x04, (cmd_status & 0xFFFF_0000) | CMD_ENABLE_BITS);

        println!("\n5. Verifying command register update...");
        sim.config_read(0x04);
    }

    println!("\n6. Reading Base Address Register 0 (Config register 0x10)...");
    let mem_addr = sim.config_read(0x10).map(|bar0| bar0 & 0xFFFF_FFF0).unwrap_or(0);

    if mem_addr != 0 {
        println!("\n7. Attempting memory read from BAR0 address 0x{:08x}...", mem_addr);
        report_value(sim.memory_read(mem_addr));

        println!("\n8. Attempting memory write to BAR0 address 0x{:08x}...", mem_addr);
        sim.memory_write(mem_addr, 0xDEAD_BEEF);

        println!("\n9. Reading back from BAR0 address 0x{:08x}...", mem_addr);
        report_value(sim.memory_read(mem_addr));
    } else {
        println!("\n7-9. Skipping memory operations (BAR0 not configured)");
    }

    println!("\n=== Demo Sequence Complete ===");
}
