#![forbid(unsafe_code)]

mod console;

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use nibble_cpu::Reg;
use nibble_machine::{HaltReason, Machine, MachineConfig, DEFAULT_RAM_SIZE};
use nibble_storage::{DEFAULT_DISK_CAPACITY, DEFAULT_DISK_PATH};
use tracing_subscriber::EnvFilter;

use crate::console::StdConsole;

#[derive(Debug, Parser)]
#[command(about = "Runs a raw nibble machine program against a persistent virtual disk")]
struct Args {
    /// Raw program bytes to load into memory.
    #[arg(long)]
    program: PathBuf,

    /// Memory address the program is loaded at.
    #[arg(long, default_value = "0", value_parser = parse_u16)]
    load_addr: u16,

    /// Initial program counter.
    #[arg(long, default_value = "0", value_parser = parse_u16)]
    entry: u16,

    /// Backing file for the persistent disk (created zero-filled if missing).
    #[arg(long, default_value = DEFAULT_DISK_PATH)]
    disk: PathBuf,

    /// Disk capacity in MiB.
    #[arg(long, default_value_t = DEFAULT_DISK_CAPACITY / (1024 * 1024))]
    disk_size_mib: u64,

    /// Memory size in KiB (at least 64).
    #[arg(long, default_value_t = DEFAULT_RAM_SIZE / 1024)]
    ram_kib: u64,

    /// Stop after executing at most N instructions.
    #[arg(long)]
    max_insts: Option<u64>,
}

fn parse_u16(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse::<u16>(),
    };
    parsed.map_err(|e| format!("invalid 16-bit value {s:?}: {e}"))
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = MachineConfig {
        ram_size: args.ram_kib.checked_mul(1024).context("RAM size overflow")?,
        disk_path: args.disk.clone(),
        disk_capacity: args
            .disk_size_mib
            .checked_mul(1024 * 1024)
            .context("disk size overflow")?,
    };

    let program = std::fs::read(&args.program)
        .with_context(|| format!("failed to read program: {}", args.program.display()))?;

    let mut machine = Machine::new(config).context("failed to initialize machine")?;
    machine
        .load_program(u64::from(args.load_addr), &program)
        .context("program does not fit in memory")?;

    let stdin = io::stdin();
    let mut console = StdConsole::new(stdin.lock(), io::stdout());
    let summary = machine
        .run(Some(args.entry), &mut console, args.max_insts)
        .context("execution aborted")?;

    let state = &summary.state;
    tracing::info!(
        r0 = state.reg(Reg::R0),
        r1 = state.reg(Reg::R1),
        r2 = state.reg(Reg::R2),
        r3 = state.reg(Reg::R3),
        pc = state.pc,
        sp = state.sp.get(),
        zf = state.zf,
        executed = summary.exit.executed(),
        "final state"
    );

    match summary.halt_reason() {
        Some(HaltReason::Halt) => {}
        Some(HaltReason::UnrecognizedOpcode { opcode, pc }) => {
            eprintln!("Unknown opcode: 0x{opcode:x} at pc=0x{pc:04x}");
        }
        Some(HaltReason::InvalidRegister { index, pc }) => {
            bail!("invalid register R{index} at pc=0x{pc:04x}");
        }
        None => {
            let Some(limit) = args.max_insts else {
                bail!("run ended without halting");
            };
            eprintln!("Stopped after {limit} instructions without halting");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_and_hex() {
        assert_eq!(parse_u16("0"), Ok(0));
        assert_eq!(parse_u16("4096"), Ok(4096));
        assert_eq!(parse_u16("0x1F00"), Ok(0x1F00));
        assert_eq!(parse_u16("0XFFFF"), Ok(0xFFFF));
        assert!(parse_u16("0x10000").is_err());
        assert!(parse_u16("nope").is_err());
    }

    #[test]
    fn args_defaults() {
        let args = Args::try_parse_from(["nibble-machine", "--program", "p.bin"]).unwrap();
        assert_eq!(args.entry, 0);
        assert_eq!(args.load_addr, 0);
        assert_eq!(args.disk, PathBuf::from("virtual_disk.bin"));
        assert_eq!(args.disk_size_mib, 100);
        assert_eq!(args.ram_kib, 20 * 1024);
        assert_eq!(args.max_insts, None);
    }
}
