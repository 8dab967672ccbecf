#![forbid(unsafe_code)]

//! Host-side harness that owns the nibble machine's stores.
//!
//! [`Machine`] allocates primary memory, opens the persistent disk, loads
//! program bytes and lends all of it to a [`nibble_cpu::Cpu`] for each run. The
//! CPU state is kept between runs so a host can execute in slices.

use std::path::PathBuf;

use nibble_cpu::{Console, Cpu, CpuError, CpuState, RunExit};
use nibble_mem::{Memory, MemoryError, MIN_MEMORY_SIZE};
use nibble_storage::{ByteStorage, DiskError, FileDisk, DEFAULT_DISK_CAPACITY, DEFAULT_DISK_PATH};
use thiserror::Error;

pub use nibble_cpu::HaltReason;

/// Reference RAM size (20 MiB).
pub const DEFAULT_RAM_SIZE: u64 = 20 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    /// Primary memory size in bytes. Must cover the 16-bit address space.
    pub ram_size: u64,
    /// Host file backing the persistent disk.
    pub disk_path: PathBuf,
    /// Persistent disk capacity in bytes.
    pub disk_capacity: u64,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            ram_size: DEFAULT_RAM_SIZE,
            disk_path: PathBuf::from(DEFAULT_DISK_PATH),
            disk_capacity: DEFAULT_DISK_CAPACITY,
        }
    }
}

impl MachineConfig {
    pub fn validate(&self) -> Result<(), MachineError> {
        if self.ram_size < MIN_MEMORY_SIZE {
            return Err(MemoryError::TooSmall {
                size: self.ram_size,
                min: MIN_MEMORY_SIZE,
            }
            .into());
        }
        if self.disk_capacity == 0 {
            return Err(MachineError::InvalidDiskCapacity(self.disk_capacity));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum MachineError {
    #[error("invalid disk capacity {0}")]
    InvalidDiskCapacity(u64),

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Disk(#[from] DiskError),

    #[error(transparent)]
    Cpu(#[from] CpuError),
}

/// Outcome of [`Machine::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub exit: RunExit,
    pub state: CpuState,
}

impl RunSummary {
    pub fn halt_reason(&self) -> Option<HaltReason> {
        match self.exit {
            RunExit::Halted { reason, .. } => Some(reason),
            RunExit::BudgetExhausted { .. } => None,
        }
    }
}

pub struct Machine {
    memory: Memory,
    disk: Box<dyn ByteStorage>,
    cpu: CpuState,
}

impl Machine {
    /// Allocates RAM and opens (or creates) the disk named by `config`.
    ///
    /// A disk that cannot be opened is reported as [`DiskError::Unavailable`];
    /// hosts should treat that as fatal.
    pub fn new(config: MachineConfig) -> Result<Self, MachineError> {
        config.validate()?;
        let disk = FileDisk::open_or_create(&config.disk_path, config.disk_capacity)?;
        tracing::info!(
            ram_size = config.ram_size,
            disk = %config.disk_path.display(),
            disk_capacity = config.disk_capacity,
            "machine initialized"
        );
        Self::with_disk(config.ram_size, Box::new(disk))
    }

    /// Builds a machine around an already-open disk.
    pub fn with_disk(ram_size: u64, disk: Box<dyn ByteStorage>) -> Result<Self, MachineError> {
        Ok(Self {
            memory: Memory::new(ram_size)?,
            disk,
            cpu: CpuState::default(),
        })
    }

    pub fn load_program(&mut self, addr: u64, program: &[u8]) -> Result<(), MachineError> {
        self.memory.load(addr, program)?;
        tracing::debug!(addr, len = program.len(), "program loaded");
        Ok(())
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn disk_mut(&mut self) -> &mut dyn ByteStorage {
        self.disk.as_mut()
    }

    pub fn cpu_state(&self) -> &CpuState {
        &self.cpu
    }

    /// Puts the CPU back into its power-on state. Memory and disk are untouched.
    pub fn reset_cpu(&mut self) {
        self.cpu = CpuState::default();
    }

    /// Runs the CPU until it halts, or for at most `max_insts` instructions.
    ///
    /// `entry_pc = None` resumes from wherever the previous run stopped.
    pub fn run<C: Console + ?Sized>(
        &mut self,
        entry_pc: Option<u16>,
        console: &mut C,
        max_insts: Option<u64>,
    ) -> Result<RunSummary, MachineError> {
        let mut cpu = Cpu::with_state(
            self.cpu.clone(),
            &mut self.memory,
            self.disk.as_mut(),
            console,
        );

        let result = match max_insts {
            Some(budget) => cpu.run_slice(entry_pc, budget),
            None => {
                let entry = entry_pc.unwrap_or(cpu.state().pc);
                cpu.execute(entry).map(|reason| RunExit::Halted {
                    reason,
                    executed: cpu.instructions_retired(),
                })
            }
        };
        let retired = cpu.instructions_retired();
        self.cpu = cpu.into_state();

        let exit = result?;
        tracing::debug!(?exit, retired, "run finished");
        Ok(RunSummary {
            exit,
            state: self.cpu.clone(),
        })
    }
}
