use nibble_mem::Memory;
use nibble_storage::ByteStorage;

use crate::io::Console;
use crate::isa::{self, Opcode};
use crate::state::{CpuState, Reg};
use crate::CpuError;

/// Why the CPU stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// A `HALT` instruction retired.
    Halt,
    /// The instruction byte at `pc` carried an opcode with no defined semantics.
    UnrecognizedOpcode { opcode: u8, pc: u16 },
    /// The instruction at `pc` named a register index outside `R0..=R3`.
    InvalidRegister { index: u8, pc: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Halted(HaltReason),
}

/// Result of a bounded run (see [`Cpu::run_slice`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    Halted { reason: HaltReason, executed: u64 },
    BudgetExhausted { executed: u64 },
}

impl RunExit {
    pub fn executed(&self) -> u64 {
        match *self {
            RunExit::Halted { executed, .. } | RunExit::BudgetExhausted { executed } => executed,
        }
    }
}

/// Fetch-decode-execute engine.
///
/// The host keeps ownership of memory, disk and console; the CPU only borrows
/// them for as long as it runs.
pub struct Cpu<'a, D: ByteStorage + ?Sized, C: Console + ?Sized> {
    state: CpuState,
    memory: &'a mut Memory,
    disk: &'a mut D,
    console: &'a mut C,
    retired: u64,
}

impl<'a, D: ByteStorage + ?Sized, C: Console + ?Sized> Cpu<'a, D, C> {
    pub fn new(memory: &'a mut Memory, disk: &'a mut D, console: &'a mut C) -> Self {
        Self::with_state(CpuState::default(), memory, disk, console)
    }

    pub fn with_state(
        state: CpuState,
        memory: &'a mut Memory,
        disk: &'a mut D,
        console: &'a mut C,
    ) -> Self {
        Self {
            state,
            memory,
            disk,
            console,
            retired: 0,
        }
    }

    pub fn state(&self) -> &CpuState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    pub fn into_state(self) -> CpuState {
        self.state
    }

    /// Instructions executed since construction, counting the one that halted
    /// the CPU (including unrecognized-opcode and invalid-register halts).
    /// Instructions that abort with an error are not counted.
    pub fn instructions_retired(&self) -> u64 {
        self.retired
    }

    /// Runs from `entry_pc` until the CPU halts.
    ///
    /// Blocks for as long as the program runs, including while `IN` waits on the
    /// console. Memory/disk bounds violations and console failures abort the run
    /// with an error; registers and flag are left as they were before the
    /// faulting instruction, though the program counter has moved past any bytes
    /// it already fetched.
    pub fn execute(&mut self, entry_pc: u16) -> Result<HaltReason, CpuError> {
        self.state.pc = entry_pc;
        self.state.running = true;
        loop {
            match self.step() {
                Ok(Step::Continue) => {}
                Ok(Step::Halted(reason)) => return Ok(reason),
                Err(e) => {
                    self.state.running = false;
                    return Err(e);
                }
            }
        }
    }

    /// Runs at most `budget` instructions.
    ///
    /// With `entry_pc = None` execution resumes at the current program counter.
    pub fn run_slice(&mut self, entry_pc: Option<u16>, budget: u64) -> Result<RunExit, CpuError> {
        if let Some(pc) = entry_pc {
            self.state.pc = pc;
        }
        self.state.running = true;

        let mut executed = 0u64;
        while executed < budget {
            let step = self.step().inspect_err(|_| self.state.running = false)?;
            executed += 1;
            if let Step::Halted(reason) = step {
                return Ok(RunExit::Halted { reason, executed });
            }
        }
        Ok(RunExit::BudgetExhausted { executed })
    }

    /// Executes exactly one instruction.
    pub fn step(&mut self) -> Result<Step, CpuError> {
        let step = self.step_inner()?;
        self.retired += 1;
        Ok(step)
    }

    fn step_inner(&mut self) -> Result<Step, CpuError> {
        let inst_pc = self.state.pc;
        let (nibble, operand) = isa::split(self.fetch()?);

        let Some(opcode) = Opcode::decode(nibble) else {
            tracing::warn!(opcode = nibble, pc = inst_pc, "unrecognized opcode; halting");
            self.state.running = false;
            return Ok(Step::Halted(HaltReason::UnrecognizedOpcode {
                opcode: nibble,
                pc: inst_pc,
            }));
        };

        tracing::trace!(
            pc = inst_pc,
            op = opcode.mnemonic(),
            operand,
            len = 1 + opcode.extra_bytes(),
            "step"
        );

        // Opcodes that ignore the operand never read `rn`.
        let rn = if opcode.uses_register_operand() {
            match Reg::try_from(operand) {
                Ok(reg) => reg,
                Err(index) => return Ok(self.invalid_register(index, inst_pc)),
            }
        } else {
            Reg::R0
        };

        match opcode {
            Opcode::Nop => {}
            Opcode::Load => {
                let imm = self.fetch()?;
                self.state.set_reg_flags(rn, imm);
            }
            Opcode::Store => {
                let addr = self.fetch()?;
                self.memory.write_u8(u64::from(addr), self.state.reg(rn))?;
            }
            Opcode::Add | Opcode::Sub => {
                let rm = match Reg::try_from(self.fetch()?) {
                    Ok(reg) => reg,
                    Err(index) => return Ok(self.invalid_register(index, inst_pc)),
                };
                let a = u16::from(self.state.reg(rn));
                let b = u16::from(self.state.reg(rm));
                let wide = if opcode == Opcode::Add {
                    a + b
                } else {
                    a.wrapping_sub(b)
                };
                self.state.set_reg_flags(rn, wide as u8);
            }
            Opcode::Jmp => {
                self.state.pc = self.fetch_addr16()?;
            }
            Opcode::Jz => {
                let target = self.fetch_addr16()?;
                if self.state.zf {
                    self.state.pc = target;
                }
            }
            Opcode::Call => {
                let target = self.fetch_addr16()?;
                let [lo, hi] = self.state.pc.to_le_bytes();
                self.push(hi)?;
                self.push(lo)?;
                self.state.pc = target;
            }
            Opcode::Ret => {
                let lo = self.pop()?;
                let hi = self.pop()?;
                self.state.pc = u16::from_le_bytes([lo, hi]);
            }
            Opcode::In => {
                let value = self.console.input(rn)?;
                self.state.set_reg_flags(rn, value as u8);
            }
            Opcode::Out => {
                self.console.output(rn, self.state.reg(rn))?;
            }
            Opcode::DiskRead => {
                let addr = self.fetch_addr16()?;
                let value = self.disk.read_u8(u64::from(addr))?;
                self.state.set_reg_flags(rn, value);
            }
            Opcode::DiskWrite => {
                let addr = self.fetch_addr16()?;
                self.disk.write_u8(u64::from(addr), self.state.reg(rn))?;
            }
            Opcode::Halt => {
                self.state.running = false;
                tracing::debug!(pc = inst_pc, retired = self.retired + 1, "halted");
                return Ok(Step::Halted(HaltReason::Halt));
            }
        }

        Ok(Step::Continue)
    }

    fn invalid_register(&mut self, index: u8, pc: u16) -> Step {
        tracing::warn!(index, pc, "invalid register index; halting");
        self.state.running = false;
        Step::Halted(HaltReason::InvalidRegister { index, pc })
    }

    fn fetch(&mut self) -> Result<u8, CpuError> {
        let byte = self.memory.read_u8(u64::from(self.state.pc))?;
        self.state.pc = self.state.pc.wrapping_add(1);
        Ok(byte)
    }

    fn fetch_addr16(&mut self) -> Result<u16, CpuError> {
        let lo = self.fetch()?;
        let hi = self.fetch()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    fn push(&mut self, value: u8) -> Result<(), CpuError> {
        self.memory.write_u8(self.state.sp.addr(), value)?;
        self.state.sp.decrement();
        Ok(())
    }

    fn pop(&mut self) -> Result<u8, CpuError> {
        self.state.sp.increment();
        Ok(self.memory.read_u8(self.state.sp.addr())?)
    }
}

#[cfg(test)]
mod tests {
    use nibble_mem::MIN_MEMORY_SIZE;
    use nibble_storage::MemDisk;

    use super::*;
    use crate::ScriptedConsole;

    fn run(program: &[u8]) -> (CpuState, HaltReason, Memory) {
        let mut mem = Memory::new(MIN_MEMORY_SIZE).unwrap();
        mem.load(0x100, program).unwrap();
        let mut disk = MemDisk::new(0x1_0000).unwrap();
        let mut console = ScriptedConsole::default();
        let mut cpu = Cpu::new(&mut mem, &mut disk, &mut console);
        let reason = cpu.execute(0x100).unwrap();
        let state = cpu.into_state();
        (state, reason, mem)
    }

    #[test]
    fn nop_then_halt() {
        let (state, reason, _) = run(&[0x00, 0x00, 0xF0]);
        assert_eq!(reason, HaltReason::Halt);
        assert_eq!(state.pc, 0x103);
        assert!(!state.running);
    }

    #[test]
    fn store_writes_low_memory_without_touching_flag() {
        // LOAD R2,0 ; LOAD R1,0x7E ; STORE R1,0x40 ; HALT
        let (state, _, mem) = run(&[0x12, 0x00, 0x11, 0x7E, 0x21, 0x40, 0xF0]);
        assert_eq!(mem.read_u8(0x40).unwrap(), 0x7E);
        assert!(!state.zf, "LOAD R1 cleared zf; STORE must not touch it");
    }

    #[test]
    fn sub_wraps_on_underflow() {
        // LOAD R0,1 ; LOAD R1,2 ; SUB R0,R1 ; HALT
        let (state, _, _) = run(&[0x10, 0x01, 0x11, 0x02, 0x40, 0x01, 0xF0]);
        assert_eq!(state.reg(Reg::R0), 0xFF);
        assert!(!state.zf);
    }

    #[test]
    fn add_to_zero_sets_flag() {
        // LOAD R0,0x80 ; ADD R0,R0 ; HALT
        let (state, _, _) = run(&[0x10, 0x80, 0x30, 0x00, 0xF0]);
        assert_eq!(state.reg(Reg::R0), 0);
        assert!(state.zf);
    }

    #[test]
    fn operand_nibble_is_ignored_by_control_flow() {
        // JMP with a non-zero low nibble still jumps.
        let (state, reason, _) = run(&[0x5F, 0x05, 0x01, 0xE0, 0xE0, 0xF0]);
        assert_eq!(reason, HaltReason::Halt);
        assert_eq!(state.pc, 0x106);
    }

    #[test]
    fn unrecognized_opcode_reports_instruction_address() {
        let (state, reason, _) = run(&[0x00, 0xD3]);
        assert_eq!(
            reason,
            HaltReason::UnrecognizedOpcode {
                opcode: 0xD,
                pc: 0x101
            }
        );
        assert_eq!(state.pc, 0x102);
    }

    #[test]
    fn bad_register_operand_halts_before_fetching_immediate() {
        let (state, reason, _) = run(&[0x14, 0x01]);
        assert_eq!(reason, HaltReason::InvalidRegister { index: 4, pc: 0x100 });
        assert_eq!(state.pc, 0x101);
        assert_eq!(state.regs(), [0; 4]);
        assert!(!state.running);
    }

    #[test]
    fn bad_second_register_halts() {
        // ADD R0, R9
        let (state, reason, _) = run(&[0x30, 0x09]);
        assert_eq!(reason, HaltReason::InvalidRegister { index: 9, pc: 0x100 });
        assert_eq!(state.pc, 0x102);
    }
}
