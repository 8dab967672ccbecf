//! Console channel used by `IN` and `OUT`.

use std::collections::VecDeque;

use thiserror::Error;

use crate::state::Reg;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("input exhausted")]
    InputExhausted,

    #[error("invalid input token {0:?}")]
    InvalidInput(String),

    #[error("console io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Byte-in/byte-out channel.
///
/// `input` may block indefinitely; the CPU has no timeout or cancellation.
/// The value it returns is truncated to 8 bits by the CPU.
pub trait Console {
    fn input(&mut self, reg: Reg) -> Result<i64, ConsoleError>;

    fn output(&mut self, reg: Reg, value: u8) -> Result<(), ConsoleError>;
}

impl<T: Console + ?Sized> Console for &mut T {
    #[inline]
    fn input(&mut self, reg: Reg) -> Result<i64, ConsoleError> {
        <T as Console>::input(&mut **self, reg)
    }

    #[inline]
    fn output(&mut self, reg: Reg, value: u8) -> Result<(), ConsoleError> {
        <T as Console>::output(&mut **self, reg, value)
    }
}

/// Console fed from a fixed queue of input values, capturing all output.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConsole {
    input: VecDeque<i64>,
    output: Vec<u8>,
}

impl ScriptedConsole {
    pub fn new(input: impl IntoIterator<Item = i64>) -> Self {
        Self {
            input: input.into_iter().collect(),
            output: Vec::new(),
        }
    }

    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }

    pub fn outputs(&self) -> &[u8] {
        &self.output
    }
}

impl Console for ScriptedConsole {
    fn input(&mut self, _reg: Reg) -> Result<i64, ConsoleError> {
        self.input.pop_front().ok_or(ConsoleError::InputExhausted)
    }

    fn output(&mut self, _reg: Reg, value: u8) -> Result<(), ConsoleError> {
        self.output.push(value);
        Ok(())
    }
}
