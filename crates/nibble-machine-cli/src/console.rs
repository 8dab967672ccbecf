use std::io::{BufRead, Write};

use nibble_cpu::{Console, ConsoleError, Reg};

/// Line-oriented console over a reader/writer pair (normally stdin/stdout).
///
/// `IN` prompts `Input value for Rn: ` and consumes one whitespace-separated
/// integer token, reading more lines as needed. `OUT` prints `Output Rn: v`.
pub struct StdConsole<R, W> {
    reader: R,
    writer: W,
    pending: Vec<String>,
}

impl<R: BufRead, W: Write> StdConsole<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            pending: Vec::new(),
        }
    }

    fn next_token(&mut self) -> Result<String, ConsoleError> {
        loop {
            if let Some(token) = self.pending.pop() {
                return Ok(token);
            }
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(ConsoleError::InputExhausted);
            }
            // Stored reversed so `pop` yields tokens in order.
            self.pending = line.split_whitespace().rev().map(str::to_owned).collect();
        }
    }
}

impl<R: BufRead, W: Write> Console for StdConsole<R, W> {
    fn input(&mut self, reg: Reg) -> Result<i64, ConsoleError> {
        write!(self.writer, "Input value for {reg}: ")?;
        self.writer.flush()?;
        let token = self.next_token()?;
        token
            .parse::<i64>()
            .map_err(|_| ConsoleError::InvalidInput(token))
    }

    fn output(&mut self, reg: Reg, value: u8) -> Result<(), ConsoleError> {
        writeln!(self.writer, "Output {reg}: {value}")?;
        Ok(())
    }
}
