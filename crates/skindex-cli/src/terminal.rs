//! Line-based prompts: numbered selection lists and free-text input.

use std::io::{self, BufRead, Write};

pub trait Terminal {
    /// Show `choices` under `message` and return the index picked.
    fn select(&mut self, message: &str, choices: &[String]) -> io::Result<usize>;

    fn input(&mut self, message: &str) -> io::Result<String>;

    /// Informational output.
    fn say(&mut self, text: &str) -> io::Result<()>;
}

/// Numbered menu over any reader/writer pair; stdin/stdout in the binary.
pub struct StdTerminal<R, W> {
    input: R,
    output: W,
}

impl StdTerminal<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdTerminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed",
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl<R: BufRead, W: Write> Terminal for StdTerminal<R, W> {
    fn select(&mut self, message: &str, choices: &[String]) -> io::Result<usize> {
        if choices.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "nothing to select",
            ));
        }

        writeln!(self.output, "? {message}")?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {:>2}) {choice}", i + 1)?;
        }

        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;
            let line = self.read_line()?;
            match line.trim().parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Ok(n - 1),
                _ => writeln!(
                    self.output,
                    "Enter a number between 1 and {}.",
                    choices.len()
                )?,
            }
        }
    }

    fn input(&mut self, message: &str) -> io::Result<String> {
        write!(self.output, "? {message} ")?;
        self.output.flush()?;
        self.read_line()
    }

    fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }
}
