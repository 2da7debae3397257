//! Operator go-ahead used while the scene accepts live updates.

use std::io::{self, BufRead, Write};

pub trait GoAhead {
    /// Block until the operator allows the benchmark to continue.
    fn wait(&mut self) -> io::Result<()>;
}

/// Prompts on stdout and waits for Enter on stdin.
pub struct StdinGoAhead;

impl GoAhead for StdinGoAhead {
    fn wait(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();
        writeln!(
            stdout,
            "Listening to scene updates. Press Enter to continue ..."
        )?;
        stdout.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(())
    }
}

/// Continues at once.
pub struct Immediate;

impl GoAhead for Immediate {
    fn wait(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Waits for a line on any reader.
pub struct ReaderGoAhead<R> {
    reader: R,
}

impl<R: BufRead> ReaderGoAhead<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> GoAhead for ReaderGoAhead<R> {
    fn wait(&mut self) -> io::Result<()> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before go-ahead",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reader_go_ahead_consumes_one_line() {
        let mut signal = ReaderGoAhead::new(Cursor::new("\nsecond\n"));
        assert!(signal.wait().is_ok());
        assert!(signal.wait().is_ok());
        assert_eq!(
            signal.wait().unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
    }

    #[test]
    fn test_immediate() {
        assert!(Immediate.wait().is_ok());
    }
}
