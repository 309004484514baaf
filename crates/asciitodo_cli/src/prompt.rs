use std::io::{BufRead, Write};

/// Blocking dialogs used by the controller. Declining or cancelling must
/// leave the store untouched.
pub trait Prompter {
    fn confirm(&mut self, message: &str) -> bool;

    /// Asks for replacement text, showing `current`. `None` means cancelled.
    fn ask(&mut self, message: &str, current: &str) -> Option<String>;

    fn alert(&mut self, message: &str);
}

/// Prompts on `output`, answers read line by line from `input`. The
/// interactive session reads its commands through the same reader.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Next line without its terminator, `None` at end of input.
    pub fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    fn show(&mut self, text: &str) {
        if write!(self.output, "{text}")
            .and_then(|_| self.output.flush())
            .is_err()
        {
            log::debug!("failed to write prompt");
        }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn confirm(&mut self, message: &str) -> bool {
        self.show(&format!("{message} [y/N] "));
        match self.read_line() {
            Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }

    fn ask(&mut self, message: &str, current: &str) -> Option<String> {
        self.show(&format!("{message} [{current}]: "));
        match self.read_line() {
            Ok(Some(answer)) if !answer.trim().is_empty() => Some(answer),
            _ => None,
        }
    }

    fn alert(&mut self, message: &str) {
        self.show(&format!("WARNING: {message}\n"));
    }
}
