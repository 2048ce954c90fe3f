use anyhow::{bail, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Source of the answers the interactive modes ask for.
pub trait Prompter {
    /// One trimmed line; cancelling the input is an error.
    fn ask(&mut self, label: &str) -> Result<String>;
}

pub struct ConsolePrompt {
    editor: DefaultEditor,
}

impl ConsolePrompt {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl Prompter for ConsolePrompt {
    fn ask(&mut self, label: &str) -> Result<String> {
        match self.editor.readline(label) {
            Ok(line) => Ok(line.trim().to_string()),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => bail!("Input cancelled"),
            Err(e) => Err(e.into()),
        }
    }
}
