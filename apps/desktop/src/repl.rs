use std::{io::Write, path::PathBuf};

use client_core::{InputKey, SelectedFile, SessionController};
use tracing::warn;

pub const HELP: &str = "\
Commands:
  :open <path>   upload a PDF (alias :upload)
  :clear         drop the current preview and pick another file
  :preview       show the active document
  :help          show this help
  :quit          exit (alias :q)
Anything else is sent as a question about the active document.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(PathBuf),
    Clear,
    Preview,
    Help,
    Quit,
    Ask(String),
    Empty,
    Unknown(String),
}

pub fn parse_line(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = trimmed.strip_prefix(':') else {
        return Command::Ask(line.trim_end_matches(&['\r', '\n'][..]).to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name {
        "open" | "upload" if !arg.is_empty() => Command::Open(PathBuf::from(arg)),
        "clear" => Command::Clear,
        "preview" => Command::Preview,
        "help" | "h" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

pub struct Repl<W: Write> {
    controller: SessionController,
    out: W,
    shown_answer: String,
}

impl<W: Write> Repl<W> {
    pub fn new(controller: SessionController, out: W) -> Self {
        Self {
            controller,
            out,
            shown_answer: String::new(),
        }
    }

    #[cfg(test)]
    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    pub fn prompt(&mut self) -> std::io::Result<()> {
        let placeholder = self.controller.placeholder();
        write!(self.out, "{placeholder}\n> ")?;
        self.out.flush()
    }

    /// Runs one command. Returns `false` when the session should end.
    pub async fn execute(&mut self, command: Command) -> std::io::Result<bool> {
        match command {
            Command::Open(path) => match SelectedFile::from_path(&path).await {
                Ok(file) => self.controller.submit_file(file).await,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to read file");
                    writeln!(self.out, "Could not read {}: {err}", path.display())?;
                }
            },
            Command::Clear => self.controller.clear_preview(),
            Command::Preview => self.write_preview()?,
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Quit => return Ok(false),
            Command::Ask(text) => {
                self.controller.set_question(text);
                self.controller.handle_key(InputKey::enter()).await;
            }
            Command::Empty => {}
            Command::Unknown(raw) => writeln!(self.out, "Unknown command {raw}; try :help")?,
        }
        self.write_answer()?;
        Ok(true)
    }

    fn write_preview(&mut self) -> std::io::Result<()> {
        match self.controller.session().preview() {
            Some(handle) => {
                let info = handle.info();
                writeln!(
                    self.out,
                    "{} ({} bytes) at {}",
                    info.file_name, info.size_bytes, info.url
                )
            }
            None => writeln!(self.out, "Upload a PDF to start the conversation"),
        }
    }

    fn write_answer(&mut self) -> std::io::Result<()> {
        let answer = self.controller.session().answer();
        if answer.is_empty() || answer == self.shown_answer {
            return Ok(());
        }
        writeln!(self.out, "\n{answer}\n")?;
        self.shown_answer = answer.to_string();
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/repl_tests.rs"]
mod tests;
