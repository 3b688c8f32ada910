use crate::clipboard::Clipboard;
use crate::machine::Step;
use crate::session::{Notifier, Session};
use anyhow::{Context, Result};
use log::{debug, warn};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{BufRead, Write};
use std::path::PathBuf;

const HELP: &str = "\
Commands:
  list                 show the available prompts
  select <id|number>   choose a prompt
  set <field> <text>   fill in a field
  paste <field>        fill in a field from the clipboard
  submit               generate the output
  back                 go to the previous screen
  edit                 change the input of the generated output
  copy                 copy the output to the clipboard
  reset                start over
  show                 show the current screen again
  quit                 leave";

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Empty,
    List,
    Select(&'a str),
    Set(&'a str, &'a str),
    Paste(&'a str),
    Submit,
    Back,
    Edit,
    Copy,
    Reset,
    Show,
    Help,
    Quit,
    Usage(&'static str),
    Unknown(&'a str),
}

fn parse(line: &str) -> Command<'_> {
    let line = line.trim_end_matches(['\n', '\r']);
    let (word, rest) = match line.trim_start().split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (line.trim(), ""),
    };
    match word {
        "" => Command::Empty,
        "list" => Command::List,
        "select" if rest.is_empty() => Command::Usage("select <id|number>"),
        "select" => Command::Select(rest.trim()),
        "set" => match rest.split_once(char::is_whitespace) {
            Some((field, text)) => Command::Set(field, text.trim_start()),
            None if rest.is_empty() => Command::Usage("set <field> <text>"),
            None => Command::Set(rest, ""),
        },
        "paste" if rest.is_empty() => Command::Usage("paste <field>"),
        "paste" => Command::Paste(rest.trim()),
        "submit" | "generate" => Command::Submit,
        "back" => Command::Back,
        "edit" => Command::Edit,
        "copy" => Command::Copy,
        "reset" | "start-over" => Command::Reset,
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other),
    }
}

// ===================================================================
// Input
// ===================================================================

/// Where command lines come from.
pub trait LineSource {
    /// The next line, or `None` once the user is done.
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Lines read from a non-terminal source such as piped stdin. No prompt
/// is shown.
pub struct Piped<R>(pub R);

impl<R: BufRead> LineSource for Piped<R> {
    fn next_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        let mut line = String::new();
        if self.0.read_line(&mut line).context("reading input")? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Terminal input with line editing and history. Ctrl-C and Ctrl-D end
/// the session.
pub struct LineEditor {
    editor: DefaultEditor,
    history: Option<PathBuf>,
}

impl LineEditor {
    /// `history` is loaded now if it exists and written by `save_history`.
    pub fn new(history: Option<PathBuf>) -> Result<Self> {
        let mut editor = DefaultEditor::new().context("initializing line editor")?;
        if let Some(path) = &history {
            if let Err(err) = editor.load_history(path) {
                debug!("no history loaded from {}: {err}", path.display());
            }
        }
        Ok(Self { editor, history })
    }

    pub fn save_history(&mut self) {
        if let Some(path) = &self.history {
            if let Err(err) = self.editor.save_history(path) {
                warn!("could not save history to {}: {err}", path.display());
            }
        }
    }
}

impl LineSource for LineEditor {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor
                        .add_history_entry(line.as_str())
                        .context("recording history")?;
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err).context("reading input"),
        }
    }
}

// ===================================================================
// Console
// ===================================================================

/// Line-oriented front end: one command per line, the screen for the
/// current step printed after every navigation.
pub struct Console<C: Clipboard, N: Notifier, W: Write> {
    session: Session<C, N>,
    out: W,
}

impl<C: Clipboard, N: Notifier, W: Write> Console<C, N, W> {
    pub fn new(session: Session<C, N>, out: W) -> Self {
        Self { session, out }
    }

    /// Read and run commands from `lines` until `quit` or end of input.
    pub fn run(&mut self, lines: &mut impl LineSource) -> Result<()> {
        self.print_screen()?;
        loop {
            self.out.flush().context("flushing output")?;
            let Some(line) = lines.next_line("> ")? else {
                return Ok(());
            };
            if !self.execute(&line)? {
                return Ok(());
            }
        }
    }

    /// Run one command line. Returns `false` when the user quits.
    fn execute(&mut self, line: &str) -> Result<bool> {
        let before = self.session.step();
        let mut redraw = false;
        match parse(line) {
            Command::Empty => {}
            Command::List => self.print_list()?,
            Command::Select(choice) => {
                let id = self.resolve_choice(choice);
                self.session.select_prompt(&id);
            }
            Command::Set(field, text) => {
                self.session.update_field(field, text);
            }
            Command::Paste(field) => {
                self.session.paste_field(field);
            }
            Command::Submit => {
                self.session.submit();
            }
            Command::Back => {
                self.session.go_back();
            }
            Command::Edit => {
                self.session.edit_and_regenerate();
            }
            Command::Copy => {
                self.session.copy_output();
            }
            Command::Reset => {
                self.session.reset();
                redraw = true;
            }
            Command::Show => redraw = true,
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Quit => return Ok(false),
            Command::Usage(usage) => self.session.notify(&format!("usage: {usage}")),
            Command::Unknown(word) => self
                .session
                .notify(&format!("unknown command `{word}` (try `help`)")),
        }
        if redraw || self.session.step() != before {
            self.print_screen()?;
        }
        Ok(true)
    }

    /// Map a 1-based list position to its prompt id; anything else is
    /// taken as an id.
    fn resolve_choice(&self, choice: &str) -> String {
        choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| self.session.catalog().list_all().get(i).map(|p| p.id.to_string()))
            .unwrap_or_else(|| choice.to_string())
    }

    // ---------------------------------------------------------------
    // Screens
    // ---------------------------------------------------------------

    fn print_screen(&mut self) -> Result<()> {
        match self.session.step() {
            Step::Selecting => self.print_selecting(),
            Step::Collecting => self.print_collecting(),
            Step::Displaying => self.print_displaying(),
        }
    }

    fn print_list(&mut self) -> Result<()> {
        for (i, prompt) in self.session.catalog().list_all().iter().enumerate() {
            writeln!(self.out, "  {}. {} [{}]", i + 1, prompt.name, prompt.id)?;
            writeln!(self.out, "     {}", prompt.description)?;
        }
        Ok(())
    }

    fn print_selecting(&mut self) -> Result<()> {
        writeln!(self.out, "\nLinkedIn Prompt Generator")?;
        writeln!(self.out, "Select a prompt type to get started\n")?;
        self.print_list()
    }

    fn print_collecting(&mut self) -> Result<()> {
        let Some(prompt) = self.session.current_prompt() else {
            return Ok(());
        };
        writeln!(self.out, "\n{}", prompt.name)?;
        writeln!(self.out, "{}\n", prompt.description)?;
        for field in &prompt.fields {
            let value = self
                .session
                .state()
                .field(&field.name)
                .filter(|v| !v.trim().is_empty());
            match value {
                Some(v) => writeln!(self.out, "  {} ({}): {}", field.label, field.name, v)?,
                None if field.hint.is_empty() => {
                    writeln!(self.out, "  {} ({}):", field.label, field.name)?
                }
                None => writeln!(self.out, "  {} ({}): <{}>", field.label, field.name, field.hint)?,
            }
        }
        writeln!(
            self.out,
            "\nUse `set <field> <text>` or `paste <field>`, then `submit`."
        )?;
        Ok(())
    }

    fn print_displaying(&mut self) -> Result<()> {
        let takes_input = self
            .session
            .current_prompt()
            .is_some_and(|p| p.takes_input());
        let Some(shown) = self.session.render_display() else {
            return Ok(());
        };
        writeln!(self.out, "\nGenerated Output")?;
        writeln!(self.out, "Ready to copy and use\n")?;
        writeln!(self.out, "{shown}\n")?;
        if takes_input {
            writeln!(self.out, "`copy` it, `edit` the input, or `reset` to start over.")?;
        } else {
            writeln!(self.out, "`copy` it, go `back`, or `reset` to start over.")?;
        }
        Ok(())
    }
}
