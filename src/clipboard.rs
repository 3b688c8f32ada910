use crate::preferences::ClipboardCommands;
use log::debug;
use std::io::{self, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::string::FromUtf8Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("no clipboard command configured")]
    NotConfigured,
    #[error("running `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` exited with {status}")]
    Failed { program: String, status: ExitStatus },
    #[error("clipboard contents are not valid UTF-8")]
    NotUtf8(#[from] FromUtf8Error),
}

/// System clipboard access.
pub trait Clipboard {
    fn write(&mut self, text: &str) -> Result<(), ClipboardError>;
    fn read(&mut self) -> Result<String, ClipboardError>;
}

/// Clipboard backed by external programs, e.g. `pbcopy` / `pbpaste`.
/// The copy program receives the text on stdin; the paste program's
/// stdout is the clipboard contents.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    copy: Vec<String>,
    paste: Vec<String>,
}

impl CommandClipboard {
    pub fn new(commands: &ClipboardCommands) -> Self {
        Self {
            copy: commands.copy.clone(),
            paste: commands.paste.clone(),
        }
    }
}

fn command(argv: &[String]) -> Result<(Command, &str), ClipboardError> {
    let (program, args) = argv.split_first().ok_or(ClipboardError::NotConfigured)?;
    let mut cmd = Command::new(program);
    cmd.args(args);
    Ok((cmd, program.as_str()))
}

fn spawn_error(program: &str) -> impl FnOnce(io::Error) -> ClipboardError + '_ {
    move |source| ClipboardError::Spawn {
        program: program.to_string(),
        source,
    }
}

impl Clipboard for CommandClipboard {
    fn write(&mut self, text: &str) -> Result<(), ClipboardError> {
        let (mut cmd, program) = command(&self.copy)?;
        debug!("copying {} bytes with `{program}`", text.len());
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(spawn_error(program))?;
        if let Some(mut stdin) = child.stdin.take() {
            // Early exit closes the pipe; the exit status is reported below.
            match stdin.write_all(text.as_bytes()) {
                Err(e) if e.kind() != io::ErrorKind::BrokenPipe => {
                    return Err(spawn_error(program)(e));
                }
                _ => {}
            }
        }
        let status = child.wait().map_err(spawn_error(program))?;
        if !status.success() {
            return Err(ClipboardError::Failed {
                program: program.to_string(),
                status,
            });
        }
        Ok(())
    }

    fn read(&mut self) -> Result<String, ClipboardError> {
        let (mut cmd, program) = command(&self.paste)?;
        debug!("reading clipboard with `{program}`");
        let output = cmd
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(spawn_error(program))?;
        if !output.status.success() {
            return Err(ClipboardError::Failed {
                program: program.to_string(),
                status: output.status,
            });
        }
        Ok(String::from_utf8(output.stdout)?)
    }
}
