#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run the binary with `args`, feeding `stdin`. Returns (exit code, stdout, stderr).
pub fn run_cli(args: &[&str], stdin: &str) -> (i32, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_promptdeck"))
        .args(args)
        .env_remove("PROMPTDECK_HOME")
        .env_remove("PROMPTDECK_LOG")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn binary");

    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();

    let output = child.wait_with_output().unwrap();
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

/// Like `run_cli`, with `--config-dir` pointing at `dir`.
pub fn run_with_config(dir: &Path, args: &[&str], stdin: &str) -> (i32, String, String) {
    let dir = dir.to_str().unwrap();
    let mut all = vec!["--config-dir", dir];
    all.extend_from_slice(args);
    run_cli(&all, stdin)
}

/// Create a temp config dir whose `promptdeck.toml` has the given contents.
/// The `TempDir` must be kept alive for the duration of the test.
pub fn config_dir(toml: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("promptdeck.toml"), toml).unwrap();
    dir
}

/// Clipboard section that copies into `sink` and pastes `paste_text`.
pub fn clipboard_toml(sink: &Path, paste_text: &str) -> String {
    format!(
        r#"
[clipboard]
copy = ["sh", "-c", "cat > '{}'"]
paste = ["printf", "%s", "{paste_text}"]
"#,
        sink.display()
    )
}

/// An extra prompt users can add through preferences.
pub const HOOK_PROMPT: &str = r#"
[[prompts]]
id = "HOOK"
name = "Opening Hook"
description = "A first line that stops the scroll"
template = { text = "Write one hook about {{TOPIC}} for {{AUDIENCE}}." }

[[prompts.fields]]
name = "topic"
label = "Topic"
placeholders = ["TOPIC"]

[[prompts.fields]]
name = "audience"
label = "Audience"
hint = "E.g., engineering managers"
placeholders = ["AUDIENCE"]
"#;
