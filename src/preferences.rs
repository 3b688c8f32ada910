use crate::catalog::PromptDefinition;
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

const FILENAME: &str = "promptdeck.toml";

const DEFAULT_DISPLAY_TEMPLATE: &str = "{{ label }}\n\n{{ output }}";

/// Frame put around generated output on the output screen. The template is
/// minijinja and sees `id`, `name`, `kind`, `label` and `output`.
///
/// ```toml
/// [display_template]
/// inline = "{{ name }}\n\n{{ output }}"
/// ```
///
/// `file = "display.j2"` reads the template from the config directory
/// instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum DisplayTemplate {
    Inline(String),
    /// Relative to the config directory.
    File(String),
}

impl Default for DisplayTemplate {
    fn default() -> Self {
        DisplayTemplate::Inline(DEFAULT_DISPLAY_TEMPLATE.into())
    }
}

/// Programs used to reach the system clipboard, as argv lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClipboardCommands {
    #[serde(default = "default_copy_command")]
    pub copy: Vec<String>,
    #[serde(default = "default_paste_command")]
    pub paste: Vec<String>,
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn default_copy_command() -> Vec<String> {
    if cfg!(target_os = "macos") {
        argv(&["pbcopy"])
    } else {
        argv(&["xclip", "-selection", "clipboard"])
    }
}

fn default_paste_command() -> Vec<String> {
    if cfg!(target_os = "macos") {
        argv(&["pbpaste"])
    } else {
        argv(&["xclip", "-selection", "clipboard", "-o"])
    }
}

impl Default for ClipboardCommands {
    fn default() -> Self {
        Self {
            copy: default_copy_command(),
            paste: default_paste_command(),
        }
    }
}

/// User-facing preferences stored in `<config dir>/promptdeck.toml`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Preferences {
    /// How generated output is framed on screen.
    #[serde(default)]
    pub display_template: DisplayTemplate,

    /// Clipboard copy/paste programs.
    #[serde(default)]
    pub clipboard: ClipboardCommands,

    /// Extra prompts, listed after the built-in ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prompts: Vec<PromptDefinition>,
}

impl Preferences {
    /// Read `<dir>/promptdeck.toml`. A first run writes the defaults there
    /// (creating `dir` as needed) so users have a file to edit. Keys left
    /// out of the file keep their default values.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(FILENAME);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Self::write_defaults(dir, &path);
            }
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    fn write_defaults(dir: &Path, path: &Path) -> Result<Self> {
        let prefs = Self::default();
        let rendered = toml::to_string_pretty(&prefs).context("serializing default preferences")?;
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
        info!("wrote default preferences to {}", path.display());
        Ok(prefs)
    }

    /// Resolve the display template to a string. File templates are read
    /// relative to `dir`; without a config directory only inline templates
    /// can be used.
    pub fn load_display_template(&self, dir: Option<&Path>) -> Result<String> {
        match &self.display_template {
            DisplayTemplate::Inline(s) => Ok(s.clone()),
            DisplayTemplate::File(filename) => {
                let dir = dir.context("a display template file needs a config directory")?;
                let path = dir.join(filename);
                fs::read_to_string(&path)
                    .with_context(|| format!("reading template {}", path.display()))
            }
        }
    }
}
