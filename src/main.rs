mod catalog;
mod clipboard;
mod console;
mod machine;
mod preferences;
mod render;
mod session;

use anyhow::{bail, Context, Result};
use catalog::Catalog;
use clap::{Parser, Subcommand};
use clipboard::CommandClipboard;
use console::{Console, LineEditor, Piped};
use log::debug;
use machine::Step;
use preferences::Preferences;
use session::{Session, StderrNotifier};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "promptdeck", version, about = "Fill LinkedIn prompt templates and copy the result")]
struct Cli {
    /// Directory holding promptdeck.toml. Created with defaults if missing.
    #[arg(long, env = "PROMPTDECK_HOME", global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Step through selection, input and output (the default).
    Interactive,
    /// List the available prompts.
    List {
        /// Print the listing as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print a prompt's fields and template source.
    Show { id: String },
    /// Render a prompt in one go and print the result.
    Render {
        id: String,
        /// A field value, as `name=value`. Repeat for each field.
        #[arg(short = 'f', long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
        /// Also copy the result to the clipboard.
        #[arg(long)]
        copy: bool,
    },
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected `name=value`, got `{s}`"))?;
    Ok((name.trim().to_string(), value.to_string()))
}

fn setup_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("PROMPTDECK_LOG", "warn"))
        .init();
}

struct App {
    catalog: Catalog,
    clipboard: CommandClipboard,
    display_template: String,
}

impl App {
    fn load(config_dir: Option<&PathBuf>) -> Result<Self> {
        let prefs = match config_dir {
            Some(dir) => Preferences::load(dir)?,
            None => Preferences::default(),
        };
        let display_template = prefs.load_display_template(config_dir.map(PathBuf::as_path))?;
        let clipboard = CommandClipboard::new(&prefs.clipboard);
        let catalog = Catalog::with_builtin(prefs.prompts).context("loading prompt catalog")?;
        debug!("catalog has {} prompts", catalog.list_all().len());
        Ok(Self {
            catalog,
            clipboard,
            display_template,
        })
    }

    fn session(self) -> Session<CommandClipboard, StderrNotifier> {
        Session::new(
            self.catalog,
            self.clipboard,
            StderrNotifier,
            self.display_template,
        )
    }
}

fn list(app: &App, json: bool) -> Result<()> {
    let prompts = app.catalog.list_all();
    if json {
        let out = serde_json::to_string_pretty(&prompts).context("serializing prompt list")?;
        println!("{out}");
        return Ok(());
    }
    for prompt in prompts {
        println!("{:<14}{}", prompt.id, prompt.name);
        println!("{:<14}{}", "", prompt.description);
    }
    Ok(())
}

fn show(app: &App, id: &str) -> Result<()> {
    let prompt = app.catalog.lookup(id)?;
    println!("{} [{}]", prompt.name, prompt.id);
    println!("{}", prompt.description);
    println!("output: {}", prompt.output_kind());
    if prompt.fields.is_empty() {
        println!("fields: none");
    } else {
        println!("fields:");
        for field in &prompt.fields {
            let tokens: Vec<String> = field.placeholders.iter().map(|p| render::token(p)).collect();
            println!("  {} ({}) -> {}", field.name, field.label, tokens.join(", "));
        }
    }
    println!();
    println!("{}", prompt.template.source());
    Ok(())
}

fn render_once(app: App, id: &str, fields: &[(String, String)], copy: bool) -> Result<()> {
    let mut session = app.session();
    let mut step = session.select_prompt(id);
    if step == Step::Collecting {
        for (name, value) in fields {
            session.update_field(name, value);
        }
        step = session.submit();
    }
    let Some(output) = session.state().output() else {
        bail!("no output generated for `{id}` (currently {step})");
    };
    println!("{}", output.text);
    if copy {
        session.copy_output();
    }
    Ok(())
}

const HISTORY_FILENAME: &str = "history.txt";

/// Drive the console from the terminal through the line editor, or from
/// piped stdin line by line.
fn interactive(app: App, config_dir: Option<&Path>) -> Result<()> {
    let mut console = Console::new(app.session(), io::stdout());
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return console.run(&mut Piped(stdin.lock()));
    }
    let mut editor = LineEditor::new(config_dir.map(|dir| dir.join(HISTORY_FILENAME)))?;
    let result = console.run(&mut editor);
    editor.save_history();
    result
}

fn run(cli: Cli) -> Result<()> {
    let app = App::load(cli.config_dir.as_ref())?;
    match cli.command.unwrap_or(Command::Interactive) {
        Command::Interactive => interactive(app, cli.config_dir.as_deref()),
        Command::List { json } => list(&app, json),
        Command::Show { id } => show(&app, &id),
        Command::Render { id, fields, copy } => render_once(app, &id, &fields, copy),
    }
}

fn main() {
    setup_logging();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("promptdeck: {err:#}");
        process::exit(2);
    }
}
