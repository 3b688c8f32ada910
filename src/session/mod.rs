use crate::catalog::{Catalog, PromptDefinition};
use crate::clipboard::{Clipboard, ClipboardError};
use crate::machine::{SessionState, Step, TransitionError};
use crate::render::RenderError;
use log::debug;
use minijinja::{context, Environment};
use thiserror::Error;

/// Where user-facing messages go.
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// Prints notifications to stderr, prefixed with the program name.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&mut self, message: &str) {
        eprintln!("promptdeck: {message}");
    }
}

/// Collects notifications in memory.
impl Notifier for Vec<String> {
    fn notify(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Failed to generate output: {0}")]
    Render(RenderError),
    #[error(transparent)]
    Transition(TransitionError),
    #[error("Clipboard unavailable: {0}")]
    Clipboard(#[from] ClipboardError),
    #[error("Failed to display output: {0}")]
    Display(#[from] minijinja::Error),
}

impl From<TransitionError> for ActionError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Render(e) => ActionError::Render(e),
            other => ActionError::Transition(other),
        }
    }
}

/// One interactive session: the state machine plus its collaborators.
/// Every action catches its own errors and reports them through the
/// notifier; callers only ever see the resulting step.
pub struct Session<C: Clipboard, N: Notifier> {
    catalog: Catalog,
    state: SessionState,
    clipboard: C,
    notifier: N,
    display_template: String,
}

impl<C: Clipboard, N: Notifier> Session<C, N> {
    pub fn new(catalog: Catalog, clipboard: C, notifier: N, display_template: String) -> Self {
        Self {
            catalog,
            state: SessionState::new(),
            clipboard,
            notifier,
            display_template,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn step(&self) -> Step {
        self.state.step()
    }

    /// The selected prompt, if any.
    pub fn current_prompt(&self) -> Option<&PromptDefinition> {
        self.state.current_prompt(&self.catalog).ok().flatten()
    }

    /// Pass a message straight to the notifier.
    pub fn notify(&mut self, message: &str) {
        self.notifier.notify(message);
    }

    /// Report `result`'s error, if any, and return the current step.
    fn settle<T>(&mut self, action: &str, result: Result<T, ActionError>) -> Step {
        match result {
            Ok(_) => debug!("{action}: now {}", self.state.step()),
            Err(err) => {
                debug!("{action} failed: {err}");
                self.notifier.notify(&err.to_string());
            }
        }
        self.state.step()
    }

    // ---------------------------------------------------------------
    // Actions
    // ---------------------------------------------------------------

    pub fn select_prompt(&mut self, id: &str) -> Step {
        let result = self.state.select_prompt(&self.catalog, id);
        self.settle("select", result.map_err(ActionError::from))
    }

    pub fn update_field(&mut self, name: &str, value: &str) -> Step {
        let result = self.state.update_field(&self.catalog, name, value);
        self.settle("update", result.map_err(ActionError::from))
    }

    /// Replace a field's value with the clipboard contents. The field is
    /// left unchanged if the clipboard can't be read.
    pub fn paste_field(&mut self, name: &str) -> Step {
        let result = self.try_paste_field(name);
        self.settle("paste", result)
    }

    fn try_paste_field(&mut self, name: &str) -> Result<Step, ActionError> {
        // Check the target before touching the clipboard.
        let prompt = self
            .state
            .current_prompt(&self.catalog)
            .map_err(TransitionError::from)?;
        match prompt {
            Some(p) if self.state.step() == Step::Collecting => {
                if p.field(name).is_none() {
                    return Err(TransitionError::UnknownField {
                        prompt: p.id.clone(),
                        field: name.to_string(),
                    }
                    .into());
                }
            }
            _ => {
                return Err(TransitionError::InvalidAction {
                    action: "paste into a field",
                    step: self.state.step(),
                }
                .into());
            }
        }
        let text = self.clipboard.read()?;
        Ok(self.state.update_field(&self.catalog, name, &text)?)
    }

    pub fn submit(&mut self) -> Step {
        let result = self.state.submit(&self.catalog);
        self.settle("submit", result.map_err(ActionError::from))
    }

    pub fn go_back(&mut self) -> Step {
        let result = self.state.go_back(&self.catalog);
        self.settle("back", result.map_err(ActionError::from))
    }

    pub fn edit_and_regenerate(&mut self) -> Step {
        let result = self.state.edit_and_regenerate(&self.catalog);
        self.settle("edit", result.map_err(ActionError::from))
    }

    /// Put the generated output on the clipboard.
    pub fn copy_output(&mut self) -> Step {
        let result = self.try_copy_output();
        if result.is_ok() {
            self.notifier.notify("Copied to clipboard");
        }
        self.settle("copy", result)
    }

    fn try_copy_output(&mut self) -> Result<(), ActionError> {
        let output = self.state.output().ok_or(TransitionError::InvalidAction {
            action: "copy output",
            step: self.state.step(),
        })?;
        Ok(self.clipboard.write(&output.text)?)
    }

    pub fn reset(&mut self) -> Step {
        let step = self.state.reset();
        self.settle::<Step>("reset", Ok(step))
    }

    /// The generated output framed by the display template, or `None` when
    /// there is nothing to show or the template fails.
    pub fn render_display(&mut self) -> Option<String> {
        let result = self.try_render_display();
        match result {
            Ok(text) => text,
            Err(err) => {
                self.notifier.notify(&err.to_string());
                None
            }
        }
    }

    fn try_render_display(&self) -> Result<Option<String>, ActionError> {
        let (Some(output), Some(prompt)) = (self.state.output(), self.current_prompt()) else {
            return Ok(None);
        };
        let env = Environment::new();
        let tmpl = env.template_from_str(&self.display_template)?;
        let text = tmpl.render(context! {
            id => prompt.id,
            name => prompt.name,
            kind => output.kind.to_string(),
            label => output.kind.label(),
            output => output.text,
        })?;
        Ok(Some(text))
    }
}
