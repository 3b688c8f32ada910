use crate::catalog::{Catalog, CatalogError, PromptDefinition};
use crate::render::{self, RenderError, Rendered};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

// ===================================================================
// Steps
// ===================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Step {
    #[default]
    Selecting,
    Collecting,
    Displaying,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Selecting => f.write_str("selecting a prompt"),
            Step::Collecting => f.write_str("collecting input"),
            Step::Displaying => f.write_str("displaying output"),
        }
    }
}

// ===================================================================
// Errors
// ===================================================================

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error(transparent)]
    NotFound(#[from] CatalogError),
    #[error("please fill in: {}", .missing.join(", "))]
    Validation { missing: Vec<String> },
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("`{field}` is not an input of {prompt}")]
    UnknownField { prompt: String, field: String },
    #[error("cannot {action} while {step}")]
    InvalidAction { action: &'static str, step: Step },
}

// ===================================================================
// Session state
// ===================================================================

/// Everything one user session knows. Transitions either succeed or leave
/// the state exactly as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    selected: Option<String>,
    fields: HashMap<String, String>,
    output: Option<Rendered>,
    step: Step,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn output(&self) -> Option<&Rendered> {
        self.output.as_ref()
    }

    /// The selected prompt's definition, if a prompt is selected.
    pub fn current_prompt<'c>(
        &self,
        catalog: &'c Catalog,
    ) -> Result<Option<&'c PromptDefinition>, CatalogError> {
        self.selected().map(|id| catalog.lookup(id)).transpose()
    }

    fn require(&self, step: Step, action: &'static str) -> Result<(), TransitionError> {
        if self.step == step {
            Ok(())
        } else {
            Err(TransitionError::InvalidAction {
                action,
                step: self.step,
            })
        }
    }

    fn selected_prompt<'c>(
        &self,
        catalog: &'c Catalog,
    ) -> Result<&'c PromptDefinition, TransitionError> {
        let id = self.selected().unwrap_or_default();
        Ok(catalog.lookup(id)?)
    }

    // ---------------------------------------------------------------
    // Transitions
    // ---------------------------------------------------------------

    /// Choose a prompt. Prompts without inputs are rendered immediately.
    pub fn select_prompt(&mut self, catalog: &Catalog, id: &str) -> Result<Step, TransitionError> {
        self.require(Step::Selecting, "select a prompt")?;
        let prompt = catalog.lookup(id)?;

        if prompt.takes_input() {
            *self = Self {
                selected: Some(prompt.id.clone()),
                step: Step::Collecting,
                ..Self::default()
            };
        } else {
            let output = render::render(&prompt.template, &prompt.fields, &HashMap::new())?;
            *self = Self {
                selected: Some(prompt.id.clone()),
                output: Some(output),
                step: Step::Displaying,
                ..Self::default()
            };
        }
        Ok(self.step)
    }

    pub fn update_field(
        &mut self,
        catalog: &Catalog,
        name: &str,
        value: &str,
    ) -> Result<Step, TransitionError> {
        self.require(Step::Collecting, "edit a field")?;
        let prompt = self.selected_prompt(catalog)?;
        if prompt.field(name).is_none() {
            return Err(TransitionError::UnknownField {
                prompt: prompt.id.clone(),
                field: name.to_string(),
            });
        }
        self.fields.insert(name.to_string(), value.to_string());
        Ok(self.step)
    }

    /// Validate the collected fields and render the selected prompt.
    pub fn submit(&mut self, catalog: &Catalog) -> Result<Step, TransitionError> {
        self.require(Step::Collecting, "generate output")?;
        let prompt = self.selected_prompt(catalog)?;

        let missing: Vec<String> = prompt
            .fields
            .iter()
            .filter(|f| self.field(&f.name).is_none_or(|v| v.trim().is_empty()))
            .map(|f| f.label.clone())
            .collect();
        if !missing.is_empty() {
            return Err(TransitionError::Validation { missing });
        }

        let output = render::render(&prompt.template, &prompt.fields, self.fields())?;
        self.output = Some(output);
        self.step = Step::Displaying;
        Ok(self.step)
    }

    /// Return to the previous screen.
    pub fn go_back(&mut self, catalog: &Catalog) -> Result<Step, TransitionError> {
        match self.step {
            Step::Selecting => Ok(self.step),
            Step::Collecting => Ok(self.reset()),
            Step::Displaying => {
                if self.selected_prompt(catalog)?.takes_input() {
                    self.edit_and_regenerate(catalog)
                } else {
                    Ok(self.reset())
                }
            }
        }
    }

    /// Go from the output back to the inputs, keeping what was entered.
    pub fn edit_and_regenerate(&mut self, catalog: &Catalog) -> Result<Step, TransitionError> {
        self.require(Step::Displaying, "edit the input")?;
        let prompt = self.selected_prompt(catalog)?;
        if !prompt.takes_input() {
            return Err(TransitionError::InvalidAction {
                action: "edit the input of a prompt without inputs",
                step: self.step,
            });
        }
        self.output = None;
        self.step = Step::Collecting;
        Ok(self.step)
    }

    /// Start over.
    pub fn reset(&mut self) -> Step {
        *self = Self::default();
        self.step
    }
}
