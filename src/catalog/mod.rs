use crate::render::{self, OutputKind};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

mod builtin;

// ===================================================================
// Prompt definitions
// ===================================================================

/// Source of a prompt template.
///
/// In TOML this looks like one of:
///
/// ```toml
/// template = { text = "Write about {{TOPIC}}" }
///
/// # or
///
/// template = { document = '{ "topic": "{{TOPIC}}" }' }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateBody {
    /// Plain text, shown verbatim once rendered.
    Text(String),
    /// JSON document source. Placeholders live inside its string values.
    Document(String),
}

impl TemplateBody {
    pub fn source(&self) -> &str {
        match self {
            TemplateBody::Text(s) | TemplateBody::Document(s) => s,
        }
    }

    pub fn output_kind(&self) -> OutputKind {
        match self {
            TemplateBody::Text(_) => OutputKind::PlainText,
            TemplateBody::Document(_) => OutputKind::StructuredDocument,
        }
    }
}

/// One user-entered field and the placeholders it fills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Key used when setting the field.
    pub name: String,
    /// Caption shown to the user and named in validation messages.
    pub label: String,
    /// Example text shown while the field is empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hint: String,
    /// Placeholder names (without braces) replaced by this field's value.
    pub placeholders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub template: TemplateBody,
    /// Inputs collected before rendering. Empty means the template is
    /// shown as soon as it is selected.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSpec>,
}

impl PromptDefinition {
    pub fn takes_input(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn output_kind(&self) -> OutputKind {
        self.template.output_kind()
    }
}

/// The listing view of a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptSummary<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub description: &'a str,
}

// ===================================================================
// Errors
// ===================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("unknown prompt `{0}`")]
    NotFound(String),
    #[error("prompt id `{0}` is defined more than once")]
    DuplicateId(String),
    #[error("prompt `{id}` declares field `{field}` more than once")]
    DuplicateField { id: String, field: String },
    #[error("prompt `{id}`: field `{field}` names placeholder `{placeholder}`; use only letters, digits and `_`")]
    InvalidPlaceholder {
        id: String,
        field: String,
        placeholder: String,
    },
    #[error("prompt `{id}`: {{{{{placeholder}}}}} is filled by more than one field")]
    DuplicatePlaceholder { id: String, placeholder: String },
    #[error("prompt `{id}`: field `{field}` fills {{{{{placeholder}}}}}, which the template never mentions")]
    UnusedPlaceholder {
        id: String,
        field: String,
        placeholder: String,
    },
}

// ===================================================================
// Catalog
// ===================================================================

/// Read-only table of prompts, in declaration order.
#[derive(Debug)]
pub struct Catalog {
    prompts: Vec<PromptDefinition>,
}

impl Catalog {
    /// Validate `prompts` and build a catalog from them.
    pub fn new(prompts: Vec<PromptDefinition>) -> Result<Self, CatalogError> {
        let mut ids = HashSet::new();
        for prompt in &prompts {
            if !ids.insert(prompt.id.as_str()) {
                return Err(CatalogError::DuplicateId(prompt.id.clone()));
            }
            validate_fields(prompt)?;
        }
        Ok(Self { prompts })
    }

    /// The built-in LinkedIn prompts followed by `extra`.
    pub fn with_builtin(extra: Vec<PromptDefinition>) -> Result<Self, CatalogError> {
        let mut prompts = builtin::prompts();
        prompts.extend(extra);
        Self::new(prompts)
    }

    pub fn lookup(&self, id: &str) -> Result<&PromptDefinition, CatalogError> {
        self.prompts
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    pub fn list_all(&self) -> Vec<PromptSummary<'_>> {
        self.prompts
            .iter()
            .map(|p| PromptSummary {
                id: &p.id,
                name: &p.name,
                description: &p.description,
            })
            .collect()
    }
}

fn validate_fields(prompt: &PromptDefinition) -> Result<(), CatalogError> {
    let source = prompt.template.source();
    let mentioned = render::placeholders(source);

    let mut names = HashSet::new();
    let mut bound = HashSet::new();
    for field in &prompt.fields {
        if !names.insert(field.name.as_str()) {
            return Err(CatalogError::DuplicateField {
                id: prompt.id.clone(),
                field: field.name.clone(),
            });
        }
        for placeholder in &field.placeholders {
            if !render::is_placeholder_name(placeholder) {
                return Err(CatalogError::InvalidPlaceholder {
                    id: prompt.id.clone(),
                    field: field.name.clone(),
                    placeholder: placeholder.clone(),
                });
            }
            if !mentioned.contains(&placeholder.as_str()) {
                return Err(CatalogError::UnusedPlaceholder {
                    id: prompt.id.clone(),
                    field: field.name.clone(),
                    placeholder: placeholder.clone(),
                });
            }
            if !bound.insert(placeholder.as_str()) {
                return Err(CatalogError::DuplicatePlaceholder {
                    id: prompt.id.clone(),
                    placeholder: placeholder.clone(),
                });
            }
        }
    }

    for name in mentioned.iter().filter(|n| !bound.contains(*n)) {
        debug!("prompt `{}` leaves {} unbound", prompt.id, render::token(name));
    }
    Ok(())
}
