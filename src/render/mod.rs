use crate::catalog::{FieldSpec, TemplateBody};
use regex::{Captures, Regex};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("placeholder pattern is valid"));

// ===================================================================
// Output
// ===================================================================

/// How a rendered prompt is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Shown verbatim.
    PlainText,
    /// A JSON document, shown pretty-printed.
    StructuredDocument,
}

impl OutputKind {
    /// Caption shown above the output.
    pub fn label(self) -> &'static str {
        match self {
            OutputKind::PlainText => "Your Content:",
            OutputKind::StructuredDocument => "JSON Prompt Template:",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::PlainText => f.write_str("text"),
            OutputKind::StructuredDocument => f.write_str("json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub kind: OutputKind,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("structured template is not valid JSON: {0}")]
    Document(#[from] serde_json::Error),
}

// ===================================================================
// Placeholders
// ===================================================================

/// The literal token for placeholder `name`, e.g. `{{USER_INPUT}}`.
pub fn token(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

/// Distinct placeholder names in `text`, in order of first appearance.
pub fn placeholders(text: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for caps in TOKEN.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            if !names.contains(&m.as_str()) {
                names.push(m.as_str());
            }
        }
    }
    names
}

// ===================================================================
// Substitution
// ===================================================================

/// Map each bound placeholder name to the trimmed value of its field.
/// Fields without a value contribute nothing, so their tokens stay literal.
fn bound_values<'a>(
    bindings: &'a [FieldSpec],
    fields: &'a HashMap<String, String>,
) -> HashMap<&'a str, &'a str> {
    let mut values = HashMap::new();
    for spec in bindings {
        if let Some(value) = fields.get(&spec.name) {
            for placeholder in &spec.placeholders {
                values.insert(placeholder.as_str(), value.trim());
            }
        }
    }
    values
}

/// Whether `name` can appear inside a `{{NAME}}` token.
pub fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Single pass over `text`; inserted values are never rescanned.
fn substitute<'t>(text: &'t str, values: &HashMap<&str, &str>) -> Cow<'t, str> {
    TOKEN.replace_all(text, |caps: &Captures| match values.get(&caps[1]) {
        Some(value) => (*value).to_string(),
        None => caps[0].to_string(),
    })
}

fn substitute_strings(value: &mut Value, values: &HashMap<&str, &str>) {
    match value {
        Value::String(s) => {
            let replaced = substitute(s, values).into_owned();
            *s = replaced;
        }
        Value::Array(items) => items
            .iter_mut()
            .for_each(|item| substitute_strings(item, values)),
        Value::Object(map) => {
            // Keys can carry placeholders too; rebuild in the same order.
            for (key, mut item) in std::mem::take(map) {
                substitute_strings(&mut item, values);
                map.insert(substitute(&key, values).into_owned(), item);
            }
        }
        _ => {}
    }
}

/// Fill `template` with the values in `fields` according to `bindings`.
pub fn render(
    template: &TemplateBody,
    bindings: &[FieldSpec],
    fields: &HashMap<String, String>,
) -> Result<Rendered, RenderError> {
    let values = bound_values(bindings, fields);
    match template {
        TemplateBody::Text(source) => Ok(Rendered {
            text: substitute(source, &values).into_owned(),
            kind: OutputKind::PlainText,
        }),
        TemplateBody::Document(source) => {
            let mut doc: Value = serde_json::from_str(source)?;
            substitute_strings(&mut doc, &values);
            Ok(Rendered {
                text: serde_json::to_string_pretty(&doc)?,
                kind: OutputKind::StructuredDocument,
            })
        }
    }
}

#[cfg(test)]
mod tests;
