use super::*;
use crate::catalog::{Catalog, FieldSpec, TemplateBody};
use std::collections::HashMap;

// ===================================================================
// Test helpers
// ===================================================================

fn spec(name: &str, placeholders: &[&str]) -> FieldSpec {
    FieldSpec {
        name: name.to_string(),
        label: name.to_string(),
        hint: String::new(),
        placeholders: placeholders.iter().map(|p| p.to_string()).collect(),
    }
}

fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn text(source: &str) -> TemplateBody {
    TemplateBody::Text(source.to_string())
}

// ===================================================================
// Placeholder scanning
// ===================================================================

#[test]
fn token_wraps_name_in_braces() {
    assert_eq!(token("USER_INPUT"), "{{USER_INPUT}}");
}

#[test]
fn placeholders_are_distinct_and_ordered() {
    let names = placeholders("{{B}} then {{A}} and {{B}} again, {{ not_one }}, {single}");
    assert_eq!(names, vec!["B", "A"]);
}

#[test]
fn placeholder_name_syntax() {
    assert!(is_placeholder_name("USER_INPUT"));
    assert!(is_placeholder_name("step2"));
    assert!(!is_placeholder_name(""));
    assert!(!is_placeholder_name("MY-TOKEN"));
    assert!(!is_placeholder_name("{{X}}"));
}

#[test]
fn placeholders_empty_for_plain_text() {
    assert!(placeholders("no tokens here").is_empty());
}

// ===================================================================
// Plain text
// ===================================================================

#[test]
fn text_replaces_every_occurrence_with_trimmed_value() {
    let rendered = render(
        &text("A: {{X}}\nB: {{X}}"),
        &[spec("x", &["X"])],
        &values(&[("x", "  hello \n")]),
    )
    .unwrap();
    assert_eq!(rendered.text, "A: hello\nB: hello");
    assert_eq!(rendered.kind, OutputKind::PlainText);
}

#[test]
fn one_field_can_fill_several_placeholders() {
    let rendered = render(
        &text("{{ONE}} / {{TWO}}"),
        &[spec("f", &["ONE", "TWO"])],
        &values(&[("f", "v")]),
    )
    .unwrap();
    assert_eq!(rendered.text, "v / v");
}

#[test]
fn missing_value_leaves_token_literal() {
    let rendered = render(
        &text("{{TOPIC}} by {{AUTHOR}}"),
        &[spec("topic", &["TOPIC"]), spec("author", &["AUTHOR"])],
        &values(&[("topic", "Rust")]),
    )
    .unwrap();
    assert_eq!(rendered.text, "Rust by {{AUTHOR}}");
}

#[test]
fn unbound_placeholder_stays_literal() {
    let rendered = render(&text("{{UNKNOWN}}"), &[], &values(&[("x", "y")])).unwrap();
    assert_eq!(rendered.text, "{{UNKNOWN}}");
}

#[test]
fn inserted_text_is_not_rescanned() {
    let rendered = render(
        &text("{{A}} | {{B}}"),
        &[spec("a", &["A"]), spec("b", &["B"])],
        &values(&[("a", "{{B}}"), ("b", "second")]),
    )
    .unwrap();
    assert_eq!(rendered.text, "{{B}} | second");
}

#[test]
fn no_templating_language_evaluation() {
    let rendered = render(
        &text("{% if x %}{{X}}{% endif %}"),
        &[spec("x", &["X"])],
        &values(&[("x", "shown")]),
    )
    .unwrap();
    assert_eq!(rendered.text, "{% if x %}shown{% endif %}");
}

#[test]
fn render_is_idempotent() {
    let template = text("Theme: {{USER_INPUT}}");
    let bindings = [spec("input", &["USER_INPUT"])];
    let fields = values(&[("input", "robots")]);
    let first = render(&template, &bindings, &fields).unwrap();
    let second = render(&template, &bindings, &fields).unwrap();
    assert_eq!(first, second);
}

// ===================================================================
// Structured documents
// ===================================================================

#[test]
fn document_substitutes_nested_string_values() {
    let template = TemplateBody::Document(
        r#"{"context":{"topic":"{{T}}","flags":[true,"{{T}}"]},"n":3}"#.to_string(),
    );
    let rendered = render(&template, &[spec("t", &["T"])], &values(&[("t", "Rust")])).unwrap();
    assert_eq!(rendered.kind, OutputKind::StructuredDocument);
    let doc: serde_json::Value = serde_json::from_str(&rendered.text).unwrap();
    assert_eq!(doc["context"]["topic"], "Rust");
    assert_eq!(doc["context"]["flags"][1], "Rust");
    assert_eq!(doc["n"], 3);
}

#[test]
fn document_is_pretty_printed_in_source_key_order() {
    let template = TemplateBody::Document(r#"{"zeta":"{{T}}","alpha":1}"#.to_string());
    let rendered = render(&template, &[spec("t", &["T"])], &values(&[("t", "x")])).unwrap();
    assert_eq!(rendered.text, "{\n  \"zeta\": \"x\",\n  \"alpha\": 1\n}");
}

#[test]
fn document_escapes_quotes_in_user_text() {
    let template = TemplateBody::Document(r#"{"topic":"{{T}}"}"#.to_string());
    let rendered = render(
        &template,
        &[spec("t", &["T"])],
        &values(&[("t", r#"the "real" reason \ why"#)]),
    )
    .unwrap();
    let doc: serde_json::Value = serde_json::from_str(&rendered.text).unwrap();
    assert_eq!(doc["topic"], r#"the "real" reason \ why"#);
}

#[test]
fn document_substitutes_object_keys() {
    let template = TemplateBody::Document(
        r#"{"{{T}}":"about it","nested":{"{{T}} tips":["{{T}}"]},"last":0}"#.to_string(),
    );
    let rendered = render(&template, &[spec("t", &["T"])], &values(&[("t", "Rust")])).unwrap();
    assert!(!rendered.text.contains("{{T}}"), "got: {}", rendered.text);
    let doc: serde_json::Value = serde_json::from_str(&rendered.text).unwrap();
    assert_eq!(doc["Rust"], "about it");
    assert_eq!(doc["nested"]["Rust tips"][0], "Rust");
    assert!(rendered.text.starts_with("{\n  \"Rust\": "), "got: {}", rendered.text);
    assert!(rendered.text.trim_end().ends_with("\"last\": 0\n}"));
}

#[test]
fn malformed_document_is_a_render_error() {
    let template = TemplateBody::Document("{ not json {{T}}".to_string());
    let err = render(&template, &[spec("t", &["T"])], &values(&[("t", "x")])).unwrap_err();
    assert!(matches!(err, RenderError::Document(_)));
    assert!(err.to_string().contains("not valid JSON"), "got: {err}");
}

// ===================================================================
// Built-in catalog
// ===================================================================

#[test]
fn builtin_prompts_resolve_every_declared_placeholder() {
    let catalog = Catalog::with_builtin(vec![]).unwrap();
    for summary in catalog.list_all() {
        let prompt = catalog.lookup(summary.id).unwrap();
        let fields: HashMap<String, String> = prompt
            .fields
            .iter()
            .map(|f| (f.name.clone(), format!("value for {}", f.name)))
            .collect();
        let rendered = render(&prompt.template, &prompt.fields, &fields).unwrap();
        for field in &prompt.fields {
            for placeholder in &field.placeholders {
                assert!(
                    !rendered.text.contains(&token(placeholder)),
                    "{}: {} left in output",
                    prompt.id,
                    token(placeholder)
                );
            }
            assert!(rendered.text.contains(&format!("value for {}", field.name)));
        }
        assert_eq!(rendered.kind, prompt.output_kind());
    }
}

#[test]
fn image_prompt_scenario() {
    let catalog = Catalog::with_builtin(vec![]).unwrap();
    let prompt = catalog.lookup("IMAGE_PROMPT").unwrap();
    let rendered = render(
        &prompt.template,
        &prompt.fields,
        &values(&[("input", "robots debugging code")]),
    )
    .unwrap();
    assert_eq!(rendered.kind, OutputKind::PlainText);
    assert!(rendered.text.contains("robots debugging code"));
    assert!(!rendered.text.contains("{{USER_INPUT}}"));
}

#[test]
fn post_scenario() {
    let catalog = Catalog::with_builtin(vec![]).unwrap();
    let prompt = catalog.lookup("POST").unwrap();
    let rendered = render(
        &prompt.template,
        &prompt.fields,
        &values(&[("input", "AI is eating software jobs")]),
    )
    .unwrap();
    assert_eq!(rendered.kind, OutputKind::StructuredDocument);
    assert!(rendered.text.contains("AI is eating software jobs"));
    assert!(!rendered.text.contains("{{INSERT_TITLE_HERE}}"));
    let doc: serde_json::Value = serde_json::from_str(&rendered.text).unwrap();
    assert_eq!(doc["context"]["topic_source"], "AI is eating software jobs");
}
