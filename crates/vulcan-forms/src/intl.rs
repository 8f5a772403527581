//! Message formatting for component labels.

use std::collections::HashMap;

use tracing::debug;

use crate::error::FormError;

/// Formats translated messages.
pub trait Intl: Send + Sync {
    /// Message `id` with `{name}` placeholders filled from `values`.
    fn format_message(&self, id: &str, values: &[(&str, &str)]) -> String;
}

/// In-memory catalog of message templates keyed by id.
///
/// Unknown ids format as the id itself; placeholders without a value are
/// left as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the English labels used by the form components.
    #[must_use]
    pub fn english() -> Self {
        Self::new()
            .with_message("forms.clear_field", "Clear field")
            .with_message("forms.delete_nested_field", "Delete {label}")
    }

    /// Catalog read from a flat `{"id": "template"}` JSON object.
    pub fn from_json(json: &str) -> Result<Self, FormError> {
        Ok(Self {
            messages: serde_json::from_str(json)?,
        })
    }

    #[must_use]
    pub fn with_message(mut self, id: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(id.into(), template.into());
        self
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&str> {
        self.messages.get(id).map(String::as_str)
    }
}

impl Intl for MessageCatalog {
    fn format_message(&self, id: &str, values: &[(&str, &str)]) -> String {
        match self.messages.get(id) {
            Some(template) => interpolate(template, values),
            None => {
                debug!(id, "missing message");
                id.to_string()
            }
        }
    }
}

fn interpolate(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after[..close];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..=open + close + 1]),
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_placeholders() {
        let catalog = MessageCatalog::english();
        assert_eq!(
            catalog.format_message("forms.delete_nested_field", &[("label", "Address")]),
            "Delete Address"
        );
        assert_eq!(
            catalog.format_message("forms.clear_field", &[]),
            "Clear field"
        );
    }

    #[test]
    fn unknown_ids_and_values_pass_through() {
        let catalog = MessageCatalog::new().with_message("greeting", "Hi {name}, {missing} {");
        assert_eq!(
            catalog.format_message("greeting", &[("name", "Ada")]),
            "Hi Ada, {missing} {"
        );
        assert_eq!(catalog.format_message("nope", &[]), "nope");
    }

    #[test]
    fn loads_json_catalog() {
        let catalog =
            MessageCatalog::from_json(r#"{"forms.clear_field": "Effacer"}"#).expect("catalog");
        assert_eq!(catalog.get("forms.clear_field"), Some("Effacer"));
        assert!(matches!(
            MessageCatalog::from_json("[1, 2]"),
            Err(FormError::Catalog(_))
        ));
    }
}
