//! GraphQL descriptors of a data model.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Static GraphQL metadata of a model.
///
/// Plural names are always supplied by the caller; nothing here guesses a
/// plural form from the singular type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlModel {
    type_name: String,
    multi_type_name: String,
    multi_resolver_name: String,
    default_fragment_name: String,
    default_fragment: String,
}

impl GraphqlModel {
    /// Create a descriptor for `type_name`, listed as `multi_type_name`.
    ///
    /// The resolver name defaults to the multi type name with a lower-case
    /// first letter and the default fragment selects `_id` only.
    pub fn new(
        type_name: impl Into<String>,
        multi_type_name: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let type_name = type_name.into();
        let multi_type_name = multi_type_name.into();
        if type_name.trim().is_empty() {
            return Err(ModelError::EmptyField("type_name"));
        }
        if multi_type_name.trim().is_empty() {
            return Err(ModelError::EmptyField("multi_type_name"));
        }

        let default_fragment_name = format!("{type_name}DefaultFragment");
        let default_fragment = render_fragment(&default_fragment_name, &type_name, &["_id"]);
        Ok(Self {
            multi_resolver_name: resolver_name_of(&multi_type_name),
            type_name,
            multi_type_name,
            default_fragment_name,
            default_fragment,
        })
    }

    /// Override the resolver name used to locate results in a response.
    pub fn with_resolver_name(mut self, name: impl Into<String>) -> Result<Self, ModelError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::EmptyField("multi_resolver_name"));
        }
        self.multi_resolver_name = name;
        Ok(self)
    }

    /// Use a hand-written default fragment.
    ///
    /// The fragment name is read from the text when possible.
    pub fn with_default_fragment(mut self, fragment: impl Into<String>) -> Result<Self, ModelError> {
        let fragment = fragment.into();
        if fragment.trim().is_empty() {
            return Err(ModelError::EmptyField("default_fragment"));
        }
        if let Some(name) = fragment_name_of(&fragment) {
            self.default_fragment_name = name.to_string();
        }
        self.default_fragment = fragment;
        Ok(self)
    }

    /// Generate the default fragment from a list of field selections.
    pub fn with_default_fields<S: AsRef<str>>(mut self, fields: &[S]) -> Result<Self, ModelError> {
        if fields.is_empty() {
            return Err(ModelError::EmptyField("default_fields"));
        }
        let fields: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
        self.default_fragment = render_fragment(&self.default_fragment_name, &self.type_name, &fields);
        Ok(self)
    }

    /// GraphQL type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// GraphQL type name used for lists of this model.
    #[must_use]
    pub fn multi_type_name(&self) -> &str {
        &self.multi_type_name
    }

    /// Key under which list responses are nested.
    #[must_use]
    pub fn multi_resolver_name(&self) -> &str {
        &self.multi_resolver_name
    }

    /// Name of the default fragment.
    #[must_use]
    pub fn default_fragment_name(&self) -> &str {
        &self.default_fragment_name
    }

    /// Text of the default fragment.
    #[must_use]
    pub fn default_fragment(&self) -> &str {
        &self.default_fragment
    }
}

/// Resolver name for a multi type name: the first character lower-cased.
#[must_use]
pub fn resolver_name_of(multi_type_name: &str) -> String {
    let mut chars = multi_type_name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}

/// Read the fragment name out of `fragment <Name> on <Type> { ... }`.
#[must_use]
pub fn fragment_name_of(fragment: &str) -> Option<&str> {
    let mut words = fragment.split_whitespace();
    while let Some(word) = words.next() {
        if word == "fragment" {
            let name = words.next()?;
            return (words.next() == Some("on")).then_some(name);
        }
    }
    None
}

fn render_fragment(name: &str, type_name: &str, fields: &[&str]) -> String {
    let mut out = format!("fragment {name} on {type_name} {{\n");
    for field in fields {
        out.push_str("  ");
        out.push_str(field);
        out.push('\n');
    }
    out.push('}');
    out
}
