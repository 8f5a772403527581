//! Single form field: wrapper classes, input properties and field events.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::input_type::InputType;
use crate::intl::Intl;

/// Input properties forwarded to the rendered input element.
///
/// `data-*` and `aria-*` attributes are always forwarded.
pub const ALLOWED_INPUT_PROPS: &[&str] = &[
    "autoComplete",
    "autoFocus",
    "checked",
    "className",
    "cols",
    "defaultValue",
    "disabled",
    "id",
    "label",
    "max",
    "maxLength",
    "min",
    "minLength",
    "multiple",
    "name",
    "pattern",
    "placeholder",
    "readOnly",
    "required",
    "rows",
    "step",
    "type",
    "value",
];

/// Keep the props an input element accepts.
#[must_use]
pub fn whitelist_input_props(props: &Map<String, Value>) -> Map<String, Value> {
    props
        .iter()
        .filter(|(key, _)| {
            ALLOWED_INPUT_PROPS.contains(&key.as_str())
                || key.starts_with("data-")
                || key.starts_with("aria-")
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Validation error attached to a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Message id, e.g. `errors.required`.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl FieldError {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: None,
            message: None,
            properties: Map::new(),
        }
    }
}

/// Props of a form field.
#[derive(Debug, Clone, PartialEq)]
pub struct FormComponentProps {
    pub name: String,
    pub input_type: InputType,
    /// Name of a custom input component replacing the built-in one.
    pub custom_input: Option<String>,
    pub input_class_name: Option<String>,
    pub disabled: bool,
    pub help: Option<String>,
    pub description: Option<String>,
    pub loading: bool,
    pub intl_keys: Vec<String>,
    /// Extra properties passed to the field layout.
    pub item_properties: Map<String, Value>,
    /// Raw properties; only the allowed ones reach the input.
    pub input_properties: Map<String, Value>,
    pub errors: Vec<FieldError>,
    pub show_chars_remaining: bool,
    pub chars_remaining: i64,
}

impl FormComponentProps {
    #[must_use]
    pub fn new(name: impl Into<String>, input_type: InputType) -> Self {
        Self {
            name: name.into(),
            input_type,
            custom_input: None,
            input_class_name: None,
            disabled: false,
            help: None,
            description: None,
            loading: false,
            intl_keys: Vec::new(),
            item_properties: Map::new(),
            input_properties: Map::new(),
            errors: Vec::new(),
            show_chars_remaining: false,
            chars_remaining: 0,
        }
    }

    #[must_use]
    pub fn with_custom_input(mut self, component: impl Into<String>) -> Self {
        self.custom_input = Some(component.into());
        self
    }

    #[must_use]
    pub fn with_input_class_name(mut self, class: impl Into<String>) -> Self {
        self.input_class_name = Some(class.into());
        self
    }

    #[must_use]
    pub const fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub const fn with_loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    #[must_use]
    pub fn with_intl_keys(mut self, keys: Vec<String>) -> Self {
        self.intl_keys = keys;
        self
    }

    #[must_use]
    pub fn with_item_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.item_properties.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_input_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.input_properties.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = errors;
        self
    }

    /// Show the characters-remaining counter.
    #[must_use]
    pub const fn with_chars_remaining(mut self, remaining: i64) -> Self {
        self.show_chars_remaining = true;
        self.chars_remaining = remaining;
        self
    }
}

/// Change reported by the rendered input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeEvent {
    pub value: Value,
    pub checked: bool,
}

/// Properties handed to the field layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProperties {
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// The description, or the help text when there is none.
    pub description: Option<String>,
    pub loading: bool,
    pub intl_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearButton {
    pub class_name: &'static str,
    pub title: String,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharsRemaining {
    pub class_name: String,
    pub remaining: i64,
}

/// What a renderer draws for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormComponentView {
    /// Wrapper classes.
    pub class_name: String,
    pub input_properties: Map<String, Value>,
    pub item_properties: ItemProperties,
    /// Errors to list under the input; empty when the field is valid.
    pub errors: Vec<FieldError>,
    pub clear_button: Option<ClearButton>,
    pub chars_remaining: Option<CharsRemaining>,
}

type ChangeHandler = Box<dyn Fn(Value) + Send + Sync>;
type Action = Box<dyn Fn() + Send + Sync>;

/// A form field with its event handlers.
pub struct FormComponentInner {
    props: FormComponentProps,
    handle_change: Option<ChangeHandler>,
    submit_form: Option<Action>,
    clear_field: Option<Action>,
}

impl fmt::Debug for FormComponentInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormComponentInner")
            .field("props", &self.props)
            .finish_non_exhaustive()
    }
}

impl FormComponentInner {
    #[must_use]
    pub const fn new(props: FormComponentProps) -> Self {
        Self {
            props,
            handle_change: None,
            submit_form: None,
            clear_field: None,
        }
    }

    /// Receive the new field value on every change.
    #[must_use]
    pub fn on_change_with(mut self, handler: impl Fn(Value) + Send + Sync + 'static) -> Self {
        self.handle_change = Some(Box::new(handler));
        self
    }

    /// Submit the form when Enter is pressed.
    #[must_use]
    pub fn on_submit_with(mut self, submit: impl Fn() + Send + Sync + 'static) -> Self {
        self.submit_form = Some(Box::new(submit));
        self
    }

    /// Clear the field when the clear button is used.
    #[must_use]
    pub fn on_clear_with(mut self, clear: impl Fn() + Send + Sync + 'static) -> Self {
        self.clear_field = Some(Box::new(clear));
        self
    }

    #[must_use]
    pub const fn props(&self) -> &FormComponentProps {
        &self.props
    }

    pub fn view(&self, intl: &dyn Intl) -> FormComponentView {
        let props = &self.props;
        FormComponentView {
            class_name: self.class_name(),
            input_properties: whitelist_input_props(&props.input_properties),
            item_properties: ItemProperties {
                extra: props.item_properties.clone(),
                description: props.description.clone().or_else(|| props.help.clone()),
                loading: props.loading,
                intl_keys: props.intl_keys.clone(),
            },
            errors: props.errors.clone(),
            clear_button: self.shows_clear_button().then(|| ClearButton {
                class_name: "form-component-clear",
                title: intl.format_message("forms.clear_field", &[]),
                label: "✕",
            }),
            chars_remaining: props.show_chars_remaining.then(|| CharsRemaining {
                class_name: if props.chars_remaining < 10 {
                    "form-control-limit danger".to_string()
                } else {
                    "form-control-limit".to_string()
                },
                remaining: props.chars_remaining,
            }),
        }
    }

    /// Forward the changed value: `checked` for checkboxes, `value` otherwise.
    pub fn on_change(&self, event: &ChangeEvent) {
        let value = if self.props.input_type == InputType::Checkbox {
            Value::Bool(event.checked)
        } else {
            event.value.clone()
        };
        match &self.handle_change {
            Some(handle_change) => handle_change(value),
            None => debug!(field = %self.props.name, "change ignored, no handler"),
        }
    }

    /// Handle a key press; returns whether the form was submitted.
    pub fn on_key_press(&self, key: &str) -> bool {
        if key != "Enter" || self.props.input_type == InputType::Textarea {
            return false;
        }
        let Some(submit) = &self.submit_form else {
            return false;
        };
        debug!(field = %self.props.name, "submitting form from field");
        submit();
        true
    }

    /// Use the clear button; returns whether the field was cleared.
    pub fn clear(&self) -> bool {
        if !self.shows_clear_button() {
            return false;
        }
        self.clear_field.as_ref().is_some_and(|clear| {
            clear();
            true
        })
    }

    fn shows_clear_button(&self) -> bool {
        self.props.input_type.is_clearable() && !self.props.disabled
    }

    fn class_name(&self) -> String {
        let props = &self.props;
        let input_name = props
            .custom_input
            .as_deref()
            .unwrap_or_else(|| props.input_type.as_str());
        let mut classes = vec!["form-input".to_string()];
        if let Some(custom) = props.input_class_name.as_deref().filter(|c| !c.is_empty()) {
            classes.push(custom.to_string());
        }
        classes.push(format!("input-{}", props.name));
        classes.push(format!("form-component-{input_name}"));
        if !props.errors.is_empty() {
            classes.push("input-error".to_string());
        }
        classes.join(" ")
    }
}
