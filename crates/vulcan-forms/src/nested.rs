//! One item of a nested object or array field.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::intl::Intl;

/// Field of the nested item's schema.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedField {
    pub name: String,
    /// Props of the field, laid over the item's shared props.
    pub props: Map<String, Value>,
}

impl NestedField {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            props: Map::new(),
        }
    }

    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.props.insert(key.into(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormNestedItemProps {
    /// Name of the nested field, passed back on removal.
    pub name: String,
    /// Path of the item, e.g. `addresses.0`.
    pub path: String,
    pub nested_fields: Vec<NestedField>,
    /// Position in the parent array; `None` for nested objects.
    pub item_index: Option<usize>,
    pub hide_remove: bool,
    pub label: Option<String>,
    /// Props shared by every child field.
    pub shared: Map<String, Value>,
}

impl FormNestedItemProps {
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            nested_fields: Vec::new(),
            item_index: None,
            hide_remove: false,
            label: None,
            shared: Map::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: NestedField) -> Self {
        self.nested_fields.push(field);
        self
    }

    #[must_use]
    pub const fn with_item_index(mut self, index: usize) -> Self {
        self.item_index = Some(index);
        self
    }

    #[must_use]
    pub const fn with_hide_remove(mut self, hide: bool) -> Self {
        self.hide_remove = hide;
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_shared_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.shared.insert(key.into(), value);
        self
    }
}

/// Child field to render inside the item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedFieldInstance {
    pub key: usize,
    pub path: String,
    pub item_index: Option<usize>,
    pub props: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveButton {
    pub class_name: &'static str,
    pub variant: &'static str,
    pub size: &'static str,
    pub icon_button: bool,
    pub tab_index: i32,
    pub aria_label: String,
    /// Width and height of the remove icon.
    pub icon_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedItemView {
    pub class_name: &'static str,
    pub fields: Vec<NestedFieldInstance>,
    /// Present for removable array items; comes with the deleted overlay.
    pub remove_button: Option<RemoveButton>,
}

type RemoveHandler = Box<dyn Fn(&str) + Send + Sync>;

pub struct FormNestedItem {
    props: FormNestedItemProps,
    remove_item: Option<RemoveHandler>,
}

impl fmt::Debug for FormNestedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormNestedItem")
            .field("props", &self.props)
            .finish_non_exhaustive()
    }
}

impl FormNestedItem {
    #[must_use]
    pub const fn new(props: FormNestedItemProps) -> Self {
        Self {
            props,
            remove_item: None,
        }
    }

    /// Called with the field name when the item is removed.
    #[must_use]
    pub fn on_remove_with(mut self, remove: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.remove_item = Some(Box::new(remove));
        self
    }

    #[must_use]
    pub const fn props(&self) -> &FormNestedItemProps {
        &self.props
    }

    /// Whether the item belongs to an array and may be removed.
    pub const fn is_removable(&self) -> bool {
        self.props.item_index.is_some() && !self.props.hide_remove
    }

    pub fn view(&self, intl: &dyn Intl) -> NestedItemView {
        let props = &self.props;
        let fields = props
            .nested_fields
            .iter()
            .enumerate()
            .map(|(key, field)| {
                let mut field_props = props.shared.clone();
                field_props.extend(field.props.clone());
                field_props.insert("name".to_string(), Value::String(field.name.clone()));
                NestedFieldInstance {
                    key,
                    path: format!("{}.{}", props.path, field.name),
                    item_index: props.item_index,
                    props: field_props,
                }
            })
            .collect();

        let remove_button = self.is_removable().then(|| RemoveButton {
            class_name: "form-nested-button",
            variant: "danger",
            size: "sm",
            icon_button: true,
            tab_index: -1,
            aria_label: intl.format_message(
                "forms.delete_nested_field",
                &[("label", props.label.as_deref().unwrap_or_default())],
            ),
            icon_size: 12,
        });

        NestedItemView {
            class_name: "form-nested-item",
            fields,
            remove_button,
        }
    }

    /// Remove the item; returns whether a removal was requested.
    pub fn remove(&self) -> bool {
        if !self.is_removable() {
            return false;
        }
        let Some(remove_item) = &self.remove_item else {
            return false;
        };
        debug!(name = %self.props.name, index = ?self.props.item_index, "removing nested item");
        remove_item(&self.props.name);
        true
    }
}
