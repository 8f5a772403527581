//! Vulcan Forms - headless form field components.
//!
//! Each component turns its props into a serializable view (class names,
//! filtered input properties, buttons to show) and exposes the event
//! handlers a renderer wires to it. Nothing here draws anything.
//!
//! ```rust,ignore
//! let field = FormComponentInner::new(FormComponentProps::new("title", InputType::Text))
//!     .on_change_with(|value| form.set("title", value))
//!     .on_submit_with(|| form.submit());
//! let view = field.view(&MessageCatalog::english());
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

mod component;
mod error;
mod input_type;
mod intl;
mod nested;

pub use component::{
    ALLOWED_INPUT_PROPS, ChangeEvent, CharsRemaining, ClearButton, FieldError, FormComponentInner,
    FormComponentProps, FormComponentView, ItemProperties, whitelist_input_props,
};
pub use error::FormError;
pub use input_type::{CLEARABLE_INPUTS, InputType};
pub use intl::{Intl, MessageCatalog};
pub use nested::{
    FormNestedItem, FormNestedItemProps, NestedField, NestedFieldInstance, NestedItemView,
    RemoveButton,
};
