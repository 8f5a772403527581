//! Form input types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FormError;

/// Built-in input a form field is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Textarea,
    Checkbox,
    CheckboxGroup,
    RadioGroup,
    Select,
    SelectMultiple,
    Datetime,
    Date,
    Time,
    Number,
    Url,
    Email,
    Password,
    StaticText,
    Likert,
    Autocomplete,
    MultiAutocomplete,
    Default,
}

/// Inputs that get a clear button.
pub const CLEARABLE_INPUTS: [InputType; 4] = [
    InputType::Select,
    InputType::Datetime,
    InputType::Date,
    InputType::Time,
];

impl InputType {
    pub const ALL: [Self; 19] = [
        Self::Text,
        Self::Textarea,
        Self::Checkbox,
        Self::CheckboxGroup,
        Self::RadioGroup,
        Self::Select,
        Self::SelectMultiple,
        Self::Datetime,
        Self::Date,
        Self::Time,
        Self::Number,
        Self::Url,
        Self::Email,
        Self::Password,
        Self::StaticText,
        Self::Likert,
        Self::Autocomplete,
        Self::MultiAutocomplete,
        Self::Default,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Checkbox => "checkbox",
            Self::CheckboxGroup => "checkboxgroup",
            Self::RadioGroup => "radiogroup",
            Self::Select => "select",
            Self::SelectMultiple => "selectmultiple",
            Self::Datetime => "datetime",
            Self::Date => "date",
            Self::Time => "time",
            Self::Number => "number",
            Self::Url => "url",
            Self::Email => "email",
            Self::Password => "password",
            Self::StaticText => "statictext",
            Self::Likert => "likert",
            Self::Autocomplete => "autocomplete",
            Self::MultiAutocomplete => "multiautocomplete",
            Self::Default => "default",
        }
    }

    /// Whether the field shows a clear button.
    pub fn is_clearable(self) -> bool {
        CLEARABLE_INPUTS.contains(&self)
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputType {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|input| input.as_str() == s)
            .ok_or_else(|| FormError::UnknownInputType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pickers_are_clearable() {
        let clearable: Vec<_> = InputType::ALL
            .into_iter()
            .filter(|input| input.is_clearable())
            .collect();
        assert_eq!(clearable, CLEARABLE_INPUTS);
    }

    #[test]
    fn names_match_serde() {
        for input in InputType::ALL {
            let json = serde_json::to_value(input).expect("serialize");
            assert_eq!(json, input.as_str());
            assert_eq!(input.as_str().parse::<InputType>().expect("parse"), input);
        }
        assert!(matches!(
            "slider".parse::<InputType>(),
            Err(FormError::UnknownInputType(name)) if name == "slider"
        ));
    }
}
