//! OptionRegistry - named, choice-constrained I/O options
//!
//! Runtime table of option name -> tagged value plus its allowed values.
//! Setting a value outside the declared choices is not an error: it is
//! logged and the previous value is kept.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Tagged option value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl OptionValue {
    fn same_type(&self, other: &OptionValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            OptionValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            OptionValue::Real(v) => Some(*v),
            OptionValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptionValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(v) => write!(f, "{v}"),
            OptionValue::Integer(v) => write!(f, "{v}"),
            OptionValue::Real(v) => write!(f, "{v}"),
            OptionValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Integer(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Real(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Text(v)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct OptionEntry {
    name: String,
    value: OptionValue,
    /// Empty = any value of the default's type
    choices: Vec<OptionValue>,
}

impl OptionEntry {
    /// Value as it would be stored, or None when rejected. Integers widen
    /// into real-typed options.
    fn admit(&self, value: OptionValue) -> Option<OptionValue> {
        let value = match (&self.value, value) {
            (OptionValue::Real(_), OptionValue::Integer(v)) => OptionValue::Real(v as f64),
            (_, value) => value,
        };
        let accepted = if self.choices.is_empty() {
            self.value.same_type(&value)
        } else {
            self.choices.contains(&value)
        };
        accepted.then_some(value)
    }
}

/// Ordered option registry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionRegistry {
    entries: Vec<OptionEntry>,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an option with its default and allowed values.
    ///
    /// Re-declaring a name replaces the previous declaration.
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        default: impl Into<OptionValue>,
        choices: Vec<OptionValue>,
    ) -> &mut Self {
        let entry = OptionEntry {
            name: name.into(),
            value: default.into(),
            choices,
        };
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        self
    }

    /// Current value of an option
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entry(name).map(|e| &e.value)
    }

    /// Set an option. Returns false, with a warning, when rejected.
    pub fn set(&mut self, name: &str, value: impl Into<OptionValue>) -> bool {
        let value = value.into();
        let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) else {
            warn!(option = name, value = %value, "unknown option ignored");
            return false;
        };
        let shown = value.to_string();
        match entry.admit(value) {
            Some(value) => {
                entry.value = value;
                true
            }
            None => {
                warn!(
                    option = name,
                    value = %shown,
                    current = %entry.value,
                    "value not in the predefined choices, option unchanged"
                );
                false
            }
        }
    }

    /// Declared option names, in declaration order
    pub fn available_options(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Allowed values of an option (empty = unconstrained)
    pub fn available_choices(&self, name: &str) -> &[OptionValue] {
        self.entry(name).map(|e| e.choices.as_slice()).unwrap_or(&[])
    }

    fn entry(&self, name: &str) -> Option<&OptionEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}
