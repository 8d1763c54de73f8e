//! MetaData - hierarchical provenance tree
//!
//! Carries values that have no first-class field on `Acquisition`
//! (force platform geometry, original acquisition rates, labels).
//! Each node optionally holds a typed, possibly multi-dimensional array.

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Typed array storage, column-major (first dimension varies fastest)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "format", content = "data")]
pub enum MetaDataValues {
    Integer(Vec<i32>),
    Real(Vec<f32>),
    Text(Vec<String>),
}

impl MetaDataValues {
    pub fn len(&self) -> usize {
        match self {
            MetaDataValues::Integer(v) => v.len(),
            MetaDataValues::Real(v) => v.len(),
            MetaDataValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Array value with its dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaDataValue {
    /// Empty for a scalar
    dimensions: Vec<usize>,
    values: MetaDataValues,
}

impl MetaDataValue {
    /// Create a value, checking the dimensions describe the value count
    pub fn new(dimensions: Vec<usize>, values: MetaDataValues) -> Result<Self, ContractError> {
        let expected: usize = dimensions.iter().product();
        if expected != values.len() {
            return Err(ContractError::MetaDataShape {
                label: format!("{dimensions:?}"),
                expected,
                found: values.len(),
            });
        }
        Ok(Self { dimensions, values })
    }

    /// Scalar integer
    pub fn integer(value: i32) -> Self {
        Self {
            dimensions: Vec::new(),
            values: MetaDataValues::Integer(vec![value]),
        }
    }

    /// Scalar real
    pub fn real(value: f32) -> Self {
        Self {
            dimensions: Vec::new(),
            values: MetaDataValues::Real(vec![value]),
        }
    }

    /// Scalar text
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            dimensions: Vec::new(),
            values: MetaDataValues::Text(vec![value.into()]),
        }
    }

    /// One-dimensional integer array
    pub fn integers(values: Vec<i32>) -> Self {
        Self {
            dimensions: vec![values.len()],
            values: MetaDataValues::Integer(values),
        }
    }

    /// One-dimensional real array
    pub fn reals(values: Vec<f32>) -> Self {
        Self {
            dimensions: vec![values.len()],
            values: MetaDataValues::Real(values),
        }
    }

    /// One-dimensional text array
    pub fn texts(values: Vec<String>) -> Self {
        Self {
            dimensions: vec![values.len()],
            values: MetaDataValues::Text(values),
        }
    }

    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    pub fn values(&self) -> &MetaDataValues {
        &self.values
    }

    pub fn as_integers(&self) -> Option<&[i32]> {
        match &self.values {
            MetaDataValues::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_reals(&self) -> Option<&[f32]> {
        match &self.values {
            MetaDataValues::Real(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_texts(&self) -> Option<&[String]> {
        match &self.values {
            MetaDataValues::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Metadata tree node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaData {
    pub label: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<MetaDataValue>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<MetaData>,
}

impl MetaData {
    /// Create an empty node
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Create a leaf holding a value
    pub fn leaf(
        label: impl Into<String>,
        description: impl Into<String>,
        value: MetaDataValue,
    ) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            value: Some(value),
            children: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn children(&self) -> &[MetaData] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child(&self, label: &str) -> Option<&MetaData> {
        self.children.iter().find(|c| c.label == label)
    }

    pub fn child_mut(&mut self, label: &str) -> Option<&mut MetaData> {
        self.children.iter_mut().find(|c| c.label == label)
    }

    /// Append a child. Returns false (and drops nothing) if the label is taken.
    pub fn append_child(&mut self, child: MetaData) -> bool {
        if self.child(&child.label).is_some() {
            return false;
        }
        self.children.push(child);
        true
    }

    /// Insert or replace the child with the same label, keeping its position
    pub fn set_child(&mut self, child: MetaData) {
        match self.children.iter_mut().find(|c| c.label == child.label) {
            Some(existing) => *existing = child,
            None => self.children.push(child),
        }
    }

    /// Remove and return a child
    pub fn take_child(&mut self, label: &str) -> Option<MetaData> {
        let idx = self.children.iter().position(|c| c.label == label)?;
        Some(self.children.remove(idx))
    }

    /// Look up a descendant by a `:`-separated path, e.g. `FORCE_PLATFORM:CHANNEL`
    pub fn find(&self, path: &str) -> Option<&MetaData> {
        path.split(':')
            .try_fold(self, |node, label| node.child(label))
    }
}
