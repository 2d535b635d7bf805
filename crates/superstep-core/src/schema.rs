//! Per-vertex value schema.
//!
//! A computation declares its node value fields up front as tagged types;
//! the engine allocates one paged column per field before superstep 0.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Type of a node value field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// 64-bit signed integer.
    Long,
    /// 64-bit float.
    Double,
    /// Array of 64-bit signed integers.
    LongArray,
    /// Array of 64-bit floats.
    DoubleArray,
}

impl ValueType {
    /// Human readable type name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Long => "long",
            ValueType::Double => "double",
            ValueType::LongArray => "long[]",
            ValueType::DoubleArray => "double[]",
        }
    }

    /// Fallback value for slots never written.
    #[must_use]
    pub fn fallback(self) -> Value {
        match self {
            ValueType::Long => Value::Long(0),
            ValueType::Double => Value::Double(f64::NAN),
            ValueType::LongArray => Value::LongArray(Vec::new()),
            ValueType::DoubleArray => Value::DoubleArray(Vec::new()),
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a field is part of the computation's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Returned to the caller.
    #[default]
    Public,
    /// Scratch state, dropped from results.
    Private,
}

/// A single node value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Long value.
    Long(i64),
    /// Double value.
    Double(f64),
    /// Long array value.
    LongArray(Vec<i64>),
    /// Double array value.
    DoubleArray(Vec<f64>),
}

impl Value {
    /// Type tag of this value.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Long(_) => ValueType::Long,
            Value::Double(_) => ValueType::Double,
            Value::LongArray(_) => ValueType::LongArray,
            Value::DoubleArray(_) => ValueType::DoubleArray,
        }
    }
}

/// One declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    key: String,
    value_type: ValueType,
    visibility: Visibility,
    default_value: Value,
}

impl Element {
    /// Field name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Field type.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Field visibility.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Value read for slots never written.
    #[must_use]
    pub fn default_value(&self) -> &Value {
        &self.default_value
    }
}

/// Immutable, ordered set of node value fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PregelSchema {
    elements: IndexMap<String, Element>,
}

impl PregelSchema {
    /// Starts building a schema.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Looks up a field.
    #[must_use]
    pub fn element(&self, key: &str) -> Option<&Element> {
        self.elements.get(key)
    }

    /// Fields in declaration order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True if no field is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub(crate) fn insert(&mut self, element: Element) -> Result<()> {
        if element.key.trim().is_empty() {
            return Err(Error::Configuration(
                "node value field name must not be empty".to_string(),
            ));
        }
        if element.default_value.value_type() != element.value_type {
            return Err(Error::TypeMismatch {
                field: element.key.clone(),
                declared: element.value_type.name(),
                requested: element.default_value.value_type().name(),
            });
        }
        if self.elements.contains_key(&element.key) {
            return Err(Error::DuplicateField(element.key));
        }
        self.elements.insert(element.key.clone(), element);
        Ok(())
    }
}

/// Builder collecting field declarations; validation happens in `build`.
///
/// # Example
///
/// ```rust
/// use superstep_core::schema::{PregelSchema, ValueType, Visibility};
///
/// let schema = PregelSchema::builder()
///     .add("rank", ValueType::Double)
///     .add_with_visibility("delta", ValueType::Double, Visibility::Private)
///     .build()
///     .unwrap();
/// assert_eq!(schema.len(), 2);
/// ```
#[derive(Debug, Default)]
#[must_use]
pub struct SchemaBuilder {
    pending: Vec<Element>,
}

impl SchemaBuilder {
    /// Declares a public field with the type's fallback default.
    pub fn add(self, key: &str, value_type: ValueType) -> Self {
        self.add_with_visibility(key, value_type, Visibility::Public)
    }

    /// Declares a field with explicit visibility.
    pub fn add_with_visibility(
        self,
        key: &str,
        value_type: ValueType,
        visibility: Visibility,
    ) -> Self {
        self.push(key, value_type, visibility, value_type.fallback())
    }

    /// Declares a public field with a custom default value.
    pub fn add_with_default(self, key: &str, default_value: Value) -> Self {
        let value_type = default_value.value_type();
        self.push(key, value_type, Visibility::Public, default_value)
    }

    /// Validates and freezes the declared fields.
    ///
    /// # Errors
    ///
    /// `Error::DuplicateField` on repeated names, `Error::Configuration` on
    /// empty names.
    pub fn build(self) -> Result<PregelSchema> {
        let mut schema = PregelSchema::default();
        for element in self.pending {
            schema.insert(element)?;
        }
        Ok(schema)
    }

    fn push(
        mut self,
        key: &str,
        value_type: ValueType,
        visibility: Visibility,
        default_value: Value,
    ) -> Self {
        self.pending.push(Element {
            key: key.to_string(),
            value_type,
            visibility,
            default_value,
        });
        self
    }
}

pub(crate) fn element(key: &str, value_type: ValueType) -> Element {
    Element {
        key: key.to_string(),
        value_type,
        visibility: Visibility::Public,
        default_value: value_type.fallback(),
    }
}
