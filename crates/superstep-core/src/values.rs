//! Typed per-node value table.
//!
//! One paged column per schema field. Scalar columns are atomic so that the
//! worker owning a node can write it while other workers read neighbouring
//! slots of the same page; array columns publish whole values through
//! `arc-swap`.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::collections::{HugeAtomicDoubleArray, HugeAtomicLongArray, HugeCellArray};
use crate::error::{Error, Result};
use crate::memory::MemoryRange;
use crate::schema::{self, Element, PregelSchema, Value, ValueType};

enum Column {
    Long(HugeAtomicLongArray),
    Double(HugeAtomicDoubleArray),
    LongArray {
        cells: HugeCellArray<Vec<i64>>,
        default: Arc<Vec<i64>>,
    },
    DoubleArray {
        cells: HugeCellArray<Vec<f64>>,
        default: Arc<Vec<f64>>,
    },
}

impl Column {
    fn allocate(element: &Element, node_count: u64, page_shift: u32) -> Result<Self> {
        Ok(match element.default_value() {
            Value::Long(v) => Column::Long(HugeAtomicLongArray::filled(node_count, page_shift, *v)?),
            Value::Double(v) => {
                Column::Double(HugeAtomicDoubleArray::filled(node_count, page_shift, *v)?)
            }
            Value::LongArray(v) => Column::LongArray {
                cells: HugeCellArray::new(node_count, page_shift)?,
                default: Arc::new(v.clone()),
            },
            Value::DoubleArray(v) => Column::DoubleArray {
                cells: HugeCellArray::new(node_count, page_shift)?,
                default: Arc::new(v.clone()),
            },
        })
    }

    fn value_type(&self) -> ValueType {
        match self {
            Column::Long(_) => ValueType::Long,
            Column::Double(_) => ValueType::Double,
            Column::LongArray { .. } => ValueType::LongArray,
            Column::DoubleArray { .. } => ValueType::DoubleArray,
        }
    }

    fn estimate(
        value_type: ValueType,
        node_count: u64,
        max_array_length: u64,
        page_shift: u32,
    ) -> Result<MemoryRange> {
        match value_type {
            ValueType::Long => HugeAtomicLongArray::memory_estimation(node_count, page_shift),
            ValueType::Double => HugeAtomicDoubleArray::memory_estimation(node_count, page_shift),
            ValueType::LongArray => {
                array_estimate::<i64>(node_count, max_array_length, page_shift)
            }
            ValueType::DoubleArray => {
                array_estimate::<f64>(node_count, max_array_length, page_shift)
            }
        }
    }
}

/// Bytes of one published `Arc<Vec<T>>`: the two reference counts, the
/// vector header and `capacity` elements.
pub(crate) fn published_array_bytes<T>(capacity: u64) -> u64 {
    let header = 2 * std::mem::size_of::<usize>() + std::mem::size_of::<Vec<T>>();
    (header as u64).saturating_add(capacity.saturating_mul(std::mem::size_of::<T>() as u64))
}

/// The slot table always; one published array per node at most.
fn array_estimate<T>(node_count: u64, max_array_length: u64, page_shift: u32) -> Result<MemoryRange> {
    let table = HugeCellArray::<Vec<T>>::memory_estimation(node_count, page_shift)?;
    let published = node_count.saturating_mul(published_array_bytes::<T>(max_array_length));
    Ok(table + MemoryRange::new(0, published))
}

/// Named, typed node values for one computation run.
///
/// Fields can be declared until [`freeze`](Self::freeze) is called; the
/// executor freezes the store before superstep 0. Slots never written read as
/// the field's default (`0` for longs, `NaN` for doubles, empty arrays unless
/// the schema overrides it).
///
/// # Example
///
/// ```rust
/// use superstep_core::schema::{PregelSchema, ValueType};
/// use superstep_core::values::NodeValueStore;
///
/// let schema = PregelSchema::builder().add("rank", ValueType::Double).build().unwrap();
/// let store = NodeValueStore::new(&schema, 3, 12).unwrap();
/// assert!(store.get_double(1, "rank").unwrap().is_nan());
/// store.set_double(1, "rank", 0.5).unwrap();
/// assert_eq!(store.get_double(1, "rank").unwrap(), 0.5);
/// ```
pub struct NodeValueStore {
    schema: PregelSchema,
    columns: IndexMap<String, Column>,
    node_count: u64,
    page_shift: u32,
    frozen: bool,
}

impl NodeValueStore {
    /// Allocates one column per field of `schema`.
    pub fn new(schema: &PregelSchema, node_count: u64, page_shift: u32) -> Result<Self> {
        let mut columns = IndexMap::with_capacity(schema.len());
        for element in schema.elements() {
            columns.insert(
                element.key().to_string(),
                Column::allocate(element, node_count, page_shift)?,
            );
        }
        Ok(Self {
            schema: schema.clone(),
            columns,
            node_count,
            page_shift,
            frozen: false,
        })
    }

    /// Adds a field with the type's fallback default.
    ///
    /// # Errors
    ///
    /// `Error::SchemaFrozen` once the computation started,
    /// `Error::DuplicateField` if `key` already exists.
    pub fn declare_field(&mut self, key: &str, value_type: ValueType) -> Result<()> {
        if self.frozen {
            return Err(Error::SchemaFrozen(key.to_string()));
        }
        let element = schema::element(key, value_type);
        let column = Column::allocate(&element, self.node_count, self.page_shift)?;
        self.schema.insert(element)?;
        self.columns.insert(key.to_string(), column);
        Ok(())
    }

    /// Rejects further field declarations.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// True once [`freeze`](Self::freeze) was called.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Schema of the stored fields.
    #[must_use]
    pub fn schema(&self) -> &PregelSchema {
        &self.schema
    }

    /// Number of nodes per column.
    #[must_use]
    pub fn node_count(&self) -> u64 {
        self.node_count
    }

    /// Reads a long field.
    pub fn get_long(&self, node: u64, key: &str) -> Result<i64> {
        match self.column(key, ValueType::Long)? {
            Column::Long(values) => values.get(node),
            other => Err(mismatch(key, other, ValueType::Long)),
        }
    }

    /// Writes a long field.
    pub fn set_long(&self, node: u64, key: &str, value: i64) -> Result<()> {
        match self.column(key, ValueType::Long)? {
            Column::Long(values) => values.set(node, value),
            other => Err(mismatch(key, other, ValueType::Long)),
        }
    }

    /// Reads a double field.
    pub fn get_double(&self, node: u64, key: &str) -> Result<f64> {
        match self.column(key, ValueType::Double)? {
            Column::Double(values) => values.get(node),
            other => Err(mismatch(key, other, ValueType::Double)),
        }
    }

    /// Writes a double field.
    pub fn set_double(&self, node: u64, key: &str, value: f64) -> Result<()> {
        match self.column(key, ValueType::Double)? {
            Column::Double(values) => values.set(node, value),
            other => Err(mismatch(key, other, ValueType::Double)),
        }
    }

    /// Reads a long array field.
    pub fn get_long_array(&self, node: u64, key: &str) -> Result<Arc<Vec<i64>>> {
        match self.column(key, ValueType::LongArray)? {
            Column::LongArray { cells, default } => {
                Ok(cells.get(node)?.unwrap_or_else(|| Arc::clone(default)))
            }
            other => Err(mismatch(key, other, ValueType::LongArray)),
        }
    }

    /// Writes a long array field.
    pub fn set_long_array(&self, node: u64, key: &str, value: Vec<i64>) -> Result<()> {
        match self.column(key, ValueType::LongArray)? {
            Column::LongArray { cells, .. } => cells.set(node, value),
            other => Err(mismatch(key, other, ValueType::LongArray)),
        }
    }

    /// Reads a double array field.
    pub fn get_double_array(&self, node: u64, key: &str) -> Result<Arc<Vec<f64>>> {
        match self.column(key, ValueType::DoubleArray)? {
            Column::DoubleArray { cells, default } => {
                Ok(cells.get(node)?.unwrap_or_else(|| Arc::clone(default)))
            }
            other => Err(mismatch(key, other, ValueType::DoubleArray)),
        }
    }

    /// Writes a double array field.
    pub fn set_double_array(&self, node: u64, key: &str, value: Vec<f64>) -> Result<()> {
        match self.column(key, ValueType::DoubleArray)? {
            Column::DoubleArray { cells, .. } => cells.set(node, value),
            other => Err(mismatch(key, other, ValueType::DoubleArray)),
        }
    }

    /// Reads any field as a tagged [`Value`].
    pub fn value(&self, node: u64, key: &str) -> Result<Value> {
        let column = self
            .columns
            .get(key)
            .ok_or_else(|| Error::UnknownField(key.to_string()))?;
        Ok(match column {
            Column::Long(values) => Value::Long(values.get(node)?),
            Column::Double(values) => Value::Double(values.get(node)?),
            Column::LongArray { .. } => Value::LongArray(self.get_long_array(node, key)?.to_vec()),
            Column::DoubleArray { .. } => {
                Value::DoubleArray(self.get_double_array(node, key)?.to_vec())
            }
        })
    }

    /// Copies a long column into a vector (tests and small graphs).
    pub fn long_values(&self, key: &str) -> Result<Vec<i64>> {
        match self.column(key, ValueType::Long)? {
            Column::Long(values) => Ok(values.to_vec()),
            other => Err(mismatch(key, other, ValueType::Long)),
        }
    }

    /// Copies a double column into a vector (tests and small graphs).
    pub fn double_values(&self, key: &str) -> Result<Vec<f64>> {
        match self.column(key, ValueType::Double)? {
            Column::Double(values) => Ok(values.to_vec()),
            other => Err(mismatch(key, other, ValueType::Double)),
        }
    }

    /// Footprint of the columns `schema` would allocate.
    ///
    /// Scalar columns are exact. Array columns always count their slot
    /// tables; `max` adds one published array of `max_array_length`
    /// elements of capacity per node.
    pub fn memory_estimation(
        schema: &PregelSchema,
        node_count: u64,
        max_array_length: u64,
        page_shift: u32,
    ) -> Result<MemoryRange> {
        schema.elements().try_fold(MemoryRange::empty(), |acc, element| {
            let column =
                Column::estimate(element.value_type(), node_count, max_array_length, page_shift)?;
            Ok(acc + column)
        })
    }

    fn column(&self, key: &str, requested: ValueType) -> Result<&Column> {
        let column = self
            .columns
            .get(key)
            .ok_or_else(|| Error::UnknownField(key.to_string()))?;
        if column.value_type() == requested {
            Ok(column)
        } else {
            Err(mismatch(key, column, requested))
        }
    }
}

fn mismatch(key: &str, column: &Column, requested: ValueType) -> Error {
    Error::TypeMismatch {
        field: key.to_string(),
        declared: column.value_type().name(),
        requested: requested.name(),
    }
}

impl std::fmt::Debug for NodeValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeValueStore")
            .field("fields", &self.columns.keys().collect::<Vec<_>>())
            .field("node_count", &self.node_count)
            .field("frozen", &self.frozen)
            .finish_non_exhaustive()
    }
}
