//! Schema-bound row collections.

use crate::error::{CodecError, CodecResult};
use crate::record::Record;
use crate::schema::Schema;
use crate::value::Value;
use std::sync::Arc;

/// A named collection of records sharing one schema.
///
/// Tables are backend-agnostic and never perform I/O; a database persists
/// them through a [`crate::TableCodec`].
///
/// # Invariants
///
/// - Every row conforms to the schema (checked on insertion)
/// - `record_count()` equals the number of live rows
/// - Rows keep insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    schema: Arc<Schema>,
    rows: Vec<Record>,
}

impl Table {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema: Arc::new(schema),
            rows: Vec::new(),
        }
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the table schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns all rows in insertion order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.rows
    }

    /// Appends a row given as `(field name, value)` pairs.
    ///
    /// The pairs may come in any order but must name every schema field
    /// exactly once, each with a value of the declared type.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::SchemaMismatch`] if a field is unknown, missing,
    /// repeated or of the wrong type. The table is unchanged in that case.
    pub fn add_record<I, K, V>(&mut self, values: I) -> CodecResult<&Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut slots: Vec<Option<Value>> = vec![None; self.schema.len()];

        for (name, value) in values {
            let name = name.as_ref();
            let value = value.into();
            let index = self.schema.index_of(name).ok_or_else(|| {
                CodecError::schema_mismatch(format!(
                    "table {} has no field {name:?}",
                    self.name
                ))
            })?;
            if slots[index].is_some() {
                return Err(CodecError::schema_mismatch(format!(
                    "field {name:?} given more than once"
                )));
            }
            slots[index] = Some(value);
        }

        let mut row = Vec::with_capacity(slots.len());
        for (slot, field) in slots.into_iter().zip(self.schema.fields()) {
            let value = slot.ok_or_else(|| {
                CodecError::schema_mismatch(format!("missing value for field {:?}", field.name()))
            })?;
            row.push(value);
        }

        self.add_row(row)
    }

    /// Appends a row given as values in schema order.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::SchemaMismatch`] if the value count or any value
    /// type differs from the schema. The table is unchanged in that case.
    pub fn add_row(&mut self, values: Vec<Value>) -> CodecResult<&Record> {
        if values.len() != self.schema.len() {
            return Err(CodecError::schema_mismatch(format!(
                "table {} has {} fields, row has {} values",
                self.name,
                self.schema.len(),
                values.len()
            )));
        }
        for (value, field) in values.iter().zip(self.schema.fields()) {
            if value.field_type() != field.field_type() {
                return Err(CodecError::schema_mismatch(format!(
                    "field {:?} is {}, value is {}",
                    field.name(),
                    field.field_type(),
                    value.field_type()
                )));
            }
        }

        self.rows
            .push(Record::new_unchecked(Arc::clone(&self.schema), values));
        Ok(&self.rows[self.rows.len() - 1])
    }

    /// Returns every row whose `field` equals `value`, in insertion order.
    ///
    /// Comparison is exact under the field's native type: strings compare
    /// byte for byte and doubles with `==` (no tolerance, so `NaN` never
    /// matches). An empty vector means no row matched.
    ///
    /// # Errors
    ///
    /// - [`CodecError::FieldNotFound`] if the schema has no such field
    /// - [`CodecError::TypeMismatch`] if `value` is not of the field's type
    pub fn get_records(&self, field: &str, value: impl Into<Value>) -> CodecResult<Vec<&Record>> {
        let index = self.filter_index(field, &value.into())?;
        Ok(self.rows.iter().filter(|r| index.matches(r)).collect())
    }

    /// Removes every row whose `field` equals `value`.
    ///
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Same as [`Table::get_records`].
    pub fn remove_records(&mut self, field: &str, value: impl Into<Value>) -> CodecResult<usize> {
        let index = self.filter_index(field, &value.into())?;
        let before = self.rows.len();
        self.rows.retain(|r| !index.matches(r));
        Ok(before - self.rows.len())
    }

    /// Removes all rows, keeping the schema.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    fn filter_index(&self, field: &str, value: &Value) -> CodecResult<Filter> {
        let (index, field_type) = self.schema.resolve(field)?;
        if value.field_type() != field_type {
            return Err(CodecError::TypeMismatch {
                field: field.to_string(),
                expected: field_type,
                actual: value.field_type(),
            });
        }
        Ok(Filter {
            index,
            value: value.clone(),
        })
    }
}

struct Filter {
    index: usize,
    value: Value,
}

impl Filter {
    fn matches(&self, record: &Record) -> bool {
        record.values()[self.index] == self.value
    }
}
