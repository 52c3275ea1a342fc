//! Table rows.

use crate::error::{CodecError, CodecResult};
use crate::schema::Schema;
use crate::value::{FromValue, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// One row of a table.
///
/// A record holds exactly one value per schema field, in schema order, each
/// of the declared type. Records can only be built through a
/// [`crate::Table`], which checks this before accepting a row.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl Record {
    /// Builds a record whose values are already known to match `schema`.
    pub(crate) fn new_unchecked(schema: Arc<Schema>, values: Vec<Value>) -> Self {
        debug_assert_eq!(schema.len(), values.len());
        Self { schema, values }
    }

    /// Returns the schema this record conforms to.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the values in schema order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns the value of the named field, if the field exists.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.index_of(name).map(|i| &self.values[i])
    }

    /// Copies the named field out as `T`.
    ///
    /// # Errors
    ///
    /// - [`CodecError::FieldNotFound`] if the schema has no such field
    /// - [`CodecError::TypeMismatch`] if the field is not of type `T`
    ///
    /// # Example
    ///
    /// ```
    /// use deckmap_codec::{Schema, Table, Value};
    ///
    /// let schema = Schema::parse("MAC:string,X:double").unwrap();
    /// let mut table = Table::new("pings", schema);
    /// table
    ///     .add_record([("MAC", Value::from("aa:bb")), ("X", Value::from(1.5))])
    ///     .unwrap();
    ///
    /// let record = &table.records()[0];
    /// assert_eq!(record.get_value::<f64>("X").unwrap(), 1.5);
    /// assert!(record.get_value::<i64>("X").is_err());
    /// ```
    pub fn get_value<T: FromValue>(&self, name: &str) -> CodecResult<T> {
        let value = self
            .get(name)
            .ok_or_else(|| CodecError::field_not_found(name))?;
        T::from_value(name, value)
    }

    /// Iterates over `(field name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name())
            .zip(self.values.iter())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
