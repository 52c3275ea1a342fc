//! Property-based test generators using proptest.
//!
//! Provides strategies for generating schemas, values and tables that
//! satisfy the table invariants.

use deckmap_codec::{Field, FieldType, Schema, Table, Value};
use proptest::prelude::*;

/// Strategy for generating valid field names.
///
/// Names may contain spaces and punctuation, but never the characters the
/// schema grammar reserves.
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z][A-Za-z0-9_ .-]{0,15}[A-Za-z0-9]?")
        .expect("Invalid regex")
        .prop_map(|s| s.trim().to_string())
        .prop_filter("Field name must not be empty", |s| !s.is_empty())
}

/// Strategy for generating field types.
pub fn field_type_strategy() -> impl Strategy<Value = FieldType> {
    prop::sample::select(FieldType::ALL.to_vec())
}

/// Strategy for generating valid schemas with 1 to `max_fields` fields.
pub fn schema_strategy(max_fields: usize) -> impl Strategy<Value = Schema> {
    prop::collection::btree_map(field_name_strategy(), field_type_strategy(), 1..=max_fields)
        .prop_map(|fields| {
            Schema::new(fields.into_iter().map(|(n, t)| Field::new(n, t)).collect())
                .expect("Generated schema must be valid")
        })
}

/// Strategy for generating a value of type `ty`.
///
/// Doubles exclude `NaN`, which never compares equal to itself.
pub fn value_strategy(ty: FieldType) -> BoxedStrategy<Value> {
    match ty {
        FieldType::String => any::<String>().prop_map(Value::Str).boxed(),
        FieldType::Int => any::<i64>().prop_map(Value::Int).boxed(),
        FieldType::Double => any::<f64>()
            .prop_filter("not NaN", |f| !f.is_nan())
            .prop_map(Value::Float)
            .boxed(),
        FieldType::Bool => any::<bool>().prop_map(Value::Bool).boxed(),
    }
}

/// Strategy for generating a row conforming to `schema`.
pub fn row_strategy(schema: &Schema) -> impl Strategy<Value = Vec<Value>> {
    schema
        .fields()
        .iter()
        .map(|f| value_strategy(f.field_type()))
        .collect::<Vec<_>>()
}

/// Strategy for generating tables with up to `max_rows` rows.
pub fn table_strategy(max_rows: usize) -> impl Strategy<Value = Table> {
    schema_strategy(6).prop_flat_map(move |schema| {
        let rows = prop::collection::vec(row_strategy(&schema), 0..=max_rows);
        (Just(schema), rows).prop_map(|(schema, rows)| {
            let mut table = Table::new("generated", schema);
            for row in rows {
                table.add_row(row).expect("Generated row must conform");
            }
            table
        })
    })
}

/// Strategy for generating MAC addresses such as `0a:1b:2c:3d:4e:5f`.
pub fn mac_strategy() -> impl Strategy<Value = String> {
    prop::array::uniform6(any::<u8>()).prop_map(|bytes| {
        bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(":")
    })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
