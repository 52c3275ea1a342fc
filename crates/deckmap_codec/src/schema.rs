//! Table schemas and the `name:type` schema grammar.

use crate::error::{CodecError, CodecResult};
use crate::value::FieldType;
use std::fmt;
use std::str::FromStr;

/// Characters that may not appear in a field name.
///
/// `,` and `:` delimit the schema grammar; line breaks would split the text
/// codec's header line.
const RESERVED_NAME_CHARS: [char; 4] = [',', ':', '\r', '\n'];

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    name: String,
    field_type: FieldType,
}

impl Field {
    /// Creates a field definition.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field type.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        self.field_type
    }
}

/// The ordered field list of a table.
///
/// A schema always has at least one field and its names are unique.
/// Field order is significant: rows are stored, encoded and compared in
/// schema order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Creates a schema from field definitions.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Schema`] if the list is empty, a name is empty,
    /// too long, duplicated or contains a reserved character.
    pub fn new(fields: Vec<Field>) -> CodecResult<Self> {
        if fields.is_empty() {
            return Err(CodecError::schema("a schema needs at least one field"));
        }
        for (i, field) in fields.iter().enumerate() {
            validate_field_name(&field.name)?;
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(CodecError::schema(format!(
                    "duplicate field name {:?}",
                    field.name
                )));
            }
        }
        Ok(Self { fields })
    }

    /// Parses a schema spec such as `"Name:string,EmailAddress:string"`.
    ///
    /// Each comma-separated pair is split on its first colon. The name and
    /// type token are trimmed; type tokens are matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Schema`] if a pair has no colon, a name is empty
    /// or duplicated, or a type token is not recognised.
    ///
    /// # Example
    ///
    /// ```
    /// use deckmap_codec::{FieldType, Schema};
    ///
    /// let schema = Schema::parse("Name:string,EmailAddress:string").unwrap();
    /// assert_eq!(schema.len(), 2);
    /// assert_eq!(schema.fields()[1].field_type(), FieldType::String);
    /// ```
    pub fn parse(spec: &str) -> CodecResult<Self> {
        if spec.trim().is_empty() {
            return Err(CodecError::schema("a schema needs at least one field"));
        }

        let mut fields = Vec::new();
        for pair in spec.split(',') {
            let (name, token) = pair.split_once(':').ok_or_else(|| {
                CodecError::schema(format!("expected name:type, found {:?}", pair.trim()))
            })?;
            let name = name.trim();
            let token = token.trim();
            let field_type = FieldType::from_token(token).ok_or_else(|| {
                CodecError::schema(format!("unknown type {token:?} for field {name:?}"))
            })?;
            fields.push(Field::new(name, field_type));
        }

        Self::new(fields)
    }

    /// Renders the canonical spec string, the inverse of [`Schema::parse`].
    #[must_use]
    pub fn to_spec(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("{}:{}", f.name, f.field_type))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Returns the fields in order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no fields. Parsed schemas never do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the position of the named field.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns the named field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the position and type of the named field.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::FieldNotFound`] if the schema has no such field.
    pub fn resolve(&self, name: &str) -> CodecResult<(usize, FieldType)> {
        self.index_of(name)
            .map(|i| (i, self.fields[i].field_type))
            .ok_or_else(|| CodecError::field_not_found(name))
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_spec())
    }
}

impl FromStr for Schema {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn validate_field_name(name: &str) -> CodecResult<()> {
    if name.is_empty() {
        return Err(CodecError::schema("field name is empty"));
    }
    if name.trim() != name {
        return Err(CodecError::schema(format!(
            "field name {name:?} has surrounding whitespace"
        )));
    }
    if name.contains(RESERVED_NAME_CHARS) {
        return Err(CodecError::schema(format!(
            "field name {name:?} contains a reserved character"
        )));
    }
    if name.len() > usize::from(u16::MAX) {
        return Err(CodecError::schema("field name is longer than 65535 bytes"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_two_string_fields() {
        let schema = Schema::parse("Name:string,EmailAddress:string").unwrap();
        assert_eq!(
            schema.fields(),
            &[
                Field::new("Name", FieldType::String),
                Field::new("EmailAddress", FieldType::String),
            ]
        );
    }

    #[test]
    fn parse_mixed_types_and_case() {
        let schema = Schema::parse("MAC:String, X:DOUBLE , Y:double,Seen:Int,Ok:bool").unwrap();
        let types: Vec<_> = schema.fields().iter().map(Field::field_type).collect();
        assert_eq!(
            types,
            vec![
                FieldType::String,
                FieldType::Double,
                FieldType::Double,
                FieldType::Int,
                FieldType::Bool
            ]
        );
        assert_eq!(schema.fields()[1].name(), "X");
    }

    #[test]
    fn parse_splits_on_first_colon() {
        let err = Schema::parse("Time:int:extra").unwrap_err();
        assert!(matches!(err, CodecError::Schema { .. }));
        assert!(err.to_string().contains("int:extra"));
    }

    #[test]
    fn parse_rejects_missing_colon() {
        assert!(matches!(
            Schema::parse("Name:string,Email"),
            Err(CodecError::Schema { .. })
        ));
    }

    #[test]
    fn parse_rejects_empty_name() {
        assert!(matches!(
            Schema::parse(":string"),
            Err(CodecError::Schema { .. })
        ));
    }

    #[test]
    fn parse_rejects_duplicates() {
        let err = Schema::parse("Name:string,Name:int").unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn parse_rejects_unknown_type() {
        let err = Schema::parse("Name:varchar").unwrap_err();
        assert!(err.to_string().contains("varchar"));
    }

    #[test]
    fn parse_rejects_empty_spec() {
        assert!(Schema::parse("").is_err());
        assert!(Schema::parse("  ").is_err());
        assert!(Schema::parse("Name:string,").is_err());
    }

    #[test]
    fn new_rejects_reserved_characters() {
        let result = Schema::new(vec![Field::new("a\nb", FieldType::Int)]);
        assert!(matches!(result, Err(CodecError::Schema { .. })));
    }

    #[test]
    fn spec_round_trip() {
        let spec = "MAC:string,Deck:string,X:double,Y:double,Time:int,Valid:bool";
        let schema: Schema = spec.parse().unwrap();
        assert_eq!(schema.to_spec(), spec);
        assert_eq!(Schema::parse(&schema.to_string()).unwrap(), schema);
    }

    #[test]
    fn resolve_unknown_field() {
        let schema = Schema::parse("Name:string").unwrap();
        assert_eq!(schema.resolve("Name").unwrap(), (0, FieldType::String));
        assert_eq!(
            schema.resolve("Email").unwrap_err(),
            CodecError::field_not_found("Email")
        );
    }
}
