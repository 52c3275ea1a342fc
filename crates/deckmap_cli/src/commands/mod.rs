//! CLI command implementations.

pub mod create;
pub mod index;
pub mod init;
pub mod insert;
pub mod points;
pub mod show;
pub mod tables;

use deckmap_codec::{Schema, Value};

/// Parses `field=value`, converting the value to the field's type.
pub fn parse_assignment(
    schema: &Schema,
    text: &str,
) -> Result<(String, Value), Box<dyn std::error::Error>> {
    let (field, raw) = text
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got {text:?}"))?;
    let (_, field_type) = schema.resolve(field)?;
    let value = Value::parse_as(field_type, raw)
        .ok_or_else(|| format!("{raw:?} is not a valid {field_type} for field {field}"))?;
    Ok((field.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_assignments() {
        let schema = Schema::parse("Name:string,X:double,Ok:bool").unwrap();
        assert_eq!(
            parse_assignment(&schema, "X=1.5").unwrap(),
            ("X".to_string(), Value::Float(1.5))
        );
        assert_eq!(
            parse_assignment(&schema, "Name=a=b").unwrap(),
            ("Name".to_string(), Value::from("a=b"))
        );
        assert!(parse_assignment(&schema, "Ok=maybe").is_err());
        assert!(parse_assignment(&schema, "Missing=1").is_err());
        assert!(parse_assignment(&schema, "NoEquals").is_err());
    }
}
