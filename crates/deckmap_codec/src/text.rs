//! Delimited, human-editable table codec.
//!
//! ```text
//! Name:string,EmailAddress:string      <- schema spec (header line)
//! Alice,a@x.com                        <- one record per line
//! Smith\, Bob,b@x.com                  <- `\,` escapes a comma
//! ```
//!
//! Every line, the header included, ends with `\n`. Inside string values
//! `\` is written as `\\`, `,` as `\,`, LF as `\n` and CR as `\r`, so raw
//! line breaks only ever separate records.

use crate::error::{CodecError, CodecResult};
use crate::schema::Schema;
use crate::table::Table;
use crate::value::{FieldType, Value};
use crate::{check_expected_schema, CodecKind, TableCodec};

const BOM: &str = "\u{feff}";

/// Text (CSV-like) table codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextCodec;

impl TextCodec {
    /// Creates a text codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TableCodec for TextCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Text
    }

    fn encode(&self, table: &Table) -> CodecResult<Vec<u8>> {
        let mut out = table.schema().to_spec();
        out.push('\n');

        for record in table.records() {
            for (i, value) in record.values().iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                match value {
                    Value::Str(s) => escape_into(&mut out, s),
                    other => out.push_str(&other.to_string()),
                }
            }
            out.push('\n');
        }

        Ok(out.into_bytes())
    }

    fn decode(&self, name: &str, bytes: &[u8], expected: Option<&Schema>) -> CodecResult<Table> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CodecError::corrupt(format!("table file is not valid UTF-8: {e}")))?;
        let text = text.strip_prefix(BOM).unwrap_or(text);

        let mut lines = text.split('\n');
        let header = lines
            .next()
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .filter(|l| !l.trim().is_empty())
            .ok_or_else(|| CodecError::corrupt("missing schema header line"))?;
        let schema = Schema::parse(header)?;
        check_expected_schema(&schema, expected)?;

        let mut lines: Vec<&str> = lines.collect();
        // The text after the final newline is not a record.
        if lines.last() == Some(&"") {
            lines.pop();
        }

        let types: Vec<FieldType> = schema.fields().iter().map(|f| f.field_type()).collect();
        let mut table = Table::new(name, schema);

        for (i, line) in lines.into_iter().enumerate() {
            let row_number = i + 1;
            let line = line.strip_suffix('\r').unwrap_or(line);
            let tokens = split_line(line).map_err(|(col, message)| {
                let field = field_name(&table, col.min(types.len() - 1));
                CodecError::value_decode(row_number, field, message)
            })?;

            if tokens.len() != types.len() {
                let field = field_name(&table, tokens.len().min(types.len() - 1));
                return Err(CodecError::value_decode(
                    row_number,
                    field,
                    format!("expected {} values, found {}", types.len(), tokens.len()),
                ));
            }

            let mut row = Vec::with_capacity(types.len());
            for (col, (token, ty)) in tokens.into_iter().zip(&types).enumerate() {
                let value = Value::parse_as(*ty, &token).ok_or_else(|| {
                    CodecError::value_decode(
                        row_number,
                        field_name(&table, col),
                        format!("{token:?} is not a valid {ty}"),
                    )
                })?;
                row.push(value);
            }
            table.add_row(row)?;
        }

        Ok(table)
    }
}

fn field_name(table: &Table, index: usize) -> String {
    table.schema().fields()[index].name().to_string()
}

fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
}

/// Splits one record line on unescaped commas, resolving escapes.
///
/// On error returns the column the bad escape was found in.
fn split_line(line: &str) -> Result<Vec<String>, (usize, String)> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            ',' => tokens.push(std::mem::take(&mut current)),
            '\\' => match chars.next() {
                Some('\\') => current.push('\\'),
                Some(',') => current.push(','),
                Some('n') => current.push('\n'),
                Some('r') => current.push('\r'),
                Some(other) => {
                    return Err((tokens.len(), format!("unknown escape sequence \\{other}")))
                }
                None => {
                    return Err((
                        tokens.len(),
                        "line ends with a dangling backslash".to_string(),
                    ))
                }
            },
            c => current.push(c),
        }
    }
    tokens.push(current);

    Ok(tokens)
}
