//! Compact, self-describing binary table codec.
//!
//! All integers are little-endian.
//!
//! ```text
//! [field_count: u32]
//! field_count x [name_len: u16][name: utf8][type_tag: u8]
//! [row_count: u32]
//! row_count x (per field, schema order)
//!     string: [len: u32][utf8 bytes]
//!     int:    [i64]
//!     double: [f64 bits]
//!     bool:   [u8: 0 | 1]
//! ```
//!
//! The header is decoded before any row, so a file can be opened without
//! knowing its schema in advance. Every read is bounds-checked: a file that
//! ends early, carries an unknown tag or has bytes left after the last row
//! is reported as [`CodecError::Corrupt`].

use crate::error::{CodecError, CodecResult};
use crate::schema::{Field, Schema};
use crate::table::Table;
use crate::value::{FieldType, Value};
use crate::{check_expected_schema, CodecKind, TableCodec};
use bytes::{Buf, BufMut};

/// Smallest encoded size of one value; bounds preallocation for untrusted
/// row counts.
const MIN_VALUE_SIZE: usize = 1;

/// Binary table codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct BinaryCodec;

impl BinaryCodec {
    /// Creates a binary codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TableCodec for BinaryCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Binary
    }

    fn encode(&self, table: &Table) -> CodecResult<Vec<u8>> {
        let schema = table.schema();
        let mut buf = Vec::new();

        buf.put_u32_le(len_u32(schema.len(), "field count")?);
        for field in schema.fields() {
            let name = field.name().as_bytes();
            let name_len = u16::try_from(name.len())
                .map_err(|_| CodecError::schema("field name is longer than 65535 bytes"))?;
            buf.put_u16_le(name_len);
            buf.put_slice(name);
            buf.put_u8(field.field_type().tag());
        }

        buf.put_u32_le(len_u32(table.record_count(), "row count")?);
        for record in table.records() {
            for value in record.values() {
                match value {
                    Value::Str(s) => {
                        buf.put_u32_le(len_u32(s.len(), "string length")?);
                        buf.put_slice(s.as_bytes());
                    }
                    Value::Int(n) => buf.put_i64_le(*n),
                    Value::Float(n) => buf.put_f64_le(*n),
                    Value::Bool(b) => buf.put_u8(u8::from(*b)),
                }
            }
        }

        Ok(buf)
    }

    fn decode(&self, name: &str, bytes: &[u8], expected: Option<&Schema>) -> CodecResult<Table> {
        let mut reader = Reader::new(bytes);

        let field_count = reader.u32("field count")? as usize;
        let mut fields = Vec::with_capacity(field_count.min(reader.remaining()));
        for i in 0..field_count {
            let name_len = usize::from(reader.u16("field name length")?);
            let field_name = reader.utf8(name_len, "field name")?;
            let tag = reader.u8("field type tag")?;
            let field_type = FieldType::from_tag(tag).ok_or_else(|| {
                CodecError::corrupt(format!("unknown type tag {tag} for field {i}"))
            })?;
            fields.push(Field::new(field_name, field_type));
        }
        let schema = Schema::new(fields)
            .map_err(|e| CodecError::corrupt(format!("invalid schema header: {e}")))?;
        check_expected_schema(&schema, expected)?;

        let row_count = reader.u32("row count")? as usize;
        let types: Vec<FieldType> = schema.fields().iter().map(|f| f.field_type()).collect();
        let mut rows = Vec::with_capacity(
            row_count.min(reader.remaining() / (MIN_VALUE_SIZE * types.len())),
        );

        for _ in 0..row_count {
            let mut row = Vec::with_capacity(types.len());
            for ty in &types {
                row.push(reader.value(*ty)?);
            }
            rows.push(row);
        }

        if reader.remaining() > 0 {
            return Err(CodecError::corrupt(format!(
                "{} unexpected bytes after the last row at offset {}",
                reader.remaining(),
                reader.offset()
            )));
        }

        let mut table = Table::new(name, schema);
        for row in rows {
            table.add_row(row)?;
        }
        Ok(table)
    }
}

fn len_u32(len: usize, what: &'static str) -> CodecResult<u32> {
    u32::try_from(len).map_err(|_| CodecError::too_large(what, len))
}

/// Bounds-checked cursor over the encoded bytes.
struct Reader<'a> {
    data: &'a [u8],
    total: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            total: data.len(),
        }
    }

    fn remaining(&self) -> usize {
        self.data.remaining()
    }

    fn offset(&self) -> usize {
        self.total - self.data.remaining()
    }

    fn need(&self, len: usize, what: &str) -> CodecResult<()> {
        if self.data.remaining() < len {
            return Err(CodecError::corrupt(format!(
                "truncated {what} at offset {}: need {len} bytes, {} available",
                self.offset(),
                self.data.remaining()
            )));
        }
        Ok(())
    }

    fn u8(&mut self, what: &str) -> CodecResult<u8> {
        self.need(1, what)?;
        Ok(self.data.get_u8())
    }

    fn u16(&mut self, what: &str) -> CodecResult<u16> {
        self.need(2, what)?;
        Ok(self.data.get_u16_le())
    }

    fn u32(&mut self, what: &str) -> CodecResult<u32> {
        self.need(4, what)?;
        Ok(self.data.get_u32_le())
    }

    fn utf8(&mut self, len: usize, what: &str) -> CodecResult<String> {
        self.need(len, what)?;
        let offset = self.offset();
        let data: &'a [u8] = self.data;
        let (head, tail) = data.split_at(len);
        let text = std::str::from_utf8(head)
            .map_err(|_| CodecError::corrupt(format!("invalid UTF-8 in {what} at offset {offset}")))?
            .to_string();
        self.data = tail;
        Ok(text)
    }

    fn value(&mut self, ty: FieldType) -> CodecResult<Value> {
        match ty {
            FieldType::String => {
                let len = self.u32("string length")? as usize;
                self.utf8(len, "string value").map(Value::Str)
            }
            FieldType::Int => {
                self.need(8, "int value")?;
                Ok(Value::Int(self.data.get_i64_le()))
            }
            FieldType::Double => {
                self.need(8, "double value")?;
                Ok(Value::Float(self.data.get_f64_le()))
            }
            FieldType::Bool => {
                let offset = self.offset();
                match self.u8("bool value")? {
                    0 => Ok(Value::Bool(false)),
                    1 => Ok(Value::Bool(true)),
                    other => Err(CodecError::corrupt(format!(
                        "invalid bool byte {other} at offset {offset}"
                    ))),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn oversized_length_is_too_large() {
        let len = u32::MAX as usize + 1;
        assert_eq!(len_u32(u32::MAX as usize, "row count").unwrap(), u32::MAX);
        assert_eq!(
            len_u32(len, "string length").unwrap_err(),
            CodecError::TooLarge {
                what: "string length",
                len
            }
        );
    }

    fn pings() -> Table {
        let mut table = Table::new(
            "pings",
            Schema::parse("MAC:string,Deck:string,X:double,Y:double,Time:int,Valid:bool").unwrap(),
        );
        table
            .add_row(vec![
                "aa:bb:cc".into(),
                "Deck3".into(),
                12.5.into(),
                (-7.25).into(),
                Value::Int(1_700_000_000),
                true.into(),
            ])
            .unwrap();
        table
            .add_row(vec![
                "".into(),
                "Deck1".into(),
                f64::NAN.into(),
                0.0.into(),
                Value::Int(i64::MIN),
                false.into(),
            ])
            .unwrap();
        table
    }

    #[test]
    fn header_layout() {
        let table = Table::new("t", Schema::parse("Ab:int").unwrap());
        let bytes = BinaryCodec.encode(&table).unwrap();
        assert_eq!(
            bytes,
            vec![
                1, 0, 0, 0, // field count
                2, 0, b'A', b'b', // name
                2, // int tag
                0, 0, 0, 0, // row count
            ]
        );
    }

    #[test]
    fn row_layout() {
        let mut table = Table::new("t", Schema::parse("S:string,B:bool").unwrap());
        table.add_row(vec!["hi".into(), true.into()]).unwrap();
        let bytes = BinaryCodec.encode(&table).unwrap();
        let rows = &bytes[bytes.len() - 7..];
        assert_eq!(rows, &[2, 0, 0, 0, b'h', b'i', 1]);
    }

    #[test]
    fn round_trip_all_types() {
        let table = pings();
        let bytes = BinaryCodec.encode(&table).unwrap();
        let decoded = BinaryCodec.decode("pings", &bytes, None).unwrap();

        assert_eq!(decoded.schema(), table.schema());
        assert_eq!(decoded.record_count(), 2);
        assert_eq!(decoded.records()[0], table.records()[0]);
        // NaN != NaN, so compare the bits.
        let x = decoded.records()[1].get_value::<f64>("X").unwrap();
        assert!(x.is_nan());
        assert_eq!(
            decoded.records()[1].get_value::<i64>("Time").unwrap(),
            i64::MIN
        );
    }

    #[test]
    fn deterministic() {
        let table = pings();
        assert_eq!(
            BinaryCodec.encode(&table).unwrap(),
            BinaryCodec.encode(&table).unwrap()
        );
    }

    #[test]
    fn every_truncation_is_corrupt() {
        let bytes = BinaryCodec.encode(&pings()).unwrap();
        for len in 0..bytes.len() {
            let result = BinaryCodec.decode("pings", &bytes[..len], None);
            assert!(
                matches!(result, Err(CodecError::Corrupt { .. })),
                "truncation at {len} was not detected"
            );
        }
    }

    #[test]
    fn trailing_bytes_are_corrupt() {
        let mut bytes = BinaryCodec.encode(&pings()).unwrap();
        bytes.push(0);
        assert!(matches!(
            BinaryCodec.decode("pings", &bytes, None),
            Err(CodecError::Corrupt { .. })
        ));
    }

    #[test]
    fn unknown_tag_is_corrupt() {
        let bytes = vec![1, 0, 0, 0, 1, 0, b'A', 9, 0, 0, 0, 0];
        let err = BinaryCodec.decode("t", &bytes, None).unwrap_err();
        assert!(err.to_string().contains("tag 9"));
    }

    #[test]
    fn invalid_bool_is_corrupt() {
        let mut table = Table::new("t", Schema::parse("B:bool").unwrap());
        table.add_row(vec![true.into()]).unwrap();
        let mut bytes = BinaryCodec.encode(&table).unwrap();
        *bytes.last_mut().unwrap() = 7;
        assert!(matches!(
            BinaryCodec.decode("t", &bytes, None),
            Err(CodecError::Corrupt { .. })
        ));
    }

    #[test]
    fn empty_or_duplicate_schema_is_corrupt() {
        let empty = vec![0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(
            BinaryCodec.decode("t", &empty, None),
            Err(CodecError::Corrupt { .. })
        ));

        let duplicate = vec![2, 0, 0, 0, 1, 0, b'A', 2, 1, 0, b'A', 2, 0, 0, 0, 0];
        assert!(matches!(
            BinaryCodec.decode("t", &duplicate, None),
            Err(CodecError::Corrupt { .. })
        ));
    }

    #[test]
    fn huge_row_count_does_not_preallocate() {
        let mut bytes = BinaryCodec
            .encode(&Table::new("t", Schema::parse("A:int").unwrap()))
            .unwrap();
        let n = bytes.len();
        bytes[n - 4..].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            BinaryCodec.decode("t", &bytes, None),
            Err(CodecError::Corrupt { .. })
        ));
    }

    #[test]
    fn expected_schema_must_match() {
        let bytes = BinaryCodec.encode(&pings()).unwrap();
        let other = Schema::parse("MAC:string").unwrap();
        assert!(matches!(
            BinaryCodec.decode("pings", &bytes, Some(&other)),
            Err(CodecError::SchemaMismatch { .. })
        ));
    }
}
