//! Fuzz targets for DeckMap.
//!
//! These targets can be used with cargo-fuzz or other fuzzing frameworks.
//! Each one must return normally for every input; a panic is a bug.

use deckmap_codec::{CodecKind, Schema};
use deckmap_core::Database;
use deckmap_storage::InMemoryBackend;

/// Fuzz target for the schema parser.
///
/// Arbitrary text either fails to parse or yields a schema whose spec
/// parses back to the same schema.
pub fn fuzz_schema_parse(data: &[u8]) {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(schema) = Schema::parse(text) {
        let reparsed = Schema::parse(&schema.to_spec());
        assert_eq!(reparsed.as_ref(), Ok(&schema), "Spec roundtrip mismatch");
    }
}

/// Fuzz target for table decoding.
///
/// Arbitrary bytes either fail to decode or yield a table that re-encodes
/// to bytes which decode to the same table.
pub fn fuzz_table_decode(kind: CodecKind, data: &[u8]) {
    let codec = kind.codec();
    let Ok(table) = codec.decode("fuzz", data, None) else {
        return;
    };
    let encoded = codec.encode(&table).expect("Decoded table must encode");
    let decoded = codec
        .decode("fuzz", &encoded, Some(table.schema()))
        .expect("Re-encoded table must decode");
    assert_eq!(
        format!("{decoded:?}"),
        format!("{table:?}"),
        "Roundtrip mismatch"
    );
}

/// Fuzz target for loading a stored table through a database.
///
/// Corrupt blobs must surface as errors, never as partial tables.
pub fn fuzz_database_load(kind: CodecKind, data: &[u8]) {
    let blob = format!("fuzz.{}", kind.extension());
    let backend = InMemoryBackend::with_blobs([(blob, data.to_vec())]);
    let mut db = Database::with_backend(Box::new(backend), kind);

    let direct = kind.codec().decode("fuzz", data, None).ok();
    match db.get_table("fuzz") {
        Ok(Some(table)) => assert_eq!(
            format!("{:?}", Some(table)),
            format!("{:?}", direct.as_ref()),
            "Database load differs from codec decode"
        ),
        Ok(None) => panic!("Stored table reported as missing"),
        Err(_) => assert!(direct.is_none(), "Database rejected a decodable table"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fuzz_known_inputs() {
        let inputs: [&[u8]; 8] = [
            b"",
            b"A:int\n1\n",
            b"A:int\nnope\n",
            b"Name:string,EmailAddress:string\nAlice,a@x.com\n",
            b"\xff\xfe",
            &[1, 0, 0, 0, 1, 0, b'A', 2, 1, 0, 0, 0, 7, 0, 0, 0, 0, 0, 0, 0],
            &[1, 0, 0, 0, 1, 0, b'A', 9, 0, 0, 0, 0],
            &[0xff; 16],
        ];
        for data in inputs {
            fuzz_schema_parse(data);
            for kind in [CodecKind::Text, CodecKind::Binary] {
                fuzz_table_decode(kind, data);
                fuzz_database_load(kind, data);
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn fuzz_random_bytes(data in prop::collection::vec(any::<u8>(), 0..256)) {
            fuzz_schema_parse(&data);
            fuzz_table_decode(CodecKind::Text, &data);
            fuzz_table_decode(CodecKind::Binary, &data);
            fuzz_database_load(CodecKind::Binary, &data);
        }

        #[test]
        fn fuzz_text_like_input(text in "[A-Za-z:,\\\\\n0-9.-]{0,64}") {
            fuzz_schema_parse(text.as_bytes());
            fuzz_table_decode(CodecKind::Text, text.as_bytes());
        }
    }
}
