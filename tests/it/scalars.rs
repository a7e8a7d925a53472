use parquet_format_async_temp::{CompressionCodec, Encoding, FieldRepetitionType, Type};

use veneer::error::Error;
use veneer::source::ByteSource;
use veneer::FileReader;

use super::util::*;

fn open(bytes: Vec<u8>) -> FileReader {
    FileReader::from_source(ByteSource::from_vec(bytes)).unwrap()
}

#[test]
fn five_rows_of_three_gzip_columns() {
    let reader = open(three_column_gzip_file());
    assert_eq!(reader.file_metadata().num_rows, 5);
    assert_eq!(reader.file_schema().num_columns(), 3);

    let mut rows = reader.row_reader().unwrap();
    let expected = [
        (1, "Alice", 100i64),
        (2, "Bob", 200),
        (3, "Charlie", 300),
        (4, "Diana", 400),
        (5, "Eve", 500),
    ];
    for (id, name, value) in expected {
        let row = rows.next().unwrap().unwrap();
        assert_eq!(row.column_count(), 3);
        assert_eq!(row.get_int_by_name("id").unwrap(), id);
        assert_eq!(row.get_string_by_name("name").unwrap(), name);
        assert_eq!(row.get_long_by_name("value").unwrap(), value);
    }
    assert!(!rows.has_next().unwrap());
    assert!(rows.next().is_none());
}

#[test]
fn open_by_path_uses_the_mapping() {
    let path = std::env::temp_dir().join(format!(
        "veneer-open-{}.parquet",
        std::process::id()
    ));
    std::fs::write(&path, three_column_gzip_file()).unwrap();

    let reader = FileReader::open(&path).unwrap();
    let mut rows = reader.row_reader().unwrap();
    assert_eq!(
        rows.next().unwrap().unwrap().get_string(1).unwrap(),
        "Alice"
    );
    drop(rows);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn wrong_accessor_type_leaves_the_reader_usable() {
    let reader = open(three_column_gzip_file());
    let mut rows = reader.row_reader().unwrap();
    let row = rows.next().unwrap().unwrap();

    assert!(matches!(
        row.get_int_by_name("name"),
        Err(Error::TypeMismatch(_))
    ));
    // the same row keeps answering correct calls
    assert_eq!(row.get_string_by_name("name").unwrap(), "Alice");
    // and the reader keeps producing rows
    assert_eq!(
        rows.next().unwrap().unwrap().get_string_by_name("name").unwrap(),
        "Bob"
    );
}

#[test]
fn projection_reads_a_subset_in_schema_order() {
    let reader = open(three_column_gzip_file());
    let mut rows = reader.row_reader_with_projection(&["value", "id"]).unwrap();
    let row = rows.next().unwrap().unwrap();
    assert_eq!(row.column_count(), 2);
    assert_eq!(row.column_name(0).unwrap(), "id");
    assert_eq!(row.get_long_by_name("value").unwrap(), 100);

    assert!(matches!(
        reader.row_reader_with_projection(&["nope"]),
        Err(Error::FieldNotFound(_))
    ));
}

#[test]
fn delta_packed_column_roundtrips() {
    let reader = open(delta_file(7));
    let values = reader
        .row_reader()
        .unwrap()
        .map(|row| row.unwrap().get_int(0).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(values, (7..157).collect::<Vec<_>>());
}

#[test]
fn dictionary_encoded_column() {
    let schema = vec![
        root("schema", 1),
        string("word", FieldRepetitionType::REQUIRED),
    ];
    let dictionary = plain_strings(&["low", "mid", "high"]);
    let indices = dictionary_indices(&[2, 0, 0, 1, 2, 1], 2);
    let mut builder = FileBuilder::new(schema, 6);
    builder.add_row_group(
        6,
        vec![ColumnSpec::new(
            &["word"],
            Type::BYTE_ARRAY,
            CompressionCodec::GZIP,
            6,
            vec![
                dictionary_page(3, dictionary, CompressionCodec::GZIP),
                data_page_v1(
                    6,
                    Encoding::RLE_DICTIONARY,
                    None,
                    None,
                    indices,
                    CompressionCodec::GZIP,
                ),
            ],
        )],
    );

    let reader = open(builder.finish());
    let words = reader
        .row_reader()
        .unwrap()
        .map(|row| row.unwrap().get_string(0).unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(words, vec!["high", "low", "low", "mid", "high", "mid"]);
}

#[test]
fn optional_column_in_a_v2_page() {
    let schema = vec![
        root("schema", 1),
        primitive("n", Type::INT32, FieldRepetitionType::OPTIONAL),
    ];
    // 5 entries, 2 of them null
    let def = [1u32, 0, 1, 0, 1];
    let mut builder = FileBuilder::new(schema, 5);
    builder.add_row_group(
        5,
        vec![ColumnSpec::new(
            &["n"],
            Type::INT32,
            CompressionCodec::GZIP,
            5,
            vec![data_page_v2(
                5,
                2,
                5,
                Encoding::PLAIN,
                None,
                Some((&def, 1)),
                plain_i32(&[10, 20, 30]),
                CompressionCodec::GZIP,
            )],
        )],
    );

    let reader = open(builder.finish());
    let values = reader
        .row_reader()
        .unwrap()
        .map(|row| {
            let row = row.unwrap();
            if row.is_null(0).unwrap() {
                None
            } else {
                Some(row.get_int(0).unwrap())
            }
        })
        .collect::<Vec<_>>();
    assert_eq!(values, vec![Some(10), None, Some(20), None, Some(30)]);
}

#[test]
fn byte_stream_split_doubles() {
    let expected = vec![0.5f64, -123.25, 1e9, 0.0];
    let schema = vec![
        root("schema", 1),
        primitive("x", Type::DOUBLE, FieldRepetitionType::REQUIRED),
    ];
    let mut builder = FileBuilder::new(schema, 4);
    builder.add_row_group(
        4,
        vec![ColumnSpec::new(
            &["x"],
            Type::DOUBLE,
            CompressionCodec::UNCOMPRESSED,
            4,
            vec![data_page_v1(
                4,
                Encoding::BYTE_STREAM_SPLIT,
                None,
                None,
                byte_stream_split_f64(&expected),
                CompressionCodec::UNCOMPRESSED,
            )],
        )],
    );

    let reader = open(builder.finish());
    let values = reader
        .row_reader()
        .unwrap()
        .map(|row| row.unwrap().get_double(0).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(values, expected);
}

#[test]
fn delta_length_byte_array_column() {
    let words = ["a", "longer", "", "mid"];
    let schema = vec![
        root("schema", 1),
        string("s", FieldRepetitionType::REQUIRED),
    ];
    let mut builder = FileBuilder::new(schema, 4);
    builder.add_row_group(
        4,
        vec![ColumnSpec::new(
            &["s"],
            Type::BYTE_ARRAY,
            CompressionCodec::UNCOMPRESSED,
            4,
            vec![data_page_v1(
                4,
                Encoding::DELTA_LENGTH_BYTE_ARRAY,
                None,
                None,
                delta_length_byte_array(&words),
                CompressionCodec::UNCOMPRESSED,
            )],
        )],
    );

    let reader = open(builder.finish());
    let values = reader
        .row_reader()
        .unwrap()
        .map(|row| row.unwrap().get_string(0).unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(values, words);
}

#[test]
fn booleans_and_row_display() {
    let schema = vec![
        root("schema", 1),
        primitive("flag", Type::BOOLEAN, FieldRepetitionType::REQUIRED),
    ];
    let mut builder = FileBuilder::new(schema, 3);
    builder.add_row_group(
        3,
        vec![ColumnSpec::new(
            &["flag"],
            Type::BOOLEAN,
            CompressionCodec::UNCOMPRESSED,
            3,
            vec![data_page_v1(
                3,
                Encoding::PLAIN,
                None,
                None,
                plain_bools(&[true, false, true]),
                CompressionCodec::UNCOMPRESSED,
            )],
        )],
    );

    let reader = open(builder.finish());
    let mut rows = reader.row_reader().unwrap();
    let row = rows.next().unwrap().unwrap();
    assert!(row.get_bool(0).unwrap());
    assert_eq!(row.to_string(), "{flag: true}");
}
