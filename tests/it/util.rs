//! A minimal in-test assembler of Parquet files: enough of the write side to
//! exercise the reader end to end, and nothing more.
use std::io::Write;

use parquet_format_async_temp::thrift::protocol::{TCompactOutputProtocol, TOutputProtocol};
use parquet_format_async_temp::{
    ColumnChunk, ColumnMetaData, CompressionCodec, ConvertedType, DataPageHeader,
    DataPageHeaderV2, DictionaryPageHeader, Encoding, FieldRepetitionType, FileMetaData,
    PageHeader, PageType, RowGroup, SchemaElement, Type,
};

// ---------------------------------------------------------------------------
// thrift plumbing

fn serialize<F>(write: F) -> Vec<u8>
where
    F: FnOnce(&mut TCompactOutputProtocol<&mut Vec<u8>>) -> parquet_format_async_temp::thrift::Result<usize>,
{
    let mut buffer = vec![];
    let mut protocol = TCompactOutputProtocol::new(&mut buffer);
    write(&mut protocol).unwrap();
    protocol.flush().unwrap();
    buffer
}

// ---------------------------------------------------------------------------
// value and level encoders

fn uleb(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

fn zigzag(value: i64, out: &mut Vec<u8>) {
    uleb(((value << 1) ^ (value >> 63)) as u64, out);
}

fn level_bit_width(max_level: i16) -> usize {
    (64 - (max_level as u64).leading_zeros()) as usize
}

/// Encodes levels as RLE runs and prefixes the 4-byte length (the data page
/// v1 level stream layout).
pub fn levels_v1(levels: &[u32], max_level: i16) -> Vec<u8> {
    let runs = levels_rle(levels, max_level);
    let mut out = vec![];
    out.extend_from_slice(&(runs.len() as u32).to_le_bytes());
    out.extend_from_slice(&runs);
    out
}

/// Encodes levels as RLE runs without a length prefix (the data page v2
/// layout).
pub fn levels_rle(levels: &[u32], max_level: i16) -> Vec<u8> {
    let value_bytes = (level_bit_width(max_level) + 7) / 8;
    let mut out = vec![];
    let mut i = 0;
    while i < levels.len() {
        let value = levels[i];
        let mut run = 1;
        while i + run < levels.len() && levels[i + run] == value {
            run += 1;
        }
        uleb((run as u64) << 1, &mut out);
        out.extend_from_slice(&value.to_le_bytes()[..value_bytes]);
        i += run;
    }
    out
}

pub fn plain_i32(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn plain_i64(values: &[i64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn plain_strings(values: &[&str]) -> Vec<u8> {
    let mut out = vec![];
    for value in values {
        out.extend_from_slice(&(value.len() as u32).to_le_bytes());
        out.extend_from_slice(value.as_bytes());
    }
    out
}

pub fn plain_bools(values: &[bool]) -> Vec<u8> {
    let mut out = vec![0u8; (values.len() + 7) / 8];
    for (i, value) in values.iter().enumerate() {
        if *value {
            out[i / 8] |= 1 << (i % 8);
        }
    }
    out
}

/// `DELTA_BINARY_PACKED` with one block of 128 values in 4 miniblocks.
pub fn delta_packed(values: &[i64]) -> Vec<u8> {
    const BLOCK: usize = 128;
    const MINIBLOCKS: usize = 4;
    const PER_MINIBLOCK: usize = BLOCK / MINIBLOCKS;

    let mut out = vec![];
    uleb(BLOCK as u64, &mut out);
    uleb(MINIBLOCKS as u64, &mut out);
    uleb(values.len() as u64, &mut out);
    zigzag(*values.first().unwrap_or(&0), &mut out);

    let deltas = values
        .windows(2)
        .map(|w| w[1].wrapping_sub(w[0]))
        .collect::<Vec<_>>();
    for block in deltas.chunks(BLOCK) {
        let min_delta = *block.iter().min().unwrap();
        zigzag(min_delta, &mut out);
        let mut widths = vec![0u8; MINIBLOCKS];
        let mut payload = vec![];
        for (i, mini) in block.chunks(PER_MINIBLOCK).enumerate() {
            let width = mini
                .iter()
                .map(|d| 64 - (d.wrapping_sub(min_delta) as u64).leading_zeros())
                .max()
                .unwrap_or(0) as usize;
            widths[i] = width as u8;
            if width == 0 {
                continue;
            }
            let mut bits = vec![0u8; (PER_MINIBLOCK * width + 7) / 8];
            let mut offset = 0;
            for delta in mini {
                let v = delta.wrapping_sub(min_delta) as u64;
                for bit in 0..width {
                    if v >> bit & 1 == 1 {
                        bits[(offset + bit) / 8] |= 1 << ((offset + bit) % 8);
                    }
                }
                offset += width;
            }
            payload.extend_from_slice(&bits);
        }
        out.extend_from_slice(&widths);
        out.extend_from_slice(&payload);
    }
    out
}

/// `DELTA_LENGTH_BYTE_ARRAY`: delta-packed lengths, then the bytes.
pub fn delta_length_byte_array(values: &[&str]) -> Vec<u8> {
    let lengths = values.iter().map(|v| v.len() as i64).collect::<Vec<_>>();
    let mut out = delta_packed(&lengths);
    for value in values {
        out.extend_from_slice(value.as_bytes());
    }
    out
}

/// `RLE_DICTIONARY` indices: the bit width byte, then one bitpacked run.
pub fn dictionary_indices(indices: &[u32], bit_width: usize) -> Vec<u8> {
    let groups = (indices.len() + 7) / 8;
    let mut out = vec![bit_width as u8];
    uleb(((groups as u64) << 1) | 1, &mut out);
    let mut bits = vec![0u8; groups * bit_width];
    let mut offset = 0;
    for index in indices {
        for bit in 0..bit_width {
            if index >> bit & 1 == 1 {
                bits[(offset + bit) / 8] |= 1 << ((offset + bit) % 8);
            }
        }
        offset += bit_width;
    }
    out.extend_from_slice(&bits);
    out
}

/// Transposes the bytes of `values` into parallel streams.
pub fn byte_stream_split_f64(values: &[f64]) -> Vec<u8> {
    let rows = values.iter().map(|v| v.to_le_bytes()).collect::<Vec<_>>();
    (0..8)
        .flat_map(|n| rows.iter().map(move |row| row[n]))
        .collect()
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

// ---------------------------------------------------------------------------
// schema elements

pub fn root(name: &str, num_children: usize) -> SchemaElement {
    SchemaElement {
        type_: None,
        type_length: None,
        repetition_type: None,
        name: name.to_string(),
        num_children: Some(num_children as i32),
        converted_type: None,
        scale: None,
        precision: None,
        field_id: None,
        logical_type: None,
    }
}

pub fn primitive(name: &str, type_: Type, repetition: FieldRepetitionType) -> SchemaElement {
    SchemaElement {
        type_: Some(type_),
        type_length: None,
        repetition_type: Some(repetition),
        name: name.to_string(),
        num_children: None,
        converted_type: None,
        scale: None,
        precision: None,
        field_id: None,
        logical_type: None,
    }
}

pub fn string(name: &str, repetition: FieldRepetitionType) -> SchemaElement {
    SchemaElement {
        converted_type: Some(ConvertedType::UTF8),
        ..primitive(name, Type::BYTE_ARRAY, repetition)
    }
}

pub fn group(
    name: &str,
    repetition: FieldRepetitionType,
    num_children: usize,
    converted_type: Option<ConvertedType>,
) -> SchemaElement {
    SchemaElement {
        type_: None,
        type_length: None,
        repetition_type: Some(repetition),
        name: name.to_string(),
        num_children: Some(num_children as i32),
        converted_type,
        scale: None,
        precision: None,
        field_id: None,
        logical_type: None,
    }
}

// ---------------------------------------------------------------------------
// pages, chunks and files

pub struct Page {
    header: PageHeader,
    body: Vec<u8>,
}

fn compress(codec: CompressionCodec, data: Vec<u8>) -> Vec<u8> {
    match codec {
        CompressionCodec::UNCOMPRESSED => data,
        CompressionCodec::GZIP => gzip(&data),
        other => panic!("codec {:?} not supported by the test assembler", other),
    }
}

pub fn data_page_v1(
    num_values: usize,
    encoding: Encoding,
    rep: Option<(&[u32], i16)>,
    def: Option<(&[u32], i16)>,
    values: Vec<u8>,
    codec: CompressionCodec,
) -> Page {
    let mut body = vec![];
    if let Some((levels, max)) = rep {
        body.extend(levels_v1(levels, max));
    }
    if let Some((levels, max)) = def {
        body.extend(levels_v1(levels, max));
    }
    body.extend(values);
    let uncompressed_page_size = body.len() as i32;
    let body = compress(codec, body);
    Page {
        header: PageHeader {
            type_: PageType::DATA_PAGE,
            uncompressed_page_size,
            compressed_page_size: body.len() as i32,
            crc: None,
            data_page_header: Some(DataPageHeader {
                num_values: num_values as i32,
                encoding,
                definition_level_encoding: Encoding::RLE,
                repetition_level_encoding: Encoding::RLE,
                statistics: None,
            }),
            index_page_header: None,
            dictionary_page_header: None,
            data_page_header_v2: None,
        },
        body,
    }
}

pub fn data_page_v2(
    num_values: usize,
    num_nulls: usize,
    num_rows: usize,
    encoding: Encoding,
    rep: Option<(&[u32], i16)>,
    def: Option<(&[u32], i16)>,
    values: Vec<u8>,
    codec: CompressionCodec,
) -> Page {
    let rep_levels = rep.map(|(levels, max)| levels_rle(levels, max)).unwrap_or_default();
    let def_levels = def.map(|(levels, max)| levels_rle(levels, max)).unwrap_or_default();
    let uncompressed_page_size = (rep_levels.len() + def_levels.len() + values.len()) as i32;
    let compressed_values = compress(codec, values);
    let mut body = vec![];
    body.extend_from_slice(&rep_levels);
    body.extend_from_slice(&def_levels);
    body.extend_from_slice(&compressed_values);
    Page {
        header: PageHeader {
            type_: PageType::DATA_PAGE_V2,
            uncompressed_page_size,
            compressed_page_size: body.len() as i32,
            crc: None,
            data_page_header: None,
            index_page_header: None,
            dictionary_page_header: None,
            data_page_header_v2: Some(DataPageHeaderV2 {
                num_values: num_values as i32,
                num_nulls: num_nulls as i32,
                num_rows: num_rows as i32,
                encoding,
                definition_levels_byte_length: def_levels.len() as i32,
                repetition_levels_byte_length: rep_levels.len() as i32,
                is_compressed: Some(codec != CompressionCodec::UNCOMPRESSED),
                statistics: None,
            }),
        },
        body,
    }
}

pub fn dictionary_page(num_values: usize, values: Vec<u8>, codec: CompressionCodec) -> Page {
    let uncompressed_page_size = values.len() as i32;
    let body = compress(codec, values);
    Page {
        header: PageHeader {
            type_: PageType::DICTIONARY_PAGE,
            uncompressed_page_size,
            compressed_page_size: body.len() as i32,
            crc: None,
            data_page_header: None,
            index_page_header: None,
            dictionary_page_header: Some(DictionaryPageHeader {
                num_values: num_values as i32,
                encoding: Encoding::PLAIN,
                is_sorted: None,
            }),
            data_page_header_v2: None,
        },
        body,
    }
}

pub struct ColumnSpec {
    pub path: Vec<String>,
    pub physical_type: Type,
    pub codec: CompressionCodec,
    pub num_values: i64,
    pub pages: Vec<Page>,
}

impl ColumnSpec {
    pub fn new(path: &[&str], physical_type: Type, codec: CompressionCodec, num_values: i64, pages: Vec<Page>) -> Self {
        Self {
            path: path.iter().map(|p| p.to_string()).collect(),
            physical_type,
            codec,
            num_values,
            pages,
        }
    }
}

pub struct FileBuilder {
    buffer: Vec<u8>,
    schema: Vec<SchemaElement>,
    num_rows: i64,
    row_groups: Vec<RowGroup>,
}

impl FileBuilder {
    pub fn new(schema: Vec<SchemaElement>, num_rows: i64) -> Self {
        Self {
            buffer: b"PAR1".to_vec(),
            schema,
            num_rows,
            row_groups: vec![],
        }
    }

    pub fn add_row_group(&mut self, num_rows: i64, columns: Vec<ColumnSpec>) -> &mut Self {
        let mut chunks = vec![];
        let mut total_byte_size = 0;
        for column in columns {
            let mut dictionary_page_offset = None;
            let mut data_page_offset = None;
            let mut total_compressed_size = 0i64;
            let mut total_uncompressed_size = 0i64;
            let mut encodings = vec![Encoding::PLAIN, Encoding::RLE];
            for page in &column.pages {
                let header_bytes = serialize(|protocol| page.header.write_to_out_protocol(protocol));
                let offset = self.buffer.len() as i64;
                if page.header.type_ == PageType::DICTIONARY_PAGE {
                    dictionary_page_offset = Some(offset);
                    if !encodings.contains(&Encoding::RLE_DICTIONARY) {
                        encodings.push(Encoding::RLE_DICTIONARY);
                    }
                } else if data_page_offset.is_none() {
                    data_page_offset = Some(offset);
                }
                self.buffer.extend_from_slice(&header_bytes);
                self.buffer.extend_from_slice(&page.body);
                total_compressed_size += (header_bytes.len() + page.body.len()) as i64;
                total_uncompressed_size +=
                    (header_bytes.len() as i32 + page.header.uncompressed_page_size) as i64;
            }
            total_byte_size += total_uncompressed_size;
            chunks.push(ColumnChunk {
                file_path: None,
                file_offset: self.buffer.len() as i64,
                meta_data: Some(ColumnMetaData {
                    type_: column.physical_type,
                    encodings,
                    path_in_schema: column.path,
                    codec: column.codec,
                    num_values: column.num_values,
                    total_uncompressed_size,
                    total_compressed_size,
                    key_value_metadata: None,
                    data_page_offset: data_page_offset.expect("a column needs a data page"),
                    index_page_offset: None,
                    dictionary_page_offset,
                    statistics: None,
                    encoding_stats: None,
                    bloom_filter_offset: None,
                }),
                offset_index_offset: None,
                offset_index_length: None,
                column_index_offset: None,
                column_index_length: None,
                crypto_metadata: None,
                encrypted_column_metadata: None,
            });
        }
        self.row_groups.push(RowGroup {
            columns: chunks,
            total_byte_size,
            num_rows,
            sorting_columns: None,
            file_offset: None,
            total_compressed_size: None,
            ordinal: None,
        });
        self
    }

    pub fn finish(&mut self) -> Vec<u8> {
        let metadata = FileMetaData::new(
            1,
            std::mem::take(&mut self.schema),
            self.num_rows,
            std::mem::take(&mut self.row_groups),
            None,
            Some("in-test assembler".to_string()),
            None,
            None,
            None,
        );
        let metadata_bytes = serialize(|protocol| metadata.write_to_out_protocol(protocol));
        let mut buffer = std::mem::take(&mut self.buffer);
        buffer.extend_from_slice(&metadata_bytes);
        buffer.extend_from_slice(&(metadata_bytes.len() as u32).to_le_bytes());
        buffer.extend_from_slice(b"PAR1");
        buffer
    }
}

// ---------------------------------------------------------------------------
// ready-made files

/// Three required columns (`id` INT32, `name` STRING, `value` INT64), five
/// rows, every page gzip-compressed.
pub fn three_column_gzip_file() -> Vec<u8> {
    let schema = vec![
        root("schema", 3),
        primitive("id", Type::INT32, FieldRepetitionType::REQUIRED),
        string("name", FieldRepetitionType::REQUIRED),
        primitive("value", Type::INT64, FieldRepetitionType::REQUIRED),
    ];
    let mut builder = FileBuilder::new(schema, 5);
    builder.add_row_group(
        5,
        vec![
            ColumnSpec::new(
                &["id"],
                Type::INT32,
                CompressionCodec::GZIP,
                5,
                vec![data_page_v1(
                    5,
                    Encoding::PLAIN,
                    None,
                    None,
                    plain_i32(&[1, 2, 3, 4, 5]),
                    CompressionCodec::GZIP,
                )],
            ),
            ColumnSpec::new(
                &["name"],
                Type::BYTE_ARRAY,
                CompressionCodec::GZIP,
                5,
                vec![data_page_v1(
                    5,
                    Encoding::PLAIN,
                    None,
                    None,
                    plain_strings(&["Alice", "Bob", "Charlie", "Diana", "Eve"]),
                    CompressionCodec::GZIP,
                )],
            ),
            ColumnSpec::new(
                &["value"],
                Type::INT64,
                CompressionCodec::GZIP,
                5,
                vec![data_page_v1(
                    5,
                    Encoding::PLAIN,
                    None,
                    None,
                    plain_i64(&[100, 200, 300, 400, 500]),
                    CompressionCodec::GZIP,
                )],
            ),
        ],
    );
    builder.finish()
}

/// One required INT32 column `n` over two delta-packed pages holding
/// `start..start + 150`.
pub fn delta_file(start: i32) -> Vec<u8> {
    let schema = vec![
        root("schema", 1),
        primitive("n", Type::INT32, FieldRepetitionType::REQUIRED),
    ];
    let first = (start as i64..start as i64 + 100).collect::<Vec<_>>();
    let second = (start as i64 + 100..start as i64 + 150).collect::<Vec<_>>();
    let mut builder = FileBuilder::new(schema, 150);
    builder.add_row_group(
        150,
        vec![ColumnSpec::new(
            &["n"],
            Type::INT32,
            CompressionCodec::UNCOMPRESSED,
            150,
            vec![
                data_page_v1(
                    100,
                    Encoding::DELTA_BINARY_PACKED,
                    None,
                    None,
                    delta_packed(&first),
                    CompressionCodec::UNCOMPRESSED,
                ),
                data_page_v1(
                    50,
                    Encoding::DELTA_BINARY_PACKED,
                    None,
                    None,
                    delta_packed(&second),
                    CompressionCodec::UNCOMPRESSED,
                ),
            ],
        )],
    );
    builder.finish()
}
