// Bridges thrift-generated wire enums into crate enums. Thrift enums are
// open i32 wrappers, so every conversion is fallible.
use std::convert::TryFrom;

use parquet_format_async_temp::CompressionCodec;
use parquet_format_async_temp::ConvertedType;
use parquet_format_async_temp::DataPageHeader;
use parquet_format_async_temp::DataPageHeaderV2;
use parquet_format_async_temp::Encoding as ParquetEncoding;
use parquet_format_async_temp::FieldRepetitionType;
use parquet_format_async_temp::LogicalType as ParquetLogicalType;
use parquet_format_async_temp::PageType as ParquetPageType;
use parquet_format_async_temp::TimeUnit as ParquetTimeUnit;

use crate::error::{Error, Result};

/// Declares a crate enum mirroring one of the thrift constant sets, together
/// with the fallible conversion from the wire value.
macro_rules! from_thrift_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident from $thrift:ident ($errkind:ident, $what:literal) {
            $($variant:ident = $constant:ident,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
        $vis enum $name {
            $($variant,)+
        }

        impl TryFrom<$thrift> for $name {
            type Error = Error;

            fn try_from(value: $thrift) -> Result<Self> {
                Ok(match value {
                    $($thrift::$constant => $name::$variant,)+
                    _ => {
                        return Err(Error::$errkind(format!(
                            concat!("unknown ", $what, " {:?}"),
                            value
                        )))
                    }
                })
            }
        }
    };
}

from_thrift_enum!(
    /// How often a field may appear: exactly once, at most once, or any
    /// number of times.
    pub enum Repetition from FieldRepetitionType (MalformedFile, "repetition") {
        Required = REQUIRED,
        Optional = OPTIONAL,
        Repeated = REPEATED,
    }
);

from_thrift_enum!(
    /// The codecs a column chunk may be compressed with. `Lzo` appears for
    /// completeness of the tag space; no codec is installed for it.
    pub enum Compression from CompressionCodec (UnsupportedCodec, "compression codec") {
        Uncompressed = UNCOMPRESSED,
        Snappy = SNAPPY,
        Gzip = GZIP,
        Lzo = LZO,
        Brotli = BROTLI,
        Lz4 = LZ4,
        Zstd = ZSTD,
    }
);

from_thrift_enum!(
    /// The page kinds this crate reads. Index pages are not part of the tag
    /// set and surface as an error.
    pub enum PageType from ParquetPageType (UnsupportedPage, "page type") {
        DataPage = DATA_PAGE,
        DataPageV2 = DATA_PAGE_V2,
        DictionaryPage = DICTIONARY_PAGE,
    }
);

from_thrift_enum!(
    /// The value and level encodings of the format. `PlainDictionary` is the
    /// deprecated spelling of `RleDictionary` on data pages; on dictionary
    /// pages its payload is plain. `Rle` doubles as the level encoding and
    /// `BitPacked` is its deprecated predecessor.
    pub enum Encoding from ParquetEncoding (UnsupportedEncoding, "encoding") {
        Plain = PLAIN,
        PlainDictionary = PLAIN_DICTIONARY,
        Rle = RLE,
        BitPacked = BIT_PACKED,
        DeltaBinaryPacked = DELTA_BINARY_PACKED,
        DeltaLengthByteArray = DELTA_LENGTH_BYTE_ARRAY,
        DeltaByteArray = DELTA_BYTE_ARRAY,
        RleDictionary = RLE_DICTIONARY,
        ByteStreamSplit = BYTE_STREAM_SPLIT,
    }
);

/// Typed access to the encodings declared by the two data page header
/// versions. V2 levels are always RLE.
pub trait DataPageHeaderExt {
    fn encoding(&self) -> Result<Encoding>;
    fn repetition_level_encoding(&self) -> Result<Encoding>;
    fn definition_level_encoding(&self) -> Result<Encoding>;
}

impl DataPageHeaderExt for DataPageHeader {
    fn encoding(&self) -> Result<Encoding> {
        self.encoding.try_into()
    }

    fn repetition_level_encoding(&self) -> Result<Encoding> {
        self.repetition_level_encoding.try_into()
    }

    fn definition_level_encoding(&self) -> Result<Encoding> {
        self.definition_level_encoding.try_into()
    }
}

impl DataPageHeaderExt for DataPageHeaderV2 {
    fn encoding(&self) -> Result<Encoding> {
        self.encoding.try_into()
    }

    fn repetition_level_encoding(&self) -> Result<Encoding> {
        Ok(Encoding::Rle)
    }

    fn definition_level_encoding(&self) -> Result<Encoding> {
        Ok(Encoding::Rle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl From<ParquetTimeUnit> for TimeUnit {
    fn from(unit: ParquetTimeUnit) -> Self {
        match unit {
            ParquetTimeUnit::MILLIS(_) => TimeUnit::Milliseconds,
            ParquetTimeUnit::MICROS(_) => TimeUnit::Microseconds,
            ParquetTimeUnit::NANOS(_) => TimeUnit::Nanoseconds,
        }
    }
}

/// The widths and signedness an integer annotation may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
}

impl From<(i32, bool)> for IntegerType {
    fn from((bit_width, is_signed): (i32, bool)) -> Self {
        match (bit_width, is_signed) {
            (8, true) => IntegerType::Int8,
            (16, true) => IntegerType::Int16,
            (64, true) => IntegerType::Int64,
            (8, false) => IntegerType::UInt8,
            (16, false) => IntegerType::UInt16,
            (32, false) => IntegerType::UInt32,
            (64, false) => IntegerType::UInt64,
            // 32/signed, plus anything a future writer may invent
            _ => IntegerType::Int32,
        }
    }
}

/// The annotations a primitive column may carry on top of its physical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveLogicalType {
    String,
    Enum,
    Decimal(usize, usize),
    Date,
    Time {
        unit: TimeUnit,
        is_adjusted_to_utc: bool,
    },
    Timestamp {
        unit: TimeUnit,
        is_adjusted_to_utc: bool,
    },
    Integer(IntegerType),
    Unknown,
    Json,
    Bson,
    Uuid,
}

/// The annotations a group may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupLogicalType {
    Map,
    List,
}

impl TryFrom<ParquetLogicalType> for PrimitiveLogicalType {
    type Error = Error;

    fn try_from(type_: ParquetLogicalType) -> Result<Self> {
        Ok(match type_ {
            ParquetLogicalType::STRING(_) => PrimitiveLogicalType::String,
            ParquetLogicalType::ENUM(_) => PrimitiveLogicalType::Enum,
            ParquetLogicalType::DECIMAL(decimal) => PrimitiveLogicalType::Decimal(
                decimal.precision.try_into().map_err(|_| {
                    Error::MalformedFile("decimal precision out of range".to_string())
                })?,
                decimal
                    .scale
                    .try_into()
                    .map_err(|_| Error::MalformedFile("decimal scale out of range".to_string()))?,
            ),
            ParquetLogicalType::DATE(_) => PrimitiveLogicalType::Date,
            ParquetLogicalType::TIME(time) => PrimitiveLogicalType::Time {
                unit: time.unit.into(),
                is_adjusted_to_utc: time.is_adjusted_to_u_t_c,
            },
            ParquetLogicalType::TIMESTAMP(time) => PrimitiveLogicalType::Timestamp {
                unit: time.unit.into(),
                is_adjusted_to_utc: time.is_adjusted_to_u_t_c,
            },
            ParquetLogicalType::INTEGER(int) => {
                PrimitiveLogicalType::Integer((int.bit_width as i32, int.is_signed).into())
            }
            ParquetLogicalType::UNKNOWN(_) => PrimitiveLogicalType::Unknown,
            ParquetLogicalType::JSON(_) => PrimitiveLogicalType::Json,
            ParquetLogicalType::BSON(_) => PrimitiveLogicalType::Bson,
            ParquetLogicalType::UUID(_) => PrimitiveLogicalType::Uuid,
            _ => {
                return Err(Error::MalformedFile(
                    "logical type value out of range".to_string(),
                ))
            }
        })
    }
}

impl TryFrom<ParquetLogicalType> for GroupLogicalType {
    type Error = Error;

    fn try_from(type_: ParquetLogicalType) -> Result<Self> {
        Ok(match type_ {
            ParquetLogicalType::LIST(_) => GroupLogicalType::List,
            ParquetLogicalType::MAP(_) => GroupLogicalType::Map,
            _ => {
                return Err(Error::MalformedFile(
                    "logical type value out of range for a group".to_string(),
                ))
            }
        })
    }
}

/// The subset of converted types this crate interprets, normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveConvertedType {
    Utf8,
    Enum,
    Decimal(usize, usize),
    Date,
    TimeMillis,
    TimeMicros,
    TimestampMillis,
    TimestampMicros,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Json,
    Bson,
    Interval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupConvertedType {
    Map,
    MapKeyValue,
    List,
}

pub(crate) fn converted_to_primitive_converted(
    converted: &ConvertedType,
    maybe_decimal: Option<(i32, i32)>,
) -> Result<PrimitiveConvertedType> {
    use PrimitiveConvertedType::*;
    Ok(match *converted {
        ConvertedType::UTF8 => Utf8,
        ConvertedType::ENUM => Enum,
        ConvertedType::DECIMAL => {
            if let Some((precision, scale)) = maybe_decimal {
                Decimal(precision as usize, scale as usize)
            } else {
                return Err(Error::MalformedFile(
                    "DECIMAL requires both precision and scale".to_string(),
                ));
            }
        }
        ConvertedType::DATE => Date,
        ConvertedType::TIME_MILLIS => TimeMillis,
        ConvertedType::TIME_MICROS => TimeMicros,
        ConvertedType::TIMESTAMP_MILLIS => TimestampMillis,
        ConvertedType::TIMESTAMP_MICROS => TimestampMicros,
        ConvertedType::INT_8 => Int8,
        ConvertedType::INT_16 => Int16,
        ConvertedType::INT_32 => Int32,
        ConvertedType::INT_64 => Int64,
        ConvertedType::UINT_8 => UInt8,
        ConvertedType::UINT_16 => UInt16,
        ConvertedType::UINT_32 => UInt32,
        ConvertedType::UINT_64 => UInt64,
        ConvertedType::JSON => Json,
        ConvertedType::BSON => Bson,
        ConvertedType::INTERVAL => Interval,
        _ => {
            return Err(Error::MalformedFile(format!(
                "converted type {:?} cannot annotate a primitive",
                converted
            )))
        }
    })
}

pub(crate) fn converted_to_group_converted(converted: &ConvertedType) -> Result<GroupConvertedType> {
    Ok(match *converted {
        ConvertedType::MAP => GroupConvertedType::Map,
        ConvertedType::MAP_KEY_VALUE => GroupConvertedType::MapKeyValue,
        ConvertedType::LIST => GroupConvertedType::List,
        _ => {
            return Err(Error::MalformedFile(format!(
                "converted type {:?} cannot annotate a group",
                converted
            )))
        }
    })
}
