/// Errors surfaced by this crate. Every variant carries a message describing
/// the offending file region or call.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Error {
    /// The magic bytes are wrong or the footer length points outside the file.
    MalformedFile(String),
    /// A page header failed to parse or declares impossible sizes.
    MalformedPage(String),
    /// A page of a kind this crate does not know.
    UnsupportedPage(String),
    /// An encoding this crate does not decode.
    UnsupportedEncoding(String),
    /// A compression codec that is unknown or not compiled in.
    UnsupportedCodec(String),
    /// Decoded content disagrees with what the metadata declared.
    CorruptPage(String),
    /// A typed accessor disagrees with the schema.
    TypeMismatch(String),
    /// A by-name lookup found no such field.
    FieldNotFound(String),
    /// A positional lookup is out of bounds, or a released slot was re-requested.
    IndexOutOfRange(String),
    /// A byte-source slice request exceeds the source.
    RangeError(String),
    /// The reader or cursor was closed.
    Closed,
    /// An operating-system error.
    Io(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::MalformedFile(message) => write!(fmt, "malformed file: {}", message),
            Error::MalformedPage(message) => write!(fmt, "malformed page: {}", message),
            Error::UnsupportedPage(message) => write!(fmt, "unsupported page: {}", message),
            Error::UnsupportedEncoding(message) => {
                write!(fmt, "unsupported encoding: {}", message)
            }
            Error::UnsupportedCodec(message) => write!(fmt, "unsupported codec: {}", message),
            Error::CorruptPage(message) => write!(fmt, "corrupt page: {}", message),
            Error::TypeMismatch(message) => write!(fmt, "type mismatch: {}", message),
            Error::FieldNotFound(message) => write!(fmt, "field not found: {}", message),
            Error::IndexOutOfRange(message) => write!(fmt, "index out of range: {}", message),
            Error::RangeError(message) => write!(fmt, "range error: {}", message),
            Error::Closed => write!(fmt, "closed"),
            Error::Io(message) => write!(fmt, "underlying IO error: {}", message),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e.to_string())
    }
}

/// A specialized `Result` for this crate's errors.
pub type Result<T> = std::result::Result<T, Error>;
