use crate::boxes::FourCC;

/// Everything that can abort the decode of a file.
///
/// Unknown box types are not errors (they are skipped as opaque boxes) and
/// unknown sub-variants of known boxes are only logged.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("read of {wanted} bytes at offset {pos} runs past the end of the data ({len} bytes)")]
    OutOfRange { pos: u64, wanted: u64, len: u64 },

    #[error("box '{typ}' at offset {offset}: expected {expected} bytes, consumed {actual}")]
    SizeMismatch {
        typ: FourCC,
        offset: u64,
        expected: u64,
        actual: u64,
    },

    #[error("box '{typ}' at offset {offset}: declared size {size} is smaller than its {header_len}-byte header")]
    InvalidSize {
        typ: FourCC,
        offset: u64,
        size: u64,
        header_len: u64,
    },

    #[error("box '{typ}': invalid {field} ({value})")]
    InvalidField {
        typ: FourCC,
        field: &'static str,
        value: u64,
    },

    #[error("box size extends to the end of the stream and has no fixed length")]
    UnboundedSize,

    #[error("box '{typ}' is nested too deep (depth {depth})")]
    TooDeep { typ: FourCC, depth: usize },

    #[error("item {item_id}: {reason}")]
    Item { item_id: u32, reason: &'static str },

    #[error("unsupported: {0}")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, ParseError>;
