//! Streaming reader for uncompressed 24-bit bitmaps
//!
//! Rows are decoded one at a time into a caller-owned buffer, so an image of
//! any height can be painted with a buffer sized to the strip.

mod header;
mod reader;

use core::fmt;

pub use header::{
    BYTES_PER_PIXEL, BitmapHeader, HEADER_LEN, HeaderField, SIGNATURE, read_i32_le, read_u16_le,
    read_u32_le,
};
pub use reader::{BitmapReader, PixelRow};

use crate::storage::StorageError;

/// Error returned while decoding a bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The file could not be opened
    Unavailable(StorageError),
    /// The file does not start with `BM`
    InvalidSignature,
    /// Planes, bit depth or compression is not supported
    UnsupportedFormat(HeaderField),
    /// Width is not positive or the row stride overflows
    InvalidDimensions,
    /// The file ended before the header or a row was complete
    Truncated,
    /// Reading or seeking failed
    Io(StorageError),
    /// Requested row is past the last stored row
    RowOutOfRange,
    /// The row buffer cannot hold a full row of pixels
    BufferTooSmall,
}

impl DecodeError {
    /// Convert a storage failure that happened while reading
    pub(crate) const fn from_read(err: StorageError) -> Self {
        match err {
            StorageError::UnexpectedEof | StorageError::SeekOutOfRange => Self::Truncated,
            other => Self::Io(other),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(err) => write!(f, "bitmap unavailable: {err}"),
            Self::InvalidSignature => f.write_str("missing BM signature"),
            Self::UnsupportedFormat(field) => write!(f, "unsupported {field:?}"),
            Self::InvalidDimensions => f.write_str("invalid bitmap dimensions"),
            Self::Truncated => f.write_str("bitmap truncated"),
            Self::Io(err) => write!(f, "bitmap read failed: {err}"),
            Self::RowOutOfRange => f.write_str("row index out of range"),
            Self::BufferTooSmall => f.write_str("row buffer too small"),
        }
    }
}
