//! Bitmap file header
//!
//! Only the fields of `BITMAPFILEHEADER` and the leading fields of
//! `BITMAPINFOHEADER` that the renderer needs are decoded. All multi-byte
//! fields are little-endian.

use super::DecodeError;

/// Required signature at the start of every bitmap file
pub const SIGNATURE: [u8; 2] = *b"BM";

/// Length of the signature field
pub(crate) const SIGNATURE_LEN: usize = 2;

/// Length of the header prefix holding every decoded field
pub const HEADER_LEN: usize = 34;

const PIXEL_DATA_OFFSET: usize = 10;
const WIDTH: usize = 18;
const HEIGHT: usize = 22;
const PLANES: usize = 26;
const BITS_PER_PIXEL: usize = 28;
const COMPRESSION: usize = 30;

/// Number of bytes a single pixel occupies in the pixel array
pub const BYTES_PER_PIXEL: u32 = 3;

/// Header field that failed format validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    Planes,
    BitsPerPixel,
    Compression,
}

/// Decoded bitmap header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapHeader {
    pub signature: [u8; 2],
    /// Byte offset of the first pixel row
    pub pixel_data_offset: u32,
    pub width: i32,
    /// Positive for bottom-up storage, negative for top-down
    pub height: i32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
}

impl BitmapHeader {
    /// Decode the header prefix without validating it
    pub fn decode(bytes: &[u8; HEADER_LEN]) -> Self {
        Self {
            signature: [bytes[0], bytes[1]],
            pixel_data_offset: read_u32_le(bytes, PIXEL_DATA_OFFSET),
            width: read_i32_le(bytes, WIDTH),
            height: read_i32_le(bytes, HEIGHT),
            planes: read_u16_le(bytes, PLANES),
            bits_per_pixel: read_u16_le(bytes, BITS_PER_PIXEL),
            compression: read_u32_le(bytes, COMPRESSION),
        }
    }

    /// Check that the bitmap can be streamed to a strip
    ///
    /// Validation order: signature, planes, bits per pixel, compression,
    /// dimensions.
    pub fn validate(&self) -> Result<(), DecodeError> {
        if self.signature != SIGNATURE {
            return Err(DecodeError::InvalidSignature);
        }
        if self.planes != 1 {
            return Err(DecodeError::UnsupportedFormat(HeaderField::Planes));
        }
        if self.bits_per_pixel != 24 {
            return Err(DecodeError::UnsupportedFormat(HeaderField::BitsPerPixel));
        }
        if self.compression != 0 {
            return Err(DecodeError::UnsupportedFormat(HeaderField::Compression));
        }
        if self.width <= 0 || self.checked_row_stride().is_none() {
            return Err(DecodeError::InvalidDimensions);
        }
        Ok(())
    }

    pub fn is_renderable(&self) -> bool {
        self.validate().is_ok()
    }

    /// Image width in pixels, zero for invalid headers
    pub const fn width(&self) -> u32 {
        if self.width > 0 { self.width.unsigned_abs() } else { 0 }
    }

    /// Number of stored pixel rows
    pub const fn row_count(&self) -> u32 {
        self.height.unsigned_abs()
    }

    /// Row length in the file, padded to a 4-byte boundary
    pub fn row_stride(&self) -> u32 {
        self.checked_row_stride().unwrap_or(0)
    }

    /// Meaningful pixel bytes at the start of each row
    pub const fn row_pixel_bytes(&self) -> u32 {
        // width * 3 always fits when row_stride does
        self.width().wrapping_mul(BYTES_PER_PIXEL)
    }

    fn checked_row_stride(&self) -> Option<u32> {
        let stride = (u64::from(self.width()) * u64::from(BYTES_PER_PIXEL) + 3) & !3;
        u32::try_from(stride).ok()
    }
}

/// Read a little-endian `u16` at `offset`
#[inline]
pub fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

/// Read a little-endian `u32` at `offset`
#[inline]
pub fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Read a little-endian `i32` at `offset`
#[inline]
#[allow(clippy::cast_possible_wrap)]
pub fn read_i32_le(bytes: &[u8], offset: usize) -> i32 {
    read_u32_le(bytes, offset) as i32
}
