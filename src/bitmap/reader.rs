use super::header::{BitmapHeader, HEADER_LEN, SIGNATURE, SIGNATURE_LEN};
use super::DecodeError;
use crate::color::{Rgb, rgb_from_bgr};
use crate::storage::{BitmapFile, Storage};

/// Longest padding a row can carry
const MAX_PADDING: usize = 3;

/// Bitmap opened for row streaming
///
/// Owns the underlying file; dropping the reader closes it.
#[derive(Debug)]
pub struct BitmapReader<F: BitmapFile> {
    file: F,
    header: BitmapHeader,
    row_stride: u32,
    next_row: u32,
}

impl<F: BitmapFile> BitmapReader<F> {
    /// Open `path` from `storage` and validate its header
    pub fn open<S>(storage: &mut S, path: &str) -> Result<Self, DecodeError>
    where
        S: Storage<File = F>,
    {
        let file = storage.open(path).map_err(DecodeError::Unavailable)?;
        Self::new(file)
    }

    /// Read and validate the header of an already opened file
    ///
    /// The signature is checked before anything else is read, so a short
    /// non-bitmap file reports [`DecodeError::InvalidSignature`].
    pub fn new(mut file: F) -> Result<Self, DecodeError> {
        let mut bytes = [0u8; HEADER_LEN];
        file.seek(0).map_err(DecodeError::from_read)?;
        file.read_exact(&mut bytes[..SIGNATURE_LEN])
            .map_err(|_| DecodeError::InvalidSignature)?;
        if bytes[..SIGNATURE_LEN] != SIGNATURE {
            return Err(DecodeError::InvalidSignature);
        }
        file.read_exact(&mut bytes[SIGNATURE_LEN..])
            .map_err(DecodeError::from_read)?;

        let header = BitmapHeader::decode(&bytes);
        header.validate()?;

        Ok(Self {
            file,
            row_stride: header.row_stride(),
            header,
            next_row: 0,
        })
    }

    pub const fn header(&self) -> &BitmapHeader {
        &self.header
    }

    /// Image width in pixels
    pub const fn width(&self) -> u32 {
        self.header.width()
    }

    /// Number of rows available
    pub const fn row_count(&self) -> u32 {
        self.header.row_count()
    }

    /// Padded row length in bytes
    pub const fn row_stride(&self) -> u32 {
        self.row_stride
    }

    /// Read the row at `index` in file order
    ///
    /// Row 0 is the first row in the file, which is the bottom of the image
    /// for bottom-up bitmaps. The pixel bytes land in `buf` and the row
    /// padding is consumed, leaving the cursor at the start of the next row.
    #[allow(clippy::cast_possible_truncation)]
    pub fn read_row<'b>(
        &mut self,
        index: u32,
        buf: &'b mut [[u8; 3]],
    ) -> Result<PixelRow<'b>, DecodeError> {
        if index >= self.row_count() {
            return Err(DecodeError::RowOutOfRange);
        }
        let width = self.width() as usize;
        let Some(pixels) = buf.get_mut(..width) else {
            return Err(DecodeError::BufferTooSmall);
        };

        let offset = index
            .checked_mul(self.row_stride)
            .and_then(|row| row.checked_add(self.header.pixel_data_offset))
            .ok_or(DecodeError::Truncated)?;
        if self.file.position() != offset {
            self.file.seek(offset).map_err(DecodeError::from_read)?;
        }

        self.file
            .read_exact(pixels.as_flattened_mut())
            .map_err(DecodeError::from_read)?;
        let padding = (self.row_stride - self.header.row_pixel_bytes()) as usize;
        let mut scratch = [0u8; MAX_PADDING];
        self.file
            .read_exact(&mut scratch[..padding])
            .map_err(DecodeError::from_read)?;

        self.next_row = index + 1;
        Ok(PixelRow { pixels })
    }

    /// Read the row following the last one read
    ///
    /// Returns `None` once every row has been produced.
    pub fn next_row<'b>(
        &mut self,
        buf: &'b mut [[u8; 3]],
    ) -> Option<Result<PixelRow<'b>, DecodeError>> {
        if self.next_row >= self.row_count() {
            return None;
        }
        Some(self.read_row(self.next_row, buf))
    }

    /// Release the reader, returning the file
    pub fn into_inner(self) -> F {
        self.file
    }
}

/// One decoded row of bitmap pixels
#[derive(Debug, Clone, Copy)]
pub struct PixelRow<'a> {
    pixels: &'a [[u8; 3]],
}

impl<'a> PixelRow<'a> {
    /// Number of pixels in the row
    pub const fn len(&self) -> usize {
        self.pixels.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Pixel at `column`, if any
    pub fn get(&self, column: usize) -> Option<Rgb> {
        self.pixels.get(column).copied().map(rgb_from_bgr)
    }

    /// Iterate over the row's pixels from the first stored column
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Rgb> + 'a {
        self.pixels.iter().copied().map(rgb_from_bgr)
    }
}
