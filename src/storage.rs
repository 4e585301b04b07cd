//! Bitmap resource provider
//!
//! The renderer never touches a filesystem directly. Images are opened by
//! path through a [`Storage`] and read through a seekable [`BitmapFile`].
//! Closing a file is dropping it.

use core::fmt;

/// Error returned by storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// No resource exists at the requested path
    NotFound,
    /// The resource ended before the requested bytes were read
    UnexpectedEof,
    /// Seek target lies past the end of the resource
    SeekOutOfRange,
    /// The underlying medium reported a failure
    Io,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("file not found"),
            Self::UnexpectedEof => f.write_str("unexpected end of file"),
            Self::SeekOutOfRange => f.write_str("seek past end of file"),
            Self::Io => f.write_str("storage i/o failure"),
        }
    }
}

/// Byte-addressable, seekable and readable file
pub trait BitmapFile {
    /// Read up to `buf.len()` bytes from the current position
    ///
    /// Returns the number of bytes read, `0` at end of file.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Move the read cursor to an absolute byte offset
    fn seek(&mut self, position: u32) -> Result<(), StorageError>;

    /// Current absolute read position
    fn position(&self) -> u32;

    /// Fill `buf` completely or fail with [`StorageError::UnexpectedEof`]
    fn read_exact(&mut self, mut buf: &mut [u8]) -> Result<(), StorageError> {
        while !buf.is_empty() {
            match self.read(buf)? {
                0 => return Err(StorageError::UnexpectedEof),
                n => buf = &mut core::mem::take(&mut buf)[n..],
            }
        }
        Ok(())
    }
}

/// Source of bitmap files identified by path
pub trait Storage {
    type File: BitmapFile;

    /// Open a file for reading
    ///
    /// Fails with [`StorageError::NotFound`] if no file exists at `path`.
    fn open(&mut self, path: &str) -> Result<Self::File, StorageError>;
}

/// File backed by a byte slice (RAM or memory-mapped flash)
#[derive(Debug, Clone)]
pub struct SliceFile<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> SliceFile<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Total file length in bytes
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl BitmapFile for SliceFile<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StorageError> {
        let remaining = self.data.get(self.position..).unwrap_or_default();
        let count = remaining.len().min(buf.len());
        buf[..count].copy_from_slice(&remaining[..count]);
        self.position += count;
        Ok(count)
    }

    fn seek(&mut self, position: u32) -> Result<(), StorageError> {
        let position = position as usize;
        if position > self.data.len() {
            return Err(StorageError::SeekOutOfRange);
        }
        self.position = position;
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn position(&self) -> u32 {
        self.position as u32
    }
}

/// Read-only storage over a fixed table of named byte slices
#[derive(Debug, Clone, Copy)]
pub struct SliceStorage<'a> {
    files: &'a [(&'a str, &'a [u8])],
}

impl<'a> SliceStorage<'a> {
    pub const fn new(files: &'a [(&'a str, &'a [u8])]) -> Self {
        Self { files }
    }

    /// Iterate over stored paths
    pub fn paths(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.files.iter().map(|(path, _)| *path)
    }
}

impl<'a> Storage for SliceStorage<'a> {
    type File = SliceFile<'a>;

    fn open(&mut self, path: &str) -> Result<SliceFile<'a>, StorageError> {
        self.files
            .iter()
            .find(|(name, _)| *name == path)
            .map(|(_, data)| SliceFile::new(data))
            .ok_or(StorageError::NotFound)
    }
}
