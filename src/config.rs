//! Render configuration
//!
//! The surrounding application owns the configuration store. The renderer
//! only sees an immutable [`DeviceConfig`] snapshot taken at render start.

use core::fmt;
use core::num::NonZeroU16;

use embassy_time::Duration;
use heapless::String;

/// Maximum length of a stored image path
pub const IMAGE_PATH_CAPACITY: usize = 32;

pub const DEFAULT_STRIP_LENGTH: NonZeroU16 = match NonZeroU16::new(60) {
    Some(length) => length,
    None => panic!("strip length must be non-zero"),
};
pub const DEFAULT_DATA_PIN: u8 = 14;
pub const DEFAULT_LINE_INTERVAL: Duration = Duration::from_millis(20);
pub const DEFAULT_IMAGE_PATH: &str = "/test.bmp";

/// Error returned for invalid configuration values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Image path is empty
    EmptyPath,
    /// Image path does not fit into [`IMAGE_PATH_CAPACITY`] bytes
    PathTooLong,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath => f.write_str("image path is empty"),
            Self::PathTooLong => write!(f, "image path exceeds {IMAGE_PATH_CAPACITY} bytes"),
        }
    }
}

/// Absolute path of a stored bitmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePath(String<IMAGE_PATH_CAPACITY>);

impl ImagePath {
    /// Create a path, prefixing `/` when missing
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        if path.is_empty() {
            return Err(ConfigError::EmptyPath);
        }
        let mut inner = String::new();
        if !path.starts_with('/') {
            inner.push('/').map_err(|()| ConfigError::PathTooLong)?;
        }
        inner.push_str(path).map_err(|()| ConfigError::PathTooLong)?;
        Ok(Self(inner))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Check whether the path names a `.bmp` file
    pub fn is_bitmap(&self) -> bool {
        self.0.ends_with(".bmp")
    }
}

impl Default for ImagePath {
    fn default() -> Self {
        let mut inner = String::new();
        // The default path is shorter than the capacity
        let _ = inner.push_str(DEFAULT_IMAGE_PATH);
        Self(inner)
    }
}

impl fmt::Display for ImagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the settings a render pass needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Number of addressable LEDs
    pub strip_length: NonZeroU16,
    /// Data pin driving the strip
    pub data_pin: u8,
    /// Exposure time of each row
    pub line_interval: Duration,
    /// Bitmap to paint
    pub image_path: ImagePath,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            strip_length: DEFAULT_STRIP_LENGTH,
            data_pin: DEFAULT_DATA_PIN,
            line_interval: DEFAULT_LINE_INTERVAL,
            image_path: ImagePath::default(),
        }
    }
}

/// Supplies configuration snapshots to the painter
pub trait ConfigProvider {
    /// Take a snapshot of the current configuration
    fn snapshot(&self) -> DeviceConfig;
}

impl ConfigProvider for DeviceConfig {
    fn snapshot(&self) -> DeviceConfig {
        self.clone()
    }
}

impl<F: Fn() -> DeviceConfig> ConfigProvider for F {
    fn snapshot(&self) -> DeviceConfig {
        self()
    }
}
