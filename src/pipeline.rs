//! Render pipeline
//!
//! Streams a bitmap to the strip one row per line interval. Every pass that
//! gets as far as attaching the strip ends with the strip blanked, the
//! bitmap closed and the data pin released, whatever the outcome.

use core::fmt;

use embassy_time::Duration;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::bitmap::{BitmapReader, DecodeError};
use crate::config::DeviceConfig;
use crate::gamma::correct_rgb;
use crate::storage::{BitmapFile, Storage};
use crate::strip::{LedOutput, StripDriver};

/// Error returned by a render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    /// Image could not be opened or the strip could not be attached
    ImageUnavailable,
    /// Image header failed format validation
    UnsupportedImage,
    /// Image is wider than the configured strip
    ImageTooWide { width: u32, strip_length: u16 },
    /// A row could not be read mid-stream
    DecodeFailure { row: u32 },
    /// Another render pass is already active
    Busy,
}

impl RenderError {
    /// Classify an error raised while opening the bitmap
    const fn from_open(err: DecodeError) -> Self {
        match err {
            DecodeError::Unavailable(_) | DecodeError::Io(_) => Self::ImageUnavailable,
            _ => Self::UnsupportedImage,
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageUnavailable => f.write_str("image unavailable"),
            Self::UnsupportedImage => f.write_str("unsupported image format"),
            Self::ImageTooWide {
                width,
                strip_length,
            } => write!(f, "image width {width} exceeds {strip_length} LEDs"),
            Self::DecodeFailure { row } => write!(f, "failed to decode row {row}"),
            Self::Busy => f.write_str("render already in progress"),
        }
    }
}

/// Pixel bytes of a single row
pub type RowBuffer<const MAX_LEDS: usize> = [[u8; 3]; MAX_LEDS];

/// Render pipeline - owns storage, strip and the row buffer
pub struct RenderPipeline<S: Storage, O: LedOutput, const MAX_LEDS: usize> {
    storage: S,
    strip: StripDriver<O, MAX_LEDS>,
    rows: RowBuffer<MAX_LEDS>,
}

impl<S: Storage, O: LedOutput, const MAX_LEDS: usize> RenderPipeline<S, O, MAX_LEDS> {
    pub const fn new(storage: S, output: O) -> Self {
        Self {
            storage,
            strip: StripDriver::new(output),
            rows: [[0; 3]; MAX_LEDS],
        }
    }

    /// Paint the configured image onto the strip
    ///
    /// Blocks for the whole pass: roughly `row_count * line_interval`.
    /// Errors found before attaching leave the strip untouched.
    pub fn render(&mut self, config: &DeviceConfig) -> Result<(), RenderError> {
        let path = config.image_path.as_str();
        let strip_length = config.strip_length.get();

        let bitmap = BitmapReader::open(&mut self.storage, path).map_err(|err| {
            #[cfg(feature = "esp32-log")]
            println!("[RenderPipeline.render] cannot open {}: {}", path, err);
            RenderError::from_open(err)
        })?;

        let width = bitmap.width();
        if width > u32::from(strip_length) {
            #[cfg(feature = "esp32-log")]
            println!(
                "[RenderPipeline.render] image is {} px wide, strip has {} LEDs",
                width, strip_length
            );
            return Err(RenderError::ImageTooWide {
                width,
                strip_length,
            });
        }

        self.strip
            .attach(config.data_pin, usize::from(strip_length))
            .map_err(|_err| {
                #[cfg(feature = "esp32-log")]
                println!("[RenderPipeline.render] attach failed: {}", _err);
                RenderError::ImageUnavailable
            })?;

        #[cfg(feature = "esp32-log")]
        println!(
            "[RenderPipeline.render] painting {}x{} from {}",
            width,
            bitmap.row_count(),
            path
        );

        let mut session = RenderSession {
            strip: &mut self.strip,
            rows: &mut self.rows,
            bitmap: Some(bitmap),
        };
        session.run(config.line_interval)
    }

    pub const fn strip(&self) -> &StripDriver<O, MAX_LEDS> {
        &self.strip
    }

    pub fn strip_mut(&mut self) -> &mut StripDriver<O, MAX_LEDS> {
        &mut self.strip
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}

/// Active render pass
///
/// Borrows the attached strip for the duration of the pass. Dropping the
/// session blanks the strip, closes the bitmap and detaches the pin.
struct RenderSession<'a, F: BitmapFile, O: LedOutput, const MAX_LEDS: usize> {
    strip: &'a mut StripDriver<O, MAX_LEDS>,
    rows: &'a mut RowBuffer<MAX_LEDS>,
    /// Always `Some` while the pass runs; taken in `drop` so the file is
    /// closed before the pin is released
    bitmap: Option<BitmapReader<F>>,
}

impl<F: BitmapFile, O: LedOutput, const MAX_LEDS: usize>
    RenderSession<'_, F, O, MAX_LEDS>
{
    fn run(&mut self, line_interval: Duration) -> Result<(), RenderError> {
        let Some(bitmap) = self.bitmap.as_mut() else {
            // Already closed
            return Ok(());
        };

        for index in 0..bitmap.row_count() {
            let row = bitmap.read_row(index, &mut self.rows[..]).map_err(|_err| {
                #[cfg(feature = "esp32-log")]
                println!("[RenderSession.run] row {} failed: {}", index, _err);
                RenderError::DecodeFailure { row: index }
            })?;

            for (column, color) in row.iter().enumerate() {
                self.strip.set_pixel(column, correct_rgb(color));
            }
            self.strip
                .commit()
                .map_err(|_| RenderError::ImageUnavailable)?;
            self.strip.sleep(line_interval);
        }

        #[cfg(feature = "esp32-log")]
        println!("[RenderSession.run] drawing done");
        Ok(())
    }
}

impl<F: BitmapFile, O: LedOutput, const MAX_LEDS: usize> Drop
    for RenderSession<'_, F, O, MAX_LEDS>
{
    fn drop(&mut self) {
        // Still attached here, so clearing cannot fail
        let _ = self.strip.clear();
        drop(self.bitmap.take());
        self.strip.detach();
    }
}
