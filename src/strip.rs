//! LED strip driver
//!
//! Owns the frame buffer for the strip and the hardware output behind it.
//! Pixels are staged into the buffer and only reach the LEDs on
//! [`StripDriver::commit`], so a row is never shown half-written.

use core::fmt;

use embassy_time::{Duration, block_for};

use crate::color::{BLACK, Rgb};

/// Error reported by a hardware output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputError;

/// Abstract LED output
///
/// Implement this trait to support different hardware platforms.
/// The strip driver is generic over this trait.
pub trait LedOutput {
    /// Configure `pin` to drive a strip of `length` LEDs
    fn attach(&mut self, pin: u8, length: usize) -> Result<(), OutputError>;

    /// Write colors to the LED strip
    fn write(&mut self, colors: &[Rgb]);

    /// Release the data pin so it can be repurposed
    fn detach(&mut self);
}

/// Hardware parameters the strip is currently attached with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    pub pin: u8,
    pub length: usize,
}

/// Error returned by strip operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripError {
    /// The strip has not been attached
    NotAttached,
    /// Requested length is zero or exceeds the frame buffer
    LengthOutOfRange { length: usize, max: usize },
    /// Pixel index is past the attached length
    IndexOutOfRange { index: usize, length: usize },
    /// The hardware output refused to attach
    Output(OutputError),
}

impl fmt::Display for StripError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAttached => f.write_str("strip is not attached"),
            Self::LengthOutOfRange { length, max } => {
                write!(f, "strip length {length} outside 1..={max}")
            }
            Self::IndexOutOfRange { index, length } => {
                write!(f, "pixel {index} outside strip of {length}")
            }
            Self::Output(_) => f.write_str("output failed to attach"),
        }
    }
}

/// Strip driver with a frame buffer of up to `MAX_LEDS` pixels
pub struct StripDriver<O: LedOutput, const MAX_LEDS: usize> {
    output: O,
    frame_buffer: [Rgb; MAX_LEDS],
    attachment: Option<Attachment>,
}

impl<O: LedOutput, const MAX_LEDS: usize> StripDriver<O, MAX_LEDS> {
    pub const fn new(output: O) -> Self {
        Self {
            output,
            frame_buffer: [BLACK; MAX_LEDS],
            attachment: None,
        }
    }

    /// Attach the output to `pin` with `length` LEDs
    ///
    /// Attaching again with the same parameters is a no-op. Different
    /// parameters detach first.
    pub fn attach(&mut self, pin: u8, length: usize) -> Result<(), StripError> {
        if length == 0 || length > MAX_LEDS {
            return Err(StripError::LengthOutOfRange {
                length,
                max: MAX_LEDS,
            });
        }
        let attachment = Attachment { pin, length };
        if self.attachment == Some(attachment) {
            return Ok(());
        }
        self.detach();

        self.output.attach(pin, length).map_err(StripError::Output)?;
        self.frame_buffer[..length].fill(BLACK);
        self.attachment = Some(attachment);
        Ok(())
    }

    /// Stage a color at `index`
    ///
    /// Out-of-range indices are a programming error: they trip a debug
    /// assertion and are ignored in release builds. Use
    /// [`StripDriver::try_set_pixel`] for a checked write.
    pub fn set_pixel(&mut self, index: usize, color: Rgb) {
        debug_assert!(
            index < self.len(),
            "pixel {index} outside strip of {}",
            self.len()
        );
        if let Some(pixel) = self.frame_mut().get_mut(index) {
            *pixel = color;
        }
    }

    /// Stage a color at `index`, failing if it is outside the strip
    pub fn try_set_pixel(&mut self, index: usize, color: Rgb) -> Result<(), StripError> {
        let length = self.len();
        let pixel = self
            .frame_mut()
            .get_mut(index)
            .ok_or(StripError::IndexOutOfRange { index, length })?;
        *pixel = color;
        Ok(())
    }

    /// Flush the staged frame to the strip
    pub fn commit(&mut self) -> Result<(), StripError> {
        let attachment = self.attachment.ok_or(StripError::NotAttached)?;
        self.output.write(&self.frame_buffer[..attachment.length]);
        Ok(())
    }

    /// Blank the strip
    pub fn clear(&mut self) -> Result<(), StripError> {
        self.frame_mut().fill(BLACK);
        self.commit()
    }

    /// Block for `duration`, used as exposure time between rows
    pub fn sleep(&self, duration: Duration) {
        if duration.as_ticks() > 0 {
            block_for(duration);
        }
    }

    /// Release the data pin and zero the frame
    pub fn detach(&mut self) {
        let Some(attachment) = self.attachment.take() else {
            return;
        };
        self.frame_buffer[..attachment.length].fill(BLACK);
        self.output.detach();
    }

    /// Staged colors of the attached strip
    pub fn frame(&self) -> &[Rgb] {
        &self.frame_buffer[..self.len()]
    }

    /// Number of attached LEDs, zero when detached
    pub fn len(&self) -> usize {
        self.attachment.map_or(0, |attachment| attachment.length)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn attachment(&self) -> Option<Attachment> {
        self.attachment
    }

    pub const fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    pub const fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Frame buffer capacity
    pub const fn capacity(&self) -> usize {
        MAX_LEDS
    }

    fn frame_mut(&mut self) -> &mut [Rgb] {
        let length = self.len();
        &mut self.frame_buffer[..length]
    }
}
