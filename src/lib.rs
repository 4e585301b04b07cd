#![no_std]

pub mod bitmap;
pub mod color;
pub mod config;
pub mod gamma;
pub mod painter;
pub mod pipeline;
pub mod storage;
pub mod strip;
pub mod trigger;

pub use bitmap::{BitmapHeader, BitmapReader, DecodeError, PixelRow};
pub use config::{ConfigError, ConfigProvider, DeviceConfig, ImagePath};
pub use painter::{Painter, TickResult, TriggerInput};
pub use pipeline::{RenderError, RenderPipeline};
pub use storage::{BitmapFile, SliceFile, SliceStorage, Storage, StorageError};
pub use strip::{Attachment, LedOutput, OutputError, StripDriver, StripError};
pub use trigger::{
    DEFAULT_TRIGGER_TIMINGS, RenderOutcome, RenderSource, TriggerController, TriggerGate,
    TriggerState, TriggerTimings,
};

pub use color::Rgb;
pub use embassy_time::{Duration, Instant};
