#![allow(dead_code)]

use embassy_time::Instant;
use myrtio_light_painter::{LedOutput, OutputError, Rgb};

/// Offset of pixel data in bitmaps built by [`bitmap`]
pub const PIXEL_DATA_OFFSET: u32 = 54;

/// Build a 24-bit uncompressed bitmap
///
/// `rows` are given in file order, each pixel as `(r, g, b)`.
pub fn bitmap(width: i32, height: i32, rows: &[&[(u8, u8, u8)]]) -> Vec<u8> {
    let stride = ((width as usize) * 3 + 3) & !3;
    let mut data = header(width, height, 1, 24, 0);
    for row in rows {
        let start = data.len();
        for &(r, g, b) in *row {
            data.extend_from_slice(&[b, g, r]);
        }
        data.resize(start + stride, 0);
    }
    data
}

/// Build a bitmap filled with a single color
pub fn solid(width: i32, height: i32, color: (u8, u8, u8)) -> Vec<u8> {
    let row = vec![color; width as usize];
    let rows: Vec<&[(u8, u8, u8)]> = (0..height.unsigned_abs()).map(|_| row.as_slice()).collect();
    bitmap(width, height, &rows)
}

/// Build a 54-byte header with arbitrary format fields
pub fn header(width: i32, height: i32, planes: u16, bpp: u16, compression: u32) -> Vec<u8> {
    let stride = ((width.max(0) as u32) * 3 + 3) & !3;
    let image_size = stride * height.unsigned_abs();
    let mut data = Vec::with_capacity(54 + image_size as usize);
    data.extend_from_slice(b"BM");
    data.extend_from_slice(&(PIXEL_DATA_OFFSET + image_size).to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&PIXEL_DATA_OFFSET.to_le_bytes());
    data.extend_from_slice(&40u32.to_le_bytes());
    data.extend_from_slice(&width.to_le_bytes());
    data.extend_from_slice(&height.to_le_bytes());
    data.extend_from_slice(&planes.to_le_bytes());
    data.extend_from_slice(&bpp.to_le_bytes());
    data.extend_from_slice(&compression.to_le_bytes());
    data.resize(PIXEL_DATA_OFFSET as usize, 0);
    data
}

/// Output that records every hardware interaction
#[derive(Debug, Default)]
pub struct RecordingOutput {
    pub attaches: Vec<(u8, usize)>,
    pub writes: Vec<(Instant, Vec<Rgb>)>,
    pub detaches: usize,
    pub attached: bool,
    pub fail_attach: bool,
}

impl RecordingOutput {
    pub fn failing() -> Self {
        Self {
            fail_attach: true,
            ..Self::default()
        }
    }

    pub fn frames(&self) -> Vec<Vec<Rgb>> {
        self.writes.iter().map(|(_, frame)| frame.clone()).collect()
    }

    pub fn last_frame(&self) -> Option<&[Rgb]> {
        self.writes.last().map(|(_, frame)| frame.as_slice())
    }
}

impl LedOutput for RecordingOutput {
    fn attach(&mut self, pin: u8, length: usize) -> Result<(), OutputError> {
        self.attaches.push((pin, length));
        if self.fail_attach {
            return Err(OutputError);
        }
        self.attached = true;
        Ok(())
    }

    fn write(&mut self, colors: &[Rgb]) {
        assert!(self.attached, "write on detached output");
        self.writes.push((Instant::now(), colors.to_vec()));
    }

    fn detach(&mut self) {
        self.attached = false;
        self.detaches += 1;
    }
}

pub fn is_blank(frame: &[Rgb]) -> bool {
    frame.iter().all(|pixel| *pixel == Rgb::default())
}
