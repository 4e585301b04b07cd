use smart_leds::RGB8;

pub type Rgb = RGB8;

/// Color with all channels off
pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// Create an RGB color from a bitmap pixel triple
///
/// Bitmap pixels are stored blue, green, red.
#[inline]
pub const fn rgb_from_bgr(pixel: [u8; 3]) -> Rgb {
    Rgb {
        r: pixel[2],
        g: pixel[1],
        b: pixel[0],
    }
}
