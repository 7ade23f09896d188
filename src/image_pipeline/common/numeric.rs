//! Integer arithmetic shared by the pixel decoders.

/// Clamps a signed intermediate into the 8-bit channel range.
#[inline]
pub fn clip8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// BT.601 studio-swing YCbCr to RGB in 8.8 fixed point.
///
/// All intermediates are `i32`; `>>` on a signed integer is an arithmetic
/// shift, so negative sums stay negative until `clip8` clamps them.
#[inline]
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = y as i32 - 16;
    let d = u as i32 - 128;
    let e = v as i32 - 128;

    [
        clip8((298 * c + 409 * e + 128) >> 8),
        clip8((298 * c - 100 * d - 208 * e + 128) >> 8),
        clip8((298 * c + 516 * d + 128) >> 8),
    ]
}
