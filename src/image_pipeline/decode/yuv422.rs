//! YUYV 4:2:2 to RGB888.
//!
//! Each 4-byte group `Y0 U Y1 V` carries two horizontally adjacent pixels that
//! share one chroma pair. Chroma is upsampled by duplication: group `n` of a
//! row feeds pixels `2n` and `2n + 1` of the same row. Since the width is
//! even, groups never straddle rows and the buffer can be walked flat.

use crate::image_pipeline::common::numeric::yuv_to_rgb;

pub(crate) fn yuyv_to_rgb888(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() / 4 * 6);
    for group in data.chunks_exact(4) {
        let (y0, u, y1, v) = (group[0], group[1], group[2], group[3]);
        out.extend_from_slice(&yuv_to_rgb(y0, u, v));
        out.extend_from_slice(&yuv_to_rgb(y1, u, v));
    }
    out
}
