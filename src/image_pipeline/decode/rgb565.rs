use crate::image_pipeline::decode::types::Rgb565Expansion;

/// Widens little-endian RGB565 samples to packed RGB888.
///
/// `data` must hold whole samples; the dispatcher checks the length first.
pub(crate) fn rgb565_to_rgb888(data: &[u8], expansion: Rgb565Expansion) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() / 2 * 3);
    for sample in data.chunks_exact(2) {
        let word = u16::from_le_bytes([sample[0], sample[1]]);
        out.extend_from_slice(&expansion.expand(word));
    }
    out
}
