/// Grey RGB888 from the luma samples of a YUYV buffer; chroma bytes are skipped.
pub(crate) fn yuyv_luma_to_rgb888(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() / 2 * 3);
    for sample in data.chunks_exact(2) {
        let y = sample[0];
        out.extend_from_slice(&[y, y, y]);
    }
    out
}
