//! Codec for chunk type 13 = FLI_BLACK.

use crate::{Raster,RasterMut};

/// Magic for a FLI_BLACK chunk - No Data.
///
/// This chunk has no data following the header.  All pixels in the
/// frame are set to color index 0.
pub const FLI_BLACK: u16 = 13;

/// Decode a FLI_BLACK chunk.
pub fn decode_fli_black(dst: &mut RasterMut) {
    for e in dst.buf.iter_mut() {
        *e = 0;
    }
}

/// True if every pixel is color index 0.
pub fn can_encode_fli_black(next: &Raster) -> bool {
    next.buf.iter().all(|&e| e == 0)
}

#[cfg(test)]
mod tests {
    use crate::Frame;
    use super::*;

    #[test]
    fn test_decode_fli_black() {
        let mut frame = Frame::new(3, 2);
        frame.buf.copy_from_slice(&[1, 2, 3, 4, 5, 6]);
        assert!(!can_encode_fli_black(&frame.as_raster()));

        decode_fli_black(&mut frame.as_raster_mut());
        assert_eq!(&frame.buf[..], &[0; 6]);
        assert!(can_encode_fli_black(&frame.as_raster()));
    }
}
