//! Codec for chunk type 16 = FLI_COPY.

use std::cmp::min;
use std::io::Write;

use crate::{FlicResult,Raster,RasterMut};

/// Magic for a FLI_COPY chunk - No Compression.
///
/// This chunk contains an uncompressed image of the frame.  The
/// number of pixels following the chunk header is exactly the width
/// of the animation times the height of the animation.  The data
/// starts in the upper left corner with pixels copied from left to
/// right and then top to bottom.  This type of chunk is created when
/// the preferred compression method generates more data than the
/// uncompressed frame image; a relatively rare situation.
pub const FLI_COPY: u16 = 16;

/// Decode a FLI_COPY chunk.
///
/// A short chunk fills as much of the image as it covers and counts
/// as one clipped packet.
pub fn decode_fli_copy(src: &[u8], dst: &mut RasterMut)
        -> FlicResult<usize> {
    let len = min(src.len(), dst.buf.len());
    dst.buf[..len].copy_from_slice(&src[..len]);

    if len < dst.buf.len() {
        Ok(1)
    } else {
        Ok(0)
    }
}

/// Encode a FLI_COPY chunk.
pub fn encode_fli_copy<W: Write>(next: &Raster, w: &mut W)
        -> FlicResult<usize> {
    w.write_all(next.buf)?;
    Ok(next.buf.len())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use crate::Frame;
    use super::*;

    #[test]
    fn test_decode_fli_copy() {
        let src = [1, 2, 3, 4, 5, 6];
        let mut frame = Frame::new(3, 2);

        let res = decode_fli_copy(&src, &mut frame.as_raster_mut());
        assert_eq!(res.expect("decode"), 0);
        assert_eq!(&frame.buf[..], &src[..]);
    }

    #[test]
    fn test_decode_fli_copy_short() {
        let mut frame = Frame::new(3, 2);
        frame.buf.copy_from_slice(&[9; 6]);

        let res = decode_fli_copy(&[1, 2], &mut frame.as_raster_mut());
        assert_eq!(res.expect("decode"), 1);
        assert_eq!(&frame.buf[..], &[1, 2, 9, 9, 9, 9]);
    }

    #[test]
    fn test_encode_fli_copy() {
        let mut frame = Frame::new(2, 2);
        frame.buf.copy_from_slice(&[4, 3, 2, 1]);

        let mut enc = Cursor::new(Vec::new());
        let res = encode_fli_copy(&frame.as_raster(), &mut enc);
        assert_eq!(res.expect("encode"), 4);
        assert_eq!(&enc.get_ref()[..], &[4, 3, 2, 1]);
    }
}
