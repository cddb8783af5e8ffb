//! Codec for chunk type 11 = FLI_COLOR64.

use std::io::{Seek,Write};

use crate::{FlicResult,Raster,RasterMut};
use super::palette::{decode_palette,encode_palette};

/// Magic for a FLI_COLOR64 chunk - 64-Level Color.
///
/// This chunk is identical to FLI_COLOR256 except that the values for
/// the red, green and blue components are in the range of 0-63
/// instead of 0-255.  Components are shifted left by two bits when
/// read and right by two bits when written, so the low two bits of an
/// 8-bit palette do not survive a FLI file.
///
/// This is the palette chunk written to FLI files.
pub const FLI_COLOR64: u16 = 11;

/// Decode a FLI_COLOR64 chunk.
pub fn decode_fli_color64(src: &[u8], prev: &Raster, dst: &mut RasterMut)
        -> FlicResult<usize> {
    decode_palette(src, prev.pal, dst.pal, 2)
}

/// Encode a FLI_COLOR64 chunk.
///
/// Returns zero if the palette did not change.
pub fn encode_fli_color64<W: Write + Seek>(
        prev: Option<&Raster>, next: &Raster, w: &mut W)
        -> FlicResult<usize> {
    encode_palette(prev.map(|p| p.pal), next.pal, 2, w)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use crate::Frame;
    use super::*;

    #[test]
    fn test_decode_fli_color64() {
        let src = [
            0x02, 0x00, // count 2
            1, 2,       // skip 1, copy 2
            0x0A, 0x0B, 0x0C, 0x1A, 0x1B, 0x1C,
            3, 1,       // skip 3, copy 1
            0x2A, 0x2B, 0x3F ];

        let expected = [
            0x11, 0x11, 0x11,
            0x28, 0x2C, 0x30, 0x68, 0x6C, 0x70,
            0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11,
            0xA8, 0xAC, 0xFC,
            0x00, 0x00, 0x00 ];

        let mut prev = Frame::new(4, 4);
        for e in prev.pal[0..18].iter_mut() {
            *e = 0x11;
        }
        let mut next = Frame::new(4, 4);

        let res = decode_fli_color64(&src, &prev.as_raster(), &mut next.as_raster_mut());
        assert_eq!(res.expect("decode"), 0);
        assert_eq!(&next.pal[0..24], &expected[..]);
    }

    #[test]
    fn test_encode_fli_color64_scales_down() {
        let prev = Frame::new(4, 4);
        let mut next = Frame::new(4, 4);
        next.pal[3..6].copy_from_slice(&[0xFC, 0x80, 0x04]);

        let mut enc = Cursor::new(Vec::new());
        let res = encode_fli_color64(Some(&prev.as_raster()), &next.as_raster(), &mut enc);
        assert_eq!(res.expect("encode"), 7);
        assert_eq!(&enc.get_ref()[..], &[0x01, 0x00, 1, 1, 0x3F, 0x20, 0x01]);

        let mut dec = Frame::new(4, 4);
        decode_fli_color64(enc.get_ref(), &prev.as_raster(), &mut dec.as_raster_mut())
            .expect("decode");
        assert_eq!(dec.pal, next.pal);
    }
}
