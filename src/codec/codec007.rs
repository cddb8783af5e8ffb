//! Codec for chunk type 7 = FLI_SS2.

use std::cmp::min;
use std::io::{Cursor,Read};
use byteorder::LittleEndian as LE;
use byteorder::ReadBytesExt;

use crate::{FlicResult,RasterMut};
use crate::stream::skip_bytes;

/// Magic for a FLI_SS2 chunk - Word Aligned Delta Compression.
///
/// This format contains the differences between consecutive frames.
/// Animator Pro writes it for frames other than the first frame of an
/// animation.  It is like the line coded delta (LC) compression, but
/// word oriented.  This library reads it but never writes it.
///
/// The first word following the chunk header holds the number of
/// lines in the chunk, not counting skipped lines.  Each line starts
/// with zero or more control words followed by the packet count:
///
///   Bit 15 | Bit 14 | Meaning
///  :------:|:------:| ----------------------------------------------
///      0   |    0   | Packet count for the line; may be zero.
///      1   |    0   | Low byte goes into the last pixel of the line.
///      1   |    1   | Line skip count, given by the absolute value.
///
/// Each packet is a column skip byte and a type byte.  A positive type
/// is a count of words copied from the packet.  A negative type is
/// followed by one word which is replicated; its two bytes need not
/// be equal.
pub const FLI_SS2: u16 = 7;

/// Decode a FLI_SS2 chunk.
///
/// `dst` must already hold the previous frame.  A line count larger
/// than the image height is clamped.  Clamped line counts and packets
/// running past the end of the image are counted as clipped.
pub fn decode_fli_ss2(src: &[u8], dst: &mut RasterMut)
        -> FlicResult<usize> {
    let mut r = Cursor::new(src);
    let mut clipped = 0;
    let mut y = 0;

    let mut hh = r.read_u16::<LE>()? as usize;
    if hh > dst.h {
        hh = dst.h;
        clipped += 1;
    }

    for _ in 0..hh {
        let mut count = r.read_u16::<LE>()?;
        let mut last_pixel = None;

        while (count & (1 << 15)) != 0 {
            if (count & (1 << 14)) != 0 {
                // Skip lines.
                let nskip = -((count as i16) as i32) as usize;
                y = min(y + nskip, dst.h);
            } else {
                last_pixel = Some(count as u8);
            }

            count = r.read_u16::<LE>()?;
        }

        y = min(y, dst.h);
        let pos = &mut dst.buf[(dst.w * y)..];
        let n = pos.len();
        let mut x0 = 0;

        for _ in 0..count {
            let nskip = r.read_u8()? as usize;
            let signed_length = r.read_i8()? as i32;

            x0 = min(x0 + nskip, n);

            if signed_length >= 0 {
                let len = signed_length as usize;
                let words = min((n - x0) / 2, len);
                r.read_exact(&mut pos[x0..(x0 + 2 * words)])?;

                if words < len {
                    skip_bytes(&mut r, 2 * (len - words) as u64)?;
                    clipped += 1;
                }

                x0 += 2 * words;
            } else {
                let len = (-signed_length) as usize;
                let c0 = r.read_u8()?;
                let c1 = r.read_u8()?;

                let mut i = 0;
                while i < len && x0 + 1 < n {
                    pos[x0] = c0;
                    pos[x0 + 1] = c1;
                    x0 += 2;
                    i += 1;
                }

                if i < len {
                    clipped += 1;
                }
            }
        }

        if let Some(c) = last_pixel {
            if y < dst.h {
                dst.buf[dst.w * y + dst.w - 1] = c;
            }
        }

        y += 1;
    }

    Ok(clipped)
}

#[cfg(test)]
mod tests {
    use crate::{FlicError,Frame};
    use super::*;

    #[test]
    fn test_decode_fli_ss2() {
        let src = [
            0x02, 0x00, // hh 2
            0x02, 0x00, // count 2
            3, 5,       // skip 3, length 5
            0x01, 0x12, 0x23, 0x34, 0x45, 0x56, 0x67, 0x78, 0x89, 0x90,
            2, (-4i8) as u8,    // skip 2, length -4
            0xAB, 0xCD,
            0xFF, 0xFF, // skip 1 line
            0xEE, 0x80, // last pixel 0xEE
            0x00, 0x00, // count 0
        ];
        let expected = [
            0x00, 0x00, 0x00,
            0x01, 0x12, 0x23, 0x34, 0x45, 0x56, 0x67, 0x78, 0x89, 0x90,
            0x00, 0x00,
            0xAB, 0xCD, 0xAB, 0xCD, 0xAB, 0xCD, 0xAB, 0xCD,
        ];

        const SCREEN_W: usize = 320;
        const SCREEN_H: usize = 200;
        let mut frame = Frame::new(SCREEN_W, SCREEN_H);

        let res = decode_fli_ss2(&src, &mut frame.as_raster_mut());
        assert_eq!(res.expect("decode"), 0);
        assert_eq!(&frame.buf[0..23], &expected[..]);
        assert!(frame.buf[23..(SCREEN_W * 2 + SCREEN_W - 1)].iter().all(|&e| e == 0));
        assert_eq!(frame.buf[(SCREEN_W * 2) + (SCREEN_W - 1)], 0xEE);
    }

    #[test]
    fn test_decode_fli_ss2_odd_width() {
        let src = [
            0x02, 0x00, // hh 2
            0xFF, 0xFF, // skip 1 line
            0x07, 0x80, // last pixel 0x07
            0x01, 0x00, // count 1
            1, 1,       // skip 1, length 1
            0x01, 0x02,
            0x01, 0x00, // count 1
            0, (-2i8) as u8,    // skip 0, length -2
            0xAA, 0xBB ];

        let expected = [
            0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x01, 0x02, 0x00, 0x07,
            0xAA, 0xBB, 0xAA, 0xBB, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00 ];

        let mut frame = Frame::new(5, 4);
        let res = decode_fli_ss2(&src, &mut frame.as_raster_mut());
        assert_eq!(res.expect("decode"), 0);
        assert_eq!(&frame.buf[..], &expected[..]);
    }

    #[test]
    fn test_decode_fli_ss2_clamps_line_count() {
        let src = [
            0x09, 0x00, // hh 9
            0x00, 0x00, // count 0
            0x00, 0x00 ];

        let mut frame = Frame::new(4, 2);
        let res = decode_fli_ss2(&src, &mut frame.as_raster_mut());
        assert_eq!(res.expect("decode"), 1);
    }

    #[test]
    fn test_decode_fli_ss2_clips_replicate() {
        let src = [
            0x01, 0x00, // hh 1
            0x01, 0x00, // count 1
            0, (-2i8) as u8,    // skip 0, length -2
            0x05, 0x06 ];

        let mut frame = Frame::new(3, 1);
        let res = decode_fli_ss2(&src, &mut frame.as_raster_mut());
        assert_eq!(res.expect("decode"), 1);
        assert_eq!(&frame.buf[..], &[0x05, 0x06, 0x00]);
    }

    #[test]
    fn test_decode_fli_ss2_skip_past_bottom() {
        let src = [
            0x02, 0x00, // hh 2
            0x01, 0x00, // count 1
            0, 1,       // skip 0, length 1
            0x01, 0x02,
            0xFB, 0xFF, // skip 5 lines
            0xEE, 0x80, // last pixel 0xEE
            0x00, 0x00 ];

        let mut frame = Frame::new(4, 2);
        let res = decode_fli_ss2(&src, &mut frame.as_raster_mut());
        assert_eq!(res.expect("decode"), 0);
        assert_eq!(&frame.buf[..], &[0x01, 0x02, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_decode_fli_ss2_truncated() {
        let src = [ 0x01, 0x00, 0x01, 0x00, 3 ];
        let mut frame = Frame::new(4, 1);
        match decode_fli_ss2(&src, &mut frame.as_raster_mut()) {
            Err(FlicError::Io(ref e)) if e.kind() == ::std::io::ErrorKind::UnexpectedEof => (),
            other => panic!("unexpected {:?}", other),
        }
    }
}
