//! Codec for chunk type 12 = FLI_LC.

use std::cmp::min;
use std::io::{Cursor,Read,Seek,Write};
use byteorder::LittleEndian as LE;
use byteorder::{ReadBytesExt,WriteBytesExt};

use crate::{FlicError,FlicResult,Raster,RasterMut};
use crate::stream::{seek_to,skip_bytes,tell};

/// Magic for a FLI_LC chunk - Byte Aligned Delta Compression.
///
/// This chunk contains the differences between the previous frame and
/// this frame.  It is the delta chunk written to both FLI and FLC
/// files by this library.
///
/// The first 16-bit word following the chunk header contains the
/// position of the first line in the chunk.  This is a count of lines
/// (down from the top of the image) which are unchanged from the
/// prior frame.  The second 16-bit word contains the number of lines
/// in the chunk.  The data for the lines follows these two words.
///
/// Each line begins with a byte holding the number of packets for the
/// line.
///
/// Each packet consists of a single byte column skip, followed by a
/// packet type/size byte.  If the packet type is positive it is a
/// count of pixels to be copied from the packet to the animation
/// image.  If the packet type is negative it contains a single pixel
/// which is to be replicated; the absolute value of the packet type
/// gives the number of times the pixel is to be replicated.
///
/// # Note
///
/// The negative/positive meaning of the packet type bytes in LC
/// compression is reversed from that used in BRUN compression.
pub const FLI_LC: u16 = 12;

/// Shortest run of equal pixels that is written as a replicate packet.
const MIN_REPEAT_RUN: usize = 3;

/// Shortest run of unchanged pixels that ends a literal packet.
const MIN_SKIP_RUN: usize = 2;

/// Longest run written in a single packet.
const MAX_RUN: usize = 120;

/// Decode a FLI_LC chunk.
///
/// `dst` must already hold the previous frame.  A line range that does
/// not fit inside the image leaves `dst` unchanged and counts as one
/// clipped packet.  Packets running past the end of the image are
/// clipped and counted.
pub fn decode_fli_lc(src: &[u8], dst: &mut RasterMut)
        -> FlicResult<usize> {
    let mut r = Cursor::new(src);
    let y0 = r.read_u16::<LE>()? as usize;
    let hh = r.read_u16::<LE>()? as usize;

    if hh > dst.h || dst.h - hh < y0 {
        return Ok(1);
    }

    let mut clipped = 0;

    for y in y0..(y0 + hh) {
        let count = r.read_u8()?;
        let pos = &mut dst.buf[(dst.w * y)..];
        let n = pos.len();
        let mut x0 = 0;

        for _ in 0..count {
            let nskip = r.read_u8()? as usize;
            let signed_length = r.read_i8()? as i32;

            x0 = min(x0 + nskip, n);

            if signed_length >= 0 {
                let len = signed_length as usize;
                let end = min(x0 + len, n);
                r.read_exact(&mut pos[x0..end])?;

                if x0 + len > n {
                    skip_bytes(&mut r, (x0 + len - n) as u64)?;
                    clipped += 1;
                }

                x0 = end;
            } else {
                let len = (-signed_length) as usize;
                let end = min(x0 + len, n);
                let c = r.read_u8()?;
                for e in &mut pos[x0..end] {
                    *e = c;
                }

                if x0 + len > n {
                    clipped += 1;
                }

                x0 = end;
            }
        }
    }

    Ok(clipped)
}

/// Encode a FLI_LC chunk.
///
/// Only the lines between the first and last changed lines are
/// written.  Two identical frames produce a chunk with no lines.
///
/// Fails with `ExceededLimit` if a line needs more than 255 packets.
pub fn encode_fli_lc<W: Write + Seek>(prev: &Raster, next: &Raster, w: &mut W)
        -> FlicResult<usize> {
    if next.w == 0 {
        return Err(FlicError::BadInput);
    }
    if prev.w != next.w || prev.h != next.h {
        return Err(FlicError::WrongResolution(prev.w, prev.h));
    }
    if next.h > ::std::u16::MAX as usize {
        return Err(FlicError::ExceededLimit);
    }

    let width = next.w;
    let pos0 = tell(w)?;

    let y0 = prev.buf.chunks(width).zip(next.buf.chunks(width))
        .take_while(|&(a, b)| a == b)
        .count();

    let (y0, hh) = if y0 >= next.h {
        (0, 0)
    } else {
        let y1 = prev.buf.chunks(width).rev().zip(next.buf.chunks(width).rev())
            .take_while(|&(a, b)| a == b)
            .count();
        (y0, next.h - y0 - y1)
    };

    w.write_u16::<LE>(y0 as u16)?;
    w.write_u16::<LE>(hh as u16)?;

    for y in y0..(y0 + hh) {
        let start = width * y;
        let end = start + width;
        encode_line(&prev.buf[start..end], &next.buf[start..end], w)?;
    }

    let pos1 = tell(w)?;
    Ok((pos1 - pos0) as usize)
}

fn encode_line<W: Write + Seek>(old: &[u8], new: &[u8], w: &mut W)
        -> FlicResult<()> {
    let width = new.len();
    let pos1 = tell(w)?;
    let mut count = 0;
    let mut x0 = 0;

    // Reserve space for count.
    w.write_u8(0)?;

    while x0 < width {
        let mut nskip = 0;
        while x0 < width && old[x0] == new[x0] && nskip < ::std::u8::MAX as usize {
            x0 += 1;
            nskip += 1;
        }

        if x0 >= width {
            break;
        }

        w.write_u8(nskip as u8)?;

        let c = new[x0];
        let run = new[x0..].iter().take(MAX_RUN).take_while(|&&x| x == c).count();
        if run >= MIN_REPEAT_RUN {
            w.write_i8(-(run as i32) as i8)?;
            w.write_u8(c)?;
            x0 += run;
        } else {
            let len = literal_len(old, new, x0);
            w.write_i8(len as i8)?;
            w.write_all(&new[x0..(x0 + len)])?;
            x0 += len;
        }

        count += 1;
    }

    if count > ::std::u8::MAX as usize {
        return Err(FlicError::ExceededLimit);
    }

    let pos2 = tell(w)?;
    seek_to(w, pos1)?;
    w.write_u8(count as u8)?;
    seek_to(w, pos2)?;
    Ok(())
}

/// Length of the literal packet starting at `x0`.  The packet ends
/// where a skip or a replicate packet would be cheaper.
fn literal_len(old: &[u8], new: &[u8], x0: usize) -> usize {
    let width = new.len();
    let mut len = 1;

    while len < MAX_RUN && x0 + len < width {
        let x = x0 + len;

        let same = old[x..].iter().zip(&new[x..])
            .take_while(|&(a, b)| a == b)
            .count();
        if same >= MIN_SKIP_RUN || x + same >= width {
            break;
        }

        let c = new[x];
        let run = new[x..].iter().take(MIN_REPEAT_RUN).take_while(|&&e| e == c).count();
        if run >= MIN_REPEAT_RUN {
            break;
        }

        len += 1;
    }

    len
}
