//! Codec for chunk type 15 = FLI_BRUN.

use std::cmp::min;
use std::io::{Cursor,Read,Seek,Write};
use byteorder::{ReadBytesExt,WriteBytesExt};

use crate::{FlicError,FlicResult,Raster,RasterMut};
use crate::stream::{seek_to,skip_bytes,tell};
use super::{Group,GroupByValue};

/// Magic for a FLI_BRUN chunk - Byte Run Length Compression.
///
/// This chunk contains the entire image in a compressed format.
/// Usually this chunk is used in the first frame of an animation.
///
/// The data is organized in lines.  Each line contains packets of
/// compressed pixels.  The first line is at the top of the animation,
/// followed by subsequent lines moving downward.  The number of lines
/// in this chunk is given by the height of the animation.
///
/// The first byte of each line is a count of packets in the line.
///
/// Each packet consist of a type/size byte, followed by one or more
/// pixels.  If the packet type is negative it is a count of pixels to
/// be copied from the packet to the animation image.  If the packet
/// type is positive it contains a single pixel which is to be
/// replicated; the absolute value of the packet type is the number of
/// times the pixel is to be replicated.
pub const FLI_BRUN: u16 = 15;

/// Shortest run of equal pixels that is written as a replicate packet.
const MIN_REPEAT_RUN: usize = 3;

/// Longest run written in a single packet.
const MAX_RUN: usize = 120;

/// Decode a FLI_BRUN chunk.
///
/// A packet may run past the end of its line into the following
/// lines, but never past the end of the image; such packets are
/// clipped and counted.
pub fn decode_fli_brun(src: &[u8], dst: &mut RasterMut)
        -> FlicResult<usize> {
    let mut r = Cursor::new(src);
    let mut clipped = 0;

    for y in 0..dst.h {
        let count = r.read_u8()?;
        let pos = &mut dst.buf[(dst.w * y)..];
        let n = pos.len();
        let mut x0 = 0;

        for _ in 0..count {
            let signed_length = r.read_i8()? as i32;

            if signed_length < 0 {
                let len = (-signed_length) as usize;
                let end = min(x0 + len, n);
                r.read_exact(&mut pos[x0..end])?;

                if x0 + len > n {
                    skip_bytes(&mut r, (x0 + len - n) as u64)?;
                    clipped += 1;
                }

                x0 = end;
            } else {
                let len = signed_length as usize;
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

/// Encode a FLI_BRUN chunk.
///
/// Runs of three or more equal pixels become replicate packets,
/// everything in between is gathered into literal packets.  Packets
/// never cover more than 120 pixels.
///
/// Fails with `ExceededLimit` if a line needs more than 255 packets.
pub fn encode_fli_brun<W: Write + Seek>(next: &Raster, w: &mut W)
        -> FlicResult<usize> {
    if next.w == 0 {
        return Err(FlicError::BadInput);
    }

    let pos0 = tell(w)?;

    for row in next.buf.chunks(next.w) {
        let pos1 = tell(w)?;
        let mut count = 0;
        let mut lit_start = 0;
        let mut lit_len = 0;

        // Reserve space for count.
        w.write_u8(0)?;

        for g in GroupByValue::new(row) {
            let (idx, len) = match g {
                Group::Same(idx, len) => (idx, len),
                Group::Diff(..) => unreachable!(),
            };

            if len >= MIN_REPEAT_RUN {
                count += write_literal(&row[lit_start..(lit_start + lit_len)], w)?;
                lit_len = 0;
                count += write_repeat(row[idx], len, w)?;
            } else {
                if lit_len == 0 {
                    lit_start = idx;
                }
                lit_len += len;

                if lit_len >= MAX_RUN {
                    count += write_literal(&row[lit_start..(lit_start + MAX_RUN)], w)?;
                    lit_start += MAX_RUN;
                    lit_len -= MAX_RUN;
                }
            }
        }

        count += write_literal(&row[lit_start..(lit_start + lit_len)], w)?;

        if count > ::std::u8::MAX as usize {
            return Err(FlicError::ExceededLimit);
        }

        let pos2 = tell(w)?;
        seek_to(w, pos1)?;
        w.write_u8(count as u8)?;
        seek_to(w, pos2)?;
    }

    let pos1 = tell(w)?;
    Ok((pos1 - pos0) as usize)
}

/// Write literal packets for `buf`.  Returns the number of packets.
fn write_literal<W: Write>(buf: &[u8], w: &mut W)
        -> FlicResult<usize> {
    let mut count = 0;
    for packet in buf.chunks(MAX_RUN) {
        w.write_i8(-(packet.len() as i32) as i8)?;
        w.write_all(packet)?;
        count += 1;
    }
    Ok(count)
}

/// Write replicate packets for `len` copies of `c`.  Returns the
/// number of packets.
fn write_repeat<W: Write>(c: u8, len: usize, w: &mut W)
        -> FlicResult<usize> {
    let mut len = len;
    let mut count = 0;
    while len > 0 {
        let l = min(len, MAX_RUN);
        w.write_i8(l as i8)?;
        w.write_u8(c)?;

        len -= l;
        count += 1;
    }
    Ok(count)
}
