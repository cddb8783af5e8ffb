//! Packet grammar shared by the FLI_COLOR64 and FLI_COLOR256 chunks.
//!
//! The two chunk types only differ in the range of the stored
//! components: 0-63 for FLI_COLOR64, 0-255 for FLI_COLOR256.  `shift`
//! is the number of bits a stored component must be shifted left to
//! become an 8-bit component.

use std::cmp::min;
use std::io::{Cursor,Read,Seek,Write};
use byteorder::LittleEndian as LE;
use byteorder::{ReadBytesExt,WriteBytesExt};

use crate::{FlicError,FlicResult};
use crate::raster::SIZE_OF_PALETTE;
use crate::stream::{seek_to,skip_bytes,tell};
use super::{Group,GroupByEq};

/// Decode palette packets into `pal`, taking skipped entries from
/// `prev`.
///
/// Returns the number of packets clipped at the end of the palette.
pub fn decode_palette(src: &[u8], prev: &[u8], pal: &mut [u8], shift: u32)
        -> FlicResult<usize> {
    let mut r = Cursor::new(src);
    let mut idx0 = 0;
    let mut clipped = 0;

    let count = r.read_u16::<LE>()?;
    for _ in 0..count {
        let nskip = r.read_u8()? as usize;
        let ncopy = r.read_u8()? as usize;

        // A count of zero replaces the entire palette.
        if ncopy == 0 {
            r.read_exact(&mut pal[..SIZE_OF_PALETTE])?;
            scale_up(&mut pal[..SIZE_OF_PALETTE], shift);
            return Ok(clipped);
        }

        let start = min(idx0 + 3 * nskip, SIZE_OF_PALETTE);
        let end = min(start + 3 * ncopy, SIZE_OF_PALETTE);
        pal[idx0..start].copy_from_slice(&prev[idx0..start]);
        r.read_exact(&mut pal[start..end])?;
        scale_up(&mut pal[start..end], shift);

        if end - start < 3 * ncopy {
            skip_bytes(&mut r, (3 * ncopy - (end - start)) as u64)?;
            clipped += 1;
        }

        idx0 = end;
    }

    Ok(clipped)
}

/// Encode the palette of `next`.
///
/// Without a previous palette the whole palette is written as a
/// single packet.  Otherwise one packet is written per run of changed
/// entries, and nothing at all if the palettes are equal.
///
/// Returns the number of bytes written, zero if nothing was written.
pub fn encode_palette<W: Write + Seek>(
        prev: Option<&[u8]>, next: &[u8], shift: u32, w: &mut W)
        -> FlicResult<usize> {
    if next.len() != SIZE_OF_PALETTE {
        return Err(FlicError::BadInput);
    }

    let pos0 = tell(w)?;

    match prev {
        None => {
            w.write_u16::<LE>(1)?;
            w.write_u8(0)?; // skip 0
            w.write_u8(0)?; // copy 256
            write_scaled(&next[..], shift, w)?;
        },
        Some(prev) => {
            if prev.len() != SIZE_OF_PALETTE {
                return Err(FlicError::BadInput);
            }

            // Reserve space for count.
            w.write_u16::<LE>(0)?;

            let mut count = 0;
            for g in GroupByEq::new(prev.chunks(3), next.chunks(3))
                    .set_prepend_same_run()
                    .set_ignore_final_same_run() {
                match g {
                    Group::Same(_, nskip) => {
                        if nskip > ::std::u8::MAX as usize {
                            return Err(FlicError::ExceededLimit);
                        }
                        w.write_u8(nskip as u8)?;
                    },
                    Group::Diff(idx, ncopy) => {
                        // 256 wraps to 0, which means the whole palette.
                        w.write_u8(ncopy as u8)?;
                        write_scaled(&next[(3 * idx)..(3 * (idx + ncopy))], shift, w)?;
                        count += 1;
                    },
                }
            }

            if count == 0 {
                seek_to(w, pos0)?;
                return Ok(0);
            }

            let pos1 = tell(w)?;
            seek_to(w, pos0)?;
            w.write_u16::<LE>(count)?;
            seek_to(w, pos1)?;
        },
    }

    let pos1 = tell(w)?;
    Ok((pos1 - pos0) as usize)
}

fn scale_up(buf: &mut [u8], shift: u32) {
    if shift > 0 {
        for e in buf.iter_mut() {
            *e <<= shift;
        }
    }
}

fn write_scaled<W: Write>(buf: &[u8], shift: u32, w: &mut W)
        -> FlicResult<()> {
    if shift == 0 {
        w.write_all(buf)?;
    } else {
        let scaled: Vec<u8> = buf.iter().map(|&c| c >> shift).collect();
        w.write_all(&scaled)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use crate::raster::SIZE_OF_PALETTE;
    use super::*;

    #[test]
    fn test_decode_skips_from_prev() {
        let src = [
            0x01, 0x00, // count 1
            2, 1,       // skip 2, copy 1
            0x10, 0x20, 0x30 ];

        let prev = [0x55; SIZE_OF_PALETTE];
        let mut pal = [0; SIZE_OF_PALETTE];
        let res = decode_palette(&src, &prev, &mut pal, 0);
        assert_eq!(res.expect("decode"), 0);
        assert_eq!(&pal[0..6], &[0x55; 6]);
        assert_eq!(&pal[6..9], &[0x10, 0x20, 0x30]);
        assert_eq!(&pal[9..12], &[0; 3]);
    }

    #[test]
    fn test_decode_clamps_overflow() {
        let mut src = vec![
            0x01, 0x00, // count 1
            255, 2 ];   // skip 255, copy 2
        src.extend_from_slice(&[1, 2, 3, 4, 5, 6]);

        let prev = [0; SIZE_OF_PALETTE];
        let mut pal = [0; SIZE_OF_PALETTE];
        let res = decode_palette(&src, &prev, &mut pal, 0);
        assert_eq!(res.expect("decode"), 1);
        assert_eq!(&pal[765..768], &[1, 2, 3]);
    }

    #[test]
    fn test_encode_unchanged_writes_nothing() {
        let pal = [0x40; SIZE_OF_PALETTE];
        let mut enc = Cursor::new(Vec::new());

        let res = encode_palette(Some(&pal), &pal, 2, &mut enc);
        assert_eq!(res.expect("encode"), 0);
        assert_eq!(enc.position(), 0);
    }

    #[test]
    fn test_encode_all_changed_uses_full_packet() {
        let prev = [0; SIZE_OF_PALETTE];
        let next = [0xFF; SIZE_OF_PALETTE];
        let mut enc = Cursor::new(Vec::new());

        let res = encode_palette(Some(&prev), &next, 0, &mut enc);
        assert_eq!(res.expect("encode"), 4 + SIZE_OF_PALETTE);
        assert_eq!(&enc.get_ref()[0..4], &[1, 0, 0, 0]);

        let mut pal = [0; SIZE_OF_PALETTE];
        decode_palette(enc.get_ref(), &prev, &mut pal, 0).expect("decode");
        assert_eq!(&pal[..], &next[..]);
    }
}
