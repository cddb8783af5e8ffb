//! FLIC frame records.

use std::io::{Cursor,ErrorKind,Read,Seek,Write};
use byteorder::LittleEndian as LE;
use byteorder::{ReadBytesExt,WriteBytesExt};

use crate::{FlicError,FlicResult,FlicWarning,Frame,Header,Raster};
use crate::codec::*;
use crate::stream::{pad_to_even,seek_to,tell};

/// Magic for a FLIC pre-frame chunk - FLIC Prefix Chunk.
///
/// An optional prefix chunk may immediately follow the animation file
/// header.  It stores auxiliary data which is not involved in
/// playback, and starts with a 16-byte header shaped like a frame
/// header.  Readers skip it using its size field.
pub const FCID_PREFIX: u16 = 0xF100;

/// Magic for a FLIC frame - FLIC Frame Chunks.
///
/// Frame chunks contain the pixel and color data for the animation.
/// Each frame chunk starts with a 16-byte header that describes the
/// contents of the frame:
///
///   Offset | Length |   Name   | Description
///   ------:| ------:|:--------:| -----------------------------------
///        0 |      4 |   size   | The size of the frame chunk, including this header and all subordinate chunks that follow.
///        4 |      2 |   type   | Frame chunk identifier.
///        6 |      2 |  chunks  | Number of subordinate chunks in the frame chunk.
///        8 |      8 | reserved | Unused space, set to zeroes.
pub const FCID_FRAME: u16 = 0xF1FA;

/// Size of a FLIC frame header on disk.
pub const SIZE_OF_FLIC_FRAME: usize = 16;

/// Size of a chunk header on disk.
///
/// Each data chunk within a frame chunk is formatted as follows:
///
///   Offset | Length | Name | Description
///   ------:| ------:|:----:| ---------------------------------------
///        0 |      4 | size | The size of the chunk, including this header.
///        4 |      2 | type | Data type identifier.
///        6 | size-6 | data | The color or pixel data.
///
/// A frame with no chunks is identical to the previous frame.
pub const SIZE_OF_CHUNK: usize = 6;

/// How the encoder picks the pixel chunk for each frame.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub enum PixelStrategy {
    /// FLI_BRUN for the first frame and FLI_LC afterwards, falling
    /// back to FLI_BRUN and then FLI_COPY when a chunk would exceed a
    /// packet limit.
    Classic,

    /// FLI_BLACK for an all-black first frame, otherwise the smallest
    /// of FLI_LC, FLI_BRUN and FLI_COPY.
    Smallest,
}

impl Default for PixelStrategy {
    fn default() -> Self {
        PixelStrategy::Classic
    }
}

/*--------------------------------------------------------------*/

/// Read the next frame record and apply its chunks.
///
/// Records that are not frames, such as the prefix chunk, are
/// skipped.  `next` starts as a copy of `prev` and ends up holding
/// the decoded frame.  Chunks that overflowed the image are logged
/// and appended to `warnings`.  On success the stream is positioned
/// at the following record.
pub fn read_frame<R: Read + Seek>(
        r: &mut R, hdr: &Header, frame_num: usize,
        prev: &Frame, next: &mut Frame, warnings: &mut Vec<FlicWarning>)
        -> FlicResult<()> {
    let filesize = hdr.filesize();

    let (offset, size, num_chunks) = loop {
        let offset = tell(r)?;
        let size = r.read_u32::<LE>()?;
        let magic = r.read_u16::<LE>()?;
        let num_chunks = r.read_u16::<LE>()?;

        if size < SIZE_OF_FLIC_FRAME as u32
                || offset + size as u64 > filesize as u64 {
            return Err(FlicError::Corrupted("frame", offset, size, filesize));
        }

        if magic == FCID_FRAME {
            break (offset, size, num_chunks);
        }

        if magic == FCID_PREFIX {
            debug!("Skipping prefix chunk at {}, size {}", offset, size);
        } else {
            debug!("Skipping record type {:#06x} at {}, size {}", magic, offset, size);
        }
        seek_to(r, offset + size as u64)?;
    };

    debug!("Frame {} at {}, size {}, chunks {}", frame_num, offset, size, num_chunks);

    next.copy_from(prev);

    let image_size = next.w as u64 * next.h as u64;
    let mut pos = offset + SIZE_OF_FLIC_FRAME as u64;

    for _ in 0..num_chunks {
        seek_to(r, pos)?;
        let stored_size = r.read_u32::<LE>()?;
        let magic = r.read_u16::<LE>()?;
        let kind = ChunkKind::from_magic(magic);

        // Animator wrote FLI_COPY sizes as data + 4 instead of data + 6.
        let mut chunk_size = stored_size as u64;
        if kind == ChunkKind::Copy && chunk_size == image_size + 4 {
            warn!("frame {} - FLI_COPY has wrong size", frame_num);
            chunk_size = image_size + SIZE_OF_CHUNK as u64;
        }

        if chunk_size < SIZE_OF_CHUNK as u64
                || pos + chunk_size > filesize as u64 {
            return Err(FlicError::Corrupted("chunk", pos, stored_size, filesize));
        }

        match kind {
            ChunkKind::Mini => {
                debug!("frame {} - skipping FLI_MINI", frame_num);
            },
            ChunkKind::Unknown(magic) => {
                debug!("frame {} - skipping unrecognised chunk type {}", frame_num, magic);
            },
            _ => {
                let mut data = vec![0; (chunk_size - SIZE_OF_CHUNK as u64) as usize];
                r.read_exact(&mut data)?;

                if kind.modifies_palette() {
                    debug!("frame {} - palette update", frame_num);
                }

                // Packets reading past the chunk data.
                let clipped = match decode_chunk(kind, &data,
                        &prev.as_raster(), &mut next.as_raster_mut()) {
                    Err(FlicError::Io(ref e)) if e.kind() == ErrorKind::UnexpectedEof =>
                        return Err(FlicError::Corrupted("chunk", pos, stored_size, filesize)),
                    res => res?,
                };
                if clipped > 0 {
                    let warning = FlicWarning::Overflow {
                        frame: frame_num,
                        chunk: magic,
                        packets: clipped,
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            },
        }

        pos += chunk_size;
    }

    let expected = offset + size as u64;
    if pos != expected {
        debug!("frame {} - chunks end at {}, frame ends at {}", frame_num, pos, expected);
    }

    seek_to(r, expected)?;
    Ok(())
}

/*--------------------------------------------------------------*/

/// Write a frame record at the current position.
///
/// The record holds a palette chunk if the palette changed (always on
/// the first frame) and exactly one pixel chunk.  Returns the size of
/// the record.
pub fn write_frame<W: Write + Seek>(
        w: &mut W, hdr: &Header, strategy: PixelStrategy,
        prev: Option<&Frame>, next: &Frame)
        -> FlicResult<usize> {
    let prev = prev.map(|p| p.as_raster());
    let next = next.as_raster();

    let pal_chunk = match *hdr {
        Header::Fli(_) =>
            encode_chunk(FLI_COLOR64, |buf| encode_fli_color64(prev.as_ref(), &next, buf))?,
        Header::Flc(_) =>
            encode_chunk(FLI_COLOR256, |buf| encode_fli_color256(prev.as_ref(), &next, buf))?,
    };
    let pix_chunk = encode_pixel_chunk(strategy, prev.as_ref(), &next)?;

    let mut num_chunks = 1;
    let mut size = SIZE_OF_FLIC_FRAME + pix_chunk.len();
    let has_pal = pal_chunk.len() > SIZE_OF_CHUNK;
    if has_pal {
        num_chunks += 1;
        size += pal_chunk.len();
    }

    if size > ::std::u32::MAX as usize {
        return Err(FlicError::ExceededLimit);
    }

    w.write_u32::<LE>(size as u32)?;
    w.write_u16::<LE>(FCID_FRAME)?;
    w.write_u16::<LE>(num_chunks)?;
    w.write_all(&[0; 8])?;
    if has_pal {
        w.write_all(&pal_chunk)?;
    }
    w.write_all(&pix_chunk)?;

    Ok(size)
}

fn encode_pixel_chunk(strategy: PixelStrategy, prev: Option<&Raster>, next: &Raster)
        -> FlicResult<Vec<u8>> {
    match strategy {
        PixelStrategy::Classic => {
            if let Some(prev) = prev {
                match encode_chunk(FLI_LC, |buf| encode_fli_lc(prev, next, buf)) {
                    Err(FlicError::ExceededLimit) =>
                        debug!("FLI_LC exceeded packet limit, trying FLI_BRUN"),
                    res => return res,
                }
            }

            match encode_chunk(FLI_BRUN, |buf| encode_fli_brun(next, buf)) {
                Err(FlicError::ExceededLimit) =>
                    debug!("FLI_BRUN exceeded packet limit, using FLI_COPY"),
                res => return res,
            }

            encode_chunk(FLI_COPY, |buf| encode_fli_copy(next, buf))
        },

        PixelStrategy::Smallest => {
            if prev.is_none() && can_encode_fli_black(next) {
                return encode_chunk(FLI_BLACK, |_| Ok(0));
            }

            let mut best = encode_chunk(FLI_COPY, |buf| encode_fli_copy(next, buf))?;
            keep_smaller(encode_chunk(FLI_BRUN, |buf| encode_fli_brun(next, buf)), &mut best)?;
            if let Some(prev) = prev {
                keep_smaller(encode_chunk(FLI_LC, |buf| encode_fli_lc(prev, next, buf)), &mut best)?;
            }
            Ok(best)
        },
    }
}

fn keep_smaller(candidate: FlicResult<Vec<u8>>, best: &mut Vec<u8>)
        -> FlicResult<()> {
    match candidate {
        Ok(chunk) => {
            if chunk.len() <= best.len() {
                *best = chunk;
            }
            Ok(())
        },
        Err(FlicError::ExceededLimit) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Build a complete chunk in memory: header, body and pad byte.
///
/// `encode` writes the body and returns its length.  A chunk whose
/// body is empty is still returned; callers decide whether to keep
/// it.
fn encode_chunk<F>(magic: u16, encode: F)
        -> FlicResult<Vec<u8>>
        where F: FnOnce(&mut Cursor<Vec<u8>>) -> FlicResult<usize> {
    let mut buf = Cursor::new(Vec::new());

    // Reserve space for chunk.
    buf.write_all(&[0; SIZE_OF_CHUNK])?;

    let body_size = encode(&mut buf)?;
    let end = SIZE_OF_CHUNK + body_size;
    buf.get_mut().truncate(end);
    seek_to(&mut buf, end as u64)?;

    let size = pad_to_even(&mut buf, end)?;
    if size > ::std::u32::MAX as usize {
        return Err(FlicError::ExceededLimit);
    }

    seek_to(&mut buf, 0)?;
    buf.write_u32::<LE>(size as u32)?;
    buf.write_u16::<LE>(magic)?;
    Ok(buf.into_inner())
}
