//! Stream positioning helpers.
//!
//! Fixed-width little-endian reads and writes go through byteorder's
//! `ReadBytesExt` and `WriteBytesExt`; a short read or write surfaces
//! as `FlicError::Io`.  The helpers here cover the seeking that the
//! header and frame codecs need around those reads and writes.

use std::io::{Read,Seek,SeekFrom,Write};
use byteorder::WriteBytesExt;

use crate::FlicResult;

/// Current stream position.
pub fn tell<S: Seek>(s: &mut S)
        -> FlicResult<u64> {
    Ok(s.seek(SeekFrom::Current(0))?)
}

/// Move to an absolute position.
pub fn seek_to<S: Seek>(s: &mut S, pos: u64)
        -> FlicResult<()> {
    s.seek(SeekFrom::Start(pos))?;
    Ok(())
}

/// Total length of the stream.  The position is restored afterwards.
pub fn stream_len<S: Seek>(s: &mut S)
        -> FlicResult<u64> {
    let pos = tell(s)?;
    let len = s.seek(SeekFrom::End(0))?;
    seek_to(s, pos)?;
    Ok(len)
}

/// Skip `n` bytes of input without interpreting them.
pub fn skip_bytes<R: Read + Seek>(r: &mut R, n: u64)
        -> FlicResult<()> {
    if n > 0 {
        r.seek(SeekFrom::Current(n as i64))?;
    }
    Ok(())
}

/// Write a single zero byte if `len` is odd, so that the next record
/// starts on an even offset.  Returns the padded length.
pub fn pad_to_even<W: Write>(w: &mut W, len: usize)
        -> FlicResult<usize> {
    if len % 2 == 1 {
        w.write_u8(0)?;
        Ok(len + 1)
    } else {
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use super::*;

    #[test]
    fn test_stream_len_keeps_position() {
        let mut c = Cursor::new(vec![0u8; 10]);
        seek_to(&mut c, 3).expect("seek");
        assert_eq!(stream_len(&mut c).expect("len"), 10);
        assert_eq!(tell(&mut c).expect("tell"), 3);
    }

    #[test]
    fn test_pad_to_even() {
        let mut c = Cursor::new(Vec::new());
        assert_eq!(pad_to_even(&mut c, 4).expect("pad"), 4);
        assert!(c.get_ref().is_empty());
        assert_eq!(pad_to_even(&mut c, 5).expect("pad"), 6);
        assert_eq!(&c.get_ref()[..], &[0]);
    }
}
