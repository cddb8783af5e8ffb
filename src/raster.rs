//! Raster implementation.

use crate::{FlicError,FlicResult};

/// Number of bytes in a palette: 256 RGB triples.
pub const SIZE_OF_PALETTE: usize = 3 * 256;

/// Read-only view of a screen buffer and its palette.
pub struct Raster<'a> {
    pub w: usize,
    pub h: usize,
    pub buf: &'a [u8],
    pub pal: &'a [u8],
}

/// Mutable view of a screen buffer and its palette.
pub struct RasterMut<'a> {
    pub w: usize,
    pub h: usize,
    pub buf: &'a mut [u8],
    pub pal: &'a mut [u8],
}

/// An owned frame: row-major indexed pixels plus a 768-byte palette.
///
/// The decoder and encoder each keep two of these, the current frame
/// and the previous one, and swap them after every frame.
#[derive(Clone,Debug,Eq,PartialEq)]
pub struct Frame {
    pub w: usize,
    pub h: usize,
    pub buf: Vec<u8>,
    pub pal: Vec<u8>,
}

impl<'a> Raster<'a> {
    /// Wrap a screen buffer and palette.
    ///
    /// # Examples
    ///
    /// ```
    /// const SCREEN_W: usize = 320;
    /// const SCREEN_H: usize = 200;
    /// let buf = [0; SCREEN_W * SCREEN_H];
    /// let pal = [0; flicodec::SIZE_OF_PALETTE];
    ///
    /// flicodec::Raster::new(SCREEN_W, SCREEN_H, &buf, &pal).expect("raster");
    /// ```
    pub fn new(w: usize, h: usize, buf: &'a [u8], pal: &'a [u8])
            -> FlicResult<Self> {
        if buf.len() != w * h || pal.len() != SIZE_OF_PALETTE {
            return Err(FlicError::WrongResolution(w, h));
        }

        Ok(Raster { w, h, buf, pal })
    }
}

impl<'a> RasterMut<'a> {
    /// Wrap a mutable screen buffer and palette.
    pub fn new(w: usize, h: usize, buf: &'a mut [u8], pal: &'a mut [u8])
            -> FlicResult<Self> {
        if buf.len() != w * h || pal.len() != SIZE_OF_PALETTE {
            return Err(FlicError::WrongResolution(w, h));
        }

        Ok(RasterMut { w, h, buf, pal })
    }
}

impl Frame {
    /// Allocate a black frame with an all-black palette.
    pub fn new(w: usize, h: usize) -> Self {
        Frame {
            w,
            h,
            buf: vec![0; w * h],
            pal: vec![0; SIZE_OF_PALETTE],
        }
    }

    pub fn as_raster(&self) -> Raster<'_> {
        Raster { w: self.w, h: self.h, buf: &self.buf, pal: &self.pal }
    }

    pub fn as_raster_mut(&mut self) -> RasterMut<'_> {
        RasterMut { w: self.w, h: self.h, buf: &mut self.buf, pal: &mut self.pal }
    }

    /// Overwrite this frame's pixels and palette with another frame's.
    pub fn copy_from(&mut self, other: &Frame) {
        self.buf.copy_from_slice(&other.buf);
        self.pal.copy_from_slice(&other.pal);
    }

    /// Copy caller-supplied pixels and palette into this frame.
    pub fn load(&mut self, buf: &[u8], pal: &[u8])
            -> FlicResult<()> {
        if buf.len() != self.buf.len() || pal.len() != SIZE_OF_PALETTE {
            return Err(FlicError::WrongResolution(self.w, self.h));
        }

        self.buf.copy_from_slice(buf);
        self.pal.copy_from_slice(pal);
        Ok(())
    }

    /// Copy this frame out to caller-supplied buffers.
    pub fn store(&self, buf: &mut [u8], pal: &mut [u8])
            -> FlicResult<()> {
        if buf.len() != self.buf.len() || pal.len() != SIZE_OF_PALETTE {
            return Err(FlicError::WrongResolution(self.w, self.h));
        }

        buf.copy_from_slice(&self.buf);
        pal.copy_from_slice(&self.pal);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_rejects_wrong_size() {
        let buf = [0; 10];
        let pal = [0; SIZE_OF_PALETTE];
        assert!(Raster::new(4, 4, &buf, &pal).is_err());
        assert!(Raster::new(5, 2, &buf, &pal).is_ok());
        assert!(Raster::new(5, 2, &buf, &pal[..3]).is_err());
    }

    #[test]
    fn test_frame_store_load() {
        let mut frame = Frame::new(2, 2);
        let pal = [7; SIZE_OF_PALETTE];
        frame.load(&[1, 2, 3, 4], &pal).expect("load");

        let mut buf = [0; 4];
        let mut pal2 = [0; SIZE_OF_PALETTE];
        frame.store(&mut buf, &mut pal2).expect("store");
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(&pal2[..], &pal[..]);

        let mut small = [0; 3];
        assert!(frame.store(&mut small, &mut pal2).is_err());
    }
}
