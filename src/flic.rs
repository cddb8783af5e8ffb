//! FLIC implementation.

use std::cmp::min;
use std::io::{ErrorKind,Read,Seek,Write};
use std::mem;

use crate::{FlicError,FlicResult,FlicWarning,Frame,Header,PixelStrategy};
use crate::{SIZE_OF_FLIC_HEADER,SIZE_OF_PALETTE};
use crate::frame::{read_frame,write_frame};
use crate::header::{read_header,write_header};
use crate::stream::{seek_to,tell};

/// FLIC animation reader over a seekable byte stream.
///
/// Frames are decoded sequentially.  The decoder owns the current and
/// previous frame and swaps them after every frame.
pub struct FlicDecoder<R> {
    r: R,
    hdr: Header,
    prev: Frame,
    next: Frame,

    // Number of the last decoded frame, 0 before the first.
    frame: usize,
    from: usize,
    to: usize,
    done: bool,

    warnings: Vec<FlicWarning>,
}

/// FLIC animation writer over a seekable byte stream.
///
/// The header is written by `finish`.
pub struct FlicEncoder<W: Write + Seek> {
    w: Option<W>,
    hdr: Header,
    strategy: PixelStrategy,
    prev: Frame,
    next: Frame,
    frame_count: u16,
}

/*--------------------------------------------------------------*/

impl<R: Read + Seek> FlicDecoder<R> {
    /// Open a FLIC stream and decode every frame in it.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    ///
    /// if let Ok(file) = File::open("ex.fli") {
    ///     let mut flic = flicodec::FlicDecoder::open(file).expect("open");
    ///     let w = flic.header().width() as usize;
    ///     let h = flic.header().height() as usize;
    ///     let mut buf = vec![0; w * h];
    ///     let mut pal = [0; flicodec::SIZE_OF_PALETTE];
    ///
    ///     while let Ok(true) = flic.decode_next_frame(&mut buf, &mut pal) {
    ///         // ...
    ///     }
    /// }
    /// ```
    pub fn open(r: R)
            -> FlicResult<Self> {
        Self::open_range(r, 1, ::std::usize::MAX)
    }

    /// Open a FLIC stream and decode frames `from` to `to`, counting
    /// from 1 and inclusive.  `to` is clamped to the frame count.
    ///
    /// Frames before `from` are decoded and discarded since the
    /// format cannot be seeked by frame.
    pub fn open_range(mut r: R, from: usize, to: usize)
            -> FlicResult<Self> {
        let mut warnings = Vec::new();
        let hdr = read_header(&mut r, &mut warnings)?;

        let to = min(to, hdr.frame_count() as usize);
        if from == 0 || from > to {
            return Err(FlicError::BadInput);
        }

        let w = hdr.width() as usize;
        let h = hdr.height() as usize;

        Ok(FlicDecoder {
            r,
            hdr,
            prev: Frame::new(w, h),
            next: Frame::new(w, h),
            frame: 0,
            from,
            to,
            done: false,
            warnings,
        })
    }

    /// The header, after repairs.
    pub fn header(&self) -> &Header {
        &self.hdr
    }

    /// Number of the last decoded frame, counting from 1.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Warnings collected so far.
    pub fn warnings(&self) -> &[FlicWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<FlicWarning> {
        mem::replace(&mut self.warnings, Vec::new())
    }

    /// Decode the next frame into the caller's buffers.
    ///
    /// Returns false at the end of the requested range.  A failure on
    /// a frame after the first requested one ends the range early and
    /// is reported through `warnings` instead.
    pub fn decode_next_frame(&mut self, buf: &mut [u8], pal: &mut [u8])
            -> FlicResult<bool> {
        if buf.len() != self.next.buf.len() || pal.len() != SIZE_OF_PALETTE {
            return Err(FlicError::WrongResolution(self.next.w, self.next.h));
        }

        match self.advance()? {
            Some(frame) => {
                frame.store(buf, pal)?;
                Ok(true)
            },
            None => Ok(false),
        }
    }

    /// Decode the rest of the requested range into owned frames.
    pub fn collect_frames(&mut self)
            -> FlicResult<Vec<Frame>> {
        let mut frames = Vec::new();
        while let Some(frame) = self.advance()? {
            frames.push(frame.clone());
        }
        Ok(frames)
    }

    fn advance(&mut self)
            -> FlicResult<Option<&Frame>> {
        if self.done {
            return Ok(None);
        }

        while self.frame + 1 < self.from {
            if let Err(e) = self.decode_one() {
                self.done = true;
                return Err(e);
            }
        }

        if self.frame >= self.to {
            self.done = true;
            return Ok(None);
        }

        let frame_num = self.frame + 1;
        match self.decode_one() {
            Ok(()) => Ok(Some(&self.prev)),
            Err(e) => {
                self.done = true;
                if frame_num == self.from || is_stream_failure(&e) {
                    return Err(e);
                }

                let warning = FlicWarning::StoppedEarly { frame: frame_num, cause: e };
                warn!("{}", warning);
                self.warnings.push(warning);
                Ok(None)
            },
        }
    }

    fn decode_one(&mut self)
            -> FlicResult<()> {
        let frame_num = self.frame + 1;
        read_frame(&mut self.r, &self.hdr, frame_num,
                &self.prev, &mut self.next, &mut self.warnings)?;

        mem::swap(&mut self.prev, &mut self.next);
        self.frame = frame_num;
        Ok(())
    }
}

/// A read failure reported by the stream itself, as opposed to a
/// truncated or corrupted file.
fn is_stream_failure(e: &FlicError) -> bool {
    match *e {
        FlicError::Io(ref err) => err.kind() != ErrorKind::UnexpectedEof,
        _ => false,
    }
}

/*--------------------------------------------------------------*/

impl<W: Write + Seek> FlicEncoder<W> {
    /// Start writing a FLIC to `w`.
    ///
    /// Space for the header is reserved at offset 0.  The width and
    /// height of every frame must match the header.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    ///
    /// const SCREEN_W: u16 = 320;
    /// const SCREEN_H: u16 = 200;
    /// let buf = [0; (SCREEN_W as usize) * (SCREEN_H as usize)];
    /// let pal = [0; flicodec::SIZE_OF_PALETTE];
    ///
    /// let hdr = flicodec::Header::flc(SCREEN_W, SCREEN_H, 70);
    /// let mut flic = flicodec::FlicEncoder::new(Cursor::new(Vec::new()), hdr).expect("new");
    /// flic.encode_frame(&buf, &pal).expect("frame");
    /// let out = flic.finish().expect("finish");
    /// ```
    pub fn new(mut w: W, hdr: Header)
            -> FlicResult<Self> {
        if hdr.width() == 0 || hdr.height() == 0 {
            return Err(FlicError::BadInput);
        }

        seek_to(&mut w, 0)?;

        // Reserve space for header.
        w.write_all(&[0; SIZE_OF_FLIC_HEADER])?;

        let width = hdr.width() as usize;
        let height = hdr.height() as usize;

        Ok(FlicEncoder {
            w: Some(w),
            hdr,
            strategy: PixelStrategy::default(),
            prev: Frame::new(width, height),
            next: Frame::new(width, height),
            frame_count: 0,
        })
    }

    pub fn set_strategy(&mut self, strategy: PixelStrategy) {
        self.strategy = strategy;
    }

    /// Number of frames written so far.
    pub fn frame_count(&self) -> u16 {
        self.frame_count
    }

    /// Encode the next frame.
    pub fn encode_frame(&mut self, buf: &[u8], pal: &[u8])
            -> FlicResult<()> {
        let w = match self.w.as_mut() {
            Some(w) => w,
            None => return Err(FlicError::BadInput),
        };

        if self.frame_count == ::std::u16::MAX {
            return Err(FlicError::ExceededLimit);
        }

        self.next.load(buf, pal)?;

        let offset = tell(w)?;
        if let Header::Flc(ref mut h) = self.hdr {
            if offset > ::std::u32::MAX as u64 {
                return Err(FlicError::ExceededLimit);
            }

            if self.frame_count == 0 {
                h.oframe1 = offset as u32;
            } else if self.frame_count == 1 {
                h.oframe2 = offset as u32;
            }
        }

        let prev = if self.frame_count == 0 {
            None
        } else {
            Some(&self.prev)
        };

        let size = write_frame(w, &self.hdr, self.strategy, prev, &self.next)?;
        debug!("Wrote frame {} at {}, size {}", self.frame_count + 1, offset, size);

        mem::swap(&mut self.prev, &mut self.next);
        self.frame_count += 1;
        Ok(())
    }

    /// Write the header and hand back the stream, positioned at the
    /// end of the file.
    pub fn finish(mut self)
            -> FlicResult<W> {
        let mut w = match self.w.take() {
            Some(w) => w,
            None => return Err(FlicError::BadInput),
        };

        if self.frame_count == 0 {
            return Err(FlicError::NoFrames);
        }

        self.hdr.info_mut().frame_count = self.frame_count;
        write_header(&mut self.hdr, &mut w)?;
        w.flush()?;
        Ok(w)
    }
}

impl<W: Write + Seek> Drop for FlicEncoder<W> {
    fn drop(&mut self) {
        if self.w.is_some() {
            warn!("FLIC encoder dropped after {} frame(s) without finish, header not written",
                    self.frame_count);
        }
    }
}
