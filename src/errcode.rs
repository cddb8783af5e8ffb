//! FLIC error codes and soft warnings.

use std::fmt;
use std::io;

pub type FlicResult<T> = Result<T, FlicError>;

quick_error! {
    #[derive(Debug)]
    pub enum FlicError {
        /// Reading or writing the underlying stream failed.
        Io(err: io::Error) {
            from()
            source(err)
            display("IO error: {}", err)
        }

        /// The header magic is neither FLI nor FLC.
        UnrecognizedContainer(magic: u16) {
            display("Not a FLI/FLC animation (magic {:#06x})", magic)
        }

        /// A frame record or chunk claims to extend past the end of the
        /// file, or is smaller than its own header.
        Corrupted(what: &'static str, offset: u64, size: u32, filesize: u32) {
            display("Corrupted {} at offset {}: size {} with file size {}",
                    what, offset, size, filesize)
        }

        /// Caller buffers do not match the animation dimensions.
        WrongResolution(w: usize, h: usize) {
            display("Wrong resolution, expected {}x{}", w, h)
        }

        /// A value does not fit its on-disk field.
        ExceededLimit {
            display("Exceeded limit")
        }

        /// The header cannot be used to encode an animation.
        BadInput {
            display("Bad input")
        }

        /// The encoder was finished before any frame was written.
        NoFrames {
            display("No frames were written")
        }
    }
}

impl FlicError {
    /// The operating system error code behind an I/O failure, if any.
    pub fn raw_os_error(&self) -> Option<i32> {
        match *self {
            FlicError::Io(ref err) => err.raw_os_error(),
            _ => None,
        }
    }
}

/// A header field that was repaired while reading.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub enum HeaderRepair {
    /// Width stored as 0, replaced by 320.
    Width,
    /// Height stored as 0, replaced by 200.
    Height,
    /// Frame count stored as 0, replaced by 2.
    FrameCount,
    /// Stored file size did not match the stream length.
    FileSize { stored: u32, actual: u64 },
    /// Frame delay was 0 or longer than 10 seconds, replaced by 70ms.
    Speed { stored_msec: u32 },
}

/// Recoverable anomalies met while decoding.
///
/// None of these abort decoding; they are collected by the decoder so
/// the caller can surface them.
#[derive(Debug)]
pub enum FlicWarning {
    /// A header field held an unusable value and was replaced.
    RepairedHeaderField(HeaderRepair),

    /// Some packets in a chunk would have written past the image and
    /// were clipped.
    Overflow { frame: usize, chunk: u16, packets: usize },

    /// Decoding stopped at `frame`; earlier frames remain valid.
    StoppedEarly { frame: usize, cause: FlicError },
}

impl fmt::Display for HeaderRepair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            HeaderRepair::Width => write!(f, "Width is 0, setting to 320"),
            HeaderRepair::Height => write!(f, "Height is 0, setting to 200"),
            HeaderRepair::FrameCount => write!(f, "Number of frames is 0, setting to 2"),
            HeaderRepair::FileSize { stored, actual } =>
                write!(f, "Incorrect file size in header: {}, should be: {}",
                        stored, actual),
            HeaderRepair::Speed { stored_msec } =>
                write!(f, "Suspicious frame delay of {}ms, setting delay to 70ms",
                        stored_msec),
        }
    }
}

impl fmt::Display for FlicWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FlicWarning::RepairedHeaderField(ref repair) =>
                write!(f, "{}", repair),
            FlicWarning::Overflow { frame, chunk, packets } =>
                write!(f, "frame {} - chunk type {} overflowed the image, {} packet(s) clipped",
                        frame, chunk, packets),
            FlicWarning::StoppedEarly { frame, ref cause } =>
                write!(f, "frame {} - stopped decoding: {}", frame, cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use super::*;

    #[test]
    fn test_io_error_keeps_os_code() {
        let err: FlicError = io::Error::from_raw_os_error(28).into();
        assert_eq!(err.raw_os_error(), Some(28));
        assert_eq!(FlicError::ExceededLimit.raw_os_error(), None);
    }

    #[test]
    fn test_display() {
        let err = FlicError::UnrecognizedContainer(0x1234);
        assert_eq!(err.to_string(), "Not a FLI/FLC animation (magic 0x1234)");

        let w = FlicWarning::RepairedHeaderField(
                HeaderRepair::FileSize { stored: 100, actual: 200 });
        assert_eq!(w.to_string(), "Incorrect file size in header: 100, should be: 200");
    }
}
