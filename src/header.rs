//! FLIC file header.

use std::cmp::min;
use std::io::{Read,Seek,Write};
use byteorder::LittleEndian as LE;
use byteorder::{ReadBytesExt,WriteBytesExt};

use crate::{FlicError,FlicResult,FlicWarning,HeaderRepair};
use crate::stream::{seek_to,stream_len,tell};

/// Magic for a FLI file - Original Animator FLI Files.
///
/// The file header for a FLI file is a subset of the FLC file header.
/// It is defined as follows:
///
///   Offset | Length |   Name   | Description
///   ------:| ------:|:--------:| -----------------------------------
///        0 |      4 |   size   | The size of the entire animation file, including this file header.
///        4 |      2 |   magic  | File format identifier.  Always 0xAF11.
///        6 |      2 |  frames  | Number of frames in the FLIC.
///        8 |      2 |   width  | Screen width in pixels.
///       10 |      2 |  height  | Screen height in pixels.
///       12 |      2 |   depth  | Bits per pixel (always 8).
///       14 |      2 |   flags  | Always zero in a FLI file.
///       16 |      2 |   speed  | Number of jiffies to delay between each frame during playback.  A jiffy is 1/70 of a second.
///       18 |    110 | reserved | Unused space, set to zeroes.
pub const FLIH_MAGIC: u16 = 0xAF11;

/// Magic for a FLC file - Animator Pro FLC Files.
///
///   Offset | Length |   Name   | Description
///   ------:| ------:|:--------:| -----------------------------------
///        0 |      4 |   size   | The size of the entire animation file, including this file header.
///        4 |      2 |   magic  | File format identifier.  Always 0xAF12.
///        6 |      2 |  frames  | Number of frames in the FLIC.
///        8 |      2 |   width  | Screen width in pixels.
///       10 |      2 |   height | Screen height in pixels.
///       12 |      2 |   depth  | Bits per pixel (always 8).
///       14 |      2 |   flags  | Set to 0x0003 once the file was properly finished.
///       16 |      4 |   speed  | Number of milliseconds to delay between each frame during playback.
///       20 |      2 | reserved | Unused word, set to 0.
///       22 |      4 |  created | MSDOS-formatted date and time of the file's creation.
///       26 |      4 |  creator | Serial number of the creating program.
///       30 |      4 |  updated | MSDOS-formatted date and time of the most recent update.
///       34 |      4 |  updater | Serial number of the most recent updater.
///       38 |      2 |  aspectx | The x-axis aspect ratio.
///       40 |      2 |  aspecty | The y-axis aspect ratio.
///       42 |     38 | reserved | Unused space, set to zeroes.
///       80 |      4 |  oframe1 | Offset of the first frame record.
///       84 |      4 |  oframe2 | Offset of the second frame record, used when looping.
///       88 |     40 | reserved | Unused space, set to zeroes.
pub const FLIHR_MAGIC: u16 = 0xAF12;

/// Size of a FLIC file header on disk.  The first frame record
/// starts right after it.
pub const SIZE_OF_FLIC_HEADER: usize = 128;

/// Offset of the FLC loop-frame offsets.
pub const OFFSET_OF_OFRAME1: u64 = 80;

/// Default updater for FLC files written by this crate, "FLRS".
pub const LIBFLIC_UPDATER_ID: u32 = 0x464C5253;

/// Flags value of a properly finished FLC file.
pub const FLC_FLAGS_FINISHED: u16 = 0x0003;

/// Milliseconds per FLI jiffy, rounded.
pub const MSEC_PER_JIFFY: u32 = 14;

pub const DEFAULT_SPEED_MSEC: u32 = 70;
pub const MAX_SPEED_MSEC: u32 = 10000;

const DEFAULT_WIDTH: u16 = 320;
const DEFAULT_HEIGHT: u16 = 200;
const DEFAULT_FRAME_COUNT: u16 = 2;

/// Fields shared by FLI and FLC headers.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub struct HeaderInfo {
    pub filesize: u32,
    pub frame_count: u16,
    pub width: u16,
    pub height: u16,
    pub depth: u16,
    pub flags: u16,
}

/// Original Animator header.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub struct FliHeader {
    pub info: HeaderInfo,
    pub speed_jiffies: u16,
}

/// Animator Pro header.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub struct FlcHeader {
    pub info: HeaderInfo,
    pub speed_msec: u32,
    pub created: u32,
    pub creator: u32,
    pub updated: u32,
    pub updater: u32,
    pub aspect_x: u16,
    pub aspect_y: u16,
    pub oframe1: u32,
    pub oframe2: u32,
}

/// FLIC header, either flavour.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub enum Header {
    Fli(FliHeader),
    Flc(FlcHeader),
}

/*--------------------------------------------------------------*/

impl HeaderInfo {
    fn new(width: u16, height: u16, flags: u16) -> Self {
        HeaderInfo {
            filesize: 0,
            frame_count: 0,
            width,
            height,
            depth: 8,
            flags,
        }
    }
}

impl Header {
    /// Header for a new Animator FLI file.
    ///
    /// The delay is stored in jiffies, so it is rounded to the nearest
    /// multiple of 14ms.
    pub fn fli(width: u16, height: u16, speed_msec: u32) -> Self {
        let jiffies = min((speed_msec as u64 + 7) / MSEC_PER_JIFFY as u64,
                ::std::u16::MAX as u64) as u16;

        Header::Fli(FliHeader {
            info: HeaderInfo::new(width, height, 0),
            speed_jiffies: jiffies,
        })
    }

    /// Header for a new Animator Pro FLC file.
    pub fn flc(width: u16, height: u16, speed_msec: u32) -> Self {
        Header::Flc(FlcHeader {
            info: HeaderInfo::new(width, height, FLC_FLAGS_FINISHED),
            speed_msec,
            created: 0,
            creator: 0,
            updated: 0,
            updater: LIBFLIC_UPDATER_ID,
            aspect_x: 1,
            aspect_y: 1,
            oframe1: 0,
            oframe2: 0,
        })
    }

    pub fn magic(&self) -> u16 {
        match *self {
            Header::Fli(_) => FLIH_MAGIC,
            Header::Flc(_) => FLIHR_MAGIC,
        }
    }

    pub fn info(&self) -> &HeaderInfo {
        match *self {
            Header::Fli(ref h) => &h.info,
            Header::Flc(ref h) => &h.info,
        }
    }

    pub fn info_mut(&mut self) -> &mut HeaderInfo {
        match *self {
            Header::Fli(ref mut h) => &mut h.info,
            Header::Flc(ref mut h) => &mut h.info,
        }
    }

    pub fn width(&self) -> u16 {
        self.info().width
    }

    pub fn height(&self) -> u16 {
        self.info().height
    }

    /// Get the frame count, not including any ring frame.
    pub fn frame_count(&self) -> u16 {
        self.info().frame_count
    }

    pub fn filesize(&self) -> u32 {
        self.info().filesize
    }

    /// Number of milliseconds to delay between each frame during playback.
    pub fn speed_msec(&self) -> u32 {
        match *self {
            Header::Fli(ref h) => h.speed_jiffies as u32 * MSEC_PER_JIFFY,
            Header::Flc(ref h) => h.speed_msec,
        }
    }

    /// Set the FLC creator and creation time.  Ignored for FLI.
    pub fn set_creator(&mut self, creator: u32, created: u32) {
        if let Header::Flc(ref mut h) = *self {
            h.creator = creator;
            h.created = created;
        }
    }

    /// Set the FLC updater and update time.  Ignored for FLI.
    pub fn set_updater(&mut self, updater: u32, updated: u32) {
        if let Header::Flc(ref mut h) = *self {
            h.updater = updater;
            h.updated = updated;
        }
    }

    /// Set the FLC aspect ratio.  Ignored for FLI.
    ///
    /// Most often, the x:y aspect ratio will be 1:1.
    /// A 320x200 FLIC has a ratio of 6:5.
    pub fn set_aspect_ratio(&mut self, x: u16, y: u16) {
        if let Header::Flc(ref mut h) = *self {
            if x > 0 && y > 0 {
                h.aspect_x = x;
                h.aspect_y = y;
            } else {
                h.aspect_x = 1;
                h.aspect_y = 1;
            }
        }
    }

    fn set_speed_msec(&mut self, speed_msec: u32) {
        match *self {
            Header::Fli(ref mut h) =>
                h.speed_jiffies = (speed_msec / MSEC_PER_JIFFY) as u16,
            Header::Flc(ref mut h) =>
                h.speed_msec = speed_msec,
        }
    }
}

/*--------------------------------------------------------------*/

/// Read the FLIC's header.
///
/// Suspicious fields are repaired rather than rejected; each repair
/// is logged and appended to `warnings`.  On success the stream is
/// positioned at the first frame record.
pub fn read_header<R: Read + Seek>(r: &mut R, warnings: &mut Vec<FlicWarning>)
        -> FlicResult<Header> {
    let actual_size = stream_len(r)?;
    seek_to(r, 0)?;

    let filesize = r.read_u32::<LE>()?;
    let magic = r.read_u16::<LE>()?;
    let info = HeaderInfo {
        filesize,
        frame_count: r.read_u16::<LE>()?,
        width: r.read_u16::<LE>()?,
        height: r.read_u16::<LE>()?,
        depth: r.read_u16::<LE>()?,
        flags: r.read_u16::<LE>()?,
    };

    let mut hdr = match magic {
        FLIH_MAGIC => {
            let speed_jiffies = r.read_u16::<LE>()?;
            Header::Fli(FliHeader { info, speed_jiffies })
        },
        FLIHR_MAGIC => read_flc_fields(r, info)?,
        _ => return Err(FlicError::UnrecognizedContainer(magic)),
    };

    repair_header(&mut hdr, actual_size, warnings);

    debug!("Filesize: {}, magic: {:x}, frames: {}, wxh: {}x{}, depth: {}, flags: {:x}, speed: {}",
           hdr.filesize(), hdr.magic(), hdr.frame_count(),
           hdr.width(), hdr.height(), hdr.info().depth,
           hdr.info().flags, hdr.speed_msec());

    seek_to(r, SIZE_OF_FLIC_HEADER as u64)?;
    Ok(hdr)
}

/// Read the Animator Pro part of the header, following the common
/// fields.
fn read_flc_fields<R: Read + Seek>(r: &mut R, info: HeaderInfo)
        -> FlicResult<Header> {
    let speed_msec = r.read_u32::<LE>()?;
    let _reserved = r.read_u16::<LE>()?;
    let created = r.read_u32::<LE>()?;
    let creator = r.read_u32::<LE>()?;
    let updated = r.read_u32::<LE>()?;
    let updater = r.read_u32::<LE>()?;
    let aspect_x = r.read_u16::<LE>()?;
    let aspect_y = r.read_u16::<LE>()?;

    seek_to(r, OFFSET_OF_OFRAME1)?;
    let oframe1 = r.read_u32::<LE>()?;
    let oframe2 = r.read_u32::<LE>()?;

    Ok(Header::Flc(FlcHeader {
        info,
        speed_msec,
        created,
        creator,
        updated,
        updater,
        aspect_x,
        aspect_y,
        oframe1,
        oframe2,
    }))
}

fn repair_header(hdr: &mut Header, actual_size: u64, warnings: &mut Vec<FlicWarning>) {
    let mut repairs = Vec::new();

    {
        let info = hdr.info_mut();

        if info.width == 0 {
            info.width = DEFAULT_WIDTH;
            repairs.push(HeaderRepair::Width);
        }
        if info.height == 0 {
            info.height = DEFAULT_HEIGHT;
            repairs.push(HeaderRepair::Height);
        }

        if actual_size != info.filesize as u64 {
            let stored = info.filesize;
            info.filesize = min(actual_size, ::std::u32::MAX as u64) as u32;

            // Older writers finish the last chunk on an odd length but
            // count the missing pad byte, or the other way round.
            if actual_size + 1 == stored as u64 || stored as u64 + 1 == actual_size {
                debug!("File size off by one: {}, should be: {}", stored, actual_size);
            } else {
                repairs.push(HeaderRepair::FileSize { stored, actual: actual_size });
            }
        }

        if info.frame_count == 0 {
            info.frame_count = DEFAULT_FRAME_COUNT;
            repairs.push(HeaderRepair::FrameCount);
        }
    }

    let speed = hdr.speed_msec();
    if speed == 0 || speed > MAX_SPEED_MSEC {
        hdr.set_speed_msec(DEFAULT_SPEED_MSEC);
        repairs.push(HeaderRepair::Speed { stored_msec: speed });
    }

    for repair in repairs {
        warn!("{}", repair);
        warnings.push(FlicWarning::RepairedHeaderField(repair));
    }
}

/*--------------------------------------------------------------*/

/// Write the FLIC header.
///
/// The header is written last: the current stream position is taken
/// as the file size, the header is written at offset 0, and the
/// stream is left at the end of the file.
pub fn write_header<W: Write + Seek>(hdr: &mut Header, w: &mut W)
        -> FlicResult<()> {
    let end = tell(w)?;
    if end > ::std::u32::MAX as u64 {
        return Err(FlicError::ExceededLimit);
    }

    hdr.info_mut().filesize = end as u32;
    let info = *hdr.info();

    seek_to(w, 0)?;
    w.write_u32::<LE>(info.filesize)?;
    w.write_u16::<LE>(hdr.magic())?;
    w.write_u16::<LE>(info.frame_count)?;
    w.write_u16::<LE>(info.width)?;
    w.write_u16::<LE>(info.height)?;
    w.write_u16::<LE>(info.depth)?;
    w.write_u16::<LE>(info.flags)?;

    match *hdr {
        Header::Fli(ref h) => {
            w.write_u16::<LE>(h.speed_jiffies)?;
        },
        Header::Flc(ref h) => {
            w.write_u32::<LE>(h.speed_msec)?;
            w.write_u16::<LE>(0)?; // reserved
            w.write_u32::<LE>(h.created)?;
            w.write_u32::<LE>(h.creator)?;
            w.write_u32::<LE>(h.updated)?;
            w.write_u32::<LE>(h.updater)?;
            w.write_u16::<LE>(h.aspect_x)?;
            w.write_u16::<LE>(h.aspect_y)?;

            seek_to(w, OFFSET_OF_OFRAME1)?;
            w.write_u32::<LE>(h.oframe1)?;
            w.write_u32::<LE>(h.oframe2)?;
        },
    }

    seek_to(w, end)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use byteorder::LittleEndian as LE;
    use byteorder::WriteBytesExt;
    use crate::{FlicError,FlicWarning,HeaderRepair};
    use super::*;

    fn fli_bytes(filesize: u32, frames: u16, w: u16, h: u16, jiffies: u16, len: usize)
            -> Vec<u8> {
        let mut c = Cursor::new(vec![0; len]);
        c.write_u32::<LE>(filesize).unwrap();
        c.write_u16::<LE>(FLIH_MAGIC).unwrap();
        c.write_u16::<LE>(frames).unwrap();
        c.write_u16::<LE>(w).unwrap();
        c.write_u16::<LE>(h).unwrap();
        c.write_u16::<LE>(8).unwrap();
        c.write_u16::<LE>(0).unwrap();
        c.write_u16::<LE>(jiffies).unwrap();
        c.into_inner()
    }

    fn repairs(warnings: &[FlicWarning]) -> Vec<HeaderRepair> {
        warnings.iter().filter_map(|w| match *w {
            FlicWarning::RepairedHeaderField(r) => Some(r),
            _ => None,
        }).collect()
    }

    #[test]
    fn test_read_fli_header() {
        let buf = fli_bytes(200, 3, 320, 200, 5, 200);
        let mut r = Cursor::new(buf);
        let mut warnings = Vec::new();

        let hdr = read_header(&mut r, &mut warnings).expect("header");
        assert!(warnings.is_empty());
        assert_eq!(hdr.magic(), FLIH_MAGIC);
        assert_eq!(hdr.frame_count(), 3);
        assert_eq!(hdr.speed_msec(), 70);
        assert_eq!(r.position(), SIZE_OF_FLIC_HEADER as u64);
    }

    #[test]
    fn test_read_bad_magic() {
        let mut buf = fli_bytes(200, 3, 320, 200, 5, 200);
        buf[4] = 0x34;
        buf[5] = 0x12;
        let mut warnings = Vec::new();

        match read_header(&mut Cursor::new(buf), &mut warnings) {
            Err(FlicError::UnrecognizedContainer(0x1234)) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_read_truncated_header() {
        let buf = fli_bytes(200, 3, 320, 200, 5, 200);
        let mut warnings = Vec::new();

        match read_header(&mut Cursor::new(&buf[0..10]), &mut warnings) {
            Err(FlicError::Io(_)) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_repairs() {
        let buf = fli_bytes(200, 0, 0, 0, 0, 200);
        let mut warnings = Vec::new();

        let hdr = read_header(&mut Cursor::new(buf), &mut warnings).expect("header");
        assert_eq!(hdr.width(), 320);
        assert_eq!(hdr.height(), 200);
        assert_eq!(hdr.frame_count(), 2);
        assert_eq!(hdr.speed_msec(), 70);
        assert_eq!(repairs(&warnings), [
            HeaderRepair::Width, HeaderRepair::Height,
            HeaderRepair::FrameCount, HeaderRepair::Speed { stored_msec: 0 } ]);
    }

    #[test]
    fn test_speed_too_long() {
        // 1000 jiffies = 14 seconds.
        let buf = fli_bytes(200, 1, 2, 2, 1000, 200);
        let mut warnings = Vec::new();

        let hdr = read_header(&mut Cursor::new(buf), &mut warnings).expect("header");
        assert_eq!(hdr.speed_msec(), 70);
        assert_eq!(repairs(&warnings), [HeaderRepair::Speed { stored_msec: 14000 }]);
    }

    #[test]
    fn test_filesize_off_by_one() {
        let mut warnings = Vec::new();

        // Header claims one byte less than the stream holds.
        let buf = fli_bytes(199, 1, 2, 2, 5, 200);
        let hdr = read_header(&mut Cursor::new(buf), &mut warnings).expect("header");
        assert_eq!(hdr.filesize(), 200);

        // Header claims one byte more than the stream holds.
        let buf = fli_bytes(201, 1, 2, 2, 5, 200);
        let hdr = read_header(&mut Cursor::new(buf), &mut warnings).expect("header");
        assert_eq!(hdr.filesize(), 200);

        assert!(warnings.is_empty());
    }

    #[test]
    fn test_filesize_mismatch() {
        let buf = fli_bytes(100, 1, 2, 2, 5, 200);
        let mut warnings = Vec::new();

        let hdr = read_header(&mut Cursor::new(buf), &mut warnings).expect("header");
        assert_eq!(hdr.filesize(), 200);
        assert_eq!(repairs(&warnings),
                [HeaderRepair::FileSize { stored: 100, actual: 200 }]);
    }

    #[test]
    fn test_repair_is_idempotent() {
        let buf = fli_bytes(50, 0, 0, 0, 2000, 300);
        let mut warnings = Vec::new();
        let mut hdr = read_header(&mut Cursor::new(buf), &mut warnings).expect("header");
        assert_eq!(warnings.len(), 5);

        let mut w = Cursor::new(vec![0; 300]);
        w.set_position(300);
        write_header(&mut hdr, &mut w).expect("write");

        let mut warnings = Vec::new();
        let hdr2 = read_header(&mut Cursor::new(w.into_inner()), &mut warnings).expect("header");
        assert!(warnings.is_empty());
        assert_eq!(hdr, hdr2);
    }

    #[test]
    fn test_write_read_flc_header() {
        let mut hdr = Header::flc(640, 480, 40);
        hdr.info_mut().frame_count = 7;
        hdr.set_creator(0x1234, 0x5678);
        hdr.set_updater(0x4142, 0x9ABC);
        hdr.set_aspect_ratio(6, 5);
        if let Header::Flc(ref mut h) = hdr {
            h.oframe1 = 128;
            h.oframe2 = 1000;
        }

        let mut w = Cursor::new(vec![0; 2000]);
        w.set_position(2000);
        write_header(&mut hdr, &mut w).expect("write");
        assert_eq!(w.position(), 2000);
        assert_eq!(hdr.filesize(), 2000);

        let buf = w.into_inner();
        assert_eq!(&buf[80..88], &[128, 0, 0, 0, 0xE8, 0x03, 0, 0]);

        let mut warnings = Vec::new();
        let hdr2 = read_header(&mut Cursor::new(buf), &mut warnings).expect("header");
        assert!(warnings.is_empty());
        assert_eq!(hdr, hdr2);
    }

    #[test]
    fn test_fli_speed_rounding() {
        assert_eq!(Header::fli(320, 200, 70).speed_msec(), 70);
        assert_eq!(Header::fli(320, 200, 20).speed_msec(), 14);
        assert_eq!(Header::fli(320, 200, 22).speed_msec(), 28);
    }
}
