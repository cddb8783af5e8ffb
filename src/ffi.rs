//! Foreign function interface.
//!
//! Decoders read from a copy of a caller-supplied memory buffer.
//! Encoders write to memory; `flicrs_encoder_finish` hands the file
//! back as a buffer which must be released with `flicrs_buffer_free`.

use std::io::Cursor;
use std::ptr;
use std::slice;
use libc::{c_int,c_uint,size_t};

use crate::{FlicDecoder,FlicEncoder,FlicResult,Header};
use crate::{FLIH_MAGIC,FLIHR_MAGIC};

/// Decoder handle.
pub type CFlicDecoder = FlicDecoder<Cursor<Vec<u8>>>;

/// Encoder handle.
pub type CFlicEncoder = FlicEncoder<Cursor<Vec<u8>>>;

// Log with "file:line - " prefix, for more informative error messages.
macro_rules! errorln {
    ($e:expr) => {
        error!("{}:{} - {}", file!(), line!(), $e);
    };
}

/*--------------------------------------------------------------*/
/* Decoder                                                      */
/*--------------------------------------------------------------*/

/// Open a FLIC held in memory.  The data is copied.
///
/// Returns null on failure.
#[no_mangle]
pub extern "C" fn flicrs_decoder_open_mem(data: *const u8, len: size_t)
        -> *mut CFlicDecoder {
    if data.is_null() {
        errorln!("bad input parameters");
        return ptr::null_mut();
    }

    let src = unsafe{ slice::from_raw_parts(data, len) };
    match FlicDecoder::open(Cursor::new(src.to_vec())) {
        Ok(dec) => Box::into_raw(Box::new(dec)),
        Err(e) => {
            errorln!(e);
            ptr::null_mut()
        },
    }
}

/// Free a decoder.
#[no_mangle]
pub extern "C" fn flicrs_decoder_free(dec: *mut CFlicDecoder) {
    if dec.is_null() {
        return;
    }

    let _dec = unsafe{ Box::from_raw(dec) };
}

/// Get the FLIC width.
#[no_mangle]
pub extern "C" fn flicrs_decoder_width(dec: *const CFlicDecoder)
        -> c_uint {
    with_decoder(dec, |dec| dec.header().width() as c_uint)
}

/// Get the FLIC height.
#[no_mangle]
pub extern "C" fn flicrs_decoder_height(dec: *const CFlicDecoder)
        -> c_uint {
    with_decoder(dec, |dec| dec.header().height() as c_uint)
}

/// Get the frame count.
#[no_mangle]
pub extern "C" fn flicrs_decoder_frame_count(dec: *const CFlicDecoder)
        -> c_uint {
    with_decoder(dec, |dec| dec.header().frame_count() as c_uint)
}

/// Number of milliseconds to delay between each frame during playback.
#[no_mangle]
pub extern "C" fn flicrs_decoder_speed_msec(dec: *const CFlicDecoder)
        -> c_uint {
    with_decoder(dec, |dec| dec.header().speed_msec() as c_uint)
}

/// Decode the next frame into `buf` (width * height bytes) and `pal`
/// (768 bytes).
///
/// Returns 1 if a frame was decoded, 0 at the end of the animation,
/// and -1 on error.
#[no_mangle]
pub extern "C" fn flicrs_decoder_next_frame(
        dec: *mut CFlicDecoder,
        buf: *mut u8, buf_len: size_t,
        pal: *mut u8, pal_len: size_t)
        -> c_int {
    if dec.is_null() || buf.is_null() || pal.is_null() {
        errorln!("bad input parameters");
        return -1;
    }

    let dec = unsafe{ &mut *dec };
    let buf_slice = unsafe{ slice::from_raw_parts_mut(buf, buf_len) };
    let pal_slice = unsafe{ slice::from_raw_parts_mut(pal, pal_len) };
    match dec.decode_next_frame(buf_slice, pal_slice) {
        Ok(true) => 1,
        Ok(false) => 0,
        Err(e) => {
            errorln!(e);
            -1
        },
    }
}

fn with_decoder<F>(dec: *const CFlicDecoder, f: F)
        -> c_uint
        where F: FnOnce(&CFlicDecoder) -> c_uint {
    if dec.is_null() {
        errorln!("bad input parameters");
        return 0;
    }

    f(unsafe{ &*dec })
}

/*--------------------------------------------------------------*/
/* Encoder                                                      */
/*--------------------------------------------------------------*/

/// Start encoding a FLI (`magic` 0xAF11) or FLC (`magic` 0xAF12) in
/// memory.
///
/// Returns null on failure.
#[no_mangle]
pub extern "C" fn flicrs_encoder_new(
        magic: c_uint, w: c_uint, h: c_uint, speed_msec: c_uint)
        -> *mut CFlicEncoder {
    if w == 0 || h == 0 || w > ::std::u16::MAX as c_uint || h > ::std::u16::MAX as c_uint {
        errorln!("bad input parameters");
        return ptr::null_mut();
    }

    let hdr = match magic {
        m if m == FLIH_MAGIC as c_uint => Header::fli(w as u16, h as u16, speed_msec),
        m if m == FLIHR_MAGIC as c_uint => Header::flc(w as u16, h as u16, speed_msec),
        _ => {
            errorln!("bad input parameters");
            return ptr::null_mut();
        },
    };

    match FlicEncoder::new(Cursor::new(Vec::new()), hdr) {
        Ok(enc) => Box::into_raw(Box::new(enc)),
        Err(e) => {
            errorln!(e);
            ptr::null_mut()
        },
    }
}

/// Encode the next frame.  Returns 0 on success.
#[no_mangle]
pub extern "C" fn flicrs_encoder_write_frame(
        enc: *mut CFlicEncoder,
        buf: *const u8, buf_len: size_t,
        pal: *const u8, pal_len: size_t)
        -> c_uint {
    if enc.is_null() || buf.is_null() || pal.is_null() {
        errorln!("bad input parameters");
        return 1;
    }

    let enc = unsafe{ &mut *enc };
    let buf_slice = unsafe{ slice::from_raw_parts(buf, buf_len) };
    let pal_slice = unsafe{ slice::from_raw_parts(pal, pal_len) };
    match enc.encode_frame(buf_slice, pal_slice) {
        Ok(()) => 0,
        Err(e) => {
            errorln!(e);
            1
        },
    }
}

/// Finish encoding and free the encoder.
///
/// Returns the file contents and stores their length in `out_len`,
/// or returns null on failure.  The contents must be released with
/// `flicrs_buffer_free`.
#[no_mangle]
pub extern "C" fn flicrs_encoder_finish(enc: *mut CFlicEncoder, out_len: *mut size_t)
        -> *mut u8 {
    if enc.is_null() || out_len.is_null() {
        errorln!("bad input parameters");
        return ptr::null_mut();
    }

    let enc = unsafe{ Box::from_raw(enc) };
    match finish(*enc) {
        Ok(data) => {
            unsafe{ ptr::write(out_len, data.len()) };
            Box::into_raw(data) as *mut u8
        },
        Err(e) => {
            errorln!(e);
            ptr::null_mut()
        },
    }
}

/// Free a buffer returned by `flicrs_encoder_finish`.
#[no_mangle]
pub extern "C" fn flicrs_buffer_free(data: *mut u8, len: size_t) {
    if data.is_null() {
        return;
    }

    let _data = unsafe{ Box::from_raw(slice::from_raw_parts_mut(data, len) as *mut [u8]) };
}

fn finish(enc: CFlicEncoder)
        -> FlicResult<Box<[u8]>> {
    let out = enc.finish()?;
    Ok(out.into_inner().into_boxed_slice())
}
