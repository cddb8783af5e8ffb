//! This crate provides routines for encoding and decoding
//! Autodesk Animator FLI and Autodesk Animator Pro FLC sequences
//! over seekable byte streams.

extern crate byteorder;
extern crate libc;
#[macro_use]
extern crate log;
#[macro_use]
extern crate quick_error;

pub use errcode::{FlicError,FlicResult,FlicWarning,HeaderRepair};
pub use flic::{FlicDecoder,FlicEncoder};
pub use frame::PixelStrategy;
pub use header::{Header,HeaderInfo,FliHeader,FlcHeader};
pub use header::{FLIH_MAGIC,FLIHR_MAGIC,SIZE_OF_FLIC_HEADER,LIBFLIC_UPDATER_ID};
pub use raster::{Frame,Raster,RasterMut,SIZE_OF_PALETTE};

pub mod codec;
pub mod errcode;
pub mod ffi;
pub mod flic;
pub mod frame;
pub mod header;
pub mod raster;
mod stream;
