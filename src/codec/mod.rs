//! FLIC encoding and decoding subroutines.

macro_rules! module {
    ($e:ident) => {
        pub use self::$e::*;
        mod $e;
    };
}

use std::iter::Zip;

use crate::{FlicResult,Raster,RasterMut};

module!(codec004);
module!(codec007);
module!(codec011);
module!(codec012);
module!(codec013);
module!(codec015);
module!(codec016);

mod palette;

/// Magic for a FLI_MINI chunk - Postage Stamp.
///
/// A reduced preview image of the first frame.  It carries nothing
/// the full frame does not, so it is skipped when decoding.
pub const FLI_MINI: u16 = 18;

/*--------------------------------------------------------------*/

/// The chunk types that can appear inside a frame record.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub enum ChunkKind {
    Color256,
    Ss2,
    Color64,
    Lc,
    Black,
    Brun,
    Copy,
    Mini,
    Unknown(u16),
}

/// Result of a GroupByX operation: a grouping type, start index, and
/// length.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
enum Group {
    Same(usize, usize),
    Diff(usize, usize),
}

/// An iterator that groups the two input streams based on whether
/// corresponding items are equal.  It returns whether they are equal
/// and the length until that comparison changes value.
///
/// This is suitable for compressing skip/memcpy type codecs,
/// e.g. FLI_COLOR64, FLI_COLOR256.
struct GroupByEq<I: Iterator> where I::Item: PartialEq {
    iter: Zip<I, I>,
    peek: Option<bool>,
    idx: usize,
    prepend_same_run: bool,
    ignore_final_same_run: bool,
}

/// An iterator that groups the buffer into runs of the same value.
///
/// This is suitable for compressing memset/memcpy type codecs,
/// e.g. FLI_BRUN.
struct GroupByValue<'a> {
    buf: &'a [u8],
    idx: usize,
}

/*--------------------------------------------------------------*/

impl ChunkKind {
    pub fn from_magic(magic: u16) -> Self {
        match magic {
            FLI_COLOR256 => ChunkKind::Color256,
            FLI_SS2 => ChunkKind::Ss2,
            FLI_COLOR64 => ChunkKind::Color64,
            FLI_LC => ChunkKind::Lc,
            FLI_BLACK => ChunkKind::Black,
            FLI_BRUN => ChunkKind::Brun,
            FLI_COPY => ChunkKind::Copy,
            FLI_MINI => ChunkKind::Mini,
            _ => ChunkKind::Unknown(magic),
        }
    }

    pub fn magic(self) -> u16 {
        match self {
            ChunkKind::Color256 => FLI_COLOR256,
            ChunkKind::Ss2 => FLI_SS2,
            ChunkKind::Color64 => FLI_COLOR64,
            ChunkKind::Lc => FLI_LC,
            ChunkKind::Black => FLI_BLACK,
            ChunkKind::Brun => FLI_BRUN,
            ChunkKind::Copy => FLI_COPY,
            ChunkKind::Mini => FLI_MINI,
            ChunkKind::Unknown(magic) => magic,
        }
    }

    /// Returns true if the chunk type modifies the palette.
    pub fn modifies_palette(self) -> bool {
        match self {
            ChunkKind::Color64 | ChunkKind::Color256 => true,
            _ => false,
        }
    }
}

/// Decode a chunk, based on the chunk type.
///
/// `dst` must already hold a copy of `prev`.  Chunks that carry no
/// image data (FLI_MINI, unknown types) leave it untouched.
///
/// Returns the number of packets that were clipped because they would
/// have written past the image.
pub fn decode_chunk(kind: ChunkKind, src: &[u8], prev: &Raster, dst: &mut RasterMut)
        -> FlicResult<usize> {
    match kind {
        ChunkKind::Color256 => decode_fli_color256(src, prev, dst),
        ChunkKind::Ss2 => decode_fli_ss2(src, dst),
        ChunkKind::Color64 => decode_fli_color64(src, prev, dst),
        ChunkKind::Lc => decode_fli_lc(src, dst),
        ChunkKind::Black => {
            decode_fli_black(dst);
            Ok(0)
        },
        ChunkKind::Brun => decode_fli_brun(src, dst),
        ChunkKind::Copy => decode_fli_copy(src, dst),
        ChunkKind::Mini | ChunkKind::Unknown(_) => Ok(0),
    }
}

/*--------------------------------------------------------------*/

impl<I: Iterator> GroupByEq<I>
        where I::Item: PartialEq {
    /// Create a new GroupByEq iterator.
    fn new(old: I, new: I) -> Self {
        GroupByEq {
            iter: old.zip(new),
            peek: None,
            idx: 0,
            prepend_same_run: false,
            ignore_final_same_run: false,
        }
    }

    /// If set, and if the two buffers start on a "Diff" sequence,
    /// then a "Same" group of length 0 will be added at the start.
    fn set_prepend_same_run(mut self) -> Self {
        self.prepend_same_run = true;
        self
    }

    /// If set, and if the two buffers end on a "Same" sequence,
    /// then this final "same" type group will be ignored.
    fn set_ignore_final_same_run(mut self) -> Self {
        self.ignore_final_same_run = true;
        self
    }
}

impl<I: Iterator> Iterator for GroupByEq<I>
        where I::Item: PartialEq {
    type Item = Group;

    fn next(&mut self) -> Option<Group> {
        let start = self.idx;
        let mut n = 0;

        let expected = if let Some(x) = self.peek.take() {
            n += 1;
            x
        } else if let Some((a, b)) = self.iter.next() {
            n += 1;
            a == b
        } else {
            return None;
        };

        // A leading difference gets an empty "Same" group in front.
        if self.prepend_same_run {
            self.prepend_same_run = false;
            if !expected {
                self.peek = Some(expected);
                return Some(Group::Same(start, 0));
            }
        }

        for x in self.iter.by_ref().map(|(a, b)| a == b) {
            if x == expected {
                n += 1;
            } else {
                self.peek = Some(x);
                break;
            }
        }

        self.idx += n;
        if expected {
            if self.ignore_final_same_run && self.peek.is_none() {
                return None;
            }
            Some(Group::Same(start, n))
        } else {
            Some(Group::Diff(start, n))
        }
    }
}

impl<'a> GroupByValue<'a> {
    /// Create a new GroupByValue iterator.
    fn new(buf: &'a [u8]) -> Self {
        GroupByValue {
            buf,
            idx: 0,
        }
    }
}

impl<'a> Iterator for GroupByValue<'a> {
    type Item = Group;

    fn next(&mut self) -> Option<Group> {
        let start = self.idx;
        let c = *self.buf.get(start)?;
        let n = self.buf[start..].iter().take_while(|&&x| x == c).count();

        self.idx += n;
        Some(Group::Same(start, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_by_eq() {
        let xs = [ 1, 2, 3, 4, 5, 6, 7, 8, 9 ];
        let ys = [ 0, 0, 3, 4, 5, 0, 7, 8, 9 ];
        let expected = [
            Group::Same(0, 0), // prepend
            Group::Diff(0, 2), Group::Same(2, 3), Group::Diff(5, 1) ];

        let gs: Vec<Group>
            = GroupByEq::new(xs.iter(), ys.iter())
            .set_prepend_same_run()
            .set_ignore_final_same_run()
            .collect();

        assert_eq!(&gs[..], expected);
    }

    #[test]
    fn test_group_by_eq_leading_same() {
        let xs = [ 1, 2, 3, 4 ];
        let ys = [ 1, 2, 0, 4 ];
        let expected = [ Group::Same(0, 2), Group::Diff(2, 1) ];

        let gs: Vec<Group>
            = GroupByEq::new(xs.iter(), ys.iter())
            .set_prepend_same_run()
            .set_ignore_final_same_run()
            .collect();

        assert_eq!(&gs[..], expected);
    }

    #[test]
    fn test_group_by_eq_all_same() {
        let xs = [ 1, 2, 3 ];
        let gs: Vec<Group>
            = GroupByEq::new(xs.iter(), xs.iter())
            .set_prepend_same_run()
            .set_ignore_final_same_run()
            .collect();

        assert!(gs.is_empty());
    }

    #[test]
    fn test_group_by_value() {
        let xs = [ 1, 1, 3, 4, 4, 4, 4, 7, 7 ];
        let expected = [
            Group::Same(0, 2), Group::Same(2, 1), Group::Same(3, 4), Group::Same(7, 2) ];

        let gs: Vec<Group>
            = GroupByValue::new(&xs).collect();

        assert_eq!(&gs[..], expected);
    }

    #[test]
    fn test_chunk_kind_magic() {
        for &magic in &[4, 7, 11, 12, 13, 15, 16, 18, 99] {
            assert_eq!(ChunkKind::from_magic(magic).magic(), magic);
        }
        assert_eq!(ChunkKind::from_magic(99), ChunkKind::Unknown(99));
        assert!(ChunkKind::Color64.modifies_palette());
        assert!(!ChunkKind::Lc.modifies_palette());
    }
}
