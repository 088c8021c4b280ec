//! The output side of a write schema.

use bytes::BufMut;

use crate::encode::Varint;

/// Append-only destination for encoded field values.
///
/// Implemented for every [`BufMut`], so a [`bytes::BytesMut`] or a plain [`Vec<u8>`] can be
/// handed directly to a write schema. A sink must not be shared between concurrent
/// serializations; ordering of writes is the caller's responsibility.
pub trait ByteSink {
    /// Writes a pre-encoded tag followed by `value` encoded as a protobuf `int32`.
    ///
    /// `tag_size` is the encoded length of `tag`, computed once at schema-build time.
    /// Implementations may trust it to skip re-encoding the tag, so it must match.
    fn write_scalar_int32(&mut self, tag: u32, tag_size: usize, value: i32);
}

impl<B> ByteSink for B
where
    B: BufMut + ?Sized,
{
    fn write_scalar_int32(&mut self, tag: u32, tag_size: usize, value: i32) {
        if tag_size == 1 {
            // fields 1 through 15, the tag is its own single byte varint.
            debug_assert!(tag < 0x80, "tag size doesn't match the encoded tag");
            self.put_u8(tag as u8);
        } else {
            let written = Varint::from_unsigned(tag as u64).encode(self);
            debug_assert_eq!(written, tag_size, "tag size doesn't match the encoded tag");
        }

        Varint::from_int32(value).encode(self);
    }
}
