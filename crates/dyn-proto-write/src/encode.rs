//! Basic protobuf wire primitives needed by the enum write path.
use std::fmt;

use bytes::{Buf, BufMut};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WireType {
    Varint = 0,
    Bits64 = 1,
    LengthDelimited = 2,
    StartGroup = 3,
    EndGroup = 4,
    Bits32 = 5,
}

impl WireType {
    const MASK: u32 = 0b111;

    pub const fn from_tag(tag: u32) -> Result<Self, DecodeError> {
        match tag & WireType::MASK {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Bits64),
            2 => Ok(Self::LengthDelimited),
            3 => Ok(Self::StartGroup),
            4 => Ok(Self::EndGroup),
            5 => Ok(Self::Bits32),
            unknown => Err(DecodeError::UnknownWireType(unknown as u8)),
        }
    }
}

/// A pre-encoded field key (field number + wire type), along with the number of bytes it
/// takes up once varint encoded.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    value: u32,
    size: usize,
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tag")
            .field("field_number", &self.field_number())
            .field("wire_type", &self.wire_type())
            .field("size", &self.size)
            .finish()
    }
}

impl Tag {
    /// Largest field number protobuf allows (2^29 - 1).
    pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

    /// Returns [`None`] if the field number is 0 or larger than [`Tag::MAX_FIELD_NUMBER`].
    pub const fn new(field_number: u32, wire_type: WireType) -> Option<Self> {
        if field_number == 0 || field_number > Self::MAX_FIELD_NUMBER {
            return None;
        }

        let value = (field_number << 3) | wire_type as u32;
        let size = Varint::from_unsigned(value as u64).encoded_len();

        Some(Self { value, size })
    }

    #[inline]
    pub const fn value(&self) -> u32 {
        self.value
    }

    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    pub const fn field_number(&self) -> u32 {
        self.value >> 3
    }

    pub const fn wire_type(&self) -> WireType {
        match WireType::from_tag(self.value) {
            Ok(wt) => wt,
            Err(_) => panic!("Tag.value should always be valid (checked when Tag is constructed)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Varint(u64);

impl Varint {
    const MSB: u8 = 1 << 7;
    const MSB_MASK: u8 = !Self::MSB;

    /// Longest possible encoding of a 64 bit varint.
    pub const MAX_LEN: usize = 10;

    pub const fn from_unsigned(uint: u64) -> Self {
        Self(uint)
    }

    /// `int32` (and `enum`) values are sign extended to 64 bits before encoding, so any
    /// negative value always takes [`Varint::MAX_LEN`] bytes.
    pub const fn from_int32(int: i32) -> Self {
        Self(int as i64 as u64)
    }

    pub const fn as_uint(&self) -> u64 {
        self.0
    }

    /// Truncates back down to an `int32`, the inverse of [`Varint::from_int32`].
    pub const fn as_int32(&self) -> i32 {
        self.0 as i32
    }

    pub const fn encoded_len(&self) -> usize {
        // every 7 bits of payload takes a byte, and 0 still needs 1 byte.
        let bits = u64::BITS - (self.0 | 1).leading_zeros();
        bits.div_ceil(7) as usize
    }

    pub fn encode<B>(&self, dst: &mut B) -> usize
    where
        B: BufMut + ?Sized,
    {
        let mut value = self.0;
        let mut bytes_inserted = 0;

        loop {
            let byte = (value as u8) & Varint::MSB_MASK;
            value >>= 7;
            bytes_inserted += 1;

            if value == 0 {
                dst.put_u8(byte);
                return bytes_inserted;
            }

            dst.put_u8(byte | Varint::MSB);
        }
    }

    pub fn decode<B>(bytes: &mut B) -> Result<Self, DecodeError>
    where
        B: Buf,
    {
        let mut result = 0_u64;

        for offset in 0..Self::MAX_LEN {
            if !bytes.has_remaining() {
                return Err(DecodeError::VarintEof);
            }

            let b = bytes.get_u8();
            result |= ((b & Varint::MSB_MASK) as u64) << (7 * offset);

            if (b & Varint::MSB) != Varint::MSB {
                return Ok(Varint(result));
            }
        }

        Err(DecodeError::VarintTooLong)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("ran out of bytes before varint ended")]
    VarintEof,
    #[error("varint surpassed 64 bits of encoded data")]
    VarintTooLong,
    #[error("encountered unknown wire type: {0}. (should be 0 - 5 inclusive)")]
    UnknownWireType(u8),
    #[error("expected a varint field, found wire type {0:?}")]
    UnexpectedWireType(WireType),
    #[error("field number {0} is out of range")]
    InvalidFieldNumber(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_to_vec(varint: Varint) -> Vec<u8> {
        let mut dst: Vec<u8> = Vec::new();
        let written = varint.encode(&mut dst);
        assert_eq!(written, dst.len());
        assert_eq!(written, varint.encoded_len());
        dst
    }

    #[test]
    fn test_raw_varint_decode() {
        const VARINT_ENCODED: &[u8] = &[0b10101100, 0b00000010];

        let mut bytes = VARINT_ENCODED;
        let result = Varint::decode(&mut bytes).unwrap();

        assert_eq!(result, Varint(300));
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_varint_encode() {
        assert_eq!(encode_to_vec(Varint(0)), [0x00]);
        assert_eq!(encode_to_vec(Varint(1)), [0x01]);
        assert_eq!(encode_to_vec(Varint(150)), [0x96, 0x01]);
        assert_eq!(encode_to_vec(Varint(300)), [0xAC, 0x02]);
    }

    #[test]
    fn test_negative_int32_is_sign_extended() {
        let encoded = encode_to_vec(Varint::from_int32(-1));
        assert_eq!(
            encoded,
            [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]
        );

        let mut buf = encoded.as_slice();
        assert_eq!(Varint::decode(&mut buf).unwrap().as_int32(), -1);
    }

    #[test]
    fn test_varint_int32_random() {
        use rand::Rng;
        use rand::distr::StandardUniform;

        let mut rng = rand::rng();

        for int in (&mut rng).sample_iter::<i32, _>(StandardUniform).take(10000) {
            let encoded = encode_to_vec(Varint::from_int32(int));
            let mut buf = encoded.as_slice();
            assert_eq!(int, Varint::decode(&mut buf).unwrap().as_int32());
            assert!(buf.is_empty());
        }
    }

    #[test]
    fn test_decode_errors() {
        let mut empty: &[u8] = &[];
        assert_eq!(Varint::decode(&mut empty), Err(DecodeError::VarintEof));

        let mut unterminated: &[u8] = &[0x80, 0x80];
        assert_eq!(Varint::decode(&mut unterminated), Err(DecodeError::VarintEof));

        let mut too_long: &[u8] = &[0xFF; 11];
        assert_eq!(Varint::decode(&mut too_long), Err(DecodeError::VarintTooLong));
    }

    #[test]
    fn test_tag() {
        let tag = Tag::new(1, WireType::Varint).unwrap();
        assert_eq!(tag.value(), 0x08);
        assert_eq!(tag.size(), 1);
        assert_eq!(tag.field_number(), 1);
        assert_eq!(tag.wire_type(), WireType::Varint);

        let wide = Tag::new(16, WireType::Varint).unwrap();
        assert_eq!(wide.value(), 128);
        assert_eq!(wide.size(), 2);

        assert!(Tag::new(0, WireType::Varint).is_none());
        assert!(Tag::new(Tag::MAX_FIELD_NUMBER + 1, WireType::Varint).is_none());
        assert_eq!(
            Tag::new(Tag::MAX_FIELD_NUMBER, WireType::Varint).unwrap().size(),
            5
        );
    }
}
