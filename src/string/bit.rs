//! BER-encoded bit strings.
//!
//! This is a private module. Its public items are re-exported by the parent.

use bytes::Bytes;
use crate::decode::Element;
use crate::encode::{Primitive, PrimitiveContent, Target};
use crate::error::Error;
use crate::ident::Tag;


//------------ BitString -----------------------------------------------------

/// A bit string value.
///
/// Bit strings are a sequence of bits. Unlike
/// [`OctetString`][crate::string::OctetString]s, they do not need to contain
/// a multiple of eight bits.
///
/// There are two types of methods for accessing the data in a bit string.
/// Methods starting with `bit` operate on the individual bits while those
/// prefixed with `octet` access entire octets and ignore the fact that there
/// may be unused bits in the final octet.
///
/// # BER Encoding
///
/// If encoded as a primitive value, the first octet of the
/// content contains the number of unused bits in the last octet and the
/// following octets contain the bits with the first bit in the most
/// significant bit of the octet.
///
/// BER also allows a constructed encoding. Since none of the structures
/// handled here use it in practice, it is rejected.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BitString {
    /// The number of unused bits in the last byte.
    unused: u8,

    /// The bytes of the bit string.
    bits: Bytes,
}

impl BitString {
    /// Creates a new bit string.
    ///
    /// Returns `None` if `unused` is larger than seven or if it isn’t zero
    /// for an empty string.
    pub fn new(unused: u8, bits: Bytes) -> Option<Self> {
        if unused > 7 || (bits.is_empty() && unused != 0) {
            return None
        }
        Some(Self { unused, bits })
    }

    /// Decodes a bit string from an element.
    pub fn from_element(element: &Element) -> Result<Self, Error> {
        let content = element.expect_tag(Tag::BIT_STRING)?.primitive()?;
        let unused = match content.first() {
            Some(unused) => *unused,
            None => {
                return xerr!(Err(Error::malformed(
                    "empty bit string", element.pos()
                )))
            }
        };
        match Self::new(unused, content.slice(1..)) {
            Some(res) => Ok(res),
            None => {
                xerr!(Err(Error::malformed(
                    "invalid bit string", element.pos()
                )))
            }
        }
    }

    /// Returns the value of the given bit.
    pub fn bit(&self, bit: usize) -> bool {
        if bit >= self.bit_len() {
            return false
        }
        let idx = bit >> 3;
        let bit = 7 - (bit as u8 & 7);
        self.bits[idx] & (1 << bit) != 0
    }

    /// Returns the number of bits in the bit string.
    pub fn bit_len(&self) -> usize {
        (self.bits.len() << 3) - (self.unused as usize)
    }

    /// Returns the number of unused bits in the last octet.
    pub fn unused(&self) -> u8 {
        self.unused
    }

    /// Returns the number of octets in the bit string.
    pub fn octet_len(&self) -> usize {
        self.bits.len()
    }

    /// Returns a slice of the octets in the bit string.
    pub fn octet_slice(&self) -> &[u8] {
        self.bits.as_ref()
    }

    /// Returns a value encoder for the bit string using the natural tag.
    pub fn encode_ref(&self) -> Primitive<&Self> {
        self.encode()
    }
}


//--- PrimitiveContent

impl PrimitiveContent for &'_ BitString {
    const TAG: Tag = Tag::BIT_STRING;

    fn encoded_len(self) -> usize {
        self.bits.len() + 1
    }

    fn write_encoded<T: Target>(
        self, target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(&[self.unused])?;
        target.write_all(self.bits.as_ref())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::encode::Values;
    use crate::mode::Mode;

    #[test]
    fn decode_and_bits() {
        let el = Element::decode(
            Bytes::from_static(b"\x03\x03\x04\xa0\xf0"), Mode::Der
        ).unwrap();
        let bits = BitString::from_element(&el).unwrap();
        assert_eq!(bits.unused(), 4);
        assert_eq!(bits.bit_len(), 12);
        assert!(bits.bit(0));
        assert!(!bits.bit(1));
        assert!(bits.bit(8));
        assert!(!bits.bit(12));
        assert_eq!(
            bits.encode_ref().to_vec(Mode::Der), b"\x03\x03\x04\xa0\xf0"
        );
    }

    #[test]
    fn reject_invalid() {
        for bad in [
            &b"\x03\x00"[..], &b"\x03\x01\x01"[..], &b"\x03\x02\x08\x00"[..]
        ] {
            let el = Element::decode(Bytes::from_static(bad), Mode::Der)
                .unwrap();
            assert!(BitString::from_element(&el).is_err());
        }
    }
}
