//! BER encoded integers.
//!
//! This is a private module. Its public items are re-exported by the parent.

use bytes::Bytes;
use crate::decode::Element;
use crate::encode::{PrimitiveContent, Target};
use crate::error::Error;
use crate::ident::Tag;


//------------ Integer -------------------------------------------------------

/// A BER encoded integer.
///
/// As integers are variable length in BER, this type is just a simple wrapper
/// atop the underlying `Bytes` value containing the raw content. Integers
/// in the structures handled here are mostly serial numbers which can be
/// rather large, so the value is kept as is. Conversions into native types
/// are available for the small integers used as version numbers.
///
/// # BER Encoding
///
/// In BER, an INTEGER is encoded as a primitive value with the content octets
/// providing a variable-length, big-endian, two‘s complement byte sequence of
/// that integer. Thus, the most-significant bit of the first octet serves as
/// the sign bit. The content must be at least one octet long and must not
/// start with nine bits of the same value.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Integer(Bytes);

impl Integer {
    /// Decodes an integer from an element.
    pub fn from_element(element: &Element) -> Result<Self, Error> {
        let content = element.expect_tag(Tag::INTEGER)?.primitive()?;
        Self::from_content(content.clone(), element.pos())
    }

    /// Creates an integer from its content octets.
    ///
    /// The `pos` is only used for error reporting.
    pub fn from_content(content: Bytes, pos: usize) -> Result<Self, Error> {
        match (content.first(), content.get(1).map(|x| x & 0x80 != 0)) {
            (None, _) => {
                xerr!(Err(Error::malformed("empty integer", pos)))
            }
            (Some(0), Some(false)) | (Some(0xFF), Some(true)) => {
                xerr!(Err(Error::malformed("non-minimal integer", pos)))
            }
            _ => Ok(Integer(content))
        }
    }

    /// Creates an integer from an unsigned native integer.
    pub fn from_u64(value: u64) -> Self {
        let octets = value.to_be_bytes();
        let mut start = octets.iter().position(|&x| x != 0).unwrap_or(7);
        if octets[start] & 0x80 != 0 {
            // Need a leading zero octet to keep the value positive. There
            // is always one since `start` can only be 0 for values at least
            // 2^56 whose first octet is below 0x80.
            if start == 0 {
                let mut res = Vec::with_capacity(9);
                res.push(0);
                res.extend_from_slice(&octets);
                return Integer(res.into())
            }
            start -= 1;
        }
        Integer(Bytes::copy_from_slice(&octets[start..]))
    }

    /// Returns the content octets.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns whether the integer is negative.
    pub fn is_negative(&self) -> bool {
        self.0.first().map(|x| x & 0x80 != 0).unwrap_or(false)
    }

    /// Converts the integer into a `u32` if it fits.
    pub fn to_u32(&self) -> Option<u32> {
        if self.is_negative() {
            return None
        }
        let octets = match self.0.as_ref() {
            [0, rest @ ..] => rest,
            octets => octets,
        };
        if octets.len() > 4 {
            return None
        }
        Some(octets.iter().fold(0u32, |res, &x| (res << 8) | u32::from(x)))
    }
}


//--- From

impl From<u32> for Integer {
    fn from(value: u32) -> Self {
        Self::from_u64(value.into())
    }
}


//--- PrimitiveContent

impl PrimitiveContent for &'_ Integer {
    const TAG: Tag = Tag::INTEGER;

    fn encoded_len(self) -> usize {
        self.0.len()
    }

    fn write_encoded<T: Target>(
        self, target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(self.0.as_ref())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn content(data: &'static [u8]) -> Result<Integer, Error> {
        Integer::from_content(Bytes::from_static(data), 0)
    }

    #[test]
    fn check_content() {
        assert!(content(b"").is_err());
        assert!(content(b"\x00\x12").is_err());
        assert!(content(b"\xff\x80").is_err());
        assert!(content(b"\x00").is_ok());
        assert!(content(b"\x00\x80").is_ok());
        assert!(content(b"\xff\x12").is_ok());
    }

    #[test]
    fn from_u64() {
        assert_eq!(Integer::from_u64(0).as_slice(), b"\x00");
        assert_eq!(Integer::from_u64(5).as_slice(), b"\x05");
        assert_eq!(Integer::from_u64(0x80).as_slice(), b"\x00\x80");
        assert_eq!(Integer::from_u64(0x1234).as_slice(), b"\x12\x34");
        assert_eq!(
            Integer::from_u64(u64::MAX).as_slice(),
            b"\x00\xff\xff\xff\xff\xff\xff\xff\xff"
        );
    }

    #[test]
    fn to_u32() {
        assert_eq!(Integer::from_u64(3).to_u32(), Some(3));
        assert_eq!(Integer::from(0xdead_beef).to_u32(), Some(0xdead_beef));
        assert_eq!(Integer::from_u64(1 << 32).to_u32(), None);
        assert_eq!(content(b"\xff").unwrap().to_u32(), None);
        assert!(content(b"\xff").unwrap().is_negative());
    }

    #[test]
    fn encode() {
        let int = Integer::from_u64(0x80);
        assert_eq!(
            crate::encode::Values::to_vec(&int.encode(), crate::Mode::Der),
            b"\x02\x02\x00\x80"
        );
    }
}
