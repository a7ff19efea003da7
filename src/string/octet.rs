//! A BER-encoded OCTET STRING.
//!
//! This is an internal module. It’s public types are re-exported by the
//! parent.

use std::hash;
use bytes::Bytes;
use crate::captured::Captured;
use crate::decode::Element;
use crate::encode::{Choice2, PrimitiveContent, Target};
use crate::error::Error;
use crate::form::{EncodingForm, Tracked};
use crate::ident::Tag;
use super::StringEncoder;


//------------ OctetString ---------------------------------------------------

/// An octet string value.
///
/// An octet string is a sequence of octets, i.e., a glorified `[u8]`. Basic
/// Encoding Rules, however, allow this sequence to be broken up into chunks
/// that are encoded separatedly to allow for very large octet strings and
/// cases where one doesn’t yet know the length of the string. When decoding
/// such a string, the chunks are assembled into a single value.
///
/// # BER Encoding
///
/// Octet strings are either encoded as a primitive or a constructed value.
/// In the primitive form, the content octets are the string’s octets. In a
/// constructed form, the content is a sequence of encoded octets strings
/// which in turn may be primitive or constructed. In this case, the string’s
/// octets are the concatenation of all the content octets of the primitive
/// forms in the order as encountered.
///
/// In DER, only the primitive form is allowed. A string decoded from the
/// constructed form keeps that encoding and is written out in it again.
/// Strings created from octets always use the primitive form.
#[derive(Clone, Debug)]
pub struct OctetString {
    /// The octets of the string.
    octets: Bytes,

    /// The constructed encoding the string was decoded from.
    segments: Option<Captured>,
}

impl OctetString {
    /// Creates an octet string from a Bytes value.
    pub fn new(octets: Bytes) -> Self {
        OctetString { octets, segments: None }
    }

    /// Decodes an octet string from an element.
    ///
    /// For implicitly tagged strings, the element needs to be re-tagged
    /// first.
    pub fn from_element(element: &Element) -> Result<Self, Error> {
        let octets = element.expect_tag(Tag::OCTET_STRING)?.string_octets()?;
        let segments = if element.is_constructed() {
            Some(Captured::from_element(element))
        }
        else {
            None
        };
        Ok(OctetString { octets, segments })
    }

    /// Returns a slice of the string’s octets.
    pub fn as_slice(&self) -> &[u8] {
        self.octets.as_ref()
    }

    /// Returns a bytes value with the string’s octets.
    pub fn to_bytes(&self) -> Bytes {
        self.octets.clone()
    }

    /// Returns the length of the octet string.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns whether the octet string is empty.
    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }

    /// Returns a value encoder for the octet string using the natural tag.
    pub fn encode_ref(&self) -> StringEncoder<Self> {
        self.encode_ref_as(Tag::OCTET_STRING)
    }

    /// Returns a value encoder for the octet string using the given tag.
    pub fn encode_ref_as(&self, tag: Tag) -> StringEncoder<Self> {
        match self.segments {
            Some(ref segments) => Choice2::Two(segments.encode_ref_as(tag)),
            None => Choice2::One(self.encode_as(tag)),
        }
    }
}


//--- PartialEq, Eq, and Hash

impl PartialEq for OctetString {
    fn eq(&self, other: &Self) -> bool {
        self.octets == other.octets && self.segments == other.segments
    }
}

impl Eq for OctetString { }

impl hash::Hash for OctetString {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.octets.hash(state)
    }
}


//--- Tracked

impl Tracked for OctetString {
    fn form(&self) -> EncodingForm {
        self.segments.form()
    }
}


//--- From and AsRef

impl From<Bytes> for OctetString {
    fn from(bytes: Bytes) -> Self {
        Self::new(bytes)
    }
}

impl From<&'static [u8]> for OctetString {
    fn from(slice: &'static [u8]) -> Self {
        Self::new(Bytes::from_static(slice))
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}


//--- PrimitiveContent

impl PrimitiveContent for &'_ OctetString {
    const TAG: Tag = Tag::OCTET_STRING;

    fn encoded_len(self) -> usize {
        self.octets.len()
    }

    fn write_encoded<T: Target>(
        self, target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(self.octets.as_ref())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::encode::Values;
    use crate::mode::Mode;

    #[test]
    fn decode_forms() {
        let el = Element::decode(
            Bytes::from_static(b"\x24\x80\x04\x02ab\x04\x01c\x00\x00"),
            Mode::Ber
        ).unwrap();
        let s = OctetString::from_element(&el).unwrap();
        assert_eq!(s.as_slice(), b"abc");
        assert_eq!(s.form(), EncodingForm::Ber);
        assert_eq!(
            s.encode_ref().to_vec(Mode::Der),
            b"\x24\x80\x04\x02ab\x04\x01c\x00\x00"
        );
        assert_ne!(s, OctetString::from(&b"abc"[..]));
        assert_eq!(
            OctetString::from(&b"abc"[..]).encode_ref().to_vec(Mode::Ber),
            b"\x04\x03abc"
        );

        let el = Element::decode(
            Bytes::from_static(b"\x81\x02xy"), Mode::Der
        ).unwrap();
        assert!(OctetString::from_element(&el).is_err());
        let s = OctetString::from_element(
            &el.retag(Tag::OCTET_STRING).unwrap()
        ).unwrap();
        assert_eq!(s.as_slice(), b"xy");
        assert_eq!(s.form(), EncodingForm::Der);
        assert_eq!(
            s.encode_ref_as(Tag::ctx(1)).to_vec(Mode::Der), b"\x81\x02xy"
        );
    }

    #[test]
    fn implicit_segments() {
        let data = b"\xa1\x80\x04\x01x\x04\x01y\x00\x00";
        let el = Element::decode(Bytes::from_static(data), Mode::Ber).unwrap();
        let s = OctetString::from_element(
            &el.retag(Tag::OCTET_STRING).unwrap()
        ).unwrap();
        assert_eq!(s.as_slice(), b"xy");
        assert_eq!(s.form(), EncodingForm::Ber);
        assert_eq!(s.encode_ref_as(Tag::ctx(1)).to_vec(Mode::Der), data);
        assert_eq!(
            s.encode_ref().to_vec(Mode::Der),
            b"\x24\x80\x04\x01x\x04\x01y\x00\x00"
        );

        let el = Element::decode(
            Bytes::from_static(b"\xa1\x06\x04\x01x\x04\x01y"), Mode::Der
        ).unwrap();
        assert!(el.retag(Tag::OCTET_STRING).is_err());
    }
}
