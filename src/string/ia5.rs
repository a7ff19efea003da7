//! The IA5String character string.
//!
//! This is an internal module. It’s public types are re-exported by the
//! parent.

use std::{fmt, hash, str};
use bytes::Bytes;
use crate::captured::Captured;
use crate::decode::Element;
use crate::encode::{Choice2, PrimitiveContent, Target};
use crate::error::Error;
use crate::form::{EncodingForm, Tracked};
use crate::ident::Tag;
use super::StringEncoder;


//------------ Ia5String -----------------------------------------------------

/// A character string containing ASCII characters.
///
/// This character string allows all ASCII characters (i.e., octets with
/// values `0x00` to `0x7F`) and encodes them with their ASCII value.
///
/// The type’s name is derived from the name used in ASN.1. It is derived
/// from the name IA5 or International Alphabet No. 5 which is the ITU name
/// for ASCII.
///
/// Like octet strings, a string decoded from the constructed form keeps
/// that encoding.
#[derive(Clone, Debug)]
pub struct Ia5String {
    /// The characters of the string.
    octets: Bytes,

    /// The constructed encoding the string was decoded from.
    segments: Option<Captured>,
}

impl Ia5String {
    /// Creates a string from its octets.
    ///
    /// Fails if any of the octets isn’t ASCII.
    pub fn new(bytes: Bytes) -> Result<Self, Error> {
        Self::check(&bytes, 0)?;
        Ok(Ia5String { octets: bytes, segments: None })
    }

    /// Creates a string from a static str.
    pub fn from_static(s: &'static str) -> Result<Self, Error> {
        Self::new(Bytes::from_static(s.as_bytes()))
    }

    /// Decodes a string from an element.
    ///
    /// For implicitly tagged strings, the element needs to be re-tagged
    /// first.
    pub fn from_element(element: &Element) -> Result<Self, Error> {
        let octets = element.expect_tag(Tag::IA5_STRING)?.string_octets()?;
        Self::check(&octets, element.pos())?;
        let segments = if element.is_constructed() {
            Some(Captured::from_element(element))
        }
        else {
            None
        };
        Ok(Ia5String { octets, segments })
    }

    fn check(octets: &[u8], pos: usize) -> Result<(), Error> {
        if octets.is_ascii() {
            Ok(())
        }
        else {
            xerr!(Err(Error::malformed("non-ASCII IA5String", pos)))
        }
    }

    pub fn as_str(&self) -> &str {
        str::from_utf8(self.octets.as_ref()).unwrap_or_default()
    }

    pub fn encode_ref(&self) -> StringEncoder<Self> {
        self.encode_ref_as(Tag::IA5_STRING)
    }

    pub fn encode_ref_as(&self, tag: Tag) -> StringEncoder<Self> {
        match self.segments {
            Some(ref segments) => Choice2::Two(segments.encode_ref_as(tag)),
            None => Choice2::One(self.encode_as(tag)),
        }
    }
}

impl PartialEq for Ia5String {
    fn eq(&self, other: &Self) -> bool {
        self.octets == other.octets && self.segments == other.segments
    }
}

impl Eq for Ia5String { }

impl hash::Hash for Ia5String {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.octets.hash(state)
    }
}

impl Tracked for Ia5String {
    fn form(&self) -> EncodingForm {
        self.segments.form()
    }
}

impl PrimitiveContent for &'_ Ia5String {
    const TAG: Tag = Tag::IA5_STRING;

    fn encoded_len(self) -> usize {
        self.octets.len()
    }

    fn write_encoded<T: Target>(
        self, target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(self.octets.as_ref())
    }
}

impl fmt::Display for Ia5String {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


//============ Tests =========================================================
