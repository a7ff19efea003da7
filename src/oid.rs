//! ASN.1 Object Identifiers.
//!
//! This module contains the [`Oid`] type that implements object identifiers,
//! a construct used by ASN.1 to uniquely identify all sorts of things. The
//! type is also re-exported at the top-level.

use std::{fmt, hash};
use bytes::Bytes;
use crate::decode::Element;
use crate::encode::{PrimitiveContent, Target};
use crate::error::Error;
use crate::ident::Tag;


//------------ Oid -----------------------------------------------------------

/// An object identifer.
///
/// Object identifiers are globally unique, hierarchical values that are used
/// to identify objects or their type. When written, they are presented as a
/// sequence of integers separated by dots such as ‘1.2.840.113549.1.7.1’.
///
/// Values of this type keep a single object identifer in its BER encoding,
/// i.e., in some form of byte sequence. Because different representations
/// may be useful, the type is actually generic over something that can
/// become a reference to a bytes slice. Decoding is only defined for `Bytes`
/// values, though.
///
/// The main use for object identifiers is to compare them to predefined
/// values. For this purpose, the known object identifiers are defined as
/// constants of `Oid<&'static [u8]>` – or its type alias `ConstOid` – in
/// the `oid` module of the respective structures.
#[derive(Clone, Debug)]
pub struct Oid<T: AsRef<[u8]> = Bytes>(pub T);

/// A type alias for `Oid<&'static [u8]>.
///
/// This is useful when defining object identifier constants.
pub type ConstOid = Oid<&'static [u8]>;


/// # Decoding
///
impl Oid<Bytes> {
    /// Decodes an object identifier from an element.
    pub fn from_element(element: &Element) -> Result<Self, Error> {
        let content = element.expect_tag(Tag::OID)?.primitive()?;
        Self::check_content(content, element.pos())?;
        Ok(Oid(content.clone()))
    }

    /// Checks that the content octets are a valid object identifier.
    ///
    /// Each subidentifier has to be encoded in the minimum number of octets
    /// and the last octet must not announce a following one.
    fn check_content(content: &[u8], pos: usize) -> Result<(), Error> {
        match content.last() {
            None => {
                return xerr!(Err(Error::malformed(
                    "empty object identifier", pos
                )))
            }
            Some(last) if last & 0x80 != 0 => {
                return xerr!(Err(Error::malformed(
                    "truncated object identifier", pos
                )))
            }
            _ => { }
        }
        let mut start = true;
        for &octet in content {
            if start && octet == 0x80 {
                return xerr!(Err(Error::malformed(
                    "non-minimal object identifier component", pos
                )))
            }
            start = octet & 0x80 == 0;
        }
        Ok(())
    }
}

impl<T: AsRef<[u8]>> Oid<T> {
    /// Returns an iterator to the components of this object identifiers.
    pub fn iter(&self) -> Iter {
        Iter::new(self.0.as_ref())
    }
}


//--- From

impl From<ConstOid> for Oid<Bytes> {
    fn from(src: ConstOid) -> Self {
        Oid(Bytes::from_static(src.0))
    }
}


//--- AsRef

impl<T: AsRef<[u8]>> AsRef<[u8]> for Oid<T> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}


//--- PartialEq and Eq

impl<T: AsRef<[u8]>, U: AsRef<[u8]>> PartialEq<Oid<U>> for Oid<T> {
    fn eq(&self, other: &Oid<U>) -> bool {
        self.0.as_ref() == other.0.as_ref()
    }
}

impl<T: AsRef<[u8]>> Eq for Oid<T> { }


//--- Hash

impl<T: AsRef<[u8]>> hash::Hash for Oid<T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.0.as_ref().hash(state)
    }
}


//--- Display

impl<T: AsRef<[u8]>> fmt::Display for Oid<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for component in self.iter() {
            if !first {
                f.write_str(".")?;
            }
            first = false;
            match component.to_u32() {
                Some(val) => write!(f, "{}", val)?,
                None => f.write_str("(not implemented)")?,
            }
            // The first subidentifier contains two components.
            if let Some(second) = component.second() {
                write!(f, ".{}", second)?;
            }
        }
        Ok(())
    }
}


//--- PrimitiveContent

impl<T: AsRef<[u8]>> PrimitiveContent for &'_ Oid<T> {
    const TAG: Tag = Tag::OID;

    fn encoded_len(self) -> usize {
        self.0.as_ref().len()
    }

    fn write_encoded<W: Target>(
        self, target: &mut W
    ) -> Result<(), W::Error> {
        target.write_all(self.0.as_ref())
    }
}


//------------ Component -----------------------------------------------------

/// A subidentifier of an object identifier.
///
/// Although these are integers, they are encoded in a slightly inconvenient
/// way. Because of this we don’t convert them to native integers but rather
/// keep them as references to the underlying octets.
///
/// Note that the first subidentifier holds the first two components of the
/// object identifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Component<'a> {
    /// Whether this is the first subidentifier.
    first: bool,

    /// The octets of the subidentifer.
    ///
    /// The most significant bit of each octet indicates whether there are
    /// more octets to follow, the lower seven bits are then shifted
    /// accordingly to make up an unsigned integer in big endian notation.
    slice: &'a [u8],
}

impl<'a> Component<'a> {
    /// Returns the integer value of the subidentifier if it fits a `u32`.
    fn value(self) -> Option<u32> {
        // This can be at most five octets with at most four bits in the
        // topmost octet.
        if self.slice.len() > 5
            || (self.slice.len() == 5 && self.slice[0] & 0x70 != 0)
        {
            return None
        }
        Some(self.slice.iter().fold(0, |res, &ch| {
            res << 7 | u32::from(ch & 0x7F)
        }))
    }

    /// Attempts to convert the component to `u32`.
    ///
    /// For the first subidentifier, this is the first component of the
    /// object identifier.
    pub fn to_u32(self) -> Option<u32> {
        let value = self.value()?;
        if !self.first {
            Some(value)
        }
        else if value < 40 {
            Some(0)
        }
        else if value < 80 {
            Some(1)
        }
        else {
            Some(2)
        }
    }

    /// Returns the second component if this is the first subidentifier.
    pub fn second(self) -> Option<u32> {
        if !self.first {
            return None
        }
        let value = self.value()?;
        if value < 80 {
            Some(value % 40)
        }
        else {
            Some(value - 80)
        }
    }
}


//------------ Iter ----------------------------------------------------------

/// An iterator over the sub-identifiers in an object identifier.
pub struct Iter<'a> {
    /// The remainder of the object identifier’s encoded octets.
    slice: &'a [u8],

    /// Whether the next subidentifier is the first one.
    first: bool,
}

impl<'a> Iter<'a> {
    /// Creates a new iterator.
    fn new(slice: &'a [u8]) -> Self {
        Iter { slice, first: true }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Component<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        // A truncated last subidentifier is silently dropped.
        let end = self.slice.iter().position(|ch| ch & 0x80 == 0)?;
        let (res, tail) = self.slice.split_at(end + 1);
        self.slice = tail;
        let first = self.first;
        self.first = false;
        Some(Component { first, slice: res })
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::mode::Mode;

    const ID_DATA: ConstOid = Oid(&[42, 134, 72, 134, 247, 13, 1, 7, 1]);

    #[test]
    fn display() {
        assert_eq!(ID_DATA.to_string(), "1.2.840.113549.1.7.1");
        assert_eq!(Oid(&b"\x88\x37\x03"[..]).to_string(), "2.999.3");
        assert_eq!(Oid(&b"\x80"[..]).to_string(), "");
    }

    #[test]
    fn decode() {
        let el = Element::decode(
            Bytes::from_static(b"\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x07\x01"),
            Mode::Der
        ).unwrap();
        let oid = Oid::from_element(&el).unwrap();
        assert_eq!(oid, ID_DATA);
        assert_eq!(Oid::<Bytes>::from(ID_DATA), oid);

        for bad in [
            &b"\x06\x00"[..], &b"\x06\x02\x2a\x86"[..],
            &b"\x06\x02\x80\x01"[..], &b"\x04\x01\x2a"[..],
        ] {
            let el = Element::decode(Bytes::from_static(bad), Mode::Der)
                .unwrap();
            assert!(Oid::from_element(&el).is_err());
        }
    }
}
