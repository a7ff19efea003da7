//! The identifier octets of an encoded value.
//!
//! This is a private module. The relevant items are re-exported by the
//! parent.

use std::fmt;
use crate::error::Error;


//------------ Tag -----------------------------------------------------------

/// The tag of a value.
///
/// In ASN.1, tags are used to identify the type of a value. Tags consist of
/// one of four classes, represented by the [`Class`] enum, and a number
/// within this class. The number is an unsigned integer.
///
/// In BER encoding, the tag becomes part of the identifier octets by
/// combining it with a bit indicating whether a value is primitive or
/// constructed.
///
/// # Limitations
///
/// We only support tag numbers that fit into a `u32`. This should be more
/// than enough in practice.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Tag {
    class: Class,
    number: u32,
}

impl Tag {
    /// Creates a tag from a class and number.
    pub const fn new(class: Class, number: u32) -> Self {
        Tag { class, number }
    }

    /// Creates a tag in class “context dependent” with the given number.
    pub const fn ctx(number: u32) -> Self {
        Self::new(Class::Context, number)
    }

    /// Returns the class of the tag.
    pub const fn class(self) -> Class {
        self.class
    }

    /// Returns the number of the tag.
    pub const fn number(self) -> u32 {
        self.number
    }

    /// Returns whether this is a context specific tag.
    pub fn is_context(self) -> bool {
        self.class == Class::Context
    }

    /// Returns whether this is the tag of a string type.
    ///
    /// Values with these tags may use the constructed form under BER only.
    pub fn is_string(self) -> bool {
        self.class == Class::Universal && matches!(
            self.number, 3 | 4 | 12 | 18..=22 | 25..=28 | 30
        )
    }
}

/// # Constants for universal tags.
///
/// See clause 8.4 of ITU Recommendation X.690.
///
impl Tag {
    /// The tag marking the end-of-contents in an indefinite length value.
    pub const END_OF_CONTENTS: Self = Self::new(Class::Universal, 0);

    /// The tag for the BOOLEAN type, UNIVERSAL 1.
    pub const BOOLEAN: Self = Self::new(Class::Universal, 1);

    /// The tag for the INTEGER type, UNIVERSAL 2.
    pub const INTEGER: Self = Self::new(Class::Universal, 2);

    /// The tag for the BIT STRING type, UNIVERSAL 3.
    pub const BIT_STRING: Self = Self::new(Class::Universal, 3);

    /// The tag for the OCTET STRING type, UNIVERSAL 4.
    pub const OCTET_STRING: Self = Self::new(Class::Universal, 4);

    /// The tag for the NULL type, UNIVERSAL 5.
    pub const NULL: Self = Self::new(Class::Universal, 5);

    /// The tag for the OBJECT IDENTIFIER type, UNIVERSAL 6.
    pub const OID: Self = Self::new(Class::Universal, 6);

    /// The tag for the UTF8String type, UNIVERSAL 12
    pub const UTF8_STRING: Self = Self::new(Class::Universal, 12);

    /// The tag for the SEQUENCE and SEQUENCE OF types, UNIVERSAL 16.
    pub const SEQUENCE: Self = Self::new(Class::Universal, 16);

    /// The tag for the SET and SET OF types, UNIVERSAL 17.
    pub const SET: Self = Self::new(Class::Universal, 17);

    /// The tag for the PrintableString type, UNIVERSAL 19.
    pub const PRINTABLE_STRING: Self = Self::new(Class::Universal, 19);

    /// The tag for the IA5String type, UNIVERSAL 22.
    pub const IA5_STRING: Self = Self::new(Class::Universal, 22);

    /// The tag for the UTCTime type, UNIVERSAL 23.
    pub const UTC_TIME: Self = Self::new(Class::Universal, 23);

    /// The tag for the GeneralizedType type, UNIVERSAL 24.
    pub const GENERALIZED_TIME: Self = Self::new(Class::Universal, 24);
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tag::END_OF_CONTENTS => write!(f, "end-of-contents"),
            Tag::BOOLEAN => write!(f, "BOOLEAN"),
            Tag::INTEGER => write!(f, "INTEGER"),
            Tag::BIT_STRING => write!(f, "BIT STRING"),
            Tag::OCTET_STRING => write!(f, "OCTET STRING"),
            Tag::NULL => write!(f, "NULL"),
            Tag::OID => write!(f, "OBJECT IDENTIFIER"),
            Tag::UTF8_STRING => write!(f, "UTF8String"),
            Tag::SEQUENCE => write!(f, "SEQUENCE"),
            Tag::SET => write!(f, "SET"),
            Tag::PRINTABLE_STRING => write!(f, "PrintableString"),
            Tag::IA5_STRING => write!(f, "IA5String"),
            Tag::UTC_TIME => write!(f, "UTCTime"),
            Tag::GENERALIZED_TIME => write!(f, "GeneralizedTime"),
            tag => {
                match tag.class() {
                    Class::Universal => write!(f, "[UNIVERSAL ")?,
                    Class::Application => write!(f, "[APPLICATION ")?,
                    Class::Context => write!(f, "[")?,
                    Class::Private => write!(f, "[PRIVATE ")?,
                }
                write!(f, "{}]", tag.number())
            }
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}


//------------ Class ---------------------------------------------------------

/// The class of a tag.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Class {
    Universal,
    Application,
    Context,
    Private,
}

impl Class {
    const fn from_u8(octet: u8) -> Self {
        match octet {
            0x00..=0x3F => Self::Universal,
            0x40..=0x7F => Self::Application,
            0x80..=0xBF => Self::Context,
            0xC0..=0xFF => Self::Private
        }
    }

    const fn into_u8(self) -> u8 {
        match self {
            Self::Universal => 0x00,
            Self::Application => 0x40,
            Self::Context => 0x80,
            Self::Private => 0xC0,
        }
    }
}


//------------ Ident ---------------------------------------------------------

/// The identifier octets of a value.
///
/// This is the tag plus the bit that says whether the value is constructed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Ident {
    tag: Tag,
    constructed: bool,
}

impl Ident {
    /// Creates identifier octets from a tag.
    pub const fn from_tag(tag: Tag, constructed: bool) -> Self {
        Ident { tag, constructed }
    }

    /// Returns the tag for the identifier octets.
    pub const fn tag(self) -> Tag {
        self.tag
    }

    /// Returns whether the value is to be a constructed value.
    pub const fn is_constructed(self) -> bool {
        self.constructed
    }

    /// Takes the identifier octets from the beginning of `data`.
    ///
    /// Returns the identifier and the number of octets it occupied. The
    /// `pos` argument is the offset of `data` in the overall input and is
    /// only used for error reporting.
    pub fn take_from(data: &[u8], pos: usize) -> Result<(Self, usize), Error> {
        let first = match data.first() {
            Some(first) => *first,
            None => {
                return xerr!(Err(Error::malformed(
                    "unexpected end of data", pos
                )))
            }
        };
        let class = Class::from_u8(first);
        let constructed = first & 0x20 != 0;

        // If we have a single octet tag, we can already return.
        if (first & 0x1f) < 0x1f {
            return Ok((
                Ident::from_tag(
                    Tag::new(class, u32::from(first & 0x1f)), constructed
                ),
                1
            ))
        }

        // Work your way through the multi-octet tags. The first subsequent
        // octet must not be 0x80 since that would be a leading zero.
        if data.get(1) == Some(&0x80) {
            return xerr!(Err(Error::malformed(
                "non-minimal tag number", pos
            )))
        }
        let mut number = 0u32;
        for (i, octet) in data.iter().enumerate().skip(1) {
            if number > (u32::MAX >> 7) {
                return xerr!(Err(Error::malformed(
                    "tag numbers above 32 bits not supported", pos
                )))
            }
            number = (number << 7) | u32::from(octet & 0x7F);
            if octet & 0x80 == 0 {
                if number < 0x1f {
                    return xerr!(Err(Error::malformed(
                        "low tag number in long form", pos
                    )))
                }
                return Ok((
                    Ident::from_tag(Tag::new(class, number), constructed),
                    i + 1
                ))
            }
        }
        xerr!(Err(Error::malformed("unexpected end of data", pos)))
    }

    /// Returns the number of octets of the encoded form of the identifier.
    pub fn encoded_len(self) -> usize {
        let number = self.tag.number();
        if number < 0x1f {
            return 1
        }
        let mut len = 2;
        let mut rest = number >> 7;
        while rest != 0 {
            len += 1;
            rest >>= 7;
        }
        len
    }

    /// Appends the identifier octets to a target.
    pub fn write_encoded(self, target: &mut Vec<u8>) {
        let first = if self.constructed {
            self.tag.class().into_u8() | 0x20
        }
        else {
            self.tag.class().into_u8()
        };
        let number = self.tag.number();
        if number < 0x1f {
            // five bits but not all of them one (so not 0x1f)
            target.push(first | number as u8);
            return
        }
        target.push(first | 0x1f);

        // Base 128 with the high bit set on all but the last octet.
        let len = self.encoded_len() - 1;
        for i in (0..len).rev() {
            let seven = ((number >> (7 * i)) & 0x7F) as u8;
            if i == 0 {
                target.push(seven)
            }
            else {
                target.push(seven | 0x80)
            }
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn take_single_octet() {
        let (ident, len) = Ident::take_from(b"\x30\x00", 0).unwrap();
        assert_eq!(ident.tag(), Tag::SEQUENCE);
        assert!(ident.is_constructed());
        assert_eq!(len, 1);

        let (ident, _) = Ident::take_from(b"\xa3", 0).unwrap();
        assert_eq!(ident.tag(), Tag::ctx(3));
        assert!(ident.is_constructed());

        let (ident, _) = Ident::take_from(b"\x80", 0).unwrap();
        assert_eq!(ident.tag(), Tag::ctx(0));
        assert!(!ident.is_constructed());
    }

    #[test]
    fn take_multi_octet() {
        let (ident, len) = Ident::take_from(b"\x9f\x1f", 0).unwrap();
        assert_eq!(ident.tag(), Tag::ctx(31));
        assert_eq!(len, 2);

        let (ident, len) = Ident::take_from(b"\x5f\x81\x00", 0).unwrap();
        assert_eq!(ident.tag(), Tag::new(Class::Application, 128));
        assert_eq!(len, 3);

        assert!(Ident::take_from(b"\x9f\x80\x01", 0).is_err());
        assert!(Ident::take_from(b"\x9f\x05", 0).is_err());
        assert!(Ident::take_from(b"\x9f\x81", 0).is_err());
        assert!(Ident::take_from(b"", 0).is_err());
    }

    #[test]
    fn write_encoded() {
        fn step(tag: Tag, constructed: bool, expected: &[u8]) {
            let ident = Ident::from_tag(tag, constructed);
            let mut vec = Vec::new();
            ident.write_encoded(&mut vec);
            assert_eq!(vec.as_slice(), expected, "{tag}");
            assert_eq!(ident.encoded_len(), expected.len());
            assert_eq!(Ident::take_from(&vec, 0).unwrap(), (ident, vec.len()));
        }

        step(Tag::INTEGER, false, b"\x02");
        step(Tag::SET, true, b"\x31");
        step(Tag::ctx(2), true, b"\xa2");
        step(Tag::ctx(31), false, b"\x9f\x1f");
        step(Tag::new(Class::Private, 0x4000), true, b"\xff\x81\x80\x00");
    }

    #[test]
    fn display() {
        assert_eq!(Tag::SEQUENCE.to_string(), "SEQUENCE");
        assert_eq!(Tag::ctx(4).to_string(), "[4]");
        assert_eq!(
            Tag::new(Class::Application, 3).to_string(), "[APPLICATION 3]"
        );
    }
}
