//! UTCTime and GeneralizedTime.
//!
//! This is a private module. Its public items are re-exported by the parent.
//!
//! Times are kept as the characters they were encoded as. Nothing here
//! needs to calculate with them, so they are only checked for the
//! characters allowed in the respective syntax.

use std::{fmt, str};
use bytes::Bytes;
use crate::decode::Element;
use crate::encode::{Primitive, PrimitiveContent, Target};
use crate::error::Error;
use crate::ident::Tag;


//------------ UtcTime -------------------------------------------------------

/// A UTCTime value.
///
/// The value is of the form `YYMMDDhhmm[ss]Z` or with a time zone offset
/// instead of the `Z`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct UtcTime(Bytes);

impl UtcTime {
    /// Creates a value from its characters.
    pub fn new(value: Bytes) -> Result<Self, Error> {
        check_chars(&value, 0)?;
        Ok(UtcTime(value))
    }

    /// Decodes a value from an element.
    pub fn from_element(element: &Element) -> Result<Self, Error> {
        let content = element.expect_tag(Tag::UTC_TIME)?.primitive()?;
        check_chars(content, element.pos())?;
        Ok(UtcTime(content.clone()))
    }

    /// Returns the characters of the value.
    pub fn as_str(&self) -> &str {
        // Only ASCII characters are accepted.
        str::from_utf8(self.0.as_ref()).unwrap_or_default()
    }

    pub fn encode_ref(&self) -> Primitive<&Self> {
        self.encode()
    }
}

impl PrimitiveContent for &'_ UtcTime {
    const TAG: Tag = Tag::UTC_TIME;

    fn encoded_len(self) -> usize {
        self.0.len()
    }

    fn write_encoded<T: Target>(
        self, target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(self.0.as_ref())
    }
}

impl fmt::Display for UtcTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


//------------ GeneralizedTime -----------------------------------------------

/// A GeneralizedTime value.
///
/// The value is of the form `YYYYMMDDhh[mm[ss[.fff]]]` optionally followed
/// by `Z` or a time zone offset.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct GeneralizedTime(Bytes);

impl GeneralizedTime {
    /// Creates a value from its characters.
    pub fn new(value: Bytes) -> Result<Self, Error> {
        check_chars(&value, 0)?;
        Ok(GeneralizedTime(value))
    }

    /// Decodes a value from an element.
    pub fn from_element(element: &Element) -> Result<Self, Error> {
        let content = element.expect_tag(Tag::GENERALIZED_TIME)?.primitive()?;
        check_chars(content, element.pos())?;
        Ok(GeneralizedTime(content.clone()))
    }

    /// Returns the characters of the value.
    pub fn as_str(&self) -> &str {
        str::from_utf8(self.0.as_ref()).unwrap_or_default()
    }

    pub fn encode_ref(&self) -> Primitive<&Self> {
        self.encode()
    }
}

impl PrimitiveContent for &'_ GeneralizedTime {
    const TAG: Tag = Tag::GENERALIZED_TIME;

    fn encoded_len(self) -> usize {
        self.0.len()
    }

    fn write_encoded<T: Target>(
        self, target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(self.0.as_ref())
    }
}

impl fmt::Display for GeneralizedTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


//------------ Helpers -------------------------------------------------------

fn check_chars(content: &[u8], pos: usize) -> Result<(), Error> {
    let first_digits = content.iter().take_while(|ch| {
        ch.is_ascii_digit()
    }).count();
    if first_digits < 10 || !content.iter().all(|&ch| {
        ch.is_ascii_digit() || matches!(ch, b'Z' | b'.' | b',' | b'+' | b'-')
    }) {
        return xerr!(Err(Error::malformed("invalid time value", pos)))
    }
    Ok(())
}


//============ Tests =========================================================
