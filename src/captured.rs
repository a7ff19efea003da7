//! Captured encoded data.
//!
//! This is a private module. Its public items are re-exported by the parent.

use bytes::Bytes;
use crate::decode::Element;
use crate::encode::{Target, Values};
use crate::error::Error;
use crate::form::{EncodingForm, Tracked};
use crate::ident::{Ident, Tag};
use crate::mode::Mode;


//------------ Captured ------------------------------------------------------

/// A single encoded value kept as is.
///
/// Values that are not interpreted any further, such as certificates or
/// algorithm parameters, are kept in their encoded form. When encoded
/// again, the octets are written out unchanged, so the value keeps
/// whatever form it was originally encoded in.
///
/// A captured value always carries the natural tag of its type. If it was
/// decoded from an implicitly tagged field, the identifier octets are
/// replaced when capturing. Use [`encode_ref_as`][Self::encode_ref_as] to write
/// the value with an implicit tag again.
#[derive(Clone, Debug)]
pub struct Captured {
    /// The complete encoding of the value.
    raw: Bytes,

    /// The identifier at the start of `raw`.
    ident: Ident,

    /// The number of identifier octets at the start of `raw`.
    ident_len: usize,

    /// Whether the encoding uses BER only constructs.
    ber: bool,
}

impl Captured {
    /// Captures a decoded element.
    pub fn from_element(element: &Element) -> Self {
        let wire = element.wire_ident();
        let natural = Ident::from_tag(element.tag(), wire.is_constructed());
        let raw = element.raw();
        let (raw, ident_len) = if natural == wire {
            (raw.clone(), element.ident_len())
        }
        else {
            let mut res = Vec::with_capacity(raw.len() + 4);
            natural.write_encoded(&mut res);
            let ident_len = res.len();
            res.extend_from_slice(&raw[element.ident_len()..]);
            (res.into(), ident_len)
        };
        Captured { raw, ident: natural, ident_len, ber: element.is_ber() }
    }

    /// Captures an implicitly tagged constructed value.
    ///
    /// The value is captured with `tag` as its natural tag.
    pub fn from_implicit(element: &Element, tag: Tag) -> Result<Self, Error> {
        element.elements()?;
        Ok(Self::from_element(&element.retag(tag)?))
    }

    /// Decodes a single value from encoded data and captures it.
    pub fn decode(
        data: impl Into<Bytes>, mode: Mode
    ) -> Result<Self, Error> {
        Element::decode(data, mode).map(|element| {
            Self::from_element(&element)
        })
    }

    /// Captures the encoding of some values.
    ///
    /// The values have to encode into exactly one value.
    pub fn from_values<V: Values>(
        mode: Mode, values: V
    ) -> Result<Self, Error> {
        Self::decode(values.to_vec(mode), mode)
    }

    /// Returns the tag of the value.
    pub fn tag(&self) -> Tag {
        self.ident.tag()
    }

    /// Returns the complete encoding of the value.
    pub fn as_slice(&self) -> &[u8] {
        self.raw.as_ref()
    }

    /// Returns the complete encoding as a bytes value.
    pub fn to_bytes(&self) -> Bytes {
        self.raw.clone()
    }

    /// Decodes the value again.
    ///
    /// Since the value has been decoded before, this will only fail if it
    /// was built from encoded data that isn’t valid BER.
    pub fn element(&self) -> Result<Element, Error> {
        Element::decode(self.raw.clone(), Mode::Ber)
    }

    /// Returns an encoder for the value with its natural tag.
    pub fn encode_ref(&self) -> &Self {
        self
    }

    /// Returns an encoder for the value with a different tag.
    pub fn encode_ref_as(&self, tag: Tag) -> CapturedAs {
        CapturedAs { captured: self, tag }
    }
}


//--- AsRef

impl AsRef<[u8]> for Captured {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}


//--- PartialEq and Eq

impl PartialEq for Captured {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Captured { }


//--- Tracked

impl Tracked for Captured {
    fn form(&self) -> EncodingForm {
        EncodingForm::from_ber(self.ber)
    }
}


//--- Values

impl Values for Captured {
    fn encoded_len(&self, _mode: Mode) -> usize {
        self.raw.len()
    }

    fn write_encoded<T: Target>(
        &self, _mode: Mode, target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(self.raw.as_ref())
    }
}


//------------ CapturedAs ----------------------------------------------------

/// A value encoder for a captured value with a replaced tag.
pub struct CapturedAs<'a> {
    captured: &'a Captured,
    tag: Tag,
}

impl<'a> CapturedAs<'a> {
    fn ident(&self) -> Ident {
        Ident::from_tag(self.tag, self.captured.ident.is_constructed())
    }
}

impl<'a> Values for CapturedAs<'a> {
    fn encoded_len(&self, _mode: Mode) -> usize {
        self.ident().encoded_len()
            + self.captured.raw.len() - self.captured.ident_len
    }

    fn write_encoded<T: Target>(
        &self, _mode: Mode, target: &mut T
    ) -> Result<(), T::Error> {
        let mut ident = Vec::with_capacity(6);
        self.ident().write_encoded(&mut ident);
        target.write_all(&ident)?;
        target.write_all(&self.captured.raw[self.captured.ident_len..])
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn verbatim() {
        let data = Bytes::from_static(b"\x30\x80\x02\x01\x01\x00\x00");
        let captured = Captured::decode(data.clone(), Mode::Ber).unwrap();
        assert_eq!(captured.form(), EncodingForm::Ber);
        assert_eq!(captured.to_vec(Mode::Der), &data[..]);
        assert_eq!(captured.tag(), Tag::SEQUENCE);
    }

    #[test]
    fn implicit_tags() {
        let el = Element::decode(
            Bytes::from_static(b"\xa1\x03\x02\x01\x01"), Mode::Der
        ).unwrap();
        let captured = Captured::from_element(&el.retag(Tag::SEQUENCE).unwrap());
        assert_eq!(captured.as_slice(), b"\x30\x03\x02\x01\x01");
        assert_eq!(captured.form(), EncodingForm::Der);
        assert_eq!(
            captured.encode_ref_as(Tag::ctx(1)).to_vec(Mode::Der),
            &el.raw()[..]
        );
        assert_eq!(
            captured.encode_ref_as(Tag::ctx(1)).encoded_len(Mode::Der), 5
        );
    }

    #[test]
    fn from_values() {
        use crate::encode::{sequence, PrimitiveContent};

        let captured = Captured::from_values(
            Mode::Der, sequence(true.encode())
        ).unwrap();
        assert_eq!(captured.as_slice(), b"\x30\x03\x01\x01\xff");
        assert!(Captured::from_values(
            Mode::Der, (true.encode(), true.encode())
        ).is_err());
    }
}
