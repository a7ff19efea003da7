//! Tracking the form values were encoded in.
//!
//! Some values are signed or otherwise cryptographically protected in the
//! exact form they were encoded in. Re-encoding them differently after
//! decoding would break this protection. Values therefore remember whether
//! they were encoded following DER or using BER constructs and are encoded
//! again in that same form.
//!
//! The form is recorded as an [`EncodingForm`]. Types that carry a form
//! implement [`Tracked`]. The form of a structure is the combination of
//! the forms of its parts: if anything inside it uses BER, the structure
//! itself has to use BER, too.
//!
//! The [`SetOf`] type provides SET OF collections that keep their form.

use std::slice;
use crate::decode::Element;
use crate::encode::{Constructed, Forced, Values, set_as};
use crate::error::Error;
use crate::ident::Tag;
use crate::mode::Mode;


//------------ EncodingForm --------------------------------------------------

/// The form a value was encoded in.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum EncodingForm {
    /// The value uses BER constructs.
    ///
    /// These are indefinite length values, non-minimal length octets,
    /// constructed strings, or SET OF values with their members not in
    /// DER order.
    Ber,

    /// The value follows the rules of DER.
    #[default]
    Der,
}

impl EncodingForm {
    /// Returns `Ber` if `ber` is true and `Der` otherwise.
    pub fn from_ber(ber: bool) -> Self {
        if ber {
            EncodingForm::Ber
        }
        else {
            EncodingForm::Der
        }
    }

    /// Returns the form of a decoded element.
    ///
    /// This is `Ber` if the element or any element nested in it used a BER
    /// construct.
    pub fn of(element: &Element) -> Self {
        Self::from_ber(element.is_ber())
    }

    /// Returns the form of a decoded SET OF element.
    ///
    /// In addition to the framing, this also considers the order of the
    /// members. If they are not ordered by their encodings, the set was not
    /// encoded following DER.
    pub fn of_set(element: &Element) -> Result<Self, Error> {
        let members = element.elements()?;
        Ok(Self::of(element).or(Self::from_ber(
            members.windows(2).any(|pair| pair[0].raw() > pair[1].raw())
        )))
    }

    /// Returns whether the form is BER.
    pub fn is_ber(self) -> bool {
        matches!(self, EncodingForm::Ber)
    }

    /// Returns the mode to use when encoding a value of this form.
    pub fn mode(self) -> Mode {
        match self {
            EncodingForm::Ber => Mode::Ber,
            EncodingForm::Der => Mode::Der,
        }
    }

    /// Combines two forms.
    ///
    /// The result is `Ber` if either of the two forms is `Ber`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::from_ber(self.is_ber() || other.is_ber())
    }

    /// Combines the forms of all items.
    pub fn combine<'a, T, I>(iter: I) -> Self
    where T: Tracked + 'a, I: IntoIterator<Item = &'a T> {
        Self::from_ber(iter.into_iter().any(|item| item.form().is_ber()))
    }
}


//------------ Tracked -------------------------------------------------------

/// A type that keeps track of the form it was encoded in.
pub trait Tracked {
    /// Returns the form of the value.
    fn form(&self) -> EncodingForm;
}

impl<T: Tracked> Tracked for Option<T> {
    fn form(&self) -> EncodingForm {
        match self {
            Some(inner) => inner.form(),
            None => EncodingForm::Der,
        }
    }
}

impl<T: Tracked> Tracked for [T] {
    fn form(&self) -> EncodingForm {
        EncodingForm::combine(self)
    }
}

impl<T: Tracked> Tracked for Vec<T> {
    fn form(&self) -> EncodingForm {
        EncodingForm::combine(self)
    }
}


//------------ SetOf ---------------------------------------------------------

/// A SET OF value that keeps its form.
///
/// When decoded, the set records whether it was encoded in BER. This is the
/// case if its own framing or that of any member used BER constructs or if
/// the members were not sorted by their encoding as required by DER. The
/// members are kept in the order they appeared.
///
/// When created from a list of members, the set uses DER unless one of the
/// members is BER. In this case, the members are sorted into DER order right
/// away. Otherwise the order of the members is kept.
///
/// The set is always encoded in its own form, independently of the mode
/// the enclosing value is encoded in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetOf<T> {
    /// The members of the set.
    items: Vec<T>,

    /// The form of the set.
    form: EncodingForm,
}

impl<T: Tracked + Values> SetOf<T> {
    /// Creates a new set from its members.
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        let mut items: Vec<_> = items.into_iter().collect();
        let form = EncodingForm::combine(&items);
        if !form.is_ber() {
            items.sort_by_cached_key(|item| item.to_vec(Mode::Der));
        }
        SetOf { items, form }
    }
}

impl<T: Tracked> SetOf<T> {
    /// Creates a new set that is encoded in BER.
    ///
    /// The members are kept in the given order.
    pub fn ber(items: impl IntoIterator<Item = T>) -> Self {
        SetOf { items: items.into_iter().collect(), form: EncodingForm::Ber }
    }

    /// Decodes a set from a SET element.
    ///
    /// Each member is decoded with `op`. For implicitly tagged sets, the
    /// element has to be re-tagged first.
    pub fn from_element<F>(element: &Element, op: F) -> Result<Self, Error>
    where F: FnMut(&Element) -> Result<T, Error> {
        element.expect_tag(Tag::SET)?;
        let items = element.elements()?.iter().map(op).collect::<Result<
            Vec<_>, _
        >>()?;
        let form = EncodingForm::of_set(element)?.or(
            EncodingForm::combine(&items)
        );
        Ok(SetOf { items, form })
    }
}

impl<T> SetOf<T> {
    /// Returns the members as a slice.
    pub fn as_slice(&self) -> &[T] {
        self.items.as_slice()
    }

    /// Returns an iterator over the members.
    pub fn iter(&self) -> slice::Iter<T> {
        self.items.iter()
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Values> SetOf<T> {
    /// Returns an encoder for the set using its natural tag.
    pub fn encode_ref(&self) -> Forced<Constructed<&[T]>> {
        self.encode_ref_as(Tag::SET)
    }

    /// Returns an encoder for the set using the given tag.
    pub fn encode_ref_as(&self, tag: Tag) -> Forced<Constructed<&[T]>> {
        set_as(tag, self.items.as_slice()).forced(self.form.mode())
    }
}


//--- Tracked

impl<T> Tracked for SetOf<T> {
    fn form(&self) -> EncodingForm {
        self.form
    }
}


//--- IntoIterator

impl<'a, T> IntoIterator for &'a SetOf<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use crate::captured::Captured;
    use super::*;

    fn set(data: &'static [u8], mode: Mode) -> SetOf<Captured> {
        let element = Element::decode(Bytes::from_static(data), mode)
            .unwrap();
        SetOf::from_element(&element, |el| Ok(Captured::from_element(el)))
            .unwrap()
    }

    #[test]
    fn decoded_form() {
        let der = set(b"\x31\x06\x02\x01\x01\x02\x01\x02", Mode::Der);
        assert_eq!(der.form(), EncodingForm::Der);
        assert_eq!(der.len(), 2);

        // Members out of order.
        let unsorted = set(b"\x31\x06\x02\x01\x02\x02\x01\x01", Mode::Der);
        assert_eq!(unsorted.form(), EncodingForm::Ber);

        // Indefinite length.
        let ber = set(b"\x31\x80\x02\x01\x01\x00\x00", Mode::Ber);
        assert_eq!(ber.form(), EncodingForm::Ber);

        // Member with indefinite length.
        let ber = set(b"\x31\x04\x30\x80\x00\x00", Mode::Ber);
        assert_eq!(ber.form(), EncodingForm::Ber);
    }

    #[test]
    fn encode_keeps_form() {
        let data = b"\x31\x80\x02\x01\x02\x02\x01\x01\x00\x00";
        let ber = set(data, Mode::Ber);
        assert_eq!(ber.encode_ref().to_vec(Mode::Der), &data[..]);

        let data = b"\x31\x06\x02\x01\x01\x02\x01\x02";
        let der = set(data, Mode::Der);
        assert_eq!(der.encode_ref().to_vec(Mode::Ber), &data[..]);
        assert_eq!(
            der.encode_ref_as(Tag::ctx(1)).to_vec(Mode::Der),
            b"\xa1\x06\x02\x01\x01\x02\x01\x02"
        );
    }

    #[test]
    fn built_sets() {
        let one = Captured::decode(
            Bytes::from_static(b"\x02\x01\x01"), Mode::Der
        ).unwrap();
        let two = Captured::decode(
            Bytes::from_static(b"\x02\x01\x02"), Mode::Der
        ).unwrap();
        let indef = Captured::decode(
            Bytes::from_static(b"\x30\x80\x00\x00"), Mode::Ber
        ).unwrap();

        let der = SetOf::new([two.clone(), one.clone()]);
        assert_eq!(der.form(), EncodingForm::Der);
        assert_eq!(der.as_slice(), &[one.clone(), two.clone()]);

        let ber = SetOf::new([two.clone(), indef.clone(), one.clone()]);
        assert_eq!(ber.form(), EncodingForm::Ber);
        assert_eq!(ber.as_slice(), &[two.clone(), indef, one.clone()]);

        let ber = SetOf::ber([two.clone(), one.clone()]);
        assert_eq!(
            ber.encode_ref().to_vec(Mode::Der),
            b"\x31\x80\x02\x01\x02\x02\x01\x01\x00\x00"
        );
    }

    #[test]
    fn forms() {
        assert_eq!(
            EncodingForm::Der.or(EncodingForm::Ber), EncodingForm::Ber
        );
        assert_eq!(EncodingForm::Der.mode(), Mode::Der);
        assert_eq!(EncodingForm::Ber.mode(), Mode::Ber);
        assert_eq!(None::<SetOf<Captured>>.form(), EncodingForm::Der);
    }
}
