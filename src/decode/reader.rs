//! Reading the fields of a SEQUENCE.
//!
//! This is a private module. The relevant items are re-exported by the
//! parent.

use crate::error::Error;
use crate::ident::Tag;
use super::element::Element;
use super::field::{Explicitness, Field, Schema, Tagging};


//------------ SequenceReader ------------------------------------------------

/// Sequential access to the elements of a SEQUENCE.
///
/// A reader is created for the elements of a decoded SEQUENCE and the
/// [`Schema`] of the type to decode it as. Creating the reader checks that
/// the number of elements is within the range allowed by the schema.
///
/// Fields are then read one by one, each time naming the [`Field`] of the
/// schema that is being read. The reader only ever looks at the element at
/// its current position. If that element belongs to the field, it is handed
/// to a closure for decoding and the position advances. Optional fields
/// that are absent leave the position unchanged.
///
/// Fields have to be requested in the order of the schema. Requesting a
/// field that is not next in the schema or skipping over a mandatory field
/// is a bug in the decoder and results in an invariant violation error.
///
/// Finally, [`finish`][Self::finish] checks that all elements have been
/// consumed.
#[derive(Debug)]
pub struct SequenceReader<'a> {
    /// The schema of the type being decoded.
    schema: &'static Schema,

    /// The elements of the sequence.
    elements: &'a [Element],

    /// The index of the next element to read.
    pos: usize,

    /// The index of the next field in the schema.
    next_field: usize,
}

impl<'a> SequenceReader<'a> {
    /// Creates a reader over a list of elements.
    pub fn new(
        schema: &'static Schema, elements: &'a [Element]
    ) -> Result<Self, Error> {
        let actual = elements.len();
        if actual < schema.min() || actual > schema.max() {
            return xerr!(Err(Error::BadSequenceSize {
                structure: schema.name(),
                min: schema.min(),
                max: schema.max(),
                actual,
            }))
        }
        Ok(SequenceReader { schema, elements, pos: 0, next_field: 0 })
    }

    /// Creates a reader over the elements of a SEQUENCE element.
    pub fn from_element(
        schema: &'static Schema, element: &'a Element
    ) -> Result<Self, Error> {
        Self::new(schema, element.sequence()?)
    }

    /// Returns the index of the next element.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the number of elements not yet consumed.
    pub fn remaining(&self) -> usize {
        self.elements.len() - self.pos
    }

    /// Reads a mandatory field.
    ///
    /// Dispatches to the read method matching the field’s tagging.
    pub fn take<T, F>(&mut self, field: &Field, op: F) -> Result<T, Error>
    where F: FnOnce(&Element) -> Result<T, Error> {
        match field.tagging() {
            Tagging::Untagged(_) | Tagging::Any => {
                self.read_mandatory(field, op)
            }
            Tagging::Context(..) => self.read_context_tagged(field, op),
        }
    }

    /// Reads an optional field.
    ///
    /// Dispatches to the read method matching the field’s tagging.
    pub fn take_opt<T, F>(
        &mut self, field: &Field, op: F
    ) -> Result<Option<T>, Error>
    where F: FnOnce(&Element) -> Result<T, Error> {
        match field.tagging() {
            Tagging::Untagged(_) | Tagging::Any => {
                self.read_optional_untagged(field, op)
            }
            Tagging::Context(..) => {
                self.read_optional_context_tagged(field, op)
            }
        }
    }

    /// Reads a mandatory untagged field.
    ///
    /// If the field declares a type, the element must have that type’s
    /// tag. Untagged CHOICE fields accept any element and leave checking
    /// to `op`.
    pub fn read_mandatory<T, F>(
        &mut self, field: &Field, op: F
    ) -> Result<T, Error>
    where F: FnOnce(&Element) -> Result<T, Error> {
        self.advance_field(field, false)?;
        let element = self.current(field)?;
        match field.tagging() {
            Tagging::Untagged(tag) => {
                if element.tag() != tag {
                    return self.missing(field)
                }
            }
            Tagging::Any => { }
            Tagging::Context(..) => {
                return self.wrong_method(field)
            }
        }
        let res = op(element)?;
        self.pos += 1;
        Ok(res)
    }

    /// Reads an optional untagged field.
    ///
    /// The field is present if the current element has the natural tag of
    /// the field’s type. A trailing optional field of any type is present
    /// if there is an element left.
    pub fn read_optional_untagged<T, F>(
        &mut self, field: &Field, op: F
    ) -> Result<Option<T>, Error>
    where F: FnOnce(&Element) -> Result<T, Error> {
        self.advance_field(field, true)?;
        let tag = match field.tagging() {
            Tagging::Untagged(tag) => Some(tag),
            Tagging::Any => None,
            Tagging::Context(..) => return self.wrong_method(field),
        };
        match self.peek() {
            Some(element) if tag.map_or(true, |tag| element.tag() == tag) => {
                let res = op(element)?;
                self.pos += 1;
                Ok(Some(res))
            }
            _ => Ok(None)
        }
    }

    /// Reads an optional context tagged field.
    ///
    /// The field is present if the current element has the field’s context
    /// specific tag. The element is unwrapped for explicit tagging or
    /// re-tagged with the natural tag for implicit tagging before being
    /// passed to `op`.
    pub fn read_optional_context_tagged<T, F>(
        &mut self, field: &Field, op: F
    ) -> Result<Option<T>, Error>
    where F: FnOnce(&Element) -> Result<T, Error> {
        self.advance_field(field, true)?;
        let (number, explicitness) = match field.tagging() {
            Tagging::Context(number, explicitness) => (number, explicitness),
            _ => return self.wrong_method(field),
        };
        match self.peek() {
            Some(element) if element.tag() == Tag::ctx(number) => {
                let res = Self::unwrap_tagged(element, explicitness, op)?;
                self.pos += 1;
                Ok(Some(res))
            }
            _ => Ok(None)
        }
    }

    /// Reads a mandatory context tagged field.
    ///
    /// This is like
    /// [`read_optional_context_tagged`][Self::read_optional_context_tagged]
    /// but the field must be present.
    pub fn read_context_tagged<T, F>(
        &mut self, field: &Field, op: F
    ) -> Result<T, Error>
    where F: FnOnce(&Element) -> Result<T, Error> {
        self.advance_field(field, false)?;
        let (number, explicitness) = match field.tagging() {
            Tagging::Context(number, explicitness) => (number, explicitness),
            _ => return self.wrong_method(field),
        };
        let element = self.current(field)?;
        if element.tag() != Tag::ctx(number) {
            return self.missing(field)
        }
        let res = Self::unwrap_tagged(element, explicitness, op)?;
        self.pos += 1;
        Ok(res)
    }

    /// Finishes reading.
    ///
    /// Returns an error if there are elements left.
    pub fn finish(self) -> Result<(), Error> {
        let unread = &self.schema.fields()[self.next_field..];
        if let Some(field) = unread.iter().find(|f| !f.is_optional()) {
            return Err(Error::invariant(format!(
                "{}: mandatory field `{}` never read",
                self.schema.name(), field.name()
            )))
        }
        if self.pos != self.elements.len() {
            return xerr!(Err(Error::UnexpectedTrailingElements {
                structure: self.schema.name(),
                remaining: self.remaining(),
            }))
        }
        Ok(())
    }
}

impl<'a> SequenceReader<'a> {
    /// Moves the schema cursor past `field`.
    ///
    /// Fails if the field isn’t among the following fields of the schema,
    /// if a mandatory field would be skipped, or if the field’s presence
    /// doesn’t match what the caller expects.
    fn advance_field(
        &mut self, field: &Field, optional: bool
    ) -> Result<(), Error> {
        let fields = self.schema.fields();
        let idx = match fields[self.next_field..].iter().position(|f| {
            f == field
        }) {
            Some(idx) => idx + self.next_field,
            None => {
                return Err(Error::invariant(format!(
                    "{}: field `{}` requested out of order",
                    self.schema.name(), field.name()
                )))
            }
        };
        if let Some(skipped) = fields[self.next_field..idx].iter().find(|f| {
            !f.is_optional()
        }) {
            return Err(Error::invariant(format!(
                "{}: mandatory field `{}` skipped",
                self.schema.name(), skipped.name()
            )))
        }
        if field.is_optional() != optional {
            return Err(Error::invariant(format!(
                "{}: field `{}` read with wrong presence",
                self.schema.name(), field.name()
            )))
        }
        self.next_field = idx + 1;
        Ok(())
    }

    fn peek(&self) -> Option<&'a Element> {
        self.elements.get(self.pos)
    }

    fn current(&self, field: &Field) -> Result<&'a Element, Error> {
        match self.peek() {
            Some(element) => Ok(element),
            None => {
                xerr!(Err(Error::TruncatedSequence {
                    structure: self.schema.name(),
                    field: field.name(),
                }))
            }
        }
    }

    fn missing<T>(&self, field: &Field) -> Result<T, Error> {
        xerr!(Err(Error::MissingMandatoryField {
            structure: self.schema.name(),
            field: field.name(),
        }))
    }

    fn wrong_method<T>(&self, field: &Field) -> Result<T, Error> {
        Err(Error::invariant(format!(
            "{}: field `{}` read with wrong tagging",
            self.schema.name(), field.name()
        )))
    }

    fn unwrap_tagged<T, F>(
        element: &Element, explicitness: Explicitness, op: F
    ) -> Result<T, Error>
    where F: FnOnce(&Element) -> Result<T, Error> {
        match explicitness {
            Explicitness::Explicit => op(element.explicit_inner()?),
            Explicitness::Implicit(natural) => op(&element.retag(natural)?),
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use crate::int::Integer;
    use crate::mode::Mode;
    use crate::string::OctetString;
    use super::*;

    const VERSION: Field = Field::untagged("version", Tag::INTEGER)
        .optional();
    const NAME: Field = Field::untagged("name", Tag::OCTET_STRING);
    const EXTRA: Field = Field::implicit("extra", 0, Tag::OCTET_STRING)
        .optional();
    const WRAPPED: Field = Field::explicit("wrapped", 1);

    static TEST: Schema = Schema::new(
        "Test", &[VERSION, NAME, EXTRA, WRAPPED]
    );

    #[derive(Debug, Eq, PartialEq)]
    struct Test {
        version: Option<Integer>,
        name: OctetString,
        extra: Option<OctetString>,
        wrapped: Integer,
    }

    fn decode(data: &'static [u8]) -> Result<Test, Error> {
        let element = Element::decode(Bytes::from_static(data), Mode::Der)?;
        let mut reader = SequenceReader::from_element(&TEST, &element)?;
        let version = reader.take_opt(&VERSION, Integer::from_element)?;
        let name = reader.take(&NAME, OctetString::from_element)?;
        let extra = reader.take_opt(&EXTRA, OctetString::from_element)?;
        let wrapped = reader.take(&WRAPPED, Integer::from_element)?;
        reader.finish()?;
        Ok(Test { version, name, extra, wrapped })
    }

    #[test]
    fn read_all_fields() {
        let res = decode(
            b"\x30\x0e\x02\x01\x01\x04\x01a\x80\x01b\xa1\x03\x02\x01\x07"
        ).unwrap();
        assert_eq!(res.version, Some(Integer::from_u64(1)));
        assert_eq!(res.name.as_slice(), b"a");
        assert_eq!(res.extra.unwrap().as_slice(), b"b");
        assert_eq!(res.wrapped, Integer::from_u64(7));
    }

    #[test]
    fn skip_absent_optionals() {
        let res = decode(b"\x30\x08\x04\x01a\xa1\x03\x02\x01\x07").unwrap();
        assert_eq!(res.version, None);
        assert_eq!(res.extra, None);
    }

    #[test]
    fn bad_sequence_size() {
        assert!(matches!(
            decode(b"\x30\x03\x04\x01a"),
            Err(Error::BadSequenceSize { actual: 1, min: 2, max: 4, .. })
        ));
    }

    #[test]
    fn missing_mandatory() {
        // Explicit tag [2] instead of [1].
        assert!(matches!(
            decode(b"\x30\x08\x04\x01a\xa2\x03\x02\x01\x07"),
            Err(Error::MissingMandatoryField { field: "wrapped", .. })
        ));
        // Mandatory fields swapped.
        assert!(matches!(
            decode(b"\x30\x08\xa1\x03\x02\x01\x07\x04\x01a"),
            Err(Error::MissingMandatoryField { field: "name", .. })
        ));
    }

    #[test]
    fn truncated() {
        // Two elements, but the second one is the optional one.
        assert!(matches!(
            decode(b"\x30\x06\x04\x01a\x80\x01b"),
            Err(Error::TruncatedSequence { field: "wrapped", .. })
        ));
    }

    #[test]
    fn trailing_elements() {
        // An unknown tag after the last field.
        assert!(matches!(
            decode(b"\x30\x0a\x04\x01a\xa1\x03\x02\x01\x07\x05\x00"),
            Err(Error::UnexpectedTrailingElements { remaining: 1, .. })
        ));
    }

    #[test]
    fn out_of_order_request() {
        let element = Element::decode(
            Bytes::from_static(b"\x30\x08\x04\x01a\xa1\x03\x02\x01\x07"),
            Mode::Der
        ).unwrap();
        let mut reader = SequenceReader::from_element(
            &TEST, &element
        ).unwrap();
        assert!(matches!(
            reader.take(&WRAPPED, Integer::from_element),
            Err(Error::InvariantViolation(_))
        ));

        let mut reader = SequenceReader::from_element(
            &TEST, &element
        ).unwrap();
        reader.take(&NAME, OctetString::from_element).unwrap();
        assert!(matches!(
            reader.take_opt(&VERSION, Integer::from_element),
            Err(Error::InvariantViolation(_))
        ));

        let mut reader = SequenceReader::from_element(
            &TEST, &element
        ).unwrap();
        reader.take(&NAME, OctetString::from_element).unwrap();
        assert!(matches!(
            reader.finish(),
            Err(Error::InvariantViolation(_))
        ));
    }
}
