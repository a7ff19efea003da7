//! Decoded elements.
//!
//! This is a private module. The relevant items are re-exported by the
//! parent.

use std::sync::Arc;
use bytes::{Bytes, BytesMut};
use crate::error::Error;
use crate::ident::{Ident, Tag};
use crate::length::Length;
use crate::mode::Mode;


//------------ Element -------------------------------------------------------

/// A single decoded value.
///
/// An element is the result of taking apart the identifier, length, and
/// content octets of an encoded value. Primitive elements keep their content
/// octets, constructed elements keep the list of elements contained in
/// their content. All elements keep the complete octets they were decoded
/// from, so they can be captured and written out again unchanged.
///
/// Elements are immutable and cheap to clone: both the octets and the
/// list of nested elements are reference counted.
///
/// Besides the structure, an element remembers how it was framed. If it
/// used the indefinite length form, non-minimal length octets, or the
/// constructed form of a string type, it is marked as BER framed. This
/// information is used to re-encode values in the form they arrived in.
#[derive(Clone, Debug)]
pub struct Element {
    /// The identifier as seen by the decoder.
    ///
    /// This differs from `wire` if the element has been re-tagged.
    ident: Ident,

    /// The identifier octets as they appear in `raw`.
    wire: Ident,

    /// The number of identifier octets at the start of `raw`.
    ident_len: usize,

    /// The offset of the element in the decoded data.
    pos: usize,

    /// The complete encoding of the element.
    raw: Bytes,

    /// The content of the element.
    content: Content,

    /// Whether the element itself was framed according to BER only.
    ber_framing: bool,

    /// Whether this element or any nested element was BER framed.
    ber: bool,

    /// The rules the element was decoded under.
    mode: Mode,
}

/// The content of an element.
#[derive(Clone, Debug)]
enum Content {
    /// A primitive value's content octets.
    Primitive(Bytes),

    /// The elements of a constructed value.
    Constructed(Arc<[Element]>),
}

/// The maximum nesting depth of constructed values.
///
/// None of the supported structures comes anywhere near this.
const MAX_DEPTH: usize = 64;

/// # Decoding
///
impl Element {
    /// Decodes data containing exactly one encoded value.
    ///
    /// The value is decoded according to the rules given by `mode`. It is
    /// an error if there is data left after the value.
    pub fn decode(data: impl Into<Bytes>, mode: Mode) -> Result<Self, Error> {
        let data = data.into();
        let parser = Parser { data: &data, mode };
        let (res, end) = parser.take_element(0, data.len(), 0)?;
        if end != data.len() {
            return xerr!(Err(Error::malformed("trailing data", end)))
        }
        Ok(res)
    }
}

/// # Access to Properties
///
impl Element {
    /// Returns the tag of the element.
    pub fn tag(&self) -> Tag {
        self.ident.tag()
    }

    /// Returns whether the element is constructed.
    pub fn is_constructed(&self) -> bool {
        self.ident.is_constructed()
    }

    /// Returns the offset of the element in the data it was decoded from.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the complete encoding of the element as it was decoded.
    ///
    /// For a re-tagged element, these are still the original octets.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Returns the identifier of the element as it appears in `raw`.
    pub fn wire_ident(&self) -> Ident {
        self.wire
    }

    /// Returns the number of identifier octets at the start of `raw`.
    pub fn ident_len(&self) -> usize {
        self.ident_len
    }

    /// Returns whether the element or anything in it was BER framed.
    pub fn is_ber(&self) -> bool {
        self.ber
    }

    /// Returns whether the element itself was BER framed.
    ///
    /// This only considers the element's own identifier and length octets
    /// and ignores any nested elements.
    pub fn has_ber_framing(&self) -> bool {
        self.ber_framing
    }
}

/// # Coercion into Types
///
impl Element {
    /// Checks that the element has the given tag.
    pub fn expect_tag(&self, tag: Tag) -> Result<&Self, Error> {
        if self.tag() != tag {
            return xerr!(Err(Error::unexpected_tag(tag, self.tag())))
        }
        Ok(self)
    }

    /// Returns the elements of a constructed element.
    pub fn elements(&self) -> Result<&[Element], Error> {
        match self.content {
            Content::Constructed(ref inner) => Ok(inner),
            Content::Primitive(_) => {
                xerr!(Err(Error::malformed(
                    "expected constructed value", self.pos
                )))
            }
        }
    }

    /// Returns the elements of a SEQUENCE.
    pub fn sequence(&self) -> Result<&[Element], Error> {
        self.expect_tag(Tag::SEQUENCE)?.elements()
    }

    /// Returns the elements of a SET.
    pub fn set(&self) -> Result<&[Element], Error> {
        self.expect_tag(Tag::SET)?.elements()
    }

    /// Returns the content octets of a primitive element.
    pub fn primitive(&self) -> Result<&Bytes, Error> {
        match self.content {
            Content::Primitive(ref inner) => Ok(inner),
            Content::Constructed(_) => {
                xerr!(Err(Error::malformed(
                    "expected primitive value", self.pos
                )))
            }
        }
    }

    /// Returns the octets of a string type.
    ///
    /// Under BER, strings can be broken up into a constructed value of
    /// segments. In this case, the content octets of all segments are
    /// concatenated.
    pub fn string_octets(&self) -> Result<Bytes, Error> {
        match self.content {
            Content::Primitive(ref inner) => Ok(inner.clone()),
            Content::Constructed(ref inner) => {
                let mut res = BytesMut::new();
                Self::append_segments(inner, &mut res)?;
                Ok(res.freeze())
            }
        }
    }

    fn append_segments(
        segments: &[Element], target: &mut BytesMut
    ) -> Result<(), Error> {
        for segment in segments {
            match segment.content {
                Content::Primitive(ref inner) => {
                    target.extend_from_slice(inner)
                }
                Content::Constructed(ref inner) => {
                    Self::append_segments(inner, target)?
                }
            }
        }
        Ok(())
    }

    /// Returns the single element wrapped by an explicit tag.
    pub fn explicit_inner(&self) -> Result<&Element, Error> {
        match self.elements()? {
            [inner] => Ok(inner),
            _ => {
                xerr!(Err(Error::malformed(
                    "explicit tag must wrap exactly one value", self.pos
                )))
            }
        }
    }

    /// Returns the element re-interpreted with a different tag.
    ///
    /// This is how implicit tagging is undone: the context specific tag
    /// found on the wire is replaced with the natural tag of the type the
    /// content is to be decoded as. The raw octets are left untouched.
    ///
    /// A constructed element re-tagged as a string type uses the BER only
    /// segmented form of strings. This is an error if the element was
    /// decoded under DER. Otherwise the element is marked as BER framed.
    pub fn retag(&self, tag: Tag) -> Result<Element, Error> {
        let mut res = self.clone();
        res.ident = Ident::from_tag(tag, self.ident.is_constructed());
        if self.ident.is_constructed() && tag.is_string() {
            if self.mode.is_restricted() {
                return xerr!(Err(Error::malformed(
                    "constructed string in DER", self.pos
                )))
            }
            res.ber_framing = true;
            res.ber = true;
        }
        Ok(res)
    }
}


//------------ Parser --------------------------------------------------------

/// The machinery for decoding elements.
struct Parser<'a> {
    data: &'a Bytes,
    mode: Mode,
}

impl<'a> Parser<'a> {
    /// Takes an element starting at `start` and ending before `limit`.
    ///
    /// Returns the element and the position right after it.
    fn take_element(
        &self, start: usize, limit: usize, depth: usize
    ) -> Result<(Element, usize), Error> {
        if depth > MAX_DEPTH {
            return xerr!(Err(Error::malformed("nesting too deep", start)))
        }
        let window = &self.data[start..limit];
        let (ident, ident_len) = Ident::take_from(window, start)?;
        if ident.tag() == Tag::END_OF_CONTENTS {
            return xerr!(Err(Error::malformed(
                "unexpected end-of-contents", start
            )))
        }
        let (length, length_len, minimal) = Length::take_from(
            &window[ident_len..], self.mode, start + ident_len
        )?;
        let content_start = start + ident_len + length_len;

        let string_cons = ident.is_constructed() && ident.tag().is_string();
        if string_cons && self.mode.is_restricted() {
            return xerr!(Err(Error::malformed(
                "constructed string in DER", start
            )))
        }

        let (content, end, indefinite) = match length {
            Length::Definite(len) => {
                let end = match content_start.checked_add(len) {
                    Some(end) if end <= limit => end,
                    _ => {
                        return xerr!(Err(Error::malformed(
                            "unexpected end of data", start
                        )))
                    }
                };
                if ident.is_constructed() {
                    let mut elements = Vec::new();
                    let mut pos = content_start;
                    while pos < end {
                        let (element, next) = self.take_element(
                            pos, end, depth + 1
                        )?;
                        elements.push(element);
                        pos = next;
                    }
                    (Content::Constructed(elements.into()), end, false)
                }
                else {
                    (
                        Content::Primitive(
                            self.data.slice(content_start..end)
                        ),
                        end, false
                    )
                }
            }
            Length::Indefinite => {
                if !ident.is_constructed() {
                    return xerr!(Err(Error::malformed(
                        "indefinite length primitive value", start
                    )))
                }
                let mut elements = Vec::new();
                let mut pos = content_start;
                loop {
                    match self.data.get(pos..pos + 2) {
                        Some(b"\0\0") if pos + 2 <= limit => {
                            pos += 2;
                            break
                        }
                        Some(_) if pos < limit => { }
                        _ => {
                            return xerr!(Err(Error::malformed(
                                "missing end-of-contents", start
                            )))
                        }
                    }
                    let (element, next) = self.take_element(
                        pos, limit, depth + 1
                    )?;
                    elements.push(element);
                    pos = next;
                }
                (Content::Constructed(elements.into()), pos, true)
            }
        };

        let ber_framing = indefinite || !minimal || string_cons;
        let ber = ber_framing || match content {
            Content::Constructed(ref inner) => inner.iter().any(|e| e.ber),
            Content::Primitive(_) => false,
        };
        Ok((
            Element {
                ident,
                wire: ident,
                ident_len,
                pos: start,
                raw: self.data.slice(start..end),
                content,
                ber_framing,
                ber,
                mode: self.mode,
            },
            end
        ))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn ber(data: &'static [u8]) -> Result<Element, Error> {
        Element::decode(Bytes::from_static(data), Mode::Ber)
    }

    fn der(data: &'static [u8]) -> Result<Element, Error> {
        Element::decode(Bytes::from_static(data), Mode::Der)
    }

    #[test]
    fn decode_definite() {
        let data = b"\x30\x06\x02\x01\x05\x04\x01\xaa";
        let el = der(data).unwrap();
        assert_eq!(el.tag(), Tag::SEQUENCE);
        assert!(!el.is_ber());
        let seq = el.sequence().unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq[0].tag(), Tag::INTEGER);
        assert_eq!(seq[0].primitive().unwrap().as_ref(), b"\x05");
        assert_eq!(seq[1].pos(), 5);
        assert_eq!(seq[1].raw().as_ref(), b"\x04\x01\xaa");
        assert_eq!(&el.raw()[..], &data[..]);
    }

    #[test]
    fn decode_indefinite() {
        let data = b"\x31\x80\x02\x01\x05\x30\x80\x00\x00\x00\x00";
        assert!(der(data).is_err());
        let el = ber(data).unwrap();
        assert!(el.is_ber());
        assert!(el.has_ber_framing());
        let set = el.set().unwrap();
        assert_eq!(set.len(), 2);
        assert!(!set[0].is_ber());
        assert!(set[1].is_ber());
        assert!(set[1].sequence().unwrap().is_empty());
    }

    #[test]
    fn nested_ber_marks_parents() {
        let data = b"\x30\x07\x30\x80\x02\x01\x01\x00\x00";
        let el = ber(data).unwrap();
        assert!(el.is_ber());
        assert!(!el.has_ber_framing());
    }

    #[test]
    fn constructed_octet_string() {
        let data = b"\x24\x80\x04\x02ab\x04\x01c\x00\x00";
        assert!(der(data).is_err());
        let el = ber(data).unwrap();
        assert_eq!(el.string_octets().unwrap().as_ref(), b"abc");
        assert!(el.is_ber());
    }

    #[test]
    fn reject_bad_framing() {
        // Trailing data.
        assert!(ber(b"\x05\x00\x00").is_err());
        // Content exceeds outer value.
        assert!(
            ber(b"\x30\x03\x04\x05abc")
                .is_err()
        );
        // Indefinite primitive.
        assert!(ber(b"\x04\x80\x00\x00")
            .is_err());
        // Missing end-of-contents.
        assert!(ber(b"\x30\x80\x05\x00")
            .is_err());
        // End-of-contents inside a definite value.
        assert!(ber(b"\x30\x02\x00\x00")
            .is_err());
        // Truncated.
        assert!(ber(b"\x30").is_err());
    }

    #[test]
    fn excessive_nesting() {
        let mut data = Vec::new();
        for _ in 0..100 {
            data.extend_from_slice(b"\x30\x80");
        }
        for _ in 0..100 {
            data.extend_from_slice(b"\x00\x00");
        }
        assert!(matches!(
            Element::decode(data, Mode::Ber),
            Err(Error::Malformed { msg: "nesting too deep", .. })
        ));
    }

    #[test]
    fn explicit_and_retag() {
        let data = b"\xa0\x03\x02\x01\x03";
        let el = der(data).unwrap();
        assert_eq!(el.tag(), Tag::ctx(0));
        assert_eq!(el.explicit_inner().unwrap().tag(), Tag::INTEGER);

        let el = der(b"\xa1\x00").unwrap();
        assert!(el.explicit_inner().is_err());
        let el = el.retag(Tag::SET).unwrap();
        assert!(el.set().unwrap().is_empty());
        assert_eq!(el.wire_ident().tag(), Tag::ctx(1));
        assert!(!el.is_ber());
        assert!(matches!(
            el.sequence(),
            Err(Error::UnexpectedTag { expected: Tag::SEQUENCE, .. })
        ));
    }

    #[test]
    fn retag_constructed_string() {
        // [0] IMPLICIT OCTET STRING in the segmented form.
        let data = b"\xa0\x03\x04\x01\xaa";

        let el = der(data).unwrap();
        assert!(!el.is_ber());
        assert!(matches!(
            el.retag(Tag::OCTET_STRING),
            Err(Error::Malformed { msg: "constructed string in DER", .. })
        ));
        assert!(el.retag(Tag::SEQUENCE).is_ok());

        let el = ber(data).unwrap();
        assert!(!el.is_ber());
        let string = el.retag(Tag::OCTET_STRING).unwrap();
        assert!(string.is_ber());
        assert!(string.has_ber_framing());
        assert_eq!(string.string_octets().unwrap().as_ref(), b"\xaa");

        // Primitive strings stay as they are.
        let el = der(b"\x80\x01\xaa").unwrap();
        assert!(!el.retag(Tag::OCTET_STRING).unwrap().is_ber());
    }
}
