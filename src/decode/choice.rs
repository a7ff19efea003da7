//! Resolving CHOICE alternatives.
//!
//! This is a private module. The relevant items are re-exported by the
//! parent.

use crate::error::Error;
use crate::ident::{Class, Tag};
use super::element::Element;
use super::Decode;


//------------ Selector ------------------------------------------------------

/// What an element looks like to a CHOICE.
///
/// The alternatives of a CHOICE are distinguished by the tag of the value
/// present. Untagged alternatives carry the universal tag of their type,
/// tagged alternatives a context specific tag. A CHOICE type matches on the
/// selector of an element in a single `match` expression to pick the
/// alternative:
///
/// ```rust,ignore
/// match Selector::of(element) {
///     Selector::Universal(Tag::SEQUENCE) => { /* default alternative */ }
///     Selector::Context(0) => { /* [0] alternative */ }
///     _ => Err(Self::unresolved(element)),
/// }
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Selector {
    /// An untagged value of the given universal type.
    Universal(Tag),

    /// A value with a context specific tag of the given number.
    Context(u32),

    /// A value with an application or private tag.
    ///
    /// None of the supported CHOICE types have alternatives like this.
    Other(Tag),
}

impl Selector {
    /// Returns the selector for an element.
    pub fn of(element: &Element) -> Self {
        let tag = element.tag();
        match tag.class() {
            Class::Universal => Selector::Universal(tag),
            Class::Context => Selector::Context(tag.number()),
            _ => Selector::Other(tag),
        }
    }

    /// Returns whether the element is untagged.
    pub fn is_untagged(self) -> bool {
        matches!(self, Selector::Universal(_))
    }
}


//------------ Choice --------------------------------------------------------

/// A type representing an ASN.1 CHOICE.
///
/// The set of alternatives is closed: a CHOICE type is a Rust enum with one
/// variant per alternative. Its [`Decode`] implementation resolves the
/// variant by matching on the [`Selector`] of the element and returns the
/// error produced by [`unresolved`][Self::unresolved] for anything else.
pub trait Choice: Decode {
    /// The name of the CHOICE type used in error messages.
    const NAME: &'static str;

    /// Returns the selector of the alternative present.
    fn selector(&self) -> Selector;

    /// Returns the error for an element that matches no alternative.
    fn unresolved(element: &Element) -> Error {
        let err = Error::UnresolvedChoice {
            choice: Self::NAME,
            tag: element.tag(),
        };
        log::trace!("{} at offset {}", err, element.pos());
        err
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use crate::int::Integer;
    use crate::mode::Mode;
    use super::*;

    #[derive(Debug, Eq, PartialEq)]
    enum Number {
        Plain(Integer),
        Tagged(Integer),
    }

    impl Decode for Number {
        fn from_element(element: &Element) -> Result<Self, Error> {
            match Selector::of(element) {
                Selector::Universal(Tag::INTEGER) => {
                    Integer::from_element(element).map(Number::Plain)
                }
                Selector::Context(1) => {
                    Integer::from_element(
                        element.explicit_inner()?
                    ).map(Number::Tagged)
                }
                _ => Err(Self::unresolved(element))
            }
        }
    }

    impl Choice for Number {
        const NAME: &'static str = "Number";

        fn selector(&self) -> Selector {
            match *self {
                Number::Plain(_) => Selector::Universal(Tag::INTEGER),
                Number::Tagged(_) => Selector::Context(1),
            }
        }
    }

    fn decode(data: &'static [u8]) -> Result<Number, Error> {
        Number::decode(Bytes::from_static(data), Mode::Der)
    }

    #[test]
    fn resolve() {
        assert_eq!(
            decode(b"\x02\x01\x05").unwrap(),
            Number::Plain(Integer::from_u64(5))
        );
        let tagged = decode(b"\xa1\x03\x02\x01\x05").unwrap();
        assert_eq!(tagged, Number::Tagged(Integer::from_u64(5)));
        assert_eq!(tagged.selector(), Selector::Context(1));
    }

    #[test]
    fn unresolved() {
        assert!(matches!(
            decode(b"\xa2\x03\x02\x01\x05"),
            Err(Error::UnresolvedChoice { choice: "Number", .. })
        ));
        assert!(matches!(
            decode(b"\x04\x00"),
            Err(Error::UnresolvedChoice { choice: "Number", .. })
        ));
        assert!(matches!(
            decode(b"\x61\x03\x02\x01\x05"),
            Err(Error::UnresolvedChoice { choice: "Number", .. })
        ));
    }

    #[test]
    fn selector() {
        let el = Element::decode(
            Bytes::from_static(b"\x30\x00"), Mode::Der
        ).unwrap();
        assert!(Selector::of(&el).is_untagged());
        let el = Element::decode(
            Bytes::from_static(b"\x80\x00"), Mode::Der
        ).unwrap();
        assert_eq!(Selector::of(&el), Selector::Context(0));
    }
}
