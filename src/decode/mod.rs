//! Decoding data.
//!
//! Decoding happens in two steps. First, the encoded data is taken apart
//! into a tree of [`Element`]s according to the rules selected by a
//! [`Mode`]. This step only checks the framing of the data. In the second
//! step, the element tree is converted into the actual types.
//!
//! For SEQUENCE types, the second step is driven by a [`SequenceReader`]
//! which consumes the elements of the sequence in the order given by the
//! type’s [`Schema`], a static list of [`Field`] descriptors. CHOICE types
//! implement the [`Choice`] trait and pick their alternative by matching on
//! the [`Selector`] of an element.
//!
//! Types that can be decoded implement the [`Decode`] trait.

pub use self::choice::{Choice, Selector};
pub use self::element::Element;
pub use self::field::{Explicitness, Field, Presence, Schema, Tagging};
pub use self::reader::SequenceReader;

use bytes::Bytes;
use crate::error::Error;
use crate::mode::Mode;

mod choice;
mod element;
mod field;
mod reader;


//------------ Decode --------------------------------------------------------

/// A type that can be decoded from an element.
///
/// There is exactly one way to decode each type. Implementations only need
/// to provide [`from_element`][Self::from_element]. Decoding from encoded
/// data is then available via [`decode`][Self::decode].
pub trait Decode: Sized {
    /// Decodes a value from a decoded element.
    fn from_element(element: &Element) -> Result<Self, Error>;

    /// Decodes a value from its complete encoding.
    ///
    /// The data must contain exactly one value.
    fn decode(data: impl Into<Bytes>, mode: Mode) -> Result<Self, Error> {
        let res = Element::decode(data, mode).and_then(|element| {
            Self::from_element(&element)
        });
        if let Err(ref err) = res {
            log::debug!(
                "failed to decode {}: {}", std::any::type_name::<Self>(), err
            );
        }
        res
    }
}
