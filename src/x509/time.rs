//! The time CHOICE.

use crate::decode::{Choice, Decode, Element, Selector};
use crate::encode::{Choice2, Primitive, Values};
use crate::error::Error;
use crate::ident::Tag;
use crate::time::{GeneralizedTime, UtcTime};


//------------ Time ----------------------------------------------------------

/// A point in time.
///
/// ```text
/// Time ::= CHOICE {
///     utcTime UTCTime,
///     generalTime GeneralizedTime }
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Time {
    UtcTime(UtcTime),
    GeneralTime(GeneralizedTime),
}

impl Time {
    /// Returns the characters of the time value.
    pub fn as_str(&self) -> &str {
        match self {
            Time::UtcTime(time) => time.as_str(),
            Time::GeneralTime(time) => time.as_str(),
        }
    }

    pub fn encode_ref(
        &self
    ) -> Choice2<Primitive<&UtcTime>, Primitive<&GeneralizedTime>> {
        match self {
            Time::UtcTime(time) => Choice2::One(time.encode_ref()),
            Time::GeneralTime(time) => Choice2::Two(time.encode_ref()),
        }
    }
}

impl Decode for Time {
    fn from_element(element: &Element) -> Result<Self, Error> {
        match Selector::of(element) {
            Selector::Universal(Tag::UTC_TIME) => {
                UtcTime::from_element(element).map(Time::UtcTime)
            }
            Selector::Universal(Tag::GENERALIZED_TIME) => {
                GeneralizedTime::from_element(element).map(Time::GeneralTime)
            }
            _ => Err(Self::unresolved(element))
        }
    }
}

impl Choice for Time {
    const NAME: &'static str = "Time";

    fn selector(&self) -> Selector {
        match *self {
            Time::UtcTime(_) => Selector::Universal(Tag::UTC_TIME),
            Time::GeneralTime(_) => {
                Selector::Universal(Tag::GENERALIZED_TIME)
            }
        }
    }
}

values_via_encode_ref!(Time);


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use crate::mode::Mode;
    use super::*;

    #[test]
    fn resolve() {
        let time = Time::decode(
            Bytes::from_static(b"\x17\x0d991231235959Z"), Mode::Der
        ).unwrap();
        assert_eq!(time.selector(), Selector::Universal(Tag::UTC_TIME));
        assert_eq!(time.as_str(), "991231235959Z");

        let time = Time::decode(
            Bytes::from_static(b"\x18\x0f20500101000000Z"), Mode::Der
        ).unwrap();
        assert!(matches!(time, Time::GeneralTime(_)));
        assert_eq!(
            time.to_vec(Mode::Der), b"\x18\x0f20500101000000Z"
        );

        assert!(matches!(
            Time::decode(Bytes::from_static(b"\x04\x00"), Mode::Der),
            Err(Error::UnresolvedChoice { choice: "Time", .. })
        ));
    }
}
