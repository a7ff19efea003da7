//! Encoding for the string types.
//!
//! This module provides types that match the binary string types of ASN.1.
//! [`OctetString`]s contain an unrestricted sequence of octets while
//! [`BitString`]s contain a sequence of bits that does not need to be of a
//! length divisible by eight.
//!
//! Of the character strings, only [`Ia5String`] has a type of its own since
//! it appears in general names. Other character strings only appear inside
//! values that are kept as captured encodings.
//!
//! Under BER, octet strings and character strings may be broken up into a
//! constructed value of segments. Such strings keep their encoding and are
//! written out with the same segments again.

//--- Re-exports

pub use self::bit::BitString;
pub use self::ia5::Ia5String;
pub use self::octet::OctetString;

use crate::captured::CapturedAs;
use crate::encode::{Choice2, Primitive};

//--- Private modules

mod bit;
mod ia5;
mod octet;


//------------ StringEncoder -------------------------------------------------

/// The value encoder for a string that may use the segmented form.
pub type StringEncoder<'a, S> = Choice2<Primitive<&'a S>, CapturedAs<'a>>;
