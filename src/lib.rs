//! Decoding and encoding of the Cryptographic Message Syntax.
//!
//! This crate reads and writes CMS messages and the related X.509 and
//! post-quantum key structures in the Basic and Distinguished Encoding
//! Rules. Encoded data is first taken apart into a tree of elements by the
//! [`decode`] module. The types of the [`cms`], [`x509`], and [`pqc`]
//! modules are then built from these elements following a static schema
//! for each SEQUENCE and a tag selector for each CHOICE.
//!
//! Decoded values remember whether they were encoded following DER or
//! using BER constructs and are encoded in the same form again. Where a
//! structure carries a version number, it can be derived from the content
//! via the [`version`] module and is checked when decoding.
//!
//! The most commonly used types are re-exported here.

pub use self::attr::{Attribute, AttributeTable};
pub use self::captured::{Captured, CapturedAs};
pub use self::decode::Decode;
pub use self::error::Error;
pub use self::form::{EncodingForm, SetOf, Tracked};
pub use self::ident::{Class, Ident, Tag};
pub use self::int::Integer;
pub use self::mode::Mode;
pub use self::oid::{ConstOid, Oid};
pub use self::string::{BitString, Ia5String, OctetString};
pub use self::time::{GeneralizedTime, UtcTime};
pub use self::version::CmsVersion;

#[macro_use] mod debug;
#[macro_use] pub mod encode;

pub mod decode;
pub mod oid;
pub mod string;
pub mod version;

pub mod cms;
pub mod pqc;
pub mod x509;

mod attr;
mod captured;
mod error;
mod form;
mod ident;
mod int;
mod length;
mod mode;
mod time;
