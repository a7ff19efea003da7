//! Cryptographic Message Syntax.
//!
//! This module contains the content types of CMS as defined in RFC 5652,
//! authenticated enveloped data from RFC 5083, and compressed data from
//! RFC 3274. The entry point for a complete message is [`ContentInfo`].
//!
//! Certificates, CRLs, names and algorithm parameters are not interpreted.
//! They are kept as [`Captured`][crate::Captured] values and written out
//! again exactly as they were received.

pub use self::algorithm::AlgorithmIdentifier;
pub use self::authenticated::AuthenticatedData;
pub use self::authenveloped::AuthEnvelopedData;
pub use self::cert::{
    CertificateChoices, CertificateSet, IssuerAndSerialNumber,
    OriginatorInfo, OtherCertificateFormat, OtherRevocationInfoFormat,
    RevocationInfoChoice, RevocationInfoChoices,
};
pub use self::compressed::CompressedData;
pub use self::content::{
    Content, ContentInfo, EncapsulatedContentInfo, EncryptedContentInfo,
};
pub use self::enveloped::EnvelopedData;
pub use self::recipient::{
    KekIdentifier, KekRecipientInfo, KeyAgreeRecipientIdentifier,
    KeyAgreeRecipientInfo, KeyTransRecipientInfo, OriginatorIdentifierOrKey,
    OriginatorPublicKey, OtherRecipientInfo, PasswordRecipientInfo,
    RecipientEncryptedKey, RecipientIdentifier, RecipientInfo,
    RecipientKeyIdentifier,
};
pub use self::signed::SignedData;
pub use self::signer::{SignerIdentifier, SignerInfo};

pub mod oid;

mod algorithm;
mod authenticated;
mod authenveloped;
pub(crate) mod cert;
mod compressed;
mod content;
mod enveloped;
pub(crate) mod recipient;
mod signed;
pub(crate) mod signer;
