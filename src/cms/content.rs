//! Content information.
//!
//! A CMS message is a [`ContentInfo`]: a content type and the content
//! itself. The protection content types in turn carry the protected content
//! either in the clear as an [`EncapsulatedContentInfo`] or encrypted as an
//! [`EncryptedContentInfo`].

use bytes::Bytes;
use crate::captured::Captured;
use crate::decode::{Decode, Element, Field, Schema, SequenceReader};
use crate::encode::{
    self, Choice2, Choice3, Forced, PrimitiveContent, Values,
};
use crate::error::Error;
use crate::form::{EncodingForm, Tracked};
use crate::ident::Tag;
use crate::oid::Oid;
use crate::string::OctetString;
use super::algorithm::AlgorithmIdentifier;
use super::authenticated::AuthenticatedData;
use super::authenveloped::AuthEnvelopedData;
use super::compressed::CompressedData;
use super::enveloped::EnvelopedData;
use super::oid;
use super::signed::SignedData;


//------------ ContentInfo ---------------------------------------------------

/// A CMS message.
///
/// ```text
/// ContentInfo ::= SEQUENCE {
///     contentType ContentType,
///     content [0] EXPLICIT ANY DEFINED BY contentType }
/// ```
///
/// Content of the types defined by CMS is decoded into the respective type.
/// Any other content is captured.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContentInfo {
    content: Content,
    form: EncodingForm,
}

const CONTENT_TYPE: Field = Field::untagged("contentType", Tag::OID);
const CONTENT: Field = Field::explicit("content", 0);

pub(crate) static CONTENT_INFO: Schema = Schema::new(
    "ContentInfo", &[CONTENT_TYPE, CONTENT]
);

impl ContentInfo {
    pub fn new(content: Content) -> Self {
        ContentInfo { form: content.form(), content }
    }

    /// Returns the content type.
    pub fn content_type(&self) -> Oid {
        self.content.content_type()
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Converts the value into its content.
    pub fn into_content(self) -> Content {
        self.content
    }

    pub fn encode_ref(&self) -> Forced<impl Values + '_> {
        encode::sequence((
            self.content.content_type_ref().encode(),
            self.content.encode_ref().explicit(Tag::ctx(0)),
        )).forced(self.form.mode())
    }

    /// Encodes the message in the form it was decoded or built in.
    pub fn encode_to_vec(&self) -> Vec<u8> {
        self.encode_ref().to_vec(self.form.mode())
    }
}

impl Decode for ContentInfo {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(&CONTENT_INFO, element)?;
        let content_type = reader.take(&CONTENT_TYPE, Oid::from_element)?;
        let content = reader.take(&CONTENT, |el| {
            Content::from_element(content_type, el)
        })?;
        reader.finish()?;
        Ok(ContentInfo {
            form: EncodingForm::of(element).or(content.form()),
            content,
        })
    }
}

impl Tracked for ContentInfo {
    fn form(&self) -> EncodingForm {
        self.form
    }
}

values_via_encode_ref!(ContentInfo);


//------------ Content -------------------------------------------------------

/// The content of a CMS message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Content {
    Signed(SignedData),
    Enveloped(EnvelopedData),
    Authenticated(AuthenticatedData),
    AuthEnveloped(AuthEnvelopedData),
    Compressed(CompressedData),
    Other {
        content_type: Oid,
        content: Captured,
    },
}

impl Content {
    /// Decodes the content for the given content type.
    pub fn from_element(
        content_type: Oid, element: &Element
    ) -> Result<Self, Error> {
        if content_type == oid::ID_SIGNED_DATA {
            SignedData::from_element(element).map(Content::Signed)
        }
        else if content_type == oid::ID_ENVELOPED_DATA {
            EnvelopedData::from_element(element).map(Content::Enveloped)
        }
        else if content_type == oid::ID_CT_AUTH_DATA {
            AuthenticatedData::from_element(element).map(
                Content::Authenticated
            )
        }
        else if content_type == oid::ID_CT_AUTH_ENVELOPED_DATA {
            AuthEnvelopedData::from_element(element).map(
                Content::AuthEnveloped
            )
        }
        else if content_type == oid::ID_CT_COMPRESSED_DATA {
            CompressedData::from_element(element).map(Content::Compressed)
        }
        else {
            Ok(Content::Other {
                content_type,
                content: Captured::from_element(element),
            })
        }
    }

    /// Returns the content type.
    pub fn content_type(&self) -> Oid {
        self.content_type_ref().clone()
    }

    fn content_type_ref(&self) -> &Oid {
        match self {
            Content::Signed(_) => &SIGNED_DATA,
            Content::Enveloped(_) => &ENVELOPED_DATA,
            Content::Authenticated(_) => &AUTH_DATA,
            Content::AuthEnveloped(_) => &AUTH_ENVELOPED_DATA,
            Content::Compressed(_) => &COMPRESSED_DATA,
            Content::Other { content_type, .. } => content_type,
        }
    }

    pub fn encode_ref(&self) -> Choice3<
        impl Values + '_, impl Values + '_, &Captured
    > {
        match self {
            Content::Signed(inner) => {
                Choice3::One(Choice3::One(inner.encode_ref()))
            }
            Content::Enveloped(inner) => {
                Choice3::One(Choice3::Two(inner.encode_ref()))
            }
            Content::Authenticated(inner) => {
                Choice3::One(Choice3::Three(inner.encode_ref()))
            }
            Content::AuthEnveloped(inner) => {
                Choice3::Two(Choice2::One(inner.encode_ref()))
            }
            Content::Compressed(inner) => {
                Choice3::Two(Choice2::Two(inner.encode_ref()))
            }
            Content::Other { content, .. } => {
                Choice3::Three(content)
            }
        }
    }
}

impl Tracked for Content {
    fn form(&self) -> EncodingForm {
        match self {
            Content::Signed(inner) => inner.form(),
            Content::Enveloped(inner) => inner.form(),
            Content::Authenticated(inner) => inner.form(),
            Content::AuthEnveloped(inner) => inner.form(),
            Content::Compressed(inner) => inner.form(),
            Content::Other { content, .. } => content.form(),
        }
    }
}

static SIGNED_DATA: Oid = Oid(Bytes::from_static(
    oid::ID_SIGNED_DATA.0
));
static ENVELOPED_DATA: Oid = Oid(Bytes::from_static(
    oid::ID_ENVELOPED_DATA.0
));
static AUTH_DATA: Oid = Oid(Bytes::from_static(
    oid::ID_CT_AUTH_DATA.0
));
static AUTH_ENVELOPED_DATA: Oid = Oid(Bytes::from_static(
    oid::ID_CT_AUTH_ENVELOPED_DATA.0
));
static COMPRESSED_DATA: Oid = Oid(Bytes::from_static(
    oid::ID_CT_COMPRESSED_DATA.0
));


//------------ EncapsulatedContentInfo ---------------------------------------

/// Content carried in the clear.
///
/// ```text
/// EncapsulatedContentInfo ::= SEQUENCE {
///     eContentType ContentType,
///     eContent [0] EXPLICIT OCTET STRING OPTIONAL }
/// ```
///
/// If the content is absent, the message is a detached signature or
/// similar.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncapsulatedContentInfo {
    e_content_type: Oid,
    e_content: Option<OctetString>,
    form: EncodingForm,
}

const E_CONTENT_TYPE: Field = Field::untagged("eContentType", Tag::OID);
const E_CONTENT: Field = Field::explicit("eContent", 0).optional();

pub(crate) static ENCAPSULATED_CONTENT_INFO: Schema = Schema::new(
    "EncapsulatedContentInfo", &[E_CONTENT_TYPE, E_CONTENT]
);

impl EncapsulatedContentInfo {
    pub fn new(
        e_content_type: impl Into<Oid>, e_content: Option<OctetString>
    ) -> Self {
        EncapsulatedContentInfo {
            e_content_type: e_content_type.into(),
            e_content,
            form: EncodingForm::Der,
        }
    }

    pub fn e_content_type(&self) -> &Oid {
        &self.e_content_type
    }

    pub fn e_content(&self) -> Option<&OctetString> {
        self.e_content.as_ref()
    }

    pub fn encode_ref(&self) -> Forced<impl Values + '_> {
        encode::sequence((
            self.e_content_type.encode(),
            self.e_content.as_ref().map(|content| {
                content.encode_ref().explicit(Tag::ctx(0))
            }),
        )).forced(self.form.mode())
    }
}

impl Decode for EncapsulatedContentInfo {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &ENCAPSULATED_CONTENT_INFO, element
        )?;
        let e_content_type = reader.take(&E_CONTENT_TYPE, Oid::from_element)?;
        let e_content = reader.take_opt(&E_CONTENT, OctetString::from_element)?;
        reader.finish()?;
        Ok(EncapsulatedContentInfo {
            e_content_type, e_content,
            form: EncodingForm::of(element),
        })
    }
}

impl Tracked for EncapsulatedContentInfo {
    fn form(&self) -> EncodingForm {
        self.form
    }
}

values_via_encode_ref!(EncapsulatedContentInfo);


//------------ EncryptedContentInfo ------------------------------------------

/// Encrypted content.
///
/// ```text
/// EncryptedContentInfo ::= SEQUENCE {
///     contentType ContentType,
///     contentEncryptionAlgorithm ContentEncryptionAlgorithmIdentifier,
///     encryptedContent [0] IMPLICIT EncryptedContent OPTIONAL }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptedContentInfo {
    content_type: Oid,
    content_encryption_algorithm: AlgorithmIdentifier,
    encrypted_content: Option<OctetString>,
    form: EncodingForm,
}

const ENCRYPTED_CONTENT_TYPE: Field = Field::untagged(
    "contentType", Tag::OID
);
const CONTENT_ENCRYPTION_ALGORITHM: Field = Field::untagged(
    "contentEncryptionAlgorithm", Tag::SEQUENCE
);
const ENCRYPTED_CONTENT: Field = Field::implicit(
    "encryptedContent", 0, Tag::OCTET_STRING
).optional();

pub(crate) static ENCRYPTED_CONTENT_INFO: Schema = Schema::new(
    "EncryptedContentInfo",
    &[ENCRYPTED_CONTENT_TYPE, CONTENT_ENCRYPTION_ALGORITHM, ENCRYPTED_CONTENT]
);

impl EncryptedContentInfo {
    pub fn new(
        content_type: impl Into<Oid>,
        content_encryption_algorithm: AlgorithmIdentifier,
        encrypted_content: Option<OctetString>,
    ) -> Self {
        EncryptedContentInfo {
            content_type: content_type.into(),
            form: content_encryption_algorithm.form().or(
                encrypted_content.form()
            ),
            content_encryption_algorithm,
            encrypted_content,
        }
    }

    pub fn content_type(&self) -> &Oid {
        &self.content_type
    }

    pub fn content_encryption_algorithm(&self) -> &AlgorithmIdentifier {
        &self.content_encryption_algorithm
    }

    pub fn encrypted_content(&self) -> Option<&OctetString> {
        self.encrypted_content.as_ref()
    }

    pub fn encode_ref(&self) -> Forced<impl Values + '_> {
        encode::sequence((
            self.content_type.encode(),
            &self.content_encryption_algorithm,
            self.encrypted_content.as_ref().map(|content| {
                content.encode_ref_as(Tag::ctx(0))
            }),
        )).forced(self.form.mode())
    }
}

impl Decode for EncryptedContentInfo {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &ENCRYPTED_CONTENT_INFO, element
        )?;
        let content_type = reader.take(
            &ENCRYPTED_CONTENT_TYPE, Oid::from_element
        )?;
        let content_encryption_algorithm = reader.take(
            &CONTENT_ENCRYPTION_ALGORITHM, AlgorithmIdentifier::from_element
        )?;
        let encrypted_content = reader.take_opt(
            &ENCRYPTED_CONTENT, OctetString::from_element
        )?;
        reader.finish()?;
        Ok(EncryptedContentInfo {
            content_type,
            form: EncodingForm::of(element).or(
                content_encryption_algorithm.form()
            ).or(encrypted_content.form()),
            content_encryption_algorithm,
            encrypted_content,
        })
    }
}

impl Tracked for EncryptedContentInfo {
    fn form(&self) -> EncodingForm {
        self.form
    }
}

values_via_encode_ref!(EncryptedContentInfo);


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use hex_literal::hex;
    use crate::mode::Mode;
    use super::*;

    #[test]
    fn other_content() {
        let data = hex!("
            3011
                0609 2a864886f70d010701
                a004 0402 6869
        ");
        let info = ContentInfo::decode(
            Bytes::copy_from_slice(&data), Mode::Der
        ).unwrap();
        assert_eq!(info.content_type(), oid::ID_DATA);
        match info.content() {
            Content::Other { content, .. } => {
                assert_eq!(content.as_slice(), b"\x04\x02hi")
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(info.encode_to_vec(), data);
    }

    #[test]
    fn content_info_order() {
        let swapped = hex!("
            3011
                a004 0402 6869
                0609 2a864886f70d010701
        ");
        assert!(matches!(
            ContentInfo::decode(Bytes::copy_from_slice(&swapped), Mode::Der),
            Err(Error::MissingMandatoryField { field: "contentType", .. })
        ));
    }

    #[test]
    fn encapsulated_content() {
        let data = hex!("
            3080
                0609 2a864886f70d010701
                a080 2480 0401 68 0401 69 0000 0000
            0000
        ");
        let info = EncapsulatedContentInfo::decode(
            Bytes::copy_from_slice(&data), Mode::Ber
        ).unwrap();
        assert_eq!(info.form(), EncodingForm::Ber);
        assert_eq!(info.e_content().unwrap().as_slice(), b"hi");
        let encoded = info.to_vec(Mode::Der);
        assert_eq!(
            encoded,
            hex!("
                3080
                    0609 2a864886f70d010701
                    a080 0402 6869 0000
                0000
            ")
        );
        assert_eq!(
            EncapsulatedContentInfo::decode(Bytes::from(encoded), Mode::Ber)
                .unwrap(),
            info
        );

        let detached = EncapsulatedContentInfo::new(oid::ID_DATA, None);
        assert_eq!(
            detached.to_vec(Mode::Ber),
            hex!("300b 0609 2a864886f70d010701")
        );
    }

    #[test]
    fn encrypted_content() {
        let data = hex!("
            301c
                0609 2a864886f70d010701
                300b 0609 608648016503040102
                8002 abcd
        ");
        let info = EncryptedContentInfo::decode(
            Bytes::copy_from_slice(&data), Mode::Der
        ).unwrap();
        assert_eq!(info.encrypted_content().unwrap().as_slice(), b"\xab\xcd");
        assert_eq!(
            info.content_encryption_algorithm().algorithm(), &oid::AES128_CBC
        );
        assert_eq!(info.to_vec(Mode::Der), data);

        let too_short = hex!("300b 0609 2a864886f70d010701");
        assert!(matches!(
            EncryptedContentInfo::decode(
                Bytes::copy_from_slice(&too_short), Mode::Der
            ),
            Err(Error::BadSequenceSize {
                structure: "EncryptedContentInfo", min: 2, max: 3, actual: 1
            })
        ));
    }

    #[test]
    fn segmented_encrypted_content() {
        let data = hex!("
            3080
                0609 2a864886f70d010701
                300b 0609 608648016503040102
                a080 0402 abcd 0401 ef 0000
            0000
        ");
        assert!(EncryptedContentInfo::decode(
            Bytes::copy_from_slice(&data), Mode::Der
        ).is_err());
        let info = EncryptedContentInfo::decode(
            Bytes::copy_from_slice(&data), Mode::Ber
        ).unwrap();
        assert_eq!(
            info.encrypted_content().unwrap().as_slice(), b"\xab\xcd\xef"
        );
        assert_eq!(info.encrypted_content().unwrap().form(), EncodingForm::Ber);
        assert_eq!(info.form(), EncodingForm::Ber);
        assert_eq!(info.to_vec(Mode::Der), data);

        let definite = hex!("
            3021
                0609 2a864886f70d010701
                300b 0609 608648016503040102
                a007 0402 abcd 0401 ef
        ");
        assert!(matches!(
            EncryptedContentInfo::decode(
                Bytes::copy_from_slice(&definite), Mode::Der
            ),
            Err(Error::Malformed { .. })
        ));
        let info = EncryptedContentInfo::decode(
            Bytes::copy_from_slice(&definite), Mode::Ber
        ).unwrap();
        assert_eq!(info.form(), EncodingForm::Ber);
    }

    #[test]
    fn schemas() {
        for schema in [
            &CONTENT_INFO, &ENCAPSULATED_CONTENT_INFO, &ENCRYPTED_CONTENT_INFO
        ] {
            schema.check().unwrap();
        }
    }
}
