//! Signer information.

use crate::attr::{Attribute, AttributeTable};
use crate::decode::{Choice, Decode, Element, Field, Schema, Selector};
use crate::decode::SequenceReader;
use crate::encode::{self, Choice2, Forced, PrimitiveContent, Values};
use crate::error::Error;
use crate::form::{EncodingForm, SetOf, Tracked};
use crate::ident::Tag;
use crate::string::{OctetString, StringEncoder};
use crate::version::{self, CmsVersion, SIGNER_INFO_VERSIONS};
use super::algorithm::AlgorithmIdentifier;
use super::cert::IssuerAndSerialNumber;


//------------ SignerIdentifier ----------------------------------------------

/// Identifies the certificate of a signer.
///
/// ```text
/// SignerIdentifier ::= CHOICE {
///     issuerAndSerialNumber IssuerAndSerialNumber,
///     subjectKeyIdentifier [0] SubjectKeyIdentifier }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SignerIdentifier {
    IssuerAndSerialNumber(IssuerAndSerialNumber),
    SubjectKeyIdentifier(OctetString),
}

impl SignerIdentifier {
    pub fn encode_ref(
        &self
    ) -> Choice2<impl Values + '_, StringEncoder<OctetString>> {
        match self {
            SignerIdentifier::IssuerAndSerialNumber(id) => {
                Choice2::One(id.encode_ref())
            }
            SignerIdentifier::SubjectKeyIdentifier(id) => {
                Choice2::Two(id.encode_ref_as(Tag::ctx(0)))
            }
        }
    }
}

impl Decode for SignerIdentifier {
    fn from_element(element: &Element) -> Result<Self, Error> {
        match Selector::of(element) {
            Selector::Universal(Tag::SEQUENCE) => {
                IssuerAndSerialNumber::from_element(element).map(
                    SignerIdentifier::IssuerAndSerialNumber
                )
            }
            Selector::Context(0) => {
                OctetString::from_element(
                    &element.retag(Tag::OCTET_STRING)?
                ).map(SignerIdentifier::SubjectKeyIdentifier)
            }
            _ => Err(Self::unresolved(element))
        }
    }
}

impl Choice for SignerIdentifier {
    const NAME: &'static str = "SignerIdentifier";

    fn selector(&self) -> Selector {
        match *self {
            SignerIdentifier::IssuerAndSerialNumber(_) => {
                Selector::Universal(Tag::SEQUENCE)
            }
            SignerIdentifier::SubjectKeyIdentifier(_) => Selector::Context(0),
        }
    }
}

impl Tracked for SignerIdentifier {
    fn form(&self) -> EncodingForm {
        match self {
            SignerIdentifier::IssuerAndSerialNumber(id) => id.form(),
            SignerIdentifier::SubjectKeyIdentifier(id) => id.form(),
        }
    }
}

values_via_encode_ref!(SignerIdentifier);


//------------ SignerInfo ----------------------------------------------------

/// Information about a single signer.
///
/// ```text
/// SignerInfo ::= SEQUENCE {
///     version CMSVersion,
///     sid SignerIdentifier,
///     digestAlgorithm DigestAlgorithmIdentifier,
///     signedAttrs [0] IMPLICIT SignedAttributes OPTIONAL,
///     signatureAlgorithm SignatureAlgorithmIdentifier,
///     signature SignatureValue,
///     unsignedAttrs [1] IMPLICIT UnsignedAttributes OPTIONAL }
/// ```
///
/// The signed attributes are kept in the form they were encoded in since
/// the signature is calculated over their encoding.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignerInfo {
    version: CmsVersion,
    sid: SignerIdentifier,
    digest_algorithm: AlgorithmIdentifier,
    signed_attrs: Option<SetOf<Attribute>>,
    signature_algorithm: AlgorithmIdentifier,
    signature: OctetString,
    unsigned_attrs: Option<SetOf<Attribute>>,
    form: EncodingForm,
}

const VERSION: Field = Field::untagged("version", Tag::INTEGER);
const SID: Field = Field::any("sid");
const DIGEST_ALGORITHM: Field = Field::untagged(
    "digestAlgorithm", Tag::SEQUENCE
);
const SIGNED_ATTRS: Field = Field::implicit(
    "signedAttrs", 0, Tag::SET
).optional();
const SIGNATURE_ALGORITHM: Field = Field::untagged(
    "signatureAlgorithm", Tag::SEQUENCE
);
const SIGNATURE: Field = Field::untagged("signature", Tag::OCTET_STRING);
const UNSIGNED_ATTRS: Field = Field::implicit(
    "unsignedAttrs", 1, Tag::SET
).optional();

pub(crate) static SIGNER_INFO: Schema = Schema::new("SignerInfo", &[
    VERSION, SID, DIGEST_ALGORITHM, SIGNED_ATTRS, SIGNATURE_ALGORITHM,
    SIGNATURE, UNSIGNED_ATTRS,
]);

impl SignerInfo {
    /// Creates a new signer info.
    ///
    /// The version is derived from the signer identifier.
    pub fn new(
        sid: SignerIdentifier,
        digest_algorithm: AlgorithmIdentifier,
        signed_attrs: Option<SetOf<Attribute>>,
        signature_algorithm: AlgorithmIdentifier,
        signature: OctetString,
        unsigned_attrs: Option<SetOf<Attribute>>,
    ) -> Self {
        let form = sid.form()
            .or(digest_algorithm.form())
            .or(signed_attrs.form())
            .or(signature_algorithm.form())
            .or(signature.form())
            .or(unsigned_attrs.form());
        SignerInfo {
            version: version::signer_info_version(&sid),
            sid, digest_algorithm, signed_attrs, signature_algorithm,
            signature, unsigned_attrs, form,
        }
    }

    pub fn version(&self) -> CmsVersion {
        self.version
    }

    pub fn sid(&self) -> &SignerIdentifier {
        &self.sid
    }

    pub fn digest_algorithm(&self) -> &AlgorithmIdentifier {
        &self.digest_algorithm
    }

    pub fn signed_attrs(&self) -> Option<&SetOf<Attribute>> {
        self.signed_attrs.as_ref()
    }

    /// Returns the signed attributes as a table.
    pub fn signed_attrs_table(&self) -> Option<AttributeTable> {
        self.signed_attrs.as_ref().map(AttributeTable::from_set)
    }

    /// Returns the octets the signature is calculated over.
    ///
    /// If signed attributes are present, this is their encoding with the
    /// SET tag rather than the implicit tag used in the signer info.
    pub fn signed_attrs_for_signature(&self) -> Option<Vec<u8>> {
        self.signed_attrs.as_ref().map(|attrs| {
            attrs.encode_ref().to_vec(attrs.form().mode())
        })
    }

    pub fn signature_algorithm(&self) -> &AlgorithmIdentifier {
        &self.signature_algorithm
    }

    pub fn signature(&self) -> &OctetString {
        &self.signature
    }

    pub fn unsigned_attrs(&self) -> Option<&SetOf<Attribute>> {
        self.unsigned_attrs.as_ref()
    }

    /// Returns the unsigned attributes as a table.
    pub fn unsigned_attrs_table(&self) -> Option<AttributeTable> {
        self.unsigned_attrs.as_ref().map(AttributeTable::from_set)
    }

    /// Checks that the version matches the signer identifier.
    pub fn check_version(&self) -> Result<(), Error> {
        self.version.check_expected(
            SIGNER_INFO.name(), version::signer_info_version(&self.sid)
        )
    }

    pub fn encode_ref(&self) -> Forced<impl Values + '_> {
        encode::sequence((
            self.version.encode(),
            self.sid.encode_ref(),
            &self.digest_algorithm,
            self.signed_attrs.as_ref().map(|attrs| {
                attrs.encode_ref_as(Tag::ctx(0))
            }),
            &self.signature_algorithm,
            self.signature.encode_ref(),
            self.unsigned_attrs.as_ref().map(|attrs| {
                attrs.encode_ref_as(Tag::ctx(1))
            }),
        )).forced(self.form.mode())
    }
}

impl Decode for SignerInfo {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(&SIGNER_INFO, element)?;
        let version = reader.take(&VERSION, |el| {
            CmsVersion::from_element(
                el, SIGNER_INFO.name(), SIGNER_INFO_VERSIONS
            )
        })?;
        let sid = reader.take(&SID, SignerIdentifier::from_element)?;
        let digest_algorithm = reader.take(
            &DIGEST_ALGORITHM, AlgorithmIdentifier::from_element
        )?;
        let signed_attrs = reader.take_opt(&SIGNED_ATTRS, attribute_set)?;
        let signature_algorithm = reader.take(
            &SIGNATURE_ALGORITHM, AlgorithmIdentifier::from_element
        )?;
        let signature = reader.take(&SIGNATURE, OctetString::from_element)?;
        let unsigned_attrs = reader.take_opt(&UNSIGNED_ATTRS, attribute_set)?;
        reader.finish()?;
        let form = EncodingForm::of(element)
            .or(sid.form())
            .or(digest_algorithm.form())
            .or(signed_attrs.form())
            .or(signature_algorithm.form())
            .or(signature.form())
            .or(unsigned_attrs.form());
        Ok(SignerInfo {
            version, sid, digest_algorithm, signed_attrs, signature_algorithm,
            signature, unsigned_attrs, form,
        })
    }
}

impl Tracked for SignerInfo {
    fn form(&self) -> EncodingForm {
        self.form
    }
}

values_via_encode_ref!(SignerInfo);

/// Decodes a SET OF Attribute.
pub(crate) fn attribute_set(
    element: &Element
) -> Result<SetOf<Attribute>, Error> {
    SetOf::from_element(element, Attribute::from_element)
}


//============ Tests =========================================================

#[cfg(test)]
pub(crate) mod test {
    use bytes::Bytes;
    use hex_literal::hex;
    use crate::captured::Captured;
    use crate::cms::oid;
    use crate::int::Integer;
    use crate::mode::Mode;
    use super::*;

    pub fn issuer_and_serial(serial: u32) -> IssuerAndSerialNumber {
        IssuerAndSerialNumber::new(
            Captured::decode(Bytes::from_static(b"\x30\x02\x31\x00"), Mode::Der)
                .unwrap(),
            Integer::from(serial),
        )
    }

    pub fn signer(sid: SignerIdentifier) -> SignerInfo {
        SignerInfo::new(
            sid,
            AlgorithmIdentifier::new(oid::SHA256),
            Some(SetOf::new([
                Attribute::new(oid::ID_CONTENT_TYPE, [
                    Captured::from_values(
                        Mode::Der, oid::ID_DATA.encode()
                    ).unwrap()
                ]),
            ])),
            AlgorithmIdentifier::new(oid::SHA256_WITH_RSA_ENCRYPTION),
            OctetString::from(&b"signature"[..]),
            None,
        )
    }

    #[test]
    fn built_versions() {
        let by_issuer = signer(SignerIdentifier::IssuerAndSerialNumber(
            issuer_and_serial(1)
        ));
        assert_eq!(by_issuer.version(), CmsVersion::V1);
        by_issuer.check_version().unwrap();

        let by_ski = signer(SignerIdentifier::SubjectKeyIdentifier(
            OctetString::from(&b"ski"[..])
        ));
        assert_eq!(by_ski.version(), CmsVersion::V3);
        assert_eq!(by_ski.form(), EncodingForm::Der);
    }

    #[test]
    fn round_trip() {
        let info = signer(SignerIdentifier::SubjectKeyIdentifier(
            OctetString::from(&b"ski"[..])
        ));
        let encoded = info.to_vec(Mode::Der);
        let decoded = SignerInfo::decode(
            Bytes::from(encoded.clone()), Mode::Der
        ).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(decoded.to_vec(Mode::Der), encoded);
        let table = decoded.signed_attrs_table().unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get(&oid::ID_CONTENT_TYPE).is_some());
        let signed = decoded.signed_attrs_for_signature().unwrap();
        assert_eq!(signed[0], 0x31);
        assert_eq!(&encoded[..], &info.to_vec(Mode::Ber)[..]);
    }

    #[test]
    fn version_must_match_set() {
        // A version 2 signer info.
        let data = hex!("
            3024
                020102
                8003 736b69
                300b 0609 608648016503040201
                300b 0609 2a864886f70d01010b
                0400
        ");
        assert!(matches!(
            SignerInfo::decode(Bytes::copy_from_slice(&data), Mode::Der),
            Err(Error::InvalidVersion { structure: "SignerInfo", .. })
        ));

        // Version 1 with a subject key identifier decodes but is wrong.
        let data = hex!("
            3024
                020101
                8003 736b69
                300b 0609 608648016503040201
                300b 0609 2a864886f70d01010b
                0400
        ");
        let info = SignerInfo::decode(
            Bytes::copy_from_slice(&data), Mode::Der
        ).unwrap();
        assert_eq!(info.version(), CmsVersion::V1);
        assert!(info.signed_attrs().is_none());
        assert!(matches!(
            info.check_version(),
            Err(Error::InvalidVersion { .. })
        ));
        assert_eq!(info.to_vec(Mode::Der), data);
    }

    #[test]
    fn segmented_subject_key_identifier() {
        // The identifier in the constructed form of [0] IMPLICIT OCTET STRING.
        let data = hex!("a003 0401aa");
        assert!(matches!(
            SignerIdentifier::decode(Bytes::copy_from_slice(&data), Mode::Der),
            Err(Error::Malformed { .. })
        ));
        let sid = SignerIdentifier::decode(
            Bytes::copy_from_slice(&data), Mode::Ber
        ).unwrap();
        match sid {
            SignerIdentifier::SubjectKeyIdentifier(ref id) => {
                assert_eq!(id.as_slice(), b"\xaa")
            }
            ref other => panic!("unexpected {:?}", other),
        }
        assert_eq!(sid.form(), EncodingForm::Ber);
        assert_eq!(sid.to_vec(Mode::Der), data);

        let data = hex!("
            3026
                020103
                a005 0403 736b69
                300b 0609 608648016503040201
                300b 0609 2a864886f70d01010b
                0400
        ");
        assert!(SignerInfo::decode(
            Bytes::copy_from_slice(&data), Mode::Der
        ).is_err());
        let info = SignerInfo::decode(
            Bytes::copy_from_slice(&data), Mode::Ber
        ).unwrap();
        assert_eq!(info.form(), EncodingForm::Ber);
        let decoded = SignerInfo::decode(
            Bytes::from(info.to_vec(Mode::Der)), Mode::Ber
        ).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(decoded.form(), EncodingForm::Ber);
    }

    #[test]
    fn schema() {
        SIGNER_INFO.check().unwrap();
    }
}
