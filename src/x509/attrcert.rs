//! Attribute certificates.
//!
//! Only the information part of an attribute certificate is provided. The
//! holder and the extensions are captured.

use crate::attr::{Attribute, AttributeTable};
use crate::captured::Captured;
use crate::cms::AlgorithmIdentifier;
use crate::decode::{Choice, Decode, Element, Field, Schema, Selector};
use crate::decode::SequenceReader;
use crate::encode::{
    self, Choice2, Constructed, Forced, PrimitiveContent, Values,
};
use crate::error::Error;
use crate::form::{EncodingForm, Tracked};
use crate::ident::Tag;
use crate::int::Integer;
use crate::string::BitString;
use crate::time::GeneralizedTime;
use super::name::{GeneralName, GeneralNames};


//------------ AttCertIssuer -------------------------------------------------

/// The issuer of an attribute certificate.
///
/// ```text
/// AttCertIssuer ::= CHOICE {
///     v1Form   GeneralNames,  -- MUST NOT be used in this profile
///     v2Form   [0] V2Form     -- v2 only
/// }
/// ```
///
/// The v1 form is accepted when decoding.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AttCertIssuer {
    V1Form(GeneralNames),
    V2Form(V2Form),
}

impl AttCertIssuer {
    pub fn encode_ref(&self) -> Choice2<
        Forced<Constructed<&[GeneralName]>>, Forced<impl Values + '_>
    > {
        match self {
            AttCertIssuer::V1Form(names) => Choice2::One(names.encode_ref()),
            AttCertIssuer::V2Form(form) => {
                Choice2::Two(form.encode_ref_as(Tag::ctx(0)))
            }
        }
    }
}

impl Decode for AttCertIssuer {
    fn from_element(element: &Element) -> Result<Self, Error> {
        match Selector::of(element) {
            Selector::Universal(Tag::SEQUENCE) => {
                GeneralNames::from_element(element).map(AttCertIssuer::V1Form)
            }
            Selector::Context(0) => {
                V2Form::from_element(
                    &element.retag(Tag::SEQUENCE)?
                ).map(AttCertIssuer::V2Form)
            }
            _ => Err(Self::unresolved(element))
        }
    }
}

impl Choice for AttCertIssuer {
    const NAME: &'static str = "AttCertIssuer";

    fn selector(&self) -> Selector {
        match *self {
            AttCertIssuer::V1Form(_) => Selector::Universal(Tag::SEQUENCE),
            AttCertIssuer::V2Form(_) => Selector::Context(0),
        }
    }
}

impl Tracked for AttCertIssuer {
    fn form(&self) -> EncodingForm {
        match self {
            AttCertIssuer::V1Form(names) => names.form(),
            AttCertIssuer::V2Form(form) => form.form(),
        }
    }
}


//------------ V2Form --------------------------------------------------------

/// ```text
/// V2Form ::= SEQUENCE {
///     issuerName            GeneralNames  OPTIONAL,
///     baseCertificateID     [0] IssuerSerial  OPTIONAL,
///     objectDigestInfo      [1] ObjectDigestInfo  OPTIONAL }
/// ```
///
/// The base certificate ID and object digest info are captured.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct V2Form {
    issuer_name: Option<GeneralNames>,
    base_certificate_id: Option<Captured>,
    object_digest_info: Option<Captured>,
    form: EncodingForm,
}

const ISSUER_NAME: Field = Field::untagged(
    "issuerName", Tag::SEQUENCE
).optional();
const BASE_CERTIFICATE_ID: Field = Field::implicit(
    "baseCertificateID", 0, Tag::SEQUENCE
).optional();
const OBJECT_DIGEST_INFO: Field = Field::implicit(
    "objectDigestInfo", 1, Tag::SEQUENCE
).optional();

pub(crate) static V2_FORM: Schema = Schema::new(
    "V2Form", &[ISSUER_NAME, BASE_CERTIFICATE_ID, OBJECT_DIGEST_INFO]
);

impl V2Form {
    pub fn new(
        issuer_name: Option<GeneralNames>,
        base_certificate_id: Option<Captured>,
        object_digest_info: Option<Captured>,
    ) -> Self {
        V2Form {
            form: issuer_name.form()
                .or(base_certificate_id.form())
                .or(object_digest_info.form()),
            issuer_name, base_certificate_id, object_digest_info,
        }
    }

    pub fn issuer_name(&self) -> Option<&GeneralNames> {
        self.issuer_name.as_ref()
    }

    pub fn base_certificate_id(&self) -> Option<&Captured> {
        self.base_certificate_id.as_ref()
    }

    pub fn object_digest_info(&self) -> Option<&Captured> {
        self.object_digest_info.as_ref()
    }

    pub fn encode_ref_as(&self, tag: Tag) -> Forced<impl Values + '_> {
        encode::sequence_as(tag, (
            self.issuer_name.as_ref().map(GeneralNames::encode_ref),
            self.base_certificate_id.as_ref().map(|id| {
                id.encode_ref_as(Tag::ctx(0))
            }),
            self.object_digest_info.as_ref().map(|info| {
                info.encode_ref_as(Tag::ctx(1))
            }),
        )).forced(self.form.mode())
    }
}

impl Decode for V2Form {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(&V2_FORM, element)?;
        let issuer_name = reader.take_opt(
            &ISSUER_NAME, GeneralNames::from_element
        )?;
        let base_certificate_id = reader.take_opt(
            &BASE_CERTIFICATE_ID, |el| Ok(Captured::from_element(el))
        )?;
        let object_digest_info = reader.take_opt(
            &OBJECT_DIGEST_INFO, |el| Ok(Captured::from_element(el))
        )?;
        reader.finish()?;
        Ok(V2Form {
            form: EncodingForm::of(element)
                .or(issuer_name.form())
                .or(base_certificate_id.form())
                .or(object_digest_info.form()),
            issuer_name, base_certificate_id, object_digest_info,
        })
    }
}

impl Tracked for V2Form {
    fn form(&self) -> EncodingForm {
        self.form
    }
}


//------------ AttCertValidityPeriod -----------------------------------------

/// ```text
/// AttCertValidityPeriod  ::= SEQUENCE {
///     notBeforeTime  GeneralizedTime,
///     notAfterTime   GeneralizedTime }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttCertValidityPeriod {
    not_before: GeneralizedTime,
    not_after: GeneralizedTime,
    form: EncodingForm,
}

const NOT_BEFORE_TIME: Field = Field::untagged(
    "notBeforeTime", Tag::GENERALIZED_TIME
);
const NOT_AFTER_TIME: Field = Field::untagged(
    "notAfterTime", Tag::GENERALIZED_TIME
);

pub(crate) static ATT_CERT_VALIDITY_PERIOD: Schema = Schema::new(
    "AttCertValidityPeriod", &[NOT_BEFORE_TIME, NOT_AFTER_TIME]
);

impl AttCertValidityPeriod {
    pub fn new(
        not_before: GeneralizedTime, not_after: GeneralizedTime
    ) -> Self {
        AttCertValidityPeriod {
            not_before, not_after, form: EncodingForm::Der
        }
    }

    pub fn not_before(&self) -> &GeneralizedTime {
        &self.not_before
    }

    pub fn not_after(&self) -> &GeneralizedTime {
        &self.not_after
    }

    pub fn encode_ref(&self) -> Forced<impl Values + '_> {
        encode::sequence((
            self.not_before.encode_ref(),
            self.not_after.encode_ref(),
        )).forced(self.form.mode())
    }
}

impl Decode for AttCertValidityPeriod {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &ATT_CERT_VALIDITY_PERIOD, element
        )?;
        let not_before = reader.take(
            &NOT_BEFORE_TIME, GeneralizedTime::from_element
        )?;
        let not_after = reader.take(
            &NOT_AFTER_TIME, GeneralizedTime::from_element
        )?;
        reader.finish()?;
        Ok(AttCertValidityPeriod {
            not_before, not_after, form: EncodingForm::of(element)
        })
    }
}

impl Tracked for AttCertValidityPeriod {
    fn form(&self) -> EncodingForm {
        self.form
    }
}


//------------ AttributeCertificateInfo --------------------------------------

/// The information of an attribute certificate.
///
/// ```text
/// AttributeCertificateInfo ::= SEQUENCE {
///     version                 AttCertVersion,  -- version is v2
///     holder                  Holder,
///     issuer                  AttCertIssuer,
///     signature               AlgorithmIdentifier,
///     serialNumber            CertificateSerialNumber,
///     attrCertValidityPeriod  AttCertValidityPeriod,
///     attributes              SEQUENCE OF Attribute,
///     issuerUniqueID          UniqueIdentifier OPTIONAL,
///     extensions              Extensions OPTIONAL }
/// ```
///
/// Older attribute certificates lack the version which then defaults to
/// v1. The version is therefore optional when decoding and kept as it was
/// found.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttributeCertificateInfo {
    version: Option<Integer>,
    holder: Captured,
    issuer: AttCertIssuer,
    signature: AlgorithmIdentifier,
    serial_number: Integer,
    validity_period: AttCertValidityPeriod,
    attributes: Vec<Attribute>,
    issuer_unique_id: Option<BitString>,
    extensions: Option<Captured>,
    form: EncodingForm,
}

const VERSION: Field = Field::untagged("version", Tag::INTEGER).optional();
const HOLDER: Field = Field::untagged("holder", Tag::SEQUENCE);
const ISSUER: Field = Field::any("issuer");
const SIGNATURE: Field = Field::untagged("signature", Tag::SEQUENCE);
const SERIAL_NUMBER: Field = Field::untagged("serialNumber", Tag::INTEGER);
const ATTR_CERT_VALIDITY_PERIOD: Field = Field::untagged(
    "attrCertValidityPeriod", Tag::SEQUENCE
);
const ATTRIBUTES: Field = Field::untagged("attributes", Tag::SEQUENCE);
const ISSUER_UNIQUE_ID: Field = Field::untagged(
    "issuerUniqueID", Tag::BIT_STRING
).optional();
const EXTENSIONS: Field = Field::untagged(
    "extensions", Tag::SEQUENCE
).optional();

pub(crate) static ATTRIBUTE_CERTIFICATE_INFO: Schema = Schema::new(
    "AttributeCertificateInfo", &[
        VERSION, HOLDER, ISSUER, SIGNATURE, SERIAL_NUMBER,
        ATTR_CERT_VALIDITY_PERIOD, ATTRIBUTES, ISSUER_UNIQUE_ID, EXTENSIONS,
    ]
);

impl AttributeCertificateInfo {
    /// Creates a new v2 attribute certificate info.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        holder: Captured,
        issuer: AttCertIssuer,
        signature: AlgorithmIdentifier,
        serial_number: Integer,
        validity_period: AttCertValidityPeriod,
        attributes: Vec<Attribute>,
        issuer_unique_id: Option<BitString>,
        extensions: Option<Captured>,
    ) -> Self {
        let form = holder.form()
            .or(issuer.form())
            .or(signature.form())
            .or(validity_period.form())
            .or(attributes.form())
            .or(extensions.form());
        AttributeCertificateInfo {
            version: Some(Integer::from(1)),
            holder, issuer, signature, serial_number, validity_period,
            attributes, issuer_unique_id, extensions, form,
        }
    }

    /// Returns the version if present.
    pub fn version(&self) -> Option<&Integer> {
        self.version.as_ref()
    }

    pub fn holder(&self) -> &Captured {
        &self.holder
    }

    pub fn issuer(&self) -> &AttCertIssuer {
        &self.issuer
    }

    pub fn signature(&self) -> &AlgorithmIdentifier {
        &self.signature
    }

    pub fn serial_number(&self) -> &Integer {
        &self.serial_number
    }

    pub fn validity_period(&self) -> &AttCertValidityPeriod {
        &self.validity_period
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Returns the attributes as a table.
    pub fn attributes_table(&self) -> AttributeTable {
        self.attributes.iter().cloned().collect()
    }

    pub fn issuer_unique_id(&self) -> Option<&BitString> {
        self.issuer_unique_id.as_ref()
    }

    pub fn extensions(&self) -> Option<&Captured> {
        self.extensions.as_ref()
    }

    pub fn encode_ref(&self) -> Forced<impl Values + '_> {
        encode::sequence((
            self.version.as_ref().map(|version| version.encode()),
            &self.holder,
            self.issuer.encode_ref(),
            &self.signature,
            self.serial_number.encode(),
            self.validity_period.encode_ref(),
            encode::sequence(self.attributes.as_slice()),
            self.issuer_unique_id.as_ref().map(BitString::encode_ref),
            self.extensions.as_ref(),
        )).forced(self.form.mode())
    }
}

impl Decode for AttributeCertificateInfo {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &ATTRIBUTE_CERTIFICATE_INFO, element
        )?;
        let version = reader.take_opt(&VERSION, Integer::from_element)?;
        let holder = reader.take(&HOLDER, |el| {
            Ok(Captured::from_element(el))
        })?;
        let issuer = reader.take(&ISSUER, AttCertIssuer::from_element)?;
        let signature = reader.take(
            &SIGNATURE, AlgorithmIdentifier::from_element
        )?;
        let serial_number = reader.take(
            &SERIAL_NUMBER, Integer::from_element
        )?;
        let validity_period = reader.take(
            &ATTR_CERT_VALIDITY_PERIOD, AttCertValidityPeriod::from_element
        )?;
        let attributes = reader.take(&ATTRIBUTES, |el| {
            el.sequence()?.iter().map(
                Attribute::from_element
            ).collect::<Result<Vec<_>, _>>()
        })?;
        let issuer_unique_id = reader.take_opt(
            &ISSUER_UNIQUE_ID, BitString::from_element
        )?;
        let extensions = reader.take_opt(&EXTENSIONS, |el| {
            Ok(Captured::from_element(el))
        })?;
        reader.finish()?;
        let form = EncodingForm::of(element)
            .or(holder.form())
            .or(issuer.form())
            .or(signature.form())
            .or(validity_period.form())
            .or(attributes.form())
            .or(extensions.form());
        Ok(AttributeCertificateInfo {
            version, holder, issuer, signature, serial_number,
            validity_period, attributes, issuer_unique_id, extensions, form,
        })
    }
}

impl Tracked for AttributeCertificateInfo {
    fn form(&self) -> EncodingForm {
        self.form
    }
}

values_via_encode_ref!(AttributeCertificateInfo);


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use crate::cms::oid;
    use crate::mode::Mode;
    use crate::string::Ia5String;
    use super::*;

    fn captured(data: &'static [u8]) -> Captured {
        Captured::decode(Bytes::from_static(data), Mode::Der).unwrap()
    }

    fn time(s: &'static str) -> GeneralizedTime {
        GeneralizedTime::new(Bytes::from_static(s.as_bytes())).unwrap()
    }

    fn info() -> AttributeCertificateInfo {
        AttributeCertificateInfo::new(
            captured(b"\x30\x00"),
            AttCertIssuer::V2Form(V2Form::new(
                Some(GeneralNames::new([GeneralName::DnsName(
                    Ia5String::from_static("ca.example").unwrap()
                )]).unwrap()),
                None, None,
            )),
            AlgorithmIdentifier::new(oid::SHA256_WITH_RSA_ENCRYPTION),
            Integer::from(17),
            AttCertValidityPeriod::new(
                time("20240101000000Z"), time("20250101000000Z")
            ),
            vec![
                Attribute::new(oid::ID_DATA, [captured(b"\x05\x00")]),
                Attribute::new(oid::ID_DATA, [captured(b"\x01\x01\xff")]),
            ],
            None, None,
        )
    }

    #[test]
    fn round_trip() {
        let info = info();
        let encoded = info.to_vec(Mode::Der);
        let decoded = AttributeCertificateInfo::decode(
            Bytes::from(encoded.clone()), Mode::Der
        ).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(decoded.version().and_then(Integer::to_u32), Some(1));
        assert_eq!(decoded.issuer().selector(), Selector::Context(0));
        assert_eq!(decoded.attributes().len(), 2);
        assert_eq!(
            decoded.attributes_table().get_all(&oid::ID_DATA).unwrap().len(),
            2
        );
        assert_eq!(decoded.to_vec(Mode::Der), encoded);
    }

    #[test]
    fn without_version() {
        let info = info();
        let element = Element::decode(
            Bytes::from(info.to_vec(Mode::Der)), Mode::Der
        ).unwrap();
        let mut content = Vec::new();
        for field in &element.sequence().unwrap()[1..] {
            content.extend_from_slice(field.raw());
        }
        let mut encoded = vec![0x30, content.len() as u8];
        encoded.extend_from_slice(&content);
        let decoded = AttributeCertificateInfo::decode(
            Bytes::from(encoded.clone()), Mode::Der
        ).unwrap();
        assert!(decoded.version().is_none());
        assert_eq!(decoded.serial_number().to_u32(), Some(17));
        assert_eq!(decoded.to_vec(Mode::Der), encoded);
    }

    #[test]
    fn sequence_size() {
        let element = Element::decode(
            Bytes::from(info().to_vec(Mode::Der)), Mode::Der
        ).unwrap();
        let mut content = Vec::new();
        for field in &element.sequence().unwrap()[2..] {
            content.extend_from_slice(field.raw());
        }
        let mut encoded = vec![0x30, content.len() as u8];
        encoded.extend_from_slice(&content);
        assert!(matches!(
            AttributeCertificateInfo::decode(Bytes::from(encoded), Mode::Der),
            Err(Error::BadSequenceSize {
                structure: "AttributeCertificateInfo",
                min: 6, max: 9, actual: 5,
            })
        ));
    }

    #[test]
    fn v1_issuer() {
        let issuer = AttCertIssuer::decode(
            Bytes::from_static(b"\x30\x05\x82\x03a.b"), Mode::Der
        ).unwrap();
        assert!(matches!(issuer, AttCertIssuer::V1Form(_)));
        assert!(matches!(
            AttCertIssuer::decode(
                Bytes::from_static(b"\xa1\x00"), Mode::Der
            ),
            Err(Error::UnresolvedChoice { choice: "AttCertIssuer", .. })
        ));
    }

    #[test]
    fn schemas() {
        V2_FORM.check().unwrap();
        ATT_CERT_VALIDITY_PERIOD.check().unwrap();
        ATTRIBUTE_CERTIFICATE_INFO.check().unwrap();
        assert_eq!(ATTRIBUTE_CERTIFICATE_INFO.min(), 6);
        assert_eq!(ATTRIBUTE_CERTIFICATE_INFO.max(), 9);
    }
}
