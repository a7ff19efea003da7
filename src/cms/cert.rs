//! Certificates, revocation information and originator information.
//!
//! CMS doesn’t interpret certificates or CRLs. They are kept as captured
//! values. What matters is which alternative of the respective CHOICE is
//! used since this affects the version of the enclosing structure.

use crate::captured::{Captured, CapturedAs};
use crate::decode::{Choice, Decode, Element, Field, Schema, Selector};
use crate::decode::SequenceReader;
use crate::encode::{
    self, Choice2, Choice3, Forced, PrimitiveContent, Values,
};
use crate::error::Error;
use crate::form::{EncodingForm, SetOf, Tracked};
use crate::ident::Tag;
use crate::int::Integer;
use crate::oid::Oid;


//------------ IssuerAndSerialNumber -----------------------------------------

/// A certificate identified by its issuer and serial number.
///
/// ```text
/// IssuerAndSerialNumber ::= SEQUENCE {
///     issuer Name,
///     serialNumber CertificateSerialNumber }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IssuerAndSerialNumber {
    issuer: Captured,
    serial_number: Integer,
    form: EncodingForm,
}

const ISSUER: Field = Field::untagged("issuer", Tag::SEQUENCE);
const SERIAL_NUMBER: Field = Field::untagged("serialNumber", Tag::INTEGER);

pub(crate) static ISSUER_AND_SERIAL_NUMBER: Schema = Schema::new(
    "IssuerAndSerialNumber", &[ISSUER, SERIAL_NUMBER]
);

impl IssuerAndSerialNumber {
    /// Creates a value from the encoded issuer name and a serial number.
    pub fn new(issuer: Captured, serial_number: Integer) -> Self {
        IssuerAndSerialNumber { form: issuer.form(), issuer, serial_number }
    }

    pub fn issuer(&self) -> &Captured {
        &self.issuer
    }

    pub fn serial_number(&self) -> &Integer {
        &self.serial_number
    }

    pub fn encode_ref(&self) -> Forced<impl Values + '_> {
        encode::sequence((
            &self.issuer,
            self.serial_number.encode(),
        )).forced(self.form.mode())
    }
}

impl Decode for IssuerAndSerialNumber {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &ISSUER_AND_SERIAL_NUMBER, element
        )?;
        let issuer = reader.take(&ISSUER, |el| Ok(Captured::from_element(el)))?;
        let serial_number = reader.take(&SERIAL_NUMBER, Integer::from_element)?;
        reader.finish()?;
        Ok(IssuerAndSerialNumber {
            form: EncodingForm::of(element).or(issuer.form()),
            issuer, serial_number,
        })
    }
}

impl Tracked for IssuerAndSerialNumber {
    fn form(&self) -> EncodingForm {
        self.form
    }
}

values_via_encode_ref!(IssuerAndSerialNumber);


//------------ CertificateChoices --------------------------------------------

/// A certificate of some kind.
///
/// ```text
/// CertificateChoices ::= CHOICE {
///     certificate Certificate,
///     extendedCertificate [0] IMPLICIT ExtendedCertificate,  -- Obsolete
///     v1AttrCert [1] IMPLICIT AttributeCertificateV1,        -- Obsolete
///     v2AttrCert [2] IMPLICIT AttributeCertificateV2,
///     other [3] IMPLICIT OtherCertificateFormat }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CertificateChoices {
    Certificate(Captured),
    ExtendedCertificate(Captured),
    V1AttrCert(Captured),
    V2AttrCert(Captured),
    Other(OtherCertificateFormat),
}

impl CertificateChoices {
    pub fn encode_ref(
        &self
    ) -> Choice3<&Captured, CapturedAs, impl Values + '_> {
        match self {
            CertificateChoices::Certificate(cert) => Choice3::One(cert),
            CertificateChoices::ExtendedCertificate(cert) => {
                Choice3::Two(cert.encode_ref_as(Tag::ctx(0)))
            }
            CertificateChoices::V1AttrCert(cert) => {
                Choice3::Two(cert.encode_ref_as(Tag::ctx(1)))
            }
            CertificateChoices::V2AttrCert(cert) => {
                Choice3::Two(cert.encode_ref_as(Tag::ctx(2)))
            }
            CertificateChoices::Other(other) => {
                Choice3::Three(other.encode_ref_as(Tag::ctx(3)))
            }
        }
    }
}

impl Decode for CertificateChoices {
    fn from_element(element: &Element) -> Result<Self, Error> {
        match Selector::of(element) {
            Selector::Universal(Tag::SEQUENCE) => {
                Ok(CertificateChoices::Certificate(
                    Captured::from_element(element)
                ))
            }
            Selector::Context(0) => {
                Captured::from_implicit(element, Tag::SEQUENCE).map(
                    CertificateChoices::ExtendedCertificate
                )
            }
            Selector::Context(1) => {
                Captured::from_implicit(element, Tag::SEQUENCE).map(
                    CertificateChoices::V1AttrCert
                )
            }
            Selector::Context(2) => {
                Captured::from_implicit(element, Tag::SEQUENCE).map(
                    CertificateChoices::V2AttrCert
                )
            }
            Selector::Context(3) => {
                OtherCertificateFormat::from_element(
                    &element.retag(Tag::SEQUENCE)?
                ).map(CertificateChoices::Other)
            }
            _ => Err(Self::unresolved(element))
        }
    }
}

impl Choice for CertificateChoices {
    const NAME: &'static str = "CertificateChoices";

    fn selector(&self) -> Selector {
        match *self {
            CertificateChoices::Certificate(_) => {
                Selector::Universal(Tag::SEQUENCE)
            }
            CertificateChoices::ExtendedCertificate(_) => Selector::Context(0),
            CertificateChoices::V1AttrCert(_) => Selector::Context(1),
            CertificateChoices::V2AttrCert(_) => Selector::Context(2),
            CertificateChoices::Other(_) => Selector::Context(3),
        }
    }
}

impl Tracked for CertificateChoices {
    fn form(&self) -> EncodingForm {
        match self {
            CertificateChoices::Certificate(cert)
            | CertificateChoices::ExtendedCertificate(cert)
            | CertificateChoices::V1AttrCert(cert)
            | CertificateChoices::V2AttrCert(cert) => cert.form(),
            CertificateChoices::Other(other) => other.form(),
        }
    }
}

values_via_encode_ref!(CertificateChoices);


//------------ OtherCertificateFormat ----------------------------------------

/// A certificate in a format not known to CMS.
///
/// ```text
/// OtherCertificateFormat ::= SEQUENCE {
///     otherCertFormat OBJECT IDENTIFIER,
///     otherCert ANY DEFINED BY otherCertFormat }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OtherCertificateFormat {
    other_cert_format: Oid,
    other_cert: Captured,
    form: EncodingForm,
}

const OTHER_CERT_FORMAT: Field = Field::untagged("otherCertFormat", Tag::OID);
const OTHER_CERT: Field = Field::any("otherCert");

pub(crate) static OTHER_CERTIFICATE_FORMAT: Schema = Schema::new(
    "OtherCertificateFormat", &[OTHER_CERT_FORMAT, OTHER_CERT]
);

impl OtherCertificateFormat {
    pub fn new(
        other_cert_format: impl Into<Oid>, other_cert: Captured
    ) -> Self {
        OtherCertificateFormat {
            other_cert_format: other_cert_format.into(),
            form: other_cert.form(),
            other_cert,
        }
    }

    pub fn other_cert_format(&self) -> &Oid {
        &self.other_cert_format
    }

    pub fn other_cert(&self) -> &Captured {
        &self.other_cert
    }

    pub fn encode_ref_as(&self, tag: Tag) -> Forced<impl Values + '_> {
        encode::sequence_as(tag, (
            self.other_cert_format.encode(),
            &self.other_cert,
        )).forced(self.form.mode())
    }
}

impl Decode for OtherCertificateFormat {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &OTHER_CERTIFICATE_FORMAT, element
        )?;
        let other_cert_format = reader.take(
            &OTHER_CERT_FORMAT, Oid::from_element
        )?;
        let other_cert = reader.take(&OTHER_CERT, |el| {
            Ok(Captured::from_element(el))
        })?;
        reader.finish()?;
        Ok(OtherCertificateFormat {
            other_cert_format,
            form: EncodingForm::of(element).or(other_cert.form()),
            other_cert,
        })
    }
}

impl Tracked for OtherCertificateFormat {
    fn form(&self) -> EncodingForm {
        self.form
    }
}


//------------ RevocationInfoChoice ------------------------------------------

/// Revocation information of some kind.
///
/// ```text
/// RevocationInfoChoice ::= CHOICE {
///     crl CertificateList,
///     other [1] IMPLICIT OtherRevocationInfoFormat }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RevocationInfoChoice {
    Crl(Captured),
    Other(OtherRevocationInfoFormat),
}

impl RevocationInfoChoice {
    pub fn encode_ref(&self) -> Choice2<&Captured, impl Values + '_> {
        match self {
            RevocationInfoChoice::Crl(crl) => Choice2::One(crl),
            RevocationInfoChoice::Other(other) => {
                Choice2::Two(other.encode_ref_as(Tag::ctx(1)))
            }
        }
    }
}

impl Decode for RevocationInfoChoice {
    fn from_element(element: &Element) -> Result<Self, Error> {
        match Selector::of(element) {
            Selector::Universal(Tag::SEQUENCE) => {
                Ok(RevocationInfoChoice::Crl(Captured::from_element(element)))
            }
            Selector::Context(1) => {
                OtherRevocationInfoFormat::from_element(
                    &element.retag(Tag::SEQUENCE)?
                ).map(RevocationInfoChoice::Other)
            }
            _ => Err(Self::unresolved(element))
        }
    }
}

impl Choice for RevocationInfoChoice {
    const NAME: &'static str = "RevocationInfoChoice";

    fn selector(&self) -> Selector {
        match *self {
            RevocationInfoChoice::Crl(_) => Selector::Universal(Tag::SEQUENCE),
            RevocationInfoChoice::Other(_) => Selector::Context(1),
        }
    }
}

impl Tracked for RevocationInfoChoice {
    fn form(&self) -> EncodingForm {
        match self {
            RevocationInfoChoice::Crl(crl) => crl.form(),
            RevocationInfoChoice::Other(other) => other.form(),
        }
    }
}

values_via_encode_ref!(RevocationInfoChoice);


//------------ OtherRevocationInfoFormat -------------------------------------

/// Revocation information in a format not known to CMS.
///
/// ```text
/// OtherRevocationInfoFormat ::= SEQUENCE {
///     otherRevInfoFormat OBJECT IDENTIFIER,
///     otherRevInfo ANY DEFINED BY otherRevInfoFormat }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OtherRevocationInfoFormat {
    other_rev_info_format: Oid,
    other_rev_info: Captured,
    form: EncodingForm,
}

const OTHER_REV_INFO_FORMAT: Field = Field::untagged(
    "otherRevInfoFormat", Tag::OID
);
const OTHER_REV_INFO: Field = Field::any("otherRevInfo");

pub(crate) static OTHER_REVOCATION_INFO_FORMAT: Schema = Schema::new(
    "OtherRevocationInfoFormat", &[OTHER_REV_INFO_FORMAT, OTHER_REV_INFO]
);

impl OtherRevocationInfoFormat {
    pub fn new(
        other_rev_info_format: impl Into<Oid>, other_rev_info: Captured
    ) -> Self {
        OtherRevocationInfoFormat {
            other_rev_info_format: other_rev_info_format.into(),
            form: other_rev_info.form(),
            other_rev_info,
        }
    }

    pub fn other_rev_info_format(&self) -> &Oid {
        &self.other_rev_info_format
    }

    pub fn other_rev_info(&self) -> &Captured {
        &self.other_rev_info
    }

    pub fn encode_ref_as(&self, tag: Tag) -> Forced<impl Values + '_> {
        encode::sequence_as(tag, (
            self.other_rev_info_format.encode(),
            &self.other_rev_info,
        )).forced(self.form.mode())
    }
}

impl Decode for OtherRevocationInfoFormat {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &OTHER_REVOCATION_INFO_FORMAT, element
        )?;
        let other_rev_info_format = reader.take(
            &OTHER_REV_INFO_FORMAT, Oid::from_element
        )?;
        let other_rev_info = reader.take(&OTHER_REV_INFO, |el| {
            Ok(Captured::from_element(el))
        })?;
        reader.finish()?;
        Ok(OtherRevocationInfoFormat {
            other_rev_info_format,
            form: EncodingForm::of(element).or(other_rev_info.form()),
            other_rev_info,
        })
    }
}

impl Tracked for OtherRevocationInfoFormat {
    fn form(&self) -> EncodingForm {
        self.form
    }
}


//------------ CertificateSet and RevocationInfoChoices ----------------------

/// A SET OF CertificateChoices.
pub type CertificateSet = SetOf<CertificateChoices>;

/// A SET OF RevocationInfoChoice.
pub type RevocationInfoChoices = SetOf<RevocationInfoChoice>;

/// Returns whether a certificate set contains an other certificate.
pub(crate) fn has_other_certs(certs: Option<&CertificateSet>) -> bool {
    certs.map_or(false, |certs| {
        certs.iter().any(|cert| matches!(cert, CertificateChoices::Other(_)))
    })
}

/// Returns whether a certificate set contains a v1 attribute certificate.
pub(crate) fn has_v1_attr_certs(certs: Option<&CertificateSet>) -> bool {
    certs.map_or(false, |certs| {
        certs.iter().any(|cert| {
            matches!(cert, CertificateChoices::V1AttrCert(_))
        })
    })
}

/// Returns whether a certificate set contains a v2 attribute certificate.
pub(crate) fn has_v2_attr_certs(certs: Option<&CertificateSet>) -> bool {
    certs.map_or(false, |certs| {
        certs.iter().any(|cert| {
            matches!(cert, CertificateChoices::V2AttrCert(_))
        })
    })
}

/// Returns whether revocation information contains an other format.
pub(crate) fn has_other_crls(crls: Option<&RevocationInfoChoices>) -> bool {
    crls.map_or(false, |crls| {
        crls.iter().any(|crl| matches!(crl, RevocationInfoChoice::Other(_)))
    })
}

pub(crate) fn certificate_set(
    element: &Element
) -> Result<CertificateSet, Error> {
    SetOf::from_element(element, CertificateChoices::from_element)
}

pub(crate) fn revocation_info_choices(
    element: &Element
) -> Result<RevocationInfoChoices, Error> {
    SetOf::from_element(element, RevocationInfoChoice::from_element)
}


//------------ OriginatorInfo ------------------------------------------------

/// Certificates and CRLs of the originator of an enveloped message.
///
/// ```text
/// OriginatorInfo ::= SEQUENCE {
///     certs [0] IMPLICIT CertificateSet OPTIONAL,
///     crls [1] IMPLICIT RevocationInfoChoices OPTIONAL }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OriginatorInfo {
    certs: Option<CertificateSet>,
    crls: Option<RevocationInfoChoices>,
    form: EncodingForm,
}

const CERTS: Field = Field::implicit("certs", 0, Tag::SET).optional();
const CRLS: Field = Field::implicit("crls", 1, Tag::SET).optional();

pub(crate) static ORIGINATOR_INFO: Schema = Schema::new(
    "OriginatorInfo", &[CERTS, CRLS]
);

impl OriginatorInfo {
    pub fn new(
        certs: Option<CertificateSet>, crls: Option<RevocationInfoChoices>
    ) -> Self {
        OriginatorInfo {
            form: certs.form().or(crls.form()),
            certs, crls,
        }
    }

    pub fn certs(&self) -> Option<&CertificateSet> {
        self.certs.as_ref()
    }

    pub fn crls(&self) -> Option<&RevocationInfoChoices> {
        self.crls.as_ref()
    }

    /// Returns whether an other certificate or CRL format is present.
    pub fn has_other(&self) -> bool {
        has_other_certs(self.certs()) || has_other_crls(self.crls())
    }

    /// Returns whether a version 2 attribute certificate is present.
    pub fn has_v2_attr_certs(&self) -> bool {
        has_v2_attr_certs(self.certs())
    }

    pub fn encode_ref_as(&self, tag: Tag) -> Forced<impl Values + '_> {
        encode::sequence_as(tag, (
            self.certs.as_ref().map(|certs| {
                certs.encode_ref_as(Tag::ctx(0))
            }),
            self.crls.as_ref().map(|crls| crls.encode_ref_as(Tag::ctx(1))),
        )).forced(self.form.mode())
    }
}

impl Decode for OriginatorInfo {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &ORIGINATOR_INFO, element
        )?;
        let certs = reader.take_opt(&CERTS, certificate_set)?;
        let crls = reader.take_opt(&CRLS, revocation_info_choices)?;
        reader.finish()?;
        Ok(OriginatorInfo {
            form: EncodingForm::of(element).or(certs.form()).or(crls.form()),
            certs, crls,
        })
    }
}

impl Tracked for OriginatorInfo {
    fn form(&self) -> EncodingForm {
        self.form
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use hex_literal::hex;
    use crate::mode::Mode;
    use super::*;

    fn element(data: &[u8], mode: Mode) -> Element {
        Element::decode(Bytes::copy_from_slice(data), mode).unwrap()
    }

    #[test]
    fn certificate_choices() {
        // A certificate, a v2 attribute certificate and an other format.
        let data = hex!("
            3117
                3003 020101
                a203 020102
                a30b 0603 2a0304 3004 02020100
        ");
        let certs = certificate_set(&element(&data, Mode::Der)).unwrap();
        assert_eq!(certs.len(), 3);
        assert!(matches!(
            certs.as_slice()[0], CertificateChoices::Certificate(_)
        ));
        match certs.as_slice()[1] {
            CertificateChoices::V2AttrCert(ref cert) => {
                assert_eq!(cert.as_slice(), b"\x30\x03\x02\x01\x02");
            }
            ref other => panic!("unexpected {:?}", other),
        }
        match certs.as_slice()[2] {
            CertificateChoices::Other(ref other) => {
                assert_eq!(other.other_cert_format().as_ref(), b"\x2a\x03\x04");
                assert_eq!(other.other_cert().tag(), Tag::SEQUENCE);
            }
            ref other => panic!("unexpected {:?}", other),
        }
        assert!(has_other_certs(Some(&certs)));
        assert!(has_v2_attr_certs(Some(&certs)));
        assert!(!has_v1_attr_certs(Some(&certs)));
        assert_eq!(certs.form(), EncodingForm::Der);
        assert_eq!(certs.encode_ref().to_vec(Mode::Der), data);
        assert_eq!(
            certs.as_slice()[2].selector(), Selector::Context(3)
        );
    }

    #[test]
    fn unresolved_choice() {
        let el = element(&hex!("a403 020101"), Mode::Der);
        assert!(matches!(
            CertificateChoices::from_element(&el),
            Err(Error::UnresolvedChoice {
                choice: "CertificateChoices", ..
            })
        ));
        let el = element(&hex!("0201 01"), Mode::Der);
        assert!(matches!(
            RevocationInfoChoice::from_element(&el),
            Err(Error::UnresolvedChoice { .. })
        ));
    }

    #[test]
    fn originator_info() {
        let data = hex!("
            3013
                a005 3003 020101
                a10a a108 0602 2a03 3002 0500
        ");
        let info = OriginatorInfo::decode(
            Bytes::copy_from_slice(&data), Mode::Der
        ).unwrap();
        assert!(info.has_other());
        assert!(!info.has_v2_attr_certs());
        assert_eq!(info.certs().unwrap().len(), 1);
        assert_eq!(info.encode_ref_as(Tag::SEQUENCE).to_vec(Mode::Der), data);

        let swapped = hex!("
            3013
                a10a a108 0602 2a03 3002 0500
                a005 3003 020101
        ");
        assert!(matches!(
            OriginatorInfo::decode(
                Bytes::copy_from_slice(&swapped), Mode::Der
            ),
            Err(Error::UnexpectedTrailingElements { remaining: 1, .. })
        ));
    }

    #[test]
    fn issuer_and_serial() {
        let data = hex!("
            3080
                3080 3100 0000
                0202 0100
            0000
        ");
        let decoded = IssuerAndSerialNumber::decode(
            Bytes::copy_from_slice(&data), Mode::Ber
        ).unwrap();
        assert_eq!(decoded.form(), EncodingForm::Ber);
        assert_eq!(decoded.serial_number().to_u32(), Some(256));
        assert_eq!(decoded.to_vec(Mode::Der), data);

        let swapped = hex!("3008 0202 0100 3002 3100");
        assert!(matches!(
            IssuerAndSerialNumber::decode(
                Bytes::copy_from_slice(&swapped), Mode::Der
            ),
            Err(Error::MissingMandatoryField { field: "issuer", .. })
        ));
    }

    #[test]
    fn schemas() {
        for schema in [
            &ISSUER_AND_SERIAL_NUMBER, &OTHER_CERTIFICATE_FORMAT,
            &OTHER_REVOCATION_INFO_FORMAT, &ORIGINATOR_INFO,
        ] {
            schema.check().unwrap();
        }
    }
}
