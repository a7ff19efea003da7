//! General names and CRL distribution points.

use crate::captured::{Captured, CapturedAs};
use crate::decode::{Choice, Decode, Element, Field, Schema, Selector};
use crate::decode::SequenceReader;
use crate::encode::{
    self, Choice2, Choice3, Constructed, Forced, Primitive, PrimitiveContent,
    Values,
};
use crate::error::Error;
use crate::form::{EncodingForm, Tracked};
use crate::ident::Tag;
use crate::oid::Oid;
use crate::string::{BitString, Ia5String, OctetString, StringEncoder};


//------------ GeneralName ---------------------------------------------------

/// A name in one of a variety of forms.
///
/// ```text
/// GeneralName ::= CHOICE {
///     otherName                 [0] OtherName,
///     rfc822Name                [1] IA5String,
///     dNSName                   [2] IA5String,
///     x400Address               [3] ORAddress,
///     directoryName             [4] Name,
///     ediPartyName              [5] EDIPartyName,
///     uniformResourceIdentifier [6] IA5String,
///     iPAddress                 [7] OCTET STRING,
///     registeredID              [8] OBJECT IDENTIFIER }
/// ```
///
/// All tags are implicit except for the directory name which, being a
/// CHOICE itself, is explicitly tagged. X.400 addresses, directory names,
/// and EDI party names are captured.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GeneralName {
    OtherName(OtherName),
    Rfc822Name(Ia5String),
    DnsName(Ia5String),
    X400Address(Captured),
    DirectoryName(Captured),
    EdiPartyName(Captured),
    Uri(Ia5String),
    IpAddress(OctetString),
    RegisteredId(Oid),
}

impl GeneralName {
    #[allow(clippy::type_complexity)]
    pub fn encode_ref(&self) -> Choice3<
        Choice2<Forced<impl Values + '_>, Constructed<&Captured>>,
        Choice2<StringEncoder<'_, Ia5String>, CapturedAs<'_>>,
        Choice2<StringEncoder<'_, OctetString>, Primitive<&Oid>>,
    > {
        match self {
            GeneralName::OtherName(name) => {
                Choice3::One(Choice2::One(name.encode_ref_as(Tag::ctx(0))))
            }
            GeneralName::Rfc822Name(name) => {
                Choice3::Two(Choice2::One(name.encode_ref_as(Tag::ctx(1))))
            }
            GeneralName::DnsName(name) => {
                Choice3::Two(Choice2::One(name.encode_ref_as(Tag::ctx(2))))
            }
            GeneralName::X400Address(name) => {
                Choice3::Two(Choice2::Two(name.encode_ref_as(Tag::ctx(3))))
            }
            GeneralName::DirectoryName(name) => {
                Choice3::One(Choice2::Two(name.explicit(Tag::ctx(4))))
            }
            GeneralName::EdiPartyName(name) => {
                Choice3::Two(Choice2::Two(name.encode_ref_as(Tag::ctx(5))))
            }
            GeneralName::Uri(name) => {
                Choice3::Two(Choice2::One(name.encode_ref_as(Tag::ctx(6))))
            }
            GeneralName::IpAddress(addr) => {
                Choice3::Three(Choice2::One(addr.encode_ref_as(Tag::ctx(7))))
            }
            GeneralName::RegisteredId(id) => {
                Choice3::Three(Choice2::Two(id.encode_as(Tag::ctx(8))))
            }
        }
    }
}

impl Decode for GeneralName {
    fn from_element(element: &Element) -> Result<Self, Error> {
        match Selector::of(element) {
            Selector::Context(0) => {
                OtherName::from_element(
                    &element.retag(Tag::SEQUENCE)?
                ).map(GeneralName::OtherName)
            }
            Selector::Context(1) => {
                Ia5String::from_element(
                    &element.retag(Tag::IA5_STRING)?
                ).map(GeneralName::Rfc822Name)
            }
            Selector::Context(2) => {
                Ia5String::from_element(
                    &element.retag(Tag::IA5_STRING)?
                ).map(GeneralName::DnsName)
            }
            Selector::Context(3) => {
                Captured::from_implicit(element, Tag::SEQUENCE).map(
                    GeneralName::X400Address
                )
            }
            Selector::Context(4) => {
                Ok(GeneralName::DirectoryName(
                    Captured::from_element(element.explicit_inner()?)
                ))
            }
            Selector::Context(5) => {
                Captured::from_implicit(element, Tag::SEQUENCE).map(
                    GeneralName::EdiPartyName
                )
            }
            Selector::Context(6) => {
                Ia5String::from_element(
                    &element.retag(Tag::IA5_STRING)?
                ).map(GeneralName::Uri)
            }
            Selector::Context(7) => {
                OctetString::from_element(
                    &element.retag(Tag::OCTET_STRING)?
                ).map(GeneralName::IpAddress)
            }
            Selector::Context(8) => {
                Oid::from_element(
                    &element.retag(Tag::OID)?
                ).map(GeneralName::RegisteredId)
            }
            _ => Err(Self::unresolved(element))
        }
    }
}

impl Choice for GeneralName {
    const NAME: &'static str = "GeneralName";

    fn selector(&self) -> Selector {
        Selector::Context(match *self {
            GeneralName::OtherName(_) => 0,
            GeneralName::Rfc822Name(_) => 1,
            GeneralName::DnsName(_) => 2,
            GeneralName::X400Address(_) => 3,
            GeneralName::DirectoryName(_) => 4,
            GeneralName::EdiPartyName(_) => 5,
            GeneralName::Uri(_) => 6,
            GeneralName::IpAddress(_) => 7,
            GeneralName::RegisteredId(_) => 8,
        })
    }
}

impl Tracked for GeneralName {
    fn form(&self) -> EncodingForm {
        match self {
            GeneralName::OtherName(name) => name.form(),
            GeneralName::X400Address(name) => name.form(),
            GeneralName::DirectoryName(name) => name.form(),
            GeneralName::EdiPartyName(name) => name.form(),
            GeneralName::Rfc822Name(name) => name.form(),
            GeneralName::DnsName(name) => name.form(),
            GeneralName::Uri(name) => name.form(),
            GeneralName::IpAddress(addr) => addr.form(),
            GeneralName::RegisteredId(_) => EncodingForm::Der,
        }
    }
}

values_via_encode_ref!(GeneralName);


//------------ OtherName -----------------------------------------------------

/// A name of some other form.
///
/// ```text
/// OtherName ::= SEQUENCE {
///     type-id    OBJECT IDENTIFIER,
///     value      [0] EXPLICIT ANY DEFINED BY type-id }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OtherName {
    type_id: Oid,
    value: Captured,
    form: EncodingForm,
}

const TYPE_ID: Field = Field::untagged("type-id", Tag::OID);
const VALUE: Field = Field::explicit("value", 0);

pub(crate) static OTHER_NAME: Schema = Schema::new(
    "OtherName", &[TYPE_ID, VALUE]
);

impl OtherName {
    pub fn new(type_id: impl Into<Oid>, value: Captured) -> Self {
        OtherName { type_id: type_id.into(), form: value.form(), value }
    }

    pub fn type_id(&self) -> &Oid {
        &self.type_id
    }

    pub fn value(&self) -> &Captured {
        &self.value
    }

    pub fn encode_ref_as(&self, tag: Tag) -> Forced<impl Values + '_> {
        encode::sequence_as(tag, (
            self.type_id.encode(),
            self.value.encode_ref().explicit(Tag::ctx(0)),
        )).forced(self.form.mode())
    }
}

impl Decode for OtherName {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(&OTHER_NAME, element)?;
        let type_id = reader.take(&TYPE_ID, Oid::from_element)?;
        let value = reader.take(&VALUE, |el| Ok(Captured::from_element(el)))?;
        reader.finish()?;
        Ok(OtherName {
            type_id,
            form: EncodingForm::of(element).or(value.form()),
            value,
        })
    }
}

impl Tracked for OtherName {
    fn form(&self) -> EncodingForm {
        self.form
    }
}


//------------ GeneralNames --------------------------------------------------

/// A non-empty sequence of general names.
///
/// ```text
/// GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneralNames {
    names: Vec<GeneralName>,
    form: EncodingForm,
}

impl GeneralNames {
    /// Creates a value from a list of names.
    ///
    /// Fails if the list is empty.
    pub fn new(
        names: impl IntoIterator<Item = GeneralName>
    ) -> Result<Self, Error> {
        let names: Vec<_> = names.into_iter().collect();
        Self::check_size(names.len())?;
        Ok(GeneralNames { form: names.form(), names })
    }

    fn check_size(len: usize) -> Result<(), Error> {
        if len == 0 {
            return xerr!(Err(Error::BadSequenceSize {
                structure: "GeneralNames", min: 1, max: usize::MAX,
                actual: 0
            }))
        }
        Ok(())
    }

    pub fn as_slice(&self) -> &[GeneralName] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneralName> + '_ {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn encode_ref(&self) -> Forced<Constructed<&[GeneralName]>> {
        self.encode_ref_as(Tag::SEQUENCE)
    }

    pub fn encode_ref_as(
        &self, tag: Tag
    ) -> Forced<Constructed<&[GeneralName]>> {
        encode::sequence_as(tag, self.names.as_slice()).forced(
            self.form.mode()
        )
    }
}

impl Decode for GeneralNames {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let elements = element.sequence()?;
        Self::check_size(elements.len())?;
        let names = elements.iter().map(
            GeneralName::from_element
        ).collect::<Result<Vec<_>, _>>()?;
        Ok(GeneralNames {
            form: EncodingForm::of(element).or(names.form()),
            names,
        })
    }
}

impl Tracked for GeneralNames {
    fn form(&self) -> EncodingForm {
        self.form
    }
}


//------------ DistributionPointName -----------------------------------------

/// The name of a CRL distribution point.
///
/// ```text
/// DistributionPointName ::= CHOICE {
///     fullName                [0] GeneralNames,
///     nameRelativeToCRLIssuer [1] RelativeDistinguishedName }
/// ```
///
/// Both tags are implicit. The relative distinguished name is captured.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DistributionPointName {
    FullName(GeneralNames),
    NameRelativeToCrlIssuer(Captured),
}

impl DistributionPointName {
    pub fn encode_ref(
        &self
    ) -> Choice2<Forced<Constructed<&[GeneralName]>>, CapturedAs> {
        match self {
            DistributionPointName::FullName(names) => {
                Choice2::One(names.encode_ref_as(Tag::ctx(0)))
            }
            DistributionPointName::NameRelativeToCrlIssuer(name) => {
                Choice2::Two(name.encode_ref_as(Tag::ctx(1)))
            }
        }
    }
}

impl Decode for DistributionPointName {
    fn from_element(element: &Element) -> Result<Self, Error> {
        match Selector::of(element) {
            Selector::Context(0) => {
                GeneralNames::from_element(
                    &element.retag(Tag::SEQUENCE)?
                ).map(DistributionPointName::FullName)
            }
            Selector::Context(1) => {
                Captured::from_implicit(element, Tag::SET).map(
                    DistributionPointName::NameRelativeToCrlIssuer
                )
            }
            _ => Err(Self::unresolved(element))
        }
    }
}

impl Choice for DistributionPointName {
    const NAME: &'static str = "DistributionPointName";

    fn selector(&self) -> Selector {
        match *self {
            DistributionPointName::FullName(_) => Selector::Context(0),
            DistributionPointName::NameRelativeToCrlIssuer(_) => {
                Selector::Context(1)
            }
        }
    }
}

impl Tracked for DistributionPointName {
    fn form(&self) -> EncodingForm {
        match self {
            DistributionPointName::FullName(names) => names.form(),
            DistributionPointName::NameRelativeToCrlIssuer(name) => {
                name.form()
            }
        }
    }
}


//------------ DistributionPoint ---------------------------------------------

/// Where to find a CRL.
///
/// ```text
/// DistributionPoint ::= SEQUENCE {
///     distributionPoint       [0] DistributionPointName OPTIONAL,
///     reasons                 [1] ReasonFlags OPTIONAL,
///     cRLIssuer               [2] GeneralNames OPTIONAL }
/// ```
///
/// The distribution point name is explicitly tagged since it is a CHOICE,
/// the other two fields are implicitly tagged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DistributionPoint {
    distribution_point: Option<DistributionPointName>,
    reasons: Option<BitString>,
    crl_issuer: Option<GeneralNames>,
    form: EncodingForm,
}

const DISTRIBUTION_POINT: Field = Field::explicit(
    "distributionPoint", 0
).optional();
const REASONS: Field = Field::implicit(
    "reasons", 1, Tag::BIT_STRING
).optional();
const CRL_ISSUER: Field = Field::implicit(
    "cRLIssuer", 2, Tag::SEQUENCE
).optional();

pub(crate) static DISTRIBUTION_POINT_SCHEMA: Schema = Schema::new(
    "DistributionPoint", &[DISTRIBUTION_POINT, REASONS, CRL_ISSUER]
);

impl DistributionPoint {
    pub fn new(
        distribution_point: Option<DistributionPointName>,
        reasons: Option<BitString>,
        crl_issuer: Option<GeneralNames>,
    ) -> Self {
        DistributionPoint {
            form: distribution_point.form().or(crl_issuer.form()),
            distribution_point, reasons, crl_issuer,
        }
    }

    pub fn distribution_point(&self) -> Option<&DistributionPointName> {
        self.distribution_point.as_ref()
    }

    pub fn reasons(&self) -> Option<&BitString> {
        self.reasons.as_ref()
    }

    pub fn crl_issuer(&self) -> Option<&GeneralNames> {
        self.crl_issuer.as_ref()
    }

    pub fn encode_ref(&self) -> Forced<impl Values + '_> {
        encode::sequence((
            self.distribution_point.as_ref().map(|name| {
                name.encode_ref().explicit(Tag::ctx(0))
            }),
            self.reasons.as_ref().map(|reasons| {
                reasons.encode_as(Tag::ctx(1))
            }),
            self.crl_issuer.as_ref().map(|names| {
                names.encode_ref_as(Tag::ctx(2))
            }),
        )).forced(self.form.mode())
    }
}

impl Decode for DistributionPoint {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &DISTRIBUTION_POINT_SCHEMA, element
        )?;
        let distribution_point = reader.take_opt(
            &DISTRIBUTION_POINT, DistributionPointName::from_element
        )?;
        let reasons = reader.take_opt(&REASONS, BitString::from_element)?;
        let crl_issuer = reader.take_opt(
            &CRL_ISSUER, GeneralNames::from_element
        )?;
        reader.finish()?;
        Ok(DistributionPoint {
            form: EncodingForm::of(element)
                .or(distribution_point.form())
                .or(crl_issuer.form()),
            distribution_point, reasons, crl_issuer,
        })
    }
}

impl Tracked for DistributionPoint {
    fn form(&self) -> EncodingForm {
        self.form
    }
}

values_via_encode_ref!(DistributionPoint);


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use hex_literal::hex;
    use crate::mode::Mode;
    use super::*;

    fn names(data: &[u8], mode: Mode) -> Result<GeneralNames, Error> {
        GeneralNames::decode(Bytes::copy_from_slice(data), mode)
    }

    #[test]
    fn general_names() {
        let data = hex!("
            303a
                a00c 0603 2a0304 a005 0c03 616263
                8107 6140622e6f7267
                8205 622e6f7267
                a406 3004 3102 3000
                8607 687474703a2f2f
                8704 c0000201
                8803 2a0304
        ");
        let decoded = names(&data, Mode::Der).unwrap();
        assert_eq!(decoded.len(), 7);
        let selectors: Vec<_> = decoded.iter().map(|name| {
            name.selector()
        }).collect();
        assert_eq!(selectors, [0, 1, 2, 4, 6, 7, 8].map(Selector::Context));
        match &decoded.as_slice()[1] {
            GeneralName::Rfc822Name(name) => {
                assert_eq!(name.as_str(), "a@b.org")
            }
            other => panic!("unexpected {:?}", other),
        }
        match &decoded.as_slice()[3] {
            GeneralName::DirectoryName(name) => {
                assert_eq!(name.as_slice(), b"\x30\x04\x31\x02\x30\x00")
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(decoded.form(), EncodingForm::Der);
        assert_eq!(decoded.encode_ref().to_vec(Mode::Der), data);
    }

    #[test]
    fn segmented_rfc822_name() {
        let data = hex!("3007 a105 0403 612e62");
        assert!(matches!(
            names(&data, Mode::Der),
            Err(Error::Malformed { .. })
        ));
        let decoded = names(&data, Mode::Ber).unwrap();
        match &decoded.as_slice()[0] {
            GeneralName::Rfc822Name(name) => {
                assert_eq!(name.as_str(), "a.b");
                assert_eq!(name.form(), EncodingForm::Ber);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(decoded.form(), EncodingForm::Ber);
        assert_eq!(
            decoded.encode_ref().to_vec(Mode::Der),
            hex!("3080 a105 0403 612e62 0000")
        );

        let plain = names(&hex!("3005 8103 612e62"), Mode::Der).unwrap();
        assert_eq!(plain.form(), EncodingForm::Der);
    }

    #[test]
    fn empty_general_names() {
        assert!(matches!(
            names(b"\x30\x00", Mode::Der),
            Err(Error::BadSequenceSize { structure: "GeneralNames", .. })
        ));
        assert!(GeneralNames::new([]).is_err());
    }

    #[test]
    fn unresolved_general_name() {
        assert!(matches!(
            names(b"\x30\x02\x89\x00", Mode::Der),
            Err(Error::UnresolvedChoice { choice: "GeneralName", .. })
        ));
        assert!(matches!(
            names(b"\x30\x02\x04\x00", Mode::Der),
            Err(Error::UnresolvedChoice { choice: "GeneralName", .. })
        ));
    }

    #[test]
    fn distribution_point() {
        let data = hex!("
            3016
                a010 a00e 860c 687474703a2f2f782f63726c
                8102 0560
        ");
        let point = DistributionPoint::decode(
            Bytes::copy_from_slice(&data), Mode::Der
        ).unwrap();
        match point.distribution_point() {
            Some(DistributionPointName::FullName(names)) => {
                assert_eq!(names.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
        let reasons = point.reasons().unwrap();
        assert_eq!(reasons.unused(), 5);
        assert!(reasons.bit(1));
        assert!(point.crl_issuer().is_none());
        assert_eq!(point.to_vec(Mode::Der), data);

        let built = DistributionPoint::new(
            Some(DistributionPointName::FullName(
                GeneralNames::new([GeneralName::Uri(
                    Ia5String::from_static("http://x/crl").unwrap()
                )]).unwrap()
            )),
            Some(BitString::new(5, Bytes::from_static(b"\x60")).unwrap()),
            None,
        );
        assert_eq!(built, point);
    }

    #[test]
    fn distribution_point_order() {
        // reasons before distributionPoint
        let data = hex!("
            3016
                8102 0560
                a010 a00e 860c 687474703a2f2f782f63726c
        ");
        assert!(matches!(
            DistributionPoint::decode(Bytes::copy_from_slice(&data), Mode::Der),
            Err(Error::UnexpectedTrailingElements {
                structure: "DistributionPoint", remaining: 1
            })
        ));
    }

    #[test]
    fn relative_name() {
        let data = hex!("
            3008
                a006 a104 3002 3000
        ");
        let point = DistributionPoint::decode(
            Bytes::copy_from_slice(&data), Mode::Der
        ).unwrap();
        match point.distribution_point() {
            Some(DistributionPointName::NameRelativeToCrlIssuer(name)) => {
                assert_eq!(name.tag(), Tag::SET);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(point.to_vec(Mode::Der), data);
    }

    #[test]
    fn schemas() {
        OTHER_NAME.check().unwrap();
        DISTRIBUTION_POINT_SCHEMA.check().unwrap();
    }
}
