//! Signed data.

use crate::decode::{Decode, Element, Field, Schema, SequenceReader};
use crate::encode::{self, Forced, PrimitiveContent, Values};
use crate::error::Error;
use crate::form::{EncodingForm, SetOf, Tracked};
use crate::ident::Tag;
use crate::version::{self, CmsVersion, SIGNED_DATA_VERSIONS};
use super::algorithm::AlgorithmIdentifier;
use super::cert::{
    CertificateSet, RevocationInfoChoices, certificate_set,
    revocation_info_choices,
};
use super::content::EncapsulatedContentInfo;
use super::signer::SignerInfo;


//------------ SignedData ----------------------------------------------------

/// Content with any number of signatures.
///
/// ```text
/// SignedData ::= SEQUENCE {
///     version CMSVersion,
///     digestAlgorithms DigestAlgorithmIdentifiers,
///     encapContentInfo EncapsulatedContentInfo,
///     certificates [0] IMPLICIT CertificateSet OPTIONAL,
///     crls [1] IMPLICIT RevocationInfoChoices OPTIONAL,
///     signerInfos SignerInfos }
///
/// DigestAlgorithmIdentifiers ::= SET OF DigestAlgorithmIdentifier
/// SignerInfos ::= SET OF SignerInfo
/// ```
///
/// The digest algorithms, certificates, CRLs, and signer infos are kept in
/// the form they were decoded in and encoded again in that form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignedData {
    version: CmsVersion,
    digest_algorithms: SetOf<AlgorithmIdentifier>,
    encap_content_info: EncapsulatedContentInfo,
    certificates: Option<CertificateSet>,
    crls: Option<RevocationInfoChoices>,
    signer_infos: SetOf<SignerInfo>,
    form: EncodingForm,
}

const VERSION: Field = Field::untagged("version", Tag::INTEGER);
const DIGEST_ALGORITHMS: Field = Field::untagged(
    "digestAlgorithms", Tag::SET
);
const ENCAP_CONTENT_INFO: Field = Field::untagged(
    "encapContentInfo", Tag::SEQUENCE
);
const CERTIFICATES: Field = Field::implicit(
    "certificates", 0, Tag::SET
).optional();
const CRLS: Field = Field::implicit("crls", 1, Tag::SET).optional();
const SIGNER_INFOS: Field = Field::untagged("signerInfos", Tag::SET);

pub(crate) static SIGNED_DATA: Schema = Schema::new("SignedData", &[
    VERSION, DIGEST_ALGORITHMS, ENCAP_CONTENT_INFO, CERTIFICATES, CRLS,
    SIGNER_INFOS,
]);

impl SignedData {
    /// Creates new signed data.
    ///
    /// The version is determined from the content.
    pub fn new(
        digest_algorithms: SetOf<AlgorithmIdentifier>,
        encap_content_info: EncapsulatedContentInfo,
        certificates: Option<CertificateSet>,
        crls: Option<RevocationInfoChoices>,
        signer_infos: SetOf<SignerInfo>,
    ) -> Self {
        let version = version::signed_data_version(
            certificates.as_ref(), crls.as_ref(),
            encap_content_info.e_content_type(), signer_infos.as_slice(),
        );
        let form = digest_algorithms.form()
            .or(encap_content_info.form())
            .or(certificates.form())
            .or(crls.form())
            .or(signer_infos.form());
        SignedData {
            version, digest_algorithms, encap_content_info, certificates,
            crls, signer_infos, form,
        }
    }

    pub fn version(&self) -> CmsVersion {
        self.version
    }

    pub fn digest_algorithms(&self) -> &SetOf<AlgorithmIdentifier> {
        &self.digest_algorithms
    }

    pub fn encap_content_info(&self) -> &EncapsulatedContentInfo {
        &self.encap_content_info
    }

    pub fn certificates(&self) -> Option<&CertificateSet> {
        self.certificates.as_ref()
    }

    pub fn crls(&self) -> Option<&RevocationInfoChoices> {
        self.crls.as_ref()
    }

    pub fn signer_infos(&self) -> &SetOf<SignerInfo> {
        &self.signer_infos
    }

    /// Returns the version the content requires.
    pub fn inferred_version(&self) -> CmsVersion {
        version::signed_data_version(
            self.certificates(), self.crls(),
            self.encap_content_info.e_content_type(),
            self.signer_infos.as_slice(),
        )
    }

    /// Checks that the version is the one required by the content.
    pub fn check_version(&self) -> Result<(), Error> {
        self.version.check_expected(
            SIGNED_DATA.name(), self.inferred_version()
        )
    }

    pub fn encode_ref(&self) -> Forced<impl Values + '_> {
        encode::sequence((
            self.version.encode(),
            self.digest_algorithms.encode_ref(),
            &self.encap_content_info,
            self.certificates.as_ref().map(|certs| {
                certs.encode_ref_as(Tag::ctx(0))
            }),
            self.crls.as_ref().map(|crls| crls.encode_ref_as(Tag::ctx(1))),
            self.signer_infos.encode_ref(),
        )).forced(self.form.mode())
    }
}

impl Decode for SignedData {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(&SIGNED_DATA, element)?;
        let version = reader.take(&VERSION, |el| {
            CmsVersion::from_element(
                el, SIGNED_DATA.name(), SIGNED_DATA_VERSIONS
            )
        })?;
        let digest_algorithms = reader.take(&DIGEST_ALGORITHMS, |el| {
            SetOf::from_element(el, AlgorithmIdentifier::from_element)
        })?;
        let encap_content_info = reader.take(
            &ENCAP_CONTENT_INFO, EncapsulatedContentInfo::from_element
        )?;
        let certificates = reader.take_opt(&CERTIFICATES, certificate_set)?;
        let crls = reader.take_opt(&CRLS, revocation_info_choices)?;
        let signer_infos = reader.take(&SIGNER_INFOS, |el| {
            SetOf::from_element(el, SignerInfo::from_element)
        })?;
        reader.finish()?;
        let form = EncodingForm::of(element)
            .or(digest_algorithms.form())
            .or(encap_content_info.form())
            .or(certificates.form())
            .or(crls.form())
            .or(signer_infos.form());
        Ok(SignedData {
            version, digest_algorithms, encap_content_info, certificates,
            crls, signer_infos, form,
        })
    }
}

impl Tracked for SignedData {
    fn form(&self) -> EncodingForm {
        self.form
    }
}

values_via_encode_ref!(SignedData);


//============ Tests =========================================================
