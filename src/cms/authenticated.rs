//! Authenticated data.

use crate::attr::{Attribute, AttributeTable};
use crate::decode::{Decode, Element, Field, Schema, SequenceReader};
use crate::encode::{self, Forced, PrimitiveContent, Values};
use crate::error::Error;
use crate::form::{EncodingForm, SetOf, Tracked};
use crate::ident::Tag;
use crate::string::OctetString;
use crate::version::{self, CmsVersion, AUTHENTICATED_DATA_VERSIONS};
use super::algorithm::AlgorithmIdentifier;
use super::cert::OriginatorInfo;
use super::content::EncapsulatedContentInfo;
use super::recipient::RecipientInfo;
use super::signer::attribute_set;


//------------ AuthenticatedData ---------------------------------------------

/// Content protected by a message authentication code.
///
/// ```text
/// AuthenticatedData ::= SEQUENCE {
///     version CMSVersion,
///     originatorInfo [0] IMPLICIT OriginatorInfo OPTIONAL,
///     recipientInfos RecipientInfos,
///     macAlgorithm MessageAuthenticationCodeAlgorithm,
///     digestAlgorithm [1] DigestAlgorithmIdentifier OPTIONAL,
///     encapContentInfo EncapsulatedContentInfo,
///     authAttrs [2] IMPLICIT AuthAttributes OPTIONAL,
///     mac MessageAuthenticationCode,
///     unauthAttrs [3] IMPLICIT UnauthAttributes OPTIONAL }
/// ```
///
/// The digest algorithm and the authenticated attributes are either both
/// present or both absent. They must be present if the content is not
/// id-data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthenticatedData {
    version: CmsVersion,
    originator_info: Option<OriginatorInfo>,
    recipient_infos: SetOf<RecipientInfo>,
    mac_algorithm: AlgorithmIdentifier,
    digest_algorithm: Option<AlgorithmIdentifier>,
    encap_content_info: EncapsulatedContentInfo,
    auth_attrs: Option<SetOf<Attribute>>,
    mac: OctetString,
    unauth_attrs: Option<SetOf<Attribute>>,
    form: EncodingForm,
}

const VERSION: Field = Field::untagged("version", Tag::INTEGER);
const ORIGINATOR_INFO: Field = Field::implicit(
    "originatorInfo", 0, Tag::SEQUENCE
).optional();
const RECIPIENT_INFOS: Field = Field::untagged("recipientInfos", Tag::SET);
const MAC_ALGORITHM: Field = Field::untagged("macAlgorithm", Tag::SEQUENCE);
const DIGEST_ALGORITHM: Field = Field::implicit(
    "digestAlgorithm", 1, Tag::SEQUENCE
).optional();
const ENCAP_CONTENT_INFO: Field = Field::untagged(
    "encapContentInfo", Tag::SEQUENCE
);
const AUTH_ATTRS: Field = Field::implicit(
    "authAttrs", 2, Tag::SET
).optional();
const MAC: Field = Field::untagged("mac", Tag::OCTET_STRING);
const UNAUTH_ATTRS: Field = Field::implicit(
    "unauthAttrs", 3, Tag::SET
).optional();

pub(crate) static AUTHENTICATED_DATA: Schema = Schema::new(
    "AuthenticatedData", &[
        VERSION, ORIGINATOR_INFO, RECIPIENT_INFOS, MAC_ALGORITHM,
        DIGEST_ALGORITHM, ENCAP_CONTENT_INFO, AUTH_ATTRS, MAC, UNAUTH_ATTRS,
    ]
);

impl AuthenticatedData {
    /// Creates new authenticated data.
    ///
    /// The version is determined from the originator info. Fails if the
    /// digest algorithm and authenticated attributes don’t follow the
    /// rules for their presence.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        originator_info: Option<OriginatorInfo>,
        recipient_infos: SetOf<RecipientInfo>,
        mac_algorithm: AlgorithmIdentifier,
        digest_algorithm: Option<AlgorithmIdentifier>,
        encap_content_info: EncapsulatedContentInfo,
        auth_attrs: Option<SetOf<Attribute>>,
        mac: OctetString,
        unauth_attrs: Option<SetOf<Attribute>>,
    ) -> Result<Self, Error> {
        version::check_authenticated_data(
            encap_content_info.e_content_type(),
            digest_algorithm.is_some(), auth_attrs.is_some(),
        )?;
        let form = originator_info.form()
            .or(recipient_infos.form())
            .or(mac_algorithm.form())
            .or(digest_algorithm.form())
            .or(encap_content_info.form())
            .or(auth_attrs.form())
            .or(unauth_attrs.form());
        Ok(AuthenticatedData {
            version: version::authenticated_data_version(
                originator_info.as_ref()
            ),
            originator_info, recipient_infos, mac_algorithm,
            digest_algorithm, encap_content_info, auth_attrs, mac,
            unauth_attrs, form,
        })
    }

    pub fn version(&self) -> CmsVersion {
        self.version
    }

    pub fn originator_info(&self) -> Option<&OriginatorInfo> {
        self.originator_info.as_ref()
    }

    pub fn recipient_infos(&self) -> &SetOf<RecipientInfo> {
        &self.recipient_infos
    }

    pub fn mac_algorithm(&self) -> &AlgorithmIdentifier {
        &self.mac_algorithm
    }

    pub fn digest_algorithm(&self) -> Option<&AlgorithmIdentifier> {
        self.digest_algorithm.as_ref()
    }

    pub fn encap_content_info(&self) -> &EncapsulatedContentInfo {
        &self.encap_content_info
    }

    pub fn auth_attrs(&self) -> Option<&SetOf<Attribute>> {
        self.auth_attrs.as_ref()
    }

    /// Returns the authenticated attributes as a table.
    pub fn auth_attrs_table(&self) -> Option<AttributeTable> {
        self.auth_attrs.as_ref().map(AttributeTable::from_set)
    }

    pub fn mac(&self) -> &OctetString {
        &self.mac
    }

    pub fn unauth_attrs(&self) -> Option<&SetOf<Attribute>> {
        self.unauth_attrs.as_ref()
    }

    /// Returns the version the content requires.
    pub fn inferred_version(&self) -> CmsVersion {
        version::authenticated_data_version(self.originator_info())
    }

    /// Checks the version of the data and of all recipient infos.
    pub fn check_version(&self) -> Result<(), Error> {
        self.version.check_expected(
            AUTHENTICATED_DATA.name(), self.inferred_version()
        )?;
        self.recipient_infos.iter().try_for_each(RecipientInfo::check_version)
    }

    pub fn encode_ref(&self) -> Forced<impl Values + '_> {
        encode::sequence((
            self.version.encode(),
            self.originator_info.as_ref().map(|info| {
                info.encode_ref_as(Tag::ctx(0))
            }),
            self.recipient_infos.encode_ref(),
            &self.mac_algorithm,
            self.digest_algorithm.as_ref().map(|alg| {
                alg.encode_ref_as(Tag::ctx(1))
            }),
            &self.encap_content_info,
            self.auth_attrs.as_ref().map(|attrs| {
                attrs.encode_ref_as(Tag::ctx(2))
            }),
            self.mac.encode_ref(),
            self.unauth_attrs.as_ref().map(|attrs| {
                attrs.encode_ref_as(Tag::ctx(3))
            }),
        )).forced(self.form.mode())
    }
}

impl Decode for AuthenticatedData {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &AUTHENTICATED_DATA, element
        )?;
        let version = reader.take(&VERSION, |el| {
            CmsVersion::from_element(
                el, AUTHENTICATED_DATA.name(), AUTHENTICATED_DATA_VERSIONS
            )
        })?;
        let originator_info = reader.take_opt(
            &ORIGINATOR_INFO, OriginatorInfo::from_element
        )?;
        let recipient_infos = reader.take(&RECIPIENT_INFOS, |el| {
            SetOf::from_element(el, RecipientInfo::from_element)
        })?;
        let mac_algorithm = reader.take(
            &MAC_ALGORITHM, AlgorithmIdentifier::from_element
        )?;
        let digest_algorithm = reader.take_opt(
            &DIGEST_ALGORITHM, AlgorithmIdentifier::from_element
        )?;
        let encap_content_info = reader.take(
            &ENCAP_CONTENT_INFO, EncapsulatedContentInfo::from_element
        )?;
        let auth_attrs = reader.take_opt(&AUTH_ATTRS, attribute_set)?;
        let mac = reader.take(&MAC, OctetString::from_element)?;
        let unauth_attrs = reader.take_opt(&UNAUTH_ATTRS, attribute_set)?;
        reader.finish()?;
        version::check_authenticated_data(
            encap_content_info.e_content_type(),
            digest_algorithm.is_some(), auth_attrs.is_some(),
        )?;
        let form = EncodingForm::of(element)
            .or(originator_info.form())
            .or(recipient_infos.form())
            .or(mac_algorithm.form())
            .or(digest_algorithm.form())
            .or(encap_content_info.form())
            .or(auth_attrs.form())
            .or(unauth_attrs.form());
        Ok(AuthenticatedData {
            version, originator_info, recipient_infos, mac_algorithm,
            digest_algorithm, encap_content_info, auth_attrs, mac,
            unauth_attrs, form,
        })
    }
}

impl Tracked for AuthenticatedData {
    fn form(&self) -> EncodingForm {
        self.form
    }
}

values_via_encode_ref!(AuthenticatedData);


//============ Tests =========================================================
