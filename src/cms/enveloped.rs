//! Enveloped data.

use crate::attr::{Attribute, AttributeTable};
use crate::decode::{Decode, Element, Field, Schema, SequenceReader};
use crate::encode::{self, Forced, PrimitiveContent, Values};
use crate::error::Error;
use crate::form::{EncodingForm, SetOf, Tracked};
use crate::ident::Tag;
use crate::version::{self, CmsVersion, ENVELOPED_DATA_VERSIONS};
use super::cert::OriginatorInfo;
use super::content::EncryptedContentInfo;
use super::recipient::RecipientInfo;
use super::signer::attribute_set;


//------------ EnvelopedData -------------------------------------------------

/// Encrypted content with the content encryption key for each recipient.
///
/// ```text
/// EnvelopedData ::= SEQUENCE {
///     version CMSVersion,
///     originatorInfo [0] IMPLICIT OriginatorInfo OPTIONAL,
///     recipientInfos RecipientInfos,
///     encryptedContentInfo EncryptedContentInfo,
///     unprotectedAttrs [1] IMPLICIT UnprotectedAttributes OPTIONAL }
///
/// RecipientInfos ::= SET SIZE (1..MAX) OF RecipientInfo
/// UnprotectedAttributes ::= SET SIZE (1..MAX) OF Attribute
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnvelopedData {
    version: CmsVersion,
    originator_info: Option<OriginatorInfo>,
    recipient_infos: SetOf<RecipientInfo>,
    encrypted_content_info: EncryptedContentInfo,
    unprotected_attrs: Option<SetOf<Attribute>>,
    form: EncodingForm,
}

const VERSION: Field = Field::untagged("version", Tag::INTEGER);
const ORIGINATOR_INFO: Field = Field::implicit(
    "originatorInfo", 0, Tag::SEQUENCE
).optional();
const RECIPIENT_INFOS: Field = Field::untagged("recipientInfos", Tag::SET);
const ENCRYPTED_CONTENT_INFO: Field = Field::untagged(
    "encryptedContentInfo", Tag::SEQUENCE
);
const UNPROTECTED_ATTRS: Field = Field::implicit(
    "unprotectedAttrs", 1, Tag::SET
).optional();

pub(crate) static ENVELOPED_DATA: Schema = Schema::new("EnvelopedData", &[
    VERSION, ORIGINATOR_INFO, RECIPIENT_INFOS, ENCRYPTED_CONTENT_INFO,
    UNPROTECTED_ATTRS,
]);

impl EnvelopedData {
    /// Creates new enveloped data.
    ///
    /// The version is determined from the content.
    pub fn new(
        originator_info: Option<OriginatorInfo>,
        recipient_infos: SetOf<RecipientInfo>,
        encrypted_content_info: EncryptedContentInfo,
        unprotected_attrs: Option<SetOf<Attribute>>,
    ) -> Self {
        let version = version::enveloped_data_version(
            originator_info.as_ref(), recipient_infos.as_slice(),
            unprotected_attrs.is_some(),
        );
        let form = originator_info.form()
            .or(recipient_infos.form())
            .or(encrypted_content_info.form())
            .or(unprotected_attrs.form());
        EnvelopedData {
            version, originator_info, recipient_infos,
            encrypted_content_info, unprotected_attrs, form,
        }
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

    pub fn encrypted_content_info(&self) -> &EncryptedContentInfo {
        &self.encrypted_content_info
    }

    pub fn unprotected_attrs(&self) -> Option<&SetOf<Attribute>> {
        self.unprotected_attrs.as_ref()
    }

    /// Returns the unprotected attributes as a table.
    pub fn unprotected_attrs_table(&self) -> Option<AttributeTable> {
        self.unprotected_attrs.as_ref().map(AttributeTable::from_set)
    }

    /// Returns the version the content requires.
    pub fn inferred_version(&self) -> CmsVersion {
        version::enveloped_data_version(
            self.originator_info(), self.recipient_infos.as_slice(),
            self.unprotected_attrs.is_some(),
        )
    }

    /// Checks the version of the data and of all recipient infos.
    pub fn check_version(&self) -> Result<(), Error> {
        self.version.check_expected(
            ENVELOPED_DATA.name(), self.inferred_version()
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
            &self.encrypted_content_info,
            self.unprotected_attrs.as_ref().map(|attrs| {
                attrs.encode_ref_as(Tag::ctx(1))
            }),
        )).forced(self.form.mode())
    }
}

impl Decode for EnvelopedData {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &ENVELOPED_DATA, element
        )?;
        let version = reader.take(&VERSION, |el| {
            CmsVersion::from_element(
                el, ENVELOPED_DATA.name(), ENVELOPED_DATA_VERSIONS
            )
        })?;
        let originator_info = reader.take_opt(
            &ORIGINATOR_INFO, OriginatorInfo::from_element
        )?;
        let recipient_infos = reader.take(&RECIPIENT_INFOS, |el| {
            SetOf::from_element(el, RecipientInfo::from_element)
        })?;
        let encrypted_content_info = reader.take(
            &ENCRYPTED_CONTENT_INFO, EncryptedContentInfo::from_element
        )?;
        let unprotected_attrs = reader.take_opt(
            &UNPROTECTED_ATTRS, attribute_set
        )?;
        reader.finish()?;
        let form = EncodingForm::of(element)
            .or(originator_info.form())
            .or(recipient_infos.form())
            .or(encrypted_content_info.form())
            .or(unprotected_attrs.form());
        Ok(EnvelopedData {
            version, originator_info, recipient_infos,
            encrypted_content_info, unprotected_attrs, form,
        })
    }
}

impl Tracked for EnvelopedData {
    fn form(&self) -> EncodingForm {
        self.form
    }
}

values_via_encode_ref!(EnvelopedData);


//============ Tests =========================================================
