//! Authenticated enveloped data.

use crate::attr::{Attribute, AttributeTable};
use crate::decode::{Decode, Element, Field, Schema, SequenceReader};
use crate::encode::{self, Forced, PrimitiveContent, Values};
use crate::error::Error;
use crate::form::{EncodingForm, SetOf, Tracked};
use crate::ident::Tag;
use crate::string::OctetString;
use crate::version::{self, CmsVersion, AUTH_ENVELOPED_DATA_VERSIONS};
use super::cert::OriginatorInfo;
use super::content::EncryptedContentInfo;
use super::recipient::RecipientInfo;
use super::signer::attribute_set;


//------------ AuthEnvelopedData ---------------------------------------------

/// Content encrypted with an authenticated encryption algorithm.
///
/// ```text
/// AuthEnvelopedData ::= SEQUENCE {
///     version CMSVersion,
///     originatorInfo [0] IMPLICIT OriginatorInfo OPTIONAL,
///     recipientInfos RecipientInfos,
///     authEncryptedContentInfo EncryptedContentInfo,
///     authAttrs [1] IMPLICIT AuthAttributes OPTIONAL,
///     mac MessageAuthenticationCode,
///     unauthAttrs [2] IMPLICIT UnauthAttributes OPTIONAL }
/// ```
///
/// The version is always 0. Authenticated attributes must be present if
/// the content type is not id-data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthEnvelopedData {
    version: CmsVersion,
    originator_info: Option<OriginatorInfo>,
    recipient_infos: SetOf<RecipientInfo>,
    auth_encrypted_content_info: EncryptedContentInfo,
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
const AUTH_ENCRYPTED_CONTENT_INFO: Field = Field::untagged(
    "authEncryptedContentInfo", Tag::SEQUENCE
);
const AUTH_ATTRS: Field = Field::implicit(
    "authAttrs", 1, Tag::SET
).optional();
const MAC: Field = Field::untagged("mac", Tag::OCTET_STRING);
const UNAUTH_ATTRS: Field = Field::implicit(
    "unauthAttrs", 2, Tag::SET
).optional();

pub(crate) static AUTH_ENVELOPED_DATA: Schema = Schema::new(
    "AuthEnvelopedData", &[
        VERSION, ORIGINATOR_INFO, RECIPIENT_INFOS,
        AUTH_ENCRYPTED_CONTENT_INFO, AUTH_ATTRS, MAC, UNAUTH_ATTRS,
    ]
);

impl AuthEnvelopedData {
    /// Creates new authenticated enveloped data.
    ///
    /// Fails if there are no recipients or if authenticated attributes are
    /// missing for content other than id-data.
    pub fn new(
        originator_info: Option<OriginatorInfo>,
        recipient_infos: SetOf<RecipientInfo>,
        auth_encrypted_content_info: EncryptedContentInfo,
        auth_attrs: Option<SetOf<Attribute>>,
        mac: OctetString,
        unauth_attrs: Option<SetOf<Attribute>>,
    ) -> Result<Self, Error> {
        version::check_auth_enveloped_data(
            auth_encrypted_content_info.content_type(),
            auth_attrs.is_some(), recipient_infos.len(),
        )?;
        let form = originator_info.form()
            .or(recipient_infos.form())
            .or(auth_encrypted_content_info.form())
            .or(auth_attrs.form())
            .or(unauth_attrs.form());
        Ok(AuthEnvelopedData {
            version: version::auth_enveloped_data_version(),
            originator_info, recipient_infos, auth_encrypted_content_info,
            auth_attrs, mac, unauth_attrs, form,
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

    pub fn auth_encrypted_content_info(&self) -> &EncryptedContentInfo {
        &self.auth_encrypted_content_info
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

    /// Checks the version of the data and of all recipient infos.
    pub fn check_version(&self) -> Result<(), Error> {
        self.version.check_expected(
            AUTH_ENVELOPED_DATA.name(), version::auth_enveloped_data_version()
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
            &self.auth_encrypted_content_info,
            self.auth_attrs.as_ref().map(|attrs| {
                attrs.encode_ref_as(Tag::ctx(1))
            }),
            self.mac.encode_ref(),
            self.unauth_attrs.as_ref().map(|attrs| {
                attrs.encode_ref_as(Tag::ctx(2))
            }),
        )).forced(self.form.mode())
    }
}

impl Decode for AuthEnvelopedData {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &AUTH_ENVELOPED_DATA, element
        )?;
        let version = reader.take(&VERSION, |el| {
            CmsVersion::from_element(
                el, AUTH_ENVELOPED_DATA.name(), AUTH_ENVELOPED_DATA_VERSIONS
            )
        })?;
        let originator_info = reader.take_opt(
            &ORIGINATOR_INFO, OriginatorInfo::from_element
        )?;
        let recipient_infos = reader.take(&RECIPIENT_INFOS, |el| {
            SetOf::from_element(el, RecipientInfo::from_element)
        })?;
        let auth_encrypted_content_info = reader.take(
            &AUTH_ENCRYPTED_CONTENT_INFO, EncryptedContentInfo::from_element
        )?;
        let auth_attrs = reader.take_opt(&AUTH_ATTRS, attribute_set)?;
        let mac = reader.take(&MAC, OctetString::from_element)?;
        let unauth_attrs = reader.take_opt(&UNAUTH_ATTRS, attribute_set)?;
        reader.finish()?;
        version::check_auth_enveloped_data(
            auth_encrypted_content_info.content_type(),
            auth_attrs.is_some(), recipient_infos.len(),
        )?;
        let form = EncodingForm::of(element)
            .or(originator_info.form())
            .or(recipient_infos.form())
            .or(auth_encrypted_content_info.form())
            .or(auth_attrs.form())
            .or(unauth_attrs.form());
        Ok(AuthEnvelopedData {
            version, originator_info, recipient_infos,
            auth_encrypted_content_info, auth_attrs, mac, unauth_attrs, form,
        })
    }
}

impl Tracked for AuthEnvelopedData {
    fn form(&self) -> EncodingForm {
        self.form
    }
}

values_via_encode_ref!(AuthEnvelopedData);


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use crate::captured::Captured;
    use crate::cms::algorithm::AlgorithmIdentifier;
    use crate::cms::content::{Content, ContentInfo};
    use crate::cms::oid;
    use crate::cms::recipient::test::ktri_v0;
    use crate::mode::Mode;
    use super::*;

    fn content(content_type: crate::oid::ConstOid) -> EncryptedContentInfo {
        EncryptedContentInfo::new(
            content_type,
            AlgorithmIdentifier::new(oid::AES128_GCM),
            Some(OctetString::from(&b"ciphertext"[..])),
        )
    }

    fn auth_attrs() -> SetOf<Attribute> {
        SetOf::new([Attribute::new(oid::ID_CONTENT_TYPE, [
            Captured::from_values(
                Mode::Der, oid::ID_SIGNED_DATA.encode()
            ).unwrap()
        ])])
    }

    fn auth_enveloped(
        content_type: crate::oid::ConstOid,
        auth_attrs: Option<SetOf<Attribute>>,
    ) -> Result<AuthEnvelopedData, Error> {
        AuthEnvelopedData::new(
            None,
            SetOf::new([ktri_v0()]),
            content(content_type),
            auth_attrs,
            OctetString::from(&b"tag"[..]),
            None,
        )
    }

    #[test]
    fn auth_attrs_required() {
        assert!(matches!(
            auth_enveloped(oid::ID_SIGNED_DATA, None),
            Err(Error::InvalidVersion { structure: "AuthEnvelopedData", .. })
        ));
        let data = auth_enveloped(
            oid::ID_SIGNED_DATA, Some(auth_attrs())
        ).unwrap();
        assert_eq!(data.version(), CmsVersion::V0);
        data.check_version().unwrap();

        let data = auth_enveloped(oid::ID_DATA, None).unwrap();
        assert_eq!(data.version(), CmsVersion::V0);
    }

    #[test]
    fn recipients_required() {
        assert!(matches!(
            AuthEnvelopedData::new(
                None, SetOf::new([]), content(oid::ID_DATA), None,
                OctetString::from(&b"tag"[..]), None,
            ),
            Err(Error::InvalidVersion { structure: "AuthEnvelopedData", .. })
        ));
    }

    #[test]
    fn round_trip() {
        let data = auth_enveloped(
            oid::ID_SIGNED_DATA, Some(auth_attrs())
        ).unwrap();
        let encoded = data.to_vec(Mode::Der);
        let decoded = AuthEnvelopedData::decode(
            Bytes::from(encoded.clone()), Mode::Der
        ).unwrap();
        assert_eq!(decoded, data);
        assert_eq!(decoded.to_vec(Mode::Der), encoded);

        let info = ContentInfo::new(Content::AuthEnveloped(data));
        let decoded = ContentInfo::decode(
            Bytes::from(info.encode_to_vec()), Mode::Der
        ).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(decoded.content_type(), oid::ID_CT_AUTH_ENVELOPED_DATA);
    }

    #[test]
    fn decode_checks_auth_attrs() {
        // id-data without attributes turned into id-signedData.
        let data = auth_enveloped(oid::ID_DATA, None).unwrap();
        let mut encoded = data.to_vec(Mode::Der);
        let id_data = oid::ID_DATA.0;
        let pos = encoded.windows(id_data.len()).position(|window| {
            window == id_data
        }).unwrap();
        encoded[pos + id_data.len() - 1] = 2;
        assert!(matches!(
            AuthEnvelopedData::decode(Bytes::from(encoded), Mode::Der),
            Err(Error::InvalidVersion { structure: "AuthEnvelopedData", .. })
        ));
    }

    #[test]
    fn fixed_version() {
        let data = auth_enveloped(oid::ID_DATA, None).unwrap();
        let mut encoded = data.to_vec(Mode::Der);
        assert_eq!(&encoded[2..5], b"\x02\x01\x00");
        encoded[4] = 2;
        assert!(matches!(
            AuthEnvelopedData::decode(Bytes::from(encoded), Mode::Der),
            Err(Error::InvalidVersion { structure: "AuthEnvelopedData", .. })
        ));
    }

    #[test]
    fn schema() {
        AUTH_ENVELOPED_DATA.check().unwrap();
        assert_eq!(AUTH_ENVELOPED_DATA.min(), 4);
        assert_eq!(AUTH_ENVELOPED_DATA.max(), 7);
    }
}
