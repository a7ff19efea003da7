//! CMS version numbers.
//!
//! Most CMS structures start with a version number. Its value isn’t chosen
//! freely but follows from which optional fields and which alternatives of
//! CHOICE fields are used in the rest of the structure. This module
//! provides the [`CmsVersion`] type and the functions that determine the
//! correct version for each structure.
//!
//! The functions don’t have side effects. They can be used when building
//! structures to pick the version and when checking decoded structures.

use crate::cms::cert::{
    CertificateSet, OriginatorInfo, RevocationInfoChoices, has_other_certs,
    has_other_crls, has_v1_attr_certs, has_v2_attr_certs,
};
use crate::cms::oid::ID_DATA;
use crate::cms::recipient::{RecipientIdentifier, RecipientInfo};
use crate::cms::signer::{SignerIdentifier, SignerInfo};
use crate::decode::Element;
use crate::encode::{Primitive, PrimitiveContent, Target};
use crate::error::Error;
use crate::ident::Tag;
use crate::int::Integer;
use crate::oid::Oid;


//------------ CmsVersion ----------------------------------------------------

/// The version of a CMS structure.
///
/// ```text
/// CMSVersion ::= INTEGER  { v0(0), v1(1), v2(2), v3(3), v4(4), v5(5) }
/// ```
///
/// Versions are compared by their exact value.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CmsVersion(u32);

impl CmsVersion {
    pub const V0: Self = CmsVersion(0);
    pub const V1: Self = CmsVersion(1);
    pub const V2: Self = CmsVersion(2);
    pub const V3: Self = CmsVersion(3);
    pub const V4: Self = CmsVersion(4);
    pub const V5: Self = CmsVersion(5);

    /// Creates a version from its integer value.
    pub const fn new(value: u32) -> Self {
        CmsVersion(value)
    }

    /// Returns the integer value of the version.
    pub fn to_u32(self) -> u32 {
        self.0
    }

    /// Decodes the version field of `structure`.
    ///
    /// The version has to be one of the `legal` values for the structure.
    pub fn from_element(
        element: &Element, structure: &'static str, legal: &[CmsVersion]
    ) -> Result<Self, Error> {
        let value = match Integer::from_element(element)?.to_u32() {
            Some(value) => CmsVersion(value),
            None => {
                return xerr!(Err(Error::invalid_version(
                    structure, "version out of range"
                )))
            }
        };
        value.check_legal(structure, legal)
    }

    /// Checks that the version is one of the `legal` values.
    pub fn check_legal(
        self, structure: &'static str, legal: &[CmsVersion]
    ) -> Result<Self, Error> {
        if legal.contains(&self) {
            Ok(self)
        }
        else {
            xerr!(Err(Error::invalid_version(
                structure, format!("illegal version {}", self.0)
            )))
        }
    }

    /// Checks that the version is the one expected.
    pub fn check_expected(
        self, structure: &'static str, expected: CmsVersion
    ) -> Result<(), Error> {
        if self == expected {
            Ok(())
        }
        else {
            Err(Error::invalid_version(
                structure,
                format!("version {} instead of {}", self.0, expected.0)
            ))
        }
    }

    /// Returns a value encoder for the version.
    pub fn encode(self) -> Primitive<Self> {
        PrimitiveContent::encode(self)
    }

    fn content_len(self) -> usize {
        (32 - self.0.leading_zeros() as usize) / 8 + 1
    }
}


//--- From

impl From<CmsVersion> for u32 {
    fn from(version: CmsVersion) -> Self {
        version.0
    }
}


//--- PrimitiveContent

impl PrimitiveContent for CmsVersion {
    const TAG: Tag = Tag::INTEGER;

    fn encoded_len(self) -> usize {
        self.content_len()
    }

    fn write_encoded<T: Target>(
        self, target: &mut T
    ) -> Result<(), T::Error> {
        let octets = self.0.to_be_bytes();
        match self.content_len() {
            5 => {
                target.write_all(&[0])?;
                target.write_all(&octets)
            }
            len => target.write_all(&octets[4 - len..])
        }
    }
}


//------------ Legal Versions ------------------------------------------------

/// The versions a SignedData may have.
pub const SIGNED_DATA_VERSIONS: &[CmsVersion] = &[
    CmsVersion::V1, CmsVersion::V3, CmsVersion::V4, CmsVersion::V5
];

/// The versions an EnvelopedData may have.
pub const ENVELOPED_DATA_VERSIONS: &[CmsVersion] = &[
    CmsVersion::V0, CmsVersion::V2, CmsVersion::V3, CmsVersion::V4
];

/// The versions an AuthenticatedData may have.
pub const AUTHENTICATED_DATA_VERSIONS: &[CmsVersion] = &[
    CmsVersion::V0, CmsVersion::V1, CmsVersion::V3
];

/// The versions an AuthEnvelopedData may have.
pub const AUTH_ENVELOPED_DATA_VERSIONS: &[CmsVersion] = &[CmsVersion::V0];

/// The versions a CompressedData may have.
pub const COMPRESSED_DATA_VERSIONS: &[CmsVersion] = &[CmsVersion::V0];

/// The versions a SignerInfo may have.
pub const SIGNER_INFO_VERSIONS: &[CmsVersion] = &[
    CmsVersion::V1, CmsVersion::V3
];

/// The versions a KeyTransRecipientInfo may have.
pub const KEY_TRANS_VERSIONS: &[CmsVersion] = &[
    CmsVersion::V0, CmsVersion::V2
];

/// The versions a KeyAgreeRecipientInfo may have.
pub const KEY_AGREE_VERSIONS: &[CmsVersion] = &[CmsVersion::V3];

/// The versions a KEKRecipientInfo may have.
pub const KEK_VERSIONS: &[CmsVersion] = &[CmsVersion::V4];

/// The versions a PasswordRecipientInfo may have.
pub const PASSWORD_VERSIONS: &[CmsVersion] = &[CmsVersion::V0];


//------------ Version Inference ---------------------------------------------

/// Returns the version of a SignedData.
///
/// ```text
/// IF ((certificates is present) AND
///    (any certificates with a type of other are present)) OR
///    ((crls is present) AND
///    (any crls with a type of other are present))
/// THEN version MUST be 5
/// ELSE
///    IF (certificates is present) AND
///       (any version 2 attribute certificates are present)
///    THEN version MUST be 4
///    ELSE
///       IF ((certificates is present) AND
///          (any version 1 attribute certificates are present)) OR
///          (any SignerInfo structures are version 3) OR
///          (encapContentInfo eContentType is other than id-data)
///       THEN version MUST be 3
///       ELSE version MUST be 1
/// ```
pub fn signed_data_version(
    certificates: Option<&CertificateSet>,
    crls: Option<&RevocationInfoChoices>,
    econtent_type: &Oid,
    signer_infos: &[SignerInfo],
) -> CmsVersion {
    if has_other_certs(certificates) || has_other_crls(crls) {
        CmsVersion::V5
    }
    else if has_v2_attr_certs(certificates) {
        CmsVersion::V4
    }
    else if has_v1_attr_certs(certificates)
        || signer_infos.iter().any(|info| info.version() == CmsVersion::V3)
        || *econtent_type != ID_DATA
    {
        CmsVersion::V3
    }
    else {
        CmsVersion::V1
    }
}

/// Returns the version of an EnvelopedData.
///
/// ```text
/// IF (originatorInfo is present) AND
///    ((any certificates with a type of other are present) OR
///    (any crls with a type of other are present))
/// THEN version is 4
/// ELSE
///    IF ((originatorInfo is present) AND
///       (any version 2 attribute certificates are present)) OR
///       (any RecipientInfo structures include pwri) OR
///       (any RecipientInfo structures include ori)
///    THEN version is 3
///    ELSE
///       IF (originatorInfo is absent) AND
///          (unprotectedAttrs is absent) AND
///          (all RecipientInfo structures are version 0)
///       THEN version is 0
///       ELSE version is 2
/// ```
pub fn enveloped_data_version(
    originator_info: Option<&OriginatorInfo>,
    recipient_infos: &[RecipientInfo],
    unprotected_attrs: bool,
) -> CmsVersion {
    if originator_info.map_or(false, OriginatorInfo::has_other) {
        CmsVersion::V4
    }
    else if originator_info.map_or(false, OriginatorInfo::has_v2_attr_certs)
        || recipient_infos.iter().any(|info| {
            matches!(info, RecipientInfo::Pwri(_) | RecipientInfo::Ori(_))
        })
    {
        CmsVersion::V3
    }
    else if originator_info.is_none()
        && !unprotected_attrs
        && recipient_infos.iter().all(|info| {
            info.version() == Some(CmsVersion::V0)
        })
    {
        CmsVersion::V0
    }
    else {
        CmsVersion::V2
    }
}

/// Returns the version of an AuthenticatedData.
///
/// ```text
/// IF (originatorInfo is present) AND
///    ((any certificates with a type of other are present) OR
///    (any crls with a type of other are present))
/// THEN version is 3
/// ELSE
///    IF ((originatorInfo is present) AND
///       (any version 2 attribute certificates are present))
///    THEN version is 1
///    ELSE version is 0
/// ```
pub fn authenticated_data_version(
    originator_info: Option<&OriginatorInfo>
) -> CmsVersion {
    if originator_info.map_or(false, OriginatorInfo::has_other) {
        CmsVersion::V3
    }
    else if originator_info.map_or(false, OriginatorInfo::has_v2_attr_certs) {
        CmsVersion::V1
    }
    else {
        CmsVersion::V0
    }
}

/// Returns the version of an AuthEnvelopedData.
///
/// This is always 0. The structure rules are checked by
/// [`check_auth_enveloped_data`] instead.
pub fn auth_enveloped_data_version() -> CmsVersion {
    CmsVersion::V0
}

/// Returns the version of a CompressedData which is always 0.
pub fn compressed_data_version() -> CmsVersion {
    CmsVersion::V0
}

/// Returns the version of a SignerInfo.
///
/// This is 1 if the signer is identified by issuer and serial number and 3
/// if it is identified by subject key identifier.
pub fn signer_info_version(sid: &SignerIdentifier) -> CmsVersion {
    match sid {
        SignerIdentifier::IssuerAndSerialNumber(_) => CmsVersion::V1,
        SignerIdentifier::SubjectKeyIdentifier(_) => CmsVersion::V3,
    }
}

/// Returns the version of a KeyTransRecipientInfo.
///
/// This is 0 if the recipient is identified by issuer and serial number and
/// 2 if it is identified by subject key identifier.
pub fn key_trans_version(rid: &RecipientIdentifier) -> CmsVersion {
    match rid {
        RecipientIdentifier::IssuerAndSerialNumber(_) => CmsVersion::V0,
        RecipientIdentifier::SubjectKeyIdentifier(_) => CmsVersion::V2,
    }
}


//------------ Structure Rules -----------------------------------------------

/// Checks the rules for an AuthenticatedData.
///
/// The digest algorithm and the authenticated attributes must either both
/// be present or both be absent. If the content type is not id-data, they
/// must be present.
pub fn check_authenticated_data(
    content_type: &Oid, digest_algorithm: bool, auth_attrs: bool,
) -> Result<(), Error> {
    if digest_algorithm != auth_attrs {
        return xerr!(Err(Error::invalid_version(
            "AuthenticatedData",
            "digestAlgorithm and authAttrs must be present together"
        )))
    }
    if !auth_attrs && *content_type != ID_DATA {
        return xerr!(Err(Error::invalid_version(
            "AuthenticatedData",
            "authAttrs required for content other than id-data"
        )))
    }
    Ok(())
}

/// Checks the rules for an AuthEnvelopedData.
///
/// There must be at least one recipient. If the content type is not
/// id-data, authenticated attributes must be present.
pub fn check_auth_enveloped_data(
    content_type: &Oid, auth_attrs: bool, recipients: usize,
) -> Result<(), Error> {
    if recipients == 0 {
        return xerr!(Err(Error::invalid_version(
            "AuthEnvelopedData", "recipientInfos must not be empty"
        )))
    }
    if !auth_attrs && *content_type != ID_DATA {
        return xerr!(Err(Error::invalid_version(
            "AuthEnvelopedData",
            "authAttrs required for content other than id-data"
        )))
    }
    Ok(())
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use crate::encode::Values;
    use crate::mode::Mode;
    use super::*;

    #[test]
    fn encode_version() {
        for (version, encoded) in [
            (0u32, &b"\x02\x01\x00"[..]),
            (5, &b"\x02\x01\x05"[..]),
            (128, &b"\x02\x02\x00\x80"[..]),
            (0xFFFF_FFFF, &b"\x02\x05\x00\xff\xff\xff\xff"[..]),
        ] {
            assert_eq!(
                CmsVersion::new(version).encode().to_vec(Mode::Der),
                encoded
            );
        }
    }

    #[test]
    fn decode_version() {
        let decode = |data: &'static [u8]| {
            let el = Element::decode(Bytes::from_static(data), Mode::Der)
                .unwrap();
            CmsVersion::from_element(&el, "Test", SIGNED_DATA_VERSIONS)
        };
        assert_eq!(decode(b"\x02\x01\x03").unwrap(), CmsVersion::V3);
        assert!(matches!(
            decode(b"\x02\x01\x02"),
            Err(Error::InvalidVersion { structure: "Test", .. })
        ));
        assert!(matches!(
            decode(b"\x02\x01\xff"),
            Err(Error::InvalidVersion { .. })
        ));
        assert!(matches!(
            decode(b"\x02\x05\x01\x00\x00\x00\x00"),
            Err(Error::InvalidVersion { .. })
        ));
        assert!(matches!(
            decode(b"\x04\x01\x01"),
            Err(Error::UnexpectedTag { .. })
        ));
    }

    #[test]
    fn expected() {
        assert!(CmsVersion::V1.check_expected("Test", CmsVersion::V1).is_ok());
        assert!(matches!(
            CmsVersion::V1.check_expected("Test", CmsVersion::V3),
            Err(Error::InvalidVersion { .. })
        ));
    }

    #[test]
    fn structure_rules() {
        let data: Oid = ID_DATA.into();
        let other: Oid = crate::cms::oid::ID_SIGNED_DATA.into();
        assert!(check_authenticated_data(&data, false, false).is_ok());
        assert!(check_authenticated_data(&data, true, true).is_ok());
        assert!(check_authenticated_data(&data, true, false).is_err());
        assert!(check_authenticated_data(&other, false, false).is_err());
        assert!(check_auth_enveloped_data(&data, false, 1).is_ok());
        assert!(check_auth_enveloped_data(&data, false, 0).is_err());
        assert!(check_auth_enveloped_data(&other, false, 1).is_err());
        assert!(check_auth_enveloped_data(&other, true, 1).is_ok());
        assert_eq!(auth_enveloped_data_version(), CmsVersion::V0);
        assert_eq!(compressed_data_version(), CmsVersion::V0);
    }
}
