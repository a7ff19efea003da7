//! Recipient information.
//!
//! Enveloped and authenticated data carry the key for the content
//! encrypted or otherwise made available for each recipient. How this is
//! done is described by a [`RecipientInfo`], a CHOICE of five alternatives
//! for the different key management techniques.

use crate::captured::Captured;
use crate::decode::{Choice, Decode, Element, Field, Schema, Selector};
use crate::decode::SequenceReader;
use crate::encode::{
    self, Choice2, Choice3, Choice5, Forced, PrimitiveContent, Values,
};
use crate::error::Error;
use crate::form::{EncodingForm, Tracked};
use crate::ident::Tag;
use crate::oid::Oid;
use crate::string::{BitString, OctetString, StringEncoder};
use crate::time::GeneralizedTime;
use crate::version::{
    self, CmsVersion, KEK_VERSIONS, KEY_AGREE_VERSIONS, KEY_TRANS_VERSIONS,
    PASSWORD_VERSIONS,
};
use super::algorithm::AlgorithmIdentifier;
use super::cert::IssuerAndSerialNumber;


//------------ RecipientInfo -------------------------------------------------

/// Information for a single recipient.
///
/// ```text
/// RecipientInfo ::= CHOICE {
///     ktri KeyTransRecipientInfo,
///     kari [1] KeyAgreeRecipientInfo,
///     kekri [2] KEKRecipientInfo,
///     pwri [3] PasswordRecipientInfo,
///     ori [4] OtherRecipientInfo }
/// ```
///
/// The tags are implicit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RecipientInfo {
    Ktri(KeyTransRecipientInfo),
    Kari(KeyAgreeRecipientInfo),
    Kekri(KekRecipientInfo),
    Pwri(PasswordRecipientInfo),
    Ori(OtherRecipientInfo),
}

impl RecipientInfo {
    /// Returns the version of the recipient info.
    ///
    /// Other recipient infos don’t have a version.
    pub fn version(&self) -> Option<CmsVersion> {
        match self {
            RecipientInfo::Ktri(info) => Some(info.version()),
            RecipientInfo::Kari(info) => Some(info.version()),
            RecipientInfo::Kekri(info) => Some(info.version()),
            RecipientInfo::Pwri(info) => Some(info.version()),
            RecipientInfo::Ori(_) => None,
        }
    }

    /// Checks the version of a key transport recipient info.
    ///
    /// The versions of the other alternatives are fixed and checked when
    /// decoding.
    pub fn check_version(&self) -> Result<(), Error> {
        match self {
            RecipientInfo::Ktri(info) => info.check_version(),
            _ => Ok(())
        }
    }

    pub fn encode_ref(&self) -> Choice5<
        impl Values + '_, impl Values + '_, impl Values + '_,
        impl Values + '_, impl Values + '_,
    > {
        match self {
            RecipientInfo::Ktri(info) => Choice5::One(info.encode_ref()),
            RecipientInfo::Kari(info) => {
                Choice5::Two(info.encode_ref_as(Tag::ctx(1)))
            }
            RecipientInfo::Kekri(info) => {
                Choice5::Three(info.encode_ref_as(Tag::ctx(2)))
            }
            RecipientInfo::Pwri(info) => {
                Choice5::Four(info.encode_ref_as(Tag::ctx(3)))
            }
            RecipientInfo::Ori(info) => {
                Choice5::Five(info.encode_ref_as(Tag::ctx(4)))
            }
        }
    }
}

impl Decode for RecipientInfo {
    fn from_element(element: &Element) -> Result<Self, Error> {
        match Selector::of(element) {
            Selector::Universal(Tag::SEQUENCE) => {
                KeyTransRecipientInfo::from_element(element).map(
                    RecipientInfo::Ktri
                )
            }
            Selector::Context(1) => {
                KeyAgreeRecipientInfo::from_element(
                    &element.retag(Tag::SEQUENCE)?
                ).map(RecipientInfo::Kari)
            }
            Selector::Context(2) => {
                KekRecipientInfo::from_element(
                    &element.retag(Tag::SEQUENCE)?
                ).map(RecipientInfo::Kekri)
            }
            Selector::Context(3) => {
                PasswordRecipientInfo::from_element(
                    &element.retag(Tag::SEQUENCE)?
                ).map(RecipientInfo::Pwri)
            }
            Selector::Context(4) => {
                OtherRecipientInfo::from_element(
                    &element.retag(Tag::SEQUENCE)?
                ).map(RecipientInfo::Ori)
            }
            _ => Err(Self::unresolved(element))
        }
    }
}

impl Choice for RecipientInfo {
    const NAME: &'static str = "RecipientInfo";

    fn selector(&self) -> Selector {
        match *self {
            RecipientInfo::Ktri(_) => Selector::Universal(Tag::SEQUENCE),
            RecipientInfo::Kari(_) => Selector::Context(1),
            RecipientInfo::Kekri(_) => Selector::Context(2),
            RecipientInfo::Pwri(_) => Selector::Context(3),
            RecipientInfo::Ori(_) => Selector::Context(4),
        }
    }
}

impl Tracked for RecipientInfo {
    fn form(&self) -> EncodingForm {
        match self {
            RecipientInfo::Ktri(info) => info.form(),
            RecipientInfo::Kari(info) => info.form(),
            RecipientInfo::Kekri(info) => info.form(),
            RecipientInfo::Pwri(info) => info.form(),
            RecipientInfo::Ori(info) => info.form(),
        }
    }
}

values_via_encode_ref!(RecipientInfo);


//------------ RecipientIdentifier -------------------------------------------

/// Identifies the certificate of a recipient.
///
/// ```text
/// RecipientIdentifier ::= CHOICE {
///     issuerAndSerialNumber IssuerAndSerialNumber,
///     subjectKeyIdentifier [0] SubjectKeyIdentifier }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RecipientIdentifier {
    IssuerAndSerialNumber(IssuerAndSerialNumber),
    SubjectKeyIdentifier(OctetString),
}

impl RecipientIdentifier {
    pub fn encode_ref(
        &self
    ) -> Choice2<impl Values + '_, StringEncoder<OctetString>> {
        match self {
            RecipientIdentifier::IssuerAndSerialNumber(id) => {
                Choice2::One(id.encode_ref())
            }
            RecipientIdentifier::SubjectKeyIdentifier(id) => {
                Choice2::Two(id.encode_ref_as(Tag::ctx(0)))
            }
        }
    }
}

impl Decode for RecipientIdentifier {
    fn from_element(element: &Element) -> Result<Self, Error> {
        match Selector::of(element) {
            Selector::Universal(Tag::SEQUENCE) => {
                IssuerAndSerialNumber::from_element(element).map(
                    RecipientIdentifier::IssuerAndSerialNumber
                )
            }
            Selector::Context(0) => {
                OctetString::from_element(
                    &element.retag(Tag::OCTET_STRING)?
                ).map(RecipientIdentifier::SubjectKeyIdentifier)
            }
            _ => Err(Self::unresolved(element))
        }
    }
}

impl Choice for RecipientIdentifier {
    const NAME: &'static str = "RecipientIdentifier";

    fn selector(&self) -> Selector {
        match *self {
            RecipientIdentifier::IssuerAndSerialNumber(_) => {
                Selector::Universal(Tag::SEQUENCE)
            }
            RecipientIdentifier::SubjectKeyIdentifier(_) => {
                Selector::Context(0)
            }
        }
    }
}

impl Tracked for RecipientIdentifier {
    fn form(&self) -> EncodingForm {
        match self {
            RecipientIdentifier::IssuerAndSerialNumber(id) => id.form(),
            RecipientIdentifier::SubjectKeyIdentifier(id) => id.form(),
        }
    }
}


//------------ KeyTransRecipientInfo -----------------------------------------

/// A recipient using key transport.
///
/// ```text
/// KeyTransRecipientInfo ::= SEQUENCE {
///     version CMSVersion,  -- always set to 0 or 2
///     rid RecipientIdentifier,
///     keyEncryptionAlgorithm KeyEncryptionAlgorithmIdentifier,
///     encryptedKey EncryptedKey }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyTransRecipientInfo {
    version: CmsVersion,
    rid: RecipientIdentifier,
    key_encryption_algorithm: AlgorithmIdentifier,
    encrypted_key: OctetString,
    form: EncodingForm,
}

const VERSION: Field = Field::untagged("version", Tag::INTEGER);
const RID: Field = Field::any("rid");
const KEY_ENCRYPTION_ALGORITHM: Field = Field::untagged(
    "keyEncryptionAlgorithm", Tag::SEQUENCE
);
const ENCRYPTED_KEY: Field = Field::untagged(
    "encryptedKey", Tag::OCTET_STRING
);

pub(crate) static KEY_TRANS_RECIPIENT_INFO: Schema = Schema::new(
    "KeyTransRecipientInfo",
    &[VERSION, RID, KEY_ENCRYPTION_ALGORITHM, ENCRYPTED_KEY]
);

impl KeyTransRecipientInfo {
    /// Creates a new value.
    ///
    /// The version is derived from the recipient identifier.
    pub fn new(
        rid: RecipientIdentifier,
        key_encryption_algorithm: AlgorithmIdentifier,
        encrypted_key: OctetString,
    ) -> Self {
        KeyTransRecipientInfo {
            version: version::key_trans_version(&rid),
            form: rid.form()
                .or(key_encryption_algorithm.form())
                .or(encrypted_key.form()),
            rid, key_encryption_algorithm, encrypted_key,
        }
    }

    pub fn version(&self) -> CmsVersion {
        self.version
    }

    pub fn rid(&self) -> &RecipientIdentifier {
        &self.rid
    }

    pub fn key_encryption_algorithm(&self) -> &AlgorithmIdentifier {
        &self.key_encryption_algorithm
    }

    pub fn encrypted_key(&self) -> &OctetString {
        &self.encrypted_key
    }

    /// Checks that the version matches the recipient identifier.
    pub fn check_version(&self) -> Result<(), Error> {
        self.version.check_expected(
            KEY_TRANS_RECIPIENT_INFO.name(),
            version::key_trans_version(&self.rid)
        )
    }

    pub fn encode_ref(&self) -> Forced<impl Values + '_> {
        encode::sequence((
            self.version.encode(),
            self.rid.encode_ref(),
            &self.key_encryption_algorithm,
            self.encrypted_key.encode_ref(),
        )).forced(self.form.mode())
    }
}

impl Decode for KeyTransRecipientInfo {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &KEY_TRANS_RECIPIENT_INFO, element
        )?;
        let version = reader.take(&VERSION, |el| {
            CmsVersion::from_element(
                el, KEY_TRANS_RECIPIENT_INFO.name(), KEY_TRANS_VERSIONS
            )
        })?;
        let rid = reader.take(&RID, RecipientIdentifier::from_element)?;
        let key_encryption_algorithm = reader.take(
            &KEY_ENCRYPTION_ALGORITHM, AlgorithmIdentifier::from_element
        )?;
        let encrypted_key = reader.take(
            &ENCRYPTED_KEY, OctetString::from_element
        )?;
        reader.finish()?;
        Ok(KeyTransRecipientInfo {
            form: EncodingForm::of(element)
                .or(rid.form())
                .or(key_encryption_algorithm.form()),
            version, rid, key_encryption_algorithm, encrypted_key,
        })
    }
}

impl Tracked for KeyTransRecipientInfo {
    fn form(&self) -> EncodingForm {
        self.form
    }
}


//------------ KeyAgreeRecipientInfo -----------------------------------------

/// Recipients using key agreement.
///
/// ```text
/// KeyAgreeRecipientInfo ::= SEQUENCE {
///     version CMSVersion,  -- always set to 3
///     originator [0] EXPLICIT OriginatorIdentifierOrKey,
///     ukm [1] EXPLICIT UserKeyingMaterial OPTIONAL,
///     keyEncryptionAlgorithm KeyEncryptionAlgorithmIdentifier,
///     recipientEncryptedKeys RecipientEncryptedKeys }
///
/// RecipientEncryptedKeys ::= SEQUENCE OF RecipientEncryptedKey
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyAgreeRecipientInfo {
    version: CmsVersion,
    originator: OriginatorIdentifierOrKey,
    ukm: Option<OctetString>,
    key_encryption_algorithm: AlgorithmIdentifier,
    recipient_encrypted_keys: Vec<RecipientEncryptedKey>,
    form: EncodingForm,
}

const ORIGINATOR: Field = Field::explicit("originator", 0);
const UKM: Field = Field::explicit("ukm", 1).optional();
const RECIPIENT_ENCRYPTED_KEYS: Field = Field::untagged(
    "recipientEncryptedKeys", Tag::SEQUENCE
);

pub(crate) static KEY_AGREE_RECIPIENT_INFO: Schema = Schema::new(
    "KeyAgreeRecipientInfo", &[
        VERSION, ORIGINATOR, UKM, KEY_ENCRYPTION_ALGORITHM,
        RECIPIENT_ENCRYPTED_KEYS,
    ]
);

impl KeyAgreeRecipientInfo {
    pub fn new(
        originator: OriginatorIdentifierOrKey,
        ukm: Option<OctetString>,
        key_encryption_algorithm: AlgorithmIdentifier,
        recipient_encrypted_keys: Vec<RecipientEncryptedKey>,
    ) -> Self {
        KeyAgreeRecipientInfo {
            version: CmsVersion::V3,
            form: originator.form()
                .or(ukm.form())
                .or(key_encryption_algorithm.form())
                .or(recipient_encrypted_keys.form()),
            originator, ukm, key_encryption_algorithm,
            recipient_encrypted_keys,
        }
    }

    pub fn version(&self) -> CmsVersion {
        self.version
    }

    pub fn originator(&self) -> &OriginatorIdentifierOrKey {
        &self.originator
    }

    pub fn ukm(&self) -> Option<&OctetString> {
        self.ukm.as_ref()
    }

    pub fn key_encryption_algorithm(&self) -> &AlgorithmIdentifier {
        &self.key_encryption_algorithm
    }

    pub fn recipient_encrypted_keys(&self) -> &[RecipientEncryptedKey] {
        &self.recipient_encrypted_keys
    }

    pub fn encode_ref_as(&self, tag: Tag) -> Forced<impl Values + '_> {
        encode::sequence_as(tag, (
            self.version.encode(),
            self.originator.encode_ref().explicit(Tag::ctx(0)),
            self.ukm.as_ref().map(|ukm| {
                ukm.encode_ref().explicit(Tag::ctx(1))
            }),
            &self.key_encryption_algorithm,
            encode::sequence(self.recipient_encrypted_keys.as_slice()),
        )).forced(self.form.mode())
    }
}

impl Decode for KeyAgreeRecipientInfo {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &KEY_AGREE_RECIPIENT_INFO, element
        )?;
        let version = reader.take(&VERSION, |el| {
            CmsVersion::from_element(
                el, KEY_AGREE_RECIPIENT_INFO.name(), KEY_AGREE_VERSIONS
            )
        })?;
        let originator = reader.take(
            &ORIGINATOR, OriginatorIdentifierOrKey::from_element
        )?;
        let ukm = reader.take_opt(&UKM, OctetString::from_element)?;
        let key_encryption_algorithm = reader.take(
            &KEY_ENCRYPTION_ALGORITHM, AlgorithmIdentifier::from_element
        )?;
        let recipient_encrypted_keys = reader.take(
            &RECIPIENT_ENCRYPTED_KEYS, |el| {
                el.sequence()?.iter().map(
                    RecipientEncryptedKey::from_element
                ).collect::<Result<Vec<_>, _>>()
            }
        )?;
        reader.finish()?;
        Ok(KeyAgreeRecipientInfo {
            form: EncodingForm::of(element)
                .or(originator.form())
                .or(key_encryption_algorithm.form())
                .or(recipient_encrypted_keys.form()),
            version, originator, ukm, key_encryption_algorithm,
            recipient_encrypted_keys,
        })
    }
}

impl Tracked for KeyAgreeRecipientInfo {
    fn form(&self) -> EncodingForm {
        self.form
    }
}


//------------ OriginatorIdentifierOrKey -------------------------------------

/// The key agreement key of the originator.
///
/// ```text
/// OriginatorIdentifierOrKey ::= CHOICE {
///     issuerAndSerialNumber IssuerAndSerialNumber,
///     subjectKeyIdentifier [0] SubjectKeyIdentifier,
///     originatorKey [1] OriginatorPublicKey }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OriginatorIdentifierOrKey {
    IssuerAndSerialNumber(IssuerAndSerialNumber),
    SubjectKeyIdentifier(OctetString),
    OriginatorKey(OriginatorPublicKey),
}

impl OriginatorIdentifierOrKey {
    pub fn encode_ref(&self) -> Choice3<
        impl Values + '_, StringEncoder<OctetString>, impl Values + '_
    > {
        match self {
            OriginatorIdentifierOrKey::IssuerAndSerialNumber(id) => {
                Choice3::One(id.encode_ref())
            }
            OriginatorIdentifierOrKey::SubjectKeyIdentifier(id) => {
                Choice3::Two(id.encode_ref_as(Tag::ctx(0)))
            }
            OriginatorIdentifierOrKey::OriginatorKey(key) => {
                Choice3::Three(key.encode_ref_as(Tag::ctx(1)))
            }
        }
    }
}

impl Decode for OriginatorIdentifierOrKey {
    fn from_element(element: &Element) -> Result<Self, Error> {
        match Selector::of(element) {
            Selector::Universal(Tag::SEQUENCE) => {
                IssuerAndSerialNumber::from_element(element).map(
                    OriginatorIdentifierOrKey::IssuerAndSerialNumber
                )
            }
            Selector::Context(0) => {
                OctetString::from_element(
                    &element.retag(Tag::OCTET_STRING)?
                ).map(OriginatorIdentifierOrKey::SubjectKeyIdentifier)
            }
            Selector::Context(1) => {
                OriginatorPublicKey::from_element(
                    &element.retag(Tag::SEQUENCE)?
                ).map(OriginatorIdentifierOrKey::OriginatorKey)
            }
            _ => Err(Self::unresolved(element))
        }
    }
}

impl Choice for OriginatorIdentifierOrKey {
    const NAME: &'static str = "OriginatorIdentifierOrKey";

    fn selector(&self) -> Selector {
        match *self {
            OriginatorIdentifierOrKey::IssuerAndSerialNumber(_) => {
                Selector::Universal(Tag::SEQUENCE)
            }
            OriginatorIdentifierOrKey::SubjectKeyIdentifier(_) => {
                Selector::Context(0)
            }
            OriginatorIdentifierOrKey::OriginatorKey(_) => {
                Selector::Context(1)
            }
        }
    }
}

impl Tracked for OriginatorIdentifierOrKey {
    fn form(&self) -> EncodingForm {
        match self {
            OriginatorIdentifierOrKey::IssuerAndSerialNumber(id) => id.form(),
            OriginatorIdentifierOrKey::SubjectKeyIdentifier(id) => {
                id.form()
            }
            OriginatorIdentifierOrKey::OriginatorKey(key) => key.form(),
        }
    }
}


//------------ OriginatorPublicKey -------------------------------------------

/// ```text
/// OriginatorPublicKey ::= SEQUENCE {
///     algorithm AlgorithmIdentifier,
///     publicKey BIT STRING }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OriginatorPublicKey {
    algorithm: AlgorithmIdentifier,
    public_key: BitString,
    form: EncodingForm,
}

const ALGORITHM: Field = Field::untagged("algorithm", Tag::SEQUENCE);
const PUBLIC_KEY: Field = Field::untagged("publicKey", Tag::BIT_STRING);

pub(crate) static ORIGINATOR_PUBLIC_KEY: Schema = Schema::new(
    "OriginatorPublicKey", &[ALGORITHM, PUBLIC_KEY]
);

impl OriginatorPublicKey {
    pub fn new(algorithm: AlgorithmIdentifier, public_key: BitString) -> Self {
        OriginatorPublicKey { form: algorithm.form(), algorithm, public_key }
    }

    pub fn algorithm(&self) -> &AlgorithmIdentifier {
        &self.algorithm
    }

    pub fn public_key(&self) -> &BitString {
        &self.public_key
    }

    pub fn encode_ref_as(&self, tag: Tag) -> Forced<impl Values + '_> {
        encode::sequence_as(tag, (
            &self.algorithm,
            self.public_key.encode_ref(),
        )).forced(self.form.mode())
    }
}

impl Decode for OriginatorPublicKey {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &ORIGINATOR_PUBLIC_KEY, element
        )?;
        let algorithm = reader.take(
            &ALGORITHM, AlgorithmIdentifier::from_element
        )?;
        let public_key = reader.take(&PUBLIC_KEY, BitString::from_element)?;
        reader.finish()?;
        Ok(OriginatorPublicKey {
            form: EncodingForm::of(element).or(algorithm.form()),
            algorithm, public_key,
        })
    }
}

impl Tracked for OriginatorPublicKey {
    fn form(&self) -> EncodingForm {
        self.form
    }
}


//------------ RecipientEncryptedKey -----------------------------------------

/// ```text
/// RecipientEncryptedKey ::= SEQUENCE {
///     rid KeyAgreeRecipientIdentifier,
///     encryptedKey EncryptedKey }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecipientEncryptedKey {
    rid: KeyAgreeRecipientIdentifier,
    encrypted_key: OctetString,
    form: EncodingForm,
}

pub(crate) static RECIPIENT_ENCRYPTED_KEY: Schema = Schema::new(
    "RecipientEncryptedKey", &[RID, ENCRYPTED_KEY]
);

impl RecipientEncryptedKey {
    pub fn new(
        rid: KeyAgreeRecipientIdentifier, encrypted_key: OctetString
    ) -> Self {
        RecipientEncryptedKey {
            form: rid.form().or(encrypted_key.form()),
            rid, encrypted_key
        }
    }

    pub fn rid(&self) -> &KeyAgreeRecipientIdentifier {
        &self.rid
    }

    pub fn encrypted_key(&self) -> &OctetString {
        &self.encrypted_key
    }

    pub fn encode_ref(&self) -> Forced<impl Values + '_> {
        encode::sequence((
            self.rid.encode_ref(),
            self.encrypted_key.encode_ref(),
        )).forced(self.form.mode())
    }
}

impl Decode for RecipientEncryptedKey {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &RECIPIENT_ENCRYPTED_KEY, element
        )?;
        let rid = reader.take(&RID, KeyAgreeRecipientIdentifier::from_element)?;
        let encrypted_key = reader.take(
            &ENCRYPTED_KEY, OctetString::from_element
        )?;
        reader.finish()?;
        Ok(RecipientEncryptedKey {
            form: EncodingForm::of(element).or(rid.form()),
            rid, encrypted_key,
        })
    }
}

impl Tracked for RecipientEncryptedKey {
    fn form(&self) -> EncodingForm {
        self.form
    }
}

values_via_encode_ref!(RecipientEncryptedKey);


//------------ KeyAgreeRecipientIdentifier -----------------------------------

/// ```text
/// KeyAgreeRecipientIdentifier ::= CHOICE {
///     issuerAndSerialNumber IssuerAndSerialNumber,
///     rKeyId [0] IMPLICIT RecipientKeyIdentifier }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyAgreeRecipientIdentifier {
    IssuerAndSerialNumber(IssuerAndSerialNumber),
    RKeyId(RecipientKeyIdentifier),
}

impl KeyAgreeRecipientIdentifier {
    pub fn encode_ref(
        &self
    ) -> Choice2<impl Values + '_, impl Values + '_> {
        match self {
            KeyAgreeRecipientIdentifier::IssuerAndSerialNumber(id) => {
                Choice2::One(id.encode_ref())
            }
            KeyAgreeRecipientIdentifier::RKeyId(id) => {
                Choice2::Two(id.encode_ref_as(Tag::ctx(0)))
            }
        }
    }
}

impl Decode for KeyAgreeRecipientIdentifier {
    fn from_element(element: &Element) -> Result<Self, Error> {
        match Selector::of(element) {
            Selector::Universal(Tag::SEQUENCE) => {
                IssuerAndSerialNumber::from_element(element).map(
                    KeyAgreeRecipientIdentifier::IssuerAndSerialNumber
                )
            }
            Selector::Context(0) => {
                KekIdentifier::from_element(
                    &element.retag(Tag::SEQUENCE)?
                ).map(KeyAgreeRecipientIdentifier::RKeyId)
            }
            _ => Err(Self::unresolved(element))
        }
    }
}

impl Choice for KeyAgreeRecipientIdentifier {
    const NAME: &'static str = "KeyAgreeRecipientIdentifier";

    fn selector(&self) -> Selector {
        match *self {
            KeyAgreeRecipientIdentifier::IssuerAndSerialNumber(_) => {
                Selector::Universal(Tag::SEQUENCE)
            }
            KeyAgreeRecipientIdentifier::RKeyId(_) => Selector::Context(0),
        }
    }
}

impl Tracked for KeyAgreeRecipientIdentifier {
    fn form(&self) -> EncodingForm {
        match self {
            KeyAgreeRecipientIdentifier::IssuerAndSerialNumber(id) => {
                id.form()
            }
            KeyAgreeRecipientIdentifier::RKeyId(id) => id.form(),
        }
    }
}


//------------ KekIdentifier -------------------------------------------------

/// Identifies a key.
///
/// ```text
/// KEKIdentifier ::= SEQUENCE {
///     keyIdentifier OCTET STRING,
///     date GeneralizedTime OPTIONAL,
///     other OtherKeyAttribute OPTIONAL }
///
/// RecipientKeyIdentifier ::= SEQUENCE {
///     subjectKeyIdentifier SubjectKeyIdentifier,
///     date GeneralizedTime OPTIONAL,
///     other OtherKeyAttribute OPTIONAL }
/// ```
///
/// Both types have the same structure and are represented by this type.
/// The other key attribute is captured.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KekIdentifier {
    key_identifier: OctetString,
    date: Option<GeneralizedTime>,
    other: Option<Captured>,
    form: EncodingForm,
}

/// The identifier of the key of a key agreement recipient.
pub type RecipientKeyIdentifier = KekIdentifier;

const KEY_IDENTIFIER: Field = Field::untagged(
    "keyIdentifier", Tag::OCTET_STRING
);
const DATE: Field = Field::untagged("date", Tag::GENERALIZED_TIME).optional();
const OTHER: Field = Field::untagged("other", Tag::SEQUENCE).optional();

pub(crate) static KEK_IDENTIFIER: Schema = Schema::new(
    "KEKIdentifier", &[KEY_IDENTIFIER, DATE, OTHER]
);

impl KekIdentifier {
    pub fn new(
        key_identifier: OctetString,
        date: Option<GeneralizedTime>,
        other: Option<Captured>,
    ) -> Self {
        KekIdentifier {
            form: key_identifier.form().or(other.form()),
            key_identifier, date, other
        }
    }

    pub fn key_identifier(&self) -> &OctetString {
        &self.key_identifier
    }

    pub fn date(&self) -> Option<&GeneralizedTime> {
        self.date.as_ref()
    }

    pub fn other(&self) -> Option<&Captured> {
        self.other.as_ref()
    }

    pub fn encode_ref(&self) -> Forced<impl Values + '_> {
        self.encode_ref_as(Tag::SEQUENCE)
    }

    pub fn encode_ref_as(&self, tag: Tag) -> Forced<impl Values + '_> {
        encode::sequence_as(tag, (
            self.key_identifier.encode_ref(),
            self.date.as_ref().map(GeneralizedTime::encode_ref),
            self.other.as_ref(),
        )).forced(self.form.mode())
    }
}

impl Decode for KekIdentifier {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &KEK_IDENTIFIER, element
        )?;
        let key_identifier = reader.take(
            &KEY_IDENTIFIER, OctetString::from_element
        )?;
        let date = reader.take_opt(&DATE, GeneralizedTime::from_element)?;
        let other = reader.take_opt(&OTHER, |el| {
            Ok(Captured::from_element(el))
        })?;
        reader.finish()?;
        Ok(KekIdentifier {
            form: EncodingForm::of(element).or(other.form()),
            key_identifier, date, other,
        })
    }
}

impl Tracked for KekIdentifier {
    fn form(&self) -> EncodingForm {
        self.form
    }
}


//------------ KekRecipientInfo ----------------------------------------------

/// A recipient using a previously distributed symmetric key.
///
/// ```text
/// KEKRecipientInfo ::= SEQUENCE {
///     version CMSVersion,  -- always set to 4
///     kekid KEKIdentifier,
///     keyEncryptionAlgorithm KeyEncryptionAlgorithmIdentifier,
///     encryptedKey EncryptedKey }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KekRecipientInfo {
    version: CmsVersion,
    kekid: KekIdentifier,
    key_encryption_algorithm: AlgorithmIdentifier,
    encrypted_key: OctetString,
    form: EncodingForm,
}

const KEKID: Field = Field::untagged("kekid", Tag::SEQUENCE);

pub(crate) static KEK_RECIPIENT_INFO: Schema = Schema::new(
    "KEKRecipientInfo",
    &[VERSION, KEKID, KEY_ENCRYPTION_ALGORITHM, ENCRYPTED_KEY]
);

impl KekRecipientInfo {
    pub fn new(
        kekid: KekIdentifier,
        key_encryption_algorithm: AlgorithmIdentifier,
        encrypted_key: OctetString,
    ) -> Self {
        KekRecipientInfo {
            version: CmsVersion::V4,
            form: kekid.form()
                .or(key_encryption_algorithm.form())
                .or(encrypted_key.form()),
            kekid, key_encryption_algorithm, encrypted_key,
        }
    }

    pub fn version(&self) -> CmsVersion {
        self.version
    }

    pub fn kekid(&self) -> &KekIdentifier {
        &self.kekid
    }

    pub fn key_encryption_algorithm(&self) -> &AlgorithmIdentifier {
        &self.key_encryption_algorithm
    }

    pub fn encrypted_key(&self) -> &OctetString {
        &self.encrypted_key
    }

    pub fn encode_ref_as(&self, tag: Tag) -> Forced<impl Values + '_> {
        encode::sequence_as(tag, (
            self.version.encode(),
            self.kekid.encode_ref(),
            &self.key_encryption_algorithm,
            self.encrypted_key.encode_ref(),
        )).forced(self.form.mode())
    }
}

impl Decode for KekRecipientInfo {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &KEK_RECIPIENT_INFO, element
        )?;
        let version = reader.take(&VERSION, |el| {
            CmsVersion::from_element(
                el, KEK_RECIPIENT_INFO.name(), KEK_VERSIONS
            )
        })?;
        let kekid = reader.take(&KEKID, KekIdentifier::from_element)?;
        let key_encryption_algorithm = reader.take(
            &KEY_ENCRYPTION_ALGORITHM, AlgorithmIdentifier::from_element
        )?;
        let encrypted_key = reader.take(
            &ENCRYPTED_KEY, OctetString::from_element
        )?;
        reader.finish()?;
        Ok(KekRecipientInfo {
            form: EncodingForm::of(element)
                .or(kekid.form())
                .or(key_encryption_algorithm.form()),
            version, kekid, key_encryption_algorithm, encrypted_key,
        })
    }
}

impl Tracked for KekRecipientInfo {
    fn form(&self) -> EncodingForm {
        self.form
    }
}


//------------ PasswordRecipientInfo -----------------------------------------

/// A recipient using a password.
///
/// ```text
/// PasswordRecipientInfo ::= SEQUENCE {
///     version CMSVersion,   -- Always set to 0
///     keyDerivationAlgorithm [0] KeyDerivationAlgorithmIdentifier
///                                  OPTIONAL,
///     keyEncryptionAlgorithm KeyEncryptionAlgorithmIdentifier,
///     encryptedKey EncryptedKey }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PasswordRecipientInfo {
    version: CmsVersion,
    key_derivation_algorithm: Option<AlgorithmIdentifier>,
    key_encryption_algorithm: AlgorithmIdentifier,
    encrypted_key: OctetString,
    form: EncodingForm,
}

const KEY_DERIVATION_ALGORITHM: Field = Field::implicit(
    "keyDerivationAlgorithm", 0, Tag::SEQUENCE
).optional();

pub(crate) static PASSWORD_RECIPIENT_INFO: Schema = Schema::new(
    "PasswordRecipientInfo", &[
        VERSION, KEY_DERIVATION_ALGORITHM, KEY_ENCRYPTION_ALGORITHM,
        ENCRYPTED_KEY,
    ]
);

impl PasswordRecipientInfo {
    pub fn new(
        key_derivation_algorithm: Option<AlgorithmIdentifier>,
        key_encryption_algorithm: AlgorithmIdentifier,
        encrypted_key: OctetString,
    ) -> Self {
        PasswordRecipientInfo {
            version: CmsVersion::V0,
            form: key_derivation_algorithm.form()
                .or(key_encryption_algorithm.form())
                .or(encrypted_key.form()),
            key_derivation_algorithm, key_encryption_algorithm,
            encrypted_key,
        }
    }

    pub fn version(&self) -> CmsVersion {
        self.version
    }

    pub fn key_derivation_algorithm(&self) -> Option<&AlgorithmIdentifier> {
        self.key_derivation_algorithm.as_ref()
    }

    pub fn key_encryption_algorithm(&self) -> &AlgorithmIdentifier {
        &self.key_encryption_algorithm
    }

    pub fn encrypted_key(&self) -> &OctetString {
        &self.encrypted_key
    }

    pub fn encode_ref_as(&self, tag: Tag) -> Forced<impl Values + '_> {
        encode::sequence_as(tag, (
            self.version.encode(),
            self.key_derivation_algorithm.as_ref().map(|alg| {
                alg.encode_ref_as(Tag::ctx(0))
            }),
            &self.key_encryption_algorithm,
            self.encrypted_key.encode_ref(),
        )).forced(self.form.mode())
    }
}

impl Decode for PasswordRecipientInfo {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &PASSWORD_RECIPIENT_INFO, element
        )?;
        let version = reader.take(&VERSION, |el| {
            CmsVersion::from_element(
                el, PASSWORD_RECIPIENT_INFO.name(), PASSWORD_VERSIONS
            )
        })?;
        let key_derivation_algorithm = reader.take_opt(
            &KEY_DERIVATION_ALGORITHM, AlgorithmIdentifier::from_element
        )?;
        let key_encryption_algorithm = reader.take(
            &KEY_ENCRYPTION_ALGORITHM, AlgorithmIdentifier::from_element
        )?;
        let encrypted_key = reader.take(
            &ENCRYPTED_KEY, OctetString::from_element
        )?;
        reader.finish()?;
        Ok(PasswordRecipientInfo {
            form: EncodingForm::of(element)
                .or(key_derivation_algorithm.form())
                .or(key_encryption_algorithm.form()),
            version, key_derivation_algorithm, key_encryption_algorithm,
            encrypted_key,
        })
    }
}

impl Tracked for PasswordRecipientInfo {
    fn form(&self) -> EncodingForm {
        self.form
    }
}


//------------ OtherRecipientInfo --------------------------------------------

/// A recipient using some other key management technique.
///
/// ```text
/// OtherRecipientInfo ::= SEQUENCE {
///     oriType OBJECT IDENTIFIER,
///     oriValue ANY DEFINED BY oriType }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OtherRecipientInfo {
    ori_type: Oid,
    ori_value: Captured,
    form: EncodingForm,
}

const ORI_TYPE: Field = Field::untagged("oriType", Tag::OID);
const ORI_VALUE: Field = Field::any("oriValue");

pub(crate) static OTHER_RECIPIENT_INFO: Schema = Schema::new(
    "OtherRecipientInfo", &[ORI_TYPE, ORI_VALUE]
);

impl OtherRecipientInfo {
    pub fn new(ori_type: impl Into<Oid>, ori_value: Captured) -> Self {
        OtherRecipientInfo {
            ori_type: ori_type.into(),
            form: ori_value.form(),
            ori_value,
        }
    }

    pub fn ori_type(&self) -> &Oid {
        &self.ori_type
    }

    pub fn ori_value(&self) -> &Captured {
        &self.ori_value
    }

    pub fn encode_ref_as(&self, tag: Tag) -> Forced<impl Values + '_> {
        encode::sequence_as(tag, (
            self.ori_type.encode(),
            &self.ori_value,
        )).forced(self.form.mode())
    }
}

impl Decode for OtherRecipientInfo {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &OTHER_RECIPIENT_INFO, element
        )?;
        let ori_type = reader.take(&ORI_TYPE, Oid::from_element)?;
        let ori_value = reader.take(&ORI_VALUE, |el| {
            Ok(Captured::from_element(el))
        })?;
        reader.finish()?;
        Ok(OtherRecipientInfo {
            ori_type,
            form: EncodingForm::of(element).or(ori_value.form()),
            ori_value,
        })
    }
}

impl Tracked for OtherRecipientInfo {
    fn form(&self) -> EncodingForm {
        self.form
    }
}


//============ Tests =========================================================

#[cfg(test)]
pub(crate) mod test {
    use bytes::Bytes;
    use hex_literal::hex;
    use crate::cms::oid;
    use crate::cms::signer::test::issuer_and_serial;
    use crate::mode::Mode;
    use super::*;

    pub fn ktri(rid: RecipientIdentifier) -> RecipientInfo {
        RecipientInfo::Ktri(KeyTransRecipientInfo::new(
            rid,
            AlgorithmIdentifier::new(oid::RSA_ENCRYPTION),
            OctetString::from(&b"encrypted key"[..]),
        ))
    }

    pub fn ktri_v0() -> RecipientInfo {
        ktri(RecipientIdentifier::IssuerAndSerialNumber(issuer_and_serial(3)))
    }

    pub fn pwri() -> RecipientInfo {
        RecipientInfo::Pwri(PasswordRecipientInfo::new(
            Some(AlgorithmIdentifier::new(oid::PBKDF2)),
            AlgorithmIdentifier::new(oid::AES128_WRAP),
            OctetString::from(&b"wrapped"[..]),
        ))
    }

    fn kari() -> RecipientInfo {
        RecipientInfo::Kari(KeyAgreeRecipientInfo::new(
            OriginatorIdentifierOrKey::OriginatorKey(OriginatorPublicKey::new(
                AlgorithmIdentifier::new(oid::RSA_ENCRYPTION),
                BitString::new(0, Bytes::from_static(b"key")).unwrap(),
            )),
            Some(OctetString::from(&b"ukm"[..])),
            AlgorithmIdentifier::new(oid::AES128_WRAP),
            vec![
                RecipientEncryptedKey::new(
                    KeyAgreeRecipientIdentifier::IssuerAndSerialNumber(
                        issuer_and_serial(1)
                    ),
                    OctetString::from(&b"one"[..]),
                ),
                RecipientEncryptedKey::new(
                    KeyAgreeRecipientIdentifier::RKeyId(KekIdentifier::new(
                        OctetString::from(&b"id"[..]),
                        Some(GeneralizedTime::new(
                            Bytes::from_static(b"20240101120000Z")
                        ).unwrap()),
                        None,
                    )),
                    OctetString::from(&b"two"[..]),
                ),
            ],
        ))
    }

    fn kekri() -> RecipientInfo {
        RecipientInfo::Kekri(KekRecipientInfo::new(
            KekIdentifier::new(OctetString::from(&b"kek"[..]), None, None),
            AlgorithmIdentifier::new(oid::AES128_WRAP),
            OctetString::from(&b"wrapped"[..]),
        ))
    }

    fn ori() -> RecipientInfo {
        RecipientInfo::Ori(OtherRecipientInfo::new(
            oid::ID_DATA,
            Captured::decode(Bytes::from_static(b"\x05\x00"), Mode::Der)
                .unwrap(),
        ))
    }

    #[test]
    fn round_trip_all_alternatives() {
        let ski = ktri(RecipientIdentifier::SubjectKeyIdentifier(
            OctetString::from(&b"ski"[..])
        ));
        for info in [ktri_v0(), ski, kari(), kekri(), pwri(), ori()] {
            let encoded = info.to_vec(Mode::Der);
            let decoded = RecipientInfo::decode(
                Bytes::from(encoded.clone()), Mode::Der
            ).unwrap();
            assert_eq!(decoded, info);
            assert_eq!(decoded.selector(), info.selector());
            assert_eq!(decoded.to_vec(Mode::Der), encoded);
            decoded.check_version().unwrap();
        }
    }

    #[test]
    fn versions() {
        assert_eq!(ktri_v0().version(), Some(CmsVersion::V0));
        assert_eq!(
            ktri(RecipientIdentifier::SubjectKeyIdentifier(
                OctetString::from(&b"ski"[..])
            )).version(),
            Some(CmsVersion::V2)
        );
        assert_eq!(kari().version(), Some(CmsVersion::V3));
        assert_eq!(kekri().version(), Some(CmsVersion::V4));
        assert_eq!(pwri().version(), Some(CmsVersion::V0));
        assert_eq!(ori().version(), None);
    }

    #[test]
    fn tags() {
        assert_eq!(kari().to_vec(Mode::Der)[0], 0xa1);
        assert_eq!(kekri().to_vec(Mode::Der)[0], 0xa2);
        assert_eq!(pwri().to_vec(Mode::Der)[0], 0xa3);
        assert_eq!(ori().to_vec(Mode::Der)[0], 0xa4);
        assert_eq!(ktri_v0().to_vec(Mode::Der)[0], 0x30);

        let el = Element::decode(
            Bytes::from_static(b"\xa5\x00"), Mode::Der
        ).unwrap();
        assert!(matches!(
            RecipientInfo::from_element(&el),
            Err(Error::UnresolvedChoice { choice: "RecipientInfo", .. })
        ));
    }

    #[test]
    fn segmented_key_identifiers() {
        // [0] IMPLICIT OCTET STRING in the constructed form.
        let data = hex!("a003 0401aa");
        assert!(RecipientIdentifier::decode(
            Bytes::copy_from_slice(&data), Mode::Der
        ).is_err());
        let rid = RecipientIdentifier::decode(
            Bytes::copy_from_slice(&data), Mode::Ber
        ).unwrap();
        assert_eq!(rid.form(), EncodingForm::Ber);
        assert_eq!(rid.encode_ref().to_vec(Mode::Der), data);

        assert!(OriginatorIdentifierOrKey::decode(
            Bytes::copy_from_slice(&data), Mode::Der
        ).is_err());
        let originator = OriginatorIdentifierOrKey::decode(
            Bytes::copy_from_slice(&data), Mode::Ber
        ).unwrap();
        assert_eq!(originator.form(), EncodingForm::Ber);
        assert_eq!(originator.encode_ref().to_vec(Mode::Der), data);

        let data = hex!("
            301a
                020102
                a003 0401aa
                300b 0609 2a864886f70d010101
                0403 6b6579
        ");
        assert!(RecipientInfo::decode(
            Bytes::copy_from_slice(&data), Mode::Der
        ).is_err());
        let info = RecipientInfo::decode(
            Bytes::copy_from_slice(&data), Mode::Ber
        ).unwrap();
        assert_eq!(info.form(), EncodingForm::Ber);
        info.check_version().unwrap();
    }

    #[test]
    fn fixed_versions() {
        // A password recipient info with version 1.
        let data = hex!("
            a31b
                020101
                300b 0609 608648016503040105
                0409 7772617070656400ff
        ");
        assert!(matches!(
            RecipientInfo::decode(Bytes::copy_from_slice(&data), Mode::Der),
            Err(Error::InvalidVersion {
                structure: "PasswordRecipientInfo", ..
            })
        ));
    }

    #[test]
    fn schemas() {
        for schema in [
            &KEY_TRANS_RECIPIENT_INFO, &KEY_AGREE_RECIPIENT_INFO,
            &ORIGINATOR_PUBLIC_KEY, &RECIPIENT_ENCRYPTED_KEY, &KEK_IDENTIFIER,
            &KEK_RECIPIENT_INFO, &PASSWORD_RECIPIENT_INFO,
            &OTHER_RECIPIENT_INFO,
        ] {
            schema.check().unwrap();
        }
    }
}
