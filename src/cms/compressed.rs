//! Compressed data.

use crate::decode::{Decode, Element, Field, Schema, SequenceReader};
use crate::encode::{self, Forced, PrimitiveContent, Values};
use crate::error::Error;
use crate::form::{EncodingForm, Tracked};
use crate::ident::Tag;
use crate::version::{self, CmsVersion, COMPRESSED_DATA_VERSIONS};
use super::algorithm::AlgorithmIdentifier;
use super::content::EncapsulatedContentInfo;


//------------ CompressedData ------------------------------------------------

/// Compressed content.
///
/// ```text
/// CompressedData ::= SEQUENCE {
///     version CMSVersion,
///     compressionAlgorithm CompressionAlgorithmIdentifier,
///     encapContentInfo EncapsulatedContentInfo }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompressedData {
    version: CmsVersion,
    compression_algorithm: AlgorithmIdentifier,
    encap_content_info: EncapsulatedContentInfo,
    form: EncodingForm,
}

const VERSION: Field = Field::untagged("version", Tag::INTEGER);
const COMPRESSION_ALGORITHM: Field = Field::untagged(
    "compressionAlgorithm", Tag::SEQUENCE
);
const ENCAP_CONTENT_INFO: Field = Field::untagged(
    "encapContentInfo", Tag::SEQUENCE
);

pub(crate) static COMPRESSED_DATA: Schema = Schema::new("CompressedData", &[
    VERSION, COMPRESSION_ALGORITHM, ENCAP_CONTENT_INFO,
]);

impl CompressedData {
    pub fn new(
        compression_algorithm: AlgorithmIdentifier,
        encap_content_info: EncapsulatedContentInfo,
    ) -> Self {
        CompressedData {
            version: version::compressed_data_version(),
            form: compression_algorithm.form().or(encap_content_info.form()),
            compression_algorithm, encap_content_info,
        }
    }

    pub fn version(&self) -> CmsVersion {
        self.version
    }

    pub fn compression_algorithm(&self) -> &AlgorithmIdentifier {
        &self.compression_algorithm
    }

    pub fn encap_content_info(&self) -> &EncapsulatedContentInfo {
        &self.encap_content_info
    }

    pub fn check_version(&self) -> Result<(), Error> {
        self.version.check_expected(
            COMPRESSED_DATA.name(), version::compressed_data_version()
        )
    }

    pub fn encode_ref(&self) -> Forced<impl Values + '_> {
        encode::sequence((
            self.version.encode(),
            &self.compression_algorithm,
            &self.encap_content_info,
        )).forced(self.form.mode())
    }
}

impl Decode for CompressedData {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &COMPRESSED_DATA, element
        )?;
        let version = reader.take(&VERSION, |el| {
            CmsVersion::from_element(
                el, COMPRESSED_DATA.name(), COMPRESSED_DATA_VERSIONS
            )
        })?;
        let compression_algorithm = reader.take(
            &COMPRESSION_ALGORITHM, AlgorithmIdentifier::from_element
        )?;
        let encap_content_info = reader.take(
            &ENCAP_CONTENT_INFO, EncapsulatedContentInfo::from_element
        )?;
        reader.finish()?;
        Ok(CompressedData {
            form: EncodingForm::of(element)
                .or(compression_algorithm.form())
                .or(encap_content_info.form()),
            version, compression_algorithm, encap_content_info,
        })
    }
}

impl Tracked for CompressedData {
    fn form(&self) -> EncodingForm {
        self.form
    }
}

values_via_encode_ref!(CompressedData);


//============ Tests =========================================================
