//! Algorithm identifiers.

use crate::captured::Captured;
use crate::decode::{Decode, Element, Field, Schema, SequenceReader};
use crate::encode::{self, Forced, PrimitiveContent, Values};
use crate::error::Error;
use crate::form::{EncodingForm, Tracked};
use crate::ident::Tag;
use crate::oid::Oid;


//------------ AlgorithmIdentifier -------------------------------------------

/// An algorithm and its parameters.
///
/// ```text
/// AlgorithmIdentifier ::= SEQUENCE {
///     algorithm   OBJECT IDENTIFIER,
///     parameters  ANY DEFINED BY algorithm OPTIONAL }
/// ```
///
/// The parameters are kept as captured values. Note that an absent
/// parameters field and a NULL are different values.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AlgorithmIdentifier {
    algorithm: Oid,
    parameters: Option<Captured>,
    form: EncodingForm,
}

const ALGORITHM: Field = Field::untagged("algorithm", Tag::OID);
const PARAMETERS: Field = Field::any("parameters").optional();

pub(crate) static ALGORITHM_IDENTIFIER: Schema = Schema::new(
    "AlgorithmIdentifier", &[ALGORITHM, PARAMETERS]
);

impl AlgorithmIdentifier {
    /// Creates an algorithm identifier without parameters.
    pub fn new(algorithm: impl Into<Oid>) -> Self {
        Self::with_parameters(algorithm, None)
    }

    /// Creates an algorithm identifier with optional parameters.
    pub fn with_parameters(
        algorithm: impl Into<Oid>, parameters: Option<Captured>
    ) -> Self {
        AlgorithmIdentifier {
            algorithm: algorithm.into(),
            form: parameters.form(),
            parameters,
        }
    }

    pub fn algorithm(&self) -> &Oid {
        &self.algorithm
    }

    pub fn parameters(&self) -> Option<&Captured> {
        self.parameters.as_ref()
    }

    pub fn encode_ref(&self) -> Forced<impl Values + '_> {
        self.encode_ref_as(Tag::SEQUENCE)
    }

    /// Returns an encoder for an implicitly tagged algorithm identifier.
    pub fn encode_ref_as(&self, tag: Tag) -> Forced<impl Values + '_> {
        encode::sequence_as(tag, (
            self.algorithm.encode(),
            self.parameters.as_ref(),
        )).forced(self.form.mode())
    }
}

impl Decode for AlgorithmIdentifier {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(
            &ALGORITHM_IDENTIFIER, element
        )?;
        let algorithm = reader.take(&ALGORITHM, Oid::from_element)?;
        let parameters = reader.take_opt(&PARAMETERS, |el| {
            Ok(Captured::from_element(el))
        })?;
        reader.finish()?;
        Ok(AlgorithmIdentifier {
            algorithm,
            form: EncodingForm::of(element).or(parameters.form()),
            parameters,
        })
    }
}

impl Tracked for AlgorithmIdentifier {
    fn form(&self) -> EncodingForm {
        self.form
    }
}

values_via_encode_ref!(AlgorithmIdentifier);


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use hex_literal::hex;
    use crate::cms::oid;
    use crate::mode::Mode;
    use super::*;

    #[test]
    fn parameters() {
        let with_null = hex!("300d 0609 2a864886f70d01010b 0500");
        let alg = AlgorithmIdentifier::decode(
            Bytes::copy_from_slice(&with_null), Mode::Der
        ).unwrap();
        assert_eq!(alg.algorithm(), &oid::SHA256_WITH_RSA_ENCRYPTION);
        assert_eq!(alg.parameters().unwrap().tag(), Tag::NULL);
        assert_eq!(alg.to_vec(Mode::Der), with_null);

        let absent = hex!("300b 0609 608648016503040201");
        let alg = AlgorithmIdentifier::decode(
            Bytes::copy_from_slice(&absent), Mode::Der
        ).unwrap();
        assert!(alg.parameters().is_none());
        assert_eq!(alg, AlgorithmIdentifier::new(oid::SHA256));
        assert_eq!(alg.to_vec(Mode::Der), absent);
    }

    #[test]
    fn too_many_elements() {
        let data = hex!("300f 0609 608648016503040201 0500 0500");
        assert!(matches!(
            AlgorithmIdentifier::decode(
                Bytes::copy_from_slice(&data), Mode::Der
            ),
            Err(Error::BadSequenceSize { actual: 3, .. })
        ));
    }

    #[test]
    fn schema() {
        ALGORITHM_IDENTIFIER.check().unwrap();
    }
}
