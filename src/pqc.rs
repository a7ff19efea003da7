//! Private keys of post-quantum algorithms.
//!
//! ML-DSA and ML-KEM private keys are encoded as a CHOICE between the seed
//! the key is generated from, the expanded key, or both:
//!
//! ```text
//! ML-DSA-PrivateKey ::= CHOICE {
//!     seed [0] OCTET STRING (SIZE (32)),
//!     expandedKey OCTET STRING (SIZE (2560 | 4032 | 4896)),
//!     both SEQUENCE {
//!         seed OCTET STRING (SIZE (32)),
//!         expandedKey OCTET STRING (SIZE (2560 | 4032 | 4896)) } }
//!
//! ML-KEM-PrivateKey ::= CHOICE {
//!     seed [0] OCTET STRING (SIZE (64)),
//!     expandedKey OCTET STRING (SIZE (1632 | 2400 | 3168)),
//!     both SEQUENCE {
//!         seed OCTET STRING (SIZE (64)),
//!         expandedKey OCTET STRING (SIZE (1632 | 2400 | 3168)) } }
//! ```
//!
//! The seed is implicitly tagged. The sizes of the expanded keys are those
//! of the three parameter sets of each algorithm.

use crate::decode::{Choice, Decode, Element, Field, Schema, Selector};
use crate::decode::SequenceReader;
use crate::encode::{self, Choice2, Forced, Values};
use crate::error::Error;
use crate::form::{EncodingForm, Tracked};
use crate::ident::Tag;
use crate::string::{OctetString, StringEncoder};


//------------ private_key_choice! -------------------------------------------

const SEED: Field = Field::untagged("seed", Tag::OCTET_STRING);
const EXPANDED_KEY: Field = Field::untagged("expandedKey", Tag::OCTET_STRING);

macro_rules! private_key_choice {
    (
        $(#[$attr:meta])*
        $ty:ident, $name:expr, $both:ident, $both_name:expr,
        seed: $seed_len:expr, expanded: [ $( $expanded_len:expr ),* ]
    ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, Eq, PartialEq)]
        pub enum $ty {
            /// Only the seed.
            Seed(OctetString),

            /// Only the expanded key.
            ExpandedKey(OctetString),

            /// Both the seed and the expanded key.
            Both {
                seed: OctetString,
                expanded_key: OctetString,
                form: EncodingForm,
            },
        }

        pub(crate) static $both: Schema = Schema::new(
            $both_name, &[SEED, EXPANDED_KEY]
        );

        impl $ty {
            /// The length of the seed in octets.
            pub const SEED_LEN: usize = $seed_len;

            /// The allowed lengths of the expanded key in octets.
            pub const EXPANDED_LENS: &'static [usize] = &[
                $( $expanded_len ),*
            ];

            /// Creates a key from only the seed.
            pub fn from_seed(seed: OctetString) -> Result<Self, Error> {
                Self::check_seed(&seed, 0)?;
                Ok($ty::Seed(seed))
            }

            /// Creates a key from only the expanded key.
            pub fn from_expanded_key(
                expanded_key: OctetString
            ) -> Result<Self, Error> {
                Self::check_expanded_key(&expanded_key, 0)?;
                Ok($ty::ExpandedKey(expanded_key))
            }

            /// Creates a key from both the seed and the expanded key.
            pub fn from_both(
                seed: OctetString, expanded_key: OctetString
            ) -> Result<Self, Error> {
                Self::check_seed(&seed, 0)?;
                Self::check_expanded_key(&expanded_key, 0)?;
                let form = seed.form().or(expanded_key.form());
                Ok($ty::Both { seed, expanded_key, form })
            }

            /// Returns the seed if present.
            pub fn seed(&self) -> Option<&OctetString> {
                match self {
                    $ty::Seed(seed) => Some(seed),
                    $ty::ExpandedKey(_) => None,
                    $ty::Both { seed, .. } => Some(seed),
                }
            }

            /// Returns the expanded key if present.
            pub fn expanded_key(&self) -> Option<&OctetString> {
                match self {
                    $ty::Seed(_) => None,
                    $ty::ExpandedKey(key) => Some(key),
                    $ty::Both { expanded_key, .. } => Some(expanded_key),
                }
            }

            fn check_seed(
                seed: &OctetString, pos: usize
            ) -> Result<(), Error> {
                if seed.len() != Self::SEED_LEN {
                    return xerr!(Err(Error::malformed(
                        concat!("invalid seed length in ", $name), pos
                    )))
                }
                Ok(())
            }

            fn check_expanded_key(
                key: &OctetString, pos: usize
            ) -> Result<(), Error> {
                if !Self::EXPANDED_LENS.contains(&key.len()) {
                    return xerr!(Err(Error::malformed(
                        concat!("invalid expanded key length in ", $name),
                        pos
                    )))
                }
                Ok(())
            }

            fn from_both_element(element: &Element) -> Result<Self, Error> {
                let mut reader = SequenceReader::from_element(
                    &$both, element
                )?;
                let seed = reader.take(&SEED, OctetString::from_element)?;
                let expanded_key = reader.take(
                    &EXPANDED_KEY, OctetString::from_element
                )?;
                reader.finish()?;
                Self::check_seed(&seed, element.pos())?;
                Self::check_expanded_key(&expanded_key, element.pos())?;
                Ok($ty::Both {
                    seed, expanded_key, form: EncodingForm::of(element)
                })
            }

            pub fn encode_ref(&self) -> Choice2<
                StringEncoder<OctetString>, Forced<impl Values + '_>
            > {
                match self {
                    $ty::Seed(seed) => {
                        Choice2::One(seed.encode_ref_as(Tag::ctx(0)))
                    }
                    $ty::ExpandedKey(key) => Choice2::One(key.encode_ref()),
                    $ty::Both { seed, expanded_key, form } => {
                        Choice2::Two(encode::sequence((
                            seed.encode_ref(),
                            expanded_key.encode_ref(),
                        )).forced(form.mode()))
                    }
                }
            }
        }

        impl Decode for $ty {
            fn from_element(element: &Element) -> Result<Self, Error> {
                match Selector::of(element) {
                    Selector::Context(0) => {
                        let seed = OctetString::from_element(
                            &element.retag(Tag::OCTET_STRING)?
                        )?;
                        Self::check_seed(&seed, element.pos())?;
                        Ok($ty::Seed(seed))
                    }
                    Selector::Universal(Tag::OCTET_STRING) => {
                        let key = OctetString::from_element(element)?;
                        Self::check_expanded_key(&key, element.pos())?;
                        Ok($ty::ExpandedKey(key))
                    }
                    Selector::Universal(Tag::SEQUENCE) => {
                        Self::from_both_element(element)
                    }
                    _ => Err(Self::unresolved(element))
                }
            }
        }

        impl Choice for $ty {
            const NAME: &'static str = $name;

            fn selector(&self) -> Selector {
                match *self {
                    $ty::Seed(_) => Selector::Context(0),
                    $ty::ExpandedKey(_) => {
                        Selector::Universal(Tag::OCTET_STRING)
                    }
                    $ty::Both { .. } => Selector::Universal(Tag::SEQUENCE),
                }
            }
        }

        impl Tracked for $ty {
            fn form(&self) -> EncodingForm {
                match self {
                    $ty::Seed(seed) => seed.form(),
                    $ty::ExpandedKey(key) => key.form(),
                    $ty::Both { form, .. } => *form,
                }
            }
        }

        values_via_encode_ref!($ty);
    }
}


//------------ MlDsaPrivateKey -----------------------------------------------

private_key_choice!(
    /// An ML-DSA private key.
    MlDsaPrivateKey, "ML-DSA-PrivateKey",
    ML_DSA_BOTH, "ML-DSA-PrivateKey.both",
    seed: 32, expanded: [2560, 4032, 4896]
);


//------------ MlKemPrivateKey -----------------------------------------------

private_key_choice!(
    /// An ML-KEM private key.
    MlKemPrivateKey, "ML-KEM-PrivateKey",
    ML_KEM_BOTH, "ML-KEM-PrivateKey.both",
    seed: 64, expanded: [1632, 2400, 3168]
);


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use crate::mode::Mode;
    use super::*;

    fn octets(len: usize, value: u8) -> OctetString {
        OctetString::new(Bytes::from(vec![value; len]))
    }

    #[test]
    fn ml_dsa_seed() {
        let key = MlDsaPrivateKey::from_seed(octets(32, 7)).unwrap();
        let encoded = key.to_vec(Mode::Der);
        assert_eq!(&encoded[..2], b"\x80\x20");
        let decoded = MlDsaPrivateKey::decode(
            Bytes::from(encoded), Mode::Der
        ).unwrap();
        assert_eq!(decoded, key);
        assert_eq!(decoded.selector(), Selector::Context(0));
        assert!(decoded.expanded_key().is_none());

        assert!(MlDsaPrivateKey::from_seed(octets(64, 7)).is_err());
        let mut wrong = vec![0x80, 0x1f];
        wrong.extend_from_slice(&[0; 31]);
        assert!(MlDsaPrivateKey::decode(
            Bytes::from(wrong), Mode::Der
        ).is_err());
    }

    #[test]
    fn ml_dsa_expanded() {
        for len in MlDsaPrivateKey::EXPANDED_LENS {
            let key = MlDsaPrivateKey::from_expanded_key(
                octets(*len, 1)
            ).unwrap();
            let decoded = MlDsaPrivateKey::decode(
                Bytes::from(key.to_vec(Mode::Der)), Mode::Der
            ).unwrap();
            assert_eq!(decoded.expanded_key().unwrap().len(), *len);
            assert!(decoded.seed().is_none());
        }
        assert!(MlDsaPrivateKey::from_expanded_key(octets(1632, 1)).is_err());
    }

    #[test]
    fn ml_kem_both() {
        let key = MlKemPrivateKey::from_both(
            octets(64, 2), octets(2400, 3)
        ).unwrap();
        let encoded = key.to_vec(Mode::Der);
        assert_eq!(encoded[0], 0x30);
        let decoded = MlKemPrivateKey::decode(
            Bytes::from(encoded.clone()), Mode::Der
        ).unwrap();
        assert_eq!(decoded, key);
        assert_eq!(decoded.seed().unwrap().len(), 64);
        assert_eq!(decoded.to_vec(Mode::Der), encoded);

        // An ML-DSA seed in an ML-KEM key.
        assert!(MlKemPrivateKey::from_both(
            octets(32, 2), octets(2400, 3)
        ).is_err());
    }

    #[test]
    fn segmented_keys() {
        // A seed in the constructed form of [0] IMPLICIT OCTET STRING.
        let mut seed = vec![0xa0, 0x22, 0x04, 0x20];
        seed.extend_from_slice(&[5; 32]);
        assert!(MlDsaPrivateKey::decode(
            Bytes::from(seed.clone()), Mode::Der
        ).is_err());
        let key = MlDsaPrivateKey::decode(
            Bytes::from(seed.clone()), Mode::Ber
        ).unwrap();
        assert_eq!(key.seed().unwrap().as_slice(), &[5; 32][..]);
        assert_eq!(key.form(), EncodingForm::Ber);
        assert_eq!(key.to_vec(Mode::Der), seed);

        // An expanded key in the constructed form of OCTET STRING.
        let mut expanded = vec![0x24, 0x80, 0x04, 0x82, 0x06, 0x60];
        expanded.extend_from_slice(&[6; 1632]);
        expanded.extend_from_slice(&[0, 0]);
        assert!(MlKemPrivateKey::decode(
            Bytes::from(expanded.clone()), Mode::Der
        ).is_err());
        let key = MlKemPrivateKey::decode(
            Bytes::from(expanded.clone()), Mode::Ber
        ).unwrap();
        assert_eq!(key.expanded_key().unwrap().len(), 1632);
        assert_eq!(key.form(), EncodingForm::Ber);
        assert_eq!(key.to_vec(Mode::Der), expanded);

        // Keys built from octets stay in DER.
        let key = MlKemPrivateKey::from_expanded_key(
            octets(1632, 6)
        ).unwrap();
        assert_eq!(key.form(), EncodingForm::Der);
        assert_eq!(key.to_vec(Mode::Ber)[0], 0x04);
    }

    #[test]
    fn unresolved() {
        assert!(matches!(
            MlKemPrivateKey::decode(
                Bytes::from_static(b"\x81\x00"), Mode::Der
            ),
            Err(Error::UnresolvedChoice { choice: "ML-KEM-PrivateKey", .. })
        ));
    }

    #[test]
    fn schemas() {
        ML_DSA_BOTH.check().unwrap();
        ML_KEM_BOTH.check().unwrap();
    }
}
