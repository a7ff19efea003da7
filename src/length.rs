//! The length octets.
//!
//! This is a private module. Its public items are re-exported by the parent.

use crate::error::Error;
use crate::mode::Mode;


//------------ Length --------------------------------------------------------

/// The length octets of an encoded value.
///
/// A length value can either be definite, meaning it provides the actual
/// number of content octets in the value, or indefinite, in which case the
/// content is delimited by a special end-of-value marker.
///
/// # BER Encoding
///
/// The length can be encoded in one of two basic ways. Which one is used is
/// determined by the most significant bit of the first octet. If it is not
/// set, the length octets is one octet long and the remaining bits of this
/// first octet provide the definite length. Thus, if the first octet is
/// less than 128, it provides the definite length already.
///
/// If the most significant bit is set, the remaining bits of the first
/// octet specify the number of octets that follow to encode the actual
/// length. If they specify that there are zero more octets, i.e., the
/// value of the first octet is 128, the length is indefinite. Otherwise,
/// those following octets give the big-endian encoding of the definite
/// length of the content octets.
///
/// Under DER rules, a definite length must be encoded in the minimum number
/// of octets and the indefinite form is not allowed at all.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Length {
    /// A length value in definite form.
    ///
    /// Provides the actual length of the content in octets.
    Definite(usize),

    /// A length value in indefinite form.
    ///
    /// In this form, the end of a value is determined by a special tag.
    Indefinite,
}

impl Length {
    /// Takes the length octets from the beginning of `data`.
    ///
    /// Returns the length, the number of octets used, and whether the
    /// octets were the minimal encoding of a definite length. Non-minimal
    /// encodings are only accepted in BER mode.
    pub fn take_from(
        data: &[u8], mode: Mode, pos: usize
    ) -> Result<(Self, usize, bool), Error> {
        let first = match data.first() {
            Some(first) => *first,
            None => {
                return xerr!(Err(Error::malformed(
                    "unexpected end of data", pos
                )))
            }
        };
        match first {
            // Bit 7 clear: single.
            n if (n & 0x80) == 0 => {
                Ok((Length::Definite(n as usize), 1, true))
            }

            // 0x80: indefinite.
            0x80 => {
                if !mode.allows_indefinite() {
                    return xerr!(Err(Error::malformed(
                        "indefinite length in DER", pos
                    )))
                }
                Ok((Length::Indefinite, 1, true))
            }

            // 0xFF: illegal.
            0xFF => {
                xerr!(Err(Error::malformed("illegal length octets", pos)))
            }

            // Anything else: clear left bit, number of octets.
            n => {
                let count = (n & 0x7F) as usize;
                let octets = match data.get(1..count + 1) {
                    Some(octets) => octets,
                    None => {
                        return xerr!(Err(Error::malformed(
                            "unexpected end of data", pos
                        )))
                    }
                };

                // Minimal means no leading zero octet and not something
                // that would have fit into the short form.
                let minimal = octets[0] != 0
                    && !(count == 1 && octets[0] < 0x80);
                if !minimal && mode.is_restricted() {
                    return xerr!(Err(Error::malformed(
                        "illegal length in DER", pos
                    )))
                }

                let mut res = 0usize;
                for &octet in octets {
                    if res > (usize::MAX >> 8) {
                        return xerr!(Err(Error::malformed(
                            "excessive length", pos
                        )))
                    }
                    res = (res << 8) | usize::from(octet);
                }
                Ok((Length::Definite(res), count + 1, minimal))
            }
        }
    }

    /// Returns the length of the encoded representation of the value.
    pub fn encoded_len(self) -> usize {
        match self {
            Length::Indefinite => 1,
            Length::Definite(len) => {
                if len < 0x80 {
                    1
                }
                else {
                    1 + Self::octet_count(len)
                }
            }
        }
    }

    /// Appends the encoded length to the end of `target`.
    pub fn write_encoded(self, target: &mut Vec<u8>) {
        match self {
            Length::Indefinite => target.push(0x80),
            Length::Definite(len) => {
                if len < 0x80 {
                    target.push(len as u8)
                }
                else {
                    let count = Self::octet_count(len);
                    // Never more than eight octets, so this fits.
                    target.push(0x80 | count as u8);
                    let octets = len.to_be_bytes();
                    target.extend_from_slice(
                        &octets[octets.len() - count..]
                    )
                }
            }
        }
    }

    /// Returns the number of octets needed for a long form definite length.
    fn octet_count(len: usize) -> usize {
        let bits = usize::BITS - len.leading_zeros();
        ((bits + 7) / 8) as usize
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn take_from(src: &[u8], mode: Mode) -> Result<Option<usize>, Error> {
        let (len, used, _) = Length::take_from(src, mode, 0)?;
        assert_eq!(used, src.len(), "trailing data");
        Ok(match len {
            Length::Definite(len) => Some(len),
            Length::Indefinite => None
        })
    }

    #[test]
    fn ber_take_from() {
        assert_eq!(take_from(b"\x00", Mode::Ber).unwrap(), Some(0x00));
        assert_eq!(take_from(b"\x12", Mode::Ber).unwrap(), Some(0x12));
        assert_eq!(take_from(b"\x7f", Mode::Ber).unwrap(), Some(0x7f));
        assert_eq!(take_from(b"\x80", Mode::Ber).unwrap(), None);
        assert_eq!(take_from(b"\x81\x00", Mode::Ber).unwrap(), Some(0));
        assert_eq!(take_from(b"\x81\xF0", Mode::Ber).unwrap(), Some(0xF0));
        assert_eq!(take_from(b"\x82\x00\x00", Mode::Ber).unwrap(), Some(0));
        assert_eq!(
            take_from(b"\x82\xF0\x0E", Mode::Ber).unwrap(), Some(0xF00E)
        );
        assert_eq!(
            take_from(b"\x82\x00\x0E", Mode::Ber).unwrap(), Some(0x0E)
        );
        assert!(take_from(b"\xFF", Mode::Ber).is_err());
        assert!(take_from(b"\x82\x01", Mode::Ber).is_err());
    }

    #[test]
    fn der_take_from() {
        assert_eq!(take_from(b"\x00", Mode::Der).unwrap(), Some(0x00));
        assert_eq!(take_from(b"\x7f", Mode::Der).unwrap(), Some(0x7f));
        assert!(take_from(b"\x80", Mode::Der).is_err());
        assert!(take_from(b"\x81\x00", Mode::Der).is_err());
        assert!(take_from(b"\x81\x7f", Mode::Der).is_err());
        assert_eq!(take_from(b"\x81\x80", Mode::Der).unwrap(), Some(0x80));
        assert!(take_from(b"\x82\x00\x00", Mode::Der).is_err());
        assert_eq!(
            take_from(b"\x82\xF0\x0E", Mode::Der).unwrap(), Some(0xF00E)
        );
        assert!(take_from(b"\x82\x00\x0E", Mode::Der).is_err());
    }

    #[test]
    fn non_minimal_flag() {
        let (_, _, minimal) = Length::take_from(b"\x81\x05", Mode::Ber, 0)
            .unwrap();
        assert!(!minimal);
        let (_, _, minimal) = Length::take_from(b"\x81\x85", Mode::Ber, 0)
            .unwrap();
        assert!(minimal);
    }

    #[test]
    fn encode() {
        fn step(l: Length, res: &[u8]) {
            let mut vec = Vec::new();
            l.write_encoded(&mut vec);
            assert_eq!(vec.as_slice(), res, "append failed for {l:?}");
            assert_eq!(l.encoded_len(), res.len());
        }

        step(Length::Indefinite, b"\x80");
        step(Length::Definite(0), b"\x00");
        step(Length::Definite(0x12), b"\x12");
        step(Length::Definite(0x7f), b"\x7f");
        step(Length::Definite(0x80), b"\x81\x80");
        step(Length::Definite(0xdead), b"\x82\xde\xad");
        step(Length::Definite(0x01_0000), b"\x83\x01\x00\x00");
    }
}
