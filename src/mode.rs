//! The encoding rules.
//!
//! This is a private module. Its public items are re-exported by the parent.


//------------ Mode ----------------------------------------------------------

/// The encoding rules to apply when decoding or encoding data.
///
/// Only two of the three rule sets defined in X.690 are supported. The
/// Canonical Encoding Rules are not used by any of the formats handled by
/// this crate.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Mode {
    /// Basic Encoding Rules.
    ///
    /// These are the most flexible rules, allowing alternative encodings
    /// for some types as well as indefinite length values. When encoding,
    /// constructed values are written in the indefinite length form and
    /// the members of a SET OF are kept in the order they were given.
    #[default]
    Ber,

    /// Distinguished Encoding Rules.
    ///
    /// These rules always employ definite length values and require the
    /// shortest possible encoding. The members of a SET OF have to appear
    /// in the order of their encodings.
    Der,
}

impl Mode {
    /// Returns whether the mode applies additional restrictions over BER.
    pub fn is_restricted(self) -> bool {
        matches!(self, Mode::Der)
    }

    /// Returns whether the mode allows indefinite length values.
    pub fn allows_indefinite(self) -> bool {
        matches!(self, Mode::Ber)
    }

    /// Returns whether constructed values are encoded in indefinite form.
    pub fn writes_indefinite(self) -> bool {
        matches!(self, Mode::Ber)
    }
}
