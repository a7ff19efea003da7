//! Everything related to the `Values` trait.
//!
//! This is an internal module. The relevant items are re-exported by the
//! parent.

use std::io;
use crate::ident::{Ident, Tag};
use crate::length::Length;
use crate::mode::Mode;
use super::target::{IoTarget, Target, infallible};


//------------ Values --------------------------------------------------------

/// A type that is a value encoder.
///
/// Value encoders know how to encode themselves into a sequence of BER
/// encoded values. While you can impl this trait for your type manually,
/// in practice it is often easier to define a method called `encode_ref`
/// and let it return some dedicated value encoder type constructed from the
/// types provided by this module.
///
/// A type implementing this trait should encode itself into one or more
/// BER values. That is, the type becomes the content or part of the content
/// of a constructed value.
///
/// The mode passed to the methods decides how constructed values are
/// framed: BER uses the indefinite length form, DER the definite form.
pub trait Values {
    /// Returns the length of the encoded values for the given mode.
    fn encoded_len(&self, mode: Mode) -> usize;

    /// Encodes the values in the given mode and writes them to `target`.
    fn write_encoded<T: Target>(
        &self, mode: Mode, target: &mut T
    ) -> Result<(), T::Error>;


    //--- Provided methods

    /// Converts the encoder into one with an explicit tag.
    ///
    /// For an explicit tag, the value is wrapped in a constructed value with
    /// the given tag.
    fn explicit(self, tag: Tag) -> Constructed<Self>
    where Self: Sized {
        Constructed::new(tag, self)
    }

    /// Converts the encoder into one that always uses the given mode.
    fn forced(self, mode: Mode) -> Forced<Self>
    where Self: Sized {
        Forced::new(mode, self)
    }

    /// Encodes the values in the given mode into a new vec.
    fn to_vec(&self, mode: Mode) -> Vec<u8> {
        let mut target = Vec::with_capacity(self.encoded_len(mode));
        infallible(self.write_encoded(mode, &mut target));
        target
    }

    /// Encodes the values in the given mode into a writer.
    fn write_to<W: io::Write>(
        &self, mode: Mode, writer: W
    ) -> Result<(), io::Error> {
        self.write_encoded(mode, &mut IoTarget::new(writer))
    }
}


//--- Blanket impls

impl<V: Values + ?Sized> Values for &'_ V {
    fn encoded_len(&self, mode: Mode) -> usize {
        (*self).encoded_len(mode)
    }

    fn write_encoded<T: Target>(
        &self, mode: Mode, target: &mut T
    ) -> Result<(), T::Error> {
        (*self).write_encoded(mode, target)
    }
}


//--- Impls for Tuples

/// Macro for implementing `Values` for tuples.
///
/// This macro implements `Values` for all tuples up to a certain degree.
/// It needs to be invoked as below. All the `Tx`s are the type parameters
/// of the elements the tuple, the numbers are the tuple element numbers.
/// The number need to be provided backwards ending in 0.
///
/// The `tuple` bit of the macro does the actual impl and invokes itself with
/// one less tuple element. The `write` bit below is to implement
/// `write_encoded` backwards (i.e., starting with the smallest number).
macro_rules! tupl_impl {
    // Termination: empty lists, do nothing.
    ( tuple > ) => { };

    // Impl values for the complete lists, then recurse to the lists without
    // their heads.
    ( tuple $t:ident $( $ttail:ident )* > $i:tt $( $itail:tt )* ) => {
        impl<$t: Values, $( $ttail: Values ),*> Values
                for ($t, $( $ttail ),*) {
            fn encoded_len(&self, mode: Mode) -> usize {
                self.$i.encoded_len(mode)
                $(
                    + self.$itail.encoded_len(mode)
                )*
            }

            fn write_encoded<T: Target>(
                &self, mode: Mode, target: &mut T
            ) -> Result<(), T::Error> {
                tupl_impl!( write self, mode, target, $i $( $itail )* );
                Ok(())
            }
        }

        tupl_impl!(
             tuple $($ttail)* > $($itail)*
        );
    };

    // Termination: empty lists, do nothing.
    ( write $self:expr, $mode:expr, $target:expr, ) => { };

    // Write all elements of tuple $self in mode $mode to $target in order.
    ( write $self:expr, $mode:expr, $target:expr, $i:tt $($itail:tt)*) => {
        tupl_impl!( write $self, $mode, $target, $($itail)* );
        $self.$i.write_encoded($mode, $target)?
    }
}

// The standard library implements things for tuples up to twelve elements,
// so we do the same.
tupl_impl!(
    tuple T11 T10 T9 T8 T7 T6 T5 T4 T3 T2 T1 T0 > 11 10 9 8 7 6 5 4 3 2 1 0
);


//--- Impl for Option

/// Encoding of an optional value.
///
/// This implementation encodes `None` as nothing, i.e., as an OPTIONAL
/// in ASN.1 parlance.
impl<V: Values> Values for Option<V> {
    fn encoded_len(&self, mode: Mode) -> usize {
        match self {
            Some(v) => v.encoded_len(mode),
            None => 0,
        }
    }

    fn write_encoded<T: Target>(
        &self, mode: Mode, target: &mut T
    ) -> Result<(), T::Error> {
        match self {
            Some(v) => v.write_encoded(mode, target),
            None => Ok(())
        }
    }
}


//--- Impl for slice and Vec

impl<V: Values> Values for [V] {
    fn encoded_len(&self, mode: Mode) -> usize {
        self.iter().map(|v| v.encoded_len(mode)).sum()
    }

    fn write_encoded<T: Target>(
        &self, mode: Mode, target: &mut T
    ) -> Result<(), T::Error> {
        self.iter().try_for_each(|v| v.write_encoded(mode, target))
    }
}

impl<V: Values> Values for Vec<V> {
    fn encoded_len(&self, mode: Mode) -> usize {
        self.as_slice().encoded_len(mode)
    }

    fn write_encoded<T: Target>(
        &self, mode: Mode, target: &mut T
    ) -> Result<(), T::Error> {
        self.as_slice().write_encoded(mode, target)
    }
}


//------------ Choice2 -------------------------------------------------------

/// A value encoder for a two-variant enum.
///
/// Instead of implementing `Values` for a CHOICE type manually, its
/// `encode_ref` method can return a value of this type.
pub enum Choice2<L, R> {
    /// The first choice.
    One(L),

    /// The second choice.
    Two(R),
}

impl<L, R> Values for Choice2<L, R>
where L: Values, R: Values {
    fn encoded_len(&self, mode: Mode) -> usize {
        match self {
            Choice2::One(inner) => inner.encoded_len(mode),
            Choice2::Two(inner) => inner.encoded_len(mode),
        }
    }

    fn write_encoded<T: Target>(
        &self, mode: Mode, target: &mut T
    ) -> Result<(), T::Error> {
        match self {
            Choice2::One(inner) => inner.write_encoded(mode, target),
            Choice2::Two(inner) => inner.write_encoded(mode, target),
        }
    }
}


//------------ Choice3 -------------------------------------------------------

/// A value encoder for a three-variant enum.
///
/// See [`Choice2`] for details.
pub enum Choice3<L, C, R> {
    /// The first choice.
    One(L),

    /// The second choice.
    Two(C),

    /// The third choice.
    Three(R),
}

impl<L, C, R> Values for Choice3<L, C, R>
where L: Values, C: Values, R: Values {
    fn encoded_len(&self, mode: Mode) -> usize {
        match self {
            Choice3::One(inner) => inner.encoded_len(mode),
            Choice3::Two(inner) => inner.encoded_len(mode),
            Choice3::Three(inner) => inner.encoded_len(mode),
        }
    }

    fn write_encoded<T: Target>(
        &self, mode: Mode, target: &mut T
    ) -> Result<(), T::Error> {
        match self {
            Choice3::One(inner) => inner.write_encoded(mode, target),
            Choice3::Two(inner) => inner.write_encoded(mode, target),
            Choice3::Three(inner) => inner.write_encoded(mode, target),
        }
    }
}


//------------ Choice4 -------------------------------------------------------

/// A value encoder for a four-variant enum.
///
/// See [`Choice2`] for details.
pub enum Choice4<A, B, C, D> {
    /// The first choice.
    One(A),

    /// The second choice.
    Two(B),

    /// The third choice.
    Three(C),

    /// The fourth choice.
    Four(D),
}

impl<A, B, C, D> Values for Choice4<A, B, C, D>
where A: Values, B: Values, C: Values, D: Values {
    fn encoded_len(&self, mode: Mode) -> usize {
        match self {
            Choice4::One(inner) => inner.encoded_len(mode),
            Choice4::Two(inner) => inner.encoded_len(mode),
            Choice4::Three(inner) => inner.encoded_len(mode),
            Choice4::Four(inner) => inner.encoded_len(mode),
        }
    }

    fn write_encoded<T: Target>(
        &self, mode: Mode, target: &mut T
    ) -> Result<(), T::Error> {
        match self {
            Choice4::One(inner) => inner.write_encoded(mode, target),
            Choice4::Two(inner) => inner.write_encoded(mode, target),
            Choice4::Three(inner) => inner.write_encoded(mode, target),
            Choice4::Four(inner) => inner.write_encoded(mode, target),
        }
    }
}


//------------ Choice5 -------------------------------------------------------

/// A value encoder for a five-variant enum.
///
/// See [`Choice2`] for details.
pub enum Choice5<A, B, C, D, E> {
    /// The first choice.
    One(A),

    /// The second choice.
    Two(B),

    /// The third choice.
    Three(C),

    /// The fourth choice.
    Four(D),

    /// The fifth choice.
    Five(E),
}

impl<A, B, C, D, E> Values for Choice5<A, B, C, D, E>
where A: Values, B: Values, C: Values, D: Values, E: Values {
    fn encoded_len(&self, mode: Mode) -> usize {
        match self {
            Choice5::One(inner) => inner.encoded_len(mode),
            Choice5::Two(inner) => inner.encoded_len(mode),
            Choice5::Three(inner) => inner.encoded_len(mode),
            Choice5::Four(inner) => inner.encoded_len(mode),
            Choice5::Five(inner) => inner.encoded_len(mode),
        }
    }

    fn write_encoded<T: Target>(
        &self, mode: Mode, target: &mut T
    ) -> Result<(), T::Error> {
        match self {
            Choice5::One(inner) => inner.write_encoded(mode, target),
            Choice5::Two(inner) => inner.write_encoded(mode, target),
            Choice5::Three(inner) => inner.write_encoded(mode, target),
            Choice5::Four(inner) => inner.write_encoded(mode, target),
            Choice5::Five(inner) => inner.write_encoded(mode, target),
        }
    }
}


//------------ Constructed ---------------------------------------------------

/// A value encoder for a single constructed value.
///
/// The encoder uses the indefinite length form for BER and the definite
/// length form for DER.
pub struct Constructed<V> {
    /// The tag of the value.
    tag: Tag,

    /// A value encoder for the content of the value.
    inner: V,
}

impl<V> Constructed<V> {
    /// Creates a new constructed value encoder from a tag and content.
    ///
    /// The returned value will encode as a single constructed value with
    /// the given tag and whatever `inner` encodes to as its content.
    pub fn new(tag: Tag, inner: V) -> Self {
        Constructed { tag, inner }
    }
}

impl<V: Values> Values for Constructed<V> {
    fn encoded_len(&self, mode: Mode) -> usize {
        if mode.writes_indefinite() {
            total_indefinite_len(self.tag, self.inner.encoded_len(mode))
        }
        else {
            total_len(self.tag, self.inner.encoded_len(mode))
        }
    }

    fn write_encoded<T: Target>(
        &self, mode: Mode, target: &mut T
    ) -> Result<(), T::Error> {
        if mode.writes_indefinite() {
            write_indefinite_header(target, self.tag)?;
            self.inner.write_encoded(mode, target)?;
            write_end_of_contents(target)
        }
        else {
            write_header(
                target, self.tag, true, self.inner.encoded_len(mode)
            )?;
            self.inner.write_encoded(mode, target)
        }
    }
}


//------------ Forced --------------------------------------------------------

/// A value encoder that ignores the mode it is asked to encode in.
///
/// Everything inside the encoder is encoded in the mode given when creating
/// it. This is used by values that remember the form they were originally
/// encoded in.
pub struct Forced<V> {
    /// The mode to always use.
    mode: Mode,

    /// The wrapped encoder.
    inner: V,
}

impl<V> Forced<V> {
    /// Creates a new encoder forcing `inner` into `mode`.
    pub fn new(mode: Mode, inner: V) -> Self {
        Forced { mode, inner }
    }
}

impl<V: Values> Values for Forced<V> {
    fn encoded_len(&self, _mode: Mode) -> usize {
        self.inner.encoded_len(self.mode)
    }

    fn write_encoded<T: Target>(
        &self, _mode: Mode, target: &mut T
    ) -> Result<(), T::Error> {
        self.inner.write_encoded(self.mode, target)
    }
}


//------------ Nothing -------------------------------------------------------

/// An encoder for nothing.
///
/// Unsurprisingly, this encodes as zero octets of content. It can be useful
/// for writing an encoder for an enum where some of the variants shouldn’t
/// result in content at all.
pub struct Nothing;

impl Values for Nothing {
    fn encoded_len(&self, _mode: Mode) -> usize {
        0
    }

    fn write_encoded<T: Target>(
        &self, _mode: Mode, _target: &mut T
    ) -> Result<(), T::Error> {
        Ok(())
    }
}


//============ Standard Functions ============================================

/// Returns a value encoder for a SEQUENCE containing `inner`.
pub fn sequence<V: Values>(inner: V) -> Constructed<V> {
    Constructed::new(Tag::SEQUENCE, inner)
}

/// Returns a value encoder for a SEQUENCE with the given tag.
///
/// This is identical to `Constructed::new(tag, inner)`. It merely provides a
/// more memorable name.
pub fn sequence_as<V: Values>(tag: Tag, inner: V) -> Constructed<V> {
    Constructed::new(tag, inner)
}

/// Returns a value encoder for a SET containing `inner`.
pub fn set<V: Values>(inner: V) -> Constructed<V> {
    Constructed::new(Tag::SET, inner)
}

/// Returns a value encoder for a SET with the given tag.
pub fn set_as<V: Values>(tag: Tag, inner: V) -> Constructed<V> {
    Constructed::new(tag, inner)
}

/// Returns the length for a structure based on the tag and content length.
///
/// This is necessary because the length octets have a different length
/// depending on the content length.
pub fn total_len(tag: Tag, content_l: usize) -> usize {
    Ident::from_tag(tag, false).encoded_len()
        + Length::Definite(content_l).encoded_len()
        + content_l
}

/// Returns the length of a indefinite-form constructed.
///
/// This includes the end-of-contents octets.
pub fn total_indefinite_len(tag: Tag, content_l: usize) -> usize {
    Ident::from_tag(tag, true).encoded_len()
        + Length::Indefinite.encoded_len()
        + content_l
        + 2 // End-of-contents is two bytes.
}

/// Writes the header for a value.
///
/// The header in the sense of this function is the identifier octets and the
/// length octets.
pub fn write_header<T: Target>(
    target: &mut T,
    tag: Tag,
    constructed: bool,
    content_length: usize,
) -> Result<(), T::Error> {
    let mut buf = Vec::with_capacity(8);
    Ident::from_tag(tag, constructed).write_encoded(&mut buf);
    Length::Definite(content_length).write_encoded(&mut buf);
    target.write_all(&buf)
}

/// Writes the header for an indefinite-length constructed.
pub fn write_indefinite_header<T: Target>(
    target: &mut T,
    tag: Tag,
) -> Result<(), T::Error> {
    let mut buf = Vec::with_capacity(8);
    Ident::from_tag(tag, true).write_encoded(&mut buf);
    Length::Indefinite.write_encoded(&mut buf);
    target.write_all(&buf)
}

/// Writes the end-of-contents octets.
pub fn write_end_of_contents<T: Target>(
    target: &mut T,
) -> Result<(), T::Error> {
    target.write_all(b"\0\0")
}


//============ Tests =========================================================
