//! Encoding data in BER and DER.
//!
//! Encoding is done using helper types called _encoders_ that represent the
//! structure of the encoding. These types implement the trait [`Values`].
//! A type that can be encoded typically provides a method named
//! `encode_ref` that produces a value of its encoder type representing the
//! value’s encoding. If necessary, they can also provide a method
//! `encode_ref_as` that does the same thing but allows the caller to
//! provide a tag to use for encoding as is necessary for implicit tagging.
//!
//! Encoders are written into anything implementing [`Target`] for a given
//! [`Mode`]. The mode only affects constructed values: under BER, they are
//! written in indefinite length form, under DER in definite length form.
//! Parts of a value that need to keep the form they were decoded in wrap
//! their encoder in [`Forced`].
//!
//! The trait [`PrimitiveContent`] helps with producing encoders for types
//! that use the primitive encoding. Through this trait the types can declare
//! how their content is encoded and receive an automatic encoder type based
//! on that.
//!
//! [`Mode`]: crate::Mode

pub use self::primitive::{PrimitiveContent, Primitive};
pub use self::target::{IoTarget, Target, infallible};
pub use self::values::{
    Values,
    Choice2, Choice3, Choice4, Choice5, Constructed, Forced, Nothing,
    sequence, sequence_as, set, set_as, total_indefinite_len, total_len,
    write_end_of_contents, write_header, write_indefinite_header,
};

mod primitive;
mod target;
mod values;


//------------ values_via_encode_ref -----------------------------------------

/// Implements `Values` for types that have an `encode_ref` method.
///
/// The method must return something implementing `Values`. This allows
/// using values of the types directly in tuples, options, and vecs of other
/// encoders.
macro_rules! values_via_encode_ref {
    ( $( $ty:ty ),* $(,)? ) => {
        $(
            impl $crate::encode::Values for $ty {
                fn encoded_len(&self, mode: $crate::Mode) -> usize {
                    $crate::encode::Values::encoded_len(
                        &self.encode_ref(), mode
                    )
                }

                fn write_encoded<T: $crate::encode::Target>(
                    &self, mode: $crate::Mode, target: &mut T
                ) -> Result<(), T::Error> {
                    $crate::encode::Values::write_encoded(
                        &self.encode_ref(), mode, target
                    )
                }
            }
        )*
    }
}
