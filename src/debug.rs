//! Macros for last-resort debugging.
//!
//! Since error reporting of the decoder is limited on purpose, debugging
//! code using it may be difficult. To remedy this somewhat, this module
//! contains a macro `xerr!()` that emits a `trace` level log record
//! through the `log` facade before resolving into whatever the expression
//! it encloses resolves to. Use it whenever you initially produce an
//! error, i.e.:
//!
//! ```rust,ignore
//! if foo {
//!     return xerr!(Err(Error::malformed("foo", pos)))
//! }
//! ```
//!
//! The record carries the source location of the macro invocation, so
//! enabling trace logging for this crate shows where a decode went wrong.

macro_rules! xerr {
    ($test:expr) => {{
        let res = $test;
        if let Err(ref err) = res {
            log::trace!("{} at {}:{}", err, file!(), line!());
        }
        res
    }}
}
