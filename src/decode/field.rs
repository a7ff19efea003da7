//! Declarative descriptions of SEQUENCE types.
//!
//! This is a private module. The relevant items are re-exported by the
//! parent.

use crate::error::Error;
use crate::ident::Tag;


//------------ Tagging -------------------------------------------------------

/// How a field of a SEQUENCE is tagged.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Tagging {
    /// The field carries the natural tag of its type.
    Untagged(Tag),

    /// The field is an untagged CHOICE and can have any of several tags.
    ///
    /// Such a field can only be optional if it is the last field since its
    /// presence cannot be determined from the tag alone.
    Any,

    /// The field is tagged with the given context specific tag number.
    Context(u32, Explicitness),
}

impl Tagging {
    /// Returns the tag a field with this tagging has on the wire.
    ///
    /// Returns `None` for untagged CHOICEs.
    pub fn wire_tag(self) -> Option<Tag> {
        match self {
            Tagging::Untagged(tag) => Some(tag),
            Tagging::Any => None,
            Tagging::Context(number, _) => Some(Tag::ctx(number)),
        }
    }
}


//------------ Explicitness --------------------------------------------------

/// Whether a context specific tag is explicit or implicit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Explicitness {
    /// The tag wraps the complete encoding of the value.
    Explicit,

    /// The tag replaces the natural tag given here.
    Implicit(Tag),
}


//------------ Presence ------------------------------------------------------

/// Whether a field has to be present.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Presence {
    /// The field must always be present.
    Mandatory,

    /// The field is OPTIONAL or has a DEFAULT value.
    Optional,
}


//------------ Field ---------------------------------------------------------

/// The description of a single field of a SEQUENCE.
///
/// Fields are declared as constants next to the type they belong to and
/// collected into that type’s [`Schema`] in the order of the ASN.1
/// definition.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Field {
    name: &'static str,
    tagging: Tagging,
    presence: Presence,
}

impl Field {
    /// Creates a mandatory field with the given name and tagging.
    pub const fn new(name: &'static str, tagging: Tagging) -> Self {
        Field { name, tagging, presence: Presence::Mandatory }
    }

    /// Creates a mandatory untagged field of the given type.
    pub const fn untagged(name: &'static str, tag: Tag) -> Self {
        Self::new(name, Tagging::Untagged(tag))
    }

    /// Creates a mandatory field holding an untagged CHOICE.
    pub const fn any(name: &'static str) -> Self {
        Self::new(name, Tagging::Any)
    }

    /// Creates a mandatory field with an explicit context specific tag.
    pub const fn explicit(name: &'static str, number: u32) -> Self {
        Self::new(name, Tagging::Context(number, Explicitness::Explicit))
    }

    /// Creates a mandatory field with an implicit context specific tag.
    ///
    /// The `natural` tag is the tag of the field’s type without tagging.
    pub const fn implicit(
        name: &'static str, number: u32, natural: Tag
    ) -> Self {
        Self::new(
            name, Tagging::Context(number, Explicitness::Implicit(natural))
        )
    }

    /// Returns the same field but optional.
    pub const fn optional(self) -> Self {
        Field {
            name: self.name,
            tagging: self.tagging,
            presence: Presence::Optional
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tagging(&self) -> Tagging {
        self.tagging
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    pub fn is_optional(&self) -> bool {
        self.presence == Presence::Optional
    }
}


//------------ Schema --------------------------------------------------------

/// The ordered list of fields of a SEQUENCE type.
///
/// The schema fixes the order in which fields have to be read and,
/// through the number of mandatory and total fields, the range of the
/// number of elements an encoded value may contain.
#[derive(Debug)]
pub struct Schema {
    name: &'static str,
    fields: &'static [Field],
}

impl Schema {
    /// Creates a new schema for the type `name`.
    pub const fn new(name: &'static str, fields: &'static [Field]) -> Self {
        Schema { name, fields }
    }

    /// Returns the name of the type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the fields in declaration order.
    pub fn fields(&self) -> &'static [Field] {
        self.fields
    }

    /// Returns the minimum number of elements of an encoded value.
    pub const fn min(&self) -> usize {
        let mut res = 0;
        let mut i = 0;
        while i < self.fields.len() {
            if let Presence::Mandatory = self.fields[i].presence {
                res += 1
            }
            i += 1;
        }
        res
    }

    /// Returns the maximum number of elements of an encoded value.
    pub const fn max(&self) -> usize {
        self.fields.len()
    }

    /// Checks that the schema is well-formed.
    ///
    /// Field names must be unique. Untagged CHOICEs must be mandatory
    /// unless they are the last field.
    /// The tag of an optional field must differ from the tags of all
    /// fields that could appear in its place, i.e., all following fields
    /// up to and including the next mandatory one. Otherwise a decoder
    /// could not tell whether the optional field is present.
    pub fn check(&self) -> Result<(), Error> {
        for (idx, field) in self.fields.iter().enumerate() {
            if self.fields[..idx].iter().any(|f| f.name == field.name) {
                return Err(Error::invariant(format!(
                    "{}: duplicate field `{}`", self.name, field.name
                )))
            }
            if !field.is_optional() {
                continue
            }
            let tag = match field.tagging.wire_tag() {
                Some(tag) => tag,
                None if idx + 1 == self.fields.len() => continue,
                None => {
                    return Err(Error::invariant(format!(
                        "{}: optional untagged CHOICE `{}` not last",
                        self.name, field.name
                    )))
                }
            };
            for next in &self.fields[idx + 1..] {
                match next.tagging.wire_tag() {
                    Some(next_tag) if next_tag != tag => { }
                    Some(_) => {
                        return Err(Error::invariant(format!(
                            "{}: `{}` and `{}` have the same tag",
                            self.name, field.name, next.name
                        )))
                    }
                    // An untagged CHOICE could be anything. We trust the
                    // declaration here.
                    None => { }
                }
                if !next.is_optional() {
                    break
                }
            }
        }
        Ok(())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    const A: Field = Field::untagged("a", Tag::INTEGER).optional();
    const B: Field = Field::untagged("b", Tag::SEQUENCE);
    const C: Field = Field::implicit("c", 0, Tag::SET).optional();
    const D: Field = Field::explicit("d", 1).optional();

    static GOOD: Schema = Schema::new("Good", &[A, B, C, D]);
    static CLASH: Schema = Schema::new("Clash", &[
        Field::implicit("x", 0, Tag::SET).optional(),
        Field::explicit("y", 0),
    ]);
    static DUP: Schema = Schema::new("Dup", &[B, B]);
    static OPT_ANY: Schema = Schema::new("OptAny", &[
        Field::any("x").optional(), B
    ]);
    static LAST_ANY: Schema = Schema::new("LastAny", &[
        B, Field::any("x").optional()
    ]);

    #[test]
    fn bounds() {
        assert_eq!(GOOD.min(), 1);
        assert_eq!(GOOD.max(), 4);
    }

    #[test]
    fn check() {
        assert!(GOOD.check().is_ok());
        assert!(CLASH.check().is_err());
        assert!(DUP.check().is_err());
        assert!(OPT_ANY.check().is_err());
        assert!(LAST_ANY.check().is_ok());
    }
}
