//! Attributes and attribute tables.
//!
//! CMS attaches additional information to signers and recipients in the
//! form of attributes: an object identifier naming the attribute type and a
//! set of values. The same attribute type may appear more than once. An
//! [`AttributeTable`] provides access to a list of attributes by type.

use std::{fmt, slice};
use std::sync::Arc;
use smallvec::SmallVec;
use crate::captured::Captured;
use crate::decode::{Decode, Element, Field, Schema, SequenceReader};
use crate::encode::{self, Forced, PrimitiveContent, Values};
use crate::error::Error;
use crate::form::{EncodingForm, SetOf, Tracked};
use crate::ident::Tag;
use crate::oid::Oid;


//------------ Attribute -----------------------------------------------------

/// A single attribute.
///
/// ```text
/// Attribute ::= SEQUENCE {
///     attrType OBJECT IDENTIFIER,
///     attrValues SET OF AttributeValue }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attribute {
    attr_type: Oid,
    values: SetOf<Captured>,
    form: EncodingForm,
}

const ATTR_TYPE: Field = Field::untagged("attrType", Tag::OID);
const ATTR_VALUES: Field = Field::untagged("attrValues", Tag::SET);

static ATTRIBUTE: Schema = Schema::new("Attribute", &[ATTR_TYPE, ATTR_VALUES]);

impl Attribute {
    /// Creates a new attribute from its type and values.
    pub fn new(
        attr_type: impl Into<Oid>, values: impl IntoIterator<Item = Captured>
    ) -> Self {
        let values = SetOf::new(values);
        Attribute { attr_type: attr_type.into(), form: values.form(), values }
    }

    /// Returns the attribute type.
    pub fn attr_type(&self) -> &Oid {
        &self.attr_type
    }

    /// Returns the attribute values.
    pub fn values(&self) -> &SetOf<Captured> {
        &self.values
    }

    /// Returns the single value of a single valued attribute.
    ///
    /// Returns `None` if there is more than one value.
    pub fn single_value(&self) -> Option<&Captured> {
        match self.values.as_slice() {
            [value] => Some(value),
            _ => None,
        }
    }

    pub fn encode_ref(&self) -> Forced<impl Values + '_> {
        encode::sequence((
            self.attr_type.encode(),
            self.values.encode_ref(),
        )).forced(self.form.mode())
    }
}

impl Decode for Attribute {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let mut reader = SequenceReader::from_element(&ATTRIBUTE, element)?;
        let attr_type = reader.take(&ATTR_TYPE, Oid::from_element)?;
        let values = reader.take(&ATTR_VALUES, |el| {
            SetOf::from_element(el, |el| Ok(Captured::from_element(el)))
        })?;
        reader.finish()?;
        Ok(Attribute {
            attr_type,
            form: EncodingForm::of(element).or(values.form()),
            values,
        })
    }
}

impl Tracked for Attribute {
    fn form(&self) -> EncodingForm {
        self.form
    }
}

values_via_encode_ref!(Attribute);


//------------ AttributeTable ------------------------------------------------

/// An immutable collection of attributes keyed by attribute type.
///
/// A table can hold any number of attributes for each attribute type.
/// Attribute types are kept in the order they were first added, and the
/// attributes of each type are kept in the order they were added.
///
/// Tables are never changed. Adding or removing attributes produces a new
/// table while the original stays as it is. Since the content is shared
/// via an `Arc`, tables are cheap to clone and can be used from multiple
/// threads.
#[derive(Clone, Default)]
pub struct AttributeTable {
    /// The entries, one per attribute type.
    entries: Arc<Vec<Entry>>,

    /// The number of attributes in all entries.
    count: usize,
}

/// The attributes of a single type.
#[derive(Clone, Debug)]
struct Entry {
    attr_type: Oid,
    slot: Slot,
}

/// The storage for the attributes of an entry.
#[derive(Clone, Debug)]
enum Slot {
    /// A type with a single attribute.
    Single(Attribute),

    /// A type with at least two attributes.
    Multiple(SmallVec<[Attribute; 2]>),
}

impl Slot {
    fn as_slice(&self) -> Result<&[Attribute], Error> {
        match self {
            Slot::Single(attr) => Ok(slice::from_ref(attr)),
            Slot::Multiple(attrs) if !attrs.is_empty() => Ok(attrs),
            Slot::Multiple(_) => {
                Err(Error::invariant("empty attribute table entry"))
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            Slot::Single(_) => 1,
            Slot::Multiple(attrs) => attrs.len(),
        }
    }

    fn push(&mut self, attr: Attribute) {
        match self {
            Slot::Single(first) => {
                let mut attrs = SmallVec::new();
                attrs.push(first.clone());
                attrs.push(attr);
                *self = Slot::Multiple(attrs);
            }
            Slot::Multiple(attrs) => attrs.push(attr),
        }
    }
}

impl AttributeTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table from a list of attributes.
    pub fn from_attributes(
        attrs: impl IntoIterator<Item = Attribute>
    ) -> Self {
        Self::new().add(attrs)
    }

    /// Returns the number of attributes in the table.
    ///
    /// This counts attributes, not attribute types.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the first attribute of the given type.
    pub fn get<T: AsRef<[u8]>>(
        &self, attr_type: &Oid<T>
    ) -> Option<&Attribute> {
        self.entry(attr_type).and_then(|entry| {
            entry.slot.as_slice().ok().and_then(|attrs| attrs.first())
        })
    }

    /// Returns all attributes of the given type.
    ///
    /// The attributes are returned in the order they were added. If there
    /// are none, the slice is empty.
    pub fn get_all<T: AsRef<[u8]>>(
        &self, attr_type: &Oid<T>
    ) -> Result<&[Attribute], Error> {
        match self.entry(attr_type) {
            Some(entry) => entry.slot.as_slice(),
            None => Ok(&[]),
        }
    }

    /// Returns whether the table contains attributes of the given type.
    pub fn contains<T: AsRef<[u8]>>(&self, attr_type: &Oid<T>) -> bool {
        self.entry(attr_type).is_some()
    }

    /// Returns a new table with the given attributes added.
    pub fn add(&self, attrs: impl IntoIterator<Item = Attribute>) -> Self {
        let mut entries = Vec::clone(&self.entries);
        let mut count = self.count;
        for attr in attrs {
            count += 1;
            match entries.iter_mut().find(|entry| {
                entry.attr_type == *attr.attr_type()
            }) {
                Some(entry) => entry.slot.push(attr),
                None => {
                    entries.push(Entry {
                        attr_type: attr.attr_type().clone(),
                        slot: Slot::Single(attr),
                    })
                }
            }
        }
        AttributeTable { entries: Arc::new(entries), count }
    }

    /// Returns a new table with all attributes of the given type removed.
    ///
    /// If there are no such attributes, the returned table shares its
    /// content with this table.
    pub fn remove<T: AsRef<[u8]>>(&self, attr_type: &Oid<T>) -> Self {
        let removed = match self.entry(attr_type) {
            Some(entry) => entry.slot.len(),
            None => return self.clone(),
        };
        AttributeTable {
            entries: Arc::new(
                self.entries.iter().filter(|entry| {
                    entry.attr_type != *attr_type
                }).cloned().collect()
            ),
            count: self.count - removed,
        }
    }

    /// Returns whether two tables share their content.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    /// Returns an iterator over all attributes.
    ///
    /// Attribute types appear in the order they were first added, the
    /// attributes of each type in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> + '_ {
        self.entries.iter().flat_map(|entry| {
            entry.slot.as_slice().unwrap_or(&[]).iter()
        })
    }

    /// Returns an iterator over the attribute types.
    pub fn attr_types(&self) -> impl Iterator<Item = &Oid> + '_ {
        self.entries.iter().map(|entry| &entry.attr_type)
    }

    /// Creates a table from a decoded SET OF Attribute.
    pub fn from_set(set: &SetOf<Attribute>) -> Self {
        Self::from_attributes(set.iter().cloned())
    }

    /// Converts the table into a SET OF Attribute.
    ///
    /// If `form` is DER, the attributes are sorted into DER order unless
    /// one of them is BER. Otherwise they are kept in the order of the
    /// table.
    pub fn to_set(&self, form: EncodingForm) -> SetOf<Attribute> {
        match form {
            EncodingForm::Der => SetOf::new(self.iter().cloned()),
            EncodingForm::Ber => SetOf::ber(self.iter().cloned()),
        }
    }

    fn entry<T: AsRef<[u8]>>(&self, attr_type: &Oid<T>) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.attr_type == *attr_type)
    }
}


//--- FromIterator

impl FromIterator<Attribute> for AttributeTable {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        Self::from_attributes(iter)
    }
}


//--- Debug

impl fmt::Debug for AttributeTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use proptest::prelude::*;
    use crate::mode::Mode;
    use crate::oid::ConstOid;
    use super::*;

    const CONTENT_TYPE: ConstOid = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 3]);
    const MESSAGE_DIGEST: ConstOid =
        Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 4]);
    const COUNTER_SIGNATURE: ConstOid =
        Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 6]);

    fn value(n: u8) -> Captured {
        Captured::decode(Bytes::from(vec![0x02, 0x01, n]), Mode::Der).unwrap()
    }

    fn attr(attr_type: ConstOid, n: u8) -> Attribute {
        Attribute::new(attr_type, [value(n)])
    }

    fn assert_send_sync<T: Send + Sync>() { }

    #[test]
    fn send_sync() {
        assert_send_sync::<AttributeTable>();
    }

    #[test]
    fn decode_attribute() {
        let data = b"\x30\x13\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x09\x03\
                     \x31\x06\x02\x01\x01\x02\x01\x02";
        let decoded = Attribute::decode(
            Bytes::from_static(data), Mode::Der
        ).unwrap();
        assert_eq!(decoded.attr_type(), &CONTENT_TYPE);
        assert_eq!(decoded.values().len(), 2);
        assert_eq!(decoded.form(), EncodingForm::Der);
        assert_eq!(decoded.to_vec(Mode::Ber), data.as_slice());
        assert_eq!(
            decoded,
            Attribute::new(CONTENT_TYPE, [value(2), value(1)])
        );
    }

    #[test]
    fn attribute_has_exactly_two_elements() {
        let data = b"\x30\x15\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x09\x03\
                     \x31\x06\x02\x01\x01\x02\x01\x02\x05\x00";
        assert!(matches!(
            Attribute::decode(Bytes::from_static(data), Mode::Der),
            Err(Error::BadSequenceSize {
                structure: "Attribute", min: 2, max: 2, actual: 3
            })
        ));
        let data = b"\x30\x0b\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x09\x03";
        assert!(matches!(
            Attribute::decode(Bytes::from_static(data), Mode::Der),
            Err(Error::BadSequenceSize { actual: 1, .. })
        ));
    }

    #[test]
    fn swapped_fields_fail() {
        let data = b"\x30\x13\x31\x06\x02\x01\x01\x02\x01\x02\
                     \x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x09\x03";
        assert!(matches!(
            Attribute::decode(Bytes::from_static(data), Mode::Der),
            Err(Error::MissingMandatoryField { field: "attrType", .. })
        ));
    }

    #[test]
    fn ber_attribute_round_trip() {
        let data = b"\x30\x80\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x09\x03\
                     \x31\x80\x02\x01\x02\x02\x01\x01\x00\x00\x00\x00";
        let decoded = Attribute::decode(
            Bytes::from_static(data), Mode::Ber
        ).unwrap();
        assert_eq!(decoded.form(), EncodingForm::Ber);
        let encoded = decoded.to_vec(Mode::Der);
        assert_eq!(encoded, data.as_slice());
        assert_eq!(
            Attribute::decode(Bytes::from(encoded), Mode::Ber).unwrap(),
            decoded
        );
    }

    #[test]
    fn table_multimap() {
        let table = AttributeTable::from_attributes([
            attr(CONTENT_TYPE, 1),
            attr(MESSAGE_DIGEST, 2),
            attr(CONTENT_TYPE, 3),
        ]);
        assert_eq!(table.len(), 3);
        let all = table.get_all(&CONTENT_TYPE).unwrap();
        assert_eq!(all, &[attr(CONTENT_TYPE, 1), attr(CONTENT_TYPE, 3)]);
        assert_eq!(table.get(&CONTENT_TYPE), Some(&attr(CONTENT_TYPE, 1)));
        assert!(table.get(&COUNTER_SIGNATURE).is_none());
        assert!(table.get_all(&COUNTER_SIGNATURE).unwrap().is_empty());
        assert_eq!(
            table.iter().cloned().collect::<Vec<_>>(),
            [
                attr(CONTENT_TYPE, 1), attr(CONTENT_TYPE, 3),
                attr(MESSAGE_DIGEST, 2)
            ]
        );

        let removed = table.remove(&CONTENT_TYPE);
        assert_eq!(removed.len(), 1);
        assert!(!removed.contains(&CONTENT_TYPE));
        assert_eq!(table.len(), 3);
        assert_eq!(table.get_all(&CONTENT_TYPE).unwrap().len(), 2);

        let same = removed.remove(&CONTENT_TYPE);
        assert!(same.ptr_eq(&removed));
        assert_eq!(same.len(), 1);
    }

    #[test]
    fn table_add_is_copy_on_write() {
        let table = AttributeTable::from_attributes([attr(CONTENT_TYPE, 1)]);
        let added = table.add([attr(CONTENT_TYPE, 2), attr(MESSAGE_DIGEST, 3)]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get_all(&CONTENT_TYPE).unwrap().len(), 1);
        assert_eq!(added.len(), 3);
        assert_eq!(added.get_all(&CONTENT_TYPE).unwrap().len(), 2);
        assert!(!table.ptr_eq(&added));
    }

    #[test]
    fn table_to_set() {
        let table = AttributeTable::from_attributes([
            attr(MESSAGE_DIGEST, 2), attr(CONTENT_TYPE, 1),
        ]);
        let der = table.to_set(EncodingForm::Der);
        assert_eq!(der.as_slice()[0], attr(CONTENT_TYPE, 1));
        let ber = table.to_set(EncodingForm::Ber);
        assert_eq!(ber.as_slice()[0], attr(MESSAGE_DIGEST, 2));
        assert_eq!(AttributeTable::from_set(&ber).len(), 2);
    }

    #[test]
    fn empty_entry_is_invariant_violation() {
        let table = AttributeTable {
            entries: Arc::new(vec![Entry {
                attr_type: CONTENT_TYPE.into(),
                slot: Slot::Multiple(SmallVec::new()),
            }]),
            count: 0,
        };
        assert!(matches!(
            table.get_all(&CONTENT_TYPE),
            Err(Error::InvariantViolation(_))
        ));
        assert!(table.get(&CONTENT_TYPE).is_none());
    }

    #[derive(Clone, Debug)]
    enum Op {
        Add(Vec<(u8, u8)>),
        Remove(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            prop::collection::vec((0..4u8, any::<u8>()), 0..5)
                .prop_map(Op::Add),
            (0..4u8).prop_map(Op::Remove),
        ]
    }

    fn typed(n: u8) -> Oid {
        Oid(Bytes::from(vec![42, 3, n]))
    }

    proptest! {
        #[test]
        fn count_matches_content(ops in prop::collection::vec(op(), 0..20)) {
            let mut table = AttributeTable::new();
            let mut model: Vec<(u8, u8)> = Vec::new();
            for op in ops {
                let prev = table.clone();
                let prev_len = prev.len();
                match op {
                    Op::Add(attrs) => {
                        table = table.add(attrs.iter().map(|&(t, v)| {
                            Attribute::new(typed(t), [value(v)])
                        }));
                        model.extend(attrs);
                    }
                    Op::Remove(t) => {
                        table = table.remove(&typed(t));
                        model.retain(|&(mt, _)| mt != t);
                    }
                }
                prop_assert_eq!(prev.len(), prev_len);
                prop_assert_eq!(table.len(), model.len());
                prop_assert_eq!(table.iter().count(), model.len());
                let per_type: usize = (0..4u8).map(|t| {
                    table.get_all(&typed(t)).map(|all| all.len()).unwrap_or(0)
                }).sum();
                prop_assert_eq!(per_type, table.len());
                for t in 0..4u8 {
                    let expected: Vec<_> = model.iter().filter(|&&(mt, _)| {
                        mt == t
                    }).map(|&(_, v)| value(v)).collect();
                    let found: Vec<_> = table.get_all(&typed(t)).unwrap()
                        .iter().map(|attr| attr.values().as_slice()[0].clone())
                        .collect();
                    prop_assert_eq!(found, expected);
                }
            }
        }
    }
}
