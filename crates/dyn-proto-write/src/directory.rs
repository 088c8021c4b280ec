use bytes::Buf;
use fxhash::{FxHashMap, FxHashSet};

use crate::descriptor::FieldDescriptor;
use crate::encode::{DecodeError, Tag, Varint, WireType};
use crate::error::SchemaBuildError;

/// An enum field read back off the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedEnum<'a> {
    pub field_number: u32,
    pub value: i32,
    /// [`None`] for values the enum doesn't declare.
    pub name: Option<&'a str>,
}

/// Bidirectional lookup between the symbolic names and wire values of a field's enum.
///
/// Built once per field, and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct EnumDirectory {
    name_to_value: FxHashMap<Box<str>, i32>,
    value_to_name: FxHashMap<i32, Box<str>>,
    value_set: FxHashSet<i32>,
}

impl EnumDirectory {
    pub fn new(field: &FieldDescriptor) -> Result<Self, SchemaBuildError> {
        let Some(enum_type) = field.enum_type() else {
            return Err(SchemaBuildError::NotAnEnum {
                message: field.message().into(),
                field: field.name().into(),
                type_name: field.type_name().into(),
            });
        };

        if enum_type.is_empty() {
            return Err(SchemaBuildError::EmptyEnum(enum_type.full_name().into()));
        }

        let len = enum_type.values().len();
        let mut name_to_value: FxHashMap<Box<str>, i32> =
            FxHashMap::with_capacity_and_hasher(len, Default::default());
        let mut value_to_name: FxHashMap<i32, Box<str>> =
            FxHashMap::with_capacity_and_hasher(len, Default::default());
        let mut value_set: FxHashSet<i32> =
            FxHashSet::with_capacity_and_hasher(len, Default::default());

        for (name, value) in enum_type.values() {
            name_to_value.insert(name.into(), value);
            // aliases keep the first declared name.
            value_to_name.entry(value).or_insert_with(|| name.into());
            value_set.insert(value);
        }

        Ok(Self {
            name_to_value,
            value_to_name,
            value_set,
        })
    }

    #[inline]
    pub fn contains_value(&self, value: i32) -> bool {
        self.value_set.contains(&value)
    }

    #[inline]
    pub fn value_by_name(&self, name: &str) -> Option<i32> {
        self.name_to_value.get(name).copied()
    }

    pub fn name_by_value(&self, value: i32) -> Option<&str> {
        self.value_to_name.get(&value).map(AsRef::as_ref)
    }

    pub fn len(&self) -> usize {
        self.name_to_value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_to_value.is_empty()
    }

    /// Reads one tag + varint pair, resolving the value's name.
    pub fn decode_field<B: Buf>(&self, buf: &mut B) -> Result<DecodedEnum<'_>, DecodeError> {
        let key = Varint::decode(buf)?.as_uint();
        let field_number = key >> 3;

        if field_number == 0 || field_number > Tag::MAX_FIELD_NUMBER as u64 {
            return Err(DecodeError::InvalidFieldNumber(field_number));
        }

        match WireType::from_tag(key as u32)? {
            WireType::Varint => (),
            other => return Err(DecodeError::UnexpectedWireType(other)),
        }

        let value = Varint::decode(buf)?.as_int32();

        Ok(DecodedEnum {
            field_number: field_number as u32,
            value,
            name: self.name_by_value(value),
        })
    }
}
