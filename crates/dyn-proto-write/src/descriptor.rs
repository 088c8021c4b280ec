//! Field metadata consumed by the write schemas.
//!
//! A [`FieldDescriptor`] can be built by hand, or resolved out of compiled descriptor
//! protos with a [`DescriptorPool`] (requires the `descriptor` feature).
use std::fmt;
use std::sync::Arc;

use crate::encode::{Tag, WireType};
use crate::error::SchemaBuildError;

/// A declared protobuf enumeration: its fully qualified name, and its constants in
/// declaration order.
#[derive(Clone, PartialEq, Eq)]
pub struct EnumType {
    full_name: Box<str>,
    values: Box<[(Box<str>, i32)]>,
}

impl fmt::Debug for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumType")
            .field("full_name", &self.full_name)
            .field("values", &self.values.len())
            .finish()
    }
}

impl EnumType {
    pub fn new<I, N>(full_name: impl Into<Box<str>>, values: I) -> Self
    where
        I: IntoIterator<Item = (N, i32)>,
        N: Into<Box<str>>,
    {
        Self {
            full_name: full_name.into(),
            values: values
                .into_iter()
                .map(|(name, number)| (name.into(), number))
                .collect(),
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = (&str, i32)> + '_ {
        self.values.iter().map(|(name, number)| (name.as_ref(), *number))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Immutable metadata for a single field of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: Box<str>,
    message: Box<str>,
    type_name: Box<str>,
    tag: Tag,
    enum_type: Option<Arc<EnumType>>,
}

impl FieldDescriptor {
    pub fn new(
        message: impl Into<Box<str>>,
        name: impl Into<Box<str>>,
        number: u32,
        type_name: impl Into<Box<str>>,
        enum_type: Option<Arc<EnumType>>,
    ) -> Result<Self, SchemaBuildError> {
        let message = message.into();
        let name = name.into();

        // enums are always varint encoded.
        let Some(tag) = Tag::new(number, WireType::Varint) else {
            return Err(SchemaBuildError::InvalidFieldNumber {
                message,
                field: name,
                number: number as i64,
            });
        };

        Ok(Self {
            name,
            message,
            type_name: type_name.into(),
            tag,
            enum_type,
        })
    }

    /// Shorthand for a field whose declared type is `enum_type`.
    pub fn for_enum(
        message: impl Into<Box<str>>,
        name: impl Into<Box<str>>,
        number: u32,
        enum_type: Arc<EnumType>,
    ) -> Result<Self, SchemaBuildError> {
        let type_name = enum_type.full_name.clone();
        Self::new(message, name, number, type_name, Some(enum_type))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical name of the message this field belongs to.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The protocol type name the field was declared with.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn number(&self) -> u32 {
        self.tag.field_number()
    }

    pub fn enum_type(&self) -> Option<&Arc<EnumType>> {
        self.enum_type.as_ref()
    }
}

#[cfg(feature = "descriptor")]
pub use pool::DescriptorPool;

#[cfg(feature = "descriptor")]
mod pool {
    use std::sync::Arc;

    use bytes::Buf;
    use fxhash::FxHashMap;
    use prost::Message;
    use prost_types::field_descriptor_proto::Type as FieldProtoType;
    use prost_types::{
        DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
        FileDescriptorSet,
    };

    use super::{EnumType, FieldDescriptor};
    use crate::error::SchemaBuildError;

    /// Index of message and enum types from a set of compiled `.proto` files, keyed by
    /// fully qualified name (without the leading `.`).
    #[derive(Debug, Default, Clone)]
    pub struct DescriptorPool {
        messages: FxHashMap<Box<str>, Box<[FieldDescriptorProto]>>,
        enums: FxHashMap<Box<str>, Arc<EnumType>>,
    }

    fn qualify(scope: &str, name: &str) -> Box<str> {
        if scope.is_empty() {
            name.into()
        } else {
            format!("{scope}.{name}").into_boxed_str()
        }
    }

    fn normalize(name: &str) -> &str {
        name.strip_prefix('.').unwrap_or(name)
    }

    impl DescriptorPool {
        pub fn new() -> Self {
            Self::default()
        }

        /// Decodes a serialized `google.protobuf.FileDescriptorSet`, i.e. the output of
        /// `protoc --descriptor_set_out`.
        pub fn decode<B: Buf>(buf: B) -> crate::Result<Self> {
            let set = FileDescriptorSet::decode(buf)?;
            Ok(Self::from_file_descriptor_set(set))
        }

        pub fn from_file_descriptor_set(set: FileDescriptorSet) -> Self {
            let mut pool = Self::new();
            for file in set.file {
                pool.add_file(file);
            }

            tracing::debug!(
                message = "built descriptor pool",
                messages = pool.messages.len(),
                enums = pool.enums.len(),
            );

            pool
        }

        pub fn add_file(&mut self, file: FileDescriptorProto) {
            let package = file.package().to_owned();

            for enum_proto in file.enum_type {
                self.add_enum(&package, enum_proto);
            }

            for message in file.message_type {
                self.add_message(&package, message);
            }
        }

        fn add_enum(&mut self, scope: &str, enum_proto: EnumDescriptorProto) {
            let full_name = qualify(scope, enum_proto.name());

            let values = enum_proto
                .value
                .iter()
                .map(|value| (value.name(), value.number()));

            let enum_type = EnumType::new(full_name.clone(), values);
            self.enums.insert(full_name, Arc::new(enum_type));
        }

        fn add_message(&mut self, scope: &str, message: DescriptorProto) {
            let full_name = qualify(scope, message.name());

            for enum_proto in message.enum_type {
                self.add_enum(&full_name, enum_proto);
            }

            for nested in message.nested_type {
                self.add_message(&full_name, nested);
            }

            self.messages
                .insert(full_name, message.field.into_boxed_slice());
        }

        pub fn enum_type(&self, name: &str) -> Option<&Arc<EnumType>> {
            self.enums.get(normalize(name))
        }

        pub fn contains_message(&self, name: &str) -> bool {
            self.messages.contains_key(normalize(name))
        }

        /// Resolves the named field of `message` into a [`FieldDescriptor`]. Enum fields
        /// get their [`EnumType`] attached, other fields are returned without one.
        pub fn field(
            &self,
            message: &str,
            field: &str,
        ) -> Result<FieldDescriptor, SchemaBuildError> {
            let message = normalize(message);

            let fields = self
                .messages
                .get(message)
                .ok_or_else(|| SchemaBuildError::UnknownMessage(message.into()))?;

            let proto = fields
                .iter()
                .find(|proto| proto.name() == field)
                .ok_or_else(|| SchemaBuildError::UnknownField {
                    message: message.into(),
                    field: field.into(),
                })?;

            let number = u32::try_from(proto.number()).map_err(|_| {
                SchemaBuildError::InvalidFieldNumber {
                    message: message.into(),
                    field: field.into(),
                    number: proto.number() as i64,
                }
            })?;

            match proto.r#type() {
                FieldProtoType::Enum => {
                    let type_name = normalize(proto.type_name());
                    let enum_type = self.enum_type(type_name).cloned().ok_or_else(|| {
                        SchemaBuildError::UnresolvedEnum {
                            message: message.into(),
                            field: field.into(),
                            type_name: type_name.into(),
                        }
                    })?;

                    FieldDescriptor::new(message, field, number, type_name, Some(enum_type))
                }
                FieldProtoType::Message | FieldProtoType::Group => {
                    let type_name = normalize(proto.type_name());
                    FieldDescriptor::new(message, field, number, type_name, None)
                }
                scalar => {
                    FieldDescriptor::new(message, field, number, scalar.as_str_name(), None)
                }
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_descriptor_for_enum() {
        let color = Arc::new(EnumType::new("shop.Color", [("RED", 0), ("GREEN", 1)]));
        let field = FieldDescriptor::for_enum("shop.Car", "color", 16, color).unwrap();

        assert_eq!(field.type_name(), "shop.Color");
        assert_eq!(field.tag().value(), 16 << 3);
        assert_eq!(field.tag().size(), 2);
    }

    #[test]
    fn test_invalid_field_number() {
        let err = FieldDescriptor::new("shop.Car", "color", 0, "shop.Color", None).unwrap_err();

        assert_eq!(
            err,
            SchemaBuildError::InvalidFieldNumber {
                message: "shop.Car".into(),
                field: "color".into(),
                number: 0,
            }
        );
    }
}
