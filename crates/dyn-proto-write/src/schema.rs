//! Write schemas for enum fields.
//!
//! A schema is built once per field by [`WriteSchemas::create`], then shared (usually behind
//! an [`Arc`](std::sync::Arc)) and reused for every serialization of that field. Schemas
//! hold no per-call state.
//!
//! Every value is revalidated against the field's declared enum before anything is written,
//! regardless of the shape it arrives in. A value that only *looks* like a valid constant
//! (a native enum from a different enumeration, a number from an untyped request) is never
//! written unless the enum directory contains it.
use crate::descriptor::FieldDescriptor;
use crate::directory::EnumDirectory;
use crate::error::{EncodeError, SchemaBuildError};
use crate::property::{DynGetter, EnumGetter, PropertyDescriptor, PropertyKind};
use crate::sink::ByteSink;
use crate::value::{EnumValue, ProtoEnum};

/// Validation and write logic shared by both writer variants.
#[derive(Debug, Clone)]
pub struct EnumFieldWriter {
    field: FieldDescriptor,
    directory: EnumDirectory,
}

impl EnumFieldWriter {
    pub fn new(field: &FieldDescriptor) -> Result<Self, SchemaBuildError> {
        let directory = EnumDirectory::new(field)?;

        Ok(Self {
            field: field.clone(),
            directory,
        })
    }

    pub fn field(&self) -> &FieldDescriptor {
        &self.field
    }

    pub fn directory(&self) -> &EnumDirectory {
        &self.directory
    }

    /// Classifies `value` and writes it. An empty string array writes nothing.
    pub fn write<S>(&self, sink: &mut S, value: EnumValue<'_>) -> Result<(), EncodeError>
    where
        S: ByteSink + ?Sized,
    {
        match value {
            EnumValue::Native(native) => self.write_name(sink, native.proto_name()),
            // numbers may come straight from an http request, so they still need checking.
            EnumValue::Number(number) => self.write_number(sink, number.int_value()),
            EnumValue::Strings(Some(first)) => self.write_name(sink, first),
            EnumValue::Strings(None) => {
                tracing::trace!(
                    message = "empty string array, skipping field",
                    field = self.field.name()
                );
                Ok(())
            }
            EnumValue::Str(name) => self.write_name(sink, name),
            EnumValue::Unsupported(value) => Err(EncodeError::UnsupportedValueType {
                value: value.to_string().into_boxed_str(),
                type_name: self.field.type_name().into(),
                message: self.field.message().into(),
                field: self.field.name().into(),
            }),
        }
    }

    /// Writes the value mapped to `name`.
    pub fn write_name<S>(&self, sink: &mut S, name: &str) -> Result<(), EncodeError>
    where
        S: ByteSink + ?Sized,
    {
        let Some(value) = self.directory.value_by_name(name) else {
            return Err(EncodeError::InvalidEnumName {
                name: name.into(),
                type_name: self.field.type_name().into(),
                message: self.field.message().into(),
                field: self.field.name().into(),
            });
        };

        self.write_validated(sink, value);
        Ok(())
    }

    /// Writes `value` as-is, once it's known to be part of the enum.
    pub fn write_number<S>(&self, sink: &mut S, value: i32) -> Result<(), EncodeError>
    where
        S: ByteSink + ?Sized,
    {
        if !self.directory.contains_value(value) {
            return Err(EncodeError::InvalidEnumValue {
                value,
                type_name: self.field.type_name().into(),
                message: self.field.message().into(),
                field: self.field.name().into(),
            });
        }

        self.write_validated(sink, value);
        Ok(())
    }

    #[inline]
    fn write_validated<S>(&self, sink: &mut S, value: i32)
    where
        S: ByteSink + ?Sized,
    {
        let tag = self.field.tag();
        sink.write_scalar_int32(tag.value(), tag.size(), value);
    }
}

/// Writer for fields whose host-side type is open, so each value's shape is classified at
/// call time.
#[derive(Debug, Clone)]
pub struct DynamicEnumWriter<T> {
    inner: EnumFieldWriter,
    getter: Option<DynGetter<T>>,
}

impl<T> DynamicEnumWriter<T> {
    pub fn new(
        field: &FieldDescriptor,
        getter: Option<DynGetter<T>>,
    ) -> Result<Self, SchemaBuildError> {
        Ok(Self {
            inner: EnumFieldWriter::new(field)?,
            getter,
        })
    }

    pub fn inner(&self) -> &EnumFieldWriter {
        &self.inner
    }

    pub fn write<S>(&self, sink: &mut S, value: EnumValue<'_>) -> Result<(), EncodeError>
    where
        S: ByteSink + ?Sized,
    {
        self.inner.write(sink, value)
    }

    /// Reads the field from `host` with the bound getter. Fails with
    /// [`EncodeError::MissingAccessor`] if this writer was built without one.
    pub fn extract_and_write<S>(&self, sink: &mut S, host: &T) -> Result<(), EncodeError>
    where
        S: ByteSink + ?Sized,
    {
        let Some(getter) = self.getter.as_ref() else {
            return Err(EncodeError::MissingAccessor {
                message: self.inner.field.message().into(),
                field: self.inner.field.name().into(),
            });
        };

        match getter.get(host) {
            Some(value) => self.inner.write(sink, value),
            None => {
                tracing::trace!(message = "field unset", field = self.inner.field.name());
                Ok(())
            }
        }
    }
}

/// Writer for fields whose host-side type is a concrete native enum.
#[derive(Debug, Clone)]
pub struct TypedEnumWriter<T> {
    inner: EnumFieldWriter,
    getter: EnumGetter<T>,
}

impl<T> TypedEnumWriter<T> {
    pub fn new(field: &FieldDescriptor, getter: EnumGetter<T>) -> Result<Self, SchemaBuildError> {
        Ok(Self {
            inner: EnumFieldWriter::new(field)?,
            getter,
        })
    }

    pub fn inner(&self) -> &EnumFieldWriter {
        &self.inner
    }

    pub fn write<S>(&self, sink: &mut S, value: EnumValue<'_>) -> Result<(), EncodeError>
    where
        S: ByteSink + ?Sized,
    {
        self.inner.write(sink, value)
    }

    /// Unset fields are skipped. A set value is still checked by name, since the host enum
    /// may not be the enumeration this field declares.
    pub fn extract_and_write<S>(&self, sink: &mut S, host: &T) -> Result<(), EncodeError>
    where
        S: ByteSink + ?Sized,
    {
        match self.getter.get(host) {
            Some(value) => self.write_native(sink, value),
            None => {
                tracing::trace!(message = "field unset", field = self.inner.field.name());
                Ok(())
            }
        }
    }

    pub fn write_native<S>(&self, sink: &mut S, value: &dyn ProtoEnum) -> Result<(), EncodeError>
    where
        S: ByteSink + ?Sized,
    {
        self.inner.write_name(sink, value.proto_name())
    }
}

/// The write schema for one enum field.
#[derive(Debug, Clone)]
pub enum EnumWriteSchema<T> {
    Dynamic(DynamicEnumWriter<T>),
    Typed(TypedEnumWriter<T>),
}

impl<T> EnumWriteSchema<T> {
    pub fn field(&self) -> &FieldDescriptor {
        self.inner().field()
    }

    pub fn inner(&self) -> &EnumFieldWriter {
        match self {
            Self::Dynamic(dynamic) => dynamic.inner(),
            Self::Typed(typed) => typed.inner(),
        }
    }

    pub fn is_typed(&self) -> bool {
        matches!(self, Self::Typed(_))
    }

    /// Writes a bare value.
    pub fn write<S>(&self, sink: &mut S, value: EnumValue<'_>) -> Result<(), EncodeError>
    where
        S: ByteSink + ?Sized,
    {
        self.inner().write(sink, value)
    }

    /// Reads the field out of `host` and writes it. Absent values write nothing.
    pub fn extract_and_write<S>(&self, sink: &mut S, host: &T) -> Result<(), EncodeError>
    where
        S: ByteSink + ?Sized,
    {
        match self {
            Self::Dynamic(dynamic) => dynamic.extract_and_write(sink, host),
            Self::Typed(typed) => typed.extract_and_write(sink, host),
        }
    }
}

/// Factory for enum field write schemas.
pub struct WriteSchemas;

impl WriteSchemas {
    /// Picks a [`TypedEnumWriter`] when the property is a concrete enum, otherwise a
    /// [`DynamicEnumWriter`].
    pub fn create<T>(
        field: &FieldDescriptor,
        property: PropertyDescriptor<T>,
    ) -> Result<EnumWriteSchema<T>, SchemaBuildError> {
        let property_name = property.name().to_owned();

        let schema = match property.into_kind() {
            PropertyKind::Enum(getter) => {
                EnumWriteSchema::Typed(TypedEnumWriter::new(field, getter)?)
            }
            PropertyKind::Dynamic(getter) => {
                EnumWriteSchema::Dynamic(DynamicEnumWriter::new(field, getter)?)
            }
        };

        tracing::debug!(
            message = "built enum write schema",
            proto_field = field.name(),
            proto_message = field.message(),
            proto_type = field.type_name(),
            property = property_name.as_str(),
            typed = schema.is_typed(),
            enum_len = schema.inner().directory().len(),
        );

        Ok(schema)
    }
}
