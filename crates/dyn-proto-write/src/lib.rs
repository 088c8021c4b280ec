//! Runtime write schemas for protobuf enum fields.
//!
//! Serializes enum field values without generated message types. A write schema is built
//! once per field from its [`FieldDescriptor`], then reused for every value written to that
//! field, whether the value arrives as a native enum, a boxed number, a symbolic name, or a
//! string array bound from an untyped transport.
//!
//! ```
//! use std::sync::Arc;
//!
//! use dyn_proto_write::{EnumType, EnumValue, FieldDescriptor, PropertyDescriptor, WriteSchemas};
//!
//! let color = EnumType::new("shop.Color", [("RED", 0), ("GREEN", 1), ("BLUE", 2)]);
//! let field = FieldDescriptor::for_enum("shop.Car", "color", 1, Arc::new(color))?;
//!
//! let schema = WriteSchemas::create::<()>(&field, PropertyDescriptor::unbound("color"))?;
//!
//! let mut buf: Vec<u8> = Vec::new();
//! schema.write(&mut buf, EnumValue::Str("GREEN"))?;
//! schema.write(&mut buf, EnumValue::from(2_i32))?;
//! assert_eq!(buf, [0x08, 0x01, 0x08, 0x02]);
//!
//! assert!(schema.write(&mut buf, EnumValue::Str("YELLOW")).is_err());
//! # Ok::<(), dyn_proto_write::Error>(())
//! ```
mod descriptor;
mod directory;
pub mod encode;
mod error;
mod property;
mod schema;
mod sink;
mod value;

pub type Result<T> = core::result::Result<T, Error>;

#[cfg(feature = "descriptor")]
pub use descriptor::DescriptorPool;
pub use descriptor::{EnumType, FieldDescriptor};
pub use directory::{DecodedEnum, EnumDirectory};
pub use encode::DecodeError;
pub use error::{EncodeError, Error, SchemaBuildError};
pub use property::{DynGetter, EnumGetter, PropertyDescriptor, PropertyKind};
pub use schema::{
    DynamicEnumWriter, EnumFieldWriter, EnumWriteSchema, TypedEnumWriter, WriteSchemas,
};
pub use sink::ByteSink;
pub use value::{EnumValue, Number, ProtoEnum};
