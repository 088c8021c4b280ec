use crate::encode::DecodeError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    SchemaBuild(#[from] SchemaBuildError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[cfg(feature = "descriptor")]
    #[error("invalid descriptor set: {0}")]
    Descriptor(#[from] prost::DecodeError),
}

/// Errors raised while resolving field metadata into a write schema. These never happen
/// per call, a schema that built successfully only fails with [`EncodeError`]s.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaBuildError {
    #[error("field {message}:{field} is not an enum field (declared type {type_name:?})")]
    NotAnEnum {
        message: Box<str>,
        field: Box<str>,
        type_name: Box<str>,
    },
    #[error("enum type {type_name} for field {message}:{field} could not be resolved")]
    UnresolvedEnum {
        message: Box<str>,
        field: Box<str>,
        type_name: Box<str>,
    },
    #[error("enum type {0} declares no values")]
    EmptyEnum(Box<str>),
    #[error("message type {0} is not known")]
    UnknownMessage(Box<str>),
    #[error("message type {message} has no field named {field}")]
    UnknownField { message: Box<str>, field: Box<str> },
    #[error("field {message}:{field} has an invalid field number {number}")]
    InvalidFieldNumber {
        message: Box<str>,
        field: Box<str>,
        number: i64,
    },
}

/// Per-call failures. Validation always runs before anything is written, so a call that
/// returns one of these leaves the sink untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("invalid enum name {name} for proto {type_name}, field={message}:{field}")]
    InvalidEnumName {
        name: Box<str>,
        type_name: Box<str>,
        message: Box<str>,
        field: Box<str>,
    },
    #[error("invalid enum value {value} for proto {type_name}, field={message}:{field}")]
    InvalidEnumValue {
        value: i32,
        type_name: Box<str>,
        message: Box<str>,
        field: Box<str>,
    },
    #[error("cannot serialize {value} as proto {type_name}, field={message}:{field}")]
    UnsupportedValueType {
        value: Box<str>,
        type_name: Box<str>,
        message: Box<str>,
        field: Box<str>,
    },
    #[error("field {message}:{field} has no accessor bound, write bare values instead")]
    MissingAccessor { message: Box<str>, field: Box<str> },
}
