//! Host-side bindings: how a field's value is read out of a host object.
use std::fmt;
use std::sync::Arc;

use crate::value::{EnumValue, ProtoEnum};

type EnumGetterFn<T> = dyn for<'a> Fn(&'a T) -> Option<&'a dyn ProtoEnum> + Send + Sync;
type DynGetterFn<T> = dyn for<'a> Fn(&'a T) -> Option<EnumValue<'a>> + Send + Sync;

/// Reads a native enum field out of a host object of type `T`.
pub struct EnumGetter<T> {
    get: Arc<EnumGetterFn<T>>,
}

impl<T> Clone for EnumGetter<T> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
        }
    }
}

impl<T> fmt::Debug for EnumGetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumGetter")
            .field("host", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<T> EnumGetter<T> {
    pub fn new<F>(get: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Option<&'a dyn ProtoEnum> + Send + Sync + 'static,
    {
        Self { get: Arc::new(get) }
    }

    /// Builds a getter from a projection onto an `Option<E>` field.
    pub fn optional<E, F>(field: F) -> Self
    where
        E: ProtoEnum + 'static,
        F: for<'a> Fn(&'a T) -> &'a Option<E> + Send + Sync + 'static,
    {
        Self::new(move |host| field(host).as_ref().map(|value| value as &dyn ProtoEnum))
    }

    #[inline]
    pub fn get<'a>(&self, host: &'a T) -> Option<&'a dyn ProtoEnum> {
        (self.get)(host)
    }
}

/// Reads a field of an open type (any [`EnumValue`] shape) out of a host object.
pub struct DynGetter<T> {
    get: Arc<DynGetterFn<T>>,
}

impl<T> Clone for DynGetter<T> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
        }
    }
}

impl<T> fmt::Debug for DynGetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynGetter")
            .field("host", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<T> DynGetter<T> {
    pub fn new<F>(get: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Option<EnumValue<'a>> + Send + Sync + 'static,
    {
        Self { get: Arc::new(get) }
    }

    #[inline]
    pub fn get<'a>(&self, host: &'a T) -> Option<EnumValue<'a>> {
        (self.get)(host)
    }
}

/// The declared host-side type of a field.
#[derive(Debug, Clone)]
pub enum PropertyKind<T> {
    /// A concrete native enum. Always bound to a getter.
    Enum(EnumGetter<T>),
    /// An open type, classified per call. Without a getter, only bare values can be
    /// written.
    Dynamic(Option<DynGetter<T>>),
}

/// Describes the host-side property a protobuf field is bound to.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor<T> {
    name: Box<str>,
    kind: PropertyKind<T>,
}

impl<T> PropertyDescriptor<T> {
    pub fn new(name: impl Into<Box<str>>, kind: PropertyKind<T>) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn enum_type(name: impl Into<Box<str>>, getter: EnumGetter<T>) -> Self {
        Self::new(name, PropertyKind::Enum(getter))
    }

    pub fn dynamic(name: impl Into<Box<str>>, getter: DynGetter<T>) -> Self {
        Self::new(name, PropertyKind::Dynamic(Some(getter)))
    }

    /// An open-typed property with no getter, for writers that are only handed bare values.
    pub fn unbound(name: impl Into<Box<str>>) -> Self {
        Self::new(name, PropertyKind::Dynamic(None))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &PropertyKind<T> {
        &self.kind
    }

    pub fn is_enum_type(&self) -> bool {
        matches!(self.kind, PropertyKind::Enum(_))
    }

    pub fn into_kind(self) -> PropertyKind<T> {
        self.kind
    }
}
