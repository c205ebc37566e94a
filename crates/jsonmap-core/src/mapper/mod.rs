//! Object mapper: converts typed domain values to and from the value tree.
//!
//! A type opts in by implementing [`Mappable`] (usually through
//! [`impl_mappable!`](crate::impl_mappable)), listing the fields that take
//! part in the wire schema. Descriptors are built once into a [`Registry`];
//! encoding and decoding then walk the descriptor's fields in order.
//!
//! Polymorphic fields (`Option<Box<dyn Trait>>`) are encoded with an extra
//! `"__type"` entry naming the concrete variant, written before the
//! variant's own fields. Any payload containing such a field must keep that
//! key; decoding resolves it through the variants registered with
//! [`RegistryBuilder::register_variant`].

pub mod collections;
pub mod descriptor;
mod macros;
pub mod registry;
pub mod scalar;

use std::any::Any;

use tracing::{debug, trace};

use crate::error::{JsonError, MappingErrorKind, Result};
use crate::options::MismatchPolicy;
use crate::value::{Map, Value};

pub use collections::{Keyed, Sequence};
pub use descriptor::{FieldDescriptor, FieldKind, Fields, TypeDescriptor};
pub use registry::{Registry, RegistryBuilder};
pub use scalar::Scalar;

/// Reserved key naming the concrete type behind a polymorphic field.
pub const DISCRIMINATOR_KEY: &str = "__type";

/// A type whose declared fields can be mapped to and from an object.
///
/// `Default` supplies the fresh instance decoding starts from; fields the
/// document does not mention keep their default values.
pub trait Mappable: Default + Send + Sync + 'static {
    /// Name written as the discriminator when this type is a polymorphic
    /// variant.
    const TYPE_NAME: &'static str;

    /// Declare the participating fields, in wire order.
    fn describe(fields: &mut Fields<Self>);
}

/// Object-safe view of a [`Mappable`] value, implemented for every mappable
/// type. Make it a supertrait of any trait used behind a polymorphic field.
pub trait MappableDyn: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn variant_name(&self) -> &'static str;
}

impl<T: Mappable> MappableDyn for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variant_name(&self) -> &'static str {
        T::TYPE_NAME
    }
}

/// Encode `value` with the global registry.
pub fn encode<T: Mappable>(value: &T) -> Result<Value> {
    global_for::<T>()?.encode(value)
}

/// Decode a fresh `T` with the global registry.
pub fn decode<T: Mappable>(value: &Value) -> Result<T> {
    global_for::<T>()?.decode(value)
}

fn global_for<T: Mappable>() -> Result<&'static Registry> {
    registry::global().ok_or_else(|| JsonError::NotMappable {
        type_name: T::TYPE_NAME.to_string(),
    })
}

pub(crate) fn encode_fields<T>(
    value: &T,
    descriptor: &TypeDescriptor<T>,
    registry: &Registry,
) -> Result<Value> {
    let mut map = Map::with_capacity(descriptor.fields().len());
    for field in descriptor.fields() {
        let encoded = field
            .get(value, registry)
            .map_err(|err| err.within(field.name()))?;
        map.insert(field.name().to_string(), encoded);
    }
    Ok(Value::Object(map))
}

pub(crate) fn decode_fields<T>(
    target: &mut T,
    value: &Value,
    descriptor: &TypeDescriptor<T>,
    registry: &Registry,
) -> Result<()> {
    let Some(map) = value.as_object() else {
        return Err(JsonError::mapping(MappingErrorKind::ShapeMismatch {
            expected: "object",
            found: value.kind_name(),
        }));
    };

    for field in descriptor.fields() {
        let Some(stored) = map.get(field.name()) else {
            trace!(
                type_name = descriptor.type_name(),
                field = field.name(),
                "field absent, left unchanged"
            );
            continue;
        };

        let kind = field.kind();
        let outcome = if kind.accepts(stored) {
            field.set(target, stored, registry)
        } else {
            Err(JsonError::mapping(MappingErrorKind::ShapeMismatch {
                expected: kind.expected_shape(),
                found: stored.kind_name(),
            }))
        };

        match outcome {
            Ok(()) => {}
            Err(err)
                if err.is_mapping() && registry.options().mismatch == MismatchPolicy::SkipField =>
            {
                debug!(
                    type_name = descriptor.type_name(),
                    field = field.name(),
                    error = %err,
                    "skipping field that does not match its declared type"
                );
            }
            Err(err) => return Err(err.within(field.name())),
        }
    }
    Ok(())
}
