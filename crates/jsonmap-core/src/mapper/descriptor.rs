//! Static per-type field metadata.
//!
//! A [`TypeDescriptor`] is built once per type from [`Mappable::describe`].
//! Every field gets a [`FieldKind`] fixed by the builder method that declared
//! it, plus a typed accessor. Conversion never inspects a Rust value to pick
//! a strategy: the kind decides the expected shape of the stored value and
//! the accessor was monomorphised for the declared field type.

use std::collections::HashSet;
use std::fmt;

use super::collections::{Keyed, Sequence};
use super::registry::{Registry, RegistryBuilder};
use super::scalar::Scalar;
use super::{Mappable, MappableDyn, DISCRIMINATOR_KEY};
use crate::error::{JsonError, MappingErrorKind, Result};
use crate::value::{Map, Value};

/// How a field maps to the value tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Scalar,
    ScalarSequence,
    ScalarMap,
    NestedObject,
    NestedSequence,
    NestedMap,
    Polymorphic,
}

impl FieldKind {
    /// Whether a stored value has the structure this kind decodes from.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::Scalar => value.is_scalar(),
            FieldKind::ScalarSequence | FieldKind::NestedSequence => value.is_array(),
            FieldKind::ScalarMap | FieldKind::NestedObject | FieldKind::NestedMap => {
                value.is_object()
            }
            FieldKind::Polymorphic => value.is_object() || value.is_null(),
        }
    }

    pub fn expected_shape(self) -> &'static str {
        match self {
            FieldKind::Scalar => "scalar",
            FieldKind::ScalarSequence | FieldKind::NestedSequence => "array",
            FieldKind::ScalarMap | FieldKind::NestedObject | FieldKind::NestedMap => "object",
            FieldKind::Polymorphic => "object or null",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Read and write one field of a `T` in value-tree form.
pub(crate) trait FieldAccess<T>: Send + Sync {
    fn get(&self, target: &T, registry: &Registry) -> Result<Value>;

    /// `value` has already been checked against the field's kind.
    fn set(&self, target: &mut T, value: &Value, registry: &Registry) -> Result<()>;
}

/// One participating field: wire name, kind, accessors.
pub struct FieldDescriptor<T> {
    name: String,
    kind: FieldKind,
    access: Box<dyn FieldAccess<T>>,
}

impl<T> FieldDescriptor<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub(crate) fn get(&self, target: &T, registry: &Registry) -> Result<Value> {
        self.access.get(target, registry)
    }

    pub(crate) fn set(&self, target: &mut T, value: &Value, registry: &Registry) -> Result<()> {
        self.access.set(target, value, registry)
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Ordered field descriptors of one mappable type.
pub struct TypeDescriptor<T> {
    type_name: &'static str,
    fields: Vec<FieldDescriptor<T>>,
}

impl<T> TypeDescriptor<T> {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor<T>> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Wire names must be unique and must not collide with the
    /// discriminator key.
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name == DISCRIMINATOR_KEY {
                return Err(format!(
                    "`{}` uses the reserved field name `{DISCRIMINATOR_KEY}`",
                    self.type_name
                ));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(format!(
                    "`{}` declares field `{}` more than once",
                    self.type_name, field.name
                ));
            }
        }
        Ok(())
    }
}

impl<T> fmt::Debug for TypeDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Builder handed to [`Mappable::describe`]. Each method declares one
/// participating field under its wire name; the method chosen fixes the
/// field's [`FieldKind`].
pub struct Fields<T> {
    fields: Vec<FieldDescriptor<T>>,
    dependencies: Vec<fn(&mut RegistryBuilder)>,
}

impl<T: 'static> Fields<T> {
    pub(crate) fn new() -> Self {
        Self {
            fields: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub(crate) fn finish(
        self,
        type_name: &'static str,
    ) -> (TypeDescriptor<T>, Vec<fn(&mut RegistryBuilder)>) {
        let descriptor = TypeDescriptor {
            type_name,
            fields: self.fields,
        };
        (descriptor, self.dependencies)
    }

    fn push(&mut self, name: &str, kind: FieldKind, access: Box<dyn FieldAccess<T>>) -> &mut Self {
        self.fields.push(FieldDescriptor {
            name: name.to_string(),
            kind,
            access,
        });
        self
    }

    fn depends_on<N: Mappable>(&mut self) {
        self.dependencies.push(register_dependency::<N>);
    }

    /// Int, float, bool, string, or an `Option` of one.
    pub fn scalar<S: Scalar>(
        &mut self,
        name: &str,
        get: fn(&T) -> &S,
        get_mut: fn(&mut T) -> &mut S,
    ) -> &mut Self {
        self.push(name, FieldKind::Scalar, Box::new(ScalarField { get, get_mut }))
    }

    /// `Vec`, `VecDeque`, `BTreeSet` or `HashSet` of scalars.
    pub fn scalar_seq<C>(
        &mut self,
        name: &str,
        get: fn(&T) -> &C,
        get_mut: fn(&mut T) -> &mut C,
    ) -> &mut Self
    where
        C: Sequence,
        C::Item: Scalar,
    {
        self.push(
            name,
            FieldKind::ScalarSequence,
            Box::new(ScalarSeqField { get, get_mut }),
        )
    }

    /// String-keyed map of scalars.
    pub fn scalar_map<M>(
        &mut self,
        name: &str,
        get: fn(&T) -> &M,
        get_mut: fn(&mut T) -> &mut M,
    ) -> &mut Self
    where
        M: Keyed,
        M::Item: Scalar,
    {
        self.push(
            name,
            FieldKind::ScalarMap,
            Box::new(ScalarMapField { get, get_mut }),
        )
    }

    /// Another mappable type. Registering `T` registers `N` too.
    pub fn nested<N: Mappable>(
        &mut self,
        name: &str,
        get: fn(&T) -> &N,
        get_mut: fn(&mut T) -> &mut N,
    ) -> &mut Self {
        self.depends_on::<N>();
        self.push(
            name,
            FieldKind::NestedObject,
            Box::new(NestedField { get, get_mut }),
        )
    }

    /// Sequence of mappable objects.
    pub fn nested_seq<C>(
        &mut self,
        name: &str,
        get: fn(&T) -> &C,
        get_mut: fn(&mut T) -> &mut C,
    ) -> &mut Self
    where
        C: Sequence,
        C::Item: Mappable,
    {
        self.depends_on::<C::Item>();
        self.push(
            name,
            FieldKind::NestedSequence,
            Box::new(NestedSeqField { get, get_mut }),
        )
    }

    /// String-keyed map of mappable objects.
    pub fn nested_map<M>(
        &mut self,
        name: &str,
        get: fn(&T) -> &M,
        get_mut: fn(&mut T) -> &mut M,
    ) -> &mut Self
    where
        M: Keyed,
        M::Item: Mappable,
    {
        self.depends_on::<M::Item>();
        self.push(
            name,
            FieldKind::NestedMap,
            Box::new(NestedMapField { get, get_mut }),
        )
    }

    /// A trait object whose concrete type is recorded under the `__type`
    /// discriminator. Concrete types must be registered with
    /// [`RegistryBuilder::register_variant`].
    pub fn polymorphic<P>(
        &mut self,
        name: &str,
        get: fn(&T) -> &Option<Box<P>>,
        get_mut: fn(&mut T) -> &mut Option<Box<P>>,
    ) -> &mut Self
    where
        P: ?Sized + MappableDyn,
    {
        self.push(
            name,
            FieldKind::Polymorphic,
            Box::new(PolymorphicField { get, get_mut }),
        )
    }
}

fn register_dependency<N: Mappable>(builder: &mut RegistryBuilder) {
    builder.register::<N>();
}

fn scalar_from<S: Scalar>(value: &Value) -> Result<S> {
    S::from_value(value).ok_or_else(|| {
        JsonError::mapping(MappingErrorKind::ScalarMismatch {
            expected: S::EXPECTED,
            found: value.kind_name(),
        })
    })
}

fn element_from<S: Scalar>(index: usize, value: &Value) -> Result<S> {
    S::from_value(value).ok_or_else(|| {
        JsonError::mapping(MappingErrorKind::ElementMismatch {
            index,
            expected: S::EXPECTED,
            found: value.kind_name(),
        })
    })
}

fn shape_error(expected: &'static str, value: &Value) -> JsonError {
    JsonError::mapping(MappingErrorKind::ShapeMismatch {
        expected,
        found: value.kind_name(),
    })
}

fn array_items(value: &Value) -> Result<&[Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| shape_error("array", value))
}

fn object_entries(value: &Value) -> Result<&Map> {
    value.as_object().ok_or_else(|| shape_error("object", value))
}

struct ScalarField<T, S> {
    get: fn(&T) -> &S,
    get_mut: fn(&mut T) -> &mut S,
}

impl<T: 'static, S: Scalar> FieldAccess<T> for ScalarField<T, S> {
    fn get(&self, target: &T, _registry: &Registry) -> Result<Value> {
        Ok((self.get)(target).to_value())
    }

    fn set(&self, target: &mut T, value: &Value, _registry: &Registry) -> Result<()> {
        *(self.get_mut)(target) = scalar_from::<S>(value)?;
        Ok(())
    }
}

struct ScalarSeqField<T, C> {
    get: fn(&T) -> &C,
    get_mut: fn(&mut T) -> &mut C,
}

impl<T: 'static, C> FieldAccess<T> for ScalarSeqField<T, C>
where
    C: Sequence,
    C::Item: Scalar,
{
    fn get(&self, target: &T, _registry: &Registry) -> Result<Value> {
        let items = (self.get)(target).items();
        Ok(Value::Array(items.into_iter().map(Scalar::to_value).collect()))
    }

    /// Every element is checked before the field is touched, so a
    /// heterogeneous array leaves the field as it was.
    fn set(&self, target: &mut T, value: &Value, _registry: &Registry) -> Result<()> {
        let items = array_items(value)?
            .iter()
            .enumerate()
            .map(|(index, item)| element_from::<C::Item>(index, item))
            .collect::<Result<Vec<_>>>()?;
        *(self.get_mut)(target) = C::from_items(items);
        Ok(())
    }
}

struct ScalarMapField<T, M> {
    get: fn(&T) -> &M,
    get_mut: fn(&mut T) -> &mut M,
}

impl<T: 'static, M> FieldAccess<T> for ScalarMapField<T, M>
where
    M: Keyed,
    M::Item: Scalar,
{
    fn get(&self, target: &T, _registry: &Registry) -> Result<Value> {
        let entries = (self.get)(target).entries();
        Ok(Value::Object(
            entries
                .into_iter()
                .map(|(key, item)| (key.to_string(), item.to_value()))
                .collect(),
        ))
    }

    fn set(&self, target: &mut T, value: &Value, _registry: &Registry) -> Result<()> {
        let entries = object_entries(value)?
            .iter()
            .map(|(key, item)| {
                scalar_from::<M::Item>(item)
                    .map(|scalar| (key.clone(), scalar))
                    .map_err(|err| err.within(key))
            })
            .collect::<Result<Vec<_>>>()?;
        *(self.get_mut)(target) = M::from_entries(entries);
        Ok(())
    }
}

struct NestedField<T, N> {
    get: fn(&T) -> &N,
    get_mut: fn(&mut T) -> &mut N,
}

impl<T: 'static, N: Mappable> FieldAccess<T> for NestedField<T, N> {
    fn get(&self, target: &T, registry: &Registry) -> Result<Value> {
        registry.encode((self.get)(target))
    }

    /// Decodes into a fresh `N` and assigns only on success.
    fn set(&self, target: &mut T, value: &Value, registry: &Registry) -> Result<()> {
        *(self.get_mut)(target) = registry.decode::<N>(value)?;
        Ok(())
    }
}

struct NestedSeqField<T, C> {
    get: fn(&T) -> &C,
    get_mut: fn(&mut T) -> &mut C,
}

impl<T: 'static, C> FieldAccess<T> for NestedSeqField<T, C>
where
    C: Sequence,
    C::Item: Mappable,
{
    fn get(&self, target: &T, registry: &Registry) -> Result<Value> {
        (self.get)(target)
            .items()
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                registry
                    .encode(item)
                    .map_err(|err| err.within(&format!("[{index}]")))
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    fn set(&self, target: &mut T, value: &Value, registry: &Registry) -> Result<()> {
        let items = array_items(value)?
            .iter()
            .enumerate()
            .map(|(index, item)| {
                registry
                    .decode::<C::Item>(item)
                    .map_err(|err| err.within(&format!("[{index}]")))
            })
            .collect::<Result<Vec<_>>>()?;
        *(self.get_mut)(target) = C::from_items(items);
        Ok(())
    }
}

struct NestedMapField<T, M> {
    get: fn(&T) -> &M,
    get_mut: fn(&mut T) -> &mut M,
}

impl<T: 'static, M> FieldAccess<T> for NestedMapField<T, M>
where
    M: Keyed,
    M::Item: Mappable,
{
    fn get(&self, target: &T, registry: &Registry) -> Result<Value> {
        let mut map = Map::new();
        for (key, item) in (self.get)(target).entries() {
            let encoded = registry.encode(item).map_err(|err| err.within(key))?;
            map.insert(key.to_string(), encoded);
        }
        Ok(Value::Object(map))
    }

    fn set(&self, target: &mut T, value: &Value, registry: &Registry) -> Result<()> {
        let entries = object_entries(value)?
            .iter()
            .map(|(key, item)| {
                registry
                    .decode::<M::Item>(item)
                    .map(|decoded| (key.clone(), decoded))
                    .map_err(|err| err.within(key))
            })
            .collect::<Result<Vec<_>>>()?;
        *(self.get_mut)(target) = M::from_entries(entries);
        Ok(())
    }
}

struct PolymorphicField<T, P: ?Sized> {
    get: fn(&T) -> &Option<Box<P>>,
    get_mut: fn(&mut T) -> &mut Option<Box<P>>,
}

impl<T: 'static, P> FieldAccess<T> for PolymorphicField<T, P>
where
    P: ?Sized + MappableDyn,
{
    fn get(&self, target: &T, registry: &Registry) -> Result<Value> {
        match (self.get)(target) {
            Some(inner) => registry.encode_variant::<P>(&**inner),
            None => Ok(Value::Null),
        }
    }

    fn set(&self, target: &mut T, value: &Value, registry: &Registry) -> Result<()> {
        let decoded = if value.is_null() {
            None
        } else {
            Some(registry.decode_variant::<P>(value)?)
        };
        *(self.get_mut)(target) = decoded;
        Ok(())
    }
}
