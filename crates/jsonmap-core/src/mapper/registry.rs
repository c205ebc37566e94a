//! The type descriptor registry.
//!
//! A [`RegistryBuilder`] collects descriptors (and polymorphic variants) once,
//! up front; [`RegistryBuilder::build`] freezes them into an immutable
//! [`Registry`] that can be shared across threads without locking. One
//! registry can be published process-wide with [`Registry::install`].

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use tracing::debug;

use super::descriptor::{Fields, TypeDescriptor};
use super::{decode_fields, encode_fields, Mappable, MappableDyn, DISCRIMINATOR_KEY};
use crate::error::{JsonError, MappingErrorKind, Result};
use crate::options::MapperOptions;
use crate::value::{Map, Value};

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// The registry published with [`Registry::install`], if any.
pub fn global() -> Option<&'static Registry> {
    GLOBAL.get()
}

/// Type-erased view of a `TypeDescriptor<T>`.
trait ErasedDescriptor: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn encode_any(&self, value: &dyn Any, registry: &Registry) -> Result<Value>;

    fn as_any(&self) -> &dyn Any;
}

impl<T: Mappable> ErasedDescriptor for TypeDescriptor<T> {
    fn type_name(&self) -> &'static str {
        TypeDescriptor::type_name(self)
    }

    fn encode_any(&self, value: &dyn Any, registry: &Registry) -> Result<Value> {
        match value.downcast_ref::<T>() {
            Some(value) => encode_fields(value, self, registry),
            None => Err(JsonError::NotMappable {
                type_name: T::TYPE_NAME.to_string(),
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Builds one concrete variant of the abstract type `P` from an object.
type VariantFactory<P> = Box<dyn Fn(&Value, &Registry) -> Result<Box<P>> + Send + Sync>;

struct Variant {
    type_id: TypeId,
    /// A boxed `VariantFactory<P>` for the abstract type it is filed under.
    factory: Box<dyn Any + Send + Sync>,
}

/// Collects type descriptors before freezing them into a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    types: HashMap<TypeId, Box<dyn ErasedDescriptor>>,
    variants: HashMap<TypeId, HashMap<&'static str, Variant>>,
    options: MapperOptions,
    problems: Vec<String>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&mut self, options: MapperOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Build and cache the descriptor for `T` and, transitively, for every
    /// nested type it declares. Registering a type twice is a no-op.
    pub fn register<T: Mappable>(&mut self) -> &mut Self {
        let id = TypeId::of::<T>();
        if self.types.contains_key(&id) {
            return self;
        }

        let mut fields = Fields::new();
        T::describe(&mut fields);
        let (descriptor, dependencies) = fields.finish(T::TYPE_NAME);
        if let Err(problem) = descriptor.validate() {
            self.problems.push(problem);
        }
        debug!(
            type_name = T::TYPE_NAME,
            fields = descriptor.fields().len(),
            "registered mappable type"
        );
        self.types.insert(id, Box::new(descriptor));

        for register in dependencies {
            register(self);
        }
        self
    }

    /// Register `V` as a concrete variant of the abstract type `P`, decoded
    /// whenever a `P` field carries `"__type": V::TYPE_NAME`.
    ///
    /// ```ignore
    /// builder.register_variant::<dyn Shape, Circle>(|circle| Box::new(circle));
    /// ```
    pub fn register_variant<P, V>(&mut self, upcast: fn(V) -> Box<P>) -> &mut Self
    where
        P: ?Sized + 'static,
        V: Mappable,
    {
        self.register::<V>();

        let variants = self.variants.entry(TypeId::of::<P>()).or_default();
        match variants.get(V::TYPE_NAME) {
            Some(existing) if existing.type_id == TypeId::of::<V>() => return self,
            Some(_) => {
                self.problems.push(format!(
                    "two variants of the same abstract type are named `{}`",
                    V::TYPE_NAME
                ));
                return self;
            }
            None => {}
        }

        let factory: VariantFactory<P> = Box::new(move |value: &Value, registry: &Registry| {
            registry.decode::<V>(value).map(upcast)
        });
        variants.insert(
            V::TYPE_NAME,
            Variant {
                type_id: TypeId::of::<V>(),
                factory: Box::new(factory),
            },
        );
        debug!(variant = V::TYPE_NAME, "registered polymorphic variant");
        self
    }

    /// Freeze the registry. Fails if any registered type declared a
    /// duplicate or reserved field name, or if two variants collide.
    pub fn build(self) -> Result<Registry> {
        if !self.problems.is_empty() {
            return Err(JsonError::Registration(self.problems.join("; ")));
        }
        Ok(Registry {
            types: self.types,
            variants: self.variants,
            options: self.options,
        })
    }
}

/// Immutable set of type descriptors driving [`encode`](Registry::encode)
/// and [`decode`](Registry::decode).
pub struct Registry {
    types: HashMap<TypeId, Box<dyn ErasedDescriptor>>,
    variants: HashMap<TypeId, HashMap<&'static str, Variant>>,
    options: MapperOptions,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Publish this registry process-wide. Only the first call succeeds.
    pub fn install(self) -> Result<&'static Registry> {
        let types = self.types.len();
        GLOBAL.set(self).map_err(|_| {
            JsonError::Registration("a global registry is already installed".to_string())
        })?;
        debug!(types, "installed global registry");
        GLOBAL.get().ok_or_else(|| {
            JsonError::Registration("global registry unavailable after install".to_string())
        })
    }

    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.types.contains_key(&TypeId::of::<T>())
    }

    /// Names of every registered type, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> =
            self.types.values().map(|desc| desc.type_name()).collect();
        names.sort_unstable();
        names
    }

    pub fn descriptor<T: Mappable>(&self) -> Option<&TypeDescriptor<T>> {
        self.types
            .get(&TypeId::of::<T>())
            .and_then(|desc| desc.as_any().downcast_ref::<TypeDescriptor<T>>())
    }

    fn require<T: Mappable>(&self) -> Result<&TypeDescriptor<T>> {
        self.descriptor::<T>().ok_or_else(|| JsonError::NotMappable {
            type_name: T::TYPE_NAME.to_string(),
        })
    }

    /// Encode `value` as an object holding its participating fields.
    pub fn encode<T: Mappable>(&self, value: &T) -> Result<Value> {
        encode_fields(value, self.require::<T>()?, self)
    }

    /// Encode a value known only as `dyn Any`, looking its descriptor up by
    /// runtime type id.
    pub fn encode_any(&self, value: &dyn Any) -> Result<Value> {
        match self.types.get(&Any::type_id(value)) {
            Some(desc) => desc.encode_any(value, self),
            None => Err(JsonError::NotMappable {
                type_name: format!("{:?}", Any::type_id(value)),
            }),
        }
    }

    /// Decode a fresh `T::default()` from `value`.
    pub fn decode<T: Mappable>(&self, value: &Value) -> Result<T> {
        let mut target = T::default();
        self.decode_into(&mut target, value)?;
        Ok(target)
    }

    /// Overwrite the fields of `target` that `value` carries. Fields absent
    /// from `value` keep their current contents.
    pub fn decode_into<T: Mappable>(&self, target: &mut T, value: &Value) -> Result<()> {
        decode_fields(target, value, self.require::<T>()?, self)
    }

    /// Encode and serialize in one step.
    pub fn to_text<T: Mappable>(&self, value: &T) -> Result<String> {
        Ok(self.encode(value)?.to_text())
    }

    /// Parse and decode in one step.
    pub fn from_text<T: Mappable>(&self, text: &str) -> Result<T> {
        self.decode(&crate::parser::parse(text)?)
    }

    /// Encode the concrete value behind a `P` trait object, writing its
    /// variant name under the discriminator key first.
    pub(crate) fn encode_variant<P>(&self, value: &P) -> Result<Value>
    where
        P: ?Sized + MappableDyn,
    {
        let name = value.variant_name();
        let concrete = value.as_any();
        let registered = self
            .variants
            .get(&TypeId::of::<P>())
            .and_then(|variants| variants.get(name))
            .is_some_and(|variant| variant.type_id == Any::type_id(concrete));
        if !registered {
            return Err(JsonError::mapping(MappingErrorKind::UnregisteredVariant(
                name.to_string(),
            )));
        }

        let Value::Object(fields) = self.encode_any(concrete)? else {
            return Err(JsonError::NotMappable {
                type_name: name.to_string(),
            });
        };
        let mut map = Map::with_capacity(fields.len() + 1);
        map.insert(DISCRIMINATOR_KEY.to_string(), Value::String(name.to_string()));
        map.extend(fields);
        Ok(Value::Object(map))
    }

    /// Resolve the discriminator of `value` to a registered variant of `P`
    /// and decode it.
    pub(crate) fn decode_variant<P>(&self, value: &Value) -> Result<Box<P>>
    where
        P: ?Sized + 'static,
    {
        let name = value
            .get(DISCRIMINATOR_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| JsonError::mapping(MappingErrorKind::MissingDiscriminator))?;
        let unknown = || JsonError::mapping(MappingErrorKind::UnknownVariant(name.to_string()));

        let variant = self
            .variants
            .get(&TypeId::of::<P>())
            .and_then(|variants| variants.get(name))
            .ok_or_else(unknown)?;
        let factory = variant
            .factory
            .downcast_ref::<VariantFactory<P>>()
            .ok_or_else(unknown)?;
        factory(value, self)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.type_names())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
