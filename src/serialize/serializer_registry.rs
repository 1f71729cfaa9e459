use crate::serialize::{
    BoolSerializer, BytesSerializer, F64Serializer, I32Serializer, I64Serializer,
    SerializeError, Serializer, StringSerializer, Typed, TypedSerializer, UnitSerializer,
};
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// Maps value types to one-byte tags and back, and (de)serializes through the
/// matching [`Serializer`].
///
/// A registry is built once, typically at process start, and then shared by
/// reference (usually behind an `Arc`) with every component that encodes or
/// decodes payloads. It is immutable after construction, so lookups need no
/// locking.
///
/// Registration policy: tags and value types are unique. A second serializer
/// for an already registered tag or type is rejected by
/// [`SerializerRegistryBuilder::build`]; nothing is ever silently overwritten.
pub struct SerializerRegistry {
    by_type: HashMap<TypeId, Arc<dyn Serializer>>,
    by_tag: HashMap<u8, Arc<dyn Serializer>>,
}

impl SerializerRegistry {
    pub fn builder() -> SerializerRegistryBuilder {
        SerializerRegistryBuilder::default()
    }

    /// A registry holding only the built-in scalar serializers.
    pub fn with_builtins() -> Self {
        // Built-in tags and types are distinct, no collision check needed.
        let mut registry = Self {
            by_type: HashMap::new(),
            by_tag: HashMap::new(),
        };
        for serializer in builtin_serializers() {
            registry
                .by_type
                .insert(serializer.value_type(), serializer.clone());
            registry.by_tag.insert(serializer.type_tag(), serializer);
        }
        registry
    }

    /// Builds a registry from an externally gathered set of serializers.
    pub fn from_serializers<I>(serializers: I) -> Result<Self, SerializeError>
    where
        I: IntoIterator<Item = Arc<dyn Serializer>>,
    {
        let mut by_type = HashMap::new();
        let mut by_tag: HashMap<u8, Arc<dyn Serializer>> = HashMap::new();

        for serializer in serializers {
            match by_tag.entry(serializer.type_tag()) {
                Entry::Occupied(existing) => {
                    return Err(SerializeError::DuplicateTag {
                        tag: serializer.type_tag(),
                        existing: existing.get().type_name(),
                    });
                }
                Entry::Vacant(slot) => {
                    if by_type.contains_key(&serializer.value_type()) {
                        return Err(SerializeError::DuplicateType {
                            type_name: serializer.type_name(),
                        });
                    }

                    tracing::debug!(
                        tag = serializer.type_tag(),
                        type_name = serializer.type_name(),
                        "Registered serializer"
                    );

                    by_type.insert(serializer.value_type(), serializer.clone());
                    slot.insert(serializer);
                }
            }
        }

        Ok(Self { by_type, by_tag })
    }

    /// Encodes `value` as `[tag][encoding]`.
    ///
    /// Fails with `UnknownType` if no serializer is registered for `T`.
    pub fn serialize<T: Any>(&self, value: &T) -> Result<Vec<u8>, SerializeError> {
        let serializer =
            self.by_type
                .get(&TypeId::of::<T>())
                .ok_or(SerializeError::UnknownType {
                    type_name: type_name::<T>(),
                })?;

        let mut buf = vec![serializer.type_tag()];
        serializer.encode(value, &mut buf)?;
        Ok(buf)
    }

    /// Decodes a tag-prefixed buffer into whatever type its tag names.
    ///
    /// Fails with `Empty` if there is no tag byte and `UnknownTag` if the tag is
    /// not registered.
    pub fn parse_any(&self, bytes: &[u8]) -> Result<Box<dyn Any + Send>, SerializeError> {
        let (&tag, rest) = bytes.split_first().ok_or(SerializeError::Empty)?;
        let serializer = self
            .by_tag
            .get(&tag)
            .ok_or(SerializeError::UnknownTag(tag))?;

        serializer.decode(rest)
    }

    /// Decodes a tag-prefixed buffer and checks that it holds a `T`.
    pub fn parse<T: Any>(&self, bytes: &[u8]) -> Result<T, SerializeError> {
        let found = bytes
            .first()
            .and_then(|tag| self.by_tag.get(tag))
            .map(|serializer| serializer.type_name())
            .unwrap_or("unknown");

        self.parse_any(bytes)?
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| SerializeError::TypeMismatch {
                expected: type_name::<T>(),
                found,
            })
    }

    /// Whether values of `type_id` can be serialized.
    pub fn supports_type(&self, type_id: TypeId) -> bool {
        self.by_type.contains_key(&type_id)
    }

    pub fn supports<T: Any>(&self) -> bool {
        self.supports_type(TypeId::of::<T>())
    }

    pub fn tag_of<T: Any>(&self) -> Option<u8> {
        self.by_type
            .get(&TypeId::of::<T>())
            .map(|serializer| serializer.type_tag())
    }

    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Collects serializers for a [`SerializerRegistry`].
#[derive(Default)]
pub struct SerializerRegistryBuilder {
    serializers: Vec<Arc<dyn Serializer>>,
}

impl SerializerRegistryBuilder {
    /// Adds the built-in scalar serializers (tags 0 to 6).
    pub fn with_builtins(mut self) -> Self {
        self.serializers.extend(builtin_serializers());
        self
    }

    pub fn register<S: Serializer + 'static>(mut self, serializer: S) -> Self {
        self.serializers.push(Arc::new(serializer));
        self
    }

    pub fn register_typed<S: TypedSerializer>(self) -> Self {
        self.register(Typed::<S>::new())
    }

    pub fn register_arc(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializers.push(serializer);
        self
    }

    /// Fails with `DuplicateTag` or `DuplicateType` if two serializers collide.
    pub fn build(self) -> Result<SerializerRegistry, SerializeError> {
        SerializerRegistry::from_serializers(self.serializers)
    }
}

fn builtin_serializers() -> Vec<Arc<dyn Serializer>> {
    vec![
        Arc::new(Typed::<StringSerializer>::new()),
        Arc::new(Typed::<BytesSerializer>::new()),
        Arc::new(Typed::<I32Serializer>::new()),
        Arc::new(Typed::<I64Serializer>::new()),
        Arc::new(Typed::<F64Serializer>::new()),
        Arc::new(Typed::<BoolSerializer>::new()),
        Arc::new(Typed::<UnitSerializer>::new()),
    ]
}
