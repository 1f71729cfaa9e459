use crate::serialize::SerializeError;
use std::any::{Any, TypeId, type_name};
use std::marker::PhantomData;

/// A pluggable encoder/decoder for one concrete value type.
///
/// Implementations are handed to a [`SerializerRegistry`] once at startup. The
/// registry prefixes every encoding with [`Serializer::type_tag`] and uses that
/// tag to pick the decoder when parsing, so the tag must be unique within the
/// registry.
///
/// This trait is object safe. Most implementations are easier to write through
/// [`TypedSerializer`] and registered via the [`Typed`] adapter.
///
/// [`SerializerRegistry`]: crate::serialize::SerializerRegistry
pub trait Serializer: Send + Sync {
    /// The one-byte tag written in front of every value this serializer encodes.
    fn type_tag(&self) -> u8;

    /// The concrete type this serializer handles.
    fn value_type(&self) -> TypeId;

    /// Name of the concrete type, used in error messages and logs.
    fn type_name(&self) -> &'static str;

    /// Appends the encoding of `value` (without the tag) to `buf`.
    ///
    /// Fails with `TypeMismatch` if `value` is not of [`Serializer::value_type`].
    fn encode(&self, value: &dyn Any, buf: &mut Vec<u8>) -> Result<(), SerializeError>;

    /// Decodes a value from `bytes` (the encoding after the tag).
    fn decode(&self, bytes: &[u8]) -> Result<Box<dyn Any + Send>, SerializeError>;
}

/// Statically typed form of [`Serializer`].
///
/// ## Example
///
/// ```rust
/// use tether::serialize::{SerializeError, SerializerRegistry, Typed, TypedSerializer};
///
/// #[derive(Debug, PartialEq)]
/// struct Celsius(i32);
///
/// struct CelsiusSerializer;
///
/// impl TypedSerializer for CelsiusSerializer {
///     const TAG: u8 = 42;
///     type Value = Celsius;
///
///     fn encode(value: &Celsius, buf: &mut Vec<u8>) -> Result<(), SerializeError> {
///         buf.extend(&value.0.to_be_bytes());
///         Ok(())
///     }
///
///     fn decode(bytes: &[u8]) -> Result<Celsius, SerializeError> {
///         let raw: [u8; 4] = bytes
///             .try_into()
///             .map_err(|_| SerializeError::malformed("Celsius", "expected 4 bytes"))?;
///         Ok(Celsius(i32::from_be_bytes(raw)))
///     }
/// }
///
/// let registry = SerializerRegistry::builder()
///     .register(Typed::<CelsiusSerializer>::new())
///     .build()
///     .unwrap();
///
/// let bytes = registry.serialize(&Celsius(21)).unwrap();
/// assert_eq!(bytes[0], 42);
/// assert_eq!(registry.parse::<Celsius>(&bytes).unwrap(), Celsius(21));
/// ```
pub trait TypedSerializer: 'static {
    const TAG: u8;

    type Value: Any + Send;

    fn encode(value: &Self::Value, buf: &mut Vec<u8>) -> Result<(), SerializeError>;

    fn decode(bytes: &[u8]) -> Result<Self::Value, SerializeError>;
}

/// Adapts a [`TypedSerializer`] into a registrable [`Serializer`].
pub struct Typed<S>(PhantomData<fn() -> S>);

impl<S: TypedSerializer> Typed<S> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<S: TypedSerializer> Default for Typed<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TypedSerializer> Serializer for Typed<S> {
    fn type_tag(&self) -> u8 {
        S::TAG
    }

    fn value_type(&self) -> TypeId {
        TypeId::of::<S::Value>()
    }

    fn type_name(&self) -> &'static str {
        type_name::<S::Value>()
    }

    fn encode(&self, value: &dyn Any, buf: &mut Vec<u8>) -> Result<(), SerializeError> {
        let value = value
            .downcast_ref::<S::Value>()
            .ok_or(SerializeError::TypeMismatch {
                expected: type_name::<S::Value>(),
                found: "a different type",
            })?;
        S::encode(value, buf)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Box<dyn Any + Send>, SerializeError> {
        Ok(Box::new(S::decode(bytes)?))
    }
}
