mod builtin;
mod byte_cursor;
mod serialize_error;
mod serializer;
mod serializer_registry;

pub use builtin::{
    BoolSerializer, BytesSerializer, F64Serializer, I32Serializer, I64Serializer,
    StringSerializer, UnitSerializer,
};
pub use byte_cursor::{ByteCursor, put_len_prefixed};
pub use serialize_error::SerializeError;
pub use serializer::{Serializer, Typed, TypedSerializer};
pub use serializer_registry::{SerializerRegistry, SerializerRegistryBuilder};
