use crate::serialize::{SerializeError, TypedSerializer};

// Tags 0..=6 are reserved for the built-in serializers below.

pub struct StringSerializer;

impl TypedSerializer for StringSerializer {
    const TAG: u8 = 0;
    type Value = String;

    fn encode(value: &String, buf: &mut Vec<u8>) -> Result<(), SerializeError> {
        buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    fn decode(bytes: &[u8]) -> Result<String, SerializeError> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| SerializeError::malformed("String", e.to_string()))
    }
}

pub struct BytesSerializer;

impl TypedSerializer for BytesSerializer {
    const TAG: u8 = 1;
    type Value = Vec<u8>;

    fn encode(value: &Vec<u8>, buf: &mut Vec<u8>) -> Result<(), SerializeError> {
        buf.extend_from_slice(value);
        Ok(())
    }

    fn decode(bytes: &[u8]) -> Result<Vec<u8>, SerializeError> {
        Ok(bytes.to_vec())
    }
}

macro_rules! fixed_width_serializer {
    ($name:ident, $ty:ty, $tag:literal) => {
        pub struct $name;

        impl TypedSerializer for $name {
            const TAG: u8 = $tag;
            type Value = $ty;

            fn encode(value: &$ty, buf: &mut Vec<u8>) -> Result<(), SerializeError> {
                buf.extend(&value.to_be_bytes());
                Ok(())
            }

            fn decode(bytes: &[u8]) -> Result<$ty, SerializeError> {
                let raw = bytes.try_into().map_err(|_| {
                    SerializeError::malformed(
                        stringify!($ty),
                        format!(
                            "expected {} bytes, got {}",
                            std::mem::size_of::<$ty>(),
                            bytes.len()
                        ),
                    )
                })?;
                Ok(<$ty>::from_be_bytes(raw))
            }
        }
    };
}

fixed_width_serializer!(I32Serializer, i32, 2);
fixed_width_serializer!(I64Serializer, i64, 3);
fixed_width_serializer!(F64Serializer, f64, 4);

pub struct BoolSerializer;

impl TypedSerializer for BoolSerializer {
    const TAG: u8 = 5;
    type Value = bool;

    fn encode(value: &bool, buf: &mut Vec<u8>) -> Result<(), SerializeError> {
        buf.push(u8::from(*value));
        Ok(())
    }

    fn decode(bytes: &[u8]) -> Result<bool, SerializeError> {
        match bytes {
            [0] => Ok(false),
            [1] => Ok(true),
            _ => Err(SerializeError::malformed(
                "bool",
                format!("expected a single 0 or 1 byte, got {bytes:?}"),
            )),
        }
    }
}

/// Encodes `()` as the tag alone, for methods without a meaningful result.
pub struct UnitSerializer;

impl TypedSerializer for UnitSerializer {
    const TAG: u8 = 6;
    type Value = ();

    fn encode(_value: &(), _buf: &mut Vec<u8>) -> Result<(), SerializeError> {
        Ok(())
    }

    fn decode(bytes: &[u8]) -> Result<(), SerializeError> {
        if bytes.is_empty() {
            Ok(())
        } else {
            Err(SerializeError::malformed("()", "unexpected trailing bytes"))
        }
    }
}
