use tether::serialize::{ByteCursor, SerializeError, TypedSerializer, put_len_prefixed};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    pub name: String,
    pub times: i32,
}

pub struct GreetingSerializer;

impl TypedSerializer for GreetingSerializer {
    const TAG: u8 = 64;
    type Value = Greeting;

    fn encode(value: &Greeting, buf: &mut Vec<u8>) -> Result<(), SerializeError> {
        put_len_prefixed(buf, value.name.as_bytes());
        buf.extend(&value.times.to_be_bytes());
        Ok(())
    }

    fn decode(bytes: &[u8]) -> Result<Greeting, SerializeError> {
        let malformed = |reason: &str| SerializeError::malformed("Greeting", reason.to_owned());

        let mut cursor = ByteCursor::new(bytes);
        let name = cursor
            .read_len_prefixed()
            .ok_or_else(|| malformed("truncated name"))?;
        let name = String::from_utf8(name.to_vec()).map_err(|e| malformed(&e.to_string()))?;
        let times = cursor.read_i32().ok_or_else(|| malformed("truncated times"))?;

        if !cursor.is_empty() {
            return Err(malformed("unexpected trailing bytes"));
        }

        Ok(Greeting { name, times })
    }
}
