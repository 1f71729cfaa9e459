use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    /// `serialize` was given a value whose type has no registered serializer.
    #[error("unknown entry type: {type_name}")]
    UnknownType { type_name: &'static str },

    /// `parse` read a leading tag that no serializer claims.
    #[error("unknown entry tag: {0}")]
    UnknownTag(u8),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("tag {tag} is already registered for {existing}")]
    DuplicateTag { tag: u8, existing: &'static str },

    #[error("a serializer for {type_name} is already registered")]
    DuplicateType { type_name: &'static str },

    #[error("cannot parse an empty buffer")]
    Empty,

    #[error("malformed {type_name} encoding: {reason}")]
    Malformed {
        type_name: &'static str,
        reason: String,
    },
}

impl SerializeError {
    pub fn malformed(type_name: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            type_name,
            reason: reason.into(),
        }
    }
}
