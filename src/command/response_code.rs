use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Outcome classification carried in every response header.
#[repr(i32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum ResponseCode {
    Success = 0,
    /// The server raised an error while dispatching the request.
    UnknownError = -1,
    /// No implementation is registered under the requested interface name.
    NoProvider = -2,
}

impl ResponseCode {
    #[inline]
    pub fn value(self) -> i32 {
        self.into()
    }
}
