mod command_codec;
mod command_error;
mod command_struct;
mod command_type;
mod header;
mod response_code;

pub use command_codec::CommandCodec;
pub use command_error::ProtocolError;
pub use command_struct::{Command, ResponseCommand};
pub use command_type::CommandType;
pub use header::{Header, ResponseHeader};
pub use response_code::ResponseCode;
