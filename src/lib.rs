//! Core of the Tether RPC framework.
//!
//! This crate owns the parts of the protocol that every other Tether crate
//! builds on:
//!
//! - [`command`]: the fixed request/response headers and the codec that turns a
//!   [`command::Command`] into bytes and back.
//! - [`serialize`]: the type-tagged serializer registry used for payloads and
//!   for the arguments and results carried inside them.
//! - [`utils`]: process-wide helpers such as the request id counter.
//!
//! Transport framing (delimiting one command from the next on a byte stream) is
//! not handled here; the transport crates supply it.

pub mod command;
pub mod constants;
pub mod serialize;
pub mod utils;
