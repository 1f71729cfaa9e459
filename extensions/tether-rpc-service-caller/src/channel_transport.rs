use crate::{InFlightRequests, ResponseHandle, RpcCallerError, Transport};
use async_trait::async_trait;
use std::sync::Arc;
use tether::command::{Command, CommandCodec, ProtocolError};
use tokio::sync::mpsc;

/// An encoded request on its way to the connection writer.
#[derive(Debug)]
pub struct OutboundFrame {
    pub request_id: i32,
    pub bytes: Vec<u8>,
}

/// A [`Transport`] that encodes requests into a channel and is fed response
/// frames by whoever reads the connection.
///
/// Runtime-specific clients own the socket: they drain the outbound channel
/// into the write half and pass every inbound frame to
/// [`ChannelTransport::read_frame`].
pub struct ChannelTransport {
    in_flight: Arc<InFlightRequests>,
    outbound: mpsc::UnboundedSender<OutboundFrame>,
}

impl ChannelTransport {
    pub fn new(
        in_flight: Arc<InFlightRequests>,
        outbound: mpsc::UnboundedSender<OutboundFrame>,
    ) -> Self {
        Self {
            in_flight,
            outbound,
        }
    }

    pub fn in_flight(&self) -> &Arc<InFlightRequests> {
        &self.in_flight
    }

    /// Decodes one response frame and completes the matching request.
    ///
    /// A frame that fails to decode is reported as an error. If its request id
    /// can still be read, that request is failed with the protocol error
    /// instead of being left to time out.
    pub fn read_frame(&self, bytes: &[u8]) -> Result<(), ProtocolError> {
        match CommandCodec::decode_response(bytes) {
            Ok(response) => {
                self.in_flight.resolve(response);
                Ok(())
            }
            Err(err) => {
                if let Ok(request_id) = CommandCodec::peek_request_id(bytes) {
                    self.in_flight
                        .fail(request_id, RpcCallerError::Protocol(err.clone()));
                }
                tracing::error!(error = %err, "Failed to decode response frame");
                Err(err)
            }
        }
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&self, request: Command) -> Result<ResponseHandle, RpcCallerError> {
        let request_id = request.request_id();
        let handle = self.in_flight.register(request_id).await?;

        let frame = OutboundFrame {
            request_id,
            bytes: CommandCodec::encode_request(&request),
        };

        if self.outbound.send(frame).is_err() {
            self.in_flight.fail(
                request_id,
                RpcCallerError::transport("connection writer is gone"),
            );
        }

        Ok(handle)
    }
}
