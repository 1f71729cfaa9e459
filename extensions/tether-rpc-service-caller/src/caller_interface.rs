use crate::{RemoteError, ResponseHandle, RpcCallerError, Transport};
use std::sync::Arc;
use tether::command::{Command, Header, ResponseCode, ResponseCommand};
use tether::serialize::SerializerRegistry;
use tether::utils::next_request_id;
use tether_rpc_service::RpcRequest;

/// Defines a generic capability for making RPC calls.
///
/// Anything that can provide a [`Transport`] and a [`SerializerRegistry`]
/// (a client, or a server that calls out to other services) implements this
/// trait and gets request framing, id assignment and response-code mapping
/// from the provided methods.
#[async_trait::async_trait]
pub trait RpcServiceCallerInterface: Send + Sync {
    // --- METHODS TO BE IMPLEMENTED BY THE STRUCT (e.g., RpcClient) ---

    fn get_transport(&self) -> Arc<dyn Transport>;

    fn get_serializers(&self) -> Arc<SerializerRegistry>;

    // --- METHODS PROVIDED AUTOMATICALLY BY THE TRAIT ---

    /// Frames `request` under a fresh request id and sends it.
    ///
    /// Resolves once the request is admitted; the returned handle resolves
    /// with the raw response.
    async fn send_request(&self, request: RpcRequest) -> Result<ResponseHandle, RpcCallerError> {
        let payload = self.get_serializers().serialize(&request)?;
        let header = Header::rpc_request(next_request_id());

        tracing::trace!(
            request_id = header.request_id,
            interface = request.interface_name(),
            method = request.method_name(),
            "Sending request"
        );

        self.get_transport()
            .send(Command::new(header, payload))
            .await
    }

    /// Sends `request` and waits for its tag-prefixed result bytes.
    async fn invoke_remote(&self, request: RpcRequest) -> Result<Vec<u8>, RpcCallerError> {
        let handle = self.send_request(request).await?;
        into_result_payload(handle.await?)
    }
}

/// Maps a response to its payload, or to the remote error its code names.
///
/// Unknown codes are treated as failures.
pub fn into_result_payload(response: ResponseCommand) -> Result<Vec<u8>, RpcCallerError> {
    let ResponseCommand { header, payload } = response;

    match header.response_code() {
        Some(ResponseCode::Success) => Ok(payload),
        Some(ResponseCode::NoProvider) => Err(RemoteError::NoProvider(header.error).into()),
        Some(ResponseCode::UnknownError) => Err(RemoteError::Failed(header.error).into()),
        None => Err(RemoteError::Failed(format!(
            "unknown response code {}: {}",
            header.code, header.error
        ))
        .into()),
    }
}
