use crate::{RpcCallerError, RpcServiceCallerInterface, Transport, stub::PendingCall};
use std::any::Any;
use std::sync::Arc;
use tether::serialize::SerializerRegistry;
use tether_rpc_service::RpcRequest;

/// Client-side proxy for one remote interface.
///
/// Every method of the interface has the same call shape: name the method,
/// serialize the argument, send, await, deserialize. The stub performs that
/// shape for any method name, so no per-interface code is needed. Typed
/// method descriptions (`RpcCall`) are the compile-time checked alternative.
#[derive(Clone)]
pub struct ServiceStub {
    interface_name: Arc<str>,
    transport: Arc<dyn Transport>,
    serializers: Arc<SerializerRegistry>,
}

impl ServiceStub {
    pub fn new(
        interface_name: impl Into<Arc<str>>,
        transport: Arc<dyn Transport>,
        serializers: Arc<SerializerRegistry>,
    ) -> Self {
        Self {
            interface_name: interface_name.into(),
            transport,
            serializers,
        }
    }

    pub fn interface_name(&self) -> &str {
        &self.interface_name
    }

    /// Calls `method` with `input` and decodes the result as `O`.
    pub async fn call<I, O>(&self, method: &str, input: &I) -> Result<O, RpcCallerError>
    where
        I: Any,
        O: Any,
    {
        self.call_pending(method, input).await?.await
    }

    /// Sends a call to `method` without waiting for the result.
    pub async fn call_pending<I, O>(
        &self,
        method: &str,
        input: &I,
    ) -> Result<PendingCall<O>, RpcCallerError>
    where
        I: Any,
    {
        let request = RpcRequest::new(
            self.interface_name.as_ref(),
            method,
            self.serializers.serialize(input)?,
        );
        let handle = self.send_request(request).await?;

        Ok(PendingCall::new(handle, self.serializers.clone()))
    }

    /// Calls `method` with already serialized (tag-prefixed) arguments and
    /// returns the serialized result.
    pub async fn invoke(
        &self,
        method: &str,
        arguments: Vec<u8>,
    ) -> Result<Vec<u8>, RpcCallerError> {
        self.invoke_remote(RpcRequest::new(
            self.interface_name.as_ref(),
            method,
            arguments,
        ))
        .await
    }
}

impl RpcServiceCallerInterface for ServiceStub {
    fn get_transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    fn get_serializers(&self) -> Arc<SerializerRegistry> {
        self.serializers.clone()
    }
}
