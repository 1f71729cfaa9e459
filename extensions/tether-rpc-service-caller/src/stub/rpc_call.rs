use crate::{RpcCallerError, RpcServiceCallerInterface, stub::PendingCall};
use async_trait::async_trait;
use tether_rpc_service::{RpcMethod, RpcRequest};

/// Client-side invocation for any [`RpcMethod`].
///
/// Implemented for every method description, so a method declared with
/// `rpc_method!` or `rpc_service!` can be called as
/// `Echo::call(&client, "hi".to_string()).await`.
#[async_trait]
pub trait RpcCall: RpcMethod + Sized + Send + Sync {
    /// Sends the call and waits for its result.
    async fn call<C>(caller: &C, input: Self::Input) -> Result<Self::Output, RpcCallerError>
    where
        C: RpcServiceCallerInterface + ?Sized;

    /// Sends the call and returns without waiting for the result.
    async fn call_pending<C>(
        caller: &C,
        input: Self::Input,
    ) -> Result<PendingCall<Self::Output>, RpcCallerError>
    where
        C: RpcServiceCallerInterface + ?Sized;
}

#[async_trait]
impl<T> RpcCall for T
where
    T: RpcMethod + Send + Sync + 'static,
{
    async fn call<C>(caller: &C, input: Self::Input) -> Result<Self::Output, RpcCallerError>
    where
        C: RpcServiceCallerInterface + ?Sized,
    {
        Self::call_pending(caller, input).await?.await
    }

    async fn call_pending<C>(
        caller: &C,
        input: Self::Input,
    ) -> Result<PendingCall<Self::Output>, RpcCallerError>
    where
        C: RpcServiceCallerInterface + ?Sized,
    {
        let serializers = caller.get_serializers();
        let request = RpcRequest::new(
            Self::INTERFACE_NAME,
            Self::METHOD_NAME,
            serializers.serialize(&input)?,
        );

        let handle = caller.send_request(request).await?;

        Ok(PendingCall::new(handle, serializers))
    }
}
