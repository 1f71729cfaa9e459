use crate::{ResponseHandle, RpcCallerError, into_result_payload};
use std::any::Any;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};
use tether::serialize::SerializerRegistry;

/// A call that has been sent and resolves to its decoded result.
///
/// Lets callers issue several requests before awaiting any of them.
pub struct PendingCall<T> {
    handle: ResponseHandle,
    serializers: Arc<SerializerRegistry>,
    _output: PhantomData<fn() -> T>,
}

impl<T> PendingCall<T> {
    pub fn new(handle: ResponseHandle, serializers: Arc<SerializerRegistry>) -> Self {
        Self {
            handle,
            serializers,
            _output: PhantomData,
        }
    }

    pub fn request_id(&self) -> i32 {
        self.handle.request_id()
    }
}

impl<T: Any> Future for PendingCall<T> {
    type Output = Result<T, RpcCallerError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let response = ready!(Pin::new(&mut this.handle).poll(cx));

        Poll::Ready(
            response
                .and_then(into_result_payload)
                .and_then(|payload| {
                    this.serializers
                        .parse::<T>(&payload)
                        .map_err(RpcCallerError::from)
                }),
        )
    }
}
