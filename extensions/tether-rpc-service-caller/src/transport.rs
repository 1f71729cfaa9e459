use crate::RpcCallerError;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tether::command::{Command, ResponseCommand};
use tokio::sync::oneshot;

/// Sends commands to a server and hands back a handle for each response.
///
/// A transport owns the connection and its in-flight tracking. `send` returns
/// once the request is admitted and queued for writing; the response (or the
/// failure that ends the call) arrives on the returned handle.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Command) -> Result<ResponseHandle, RpcCallerError>;
}

/// Resolves to the response of one request, or to the error that ended it.
///
/// Dropping the handle abandons the call. The request stays tracked until its
/// response arrives or it times out.
#[derive(Debug)]
pub struct ResponseHandle {
    request_id: i32,
    receiver: oneshot::Receiver<Result<ResponseCommand, RpcCallerError>>,
}

impl ResponseHandle {
    pub(crate) fn new(
        request_id: i32,
        receiver: oneshot::Receiver<Result<ResponseCommand, RpcCallerError>>,
    ) -> Self {
        Self {
            request_id,
            receiver,
        }
    }

    pub fn request_id(&self) -> i32 {
        self.request_id
    }
}

impl Future for ResponseHandle {
    type Output = Result<ResponseCommand, RpcCallerError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(RpcCallerError::transport(format!(
                "request {} was dropped before completing",
                this.request_id
            )))),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Connection state reported to a client's state change handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcTransportState {
    Connected,
    Disconnected,
}
