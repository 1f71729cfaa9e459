//! Note: This `RpcServer` is a reference implementation and does not include
//! authentication or authorization mechanisms. It is best suited for trusted,
//! internal network communication. Any struct that owns an
//! [`RpcServiceEndpoint`] can act as a server; this one speaks length-prefixed
//! frames over plain TCP.

use crate::ServerConfig;
use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tether::command::{CommandCodec, ResponseCode, ResponseCommand, ResponseHeader};
use tether::serialize::SerializerRegistry;
use tether_rpc_service::name_service::{NameService, NameServiceError};
use tether_rpc_service_endpoint::RpcServiceEndpoint;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

/// Pause after a failed `accept` (e.g. file descriptor exhaustion) before
/// trying again.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Error string sent in place of a result that does not fit in one frame.
pub const RESPONSE_TOO_LARGE_MESSAGE: &str = "response exceeds frame limit";

type FrameSink = SplitSink<Framed<TcpStream, LengthDelimitedCodec>, Bytes>;
type FrameStream = SplitStream<Framed<TcpStream, LengthDelimitedCodec>>;

/// An RPC server that accepts TCP connections and dispatches their requests
/// to an [`RpcServiceEndpoint`].
pub struct RpcServer {
    endpoint: Arc<RpcServiceEndpoint>,
    config: ServerConfig,
}

impl RpcServer {
    pub fn new(serializers: Arc<SerializerRegistry>) -> Self {
        Self::with_config(serializers, ServerConfig::default())
    }

    pub fn with_config(serializers: Arc<SerializerRegistry>, config: ServerConfig) -> Self {
        RpcServer {
            endpoint: Arc::new(RpcServiceEndpoint::new(serializers)),
            config,
        }
    }

    /// Returns an `Arc` clone of the underlying RPC service endpoint.
    /// This allows for registering providers without tying the registration
    /// logic to the server implementation.
    pub fn endpoint(&self) -> Arc<RpcServiceEndpoint> {
        self.endpoint.clone()
    }

    /// Publishes every registered service under `uri`.
    pub async fn publish(
        &self,
        name_service: &dyn NameService,
        uri: &str,
    ) -> Result<(), NameServiceError> {
        for service_name in self.endpoint.service_names() {
            name_service.register_service(&service_name, uri).await?;
            tracing::info!(service = %service_name, uri, "Published service");
        }
        Ok(())
    }

    /// Binds to an address and starts the RPC server.
    ///
    /// The address can be any type that implements `ToSocketAddrs`, such as
    /// a string "127.0.0.1:9999" or a `SocketAddr`.
    pub async fn serve<A: ToSocketAddrs>(self, addr: A) -> io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        let server = Arc::new(self);
        server.serve_with_listener(listener).await
    }

    /// Starts the RPC server on a specific host and port.
    pub async fn serve_on(self, host: &str, port: u16) -> io::Result<()> {
        self.serve((host, port)).await
    }

    /// Starts the RPC server with a pre-bound `TcpListener`.
    ///
    /// Runs until the task is dropped or aborted. A failing connection is
    /// closed on its own; the accept loop keeps going.
    pub async fn serve_with_listener(self: Arc<Self>, listener: TcpListener) -> io::Result<()> {
        let address = listener.local_addr()?;
        tracing::info!("Server running on {:?}", address);

        loop {
            match listener.accept().await {
                Ok((socket, addr)) => {
                    tracing::info!("Client connected: {}", addr);
                    if let Err(err) = socket.set_nodelay(true) {
                        tracing::warn!(%addr, error = %err, "Failed to set TCP_NODELAY");
                    }
                    self.clone().handle_connection(socket, addr);
                }
                Err(err) => {
                    tracing::error!(error = %err, "Failed to accept connection");
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                }
            }
        }
    }

    fn handle_connection(self: Arc<Self>, socket: TcpStream, addr: SocketAddr) {
        let codec = LengthDelimitedCodec::builder()
            .length_field_length(4)
            .max_frame_length(self.config.max_frame_length)
            .new_codec();
        let (sink, stream) = Framed::new(socket, codec).split();
        let (tx, rx) = mpsc::unbounded_channel::<Bytes>();

        // Spawn the main task to read and dispatch requests.
        let receiver = tokio::spawn(Self::receiver_task(
            self.endpoint.clone(),
            stream,
            tx,
            self.config.max_frame_length,
            addr,
        ));

        // Spawn a task to forward responses to the socket.
        tokio::spawn(Self::sender_task(sink, rx, receiver.abort_handle(), addr));
    }

    /// Writes encoded responses in the order their handlers finish.
    ///
    /// A failed write closes the whole connection: the receiver is aborted so
    /// the read half is dropped along with the sink.
    async fn sender_task(
        mut sink: FrameSink,
        mut rx: mpsc::UnboundedReceiver<Bytes>,
        receiver: AbortHandle,
        addr: SocketAddr,
    ) {
        while let Some(bytes) = rx.recv().await {
            if let Err(err) = sink.send(bytes).await {
                tracing::warn!(%addr, error = %err, "Failed to write response, closing");
                receiver.abort();
                break;
            }
        }
    }

    /// Reads request frames and handles each one on its own task, so a slow
    /// handler does not hold up the requests behind it.
    async fn receiver_task(
        endpoint: Arc<RpcServiceEndpoint>,
        mut stream: FrameStream,
        tx: mpsc::UnboundedSender<Bytes>,
        max_frame_length: usize,
        addr: SocketAddr,
    ) {
        loop {
            match stream.next().await {
                Some(Ok(frame)) => {
                    let request = match CommandCodec::decode_request(&frame) {
                        Ok(request) => request,
                        Err(err) => {
                            tracing::error!(%addr, error = %err, "Malformed request frame");
                            break;
                        }
                    };

                    let request_header = request.header;
                    let request_id = request.request_id();
                    tracing::trace!(%addr, request_id, "Received request");

                    let endpoint = endpoint.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let response = endpoint.handle_request(request).await;
                        let mut bytes = CommandCodec::encode_response(&response);
                        if bytes.len() > max_frame_length {
                            tracing::warn!(
                                %addr,
                                request_id,
                                len = bytes.len(),
                                max_frame_length,
                                "Response too large for one frame"
                            );
                            bytes = CommandCodec::encode_response(&ResponseCommand::new(
                                ResponseHeader::with_code(
                                    &request_header,
                                    ResponseCode::UnknownError,
                                    RESPONSE_TOO_LARGE_MESSAGE,
                                ),
                                Vec::new(),
                            ));
                        }
                        if tx.send(Bytes::from(bytes)).is_err() {
                            tracing::debug!(
                                %addr,
                                request_id,
                                "Connection gone before response was sent"
                            );
                        }
                    });
                }
                Some(Err(err)) => {
                    tracing::error!(%addr, error = %err, "Failed to read request");
                    break;
                }
                None => {
                    tracing::info!("Client {} disconnected.", addr);
                    break;
                }
            }
        }

        tracing::info!("Terminated connection for {}.", addr);
    }
}
