use crate::ClientConfig;
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tether::serialize::SerializerRegistry;
use tether_rpc_service::name_service::rpc_uri_authority;
use tether_rpc_service_caller::stub::ServiceStub;
use tether_rpc_service_caller::{
    ChannelTransport, InFlightRequests, OutboundFrame, RpcCallerError,
    RpcServiceCallerInterface, RpcTransportState, Transport,
};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

type StateChangeHandler = Box<dyn Fn(RpcTransportState) + Send + Sync>;

/// State shared between the client handle and its connection tasks.
struct Connection {
    addr: SocketAddr,
    in_flight: Arc<InFlightRequests>,
    is_connected: AtomicBool,
    state_handler: Mutex<Option<StateChangeHandler>>,
    tasks: Mutex<Vec<AbortHandle>>,
}

impl Connection {
    /// Tears the connection down once. Every pending call fails with a
    /// transport error.
    fn disconnect(&self, reason: &str) {
        if !self.is_connected.swap(false, Ordering::AcqRel) {
            return;
        }

        tracing::info!(addr = %self.addr, reason, "Disconnected");

        self.in_flight
            .fail_all(RpcCallerError::transport("connection closed"));
        self.in_flight.close();
        self.abort_tasks();

        if let Some(handler) = lock(&self.state_handler).as_ref() {
            handler(RpcTransportState::Disconnected);
        }
    }

    fn abort_tasks(&self) {
        for task in lock(&self.tasks).drain(..) {
            task.abort();
        }
    }
}

/// A TCP RPC client holding one connection to one server.
///
/// Requests are written as length-prefixed frames by a writer task; a reader
/// task matches response frames to pending calls by request id. Any number of
/// calls may be in flight at once, up to the configured limit.
pub struct RpcClient {
    connection: Arc<Connection>,
    transport: Arc<ChannelTransport>,
    serializers: Arc<SerializerRegistry>,
}

impl RpcClient {
    /// Connects to `host:port` with the default configuration.
    pub async fn new(
        host: &str,
        port: u16,
        serializers: Arc<SerializerRegistry>,
    ) -> io::Result<Self> {
        Self::connect((host, port), serializers, ClientConfig::default()).await
    }

    /// Connects to the server published under an `rpc://host:port` URI.
    pub async fn connect_uri(
        uri: &str,
        serializers: Arc<SerializerRegistry>,
        config: ClientConfig,
    ) -> io::Result<Self> {
        let authority = rpc_uri_authority(uri)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        Self::connect(authority, serializers, config).await
    }

    pub async fn connect<A: ToSocketAddrs>(
        addr: A,
        serializers: Arc<SerializerRegistry>,
        config: ClientConfig,
    ) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let addr = stream.peer_addr()?;

        let codec = LengthDelimitedCodec::builder()
            .length_field_length(4)
            .max_frame_length(config.max_frame_length)
            .new_codec();
        let (mut sink, mut stream) = Framed::new(stream, codec).split();

        let in_flight = Arc::new(InFlightRequests::new(config.in_flight));
        let (tx, mut rx) = mpsc::unbounded_channel::<OutboundFrame>();
        let transport = Arc::new(ChannelTransport::new(in_flight.clone(), tx));

        let connection = Arc::new(Connection {
            addr,
            in_flight: in_flight.clone(),
            is_connected: AtomicBool::new(true),
            state_handler: Mutex::new(None),
            tasks: Mutex::new(Vec::new()),
        });

        // Send loop
        let writer = tokio::spawn({
            let connection = connection.clone();
            let max_frame_length = config.max_frame_length;
            async move {
                while let Some(frame) = rx.recv().await {
                    let request_id = frame.request_id;

                    if frame.bytes.len() > max_frame_length {
                        tracing::warn!(
                            %addr,
                            request_id,
                            len = frame.bytes.len(),
                            "Request exceeds the maximum frame length"
                        );
                        in_flight.fail(
                            request_id,
                            RpcCallerError::transport(format!(
                                "request of {} bytes exceeds the {max_frame_length} byte frame limit",
                                frame.bytes.len()
                            )),
                        );
                        continue;
                    }

                    tracing::trace!(%addr, request_id, len = frame.bytes.len(), "Writing request");

                    if let Err(err) = sink.send(Bytes::from(frame.bytes)).await {
                        tracing::error!(%addr, request_id, error = %err, "Failed to write request");
                        in_flight.fail(request_id, RpcCallerError::transport(err.to_string()));
                        connection.disconnect("write failed");
                        break;
                    }
                }
            }
        });

        // Receive loop
        let reader = tokio::spawn({
            let connection = connection.clone();
            let transport = transport.clone();
            async move {
                let reason = loop {
                    match stream.next().await {
                        Some(Ok(bytes)) => {
                            tracing::trace!(%addr, len = bytes.len(), "Read response frame");
                            if transport.read_frame(&bytes).is_err() {
                                break "protocol error";
                            }
                        }
                        Some(Err(err)) => {
                            tracing::error!(%addr, error = %err, "Failed to read response");
                            break "read failed";
                        }
                        None => break "server closed the connection",
                    }
                };
                connection.disconnect(reason);
            }
        });

        lock(&connection.tasks).extend([writer.abort_handle(), reader.abort_handle()]);

        tracing::info!(%addr, "Connected");

        Ok(Self {
            connection,
            transport,
            serializers,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.connection.addr
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected.load(Ordering::Acquire)
    }

    pub fn in_flight(&self) -> &Arc<InFlightRequests> {
        self.transport.in_flight()
    }

    /// A stub for `interface_name` sharing this client's connection.
    pub fn stub(&self, interface_name: &str) -> ServiceStub {
        ServiceStub::new(
            interface_name,
            self.get_transport(),
            self.serializers.clone(),
        )
    }

    /// Installs a handler for connection state changes.
    ///
    /// The handler is called right away with the current state if the client
    /// is connected, and later once with `Disconnected`.
    pub fn set_state_change_handler(
        &self,
        handler: impl Fn(RpcTransportState) + Send + Sync + 'static,
    ) {
        let mut slot = lock(&self.connection.state_handler);
        if self.is_connected() {
            handler(RpcTransportState::Connected);
        }
        *slot = Some(Box::new(handler));
    }

    /// Closes the connection and fails every pending call.
    pub fn shutdown(&self) {
        self.connection.disconnect("shutdown");
    }
}

impl Drop for RpcClient {
    fn drop(&mut self) {
        self.connection.disconnect("client dropped");
        self.connection.abort_tasks();
    }
}

#[async_trait::async_trait]
impl RpcServiceCallerInterface for RpcClient {
    fn get_transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    fn get_serializers(&self) -> Arc<SerializerRegistry> {
        self.serializers.clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
