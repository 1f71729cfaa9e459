use example_tether_rpc_service_definition::{
    EchoBytes, Fail, Greet, Greeting, HELLO_SERVICE, Hello, Sleep, example_serializer_registry,
};
use futures::future::join_all;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tether::command::ProtocolError;
use tether::serialize::SerializerRegistry;
use tether_rpc_service::{NO_PROVIDER_MESSAGE, name_service::rpc_uri};
use tether_rpc_service_caller::stub::RpcCall;
use tether_rpc_service_caller::{
    InFlightConfig, RemoteError, RpcCallerError, RpcTransportState,
};
use tether_tokio_rpc_client::{ClientConfig, RpcClient};
use tether_tokio_rpc_server::utils::bind_tcp_listener_on_random_port;
use tether_tokio_rpc_server::{RpcServer, ServiceProvider};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn serializers() -> Arc<SerializerRegistry> {
    Arc::new(example_serializer_registry().unwrap())
}

async fn start_server() -> SocketAddr {
    let (listener, addr) = bind_tcp_listener_on_random_port().await.unwrap();
    let server = Arc::new(RpcServer::new(serializers()));

    server
        .endpoint()
        .register(
            ServiceProvider::new(HELLO_SERVICE)
                .method::<Hello, _, _>(|name| async move { Ok(format!("Hello {name}")) })
                .method::<EchoBytes, _, _>(|bytes| async move { Ok(bytes) })
                .method::<Greet, _, _>(|greeting| async move {
                    Ok(format!("Hi {}", greeting.name).repeat(greeting.times as usize))
                })
                .method::<Sleep, _, _>(|millis| async move {
                    tokio::time::sleep(Duration::from_millis(millis as u64)).await;
                    Ok(())
                })
                .method::<Fail, _, _>(|message| async move { Err(message.into()) }),
        )
        .unwrap();

    tokio::spawn(async move {
        let _ = server.serve_with_listener(listener).await;
    });

    addr
}

async fn connect(addr: SocketAddr, config: ClientConfig) -> RpcClient {
    RpcClient::connect(addr, serializers(), config).await.unwrap()
}

#[tokio::test]
async fn strings_round_trip_through_a_real_connection() {
    let addr = start_server().await;
    let client = connect(addr, ClientConfig::default()).await;

    let long_name = "x".repeat(100_000);
    for name in ["", "world", "héllo wörld ✓ 你好", long_name.as_str()] {
        let reply = Hello::call(&client, name.to_string()).await.unwrap();
        assert_eq!(reply, format!("Hello {name}"));
    }
}

#[tokio::test]
async fn large_byte_payload_round_trips() {
    let addr = start_server().await;
    let client = connect(addr, ClientConfig::default()).await;
    let payload: Vec<u8> = (0..1_000_000).map(|i| (i % 251) as u8).collect();

    let echoed = EchoBytes::call(&client, payload.clone()).await.unwrap();

    assert_eq!(echoed, payload);
}

#[tokio::test]
async fn custom_serializer_round_trips() {
    let addr = start_server().await;
    let client = connect(addr, ClientConfig::default()).await;

    let reply = Greet::call(
        &client,
        Greeting {
            name: "Kim".into(),
            times: 3,
        },
    )
    .await
    .unwrap();

    assert_eq!(reply, "Hi KimHi KimHi Kim");
}

#[tokio::test]
async fn missing_interface_fails_with_no_provider() {
    let addr = start_server().await;
    let client = connect(addr, ClientConfig::default()).await;

    let err = client
        .stub("tether.example.Nobody")
        .call::<String, String>("hello", &"x".to_string())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RpcCallerError::Remote(RemoteError::NoProvider(ref msg)) if msg == NO_PROVIDER_MESSAGE
    ));
}

#[tokio::test]
async fn failing_method_reports_its_message_and_the_server_keeps_serving() {
    let addr = start_server().await;
    let client = connect(addr, ClientConfig::default()).await;

    let err = Fail::call(&client, "boom".to_string()).await.unwrap_err();
    assert!(matches!(
        err,
        RpcCallerError::Remote(RemoteError::Failed(ref msg)) if msg == "boom"
    ));

    let reply = Hello::call(&client, "again".to_string()).await.unwrap();
    assert_eq!(reply, "Hello again");
}

#[tokio::test]
async fn twice_the_permit_count_of_concurrent_calls_all_resolve_correctly() {
    let addr = start_server().await;
    let permits = 4;
    let client = connect(
        addr,
        ClientConfig::default().with_in_flight(
            InFlightConfig::default()
                .with_max_in_flight(permits)
                .with_acquire_timeout(Duration::from_secs(5)),
        ),
    )
    .await;

    let names: Vec<String> = (0..permits * 2).map(|i| format!("caller-{i}")).collect();
    let replies = join_all(names.iter().map(|name| Hello::call(&client, name.clone()))).await;

    for (name, reply) in names.iter().zip(replies) {
        assert_eq!(reply.unwrap(), format!("Hello {name}"));
    }
    assert_eq!(client.in_flight().pending_count(), 0);
    assert_eq!(client.in_flight().available_permits(), permits);
}

#[tokio::test]
async fn slow_call_times_out_and_frees_its_slot() {
    let addr = start_server().await;
    let client = connect(
        addr,
        ClientConfig::default().with_in_flight(
            InFlightConfig::default()
                .with_max_in_flight(2)
                .with_request_timeout(Duration::from_millis(100))
                .with_sweep_interval(Duration::from_millis(20)),
        ),
    )
    .await;

    let err = Sleep::call(&client, 1_000).await.unwrap_err();
    assert!(matches!(err, RpcCallerError::Timeout { .. }));
    assert_eq!(client.in_flight().available_permits(), 2);

    // The late response for the timed-out call is dropped without harm.
    tokio::time::sleep(Duration::from_millis(1_000)).await;
    let reply = Hello::call(&client, "later".to_string()).await.unwrap();
    assert_eq!(reply, "Hello later");
}

#[tokio::test]
async fn full_client_fails_new_calls_with_backpressure_timeout() {
    let addr = start_server().await;
    let client = connect(
        addr,
        ClientConfig::default().with_in_flight(
            InFlightConfig::default()
                .with_max_in_flight(1)
                .with_acquire_timeout(Duration::from_millis(50)),
        ),
    )
    .await;

    let slow = Sleep::call_pending(&client, 500).await.unwrap();

    let err = Hello::call(&client, "blocked".to_string()).await.unwrap_err();
    assert!(matches!(err, RpcCallerError::BackpressureTimeout { .. }));

    slow.await.unwrap();
}

#[tokio::test]
async fn dropped_connection_fails_pending_calls_with_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // A server that reads one request and hangs up without answering.
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0_u8; 64];
        let _ = socket.read(&mut buf).await;
        drop(socket);
    });

    let client = connect(addr, ClientConfig::default()).await;
    let err = Hello::call(&client, "anyone?".to_string()).await.unwrap_err();

    assert!(matches!(err, RpcCallerError::Transport(_)));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!client.is_connected());
    assert!(matches!(
        Hello::call(&client, "still?".to_string()).await,
        Err(RpcCallerError::Transport(_))
    ));
}

#[tokio::test]
async fn connecting_to_a_closed_port_is_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = RpcClient::connect(addr, serializers(), ClientConfig::default()).await;

    assert_eq!(
        result.err().map(|err| err.kind()),
        Some(std::io::ErrorKind::ConnectionRefused)
    );
}

#[tokio::test]
async fn state_change_handler_sees_connect_and_disconnect() {
    let addr = start_server().await;
    let client = connect(addr, ClientConfig::default()).await;

    let states = Arc::new(Mutex::new(Vec::new()));
    client.set_state_change_handler({
        let states = states.clone();
        move |state| states.lock().unwrap().push(state)
    });

    client.shutdown();

    assert_eq!(
        *states.lock().unwrap(),
        vec![RpcTransportState::Connected, RpcTransportState::Disconnected]
    );
}

#[tokio::test]
async fn connects_through_a_published_rpc_uri() {
    let addr = start_server().await;

    let client = RpcClient::connect_uri(&rpc_uri(addr), serializers(), ClientConfig::default())
        .await
        .unwrap();

    assert_eq!(client.peer_addr(), addr);
    assert_eq!(
        Hello::call(&client, "uri".to_string()).await.unwrap(),
        "Hello uri"
    );
}

#[tokio::test]
async fn malformed_frame_only_closes_its_own_connection() {
    let addr = start_server().await;
    let client = connect(addr, ClientConfig::default()).await;

    let mut rogue = TcpStream::connect(addr).await.unwrap();
    // Length prefix 4 followed by a body too short to be a request header.
    rogue.write_all(&[0, 0, 0, 4, 1, 2, 3, 4]).await.unwrap();
    let mut buf = [0_u8; 16];
    let read = tokio::time::timeout(Duration::from_secs(2), rogue.read(&mut buf))
        .await
        .unwrap()
        .unwrap_or(0);
    assert_eq!(read, 0);

    assert_eq!(
        Hello::call(&client, "unaffected".to_string()).await.unwrap(),
        "Hello unaffected"
    );
}

#[tokio::test]
async fn undecodable_response_fails_its_call_and_closes_the_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // A server that answers the first request with an unsupported version.
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let len = socket.read_u32().await.unwrap() as usize;
        let mut request = vec![0_u8; len];
        socket.read_exact(&mut request).await.unwrap();

        let mut response = Vec::new();
        response.extend_from_slice(&request[0..4]);
        response.extend_from_slice(&99_i32.to_be_bytes());
        response.extend_from_slice(&request[8..12]);
        response.extend_from_slice(&0_i32.to_be_bytes());
        response.extend_from_slice(&0_i32.to_be_bytes());

        socket.write_u32(response.len() as u32).await.unwrap();
        socket.write_all(&response).await.unwrap();
        let mut rest = Vec::new();
        let _ = socket.read_to_end(&mut rest).await;
    });

    let client = connect(addr, ClientConfig::default()).await;
    let err = tokio::time::timeout(Duration::from_secs(2), Hello::call(&client, "v?".into()))
        .await
        .unwrap()
        .unwrap_err();

    assert!(matches!(
        err,
        RpcCallerError::Protocol(ProtocolError::UnsupportedVersion(99))
    ));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!client.is_connected());
    assert_eq!(client.in_flight().pending_count(), 0);
}
