use tether::serialize::SerializeError;
use tether_rpc_service::{
    RpcMethod, RpcRequest, RpcRequestSerializer, default_serializer_registry, rpc_method,
    rpc_service,
};
use tether::serialize::TypedSerializer;

rpc_method!(
    /// Used only by these tests.
    pub Hello, "com.example.HelloService", "hello", String => String
);

rpc_service! {
    "com.example.MathService" {
        pub Square = "square"(i64) -> i64;
        Negate = "negate"(f64) -> f64;
    }
}

#[test]
fn rpc_request_round_trips_through_registry() {
    let registry = default_serializer_registry().unwrap();
    let args = registry.serialize(&"Master MQ".to_string()).unwrap();
    let request = RpcRequest::new("com.example.HelloService", "hello", args.clone());

    let bytes = registry.serialize(&request).unwrap();
    assert_eq!(bytes[0], RpcRequestSerializer::TAG);

    let decoded = registry.parse::<RpcRequest>(&bytes).unwrap();
    assert_eq!(decoded, request);
    assert_eq!(decoded.interface_name(), "com.example.HelloService");
    assert_eq!(decoded.method_name(), "hello");
    assert_eq!(
        registry.parse::<String>(decoded.serialized_arguments()).unwrap(),
        "Master MQ"
    );
}

#[test]
fn rpc_request_layout_is_length_prefixed() {
    let request = RpcRequest::new("a.B", "c", vec![0, 9]);
    let mut buf = Vec::new();
    RpcRequestSerializer::encode(&request, &mut buf).unwrap();

    assert_eq!(
        buf,
        vec![
            0, 0, 0, 3, b'a', b'.', b'B', //
            0, 0, 0, 1, b'c', //
            0, 0, 0, 2, 0, 9,
        ]
    );
}

#[test]
fn truncated_rpc_request_is_malformed() {
    let request = RpcRequest::new("a.B", "c", vec![0, 9]);
    let mut buf = Vec::new();
    RpcRequestSerializer::encode(&request, &mut buf).unwrap();

    for len in [0, 3, 7, 12, buf.len() - 1] {
        assert!(
            matches!(
                RpcRequestSerializer::decode(&buf[..len]),
                Err(SerializeError::Malformed { .. })
            ),
            "prefix of length {len} should not decode"
        );
    }
}

#[test]
fn trailing_bytes_are_rejected() {
    let mut buf = Vec::new();
    RpcRequestSerializer::encode(&RpcRequest::new("a", "b", vec![]), &mut buf).unwrap();
    buf.push(0);

    assert!(RpcRequestSerializer::decode(&buf).is_err());
}

#[test]
fn method_macros_describe_methods() {
    assert_eq!(Hello::INTERFACE_NAME, "com.example.HelloService");
    assert_eq!(Hello::METHOD_NAME, "hello");
    assert_eq!(Square::INTERFACE_NAME, "com.example.MathService");
    assert_eq!(Negate::METHOD_NAME, "negate");

    fn input_of<M: RpcMethod>(value: M::Input) -> M::Input {
        value
    }
    assert_eq!(input_of::<Square>(4i64), 4);
}
