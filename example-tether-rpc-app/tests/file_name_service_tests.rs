use example_tether_rpc_app::{FileNameService, file_uri};
use tether_rpc_service::name_service::{NameService, NameServiceError, NameServiceRegistry};
use std::sync::Arc;

#[tokio::test]
async fn register_then_lookup_round_trips_through_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("names.data");
    let uri = file_uri(&path);

    let server_side = FileNameService::new();
    server_side.connect(&uri).await.unwrap();
    server_side
        .register_service("tether.example.HelloService", "rpc://localhost:9999")
        .await
        .unwrap();

    // A second instance sees what the first one wrote.
    let client_side = FileNameService::new();
    client_side.connect(&uri).await.unwrap();

    assert_eq!(
        client_side
            .lookup_service("tether.example.HelloService")
            .await
            .unwrap()
            .as_deref(),
        Some("rpc://localhost:9999")
    );
    assert_eq!(client_side.lookup_service("missing").await.unwrap(), None);
}

#[tokio::test]
async fn lookup_returns_the_first_registered_address() {
    let dir = tempfile::tempdir().unwrap();
    let names = FileNameService::new();
    names.connect(&file_uri(&dir.path().join("n.data"))).await.unwrap();

    for uri in ["rpc://a:1", "rpc://b:2", "rpc://a:1"] {
        names.register_service("svc", uri).await.unwrap();
    }

    assert_eq!(names.lookup_service("svc").await.unwrap().as_deref(), Some("rpc://a:1"));
    let raw = std::fs::read_to_string(dir.path().join("n.data")).unwrap();
    assert_eq!(raw.matches("rpc://a:1").count(), 1);
}

#[tokio::test]
async fn missing_or_empty_file_means_nothing_is_registered() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.data");
    let names = FileNameService::new();
    names.connect(&file_uri(&path)).await.unwrap();

    assert_eq!(names.lookup_service("svc").await.unwrap(), None);

    std::fs::write(&path, "  \n").unwrap();
    assert_eq!(names.lookup_service("svc").await.unwrap(), None);
}

#[tokio::test]
async fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.data");
    std::fs::write(&path, "not json").unwrap();
    let names = FileNameService::new();
    names.connect(&file_uri(&path)).await.unwrap();

    assert!(matches!(
        names.lookup_service("svc").await,
        Err(NameServiceError::Corrupt(_))
    ));
}

#[tokio::test]
async fn use_before_connect_is_rejected() {
    let names = FileNameService::new();

    assert!(matches!(
        names.lookup_service("svc").await,
        Err(NameServiceError::NotConnected)
    ));
}

#[tokio::test]
async fn connect_rejects_non_local_file_uris() {
    let names = FileNameService::new();

    assert!(matches!(
        names.connect("file://remote-host/tmp/x").await,
        Err(NameServiceError::InvalidUri(_))
    ));
    assert!(matches!(
        names.connect("zk://localhost:2181").await,
        Err(NameServiceError::UnsupportedScheme(_))
    ));
    assert!(names.connect("file:/tmp/names.data").await.is_ok());
    assert!(names.connect("file://localhost/tmp/names.data").await.is_ok());
}

#[tokio::test]
async fn registry_selects_the_file_backend_by_scheme() {
    let dir = tempfile::tempdir().unwrap();
    let registry = NameServiceRegistry::new().with_backend(Arc::new(FileNameService::new()));

    let names = registry
        .get_name_service(&file_uri(&dir.path().join("r.data")))
        .await
        .unwrap();
    names.register_service("svc", "rpc://x:1").await.unwrap();

    assert_eq!(names.lookup_service("svc").await.unwrap().as_deref(), Some("rpc://x:1"));
    assert!(matches!(
        registry.get_name_service("zk://localhost:2181").await,
        Err(NameServiceError::UnsupportedScheme(_))
    ));
}
