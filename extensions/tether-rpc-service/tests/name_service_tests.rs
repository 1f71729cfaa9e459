use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tether_rpc_service::name_service::{
    NameService, NameServiceError, NameServiceRegistry, rpc_uri, rpc_uri_authority, uri_scheme,
};

#[derive(Default)]
struct MemoryNameService {
    connected: Mutex<Option<String>>,
    entries: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl NameService for MemoryNameService {
    fn supported_schemes(&self) -> &[&'static str] {
        &["mem"]
    }

    async fn connect(&self, name_service_uri: &str) -> Result<(), NameServiceError> {
        *self.connected.lock().unwrap() = Some(name_service_uri.to_owned());
        Ok(())
    }

    async fn register_service(
        &self,
        service_name: &str,
        uri: &str,
    ) -> Result<(), NameServiceError> {
        self.entries
            .lock()
            .unwrap()
            .insert(service_name.to_owned(), uri.to_owned());
        Ok(())
    }

    async fn lookup_service(&self, service_name: &str) -> Result<Option<String>, NameServiceError> {
        Ok(self.entries.lock().unwrap().get(service_name).cloned())
    }
}

#[tokio::test]
async fn registry_selects_backend_by_scheme() {
    let memory = Arc::new(MemoryNameService::default());
    let registry = NameServiceRegistry::new().with_backend(memory.clone());

    let name_service = registry.get_name_service("mem://local").await.unwrap();
    assert_eq!(memory.connected.lock().unwrap().as_deref(), Some("mem://local"));

    name_service
        .register_service("com.example.HelloService", "rpc://127.0.0.1:9999")
        .await
        .unwrap();
    assert_eq!(
        name_service
            .lookup_service("com.example.HelloService")
            .await
            .unwrap()
            .as_deref(),
        Some("rpc://127.0.0.1:9999")
    );
    assert_eq!(name_service.lookup_service("missing").await.unwrap(), None);
}

#[tokio::test]
async fn registry_rejects_unsupported_scheme() {
    let registry = NameServiceRegistry::new().with_backend(Arc::new(MemoryNameService::default()));

    let err = registry.get_name_service("zk://cluster").await.err().unwrap();
    assert!(matches!(err, NameServiceError::UnsupportedScheme(scheme) if scheme == "zk"));

    let err = registry.get_name_service("no-scheme-here").await.err().unwrap();
    assert!(matches!(err, NameServiceError::InvalidUri(_)));
}

#[test]
fn uri_helpers() {
    assert_eq!(uri_scheme("file:///tmp/x"), Some("file"));
    assert_eq!(uri_scheme("1abc://x"), None);
    assert_eq!(uri_scheme("nothing"), None);

    let uri = rpc_uri("127.0.0.1:9999".parse().unwrap());
    assert_eq!(uri, "rpc://127.0.0.1:9999");
    assert_eq!(rpc_uri_authority(&uri).unwrap(), "127.0.0.1:9999");
    assert_eq!(rpc_uri_authority("rpc://localhost:80/").unwrap(), "localhost:80");

    assert!(matches!(
        rpc_uri_authority("http://localhost:80"),
        Err(NameServiceError::UnsupportedScheme(_))
    ));
    assert!(rpc_uri_authority("rpc:localhost:80").is_err());
    assert!(rpc_uri_authority("rpc://localhost").is_err());
}
