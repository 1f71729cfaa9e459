use example_tether_rpc_app::{
    FileNameService, file_uri, hello_provider, init_tracing, name_service_file_path,
};
use example_tether_rpc_service_definition::{
    Greet, Greeting, HELLO_SERVICE, Hello, example_serializer_registry,
};
use std::error::Error;
use std::sync::Arc;
use tether_rpc_service::name_service::{NameServiceRegistry, rpc_uri};
use tether_rpc_service_caller::stub::RpcCall;
use tether_tokio_rpc_client::{ClientConfig, RpcClient};
use tether_tokio_rpc_server::RpcServer;
use tokio::join;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    init_tracing();

    let serializers = Arc::new(example_serializer_registry()?);
    let name_services = NameServiceRegistry::new().with_backend(Arc::new(FileNameService::new()));
    let name_service_uri = file_uri(&name_service_file_path());

    // Bind to a random available port
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    {
        let server = Arc::new(RpcServer::new(serializers.clone()));
        server.endpoint().register(hello_provider())?;

        let name_service = name_services.get_name_service(&name_service_uri).await?;
        server.publish(name_service.as_ref(), &rpc_uri(addr)).await?;

        // Spawn the server using the pre-bound listener
        let _server_task = tokio::spawn(async move {
            let _ = server.serve_with_listener(listener).await;
        });
    }

    {
        let name_service = name_services.get_name_service(&name_service_uri).await?;
        let uri = name_service
            .lookup_service(HELLO_SERVICE)
            .await?
            .ok_or("HelloService is not registered")?;
        tracing::info!(service = HELLO_SERVICE, %uri, "Found service");

        let rpc_client = RpcClient::connect_uri(&uri, serializers, ClientConfig::default()).await?;

        // `join!` will await all responses before proceeding
        let (res1, res2, res3) = join!(
            Hello::call(&rpc_client, "Tether".to_string()),
            Hello::call(&rpc_client, "世界".to_string()),
            Greet::call(
                &rpc_client,
                Greeting {
                    name: "again".to_string(),
                    times: 2,
                }
            )
        );

        tracing::info!("Result from first hello(): {:?}", res1);
        tracing::info!("Result from second hello(): {:?}", res2);
        tracing::info!("Result from greet(): {:?}", res3);
    }

    Ok(())
}
