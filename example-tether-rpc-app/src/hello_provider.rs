use example_tether_rpc_service_definition::{EchoBytes, Fail, Greet, HELLO_SERVICE, Hello, Sleep};
use std::time::Duration;
use tether_tokio_rpc_server::ServiceProvider;

/// The demo implementation of `HelloService`.
pub fn hello_provider() -> ServiceProvider {
    ServiceProvider::new(HELLO_SERVICE)
        .method::<Hello, _, _>(|name| async move { Ok(format!("Hello {name}")) })
        .method::<EchoBytes, _, _>(|bytes| async move { Ok(bytes) })
        .method::<Greet, _, _>(|greeting| async move {
            let times = usize::try_from(greeting.times)?;
            Ok(format!("Hi {}", greeting.name).repeat(times))
        })
        .method::<Sleep, _, _>(|millis| async move {
            tokio::time::sleep(Duration::from_millis(u64::try_from(millis)?)).await;
            Ok(())
        })
        .method::<Fail, _, _>(|message| async move { Err(message.into()) })
}
