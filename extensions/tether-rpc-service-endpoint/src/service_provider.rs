use crate::HandlerError;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tether::serialize::SerializerRegistry;
use tether_rpc_service::RpcMethod;

// --- Generic Definitions ---
pub type RpcHandlerFuture = Pin<Box<dyn Future<Output = Result<Vec<u8>, HandlerError>> + Send>>;

pub type RpcMethodHandler =
    Arc<dyn Fn(Arc<SerializerRegistry>, Vec<u8>) -> RpcHandlerFuture + Send + Sync>;

/// A type a typed method needs the serializer registry to support.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RequiredType {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
}

impl RequiredType {
    fn of<T: Any>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }
}

pub(crate) struct MethodEntry {
    pub(crate) handler: RpcMethodHandler,
    pub(crate) required_types: Vec<RequiredType>,
    pub(crate) declared_interface: Option<&'static str>,
}

/// The server-side implementation of one service interface: a set of
/// named method handlers.
///
/// ```rust
/// use example_tether_rpc_service_definition::{HELLO_SERVICE, Hello};
/// use tether_rpc_service_endpoint::ServiceProvider;
///
/// let provider = ServiceProvider::new(HELLO_SERVICE)
///     .method::<Hello, _, _>(|name| async move { Ok(format!("Hello {name}")) });
///
/// assert!(provider.has_method("hello"));
/// ```
pub struct ServiceProvider {
    interface_name: String,
    pub(crate) methods: HashMap<String, MethodEntry>,
    pub(crate) duplicate_methods: Vec<String>,
}

impl ServiceProvider {
    pub fn new(interface_name: impl Into<String>) -> Self {
        Self {
            interface_name: interface_name.into(),
            methods: HashMap::new(),
            duplicate_methods: Vec::new(),
        }
    }

    pub fn interface_name(&self) -> &str {
        &self.interface_name
    }

    /// Adds a handler for the typed method `M`.
    ///
    /// The argument is decoded into `M::Input` and the result encoded from
    /// `M::Output` with the endpoint's serializer registry.
    pub fn method<M, F, Fut>(self, handler: F) -> Self
    where
        M: RpcMethod + 'static,
        F: Fn(M::Input) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<M::Output, HandlerError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let wrapped: RpcMethodHandler = Arc::new(
            move |serializers: Arc<SerializerRegistry>, arguments: Vec<u8>| {
                let handler = handler.clone();
                Box::pin(async move {
                    let input = serializers.parse::<M::Input>(&arguments)?;
                    let output = handler(input).await?;
                    Ok::<_, HandlerError>(serializers.serialize(&output)?)
                }) as RpcHandlerFuture
            },
        );

        self.insert(
            M::METHOD_NAME,
            MethodEntry {
                handler: wrapped,
                required_types: vec![
                    RequiredType::of::<M::Input>(),
                    RequiredType::of::<M::Output>(),
                ],
                declared_interface: Some(M::INTERFACE_NAME),
            },
        )
    }

    /// Adds a handler working on tag-prefixed bytes directly.
    pub fn raw_method<F, Fut>(self, method_name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Vec<u8>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<u8>, HandlerError>> + Send + 'static,
    {
        let wrapped: RpcMethodHandler = Arc::new(
            move |_serializers: Arc<SerializerRegistry>, arguments: Vec<u8>| {
                Box::pin(handler(arguments)) as RpcHandlerFuture
            },
        );

        self.insert(
            method_name,
            MethodEntry {
                handler: wrapped,
                required_types: Vec::new(),
                declared_interface: None,
            },
        )
    }

    pub fn has_method(&self, method_name: &str) -> bool {
        self.methods.contains_key(method_name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub(crate) fn handler(&self, method_name: &str) -> Option<RpcMethodHandler> {
        self.methods
            .get(method_name)
            .map(|entry| entry.handler.clone())
    }

    fn insert(mut self, method_name: impl Into<String>, entry: MethodEntry) -> Self {
        let method_name = method_name.into();
        if self.methods.contains_key(&method_name) {
            self.duplicate_methods.push(method_name.clone());
        }
        self.methods.insert(method_name, entry);
        self
    }
}

impl std::fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("interface_name", &self.interface_name)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("duplicate_methods", &self.duplicate_methods)
            .finish()
    }
}
