use crate::{RpcServiceEndpointError, ServiceProvider};
use dashmap::DashMap;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tether::command::{Command, CommandCodec, ResponseCode, ResponseCommand, ResponseHeader};
use tether::serialize::SerializerRegistry;
use tether_rpc_service::{NO_PROVIDER_MESSAGE, RpcRequest};

/// Dispatches RPC request commands to registered service providers.
///
/// Runtime agnostic: it turns one request into one response and leaves
/// sockets and task spawning to the server. Registration and dispatch may run
/// concurrently from any number of tasks.
pub struct RpcServiceEndpoint {
    providers: DashMap<String, Arc<ServiceProvider>>,
    serializers: Arc<SerializerRegistry>,
}

impl RpcServiceEndpoint {
    pub fn new(serializers: Arc<SerializerRegistry>) -> Self {
        Self {
            providers: DashMap::new(),
            serializers,
        }
    }

    pub fn serializers(&self) -> &Arc<SerializerRegistry> {
        &self.serializers
    }

    /// Publishes `provider` under its interface name.
    ///
    /// Every typed method must use types the serializer registry supports.
    /// Replaces (and returns) a provider previously registered under the same
    /// name.
    pub fn register(
        &self,
        provider: ServiceProvider,
    ) -> Result<Option<Arc<ServiceProvider>>, RpcServiceEndpointError> {
        self.validate(&provider)?;

        let interface = provider.interface_name().to_owned();
        let previous = self.providers.insert(interface.clone(), Arc::new(provider));

        tracing::info!(
            interface = %interface,
            replaced = previous.is_some(),
            "Registered service provider"
        );

        Ok(previous)
    }

    pub fn unregister(&self, interface_name: &str) -> Option<Arc<ServiceProvider>> {
        let removed = self
            .providers
            .remove(interface_name)
            .map(|(_, provider)| provider);
        if removed.is_some() {
            tracing::info!(interface = interface_name, "Unregistered service provider");
        }
        removed
    }

    pub fn is_registered(&self, interface_name: &str) -> bool {
        self.providers.contains_key(interface_name)
    }

    pub fn service_names(&self) -> Vec<String> {
        self.providers.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Handles one request and builds its response.
    ///
    /// Never fails: every problem is reported to the caller through the
    /// response code. An unknown interface yields `NoProvider`; anything that
    /// goes wrong after the provider is found (unknown method, undecodable
    /// argument, handler error or panic) yields `UnknownError` with a message.
    pub async fn handle_request(&self, request: Command) -> ResponseCommand {
        let header = request.header;

        let rpc_request = match self.serializers.parse::<RpcRequest>(&request.payload) {
            Ok(rpc_request) => rpc_request,
            Err(err) => {
                tracing::warn!(
                    request_id = header.request_id,
                    error = %err,
                    "Undecodable request payload"
                );
                return failure(ResponseHeader::with_code(
                    &header,
                    ResponseCode::UnknownError,
                    err.to_string(),
                ));
            }
        };

        let interface = rpc_request.interface_name();
        let method = rpc_request.method_name();

        // Cloned out so no map guard is held across the handler's await.
        let Some(provider) = self.providers.get(interface).map(|p| p.value().clone()) else {
            tracing::warn!(request_id = header.request_id, interface, "No provider");
            return failure(ResponseHeader::with_code(
                &header,
                ResponseCode::NoProvider,
                NO_PROVIDER_MESSAGE,
            ));
        };

        let Some(handler) = provider.handler(method) else {
            tracing::warn!(
                request_id = header.request_id,
                interface,
                method,
                "No such method"
            );
            return failure(ResponseHeader::with_code(
                &header,
                ResponseCode::UnknownError,
                format!("no method `{method}` on `{interface}`"),
            ));
        };

        tracing::trace!(
            request_id = header.request_id,
            interface,
            method,
            "Dispatching request"
        );

        let arguments = rpc_request.serialized_arguments().to_vec();
        let serializers = self.serializers.clone();
        let outcome = AssertUnwindSafe(async move { handler(serializers, arguments).await })
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(payload)) => ResponseCommand::new(ResponseHeader::success(&header), payload),
            Ok(Err(err)) => {
                tracing::debug!(
                    request_id = header.request_id,
                    interface,
                    method,
                    error = %err,
                    "Handler failed"
                );
                failure(ResponseHeader::with_code(
                    &header,
                    ResponseCode::UnknownError,
                    err.to_string(),
                ))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(
                    request_id = header.request_id,
                    interface,
                    method,
                    %message,
                    "Handler panicked"
                );
                failure(ResponseHeader::with_code(
                    &header,
                    ResponseCode::UnknownError,
                    format!("handler panicked: {message}"),
                ))
            }
        }
    }

    /// Decodes one request frame, handles it, and returns the encoded response.
    ///
    /// Only a frame that is not a valid request command is an error; the
    /// server closes the connection in that case.
    pub async fn read_frame(&self, bytes: &[u8]) -> Result<Vec<u8>, RpcServiceEndpointError> {
        let request = CommandCodec::decode_request(bytes)?;
        let response = self.handle_request(request).await;
        Ok(CommandCodec::encode_response(&response))
    }

    fn validate(&self, provider: &ServiceProvider) -> Result<(), RpcServiceEndpointError> {
        let interface = provider.interface_name();

        if let Some(method) = provider.duplicate_methods.first() {
            return Err(RpcServiceEndpointError::DuplicateMethod {
                interface: interface.to_owned(),
                method: method.clone(),
            });
        }

        for (method, entry) in &provider.methods {
            if let Some(declared) = entry.declared_interface {
                if declared != interface {
                    return Err(RpcServiceEndpointError::InterfaceMismatch {
                        method: method.clone(),
                        expected: declared,
                        found: interface.to_owned(),
                    });
                }
            }

            if let Some(unsupported) = entry
                .required_types
                .iter()
                .find(|required| !self.serializers.supports_type(required.type_id))
            {
                return Err(RpcServiceEndpointError::UnsupportedSignature {
                    interface: interface.to_owned(),
                    method: method.clone(),
                    type_name: unsupported.type_name,
                });
            }
        }

        Ok(())
    }
}

fn failure(header: ResponseHeader) -> ResponseCommand {
    ResponseCommand::new(header, Vec::new())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}
