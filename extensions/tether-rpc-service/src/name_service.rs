//! Contract for the name service that maps a service name to the address of a
//! server providing it.
//!
//! The framework core never talks to a concrete backend. Applications hand a
//! [`NameServiceRegistry`] the backends they want to support, and a backend is
//! picked by the scheme of the name-service URI (`file:///tmp/names.data`,
//! `zk://...`, and so on).

use crate::RPC_URI_SCHEME;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NameServiceError {
    #[error("no name service supports scheme `{0}`")]
    UnsupportedScheme(String),

    #[error("invalid URI `{0}`")]
    InvalidUri(String),

    #[error("name service is not connected")]
    NotConnected,

    #[error("name service data is corrupt: {0}")]
    Corrupt(String),

    #[error("name service I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A name-service backend.
#[async_trait]
pub trait NameService: Send + Sync {
    /// URI schemes this backend understands.
    fn supported_schemes(&self) -> &[&'static str];

    /// Binds the backend to the name-service instance at `name_service_uri`.
    async fn connect(&self, name_service_uri: &str) -> Result<(), NameServiceError>;

    /// Publishes `uri` as an address of `service_name`. Used by servers.
    async fn register_service(
        &self,
        service_name: &str,
        uri: &str,
    ) -> Result<(), NameServiceError>;

    /// Looks up an address of `service_name`. Used by clients.
    ///
    /// Returns `Ok(None)` if nothing is registered under that name.
    async fn lookup_service(&self, service_name: &str) -> Result<Option<String>, NameServiceError>;
}

/// The set of name-service backends available to the process.
///
/// Built once at startup from an explicit list.
#[derive(Default, Clone)]
pub struct NameServiceRegistry {
    backends: Vec<Arc<dyn NameService>>,
}

impl NameServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: Arc<dyn NameService>) -> Self {
        self.backends.push(backend);
        self
    }

    /// Selects the first backend supporting the scheme of `name_service_uri`,
    /// connects it, and returns it.
    pub async fn get_name_service(
        &self,
        name_service_uri: &str,
    ) -> Result<Arc<dyn NameService>, NameServiceError> {
        let scheme = uri_scheme(name_service_uri)
            .ok_or_else(|| NameServiceError::InvalidUri(name_service_uri.to_owned()))?;

        let backend = self
            .backends
            .iter()
            .find(|backend| {
                backend
                    .supported_schemes()
                    .iter()
                    .any(|supported| supported.eq_ignore_ascii_case(scheme))
            })
            .cloned()
            .ok_or_else(|| NameServiceError::UnsupportedScheme(scheme.to_owned()))?;

        backend.connect(name_service_uri).await?;
        tracing::info!(uri = name_service_uri, scheme, "Connected name service");

        Ok(backend)
    }
}

/// Returns the scheme of `uri` (the part before the first `:`), if it is a
/// syntactically valid scheme.
pub fn uri_scheme(uri: &str) -> Option<&str> {
    let (scheme, _) = uri.split_once(':')?;
    let mut chars = scheme.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());

    (starts_with_letter && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')))
        .then_some(scheme)
}

/// Formats the address a server publishes for its services.
pub fn rpc_uri(addr: SocketAddr) -> String {
    format!("{RPC_URI_SCHEME}://{addr}")
}

/// Extracts `host:port` from an `rpc://host:port` URI.
pub fn rpc_uri_authority(uri: &str) -> Result<&str, NameServiceError> {
    let invalid = || NameServiceError::InvalidUri(uri.to_owned());

    match uri_scheme(uri) {
        Some(scheme) if scheme.eq_ignore_ascii_case(RPC_URI_SCHEME) => {}
        Some(scheme) => return Err(NameServiceError::UnsupportedScheme(scheme.to_owned())),
        None => return Err(invalid()),
    }

    let authority = uri[RPC_URI_SCHEME.len() + 1..]
        .strip_prefix("//")
        .ok_or_else(invalid)?
        .trim_end_matches('/');

    if authority.is_empty() || !authority.contains(':') {
        return Err(invalid());
    }

    Ok(authority)
}
