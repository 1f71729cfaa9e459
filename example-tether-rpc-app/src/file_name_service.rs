use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tether_rpc_service::name_service::{NameService, NameServiceError};
use tokio::sync::Mutex;

pub const FILE_SCHEME: &str = "file";

/// Service name to the URIs registered for it, in registration order.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct Registrations(BTreeMap<String, Vec<String>>);

/// A name service backed by a JSON file on the local file system.
///
/// Suitable for a server and clients running on one machine. Access from this
/// process is serialized by an in-process lock; other processes are trusted to
/// not write concurrently. Writes go to a temporary file that is then renamed
/// over the data file, so readers never observe a partial write.
#[derive(Default)]
pub struct FileNameService {
    path: Mutex<Option<PathBuf>>,
}

impl FileNameService {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read(path: &Path) -> Result<Registrations, NameServiceError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Registrations::default()),
            Err(err) => return Err(err.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Registrations::default());
        }

        serde_json::from_slice(&bytes).map_err(|err| NameServiceError::Corrupt(err.to_string()))
    }

    async fn write(path: &Path, registrations: &Registrations) -> Result<(), NameServiceError> {
        let json = serde_json::to_vec_pretty(registrations)
            .map_err(|err| NameServiceError::Corrupt(err.to_string()))?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl NameService for FileNameService {
    fn supported_schemes(&self) -> &[&'static str] {
        &[FILE_SCHEME]
    }

    async fn connect(&self, name_service_uri: &str) -> Result<(), NameServiceError> {
        let path = file_uri_path(name_service_uri)?;
        tracing::debug!(path = %path.display(), "Using name service file");
        *self.path.lock().await = Some(path);
        Ok(())
    }

    async fn register_service(
        &self,
        service_name: &str,
        uri: &str,
    ) -> Result<(), NameServiceError> {
        let guard = self.path.lock().await;
        let path = guard.as_deref().ok_or(NameServiceError::NotConnected)?;

        let mut registrations = Self::read(path).await?;
        let uris = registrations.0.entry(service_name.to_owned()).or_default();
        if !uris.iter().any(|existing| existing == uri) {
            uris.push(uri.to_owned());
        }
        Self::write(path, &registrations).await?;

        tracing::info!(service = service_name, uri, "Registered service");
        Ok(())
    }

    async fn lookup_service(&self, service_name: &str) -> Result<Option<String>, NameServiceError> {
        let guard = self.path.lock().await;
        let path = guard.as_deref().ok_or(NameServiceError::NotConnected)?;

        let registrations = Self::read(path).await?;
        Ok(registrations
            .0
            .get(service_name)
            .and_then(|uris| uris.first().cloned()))
    }
}

/// Converts `file:///abs/path` (or `file:/abs/path`) into a path.
fn file_uri_path(uri: &str) -> Result<PathBuf, NameServiceError> {
    let invalid = || NameServiceError::InvalidUri(uri.to_owned());

    let (scheme, rest) = uri.split_once(':').ok_or_else(invalid)?;
    if !scheme.eq_ignore_ascii_case(FILE_SCHEME) {
        return Err(NameServiceError::UnsupportedScheme(scheme.to_owned()));
    }

    let path = match rest.strip_prefix("//") {
        // Only an empty or `localhost` authority refers to this machine.
        Some(after_authority) => match after_authority.find('/') {
            Some(0) => after_authority,
            Some(slash) if &after_authority[..slash] == "localhost" => &after_authority[slash..],
            _ => return Err(invalid()),
        },
        None => rest,
    };

    if path.is_empty() {
        return Err(invalid());
    }

    Ok(PathBuf::from(path))
}

/// Formats the `file://` URI of `path`.
pub fn file_uri(path: &Path) -> String {
    format!("{FILE_SCHEME}://{}", path.display())
}
