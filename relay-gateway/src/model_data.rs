//! Static model-data resource served to the optimizer.

use std::io::ErrorKind;
use std::path::Path;

use crate::error::GatewayError;

/// Read the YAML resource at `path` and return it re-serialized.
///
/// A document that does not parse is an error; it is never served as-is.
///
/// # Errors
/// Returns [`GatewayError::ResourceNotFound`] if the file does not exist and
/// [`GatewayError::ModelData`] for any other read or parse failure.
pub async fn load(path: &Path) -> Result<String, GatewayError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            GatewayError::ResourceNotFound(path.to_owned())
        } else {
            GatewayError::ModelData(e.to_string())
        }
    })?;

    let document: serde_yaml::Value =
        serde_yaml::from_str(&text).map_err(|e| GatewayError::ModelData(e.to_string()))?;

    serde_yaml::to_string(&document).map_err(|e| GatewayError::ModelData(e.to_string()))
}
