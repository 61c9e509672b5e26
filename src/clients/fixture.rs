use std::path::PathBuf;

use crate::error::FetchError;
use crate::models::resources::ResourceSnapshot;

const BUILTIN_SNAPSHOT: &str = include_str!("../../fixtures/mock_snapshot.json");

/// Where substitute data comes from when the live backend is unreachable.
#[derive(Debug, Clone, Default)]
pub enum FallbackSource {
    #[default]
    BuiltIn,
    File(PathBuf),
}

impl FallbackSource {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        path.map(FallbackSource::File).unwrap_or_default()
    }

    pub async fn load(&self) -> Result<ResourceSnapshot, FetchError> {
        match self {
            FallbackSource::BuiltIn => builtin_snapshot(),
            FallbackSource::File(path) => {
                let data = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| FetchError::Io {
                        path: path.clone(),
                        source,
                    })?;
                Ok(serde_json::from_str(&data)?)
            }
        }
    }
}

pub fn builtin_snapshot() -> Result<ResourceSnapshot, FetchError> {
    Ok(serde_json::from_str(BUILTIN_SNAPSHOT)?)
}
