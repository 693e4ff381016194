use sentinels_setup::{DataLoader, SetupData};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads the card dataset from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileDataLoader {
    path: PathBuf,
}

impl FileDataLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataLoader for FileDataLoader {
    type Error = LoaderError;

    fn load_setup_data(&self) -> Result<SetupData, Self::Error> {
        let path = self.path.display().to_string();
        let json = std::fs::read_to_string(&self.path).map_err(|source| LoaderError::Io {
            path: path.clone(),
            source,
        })?;
        SetupData::from_json(&json).map_err(|source| LoaderError::Parse { path, source })
    }
}
