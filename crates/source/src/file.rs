//! Payloads read from local files

use async_trait::async_trait;
use sai_errors::{Error, SourceError};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::{PackageSource, PayloadLength, PayloadStream};

/// Local package files, installed together as one (possibly split) app
#[derive(Debug)]
pub struct FileSource {
    paths: Vec<PathBuf>,
    cursor: Option<usize>,
    length: PayloadLength,
    name: Option<String>,
    opened: bool,
}

impl FileSource {
    #[must_use]
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            cursor: None,
            length: PayloadLength::Unknown,
            name: None,
            opened: false,
        }
    }

    /// Every `*.apk` file directly inside `dir`, in file-name order
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed.
    pub async fn from_dir(dir: &Path) -> Result<Self, Error> {
        let listing_error = |e: std::io::Error| SourceError::DirectoryReadFailed {
            path: dir.display().to_string(),
            message: e.to_string(),
        };

        let mut entries = fs::read_dir(dir).await.map_err(listing_error)?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(listing_error)? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("apk")) {
                paths.push(path);
            }
        }
        paths.sort();
        debug!(dir = %dir.display(), count = paths.len(), "collected payloads");
        Ok(Self::new(paths))
    }

    /// Number of payloads this source will yield
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn current(&self) -> Option<&PathBuf> {
        self.cursor.and_then(|i| self.paths.get(i))
    }
}

#[async_trait]
impl PackageSource for FileSource {
    async fn next_payload(&mut self) -> Result<bool, Error> {
        let next = self.cursor.map_or(0, |i| i + 1);
        self.cursor = Some(next);
        self.opened = false;

        let Some(path) = self.paths.get(next) else {
            self.length = PayloadLength::Unknown;
            self.name = None;
            return Ok(false);
        };

        self.name = Some(
            path.file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
        );
        self.length = match fs::metadata(path).await {
            Ok(meta) if meta.is_file() => PayloadLength::Known(meta.len()),
            Ok(_) => PayloadLength::Unknown,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot stat payload");
                PayloadLength::Unknown
            }
        };
        Ok(true)
    }

    fn payload_length(&self) -> PayloadLength {
        self.length
    }

    fn payload_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    async fn open_payload(&mut self) -> Result<PayloadStream, Error> {
        let path = self.current().ok_or(SourceError::NoPayloadSelected)?.clone();
        let name = self.name.clone().unwrap_or_default();
        if self.opened {
            return Err(SourceError::AlreadyOpened { name }.into());
        }
        let file = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                SourceError::OpenFailed {
                    name,
                    message: e.to_string(),
                }
            }
        })?;
        self.opened = true;
        Ok(Box::new(file))
    }

    fn implementation_name(&self) -> &str {
        "FileSource"
    }

    async fn close(&mut self) -> Result<(), Error> {
        // Streams are owned by the shell once handed out; only the cursor remains.
        self.cursor = None;
        self.opened = false;
        Ok(())
    }
}
