#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Package sources: where the payload files of one install come from
//!
//! A source is a cursor over zero or more payloads. The installer owns it for
//! exactly one attempt, reads each selected payload once and closes it when
//! the attempt ends, whatever the result.

mod file;

pub use file::FileSource;

use async_trait::async_trait;
use sai_errors::Error;
use std::fmt;
use tokio::io::AsyncRead;

/// One-shot byte stream of the selected payload
pub type PayloadStream = Box<dyn AsyncRead + Send + Unpin>;

/// Declared size of a payload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadLength {
    Known(u64),
    /// Size could not be determined; such a payload must not be written
    Unknown,
}

impl PayloadLength {
    #[must_use]
    pub fn known(self) -> Option<u64> {
        match self {
            Self::Known(bytes) => Some(bytes),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for PayloadLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(bytes) => write!(f, "{bytes}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Ordered payloads of one installable application
#[async_trait]
pub trait PackageSource: Send {
    /// Advance to the next payload; `false` once exhausted
    async fn next_payload(&mut self) -> Result<bool, Error>;

    /// Size of the selected payload
    fn payload_length(&self) -> PayloadLength;

    /// Display name of the selected payload
    fn payload_name(&self) -> Option<&str>;

    /// Open the selected payload for reading
    async fn open_payload(&mut self) -> Result<PayloadStream, Error>;

    /// Implementation name, quoted in failure reports
    fn implementation_name(&self) -> &str;

    /// Release everything the source holds
    async fn close(&mut self) -> Result<(), Error>;
}

#[async_trait]
impl<T: PackageSource + ?Sized> PackageSource for Box<T> {
    async fn next_payload(&mut self) -> Result<bool, Error> {
        (**self).next_payload().await
    }

    fn payload_length(&self) -> PayloadLength {
        (**self).payload_length()
    }

    fn payload_name(&self) -> Option<&str> {
        (**self).payload_name()
    }

    async fn open_payload(&mut self) -> Result<PayloadStream, Error> {
        (**self).open_payload().await
    }

    fn implementation_name(&self) -> &str {
        (**self).implementation_name()
    }

    async fn close(&mut self) -> Result<(), Error> {
        (**self).close().await
    }
}
