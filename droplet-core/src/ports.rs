//! Traits describing the external collaborators and their shared error type.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::{Classification, NewReading, Photo, Reading, ReadingQuery};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to the backend or the classifier.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
    /// Backend answered with an error status.
    #[error("Backend error {status}: {message}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Message reported by the backend.
        message: String,
    },
    /// The photo is empty or unreadable.
    #[error("Invalid photo")]
    InvalidPhoto,
    /// No classifier endpoint is configured.
    #[error("No classifier configured")]
    ClassifierUnavailable,
    /// The submission is not inside any known water source.
    #[error("Location is not inside any known water source")]
    OutsideWaterSource,
    /// Internal adapter error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[async_trait]
/// Document store holding the readings.
pub trait ReadingPort: Send + Sync {
    /// Fetch a snapshot of the readings matching `query`.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the backend request fails.
    async fn list(&self, query: &ReadingQuery) -> Result<Vec<Reading>, PortError>;

    /// Store a new reading and return it as persisted.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the backend rejects the document.
    async fn submit(&self, reading: NewReading) -> Result<Reading, PortError>;
}

#[async_trait]
/// Image classifier estimating water quality from a photo.
pub trait ClassifierPort: Send + Sync {
    /// Classify one photo.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails or the answer is malformed.
    async fn classify(&self, photo: &Photo) -> Result<Classification, PortError>;
}
