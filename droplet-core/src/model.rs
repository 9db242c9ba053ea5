//! Domain data structures for water sources, readings, and rendered summaries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Position in decimal degrees (WGS84).
pub struct GeoPoint {
    /// Latitude, positive north.
    pub latitude: f64,
    /// Longitude, positive east.
    pub longitude: f64,
}

impl GeoPoint {
    /// Construct a point from latitude and longitude.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Named circular zone around a lake or reservoir.
pub struct WaterSource {
    /// Display name.
    pub name: String,
    /// Centre latitude.
    pub latitude: f64,
    /// Centre longitude.
    pub longitude: f64,
    /// Proximity radius in metres.
    #[serde(alias = "radius")]
    pub radius_meters: f64,
}

impl WaterSource {
    /// Construct a zone.
    #[must_use]
    pub fn new<S: Into<String>>(name: S, latitude: f64, longitude: f64, radius_meters: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            radius_meters,
        }
    }

    /// Centre of the zone.
    #[must_use]
    pub const fn center(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier of a reporting user in the backend.
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One user-submitted water-quality data point ("droplet").
pub struct Reading {
    /// Droplet identifier.
    pub id: String,
    /// Submitting user.
    pub user_id: UserId,
    /// Latitude of the photo.
    pub latitude: f64,
    /// Longitude of the photo.
    pub longitude: f64,
    /// Quality estimate, nominally 0–100. Missing in malformed documents.
    pub quality_score: Option<f64>,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
}

impl Reading {
    /// Where the reading was taken.
    #[must_use]
    pub const fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Payload for a reading that has not been stored yet.
pub struct NewReading {
    /// Submitting user.
    pub user_id: UserId,
    /// Latitude of the photo.
    pub latitude: f64,
    /// Longitude of the photo.
    pub longitude: f64,
    /// Quality estimate, 0–100.
    pub quality_score: f64,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Selection of readings to fetch from the backend.
pub struct ReadingQuery {
    /// Restrict to one user's readings; `None` fetches everything.
    pub user_id: Option<UserId>,
}

impl ReadingQuery {
    /// Every reading in the collection.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Readings submitted by one user.
    #[must_use]
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// 8-bit RGB colour.
pub struct Rgb {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

impl Rgb {
    /// Construct a colour from its channels.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// `#rrggbb` form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "rgb({}, {}, {})", self.red, self.green, self.blue)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Aggregated state of one water source, ready for rendering.
pub struct SourceSummary {
    /// The zone being summarised.
    pub source: WaterSource,
    /// Rounded mean quality of readings inside the zone, `None` without data.
    pub average: Option<u8>,
    /// Colour of `average`; `None` exactly when `average` is.
    pub color: Option<Rgb>,
    /// Number of readings that fell inside the zone.
    pub reading_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Result returned by the photo classifier.
pub struct Classification {
    /// Raw classifier confidence, either a fraction or a percentage.
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Photo handed to the classifier.
pub struct Photo {
    /// File name reported to the endpoint.
    pub file_name: String,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}
