//! High-level service facade combining the catalog and the external ports.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::catalog::SourceCatalog;
use crate::geo::{NearestSource, is_within_any_source, location_label, nearest_source};
use crate::model::{GeoPoint, NewReading, Photo, Reading, ReadingQuery, SourceSummary, UserId, WaterSource};
use crate::ports::{ClassifierPort, PortError, ReadingPort};
use crate::quality::{confidence_to_quality, summarize_source};

#[derive(Debug, Clone, Copy, PartialEq)]
/// Every proximity view of a single point.
pub struct LocationReport<'catalog> {
    /// Name of the enclosing nearest source or `"Unknown Location"`.
    pub label: &'catalog str,
    /// Nearest source regardless of radius.
    pub nearest: Option<NearestSource<'catalog>>,
    /// First listed source whose radius contains the point.
    pub enclosing: Option<&'catalog WaterSource>,
}

/// Public entry point for overviews, logs, and submissions.
pub struct DropletService {
    catalog: Arc<SourceCatalog>,
    readings: Arc<dyn ReadingPort>,
    classifier: Option<Arc<dyn ClassifierPort>>,
}

impl DropletService {
    /// Create a new service over the given catalog and ports.
    #[must_use]
    pub fn new(
        catalog: Arc<SourceCatalog>,
        readings: Arc<dyn ReadingPort>,
        classifier: Option<Arc<dyn ClassifierPort>>,
    ) -> Self {
        Self {
            catalog,
            readings,
            classifier,
        }
    }

    /// Configured water sources in catalog order.
    #[must_use]
    pub fn sources(&self) -> &[WaterSource] {
        self.catalog.sources()
    }

    /// Whether photo submissions are possible.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.classifier.is_some()
    }

    /// One summary per water source, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the readings cannot be fetched.
    pub async fn overview(&self) -> Result<Vec<SourceSummary>, PortError> {
        let readings = self.readings.list(&ReadingQuery::all()).await?;
        debug!(count = readings.len(), "fetched readings for overview");

        Ok(self
            .sources()
            .iter()
            .map(|source| summarize_source(&readings, source))
            .collect())
    }

    /// Readings from every user, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the readings cannot be fetched.
    pub async fn all_readings(&self) -> Result<Vec<Reading>, PortError> {
        let readings = self.readings.list(&ReadingQuery::all()).await?;
        debug!(count = readings.len(), "fetched all readings");

        Ok(newest_first(readings))
    }

    /// Readings submitted by `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the readings cannot be fetched.
    pub async fn user_log(&self, user_id: &UserId) -> Result<Vec<Reading>, PortError> {
        let readings = self
            .readings
            .list(&ReadingQuery::for_user(user_id.clone()))
            .await?;
        debug!(count = readings.len(), user = %user_id, "fetched user log");

        Ok(newest_first(readings))
    }

    /// Label of a point: nearest enclosing source name or `"Unknown Location"`.
    #[must_use]
    pub fn label_for(&self, point: GeoPoint) -> &str {
        location_label(point, self.sources())
    }

    /// Nearest source, first enclosing source, and label for a point.
    #[must_use]
    pub fn locate(&self, point: GeoPoint) -> LocationReport<'_> {
        let sources = self.sources();
        LocationReport {
            label: location_label(point, sources),
            nearest: nearest_source(point, sources),
            enclosing: is_within_any_source(point, sources),
        }
    }

    /// Classify a photo taken at `point` and store it as a new reading.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::InvalidPhoto`] for an empty photo,
    /// [`PortError::OutsideWaterSource`] when `point` is not inside any
    /// source, [`PortError::ClassifierUnavailable`] without a classifier, or
    /// the error of the failing port call.
    pub async fn submit_photo(
        &self,
        user_id: &UserId,
        point: GeoPoint,
        photo: &Photo,
    ) -> Result<Reading, PortError> {
        if photo.bytes.is_empty() {
            return Err(PortError::InvalidPhoto);
        }

        let Some(source) = is_within_any_source(point, self.sources()) else {
            warn!(%point, "rejected submission outside every water source");
            return Err(PortError::OutsideWaterSource);
        };

        let classifier = self
            .classifier
            .as_ref()
            .ok_or(PortError::ClassifierUnavailable)?;
        let classification = classifier.classify(photo).await?;
        let quality_score = confidence_to_quality(classification.confidence);
        debug!(
            source = %source.name,
            confidence = classification.confidence,
            quality_score,
            "classified photo"
        );

        self.readings
            .submit(NewReading {
                user_id: user_id.clone(),
                latitude: point.latitude,
                longitude: point.longitude,
                quality_score,
                uploaded_at: Utc::now(),
            })
            .await
    }
}

fn newest_first(mut readings: Vec<Reading>) -> Vec<Reading> {
    readings.sort_by(|left, right| right.uploaded_at.cmp(&left.uploaded_at));
    readings
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::model::{Classification, Rgb};

    struct MemoryReadings {
        stored: Mutex<Vec<Reading>>,
    }

    impl MemoryReadings {
        fn with(readings: Vec<Reading>) -> Arc<Self> {
            Arc::new(Self {
                stored: Mutex::new(readings),
            })
        }
    }

    #[async_trait]
    impl ReadingPort for MemoryReadings {
        async fn list(&self, query: &ReadingQuery) -> Result<Vec<Reading>, PortError> {
            let stored = self.stored.lock().expect("lock");
            Ok(stored
                .iter()
                .filter(|reading| {
                    query
                        .user_id
                        .as_ref()
                        .is_none_or(|user| *user == reading.user_id)
                })
                .cloned()
                .collect())
        }

        async fn submit(&self, reading: NewReading) -> Result<Reading, PortError> {
            let mut stored = self.stored.lock().expect("lock");
            let saved = Reading {
                id: format!("droplet-{}", stored.len()),
                user_id: reading.user_id,
                latitude: reading.latitude,
                longitude: reading.longitude,
                quality_score: Some(reading.quality_score),
                uploaded_at: reading.uploaded_at,
            };
            stored.push(saved.clone());
            Ok(saved)
        }
    }

    struct FixedClassifier(f64);

    #[async_trait]
    impl ClassifierPort for FixedClassifier {
        async fn classify(&self, _photo: &Photo) -> Result<Classification, PortError> {
            Ok(Classification { confidence: self.0 })
        }
    }

    fn reading(user: &str, longitude: f64, score: f64, minutes: i64) -> Reading {
        let base = Utc
            .with_ymd_and_hms(2025, 6, 1, 8, 0, 0)
            .single()
            .expect("valid timestamp");
        Reading {
            id: format!("{user}-{minutes}"),
            user_id: UserId(user.to_owned()),
            latitude: 0.0,
            longitude,
            quality_score: Some(score),
            uploaded_at: base + Duration::minutes(minutes),
        }
    }

    fn catalog() -> Arc<SourceCatalog> {
        Arc::new(
            SourceCatalog::new(vec![
                WaterSource::new("North Lake", 0.0, 0.0, 200.0),
                WaterSource::new("South Lake", 0.0, 1.0, 200.0),
            ])
            .expect("valid catalog"),
        )
    }

    fn photo() -> Photo {
        Photo {
            file_name: "lake.jpg".to_owned(),
            bytes: vec![0xff, 0xd8, 0xff],
        }
    }

    #[tokio::test]
    async fn overview_summarises_every_source_in_order() {
        let store = MemoryReadings::with(vec![
            reading("ana", 0.0, 30.0, 0),
            reading("ben", 0.000_5, 70.0, 1),
        ]);
        let service = DropletService::new(catalog(), store, None);

        let overview = service.overview().await.expect("overview");
        assert_eq!(overview.len(), 2);

        let north = overview.first().expect("north summary");
        assert_eq!(north.source.name, "North Lake");
        assert_eq!(north.average, Some(50));
        assert_eq!(north.color, Some(Rgb::new(255, 255, 0)));
        assert_eq!(north.reading_count, 2);

        let south = overview.get(1).expect("south summary");
        assert_eq!(south.average, None);
        assert_eq!(south.color, None);
    }

    #[tokio::test]
    async fn user_log_is_filtered_and_newest_first() {
        let store = MemoryReadings::with(vec![
            reading("ana", 0.0, 30.0, 0),
            reading("ben", 0.0, 70.0, 5),
            reading("ana", 0.0, 40.0, 10),
        ]);
        let service = DropletService::new(catalog(), store, None);

        let log = service
            .user_log(&UserId("ana".to_owned()))
            .await
            .expect("user log");
        let ids: Vec<&str> = log.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, ["ana-10", "ana-0"]);
    }

    #[tokio::test]
    async fn all_readings_span_every_user_newest_first() {
        let store = MemoryReadings::with(vec![
            reading("ana", 0.0, 30.0, 0),
            reading("ben", 5.0, 70.0, 15),
            reading("ana", 0.0, 40.0, 10),
        ]);
        let service = DropletService::new(catalog(), store, None);

        let readings = service.all_readings().await.expect("all readings");
        let ids: Vec<&str> = readings.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, ["ben-15", "ana-10", "ana-0"], "unfiltered and newest first");
    }

    #[tokio::test]
    async fn locate_reports_all_proximity_views() {
        let service = DropletService::new(catalog(), MemoryReadings::with(Vec::new()), None);

        let inside = service.locate(GeoPoint::new(0.0, 0.001));
        assert_eq!(inside.label, "North Lake");
        assert_eq!(inside.enclosing.map(|source| source.name.as_str()), Some("North Lake"));

        let outside = service.locate(GeoPoint::new(0.0, 0.9));
        assert_eq!(outside.label, "Unknown Location");
        assert!(outside.enclosing.is_none(), "no enclosing source");
        assert_eq!(
            outside.nearest.map(|nearest| nearest.source.name.as_str()),
            Some("South Lake")
        );
    }

    #[tokio::test]
    async fn submission_scales_confidence_and_stores_reading() {
        let store = MemoryReadings::with(Vec::new());
        let service = DropletService::new(
            catalog(),
            Arc::clone(&store) as Arc<dyn ReadingPort>,
            Some(Arc::new(FixedClassifier(0.82)) as Arc<dyn ClassifierPort>),
        );

        let saved = service
            .submit_photo(&UserId("ana".to_owned()), GeoPoint::new(0.0, 1.0), &photo())
            .await
            .expect("submission");
        assert_eq!(saved.quality_score.map(f64::round), Some(82.0));
        assert_eq!(store.stored.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn submission_outside_sources_is_rejected() {
        let service = DropletService::new(
            catalog(),
            MemoryReadings::with(Vec::new()),
            Some(Arc::new(FixedClassifier(0.5)) as Arc<dyn ClassifierPort>),
        );

        let result = service
            .submit_photo(&UserId("ana".to_owned()), GeoPoint::new(5.0, 5.0), &photo())
            .await;
        assert!(matches!(result, Err(PortError::OutsideWaterSource)), "outside");
    }

    #[tokio::test]
    async fn submission_needs_photo_and_classifier() {
        let service = DropletService::new(catalog(), MemoryReadings::with(Vec::new()), None);
        assert!(!service.can_submit(), "no classifier configured");

        let empty = Photo {
            file_name: "empty.jpg".to_owned(),
            bytes: Vec::new(),
        };
        let user = UserId("ana".to_owned());
        let point = GeoPoint::new(0.0, 0.0);

        let result = service.submit_photo(&user, point, &empty).await;
        assert!(matches!(result, Err(PortError::InvalidPhoto)), "empty photo");

        let result = service.submit_photo(&user, point, &photo()).await;
        assert!(
            matches!(result, Err(PortError::ClassifierUnavailable)),
            "missing classifier"
        );
    }
}
