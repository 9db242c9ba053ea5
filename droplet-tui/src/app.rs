use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use droplet_core::{
    model::{GeoPoint, Reading, SourceSummary, UserId},
    service::DropletService,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Overview,
    Readings,
    Log,
    Locate,
    Submit,
}

impl Screen {
    pub(crate) const ALL: [Self; 5] = [
        Self::Overview,
        Self::Readings,
        Self::Log,
        Self::Locate,
        Self::Submit,
    ];

    pub(crate) fn title(self) -> &'static str {
        match self {
            Self::Overview => "Sources",
            Self::Readings => "All readings",
            Self::Log => "My log",
            Self::Locate => "Locate",
            Self::Submit => "Submit",
        }
    }

    pub(crate) fn next(self) -> Self {
        match self {
            Self::Overview => Self::Readings,
            Self::Readings => Self::Log,
            Self::Log => Self::Locate,
            Self::Locate => Self::Submit,
            Self::Submit => Self::Overview,
        }
    }

    /// Screens backed by fetched readings.
    pub(crate) fn shows_data(self) -> bool {
        matches!(self, Self::Overview | Self::Readings | Self::Log)
    }

    /// Screens where printable keys go into a text field.
    pub(crate) fn takes_text(self) -> bool {
        matches!(self, Self::Locate | Self::Submit)
    }
}

/// Owned copy of a proximity report so it can outlive the borrow of the service.
#[derive(Debug, Clone)]
pub(crate) struct Located {
    pub point: GeoPoint,
    pub label: String,
    pub nearest: Option<(String, f64, bool)>,
    pub enclosing: Option<String>,
}

pub(crate) struct App {
    pub service: Arc<DropletService>,
    pub user_id: Option<UserId>,
    pub refresh_interval: Duration,
    pub last_refresh: Option<Instant>,

    pub screen: Screen,

    pub summaries: Vec<SourceSummary>,
    pub summary_index: usize,

    pub readings: Vec<Reading>,
    pub readings_index: usize,

    pub log: Vec<Reading>,
    pub log_index: usize,

    pub locate_input: String,
    pub located: Option<Located>,

    pub submit_input: String,
    pub last_submission: Option<Reading>,

    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(
        service: Arc<DropletService>,
        user_id: Option<UserId>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            service,
            user_id,
            refresh_interval,
            last_refresh: None,
            screen: Screen::Overview,
            summaries: Vec::new(),
            summary_index: 0,
            readings: Vec::new(),
            readings_index: 0,
            log: Vec::new(),
            log_index: 0,
            locate_input: String::new(),
            located: None,
            submit_input: String::new(),
            last_submission: None,
            is_loading: false,
            error_message: None,
        }
    }

    /// Data screens are re-fetched once the refresh interval has passed.
    pub(crate) fn refresh_due(&self, now: Instant) -> bool {
        self.screen.shows_data()
            && self
                .last_refresh
                .is_none_or(|last| now.duration_since(last) >= self.refresh_interval)
    }

    pub(crate) fn locate_current_input(&mut self) -> bool {
        let Some(point) = parse_point(&self.locate_input) else {
            return false;
        };
        let report = self.service.locate(point);
        self.located = Some(Located {
            point,
            label: report.label.to_owned(),
            nearest: report.nearest.map(|nearest| {
                (
                    nearest.source.name.clone(),
                    nearest.distance_meters,
                    nearest.is_inside(),
                )
            }),
            enclosing: report.enclosing.map(|source| source.name.clone()),
        });
        true
    }

    pub(crate) fn label_for(&self, reading: &Reading) -> &str {
        self.service.label_for(reading.position())
    }

    pub(crate) fn clamp_indices(&mut self) {
        self.summary_index = self.summary_index.min(self.summaries.len().saturating_sub(1));
        self.readings_index = self.readings_index.min(self.readings.len().saturating_sub(1));
        self.log_index = self.log_index.min(self.log.len().saturating_sub(1));
    }
}

/// Parse `"lat, lon"` or `"lat lon"`.
pub(crate) fn parse_point(input: &str) -> Option<GeoPoint> {
    let mut parts = input
        .split(|ch: char| ch == ',' || ch.is_whitespace())
        .filter(|part| !part.is_empty());
    let latitude = parts.next()?.parse::<f64>().ok()?;
    let longitude = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let point = GeoPoint::new(latitude, longitude);
    point.is_finite().then_some(point)
}

/// Parse `"lat lon path/to/photo.jpg"`; the path may contain spaces.
pub(crate) fn parse_submission(input: &str) -> Option<(GeoPoint, String)> {
    let trimmed = input.trim();
    let (latitude, rest) = trimmed.split_once(|ch: char| ch == ',' || ch.is_whitespace())?;
    let rest = rest.trim_start_matches(|ch: char| ch == ',' || ch.is_whitespace());
    let (longitude, path) = rest.split_once(char::is_whitespace)?;
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    let point = parse_point(&format!("{latitude} {longitude}"))?;
    Some((point, path.to_owned()))
}

/// App over the default catalog with an empty reading store.
#[cfg(test)]
pub(crate) fn test_app(screen: Screen) -> App {
    use async_trait::async_trait;
    use droplet_core::{
        catalog::SourceCatalog,
        model::{NewReading, ReadingQuery},
        ports::{PortError, ReadingPort},
    };

    struct NoReadings;

    #[async_trait]
    impl ReadingPort for NoReadings {
        async fn list(&self, _query: &ReadingQuery) -> Result<Vec<Reading>, PortError> {
            Ok(Vec::new())
        }

        async fn submit(&self, _reading: NewReading) -> Result<Reading, PortError> {
            Err(PortError::Internal("read only".to_owned()))
        }
    }

    let service = DropletService::new(
        Arc::new(SourceCatalog::default()),
        Arc::new(NoReadings),
        None,
    );
    let mut app = App::new(Arc::new(service), None, Duration::from_secs(10));
    app.screen = screen;
    app
}
