//! Immutable set of water-source zones, loaded once at startup.

use crate::config::ConfigError;
use crate::model::WaterSource;

/// Radius used by the built-in zones, in metres.
pub const DEFAULT_RADIUS_METERS: f64 = 800.0;

/// Validated, read-only list of water sources in configuration order.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceCatalog {
    sources: Vec<WaterSource>,
}

impl SourceCatalog {
    /// Build a catalog, rejecting zones that cannot take part in distance checks.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSource`] for a non-finite centre or a
    /// radius that is not a positive finite number.
    pub fn new(sources: Vec<WaterSource>) -> Result<Self, ConfigError> {
        if let Some(bad) = sources.iter().find(|source| !is_usable(source)) {
            return Err(ConfigError::InvalidSource(bad.name.clone()));
        }
        Ok(Self { sources })
    }

    /// Zones in configuration order.
    #[must_use]
    pub fn sources(&self) -> &[WaterSource] {
        &self.sources
    }

    /// Number of zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// No zones configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for SourceCatalog {
    /// The two lake zones around Danau Cipondoh shipped with the app.
    fn default() -> Self {
        Self {
            sources: vec![
                WaterSource::new("Danau Cipondoh", -6.197_983, 106.671_800, DEFAULT_RADIUS_METERS),
                WaterSource::new(
                    "Danau Cipondoh",
                    -6.201_386_7,
                    106.781_989_4,
                    DEFAULT_RADIUS_METERS,
                ),
            ],
        }
    }
}

fn is_usable(source: &WaterSource) -> bool {
    source.center().is_finite() && source.radius_meters.is_finite() && source.radius_meters > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_builtin_zones() {
        let catalog = SourceCatalog::default();
        assert_eq!(catalog.len(), 2);
        assert!(
            catalog
                .sources()
                .iter()
                .all(|source| source.name == "Danau Cipondoh"),
            "builtin names"
        );
    }

    #[test]
    fn rejects_non_positive_radius() {
        let result = SourceCatalog::new(vec![WaterSource::new("pond", 0.0, 0.0, 0.0)]);
        assert!(
            matches!(result, Err(ConfigError::InvalidSource(name)) if name == "pond"),
            "zero radius must be rejected"
        );
    }

    #[test]
    fn rejects_non_finite_centre() {
        let result = SourceCatalog::new(vec![WaterSource::new("lake", f64::NAN, 0.0, 10.0)]);
        assert!(result.is_err(), "NaN centre must be rejected");
    }

    #[test]
    fn keeps_order_and_allows_empty() {
        let catalog = SourceCatalog::new(vec![
            WaterSource::new("second", 1.0, 1.0, 10.0),
            WaterSource::new("first", 0.0, 0.0, 10.0),
        ])
        .expect("valid catalog");
        let names: Vec<&str> = catalog.sources().iter().map(|source| source.name.as_str()).collect();
        assert_eq!(names, ["second", "first"]);

        let empty = SourceCatalog::new(Vec::new()).expect("empty catalog");
        assert!(empty.is_empty(), "empty catalog is allowed");
    }
}
