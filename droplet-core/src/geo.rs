//! Great-circle distance and water-source proximity checks.
//!
//! Two membership rules coexist and are exposed under distinct names:
//! [`is_within_any_source`] returns the first listed zone that encloses the
//! point, [`location_label`] names the nearest zone if it encloses the point.
//! With overlapping zones the two can disagree.

use crate::model::{GeoPoint, WaterSource};

/// Mean Earth radius used by the Haversine formula, in metres.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Label used when a point is not inside its nearest water source.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

#[derive(Debug, Clone, Copy, PartialEq)]
/// Closest water source to a point together with the distance to its centre.
pub struct NearestSource<'source> {
    /// The closest zone.
    pub source: &'source WaterSource,
    /// Distance from the point to the zone centre, in metres.
    pub distance_meters: f64,
}

impl NearestSource<'_> {
    /// The point lies inside the zone's radius.
    #[must_use]
    pub fn is_inside(&self) -> bool {
        self.distance_meters <= self.source.radius_meters
    }
}

/// Haversine distance between two points, in metres.
///
/// Non-finite coordinates yield `NaN`, which never compares as inside a radius.
#[must_use]
pub fn distance_meters(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat_from = from.latitude.to_radians();
    let lat_to = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let half_chord = (delta_lat / 2.0).sin().powi(2)
        + lat_from.cos() * lat_to.cos() * (delta_lon / 2.0).sin().powi(2);
    // rounding can push the chord a hair past 1 for antipodal points
    let angle = 2.0 * half_chord.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_METERS * angle
}

/// Nearest water source to `point`.
///
/// Ties resolve to the earliest source in input order. Sources whose distance
/// cannot be computed are skipped; `None` means the location is unknown.
#[must_use]
pub fn nearest_source(point: GeoPoint, sources: &[WaterSource]) -> Option<NearestSource<'_>> {
    let mut nearest: Option<NearestSource<'_>> = None;

    for source in sources {
        let distance = distance_meters(point, source.center());
        if distance.is_nan() {
            continue;
        }
        let closer = nearest
            .as_ref()
            .is_none_or(|best| distance < best.distance_meters);
        if closer {
            nearest = Some(NearestSource {
                source,
                distance_meters: distance,
            });
        }
    }

    nearest
}

/// First source, in input order, whose radius contains `point`.
///
/// This is a short-circuit scan, not a nearest-zone search: with overlapping
/// zones the earlier entry wins even when a later one is closer.
#[must_use]
pub fn is_within_any_source(point: GeoPoint, sources: &[WaterSource]) -> Option<&WaterSource> {
    sources
        .iter()
        .find(|source| distance_meters(point, source.center()) <= source.radius_meters)
}

/// Name of the nearest source when `point` lies inside it, [`UNKNOWN_LOCATION`] otherwise.
#[must_use]
pub fn location_label(point: GeoPoint, sources: &[WaterSource]) -> &str {
    match nearest_source(point, sources) {
        Some(nearest) if nearest.is_inside() => nearest.source.name.as_str(),
        _ => UNKNOWN_LOCATION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_zones() -> Vec<WaterSource> {
        vec![
            WaterSource::new("A", 0.0, 0.0, 100.0),
            WaterSource::new("B", 0.0, 0.01, 100.0),
        ]
    }

    #[test]
    fn distance_to_self_is_zero() {
        let point = GeoPoint::new(-6.197_983, 106.671_8);
        assert!(distance_meters(point, point).abs() < f64::EPSILON, "self distance");
    }

    #[test]
    fn distance_is_symmetric() {
        let first = GeoPoint::new(-6.197_983, 106.671_8);
        let second = GeoPoint::new(-6.201_386_7, 106.781_989_4);
        let there = distance_meters(first, second);
        let back = distance_meters(second, first);
        assert!((there - back).abs() < 1e-9, "{there} vs {back}");
    }

    #[test]
    fn hundredth_degree_of_latitude_is_about_1111_meters() {
        let distance = distance_meters(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.01, 0.0));
        assert!((distance - 1_111.0).abs() < 11.11, "got {distance}");
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let distance = distance_meters(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_METERS;
        assert!((distance - half_circumference).abs() < 1.0, "got {distance}");
    }

    #[test]
    fn non_finite_point_gives_nan_distance() {
        let distance = distance_meters(GeoPoint::new(f64::NAN, 0.0), GeoPoint::new(0.0, 0.0));
        assert!(distance.is_nan(), "expected NaN, got {distance}");
    }

    #[test]
    fn nearest_of_empty_list_is_none() {
        assert!(nearest_source(GeoPoint::new(0.0, 0.0), &[]).is_none(), "empty sources");
    }

    #[test]
    fn nearest_picks_the_closer_zone() {
        let sources = two_zones();
        let nearest = nearest_source(GeoPoint::new(0.0, 0.001), &sources);
        assert_eq!(nearest.map(|found| found.source.name.as_str()), Some("A"));
    }

    #[test]
    fn nearest_tie_goes_to_first_listed() {
        let sources = vec![
            WaterSource::new("west", 0.0, -0.01, 100.0),
            WaterSource::new("east", 0.0, 0.01, 100.0),
        ];
        let nearest = nearest_source(GeoPoint::new(0.0, 0.0), &sources);
        assert_eq!(nearest.map(|found| found.source.name.as_str()), Some("west"));
    }

    #[test]
    fn nearest_of_nan_point_is_none() {
        let sources = two_zones();
        assert!(
            nearest_source(GeoPoint::new(f64::NAN, f64::NAN), &sources).is_none(),
            "NaN point has no nearest source"
        );
    }

    #[test]
    fn within_any_source_prefers_first_listed_over_closer() {
        let sources = vec![
            WaterSource::new("big", 0.0, 0.0, 5_000.0),
            WaterSource::new("small", 0.0, 0.02, 500.0),
        ];
        // ~2.1 km from "big", ~110 m from "small"
        let point = GeoPoint::new(0.0, 0.019);
        let matched = is_within_any_source(point, &sources);
        assert_eq!(matched.map(|source| source.name.as_str()), Some("big"));
        assert_eq!(location_label(point, &sources), "small");
    }

    #[test]
    fn within_any_source_misses_outside_every_radius() {
        let sources = two_zones();
        assert!(
            is_within_any_source(GeoPoint::new(1.0, 1.0), &sources).is_none(),
            "point far from every zone"
        );
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let centre = GeoPoint::new(0.0, 0.0);
        let edge = GeoPoint::new(0.0, 0.005);
        let radius = distance_meters(edge, centre);
        let sources = vec![WaterSource::new("edge", 0.0, 0.0, radius)];
        assert!(is_within_any_source(edge, &sources).is_some(), "boundary counts as inside");
    }

    #[test]
    fn label_names_enclosing_nearest_source() {
        let sources = two_zones();
        assert_eq!(location_label(GeoPoint::new(0.0, 0.000_5), &sources), "A");
    }

    #[test]
    fn label_is_unknown_outside_nearest_radius() {
        let sources = two_zones();
        assert_eq!(location_label(GeoPoint::new(0.0, 0.005), &sources), UNKNOWN_LOCATION);
        assert_eq!(location_label(GeoPoint::new(0.0, 0.0), &[]), UNKNOWN_LOCATION);
    }
}
