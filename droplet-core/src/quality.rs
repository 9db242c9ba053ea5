//! Radius-bounded quality averages and the red-to-green score colour scale.

use crate::geo::distance_meters;
use crate::model::{Reading, Rgb, SourceSummary, WaterSource};

/// Lowest quality score.
pub const MIN_SCORE: f64 = 0.0;
/// Highest quality score.
pub const MAX_SCORE: f64 = 100.0;
/// Hue of a perfect score (green); a zero score has hue 0 (red).
pub const MAX_HUE: f64 = 120.0;

const SATURATION: f64 = 1.0;
const LIGHTNESS: f64 = 0.5;

/// Clamp a score into `[0, 100]`; `NaN` becomes 0.
#[must_use]
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        MIN_SCORE
    } else {
        score.clamp(MIN_SCORE, MAX_SCORE)
    }
}

/// Rounded mean quality of the readings that fall inside `source`.
///
/// Readings without a usable score are ignored, out-of-range scores are
/// clamped. `None` means no reading is inside the zone, which is distinct
/// from an average of zero.
#[must_use]
pub fn average_quality(readings: &[Reading], source: &WaterSource) -> Option<u8> {
    let (sum, count) = scores_inside(readings, source).fold((0.0, 0_u32), |(sum, count), score| {
        (sum + score, count + 1)
    });

    if count == 0 {
        return None;
    }

    Some(to_score_byte(sum / f64::from(count)))
}

/// Aggregate one zone for rendering: rounded average, its colour, and how
/// many readings contributed.
#[must_use]
pub fn summarize_source(readings: &[Reading], source: &WaterSource) -> SourceSummary {
    let reading_count = scores_inside(readings, source).count();
    let average = average_quality(readings, source);

    SourceSummary {
        source: source.clone(),
        average,
        color: average.map(|score| score_to_color(f64::from(score))),
        reading_count,
    }
}

/// Hue in degrees for a score: 0 at or below 0, 120 at or above 100.
#[must_use]
pub fn score_hue(score: f64) -> f64 {
    MAX_HUE * (clamp_score(score) / MAX_SCORE)
}

/// Colour for a score on a red (0) to green (100) HSL scale at full
/// saturation and 50% lightness.
#[must_use]
pub fn score_to_color(score: f64) -> Rgb {
    let hue = score_hue(score);

    let chroma = (1.0 - (2.0 * LIGHTNESS - 1.0).abs()) * SATURATION;
    let intermediate = chroma * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let match_value = LIGHTNESS - chroma / 2.0;

    let (red, green, blue) = if hue < 60.0 {
        (chroma, intermediate, 0.0)
    } else if hue < 120.0 {
        (intermediate, chroma, 0.0)
    } else {
        (0.0, chroma, intermediate)
    };

    Rgb::new(
        to_channel(red + match_value),
        to_channel(green + match_value),
        to_channel(blue + match_value),
    )
}

/// Map a classifier confidence onto the quality scale.
///
/// Values in `[0, 1]` are fractions and get scaled by 100, anything larger is
/// already a percentage. The result is clamped to `[0, 100]`.
#[must_use]
pub fn confidence_to_quality(confidence: f64) -> f64 {
    if confidence.is_nan() {
        return MIN_SCORE;
    }
    if confidence <= 1.0 {
        clamp_score(confidence * MAX_SCORE)
    } else {
        clamp_score(confidence)
    }
}

fn scores_inside<'readings>(
    readings: &'readings [Reading],
    source: &'readings WaterSource,
) -> impl Iterator<Item = f64> + 'readings {
    readings
        .iter()
        .filter(move |reading| {
            distance_meters(reading.position(), source.center()) <= source.radius_meters
        })
        .filter_map(|reading| reading.quality_score)
        .filter(|score| !score.is_nan())
        .map(clamp_score)
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped to 0..=100 and rounded first"
)]
fn to_score_byte(value: f64) -> u8 {
    clamp_score(value).round() as u8
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped to 0..=255 and rounded first"
)]
fn to_channel(unit: f64) -> u8 {
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}
