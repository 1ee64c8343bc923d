//! Caret-topology classifier.
//!
//! A right-pointing caret's middle vertex sits further right than its top
//! and bottom vertices; a left-pointing caret is the mirror image. That
//! holds across icon restylings as long as the two-segment caret topology
//! survives, so the verdict compares mean x-positions of the mid-band and
//! extreme-band vertices instead of matching exact path data.

use gallerypilot_core_types::Direction;

use crate::errors::ProbeError;
use crate::path::{absolute_coordinates, Point};

/// Classify a vertex cloud. The mid band is the central 50% of the y-range;
/// a shape with an empty band on either side is not caret-like.
pub fn classify(points: &[Point]) -> Direction {
    let Some(first) = points.first() else {
        return Direction::Neutral;
    };

    let mut y_min = first.y;
    let mut y_max = first.y;
    for point in points {
        y_min = y_min.min(point.y);
        y_max = y_max.max(point.y);
    }
    let height = y_max - y_min;
    let band_low = y_min + 0.25 * height;
    let band_high = y_min + 0.75 * height;

    let (mut mid_sum, mut mid_count) = (0.0_f64, 0_usize);
    let (mut extreme_sum, mut extreme_count) = (0.0_f64, 0_usize);
    for point in points {
        if point.y < band_low || point.y > band_high {
            extreme_sum += point.x;
            extreme_count += 1;
        } else {
            mid_sum += point.x;
            mid_count += 1;
        }
    }
    if mid_count == 0 || extreme_count == 0 {
        return Direction::Neutral;
    }

    let mid_mean = mid_sum / mid_count as f64;
    let extreme_mean = extreme_sum / extreme_count as f64;
    if mid_mean < extreme_mean {
        Direction::Left
    } else if mid_mean > extreme_mean {
        Direction::Right
    } else {
        Direction::Neutral
    }
}

/// Full probe: tokenize, evaluate, classify one icon's path data.
pub fn arrow_direction(data: &str) -> Result<Direction, ProbeError> {
    Ok(classify(&absolute_coordinates(data)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_carets_classify_by_direction() {
        assert_eq!(
            arrow_direction("M15.41 16.09l-4.58-4.59 4.58-4.59L14 5.5l-6 6 6 6z").unwrap(),
            Direction::Left
        );
        assert_eq!(
            arrow_direction("M8.59 16.34l4.58-4.59-4.58-4.59L10 5.75l6 6-6 6z").unwrap(),
            Direction::Right
        );
    }

    #[test]
    fn flat_shape_is_neutral() {
        // All vertices share one y-value: every point lands in the mid band.
        assert_eq!(arrow_direction("M0 5L4 5 8 5z").unwrap(), Direction::Neutral);
    }

    #[test]
    fn empty_input_is_neutral() {
        assert_eq!(classify(&[]), Direction::Neutral);
    }

    #[test]
    fn symmetric_diamond_is_neutral() {
        // Mid and extreme means coincide on a vertically symmetric diamond.
        assert_eq!(
            arrow_direction("M5 0L10 5 5 10 0 5z").unwrap(),
            Direction::Neutral
        );
    }

    #[test]
    fn parse_failures_propagate() {
        assert!(arrow_direction("L1").is_err());
    }
}
