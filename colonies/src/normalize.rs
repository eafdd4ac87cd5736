//! Unit scaling and translation of raw positions.
//!
//! Clustering is translation invariant, so the policy only affects how
//! coordinates read in plots and persisted centroids.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;

/// How scaled positions are translated before analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationPolicy {
    /// Keep scaled coordinates as they are.
    None,
    /// Translate so the smallest x and smallest y become zero.
    #[default]
    ShiftToOrigin,
}

/// Positions after scaling and translation.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPositions {
    pub positions: Vec<DVec2>,
    /// Translation added after scaling. `raw * scale + offset == position`.
    pub offset: DVec2,
}

/// Scale raw positions by `unit_scale`, then translate per `policy`.
pub fn normalize(raw: &[DVec2], unit_scale: f64, policy: NormalizationPolicy) -> NormalizedPositions {
    let scaled: Vec<DVec2> = raw.iter().map(|p| *p * unit_scale).collect();
    let offset = offset_for(&scaled, policy);
    NormalizedPositions {
        positions: scaled.iter().map(|p| *p + offset).collect(),
        offset,
    }
}

/// Translation that `policy` applies to already-scaled positions.
fn offset_for(scaled: &[DVec2], policy: NormalizationPolicy) -> DVec2 {
    match policy {
        NormalizationPolicy::None => DVec2::ZERO,
        NormalizationPolicy::ShiftToOrigin => Bounds::from_points(scaled)
            .map(|b| -b.min)
            .unwrap_or(DVec2::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_without_translation() {
        let raw = [DVec2::new(100.0, -50.0), DVec2::new(20.0, 10.0)];
        let result = normalize(&raw, 0.1, NormalizationPolicy::None);
        assert_eq!(result.offset, DVec2::ZERO);
        assert!(result.positions[0].abs_diff_eq(DVec2::new(10.0, -5.0), 1e-12));
        assert!(result.positions[1].abs_diff_eq(DVec2::new(2.0, 1.0), 1e-12));
    }

    #[test]
    fn test_shift_to_origin_makes_coordinates_non_negative() {
        let raw = [
            DVec2::new(-30.0, 40.0),
            DVec2::new(10.0, -20.0),
            DVec2::new(0.0, 0.0),
        ];
        let result = normalize(&raw, 1.0, NormalizationPolicy::ShiftToOrigin);

        assert_eq!(result.offset, DVec2::new(30.0, 20.0));
        for p in &result.positions {
            assert!(p.x >= 0.0 && p.y >= 0.0);
        }
        let min = Bounds::from_points(&result.positions).unwrap().min;
        assert_eq!(min, DVec2::ZERO);
    }

    #[test]
    fn test_offset_relation_holds() {
        let raw = [DVec2::new(13.0, 27.0), DVec2::new(-7.0, 5.0)];
        let result = normalize(&raw, 0.1, NormalizationPolicy::ShiftToOrigin);
        for (r, p) in raw.iter().zip(&result.positions) {
            assert!((*r * 0.1 + result.offset).abs_diff_eq(*p, 1e-12));
        }
    }

    #[test]
    fn test_order_preserved() {
        let raw = [DVec2::new(5.0, 1.0), DVec2::new(1.0, 5.0), DVec2::new(3.0, 3.0)];
        let result = normalize(&raw, 2.0, NormalizationPolicy::ShiftToOrigin);
        assert_eq!(
            result.positions,
            vec![DVec2::new(8.0, 0.0), DVec2::new(0.0, 8.0), DVec2::new(4.0, 4.0)]
        );
    }

    #[test]
    fn test_empty_input() {
        let result = normalize(&[], 0.1, NormalizationPolicy::ShiftToOrigin);
        assert!(result.positions.is_empty());
        assert_eq!(result.offset, DVec2::ZERO);
    }
}
