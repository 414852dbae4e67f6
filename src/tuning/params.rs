use serde::{Deserialize, Serialize};

use crate::config::tuner::{Bound, SearchSpace};

/// Number of tuned dimensions: hidden_dim, num_layers, learning_rate.
pub const N_DIMS: usize = 3;

/// A raw proposal in original units, before truncation.
pub type Point = [f64; N_DIMS];

/// Hyperparameters as actually used to build a model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperParams {
    pub hidden_dim: usize,
    pub num_layers: usize,
    pub learning_rate: f64,
}

impl HyperParams {
    /// Integer dimensions are truncated toward zero, then everything is clamped
    /// to its bound. The top integer is only reached at the upper bound itself.
    pub fn from_point(point: &Point, space: &SearchSpace) -> Self {
        let trunc_clamp = |v: f64, b: &Bound| b.clamp(v.trunc());
        Self {
            hidden_dim: trunc_clamp(point[0], &space.hidden_dim) as usize,
            num_layers: trunc_clamp(point[1], &space.num_layers) as usize,
            learning_rate: space.learning_rate.clamp(point[2]),
        }
    }
}

pub fn point_to_unit(point: &Point, space: &SearchSpace) -> Point {
    [
        space.hidden_dim.to_unit(point[0]),
        space.num_layers.to_unit(point[1]),
        space.learning_rate.to_unit(point[2]),
    ]
}

pub fn point_from_unit(unit: &Point, space: &SearchSpace) -> Point {
    [
        space.hidden_dim.from_unit(unit[0]),
        space.num_layers.from_unit(unit[1]),
        space.learning_rate.from_unit(unit[2]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TUNER;

    #[test]
    fn test_truncation_and_clamping() {
        let space = &TUNER.space;
        let p = HyperParams::from_point(&[0.2, 5.6, 0.5], space);
        assert_eq!(p.hidden_dim, 1);
        assert_eq!(p.num_layers, 5);
        assert_eq!(p.learning_rate, 0.01);

        let p = HyperParams::from_point(&[49.5, 4.9, 0.003], space);
        assert_eq!(p.hidden_dim, 49);
        assert_eq!(p.num_layers, 4);
        assert_eq!(p.learning_rate, 0.003);
    }

    #[test]
    fn test_top_integer_only_at_upper_bound() {
        let space = &TUNER.space;
        let p = HyperParams::from_point(&[99.99, 4.999, 0.001], space);
        assert_eq!(p.hidden_dim, 99);
        assert_eq!(p.num_layers, 4);

        let p = HyperParams::from_point(&[100.0, 5.0, 0.001], space);
        assert_eq!(p.hidden_dim, 100);
        assert_eq!(p.num_layers, 5);
    }

    #[test]
    fn test_unit_mapping_inverts() {
        let space = &TUNER.space;
        let point = [37.0, 3.0, 0.004];
        let back = point_from_unit(&point_to_unit(&point, space), space);
        for (a, b) in point.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}
