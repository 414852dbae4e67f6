use anyhow::{Result, bail};

use crate::config::TRAINING;
use crate::models::FeatureMatrix;
use crate::utils::maths_utils::get_min_max;

/// Per-column min-max scaler mapping the fitted range onto [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    mins: Vec<f64>,
    ranges: Vec<f64>,
}

impl MinMaxScaler {
    /// Constant columns get a unit range so they scale to zero instead of dividing by zero.
    pub fn fit(matrix: &FeatureMatrix) -> Result<Self> {
        if matrix.is_empty() {
            bail!("Cannot fit a scaler on an empty matrix");
        }
        let (mins, ranges) = (0..matrix.n_cols())
            .map(|col| {
                let (min, max) = get_min_max(&matrix.column(col));
                let range = max - min;
                (min, if range > 0.0 { range } else { 1.0 })
            })
            .unzip();
        Ok(Self { mins, ranges })
    }

    pub fn n_features(&self) -> usize {
        self.mins.len()
    }

    pub fn transform_row(&self, src: &[f64], dst: &mut [f64]) {
        for (i, (s, d)) in src.iter().zip(dst.iter_mut()).enumerate() {
            *d = (s - self.mins[i]) / self.ranges[i];
        }
    }

    pub fn inverse_row(&self, src: &[f64], dst: &mut [f64]) {
        for (i, (s, d)) in src.iter().zip(dst.iter_mut()).enumerate() {
            *d = s * self.ranges[i] + self.mins[i];
        }
    }

    pub fn transform(&self, matrix: &FeatureMatrix) -> FeatureMatrix {
        matrix.map_rows(|src, dst| self.transform_row(src, dst))
    }

    pub fn inverse_transform(&self, matrix: &FeatureMatrix) -> FeatureMatrix {
        matrix.map_rows(|src, dst| self.inverse_row(src, dst))
    }

    /// Inverse of a single scaled row (e.g. one model prediction).
    pub fn inverse_vec(&self, scaled: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; scaled.len()];
        self.inverse_row(scaled, &mut out);
        out
    }
}

/// Chronological train/validation split with the scaler fit on training rows only.
#[derive(Debug, Clone)]
pub struct NormalizedSplit {
    pub train_scaled: FeatureMatrix,
    pub valid_scaled: FeatureMatrix,
    pub train_original: FeatureMatrix,
    pub valid_original: FeatureMatrix,
    pub scaler: MinMaxScaler,
}

/// (n_train, n_valid) for `n_rows`; validation gets floor(pct%) and training the rest.
pub fn split_counts(n_rows: usize, validation_pct: usize) -> (usize, usize) {
    let n_valid = n_rows * validation_pct / 100;
    (n_rows - n_valid, n_valid)
}

pub fn normalize_split(matrix: &FeatureMatrix) -> Result<NormalizedSplit> {
    normalize_split_with(matrix, TRAINING.split.validation_pct)
}

pub fn normalize_split_with(matrix: &FeatureMatrix, validation_pct: usize) -> Result<NormalizedSplit> {
    let (n_train, n_valid) = split_counts(matrix.n_rows(), validation_pct);
    let train_original = matrix.slice_rows(0..n_train);
    let valid_original = matrix.slice_rows(n_train..n_train + n_valid);

    let scaler = MinMaxScaler::fit(&train_original)?;
    Ok(NormalizedSplit {
        train_scaled: scaler.transform(&train_original),
        valid_scaled: scaler.transform(&valid_original),
        train_original,
        valid_original,
        scaler,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(n_rows: usize, n_cols: usize) -> FeatureMatrix {
        let columns = (0..n_cols).map(|c| format!("c{c}")).collect();
        let data = (0..n_rows * n_cols)
            .map(|i| {
                let (r, c) = (i / n_cols, i % n_cols);
                10.0 + r as f64 * (c + 1) as f64 + (r as f64 * 0.7).sin()
            })
            .collect();
        FeatureMatrix::new(columns, data).unwrap()
    }

    #[test]
    fn test_split_counts() {
        assert_eq!(split_counts(500, 20), (400, 100));
        assert_eq!(split_counts(7, 20), (6, 1));
        assert_eq!(split_counts(4, 20), (4, 0));
        for n in 0..200 {
            let (train, valid) = split_counts(n, 20);
            assert_eq!(train + valid, n);
            assert_eq!(valid, n / 5);
            assert_eq!(train, (n * 4).div_ceil(5));
        }
    }

    #[test]
    fn test_train_scaled_into_unit_range() {
        let split = normalize_split(&matrix(50, 3)).unwrap();
        assert_eq!(split.train_scaled.n_rows(), 40);
        assert_eq!(split.valid_scaled.n_rows(), 10);
        assert!(
            split
                .train_scaled
                .as_slice()
                .iter()
                .all(|v| (-1e-12..=1.0 + 1e-12).contains(v))
        );
    }

    #[test]
    fn test_inverse_reconstructs_originals() {
        let split = normalize_split(&matrix(100, 4)).unwrap();
        let restored = split.scaler.inverse_transform(&split.valid_scaled);
        for (a, b) in restored
            .as_slice()
            .iter()
            .zip(split.valid_original.as_slice())
        {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_constant_column_gets_unit_range() {
        let m = FeatureMatrix::from_rows(
            vec!["a".into(), "b".into()],
            &[vec![5.0, 1.0], vec![5.0, 3.0]],
        )
        .unwrap();
        let scaler = MinMaxScaler::fit(&m).unwrap();
        let scaled = scaler.transform(&m);
        assert_eq!(scaled.column(0), vec![0.0, 0.0]);
        assert_eq!(scaled.column(1), vec![0.0, 1.0]);
        assert_eq!(scaler.inverse_vec(&[0.0, 0.5]), vec![5.0, 2.0]);
    }

    #[test]
    fn test_validation_uses_training_scaler() {
        // Validation values beyond the training max scale above 1
        let m = FeatureMatrix::from_rows(
            vec!["a".into()],
            &[vec![0.0], vec![1.0], vec![2.0], vec![3.0], vec![8.0]],
        )
        .unwrap();
        let split = normalize_split(&m).unwrap();
        assert_eq!(split.valid_scaled.row(0), &[8.0 / 3.0]);
    }
}
