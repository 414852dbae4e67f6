use crate::models::FeatureMatrix;

/// Sliding windows of `seq_length` rows, each paired with the row that follows it.
/// Windows are stored flat: `count × seq_length × n_features`.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceSet {
    pub seq_length: usize,
    pub n_features: usize,
    windows: Vec<f64>,
    targets: Vec<f64>,
}

impl SequenceSet {
    pub fn len(&self) -> usize {
        if self.n_features == 0 {
            return 0;
        }
        self.targets.len() / self.n_features
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn window(&self, idx: usize) -> &[f64] {
        let size = self.seq_length * self.n_features;
        &self.windows[idx * size..(idx + 1) * size]
    }

    pub fn target(&self, idx: usize) -> &[f64] {
        &self.targets[idx * self.n_features..(idx + 1) * self.n_features]
    }

    pub fn windows_flat(&self) -> &[f64] {
        &self.windows
    }

    pub fn targets_flat(&self) -> &[f64] {
        &self.targets
    }
}

/// `window[i] = rows[i..i+L]`, `target[i] = rows[i+L]`. Empty when there are
/// fewer than `L + 1` rows.
pub fn create_sequences(matrix: &FeatureMatrix, seq_length: usize) -> SequenceSet {
    let n_features = matrix.n_cols();
    let count = matrix.n_rows().saturating_sub(seq_length);
    let mut windows = Vec::with_capacity(count * seq_length * n_features);
    let mut targets = Vec::with_capacity(count * n_features);
    if seq_length > 0 {
        for i in 0..count {
            windows.extend_from_slice(matrix.rows_flat(i..i + seq_length));
            targets.extend_from_slice(matrix.row(i + seq_length));
        }
    }
    SequenceSet {
        seq_length,
        n_features,
        windows,
        targets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalize::normalize_split;

    fn ramp(n_rows: usize, n_cols: usize) -> FeatureMatrix {
        let columns = (0..n_cols).map(|c| format!("c{c}")).collect();
        let data = (0..n_rows * n_cols).map(|i| i as f64).collect();
        FeatureMatrix::new(columns, data).unwrap()
    }

    #[test]
    fn test_count_and_targets() {
        let m = ramp(10, 2);
        let seqs = create_sequences(&m, 3);
        assert_eq!(seqs.len(), 7);
        for i in 0..seqs.len() {
            assert_eq!(seqs.target(i), m.row(i + 3));
            assert_eq!(seqs.window(i), m.rows_flat(i..i + 3));
        }
    }

    #[test]
    fn test_too_few_rows_gives_empty_set() {
        let m = ramp(5, 2);
        assert!(create_sequences(&m, 5).is_empty());
        assert!(create_sequences(&m, 9).is_empty());
        assert_eq!(create_sequences(&m, 4).len(), 1);
    }

    #[test]
    fn test_end_to_end_shapes() {
        let split = normalize_split(&ramp(500, 6)).unwrap();
        assert_eq!(split.train_scaled.n_rows(), 400);
        assert_eq!(split.valid_scaled.n_rows(), 100);

        let train = create_sequences(&split.train_scaled, 60);
        let valid = create_sequences(&split.valid_scaled, 60);
        assert_eq!(train.len(), 340);
        assert_eq!(valid.len(), 40);
        assert_eq!(train.windows_flat().len(), 340 * 60 * 6);
        assert_eq!(valid.targets_flat().len(), 40 * 6);
    }
}
